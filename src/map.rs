use crate::config::SimulationConfig;
use crate::error::MapError;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A cell as `(x, y)`. Any pair is valid: coordinates wrap around the grid.
pub type Position = (usize, usize);

/// Pheromone below this intensity evaporates completely.
pub const PHEROMONE_EPSILON: f64 = 1e-3;

/// The four directions an ant can step in, in tie-breaking order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    fn delta(self) -> (i64, i64) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

/// Toroidal food and pheromone fields.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldGrid {
    width: usize,
    height: usize,
    pheromone_ceiling: f64,
    food: Vec<f64>,
    pheromone: Vec<f64>,
}

impl FieldGrid {
    pub fn new(width: usize, height: usize, pheromone_ceiling: f64) -> FieldGrid {
        FieldGrid {
            width,
            height,
            pheromone_ceiling,
            food: vec![0.0; width * height],
            pheromone: vec![0.0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Resolves signed coordinates onto the torus.
    pub fn wrap(&self, x: i64, y: i64) -> Position {
        (
            x.rem_euclid(self.width as i64) as usize,
            y.rem_euclid(self.height as i64) as usize,
        )
    }

    pub fn neighbour(&self, position: Position, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        self.wrap(position.0 as i64 + dx, position.1 as i64 + dy)
    }

    /// Shortest signed displacement from `from` to `to` along each axis.
    ///
    /// When both ways round are equally long the positive direction wins.
    pub fn offset(&self, from: Position, to: Position) -> (i64, i64) {
        (
            shortest_delta(from.0, to.0, self.width),
            shortest_delta(from.1, to.1, self.height),
        )
    }

    /// Wrap-aware Manhattan distance.
    pub fn distance(&self, a: Position, b: Position) -> usize {
        let (dx, dy) = self.offset(a, b);
        (dx.unsigned_abs() + dy.unsigned_abs()) as usize
    }

    /// One greedy step from `from` towards `to` along the axis with more ground to cover.
    ///
    /// Ties go to the x axis. Returns `from` (wrapped) when already there.
    pub fn step_towards(&self, from: Position, to: Position) -> Position {
        let (dx, dy) = self.offset(from, to);
        let (x, y) = (from.0 as i64, from.1 as i64);

        if dx == 0 && dy == 0 {
            self.wrap(x, y)
        } else if dx.abs() >= dy.abs() {
            self.wrap(x + dx.signum(), y)
        } else {
            self.wrap(x, y + dy.signum())
        }
    }

    pub fn get_food(&self, position: Position) -> f64 {
        self.food[self.index(position)]
    }

    /// Places `amount` of food on a cell, replacing whatever was there.
    pub fn set_food(&mut self, position: Position, amount: f64) {
        let index = self.index(position);
        self.food[index] = amount.max(0.0);
    }

    /// Empties a cell and returns the food it held.
    pub fn take_food(&mut self, position: Position) -> f64 {
        let index = self.index(position);
        std::mem::take(&mut self.food[index])
    }

    /// Every cell holding food within the `(2 * radius + 1)^2` square around `center`,
    /// nearest first.
    ///
    /// Cells at the same distance keep row-major scan order. A radius that spans the whole
    /// grid visits each cell once.
    pub fn food_positions_within_radius(
        &self,
        center: Position,
        radius: usize,
    ) -> Vec<(Position, f64)> {
        let x_offsets = axis_offsets(radius, self.width);
        let y_offsets = axis_offsets(radius, self.height);
        let (cx, cy) = (center.0 as i64, center.1 as i64);

        let mut found: Vec<(u64, Position, f64)> = Vec::new();
        for &dy in &y_offsets {
            for &dx in &x_offsets {
                let position = self.wrap(cx + dx, cy + dy);
                let amount = self.get_food(position);
                if amount > 0.0 {
                    found.push((dx.unsigned_abs() + dy.unsigned_abs(), position, amount));
                }
            }
        }

        // Stable, so equal distances stay in scan order
        found.sort_by_key(|(distance, _, _)| *distance);
        found
            .into_iter()
            .map(|(_, position, amount)| (position, amount))
            .collect()
    }

    /// Adds pheromone to a cell, saturating at the grid's ceiling.
    pub fn add_pheromone(&mut self, position: Position, amount: f64) {
        let index = self.index(position);
        self.pheromone[index] = (self.pheromone[index] + amount).min(self.pheromone_ceiling);
    }

    pub fn get_pheromone(&self, position: Position) -> f64 {
        self.pheromone[self.index(position)]
    }

    /// Advances the fields by one tick: spawns food, then evaporates pheromone.
    ///
    /// Returns the cells that received food.
    pub fn step_environment<R: Rng + ?Sized>(
        &mut self,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Vec<(Position, f64)> {
        let spawned = self.spawn_food(config, rng);
        self.evaporate(config.pheromone_evaporation_rate);
        spawned
    }

    /// Each empty cell independently receives food with probability `food_spawn_chance`.
    ///
    /// A spawn is a jittered number of pieces, each of jittered value. Spawning never stacks
    /// on a cell that already holds food.
    pub fn spawn_food<R: Rng + ?Sized>(
        &mut self,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Vec<(Position, f64)> {
        let mut spawned = Vec::new();
        if config.food_spawn_chance <= 0.0 {
            return spawned;
        }

        for index in 0..self.food.len() {
            if !rng.gen_bool(config.food_spawn_chance) || self.food[index] > 0.0 {
                continue;
            }

            let pieces = jitter(rng, config.food_spawn_baseline, config.food_spawn_variance)
                .max(0.0)
                .round();
            let value = jitter(rng, config.food_value_baseline, config.food_value_variance).max(0.0);
            let amount = pieces * value;

            if amount > 0.0 {
                self.food[index] = amount;
                spawned.push(((index % self.width, index / self.width), amount));
            }
        }

        spawned
    }

    /// Multiplies every cell's pheromone by `1 - rate`, zeroing what falls below the epsilon.
    pub fn evaporate(&mut self, rate: f64) {
        let retained = 1.0 - rate;
        for intensity in self.pheromone.iter_mut() {
            *intensity *= retained;
            if *intensity < PHEROMONE_EPSILON {
                *intensity = 0.0;
            }
        }
    }

    /// All cells holding food, in row-major order.
    pub fn food_cells(&self) -> Vec<(Position, f64)> {
        self.non_zero(&self.food)
    }

    /// All cells holding pheromone, in row-major order.
    pub fn pheromone_cells(&self) -> Vec<(Position, f64)> {
        self.non_zero(&self.pheromone)
    }

    pub fn total_food(&self) -> f64 {
        self.food.iter().sum()
    }

    fn non_zero(&self, layer: &[f64]) -> Vec<(Position, f64)> {
        layer
            .iter()
            .enumerate()
            .filter(|(_, value)| **value > 0.0)
            .map(|(index, value)| ((index % self.width, index / self.width), *value))
            .collect()
    }

    fn index(&self, position: Position) -> usize {
        (position.1 % self.height) * self.width + position.0 % self.width
    }
}

/// A starting arrangement of food and queen read from a text map.
///
/// ```text
/// rows 3
/// cols 4
/// m .Q..
/// m ..*.
/// m 3..a
/// ```
///
/// `.` is an empty cell, `*` a cell with the default food amount, a digit a cell with that
/// much food, `a` an ant and `Q` the queen.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub width: usize,
    pub height: usize,
    pub food: Vec<(Position, f64)>,
    pub ants: Vec<Position>,
    pub queen: Option<Position>,
}

impl Layout {
    pub fn parse(map_contents: &str, food_per_cell: f64) -> Result<Layout, MapError> {
        let metadata = Regex::new(r"rows (\d+)\s+cols (\d+)")
            .expect("header pattern is valid")
            .captures(map_contents)
            .ok_or(MapError::MissingHeader)?;

        let height: usize = metadata[1].parse().map_err(|_| MapError::MissingHeader)?;
        let width: usize = metadata[2].parse().map_err(|_| MapError::MissingHeader)?;

        let mut layout = Layout {
            width,
            height,
            food: Vec::new(),
            ants: Vec::new(),
            queen: None,
        };

        let rows: Vec<&str> = Regex::new(r"m (.*)")
            .expect("row pattern is valid")
            .captures_iter(map_contents)
            .filter_map(|captures| captures.get(1))
            .map(|row| row.as_str().trim())
            .collect();

        if rows.len() != height {
            return Err(MapError::RowCount {
                expected: height,
                actual: rows.len(),
            });
        }

        for (row, line) in rows.into_iter().enumerate() {
            let cells = line.chars().count();
            if cells != width {
                return Err(MapError::RowWidth {
                    row,
                    expected: width,
                    actual: cells,
                });
            }

            for (col, value) in line.chars().enumerate() {
                match value {
                    '.' => {}
                    '*' => layout.food.push(((col, row), food_per_cell)),
                    '1'..='9' => layout
                        .food
                        .push(((col, row), f64::from(value.to_digit(10).unwrap_or(0)))),
                    'a' => layout.ants.push((col, row)),
                    'Q' => {
                        if layout.queen.replace((col, row)).is_some() {
                            return Err(MapError::DuplicateQueen);
                        }
                    }
                    _ => return Err(MapError::UnknownCell { value, row, col }),
                }
            }
        }

        Ok(layout)
    }

    pub fn to_grid(&self, pheromone_ceiling: f64) -> FieldGrid {
        let mut grid = FieldGrid::new(self.width, self.height, pheromone_ceiling);
        for &(position, amount) in &self.food {
            grid.set_food(position, amount);
        }
        grid
    }
}

fn shortest_delta(from: usize, to: usize, len: usize) -> i64 {
    let len = len as i64;
    let delta = (to as i64 - from as i64).rem_euclid(len);
    if delta > len / 2 {
        delta - len
    } else {
        delta
    }
}

fn axis_offsets(radius: usize, len: usize) -> Vec<i64> {
    if 2 * radius + 1 >= len {
        // The square wraps onto itself; visit each index once at its shortest offset
        let len = len as i64;
        (-(len - 1) / 2..=len / 2).collect()
    } else {
        let radius = radius as i64;
        (-radius..=radius).collect()
    }
}

pub(crate) fn jitter<R: Rng + ?Sized>(rng: &mut R, baseline: f64, variance: f64) -> f64 {
    if variance > 0.0 {
        baseline + rng.gen_range(-variance..=variance)
    } else {
        baseline
    }
}
