use crate::colony::Colony;
use crate::config::SimulationConfig;
use crate::entities::{Ant, AntMode, Forage};
use crate::error::ConfigError;
use crate::map::{FieldGrid, Layout, Position};
use crate::replay::{create_replay_logger, ReplayLogger};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, trace};
use uuid::Uuid;

/// A foraging colony on a toroidal grid.
/// Main entry point for running the simulation.
pub struct Simulation {
    config: SimulationConfig,
    grid: FieldGrid,
    colony: Colony,
    tick: u64,
    paths: HashMap<Uuid, Vec<Position>>,
    replay_logger: Box<dyn ReplayLogger>,
    rng: StdRng,
}

/// Read-only picture of the simulation after a tick, for renderers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    /// Ticks completed so far.
    pub tick: u64,
    pub width: usize,
    pub height: usize,
    pub queen: Position,
    /// Ants in colony order.
    pub ants: Vec<AntView>,
    /// Cells holding food, row-major.
    pub food: Vec<(Position, f64)>,
    /// Cells holding pheromone, row-major.
    pub pheromone: Vec<(Position, f64)>,
    pub food_store: f64,
    pub pending_eggs: usize,
}

/// An ant as seen in a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AntView {
    pub id: Uuid,
    pub position: Position,
    pub carried_food: f64,
    pub mode: AntMode,
}

/// Headline numbers for a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Stats {
    pub tick: u64,
    pub ants: usize,
    pub pending_eggs: usize,
    pub food_store: f64,
    pub queen: Position,
}

impl Simulation {
    /// Creates a new simulation on an empty grid.
    ///
    /// # Arguments
    /// * `config` - The simulation parameters. Rejected before anything is built if invalid.
    /// * `seed` - The seed for the single random number generator every draw comes from.
    pub fn new(config: SimulationConfig, seed: u64) -> Result<Simulation, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);

        let queen = match config.queen_position {
            Some(queen) => queen,
            None => central_position(&mut rng, config.width, config.height),
        };

        let mut ants = Vec::with_capacity(config.ant_count);
        for _ in 0..config.ant_count {
            let position = (
                rng.gen_range(0..config.width),
                rng.gen_range(0..config.height),
            );
            ants.push(Ant::spawn(&mut rng, position));
        }

        let grid = FieldGrid::new(config.width, config.height, config.pheromone_saturation);
        Ok(Simulation::assemble(config, grid, queen, ants, rng))
    }

    /// Creates a simulation from a map layout.
    ///
    /// The grid takes the layout's dimensions, food, ants and queen. `ant_count` is ignored;
    /// the queen falls back to `queen_position`, then to a random central cell.
    pub fn from_layout(
        config: SimulationConfig,
        layout: &Layout,
        seed: u64,
    ) -> Result<Simulation, ConfigError> {
        let config = SimulationConfig {
            width: layout.width,
            height: layout.height,
            ant_count: layout.ants.len(),
            queen_position: layout.queen.or(config.queen_position),
            ..config
        };
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);

        let queen = match config.queen_position {
            Some(queen) => queen,
            None => central_position(&mut rng, config.width, config.height),
        };

        let ants = layout
            .ants
            .iter()
            .map(|position| Ant::spawn(&mut rng, *position))
            .collect();

        let grid = layout.to_grid(config.pheromone_saturation);
        Ok(Simulation::assemble(config, grid, queen, ants, rng))
    }

    /// Records every tick's events and saves them as JSON on `save_replay`.
    pub fn with_replay(mut self, filename: String) -> Simulation {
        self.replay_logger = create_replay_logger(
            Some(filename),
            self.config.width,
            self.config.height,
            self.colony.queen(),
        );
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn grid(&self) -> &FieldGrid {
        &self.grid
    }

    pub fn colony(&self) -> &Colony {
        &self.colony
    }

    /// Ticks completed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Positions each ant has moved to, oldest first. Empty unless `track_paths` is set.
    pub fn paths(&self) -> &HashMap<Uuid, Vec<Position>> {
        &self.paths
    }

    /// Advances the simulation by one tick.
    ///
    /// The environment moves first, then every ant in colony order, then the colony hatches
    /// and lays, so food deposited this tick can pay for an egg this tick.
    pub fn step(&mut self) {
        self.tick += 1;

        let spawned = self.grid.step_environment(&self.config, &mut self.rng);
        for (location, amount) in spawned {
            self.replay_logger.log_spawn_food(self.tick, location, amount);
        }

        let (ants, nest) = self.colony.ants_and_nest_mut();
        for ant in ants.iter_mut() {
            match ant.update(&mut self.grid, nest, &self.config, &mut self.rng) {
                Forage::Moved => {}
                Forage::PickedUp(amount) => {
                    self.replay_logger
                        .log_pick_up(self.tick, ant.id(), ant.position(), amount);
                }
                Forage::Deposited(amount) => {
                    trace!(tick = self.tick, ant = %ant.id(), amount, "food deposited");
                    self.replay_logger
                        .log_deposit(self.tick, ant.id(), ant.position(), amount);
                }
            }

            if self.config.track_paths {
                self.paths.entry(ant.id()).or_default().push(ant.position());
            }
        }

        let brood = self.colony.update(&self.config, &mut self.rng);
        let queen = self.colony.queen();
        if brood.laid > 0 {
            self.replay_logger.log_lay_eggs(self.tick, queen, brood.laid);
        }
        for id in brood.hatched {
            self.replay_logger.log_hatch(self.tick, id, queen);
        }

        self.replay_logger.log_tick(
            self.tick,
            self.colony.ants().len(),
            self.colony.pending_eggs(),
            self.colony.food_store(),
        );
    }

    /// Steps until `duration` ticks have elapsed since the simulation began.
    pub fn run(&mut self, duration: u64) -> Stats {
        self.run_until(duration, |_| false)
    }

    /// Runs for the configured duration.
    pub fn run_to_end(&mut self) -> Stats {
        self.run(self.config.duration)
    }

    /// Steps until `duration` ticks have elapsed or `stop` returns true.
    ///
    /// `stop` is consulted between ticks only, never in the middle of one.
    pub fn run_until<F>(&mut self, duration: u64, mut stop: F) -> Stats
    where
        F: FnMut(&Simulation) -> bool,
    {
        info!(
            from = self.tick,
            to = duration,
            ants = self.colony.ants().len(),
            "simulation started"
        );

        while self.tick < duration && !stop(self) {
            self.step();
        }

        let stats = self.stats();
        info!(
            tick = stats.tick,
            ants = stats.ants,
            pending_eggs = stats.pending_eggs,
            food_store = stats.food_store,
            "simulation finished"
        );
        stats
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            width: self.grid.width(),
            height: self.grid.height(),
            queen: self.colony.queen(),
            ants: self
                .colony
                .ants()
                .iter()
                .map(|ant| AntView {
                    id: ant.id(),
                    position: ant.position(),
                    carried_food: ant.carried_food(),
                    mode: ant.mode(),
                })
                .collect(),
            food: self.grid.food_cells(),
            pheromone: self.grid.pheromone_cells(),
            food_store: self.colony.food_store(),
            pending_eggs: self.colony.pending_eggs(),
        }
    }

    pub fn stats(&self) -> Stats {
        Stats {
            tick: self.tick,
            ants: self.colony.ants().len(),
            pending_eggs: self.colony.pending_eggs(),
            food_store: self.colony.food_store(),
            queen: self.colony.queen(),
        }
    }

    /// All food that has entered the simulation: on the grid, carried, stored or spent on eggs.
    pub fn total_food(&self) -> f64 {
        let carried: f64 = self.colony.ants().iter().map(Ant::carried_food).sum();
        self.grid.total_food() + carried + self.colony.food_store() + self.colony.food_invested()
    }

    pub fn save_replay(&self) -> std::io::Result<()> {
        self.replay_logger.save()
    }

    fn assemble(
        config: SimulationConfig,
        grid: FieldGrid,
        queen: Position,
        ants: Vec<Ant>,
        rng: StdRng,
    ) -> Simulation {
        let replay_logger = create_replay_logger(None, config.width, config.height, queen);
        Simulation {
            config,
            grid,
            colony: Colony::new(queen, ants),
            tick: 0,
            paths: HashMap::new(),
            replay_logger,
            rng,
        }
    }
}

/// A random cell in the central half of the grid.
fn central_position<R: Rng + ?Sized>(rng: &mut R, width: usize, height: usize) -> Position {
    (
        rng.gen_range(width / 4..=3 * width / 4),
        rng.gen_range(height / 4..=3 * height / 4),
    )
}
