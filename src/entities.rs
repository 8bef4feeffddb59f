use crate::colony::Nest;
use crate::config::SimulationConfig;
use crate::map::{Direction, FieldGrid, Position};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What an ant is currently doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AntMode {
    /// Searching for food, following pheromone and chance.
    Exploring,
    /// Carrying food back to the queen.
    Returning,
}

/// Notable outcome of a single ant update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Forage {
    Moved,
    PickedUp(f64),
    Deposited(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ant {
    id: Uuid,
    position: Position,
    previous_position: Option<Position>,
    carried_food: f64,
    mode: AntMode,
}

impl Ant {
    pub fn new(id: Uuid, position: Position) -> Ant {
        Ant {
            id,
            position,
            previous_position: None,
            carried_food: 0.0,
            mode: AntMode::Exploring,
        }
    }

    /// Creates an ant whose id is drawn from `rng`, so seeded runs produce the same ids.
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, position: Position) -> Ant {
        let id = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
        Ant::new(id, position)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn previous_position(&self) -> Option<Position> {
        self.previous_position
    }

    pub fn carried_food(&self) -> f64 {
        self.carried_food
    }

    pub fn mode(&self) -> AntMode {
        self.mode
    }

    /// Advances the ant by one tick.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        grid: &mut FieldGrid,
        nest: &mut Nest,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Forage {
        match self.mode {
            AntMode::Returning => self.return_to_queen(grid, nest, config),
            AntMode::Exploring => self.explore(grid, config, rng),
        }
    }

    fn return_to_queen(
        &mut self,
        grid: &mut FieldGrid,
        nest: &mut Nest,
        config: &SimulationConfig,
    ) -> Forage {
        let queen = nest.queen();
        self.move_to(grid.step_towards(self.position, queen));

        if config.returning_lays_pheromone {
            grid.add_pheromone(self.position, config.pheromone_initial_intensity);
        }

        if self.position != queen {
            return Forage::Moved;
        }

        let amount = std::mem::take(&mut self.carried_food);
        nest.deposit(amount);
        self.mode = AntMode::Exploring;
        Forage::Deposited(amount)
    }

    fn explore<R: Rng + ?Sized>(
        &mut self,
        grid: &mut FieldGrid,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Forage {
        let nearby = grid.food_positions_within_radius(self.position, config.perception_radius());
        let next = match nearby.first() {
            Some(&(food, _)) => grid.step_towards(self.position, food),
            None => self.choose_by_pheromone(grid, config, rng),
        };

        self.move_to(next);
        grid.add_pheromone(next, config.pheromone_initial_intensity);

        let found = grid.take_food(next);
        self.carried_food += found;

        // Checked even without a pickup so an ant already at the threshold turns back
        if self.carried_food >= config.food_threshold_return {
            self.mode = AntMode::Returning;
        }

        if found > 0.0 {
            Forage::PickedUp(found)
        } else {
            Forage::Moved
        }
    }

    /// Picks the neighbour with the highest pheromone plus random noise.
    ///
    /// The cell the ant just left is skipped unless nothing else is reachable. Equal weights
    /// resolve in `Direction::ALL` order.
    fn choose_by_pheromone<R: Rng + ?Sized>(
        &self,
        grid: &FieldGrid,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Position {
        let mut candidates: Vec<Position> = Vec::with_capacity(4);
        for direction in Direction::ALL {
            let neighbour = grid.neighbour(self.position, direction);
            if Some(neighbour) != self.previous_position && !candidates.contains(&neighbour) {
                candidates.push(neighbour);
            }
        }

        if candidates.is_empty() {
            candidates.extend(
                Direction::ALL
                    .iter()
                    .map(|direction| grid.neighbour(self.position, *direction)),
            );
        }

        let mut best = candidates[0];
        let mut best_weight = f64::NEG_INFINITY;
        for candidate in candidates {
            let weight =
                grid.get_pheromone(candidate) + rng.gen::<f64>() * config.randomness_factor;
            if weight > best_weight {
                best = candidate;
                best_weight = weight;
            }
        }

        best
    }

    fn move_to(&mut self, position: Position) {
        self.previous_position = Some(self.position);
        self.position = position;
    }
}
