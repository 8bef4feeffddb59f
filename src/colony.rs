use crate::config::SimulationConfig;
use crate::entities::Ant;
use crate::map::Position;
use rand::Rng;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// The queen's cell and the food stored there.
///
/// Kept apart from the ant collection so ants can deposit into it while the colony is
/// iterating over them.
#[derive(Clone, Debug, PartialEq)]
pub struct Nest {
    queen: Position,
    food_store: f64,
}

impl Nest {
    pub fn new(queen: Position) -> Nest {
        Nest {
            queen,
            food_store: 0.0,
        }
    }

    pub fn queen(&self) -> Position {
        self.queen
    }

    pub fn food_store(&self) -> f64 {
        self.food_store
    }

    pub fn deposit(&mut self, amount: f64) {
        self.food_store += amount;
    }
}

/// An egg waiting to hatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Egg {
    /// Ticks left before the egg hatches.
    pub remaining: u64,
}

/// Births and layings from one colony update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Brood {
    pub hatched: Vec<Uuid>,
    pub laid: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Colony {
    nest: Nest,
    eggs: Vec<Egg>,
    ants: Vec<Ant>,
    // Total food ever debited from the store to lay eggs
    food_invested: f64,
}

impl Colony {
    pub fn new(queen: Position, ants: Vec<Ant>) -> Colony {
        Colony {
            nest: Nest::new(queen),
            eggs: Vec::new(),
            ants,
            food_invested: 0.0,
        }
    }

    pub fn queen(&self) -> Position {
        self.nest.queen()
    }

    pub fn food_store(&self) -> f64 {
        self.nest.food_store()
    }

    /// Live ants in the order they joined the colony.
    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    pub fn eggs(&self) -> &[Egg] {
        &self.eggs
    }

    /// Food the colony has turned into eggs since it was founded.
    pub fn food_invested(&self) -> f64 {
        self.food_invested
    }

    pub fn pending_eggs(&self) -> usize {
        self.eggs.len()
    }

    pub fn deposit(&mut self, amount: f64) {
        self.nest.deposit(amount);
    }

    /// Splits the colony so each ant can be updated while reporting to the nest.
    pub(crate) fn ants_and_nest_mut(&mut self) -> (&mut [Ant], &mut Nest) {
        (&mut self.ants, &mut self.nest)
    }

    /// Hatches due eggs, then turns stored food into new eggs.
    ///
    /// Hatching runs first so an egg is never aged on the tick it is laid.
    pub fn update<R: Rng + ?Sized>(&mut self, config: &SimulationConfig, rng: &mut R) -> Brood {
        let hatched = self.hatch_eggs(rng);
        let laid = self.lay_eggs(config);

        if !hatched.is_empty() || laid > 0 {
            debug!(
                hatched = hatched.len(),
                laid,
                ants = self.ants.len(),
                pending = self.eggs.len(),
                food_store = self.nest.food_store,
                "colony brood updated"
            );
        }

        Brood { hatched, laid }
    }

    /// Ages every egg by one tick and adds an ant at the queen for each that is due.
    pub fn hatch_eggs<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Uuid> {
        for egg in self.eggs.iter_mut() {
            egg.remaining = egg.remaining.saturating_sub(1);
        }

        let due = self.eggs.iter().filter(|egg| egg.remaining == 0).count();
        self.eggs.retain(|egg| egg.remaining > 0);

        let mut hatched = Vec::with_capacity(due);
        for _ in 0..due {
            let ant = Ant::spawn(&mut *rng, self.nest.queen);
            hatched.push(ant.id());
            self.ants.push(ant);
        }
        hatched
    }

    /// Lays as many eggs as the store can pay for, debiting each one in full.
    pub fn lay_eggs(&mut self, config: &SimulationConfig) -> usize {
        let mut laid = 0;
        while self.nest.food_store >= config.food_required_to_lay_egg {
            self.nest.food_store -= config.food_required_to_lay_egg;
            self.food_invested += config.food_required_to_lay_egg;
            self.eggs.push(Egg {
                remaining: config.egg_gestation_period,
            });
            laid += 1;
        }
        laid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::AntMode;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> SimulationConfig {
        SimulationConfig {
            food_required_to_lay_egg: 42.0,
            egg_gestation_period: 3,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn when_the_store_holds_twice_the_egg_cost_exactly_two_eggs_are_laid() {
        let mut colony = Colony::new((5, 5), vec![]);
        let mut rng = StdRng::seed_from_u64(0);
        colony.deposit(84.0);

        let brood = colony.update(&config(), &mut rng);

        assert_eq!(brood.laid, 2);
        assert_eq!(colony.pending_eggs(), 2);
        assert_eq!(colony.food_store(), 0.0);
    }

    #[test]
    fn when_the_store_has_surplus_the_remainder_is_kept() {
        let mut colony = Colony::new((5, 5), vec![]);
        colony.deposit(100.0);

        assert_eq!(colony.lay_eggs(&config()), 2);
        assert_eq!(colony.food_store(), 16.0);
        assert_eq!(colony.food_invested(), 84.0);
    }

    #[test]
    fn when_the_store_is_short_of_the_egg_cost_no_eggs_are_laid() {
        let mut colony = Colony::new((5, 5), vec![]);
        colony.deposit(41.9);

        assert_eq!(colony.lay_eggs(&config()), 0);
        assert_eq!(colony.food_store(), 41.9);
        assert!(colony.eggs().is_empty());
    }

    #[test]
    fn when_an_egg_is_laid_it_hatches_exactly_after_the_gestation_period() {
        let config = config();
        let mut colony = Colony::new((5, 5), vec![]);
        let mut rng = StdRng::seed_from_u64(0);
        colony.deposit(42.0);

        // Laid on this update with a full gestation counter
        colony.update(&config, &mut rng);
        assert_eq!(colony.eggs(), &[Egg { remaining: 3 }]);

        for _ in 0..2 {
            let brood = colony.update(&config, &mut rng);
            assert!(brood.hatched.is_empty());
            assert!(colony.ants().is_empty());
        }

        let brood = colony.update(&config, &mut rng);
        assert_eq!(brood.hatched.len(), 1);
        assert_eq!(colony.pending_eggs(), 0);
        assert_eq!(colony.ants().len(), 1);
        assert_eq!(colony.ants()[0].id(), brood.hatched[0]);
    }

    #[test]
    fn when_an_ant_hatches_it_starts_at_the_queen_empty_handed_and_exploring() {
        let config = SimulationConfig {
            egg_gestation_period: 1,
            ..config()
        };
        let mut colony = Colony::new((7, 2), vec![]);
        let mut rng = StdRng::seed_from_u64(0);
        colony.deposit(42.0);
        colony.update(&config, &mut rng);

        colony.update(&config, &mut rng);

        let ant = &colony.ants()[0];
        assert_eq!(ant.position(), (7, 2));
        assert_eq!(ant.carried_food(), 0.0);
        assert_eq!(ant.mode(), AntMode::Exploring);
    }

    #[test]
    fn when_several_eggs_are_due_they_all_hatch_and_join_in_order() {
        let config = config();
        let founder = Ant::spawn(&mut StdRng::seed_from_u64(1), (3, 3));
        let mut colony = Colony::new((0, 0), vec![founder]);
        let mut rng = StdRng::seed_from_u64(0);
        colony.deposit(126.0);
        colony.update(&config, &mut rng);
        assert_eq!(colony.pending_eggs(), 3);

        colony.update(&config, &mut rng);
        colony.update(&config, &mut rng);
        let brood = colony.update(&config, &mut rng);

        assert_eq!(brood.hatched.len(), 3);
        assert_eq!(colony.ants().len(), 4);
        assert_eq!(colony.ants()[0].position(), (3, 3));
        let ids: Vec<Uuid> = colony.ants()[1..].iter().map(|ant| ant.id()).collect();
        assert_eq!(ids, brood.hatched);
    }

    #[test]
    fn when_eggs_are_laid_on_different_ticks_they_hatch_on_different_ticks() {
        let config = config();
        let mut colony = Colony::new((0, 0), vec![]);
        let mut rng = StdRng::seed_from_u64(0);

        colony.deposit(42.0);
        colony.update(&config, &mut rng);
        colony.deposit(42.0);
        colony.update(&config, &mut rng);
        assert_eq!(colony.eggs(), &[Egg { remaining: 2 }, Egg { remaining: 3 }]);

        colony.update(&config, &mut rng);
        assert_eq!(colony.update(&config, &mut rng).hatched.len(), 1);
        assert_eq!(colony.update(&config, &mut rng).hatched.len(), 1);
        assert_eq!(colony.ants().len(), 2);
    }
}
