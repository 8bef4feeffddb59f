use crate::error::ConfigError;
use crate::map::Position;
use serde::{Deserialize, Serialize};

/// Upper bound on how far an ant can sense food, in cells.
pub const MAX_PERCEPTION_RADIUS: usize = 20;

/// Parameters for a simulation run.
///
/// The engine treats a config as immutable once a `Simulation` has been built from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of columns in the toroidal grid.
    pub width: usize,
    /// Number of rows in the toroidal grid.
    pub height: usize,
    /// Ants placed on the grid when the simulation starts.
    pub ant_count: usize,
    /// Ticks `run_to_end` executes.
    pub duration: u64,

    /// Probability that an empty cell receives food on a given tick.
    pub food_spawn_chance: f64,
    /// Pieces of food in a spawn, before jitter.
    pub food_spawn_baseline: f64,
    pub food_spawn_variance: f64,
    /// Value of a single piece of food, before jitter.
    pub food_value_baseline: f64,
    pub food_value_variance: f64,

    /// Carried food at which an ant heads back to the queen.
    pub food_threshold_return: f64,
    /// Scale of the random term added to pheromone weights when exploring.
    pub randomness_factor: f64,

    /// Amount deposited by an ant on each cell it moves to.
    pub pheromone_initial_intensity: f64,
    /// Fraction of pheromone lost per tick.
    pub pheromone_evaporation_rate: f64,
    /// Opacity a fully saturated cell is drawn with.
    pub pheromone_max_opacity: f64,
    /// Ceiling a single cell's pheromone saturates at.
    pub pheromone_saturation: f64,

    /// Ticks an egg takes to hatch.
    pub egg_gestation_period: u64,
    pub food_required_to_lay_egg: f64,

    /// Fixed queen cell. Chosen at random within the central half of the grid when `None`.
    pub queen_position: Option<Position>,
    /// Whether ants on their way home also mark the cells they cross.
    pub returning_lays_pheromone: bool,
    /// Record every position each ant visits.
    pub track_paths: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
            ant_count: 100,
            duration: 10_000,
            food_spawn_chance: 0.0002,
            food_spawn_baseline: 3.0,
            food_spawn_variance: 2.0,
            food_value_baseline: 5.0,
            food_value_variance: 3.0,
            food_threshold_return: 10.0,
            randomness_factor: 0.3,
            pheromone_initial_intensity: 1.0,
            pheromone_evaporation_rate: 0.2,
            pheromone_max_opacity: 0.5,
            pheromone_saturation: 10.0,
            egg_gestation_period: 100,
            food_required_to_lay_egg: 42.0,
            queen_position: None,
            returning_lays_pheromone: false,
            track_paths: false,
        }
    }
}

impl SimulationConfig {
    /// Parses a JSON document, filling missing fields from the defaults, and validates it.
    pub fn from_json(contents: &str) -> Result<SimulationConfig, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Radius of the square neighbourhood an ant scans for food.
    ///
    /// A fifth of the side of a square with the grid's area, at least 2 and never past
    /// `MAX_PERCEPTION_RADIUS`. A larger grid never gets a smaller radius.
    pub fn perception_radius(&self) -> usize {
        let side = ((self.width * self.height) as f64).sqrt() as usize;
        (side / 5).clamp(2, MAX_PERCEPTION_RADIUS)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }

        probability("food_spawn_chance", self.food_spawn_chance)?;
        probability("randomness_factor", self.randomness_factor)?;
        fraction("pheromone_max_opacity", self.pheromone_max_opacity)?;
        fraction("pheromone_evaporation_rate", self.pheromone_evaporation_rate)?;

        positive("food_threshold_return", self.food_threshold_return)?;
        positive("food_required_to_lay_egg", self.food_required_to_lay_egg)?;
        positive("pheromone_initial_intensity", self.pheromone_initial_intensity)?;
        positive("pheromone_saturation", self.pheromone_saturation)?;

        non_negative("food_spawn_baseline", self.food_spawn_baseline)?;
        non_negative("food_spawn_variance", self.food_spawn_variance)?;
        non_negative("food_value_baseline", self.food_value_baseline)?;
        non_negative("food_value_variance", self.food_value_variance)?;

        if self.egg_gestation_period == 0 {
            return Err(ConfigError::ZeroGestation);
        }

        if let Some((x, y)) = self.queen_position {
            if x >= self.width || y >= self.height {
                return Err(ConfigError::QueenOutsideGrid {
                    x,
                    y,
                    width: self.width,
                    height: self.height,
                });
            }
        }

        Ok(())
    }
}

fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 1.0,
        })
    }
}

// Open at zero, closed at one
fn fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min: f64::MIN_POSITIVE,
            max: 1.0,
        })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_validating_the_default_config_it_is_accepted() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn when_the_grid_has_a_zero_dimension_validation_fails() {
        let config = SimulationConfig {
            width: 0,
            ..SimulationConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyGrid {
                width: 0,
                height: 200
            })
        ));
    }

    #[test]
    fn when_a_threshold_is_not_positive_validation_fails() {
        let config = SimulationConfig {
            food_required_to_lay_egg: 0.0,
            ..SimulationConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "food_required_to_lay_egg",
                ..
            })
        ));

        let config = SimulationConfig {
            food_threshold_return: -1.0,
            ..SimulationConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "food_threshold_return",
                ..
            })
        ));
    }

    #[test]
    fn when_a_probability_is_outside_the_unit_interval_validation_fails() {
        let config = SimulationConfig {
            food_spawn_chance: 1.5,
            ..SimulationConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "food_spawn_chance",
                ..
            })
        ));
    }

    #[test]
    fn when_the_pheromone_opacity_is_zero_validation_fails() {
        let config = SimulationConfig {
            pheromone_max_opacity: 0.0,
            ..SimulationConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "pheromone_max_opacity",
                ..
            })
        ));

        let config = SimulationConfig {
            pheromone_max_opacity: 1.0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn when_evaporation_is_zero_validation_fails() {
        let config = SimulationConfig {
            pheromone_evaporation_rate: 0.0,
            ..SimulationConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "pheromone_evaporation_rate",
                ..
            })
        ));
    }

    #[test]
    fn when_the_gestation_period_is_zero_validation_fails() {
        let config = SimulationConfig {
            egg_gestation_period: 0,
            ..SimulationConfig::default()
        };

        assert!(matches!(config.validate(), Err(ConfigError::ZeroGestation)));
    }

    #[test]
    fn when_the_queen_is_outside_the_grid_validation_fails() {
        let config = SimulationConfig {
            width: 10,
            height: 10,
            queen_position: Some((10, 3)),
            ..SimulationConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::QueenOutsideGrid { x: 10, y: 3, .. })
        ));
    }

    #[test]
    fn when_parsing_a_partial_json_document_missing_fields_use_defaults() {
        let config =
            SimulationConfig::from_json(r#"{ "width": 50, "height": 40, "ant_count": 7 }"#)
                .unwrap();

        assert_eq!(config.width, 50);
        assert_eq!(config.height, 40);
        assert_eq!(config.ant_count, 7);
        assert_eq!(config.food_required_to_lay_egg, 42.0);
    }

    #[test]
    fn when_parsing_an_invalid_json_document_an_error_is_returned() {
        assert!(matches!(
            SimulationConfig::from_json("{ width: }"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            SimulationConfig::from_json(r#"{ "randomness_factor": 2.0 }"#),
            Err(ConfigError::OutOfRange { .. })
        ));
    }

    #[test]
    fn when_the_grid_grows_the_perception_radius_never_shrinks_and_stays_capped() {
        let radius = |side: usize| {
            SimulationConfig {
                width: side,
                height: side,
                ..SimulationConfig::default()
            }
            .perception_radius()
        };

        assert_eq!(radius(10), 2);
        assert_eq!(radius(4), 2);
        assert_eq!(radius(50), 10);
        assert_eq!(radius(200), MAX_PERCEPTION_RADIUS);
        assert_eq!(radius(1000), MAX_PERCEPTION_RADIUS);

        let mut previous = 0;
        for side in 1..300 {
            let current = radius(side);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn when_a_thin_grid_has_more_area_its_perception_radius_is_not_smaller() {
        let radius = |width: usize, height: usize| {
            SimulationConfig {
                width,
                height,
                ..SimulationConfig::default()
            }
            .perception_radius()
        };

        assert_eq!(radius(11, 11), 2);
        assert_eq!(radius(100, 4), 4);
        assert!(radius(100, 4) >= radius(11, 11));
        assert!(radius(400, 3) >= radius(30, 30));
        assert_eq!(radius(1000, 1), 6);

        let shapes = [(1, 1), (3, 1), (12, 3), (7, 7), (100, 4), (20, 25), (600, 2), (90, 90)];
        for pair in shapes.windows(2) {
            let (small, large) = (pair[0], pair[1]);
            assert!(small.0 * small.1 <= large.0 * large.1);
            assert!(radius(large.0, large.1) >= radius(small.0, small.1));
        }
    }
}
