//! # ants_colony
//!
//! A foraging ant colony on a toroidal grid.
//! Ants wander by pheromone and chance, carry food back to their queen, and the colony
//! grows as the stored food is turned into eggs.

pub mod colony;
pub mod config;
pub mod entities;
pub mod error;
pub mod map;
pub mod render;
pub mod replay;
pub mod simulation;

pub use colony::Colony;
pub use config::SimulationConfig;
pub use entities::{Ant, AntMode};
pub use error::{ConfigError, MapError};
pub use map::{Direction, FieldGrid, Layout, Position};
pub use simulation::{AntView, Simulation, Snapshot, Stats};
