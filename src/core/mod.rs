//! Core duel types: sides, state, RNG, configuration and errors.

pub mod side;
pub mod rng;
pub mod config;
pub mod error;
pub mod state;

pub use side::{Side, SideMap};
pub use rng::{GameRng, GameRngState};
pub use config::DuelConfig;
pub use error::{DuelError, DuelResult};
pub use state::{DuelOutcome, DuelState};
