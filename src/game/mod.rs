//! Game Engine (spec.md §4.2): simulates one game as quarters of drives of
//! plays, producing a fully populated `GameResult`.

pub mod drives;
pub mod engine;
pub mod plays;
pub mod types;

pub use engine::{simulate_game, GameOptions};
pub use types::GameResult;
