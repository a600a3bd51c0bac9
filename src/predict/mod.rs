//! Prediction
//!
//! Match predictions (trained model or heuristic fallback) and season
//! table extrapolation.

pub mod matches;
pub mod season;

pub use matches::MatchPredictor;
pub use season::SeasonPredictor;
