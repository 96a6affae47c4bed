//! nodecast-forecast — demand history and forecasting.
//!
//! The daemon feeds one aggregate CPU-request sample per tick into a
//! fixed-capacity [`DemandWindow`]; once the window has filled, a
//! [`Forecaster`] turns the window into a single predicted-cores scalar
//! for the decision engine. The forecaster is a seam: the shipped
//! implementations are simple numeric models, and anything that can map
//! a slice of history to one float can stand in for them.

pub mod forecaster;
pub mod window;

pub use forecaster::{
    Forecaster, LinearTrendForecaster, MovingAverageForecaster, forecaster_for,
};
pub use window::DemandWindow;
