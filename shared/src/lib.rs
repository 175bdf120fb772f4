//! Shared types and forecasting pipeline for the call-volume forecast service
//!
//! This crate holds everything that does not need I/O: the domain models,
//! calendar and weather features, the autoregressive rollout, the seasonal
//! predictor and the aggregation of daily predictions. The backend server and
//! the WASM module both drive the same [`pipeline::ForecastPipeline`].

pub mod aggregate;
pub mod calendar;
pub mod error;
pub mod features;
pub mod jma;
pub mod models;
pub mod pipeline;
pub mod predictor;
pub mod rollout;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
