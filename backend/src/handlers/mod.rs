//! HTTP handlers

pub mod forecast;
pub mod health;

pub use forecast::*;
pub use health::*;
