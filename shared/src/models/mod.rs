//! Domain models for the call-volume forecast

mod forecast;
mod history;
mod params;
mod weather;

pub use forecast::*;
pub use history::*;
pub use params::*;
pub use weather::*;
