//! Business logic services for the call-volume forecast service

pub mod forecast;
pub mod history;

pub use forecast::ForecastService;
pub use history::HistoryService;
