//! External API integrations

pub mod jma;

pub use jma::JmaClient;
