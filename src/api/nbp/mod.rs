pub mod client;
pub mod models;

pub use client::NbpClient;
pub use models::RateError;
