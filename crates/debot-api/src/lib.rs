// debot-api: Async Rust client for the debot gateway HTTP API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::GatewayClient;
pub use error::Error;
pub use models::{ConfigDocument, CronJob, CronSchedule, CronStatus, Status};
pub use transport::{TlsMode, TransportConfig};
