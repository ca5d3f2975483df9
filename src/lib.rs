pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod export;
pub mod services;
pub mod validation;

pub use api::AdminClient;
pub use config::Config;
pub use error::{AdminError, AdminResult};
