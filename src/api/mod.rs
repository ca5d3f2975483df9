pub mod catalog;
pub mod client;
pub mod content;
pub mod orders;
pub mod people;
pub mod settings;
pub mod wire;

pub use client::AdminClient;
pub use orders::{Ack, OrderApi, OrderFilter};
pub use people::DeliveryReportQuery;
