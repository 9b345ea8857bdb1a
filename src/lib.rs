//! Client for a crop recommendation backend: region detection, crop market
//! prices, crop recommendations and a weather dashboard, served as MCP tools.

pub mod chart;
pub mod config;
pub mod constants;
pub mod error;
pub mod formatters;
pub mod location;
pub mod models;
pub mod prices;
pub mod recommend;
pub mod service;
pub mod session;
pub mod transport;
pub mod weather;

pub use config::Config;
pub use error::{ClientError, ClientResult};
pub use service::CropAdvisor;
pub use session::Session;
