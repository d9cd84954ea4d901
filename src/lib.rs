//! Network failover daemon library.

pub mod api;
pub mod config;
pub mod controller;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod switcher;

pub use config::schema::SwitcherConfig;
pub use controller::FailoverController;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
