//! MVC-style request dispatch library.
//!
//! Routes an inbound request to a controller action, binds and validates
//! its model, runs the action inside its filter chain and renders the
//! result. `app` holds the demo application served by the binary.

pub mod app;
pub mod binding;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod filter;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod result;
pub mod routing;
pub mod validation;

pub use config::schema::AppConfig;
pub use dispatch::{DispatchRequest, Dispatcher, MvcConfiguration, MvcConfigurationBuilder};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
