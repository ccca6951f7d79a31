//! HTTP front for the table API bridge.
//!
//! # Overview
//! Exposes `/register`, `/login` and CRUD on `/data`. Each inbound request is
//! validated, turned into exactly one outbound call through
//! `RemoteDataClient`, and answered with JSON.
//!
//! # Design
//! - Request shapes and response parsing live in `tablebridge-core`; this
//!   crate only executes them (`transport`) and maps outcomes to HTTP.
//! - Configuration is read once and passed in; no globals.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod remote;
pub mod transport;

pub use app::{app, app_with_static, run, AppState};
pub use config::ServerConfig;
pub use error::AppError;
pub use remote::RemoteDataClient;
pub use transport::HttpTransport;
