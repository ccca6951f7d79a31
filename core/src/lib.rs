//! Client core for a table-oriented REST data API (`/rest/v1/<table>`).
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The host executes the actual
//! HTTP round-trip, which keeps the core deterministic and testable.
//!
//! # Design
//! - `TableClient` is stateless; it holds only an immutable `RemoteConfig`.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Failures are typed (`ApiError`), and a login with no matching row is
//!   `Ok(None)` rather than an error.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod digest;
pub mod error;
pub mod http;
pub mod types;

pub use client::{affected_rows, TableClient};
pub use config::{ConfigError, RemoteConfig};
pub use digest::DigestScheme;
pub use error::{ApiError, Operation};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{DataRecord, NewRecord, NewUser, RecordPatch, User};
