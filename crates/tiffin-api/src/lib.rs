#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Modules
//!
//! - [`error`]: Engine error to HTTP response mapping
//! - [`extract`]: Extractors that report rejections in the API error format
//! - [`routes`]: Router and handlers
//! - [`server`]: Listener, middleware and graceful shutdown
//! - [`state`]: Shared handler state

pub mod error;
pub mod extract;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::build_router;
pub use server::{app, serve, shutdown_signal};
pub use state::AppState;
