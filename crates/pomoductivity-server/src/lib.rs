//! # Pomoductivity Server
//!
//! Thin transport over `pomoductivity-core`: a JSON REST API under `/api`
//! and a WebSocket at `/ws` that pushes every timer snapshot. All timer
//! logic lives in the core; handlers only translate requests and map
//! errors.

pub mod api;
pub mod error;
pub mod state;
pub mod ws;

pub use api::router;
pub use error::ApiError;
pub use state::{start, AppState};
