//! HTTP interface
//!
//! - `common`: response envelopes and the directive presenter
//! - `middleware`: actor resolution and the TLS guard
//! - `modules`: handlers grouped by resource
//! - `router`: route table with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_router, AppState};
