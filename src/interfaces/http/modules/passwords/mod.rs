//! Passwords module: reset by email token

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
