//! Users module: account administration and first-run signup

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
