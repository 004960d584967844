//! # CMS Accounts
//!
//! Administrative account management for a CMS back office: account
//! CRUD with role-based authorization, first-run signup, sign-in and
//! password reset by email token.
//!
//! ## Architecture
//!
//! - **domain**: accounts, errors and the ports the application uses
//! - **application**: account, sign-in and reset flows producing directives
//! - **infrastructure**: SQLite and in-memory storage, crypto, policy, mailer
//! - **interfaces**: HTTP routes with Swagger documentation
//! - **server**: runtime wiring and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use interfaces::http::{create_router, AppState};
pub use server::{init_tracing, ServerHandle, ServerOptions};
