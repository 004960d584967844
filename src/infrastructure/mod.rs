//! Infrastructure layer - adapters behind the domain ports

pub mod authorization;
pub mod crypto;
pub mod database;
pub mod mailer;
pub mod storage;

pub use authorization::RolePolicy;
pub use crypto::{JwtConfig, JwtSessionIssuer};
pub use database::{init_database, run_migrations, DatabaseConfig, UserRepository};
pub use mailer::LogMailer;
pub use storage::InMemoryUserRepository;
