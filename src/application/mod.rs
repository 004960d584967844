//! Application layer: use-case orchestration over the domain ports.

pub mod accounts;
pub mod directive;
pub mod identity;
pub mod passwords;
pub mod paths;

pub use accounts::{AccountAdminService, AccountSettings, ListAccountsQuery, Submission};
pub use directive::{Directive, Flash, FlashKind, Payload, View};
pub use identity::LoginService;
pub use passwords::{PasswordResetService, ResetSettings};
