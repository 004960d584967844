//! Password reset flow.

pub mod service;

pub use service::{PasswordResetService, ResetPasswordForm, ResetRequestForm, ResetSettings};
