//! Response directives: what the web layer should do with a handled request.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{FieldErrors, SessionGrant};

use super::accounts::{AccountForm, AccountList};
use super::passwords::{ResetPasswordForm, ResetRequestForm};

/// Named views the interface layer knows how to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum View {
    #[serde(rename = "admin/users/index")]
    UsersIndex,
    #[serde(rename = "admin/users/new")]
    UsersNew,
    #[serde(rename = "admin/users/signup")]
    UsersSignup,
    #[serde(rename = "admin/users/edit")]
    UsersEdit,
    #[serde(rename = "admin/passwords/new")]
    PasswordNew,
    #[serde(rename = "admin/passwords/edit")]
    PasswordEdit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Notice,
    Warning,
    Alert,
}

/// One-shot message shown after a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Notice,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Warning,
            message: message.into(),
        }
    }

    pub fn alert(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Alert,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Payload {
    AccountList(AccountList),
    AccountForm(AccountForm),
    ResetRequest(ResetRequestForm),
    ResetPassword(ResetPasswordForm),
}

#[derive(Debug, Clone, Serialize)]
pub enum Directive {
    Render {
        view: View,
        payload: Payload,
    },
    /// Re-render a form with the submitted values and field errors.
    Invalid {
        view: View,
        form: Payload,
        errors: FieldErrors,
    },
    Redirect {
        location: String,
        flash: Option<Flash>,
        session: Option<SessionGrant>,
    },
}

impl Directive {
    pub fn render(view: View, payload: Payload) -> Self {
        Self::Render { view, payload }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect {
            location: location.into(),
            flash: None,
            session: None,
        }
    }

    pub fn redirect_with(location: impl Into<String>, flash: Flash) -> Self {
        Self::Redirect {
            location: location.into(),
            flash: Some(flash),
            session: None,
        }
    }

    /// Attach a session grant to a redirect. Other directives are returned unchanged.
    pub fn with_session(self, grant: SessionGrant) -> Self {
        match self {
            Self::Redirect {
                location, flash, ..
            } => Self::Redirect {
                location,
                flash,
                session: Some(grant),
            },
            other => other,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Redirect { location, .. } => Some(location),
            _ => None,
        }
    }

    pub fn flash(&self) -> Option<&Flash> {
        match self {
            Self::Redirect { flash, .. } => flash.as_ref(),
            _ => None,
        }
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Invalid { errors, .. } => Some(errors),
            _ => None,
        }
    }
}
