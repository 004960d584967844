//! Password reset: request a reset link by email, then choose a new
//! password with the token from that link.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::application::accounts::params::require_object;
use crate::application::accounts::validation::password_errors;
use crate::application::directive::{Directive, Flash, Payload, View};
use crate::application::paths::{ADMIN_DASHBOARD_PATH, LOGIN_PATH, ROOT_PATH};
use crate::domain::{
    Action, Actor, AuthorizationPort, DomainError, DomainResult, FieldErrors, NotificationPort,
    Resource, SessionPort, User, UserRepositoryInterface,
};
use crate::infrastructure::crypto::{generate_reset_token, hash_password_with_cost, hash_reset_token};

pub const RESET_REQUESTED_NOTICE: &str = "If your email address exists in our database, you will \
     receive a password recovery link at your email address in a few minutes.";
pub const RESET_DONE_NOTICE: &str =
    "Your password has been changed successfully. You are now signed in.";
pub const NO_TOKEN_ALERT: &str = "You can't access this page without coming from a password \
     reset email. If you do come from a password reset email, please make sure you used the full \
     URL provided.";

#[derive(Debug, Clone)]
pub struct ResetSettings {
    /// Public base URL used to build links in mails.
    pub base_url: String,
    pub reset_password_within_hours: i64,
    pub bcrypt_cost: u32,
}

impl Default for ResetSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            reset_password_within_hours: 6,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ResetRequestForm {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResetPasswordForm {
    pub reset_password_token: String,
}

pub struct PasswordResetService {
    repo: Arc<dyn UserRepositoryInterface>,
    policy: Arc<dyn AuthorizationPort>,
    notifier: Arc<dyn NotificationPort>,
    sessions: Arc<dyn SessionPort>,
    settings: ResetSettings,
}

impl PasswordResetService {
    pub fn new(
        repo: Arc<dyn UserRepositoryInterface>,
        policy: Arc<dyn AuthorizationPort>,
        notifier: Arc<dyn NotificationPort>,
        sessions: Arc<dyn SessionPort>,
        settings: ResetSettings,
    ) -> Self {
        Self {
            repo,
            policy,
            notifier,
            sessions,
            settings,
        }
    }

    // ── Redirect and URL policies ───────────────────────────────

    /// Where to send the visitor to sign in, whatever the resource.
    pub fn new_session_path(&self, _resource_name: &str) -> &'static str {
        LOGIN_PATH
    }

    /// Absolute link to the reset form for `token`.
    pub fn edit_password_url(&self, token: &str) -> String {
        format!(
            "{}/admin/password/edit?reset_password_token={}",
            self.settings.base_url.trim_end_matches('/'),
            token
        )
    }

    pub fn after_resetting_password_path(&self, actor: &Actor) -> &'static str {
        if self
            .policy
            .allowed(actor, Action::Index, Resource::AdminDashboard)
        {
            ADMIN_DASHBOARD_PATH
        } else {
            ROOT_PATH
        }
    }

    // ── Flow ────────────────────────────────────────────────────

    pub fn new_form(&self) -> Directive {
        Directive::render(
            View::PasswordNew,
            Payload::ResetRequest(ResetRequestForm::default()),
        )
    }

    /// Send reset instructions. The answer is the same whether or not the
    /// address belongs to an account.
    pub async fn create(&self, payload: &Value) -> DomainResult<Directive> {
        let params = require_object(payload, "user")?;
        let email = params
            .get("email")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();

        let user = if email.is_empty() {
            None
        } else {
            self.repo.get_user_by_email(email).await?
        };

        match user {
            Some(user) => self.send_instructions(&user).await?,
            None => debug!("Reset requested for unknown email"),
        }

        Ok(Directive::redirect_with(
            self.new_session_path("user"),
            Flash::notice(RESET_REQUESTED_NOTICE),
        ))
    }

    async fn send_instructions(&self, user: &User) -> DomainResult<()> {
        let generated = generate_reset_token();
        self.repo
            .set_reset_token(&user.id, &generated.token_hash, Utc::now())
            .await?;

        let url = self.edit_password_url(&generated.token);
        match self.notifier.deliver_reset_instructions(user, &url).await {
            Ok(()) => info!(user_id = %user.id, "Reset instructions sent"),
            Err(e) => warn!(user_id = %user.id, error = %e, "Failed to send reset instructions"),
        }
        Ok(())
    }

    pub fn edit(&self, token: Option<&str>) -> Directive {
        match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => Directive::render(
                View::PasswordEdit,
                Payload::ResetPassword(ResetPasswordForm {
                    reset_password_token: token.to_string(),
                }),
            ),
            None => Directive::redirect_with(
                self.new_session_path("user"),
                Flash::alert(NO_TOKEN_ALERT),
            ),
        }
    }

    fn expired(&self, user: &User) -> bool {
        let window = Duration::hours(self.settings.reset_password_within_hours);
        user.reset_password_sent_at
            .map_or(true, |sent_at| Utc::now() - sent_at > window)
    }

    pub async fn update(&self, payload: &Value) -> DomainResult<Directive> {
        let params = require_object(payload, "user")?;
        let field = |key: &str| params.get(key).and_then(Value::as_str);
        let token = field("reset_password_token").unwrap_or_default().trim();

        let user = if token.is_empty() {
            None
        } else {
            self.repo
                .get_user_by_reset_token(&hash_reset_token(token))
                .await?
        };

        let mut errors = FieldErrors::new();
        match &user {
            None => errors.add("reset_password_token", "is invalid"),
            Some(user) if self.expired(user) => errors.add(
                "reset_password_token",
                "has expired, please request a new one",
            ),
            Some(_) => {}
        }
        errors.merge(password_errors(
            field("password"),
            field("password_confirmation"),
            true,
        ));

        let user = match user {
            Some(user) if errors.is_empty() => user,
            _ => {
                debug!(errors = %errors, "Password reset rejected");
                return Ok(Directive::Invalid {
                    view: View::PasswordEdit,
                    form: Payload::ResetPassword(ResetPasswordForm {
                        reset_password_token: token.to_string(),
                    }),
                    errors,
                });
            }
        };

        let password = field("password").unwrap_or_default();
        let password_hash = hash_password_with_cost(password, self.settings.bcrypt_cost)
            .map_err(|e| DomainError::Storage(format!("Failed to hash password: {}", e)))?;
        self.repo.update_user_password(&user.id, &password_hash).await?;

        let grant = self.sessions.sign_in(&user)?;
        self.repo.touch_last_login(&user.id, Utc::now()).await?;

        metrics::counter!("password_resets_total").increment(1);
        info!(user_id = %user.id, "Password reset completed");

        let location = self.after_resetting_password_path(&Actor::from_user(&user));
        Ok(Directive::redirect_with(location, Flash::notice(RESET_DONE_NOTICE)).with_session(grant))
    }
}
