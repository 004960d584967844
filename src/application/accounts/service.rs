//! Account administration: list, create, update and delete accounts,
//! plus the first-run signup that creates the initial administrator.
//!
//! Every operation returns a [`Directive`]. Create and update return a
//! [`Submission`] so the caller can run [`AccountAdminService::deliver_welcome`]
//! once the primary outcome is known.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::paging::per_page_for_screen_size;
use super::params::{permit, AccountParams};
use super::validation::{password_errors, AccountCandidate};
use super::views::{AccountDraft, AccountForm, AccountList};
use crate::application::directive::{Directive, Flash, Payload, View};
use crate::application::paths::{ADMIN_DASHBOARD_PATH, ADMIN_PAGES_PATH, USERS_PATH};
use crate::domain::{
    Action, Actor, AuthorizationPort, CreateUserDto, DomainError, DomainResult, FieldErrors,
    GetUserDto, NotificationError, NotificationPort, Resource, SessionPort, SortField, SortOrder,
    UpdateUserDto, User, UserRepositoryInterface, UserRole,
};
use crate::infrastructure::crypto::hash_password_with_cost;
use crate::shared::DEFAULT_PAGE_SIZE;

const DEFAULT_SORT: SortOrder = SortOrder::asc(SortField::Login);

#[derive(Debug, Clone)]
pub struct AccountSettings {
    /// Page size when the client reports no screen width.
    pub default_per_page: u32,
    pub bcrypt_cost: u32,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PAGE_SIZE,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

/// Listing parameters as they arrive from the query string.
#[derive(Debug, Clone, Default)]
pub struct ListAccountsQuery {
    pub q: Option<String>,
    pub role: Option<String>,
    /// `"<field> <asc|desc>"`, several separated by commas.
    pub s: Option<String>,
    pub page: Option<u32>,
    /// Reported screen width in pixels.
    pub screen_size: Option<u32>,
}

/// Outcome of a create or update.
#[derive(Debug, Clone)]
pub struct Submission {
    pub directive: Directive,
    /// The persisted account, when the submission was accepted.
    pub account: Option<User>,
    pub valid: bool,
    pub send_credentials: Option<Value>,
}

impl Submission {
    fn accepted(directive: Directive, account: User, send_credentials: Option<Value>) -> Self {
        Self {
            directive,
            account: Some(account),
            valid: true,
            send_credentials,
        }
    }

    fn rejected(view: View, form: AccountForm, errors: FieldErrors, send_credentials: Option<Value>) -> Self {
        Self {
            directive: Directive::Invalid {
                view,
                form: Payload::AccountForm(form),
                errors,
            },
            account: None,
            valid: false,
            send_credentials,
        }
    }

    /// Welcome mail is wanted only for accepted submissions whose flag is
    /// the exact string `"1"`, the value a checked form checkbox posts.
    /// `true`, `"true"` and `1` do not qualify.
    pub fn wants_welcome(&self) -> bool {
        self.valid && matches!(&self.send_credentials, Some(Value::String(flag)) if flag == "1")
    }
}

pub struct AccountAdminService {
    repo: Arc<dyn UserRepositoryInterface>,
    policy: Arc<dyn AuthorizationPort>,
    notifier: Arc<dyn NotificationPort>,
    sessions: Arc<dyn SessionPort>,
    settings: AccountSettings,
}

impl AccountAdminService {
    pub fn new(
        repo: Arc<dyn UserRepositoryInterface>,
        policy: Arc<dyn AuthorizationPort>,
        notifier: Arc<dyn NotificationPort>,
        sessions: Arc<dyn SessionPort>,
        settings: AccountSettings,
    ) -> Self {
        Self {
            repo,
            policy,
            notifier,
            sessions,
            settings,
        }
    }

    // ── Authorization helpers ───────────────────────────────────

    fn authorize(&self, actor: &Actor, action: Action, resource: Resource<'_>) -> DomainResult<()> {
        if self.policy.allowed(actor, action, resource) {
            return Ok(());
        }
        debug!(
            actor = actor.login.as_deref().unwrap_or("guest"),
            action = action.as_str(),
            resource = resource.kind(),
            resource_id = resource.id(),
            "Access denied"
        );
        Err(DomainError::Forbidden(format!(
            "You are not authorized to {} this {}",
            action.as_str(),
            resource.kind()
        )))
    }

    /// Fetch, then authorize. A missing account is `NotFound`, a denied
    /// action `Forbidden`.
    async fn load_and_authorize(&self, id: &str, actor: &Actor, action: Action) -> DomainResult<User> {
        let user = self
            .repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))?;
        self.authorize(actor, action, Resource::User(&user))?;
        Ok(user)
    }

    async fn first_run(&self) -> DomainResult<bool> {
        Ok(self.repo.count_users().await? == 0)
    }

    fn hash(&self, password: &str) -> DomainResult<String> {
        hash_password_with_cost(password, self.settings.bcrypt_cost)
            .map_err(|e| DomainError::Storage(format!("Failed to hash password: {}", e)))
    }

    async fn uniqueness_errors(&self, draft: &AccountDraft) -> DomainResult<FieldErrors> {
        let mut errors = FieldErrors::new();
        let own_id = draft.id.as_deref();
        if let Some(other) = self.repo.get_user_by_login(&draft.login).await? {
            if Some(other.id.as_str()) != own_id {
                errors.add("login", "has already been taken");
            }
        }
        if let Some(other) = self.repo.get_user_by_email(&draft.email).await? {
            if Some(other.id.as_str()) != own_id {
                errors.add("email", "has already been taken");
            }
        }
        Ok(errors)
    }

    async fn draft_errors(
        &self,
        draft: &AccountDraft,
        params: &AccountParams,
        password_required: bool,
    ) -> DomainResult<FieldErrors> {
        let mut errors = params.errors.clone();
        errors.merge(
            AccountCandidate {
                login: draft.login.clone(),
                email: draft.email.clone(),
                roles: draft.roles.clone(),
            }
            .errors(),
        );
        errors.merge(password_errors(
            params.password.as_deref(),
            params.password_confirmation.as_deref(),
            password_required,
        ));
        errors.merge(self.uniqueness_errors(draft).await?);
        Ok(errors)
    }

    // ── Actions ─────────────────────────────────────────────────

    pub async fn list(&self, query: ListAccountsQuery, actor: &Actor) -> DomainResult<Directive> {
        self.authorize(actor, Action::Index, Resource::Users)?;

        let role = match query.role.as_deref().filter(|r| !r.is_empty()) {
            Some(r) => Some(
                UserRole::parse(r)
                    .ok_or_else(|| DomainError::invalid("role", "is not included in the list"))?,
            ),
            None => None,
        };
        let sorts = parse_sorts(query.s.as_deref())?;
        let page_size = query
            .screen_size
            .map(per_page_for_screen_size)
            .unwrap_or(self.settings.default_per_page);

        let page = self
            .repo
            .list_users(GetUserDto {
                search: query.q.clone(),
                role,
                sorts: sorts.clone(),
                page: query.page.unwrap_or(1),
                page_size,
            })
            .await?;

        let sort = sorts.iter().map(ToString::to_string).collect();
        Ok(Directive::render(
            View::UsersIndex,
            Payload::AccountList(AccountList::new(page, sort, query.q, query.role)),
        ))
    }

    pub async fn new_account(&self, actor: &Actor) -> DomainResult<Directive> {
        self.authorize(actor, Action::New, Resource::Users)?;
        let can_update_role = self.policy.allowed(actor, Action::UpdateRole, Resource::Users);
        Ok(Directive::render(
            View::UsersNew,
            Payload::AccountForm(AccountForm::new(AccountDraft::blank(), can_update_role)),
        ))
    }

    /// Blank signup form while no account exists.
    pub async fn signup_or_new(&self) -> DomainResult<Directive> {
        if !self.first_run().await? {
            return Err(DomainError::AlreadyInitialized);
        }
        Ok(Directive::render(
            View::UsersSignup,
            Payload::AccountForm(AccountForm::new(AccountDraft::blank(), false)),
        ))
    }

    /// [`signup_or_new`](Self::signup_or_new), sending a second signup back
    /// to the dashboard.
    pub async fn signup(&self, actor: &Actor) -> DomainResult<Directive> {
        match self.signup_or_new().await {
            Err(DomainError::AlreadyInitialized) => {
                info!(
                    actor = actor.login.as_deref().unwrap_or("guest"),
                    "Signup attempted after initialization"
                );
                Ok(Directive::redirect_with(
                    ADMIN_DASHBOARD_PATH,
                    Flash::warning("You can not signup more than once."),
                ))
            }
            other => other,
        }
    }

    pub async fn create(&self, payload: &Value, actor: &Actor) -> DomainResult<Submission> {
        // The empty-store check and the insert are not atomic: two signups
        // racing on an empty store can both come out as admins.
        let first_run = self.first_run().await?;
        if !first_run {
            self.authorize(actor, Action::Create, Resource::Users)?;
        }
        let can_update_role =
            !first_run && self.policy.allowed(actor, Action::UpdateRole, Resource::Users);

        let params = permit(payload, can_update_role)?;
        let mut draft = AccountDraft::blank().apply(&params);
        if first_run {
            draft.roles = vec![UserRole::Admin];
        }
        let view = if first_run {
            View::UsersSignup
        } else {
            View::UsersNew
        };

        let mut errors = self.draft_errors(&draft, &params, true).await?;
        if !errors.is_empty() {
            debug!(errors = %errors, "Account rejected");
            return Ok(Submission::rejected(
                view,
                AccountForm::new(draft, can_update_role),
                errors,
                params.send_credentials,
            ));
        }

        let password_hash = self.hash(params.password.as_deref().unwrap_or_default())?;
        let created = self
            .repo
            .create_user(CreateUserDto {
                login: draft.login.clone(),
                name: draft.name.clone(),
                email: draft.email.clone(),
                roles: draft.roles.clone(),
                gender: draft.gender,
                password_hash,
            })
            .await;
        let user = match created {
            Ok(user) => user,
            Err(DomainError::Conflict(message)) => {
                errors.add("base", message);
                return Ok(Submission::rejected(
                    view,
                    AccountForm::new(draft, can_update_role),
                    errors,
                    params.send_credentials,
                ));
            }
            Err(e) => return Err(e),
        };

        metrics::counter!("accounts_created_total").increment(1);
        info!(user_id = %user.id, login = %user.login, first_run, "Account created");

        let directive = if first_run {
            let grant = self.sessions.sign_in(&user)?;
            self.repo.touch_last_login(&user.id, Utc::now()).await?;
            Directive::redirect_with(ADMIN_PAGES_PATH, Flash::notice("Successfully signup admin user"))
                .with_session(grant)
        } else {
            Directive::redirect_with(
                USERS_PATH,
                Flash::notice(format!("User {} successfully created.", user.display_name())),
            )
        };
        Ok(Submission::accepted(directive, user, params.send_credentials))
    }

    pub async fn edit(&self, id: &str, actor: &Actor) -> DomainResult<Directive> {
        let user = self.load_and_authorize(id, actor, Action::Edit).await?;
        let can_update_role = self.policy.allowed(actor, Action::UpdateRole, Resource::User(&user));
        Ok(Directive::render(
            View::UsersEdit,
            Payload::AccountForm(AccountForm::new(AccountDraft::from_user(&user), can_update_role)),
        ))
    }

    pub async fn update(&self, id: &str, payload: &Value, actor: &Actor) -> DomainResult<Submission> {
        let user = self.load_and_authorize(id, actor, Action::Update).await?;
        let can_update_role = self.policy.allowed(actor, Action::UpdateRole, Resource::User(&user));

        let mut params = permit(payload, can_update_role)?;
        let credential_change = params.password_present();
        if !credential_change {
            params.drop_password();
        }
        let draft = AccountDraft::from_user(&user).apply(&params);

        let mut errors = self.draft_errors(&draft, &params, credential_change).await?;
        if !errors.is_empty() {
            debug!(user_id = %user.id, errors = %errors, "Account update rejected");
            return Ok(Submission::rejected(
                View::UsersEdit,
                AccountForm::new(draft, can_update_role),
                errors,
                params.send_credentials,
            ));
        }

        let password_hash = match params.password.as_deref() {
            Some(password) if credential_change => Some(self.hash(password)?),
            _ => None,
        };
        let dto = UpdateUserDto {
            login: params.login.clone(),
            name: params.name.clone(),
            email: params.email.clone(),
            roles: params.roles.clone(),
            gender: params.gender,
            password_hash,
        };

        let updated = match self.repo.update_user(&user.id, dto).await {
            Ok(Some(updated)) => updated,
            Ok(None) => return Err(DomainError::user_not_found(id)),
            Err(DomainError::Conflict(message)) => {
                errors.add("base", message);
                return Ok(Submission::rejected(
                    View::UsersEdit,
                    AccountForm::new(draft, can_update_role),
                    errors,
                    params.send_credentials,
                ));
            }
            Err(e) => return Err(e),
        };

        metrics::counter!("accounts_updated_total").increment(1);
        info!(user_id = %updated.id, credential_change, "Account updated");

        let directive = Directive::redirect_with(
            USERS_PATH,
            Flash::notice(format!("User {} successfully updated.", updated.display_name())),
        );
        Ok(Submission::accepted(directive, updated, params.send_credentials))
    }

    /// Delete an account. The list is shown again whether or not the delete
    /// went through; only a successful one gets a notice.
    pub async fn destroy(&self, id: &str, actor: &Actor) -> DomainResult<Directive> {
        let user = self.load_and_authorize(id, actor, Action::Destroy).await?;
        let name = user.display_name().to_string();

        match self.repo.delete_user(&user.id).await {
            Ok(()) => {
                metrics::counter!("accounts_deleted_total").increment(1);
                info!(user_id = %user.id, login = %user.login, "Account deleted");
                Ok(Directive::redirect_with(
                    USERS_PATH,
                    Flash::notice(format!("User {} deleted", name)),
                ))
            }
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Failed to delete account");
                Ok(Directive::redirect(USERS_PATH))
            }
        }
    }

    /// Post-processing for create and update. Returns whether a mail was sent.
    pub async fn deliver_welcome(&self, submission: &Submission) -> Result<bool, NotificationError> {
        let Some(account) = submission
            .account
            .as_ref()
            .filter(|_| submission.wants_welcome())
        else {
            return Ok(false);
        };

        self.notifier.deliver_welcome(account).await?;
        metrics::counter!("welcome_mails_total").increment(1);
        info!(user_id = %account.id, "Welcome mail sent");
        Ok(true)
    }
}

fn parse_sorts(s: Option<&str>) -> DomainResult<Vec<SortOrder>> {
    let Some(s) = s.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(vec![DEFAULT_SORT]);
    };
    s.split(',')
        .map(|part| {
            SortOrder::parse(part)
                .ok_or_else(|| DomainError::invalid("s", "is not a sortable attribute"))
        })
        .collect()
}
