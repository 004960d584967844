//! Sign-in orchestration.
//!
//! HTTP handlers stay thin wrappers that delegate here.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::application::directive::{Directive, Flash};
use crate::application::paths::ADMIN_DASHBOARD_PATH;
use crate::domain::{DomainError, DomainResult, SessionPort, UserRepositoryInterface};
use crate::infrastructure::crypto::verify_password;

pub struct LoginService {
    repo: Arc<dyn UserRepositoryInterface>,
    sessions: Arc<dyn SessionPort>,
}

impl LoginService {
    pub fn new(repo: Arc<dyn UserRepositoryInterface>, sessions: Arc<dyn SessionPort>) -> Self {
        Self { repo, sessions }
    }

    /// Authenticate by login or email + password. Success redirects to the
    /// dashboard carrying a bearer token.
    pub async fn login(&self, login_or_email: &str, password: &str) -> DomainResult<Directive> {
        // Try login first, then email
        let user = match self.repo.get_user_by_login(login_or_email).await? {
            Some(user) => Some(user),
            None => self.repo.get_user_by_email(login_or_email).await?,
        };

        let Some(user) = user.filter(|u| verify_password(password, &u.password_hash)) else {
            debug!(login = %login_or_email, "Invalid credentials");
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        };

        let grant = self.sessions.sign_in(&user)?;
        self.repo.touch_last_login(&user.id, Utc::now()).await?;
        info!(user_id = %user.id, login = %user.login, "Signed in");

        Ok(
            Directive::redirect_with(ADMIN_DASHBOARD_PATH, Flash::notice("Signed in successfully."))
                .with_session(grant),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CreateUserDto, UserRole};
    use crate::infrastructure::crypto::{hash_password_with_cost, JwtConfig, JwtSessionIssuer};
    use crate::infrastructure::InMemoryUserRepository;

    async fn service() -> (Arc<InMemoryUserRepository>, LoginService) {
        let repo = Arc::new(InMemoryUserRepository::new());
        repo.create_user(CreateUserDto {
            login: "jane".into(),
            name: None,
            email: "jane@example.com".into(),
            roles: vec![UserRole::Editor],
            gender: None,
            password_hash: hash_password_with_cost("password123", 4).unwrap(),
        })
        .await
        .unwrap();
        let sessions = Arc::new(JwtSessionIssuer::new(JwtConfig {
            secret: "test-secret".into(),
            expiration_hours: 1,
            issuer: "cms-accounts".into(),
        }));
        (repo.clone(), LoginService::new(repo, sessions))
    }

    #[tokio::test]
    async fn login_by_email_stamps_last_login() {
        let (repo, service) = service().await;
        let directive = service.login("jane@example.com", "password123").await.unwrap();
        assert_eq!(directive.location(), Some(ADMIN_DASHBOARD_PATH));
        assert!(matches!(directive, Directive::Redirect { session: Some(_), .. }));

        let user = repo.get_user_by_login("jane").await.unwrap().unwrap();
        assert!(user.last_login_at.is_some());
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let (_, service) = service().await;
        assert!(matches!(
            service.login("jane", "nope").await,
            Err(DomainError::Unauthorized(_))
        ));
        assert!(matches!(
            service.login("ghost", "password123").await,
            Err(DomainError::Unauthorized(_))
        ));
    }
}
