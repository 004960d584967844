//! In-memory account storage for development and testing

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, GetUserDto, SortDirection, SortField, SortOrder,
    UpdateUserDto, User, UserRepositoryInterface,
};
use crate::shared::{normalize_page, PaginatedResult};

/// Accounts keyed by id.
pub struct InMemoryUserRepository {
    users: DashMap<String, User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    fn taken(&self, except_id: Option<&str>, login: Option<&str>, email: Option<&str>) -> bool {
        self.users.iter().any(|entry| {
            let u = entry.value();
            if Some(u.id.as_str()) == except_id {
                return false;
            }
            login.is_some_and(|l| u.login == l)
                || email.is_some_and(|e| u.email.eq_ignore_ascii_case(e))
        })
    }

    fn find_by(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        self.users
            .iter()
            .find(|entry| pred(entry.value()))
            .map(|entry| entry.value().clone())
    }

    fn modify(&self, id: &str, f: impl FnOnce(&mut User)) -> DomainResult<()> {
        let mut user = self
            .users
            .get_mut(id)
            .ok_or_else(|| DomainError::user_not_found(id))?;
        f(user.value_mut());
        Ok(())
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_search(user: &User, needle: &str) -> bool {
    user.login.contains(needle)
        || user.email.contains(needle)
        || user.name.as_deref().is_some_and(|n| n.contains(needle))
}

fn compare(a: &User, b: &User, sort: &SortOrder) -> Ordering {
    let ord = match sort.field {
        SortField::Login => a.login.cmp(&b.login),
        SortField::Name => a.name.cmp(&b.name),
        SortField::Email => a.email.cmp(&b.email),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::LastLoginAt => a.last_login_at.cmp(&b.last_login_at),
    };
    match sort.direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn count_users(&self) -> DomainResult<u64> {
        Ok(self.users.len() as u64)
    }

    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        if self.taken(None, Some(&dto.login), Some(&dto.email)) {
            return Err(DomainError::Conflict(
                "Login or email already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            login: dto.login,
            name: dto.name,
            email: dto.email,
            password_hash: dto.password_hash,
            roles: dto.roles,
            gender: dto.gender,
            created_at: now,
            updated_at: now,
            last_login_at: None,
            reset_password_token: None,
            reset_password_sent_at: None,
        };
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn list_users(&self, dto: GetUserDto) -> DomainResult<PaginatedResult<User>> {
        let (page, page_size) = normalize_page(Some(dto.page), Some(dto.page_size));
        let search = dto
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let mut users: Vec<User> = self
            .users
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|u| search.map_or(true, |s| matches_search(u, s)))
            .filter(|u| dto.role.map_or(true, |r| u.has_role(r)))
            .collect();

        users.sort_by(|a, b| {
            dto.sorts
                .iter()
                .map(|s| compare(a, b, s))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.id.cmp(&b.id))
        });

        let total = users.len() as u64;
        let offset = ((page - 1) as usize).saturating_mul(page_size as usize);
        let items = users
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect();

        Ok(PaginatedResult::new(items, total, page, page_size))
    }

    async fn get_user_by_login(&self, login: &str) -> DomainResult<Option<User>> {
        Ok(self.find_by(|u| u.login == login))
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self.find_by(|u| u.email.eq_ignore_ascii_case(email)))
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|entry| entry.value().clone()))
    }

    async fn get_user_by_reset_token(&self, token_hash: &str) -> DomainResult<Option<User>> {
        Ok(self.find_by(|u| u.reset_password_token.as_deref() == Some(token_hash)))
    }

    async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>> {
        if !self.users.contains_key(id) {
            return Ok(None);
        }
        if self.taken(Some(id), dto.login.as_deref(), dto.email.as_deref()) {
            return Err(DomainError::Conflict(
                "Login or email already exists".to_string(),
            ));
        }

        let Some(mut entry) = self.users.get_mut(id) else {
            return Ok(None);
        };
        let user = entry.value_mut();
        if let Some(login) = dto.login {
            user.login = login;
        }
        if let Some(name) = dto.name {
            user.name = name;
        }
        if let Some(email) = dto.email {
            user.email = email;
        }
        if let Some(roles) = dto.roles {
            user.roles = roles;
        }
        if let Some(gender) = dto.gender {
            user.gender = gender;
        }
        if let Some(hash) = dto.password_hash {
            user.password_hash = hash;
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn update_user_password(&self, id: &str, new_password_hash: &str) -> DomainResult<()> {
        self.modify(id, |u| {
            u.password_hash = new_password_hash.to_string();
            u.reset_password_token = None;
            u.reset_password_sent_at = None;
            u.updated_at = Utc::now();
        })
    }

    async fn set_reset_token(
        &self,
        id: &str,
        token_hash: &str,
        sent_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.modify(id, |u| {
            u.reset_password_token = Some(token_hash.to_string());
            u.reset_password_sent_at = Some(sent_at);
        })
    }

    async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        self.modify(id, |u| u.last_login_at = Some(at))
    }

    async fn delete_user(&self, id: &str) -> DomainResult<()> {
        self.users
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::user_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;

    fn dto(login: &str, name: Option<&str>) -> CreateUserDto {
        CreateUserDto {
            login: login.to_string(),
            name: name.map(str::to_string),
            email: format!("{}@example.com", login),
            roles: vec![UserRole::Member],
            gender: None,
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let repo = InMemoryUserRepository::new();
        repo.create_user(dto("jane", None)).await.unwrap();
        let mut other = dto("john", None);
        other.email = "jane@example.com".into();
        assert!(matches!(
            repo.create_user(other).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn email_lookup_ignores_case() {
        let repo = InMemoryUserRepository::new();
        let jane = repo.create_user(dto("jane", None)).await.unwrap();
        let found = repo.get_user_by_email("Jane@Example.COM").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(jane.id));

        let mut other = dto("john", None);
        other.email = "JANE@example.com".into();
        assert!(matches!(
            repo.create_user(other).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn sorts_by_multiple_keys() {
        let repo = InMemoryUserRepository::new();
        repo.create_user(dto("b", Some("Same"))).await.unwrap();
        repo.create_user(dto("a", Some("Same"))).await.unwrap();
        repo.create_user(dto("c", Some("Alpha"))).await.unwrap();

        let page = repo
            .list_users(GetUserDto {
                sorts: vec![
                    SortOrder::parse("name asc").unwrap(),
                    SortOrder::parse("login desc").unwrap(),
                ],
                page: 1,
                page_size: 25,
                ..Default::default()
            })
            .await
            .unwrap();
        let logins: Vec<_> = page.items.iter().map(|u| u.login.as_str()).collect();
        assert_eq!(logins, ["c", "b", "a"]);
    }

    #[tokio::test]
    async fn search_matches_name() {
        let repo = InMemoryUserRepository::new();
        repo.create_user(dto("jdoe", Some("Jane Doe"))).await.unwrap();
        repo.create_user(dto("other", None)).await.unwrap();

        let page = repo
            .list_users(GetUserDto {
                search: Some("Jane".into()),
                page: 1,
                page_size: 10,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].login, "jdoe");
    }

    #[tokio::test]
    async fn touch_missing_user_is_not_found() {
        let repo = InMemoryUserRepository::new();
        assert!(repo.touch_last_login("nope", Utc::now()).await.is_err());
    }
}
