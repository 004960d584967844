use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Condition, Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::domain::{
    roles_from_str, roles_to_string, CreateUserDto, DomainError, DomainResult, Gender,
    GetUserDto, SortDirection, SortField, UpdateUserDto, User, UserRepositoryInterface,
};
use crate::infrastructure::database::entities::user;
use crate::shared::{normalize_page, PaginatedResult};

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: &str) -> DomainResult<user::Model> {
        user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::user_not_found(id))
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_gender_to_domain(gender: user::Gender) -> Gender {
    match gender {
        user::Gender::Male => Gender::Male,
        user::Gender::Female => Gender::Female,
    }
}

fn domain_gender_to_entity(gender: Gender) -> user::Gender {
    match gender {
        Gender::Male => user::Gender::Male,
        Gender::Female => user::Gender::Female,
    }
}

fn sort_column(field: SortField) -> user::Column {
    match field {
        SortField::Login => user::Column::Login,
        SortField::Name => user::Column::Name,
        SortField::Email => user::Column::Email,
        SortField::CreatedAt => user::Column::CreatedAt,
        SortField::LastLoginAt => user::Column::LastLoginAt,
    }
}

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        login: model.login,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        roles: roles_from_str(&model.roles),
        gender: model.gender.map(entity_gender_to_domain),
        created_at: model.created_at,
        updated_at: model.updated_at,
        last_login_at: model.last_login_at,
        reset_password_token: model.reset_password_token,
        reset_password_sent_at: model.reset_password_sent_at,
    }
}

fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(format!("Database error: {}", e))
}

fn write_err(e: sea_orm::DbErr) -> DomainError {
    if e.to_string().contains("UNIQUE") || e.to_string().contains("duplicate") {
        DomainError::Conflict("Login or email already exists".to_string())
    } else {
        db_err(e)
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    async fn count_users(&self) -> DomainResult<u64> {
        user::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        let now = Utc::now();

        let new_user = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            login: Set(dto.login),
            name: Set(dto.name),
            email: Set(dto.email),
            password_hash: Set(dto.password_hash),
            roles: Set(roles_to_string(&dto.roles)),
            gender: Set(dto.gender.map(domain_gender_to_entity)),
            created_at: Set(now),
            updated_at: Set(now),
            last_login_at: Set(None),
            reset_password_token: Set(None),
            reset_password_sent_at: Set(None),
        };

        let model = new_user.insert(&self.db).await.map_err(write_err)?;
        Ok(user_model_to_domain(model))
    }

    async fn list_users(&self, dto: GetUserDto) -> DomainResult<PaginatedResult<User>> {
        let (page, page_size) = normalize_page(Some(dto.page), Some(dto.page_size));

        let mut query = user::Entity::find();

        // Apply search filter (login, name or email)
        if let Some(search) = dto.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(user::Column::Login.contains(search))
                    .add(user::Column::Name.contains(search))
                    .add(user::Column::Email.contains(search)),
            );
        }

        // Role names never contain one another, so a substring match is exact
        if let Some(role) = dto.role {
            query = query.filter(user::Column::Roles.contains(role.as_str()));
        }

        for sort in &dto.sorts {
            let order = match sort.direction {
                SortDirection::Asc => Order::Asc,
                SortDirection::Desc => Order::Desc,
            };
            query = query.order_by(sort_column(sort.field), order);
        }
        // Stable paging across equal sort keys
        query = query.order_by_asc(user::Column::Id);

        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let offset = ((page - 1) as u64) * page_size as u64;
        let models = query
            .offset(offset)
            .limit(page_size as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let items: Vec<User> = models.into_iter().map(user_model_to_domain).collect();

        Ok(PaginatedResult::new(items, total, page, page_size))
    }

    async fn get_user_by_login(&self, login: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Login.eq(login))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(user::Column::Email)))
                    .eq(email.to_lowercase()),
            )
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn get_user_by_reset_token(&self, token_hash: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::ResetPasswordToken.eq(token_hash))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>> {
        let existing = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let Some(existing) = existing else {
            return Ok(None);
        };

        let mut active: user::ActiveModel = existing.into();

        if let Some(login) = dto.login {
            active.login = Set(login);
        }
        if let Some(name) = dto.name {
            active.name = Set(name);
        }
        if let Some(email) = dto.email {
            active.email = Set(email);
        }
        if let Some(roles) = dto.roles {
            active.roles = Set(roles_to_string(&roles));
        }
        if let Some(gender) = dto.gender {
            active.gender = Set(gender.map(domain_gender_to_entity));
        }
        if let Some(hash) = dto.password_hash {
            active.password_hash = Set(hash);
        }

        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await.map_err(write_err)?;

        Ok(Some(user_model_to_domain(updated)))
    }

    async fn update_user_password(&self, id: &str, new_password_hash: &str) -> DomainResult<()> {
        let mut active: user::ActiveModel = self.find_model(id).await?.into();
        active.password_hash = Set(new_password_hash.to_string());
        active.reset_password_token = Set(None);
        active.reset_password_sent_at = Set(None);
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await.map_err(db_err)?;

        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: &str,
        token_hash: &str,
        sent_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut active: user::ActiveModel = self.find_model(id).await?.into();
        active.reset_password_token = Set(Some(token_hash.to_string()));
        active.reset_password_sent_at = Set(Some(sent_at));
        active.update(&self.db).await.map_err(db_err)?;

        Ok(())
    }

    async fn touch_last_login(&self, id: &str, at: DateTime<Utc>) -> DomainResult<()> {
        let mut active: user::ActiveModel = self.find_model(id).await?.into();
        active.last_login_at = Set(Some(at));
        active.update(&self.db).await.map_err(db_err)?;

        Ok(())
    }

    async fn delete_user(&self, id: &str) -> DomainResult<()> {
        let result = user::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::user_not_found(id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SortOrder, UserRole};
    use crate::infrastructure::database::migrator::Migrator;
    use sea_orm::{ConnectOptions, Database};
    use sea_orm_migration::MigratorTrait;

    async fn repo() -> UserRepository {
        // One connection: every sqlite::memory: connection is its own database
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opts).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        UserRepository::new(db)
    }

    fn dto(login: &str, roles: Vec<UserRole>) -> CreateUserDto {
        CreateUserDto {
            login: login.to_string(),
            name: None,
            email: format!("{}@example.com", login),
            roles,
            gender: Some(Gender::Female),
            password_hash: "hash".to_string(),
        }
    }

    fn query(sorts: Vec<SortOrder>) -> GetUserDto {
        GetUserDto {
            sorts,
            page: 1,
            page_size: 25,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_and_read_back() {
        let repo = repo().await;
        assert_eq!(repo.count_users().await.unwrap(), 0);

        let created = repo
            .create_user(dto("jane", vec![UserRole::Editor, UserRole::Admin]))
            .await
            .unwrap();
        assert_eq!(repo.count_users().await.unwrap(), 1);

        let loaded = repo.get_user_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.login, "jane");
        assert_eq!(loaded.roles, vec![UserRole::Editor, UserRole::Admin]);
        assert_eq!(loaded.gender, Some(Gender::Female));
        assert!(repo.get_user_by_email("jane@example.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn email_lookup_ignores_case() {
        let repo = repo().await;
        let created = repo.create_user(dto("jane", vec![UserRole::Member])).await.unwrap();
        let found = repo.get_user_by_email("JANE@Example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(created.id));
        assert!(repo.get_user_by_email("john@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_login_is_a_conflict() {
        let repo = repo().await;
        repo.create_user(dto("jane", vec![UserRole::Member])).await.unwrap();
        let mut again = dto("jane", vec![UserRole::Member]);
        again.email = "other@example.com".into();
        let err = repo.create_user(again).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_filters_sorts_and_pages() {
        let repo = repo().await;
        for login in ["carol", "alice", "bob"] {
            repo.create_user(dto(login, vec![UserRole::Member])).await.unwrap();
        }
        repo.create_user(dto("dave", vec![UserRole::Admin])).await.unwrap();

        let page = repo
            .list_users(query(vec![SortOrder::asc(SortField::Login)]))
            .await
            .unwrap();
        let logins: Vec<_> = page.items.iter().map(|u| u.login.as_str()).collect();
        assert_eq!(logins, ["alice", "bob", "carol", "dave"]);

        let admins = repo
            .list_users(GetUserDto {
                role: Some(UserRole::Admin),
                ..query(vec![])
            })
            .await
            .unwrap();
        assert_eq!(admins.total, 1);

        let search = repo
            .list_users(GetUserDto {
                search: Some("ro".into()),
                ..query(vec![])
            })
            .await
            .unwrap();
        assert_eq!(search.items.len(), 1);
        assert_eq!(search.items[0].login, "carol");

        let second = repo
            .list_users(GetUserDto {
                page: 2,
                page_size: 3,
                ..query(vec![SortOrder::parse("login desc").unwrap()])
            })
            .await
            .unwrap();
        assert_eq!(second.total_pages, 2);
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].login, "alice");
    }

    #[tokio::test]
    async fn update_without_hash_keeps_credential() {
        let repo = repo().await;
        let created = repo.create_user(dto("jane", vec![UserRole::Member])).await.unwrap();

        let updated = repo
            .update_user(
                &created.id,
                UpdateUserDto {
                    email: Some("new@example.com".into()),
                    name: Some(Some("Jane".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.email, "new@example.com");
        assert_eq!(updated.password_hash, "hash");
        assert!(repo
            .update_user("missing", UpdateUserDto::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn password_update_clears_reset_token() {
        let repo = repo().await;
        let created = repo.create_user(dto("jane", vec![UserRole::Member])).await.unwrap();
        repo.set_reset_token(&created.id, "digest", Utc::now()).await.unwrap();
        assert!(repo.get_user_by_reset_token("digest").await.unwrap().is_some());

        repo.update_user_password(&created.id, "new-hash").await.unwrap();
        assert!(repo.get_user_by_reset_token("digest").await.unwrap().is_none());
        let loaded = repo.get_user_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.password_hash, "new-hash");
    }

    #[tokio::test]
    async fn delete_missing_user_is_not_found() {
        let repo = repo().await;
        let created = repo.create_user(dto("jane", vec![UserRole::Member])).await.unwrap();
        repo.delete_user(&created.id).await.unwrap();
        assert!(matches!(
            repo.delete_user(&created.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
