use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use crate::domain::{CreateUserDto, DomainError, DomainResult, User, UserRepositoryInterface, UserRole};
use crate::infrastructure::crypto::password::hash_password;
use crate::infrastructure::database::entities::user;

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: &str) -> DomainResult<user::Model> {
        user::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::NotFound("User not found".into()))
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: user::UserRole) -> UserRole {
    match role {
        user::UserRole::User => UserRole::User,
        user::UserRole::Publisher => UserRole::Publisher,
        user::UserRole::Admin => UserRole::Admin,
    }
}

fn domain_role_to_entity(role: UserRole) -> user::UserRole {
    match role {
        UserRole::User => user::UserRole::User,
        UserRole::Publisher => user::UserRole::Publisher,
        UserRole::Admin => user::UserRole::Admin,
    }
}

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        role: entity_role_to_domain(model.role),
        password_hash: model.password_hash,
        reset_password_token: model.reset_password_token,
        reset_password_expire: model.reset_password_expire,
        created_at: model.created_at,
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for SeaOrmUserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<User> {
        let password_hash = hash_password(&dto.password)
            .map_err(|e| DomainError::Storage(format!("Failed to hash password: {}", e)))?;

        let model = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(dto.name),
            email: Set(dto.email),
            password_hash: Set(password_hash),
            role: Set(domain_role_to_entity(dto.role.unwrap_or_default())),
            reset_password_token: Set(None),
            reset_password_expire: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;

        Ok(user_model_to_domain(model))
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id.to_string()).one(&self.db).await?;
        Ok(model.map(user_model_to_domain))
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(user_model_to_domain))
    }

    async fn get_user_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::ResetPasswordToken.eq(token_hash))
            .filter(user::Column::ResetPasswordExpire.gt(now))
            .one(&self.db)
            .await?;
        Ok(model.map(user_model_to_domain))
    }

    async fn set_reset_token(
        &self,
        id: &str,
        token: Option<(String, DateTime<Utc>)>,
    ) -> DomainResult<()> {
        let (hash, expire) = token.unzip();
        let mut active: user::ActiveModel = self.find_model(id).await?.into();
        active.reset_password_token = Set(hash);
        active.reset_password_expire = Set(expire);
        active.update(&self.db).await?;
        Ok(())
    }

    async fn update_user_password(&self, id: &str, new_password_hash: &str) -> DomainResult<()> {
        let mut active: user::ActiveModel = self.find_model(id).await?.into();
        active.password_hash = Set(new_password_hash.to_string());
        active.update(&self.db).await?;
        Ok(())
    }

    async fn count_users(&self) -> DomainResult<u64> {
        Ok(user::Entity::find().count(&self.db).await?)
    }

    async fn delete_all_users(&self) -> DomainResult<u64> {
        let result = user::Entity::delete_many().exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::{init_database, DatabaseConfig};

    async fn repo() -> SeaOrmUserRepository {
        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmUserRepository::new(db)
    }

    fn dto(email: &str) -> CreateUserDto {
        CreateUserDto {
            name: "John Doe".into(),
            email: email.into(),
            role: Some(UserRole::Publisher),
            password: "123456".into(),
        }
    }

    #[tokio::test]
    async fn create_and_lookup() {
        let repo = repo().await;
        let created = repo.create_user(dto("john@gmail.com")).await.unwrap();
        assert_eq!(created.role, UserRole::Publisher);

        let by_email = repo.get_user_by_email("john@gmail.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
        assert!(repo.get_user_by_id(&created.id).await.unwrap().is_some());
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() {
        let repo = repo().await;
        repo.create_user(dto("john@gmail.com")).await.unwrap();
        let err = repo.create_user(dto("john@gmail.com")).await.unwrap_err();
        assert_eq!(err, DomainError::Conflict("Duplicate value is provided".into()));
    }

    #[tokio::test]
    async fn reset_token_lifecycle() {
        let repo = repo().await;
        let user = repo.create_user(dto("john@gmail.com")).await.unwrap();
        let expire = Utc::now() + chrono::Duration::minutes(10);

        repo.set_reset_token(&user.id, Some(("abc".into(), expire)))
            .await
            .unwrap();
        assert!(repo
            .get_user_by_reset_token("abc", Utc::now())
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .get_user_by_reset_token("abc", expire + chrono::Duration::minutes(1))
            .await
            .unwrap()
            .is_none());

        repo.update_user_password(&user.id, "new-hash").await.unwrap();
        repo.set_reset_token(&user.id, None).await.unwrap();
        let reloaded = repo.get_user_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash, "new-hash");
        assert!(reloaded.reset_password_token.is_none());
    }

    #[tokio::test]
    async fn delete_all() {
        let repo = repo().await;
        repo.create_user(dto("a@example.com")).await.unwrap();
        repo.create_user(dto("b@example.com")).await.unwrap();
        assert_eq!(repo.delete_all_users().await.unwrap(), 2);
        assert_eq!(repo.count_users().await.unwrap(), 0);
    }
}
