//! User account service: application-layer orchestration
//!
//! HTTP handlers and the authentication middleware delegate here.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::access::NOT_AUTHORIZED;
use crate::domain::{
    CreateUserDto, DomainError, DomainResult, User, UserRepositoryInterface, UserRole,
};
use crate::infrastructure::crypto::jwt::{create_token, verify_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password, verify_password};
use crate::infrastructure::crypto::reset_token::{generate_reset_token, hash_reset_token};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Issued token plus the user it was issued for
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub user: User,
}

/// Outcome of a forgot-password request. `token` is the raw value the
/// user would receive; only its hash is stored.
#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub user: User,
    pub token: String,
}

/// Generic over `R: UserRepositoryInterface` so it stays decoupled from
/// the concrete persistence layer.
pub struct UserService<R: UserRepositoryInterface + ?Sized> {
    repo: Arc<R>,
    jwt_config: JwtConfig,
}

impl<R: UserRepositoryInterface + ?Sized> UserService<R> {
    pub fn new(repo: Arc<R>, jwt_config: JwtConfig) -> Self {
        Self { repo, jwt_config }
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt_config
    }

    fn issue(&self, user: User) -> DomainResult<AuthResult> {
        let token = create_token(&user, &self.jwt_config)
            .map_err(|e| DomainError::Storage(format!("Failed to create token: {}", e)))?;
        Ok(AuthResult { token, user })
    }

    // ── Authentication ──────────────────────────────────────────

    /// Register a new account and sign it in.
    pub async fn register(&self, dto: CreateUserDto) -> DomainResult<AuthResult> {
        if dto.role == Some(UserRole::Admin) {
            return Err(DomainError::validation(
                "The admin role cannot be self-assigned.",
            ));
        }
        if dto.password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let user = self.repo.create_user(dto).await?;
        info!(user_id = %user.id, role = %user.role, "New user registered");
        self.issue(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(DomainError::validation("Email and Password are required."));
        }

        let Some(user) = self.repo.get_user_by_email(email.trim()).await? else {
            return Err(DomainError::Unauthorized("Invalid credentials.".into()));
        };
        if !verify_password(password, &user.password_hash) {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(DomainError::Unauthorized("Invalid credentials.".into()));
        }

        self.issue(user)
    }

    /// Resolve a bearer/cookie token to a live user.
    pub async fn authenticate(&self, token: &str) -> DomainResult<User> {
        let claims = verify_token(token, &self.jwt_config).map_err(|e| {
            debug!(error = %e, "Rejected token");
            DomainError::Unauthorized(NOT_AUTHORIZED.into())
        })?;

        self.repo
            .get_user_by_id(&claims.sub)
            .await?
            .ok_or_else(|| DomainError::Unauthorized(NOT_AUTHORIZED.into()))
    }

    pub async fn current_user(&self, id: &str) -> DomainResult<User> {
        self.repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found"))
    }

    // ── Password reset ──────────────────────────────────────────

    pub async fn forgot_password(&self, email: &str) -> DomainResult<PasswordReset> {
        let Some(user) = self.repo.get_user_by_email(email.trim()).await? else {
            return Err(DomainError::validation("No user found with provided email."));
        };

        let token = generate_reset_token(Utc::now());
        self.repo
            .set_reset_token(&user.id, Some((token.hash.clone(), token.expires_at)))
            .await?;
        debug!(user_id = %user.id, reset_token = %token.raw, "Password reset token issued");

        let user = self.current_user(&user.id).await?;
        Ok(PasswordReset {
            user,
            token: token.raw,
        })
    }

    pub async fn reset_password(&self, raw_token: &str, password: &str) -> DomainResult<AuthResult> {
        let hashed = hash_reset_token(raw_token);
        let Some(user) = self.repo.get_user_by_reset_token(&hashed, Utc::now()).await? else {
            return Err(DomainError::validation("Invalid token"));
        };
        if password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let new_hash = hash_password(password)
            .map_err(|e| DomainError::Storage(format!("Failed to hash password: {}", e)))?;
        self.repo.update_user_password(&user.id, &new_hash).await?;
        self.repo.set_reset_token(&user.id, None).await?;

        info!(user_id = %user.id, "Password reset");
        let user = self.current_user(&user.id).await?;
        self.issue(user)
    }

    // ── Bootstrap ───────────────────────────────────────────────

    /// Create the configured admin unless that email is already taken.
    /// Returns whether an account was created.
    pub async fn ensure_admin(&self, name: &str, email: &str, password: &str) -> DomainResult<bool> {
        if self.repo.get_user_by_email(email).await?.is_some() {
            return Ok(false);
        }
        let admin = self
            .repo
            .create_user(CreateUserDto {
                name: name.to_string(),
                email: email.to_string(),
                role: Some(UserRole::Admin),
                password: password.to_string(),
            })
            .await?;
        info!(user_id = %admin.id, email = %admin.email, "Default admin created");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemoryUserRepository;

    fn service() -> UserService<dyn UserRepositoryInterface> {
        let repo: Arc<dyn UserRepositoryInterface> = Arc::new(InMemoryUserRepository::new());
        UserService::new(repo, JwtConfig::new("test-secret", 1))
    }

    fn publisher(email: &str) -> CreateUserDto {
        CreateUserDto {
            name: "John Doe".into(),
            email: email.into(),
            role: Some(UserRole::Publisher),
            password: "123456".into(),
        }
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let service = service();
        let auth = service.register(publisher("john@gmail.com")).await.unwrap();
        let user = service.authenticate(&auth.token).await.unwrap();
        assert_eq!(user.id, auth.user.id);
        assert_eq!(user.role, UserRole::Publisher);
    }

    #[tokio::test]
    async fn admin_role_cannot_be_self_assigned() {
        let service = service();
        let mut dto = publisher("root@gmail.com");
        dto.role = Some(UserRole::Admin);
        assert!(matches!(
            service.register(dto).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn login_errors() {
        let service = service();
        service.register(publisher("john@gmail.com")).await.unwrap();

        assert_eq!(
            service.login("", "123456").await.unwrap_err(),
            DomainError::Validation("Email and Password are required.".into())
        );
        assert_eq!(
            service.login("john@gmail.com", "wrong").await.unwrap_err(),
            DomainError::Unauthorized("Invalid credentials.".into())
        );
        assert_eq!(
            service.login("nobody@gmail.com", "123456").await.unwrap_err(),
            DomainError::Unauthorized("Invalid credentials.".into())
        );
        assert!(service.login("john@gmail.com", "123456").await.is_ok());
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        assert_eq!(
            service().authenticate("not-a-jwt").await.unwrap_err(),
            DomainError::Unauthorized(NOT_AUTHORIZED.into())
        );
    }

    #[tokio::test]
    async fn forgot_and_reset_password() {
        let service = service();
        service.register(publisher("john@gmail.com")).await.unwrap();

        assert_eq!(
            service.forgot_password("jane@gmail.com").await.unwrap_err(),
            DomainError::Validation("No user found with provided email.".into())
        );

        let reset = service.forgot_password("john@gmail.com").await.unwrap();
        assert!(reset.user.reset_password_token.is_some());

        assert_eq!(
            service.reset_password("bogus", "abcdef").await.unwrap_err(),
            DomainError::Validation("Invalid token".into())
        );

        service.reset_password(&reset.token, "abcdef").await.unwrap();
        assert!(service.login("john@gmail.com", "abcdef").await.is_ok());
        // Single use
        assert!(service.reset_password(&reset.token, "zzzzzz").await.is_err());
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let service = service();
        assert!(service.ensure_admin("Admin", "admin@example.com", "secret1").await.unwrap());
        assert!(!service.ensure_admin("Admin", "admin@example.com", "secret1").await.unwrap());
        let auth = service.login("admin@example.com", "secret1").await.unwrap();
        assert!(auth.user.is_admin());
    }
}
