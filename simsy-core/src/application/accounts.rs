//! Registration, sessions, profiles and password management.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use simsy_model::user::NICKNAME_MAX;
use simsy_model::{PreferencesUpdate, ProfileUpdate, User, UserPreferences};
use tracing::{info, warn};
use uuid::Uuid;

use super::unit_of_work::AppUnitOfWork;
use crate::auth::{
    AuthCrypto, IssuedToken, TokenPurpose, tokens::RESET_TOKEN_LIFETIME_SECS,
};
use crate::error::{CoreError, Result};

pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 128;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

fn validate_password(password: &str) -> Result<()> {
    let len = password.chars().count();
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        return Err(CoreError::invalid(format!(
            "Password must be {PASSWORD_MIN}-{PASSWORD_MAX} characters"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct AccountService {
    uow: AppUnitOfWork,
    crypto: Arc<AuthCrypto>,
    session_lifetime: Duration,
    first_user_is_staff: bool,
}

impl AccountService {
    pub fn new(uow: AppUnitOfWork, crypto: Arc<AuthCrypto>, session_lifetime: Duration) -> Self {
        Self {
            uow,
            crypto,
            session_lifetime,
            first_user_is_staff: true,
        }
    }

    pub fn with_first_user_staff(mut self, enabled: bool) -> Self {
        self.first_user_is_staff = enabled;
        self
    }

    async fn require_user(&self, id: Uuid) -> Result<User> {
        self.uow
            .users
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("User not found"))
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        User::validate_username(&request.username)?;
        validate_password(&request.password)?;
        if request.nickname.chars().count() > NICKNAME_MAX {
            return Err(CoreError::invalid(format!(
                "Nickname must be at most {NICKNAME_MAX} characters"
            )));
        }

        let is_staff = self.first_user_is_staff && self.uow.users.count_users().await? == 0;
        let nickname = if request.nickname.trim().is_empty() {
            request.username.clone()
        } else {
            request.nickname
        };
        let user = User {
            id: Uuid::now_v7(),
            username: request.username,
            email: request.email.trim().to_string(),
            first_name: request.first_name,
            last_name: request.last_name,
            nickname,
            birthday: None,
            bio: None,
            is_staff,
            created_at: Utc::now(),
        };

        let hash = self.crypto.hash_password(&request.password)?;
        self.uow.users.create_user_with_password(&user, &hash).await?;
        info!(user_id = %user.id, username = %user.username, is_staff, "registered user");
        Ok(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let Some(user) = self.uow.users.get_user_by_username(username).await? else {
            self.crypto.verify_decoy(password)?;
            return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.into()));
        };
        let Some(hash) = self.uow.users.get_user_password_hash(user.id).await? else {
            self.crypto.verify_decoy(password)?;
            return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.into()));
        };
        if !self.crypto.verify_password(password, &hash)? {
            warn!(username = %username, "failed login");
            return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.into()));
        }

        let token = IssuedToken::generate(&self.crypto, TokenPurpose::Session, self.session_lifetime)?;
        self.uow.sessions.store(user.id, &token).await?;
        info!(user_id = %user.id, "issued session");
        Ok(Session {
            token: token.secret,
            expires_at: token.expires_at,
            user,
        })
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let digest = self.crypto.hash_token(token)?;
        let user_id = self
            .uow
            .sessions
            .find_user(&digest, TokenPurpose::Session, Utc::now())
            .await?
            .ok_or_else(|| CoreError::Unauthorized("Invalid or expired token".into()))?;
        self.uow
            .users
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::Unauthorized("Invalid or expired token".into()))
    }

    pub async fn logout(&self, token: &str) -> Result<()> {
        let digest = self.crypto.hash_token(token)?;
        self.uow.sessions.revoke(&digest).await
    }

    pub async fn logout_all(&self, user_id: Uuid) -> Result<u64> {
        let revoked = self
            .uow
            .sessions
            .revoke_all(user_id, TokenPurpose::Session)
            .await?;
        info!(user_id = %user_id, revoked, "revoked all sessions");
        Ok(revoked)
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<User> {
        self.require_user(user_id).await
    }

    pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<User> {
        update.validate()?;
        let mut user = self.require_user(user_id).await?;
        user.apply_profile(update);
        self.uow.users.update_user(&user).await?;
        Ok(user)
    }

    pub async fn preferences(&self, user_id: Uuid) -> Result<UserPreferences> {
        self.uow.users.get_preferences(user_id).await
    }

    pub async fn update_preferences(
        &self,
        user_id: Uuid,
        update: PreferencesUpdate,
    ) -> Result<UserPreferences> {
        let mut prefs = self.uow.users.get_preferences(user_id).await?;
        prefs.apply(update);
        self.uow.users.save_preferences(user_id, &prefs).await?;
        Ok(prefs)
    }

    /// Replace the password after checking the current one. Every session of
    /// the user is revoked.
    pub async fn change_password(&self, user_id: Uuid, current: &str, new: &str) -> Result<()> {
        let hash = self
            .uow
            .users
            .get_user_password_hash(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User not found"))?;
        if !self.crypto.verify_password(current, &hash)? {
            return Err(CoreError::Unauthorized("Current password is incorrect".into()));
        }
        self.set_password(user_id, new).await
    }

    async fn set_password(&self, user_id: Uuid, password: &str) -> Result<()> {
        validate_password(password)?;
        let hash = self.crypto.hash_password(password)?;
        self.uow.users.update_user_password(user_id, &hash).await?;
        self.uow
            .sessions
            .revoke_all(user_id, TokenPurpose::Session)
            .await?;
        info!(user_id = %user_id, "password changed");
        Ok(())
    }

    /// Issue a one-time reset token for the account with `email`. Unknown
    /// addresses yield `None`; callers answer the same either way.
    pub async fn request_password_reset(&self, email: &str) -> Result<Option<String>> {
        let email = email.trim();
        if email.is_empty() {
            return Err(CoreError::invalid("No email provided"));
        }
        let Some(user) = self.uow.users.get_user_by_email(email).await? else {
            info!("password reset requested for unknown email");
            return Ok(None);
        };
        self.uow
            .sessions
            .revoke_all(user.id, TokenPurpose::PasswordReset)
            .await?;
        let token = IssuedToken::generate(
            &self.crypto,
            TokenPurpose::PasswordReset,
            Duration::seconds(RESET_TOKEN_LIFETIME_SECS),
        )?;
        self.uow.sessions.store(user.id, &token).await?;
        // No mail transport; operators relay the token from the log.
        info!(
            user_id = %user.id,
            email = %user.email,
            reset_token = %token.secret,
            expires_at = %token.expires_at,
            "password reset token issued"
        );
        Ok(Some(token.secret))
    }

    pub async fn confirm_password_reset(&self, token: &str, password: &str) -> Result<()> {
        validate_password(password)?;
        let digest = self.crypto.hash_token(token)?;
        let user_id = self
            .uow
            .sessions
            .consume(&digest, TokenPurpose::PasswordReset, Utc::now())
            .await?
            .ok_or_else(|| CoreError::invalid("Invalid or expired reset token"))?;
        self.set_password(user_id, password).await
    }

    /// Create a staff account, or promote and re-password an existing one.
    pub async fn create_admin(&self, username: &str, password: &str, email: &str) -> Result<User> {
        if let Some(mut user) = self.uow.users.get_user_by_username(username).await? {
            self.set_password(user.id, password).await?;
            user.is_staff = true;
            self.uow.users.update_user(&user).await?;
            info!(user_id = %user.id, "promoted existing user to staff");
            return Ok(user);
        }

        let mut user = self
            .register(RegisterRequest {
                username: username.to_string(),
                password: password.to_string(),
                email: email.to_string(),
                ..RegisterRequest::default()
            })
            .await?;
        if !user.is_staff {
            user.is_staff = true;
            self.uow.users.update_user(&user).await?;
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AccountService {
        let crypto = AuthCrypto::insecure_fast("pepper", "token-key").unwrap();
        AccountService::new(
            AppUnitOfWork::in_memory(),
            Arc::new(crypto),
            Duration::days(1),
        )
    }

    fn request(username: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            password: "long enough".into(),
            email: format!("{username}@example.com"),
            ..RegisterRequest::default()
        }
    }

    #[tokio::test]
    async fn first_user_becomes_staff() {
        let accounts = service();
        let first = accounts.register(request("alice")).await.unwrap();
        let second = accounts.register(request("bob")).await.unwrap();
        assert!(first.is_staff);
        assert!(!second.is_staff);
        assert_eq!(second.nickname, "bob");
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let accounts = service();
        accounts.register(request("alice")).await.unwrap();
        let err = accounts.register(request("alice")).await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let accounts = service();
        let mut req = request("alice");
        req.password = "short".into();
        assert!(matches!(
            accounts.register(req).await.unwrap_err(),
            CoreError::InvalidInput(_)
        ));
    }

    #[tokio::test]
    async fn login_authenticate_logout() {
        let accounts = service();
        let user = accounts.register(request("alice")).await.unwrap();

        let bad = accounts.login("alice", "wrong password").await.unwrap_err();
        assert!(matches!(bad, CoreError::Unauthorized(_)));

        let session = accounts.login("alice", "long enough").await.unwrap();
        assert_eq!(accounts.authenticate(&session.token).await.unwrap().id, user.id);

        accounts.logout(&session.token).await.unwrap();
        assert!(accounts.authenticate(&session.token).await.is_err());
    }

    #[tokio::test]
    async fn password_change_revokes_sessions() {
        let accounts = service();
        let user = accounts.register(request("alice")).await.unwrap();
        let session = accounts.login("alice", "long enough").await.unwrap();

        assert!(
            accounts
                .change_password(user.id, "not it", "new password")
                .await
                .is_err()
        );
        accounts
            .change_password(user.id, "long enough", "new password")
            .await
            .unwrap();

        assert!(accounts.authenticate(&session.token).await.is_err());
        assert!(accounts.login("alice", "new password").await.is_ok());
    }

    #[tokio::test]
    async fn reset_token_works_once() {
        let accounts = service();
        accounts.register(request("alice")).await.unwrap();

        assert_eq!(
            accounts
                .request_password_reset("nobody@example.com")
                .await
                .unwrap(),
            None
        );
        let token = accounts
            .request_password_reset("alice@example.com")
            .await
            .unwrap()
            .unwrap();

        accounts
            .confirm_password_reset(&token, "reset password")
            .await
            .unwrap();
        assert!(
            accounts
                .confirm_password_reset(&token, "another one")
                .await
                .is_err()
        );
        assert!(accounts.login("alice", "reset password").await.is_ok());
    }

    #[tokio::test]
    async fn create_admin_promotes_existing_user() {
        let accounts = service();
        accounts.register(request("alice")).await.unwrap();
        accounts.register(request("bob")).await.unwrap();

        let admin = accounts
            .create_admin("bob", "admin password", "")
            .await
            .unwrap();
        assert!(admin.is_staff);
        assert!(accounts.login("bob", "admin password").await.is_ok());
    }

    #[tokio::test]
    async fn create_admin_with_bad_password_leaves_user_untouched() {
        let accounts = service();
        accounts.register(request("alice")).await.unwrap();
        let bob = accounts.register(request("bob")).await.unwrap();

        let err = accounts.create_admin("bob", "short", "").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));

        assert!(!accounts.profile(bob.id).await.unwrap().is_staff);
        assert!(accounts.login("bob", "long enough").await.is_ok());
    }

    #[tokio::test]
    async fn unknown_username_fails_like_a_wrong_password() {
        let accounts = service();
        accounts.register(request("alice")).await.unwrap();

        let unknown = accounts.login("mallory", "long enough").await.unwrap_err();
        let wrong = accounts.login("alice", "not the password").await.unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert!(matches!(unknown, CoreError::Unauthorized(_)));
    }
}
