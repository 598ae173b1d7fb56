use async_trait::async_trait;
use chrono::{DateTime, Utc};
use simsy_model::{User, UserPreferences};
use uuid::Uuid;

use super::{InMemoryDatabase, StoredToken, StoredUser};
use crate::auth::{IssuedToken, TokenPurpose};
use crate::database::ports::{sessions::SessionsRepository, users::UsersRepository};
use crate::error::{CoreError, Result};

#[async_trait]
impl UsersRepository for InMemoryDatabase {
    async fn create_user_with_password(&self, user: &User, password_hash: &str) -> Result<()> {
        let mut state = self.state.write();
        if state.users.values().any(|u| u.user.username == user.username) {
            return Err(CoreError::Conflict("Username already exists".to_string()));
        }
        state.users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: password_hash.to_string(),
                preferences: UserPreferences::default(),
            },
        );
        Ok(())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.state.read().users.get(&id).map(|u| u.user.clone()))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .state
            .read()
            .users
            .values()
            .find(|u| u.user.username == username)
            .map(|u| u.user.clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.read();
        Ok(state
            .users
            .values()
            .filter(|u| u.user.email.eq_ignore_ascii_case(email))
            .min_by_key(|u| u.user.created_at)
            .map(|u| u.user.clone()))
    }

    async fn count_users(&self) -> Result<u64> {
        Ok(self.state.read().users.len() as u64)
    }

    async fn update_user(&self, user: &User) -> Result<()> {
        let mut state = self.state.write();
        let stored = state
            .users
            .get_mut(&user.id)
            .ok_or_else(|| CoreError::not_found("User not found"))?;
        stored.user = user.clone();
        Ok(())
    }

    async fn get_user_password_hash(&self, user_id: Uuid) -> Result<Option<String>> {
        Ok(self
            .state
            .read()
            .users
            .get(&user_id)
            .map(|u| u.password_hash.clone()))
    }

    async fn update_user_password(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        let mut state = self.state.write();
        let stored = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| CoreError::not_found("User not found"))?;
        stored.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn get_preferences(&self, user_id: Uuid) -> Result<UserPreferences> {
        self.state
            .read()
            .users
            .get(&user_id)
            .map(|u| u.preferences.clone())
            .ok_or_else(|| CoreError::not_found("User not found"))
    }

    async fn save_preferences(&self, user_id: Uuid, prefs: &UserPreferences) -> Result<()> {
        let mut state = self.state.write();
        let stored = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| CoreError::not_found("User not found"))?;
        stored.preferences = prefs.clone();
        Ok(())
    }
}

#[async_trait]
impl SessionsRepository for InMemoryDatabase {
    async fn store(&self, user_id: Uuid, token: &IssuedToken) -> Result<()> {
        self.state.write().tokens.insert(
            token.digest.clone(),
            StoredToken {
                user_id,
                purpose: token.purpose,
                expires_at: token.expires_at,
            },
        );
        Ok(())
    }

    async fn find_user(
        &self,
        digest: &str,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>> {
        Ok(self
            .state
            .read()
            .tokens
            .get(digest)
            .filter(|t| t.purpose == purpose && t.expires_at > now)
            .map(|t| t.user_id))
    }

    async fn consume(
        &self,
        digest: &str,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>> {
        let mut state = self.state.write();
        if !state.tokens.get(digest).is_some_and(|t| t.purpose == purpose) {
            return Ok(None);
        }
        Ok(state
            .tokens
            .remove(digest)
            .filter(|t| t.expires_at > now)
            .map(|t| t.user_id))
    }

    async fn revoke(&self, digest: &str) -> Result<()> {
        self.state.write().tokens.remove(digest);
        Ok(())
    }

    async fn revoke_all(&self, user_id: Uuid, purpose: TokenPurpose) -> Result<u64> {
        let mut state = self.state.write();
        let before = state.tokens.len();
        state
            .tokens
            .retain(|_, t| !(t.user_id == user_id && t.purpose == purpose));
        Ok((before - state.tokens.len()) as u64)
    }
}
