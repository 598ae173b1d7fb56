//! Account and preference types.
//!
//! The password hash never lives on [`User`]; credential storage belongs to
//! the core crate's user repository.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ModelError, Result};

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 30;
pub const NICKNAME_MAX: usize = 30;
pub const BIO_MAX: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Unique, 3-30 characters from `[A-Za-z0-9_.@+-]`
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub birthday: Option<NaiveDate>,
    pub bio: Option<String>,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn validate_username(username: &str) -> Result<()> {
        let len = username.chars().count();
        if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
            return Err(ModelError::invalid_field(
                "username",
                format!("must be {USERNAME_MIN}-{USERNAME_MAX} characters"),
            ));
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_.@+-".contains(c))
        {
            return Err(ModelError::invalid_field(
                "username",
                "may only contain letters, digits and _.@+-",
            ));
        }
        Ok(())
    }

    pub fn apply_profile(&mut self, update: ProfileUpdate) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(first_name) = update.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            self.last_name = last_name;
        }
        if let Some(nickname) = update.nickname {
            self.nickname = nickname;
        }
        if let Some(birthday) = update.birthday {
            self.birthday = birthday;
        }
        if let Some(bio) = update.bio {
            self.bio = bio;
        }
    }
}

/// Per-user playback and UI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Persist playback time automatically while watching
    pub time_autosave: bool,
    pub autoplay: bool,
    pub view_artists: bool,
    pub view_captions: bool,
    pub episode_selector_opened: bool,
    pub remember_home_tab: bool,
    pub home_tab: String,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            time_autosave: true,
            autoplay: true,
            view_artists: true,
            view_captions: false,
            episode_selector_opened: false,
            remember_home_tab: false,
            home_tab: "home".to_string(),
        }
    }
}

impl UserPreferences {
    pub fn apply(&mut self, update: PreferencesUpdate) {
        if let Some(v) = update.time_autosave {
            self.time_autosave = v;
        }
        if let Some(v) = update.autoplay {
            self.autoplay = v;
        }
        if let Some(v) = update.view_artists {
            self.view_artists = v;
        }
        if let Some(v) = update.view_captions {
            self.view_captions = v;
        }
        if let Some(v) = update.episode_selector_opened {
            self.episode_selector_opened = v;
        }
        if let Some(v) = update.remember_home_tab {
            self.remember_home_tab = v;
        }
        if let Some(v) = update.home_tab {
            self.home_tab = v;
        }
    }
}

/// Partial profile edit. `Some(None)` on a nullable field clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    #[serde(with = "double_option")]
    pub birthday: Option<Option<NaiveDate>>,
    #[serde(with = "double_option")]
    pub bio: Option<Option<String>>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(email) = &self.email
            && !email.is_empty()
            && !email.contains('@')
        {
            return Err(ModelError::invalid_field("email", "must be an email address"));
        }
        if let Some(nickname) = &self.nickname
            && nickname.chars().count() > NICKNAME_MAX
        {
            return Err(ModelError::invalid_field(
                "nickname",
                format!("must be at most {NICKNAME_MAX} characters"),
            ));
        }
        if let Some(Some(bio)) = &self.bio
            && bio.chars().count() > BIO_MAX
        {
            return Err(ModelError::invalid_field(
                "bio",
                format!("must be at most {BIO_MAX} characters"),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesUpdate {
    pub time_autosave: Option<bool>,
    pub autoplay: Option<bool>,
    pub view_artists: Option<bool>,
    pub view_captions: Option<bool>,
    pub episode_selector_opened: Option<bool>,
    pub remember_home_tab: Option<bool>,
    pub home_tab: Option<String>,
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(
        value: &Option<Option<T>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(
        deserializer: D,
    ) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(User::validate_username("al.ice+tv@home").is_ok());
        assert!(User::validate_username("al").is_err());
        assert!(User::validate_username(&"a".repeat(31)).is_err());
        assert!(User::validate_username("has space").is_err());
    }

    #[test]
    fn profile_update_distinguishes_null_from_absent() {
        let clear: ProfileUpdate =
            serde_json::from_str(r#"{"bio": null}"#).unwrap();
        assert_eq!(clear.bio, Some(None));

        let absent: ProfileUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.bio, None);
    }

    #[test]
    fn preferences_apply_only_touches_present_fields() {
        let mut prefs = UserPreferences::default();
        prefs.apply(PreferencesUpdate {
            autoplay: Some(false),
            home_tab: Some("watchlist".into()),
            ..Default::default()
        });
        assert!(!prefs.autoplay);
        assert!(prefs.time_autosave);
        assert_eq!(prefs.home_tab, "watchlist");
    }
}
