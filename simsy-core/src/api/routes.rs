macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

/// Versioned API route definitions shared by the server and its tests
pub mod v1 {
    pub const ROOT: &str = "/api/v1";
    pub const VERSION: &str = "v1";

    pub const HEALTH: &str = v1_path!("/health");
    pub const SEARCH: &str = v1_path!("/search");

    pub mod auth {
        pub const REGISTER: &str = v1_path!("/auth/register");
        pub const LOGIN: &str = v1_path!("/auth/login");
        pub const LOGOUT: &str = v1_path!("/auth/logout");
        pub const LOGOUT_ALL: &str = v1_path!("/auth/logout-all");
        pub const PASSWORD_RESET: &str = v1_path!("/auth/password-reset");
        pub const PASSWORD_RESET_CONFIRM: &str =
            v1_path!("/auth/password-reset/confirm");
    }

    pub mod users {
        pub const CURRENT: &str = v1_path!("/users/me");
        pub const CURRENT_PREFERENCES: &str = v1_path!("/users/me/preferences");
        pub const CHANGE_PASSWORD: &str = v1_path!("/users/me/password");
    }

    pub mod home {
        pub const NEWEST: &str = v1_path!("/home/newest");
        pub const RANDOM: &str = v1_path!("/home/random");
        pub const FAVORITES: &str = v1_path!("/home/favorites");
        pub const WATCHLIST: &str = v1_path!("/home/watchlist");
        pub const HISTORY: &str = v1_path!("/home/history");
    }

    pub mod shows {
        pub const COLLECTION: &str = v1_path!("/shows");
        pub const ITEM: &str = v1_path!("/shows/{id}");
        pub const USER_STATE: &str = v1_path!("/shows/{id}/user");
        pub const PROGRESS: &str = v1_path!("/shows/{id}/progress");
        pub const EPISODES: &str = v1_path!("/shows/{id}/episodes/{nav}");
        pub const FAVORITE: &str = v1_path!("/shows/{id}/favorite");
        pub const WATCHLIST: &str = v1_path!("/shows/{id}/watchlist");
    }

    pub mod artists {
        pub const COLLECTION: &str = v1_path!("/artists");
        pub const ITEM: &str = v1_path!("/artists/{id}");
    }

    pub mod countries {
        pub const COLLECTION: &str = v1_path!("/countries");
        pub const ITEM: &str = v1_path!("/countries/{id}");
    }

    /// Languages, genres, ratings and labels share one handler set keyed
    /// by the collection segment.
    pub mod taxonomy {
        pub const COLLECTION: &str = v1_path!("/catalog/{collection}");
        pub const ITEM: &str = v1_path!("/catalog/{collection}/{id}");
    }

    pub mod images {
        pub const UPLOAD: &str = v1_path!("/images/{collection}/{slot}/{id}");
    }

    /// Read-only mount for stored images. Not versioned.
    pub const MEDIA: &str = "/media";
}

/// Fill `{name}` placeholders in a route template.
pub fn fill(template: &str, params: &[(&str, &dyn std::fmt::Display)]) -> String {
    params.iter().fold(template.to_string(), |path, (name, value)| {
        path.replace(&format!("{{{name}}}"), &value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_placeholders() {
        assert_eq!(
            fill(v1::shows::EPISODES, &[("id", &7), ("nav", &"next")]),
            "/api/v1/shows/7/episodes/next"
        );
    }
}
