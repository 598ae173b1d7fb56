//! Defaults shared by the loader and the guard rails.

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MEDIA_ROOT: &str = "./media";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_SESSION_LIFETIME_HOURS: i64 = 24 * 14;

/// Placeholder secrets. Accepted only in dev mode.
pub const DEFAULT_PASSWORD_PEPPER: &str = "simsy-dev-password-pepper";
pub const DEFAULT_TOKEN_KEY: &str = "simsy-dev-token-key";

pub const MIN_SECRET_LENGTH: usize = 32;

pub const DEFAULT_CONFIG_LOCATIONS: [&str; 2] = ["simsy.toml", "config/simsy.toml"];
