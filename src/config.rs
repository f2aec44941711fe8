// Service configuration
use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub currency: String,
    pub recent_cities_limit: usize,
    pub default_avatar_url: String,
    pub max_guests_per_booking: u32,
    pub max_images_per_room: usize,
    // When false, only users already marked as owners may register hotels
    pub owner_self_registration: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            recent_cities_limit: 10,
            default_avatar_url: "https://avatars.githubusercontent.com/u/1?v=4".to_string(),
            max_guests_per_booking: 10,
            max_images_per_room: 4,
            owner_self_registration: true,
        }
    }
}

impl ServiceConfig {
    /// Builds a config from `HOTEL_*` environment variables, keeping the
    /// default for anything unset or unparseable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            currency: load(&lookup, "HOTEL_CURRENCY", defaults.currency),
            recent_cities_limit: load_nonzero(
                &lookup,
                "HOTEL_RECENT_CITIES_LIMIT",
                defaults.recent_cities_limit,
            ),
            default_avatar_url: load(
                &lookup,
                "HOTEL_DEFAULT_AVATAR_URL",
                defaults.default_avatar_url,
            ),
            max_guests_per_booking: load_nonzero(
                &lookup,
                "HOTEL_MAX_GUESTS_PER_BOOKING",
                defaults.max_guests_per_booking,
            ),
            max_images_per_room: load(
                &lookup,
                "HOTEL_MAX_IMAGES_PER_ROOM",
                defaults.max_images_per_room,
            ),
            owner_self_registration: load(
                &lookup,
                "HOTEL_OWNER_SELF_REGISTRATION",
                defaults.owner_self_registration,
            ),
        }
    }

    /// Limits that would turn every request into a rejection are refused.
    pub fn validate(&self) -> Result<(), String> {
        if self.recent_cities_limit == 0 {
            return Err("recent_cities_limit must be at least 1".to_string());
        }
        if self.max_guests_per_booking == 0 {
            return Err("max_guests_per_booking must be at least 1".to_string());
        }
        Ok(())
    }

    // Replaces zero limits with their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.recent_cities_limit == 0 {
            warn!(
                "recent_cities_limit of 0 ignored, using default: {}",
                defaults.recent_cities_limit
            );
            self.recent_cities_limit = defaults.recent_cities_limit;
        }
        if self.max_guests_per_booking == 0 {
            warn!(
                "max_guests_per_booking of 0 ignored, using default: {}",
                defaults.max_guests_per_booking
            );
            self.max_guests_per_booking = defaults.max_guests_per_booking;
        }
        self
    }
}

fn load_nonzero<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display + Default + PartialEq + Copy,
    T::Err: Display,
{
    let value = load(lookup, key, default);
    if value == T::default() {
        warn!("{key} must be at least 1, using default: {default}");
        return default;
    }
    value
}

fn load<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default: {default}");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = ServiceConfig::from_lookup(|_| None);
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.recent_cities_limit, 10);
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("HOTEL_CURRENCY", "INR"),
            ("HOTEL_RECENT_CITIES_LIMIT", " 5 "),
            ("HOTEL_MAX_GUESTS_PER_BOOKING", "many"),
            ("HOTEL_OWNER_SELF_REGISTRATION", "false"),
        ]);

        let config = ServiceConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.currency, "INR");
        assert_eq!(config.recent_cities_limit, 5);
        assert_eq!(config.max_guests_per_booking, 10);
        assert!(!config.owner_self_registration);
    }

    #[test]
    fn test_zero_limits_fall_back_to_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("HOTEL_RECENT_CITIES_LIMIT", "0"),
            ("HOTEL_MAX_GUESTS_PER_BOOKING", "0"),
        ]);

        let config = ServiceConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.recent_cities_limit, 10);
        assert_eq!(config.max_guests_per_booking, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_and_sanitize() {
        let config = ServiceConfig {
            max_guests_per_booking: 0,
            currency: "EUR".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let fixed = config.sanitized();
        assert_eq!(fixed.max_guests_per_booking, 10);
        assert_eq!(fixed.currency, "EUR");
        assert!(fixed.validate().is_ok());
    }
}
