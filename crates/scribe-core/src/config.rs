//! View cache configuration.
//!
//! The cache is an explicit component with constructor-injected settings:
//! nothing reads these values lazily at first use. Invalid settings abort
//! startup before any cache exists.

use crate::error::{Error, Result};

/// Default TTL-after-write for notebook views, in minutes.
pub const DEFAULT_NOTEBOOK_TTL_MINUTES: u64 = 10;

/// Default TTL-after-write for note views, in minutes.
pub const DEFAULT_NOTE_TTL_MINUTES: u64 = 10;

/// Default maximum entry count for the notebook cache.
pub const DEFAULT_NOTEBOOK_MAX_ENTRIES: u64 = 1_000;

/// Default maximum entry count for the note cache.
pub const DEFAULT_NOTE_MAX_ENTRIES: u64 = 10_000;

/// Settings for the two view caches.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub notebook_ttl_minutes: u64,
    pub note_ttl_minutes: u64,
    pub notebook_max_entries: u64,
    pub note_max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            notebook_ttl_minutes: DEFAULT_NOTEBOOK_TTL_MINUTES,
            note_ttl_minutes: DEFAULT_NOTE_TTL_MINUTES,
            notebook_max_entries: DEFAULT_NOTEBOOK_MAX_ENTRIES,
            note_max_entries: DEFAULT_NOTE_MAX_ENTRIES,
        }
    }
}

impl CacheConfig {
    /// Load from the environment, falling back to defaults.
    ///
    /// Reads:
    /// - `CACHE_NOTEBOOK_TTL_MINUTES`
    /// - `CACHE_NOTE_TTL_MINUTES`
    /// - `CACHE_NOTEBOOK_MAX_ENTRIES`
    /// - `CACHE_NOTE_MAX_ENTRIES`
    ///
    /// Unparsable or non-positive values fail here, at startup.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            notebook_ttl_minutes: read_env(
                "CACHE_NOTEBOOK_TTL_MINUTES",
                DEFAULT_NOTEBOOK_TTL_MINUTES,
            )?,
            note_ttl_minutes: read_env("CACHE_NOTE_TTL_MINUTES", DEFAULT_NOTE_TTL_MINUTES)?,
            notebook_max_entries: read_env(
                "CACHE_NOTEBOOK_MAX_ENTRIES",
                DEFAULT_NOTEBOOK_MAX_ENTRIES,
            )?,
            note_max_entries: read_env("CACHE_NOTE_MAX_ENTRIES", DEFAULT_NOTE_MAX_ENTRIES)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings under which no usable cache can be built.
    pub fn validate(&self) -> Result<()> {
        if self.notebook_ttl_minutes == 0 {
            return Err(Error::Config(
                "CACHE_NOTEBOOK_TTL_MINUTES must be positive".to_string(),
            ));
        }
        if self.note_ttl_minutes == 0 {
            return Err(Error::Config(
                "CACHE_NOTE_TTL_MINUTES must be positive".to_string(),
            ));
        }
        if self.notebook_max_entries == 0 {
            return Err(Error::Config(
                "CACHE_NOTEBOOK_MAX_ENTRIES must be positive".to_string(),
            ));
        }
        if self.note_max_entries == 0 {
            return Err(Error::Config(
                "CACHE_NOTE_MAX_ENTRIES must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn read_env(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{name} must be a positive integer, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CacheConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_ttl_is_rejected() {
        let config = CacheConfig {
            notebook_ttl_minutes: 0,
            ..CacheConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("CACHE_NOTEBOOK_TTL_MINUTES"));
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let config = CacheConfig {
            note_max_entries: 0,
            ..CacheConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("CACHE_NOTE_MAX_ENTRIES"));
    }
}
