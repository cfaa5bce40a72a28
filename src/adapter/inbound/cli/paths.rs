//! Default file locations.

use std::path::PathBuf;

/// Returns the default config file path (`./config.toml`).
#[must_use]
pub fn default_config() -> PathBuf {
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_relative() {
        assert!(default_config().is_relative());
        assert_eq!(default_config().file_name().unwrap(), "config.toml");
    }
}
