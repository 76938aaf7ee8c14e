// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Settings file loader
//!
//! Reads a dotenv-style `KEY=VALUE` file into [`Settings`] without touching
//! the process environment.

use std::path::Path;

use crate::domain::config::{ConfigError, Settings};

/// Default settings file name, looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = ".env";

pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let unreadable = |message: String| ConfigError::Unreadable {
        path: path.to_path_buf(),
        message,
    };

    let entries = dotenvy::from_path_iter(path).map_err(|e| unreadable(e.to_string()))?;

    let mut pairs = Vec::new();
    for entry in entries {
        let (key, value) = entry.map_err(|e| unreadable(e.to_string()))?;
        pairs.push((key, value));
    }

    tracing::debug!("Loaded {} settings from {:?}", pairs.len(), path);

    Ok(Settings::from_pairs(pairs).with_source(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::keys;
    use std::io::Write;

    #[test]
    fn test_load_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# deployment settings").unwrap();
        writeln!(file, "GOOGLE_CLOUD_PROJECT=acme-prod").unwrap();
        writeln!(file, "AGENT_DISPLAY_NAME=\"Brand Aligner\"").unwrap();
        writeln!(file, "AGENT_ENGINE_ID=").unwrap();

        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.get(keys::PROJECT_ID), Some("acme-prod"));
        assert_eq!(settings.get(keys::DISPLAY_NAME), Some("Brand Aligner"));
        assert_eq!(settings.get(keys::ENGINE_ID), None);
        assert_eq!(settings.source(), Some(file.path()));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(dir.path().join("missing.env")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "GOOGLE_CLOUD_PROJECT='unterminated").unwrap();
        assert!(matches!(
            load_settings(file.path()),
            Err(ConfigError::Unreadable { .. })
        ));
    }
}
