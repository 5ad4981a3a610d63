//! TOML configuration file parsing.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Deserialize a TOML file into `T`.
///
/// A missing file is treated as an empty document, so `T` must accept an
/// empty table (typically via `#[serde(default)]`).
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file exists but cannot be read, and
/// [`ConfigError::InvalidSyntax`] if it cannot be parsed into `T`.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return parse(path, "");
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse(path, &content)
}

fn parse<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::InvalidSyntax {
        file: path.display().to_string(),
        message: e.message().to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Sample {
        items: Vec<String>,
    }

    #[test]
    fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let sample: Sample = load_config(&dir.path().join("absent.toml")).unwrap();
        assert!(sample.items.is_empty());
    }

    #[test]
    fn parses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.toml");
        std::fs::write(&path, "items = [\"a\", \"b\"]\n").unwrap();
        let sample: Sample = load_config(&path).unwrap();
        assert_eq!(sample.items, ["a", "b"]);
    }

    #[test]
    fn syntax_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "items = [\n").unwrap();
        let err = load_config::<Sample>(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSyntax { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }
}
