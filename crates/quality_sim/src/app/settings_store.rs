use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use render_quality::GraphicsConfig;
use thiserror::Error;
use tracing::info;

use super::atomic_io::write_text_atomic;

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings {path}{location}: {source}")]
    Parse {
        path: PathBuf,
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write settings {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Missing file yields defaults; anything else that goes wrong is an error.
pub(crate) fn load_or_default(path: &Path) -> Result<GraphicsConfig, SettingsError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "settings_missing_using_defaults");
            return Ok(GraphicsConfig::default());
        }
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = parse_settings_json(&raw).map_err(|(location, source)| SettingsError::Parse {
        path: path.to_path_buf(),
        location,
        source,
    })?;
    info!(path = %path.display(), preset = %config.preset, "settings_loaded");
    Ok(config)
}

pub(crate) fn save(path: &Path, config: &GraphicsConfig) -> Result<(), SettingsError> {
    let mut text = serde_json::to_string_pretty(config).map_err(SettingsError::Encode)?;
    text.push('\n');
    write_text_atomic(path, &text).map_err(|source| SettingsError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), preset = %config.preset, "settings_saved");
    Ok(())
}

fn parse_settings_json(raw: &str) -> Result<GraphicsConfig, (String, serde_json::Error)> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, GraphicsConfig>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        let location = if path.is_empty() || path == "." {
            String::new()
        } else {
            format!(" at {path}")
        };
        (location, error.into_inner())
    })
}
