use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Name of the optional parameter override file, looked up beside the data.
pub const PARAMS_FILE: &str = "params.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Path of the parameter file that applies to `data_path`.
pub fn params_path_for(data_path: &Path) -> PathBuf {
    match data_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(PARAMS_FILE),
        _ => PathBuf::from(PARAMS_FILE),
    }
}

/// Load experiment parameters from `path`, or defaults if the file is absent.
///
/// Parameter structs are `#[serde(default)]`, so the file only needs the
/// values that differ from the built-in constants.
pub fn load_params<T: DeserializeOwned + Default>(path: &Path) -> Result<T, ConfigError> {
    if !path.is_file() {
        log::debug!("No {} found, using built-in constants", path.display());
        return Ok(T::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let params = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Loaded parameters from {}", path.display());
    Ok(params)
}
