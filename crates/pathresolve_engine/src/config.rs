use serde::Deserialize;
use tracing::{debug, instrument};

use pathresolve_base::{ErrorKind, FilePath, PalHandle, PathResolveError, PathResolveResult};

use crate::enumerator::ScanOptions;

/// Name of the optional configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "pathresolve.toml";

/// Settings read from `pathresolve.toml`.
///
/// Every field is optional; a missing file is the same as an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Match pattern leaves ignoring case. Defaults to the platform convention.
    pub case_insensitive: Option<bool>,
    /// Run every listed match through the file validator and annotate the line.
    pub validate_matches: bool,
}

impl Config {
    pub fn scan_options(&self) -> ScanOptions {
        let mut options = ScanOptions::default();
        if let Some(case_insensitive) = self.case_insensitive {
            options.case_insensitive = case_insensitive;
        }
        options
    }
}

/// Read and parse the configuration file at `path`.
#[instrument(skip(pal), fields(path = %path))]
pub fn load_config(pal: &PalHandle, path: &FilePath) -> PathResolveResult<Config> {
    let text = pal.read_file_to_string(path)?;
    let config = toml::from_str::<Config>(&text).map_err(|e| {
        Box::new(PathResolveError::new(ErrorKind::Config {
            path: path.as_path().to_path_buf(),
            message: e.message().to_string(),
        }))
    })?;
    debug!(?config, "configuration loaded");
    Ok(config)
}

/// Like [`load_config`], but a missing file yields the default configuration.
pub fn load_config_or_default(pal: &PalHandle, path: &FilePath) -> PathResolveResult<Config> {
    match load_config(pal, path) {
        Err(error) if error.is_not_found() => {
            debug!(%path, "no configuration file, using defaults");
            Ok(Config::default())
        }
        result => result,
    }
}
