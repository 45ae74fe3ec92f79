use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::consts::APP_NAME;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) log_dir: Option<PathBuf>,
    #[serde(default)]
    pub(crate) no_git: bool,
    #[serde(default)]
    pub(crate) git_timeout_secs: Option<u64>,
    #[serde(default)]
    pub(crate) no_lock: bool,
    #[serde(default)]
    pub(crate) quiet: bool,
    #[serde(default)]
    pub(crate) debug: bool,
    #[serde(default)]
    pub(crate) lanes: Option<Vec<String>>,
}

/// Result of config discovery. Diagnostics are kept until logging is up.
#[derive(Debug, Default)]
pub(crate) struct LoadedConfig {
    pub(crate) config: Config,
    pub(crate) source: Option<PathBuf>,
    pub(crate) warnings: Vec<String>,
}

impl Config {
    /// Load from `explicit` if given, else from the first parseable default location
    pub(crate) fn load(explicit: Option<&Path>) -> LoadedConfig {
        match explicit {
            Some(path) => Self::load_from_paths(&[path.to_path_buf()], true),
            None => Self::load_from_paths(&Self::get_config_paths(), false),
        }
    }

    fn load_from_paths(paths: &[PathBuf], required: bool) -> LoadedConfig {
        let mut loaded = LoadedConfig::default();

        for path in paths {
            if !path.exists() {
                if required {
                    loaded
                        .warnings
                        .push(format!("Config file {} not found", path.display()));
                }
                continue;
            }
            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    loaded
                        .warnings
                        .push(format!("Failed to read {}: {}", path.display(), e));
                    continue;
                }
            };
            match toml::from_str::<Config>(&content) {
                Ok(config) => {
                    loaded.config = config;
                    loaded.source = Some(path.clone());
                    return loaded;
                }
                Err(e) => {
                    loaded
                        .warnings
                        .push(format!("Failed to parse {}: {}", path.display(), e));
                }
            }
        }

        loaded
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/session-capture/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join(APP_NAME).join("config.toml"));
        }

        // 2. Platform config dir (e.g. ~/Library/Application Support on macOS)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join(APP_NAME).join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.session-capture.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(format!(".{APP_NAME}.toml")));
        }

        paths
    }
}
