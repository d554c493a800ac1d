use std::path::{Path, PathBuf};

use crate::errors::ConfigError;

use super::types::AppConfig;

pub const CONFIG_FILE_NAME: &str = "polsift.toml";

/// Loads the config from `path`, or from `polsift.toml` in the working
/// directory when no path is given, then applies environment overrides.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut cfg = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound(p.to_path_buf()));
            }
            read_file(p)?
        }
        None if Path::new(CONFIG_FILE_NAME).exists() => read_file(Path::new(CONFIG_FILE_NAME))?,
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    expand_paths(&mut cfg);
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<AppConfig, ConfigError> {
    let mut cfg = toml::from_str::<AppConfig>(s).map_err(ConfigError::Parse)?;
    expand_paths(&mut cfg);
    cfg.validate()?;
    Ok(cfg)
}

fn read_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<AppConfig>(&s).map_err(ConfigError::Parse)
}

fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("POLSIFT_SAVED_ROOT") {
        cfg.paths.saved_root = PathBuf::from(v);
    }
    if let Some(v) = non_empty("POLSIFT_FILTERED_ROOT") {
        cfg.paths.filtered_root = PathBuf::from(v);
    }
    if let Some(v) = non_empty("POLSIFT_QUARANTINE_ROOT") {
        cfg.paths.quarantine_root = PathBuf::from(v);
    }
    if let Some(v) = non_empty("POLSIFT_CHECKER_WORKDIR") {
        cfg.checker.workdir = PathBuf::from(v);
    }
    if let Some(v) = non_empty("POLSIFT_CHECKER_TIMEOUT_SECS") {
        cfg.checker.timeout_secs = v.trim().parse().map_err(|_| ConfigError::EnvInvalid {
            key: "POLSIFT_CHECKER_TIMEOUT_SECS".to_string(),
            value: v.clone(),
        })?;
    }
    Ok(())
}

fn expand_paths(cfg: &mut AppConfig) {
    let expand = |p: &mut PathBuf| {
        if let Some(s) = p.to_str() {
            let expanded = shellexpand::tilde(s).into_owned();
            *p = PathBuf::from(expanded);
        }
    };
    expand(&mut cfg.paths.saved_root);
    expand(&mut cfg.paths.filtered_root);
    expand(&mut cfg.paths.quarantine_root);
    expand(&mut cfg.paths.index_file);
    expand(&mut cfg.checker.workdir);
    expand(&mut cfg.checker.log_path);
    if let Some(file) = cfg.logging.file.as_mut() {
        expand(file);
    }
}
