use std::path::{Path, PathBuf};

use super::types::AppConfig;

pub const ENV_ORACLE_URL: &str = "PLANWEAVE_ORACLE_URL";
pub const ENV_ORACLE_API_KEY: &str = "PLANWEAVE_ORACLE_API_KEY";
pub const ENV_MAX_REPLANS: &str = "PLANWEAVE_MAX_REPLANS";

/// Get the default data directory: ~/.planweave
pub fn get_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".planweave"))
}

pub fn load_from_path(path: impl AsRef<Path>) -> anyhow::Result<AppConfig> {
    let path = path.as_ref();
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config {}: {e}", path.display()))?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
    Ok(cfg)
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.planweave/config.toml
    let data_dir = get_data_dir()?;
    let user_config = data_dir.join("config.toml");

    // Priority 2: ./config.toml
    let local_config = Path::new("config.toml");

    let mut cfg = if user_config.exists() {
        load_from_path(&user_config)?
    } else if local_config.exists() {
        load_from_path(local_config)?
    } else {
        AppConfig::default()
    };

    if cfg.logging.file
        && cfg
            .logging
            .directory
            .as_ref()
            .map_or(true, |s| s.trim().is_empty())
    {
        let logs_dir = data_dir.join("logs");
        std::fs::create_dir_all(&logs_dir)?;
        cfg.logging.directory = Some(logs_dir.to_string_lossy().to_string());
    }

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    Ok(cfg)
}

/// Environment overrides (highest priority). Empty values are ignored.
pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(ENV_ORACLE_URL) {
        cfg.oracle.base_url = v;
    }
    if let Some(v) = get(ENV_ORACLE_API_KEY) {
        cfg.oracle.api_key = v;
    }
    if let Some(v) = get(ENV_MAX_REPLANS) {
        cfg.compiler.max_replans = v
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{ENV_MAX_REPLANS} must be a positive integer, got {v:?}"))?;
    }
    Ok(())
}
