pub mod plan;
pub mod prompt;
pub mod run;

use std::path::Path;

use planweave_core::api::{load_default, load_from_path, AppConfig, OperationRegistry};
use planweave_core::config::apply_env_overrides;

use crate::error::CliError;

pub use plan::plan_cmd;
pub use prompt::prompt_cmd;
pub use run::run_cmd;

/// Explicit `--config` path (plus env overrides), else the default search.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, CliError> {
    let cfg = match path {
        Some(path) => {
            let mut cfg = load_from_path(path).map_err(|e| CliError::Config(format!("{e:#}")))?;
            apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())
                .map_err(|e| CliError::Config(format!("{e:#}")))?;
            cfg
        }
        None => load_default().map_err(|e| CliError::Config(format!("{e:#}")))?,
    };
    Ok(cfg)
}

pub(crate) fn registry_from_config(cfg: &AppConfig) -> Result<OperationRegistry, CliError> {
    planweave_plugins::factory::build_registry(&cfg.operations)
        .map_err(|e| CliError::Config(format!("{e:#}")))
}

/// Whole file, or stdin for `-`.
pub(crate) fn read_input(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut text)?;
        return Ok(text);
    }
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_config_path_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[compiler]\nmax_replans = 4\n").unwrap();
        let cfg = load_config(Some(file.path())).unwrap();
        assert_eq!(cfg.compiler.max_replans, 4);
    }

    #[test]
    fn missing_config_path_is_a_config_error() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert_eq!(err.exit_code(), 11);
    }
}
