mod load;
mod types;

pub use load::{
    apply_env_overrides, get_data_dir, load_default, load_from_path, ENV_MAX_REPLANS,
    ENV_ORACLE_API_KEY, ENV_ORACLE_URL,
};
pub use types::{
    AppConfig, CommandOperationConfig, CompilerSection, HttpOperationConfig, JoinerSection,
    LoggingConfig, OperationConfig, OperationKind, OracleConfig, PlannerSection,
    SchedulerSection,
};
