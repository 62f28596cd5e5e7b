use std::sync::Arc;

use anyhow::{Context, Result};

use planweave_core::api::{
    Operation, OperationConfig, OperationKind, OperationRegistry, Oracle, OracleConfig,
};

use crate::operations::{CommandOperation, HttpOperation};
use crate::oracle::HttpOracle;

pub fn build_oracle(cfg: &OracleConfig) -> Result<Arc<dyn Oracle>> {
    Ok(Arc::new(HttpOracle::from_config(cfg)?))
}

pub fn build_operation(cfg: &OperationConfig) -> Result<Arc<dyn Operation>> {
    let op: Arc<dyn Operation> = match &cfg.kind {
        OperationKind::Http(http) => Arc::new(
            HttpOperation::new(&cfg.name, &cfg.description, http)
                .with_context(|| format!("failed to build http operation {}", cfg.name))?,
        ),
        OperationKind::Command(command) => {
            Arc::new(CommandOperation::new(&cfg.name, &cfg.description, command))
        }
    };
    Ok(op)
}

/// Registry in config order, so prompt numbering follows the file.
pub fn build_registry(ops: &[OperationConfig]) -> Result<OperationRegistry> {
    let built = ops.iter().map(build_operation).collect::<Result<Vec<_>>>()?;
    Ok(OperationRegistry::new(built)?)
}
