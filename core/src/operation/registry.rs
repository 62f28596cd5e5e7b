use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::RegistryError;

use super::traits::Operation;

/// Reserved name of the synchronising sentinel task.
pub const JOIN_OPERATION: &str = "join";

/// Returns true for names matching `[A-Za-z0-9_]+`.
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Name-indexed operation set, validated when built.
///
/// Registration order is kept so the planning prompt numbers operations the
/// same way on every run.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    ops: Vec<Arc<dyn Operation>>,
    by_name: HashMap<String, usize>,
}

impl OperationRegistry {
    pub fn new(ops: Vec<Arc<dyn Operation>>) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for op in ops {
            registry.register(op)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, op: Arc<dyn Operation>) -> Result<(), RegistryError> {
        let name = op.name().to_string();
        if name == JOIN_OPERATION {
            return Err(RegistryError::ReservedName(name));
        }
        if !is_identifier(&name) {
            return Err(RegistryError::InvalidName(name));
        }
        if self.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateOperation(name));
        }
        self.by_name.insert(name, self.ops.len());
        self.ops.push(op);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Operation>> {
        self.by_name.get(name).map(|&i| &self.ops[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Operation>> {
        self.ops.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.ops.iter().map(|op| op.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operations", &self.names())
            .finish()
    }
}
