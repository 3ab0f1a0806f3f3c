use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the call site of a guarded operation for logging.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationContext {
    /// Service family, e.g. `"weather"` or `"ai"`.
    pub service: String,
    /// Operation within the service, e.g. `"getCurrentWeather"`.
    pub operation: String,
}

impl OperationContext {
    pub fn new(service: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            operation: operation.into(),
        }
    }
}

impl fmt::Display for OperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.service, self.operation)
    }
}
