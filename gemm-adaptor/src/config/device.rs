use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Static limits of the device GEMM kernels are launched on.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct DeviceDescription {
    pub name: String,
    /// Number of streaming multiprocessors (or equivalent compute cores).
    pub core_count: u32,
    pub max_threads_per_block: u32,
    pub max_threads_per_core: u32,
    pub max_blocks_per_core: u32,
    pub shared_memory_per_block: usize,
    pub shared_memory_per_core: usize,
}

impl DeviceDescription {
    pub fn reference() -> Self {
        Self {
            name: "reference".to_string(),
            core_count: 128,
            max_threads_per_block: 1024,
            max_threads_per_core: 2048,
            max_blocks_per_core: 32,
            shared_memory_per_block: 49152,
            shared_memory_per_core: 102400,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let description: Self = serde_json::from_str(json)?;
        description.validate()?;
        Ok(description)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("core_count", self.core_count),
            ("max_threads_per_block", self.max_threads_per_block),
            ("max_threads_per_core", self.max_threads_per_core),
            ("max_blocks_per_core", self.max_blocks_per_core),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be positive".to_string(),
                });
            }
        }
        if self.max_threads_per_block > self.max_threads_per_core {
            return Err(ConfigError::InvalidValue {
                field: "max_threads_per_block",
                reason: format!("exceeds max_threads_per_core ({})", self.max_threads_per_core),
            });
        }
        if self.shared_memory_per_block > self.shared_memory_per_core {
            return Err(ConfigError::InvalidValue {
                field: "shared_memory_per_block",
                reason: format!("exceeds shared_memory_per_core ({})", self.shared_memory_per_core),
            });
        }
        Ok(())
    }
}

impl Default for DeviceDescription {
    fn default() -> Self {
        Self::reference()
    }
}
