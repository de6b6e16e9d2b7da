/// Memory module configuration.
///
/// Immutable after construction. The surrounding recurrent controller is not
/// part of this crate; it talks to the module through the flat interface
/// vector (see `interface.rs`) and the recurrent state bundle (`state.rs`).

use serde::{Serialize, Deserialize};

/// Epsilon used to guard cosine-similarity norms during addressing.
pub const ADDRESSING_EPS: f32 = 1e-8;

/// Default boundary clamp for the usage vector: u <- eps + (1-eps)*u.
pub const DEFAULT_USAGE_EPS: f32 = 5e-3;

/// Configuration error raised at construction time, never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The erase-then-add composition is only defined here for one write head.
    UnsupportedWriteHeads { requested: usize },
    /// Slot count, feature width and read-head count must all be non-zero.
    ZeroDimension { field: &'static str },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnsupportedWriteHeads { requested } => {
                write!(f, "exactly one write head is supported, {requested} requested")
            }
            ConfigError::ZeroDimension { field } => {
                write!(f, "{field} must be non-zero")
            }
        }
    }
}

/// Shape and numerics of the memory module.
///
/// `mem_slots` = N addressable rows, `mem_dim` = M features per row,
/// `read_heads` = R. `write_heads` is carried for interface symmetry with the
/// head-parameter layout but must be exactly 1 (`validate`).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DncConfig {
    pub mem_slots: usize,
    pub mem_dim: usize,
    pub read_heads: usize,
    pub write_heads: usize,
    /// Boundary clamp applied to the previous usage vector before the usage
    /// update. The continuous relaxation needs it away from exact 0/1 for
    /// gradient flow; 0.0 makes allocation exactly one-hot on a fresh bank.
    pub usage_epsilon: f32,
}

impl DncConfig {
    pub fn new(mem_slots: usize, mem_dim: usize, read_heads: usize) -> Self {
        DncConfig {
            mem_slots,
            mem_dim,
            read_heads,
            write_heads: 1,
            usage_epsilon: DEFAULT_USAGE_EPS,
        }
    }

    /// Fail-fast precondition check. Call once before stepping.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.write_heads != 1 {
            return Err(ConfigError::UnsupportedWriteHeads { requested: self.write_heads });
        }
        if self.mem_slots == 0 {
            return Err(ConfigError::ZeroDimension { field: "mem_slots" });
        }
        if self.mem_dim == 0 {
            return Err(ConfigError::ZeroDimension { field: "mem_dim" });
        }
        if self.read_heads == 0 {
            return Err(ConfigError::ZeroDimension { field: "read_heads" });
        }
        Ok(())
    }

    /// Test configuration: tiny bank for fast iteration.
    pub fn test_config() -> Self {
        DncConfig::new(4, 2, 1)
    }
}
