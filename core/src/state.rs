/// Recurrent memory state: the tensors threaded from one step to the next.
///
/// Created zeroed at sequence start, replaced wholesale by every step, and
/// discarded (or serialized by the caller) at sequence end. The previous
/// step's write weighting rides along because the usage update consumes it;
/// it is never exposed as a step output.
///
/// Shape metadata is stored next to the buffers so a deserialized blob can
/// be checked against the module configuration before any arithmetic.

use serde::{Serialize, Deserialize};

use crate::model::DncConfig;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    pub batch_size: usize,
    pub mem_slots: usize,
    pub mem_dim: usize,
    pub read_heads: usize,
    /// Bank contents, B×N×M.
    pub memory: Vec<f32>,
    /// Occupancy per slot, B×N.
    pub usage: Vec<f32>,
    /// Previous step's read weightings, B×R×N.
    pub read_weights: Vec<f32>,
    /// Previous step's write weighting, B×N (one write head).
    pub write_weights: Vec<f32>,
    /// Temporal link matrix, B×N×N.
    pub link: Vec<f32>,
    /// Precedence weighting, B×N.
    pub precedence: Vec<f32>,
}

impl MemoryState {
    /// Zeroed state for `batch_size` independent sequences. Entered at
    /// sequence start and after an explicit reset; never between steps of
    /// the same sequence.
    pub fn reset(cfg: &DncConfig, batch_size: usize) -> Self {
        let n = cfg.mem_slots;
        let m = cfg.mem_dim;
        let r = cfg.read_heads;
        MemoryState {
            batch_size,
            mem_slots: n,
            mem_dim: m,
            read_heads: r,
            memory: vec![0.0f32; batch_size * n * m],
            usage: vec![0.0f32; batch_size * n],
            read_weights: vec![0.0f32; batch_size * r * n],
            write_weights: vec![0.0f32; batch_size * n],
            link: vec![0.0f32; batch_size * n * n],
            precedence: vec![0.0f32; batch_size * n],
        }
    }

    /// True when the stored shape metadata matches `cfg` and every buffer
    /// has the length its shape implies.
    pub fn shape_matches(&self, cfg: &DncConfig) -> bool {
        let n = self.mem_slots;
        let m = self.mem_dim;
        let r = self.read_heads;
        let b = self.batch_size;
        n == cfg.mem_slots
            && m == cfg.mem_dim
            && r == cfg.read_heads
            && self.memory.len() == b * n * m
            && self.usage.len() == b * n
            && self.read_weights.len() == b * r * n
            && self.write_weights.len() == b * n
            && self.link.len() == b * n * n
            && self.precedence.len() == b * n
    }
}

/// Write the recurrent state as a JSON blob. Persistence across process
/// boundaries is the caller's responsibility; this is the blob format.
pub fn save_state(path: &std::path::Path, state: &MemoryState) -> std::io::Result<()> {
    let json = serde_json::to_string(state)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, json)
}

/// Read a recurrent state blob back. Shape metadata travels inside the blob;
/// validate with `MemoryState::shape_matches` before stepping.
pub fn load_state(path: &std::path::Path) -> std::io::Result<MemoryState> {
    let json = std::fs::read_to_string(path)?;
    serde_json::from_str(&json)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_is_all_zero() {
        let cfg = DncConfig::test_config();
        let state = MemoryState::reset(&cfg, 3);
        assert!(state.memory.iter().all(|&x| x == 0.0));
        assert!(state.usage.iter().all(|&x| x == 0.0));
        assert!(state.read_weights.iter().all(|&x| x == 0.0));
        assert!(state.write_weights.iter().all(|&x| x == 0.0));
        assert!(state.link.iter().all(|&x| x == 0.0));
        assert!(state.precedence.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_reset_shapes() {
        let cfg = DncConfig::new(8, 3, 2);
        let state = MemoryState::reset(&cfg, 2);
        assert_eq!(state.memory.len(), 2 * 8 * 3);
        assert_eq!(state.usage.len(), 2 * 8);
        assert_eq!(state.read_weights.len(), 2 * 2 * 8);
        assert_eq!(state.write_weights.len(), 2 * 8);
        assert_eq!(state.link.len(), 2 * 8 * 8);
        assert_eq!(state.precedence.len(), 2 * 8);
        assert!(state.shape_matches(&cfg));
    }

    #[test]
    fn test_shape_mismatch_detected() {
        let cfg = DncConfig::test_config();
        let state = MemoryState::reset(&cfg, 1);
        let other = DncConfig::new(8, 2, 1);
        assert!(!state.shape_matches(&other));

        let mut truncated = MemoryState::reset(&cfg, 1);
        truncated.link.pop();
        assert!(!truncated.shape_matches(&cfg));
    }
}
