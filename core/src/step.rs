/// One step of the memory module, and segment replay on top of it.
///
/// A step is: decode head parameters -> usage update -> allocation ->
/// content write addressing -> gated write weighting -> erase-then-add ->
/// link/precedence update -> forward/backward traversal -> content read
/// addressing on the updated bank -> read-mode mixture -> fetch.
///
/// Steps within a sequence are strictly ordered through the recurrent
/// state; batch entries are independent sequences. Every step either fully
/// succeeds or fails fast on a precondition violation; there are no
/// partial-failure semantics.

use crate::addressing::content_address;
use crate::interface::{decode, interface_width, DecodeError};
use crate::linkage::{backward_weights, forward_weights, update_linkage};
use crate::model::{ConfigError, DncConfig};
use crate::read_heads;
use crate::state::MemoryState;
use crate::usage::{allocation_weighting, update_usage};
use crate::write_head;

/// Fatal precondition violations for a step. Raised immediately, never
/// retried; numerical degeneracy is prevented structurally (epsilon guards
/// in addressing and usage) rather than surfaced here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    Config(ConfigError),
    Decode(DecodeError),
    /// The interface buffer holds a whole number of rows, but not the
    /// state's batch worth of them.
    BatchMismatch { state: usize, input: usize },
    /// The recurrent state was built for a different shape than `cfg`.
    StateShapeMismatch,
}

impl std::fmt::Display for StepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepError::Config(e) => write!(f, "{e}"),
            StepError::Decode(e) => write!(f, "{e}"),
            StepError::BatchMismatch { state, input } => {
                write!(f, "state batch size {state} does not match input batch size {input}")
            }
            StepError::StateShapeMismatch => {
                write!(f, "recurrent state shape does not match the configuration")
            }
        }
    }
}

impl From<DecodeError> for StepError {
    fn from(e: DecodeError) -> Self {
        StepError::Decode(e)
    }
}

impl From<ConfigError> for StepError {
    fn from(e: ConfigError) -> Self {
        StepError::Config(e)
    }
}

/// Advance the memory one step.
///
/// `interface` is the controller's flat parameter vector, B rows of
/// `interface_width(cfg)` values. Returns the concatenated read vectors
/// (B×R·M) and the next recurrent state. The input state is untouched.
pub fn step(
    cfg: &DncConfig,
    state: &MemoryState,
    interface: &[f32],
) -> Result<(Vec<f32>, MemoryState), StepError> {
    cfg.validate()?;
    if !state.shape_matches(cfg) {
        return Err(StepError::StateShapeMismatch);
    }

    let batch = state.batch_size;
    let n = cfg.mem_slots;
    let m = cfg.mem_dim;
    let r = cfg.read_heads;

    let width = interface_width(cfg);
    if interface.len() % width == 0 && interface.len() / width != batch {
        return Err(StepError::BatchMismatch { state: batch, input: interface.len() / width });
    }
    let params = decode(cfg, interface, batch)?;

    // Usage and allocation come first: both consume only previous-step
    // weightings plus this step's free gates.
    let usage = update_usage(
        &state.usage,
        &params.free_gates,
        &state.read_weights,
        &state.write_weights,
        batch,
        r,
        n,
        cfg.usage_epsilon,
    );
    let alloc = allocation_weighting(&usage, batch, n);

    // Write: content addressing against the pre-write bank, then the gated
    // erase-then-add.
    let write_content = content_address(
        &state.memory,
        &params.write_key,
        &params.write_strength,
        batch,
        1,
        n,
        m,
    );
    let (memory, write_w) = write_head::write(
        &state.memory,
        &write_content,
        &alloc,
        &params.write_gate,
        &params.allocation_gate,
        &params.erase,
        &params.write,
        batch,
        n,
        m,
    );

    // Temporal linkage reflects this step's write before any read happens.
    let (link, precedence) = update_linkage(&state.link, &state.precedence, &write_w, batch, n);
    let fw = forward_weights(&link, &state.read_weights, batch, r, n);
    let bw = backward_weights(&link, &state.read_weights, batch, r, n);

    // Reads see the updated bank.
    let read_content = content_address(
        &memory,
        &params.read_keys,
        &params.read_strengths,
        batch,
        r,
        n,
        m,
    );
    let (read_vectors, read_w) = read_heads::read(
        &memory,
        &bw,
        &read_content,
        &fw,
        &params.read_modes,
        batch,
        r,
        n,
        m,
    );

    let next = MemoryState {
        batch_size: batch,
        mem_slots: n,
        mem_dim: m,
        read_heads: r,
        memory,
        usage,
        read_weights: read_w,
        write_weights: write_w,
        link,
        precedence,
    };
    Ok((read_vectors, next))
}

/// Fold `step` over a segment of `steps` interface vectors.
///
/// `interfaces` holds `steps` consecutive B×width rows. Returns every
/// step's read vectors (steps×B×R·M, concatenated in step order) and the
/// final state. This is the burn-in primitive for truncated-BPTT training:
/// replay a segment from a stored state snapshot, then hand the final
/// state to the gradient-tracked pass.
pub fn step_sequence(
    cfg: &DncConfig,
    state: &MemoryState,
    interfaces: &[f32],
    steps: usize,
) -> Result<(Vec<f32>, MemoryState), StepError> {
    let block = interface_width(cfg) * state.batch_size;
    if interfaces.len() != steps * block {
        return Err(StepError::Decode(DecodeError::InterfaceWidthMismatch {
            expected: steps * block,
            found: interfaces.len(),
        }));
    }

    let mut outputs = Vec::with_capacity(steps * state.batch_size * cfg.read_heads * cfg.mem_dim);
    let mut current = state.clone();
    for t in 0..steps {
        let (read_vectors, next) = step(cfg, &current, &interfaces[t * block..(t + 1) * block])?;
        outputs.extend_from_slice(&read_vectors);
        current = next;
    }
    Ok((outputs, current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::SimpleRng;

    fn random_interface(cfg: &DncConfig, batch: usize, seed: u64) -> Vec<f32> {
        let mut rng = SimpleRng::new(seed);
        let mut raw = vec![0.0f32; batch * interface_width(cfg)];
        rng.fill_uniform(&mut raw, 1.0);
        raw
    }

    #[test]
    fn test_step_output_shapes() {
        let cfg = DncConfig::new(8, 3, 2);
        let state = MemoryState::reset(&cfg, 2);
        let raw = random_interface(&cfg, 2, 1);
        let (read_vectors, next) = step(&cfg, &state, &raw).unwrap();
        assert_eq!(read_vectors.len(), 2 * 2 * 3);
        assert!(next.shape_matches(&cfg));
        assert_eq!(next.batch_size, 2);
    }

    #[test]
    fn test_step_is_deterministic_and_pure() {
        let cfg = DncConfig::test_config();
        let state = MemoryState::reset(&cfg, 1);
        let raw = random_interface(&cfg, 1, 7);
        let snapshot = state.clone();
        let (v1, s1) = step(&cfg, &state, &raw).unwrap();
        let (v2, s2) = step(&cfg, &state, &raw).unwrap();
        assert_eq!(v1, v2);
        assert_eq!(s1, s2);
        assert_eq!(state, snapshot, "input state must not be mutated");
    }

    #[test]
    fn test_step_outputs_stay_finite() {
        let cfg = DncConfig::new(6, 4, 2);
        let mut state = MemoryState::reset(&cfg, 2);
        for t in 0..50 {
            let raw = random_interface(&cfg, 2, 100 + t);
            let (read_vectors, next) = step(&cfg, &state, &raw).unwrap();
            for &x in read_vectors.iter().chain(&next.usage).chain(&next.link) {
                assert!(x.is_finite(), "non-finite value at step {t}");
            }
            state = next;
        }
    }

    #[test]
    fn test_step_invariants_hold_over_time() {
        let cfg = DncConfig::new(5, 3, 1);
        let mut state = MemoryState::reset(&cfg, 1);
        let n = cfg.mem_slots;
        for t in 0..30 {
            let raw = random_interface(&cfg, 1, 900 + t);
            let (_, next) = step(&cfg, &state, &raw).unwrap();
            for &u in &next.usage {
                assert!(u >= 0.0 && u <= 1.0, "usage {u} escaped [0,1] at step {t}");
            }
            for i in 0..n {
                assert_eq!(next.link[i * n + i], 0.0, "diagonal at step {t}");
            }
            let wsum: f32 = next.write_weights.iter().sum();
            assert!(wsum <= 1.0 + 1e-5, "write weighting sums to {wsum} at step {t}");
            state = next;
        }
    }

    #[test]
    fn test_wrong_width_fails_fast() {
        let cfg = DncConfig::test_config();
        let state = MemoryState::reset(&cfg, 1);
        let raw = vec![0.0f32; interface_width(&cfg) - 1];
        match step(&cfg, &state, &raw) {
            Err(StepError::Decode(DecodeError::InterfaceWidthMismatch { .. })) => {}
            other => panic!("expected width mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_batch_mismatch_fails_fast() {
        let cfg = DncConfig::test_config();
        let state = MemoryState::reset(&cfg, 2);
        let raw = vec![0.0f32; interface_width(&cfg)]; // one row, state wants two
        assert_eq!(
            step(&cfg, &state, &raw),
            Err(StepError::BatchMismatch { state: 2, input: 1 })
        );
    }

    #[test]
    fn test_state_shape_mismatch_fails_fast() {
        let cfg = DncConfig::test_config();
        let other = DncConfig::new(8, 2, 1);
        let state = MemoryState::reset(&other, 1);
        let raw = vec![0.0f32; interface_width(&cfg)];
        assert_eq!(step(&cfg, &state, &raw), Err(StepError::StateShapeMismatch));
    }

    #[test]
    fn test_multiple_write_heads_rejected() {
        let mut cfg = DncConfig::test_config();
        cfg.write_heads = 2;
        let state = MemoryState::reset(&cfg, 1);
        let raw = vec![0.0f32; interface_width(&cfg)];
        match step(&cfg, &state, &raw) {
            Err(StepError::Config(ConfigError::UnsupportedWriteHeads { requested: 2 })) => {}
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_sequence_matches_manual_fold() {
        let cfg = DncConfig::new(6, 2, 1);
        let state = MemoryState::reset(&cfg, 1);
        let width = interface_width(&cfg);
        let steps = 4;
        let raw = random_interface(&cfg, steps, 5); // steps rows, batch 1

        let (seq_out, seq_state) = step_sequence(&cfg, &state, &raw, steps).unwrap();

        let mut manual = state.clone();
        let mut manual_out = Vec::new();
        for t in 0..steps {
            let (v, next) = step(&cfg, &manual, &raw[t * width..(t + 1) * width]).unwrap();
            manual_out.extend_from_slice(&v);
            manual = next;
        }
        assert_eq!(seq_out, manual_out);
        assert_eq!(seq_state, manual);
    }

    #[test]
    fn test_sequence_length_check() {
        let cfg = DncConfig::test_config();
        let state = MemoryState::reset(&cfg, 1);
        let raw = vec![0.0f32; interface_width(&cfg)];
        assert!(step_sequence(&cfg, &state, &raw, 2).is_err());
    }
}
