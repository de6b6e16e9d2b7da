/// Interface decoder: splits the controller's flat parameter vector into
/// named, activated head-parameter fields.
///
/// Field order and activations (per batch row, widths for R read heads and
/// feature width M):
///
///   read keys        R*M   tanh
///   read strengths   R     softplus (no "+1" offset)
///   write key        M     tanh
///   write strength   1     softplus
///   erase vector     M     sigmoid
///   write vector     M     identity (slot contents are unbounded reals)
///   allocation gate  1     sigmoid
///   write gate       1     sigmoid
///   free gates       R     sigmoid
///   read modes       3*R   softmax over the 3 modes, per head
///
/// A width mismatch is a fatal precondition violation, raised before any
/// arithmetic happens.

use crate::model::DncConfig;
use crate::read_heads::ReadMode;
use crate::tensor::{sigmoid_f32, softmax_f32, softplus_f32};

/// Decode error: the controller handed over a vector of the wrong size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    InterfaceWidthMismatch { expected: usize, found: usize },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::InterfaceWidthMismatch { expected, found } => {
                write!(f, "interface vector has {found} elements, expected {expected}")
            }
        }
    }
}

/// Per-batch-row width of the flat interface vector: a pure function of the
/// configured shape.
pub fn interface_width(cfg: &DncConfig) -> usize {
    let r = cfg.read_heads;
    let m = cfg.mem_dim;
    // keys + strengths for both head kinds, erase/write vectors, the two
    // write gates, free gates, and the 3-way read modes.
    r * m + r + m + 1 + m + m + 1 + 1 + r + ReadMode::COUNT * r
}

/// Decoded, activated head parameters for one step. Ephemeral: consumed by
/// the step and never persisted.
#[derive(Clone, Debug)]
pub struct HeadParams {
    pub batch: usize,
    /// B×R×M, tanh-bounded.
    pub read_keys: Vec<f32>,
    /// B×R, non-negative.
    pub read_strengths: Vec<f32>,
    /// B×M, tanh-bounded.
    pub write_key: Vec<f32>,
    /// B, non-negative.
    pub write_strength: Vec<f32>,
    /// B×M, entries in (0,1).
    pub erase: Vec<f32>,
    /// B×M, unbounded.
    pub write: Vec<f32>,
    /// B, in (0,1).
    pub allocation_gate: Vec<f32>,
    /// B, in (0,1).
    pub write_gate: Vec<f32>,
    /// B×R, in (0,1).
    pub free_gates: Vec<f32>,
    /// B×R×3, rows softmax-normalized.
    pub read_modes: Vec<f32>,
}

/// Split and activate `raw` (B rows of `interface_width(cfg)` values each).
pub fn decode(cfg: &DncConfig, raw: &[f32], batch: usize) -> Result<HeadParams, DecodeError> {
    let width = interface_width(cfg);
    if raw.len() != batch * width {
        return Err(DecodeError::InterfaceWidthMismatch {
            expected: batch * width,
            found: raw.len(),
        });
    }

    let r = cfg.read_heads;
    let m = cfg.mem_dim;

    let mut read_keys = vec![0.0f32; batch * r * m];
    let mut read_strengths = vec![0.0f32; batch * r];
    let mut write_key = vec![0.0f32; batch * m];
    let mut write_strength = vec![0.0f32; batch];
    let mut erase = vec![0.0f32; batch * m];
    let mut write = vec![0.0f32; batch * m];
    let mut allocation_gate = vec![0.0f32; batch];
    let mut write_gate = vec![0.0f32; batch];
    let mut free_gates = vec![0.0f32; batch * r];
    let mut mode_scores = vec![0.0f32; batch * r * ReadMode::COUNT];

    for b in 0..batch {
        let row = &raw[b * width..(b + 1) * width];
        let mut at = 0usize;

        for i in 0..(r * m) {
            read_keys[b * r * m + i] = row[at + i].tanh();
        }
        at += r * m;

        for i in 0..r {
            read_strengths[b * r + i] = softplus_f32(row[at + i]);
        }
        at += r;

        for i in 0..m {
            write_key[b * m + i] = row[at + i].tanh();
        }
        at += m;

        write_strength[b] = softplus_f32(row[at]);
        at += 1;

        for i in 0..m {
            erase[b * m + i] = sigmoid_f32(row[at + i]);
        }
        at += m;

        for i in 0..m {
            write[b * m + i] = row[at + i];
        }
        at += m;

        allocation_gate[b] = sigmoid_f32(row[at]);
        at += 1;

        write_gate[b] = sigmoid_f32(row[at]);
        at += 1;

        for i in 0..r {
            free_gates[b * r + i] = sigmoid_f32(row[at + i]);
        }
        at += r;

        for i in 0..(ReadMode::COUNT * r) {
            mode_scores[b * r * ReadMode::COUNT + i] = row[at + i];
        }
        at += ReadMode::COUNT * r;

        debug_assert_eq!(at, width);
    }

    let mut read_modes = vec![0.0f32; batch * r * ReadMode::COUNT];
    softmax_f32(&mode_scores, &mut read_modes, batch * r, ReadMode::COUNT);

    Ok(HeadParams {
        batch,
        read_keys,
        read_strengths,
        write_key,
        write_strength,
        erase,
        write,
        allocation_gate,
        write_gate,
        free_gates,
        read_modes,
    })
}
