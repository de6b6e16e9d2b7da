/// Memory bank primitives.
///
/// The bank is a B×N×M matrix of unbounded reals, zero at sequence start.
/// Reads are weighted sums over slots; writes are an outer-product erase
/// followed by an outer-product add. Both are pure, allocation-returning
/// functions over the flat buffers so ownership of each step's snapshot
/// stays with the caller.

use crate::tensor::matmul_f32;

/// Weighted read: out[b,h,:] = sum_n w[b,h,n] * bank[b,n,:].
///
/// `weights`: B×H×N, `bank`: B×N×M. Returns B×H×M.
pub fn read(
    bank: &[f32],
    weights: &[f32],
    batch: usize,
    heads: usize,
    slots: usize,
    dim: usize,
) -> Vec<f32> {
    debug_assert_eq!(bank.len(), batch * slots * dim);
    debug_assert_eq!(weights.len(), batch * heads * slots);

    let mut out = vec![0.0f32; batch * heads * dim];
    for b in 0..batch {
        let w_b = &weights[b * heads * slots..(b + 1) * heads * slots];
        let bank_b = &bank[b * slots * dim..(b + 1) * slots * dim];
        let out_b = &mut out[b * heads * dim..(b + 1) * heads * dim];
        matmul_f32(w_b, bank_b, out_b, heads, slots, dim);
    }
    out
}

/// Erase-then-add write for a single write head:
///
///   bank'[b,n,:] = bank[b,n,:] * (1 - w[b,n] * erase[b,:]) + w[b,n] * add[b,:]
///
/// `write_weighting`: B×N (one write head), `erase`/`add`: B×M, erase entries
/// in [0,1], add unbounded. Returns the updated B×N×M bank.
pub fn erase_add(
    bank: &[f32],
    write_weighting: &[f32],
    erase: &[f32],
    add: &[f32],
    batch: usize,
    slots: usize,
    dim: usize,
) -> Vec<f32> {
    debug_assert_eq!(bank.len(), batch * slots * dim);
    debug_assert_eq!(write_weighting.len(), batch * slots);
    debug_assert_eq!(erase.len(), batch * dim);
    debug_assert_eq!(add.len(), batch * dim);

    let mut out = vec![0.0f32; batch * slots * dim];
    for b in 0..batch {
        let e_b = &erase[b * dim..(b + 1) * dim];
        let a_b = &add[b * dim..(b + 1) * dim];
        for n in 0..slots {
            let w = write_weighting[b * slots + n];
            let base = b * slots * dim + n * dim;
            for m in 0..dim {
                out[base + m] = bank[base + m] * (1.0 - w * e_b[m]) + w * a_b[m];
            }
        }
    }
    out
}
