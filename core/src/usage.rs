/// Usage tracking and differentiable free-list allocation.
///
/// Per-slot usage is an occupancy probability in [0,1]. One update:
///
///   u        <- eps + (1-eps) * u                      (boundary clamp)
///   psi[n]    = prod_r (1 - f[r] * rw_prev[r,n])       (read retention)
///   wtil[n]   = 1 - prod_h (1 - ww_prev[h,n])          (write indicator)
///   u'[n]     = (u[n] + (1-u[n]) * wtil[n]) * psi[n]
///
/// Usage rises only through writes and falls only through the free-gated
/// retention term; a read alone never zeroes a slot.
///
/// The allocation weighting walks the free list in ascending-usage order:
/// the slot at sorted position k gets (1 - u_k) * prod_{j<k} u_j, i.e. the
/// probability that it is free and every less-used slot was already claimed.
/// Results are scattered back to original slot order.

use crate::tensor::{argsort_ascending_f32, exclusive_cumprod_f32};

/// `prev_usage`: B×N, `free_gates`: B×R, `prev_read_weights`: B×R×N,
/// `prev_write_weights`: B×H_w×N (H_w inferred from the buffer length).
/// Returns the updated usage, B×N.
pub fn update_usage(
    prev_usage: &[f32],
    free_gates: &[f32],
    prev_read_weights: &[f32],
    prev_write_weights: &[f32],
    batch: usize,
    read_heads: usize,
    slots: usize,
    usage_eps: f32,
) -> Vec<f32> {
    debug_assert_eq!(prev_usage.len(), batch * slots);
    debug_assert_eq!(free_gates.len(), batch * read_heads);
    debug_assert_eq!(prev_read_weights.len(), batch * read_heads * slots);
    debug_assert_eq!(prev_write_weights.len() % (batch * slots), 0);
    let write_heads = prev_write_weights.len() / (batch * slots);

    let mut usage = vec![0.0f32; batch * slots];
    for b in 0..batch {
        for n in 0..slots {
            let u = usage_eps + (1.0 - usage_eps) * prev_usage[b * slots + n];

            let mut psi = 1.0f32;
            for r in 0..read_heads {
                let f = free_gates[b * read_heads + r];
                let rw = prev_read_weights[(b * read_heads + r) * slots + n];
                psi *= 1.0 - f * rw;
            }

            let mut not_written = 1.0f32;
            for h in 0..write_heads {
                not_written *= 1.0 - prev_write_weights[(b * write_heads + h) * slots + n];
            }
            let wtil = 1.0 - not_written;

            usage[b * slots + n] = (u + (1.0 - u) * wtil) * psi;
        }
    }
    usage
}

/// Differentiable free-list weighting from a usage vector. `usage`: B×N,
/// returns B×N summing to at most 1 per batch entry.
///
/// Equal usages fall back to the stable sort order; the weighting is
/// continuous in the usage values, so the tie-break choice is
/// behaviorally inconsequential.
pub fn allocation_weighting(usage: &[f32], batch: usize, slots: usize) -> Vec<f32> {
    debug_assert_eq!(usage.len(), batch * slots);

    let mut alloc = vec![0.0f32; batch * slots];
    let mut sorted_usage = vec![0.0f32; slots];
    let mut claimed = vec![0.0f32; slots];
    for b in 0..batch {
        let u = &usage[b * slots..(b + 1) * slots];
        let order = argsort_ascending_f32(u);
        for (k, &n) in order.iter().enumerate() {
            sorted_usage[k] = u[n];
        }
        exclusive_cumprod_f32(&sorted_usage, &mut claimed);
        for (k, &n) in order.iter().enumerate() {
            alloc[b * slots + n] = (1.0 - sorted_usage[k]) * claimed[k];
        }
    }
    alloc
}
