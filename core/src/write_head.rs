/// Write head: gate interpolation and the bank update.
///
/// The write weighting blends the allocation weighting (free-list path)
/// with content addressing under two sigmoid gates:
///
///   w = g_w * (g_a * alloc + (1 - g_a) * content)
///
/// then the bank is updated by the erase-then-add rule in `memory`.
/// Gates live in [0,1] by construction (decoded through sigmoid), so the
/// weighting row sums to at most 1.

use crate::memory;

/// `content_weighting`/`allocation_weighting`: B×N (single write head),
/// `write_gate`/`allocation_gate`: B. Returns the write weighting, B×N.
pub fn write_weighting(
    content_weighting: &[f32],
    allocation_weighting: &[f32],
    write_gate: &[f32],
    allocation_gate: &[f32],
    batch: usize,
    slots: usize,
) -> Vec<f32> {
    debug_assert_eq!(content_weighting.len(), batch * slots);
    debug_assert_eq!(allocation_weighting.len(), batch * slots);
    debug_assert_eq!(write_gate.len(), batch);
    debug_assert_eq!(allocation_gate.len(), batch);

    let mut w = vec![0.0f32; batch * slots];
    for b in 0..batch {
        let gw = write_gate[b];
        let ga = allocation_gate[b];
        for n in 0..slots {
            let i = b * slots + n;
            w[i] = gw * (ga * allocation_weighting[i] + (1.0 - ga) * content_weighting[i]);
        }
    }
    w
}

/// Full write: combine the weighting, then erase-then-add into the bank.
/// Returns (updated bank B×N×M, write weighting B×N).
#[allow(clippy::too_many_arguments)]
pub fn write(
    bank: &[f32],
    content_weighting: &[f32],
    allocation_weighting: &[f32],
    write_gate: &[f32],
    allocation_gate: &[f32],
    erase: &[f32],
    add: &[f32],
    batch: usize,
    slots: usize,
    dim: usize,
) -> (Vec<f32>, Vec<f32>) {
    let w = write_weighting(
        content_weighting,
        allocation_weighting,
        write_gate,
        allocation_gate,
        batch,
        slots,
    );
    let new_bank = memory::erase_add(bank, &w, erase, add, batch, slots, dim);
    (new_bank, w)
}
