/// Content addressing: cosine-similarity lookup over memory slots.
///
/// For each head, the key is compared against every slot row, the similarity
/// is scaled by a non-negative strength (already softplus-activated by the
/// interface decoder, no "+1" offset), and a row softmax over the N slots
/// turns the scores into a weighting. Always a valid distribution per head;
/// zero-norm keys or slots are epsilon-guarded to similarity 0 rather than
/// detected after the fact.

use crate::model::ADDRESSING_EPS;
use crate::tensor::{cosine_similarity_f32, softmax_f32};

/// `bank`: B×N×M, `keys`: B×H×M, `strengths`: B×H. Returns weights B×H×N.
pub fn content_address(
    bank: &[f32],
    keys: &[f32],
    strengths: &[f32],
    batch: usize,
    heads: usize,
    slots: usize,
    dim: usize,
) -> Vec<f32> {
    debug_assert_eq!(bank.len(), batch * slots * dim);
    debug_assert_eq!(keys.len(), batch * heads * dim);
    debug_assert_eq!(strengths.len(), batch * heads);

    let mut scores = vec![0.0f32; batch * heads * slots];
    for b in 0..batch {
        for h in 0..heads {
            let key = &keys[(b * heads + h) * dim..(b * heads + h + 1) * dim];
            let beta = strengths[b * heads + h];
            let row = (b * heads + h) * slots;
            for n in 0..slots {
                let slot = &bank[b * slots * dim + n * dim..b * slots * dim + (n + 1) * dim];
                scores[row + n] = beta * cosine_similarity_f32(key, slot, ADDRESSING_EPS);
            }
        }
    }

    let mut weights = vec![0.0f32; batch * heads * slots];
    softmax_f32(&scores, &mut weights, batch * heads, slots);
    weights
}
