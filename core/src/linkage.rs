/// Temporal linkage: write-order adjacency between slots.
///
/// Link[i,j] approximates the probability that slot i was written
/// immediately after slot j; the precedence weighting tracks the most
/// recently written slot(s). One update, given this step's write
/// weighting w (B×N, single write head):
///
///   link'[i,j]  = (1 - w[i] - w[j]) * link[i,j] + w[i] * p[j]
///   link'[i,i]  = 0
///   p'          = (1 - sum_n w[n]) * p + w
///
/// Entries stay in [0,1] for well-formed (sum <= 1) inputs. Traversal
/// weightings move a read head's attention one write-step forward
/// (link @ rw) or backward (link^T @ rw).
///
/// All functions return fresh buffers; prior-step tensors are never
/// mutated in place.

/// `prev_link`: B×N×N, `prev_precedence`: B×N, `write_weighting`: B×N.
/// Returns (link B×N×N, precedence B×N).
pub fn update_linkage(
    prev_link: &[f32],
    prev_precedence: &[f32],
    write_weighting: &[f32],
    batch: usize,
    slots: usize,
) -> (Vec<f32>, Vec<f32>) {
    debug_assert_eq!(prev_link.len(), batch * slots * slots);
    debug_assert_eq!(prev_precedence.len(), batch * slots);
    debug_assert_eq!(write_weighting.len(), batch * slots);

    let mut link = vec![0.0f32; batch * slots * slots];
    let mut precedence = vec![0.0f32; batch * slots];
    for b in 0..batch {
        let w = &write_weighting[b * slots..(b + 1) * slots];
        let p = &prev_precedence[b * slots..(b + 1) * slots];

        for i in 0..slots {
            let row = b * slots * slots + i * slots;
            for j in 0..slots {
                if i == j {
                    continue; // diagonal stays exactly zero
                }
                let scaler = 1.0 - w[i] - w[j];
                link[row + j] = scaler * prev_link[row + j] + w[i] * p[j];
            }
        }

        let write_sum: f32 = w.iter().sum();
        for n in 0..slots {
            precedence[b * slots + n] = (1.0 - write_sum) * p[n] + w[n];
        }
    }
    (link, precedence)
}

/// Forward traversal: out[b,h,i] = sum_j link[b,i,j] * rw[b,h,j].
/// `read_weights`: B×R×N. Returns B×R×N.
pub fn forward_weights(
    link: &[f32],
    read_weights: &[f32],
    batch: usize,
    read_heads: usize,
    slots: usize,
) -> Vec<f32> {
    debug_assert_eq!(link.len(), batch * slots * slots);
    debug_assert_eq!(read_weights.len(), batch * read_heads * slots);

    let mut out = vec![0.0f32; batch * read_heads * slots];
    for b in 0..batch {
        for h in 0..read_heads {
            let rw = &read_weights[(b * read_heads + h) * slots..(b * read_heads + h + 1) * slots];
            let o = (b * read_heads + h) * slots;
            for i in 0..slots {
                let row = b * slots * slots + i * slots;
                let mut sum = 0.0f32;
                for j in 0..slots {
                    sum += link[row + j] * rw[j];
                }
                out[o + i] = sum;
            }
        }
    }
    out
}

/// Backward traversal: out[b,h,i] = sum_j link[b,j,i] * rw[b,h,j].
pub fn backward_weights(
    link: &[f32],
    read_weights: &[f32],
    batch: usize,
    read_heads: usize,
    slots: usize,
) -> Vec<f32> {
    debug_assert_eq!(link.len(), batch * slots * slots);
    debug_assert_eq!(read_weights.len(), batch * read_heads * slots);

    let mut out = vec![0.0f32; batch * read_heads * slots];
    for b in 0..batch {
        for h in 0..read_heads {
            let rw = &read_weights[(b * read_heads + h) * slots..(b * read_heads + h + 1) * slots];
            let o = (b * read_heads + h) * slots;
            for i in 0..slots {
                let mut sum = 0.0f32;
                for j in 0..slots {
                    sum += link[b * slots * slots + j * slots + i] * rw[j];
                }
                out[o + i] = sum;
            }
        }
    }
    out
}
