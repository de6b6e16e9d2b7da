/// Read heads: per-head mixture over three addressing strategies.
///
/// Each head carries a softmax-normalized 3-way mode vector that blends the
/// backward-traversal, content and forward-traversal weightings into one
/// read weighting, then fetches the weighted slot contents from the bank:
///
///   rw[h] = pi[h,Backward] * bw[h] + pi[h,Content] * cw[h] + pi[h,Forward] * fw[h]
///   read_vectors[h] = rw[h] @ bank
///
/// The mixture is convex, so the read weighting stays a sub-distribution
/// whenever the three inputs are.

use crate::memory;

/// The three addressing strategies a read head can mix. The discriminant is
/// the head's position inside its decoded 3-way mode vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadMode {
    Backward,
    Content,
    Forward,
}

impl ReadMode {
    pub const COUNT: usize = 3;
    pub const ALL: [ReadMode; 3] = [ReadMode::Backward, ReadMode::Content, ReadMode::Forward];

    /// Offset of this mode inside a head's mode vector.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            ReadMode::Backward => 0,
            ReadMode::Content => 1,
            ReadMode::Forward => 2,
        }
    }
}

/// Blend the three weightings under the per-head mode mixture.
///
/// `backward`/`content`/`forward`: B×R×N, `read_modes`: B×R×3 (softmaxed).
/// Returns the read weighting, B×R×N.
pub fn read_weighting(
    backward: &[f32],
    content: &[f32],
    forward: &[f32],
    read_modes: &[f32],
    batch: usize,
    read_heads: usize,
    slots: usize,
) -> Vec<f32> {
    debug_assert_eq!(backward.len(), batch * read_heads * slots);
    debug_assert_eq!(content.len(), batch * read_heads * slots);
    debug_assert_eq!(forward.len(), batch * read_heads * slots);
    debug_assert_eq!(read_modes.len(), batch * read_heads * ReadMode::COUNT);

    let mut rw = vec![0.0f32; batch * read_heads * slots];
    for bh in 0..(batch * read_heads) {
        let pi = &read_modes[bh * ReadMode::COUNT..(bh + 1) * ReadMode::COUNT];
        let pb = pi[ReadMode::Backward.index()];
        let pc = pi[ReadMode::Content.index()];
        let pf = pi[ReadMode::Forward.index()];
        for n in 0..slots {
            let i = bh * slots + n;
            rw[i] = pb * backward[i] + pc * content[i] + pf * forward[i];
        }
    }
    rw
}

/// Mix the weightings, then fetch from the bank.
/// Returns (read vectors B×R×M, read weighting B×R×N).
#[allow(clippy::too_many_arguments)]
pub fn read(
    bank: &[f32],
    backward: &[f32],
    content: &[f32],
    forward: &[f32],
    read_modes: &[f32],
    batch: usize,
    read_heads: usize,
    slots: usize,
    dim: usize,
) -> (Vec<f32>, Vec<f32>) {
    let rw = read_weighting(backward, content, forward, read_modes, batch, read_heads, slots);
    let vectors = memory::read(bank, &rw, batch, read_heads, slots, dim);
    (vectors, rw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_indices_cover_mixture() {
        assert_eq!(ReadMode::Backward.index(), 0);
        assert_eq!(ReadMode::Content.index(), 1);
        assert_eq!(ReadMode::Forward.index(), 2);
        assert_eq!(ReadMode::ALL.len(), ReadMode::COUNT);
    }

    #[test]
    fn test_pure_content_mode() {
        let bw = vec![1.0f32, 0.0];
        let cw = vec![0.0f32, 1.0];
        let fw = vec![0.5f32, 0.5];
        let pi = vec![0.0f32, 1.0, 0.0];
        let rw = read_weighting(&bw, &cw, &fw, &pi, 1, 1, 2);
        assert_eq!(rw, cw);
    }

    #[test]
    fn test_pure_backward_mode() {
        let bw = vec![1.0f32, 0.0];
        let cw = vec![0.0f32, 1.0];
        let fw = vec![0.5f32, 0.5];
        let pi = vec![1.0f32, 0.0, 0.0];
        let rw = read_weighting(&bw, &cw, &fw, &pi, 1, 1, 2);
        assert_eq!(rw, bw);
    }

    #[test]
    fn test_mixture_is_convex() {
        let bw = vec![1.0f32, 0.0];
        let cw = vec![0.0f32, 1.0];
        let fw = vec![0.5f32, 0.5];
        let pi = vec![0.25f32, 0.5, 0.25];
        let rw = read_weighting(&bw, &cw, &fw, &pi, 1, 1, 2);
        let sum: f32 = rw.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6, "convex mix of distributions sums to 1");
        assert!((rw[0] - 0.375).abs() < 1e-6);
        assert!((rw[1] - 0.625).abs() < 1e-6);
    }

    #[test]
    fn test_per_head_modes_are_independent() {
        // Head 0 reads backward, head 1 reads forward.
        let bw = vec![1.0f32, 0.0, 1.0, 0.0];
        let cw = vec![0.0f32, 0.0, 0.0, 0.0];
        let fw = vec![0.0f32, 1.0, 0.0, 1.0];
        let pi = vec![1.0f32, 0.0, 0.0, 0.0, 0.0, 1.0];
        let rw = read_weighting(&bw, &cw, &fw, &pi, 1, 2, 2);
        assert_eq!(&rw[..2], &[1.0, 0.0]);
        assert_eq!(&rw[2..], &[0.0, 1.0]);
    }

    #[test]
    fn test_read_fetches_weighted_content() {
        let bank = vec![2.0f32, 2.0, 8.0, 8.0];
        let bw = vec![0.0f32, 0.0];
        let cw = vec![0.5f32, 0.5];
        let fw = vec![0.0f32, 0.0];
        let pi = vec![0.0f32, 1.0, 0.0];
        let (vectors, rw) = read(&bank, &bw, &cw, &fw, &pi, 1, 1, 2, 2);
        assert_eq!(rw, cw);
        assert_eq!(vectors, vec![5.0, 5.0]);
    }
}
