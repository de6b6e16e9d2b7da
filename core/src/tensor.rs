/// Minimal tensor utilities for the addressable memory core.
///
/// All operations are free functions on flat f32 slices with explicit
/// dimensions. No generics, no traits on the buffers: the arithmetic stays
/// transparent to a reverse-mode AD pass. Row-major layout throughout.
///
/// Batched tensors are flattened with the batch dimension outermost, e.g.
/// a B×N×M bank is indexed as `bank[b * n * m + slot * m + feat]`.

/// Matrix multiply: C[M,N] = A[M,K] @ B[K,N].  Row-major.
/// `out` must be pre-allocated with M*N elements (will be overwritten).
pub fn matmul_f32(a: &[f32], b: &[f32], out: &mut [f32], m: usize, k: usize, n: usize) {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(out.len(), m * n);

    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0f32;
            for p in 0..k {
                sum += a[i * k + p] * b[p * n + j];
            }
            out[i * n + j] = sum;
        }
    }
}

/// Row-wise softmax: each row of length `cols` in `scores` gets softmaxed into `out`.
/// `rows` * `cols` elements.
pub fn softmax_f32(scores: &[f32], out: &mut [f32], rows: usize, cols: usize) {
    debug_assert_eq!(scores.len(), rows * cols);
    debug_assert_eq!(out.len(), rows * cols);

    for r in 0..rows {
        let base = r * cols;
        let row = &scores[base..base + cols];

        // Numerically stable: subtract max
        let max_val = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut sum_exp = 0.0f32;
        for c in 0..cols {
            let e = (row[c] - max_val).exp();
            out[base + c] = e;
            sum_exp += e;
        }
        if sum_exp > 0.0 {
            for c in 0..cols {
                out[base + c] /= sum_exp;
            }
        }
    }
}

/// Sigmoid: 1 / (1 + exp(-x)). Clamped to avoid overflow.
#[inline]
pub fn sigmoid_f32(x: f32) -> f32 {
    if x >= 15.0 { return 1.0; }
    if x <= -15.0 { return 0.0; }
    1.0 / (1.0 + (-x).exp())
}

/// Softplus: ln(1 + exp(x)). Numerically stable.
#[inline]
pub fn softplus_f32(x: f32) -> f32 {
    if x >= 15.0 { return x; }
    if x <= -15.0 { return 0.0; }
    (1.0 + x.exp()).ln()
}

/// L2 norm of a vector: sqrt(sum(a[i]^2)).
pub fn vec_norm_f32(a: &[f32]) -> f32 {
    a.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity between two vectors with epsilon-guarded norms.
///
/// Both norms are clamped to at least `eps` before the division, so a
/// zero-norm key or slot yields similarity 0 instead of NaN.
pub fn cosine_similarity_f32(a: &[f32], b: &[f32], eps: f32) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut dot = 0.0f32;
    for i in 0..a.len() {
        dot += a[i] * b[i];
    }
    dot / (vec_norm_f32(a).max(eps) * vec_norm_f32(b).max(eps))
}

/// Indices that sort `values` ascending. Stable: equal values keep their
/// original relative order (tie-break for equal usages is implementation-
/// defined but deterministic).
pub fn argsort_ascending_f32(values: &[f32]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    idx
}

/// Exclusive cumulative product: out[k] = prod of input[0..k], out[0] = 1.
pub fn exclusive_cumprod_f32(input: &[f32], out: &mut [f32]) {
    debug_assert_eq!(input.len(), out.len());
    let mut acc = 1.0f32;
    for i in 0..input.len() {
        out[i] = acc;
        acc *= input[i];
    }
}

/// Simple xorshift64 PRNG for deterministic test/bench inputs. Not crypto-safe.
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        SimpleRng { state: seed.max(1) } // avoid zero state
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform in [-scale, scale].
    pub fn uniform(&mut self, scale: f32) -> f32 {
        let u = (self.next_u64() as f64) / (u64::MAX as f64);
        (2.0 * u as f32 - 1.0) * scale
    }

    /// Fill slice with uniform random values in [-scale, scale].
    pub fn fill_uniform(&mut self, buf: &mut [f32], scale: f32) {
        for v in buf.iter_mut() {
            *v = self.uniform(scale);
        }
    }
}
