// ---------------------------------------------------------------------------
// Embedding vectors: cosine scoring and normalization
// ---------------------------------------------------------------------------

/// Cosine similarity of two vectors, accumulated in f64.
///
/// Returns `None` on a dimension mismatch and `Some(0.0)` if either vector is
/// all zeros. The operation is symmetric in its arguments.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Some(0.0);
    }

    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Scale `values` to unit length (L2 norm = 1). Zero vectors are left as-is.
pub fn normalize(values: &mut [f32]) {
    let norm: f32 = values.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in values.iter_mut() {
            *v /= norm;
        }
    }
}
