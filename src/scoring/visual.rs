//! Logo similarity over embedding vectors.

/// Cosine similarity, or `None` when it is undefined.
///
/// Undefined means: empty input, mismatched dimensions, or a zero-norm vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let (dot, norm_a_sq, norm_b_sq) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (&av, &bv)| {
            (dot + av * bv, na + av * av, nb + bv * bv)
        });

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();
    if norm_a == 0.0 || norm_b == 0.0 || !dot.is_finite() {
        return None;
    }
    Some(dot / (norm_a * norm_b))
}

/// Cosine similarity rescaled from [-1, 1] to [0, 1].
///
/// Absent on either side means no score, not a zero score.
pub fn image_similarity(a: Option<&[f32]>, b: Option<&[f32]>) -> Option<f32> {
    let cos = cosine_similarity(a?, b?)?;
    Some(((cos + 1.0) / 2.0).clamp(0.0, 1.0))
}
