//! Fit score from a pair of embeddings

use crate::error::{Result, RoleMatcherError};

/// Cosine similarity in `[-1, 1]`.
///
/// A zero-magnitude vector has no direction and scores 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(RoleMatcherError::ComputeFailure(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    if a.is_empty() {
        return Err(RoleMatcherError::ComputeFailure("Embeddings are empty".to_string()));
    }

    let mut dot_product = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if !(dot_product.is_finite() && norm_a.is_finite() && norm_b.is_finite()) {
        return Err(RoleMatcherError::ComputeFailure(
            "Embedding contains non-finite values".to_string(),
        ));
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let cosine = dot_product / (norm_a.sqrt() * norm_b.sqrt());
    Ok(cosine.clamp(-1.0, 1.0))
}

/// Fit score in `[0, 100]`: `((cos + 1) / 2) * 100`, rounded to 2 decimals.
pub fn fit_score(a: &[f32], b: &[f32]) -> Result<f64> {
    let cosine = cosine_similarity(a, b)?;
    Ok(round2((cosine + 1.0) / 2.0 * 100.0))
}

/// Cosine as a plain percentage in `[-100, 100]`, rounded to 2 decimals.
pub fn raw_percentage(a: &[f32], b: &[f32]) -> Result<f64> {
    let cosine = cosine_similarity(a, b)?;
    Ok(round2(cosine * 100.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_similarity_is_maximal() {
        let vectors: [&[f32]; 3] = [
            &[0.3, -1.7, 2.2, 0.01],
            &[1.0, 0.0, 0.0],
            &[1e-3, 4e-3, -7e-3, 9e-4, 2e-3],
        ];
        for v in vectors {
            assert_eq!(fit_score(v, v).unwrap(), 100.0);
            assert_eq!(raw_percentage(v, v).unwrap(), 100.0);
        }
    }

    #[test]
    fn test_score_is_symmetric() {
        let a = [0.12f32, -0.4, 0.9, 0.33, -0.05];
        let b = [-0.7f32, 0.2, 0.41, 0.0, 0.8];
        assert_eq!(fit_score(&a, &b).unwrap(), fit_score(&b, &a).unwrap());
    }

    #[test]
    fn test_rescaling_endpoints() {
        assert_eq!(fit_score(&[1.0, 0.0], &[-1.0, 0.0]).unwrap(), 0.0);
        assert_eq!(fit_score(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 50.0);
        assert_eq!(raw_percentage(&[1.0, 0.0], &[-1.0, 0.0]).unwrap(), -100.0);
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        // cos(a, b) = 1 / sqrt(3)
        let score = fit_score(&[1.0, 1.0, 1.0], &[1.0, 0.0, 0.0]).unwrap();
        assert_eq!(score, 78.87);
    }

    #[test]
    fn test_zero_vector_scores_midpoint() {
        assert_eq!(fit_score(&[0.0, 0.0], &[0.5, 0.5]).unwrap(), 50.0);
    }

    #[test]
    fn test_mismatched_or_invalid_vectors_fail() {
        assert!(matches!(
            fit_score(&[1.0, 2.0], &[1.0]),
            Err(RoleMatcherError::ComputeFailure(_))
        ));
        assert!(matches!(fit_score(&[], &[]), Err(RoleMatcherError::ComputeFailure(_))));
        assert!(matches!(
            fit_score(&[f32::NAN, 1.0], &[1.0, 1.0]),
            Err(RoleMatcherError::ComputeFailure(_))
        ));
    }
}
