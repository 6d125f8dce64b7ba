pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Vector dimensions do not match: {left} vs {right}.")]
	DimensionMismatch { left: usize, right: usize },
}

/// Cosine similarity in [-1, 1]. A zero-magnitude operand scores 0.0 instead
/// of dividing by zero.
pub fn cosine_similarity(lhs: &[f32], rhs: &[f32]) -> Result<f32> {
	if lhs.len() != rhs.len() {
		return Err(Error::DimensionMismatch { left: lhs.len(), right: rhs.len() });
	}

	let mut dot = 0.0_f32;
	let mut lhs_norm = 0.0_f32;
	let mut rhs_norm = 0.0_f32;

	for (l, r) in lhs.iter().zip(rhs.iter()) {
		dot += l * r;
		lhs_norm += l * l;
		rhs_norm += r * r;
	}

	if lhs_norm <= f32::EPSILON || rhs_norm <= f32::EPSILON {
		return Ok(0.0);
	}

	Ok((dot / (lhs_norm.sqrt() * rhs_norm.sqrt())).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn identical_vectors_score_one() {
		let v = vec![0.3, -1.2, 4.5, 0.01];

		assert!((cosine_similarity(&v, &v).unwrap() - 1.0).abs() < 1e-6);
	}

	#[test]
	fn opposite_vectors_score_negative_one() {
		let v = vec![1.0, 2.0, -3.0];
		let neg: Vec<f32> = v.iter().map(|x| -x).collect();

		assert!((cosine_similarity(&v, &neg).unwrap() + 1.0).abs() < 1e-6);
	}

	#[test]
	fn orthogonal_vectors_score_zero() {
		assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap().abs() < 1e-6);
	}

	#[test]
	fn mismatched_lengths_are_an_error() {
		let err = cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();

		assert!(matches!(err, Error::DimensionMismatch { left: 2, right: 3 }));
	}

	#[test]
	fn zero_magnitude_scores_zero() {
		assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).unwrap(), 0.0);
		assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]).unwrap(), 0.0);
	}
}
