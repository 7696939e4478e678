/// Cosine similarity between two embedding vectors.
///
/// Vectors of differing dimension (including empty ones) compare as 0 rather
/// than erroring, so a missing or stale embedding degrades to "no semantic
/// signal" instead of failing a ranking request.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
	if a.is_empty() || b.is_empty() || a.len() != b.len() {
		return 0.0;
	}

	let mut dot = 0.0_f32;
	let mut norm_a = 0.0_f32;
	let mut norm_b = 0.0_f32;

	for (x, y) in a.iter().zip(b) {
		dot += x * y;
		norm_a += x * x;
		norm_b += y * y;
	}

	let denom = (norm_a.sqrt() * norm_b.sqrt()).max(f32::EPSILON);

	(dot / denom).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cosine_is_symmetric() {
		let a = [0.3, -0.2, 0.9];
		let b = [0.1, 0.4, 0.5];

		assert!((cosine(&a, &b) - cosine(&b, &a)).abs() < 1e-6);
	}

	#[test]
	fn cosine_of_self_is_one() {
		let a = [0.5, 0.25, -1.5];

		assert!((cosine(&a, &a) - 1.0).abs() < 1e-5);
	}

	#[test]
	fn empty_vectors_yield_zero() {
		assert_eq!(cosine(&[], &[1.0, 2.0]), 0.0);
		assert_eq!(cosine(&[1.0, 2.0], &[]), 0.0);
		assert_eq!(cosine(&[], &[]), 0.0);
	}

	#[test]
	fn mismatched_dimensions_yield_zero() {
		assert_eq!(cosine(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
	}

	#[test]
	fn zero_vector_does_not_divide_by_zero() {
		let score = cosine(&[0.0, 0.0], &[1.0, 1.0]);

		assert!(score.is_finite());
		assert_eq!(score, 0.0);
	}

	#[test]
	fn opposed_vectors_are_negative() {
		let score = cosine(&[1.0, 0.0], &[-1.0, 0.0]);

		assert!((score + 1.0).abs() < 1e-6);
	}
}
