use crate::normalize::l2_normalize_in_place;
use crate::types::{Embedding, EMBEDDING_DIM};
use crate::{Encoder, EncoderError};

/// How many characters of each text feed the hash. Longer inputs only
/// influence the length feature.
const HASH_CHAR_BUDGET: usize = 100;

/// Deterministic character-hash encoder used when no neural backend is
/// available. Not intended to capture semantic similarity; it exists to keep
/// the service contract intact (fixed 768 dimension, valid unit vectors)
/// under total dependency failure.
///
/// The exact constants below define the fallback's embedding space, so
/// vectors produced by different deployments stay comparable. Don't tune
/// them.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackEncoder;

impl FallbackEncoder {
    pub fn new() -> Self {
        Self
    }

    fn encode_one(text: &str) -> Embedding {
        let lowered = text.to_lowercase();
        let clean = lowered.trim();

        let mut vector = vec![0f32; EMBEDDING_DIM];
        for (i, c) in clean.chars().take(HASH_CHAR_BUDGET).enumerate() {
            let code = c as u32 as usize;
            let idx = (code * 7 + i * 11) % EMBEDDING_DIM;
            // Additive on purpose: index collisions compound rather than
            // overwrite.
            vector[idx] += ((code as f64 + i as f64).sin() * 0.1) as f32;
        }

        // Length feature. This overwrites whatever accumulated at index 0;
        // that clobber is part of the embedding space, not a bug to fix.
        let char_count = clean.chars().count();
        vector[0] = ((char_count as f64 + 1.0).ln() * 0.1) as f32;

        // Empty trimmed input leaves a zero vector (ln(1) == 0); the guard
        // inside the normalizer keeps it that way.
        l2_normalize_in_place(&mut vector);
        vector
    }
}

impl Encoder for FallbackEncoder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Embedding>, EncoderError> {
        Ok(texts.iter().map(|t| Self::encode_one(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(texts: &[&str]) -> Vec<Embedding> {
        let texts: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
        FallbackEncoder::new().encode(&texts).unwrap()
    }

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn output_dimension_is_768() {
        let out = encode(&["hello world"]);
        assert_eq!(out[0].len(), EMBEDDING_DIM);
    }

    #[test]
    fn preserves_batch_order_and_length() {
        let out = encode(&["one", "two", "three"]);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], encode(&["one"])[0]);
        assert_eq!(out[2], encode(&["three"])[0]);
    }

    #[test]
    fn deterministic_across_calls() {
        let a = encode(&["abc"]);
        let b = encode(&["abc"]);
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_texts_produce_distinct_vectors() {
        let out = encode(&["abc", "xyz"]);
        assert_ne!(out[0], out[1]);
    }

    #[test]
    fn vectors_are_unit_norm() {
        for text in ["a", "hello world", "The quick brown fox", "!@#$%"] {
            let out = encode(&[text]);
            assert!(
                (norm(&out[0]) - 1.0).abs() < 1e-4,
                "norm for {text:?} was {}",
                norm(&out[0])
            );
        }
    }

    #[test]
    fn case_and_surrounding_whitespace_are_ignored() {
        let out = encode(&["  Hello World  ", "hello world"]);
        assert_eq!(out[0], out[1]);
    }

    #[test]
    fn empty_text_yields_zero_vector() {
        // Trimmed-empty input: no characters accumulate and the length
        // feature is ln(1) * 0.1 == 0, so the vector stays all-zero and is
        // never divided by zero.
        for text in ["", "   ", "\t\n"] {
            let out = encode(&[text]);
            assert!(out[0].iter().all(|&x| x == 0.0), "expected zeros for {text:?}");
            assert!(out[0].iter().all(|x| x.is_finite()));
        }
    }

    #[test]
    fn length_feature_overwrites_index_zero() {
        // U+0300 has scalar value 768, so its hash lands exactly on index 0
        // (768 * 7 % 768 == 0). The length feature must clobber that
        // accumulation: the pre-normalization vector is then zero everywhere
        // except index 0, which normalizes to exactly e_0.
        let out = encode(&["\u{300}"]);
        assert!((out[0][0] - 1.0).abs() < 1e-6);
        assert!(out[0][1..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn only_first_100_chars_hash() {
        // Beyond the hash budget only the length feature changes, so two
        // long texts sharing a 100-char prefix and a length differ in no
        // pre-normalization component except index 0.
        let base = "x".repeat(100);
        let a = encode(&[format!("{base}abc").as_str()]);
        let b = encode(&[format!("{base}def").as_str()]);
        assert_eq!(a[0], b[0]);
    }

    #[test]
    fn unicode_input_is_handled() {
        let out = encode(&["Hello 世界 🌍"]);
        assert_eq!(out[0].len(), EMBEDDING_DIM);
        assert!((norm(&out[0]) - 1.0).abs() < 1e-4);
    }
}
