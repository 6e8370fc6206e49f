//! Textual wire format for stored embeddings.
//!
//! The persisted representation is pgvector-compatible:
//! `[f1,f2,...,f512]`, each component printed with eight decimal digits,
//! ASCII, comma-separated, no internal or surrounding whitespace. Existing
//! registry rows use exactly this shape, so decoding is strict.

use std::fmt::Write as _;

use crate::error::CodecError;
use crate::types::{Embedding, NormalizedEmbedding, EMBEDDING_DIM};

/// Encode a normalized embedding into its storage text.
///
/// Deterministic; round-trips through [`decode`] within 1e-7 per component.
pub fn encode(embedding: &NormalizedEmbedding) -> String {
    let values = embedding.as_slice();
    // Eight decimal digits plus sign, separator, and leading digit.
    let mut out = String::with_capacity(values.len() * 12 + 2);
    out.push('[');
    for (idx, value) in values.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        write!(out, "{value:.8}").expect("writing to a String cannot fail");
    }
    out.push(']');
    out
}

/// Decode storage text back into a validated embedding.
///
/// Fails with [`CodecError::MalformedVector`] on missing brackets,
/// non-numeric or non-finite tokens, or any component count other than
/// [`EMBEDDING_DIM`]. There is no partial decode.
pub fn decode(text: &str) -> Result<Embedding, CodecError> {
    let inner = text
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| CodecError::MalformedVector("missing bracket delimiters".into()))?;

    let mut values = Vec::with_capacity(EMBEDDING_DIM);
    for token in inner.split(',') {
        let value: f32 = token.parse().map_err(|_| {
            CodecError::MalformedVector(format!("non-numeric component {token:?}"))
        })?;
        if !value.is_finite() {
            return Err(CodecError::MalformedVector(format!(
                "non-finite component {token:?}"
            )));
        }
        values.push(value);
    }

    if values.len() != EMBEDDING_DIM {
        return Err(CodecError::MalformedVector(format!(
            "expected {EMBEDDING_DIM} components, found {}",
            values.len()
        )));
    }

    Embedding::from_vec(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    fn sample_embedding() -> NormalizedEmbedding {
        let v: Vec<f32> = (0..EMBEDDING_DIM)
            .map(|i| (i as f32 * 0.37 + 0.11).cos())
            .collect();
        normalize(&Embedding::from_vec(v).unwrap())
    }

    #[test]
    fn encode_shape_is_bracketed_comma_separated() {
        let text = encode(&sample_embedding());
        assert!(text.starts_with('['));
        assert!(text.ends_with(']'));
        assert!(!text.contains(' '));
        assert_eq!(text.matches(',').count(), EMBEDDING_DIM - 1);
    }

    #[test]
    fn encode_uses_eight_decimal_digits() {
        let text = encode(&sample_embedding());
        let first = text[1..].split(',').next().unwrap();
        let decimals = first.split('.').nth(1).expect("decimal point present");
        assert_eq!(decimals.len(), 8);
    }

    #[test]
    fn roundtrip_within_tolerance() {
        let original = sample_embedding();
        let decoded = decode(&encode(&original)).expect("decodes");
        for (a, b) in original.as_slice().iter().zip(decoded.as_slice()) {
            assert!((a - b).abs() < 1e-7, "components differ: {a} vs {b}");
        }
    }

    #[test]
    fn encode_is_deterministic() {
        let embedding = sample_embedding();
        assert_eq!(encode(&embedding), encode(&embedding));
    }

    #[test]
    fn decode_rejects_missing_brackets() {
        let text = encode(&sample_embedding());
        let no_open = &text[1..];
        let no_close = &text[..text.len() - 1];
        assert!(matches!(
            decode(no_open),
            Err(CodecError::MalformedVector(_))
        ));
        assert!(matches!(
            decode(no_close),
            Err(CodecError::MalformedVector(_))
        ));
    }

    #[test]
    fn decode_rejects_surrounding_whitespace() {
        let text = format!(" {}", encode(&sample_embedding()));
        assert!(matches!(decode(&text), Err(CodecError::MalformedVector(_))));
    }

    #[test]
    fn decode_rejects_non_numeric_token() {
        let mut text = encode(&sample_embedding());
        text.replace_range(1..11, "abcdefghij");
        assert!(matches!(decode(&text), Err(CodecError::MalformedVector(_))));
    }

    #[test]
    fn decode_rejects_internal_whitespace() {
        let text = encode(&sample_embedding()).replacen(',', ", ", 1);
        assert!(matches!(decode(&text), Err(CodecError::MalformedVector(_))));
    }

    #[test]
    fn decode_rejects_wrong_component_count() {
        let short = "[0.10000000,0.20000000]";
        match decode(short) {
            Err(CodecError::MalformedVector(msg)) => {
                assert!(msg.contains("found 2"), "unexpected message: {msg}");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_empty_brackets() {
        assert!(matches!(decode("[]"), Err(CodecError::MalformedVector(_))));
    }

    #[test]
    fn decode_rejects_non_finite_token() {
        let mut components = vec!["0.00000000"; EMBEDDING_DIM];
        components[0] = "inf";
        let text = format!("[{}]", components.join(","));
        assert!(matches!(decode(&text), Err(CodecError::MalformedVector(_))));
    }

    #[test]
    fn decode_accepts_plain_integers_and_negatives() {
        let mut components = vec!["0.00000000".to_string(); EMBEDDING_DIM];
        components[0] = "1".to_string();
        components[1] = "-0.50000000".to_string();
        let text = format!("[{}]", components.join(","));
        let decoded = decode(&text).expect("decodes");
        assert_eq!(decoded.as_slice()[0], 1.0);
        assert_eq!(decoded.as_slice()[1], -0.5);
    }
}
