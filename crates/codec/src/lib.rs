//! Embedding vector codec for the facematch engine.
//!
//! Owns the fixed 512-dimension embedding representation, the textual wire
//! format used by the enrollment registry, and L2 normalization. Everything
//! downstream (index, matcher, enrollment) works in terms of these types, so
//! dimension and finiteness are validated once, here, at construction.
//!
//! ## Core Types
//!
//! - [`Embedding`]: a validated raw vector of exactly [`EMBEDDING_DIM`]
//!   finite `f32` components.
//! - [`NormalizedEmbedding`]: a unit-length vector produced by
//!   [`normalize`]; the dot product of two of these is their cosine
//!   similarity.
//! - [`CodecError`]: dimension, finiteness, and wire-format failures.
//!
//! ## Wire format
//!
//! [`encode`] and [`decode`] speak the registry's persisted representation:
//! `[f1,f2,...,f512]`, each component printed with eight decimal digits,
//! ASCII, comma-separated, no whitespace. Existing persisted data uses
//! exactly this shape, so both directions are strict.

mod error;
mod normalize;
mod types;
mod wire;

pub use crate::error::CodecError;
pub use crate::normalize::{normalize, NORM_EPSILON};
pub use crate::types::{Embedding, NormalizedEmbedding, EMBEDDING_DIM};
pub use crate::wire::{decode, encode};
