//! # Text–Model Alignment
//!
//! The model labels normalized sentence strings; callers need byte offsets
//! into the original, un-normalized text. This module closes that gap:
//! [`boundary`] locates each re-joined sentence in the original text,
//! [`recover`] maps each predicted label back onto an exact span inside its
//! sentence window. Everything here is bounded search with explicit
//! fallbacks — there is no failure path that panics or errors.

pub mod boundary;
pub mod recover;

pub use boundary::{BoundaryReconstructor, DEFAULT_BUFFER};
pub use recover::recover_entities;

/// Largest byte index `<= idx` that lies on a `char` boundary of `text`.
///
/// Offsets produced by arithmetic (buffer subtraction, expected-length
/// fallback, repair windows) may land inside a multi-byte character; every
/// such offset is clamped through here before slicing.
pub(crate) fn floor_char_boundary(text: &str, idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    let mut idx = idx;
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
