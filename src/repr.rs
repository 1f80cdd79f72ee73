//! Text rendering of host values
//!
//! The session file stores values in the host scripting runtime's default
//! string form: shortest round-trip floats that always carry a fractional part
//! or an exponent (`1.0`, `0.1`, `1e-05`, `1e+16`), and tuples written as
//! `(x, y, z)`. The spline de-duplication filter also compares values through
//! this text form, so the exact rendering matters beyond cosmetics.

use crate::{DumpError, Result};

/// Characters of the spline position text kept by [`truncate_repr`] in the sampler
pub const SPLINE_REPR_WIDTH: usize = 7;

/// Render a float in shortest round-trip form with a two-digit signed exponent.
pub fn repr_f64(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // Debug already switches to exponent form outside [1e-4, 1e16)
    let text = format!("{value:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

/// Render a vector as a tuple, e.g. `(1.0, -0.5, 2.25)`.
pub fn repr_tuple(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| repr_f64(*v)).collect();
    format!("({})", parts.join(", "))
}

/// Truncate the text form of `value` to `width` characters and parse it back.
///
/// This is character truncation, not rounding: a leading sign consumes one of
/// the kept characters, and an exponent form may be cut into text that no
/// longer parses, which is reported as a [`DumpError::Parse`].
pub fn truncate_repr(value: f64, width: usize) -> Result<f64> {
    let text = repr_f64(value);
    let head: String = text.chars().take(width).collect();
    head.parse::<f64>().map_err(|e| {
        DumpError::parse_error("spline position truncation", format!("'{head}' (from '{text}'): {e}"))
    })
}

/// Parse a tuple rendered by [`repr_tuple`]. Brackets are accepted as well.
pub(crate) fn parse_tuple(text: &str) -> Option<Vec<f64>> {
    let inner = text
        .trim()
        .strip_prefix(['(', '['])?
        .strip_suffix([')', ']'])?
        .trim();
    if inner.is_empty() {
        return Some(Vec::new());
    }
    inner.split(',').map(|part| part.trim().parse::<f64>().ok()).collect()
}
