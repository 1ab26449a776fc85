//! Turns a user-supplied input string into tape symbols.

use crate::types::{InputError, Spec, Symbol};

/// Splits `raw` into symbols for `spec`.
///
/// A string containing whitespace is split on whitespace, so symbols may be several
/// characters long; otherwise every character is its own symbol. Neither form may contain
/// the blank symbol or the left-end marker.
pub fn tokenize(raw: &str, spec: &Spec) -> Result<Vec<Symbol>, InputError> {
    let raw = raw.trim();

    let symbols: Vec<Symbol> = if raw.contains(char::is_whitespace) {
        raw.split_whitespace().map(String::from).collect()
    } else {
        raw.chars().map(String::from).collect()
    };

    for symbol in &symbols {
        if *symbol == spec.blank {
            return Err(InputError::ContainsBlank(symbol.clone()));
        }
        if *symbol == spec.left {
            return Err(InputError::ContainsLeftMarker(symbol.clone()));
        }
    }

    Ok(symbols)
}
