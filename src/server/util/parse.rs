use std::collections::HashSet;

use crate::server::error::AppError;

/// Parses a list of player identifiers typed by an administrator.
///
/// Accepts identifiers separated by commas or newlines. Surrounding whitespace
/// and empty entries are ignored, and repeated identifiers keep only their first
/// occurrence so no identifier is processed twice.
///
/// # Arguments
/// - `raw` - The raw text, e.g. `"123, 456\n789"`
///
/// # Returns
/// - `Ok(Vec<String>)` - Distinct identifiers in input order
/// - `Err(AppError::BadRequest)` - An entry is not a positive integer
pub fn parse_identifiers(raw: &str) -> Result<Vec<String>, AppError> {
    let mut seen = HashSet::new();
    let mut identifiers = Vec::new();

    for entry in raw.split([',', '\n']).map(str::trim).filter(|e| !e.is_empty()) {
        if entry.parse::<u64>().is_err() {
            return Err(AppError::BadRequest(format!(
                "'{}' is not a valid player ID",
                entry
            )));
        }

        if seen.insert(entry) {
            identifiers.push(entry.to_string());
        }
    }

    Ok(identifiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests parsing comma and newline separated input.
    ///
    /// Expected: identifiers in order with whitespace and blanks removed
    #[test]
    fn splits_on_commas_and_newlines() {
        let parsed = parse_identifiers(" 123, 456\n\n789 ,").unwrap();

        assert_eq!(parsed, vec!["123", "456", "789"]);
    }

    /// Tests removal of repeated identifiers.
    ///
    /// Expected: first occurrence kept
    #[test]
    fn drops_duplicates() {
        let parsed = parse_identifiers("5,6,5\n6,7").unwrap();

        assert_eq!(parsed, vec!["5", "6", "7"]);
    }

    /// Tests rejecting a non-numeric entry.
    ///
    /// Expected: Err(BadRequest) naming the entry
    #[test]
    fn rejects_non_numeric_entry() {
        let result = parse_identifiers("123,abc");

        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg.contains("abc")));
    }

    /// Tests parsing empty input.
    ///
    /// Expected: Ok with no identifiers
    #[test]
    fn empty_input_is_empty_list() {
        assert!(parse_identifiers(" \n , ").unwrap().is_empty());
    }
}
