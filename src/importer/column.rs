// ==========================================
// Manifest Registry - Column Reference Resolver
// ==========================================
// Spreadsheet column labels use a bijective base-26 scheme:
// letters are valued 1-26 and there is no zero digit, so
// A=1, Z=26, AA=27, AZ=52, BA=53. Pure functions, no state.
// ==========================================

use crate::importer::error::ImportError;

/// Convert a column label to its 1-based numeric index.
///
/// Case-insensitive. Empty or non-alphabetic input is a
/// configuration error.
pub fn column_label_to_index(label: &str) -> Result<usize, ImportError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(ImportError::InvalidColumnLabel(label.to_string()));
    }

    let mut index: usize = 0;
    for ch in trimmed.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(ImportError::InvalidColumnLabel(label.to_string()));
        }
        let value = (ch.to_ascii_uppercase() as usize) - ('A' as usize) + 1;
        index = index * 26 + value;
    }
    Ok(index)
}

/// Convert a 1-based numeric index back to its column label.
///
/// Exact inverse of [`column_label_to_index`]; index 0 is a
/// configuration error.
pub fn column_index_to_label(index: usize) -> Result<String, ImportError> {
    if index == 0 {
        return Err(ImportError::InvalidColumnLabel("0".to_string()));
    }

    let mut n = index;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.reverse();
    Ok(letters.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spot_values() {
        assert_eq!(column_label_to_index("A").unwrap(), 1);
        assert_eq!(column_label_to_index("Z").unwrap(), 26);
        assert_eq!(column_label_to_index("AA").unwrap(), 27);
        assert_eq!(column_label_to_index("AZ").unwrap(), 52);
        assert_eq!(column_label_to_index("BA").unwrap(), 53);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(column_label_to_index("aa").unwrap(), 27);
        assert_eq!(column_label_to_index("Ba").unwrap(), 53);
    }

    #[test]
    fn test_invalid_labels() {
        assert!(column_label_to_index("").is_err());
        assert!(column_label_to_index("  ").is_err());
        assert!(column_label_to_index("A1").is_err());
        assert!(column_label_to_index("Ă").is_err());
        assert!(column_index_to_label(0).is_err());
    }

    #[test]
    fn test_round_trip_one_to_three_letters() {
        // every label from "A" to "ZZZ"
        let max = column_label_to_index("ZZZ").unwrap();
        for index in 1..=max {
            let label = column_index_to_label(index).unwrap();
            assert!(label.len() <= 3);
            assert_eq!(column_label_to_index(&label).unwrap(), index);
        }
    }
}
