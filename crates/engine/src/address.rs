//! A1-style cell addressing.
//!
//! Columns use bijective base-26 letters (A..Z, AA, AB, ...); rows are
//! 1-based in the display form and 0-based everywhere else. Parsing and
//! formatting are plain integer arithmetic.

use crate::error::GridError;

/// Convert 0-based column index to Excel-style letter(s).
pub fn col_to_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// Convert column letters back to the 0-based index. Accepts either case.
pub fn letters_to_col(letters: &str) -> Result<usize, GridError> {
    if letters.is_empty() {
        return Err(GridError::InvalidAddress(letters.to_string()));
    }
    let mut col: usize = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(GridError::InvalidAddress(letters.to_string()));
        }
        let digit = c.to_ascii_uppercase() as usize - 'A' as usize + 1;
        col = col
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| GridError::InvalidAddress(letters.to_string()))?;
    }
    Ok(col - 1)
}

/// Display form of a 0-based coordinate pair, e.g. (0, 0) -> "A1".
pub fn cell_address(row: usize, col: usize) -> String {
    format!("{}{}", col_to_letters(col), row + 1)
}

/// Parse an A1-style address into a 0-based `(row, col)` pair.
///
/// The address is one or more letters followed by one or more digits with
/// nothing before, between, or after. Row numbers start at 1.
pub fn parse_address(addr: &str) -> Result<(usize, usize), GridError> {
    let split = addr
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(addr.len());
    let (letters, digits) = addr.split_at(split);

    if letters.is_empty() || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(GridError::InvalidAddress(addr.to_string()));
    }
    let col = letters_to_col(letters).map_err(|_| GridError::InvalidAddress(addr.to_string()))?;
    let row_1based: usize = digits
        .parse()
        .map_err(|_| GridError::InvalidAddress(addr.to_string()))?;
    if row_1based == 0 {
        return Err(GridError::InvalidAddress(addr.to_string()));
    }
    Ok((row_1based - 1, col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_to_letters() {
        assert_eq!(col_to_letters(0), "A");
        assert_eq!(col_to_letters(1), "B");
        assert_eq!(col_to_letters(25), "Z");
        assert_eq!(col_to_letters(26), "AA");
        assert_eq!(col_to_letters(27), "AB");
        assert_eq!(col_to_letters(701), "ZZ");
        assert_eq!(col_to_letters(702), "AAA");
    }

    #[test]
    fn test_letters_to_col() {
        assert_eq!(letters_to_col("A").unwrap(), 0);
        assert_eq!(letters_to_col("Z").unwrap(), 25);
        assert_eq!(letters_to_col("AA").unwrap(), 26);
        assert_eq!(letters_to_col("ZZ").unwrap(), 701);
        assert_eq!(letters_to_col("AAA").unwrap(), 702);
        assert_eq!(letters_to_col("c").unwrap(), 2, "lowercase is normalized");
    }

    #[test]
    fn test_letters_to_col_rejects_garbage() {
        assert!(letters_to_col("").is_err());
        assert!(letters_to_col("A1").is_err());
        assert!(letters_to_col("Ä").is_err());
        assert!(letters_to_col("A A").is_err());
    }

    #[test]
    fn test_col_round_trip_through_zzz() {
        // 18278 = AAAA, so this covers every 1-3 letter column
        for col in 0..18278 {
            let letters = col_to_letters(col);
            assert_eq!(
                letters_to_col(&letters).unwrap(),
                col,
                "round trip failed for column {} ({})",
                col,
                letters
            );
        }
    }

    #[test]
    fn test_cell_address() {
        assert_eq!(cell_address(0, 0), "A1");
        assert_eq!(cell_address(9, 26), "AA10");
        assert_eq!(cell_address(29, 7), "H30");
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("A1").unwrap(), (0, 0));
        assert_eq!(parse_address("AA10").unwrap(), (9, 26));
        assert_eq!(parse_address("b2").unwrap(), (1, 1));
        assert_eq!(parse_address("ZZ100").unwrap(), (99, 701));
    }

    #[test]
    fn test_parse_address_rejects_malformed() {
        for bad in ["", "A", "1", "A0", "1A", "A1B", "A-1", "A+1", " A1", "A1 ", "A1.5"] {
            assert!(
                parse_address(bad).is_err(),
                "expected parse failure for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_address_round_trip() {
        for &(row, col) in &[(0, 0), (0, 25), (0, 26), (99, 701), (999, 702), (29, 7)] {
            let addr = cell_address(row, col);
            assert_eq!(parse_address(&addr).unwrap(), (row, col), "addr {}", addr);
        }
    }
}
