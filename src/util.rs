//! Small helpers shared by tests and diagnostics.

/// Lowercase hex rendering of a byte slice.
pub fn hex_of_bytes(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        use std::fmt::Write as _;
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}

/// Inverse of [`hex_of_bytes`]; whitespace between octets is tolerated
/// so byte tables can be written readably.
pub fn bytes_of_hex(src: &str) -> Option<Vec<u8>> {
    let compact: String = src.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() % 2 != 0 {
        return None;
    }
    let mut out = Vec::with_capacity(compact.len() / 2);
    let raw = compact.as_bytes();
    for pair in raw.chunks(2) {
        let hi = (pair[0] as char).to_digit(16)?;
        let lo = (pair[1] as char).to_digit(16)?;
        out.push((hi * 16 + lo) as u8);
    }
    Some(out)
}

/// `hex!("02 ff")` — byte vector from a hex string literal.
#[macro_export]
macro_rules! hex {
    ( $s:expr ) => {
        $crate::util::bytes_of_hex($s).expect("malformed hex literal")
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        assert_eq!(hex_of_bytes(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
        assert_eq!(bytes_of_hex("de ad be ef").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert!(bytes_of_hex("abc").is_none());
        assert!(bytes_of_hex("zz").is_none());
    }
}
