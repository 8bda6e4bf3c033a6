//! Percent-encoding for chat message bodies
//!
//! The chat endpoint takes `application/x-www-form-urlencoded` bodies. The
//! encoder is deliberately narrow: ASCII letters and digits pass through,
//! space becomes `%20`, and every other byte becomes `%XX` in uppercase hex.
//! Encoding is byte-wise, so a multi-byte UTF-8 character (emoji included)
//! becomes one escape per byte.
//!
//! [`percent_encode`] returns a `Display` adapter so the encoded text can be
//! written straight into a request body without an intermediate buffer.

use core::fmt::{self, Write};

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Lazily percent-encoded view of a string
#[derive(Debug, Clone, Copy)]
pub struct PercentEncode<'a> {
    input: &'a str,
}

/// Percent-encode `input` for a form body
pub fn percent_encode(input: &str) -> PercentEncode<'_> {
    PercentEncode { input }
}

impl fmt::Display for PercentEncode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in self.input.as_bytes() {
            if byte.is_ascii_alphanumeric() {
                f.write_char(byte as char)?;
            } else if byte == b' ' {
                f.write_str("%20")?;
            } else {
                f.write_char('%')?;
                f.write_char(HEX[usize::from(byte >> 4)] as char)?;
                f.write_char(HEX[usize::from(byte & 0x0F)] as char)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn alphanumerics_pass_through() {
        assert_eq!(percent_encode("abcXYZ019").to_string(), "abcXYZ019");
    }

    #[test]
    fn spaces_and_punctuation() {
        assert_eq!(percent_encode("a b&c").to_string(), "a%20b%26c");
        assert_eq!(percent_encode("PPM: 12.5").to_string(), "PPM%3A%2012%2E5");
        assert_eq!(percent_encode("-_~*").to_string(), "%2D%5F%7E%2A");
        assert_eq!(percent_encode("\n").to_string(), "%0A");
    }

    #[test]
    fn multibyte_is_bytewise() {
        assert_eq!(percent_encode("é").to_string(), "%C3%A9");
        assert_eq!(percent_encode("🚨").to_string(), "%F0%9F%9A%A8");
    }

    #[test]
    fn empty_input() {
        assert_eq!(percent_encode("").to_string(), "");
    }

    proptest! {
        #[test]
        fn output_is_unreserved_ascii(input in ".*") {
            let encoded = percent_encode(&input).to_string();
            prop_assert!(encoded.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'%'));
        }

        #[test]
        fn each_escaped_byte_costs_three(input in ".*") {
            let encoded = percent_encode(&input).to_string();
            let plain = input.bytes().filter(|b| b.is_ascii_alphanumeric()).count();
            let escaped = input.len() - plain;
            prop_assert_eq!(encoded.len(), plain + 3 * escaped);
        }
    }
}
