use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::Value;

// https://tools.ietf.org/html/rfc5849#section-3.6
// Only ALPHA, DIGIT, '-', '.', '_' and '~' stay as they are. That also covers
// '+', '!', '*', '\'', '(' and ')', which lenient URL encoders leave alone.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Result of encoding a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    Scalar(String),
    List(Vec<String>),
}

impl Encoded {
    /// Collapses a list into one comma-separated value, escaping the commas.
    pub fn into_joined(self) -> String {
        match self {
            Encoded::Scalar(s) => s,
            Encoded::List(items) => items.join("%2C"),
        }
    }
}

/// Percent-encodes a single string.
pub fn encode_str(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

/// Percent-encodes a parameter value. Lists are encoded element-wise, raw
/// bytes encode to the empty string.
pub fn encode(value: &Value) -> Encoded {
    match value {
        Value::Scalar(s) => Encoded::Scalar(encode_str(s)),
        Value::List(items) => Encoded::List(items.iter().map(|s| encode_str(s)).collect()),
        Value::Bytes(_) => Encoded::Scalar(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_characters() {
        assert_eq!(encode_str("+"), "%2B");
        assert_eq!(encode_str("!"), "%21");
        assert_eq!(encode_str("*"), "%2A");
        assert_eq!(encode_str("'"), "%27");
        assert_eq!(encode_str("("), "%28");
        assert_eq!(encode_str(")"), "%29");
        assert_eq!(encode_str(" "), "%20");
    }

    #[test]
    fn unreserved_characters() {
        assert_eq!(encode_str("test-value_123.txt~"), "test-value_123.txt~");
        assert_eq!(encode_str("foo=bar&baz"), "foo%3Dbar%26baz");
        assert_eq!(encode_str("少女"), "%E5%B0%91%E5%A5%B3");
    }

    #[test]
    fn reencoding_never_restores_raw_characters() {
        let once = encode_str("a+b!c*d'e(f)g");
        assert_eq!(once, "a%2Bb%21c%2Ad%27e%28f%29g");
        let twice = encode_str(&once);
        assert_eq!(twice, "a%252Bb%2521c%252Ad%2527e%2528f%2529g");
        for raw in &['+', '!', '*', '\'', '(', ')'] {
            assert!(!once.contains(*raw));
            assert!(!twice.contains(*raw));
        }
    }

    #[test]
    fn lists_encode_element_wise() {
        let encoded = encode(&Value::from(vec!["a b", "c,d"]));
        assert_eq!(
            encoded,
            Encoded::List(vec!["a%20b".to_string(), "c%2Cd".to_string()])
        );
        assert_eq!(encoded.into_joined(), "a%20b%2Cc%2Cd");
    }

    #[test]
    fn bytes_encode_to_empty() {
        assert_eq!(
            encode(&Value::bytes(vec![0x89, 0x50])),
            Encoded::Scalar(String::new())
        );
    }
}
