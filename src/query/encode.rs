//! Keyword encoding for the GDELT query grammar

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left untouched by the encoder: the RFC 3986 unreserved set
/// plus `/`
const KEYWORD_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Percent-encodes a single keyword
pub fn percent_encode(term: &str) -> String {
    utf8_percent_encode(term, KEYWORD_SET).to_string()
}

/// Encodes an ordered list of keywords into a query fragment
///
/// Several terms are OR'd and each is quoted: `("war" OR "peace")`. A single
/// term is quoted only when encoding changed it, since GDELT rejects quoted
/// phrases shorter than five characters.
pub fn encode_keywords<S: AsRef<str>>(keywords: &[S]) -> String {
    match keywords {
        [single] => {
            let term = single.as_ref();
            let encoded = percent_encode(term);
            if encoded != term {
                format!("\"{}\"", encoded)
            } else {
                encoded
            }
        }
        terms => {
            let encoded: Vec<String> = terms.iter().map(|t| percent_encode(t.as_ref())).collect();
            format!("(\"{}\")", encoded.join("\" OR \""))
        }
    }
}
