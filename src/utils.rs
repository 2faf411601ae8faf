//! URL and body encoding helpers

use crate::error::{RequestError, Result};
use url::form_urlencoded;
use url::Url;

/// URL parsing and query assembly utilities
pub struct UrlUtils;

impl UrlUtils {
    /// Parse a base URL, normalizing it per URL semantics
    pub fn parse_base(input: &str) -> Result<Url> {
        Url::parse(input)
            .map_err(|e| RequestError::InvalidUrl(format!("Invalid URL '{}': {}", input, e)))
    }

    /// Append query pairs in order. An empty slice leaves the URL untouched.
    pub fn append_query(url: &mut Url, pairs: &[(String, String)]) {
        if pairs.is_empty() {
            return;
        }
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            query.append_pair(key, value);
        }
    }
}

/// Form body encoding utilities
pub struct FormUtils;

impl FormUtils {
    /// Encode pairs as an `application/x-www-form-urlencoded` body
    pub fn encode(pairs: &[(String, String)]) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in pairs {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}
