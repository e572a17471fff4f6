use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use crate::auth::dto::SignUpRequest;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Signup metadata stored on the identity. Blank values are left out.
pub(crate) fn signup_metadata(req: &SignUpRequest) -> Map<String, Value> {
    let mut meta = Map::new();
    for (key, value) in [("username", &req.username), ("full_name", &req.full_name)] {
        if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            meta.insert(key.to_string(), Value::String(v.to_string()));
        }
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_valid_email("cook@example.com"));
        assert!(!is_valid_email("cook@example"));
        assert!(!is_valid_email("cook example@x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Cook@Example.COM "), "cook@example.com");
    }

    #[test]
    fn metadata_skips_blank_values() {
        let req = SignUpRequest {
            email: "a@b.co".into(),
            password: "whatever1".into(),
            username: Some("  ".into()),
            full_name: Some(" Ada Lovelace ".into()),
        };
        let meta = signup_metadata(&req);
        assert!(meta.get("username").is_none());
        assert_eq!(meta["full_name"], "Ada Lovelace");
    }
}
