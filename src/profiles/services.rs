use serde_json::{Map, Value};

/// Username a new profile starts with: the `username` from signup metadata
/// when present, otherwise the local part of the email.
pub fn default_username(email: &str, metadata: &Map<String, Value>) -> String {
    if let Some(name) = metadata
        .get("username")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return name.to_string();
    }

    match email.split('@').next().map(str::trim) {
        Some(local) if !local.is_empty() => local.to_string(),
        _ => "user".to_string(),
    }
}
