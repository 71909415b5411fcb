use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Per-field validation messages, e.g. `{"mobile": ["already in use"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    /// Interprets a backend error body as a field map.
    ///
    /// Only a plain object whose values are strings or string arrays
    /// qualifies; a lone `detail` key is a general message, not a field.
    pub fn from_json(body: &serde_json::Value) -> Option<Self> {
        let object = body.as_object()?;
        if object.is_empty() || (object.len() == 1 && object.contains_key("detail")) {
            return None;
        }

        let mut errors = FieldErrors::new();
        for (field, value) in object {
            match value {
                serde_json::Value::String(message) => errors.add(field.as_str(), message.as_str()),
                serde_json::Value::Array(items) => {
                    for item in items {
                        let message = item.as_str()?;
                        errors.add(field.as_str(), message);
                    }
                }
                _ => return None,
            }
        }
        Some(errors)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_field_map() {
        let errors = FieldErrors::from_json(&json!({
            "mobile": ["A user with this mobile number already exists."],
            "password": "Ensure this field has at least 8 characters."
        }))
        .unwrap();
        assert!(errors.contains("mobile"));
        assert_eq!(errors.get("password").unwrap().len(), 1);
        assert_eq!(
            errors.to_string(),
            "mobile: A user with this mobile number already exists.; \
             password: Ensure this field has at least 8 characters."
        );
    }

    #[test]
    fn detail_only_body_is_not_a_field_map() {
        assert!(FieldErrors::from_json(&json!({"detail": "Invalid credentials"})).is_none());
        assert!(FieldErrors::from_json(&json!(["oops"])).is_none());
        assert!(FieldErrors::from_json(&json!({"count": 3})).is_none());
    }
}
