//! Input coercion (component K, first half): `validate` accepts three input
//! shapes and normalizes each to a `serde_json::Value` before evaluation.
use serde_json::Value;

/// Something that can be coerced into a generic JSON value before
/// evaluation: raw text bytes, an already-parsed [`Value`], or a
/// host-language typed record that implements [`serde::Serialize`] (the
/// idiomatic Rust stand-in for §4.K's "typed record… reflected into a
/// generic value using the field-naming contract of §6").
pub trait IntoInstance {
    /// # Errors
    /// A JSON parse failure for the bytes variant; serialization failure for
    /// the typed-record variant.
    fn into_instance(self) -> Result<Value, serde_json::Error>;
}

impl IntoInstance for Value {
    fn into_instance(self) -> Result<Value, serde_json::Error> {
        Ok(self)
    }
}

impl IntoInstance for &Value {
    fn into_instance(self) -> Result<Value, serde_json::Error> {
        Ok(self.clone())
    }
}

impl IntoInstance for &[u8] {
    fn into_instance(self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(self)
    }
}

impl IntoInstance for &str {
    fn into_instance(self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(self)
    }
}

/// A typed record reflected via `serde`, per §6.4's field-naming contract
/// (`#[serde(rename = "...")]` stands in for the external-name attribute,
/// `#[serde(skip)]` for `-`, `#[serde(skip_serializing_if = "...")]` for the
/// `omitempty` marker).
pub struct TypedRecord<T>(pub T);

impl<T: serde::Serialize> IntoInstance for TypedRecord<T> {
    fn into_instance(self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct Account {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        nickname: Option<String>,
    }

    #[test]
    fn bytes_parse_as_json() {
        let value = br#"{"a":1}"#.as_slice().into_instance().unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn typed_record_reflects_via_serde() {
        let record = Account { name: "Ada".to_string(), nickname: None };
        let value = TypedRecord(record).into_instance().unwrap();
        assert_eq!(value, json!({"name": "Ada"}));
    }
}
