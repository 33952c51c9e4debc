use serde_json::{Map, Value};

/// A loosely-typed value pulled out of a model response.
///
/// The extraction stage can hand back a string, a number, a list, or a nested
/// object for any field depending on how the model chose to phrase its
/// answer. Normalizers pattern-match on this variant instead of probing
/// `serde_json::Value` at every call site.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Missing,
    Text(String),
    Number(f64),
    List(Vec<FieldValue>),
    Map(Map<String, Value>),
}

impl FieldValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Render a scalar the way a human would have typed it: integral numbers
    /// without a trailing `.0`, everything else via its display form.
    pub fn render_scalar(&self) -> Option<String> {
        match self {
            FieldValue::Missing => None,
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{}", n))
                }
            }
            FieldValue::List(_) | FieldValue::Map(_) => None,
        }
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Missing,
            Value::Bool(b) => FieldValue::Text(b.to_string()),
            Value::Number(n) => FieldValue::Number(n.as_f64().unwrap_or(0.0)),
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Array(items) => FieldValue::List(items.iter().map(FieldValue::from).collect()),
            Value::Object(map) => FieldValue::Map(map.clone()),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::from(&value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_variants() {
        assert_eq!(FieldValue::from(json!(null)), FieldValue::Missing);
        assert_eq!(
            FieldValue::from(json!("Tokyo")),
            FieldValue::Text("Tokyo".to_string())
        );
        assert_eq!(FieldValue::from(json!(4)), FieldValue::Number(4.0));
        assert_eq!(
            FieldValue::from(json!(["a", "b"])),
            FieldValue::List(vec![
                FieldValue::Text("a".to_string()),
                FieldValue::Text("b".to_string())
            ])
        );
        assert!(matches!(
            FieldValue::from(json!({"amount": 20000})),
            FieldValue::Map(_)
        ));
    }

    #[test]
    fn test_render_scalar_integral_number() {
        assert_eq!(
            FieldValue::Number(4.0).render_scalar(),
            Some("4".to_string())
        );
        assert_eq!(
            FieldValue::Number(3.5).render_scalar(),
            Some("3.5".to_string())
        );
        assert_eq!(FieldValue::Missing.render_scalar(), None);
    }
}
