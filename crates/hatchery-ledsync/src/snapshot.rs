use serde::Deserialize;
use serde_json::Value;

/// One pushed state of the `led_control/status` document.
///
/// The array elements stay as raw JSON values; the remote side has
/// historically written booleans, 0/1 integers, and the odd string, so
/// they are coerced per [`truthy`] at apply time.
#[derive(Debug, Clone)]
pub struct LedSnapshot {
    pub leds: Vec<Value>,
    pub all_on: bool,
}

/// Wire frame for a document push. `exists: false` marks a deleted or
/// never-created document; a missing `leds` field reads as an empty
/// array, matching the controller app's defaults.
#[derive(Debug, Deserialize)]
struct StatusFrame {
    #[serde(default = "default_exists")]
    exists: bool,
    #[serde(default)]
    leds: Vec<Value>,
    #[serde(rename = "allOn", default)]
    all_on: Value,
}

fn default_exists() -> bool {
    true
}

/// Decode a pushed text frame. `Ok(None)` means the document is absent
/// and the update should be skipped.
pub fn parse_frame(text: &str) -> Result<Option<LedSnapshot>, serde_json::Error> {
    let frame: StatusFrame = serde_json::from_str(text)?;
    if !frame.exists {
        return Ok(None);
    }
    Ok(Some(LedSnapshot {
        leds: frame.leds,
        all_on: truthy(&frame.all_on),
    }))
}

/// JS-style truthiness: `false`, `0`, `NaN`, `""` and `null` are low,
/// everything else is high.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_follows_js_rules() {
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!(0.0)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!(1)));
        assert!(truthy(&json!(-3)));
        assert!(truthy(&json!("on")));
        assert!(truthy(&json!([])));
        assert!(truthy(&json!({})));
    }

    #[test]
    fn parses_a_full_frame() {
        let snap = parse_frame(r#"{"leds":[true,false,1],"allOn":true}"#)
            .unwrap()
            .unwrap();
        assert_eq!(snap.leds.len(), 3);
        assert!(snap.all_on);
    }

    #[test]
    fn absent_document_is_skipped() {
        assert!(parse_frame(r#"{"exists":false}"#).unwrap().is_none());
    }

    #[test]
    fn missing_fields_read_as_empty_and_off() {
        let snap = parse_frame("{}").unwrap().unwrap();
        assert!(snap.leds.is_empty());
        assert!(!snap.all_on);
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(parse_frame("not json").is_err());
    }
}
