//! Result formatting for module invocations

use crate::error::Error;
use crate::zoho::http::hint_for_status;
use serde_json::{json, Map, Value};

/// Successful module result
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleOutput {
    pub changed: bool,
    pub msg: String,
    /// `{"before": {...}, "after": {...}}` in diff mode
    pub diff: Option<Value>,
    /// Resource payload (`item`, `zohobooks_items`, `count`, ...)
    pub payload: Map<String, Value>,
}

impl ModuleOutput {
    pub fn new(changed: bool, msg: impl Into<String>) -> Self {
        Self {
            changed,
            msg: msg.into(),
            diff: None,
            payload: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.payload.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    pub fn into_json(self) -> Value {
        let mut out = self.payload;
        out.insert("changed".to_string(), Value::Bool(self.changed));
        out.insert("msg".to_string(), Value::String(self.msg));
        if let Some(diff) = self.diff {
            out.insert("diff".to_string(), diff);
        }
        Value::Object(out)
    }
}

/// Failure result for an error
pub fn failure(err: &Error) -> Value {
    let mut msg = err.to_string();
    if let Some(hint) = err.status().and_then(hint_for_status) {
        msg = format!("{} ({})", msg, hint);
    }

    let mut out = json!({
        "failed": true,
        "changed": false,
        "msg": msg,
    });
    if let Some(status) = err.status() {
        out["status"] = json!(status);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_json_shape() {
        let out = ModuleOutput::new(true, "Item created successfully")
            .with("item", json!({"item_id": "1"}))
            .into_json();
        assert_eq!(out["changed"], json!(true));
        assert_eq!(out["msg"], json!("Item created successfully"));
        assert_eq!(out["item"]["item_id"], json!("1"));
        assert!(out.get("diff").is_none());
    }

    #[test]
    fn test_failure_carries_status_and_hint() {
        let err = Error::api(401, Some(57), "API request failed: 401 - You are not authorized");
        let out = failure(&err);
        assert_eq!(out["failed"], json!(true));
        assert_eq!(out["changed"], json!(false));
        assert_eq!(out["status"], json!(401));
        let msg = out["msg"].as_str().unwrap();
        assert!(msg.starts_with("API request failed: 401"));
        assert!(msg.contains("access_token"));
    }

    #[test]
    fn test_configuration_failure_has_no_status() {
        let out = failure(&Error::config("missing required arguments: name"));
        assert_eq!(out["msg"], json!("missing required arguments: name"));
        assert!(out.get("status").is_none());
    }
}
