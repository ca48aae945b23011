use serde_json::Value;

use crate::{ToolError, ToolParams};

pub fn require_str<'a>(params: &'a ToolParams, key: &str) -> Result<&'a str, ToolError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidParams(format!("missing required parameter: {key}")))
}

/// A string parameter; absent and `null` both read as `None`.
pub fn optional_str<'a>(params: &'a ToolParams, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

/// A non-negative integer given either as a number or a numeric string.
pub fn optional_usize(params: &ToolParams, key: &str) -> Result<Option<usize>, ToolError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|v| Some(v as usize))
            .ok_or_else(|| ToolError::InvalidParams(format!("{key} must be a non-negative integer"))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ToolError::InvalidParams(format!("{key} must be a non-negative integer"))),
        Some(_) => Err(ToolError::InvalidParams(format!(
            "{key} must be a non-negative integer"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(v: Value) -> ToolParams {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn require_str_present() {
        let p = params(json!({"keyword": "TODO"}));
        assert_eq!(require_str(&p, "keyword").unwrap(), "TODO");
    }

    #[test]
    fn require_str_missing_or_wrong_type() {
        let p = params(json!({"keyword": 5}));
        assert!(matches!(require_str(&p, "keyword"), Err(ToolError::InvalidParams(_))));
        assert!(require_str(&p, "other").unwrap_err().to_string().contains("other"));
    }

    #[test]
    fn optional_usize_forms() {
        let p = params(json!({"a": 50, "b": "100", "c": null, "d": "many", "e": -1}));
        assert_eq!(optional_usize(&p, "a").unwrap(), Some(50));
        assert_eq!(optional_usize(&p, "b").unwrap(), Some(100));
        assert_eq!(optional_usize(&p, "c").unwrap(), None);
        assert_eq!(optional_usize(&p, "missing").unwrap(), None);
        assert!(optional_usize(&p, "d").is_err());
        assert!(optional_usize(&p, "e").is_err());
    }
}
