// src/ingest/providers/mod.rs
pub mod json_file;
pub mod tsml_http;

pub use json_file::JsonFileProvider;
pub use tsml_http::TsmlHttpProvider;

use anyhow::{anyhow, Context, Result};
use serde_json::Value;

/// Parse a feed body; anything but a top-level array is an error.
pub(crate) fn parse_feed_body(body: &str) -> Result<Vec<Value>> {
    let v: Value = serde_json::from_str(body.trim()).context("feed body is not valid JSON")?;
    match v {
        Value::Array(items) => Ok(items),
        other => Err(anyhow!(
            "feed JSON is not an array (got {})",
            json_kind(&other)
        )),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
