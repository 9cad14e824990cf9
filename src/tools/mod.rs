mod dispatch;

pub use dispatch::{ToolCallSpec, ToolContext, dispatch_call, tool_declarations};

use serde_json::{Value, json};

use crate::calories::CalorieError;
use crate::remote::RemoteError;
use crate::storage::StoreError;

/// One declared tool, in the shape agent runtimes consume.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters_json_schema: Value,
}

pub(crate) fn ok_envelope(result: Value) -> Value {
    json!({
        "ok": true,
        "result": result
    })
}

pub(crate) fn error_envelope(code: &str, message: String, details: Value) -> Value {
    json!({
        "ok": false,
        "error": {
            "code": code,
            "message": message,
            "details": details
        }
    })
}

pub(crate) fn store_error_envelope(err: StoreError) -> Value {
    let code = match &err {
        StoreError::InvalidInput(_) => "invalid_input",
        StoreError::NotFound(_) => "not_found",
        StoreError::Empty(_) => "empty",
        StoreError::Corrupt { .. } => "corrupt",
        StoreError::Io { .. } => "io_failure",
    };
    error_envelope(code, err.to_string(), json!({}))
}

pub(crate) fn remote_error_envelope(err: RemoteError) -> Value {
    let (code, details) = match &err {
        RemoteError::MissingCredential(name) => ("config_missing", json!({"credential": name})),
        RemoteError::HttpStatus { status, .. } => ("remote_error", json!({"status": status})),
        RemoteError::Transport(_) | RemoteError::Parse(_) => ("remote_error", json!({})),
        RemoteError::NoResults => ("empty", json!({})),
    };
    error_envelope(code, err.to_string(), details)
}

pub(crate) fn calorie_error_envelope(err: CalorieError) -> Value {
    let details = match &err {
        CalorieError::InvalidSex(value) => json!({"sex": value}),
        CalorieError::NonFinite(field) => json!({"field": field}),
    };
    error_envelope("invalid_input", err.to_string(), details)
}
