// SPDX-License-Identifier: MIT
//! Null-safe field extraction from the raw webhook payload.
//!
//! Webhook bodies are handled as loosely-typed [`serde_json::Value`] — the
//! host adds and renames fields between versions, so nothing here is allowed
//! to fail. Every accessor is total over arbitrary missing or mistyped input
//! and synthesizes "absent" instead of erroring.

use serde_json::Value;

pub fn object_kind(payload: &Value) -> Option<&str> {
    payload.get("object_kind").and_then(Value::as_str)
}

pub fn action(payload: &Value) -> Option<&str> {
    payload
        .get("object_attributes")
        .and_then(|oa| oa.get("action"))
        .and_then(Value::as_str)
}

/// Project id, preferring the embedded project object over the
/// merge-request attribute.
pub fn project_id(payload: &Value) -> Option<u64> {
    payload
        .get("project")
        .and_then(|p| p.get("id"))
        .and_then(Value::as_u64)
        .or_else(|| target_project_id(payload))
}

/// The `target_project_id` attribute alone. The failure path uses this
/// directly so it stays independent of whatever the pipeline extracted.
pub fn target_project_id(payload: &Value) -> Option<u64> {
    payload
        .get("object_attributes")
        .and_then(|oa| oa.get("target_project_id"))
        .and_then(Value::as_u64)
}

pub fn iid(payload: &Value) -> Option<u64> {
    payload
        .get("object_attributes")
        .and_then(|oa| oa.get("iid"))
        .and_then(Value::as_u64)
}

pub fn title(payload: &Value) -> Option<&str> {
    payload
        .get("object_attributes")
        .and_then(|oa| oa.get("title"))
        .and_then(Value::as_str)
}

pub fn description(payload: &Value) -> Option<&str> {
    payload
        .get("object_attributes")
        .and_then(|oa| oa.get("description"))
        .and_then(Value::as_str)
}

pub fn author(payload: &Value) -> Option<&str> {
    payload
        .get("user")
        .and_then(|u| u.get("name"))
        .and_then(Value::as_str)
}
