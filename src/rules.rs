use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub const LIST_PATH: &str = "/activity/silence/";
pub const CREATE_PATH: &str = "/activity/silence/create/";

pub fn edit_path(rule_id: u64) -> String {
    format!("/activity/silence/{rule_id}/edit/")
}

pub fn delete_path(rule_id: u64) -> String {
    format!("/activity/silence/{rule_id}/delete/")
}

pub fn toggle_path(rule_id: u64) -> String {
    format!("/activity/silence/{rule_id}/toggle/")
}

pub fn device_delete_path(device_id: u64) -> String {
    format!("/device/{device_id}/delete/")
}

/// Which activity change kinds a rule silences. Values the client does not
/// know are kept verbatim so they still round-trip and render.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    #[default]
    All,
    Added,
    Changed,
    Removed,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::All => "all",
            EventType::Added => "added",
            EventType::Changed => "changed",
            EventType::Removed => "removed",
            EventType::Other(raw) => raw.as_str(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            EventType::All => "All",
            EventType::Added => "Added",
            EventType::Changed => "Changed",
            EventType::Removed => "Removed",
            EventType::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for EventType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "all" => EventType::All,
            "added" => EventType::Added,
            "changed" => EventType::Changed,
            "removed" => EventType::Removed,
            _ => EventType::Other(raw),
        }
    }
}

impl From<EventType> for String {
    fn from(kind: EventType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_host_pattern() -> String {
    "*".to_string()
}

fn default_active() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SilenceRule {
    pub id: u64,
    pub key_pattern: String,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default = "default_host_pattern")]
    pub host_pattern: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RuleList {
    #[serde(default)]
    pub rules: Vec<SilenceRule>,
}

/// `{success, message?}` as returned by delete endpoints.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ActionReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ToggleReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubmitReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Option<FormErrors>,
}

/// Validation errors from create/edit: keyed by field, or a flat list.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FormErrors {
    Fields(Map<String, Value>),
    List(Vec<String>),
    Message(String),
}

impl FormErrors {
    /// One display line per message, `field: message` for keyed errors,
    /// in the order the server sent them.
    pub fn messages(&self) -> Vec<String> {
        match self {
            FormErrors::Fields(fields) => fields
                .iter()
                .flat_map(|(field, value)| {
                    field_messages(value)
                        .into_iter()
                        .map(move |message| format!("{field}: {message}"))
                })
                .collect(),
            FormErrors::List(messages) => messages.clone(),
            FormErrors::Message(message) => vec![message.clone()],
        }
    }
}

fn field_messages(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(value_text).collect(),
        other => vec![value_text(other)],
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(obj) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_event_type_is_kept_verbatim() {
        let rule: SilenceRule = serde_json::from_str(
            r#"{"id": 4, "key_pattern": "pkg-*", "event_type": "renamed"}"#,
        )
        .unwrap();
        assert_eq!(rule.event_type, EventType::Other("renamed".into()));
        assert_eq!(rule.event_type.label(), "renamed");
        assert_eq!(rule.host_pattern, "*");
        assert!(rule.is_active);
    }

    #[test]
    fn field_errors_keep_server_order() {
        let reply: SubmitReply = serde_json::from_str(
            r#"{"success": false, "errors": {"key_pattern": ["required"], "host_pattern": ["too long", "bad glob"]}}"#,
        )
        .unwrap();
        assert!(!reply.success);
        assert_eq!(
            reply.errors.unwrap().messages(),
            vec![
                "key_pattern: required",
                "host_pattern: too long",
                "host_pattern: bad glob"
            ]
        );
    }

    #[test]
    fn flat_errors_are_listed_as_is() {
        let reply: SubmitReply =
            serde_json::from_str(r#"{"success": false, "errors": ["duplicate rule"]}"#).unwrap();
        assert_eq!(reply.errors.unwrap().messages(), vec!["duplicate rule"]);
    }

    #[test]
    fn paths_match_server_routes() {
        assert_eq!(edit_path(7), "/activity/silence/7/edit/");
        assert_eq!(toggle_path(7), "/activity/silence/7/toggle/");
        assert_eq!(device_delete_path(12), "/device/12/delete/");
    }
}
