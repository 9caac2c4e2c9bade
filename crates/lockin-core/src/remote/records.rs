//! Identifier normalization for backend records.
//!
//! The backend is inconsistent about where it puts a record's id: the
//! same post may come back as `id`, `post_id` or `p_id` depending on the
//! query. Records are normalized once, when they cross into the app, so
//! everything downstream reads `id`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Post,
    Habit,
    Community,
    User,
}

impl RecordKind {
    /// Identifier fields in priority order.
    pub fn id_fields(self) -> &'static [&'static str] {
        match self {
            RecordKind::Post => &["id", "post_id", "p_id"],
            RecordKind::Habit => &["id", "habit_id", "h_id"],
            RecordKind::Community => &["id", "community_id", "c_id"],
            RecordKind::User => &["id", "user_id", "u_id"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Post => "post",
            RecordKind::Habit => "habit",
            RecordKind::Community => "community",
            RecordKind::User => "user",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved record identifier. Displays as the bare value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

fn as_record_id(value: &Value) -> Option<RecordId> {
    match value {
        Value::Number(n) => Some(
            n.as_i64()
                .map(RecordId::Number)
                .unwrap_or_else(|| RecordId::Text(n.to_string())),
        ),
        Value::String(s) => Some(RecordId::Text(s.clone())),
        _ => None,
    }
}

/// Raw value of the first alias of `kind` holding a number or a string.
fn id_value(kind: RecordKind, record: &Value) -> Option<&Value> {
    kind.id_fields()
        .iter()
        .filter_map(|field| record.get(*field))
        .find(|value| value.is_number() || value.is_string())
}

/// First alias of `kind` holding a usable value. `null` counts as absent.
pub fn resolve_id(kind: RecordKind, record: &Value) -> Option<RecordId> {
    id_value(kind, record).and_then(as_record_id)
}

pub fn missing_identifier(kind: RecordKind) -> CoreError {
    ValidationError::MissingIdentifier {
        kind: kind.to_string(),
        fields: kind.id_fields().join(", "),
    }
    .into()
}

/// Rewrite `record` so `id` holds its canonical identifier.
///
/// # Errors
/// Fails when `record` is not an object or has none of the aliases.
pub fn normalize(kind: RecordKind, mut record: Value) -> Result<Value> {
    // The backend's value is kept as is, so ids outside i64 keep their type.
    let id = id_value(kind, &record)
        .cloned()
        .ok_or_else(|| missing_identifier(kind))?;
    let obj = record
        .as_object_mut()
        .ok_or_else(|| ValidationError::NotAnObject(kind.to_string()))?;
    obj.insert("id".to_string(), id);
    Ok(record)
}

/// Normalize every element of a JSON array result.
pub fn normalize_all(kind: RecordKind, records: Value) -> Result<Vec<Value>> {
    match records {
        Value::Array(items) => items.into_iter().map(|r| normalize(kind, r)).collect(),
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![normalize(kind, other)?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_alias_wins() {
        let post = json!({ "id": 1, "post_id": 2, "p_id": 3 });
        assert_eq!(resolve_id(RecordKind::Post, &post), Some(RecordId::Number(1)));

        let post = json!({ "post_id": 2, "p_id": 3 });
        assert_eq!(resolve_id(RecordKind::Post, &post), Some(RecordId::Number(2)));
    }

    #[test]
    fn null_is_skipped() {
        let habit = json!({ "id": null, "habit_id": null, "h_id": "h-9" });
        assert_eq!(
            resolve_id(RecordKind::Habit, &habit),
            Some(RecordId::Text("h-9".into()))
        );
    }

    #[test]
    fn aliases_are_per_kind() {
        let community = json!({ "post_id": 5, "c_id": 8 });
        assert_eq!(
            resolve_id(RecordKind::Community, &community),
            Some(RecordId::Number(8))
        );
        assert_eq!(resolve_id(RecordKind::User, &community), None);
    }

    #[test]
    fn normalize_writes_canonical_id() {
        let user = normalize(RecordKind::User, json!({ "u_id": 12, "name": "Léa" })).unwrap();
        assert_eq!(user["id"], 12);
        assert_eq!(user["u_id"], 12);
        assert_eq!(user["name"], "Léa");
    }

    #[test]
    fn normalize_keeps_wide_numbers_numeric() {
        let big = json!({ "post_id": u64::MAX });
        let post = normalize(RecordKind::Post, big).unwrap();
        assert_eq!(post["id"], json!(u64::MAX));
        assert!(post["id"].is_u64());

        let float = normalize(RecordKind::Habit, json!({ "h_id": 5.0 })).unwrap();
        assert!(float["id"].is_f64());
        assert_eq!(float["id"], json!(5.0));
    }

    #[test]
    fn normalize_rejects_records_without_id() {
        let err = normalize(RecordKind::Post, json!({ "title": "hi" })).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: post record has no identifier (looked for id, post_id, p_id)"
        );
    }

    #[test]
    fn normalize_all_handles_arrays_and_null() {
        let posts = normalize_all(
            RecordKind::Post,
            json!([{ "p_id": 1 }, { "post_id": "2" }]),
        )
        .unwrap();
        assert_eq!(posts[0]["id"], 1);
        assert_eq!(posts[1]["id"], "2");
        assert!(normalize_all(RecordKind::Post, Value::Null).unwrap().is_empty());
    }

    #[test]
    fn ids_display_bare() {
        assert_eq!(RecordId::Number(7).to_string(), "7");
        assert_eq!(RecordId::Text("abc".into()).to_string(), "abc");
    }
}
