use serde_json::{Map, Value};

use super::domain::{Answers, DocumentId, DocumentStatus};

const DOCUMENT_STATUS_PREFIX: &str = "document_status.";

/// Rejected field update; the previous answers stay untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldChangeError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Produce a new answer record with one field replaced.
///
/// `null` or an empty string resets the field to its default. Nested document statuses are
/// addressed as `document_status.<document_id>`. Radio-style `"true"`/`"false"` strings are
/// accepted for boolean fields.
pub fn apply_field_change(
    answers: &Answers,
    field: &str,
    value: Value,
) -> Result<Answers, FieldChangeError> {
    if let Some(key) = field.strip_prefix(DOCUMENT_STATUS_PREFIX) {
        return apply_document_status(answers, field, key, value);
    }

    let mut object = to_object(answers)?;
    if !object.contains_key(field) {
        return Err(FieldChangeError::UnknownField(field.to_string()));
    }

    let replacement = if is_blank(&value) {
        to_object(&Answers::default())?
            .remove(field)
            .unwrap_or(Value::Null)
    } else {
        value
    };

    object.insert(field.to_string(), replacement.clone());
    match serde_json::from_value::<Answers>(Value::Object(object.clone())) {
        Ok(updated) => Ok(updated),
        Err(first_error) => {
            let Some(flag) = coerce_flag(&replacement) else {
                return Err(invalid(field, first_error));
            };
            object.insert(field.to_string(), Value::Bool(flag));
            serde_json::from_value::<Answers>(Value::Object(object))
                .map_err(|_| invalid(field, first_error))
        }
    }
}

fn apply_document_status(
    answers: &Answers,
    field: &str,
    key: &str,
    value: Value,
) -> Result<Answers, FieldChangeError> {
    let document = DocumentId::from_key(key)
        .ok_or_else(|| FieldChangeError::UnknownField(field.to_string()))?;

    let mut updated = answers.clone();
    if is_blank(&value) {
        updated.document_status.remove(&document);
        return Ok(updated);
    }

    let status: DocumentStatus =
        serde_json::from_value(value).map_err(|err| invalid(field, err))?;
    updated.document_status.insert(document, status);
    Ok(updated)
}

fn to_object(answers: &Answers) -> Result<Map<String, Value>, FieldChangeError> {
    match serde_json::to_value(answers) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(FieldChangeError::InvalidValue {
            field: "answers".to_string(),
            reason: "answers did not encode as an object".to_string(),
        }),
        Err(err) => Err(invalid("answers", err)),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn coerce_flag(value: &Value) -> Option<bool> {
    match value.as_str()?.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

fn invalid(field: &str, err: serde_json::Error) -> FieldChangeError {
    FieldChangeError::InvalidValue {
        field: field.to_string(),
        reason: err.to_string(),
    }
}
