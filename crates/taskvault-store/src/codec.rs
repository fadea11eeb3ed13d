//! Record codec: task entity <-> flat string-keyed hash.
//!
//! The stored representation is a string hash with one field per task
//! attribute. The sentinel convention for an absent due time (empty string)
//! lives entirely in this module; the rest of the crate only ever sees a
//! typed `Option<i64>`.

use std::collections::HashMap;

use taskvault_core::{CodecError, Description, Task, TaskId, TaskStatus, UserId};

pub const FIELD_ID: &str = "id";
pub const FIELD_USER_ID: &str = "user_id";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_STATUS: &str = "status";
pub const FIELD_DUE_TIME: &str = "due_time";
pub const FIELD_CREATED_AT: &str = "created_at";

/// Encode a task into hash fields. An absent due time becomes the
/// empty-string sentinel.
pub fn encode(task: &Task) -> Vec<(String, String)> {
    vec![
        (FIELD_ID.to_string(), task.id.to_string()),
        (FIELD_USER_ID.to_string(), task.user_id.to_string()),
        (
            FIELD_DESCRIPTION.to_string(),
            task.description.as_str().to_string(),
        ),
        (FIELD_STATUS.to_string(), task.status.to_string()),
        (
            FIELD_DUE_TIME.to_string(),
            task.due_time.map(|t| t.to_string()).unwrap_or_default(),
        ),
        (FIELD_CREATED_AT.to_string(), task.created_at.to_string()),
    ]
}

/// Decode hash fields back into a task.
///
/// An empty map means the record does not exist and yields `Ok(None)`.
/// For the due time, an empty string, a missing field, and the literal `"0"`
/// all decode as absent; older writers produced each of these.
pub fn decode(key: &str, fields: HashMap<String, String>) -> Result<Option<Task>, CodecError> {
    if fields.is_empty() {
        return Ok(None);
    }

    let id = required(key, &fields, FIELD_ID)?
        .parse::<TaskId>()
        .map_err(|_| invalid(key, FIELD_ID, &fields))?;
    let user_id = UserId::new(required(key, &fields, FIELD_USER_ID)?)
        .map_err(|_| invalid(key, FIELD_USER_ID, &fields))?;
    let description = Description::new(required(key, &fields, FIELD_DESCRIPTION)?)
        .map_err(|_| invalid(key, FIELD_DESCRIPTION, &fields))?;
    let status = required(key, &fields, FIELD_STATUS)?
        .parse::<TaskStatus>()
        .map_err(|_| invalid(key, FIELD_STATUS, &fields))?;
    let created_at = required(key, &fields, FIELD_CREATED_AT)?
        .parse::<i64>()
        .map_err(|_| invalid(key, FIELD_CREATED_AT, &fields))?;

    let due_time = match fields.get(FIELD_DUE_TIME).map(String::as_str) {
        None | Some("") | Some("0") => None,
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|_| invalid(key, FIELD_DUE_TIME, &fields))?,
        ),
    };

    Ok(Some(Task {
        id,
        user_id,
        description,
        status,
        due_time,
        created_at,
    }))
}

fn required<'a>(
    key: &str,
    fields: &'a HashMap<String, String>,
    field: &'static str,
) -> Result<&'a str, CodecError> {
    fields
        .get(field)
        .map(String::as_str)
        .ok_or(CodecError::MissingField {
            key: key.to_string(),
            field,
        })
}

fn invalid(key: &str, field: &'static str, fields: &HashMap<String, String>) -> CodecError {
    CodecError::InvalidField {
        key: key.to_string(),
        field,
        value: fields.get(field).cloned().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task(due_time: Option<i64>) -> Task {
        Task {
            id: TaskId::generate(),
            user_id: UserId::new("u1").unwrap(),
            description: Description::new("buy milk").unwrap(),
            status: TaskStatus::Pending,
            due_time,
            created_at: 1700000000,
        }
    }

    fn as_map(fields: Vec<(String, String)>) -> HashMap<String, String> {
        fields.into_iter().collect()
    }

    #[test]
    fn round_trips_with_due_time() {
        let task = sample_task(Some(1000));
        let decoded = decode("task:x", as_map(encode(&task))).unwrap().unwrap();
        assert_eq!(decoded, task);
    }

    #[test]
    fn round_trips_without_due_time() {
        let task = sample_task(None);
        let encoded = encode(&task);
        let due = encoded
            .iter()
            .find(|(f, _)| f == FIELD_DUE_TIME)
            .map(|(_, v)| v.clone())
            .unwrap();
        assert_eq!(due, "", "absent due time must encode as the empty sentinel");
        let decoded = decode("task:x", as_map(encoded)).unwrap().unwrap();
        assert_eq!(decoded, task);
    }

    #[test]
    fn legacy_due_time_sentinels_decode_as_absent() {
        for sentinel in ["", "0"] {
            let mut fields = as_map(encode(&sample_task(Some(500))));
            fields.insert(FIELD_DUE_TIME.to_string(), sentinel.to_string());
            let decoded = decode("task:x", fields).unwrap().unwrap();
            assert_eq!(decoded.due_time, None, "sentinel {sentinel:?}");
        }
        // A writer that never set the field at all.
        let mut fields = as_map(encode(&sample_task(Some(500))));
        fields.remove(FIELD_DUE_TIME);
        assert_eq!(decode("task:x", fields).unwrap().unwrap().due_time, None);
    }

    #[test]
    fn empty_map_decodes_as_absent_record() {
        assert_eq!(decode("task:x", HashMap::new()).unwrap(), None);
    }

    #[test]
    fn corrupt_fields_are_codec_errors() {
        let mut fields = as_map(encode(&sample_task(None)));
        fields.insert(FIELD_STATUS.to_string(), "archived".to_string());
        assert!(matches!(
            decode("task:x", fields),
            Err(CodecError::InvalidField {
                field: FIELD_STATUS,
                ..
            })
        ));

        let mut fields = as_map(encode(&sample_task(None)));
        fields.remove(FIELD_CREATED_AT);
        assert!(matches!(
            decode("task:x", fields),
            Err(CodecError::MissingField {
                field: FIELD_CREATED_AT,
                ..
            })
        ));

        let mut fields = as_map(encode(&sample_task(None)));
        fields.insert(FIELD_DUE_TIME.to_string(), "tomorrow".to_string());
        assert!(matches!(
            decode("task:x", fields),
            Err(CodecError::InvalidField {
                field: FIELD_DUE_TIME,
                ..
            })
        ));
    }
}
