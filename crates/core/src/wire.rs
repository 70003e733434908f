//! Boundary normalization for remote API payloads.
//!
//! The remote API serializes with reference preservation, so any list may
//! arrive either as a bare JSON array or as an envelope object carrying the
//! array under `$values`. Field names may be camelCase or PascalCase and
//! ids may be numbers or numeric strings.
//!
//! Each endpoint has one decode function here that maps the raw payload
//! into the canonical types of [`crate::schedule`]. List decoders fail
//! closed: an unrecognized shape yields an empty list, and individual
//! elements that do not decode are dropped.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::dates::DateKey;
use crate::error::CoreError;
use crate::schedule::{Assignment, Employee, EmployeeHours, ScheduleRecord, ScheduleSummary, ShiftType};
use crate::types::{normalize_shift, DbId, EmployeeId};

/// Envelope field that carries a reference-preserved array.
pub const REFERENCE_VALUES_FIELD: &str = "$values";

/// Fallback message when an error payload carries nothing readable.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong";

// ---------------------------------------------------------------------------
// Generic helpers
// ---------------------------------------------------------------------------

/// Unwrap a list-shaped payload to its elements.
///
/// A bare array is returned as-is, an object with a `$values` array yields
/// that array, anything else yields an empty list.
pub fn unwrap_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(REFERENCE_VALUES_FIELD) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Unwrap a list payload and decode every element, dropping the ones that
/// do not match `T`.
pub fn decode_list<T: DeserializeOwned>(value: Value) -> Vec<T> {
    unwrap_list(value)
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

/// JavaScript-style truthiness, used to honour the API's "2xx with an
/// error body" convention.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `true` when a success-status body is actually a rejection: it carries a
/// truthy `error` or `errors` field, or `success: false`.
pub fn is_rejection(value: &Value) -> bool {
    let Some(map) = value.as_object() else {
        return false;
    };
    map.get("error").is_some_and(truthy)
        || map.get("errors").is_some_and(truthy)
        || map.get("success") == Some(&Value::Bool(false))
}

/// Flatten an error payload to a single human-readable line.
///
/// Precedence: plain string body; `error`, `message`, `title` string
/// fields; array bodies; `errors` as array or field map; array-valued
/// fields of any other object.
pub fn format_error_payload(payload: &Value) -> String {
    fn item_text(item: &Value) -> String {
        match item {
            Value::String(s) => s.clone(),
            Value::Object(map) => match map.get("description") {
                Some(Value::String(desc)) => desc.clone(),
                _ => item.to_string(),
            },
            other => other.to_string(),
        }
    }

    match payload {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(item_text).collect::<Vec<_>>().join("; "),
        Value::Object(map) => {
            for field in ["error", "message", "title"] {
                if let Some(Value::String(s)) = map.get(field) {
                    return s.clone();
                }
            }

            match map.get("errors") {
                Some(Value::Array(items)) => {
                    return items.iter().map(item_text).collect::<Vec<_>>().join("; ");
                }
                Some(Value::Object(fields)) => {
                    let parts: Vec<String> = fields
                        .values()
                        .flat_map(|v| match v {
                            Value::Array(items) => items.iter().map(item_text).collect(),
                            other => vec![item_text(other)],
                        })
                        .collect();
                    return parts.join("; ");
                }
                _ => {}
            }

            let parts: Vec<String> = map
                .values()
                .filter_map(Value::as_array)
                .flatten()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            if parts.is_empty() {
                GENERIC_ERROR_MESSAGE.to_string()
            } else {
                parts.join("; ")
            }
        }
        _ => GENERIC_ERROR_MESSAGE.to_string(),
    }
}

/// Like [`decode_list`] but only considers object elements, so a stray
/// array element is never read positionally into a record.
fn decode_records<T: DeserializeOwned>(value: Value) -> Vec<T> {
    unwrap_list(value)
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect()
}

// ---------------------------------------------------------------------------
// Lenient scalar decoding
// ---------------------------------------------------------------------------

fn id_from_value(value: &Value) -> Option<DbId> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DbId>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(id_from_value))
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateKey>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(DateKey::parse))
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAssignment {
    #[serde(default, alias = "Id", deserialize_with = "lenient_id")]
    id: Option<DbId>,
    #[serde(default, alias = "EmployeeId", deserialize_with = "lenient_id")]
    employee_id: Option<DbId>,
    #[serde(default, alias = "Date", deserialize_with = "lenient_date")]
    date: Option<DateKey>,
    #[serde(default, alias = "ShiftTypeId", deserialize_with = "lenient_id")]
    shift_type_id: Option<DbId>,
}

impl WireAssignment {
    fn into_assignment(self) -> Option<Assignment> {
        Some(Assignment {
            id: self.id,
            employee_id: self.employee_id?,
            date: self.date?,
            shift_type_id: normalize_shift(self.shift_type_id),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSchedule {
    #[serde(default, alias = "Id", deserialize_with = "lenient_id")]
    id: Option<DbId>,
    #[serde(default, alias = "TeamId", deserialize_with = "lenient_id")]
    team_id: Option<DbId>,
    #[serde(default, alias = "StartDate", deserialize_with = "lenient_date")]
    start_date: Option<DateKey>,
    #[serde(default, alias = "EndDate", deserialize_with = "lenient_date")]
    end_date: Option<DateKey>,
    #[serde(default, alias = "Assignments")]
    assignments: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEmployeeHours {
    #[serde(default, alias = "EmployeeId", deserialize_with = "lenient_id")]
    employee_id: Option<DbId>,
    #[serde(
        default,
        alias = "TotalHours",
        alias = "hours",
        alias = "Hours",
        deserialize_with = "lenient_number"
    )]
    total_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEmployee {
    #[serde(default, alias = "Id", deserialize_with = "lenient_id")]
    id: Option<DbId>,
    #[serde(default, alias = "TeamId", deserialize_with = "lenient_id")]
    team_id: Option<DbId>,
    #[serde(default, alias = "FirstName", deserialize_with = "lenient_string")]
    first_name: Option<String>,
    #[serde(default, alias = "LastName", deserialize_with = "lenient_string")]
    last_name: Option<String>,
    #[serde(default, alias = "IsActive")]
    is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireShiftType {
    #[serde(default, alias = "Id", deserialize_with = "lenient_id")]
    id: Option<DbId>,
    #[serde(default, alias = "TeamId", deserialize_with = "lenient_id")]
    team_id: Option<DbId>,
    #[serde(default, alias = "Name", deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(
        default,
        alias = "initialCode",
        alias = "InitialCode",
        alias = "Code",
        deserialize_with = "lenient_string"
    )]
    code: Option<String>,
    #[serde(default, alias = "StartTime", deserialize_with = "lenient_string")]
    start_time: Option<String>,
    #[serde(default, alias = "EndTime", deserialize_with = "lenient_string")]
    end_time: Option<String>,
}

// ---------------------------------------------------------------------------
// Endpoint decoders
// ---------------------------------------------------------------------------

/// Decode an assignment collection (bare or `$values`-wrapped).
pub fn decode_assignments(value: Value) -> Vec<Assignment> {
    decode_records::<WireAssignment>(value)
        .into_iter()
        .filter_map(WireAssignment::into_assignment)
        .collect()
}

/// Decode a single schedule. The schedule itself must be an object with an
/// id; its assignment collection fails closed to empty.
pub fn decode_schedule(value: Value) -> Result<ScheduleRecord, CoreError> {
    if !value.is_object() {
        return Err(CoreError::Malformed(
            "Schedule payload is not an object".to_string(),
        ));
    }
    let wire: WireSchedule = serde_json::from_value(value)
        .map_err(|e| CoreError::Malformed(format!("schedule: {e}")))?;
    let id = wire
        .id
        .ok_or_else(|| CoreError::Malformed("Schedule payload has no id".to_string()))?;

    Ok(ScheduleRecord {
        id,
        team_id: wire.team_id,
        start_date: wire.start_date,
        end_date: wire.end_date,
        assignments: decode_assignments(wire.assignments),
    })
}

/// Decode the schedule list endpoint. Rows without an id are dropped.
pub fn decode_schedule_list(value: Value) -> Vec<ScheduleSummary> {
    decode_records::<WireSchedule>(value)
        .into_iter()
        .filter_map(|wire| {
            Some(ScheduleSummary {
                id: wire.id?,
                team_id: wire.team_id,
                start_date: wire.start_date,
                end_date: wire.end_date,
            })
        })
        .collect()
}

/// Decode the employee-hours endpoint. Rows without an employee id are
/// dropped; a missing total counts as zero hours.
pub fn decode_employee_hours(value: Value) -> Vec<EmployeeHours> {
    decode_records::<WireEmployeeHours>(value)
        .into_iter()
        .filter_map(|wire| {
            Some(EmployeeHours {
                employee_id: wire.employee_id?,
                total_hours: wire.total_hours.unwrap_or(0.0),
            })
        })
        .collect()
}

/// Decode a team roster.
pub fn decode_employees(value: Value) -> Vec<Employee> {
    decode_records::<WireEmployee>(value)
        .into_iter()
        .filter_map(|wire| {
            Some(Employee {
                id: wire.id?,
                team_id: wire.team_id,
                first_name: wire.first_name.unwrap_or_default(),
                last_name: wire.last_name.unwrap_or_default(),
                is_active: wire.is_active.unwrap_or(true),
            })
        })
        .collect()
}

/// Decode the shift-type list.
pub fn decode_shift_types(value: Value) -> Vec<ShiftType> {
    decode_records::<WireShiftType>(value)
        .into_iter()
        .filter_map(|wire| {
            let id = wire.id?;
            Some(ShiftType {
                id,
                team_id: wire.team_id,
                name: wire.name.unwrap_or_else(|| id.to_string()),
                code: wire.code,
                start_time: wire.start_time,
                end_time: wire.end_time,
            })
        })
        .collect()
}

/// Decode the upsert response.
///
/// Returns `Some` only when the body carries a canonical id. Fields the
/// body omits fall back to the request's employee and date; a missing
/// shift id is left `None` so the caller can keep its local value.
pub fn decode_upsert_response(
    value: Value,
    employee_id: EmployeeId,
    date: DateKey,
) -> Option<Assignment> {
    if !value.is_object() {
        return None;
    }
    let wire: WireAssignment = serde_json::from_value(value).ok()?;
    Some(Assignment {
        id: Some(wire.id?),
        employee_id: wire.employee_id.unwrap_or(employee_id),
        date: wire.date.unwrap_or(date),
        shift_type_id: normalize_shift(wire.shift_type_id),
    })
}
