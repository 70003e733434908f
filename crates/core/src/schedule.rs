//! Canonical schedule types.
//!
//! These are the shapes the rest of the workspace works with. Wire
//! payloads are mapped into them by [`crate::wire`]; nothing downstream
//! inspects raw JSON.

use serde::{Serialize, Serializer};
use validator::{Validate, ValidationError};

use crate::dates::DateKey;
use crate::types::{DbId, EmployeeId, ScheduleId, ShiftTypeId, TeamId};

/// One employee's shift on one calendar day within a schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    /// Server-assigned id; `None` until the assignment has round-tripped.
    pub id: Option<DbId>,
    pub employee_id: EmployeeId,
    pub date: DateKey,
    /// `None` means "off".
    pub shift_type_id: Option<ShiftTypeId>,
}

/// A generated schedule as returned by the remote API.
///
/// Replaced wholesale on every fetch; never merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleRecord {
    pub id: ScheduleId,
    pub team_id: Option<TeamId>,
    pub start_date: Option<DateKey>,
    pub end_date: Option<DateKey>,
    pub assignments: Vec<Assignment>,
}

/// Row of the schedule list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleSummary {
    pub id: ScheduleId,
    pub team_id: Option<TeamId>,
    pub start_date: Option<DateKey>,
    pub end_date: Option<DateKey>,
}

/// Server-computed scheduled hours for one employee over a schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeHours {
    pub employee_id: EmployeeId,
    pub total_hours: f64,
}

/// Roster entry used to label grid rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub team_id: Option<TeamId>,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
}

impl Employee {
    /// `"First Last"`, trimmed; empty when both parts are blank.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Shift type definition, used to label grid cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftType {
    pub id: ShiftTypeId,
    pub team_id: Option<TeamId>,
    pub name: String,
    pub code: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl ShiftType {
    /// Short label: the initial code when present, the name otherwise.
    pub fn label(&self) -> &str {
        match self.code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => code,
            _ => self.name.as_str(),
        }
    }
}

/// Body of the assignment upsert request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertAssignment {
    pub employee_id: EmployeeId,
    #[serde(serialize_with = "serialize_api_timestamp")]
    pub date: DateKey,
    pub new_shift_type_id: ShiftTypeId,
}

fn serialize_api_timestamp<S: Serializer>(date: &DateKey, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.to_api_timestamp())
}

/// Body of the schedule generation request. The generation endpoint
/// expects PascalCase keys.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "PascalCase")]
#[validate(schema(function = "validate_generate_range"))]
pub struct GenerateScheduleRequest {
    #[validate(range(min = 1, message = "team id must be positive"))]
    pub team_id: TeamId,
    pub start_date: DateKey,
    pub end_date: DateKey,
}

fn validate_generate_range(req: &GenerateScheduleRequest) -> Result<(), ValidationError> {
    if req.end_date < req.start_date {
        let mut err = ValidationError::new("date_range");
        err.message = Some("end date must not precede start date".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    #[test]
    fn upsert_body_uses_camel_case_and_midnight_timestamp() {
        let body = UpsertAssignment {
            employee_id: 7,
            date: key("2025-10-02"),
            new_shift_type_id: 2,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["employeeId"], 7);
        assert_eq!(json["date"], "2025-10-02T00:00:00Z");
        assert_eq!(json["newShiftTypeId"], 2);
    }

    #[test]
    fn generate_body_uses_pascal_case() {
        let body = GenerateScheduleRequest {
            team_id: 4,
            start_date: key("2025-10-01"),
            end_date: key("2025-10-31"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["TeamId"], 4);
        assert_eq!(json["StartDate"], "2025-10-01");
        assert_eq!(json["EndDate"], "2025-10-31");
    }

    #[test]
    fn generate_request_rejects_inverted_range() {
        let body = GenerateScheduleRequest {
            team_id: 4,
            start_date: key("2025-10-31"),
            end_date: key("2025-10-01"),
        };
        assert!(body.validate().is_err());
    }

    #[test]
    fn generate_request_rejects_non_positive_team() {
        let body = GenerateScheduleRequest {
            team_id: 0,
            start_date: key("2025-10-01"),
            end_date: key("2025-10-01"),
        };
        assert!(body.validate().is_err());
    }

    #[test]
    fn generate_request_accepts_single_day() {
        let body = GenerateScheduleRequest {
            team_id: 1,
            start_date: key("2025-10-01"),
            end_date: key("2025-10-01"),
        };
        assert!(body.validate().is_ok());
    }

    #[test]
    fn display_name_trims_blank_parts() {
        let emp = Employee {
            id: 1,
            team_id: None,
            first_name: " Ada ".into(),
            last_name: "".into(),
            is_active: true,
        };
        assert_eq!(emp.display_name(), "Ada");
    }

    #[test]
    fn shift_label_prefers_code() {
        let mut shift = ShiftType {
            id: 1,
            team_id: Some(1),
            name: "Night".into(),
            code: Some("N".into()),
            start_time: None,
            end_time: None,
        };
        assert_eq!(shift.label(), "N");
        shift.code = Some("  ".into());
        assert_eq!(shift.label(), "Night");
    }
}
