#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rota_client::{ApiError, ScheduleApi};
use rota_core::dates::DateKey;
use rota_core::grid::CellKey;
use rota_core::guard::FixedClock;
use rota_core::schedule::{
    Assignment, Employee, EmployeeHours, GenerateScheduleRequest, ScheduleRecord,
    ScheduleSummary, ShiftType, UpsertAssignment,
};
use rota_core::types::{EmployeeId, ScheduleId, ShiftTypeId, TeamId};
use rota_editor::{EditorConfig, ScheduleEditor};
use tokio::time::Instant;

pub const SCHEDULE_ID: ScheduleId = 1;
pub const TEAM_ID: TeamId = 2;
pub const STEP_DELAY: Duration = Duration::from_millis(150);

/// A remote call seen by [`FakeApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchSchedule(ScheduleId),
    DeleteSchedule(ScheduleId),
    Generate(TeamId),
    Hours(ScheduleId),
    Upsert { key: CellKey, shift: ShiftTypeId },
    Delete(CellKey),
    Employees(TeamId),
}

/// In-memory API that records every call with the (tokio) time it was made.
pub struct FakeApi {
    record: ScheduleRecord,
    hours: Vec<EmployeeHours>,
    calls: Mutex<Vec<(Call, Instant)>>,
    next_id: AtomicI64,
    pub fail_upserts: AtomicBool,
    pub fail_deletes: AtomicBool,
    pub fail_hours: AtomicBool,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            record: schedule_record(),
            hours: vec![
                EmployeeHours {
                    employee_id: 5,
                    total_hours: 8.0,
                },
                EmployeeHours {
                    employee_id: 6,
                    total_hours: 7.5,
                },
            ],
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(500),
            fail_upserts: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            fail_hours: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    /// Upserts and deletes in the order they were made, with timestamps.
    pub fn writes(&self) -> Vec<(Call, Instant)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| matches!(c, Call::Upsert { .. } | Call::Delete(_)))
            .cloned()
            .collect()
    }

    pub fn fail(&self, flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }

    fn record_call(&self, call: Call) {
        self.calls.lock().unwrap().push((call, Instant::now()));
    }

    fn rejected() -> ApiError {
        ApiError::Status {
            status: 400,
            message: "Shift overlaps with leave".to_string(),
        }
    }
}

#[async_trait]
impl ScheduleApi for FakeApi {
    async fn list_schedules(
        &self,
        _team_id: Option<TeamId>,
    ) -> Result<Vec<ScheduleSummary>, ApiError> {
        Ok(Vec::new())
    }

    async fn fetch_schedule(&self, schedule_id: ScheduleId) -> Result<ScheduleRecord, ApiError> {
        self.record_call(Call::FetchSchedule(schedule_id));
        if schedule_id != self.record.id {
            return Err(ApiError::Status {
                status: 404,
                message: "Schedule not found".to_string(),
            });
        }
        Ok(self.record.clone())
    }

    async fn delete_schedule(&self, schedule_id: ScheduleId) -> Result<(), ApiError> {
        self.record_call(Call::DeleteSchedule(schedule_id));
        Ok(())
    }

    async fn generate_schedule(
        &self,
        request: GenerateScheduleRequest,
    ) -> Result<ScheduleRecord, ApiError> {
        self.record_call(Call::Generate(request.team_id));
        Ok(ScheduleRecord {
            id: 9,
            team_id: Some(request.team_id),
            start_date: Some(request.start_date),
            end_date: Some(request.end_date),
            assignments: Vec::new(),
        })
    }

    async fn fetch_employee_hours(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<Vec<EmployeeHours>, ApiError> {
        self.record_call(Call::Hours(schedule_id));
        if self.fail_hours.load(Ordering::SeqCst) {
            return Err(ApiError::Decode("timeout".to_string()));
        }
        Ok(self.hours.clone())
    }

    async fn upsert_assignment(
        &self,
        _schedule_id: ScheduleId,
        request: UpsertAssignment,
    ) -> Result<Option<Assignment>, ApiError> {
        self.record_call(Call::Upsert {
            key: CellKey::new(request.employee_id, request.date),
            shift: request.new_shift_type_id,
        });
        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(Self::rejected());
        }
        Ok(Some(Assignment {
            id: Some(self.next_id.fetch_add(1, Ordering::SeqCst)),
            employee_id: request.employee_id,
            date: request.date,
            shift_type_id: Some(request.new_shift_type_id),
        }))
    }

    async fn delete_assignment(
        &self,
        _schedule_id: ScheduleId,
        employee_id: EmployeeId,
        date: DateKey,
    ) -> Result<(), ApiError> {
        self.record_call(Call::Delete(CellKey::new(employee_id, date)));
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Self::rejected());
        }
        Ok(())
    }

    async fn list_employees(&self, team_id: TeamId) -> Result<Vec<Employee>, ApiError> {
        self.record_call(Call::Employees(team_id));
        Ok(vec![
            employee(5, "Ada", "Lovelace"),
            employee(6, "Grace", "Hopper"),
        ])
    }

    async fn list_shift_types(&self, _team_id: Option<TeamId>) -> Result<Vec<ShiftType>, ApiError> {
        Ok(Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn date(raw: &str) -> DateKey {
    raw.parse().unwrap()
}

pub fn key(employee_id: EmployeeId, raw: &str) -> CellKey {
    CellKey::new(employee_id, date(raw))
}

/// The day before the fixture schedule starts.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 30).unwrap()
}

fn employee(id: EmployeeId, first: &str, last: &str) -> Employee {
    Employee {
        id,
        team_id: Some(TEAM_ID),
        first_name: first.to_string(),
        last_name: last.to_string(),
        is_active: true,
    }
}

/// 2025-10-01..=2025-10-03 with employee 5 on shift 3 on the 2nd and
/// employee 6 on shift 1 on the 1st.
pub fn schedule_record() -> ScheduleRecord {
    ScheduleRecord {
        id: SCHEDULE_ID,
        team_id: Some(TEAM_ID),
        start_date: Some(date("2025-10-01")),
        end_date: Some(date("2025-10-03")),
        assignments: vec![
            Assignment {
                id: Some(100),
                employee_id: 5,
                date: date("2025-10-02"),
                shift_type_id: Some(3),
            },
            Assignment {
                id: Some(101),
                employee_id: 6,
                date: date("2025-10-01"),
                shift_type_id: Some(1),
            },
        ],
    }
}

pub fn test_config() -> EditorConfig {
    EditorConfig {
        save_step_delay: STEP_DELAY,
        toast_timeout: Duration::ZERO,
    }
}

pub fn editor_at(api: Arc<FakeApi>, today: NaiveDate) -> ScheduleEditor {
    ScheduleEditor::with_clock(api, Arc::new(FixedClock(today)), test_config())
}

/// An editor with the fixture schedule already open.
pub async fn open_editor(api: Arc<FakeApi>) -> ScheduleEditor {
    let editor = editor_at(api, today());
    editor.open(SCHEDULE_ID).await.unwrap();
    editor
}
