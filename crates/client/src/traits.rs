//! The seam between the editor and the REST API.

use async_trait::async_trait;
use rota_core::dates::DateKey;
use rota_core::schedule::{
    Assignment, Employee, EmployeeHours, GenerateScheduleRequest, ScheduleRecord,
    ScheduleSummary, ShiftType, UpsertAssignment,
};
use rota_core::types::{EmployeeId, ScheduleId, TeamId};

use crate::ApiError;

/// Remote operations the schedule editor depends on.
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait ScheduleApi: Send + Sync {
    async fn list_schedules(&self, team_id: Option<TeamId>)
        -> Result<Vec<ScheduleSummary>, ApiError>;

    async fn fetch_schedule(&self, schedule_id: ScheduleId) -> Result<ScheduleRecord, ApiError>;

    async fn delete_schedule(&self, schedule_id: ScheduleId) -> Result<(), ApiError>;

    async fn generate_schedule(
        &self,
        request: GenerateScheduleRequest,
    ) -> Result<ScheduleRecord, ApiError>;

    async fn fetch_employee_hours(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<Vec<EmployeeHours>, ApiError>;

    /// Create or update one assignment. `Ok(None)` means the server
    /// accepted the change but returned no canonical id.
    async fn upsert_assignment(
        &self,
        schedule_id: ScheduleId,
        request: UpsertAssignment,
    ) -> Result<Option<Assignment>, ApiError>;

    async fn delete_assignment(
        &self,
        schedule_id: ScheduleId,
        employee_id: EmployeeId,
        date: DateKey,
    ) -> Result<(), ApiError>;

    async fn list_employees(&self, team_id: TeamId) -> Result<Vec<Employee>, ApiError>;

    async fn list_shift_types(&self, team_id: Option<TeamId>) -> Result<Vec<ShiftType>, ApiError>;
}
