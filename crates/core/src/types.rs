/// Remote API primary keys are integer identities.
pub type DbId = i64;

/// Identifier of an employee row.
pub type EmployeeId = DbId;

/// Identifier of a shift type. The remote API uses `0` (or a missing
/// value) to mean "no shift / off"; inside this workspace "off" is always
/// `None`.
pub type ShiftTypeId = DbId;

/// Identifier of a generated schedule.
pub type ScheduleId = DbId;

/// Identifier of a team.
pub type TeamId = DbId;

/// Collapse the wire sentinel for "off" (zero, negative, missing) to `None`.
pub fn normalize_shift(raw: Option<ShiftTypeId>) -> Option<ShiftTypeId> {
    raw.filter(|id| *id > 0)
}
