use std::fmt;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use rota_core::dates::DateKey;
use rota_core::error::CoreError;
use rota_core::types::{EmployeeId, ScheduleId, ShiftTypeId, TeamId};

#[derive(Debug, Parser)]
#[command(name = "rota")]
#[command(about = "Shift schedule editor")]
pub struct Cli {
    /// API base URL; overrides ROTA_API_URL
    #[arg(long)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List schedules
    List {
        /// Only schedules of this team
        #[arg(long)]
        team: Option<TeamId>,
    },
    /// Show a schedule as an employee-by-date grid
    Show {
        schedule: ScheduleId,
    },
    /// Generate a schedule for a team and show it
    Generate {
        #[arg(long)]
        team: TeamId,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: DateKey,

        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: DateKey,
    },
    /// Stage cell edits and save them as one batch
    Set {
        schedule: ScheduleId,

        /// Edits as EMPLOYEE:DATE=SHIFT, where SHIFT is an id or "off"
        #[arg(required = true)]
        edits: Vec<CellEdit>,
    },
    /// Delete a schedule
    Delete {
        schedule: ScheduleId,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// One `EMPLOYEE:DATE=SHIFT` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellEdit {
    pub employee_id: EmployeeId,
    pub date: DateKey,
    /// `None` for "off".
    pub shift_type_id: Option<ShiftTypeId>,
}

impl FromStr for CellEdit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::Validation(format!("Expected EMPLOYEE:DATE=SHIFT, got '{s}'"));

        let (cell, shift) = s.split_once('=').ok_or_else(invalid)?;
        let (employee, date) = cell.split_once(':').ok_or_else(invalid)?;

        let employee_id = employee.trim().parse().map_err(|_| invalid())?;
        let date = date.trim().parse()?;
        let shift_type_id = match shift.trim() {
            s if s.eq_ignore_ascii_case("off") => None,
            s => match s.parse::<ShiftTypeId>() {
                Ok(id) if id > 0 => Some(id),
                Ok(_) => None,
                Err(_) => return Err(invalid()),
            },
        };

        Ok(Self {
            employee_id,
            date,
            shift_type_id,
        })
    }
}

impl fmt::Display for CellEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shift_type_id {
            Some(id) => write!(f, "{}:{}={}", self.employee_id, self.date, id),
            None => write!(f, "{}:{}=off", self.employee_id, self.date),
        }
    }
}
