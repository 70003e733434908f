//! Subcommand handlers.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use rota_client::ScheduleApi;
use rota_core::dates::DateKey;
use rota_core::grid::CellKey;
use rota_core::types::{ScheduleId, TeamId};
use rota_editor::{ConfirmResolution, ScheduleEditor};

use crate::cli::{CellEdit, Command};
use crate::render::{render_grid, render_schedule_list};

pub async fn run(
    command: Command,
    api: Arc<dyn ScheduleApi>,
    editor: &ScheduleEditor,
) -> anyhow::Result<()> {
    match command {
        Command::List { team } => list(api.as_ref(), team).await,
        Command::Show { schedule } => {
            editor.open(schedule).await?;
            print_grid(api.as_ref(), editor).await;
            Ok(())
        }
        Command::Generate { team, start, end } => {
            generate(api.as_ref(), editor, team, start, end).await
        }
        Command::Set { schedule, edits } => set(api.as_ref(), editor, schedule, &edits).await,
        Command::Delete { schedule, yes } => delete(editor, schedule, yes).await,
    }
}

async fn list(api: &dyn ScheduleApi, team: Option<TeamId>) -> anyhow::Result<()> {
    let schedules = api
        .list_schedules(team)
        .await
        .context("Failed to list schedules")?;
    print!("{}", render_schedule_list(&schedules));
    Ok(())
}

async fn generate(
    api: &dyn ScheduleApi,
    editor: &ScheduleEditor,
    team: TeamId,
    start: DateKey,
    end: DateKey,
) -> anyhow::Result<()> {
    let record = editor.generate(team, start, end).await?;
    println!("Generated schedule {}", record.id);
    print_grid(api, editor).await;
    Ok(())
}

async fn set(
    api: &dyn ScheduleApi,
    editor: &ScheduleEditor,
    schedule: ScheduleId,
    edits: &[CellEdit],
) -> anyhow::Result<()> {
    editor.open(schedule).await?;

    for edit in edits {
        let key = CellKey::new(edit.employee_id, edit.date);
        if !editor.select_shift(key, edit.shift_type_id).await {
            tracing::warn!(edit = %edit, "Skipping edit on a past or current date");
        }
    }

    let report = editor.save_all().await?;
    println!(
        "Processed {} change(s), {} failed",
        report.processed(),
        report.failures(),
    );
    print_grid(api, editor).await;
    Ok(())
}

async fn delete(editor: &ScheduleEditor, schedule: ScheduleId, yes: bool) -> anyhow::Result<()> {
    let prompt = editor.request_delete_schedule(schedule).await?;
    let question = format!("{}: {}", prompt.title, prompt.message);
    let accepted = yes || ask(&question, &prompt.confirm_label)?;

    match editor.resolve_confirm(accepted).await? {
        ConfirmResolution::ScheduleDeleted { schedule_id } => {
            println!("Deleted schedule {schedule_id}");
        }
        _ => println!("Cancelled"),
    }
    Ok(())
}

/// Print the open grid with shift labels for its team.
async fn print_grid(api: &dyn ScheduleApi, editor: &ScheduleEditor) {
    let view = editor.view().await;
    let team_id = view.schedule.as_ref().and_then(|s| s.team_id);

    let shift_types = match api.list_shift_types(team_id).await {
        Ok(types) => types,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load shift types; showing ids");
            Vec::new()
        }
    };
    print!("{}", render_grid(&view, &shift_types));
}

/// Ask a yes/no question on the terminal.
fn ask(question: &str, confirm_label: &str) -> anyhow::Result<bool> {
    print!("{question} {confirm_label}? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
