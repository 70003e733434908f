//! Integration tests for opening a schedule and saving single cells.
//!
//! Runs [`ScheduleEditor`] against the recording [`common::FakeApi`] and,
//! where a specific server reply matters, a `MockScheduleApi`.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use common::*;
use rota_client::{ApiError, MockScheduleApi};
use rota_core::grid::CellState;
use rota_editor::{EditorError, SaveOutcome, ScheduleEditor, SkipReason};
use rota_events::bus::EditorEvent;
use rota_events::toast::ToastKind;

// ---------------------------------------------------------------------------
// Test: opening a schedule
// ---------------------------------------------------------------------------

#[tokio::test]
async fn open_builds_grid_and_loads_hours() {
    let api = Arc::new(FakeApi::new());
    let editor = open_editor(api.clone()).await;

    let view = editor.view().await;
    assert_eq!(
        view.grid.date_keys,
        vec![date("2025-10-01"), date("2025-10-02"), date("2025-10-03")]
    );
    assert_eq!(view.grid.shift_at(&key(5, "2025-10-02")), Some(3));
    assert!(!view.grid.contains(&key(5, "2025-10-01")));
    assert!(!view.grid.contains(&key(5, "2025-10-03")));

    let names: Vec<_> = view.grid.employees.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Ada Lovelace", "Grace Hopper"]);
    assert_eq!(view.hours_for(5), Some(8.0));
    assert_eq!(view.hours_for(6), Some(7.5));

    assert_eq!(
        api.calls(),
        vec![
            Call::FetchSchedule(SCHEDULE_ID),
            Call::Employees(TEAM_ID),
            Call::Hours(SCHEDULE_ID),
        ]
    );
}

#[tokio::test]
async fn roster_is_fetched_once_per_team() {
    let api = Arc::new(FakeApi::new());
    let editor = open_editor(api.clone()).await;
    editor.open(SCHEDULE_ID).await.unwrap();

    let roster_calls = api
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Employees(_)))
        .count();
    assert_eq!(roster_calls, 1);
}

#[tokio::test]
async fn unknown_schedule_fails_to_open() {
    let api = Arc::new(FakeApi::new());
    let editor = editor_at(api, today());

    let err = editor.open(404).await.unwrap_err();
    assert_matches!(err, EditorError::Api(ApiError::Status { status: 404, .. }));
    assert_eq!(editor.view().await.schedule_id(), None);
    assert_eq!(editor.toasts().messages()[0].kind, ToastKind::Error);
}

#[tokio::test]
async fn generate_opens_the_new_schedule() {
    let api = Arc::new(FakeApi::new());
    let editor = editor_at(api.clone(), today());

    let record = editor
        .generate(TEAM_ID, date("2025-11-01"), date("2025-11-07"))
        .await
        .unwrap();

    let view = editor.view().await;
    assert_eq!(view.schedule_id(), Some(record.id));
    assert_eq!(view.grid.date_keys.len(), 7);
    assert!(api.calls().contains(&Call::Generate(TEAM_ID)));
}

// ---------------------------------------------------------------------------
// Test: saving a cell as "off"
// ---------------------------------------------------------------------------

#[tokio::test]
async fn saving_off_deletes_the_cell() {
    let api = Arc::new(FakeApi::new());
    let editor = open_editor(api.clone()).await;
    let cell = key(5, "2025-10-02");

    assert!(editor.select_shift(cell, None).await);
    assert_eq!(editor.view().await.cell_state(&cell), CellState::StagedEdit);

    let outcome = editor.save_cell(cell).await;
    assert_eq!(outcome, SaveOutcome::Deleted);

    let view = editor.view().await;
    assert!(!view.grid.contains(&cell));
    assert!(!view.staging.is_changed(&cell));
    assert!(!view.staging.is_created_locally(&cell));
    assert_eq!(view.cell_state(&cell), CellState::Absent);
    assert_eq!(api.writes()[0].0, Call::Delete(cell));
    assert_eq!(api.calls().last(), Some(&Call::Hours(SCHEDULE_ID)));
}

#[tokio::test]
async fn failed_delete_still_removes_the_cell() {
    let api = Arc::new(FakeApi::new());
    let editor = open_editor(api.clone()).await;
    api.fail(&api.fail_deletes);
    let cell = key(5, "2025-10-02");

    editor.select_shift(cell, None).await;
    let outcome = editor.save_cell(cell).await;

    assert_matches!(outcome, SaveOutcome::DeleteFailed { error } if error == "Shift overlaps with leave");
    let view = editor.view().await;
    assert!(!view.grid.contains(&cell));
    assert!(!view.staging.is_changed(&cell));

    let toasts = editor.toasts().messages();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Error);
}

// ---------------------------------------------------------------------------
// Test: upserts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn created_cell_takes_the_server_record() {
    let api = Arc::new(FakeApi::new());
    let editor = open_editor(api.clone()).await;
    let mut events = editor.subscribe();
    let cell = key(7, "2025-10-03");

    let outcome = editor.create_cell_and_save(cell, Some(2)).await;
    assert_eq!(
        outcome,
        SaveOutcome::Saved {
            id: Some(500),
            shift_type_id: 2
        }
    );

    let view = editor.view().await;
    let saved = view.grid.cell(&cell).unwrap();
    assert_eq!(saved.id, Some(500));
    assert_eq!(saved.shift_type_id, Some(2));
    assert_eq!(view.cell_state(&cell), CellState::Saved);

    assert_eq!(
        events.recv().await.unwrap(),
        EditorEvent::CellSaved {
            schedule_id: SCHEDULE_ID,
            key: cell,
            shift_type_id: Some(2),
        }
    );
}

#[tokio::test]
async fn failed_create_rolls_back_to_off() {
    let api = Arc::new(FakeApi::new());
    let editor = open_editor(api.clone()).await;
    api.fail(&api.fail_upserts);
    let cell = key(7, "2025-10-03");

    assert!(editor.select_shift(cell, Some(2)).await);
    assert_eq!(editor.view().await.cell_state(&cell), CellState::PendingCreate);

    let outcome = editor.create_cell_and_save(cell, Some(2)).await;
    assert_matches!(outcome, SaveOutcome::RolledBack { .. });

    let view = editor.view().await;
    assert!(!view.grid.contains(&cell));
    assert!(!view.staging.is_created_locally(&cell));
    assert!(!view.staging.is_changed(&cell));
    assert_eq!(view.cell_state(&cell), CellState::Absent);
}

#[tokio::test]
async fn failed_update_keeps_the_edit_for_retry() {
    let api = Arc::new(FakeApi::new());
    let editor = open_editor(api.clone()).await;
    api.fail(&api.fail_upserts);
    let cell = key(5, "2025-10-02");

    editor.select_shift(cell, Some(4)).await;
    let outcome = editor.save_cell(cell).await;
    assert_matches!(outcome, SaveOutcome::Retained { .. });

    let view = editor.view().await;
    let kept = view.grid.cell(&cell).unwrap();
    assert_eq!(kept.id, Some(100));
    assert_eq!(kept.shift_type_id, Some(4));
    assert!(!view.staging.is_changed(&cell));
}

#[tokio::test]
async fn choosing_off_for_an_empty_cell_sends_nothing() {
    let api = Arc::new(FakeApi::new());
    let editor = open_editor(api.clone()).await;
    let cell = key(5, "2025-10-03");

    editor.select_shift(cell, None).await;
    assert_eq!(editor.create_cell_and_save(cell, None).await, SaveOutcome::Cleared);

    assert!(api.writes().is_empty());
    let view = editor.view().await;
    assert!(!view.staging.is_changed(&cell));
    assert_eq!(view.cell_state(&cell), CellState::Absent);
}

#[tokio::test]
async fn upsert_without_canonical_id_keeps_local_value() {
    let mut api = MockScheduleApi::new();
    api.expect_fetch_schedule()
        .returning(|_| Ok(schedule_record()));
    api.expect_list_employees().returning(|_| Ok(Vec::new()));
    api.expect_fetch_employee_hours()
        .returning(|_| Ok(Vec::new()));
    api.expect_upsert_assignment()
        .times(1)
        .withf(|schedule_id, request| {
            *schedule_id == SCHEDULE_ID
                && request.employee_id == 5
                && request.new_shift_type_id == 4
        })
        .returning(|_, _| Ok(None));

    let editor = ScheduleEditor::with_clock(
        Arc::new(api),
        Arc::new(rota_core::guard::FixedClock(today())),
        test_config(),
    );
    editor.open(SCHEDULE_ID).await.unwrap();

    let cell = key(5, "2025-10-02");
    editor.select_shift(cell, Some(4)).await;
    let outcome = editor.save_cell(cell).await;
    assert_eq!(
        outcome,
        SaveOutcome::Saved {
            id: None,
            shift_type_id: 4
        }
    );

    let view = editor.view().await;
    let kept = view.grid.cell(&cell).unwrap();
    assert_eq!(kept.id, Some(100));
    assert_eq!(kept.shift_type_id, Some(4));
}

// ---------------------------------------------------------------------------
// Test: hours
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_hours_fetch_clears_totals() {
    let api = Arc::new(FakeApi::new());
    let editor = open_editor(api.clone()).await;
    assert_eq!(editor.view().await.hours.len(), 2);

    api.fail(&api.fail_hours);
    editor.create_cell_and_save(key(6, "2025-10-03"), Some(1)).await;

    assert!(editor.view().await.hours.is_empty());
}

#[tokio::test]
async fn hours_are_refreshed_after_a_failed_save() {
    let api = Arc::new(FakeApi::new());
    let editor = open_editor(api.clone()).await;
    api.fail(&api.fail_upserts);

    editor.create_cell_and_save(key(6, "2025-10-03"), Some(1)).await;

    let hours_calls = api
        .calls()
        .into_iter()
        .filter(|c| *c == Call::Hours(SCHEDULE_ID))
        .count();
    assert_eq!(hours_calls, 2);
}

// ---------------------------------------------------------------------------
// Test: guards
// ---------------------------------------------------------------------------

#[tokio::test]
async fn past_and_current_dates_are_read_only() {
    let api = Arc::new(FakeApi::new());
    let editor = editor_at(api.clone(), NaiveDate::from_ymd_opt(2025, 10, 2).unwrap());
    editor.open(SCHEDULE_ID).await.unwrap();

    let today_cell = key(5, "2025-10-02");
    let past_cell = key(6, "2025-10-01");

    assert!(!editor.select_shift(today_cell, Some(1)).await);
    assert!(!editor.select_shift(past_cell, None).await);
    assert_eq!(
        editor.save_cell(today_cell).await,
        SaveOutcome::Skipped {
            reason: SkipReason::PastDate
        }
    );
    assert_eq!(
        editor.create_cell_and_save(key(5, "2025-10-01"), Some(2)).await,
        SaveOutcome::Skipped {
            reason: SkipReason::PastDate
        }
    );

    assert!(api.writes().is_empty());
    let view = editor.view().await;
    assert_eq!(view.grid.shift_at(&today_cell), Some(3));
    assert!(!view.staging.has_changes());

    // Tomorrow is still editable.
    assert!(editor.select_shift(key(5, "2025-10-03"), Some(1)).await);
}

#[tokio::test]
async fn nothing_is_saved_without_an_open_schedule() {
    let api = Arc::new(FakeApi::new());
    let editor = editor_at(api.clone(), today());

    assert_eq!(
        editor.save_cell(key(5, "2025-10-02")).await,
        SaveOutcome::Skipped {
            reason: SkipReason::NoSchedule
        }
    );
    assert!(!editor.select_shift(key(5, "2025-10-02"), Some(1)).await);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn saving_a_missing_cell_is_a_no_op() {
    let api = Arc::new(FakeApi::new());
    let editor = open_editor(api.clone()).await;

    assert_eq!(
        editor.save_cell(key(5, "2025-10-03")).await,
        SaveOutcome::Skipped {
            reason: SkipReason::MissingCell
        }
    );
    assert!(api.writes().is_empty());
}
