//! Employee-hours aggregation.
//!
//! Totals are always fetched from the server and replace the local map
//! wholesale. A failed fetch empties the map rather than leaving stale
//! numbers on screen.

use std::sync::Arc;

use rota_client::ScheduleApi;
use rota_core::types::ScheduleId;
use rota_events::bus::{EditorEvent, EventBus};
use tokio::sync::RwLock;

use crate::state::ViewState;

#[derive(Clone)]
pub struct HoursAggregator {
    api: Arc<dyn ScheduleApi>,
    view: Arc<RwLock<ViewState>>,
    bus: Arc<EventBus>,
}

impl HoursAggregator {
    pub fn new(
        api: Arc<dyn ScheduleApi>,
        view: Arc<RwLock<ViewState>>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self { api, view, bus }
    }

    /// Re-fetch the hours of `schedule_id` and replace the local map.
    ///
    /// The result is dropped when a different schedule (or none) is open
    /// by the time the response arrives.
    pub async fn refresh(&self, schedule_id: ScheduleId) {
        let result = self.api.fetch_employee_hours(schedule_id).await;

        let mut view = self.view.write().await;
        if !view.is_showing(schedule_id) {
            tracing::debug!(schedule_id, "View changed; dropping hours response");
            return;
        }

        match result {
            Ok(rows) => {
                view.hours = rows
                    .into_iter()
                    .map(|row| (row.employee_id, row.total_hours))
                    .collect();
                tracing::debug!(schedule_id, employees = view.hours.len(), "Hours refreshed");
                self.bus.publish(EditorEvent::HoursRefreshed {
                    schedule_id,
                    employees: view.hours.len(),
                });
            }
            Err(e) => {
                tracing::warn!(schedule_id, error = %e, "Failed to fetch hours; clearing totals");
                view.hours.clear();
                self.bus.publish(EditorEvent::HoursCleared { schedule_id });
            }
        }
    }
}
