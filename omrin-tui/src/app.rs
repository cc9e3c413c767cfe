use std::sync::Arc;

use chrono::{DateTime, Local};
use omrin_core::{RefreshCoordinator, SensorReading};

use crate::scheduler::RefreshOutcome;

pub(crate) struct App {
    pub coordinator: Arc<RefreshCoordinator>,

    pub readings: Vec<SensorReading>,
    pub sensor_list_index: usize,

    pub last_updated: Option<DateTime<Local>>,
    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(coordinator: Arc<RefreshCoordinator>) -> Self {
        let readings = coordinator.readings();
        let last_updated = coordinator.summary().map(|_| Local::now());
        Self {
            coordinator,
            readings,
            sensor_list_index: 0,
            last_updated,
            is_loading: false,
            error_message: None,
        }
    }

    /// Pull fresh readings after the coordinator published a summary.
    pub(crate) fn reload(&mut self) {
        self.readings = self.coordinator.readings();
        self.last_updated = Some(Local::now());
    }

    pub(crate) fn apply_outcome(&mut self, outcome: RefreshOutcome) {
        self.is_loading = false;
        match outcome {
            RefreshOutcome::Refreshed => self.error_message = None,
            RefreshOutcome::Coalesced => {
                self.error_message = Some("Refresh recent or pending, request skipped".into());
            }
            RefreshOutcome::Failed(msg) => {
                self.error_message = Some(format!("{msg} (showing last known values)"));
            }
        }
    }

    pub(crate) fn selected_reading(&self) -> Option<&SensorReading> {
        self.readings.get(self.sensor_list_index)
    }

    pub(crate) fn select_previous(&mut self) {
        self.sensor_list_index = self.sensor_list_index.saturating_sub(1);
    }

    pub(crate) fn select_next(&mut self) {
        if self.sensor_list_index + 1 < self.readings.len() {
            self.sensor_list_index += 1;
        }
    }
}
