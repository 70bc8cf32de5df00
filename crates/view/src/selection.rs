use foundation::RecordId;
use records::Record;
use serde::{Deserialize, Serialize};

use crate::camera::{CameraMove, CameraState};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Empty,
    Selected(RecordId),
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionOptions {
    /// Zoom used when flying to a selected record.
    pub focus_zoom: f64,
    pub fly_duration_ms: u32,
    /// Where "reset view" returns to.
    pub default_camera: CameraState,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            focus_zoom: 12.0,
            fly_duration_ms: 1500,
            default_camera: CameraState::default(),
        }
    }
}

/// Single-record selection.
///
/// Selecting replaces whatever was selected before; there is never more than
/// one selected record.
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    state: Selection,
    options: SelectionOptions,
}

impl SelectionController {
    pub fn new(options: SelectionOptions) -> Self {
        Self {
            state: Selection::Empty,
            options,
        }
    }

    pub fn options(&self) -> &SelectionOptions {
        &self.options
    }

    pub fn state(&self) -> Selection {
        self.state
    }

    pub fn selected(&self) -> Option<RecordId> {
        match self.state {
            Selection::Selected(id) => Some(id),
            Selection::Empty => None,
        }
    }

    pub fn is_selected(&self, id: RecordId) -> bool {
        self.selected() == Some(id)
    }

    /// Looks the selected id up in `records`.
    pub fn selected_record<'a>(&self, records: &'a [Record]) -> Option<&'a Record> {
        let id = self.selected()?;
        records.iter().find(|r| r.id == id)
    }

    pub fn select_record(&mut self, record: &Record) -> CameraMove {
        self.state = Selection::Selected(record.id);
        CameraMove::fly_to(
            record.position(),
            self.options.focus_zoom,
            self.options.fly_duration_ms,
        )
    }

    pub fn clear_selection(&mut self) {
        self.state = Selection::Empty;
    }

    pub fn reset_view(&mut self) -> CameraMove {
        self.state = Selection::Empty;
        CameraMove::to_camera(self.options.default_camera, self.options.fly_duration_ms)
    }

    /// A click on the map background dismisses the popup.
    ///
    /// Returns `true` if a selection was cleared.
    pub fn handle_background_interaction(&mut self) -> bool {
        match self.state {
            Selection::Selected(_) => {
                self.clear_selection();
                true
            }
            Selection::Empty => false,
        }
    }
}
