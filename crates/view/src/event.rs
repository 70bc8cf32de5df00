use foundation::{ClusterId, LonLat, RecordId};
use records::FilterCriteria;
use serde::{Deserialize, Serialize};

use crate::camera::CameraState;
use crate::mode::MapStyle;

/// Interactions delivered by the rendering side and the filter controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MapEvent {
    CameraChanged(CameraState),
    MarkerClicked(RecordId),
    ClusterClicked(ClusterId),
    BackgroundClicked(LonLat),
    /// Only the search text changes; the other criteria are kept.
    SearchChanged(String),
    /// Replaces the whole criteria set.
    FilterChanged(FilterCriteria),
    ResetView,
    ToggleViewMode,
    SetStyle(MapStyle),
}

#[cfg(test)]
mod tests {
    use super::MapEvent;
    use foundation::RecordId;
    use pretty_assertions::assert_eq;

    #[test]
    fn events_use_tagged_json() {
        let ev: MapEvent =
            serde_json::from_str(r#"{"type":"marker_clicked","data":7}"#).unwrap();
        assert_eq!(ev, MapEvent::MarkerClicked(RecordId(7)));

        assert_eq!(
            serde_json::to_string(&MapEvent::ResetView).unwrap(),
            r#"{"type":"reset_view"}"#
        );
    }
}
