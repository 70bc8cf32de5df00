use clustering::{ClusterError, ClusterProjector, DisplayItem};
use foundation::math::StableF64;
use foundation::{ClusterId, LonLat, RecordId, ViewportBounds};
use records::{FilterChoices, FilterCriteria, FilterSummary, Record, RecordSummary};
use tracing::{debug, info};
use view::{
    CameraMove, MapEvent, MapStyle, MapView, SelectionController, ViewMode, derive_bounds,
};

use crate::config::MapConfig;

#[derive(Debug)]
struct FilterMemo {
    criteria: FilterCriteria,
    indices: Vec<usize>,
}

/// Everything the display items depend on besides the record set itself.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DisplayKey {
    criteria: FilterCriteria,
    bounds: Option<[StableF64; 4]>,
    zoom: Option<StableF64>,
}

impl DisplayKey {
    fn new(criteria: &FilterCriteria, bounds: ViewportBounds, zoom: Option<f64>) -> Self {
        Self {
            criteria: criteria.clone(),
            bounds: bounds.as_option().as_ref().map(StableF64::bounds_key),
            zoom: zoom.map(StableF64),
        }
    }
}

#[derive(Debug)]
struct DisplayMemo {
    key: DisplayKey,
    items: Vec<DisplayItem>,
}

/// The visitor map: filter state, clustering and selection wired to a
/// rendering collaborator.
///
/// Derived data is recomputed lazily and memoized on its inputs; the record
/// set is fixed for the lifetime of the map.
#[derive(Debug)]
pub struct VisitorMap<V> {
    view: V,
    records: Vec<Record>,
    choices: FilterChoices,
    criteria: FilterCriteria,
    projector: ClusterProjector,
    selection: SelectionController,
    view_mode: ViewMode,
    style: MapStyle,
    filtered: Option<FilterMemo>,
    display: Option<DisplayMemo>,
}

impl<V: MapView> VisitorMap<V> {
    pub fn new(mut view: V, records: Vec<Record>, config: &MapConfig) -> Self {
        info!(records = records.len(), "records loaded");
        view.set_view_mode(config.view_mode);
        view.set_style(config.style);
        Self {
            view,
            choices: FilterChoices::from_records(&records),
            records,
            criteria: FilterCriteria::default(),
            projector: ClusterProjector::with_options(config.clustering),
            selection: SelectionController::new(config.selection),
            view_mode: config.view_mode,
            style: config.style,
            filtered: None,
            display: None,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn style(&self) -> MapStyle {
        self.style
    }

    /// Dropdown choices, always from the full record set.
    pub fn choices(&self) -> &FilterChoices {
        &self.choices
    }

    fn refresh_filter(&mut self) {
        if self
            .filtered
            .as_ref()
            .is_some_and(|memo| memo.criteria == self.criteria)
        {
            return;
        }
        let indices: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| records::matches(r, &self.criteria))
            .map(|(i, _)| i)
            .collect();
        debug!(
            matched = indices.len(),
            total = self.records.len(),
            "filter recomputed"
        );
        self.filtered = Some(FilterMemo {
            criteria: self.criteria.clone(),
            indices,
        });
    }

    fn filtered_indices(&self) -> &[usize] {
        self.filtered
            .as_ref()
            .map(|memo| memo.indices.as_slice())
            .unwrap_or_default()
    }

    /// Records passing the current criteria, in input order.
    pub fn filtered_records(&mut self) -> Vec<&Record> {
        self.refresh_filter();
        self.filtered_indices()
            .iter()
            .map(|&i| &self.records[i])
            .collect()
    }

    pub fn summary(&mut self) -> FilterSummary {
        let total = self.records.len();
        FilterSummary::new(total, &self.filtered_records())
    }

    /// Markers for the current filter, viewport and zoom.
    pub fn display_items(&mut self) -> &[DisplayItem] {
        let bounds = derive_bounds(&self.view);
        let zoom = self.view.camera().map(|c| c.zoom);
        let key = DisplayKey::new(&self.criteria, bounds, zoom);

        if self.display.as_ref().is_none_or(|memo| memo.key != key) {
            self.refresh_filter();
            let indices = self
                .filtered
                .as_ref()
                .map(|memo| memo.indices.as_slice())
                .unwrap_or_default();
            let records = &self.records;
            let items = self
                .projector
                .project(indices.iter().map(|&i| &records[i]), bounds, zoom);
            debug!(items = items.len(), ?bounds, ?zoom, "display items projected");
            self.display = Some(DisplayMemo { key, items });
        }

        self.display
            .as_ref()
            .map(|memo| memo.items.as_slice())
            .unwrap_or_default()
    }

    /// Records under a cluster from the latest projection.
    pub fn cluster_leaves(&self, id: ClusterId) -> Result<Vec<&Record>, ClusterError> {
        self.projector.leaves(id)
    }

    pub fn selected_record(&self) -> Option<&Record> {
        self.selection.selected_record(&self.records)
    }

    /// Popup contents for the selected record.
    pub fn popup(&self) -> Option<RecordSummary> {
        self.selected_record().map(RecordSummary::from_record)
    }

    /// Applies one interaction. Returns the camera move issued to the view,
    /// if any.
    pub fn handle_event(&mut self, event: MapEvent) -> Option<CameraMove> {
        match event {
            // The view owns the camera; display items re-read it and key
            // their memo on the derived bounds, so nothing is stored here.
            MapEvent::CameraChanged(camera) => {
                debug!(zoom = camera.zoom, "camera changed");
                None
            }
            MapEvent::MarkerClicked(id) => self.select(id),
            MapEvent::ClusterClicked(id) => self.expand_cluster(id),
            MapEvent::BackgroundClicked(_) => {
                if self.selection.handle_background_interaction() {
                    debug!("selection cleared");
                }
                None
            }
            MapEvent::SearchChanged(text) => {
                self.criteria.search_text = text;
                None
            }
            MapEvent::FilterChanged(criteria) => {
                self.criteria = criteria;
                None
            }
            MapEvent::ResetView => {
                let request = self.selection.reset_view();
                Some(self.issue(request))
            }
            MapEvent::ToggleViewMode => {
                self.view_mode = self.view_mode.toggled();
                self.view.set_view_mode(self.view_mode);
                None
            }
            MapEvent::SetStyle(style) => {
                self.style = style;
                self.view.set_style(style);
                None
            }
        }
    }

    fn select(&mut self, id: RecordId) -> Option<CameraMove> {
        let Some(record) = self.records.iter().find(|r| r.id == id) else {
            debug!(%id, "ignoring click on unknown record");
            return None;
        };
        let request = self.selection.select_record(record);
        Some(self.issue(request))
    }

    fn expand_cluster(&mut self, id: ClusterId) -> Option<CameraMove> {
        match self.projector.expansion_target(id) {
            Ok(target) => {
                let request = CameraMove::fly_to(
                    LonLat::new(target.longitude, target.latitude),
                    f64::from(target.zoom),
                    self.selection.options().fly_duration_ms,
                );
                Some(self.issue(request))
            }
            Err(err) => {
                debug!(%err, "ignoring stale cluster click");
                None
            }
        }
    }

    fn issue(&mut self, request: CameraMove) -> CameraMove {
        info!(
            lon = request.center.lon,
            lat = request.center.lat,
            zoom = request.zoom,
            "camera move issued"
        );
        self.view.move_camera(request);
        request
    }
}
