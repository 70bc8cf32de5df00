use foundation::GeoBounds;

use crate::camera::{CameraMove, CameraState};
use crate::mode::{MapStyle, ViewMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    NotReady,
    QueryFailed(String),
}

impl std::fmt::Display for ViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewError::NotReady => write!(f, "map view is not initialized"),
            ViewError::QueryFailed(msg) => write!(f, "map view query failed: {msg}"),
        }
    }
}

impl std::error::Error for ViewError {}

/// The rendering side: camera queries and camera commands.
pub trait MapView {
    /// Current camera, or `None` before the first frame.
    fn camera(&self) -> Option<CameraState>;

    fn viewport_bounds(&self) -> Result<GeoBounds, ViewError>;

    fn move_camera(&mut self, request: CameraMove);

    fn set_view_mode(&mut self, _mode: ViewMode) {}

    fn set_style(&mut self, _style: MapStyle) {}
}

/// In-memory view with a fixed viewport; records every camera request.
#[derive(Debug, Default, Clone)]
pub struct StaticMapView {
    camera: Option<CameraState>,
    bounds: Option<GeoBounds>,
    moves: Vec<CameraMove>,
    view_mode: ViewMode,
    style: MapStyle,
}

impl StaticMapView {
    /// A view that has not reported a camera yet.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewport(camera: CameraState, bounds: GeoBounds) -> Self {
        Self {
            camera: Some(camera),
            bounds: Some(bounds),
            ..Default::default()
        }
    }

    pub fn set_viewport(&mut self, camera: CameraState, bounds: Option<GeoBounds>) {
        self.camera = Some(camera);
        self.bounds = bounds;
    }

    pub fn moves(&self) -> &[CameraMove] {
        &self.moves
    }

    pub fn last_move(&self) -> Option<&CameraMove> {
        self.moves.last()
    }

    pub fn drain_moves(&mut self) -> Vec<CameraMove> {
        std::mem::take(&mut self.moves)
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn style(&self) -> MapStyle {
        self.style
    }
}

impl MapView for StaticMapView {
    fn camera(&self) -> Option<CameraState> {
        self.camera
    }

    fn viewport_bounds(&self) -> Result<GeoBounds, ViewError> {
        if self.camera.is_none() {
            return Err(ViewError::NotReady);
        }
        self.bounds
            .ok_or_else(|| ViewError::QueryFailed("no viewport reported".to_string()))
    }

    /// Jumps straight to the target; there is no animation to wait for.
    fn move_camera(&mut self, request: CameraMove) {
        let mut camera = self.camera.unwrap_or_default();
        camera.center = request.center;
        camera.zoom = request.zoom;
        if let Some(bearing) = request.bearing {
            camera.bearing = bearing;
        }
        if let Some(pitch) = request.pitch {
            camera.pitch = pitch;
        }
        self.camera = Some(camera);
        self.moves.push(request);
    }

    fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    fn set_style(&mut self, style: MapStyle) {
        self.style = style;
    }
}
