use foundation::LonLat;
use serde::{Deserialize, Serialize};

/// Camera as reported by the rendering side.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraState {
    pub center: LonLat,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            center: LonLat::new(0.0, 20.0),
            zoom: 2.0,
            pitch: 0.0,
            bearing: 0.0,
        }
    }
}

impl CameraState {
    pub fn new(center: LonLat, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            ..Default::default()
        }
    }
}

/// Fire-and-forget camera request; the renderer owns the animation.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraMove {
    pub center: LonLat,
    pub zoom: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    pub duration_ms: u32,
    pub interruptible: bool,
}

impl CameraMove {
    /// Fly to `center` at `zoom`, keeping the current bearing and pitch.
    pub fn fly_to(center: LonLat, zoom: f64, duration_ms: u32) -> Self {
        Self {
            center,
            zoom,
            bearing: None,
            pitch: None,
            duration_ms,
            interruptible: true,
        }
    }

    /// Move to a full camera state, bearing and pitch included.
    pub fn to_camera(camera: CameraState, duration_ms: u32) -> Self {
        Self {
            center: camera.center,
            zoom: camera.zoom,
            bearing: Some(camera.bearing),
            pitch: Some(camera.pitch),
            duration_ms,
            interruptible: true,
        }
    }
}
