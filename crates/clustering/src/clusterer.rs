use foundation::{ClusterId, GeoBounds, LonLat, RecordId};
use serde::{Deserialize, Serialize};

/// Tuning shared by the projector and the clustering backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterOptions {
    /// Grouping radius in screen pixels.
    pub radius_px: u32,
    /// Highest zoom at which points are still grouped.
    pub max_cluster_zoom: u8,
    /// Lowest zoom that has its own cluster level.
    pub min_cluster_zoom: u8,
    /// Tile extent the radius is measured against.
    pub extent: u32,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            radius_px: 60,
            max_cluster_zoom: 14,
            min_cluster_zoom: 2,
            extent: 512,
        }
    }
}

/// Input point: a position keyed by record id with an arbitrary payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PointFeature<P> {
    pub id: RecordId,
    pub position: LonLat,
    pub payload: P,
}

impl<P> PointFeature<P> {
    pub fn new(id: RecordId, position: LonLat, payload: P) -> Self {
        Self {
            id,
            position,
            payload,
        }
    }
}

/// One item of a clustering query.
///
/// Clusters carry an id and a count above one; pass-through points carry the
/// original payload and a count of one.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterItem<'a, P> {
    pub position: LonLat,
    pub point_count: usize,
    pub cluster_id: Option<ClusterId>,
    pub payload: Option<&'a P>,
}

/// Spatial grouping backend.
///
/// `load` replaces the point set; queries reflect the most recent load only.
pub trait Clusterer<P> {
    fn load(&mut self, points: Vec<PointFeature<P>>);

    /// Items visible inside `bounds` at integer `zoom`.
    fn clusters(&self, bounds: GeoBounds, zoom: u8) -> Vec<ClusterItem<'_, P>>;

    /// Zoom at which the cluster splits into more than one item, or `None`
    /// for ids this backend does not know.
    fn expansion_zoom(&self, id: ClusterId) -> Option<u8>;

    /// Every point payload inside the cluster, or `None` for unknown ids.
    fn leaves(&self, id: ClusterId) -> Option<Vec<&P>>;
}
