use std::collections::BTreeMap;

use foundation::{ClusterId, LonLat, RecordId, ViewportBounds};
use records::Record;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clusterer::{ClusterItem, ClusterOptions, Clusterer, PointFeature};
use crate::index::ClusterIndex;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorOptions {
    #[serde(flatten)]
    pub cluster: ClusterOptions,
    /// Upper bound for the zoom a cluster click flies to.
    pub max_expansion_zoom: u8,
}

impl Default for ProjectorOptions {
    fn default() -> Self {
        Self {
            cluster: ClusterOptions::default(),
            max_expansion_zoom: 18,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterSize {
    Small,
    Medium,
    Large,
}

impl ClusterSize {
    pub fn from_count(point_count: usize) -> Self {
        match point_count {
            0..=9 => ClusterSize::Small,
            10..=99 => ClusterSize::Medium,
            _ => ClusterSize::Large,
        }
    }
}

/// What the rendering side draws: one marker per item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayItem {
    Singleton {
        record: Record,
    },
    Cluster {
        id: ClusterId,
        longitude: f64,
        latitude: f64,
        point_count: usize,
    },
}

impl DisplayItem {
    pub fn position(&self) -> LonLat {
        match self {
            DisplayItem::Singleton { record } => record.position(),
            DisplayItem::Cluster {
                longitude,
                latitude,
                ..
            } => LonLat::new(*longitude, *latitude),
        }
    }

    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            DisplayItem::Singleton { record } => Some(record.id),
            DisplayItem::Cluster { .. } => None,
        }
    }

    pub fn cluster_id(&self) -> Option<ClusterId> {
        match self {
            DisplayItem::Cluster { id, .. } => Some(*id),
            DisplayItem::Singleton { .. } => None,
        }
    }

    pub fn size_class(&self) -> Option<ClusterSize> {
        match self {
            DisplayItem::Cluster { point_count, .. } => Some(ClusterSize::from_count(*point_count)),
            DisplayItem::Singleton { .. } => None,
        }
    }
}

/// Camera target for a cluster click.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ExpansionTarget {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    UnknownCluster(ClusterId),
}

impl std::fmt::Display for ClusterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterError::UnknownCluster(id) => write!(f, "unknown cluster id {id}"),
        }
    }
}

impl std::error::Error for ClusterError {}

fn classify(item: ClusterItem<'_, Record>) -> Option<DisplayItem> {
    if let Some(id) = item.cluster_id
        && (item.point_count > 1 || item.payload.is_none())
    {
        return Some(DisplayItem::Cluster {
            id,
            longitude: item.position.lon,
            latitude: item.position.lat,
            point_count: item.point_count,
        });
    }
    match item.payload {
        Some(record) => Some(DisplayItem::Singleton {
            record: record.clone(),
        }),
        None => {
            debug!(
                point_count = item.point_count,
                "dropping clusterer item with neither cluster id nor payload"
            );
            None
        }
    }
}

/// Turns filtered records into display items through a [`Clusterer`].
///
/// The backend is only reloaded when the sequence of record ids differs from
/// the previous pass; results never depend on that reuse.
#[derive(Debug)]
pub struct ClusterProjector<C = ClusterIndex<Record>> {
    clusterer: C,
    options: ProjectorOptions,
    loaded_ids: Option<Vec<RecordId>>,
    last_clusters: BTreeMap<ClusterId, LonLat>,
}

impl ClusterProjector<ClusterIndex<Record>> {
    pub fn with_options(options: ProjectorOptions) -> Self {
        Self::new(ClusterIndex::new(options.cluster), options)
    }
}

impl Default for ClusterProjector<ClusterIndex<Record>> {
    fn default() -> Self {
        Self::with_options(ProjectorOptions::default())
    }
}

impl<C: Clusterer<Record>> ClusterProjector<C> {
    pub fn new(clusterer: C, options: ProjectorOptions) -> Self {
        Self {
            clusterer,
            options,
            loaded_ids: None,
            last_clusters: BTreeMap::new(),
        }
    }

    pub fn options(&self) -> ProjectorOptions {
        self.options
    }

    pub fn clusterer(&self) -> &C {
        &self.clusterer
    }

    /// Integer query zoom: absent or non-finite input uses the minimum
    /// cluster zoom, anything lower is raised to it.
    pub fn effective_zoom(&self, zoom: Option<f64>) -> u8 {
        let min = self.options.cluster.min_cluster_zoom;
        match zoom.filter(|z| z.is_finite()) {
            Some(z) => z.floor().clamp(min as f64, u8::MAX as f64) as u8,
            None => min,
        }
    }

    fn ensure_loaded<'r, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'r Record>,
        I::IntoIter: Clone,
    {
        let records = records.into_iter();
        let unchanged = self
            .loaded_ids
            .as_ref()
            .is_some_and(|ids| ids.iter().copied().eq(records.clone().map(|r| r.id)));
        if unchanged {
            return;
        }

        let points: Vec<PointFeature<Record>> = records
            .map(|r| PointFeature::new(r.id, r.position(), r.clone()))
            .collect();
        self.loaded_ids = Some(points.iter().map(|p| p.id).collect());
        self.clusterer.load(points);
    }

    /// Display items for `records` inside `bounds` at `zoom`.
    ///
    /// `ViewportBounds::Unavailable` queries the whole world.
    pub fn project<'r, I>(
        &mut self,
        records: I,
        bounds: ViewportBounds,
        zoom: Option<f64>,
    ) -> Vec<DisplayItem>
    where
        I: IntoIterator<Item = &'r Record>,
        I::IntoIter: Clone,
    {
        self.ensure_loaded(records);
        let zoom = self.effective_zoom(zoom);
        let items: Vec<DisplayItem> = self
            .clusterer
            .clusters(bounds.or_world(), zoom)
            .into_iter()
            .filter_map(classify)
            .collect();

        self.last_clusters = items
            .iter()
            .filter_map(|item| Some((item.cluster_id()?, item.position())))
            .collect();
        items
    }

    /// Where to fly when a cluster from the latest pass is clicked.
    ///
    /// The zoom is one past the level where the cluster splits, capped at
    /// `max_expansion_zoom`.
    pub fn expansion_target(&self, id: ClusterId) -> Result<ExpansionTarget, ClusterError> {
        let center = self
            .last_clusters
            .get(&id)
            .copied()
            .ok_or(ClusterError::UnknownCluster(id))?;
        let expansion = self
            .clusterer
            .expansion_zoom(id)
            .ok_or(ClusterError::UnknownCluster(id))?;
        Ok(ExpansionTarget {
            longitude: center.lon,
            latitude: center.lat,
            zoom: expansion
                .saturating_add(1)
                .min(self.options.max_expansion_zoom),
        })
    }

    /// Records grouped under a cluster.
    pub fn leaves(&self, id: ClusterId) -> Result<Vec<&Record>, ClusterError> {
        self.clusterer
            .leaves(id)
            .ok_or(ClusterError::UnknownCluster(id))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{ClusterError, ClusterProjector, ClusterSize, DisplayItem, ProjectorOptions};
    use crate::clusterer::{ClusterItem, ClusterOptions, Clusterer, PointFeature};
    use foundation::{ClusterId, GeoBounds, LonLat, RecordId, ViewportBounds};
    use pretty_assertions::assert_eq;
    use records::Record;

    fn tight_group() -> Vec<Record> {
        (0..5)
            .map(|i| {
                Record::new(
                    RecordId(i + 1),
                    -73.9855 + i as f64 * 0.00002,
                    40.7580 + i as f64 * 0.00001,
                )
            })
            .collect()
    }

    fn world_sample() -> Vec<Record> {
        let mut out = tight_group();
        out.extend([
            Record::new(RecordId(10), -0.1278, 51.5074),
            Record::new(RecordId(11), 2.3522, 48.8566),
            Record::new(RecordId(12), 139.65, 35.67),
            Record::new(RecordId(13), 151.2, -33.87),
            Record::new(RecordId(14), 2.36, 48.86),
        ]);
        out
    }

    fn recovered_ids(projector: &ClusterProjector, items: &[DisplayItem]) -> Vec<RecordId> {
        let mut out = Vec::new();
        for item in items {
            match item {
                DisplayItem::Singleton { record } => out.push(record.id),
                DisplayItem::Cluster { id, .. } => {
                    out.extend(projector.leaves(*id).unwrap().into_iter().map(|r| r.id));
                }
            }
        }
        out.sort();
        out
    }

    #[test]
    fn tight_group_without_camera_is_one_cluster() {
        let records = tight_group();
        let mut projector = ClusterProjector::default();
        let items = projector.project(&records, ViewportBounds::Unavailable, None);
        assert_eq!(items.len(), 1);
        match &items[0] {
            DisplayItem::Cluster { point_count, .. } => assert_eq!(*point_count, 5),
            other => panic!("expected a cluster, got {other:?}"),
        }
        assert_eq!(items[0].size_class(), Some(ClusterSize::Small));
    }

    #[test]
    fn zero_radius_still_projects_every_record() {
        let records = world_sample();
        let mut projector = ClusterProjector::with_options(ProjectorOptions {
            cluster: ClusterOptions {
                radius_px: 0,
                ..Default::default()
            },
            ..Default::default()
        });
        let items = projector.project(&records, ViewportBounds::Unavailable, None);
        let expected: Vec<RecordId> = records.iter().map(|r| r.id).collect();
        assert_eq!(recovered_ids(&projector, &items), expected);
    }

    #[test]
    fn zoom_is_floored_and_clamped_to_min() {
        let projector = ClusterProjector::default();
        assert_eq!(projector.effective_zoom(None), 2);
        assert_eq!(projector.effective_zoom(Some(0.5)), 2);
        assert_eq!(projector.effective_zoom(Some(f64::NAN)), 2);
        assert_eq!(projector.effective_zoom(Some(7.9)), 7);
    }

    #[test]
    fn deep_zoom_yields_singletons_with_payloads() {
        let records = tight_group();
        let mut projector = ClusterProjector::default();
        let items = projector.project(&records, ViewportBounds::Unavailable, Some(16.0));
        let ids: Vec<RecordId> = items.iter().filter_map(DisplayItem::record_id).collect();
        assert_eq!(ids, (1..=5).map(RecordId).collect::<Vec<_>>());
        assert_eq!(
            items[2],
            DisplayItem::Singleton {
                record: records[2].clone()
            }
        );
    }

    #[test]
    fn projection_is_deterministic_and_conserves_records() {
        let records = world_sample();
        let expected: Vec<RecordId> = records.iter().map(|r| r.id).collect();

        for zoom in [None, Some(3.0), Some(6.5), Some(12.0), Some(20.0)] {
            let mut a = ClusterProjector::default();
            let mut b = ClusterProjector::default();
            let ia = a.project(&records, ViewportBounds::Unavailable, zoom);
            let ib = b.project(&records, ViewportBounds::Unavailable, zoom);
            assert_eq!(ia, ib);
            // Re-running on a warm projector gives the same answer.
            assert_eq!(a.project(&records, ViewportBounds::Unavailable, zoom), ia);
            assert_eq!(recovered_ids(&a, &ia), expected);
        }
    }

    #[test]
    fn bounds_restrict_the_items() {
        let records = world_sample();
        let mut projector = ClusterProjector::default();
        let europe = ViewportBounds::Available(GeoBounds::new(-10.0, 35.0, 30.0, 60.0));
        let items = projector.project(&records, europe, Some(10.0));
        let ids: BTreeSet<RecordId> = recovered_ids(&projector, &items).into_iter().collect();
        assert_eq!(ids, [10, 11, 14].into_iter().map(RecordId).collect());
    }

    #[test]
    fn reloads_when_the_filtered_set_changes() {
        let records = world_sample();
        let mut projector = ClusterProjector::default();
        let all = projector.project(&records, ViewportBounds::Unavailable, Some(18.0));
        assert_eq!(all.len(), records.len());

        let subset: Vec<&Record> = records.iter().filter(|r| r.id.get() >= 10).collect();
        let some = projector.project(
            subset.iter().copied(),
            ViewportBounds::Unavailable,
            Some(18.0),
        );
        assert_eq!(some.len(), 5);
    }

    #[test]
    fn expansion_target_is_capped_and_past_the_split() {
        let records = tight_group();
        let mut projector = ClusterProjector::default();
        let items = projector.project(&records, ViewportBounds::Unavailable, None);
        let id = items[0].cluster_id().unwrap();

        let target = projector.expansion_target(id).unwrap();
        let split = projector.clusterer().expansion_zoom(id).unwrap();
        assert!(target.zoom <= 18);
        if split < 18 {
            assert_eq!(target.zoom, split + 1);
        }
        assert_eq!(LonLat::new(target.longitude, target.latitude), items[0].position());

        let mut capped = ClusterProjector::with_options(ProjectorOptions {
            max_expansion_zoom: 10,
            ..Default::default()
        });
        let items = capped.project(&records, ViewportBounds::Unavailable, None);
        let target = capped.expansion_target(items[0].cluster_id().unwrap()).unwrap();
        assert_eq!(target.zoom, 10);
    }

    #[test]
    fn stale_cluster_ids_are_reported() {
        let records = tight_group();
        let mut projector = ClusterProjector::default();
        let items = projector.project(&records, ViewportBounds::Unavailable, None);
        let id = items[0].cluster_id().unwrap();

        // Deep zoom: the cluster is no longer on screen.
        projector.project(&records, ViewportBounds::Unavailable, Some(17.0));
        assert_eq!(
            projector.expansion_target(id),
            Err(ClusterError::UnknownCluster(id))
        );
        assert!(projector.leaves(ClusterId::new(77, 4)).is_err());
    }

    /// Backend that reports everything as pass-through plus an explicit
    /// single-member cluster and one item with no id and no payload, to pin
    /// down classification.
    struct Scripted {
        points: Vec<PointFeature<Record>>,
    }

    impl Clusterer<Record> for Scripted {
        fn load(&mut self, points: Vec<PointFeature<Record>>) {
            self.points = points;
        }

        fn clusters(&self, _bounds: GeoBounds, _zoom: u8) -> Vec<ClusterItem<'_, Record>> {
            let mut out: Vec<ClusterItem<'_, Record>> = self
                .points
                .iter()
                .map(|p| ClusterItem {
                    position: p.position,
                    point_count: 1,
                    cluster_id: None,
                    payload: Some(&p.payload),
                })
                .collect();
            out.push(ClusterItem {
                position: LonLat::new(1.0, 2.0),
                point_count: 1,
                cluster_id: Some(ClusterId::new(9, 9)),
                payload: None,
            });
            // Malformed: nothing to draw and nothing to expand.
            out.push(ClusterItem {
                position: LonLat::new(3.0, 4.0),
                point_count: 3,
                cluster_id: None,
                payload: None,
            });
            out
        }

        fn expansion_zoom(&self, _id: ClusterId) -> Option<u8> {
            Some(40)
        }

        fn leaves(&self, _id: ClusterId) -> Option<Vec<&Record>> {
            None
        }
    }

    #[test]
    fn classification_follows_count_and_cluster_flag() {
        let records = tight_group();
        let mut projector = ClusterProjector::new(
            Scripted { points: Vec::new() },
            ProjectorOptions::default(),
        );
        let items = projector.project(&records, ViewportBounds::Unavailable, None);
        assert_eq!(items.len(), 6);
        assert!(items[..5].iter().all(|i| i.record_id().is_some()));
        assert_eq!(items[5].cluster_id(), Some(ClusterId::new(9, 9)));
        assert!(items.iter().all(|i| i.position() != LonLat::new(3.0, 4.0)));

        // Expansion zoom reported past the cap is clamped.
        let target = projector.expansion_target(ClusterId::new(9, 9)).unwrap();
        assert_eq!(target.zoom, 18);
    }

    #[test]
    fn display_items_serialize_with_kind_tag() {
        let item = DisplayItem::Cluster {
            id: ClusterId(3),
            longitude: 1.5,
            latitude: -2.0,
            point_count: 12,
        };
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"cluster","id":3,"longitude":1.5,"latitude":-2.0,"point_count":12}"#
        );
        assert_eq!(item.size_class(), Some(ClusterSize::Medium));
    }
}
