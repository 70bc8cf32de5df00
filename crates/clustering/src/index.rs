//! Hierarchical greedy point clustering.
//!
//! Points are projected to unit Web-Mercator and grouped level by level, from
//! `max_cluster_zoom` down to `min_cluster_zoom`. Each level is built from the
//! one above it (zoom + 1): nodes are visited in index order and every
//! unvisited node absorbs all unvisited neighbors within
//! `radius_px / (extent * 2^zoom)`. A group of two or more becomes a cluster
//! at its count-weighted centroid; a lone node is carried down unchanged.
//!
//! Ordering contract:
//! - Level nodes keep the order they were created in, which follows the input
//!   point order. Queries return items in ascending node order.
//! - Cluster ids encode `(node index, zoom)` and are identical for identical input.

use std::collections::BTreeMap;

use foundation::math::{lat_to_unit_y, lon_to_unit_x, unit_x_to_lon, unit_y_to_lat};
use foundation::{ClusterId, GeoBounds, LonLat};
use tracing::debug;

use crate::clusterer::{ClusterItem, ClusterOptions, Clusterer, PointFeature};

/// Zoom levels past this are not indexed; ids keep the zoom in 8 bits and the
/// radius math stays well inside f64 precision.
const MAX_INDEX_ZOOM: u8 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Point(usize),
    Cluster(ClusterId),
}

#[derive(Debug, Clone)]
struct Node {
    x: f64,
    y: f64,
    count: usize,
    kind: NodeKind,
    /// Indices into the level one zoom step above.
    children: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
struct Level {
    nodes: Vec<Node>,
}

/// Uniform grid over unit-Mercator coordinates for radius queries.
struct Grid {
    cell: f64,
    cells: BTreeMap<(i64, i64), Vec<usize>>,
}

impl Grid {
    fn build(nodes: &[Node], cell: f64) -> Self {
        let mut grid = Grid {
            cell,
            cells: BTreeMap::new(),
        };
        for (i, n) in nodes.iter().enumerate() {
            let key = grid.key(n.x, n.y);
            grid.cells.entry(key).or_default().push(i);
        }
        grid
    }

    fn key(&self, x: f64, y: f64) -> (i64, i64) {
        ((x / self.cell).floor() as i64, (y / self.cell).floor() as i64)
    }

    /// Node indices within `r` of `(x, y)`, ascending.
    fn within(&self, nodes: &[Node], x: f64, y: f64, r: f64) -> Vec<usize> {
        let (cx, cy) = self.key(x, y);
        let r2 = r * r;
        let mut out = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                let key = (cx.saturating_add(dx), cy.saturating_add(dy));
                let Some(bucket) = self.cells.get(&key) else {
                    continue;
                };
                for &j in bucket {
                    let n = &nodes[j];
                    let ddx = n.x - x;
                    let ddy = n.y - y;
                    if ddx * ddx + ddy * ddy <= r2 {
                        out.push(j);
                    }
                }
            }
        }
        out.sort_unstable();
        out
    }
}

/// Reference [`Clusterer`] implementation.
#[derive(Debug, Clone)]
pub struct ClusterIndex<P> {
    options: ClusterOptions,
    points: Vec<PointFeature<P>>,
    /// `levels[i]` holds zoom `min_zoom + i`; the last level holds the raw points.
    levels: Vec<Level>,
}

impl<P> ClusterIndex<P> {
    pub fn new(options: ClusterOptions) -> Self {
        let max_cluster_zoom = options.max_cluster_zoom.min(MAX_INDEX_ZOOM);
        let min_cluster_zoom = options.min_cluster_zoom.min(max_cluster_zoom);
        Self {
            options: ClusterOptions {
                max_cluster_zoom,
                min_cluster_zoom,
                radius_px: options.radius_px.max(1),
                extent: options.extent.max(1),
            },
            points: Vec::new(),
            levels: Vec::new(),
        }
    }

    pub fn options(&self) -> ClusterOptions {
        self.options
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn min_zoom(&self) -> u8 {
        self.options.min_cluster_zoom
    }

    /// Zoom of the raw-point level.
    fn top_zoom(&self) -> u8 {
        self.options.max_cluster_zoom + 1
    }

    fn level(&self, zoom: u8) -> Option<&Level> {
        if zoom < self.min_zoom() {
            return None;
        }
        self.levels.get((zoom - self.min_zoom()) as usize)
    }

    fn radius_at(&self, zoom: u8) -> f64 {
        self.options.radius_px as f64 / (self.options.extent as f64 * 2f64.powi(zoom as i32))
    }

    fn cluster_level(&self, prev: &Level, zoom: u8) -> Level {
        let r = self.radius_at(zoom);
        let grid = Grid::build(&prev.nodes, r);
        let mut visited = vec![false; prev.nodes.len()];
        let mut nodes: Vec<Node> = Vec::new();

        for i in 0..prev.nodes.len() {
            if visited[i] {
                continue;
            }
            visited[i] = true;
            let p = &prev.nodes[i];

            let neighbors: Vec<usize> = grid
                .within(&prev.nodes, p.x, p.y, r)
                .into_iter()
                .filter(|&j| !visited[j])
                .collect();

            if neighbors.is_empty() {
                nodes.push(Node {
                    x: p.x,
                    y: p.y,
                    count: p.count,
                    kind: p.kind,
                    children: vec![i],
                });
                continue;
            }

            let mut wx = p.x * p.count as f64;
            let mut wy = p.y * p.count as f64;
            let mut count = p.count;
            let mut children = Vec::with_capacity(neighbors.len() + 1);
            children.push(i);
            for j in neighbors {
                visited[j] = true;
                let q = &prev.nodes[j];
                wx += q.x * q.count as f64;
                wy += q.y * q.count as f64;
                count += q.count;
                children.push(j);
            }

            let id = ClusterId::new(nodes.len() as u32, zoom);
            nodes.push(Node {
                x: wx / count as f64,
                y: wy / count as f64,
                count,
                kind: NodeKind::Cluster(id),
                children,
            });
        }

        Level { nodes }
    }

    fn cluster_node(&self, id: ClusterId) -> Option<&Node> {
        if id.zoom() >= self.top_zoom() {
            return None;
        }
        self.level(id.zoom())?
            .nodes
            .get(id.index() as usize)
            .filter(|n| n.kind == NodeKind::Cluster(id))
    }

    fn collect_points(&self, zoom: u8, node: &Node, out: &mut Vec<usize>) {
        if let NodeKind::Point(i) = node.kind {
            out.push(i);
            return;
        }
        let Some(next) = self.level(zoom + 1) else {
            return;
        };
        for &c in &node.children {
            if let Some(child) = next.nodes.get(c) {
                self.collect_points(zoom + 1, child, out);
            }
        }
    }

    fn item<'a>(&'a self, node: &Node) -> ClusterItem<'a, P> {
        match node.kind {
            NodeKind::Point(i) => {
                let p = &self.points[i];
                ClusterItem {
                    position: p.position,
                    point_count: 1,
                    cluster_id: None,
                    payload: Some(&p.payload),
                }
            }
            NodeKind::Cluster(id) => ClusterItem {
                position: LonLat::new(unit_x_to_lon(node.x), unit_y_to_lat(node.y)),
                point_count: node.count,
                cluster_id: Some(id),
                payload: None,
            },
        }
    }
}

impl<P> Default for ClusterIndex<P> {
    fn default() -> Self {
        Self::new(ClusterOptions::default())
    }
}

impl<P> Clusterer<P> for ClusterIndex<P> {
    fn load(&mut self, points: Vec<PointFeature<P>>) {
        let leaf = Level {
            nodes: points
                .iter()
                .enumerate()
                .map(|(i, p)| Node {
                    x: lon_to_unit_x(p.position.lon),
                    y: lat_to_unit_y(p.position.lat),
                    count: 1,
                    kind: NodeKind::Point(i),
                    children: Vec::new(),
                })
                .collect(),
        };
        self.points = points;

        let mut levels = Vec::with_capacity((self.top_zoom() - self.min_zoom()) as usize + 1);
        let mut current = leaf;
        for zoom in (self.min_zoom()..=self.options.max_cluster_zoom).rev() {
            let next = self.cluster_level(&current, zoom);
            levels.push(current);
            current = next;
        }
        levels.push(current);
        levels.reverse();
        self.levels = levels;

        debug!(
            points = self.points.len(),
            clusters_at_min_zoom = self.levels.first().map_or(0, |l| l.nodes.len()),
            "cluster index rebuilt"
        );
    }

    fn clusters(&self, bounds: GeoBounds, zoom: u8) -> Vec<ClusterItem<'_, P>> {
        let zoom = zoom.clamp(self.min_zoom(), self.top_zoom());
        let Some(level) = self.level(zoom) else {
            return Vec::new();
        };

        let y_top = lat_to_unit_y(bounds.north);
        let y_bottom = lat_to_unit_y(bounds.south);
        let mut hits: Vec<usize> = Vec::new();
        for (west, east) in bounds.lon_ranges() {
            let x_min = lon_to_unit_x(west);
            let x_max = lon_to_unit_x(east);
            hits.extend(
                level
                    .nodes
                    .iter()
                    .enumerate()
                    .filter(|(_, n)| {
                        n.x >= x_min && n.x <= x_max && n.y >= y_top && n.y <= y_bottom
                    })
                    .map(|(i, _)| i),
            );
        }
        hits.sort_unstable();
        hits.dedup();

        hits.into_iter()
            .map(|i| self.item(&level.nodes[i]))
            .collect()
    }

    fn expansion_zoom(&self, id: ClusterId) -> Option<u8> {
        let mut node = self.cluster_node(id)?;
        let mut zoom = id.zoom();
        loop {
            zoom += 1;
            if node.children.len() != 1 {
                return Some(zoom);
            }
            node = self.level(zoom)?.nodes.get(node.children[0])?;
        }
    }

    fn leaves(&self, id: ClusterId) -> Option<Vec<&P>> {
        let node = self.cluster_node(id)?;
        let mut indices = Vec::new();
        self.collect_points(id.zoom(), node, &mut indices);
        indices.sort_unstable();
        Some(
            indices
                .into_iter()
                .map(|i| &self.points[i].payload)
                .collect(),
        )
    }
}
