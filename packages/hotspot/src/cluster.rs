//! Density-based clustering under a great-circle distance threshold.
//!
//! Two points are directly connected when their haversine central angle is
//! at most epsilon (inclusive). With `min_points == 1` every point is a core
//! point, so clusters are exactly the connected components of that graph
//! and no point is noise. Larger `min_points` values give DBSCAN semantics:
//! border points join the first cluster that reaches them and unreachable
//! non-core points stay unlabelled.
//!
//! Cluster ids are handed out in the order their seed point appears in the
//! input, so the labelling is fully determined by input order and epsilon.

use std::collections::VecDeque;

use hotspot_map_complaint_models::RadianCoordinate;
use hotspot_map_hotspot_models::{ClusterAssignment, ClusterId};
use rstar::{AABB, RTree, RTreeObject};

use crate::sphere::{central_angle, neighbourhood_windows};

/// Source of epsilon-neighbourhoods for the clustering loop.
pub trait Neighbourhood {
    /// Number of indexed points.
    fn len(&self) -> usize;

    /// Whether no points are indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indices of every point within epsilon of point `index`, itself
    /// included, in ascending order.
    fn neighbours(&self, index: usize) -> Vec<usize>;
}

/// A point stored in the R-tree with its position in the input.
struct IndexedPoint {
    index: usize,
    position: [f64; 2],
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

/// R-tree backed neighbourhood queries.
///
/// Candidates come from a conservative `[latitude, longitude]` window and
/// are confirmed with the exact central angle.
pub struct RTreeNeighbourhood<'a> {
    points: &'a [RadianCoordinate],
    epsilon: f64,
    tree: RTree<IndexedPoint>,
}

impl<'a> RTreeNeighbourhood<'a> {
    /// Bulk-loads an R-tree over `points`.
    #[must_use]
    pub fn new(points: &'a [RadianCoordinate], epsilon: f64) -> Self {
        let entries = points
            .iter()
            .enumerate()
            .map(|(index, p)| IndexedPoint {
                index,
                position: [p.latitude, p.longitude],
            })
            .collect();

        Self {
            points,
            epsilon,
            tree: RTree::bulk_load(entries),
        }
    }
}

impl Neighbourhood for RTreeNeighbourhood<'_> {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn neighbours(&self, index: usize) -> Vec<usize> {
        let center = self.points[index];
        let mut found: Vec<usize> = neighbourhood_windows(center, self.epsilon)
            .into_iter()
            .flat_map(|window| {
                self.tree
                    .locate_in_envelope(&AABB::from_corners(window.lower, window.upper))
            })
            .filter(|candidate| central_angle(center, self.points[candidate.index]) <= self.epsilon)
            .map(|candidate| candidate.index)
            .collect();

        found.sort_unstable();
        found.dedup();
        found
    }
}

/// Pairwise neighbourhood queries. Quadratic, used as a reference.
pub struct PairwiseNeighbourhood<'a> {
    points: &'a [RadianCoordinate],
    epsilon: f64,
}

impl<'a> PairwiseNeighbourhood<'a> {
    /// Wraps `points` without any indexing.
    #[must_use]
    pub const fn new(points: &'a [RadianCoordinate], epsilon: f64) -> Self {
        Self { points, epsilon }
    }
}

impl Neighbourhood for PairwiseNeighbourhood<'_> {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn neighbours(&self, index: usize) -> Vec<usize> {
        let center = self.points[index];
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| central_angle(center, **p) <= self.epsilon)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Clusters `points` with an R-tree accelerated neighbourhood.
///
/// Empty input yields an empty assignment.
#[must_use]
pub fn cluster_points(
    points: &[RadianCoordinate],
    epsilon: f64,
    min_points: usize,
) -> ClusterAssignment {
    if points.is_empty() {
        return ClusterAssignment::new(Vec::new(), 0);
    }

    let index = RTreeNeighbourhood::new(points, epsilon);
    let assignment = label_clusters(&index, min_points);

    log::debug!(
        "Clustered {} points into {} clusters ({} noise)",
        points.len(),
        assignment.cluster_count(),
        assignment.noise_count()
    );

    assignment
}

/// Runs the expansion loop over any [`Neighbourhood`].
///
/// Seeds are visited in ascending input order. A seed whose neighbourhood
/// has fewer than `min_points` members is skipped (it may still be claimed
/// later as a border point).
#[must_use]
pub fn label_clusters<N: Neighbourhood>(index: &N, min_points: usize) -> ClusterAssignment {
    let (assignment, enqueued) = expand_clusters(index, min_points);
    log::trace!("Expansion enqueued {enqueued} points");
    assignment
}

/// The expansion loop. Returns the assignment and the number of queue
/// pushes, which never exceeds the number of points.
fn expand_clusters<N: Neighbourhood>(index: &N, min_points: usize) -> (ClusterAssignment, usize) {
    let mut labels: Vec<Option<ClusterId>> = vec![None; index.len()];
    let mut next_id = 0;
    let mut enqueued = 0;
    let mut queue = VecDeque::new();

    for seed in 0..index.len() {
        if labels[seed].is_some() {
            continue;
        }

        let seed_neighbours = index.neighbours(seed);
        if seed_neighbours.len() < min_points {
            continue;
        }

        let id = ClusterId(next_id);
        next_id += 1;
        labels[seed] = Some(id);

        // Points are labelled when pushed, so each enters the queue once.
        for neighbour in seed_neighbours {
            if labels[neighbour].is_none() {
                labels[neighbour] = Some(id);
                queue.push_back(neighbour);
                enqueued += 1;
            }
        }

        while let Some(point) = queue.pop_front() {
            let reach = index.neighbours(point);
            if reach.len() < min_points {
                continue;
            }
            for neighbour in reach {
                if labels[neighbour].is_none() {
                    labels[neighbour] = Some(id);
                    queue.push_back(neighbour);
                    enqueued += 1;
                }
            }
        }
    }

    (ClusterAssignment::new(labels, next_id), enqueued)
}
