//! Disjoint interval index that assigns samples to clusters.
//!
//! Every cluster owns at most one interval on the position axis. Intervals are
//! kept in a `BTreeMap` keyed by their lower bound, so the interval containing
//! a position is found with a single predecessor lookup. Intervals never
//! overlap: a new interval is clipped against its neighbours, and the clipped
//! bound takes the neighbour's edge value with the complementary open/closed
//! type so that no gap appears where the two would have touched.

use std::collections::BTreeMap;
use std::ops::Bound as RangeBound;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::spectrum::IndexedSample;
use crate::tolerance::ToleranceWindow;

/// One end of an [`Interval`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    /// Position of the bound
    pub value: f64,
    /// Whether `value` itself belongs to the interval
    pub closed: bool,
}

impl Bound {
    /// Inclusive bound
    pub fn closed(value: f64) -> Self {
        Self {
            value,
            closed: true,
        }
    }

    /// Exclusive bound
    pub fn open(value: f64) -> Self {
        Self {
            value,
            closed: false,
        }
    }

    /// Same value, opposite open/closed type
    fn complement(self) -> Self {
        Self {
            value: self.value,
            closed: !self.closed,
        }
    }
}

/// Interval with independently open or closed ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Lower end
    pub lower: Bound,
    /// Upper end
    pub upper: Bound,
}

impl Interval {
    /// Closed interval `[lower, upper]`
    pub fn closed(lower: f64, upper: f64) -> Self {
        Self {
            lower: Bound::closed(lower),
            upper: Bound::closed(upper),
        }
    }

    /// Whether `x` lies inside the interval
    pub fn contains(&self, x: f64) -> bool {
        let above_lower = if self.lower.closed {
            x >= self.lower.value
        } else {
            x > self.lower.value
        };
        let below_upper = if self.upper.closed {
            x <= self.upper.value
        } else {
            x < self.upper.value
        };
        above_lower && below_upper
    }

    /// Whether no position lies inside the interval
    pub fn is_empty(&self) -> bool {
        self.lower.value > self.upper.value
            || (self.lower.value == self.upper.value && !(self.lower.closed && self.upper.closed))
    }

    /// Whether the two intervals share at least one position
    pub fn overlaps(&self, other: &Interval) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        reaches_past(self.upper, other.lower) && reaches_past(other.upper, self.lower)
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.lower.closed { '[' } else { '(' },
            self.lower.value,
            self.upper.value,
            if self.upper.closed { ']' } else { ')' }
        )
    }
}

/// Whether an upper bound extends into the range starting at `lower`
fn reaches_past(upper: Bound, lower: Bound) -> bool {
    upper.value > lower.value || (upper.value == lower.value && upper.closed && lower.closed)
}

/// Ordering key of a lower bound: closed sorts before open at equal value
type LowerKey = (OrderedFloat<f64>, bool);

fn lower_key(bound: Bound) -> LowerKey {
    (OrderedFloat(bound.value), !bound.closed)
}

/// The more inclusive of two lower bounds
fn min_lower(a: Bound, b: Bound) -> Bound {
    if lower_key(a) <= lower_key(b) {
        a
    } else {
        b
    }
}

/// The more inclusive of two upper bounds
fn max_upper(a: Bound, b: Bound) -> Bound {
    if (OrderedFloat(a.value), a.closed) >= (OrderedFloat(b.value), b.closed) {
        a
    } else {
        b
    }
}

/// Group of samples judged to represent one feature.
///
/// Holds at most one sample per source spectrum.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    anchor: f64,
    members: BTreeMap<usize, IndexedSample>,
    interval: Option<Interval>,
}

impl Cluster {
    fn new(sample: IndexedSample, interval: Option<Interval>) -> Self {
        let mut members = BTreeMap::new();
        members.insert(sample.source, sample);
        Self {
            anchor: sample.position(),
            members,
            interval,
        }
    }

    /// Position of the sample that opened the cluster.
    ///
    /// A cluster split off at its host's anchor owns an interval that is open
    /// at that position, so `interval()` need not contain the anchor.
    pub fn anchor(&self) -> f64 {
        self.anchor
    }

    /// Members ordered by source index
    pub fn members(&self) -> impl Iterator<Item = &IndexedSample> + '_ {
        self.members.values()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; a cluster is created with its first member
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether a sample of `source` already belongs to the cluster
    pub fn contains_source(&self, source: usize) -> bool {
        self.members.contains_key(&source)
    }

    /// Interval currently owned by the cluster.
    ///
    /// `None` for a cluster split off with a zero-width tolerance window, which
    /// can receive no further samples.
    pub fn interval(&self) -> Option<Interval> {
        self.interval
    }
}

/// Ordered, disjoint interval map from positions to clusters.
///
/// Feed samples in descending intensity order so that each cluster is anchored
/// on its strongest signal.
///
/// # Example
///
/// ```rust
/// use mzmerge::merge::IntervalClusterMap;
/// use mzmerge::spectrum::IndexedSample;
/// use mzmerge::tolerance::ToleranceWindow;
///
/// let mut map = IntervalClusterMap::new(ToleranceWindow::absolute_only(0.01)?);
/// let a = map.insert(IndexedSample::new(100.0, 20.0, 0));
/// let b = map.insert(IndexedSample::new(100.005, 10.0, 1));
/// let c = map.insert(IndexedSample::new(100.004, 5.0, 1));
/// assert_eq!(a, b);
/// assert_ne!(b, c); // source 1 is already part of the first cluster
/// # Ok::<(), mzmerge::MergeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct IntervalClusterMap {
    tolerance: ToleranceWindow,
    index: BTreeMap<LowerKey, usize>,
    clusters: Vec<Cluster>,
}

impl IntervalClusterMap {
    /// Create an empty map using `tolerance` for new intervals
    pub fn new(tolerance: ToleranceWindow) -> Self {
        Self {
            tolerance,
            index: BTreeMap::new(),
            clusters: Vec::new(),
        }
    }

    /// Tolerance used for new intervals
    pub fn tolerance(&self) -> ToleranceWindow {
        self.tolerance
    }

    /// Number of clusters
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    /// Returns true if nothing has been inserted
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Clusters in creation order; the index is the cluster id
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Consume the map, keeping only the clusters
    pub fn into_clusters(self) -> Vec<Cluster> {
        self.clusters
    }

    /// Live intervals with their cluster id, ascending by position
    pub fn intervals(&self) -> impl Iterator<Item = (Interval, usize)> + '_ {
        self.index.values().filter_map(move |&id| {
            self.clusters[id].interval.map(|interval| (interval, id))
        })
    }

    /// Assign `sample` to a cluster and return the cluster id.
    ///
    /// Positions must be finite.
    pub fn insert(&mut self, sample: IndexedSample) -> usize {
        let position = sample.position();
        match self.find(position) {
            None => {
                let (low, high) = self.tolerance.range(position);
                let probe = (OrderedFloat(position), false);
                let lower = clip_lower(Bound::closed(low), self.at_or_before(probe));
                let upper = clip_upper(Bound::closed(high), self.after(probe));
                self.open_cluster(sample, Some(Interval { lower, upper }))
            }
            Some((id, _)) if !self.clusters[id].contains_source(sample.source) => {
                self.clusters[id].members.insert(sample.source, sample);
                id
            }
            Some((host, piece)) => self.split_off(host, piece, sample),
        }
    }

    /// Cluster whose interval contains `position`
    fn find(&self, position: f64) -> Option<(usize, Interval)> {
        let (_, &id) = self
            .index
            .range(..=(OrderedFloat(position), false))
            .next_back()?;
        let interval = self.clusters[id].interval?;
        interval.contains(position).then_some((id, interval))
    }

    fn at_or_before(&self, key: LowerKey) -> Option<Interval> {
        let (_, &id) = self.index.range(..=key).next_back()?;
        self.clusters[id].interval
    }

    fn before(&self, key: LowerKey) -> Option<Interval> {
        let (_, &id) = self.index.range(..key).next_back()?;
        self.clusters[id].interval
    }

    fn after(&self, key: LowerKey) -> Option<Interval> {
        let (_, &id) = self
            .index
            .range((RangeBound::Excluded(key), RangeBound::Unbounded))
            .next()?;
        self.clusters[id].interval
    }

    fn open_cluster(&mut self, sample: IndexedSample, interval: Option<Interval>) -> usize {
        let id = self.clusters.len();
        let interval = interval.filter(|i| !i.is_empty());
        if let Some(interval) = interval {
            self.index.insert(lower_key(interval.lower), id);
        }
        self.clusters.push(Cluster::new(sample, interval));
        id
    }

    /// Open a new cluster for a sample whose source is already part of `host`.
    ///
    /// The host interval is cut at the midpoint between the host anchor and the
    /// sample. The host keeps its anchor side, closed at the midpoint; the new
    /// cluster takes the other side, open at the midpoint, widened by the
    /// sample's own tolerance window up to the next neighbour.
    fn split_off(&mut self, host: usize, piece: Interval, sample: IndexedSample) -> usize {
        let position = sample.position();
        let anchor = self.clusters[host].anchor;
        let mid = anchor + (position - anchor) / 2.0;
        let host_key = lower_key(piece.lower);
        let (low, high) = self.tolerance.range(position);

        let (host_piece, new_piece) = if position < anchor {
            let reach = clip_lower(Bound::closed(low), self.before(host_key));
            (
                Interval {
                    lower: Bound::closed(mid),
                    upper: piece.upper,
                },
                Interval {
                    lower: min_lower(reach, piece.lower),
                    upper: Bound::open(mid),
                },
            )
        } else {
            let reach = clip_upper(Bound::closed(high), self.after(host_key));
            (
                Interval {
                    lower: piece.lower,
                    upper: Bound::closed(mid),
                },
                Interval {
                    lower: Bound::open(mid),
                    upper: max_upper(reach, piece.upper),
                },
            )
        };

        self.index.remove(&host_key);
        if host_piece.is_empty() {
            self.clusters[host].interval = None;
        } else {
            self.index.insert(lower_key(host_piece.lower), host);
            self.clusters[host].interval = Some(host_piece);
        }

        log::trace!(
            "source {} seen twice near {}: split {} into {} and {}",
            sample.source,
            anchor,
            piece,
            host_piece,
            new_piece
        );
        self.open_cluster(sample, Some(new_piece))
    }
}

fn clip_lower(lower: Bound, previous: Option<Interval>) -> Bound {
    match previous {
        Some(prev) if reaches_past(prev.upper, lower) => prev.upper.complement(),
        _ => lower,
    }
}

fn clip_upper(upper: Bound, next: Option<Interval>) -> Bound {
    match next {
        Some(next) if reaches_past(upper, next.lower) => next.lower.complement(),
        _ => upper,
    }
}
