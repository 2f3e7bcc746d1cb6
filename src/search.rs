//! Binary search helpers over data sorted ascending by one key.
//!
//! All functions assume ascending order and do not re-check it; passing
//! unsorted data gives unspecified (but memory-safe) results.
//!
//! The `*_by_key` variants take the number of elements and a key accessor, so
//! any sorted container can be searched without copying keys into a slice:
//!
//! ```rust
//! use mzmerge::search::{index_range_by_key, closest_index};
//!
//! let mzs = [100.0, 100.5, 101.0, 102.0];
//! assert_eq!(closest_index(&mzs, 100.7), Some(1));
//!
//! let peaks = [(100.0, 5.0), (100.5, 1.0), (101.0, 3.0)];
//! assert_eq!(index_range_by_key(peaks.len(), 100.2, 101.0, |i| peaks[i].0), 1..3);
//! ```

use std::ops::Range;

/// Outcome requested when the searched value is not present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDefault {
    /// Index of the nearest key (lower index on equal distance)
    Closest,
    /// First index whose key is `>=` the value
    GreaterEquals,
    /// Last index whose key is `<=` the value
    LessEquals,
    /// The insertion point that keeps the data sorted
    InsertionPoint,
}

/// Result of [`binary_search_by_key`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchResult {
    /// The value was found at this index
    Found(usize),
    /// Not found; index chosen according to the [`SearchDefault`]
    Nearby(usize),
    /// Not found and no index satisfies the [`SearchDefault`]
    NotFound,
}

impl SearchResult {
    /// Index of an exact or fallback match, if any
    pub fn index(self) -> Option<usize> {
        match self {
            SearchResult::Found(i) | SearchResult::Nearby(i) => Some(i),
            SearchResult::NotFound => None,
        }
    }
}

/// Search `value` among `len` keys sorted ascending.
///
/// An exact hit inside a run of equal keys reports the first index of the run.
pub fn binary_search_by_key<F>(len: usize, value: f64, default: SearchDefault, key_at: F) -> SearchResult
where
    F: Fn(usize) -> f64,
{
    if len == 0 {
        return SearchResult::NotFound;
    }

    // first key >= value, also the insertion point when `value` is absent
    let idx = lower_bound(len, value, &key_at);
    if idx < len && key_at(idx) == value {
        return SearchResult::Found(idx);
    }

    match default {
        SearchDefault::InsertionPoint => SearchResult::Nearby(idx),
        SearchDefault::GreaterEquals => {
            if idx < len {
                SearchResult::Nearby(idx)
            } else {
                SearchResult::NotFound
            }
        }
        SearchDefault::LessEquals => {
            if idx == 0 {
                SearchResult::NotFound
            } else {
                SearchResult::Nearby(idx - 1)
            }
        }
        SearchDefault::Closest => match closest_index_by_key(len, value, key_at) {
            Some(i) => SearchResult::Nearby(i),
            None => SearchResult::NotFound,
        },
    }
}

/// First index whose key is `>= value` (or `len`)
fn lower_bound<F>(len: usize, value: f64, key_at: &F) -> usize
where
    F: Fn(usize) -> f64,
{
    let (mut low, mut high) = (0usize, len);
    while low < high {
        let mid = low + (high - low) / 2;
        if key_at(mid) < value {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    low
}

/// First index whose key is `> value` (or `len`)
fn upper_bound<F>(len: usize, value: f64, key_at: &F) -> usize
where
    F: Fn(usize) -> f64,
{
    let (mut low, mut high) = (0usize, len);
    while low < high {
        let mid = low + (high - low) / 2;
        if key_at(mid) <= value {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    low
}

/// Contiguous index range whose keys lie in `[low, high]` (both inclusive).
///
/// Returns an empty range (`start == end`) if no key matches or `low > high`.
pub fn index_range_by_key<F>(len: usize, low: f64, high: f64, key_at: F) -> Range<usize>
where
    F: Fn(usize) -> f64,
{
    if len == 0 || low > high {
        return 0..0;
    }
    let start = lower_bound(len, low, &key_at);
    if start == len {
        return len..len;
    }
    let end = start + upper_bound(len - start, high, &|i| key_at(start + i));
    start..end
}

/// Contiguous index range of `values` that lies in `[low, high]`
pub fn index_range(values: &[f64], low: f64, high: f64) -> Range<usize> {
    index_range_by_key(values.len(), low, high, |i| values[i])
}

/// Index of the key nearest to `target`; the lower index wins exact ties.
///
/// Returns `None` only for an empty slice.
pub fn closest_index(values: &[f64], target: f64) -> Option<usize> {
    closest_index_by_key(values.len(), target, |i| values[i])
}

/// Keyed variant of [`closest_index`]
pub fn closest_index_by_key<F>(len: usize, target: f64, key_at: F) -> Option<usize>
where
    F: Fn(usize) -> f64,
{
    if len == 0 {
        return None;
    }
    // start from the first key >= target so that duplicates resolve to the lowest index
    let idx = lower_bound(len, target, &key_at);
    if idx == 0 {
        return Some(0);
    }
    if idx >= len {
        // every key is below target; the nearest is the first of the trailing run
        let key = key_at(len - 1);
        return Some(lower_bound(len, key, &key_at));
    }
    let below = target - key_at(idx - 1);
    let above = key_at(idx) - target;
    if below <= above {
        // equal distance prefers the lower index; walk back over equal keys
        let key = key_at(idx - 1);
        let first = lower_bound(idx, key, &key_at);
        Some(first)
    } else {
        Some(idx)
    }
}
