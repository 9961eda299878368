//! Bounded location history with merging of near-duplicate fixes
//!
//! A new sample is folded into the newest entry when it lies inside the
//! larger of the two accuracy radii and arrived within the merge window.
//! Otherwise it is appended. The oldest entries are dropped once the history
//! grows past its limit.

use crate::algorithms::distance;
use crate::core::{Coordinate, HistoryEntry, PositionSample, MAX_HISTORY_LENGTH, MERGE_WINDOW_MS};
use crate::sensors::LocationReading;
use crate::storage::{KeyValueStore, PersistedList};
use crate::validation::{validate_sample, RadarError, RadarResult};
use std::f64::consts::{PI, TAU};
use std::rc::Rc;

/// What a push did to the history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryChange {
    Appended,
    Merged,
}

/// Thresholds for compaction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompactorLimits {
    pub max_length: usize,
    /// Samples closer together than this (ms) may merge
    pub merge_window_ms: f64,
}

impl Default for CompactorLimits {
    fn default() -> Self {
        Self {
            max_length: MAX_HISTORY_LENGTH,
            merge_window_ms: MERGE_WINDOW_MS,
        }
    }
}

/// Fold a longitude back into `(-pi, pi]`
fn wrap_longitude(lon: f64) -> f64 {
    if lon > PI {
        lon - TAU
    } else if lon <= -PI {
        lon + TAU
    } else {
        lon
    }
}

/// Blend two entries, pulling the result towards the more accurate one.
///
/// The better fix gets weight `1 - t` with `t = min/max * 0.5`, so it is
/// never trusted fully. Longitudes are blended along the short way round,
/// so fixes on both sides of the antimeridian stay together.
pub fn merge_entries(last: &HistoryEntry, sample: &PositionSample) -> HistoryEntry {
    let (better, worse) = if sample.accuracy < last.accuracy {
        (sample.coord, last.coord)
    } else {
        (last.coord, sample.coord)
    };
    let min_acc = sample.accuracy.min(last.accuracy);
    let max_acc = sample.accuracy.max(last.accuracy);
    let t = if max_acc > 0.0 { min_acc / max_acc * 0.5 } else { 0.5 };

    let mut target = worse.to_vector();
    let delta = worse.lon - better.lon;
    if delta > PI {
        target.y -= TAU;
    } else if delta < -PI {
        target.y += TAU;
    }

    let mut blended = better.to_vector().lerp(&target, t);
    blended.y = wrap_longitude(blended.y);

    HistoryEntry {
        coord: Coordinate::from_vector(&blended),
        accuracy: min_acc,
        timestamp: (sample.timestamp + last.timestamp) / 2.0,
    }
}

/// Fold `sample` into `history` in place
pub fn fold_sample(
    history: &mut Vec<HistoryEntry>,
    sample: &PositionSample,
    limits: &CompactorLimits,
) -> HistoryChange {
    let change = match history.last_mut() {
        Some(last)
            if distance(&sample.coord, &last.coord) < last.accuracy.max(sample.accuracy)
                && sample.timestamp - last.timestamp < limits.merge_window_ms =>
        {
            *last = merge_entries(last, sample);
            HistoryChange::Merged
        }
        _ => {
            history.push(HistoryEntry::from(*sample));
            HistoryChange::Appended
        }
    };

    if history.len() > limits.max_length {
        let excess = history.len() - limits.max_length;
        history.drain(..excess);
    }

    change
}

/// Owner of the persisted location history
#[derive(Clone)]
pub struct HistoryCompactor {
    list: PersistedList<HistoryEntry>,
    limits: CompactorLimits,
}

impl HistoryCompactor {
    pub fn new(backend: Rc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self::with_limits(backend, key, CompactorLimits::default())
    }

    pub fn with_limits(
        backend: Rc<dyn KeyValueStore>,
        key: impl Into<String>,
        limits: CompactorLimits,
    ) -> Self {
        Self {
            list: PersistedList::new(backend, key),
            limits,
        }
    }

    pub fn limits(&self) -> &CompactorLimits {
        &self.limits
    }

    /// Fold a valid sample into the history and persist the result
    pub fn push(&self, sample: PositionSample) -> RadarResult<HistoryChange> {
        validate_sample(&sample)?;

        let limits = self.limits;
        let (change, len) = self.list.modify(|history| {
            let change = fold_sample(history, &sample, &limits);
            (change, history.len())
        })?;

        tracing::debug!(?change, len, accuracy = sample.accuracy, "history updated");
        Ok(change)
    }

    /// Fold a sensor reading. Error readings must be filtered by the caller.
    pub fn push_reading(&self, reading: &LocationReading) -> RadarResult<HistoryChange> {
        match reading {
            Ok(sample) => self.push(*sample),
            Err(e) => Err(RadarError::invalid_sample(format!(
                "location error reached the compactor: {}",
                e
            ))),
        }
    }

    /// Reactive read of the history, oldest first
    pub fn history(&self) -> RadarResult<Vec<HistoryEntry>> {
        self.list.items()
    }

    pub fn latest(&self) -> RadarResult<Option<HistoryEntry>> {
        Ok(self.list.snapshot()?.last().copied())
    }

    /// Drop the history and its record
    pub fn clear(&self) -> RadarResult<()> {
        self.list.clear()?;
        tracing::info!("history cleared");
        Ok(())
    }
}
