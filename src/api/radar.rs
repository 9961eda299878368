//! Radar view model

use crate::algorithms::{bearing, distance, project, radius};
use crate::api::types::{Blob, RadarFrame, RadarStatus};
use crate::core::{Bookmark, Coordinate, HistoryEntry, Timestamp};
use crate::processing::{CompactorLimits, HistoryChange, HistoryCompactor};
use crate::reactive::{Derived, ListeningSignal, Scheduler};
use crate::sensors::{
    compass_heading, listen, to_reading, EventSource, GeoUpdate, LocationReading, OrientationEvent,
};
use crate::storage::{BookmarkStore, FileStore, KeyValueStore, MemoryStore};
use crate::utils::config::{ConfigurationManager, RadarConfig};
use crate::validation::error::{RadarError, RadarResult};
use std::cell::Cell;
use std::rc::Rc;

/// Live radar state built from the device sensors and the persisted records
pub struct RadarModel {
    config: RadarConfig,
    orientation: ListeningSignal<OrientationEvent>,
    geolocation: ListeningSignal<GeoUpdate>,
    heading: Derived<Option<f64>>,
    location: Derived<Option<LocationReading>>,
    bookmarks: BookmarkStore,
    history: HistoryCompactor,
    last_synced: Cell<Option<Timestamp>>,
}

impl RadarModel {
    pub fn new(
        scheduler: Rc<dyn Scheduler>,
        orientation: Rc<dyn EventSource<OrientationEvent>>,
        geolocation: Rc<dyn EventSource<GeoUpdate>>,
        backend: Rc<dyn KeyValueStore>,
        config: RadarConfig,
    ) -> RadarResult<Self> {
        let validation = ConfigurationManager::validate_config(&config);
        if let Some(error) = validation.errors.into_iter().next() {
            return Err(error);
        }

        let orientation = listen(scheduler.clone(), orientation);
        let geolocation = listen(scheduler, geolocation);

        let heading = {
            let orientation = orientation.clone();
            Derived::new(move || orientation.get().and_then(|event| compass_heading(&event)))
        };
        let location = {
            let geolocation = geolocation.clone();
            Derived::new(move || geolocation.get().map(|update| to_reading(&update)))
        };

        let limits = CompactorLimits {
            max_length: config.max_history_length,
            merge_window_ms: config.merge_window_ms,
        };

        Ok(Self {
            bookmarks: BookmarkStore::new(backend.clone(), config.bookmarks_key.clone()),
            history: HistoryCompactor::with_limits(backend, config.history_key.clone(), limits),
            config,
            orientation,
            geolocation,
            heading,
            location,
            last_synced: Cell::new(None),
        })
    }

    /// Build a model whose records live where `config.storage_dir` says
    pub fn open(
        scheduler: Rc<dyn Scheduler>,
        orientation: Rc<dyn EventSource<OrientationEvent>>,
        geolocation: Rc<dyn EventSource<GeoUpdate>>,
        config: RadarConfig,
    ) -> RadarResult<Self> {
        let backend: Rc<dyn KeyValueStore> = match &config.storage_dir {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "persisting radar records to disk");
                Rc::new(FileStore::new(dir.clone()))
            }
            None => Rc::new(MemoryStore::new()),
        };
        Self::new(scheduler, orientation, geolocation, backend, config)
    }

    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    /// Compass heading in radians, `None` without an absolute orientation
    pub fn heading(&self) -> Option<f64> {
        self.heading.get()
    }

    /// Latest fix or sensor error, `None` before the first update
    pub fn location(&self) -> Option<LocationReading> {
        self.location.get()
    }

    pub fn bookmarks(&self) -> RadarResult<Vec<Bookmark>> {
        self.bookmarks.bookmarks()
    }

    pub fn history(&self) -> RadarResult<Vec<HistoryEntry>> {
        self.history.history()
    }

    /// Whether the sensors are currently subscribed
    pub fn is_listening(&self) -> (bool, bool) {
        (
            self.orientation.is_subscribed(),
            self.geolocation.is_subscribed(),
        )
    }

    pub fn add_bookmark(&self, coord: Coordinate) -> RadarResult<Bookmark> {
        self.bookmarks.add(coord)
    }

    pub fn add_labeled_bookmark(
        &self,
        coord: Coordinate,
        label: impl Into<String>,
    ) -> RadarResult<Bookmark> {
        self.bookmarks.add_labeled(coord, label)
    }

    /// Bookmark the current fix. Returns `None` when there is no fix.
    pub fn add_bookmark_here(&self) -> RadarResult<Option<Bookmark>> {
        match self.location() {
            Some(Ok(sample)) => self.bookmarks.add(sample.coord).map(Some),
            _ => Ok(None),
        }
    }

    pub fn clear_bookmarks(&self) -> RadarResult<()> {
        self.bookmarks.clear()
    }

    pub fn clear_history(&self) -> RadarResult<()> {
        self.last_synced.set(None);
        self.history.clear()
    }

    /// Fold the current fix into the history once per distinct timestamp.
    ///
    /// Sensor errors and a missing fix leave the history untouched.
    pub fn sync_history(&self) -> RadarResult<Option<HistoryChange>> {
        let sample = match self.location() {
            Some(Ok(sample)) => sample,
            _ => return Ok(None),
        };
        if self.last_synced.get() == Some(sample.timestamp) {
            return Ok(None);
        }

        let change = self.history.push(sample)?;
        self.last_synced.set(Some(sample.timestamp));
        Ok(Some(change))
    }

    /// Snapshot of everything the radar shows on a display of edge `size`
    pub fn frame(&self, size: f64) -> RadarResult<RadarFrame> {
        if !size.is_finite() || size <= 0.0 {
            return Err(RadarError::config("size", size, "display size must be positive"));
        }

        let heading = self.heading();
        let bookmarks = self.bookmarks()?;
        let history = self.history()?;

        let (status, fix) = match self.location() {
            None => (RadarStatus::Waiting, None),
            Some(Err(e)) => (RadarStatus::Failed(e), None),
            Some(Ok(sample)) => (
                RadarStatus::Located {
                    accuracy: sample.accuracy,
                },
                Some(sample),
            ),
        };

        let mut frame = RadarFrame {
            size,
            heading,
            status,
            accuracy_radius: None,
            blobs: Vec::new(),
            trail: Vec::new(),
        };

        if let Some(sample) = fix {
            let origin = sample.coord;
            let rotation = heading.unwrap_or(0.0);

            frame.accuracy_radius = Some(radius(sample.accuracy, size));
            frame.blobs = bookmarks
                .into_iter()
                .map(|bookmark| Blob {
                    offset: project(&origin, rotation, &bookmark.coord, size),
                    distance: distance(&origin, &bookmark.coord),
                    bearing: bearing(&origin, &bookmark.coord),
                    hue: bookmark.hue,
                    label: bookmark.label,
                })
                .collect();
            frame.trail = history
                .iter()
                .map(|entry| project(&origin, rotation, &entry.coord, size))
                .collect();
        }

        Ok(frame)
    }

    /// Frame on the configured display size
    pub fn default_frame(&self) -> RadarResult<RadarFrame> {
        self.frame(self.config.display_size)
    }
}
