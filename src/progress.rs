//! Progress reporting and cooperative cancellation.
//!
//! Algorithms poll a [`ProgressSink`] once per emitted face. The sink may be
//! cancelled from another thread; the build then stops at its next checkpoint
//! and returns [`BuildOutcome::Cancelled`](crate::BuildOutcome::Cancelled).

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::{hull::Cancelled, Frame};

/// Whether a progress bar knows how far along the build is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProgressMode {
    /// The reported value moves towards the end of the range.
    Determinate,
    /// The reported value cycles through the range without a known end.
    Indeterminate,
}

/// A receiver for progress updates that can request cancellation.
///
/// All methods take `&self` so a sink can be shared with the thread that
/// cancels it. Every method has a no-op default.
pub trait ProgressSink {
    /// Sets the range reported values fall in.
    fn set_range(&self, _min: u64, _max: u64) {}

    /// Sets the progress mode.
    fn set_mode(&self, _mode: ProgressMode) {}

    /// Reports the current position.
    fn update(&self, _value: u64) {}

    /// Returns `true` if the build should stop.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A sink that ignores progress and never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// A thread-safe sink that records the latest progress and can be cancelled.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    min: AtomicU64,
    max: AtomicU64,
    value: AtomicU64,
    updates: AtomicU64,
    indeterminate: AtomicBool,
    cancelled: AtomicBool,
}

impl ProgressTracker {
    /// Creates a tracker that has not been cancelled.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the build polling this tracker.
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// The last reported value.
    #[inline]
    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// The number of updates received so far.
    #[inline]
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    /// The last range set by the build.
    #[inline]
    pub fn range(&self) -> (u64, u64) {
        (
            self.min.load(Ordering::Relaxed),
            self.max.load(Ordering::Relaxed),
        )
    }

    /// The last mode set by the build.
    #[inline]
    pub fn mode(&self) -> ProgressMode {
        if self.indeterminate.load(Ordering::Relaxed) {
            ProgressMode::Indeterminate
        } else {
            ProgressMode::Determinate
        }
    }
}

impl ProgressSink for ProgressTracker {
    fn set_range(&self, min: u64, max: u64) {
        self.min.store(min, Ordering::Relaxed);
        self.max.store(max, Ordering::Relaxed);
    }

    fn set_mode(&self, mode: ProgressMode) {
        self.indeterminate
            .store(mode == ProgressMode::Indeterminate, Ordering::Relaxed);
    }

    fn update(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Counts emitted faces and polls the sink between them.
pub(crate) struct Checkpoint<'a> {
    sink: &'a dyn ProgressSink,
    emitted: usize,
    position: u64,
    wrap: u64,
}

impl<'a> Checkpoint<'a> {
    /// Announces a build over `points` points to the sink.
    pub(crate) fn new(sink: &'a dyn ProgressSink, points: usize, mode: ProgressMode) -> Self {
        let wrap = (points as u64).max(1);
        sink.set_range(0, wrap);
        sink.set_mode(mode);
        Self {
            sink,
            emitted: 0,
            position: 0,
            wrap,
        }
    }

    /// The number of faces emitted so far.
    #[inline]
    pub(crate) fn emitted(&self) -> usize {
        self.emitted
    }

    /// Counts faces emitted before the first checkpoint.
    #[inline]
    pub(crate) fn seed(&mut self, count: usize) {
        self.emitted += count;
    }

    /// Polls for cancellation without counting a face.
    #[inline]
    pub(crate) fn poll(&self, frame: Frame) -> Result<(), Cancelled> {
        if self.sink.is_cancelled() {
            return Err(Cancelled {
                frame,
                emitted: self.emitted,
            });
        }
        Ok(())
    }

    /// Counts one emitted face, polls for cancellation, then reports progress.
    pub(crate) fn face(&mut self, frame: Frame) -> Result<(), Cancelled> {
        self.emitted += 1;
        self.poll(frame)?;
        self.position = (self.position + 1) % self.wrap;
        self.sink.update(self.position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_records_updates() {
        let tracker = ProgressTracker::new();
        let mut checkpoint = Checkpoint::new(&tracker, 3, ProgressMode::Indeterminate);
        assert_eq!(tracker.range(), (0, 3));
        assert_eq!(tracker.mode(), ProgressMode::Indeterminate);

        for frame in 1..=4 {
            checkpoint.face(frame).unwrap();
        }
        assert_eq!(tracker.updates(), 4);
        // Positions wrap around the range.
        assert_eq!(tracker.value(), 1);
        assert_eq!(checkpoint.emitted(), 4);
    }

    #[test]
    fn cancellation_stops_at_the_next_face() {
        let tracker = ProgressTracker::new();
        let mut checkpoint = Checkpoint::new(&tracker, 10, ProgressMode::Determinate);
        checkpoint.seed(2);
        checkpoint.face(3).unwrap();
        tracker.cancel();
        let cancelled = checkpoint.face(4).unwrap_err();
        assert_eq!(cancelled, Cancelled { frame: 4, emitted: 4 });
        assert_eq!(tracker.updates(), 1);
    }

    #[test]
    fn no_progress_never_cancels() {
        let mut checkpoint = Checkpoint::new(&NoProgress, 0, ProgressMode::Determinate);
        for frame in 0..100 {
            assert!(checkpoint.face(frame).is_ok());
        }
    }
}
