use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

/// A node's or vehicle shift's `[open, close]` interval. Unlike a general
/// scheduling time window, every node in this problem has both bounds: a
/// depot or dump that is always open still carries an explicit close far in
/// the future, rather than `None`.
#[derive(Deserialize, Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    open: Timestamp,
    close: Timestamp,
}

impl TimeWindow {
    pub fn new(open: Timestamp, close: Timestamp) -> Self {
        debug_assert!(open <= close, "time window open must not be after close");
        TimeWindow { open, close }
    }

    /// Builds a window from real-valued seconds offsets from the epoch, the
    /// representation used by the container/vehicle input files.
    pub fn from_offsets_secs(open_secs: f64, close_secs: f64) -> Self {
        TimeWindow {
            open: Timestamp::UNIX_EPOCH + SignedDuration::from_secs_f64(open_secs),
            close: Timestamp::UNIX_EPOCH + SignedDuration::from_secs_f64(close_secs),
        }
    }

    pub fn open(&self) -> Timestamp {
        self.open
    }

    pub fn close(&self) -> Timestamp {
        self.close
    }

    pub fn is_satisfied(&self, arrival: Timestamp) -> bool {
        arrival <= self.close
    }

    /// How far `arrival` overshoots `close`, zero if on time or early.
    pub fn overtime(&self, arrival: Timestamp) -> SignedDuration {
        let over = arrival.duration_since(self.close);
        if over.is_positive() { over } else { SignedDuration::ZERO }
    }

    /// Wait incurred arriving at `arrival`: `max(0, open - arrival)`.
    pub fn wait_for(&self, arrival: Timestamp) -> SignedDuration {
        let wait = self.open.duration_since(arrival);
        if wait.is_positive() { wait } else { SignedDuration::ZERO }
    }
}
