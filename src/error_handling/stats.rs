//! Processing statistics tracking.
//!
//! Thread-safe counters for errors, informational events and inbound response
//! statuses. Shared between the producer task, the request handlers and the
//! status endpoints.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use strum::IntoEnumIterator;

use super::types::{ErrorType, InfoType};

/// Thread-safe processing statistics tracker.
///
/// Error and info counters are atomics created up front for every enum
/// variant, so incrementing never takes a lock. Response statuses are keyed by
/// code and kept behind a mutex since the set of codes is open.
pub struct ProcessingStats {
    errors: HashMap<ErrorType, AtomicUsize>,
    info: HashMap<InfoType, AtomicUsize>,
    responses: Mutex<BTreeMap<u16, usize>>,
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStats {
    /// Creates stats with every counter at zero.
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for error in ErrorType::iter() {
            errors.insert(error, AtomicUsize::new(0));
        }

        let mut info = HashMap::new();
        for info_type in InfoType::iter() {
            info.insert(info_type, AtomicUsize::new(0));
        }

        ProcessingStats {
            errors,
            info,
            responses: Mutex::new(BTreeMap::new()),
        }
    }

    /// Increment an error counter.
    pub fn increment_error(&self, error: ErrorType) {
        if let Some(counter) = self.errors.get(&error) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment error counter for {:?} which is not in the map. \
                 This indicates a bug in ProcessingStats initialization.",
                error
            );
        }
    }

    /// Increment an info counter by one.
    pub fn increment_info(&self, info_type: InfoType) {
        self.add_info(info_type, 1);
    }

    /// Increment an info counter by `count`.
    pub fn add_info(&self, info_type: InfoType, count: usize) {
        if let Some(counter) = self.info.get(&info_type) {
            counter.fetch_add(count, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment info counter for {:?} which is not in the map. \
                 This indicates a bug in ProcessingStats initialization.",
                info_type
            );
        }
    }

    /// Count one inbound response with the given status code.
    pub fn record_response(&self, status: u16) {
        let mut responses = match self.responses.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *responses.entry(status).or_insert(0) += 1;
    }

    /// Current value of one error counter.
    pub fn get_error_count(&self, error: ErrorType) -> usize {
        self.errors
            .get(&error)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Current value of one info counter.
    pub fn get_info_count(&self, info_type: InfoType) -> usize {
        self.info
            .get(&info_type)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Snapshot of response counts, ordered by status code.
    pub fn response_counts(&self) -> Vec<(u16, usize)> {
        let responses = match self.responses.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        responses.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Sum of every error counter.
    pub fn total_errors(&self) -> usize {
        self.errors.values().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    /// Sum of all names API failures.
    pub fn total_name_errors(&self) -> usize {
        [
            ErrorType::NamesRateLimited,
            ErrorType::NamesMalformedResponse,
            ErrorType::NamesUnexpectedStatus,
            ErrorType::NamesTransportError,
        ]
        .into_iter()
        .map(|e| self.get_error_count(e))
        .sum()
    }
}
