//! Scenarios that drive `ErrorHandlingService` the way the app does.
//!
//! Test organization:
//! - documented.rs: the reference behaviors of each component
//! - offline_session.rs: a full day spent offline, then reconnecting

mod documented;

use aynamoda_resilience::core::{ManualClock, MemoryStore};
use aynamoda_resilience::sync::{BoxError, FnDestination, PendingOperation, SyncDestination};
use chrono::{TimeZone, Utc};
use std::sync::{Arc, Mutex};

pub(crate) fn january_morning() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 1, 14, 7, 30, 0).unwrap(),
    ))
}

pub(crate) fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Backend stand-in that records what it accepts.
pub(crate) fn backend(received: Arc<Mutex<Vec<PendingOperation>>>) -> impl SyncDestination {
    FnDestination::new(move |op: PendingOperation| {
        received.lock().unwrap().push(op);
        async { Ok::<(), BoxError>(()) }
    })
}
