//! Tests for pending operations and the sync pass.
//!
//! Test organization:
//! - delivery.rs: per-category replay, failures, report contents, stable ids
//! - concurrency.rs: enqueue racing with enqueue and with sync

mod delivery;

use aynamoda_resilience_sync::{BoxError, FnDestination, PendingOperation, SyncDestination};
use std::sync::{Arc, Mutex};

/// Operations a destination accepted, in arrival order.
#[derive(Default)]
pub(crate) struct Inbox(Mutex<Vec<PendingOperation>>);

impl Inbox {
    pub(crate) fn ids(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|op| op.id.clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

pub(crate) fn accepting(inbox: Arc<Inbox>) -> impl SyncDestination {
    FnDestination::new(move |op: PendingOperation| {
        inbox.0.lock().unwrap().push(op);
        async { Ok::<(), BoxError>(()) }
    })
}

pub(crate) fn rejecting(reason: &'static str) -> impl SyncDestination {
    FnDestination::new(move |_: PendingOperation| async move { Err::<(), BoxError>(reason.into()) })
}
