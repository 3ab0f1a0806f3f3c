use crate::PendingCategory;

/// What happened to one category during a sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// `count` entries were accepted and the list was cleared.
    Synced { count: usize },
    /// Nothing was queued.
    Empty,
    /// No destination is registered; the list was not touched.
    NoDestination,
    /// The list was left as it was.
    Failed { error: String },
}

/// Per-category outcomes of [`sync_pending_operations`](crate::PendingOperationQueue::sync_pending_operations).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    outcomes: Vec<(PendingCategory, SyncOutcome)>,
}

impl SyncReport {
    pub(crate) fn push(&mut self, category: PendingCategory, outcome: SyncOutcome) {
        self.outcomes.push((category, outcome));
    }

    pub fn outcome(&self, category: PendingCategory) -> Option<&SyncOutcome> {
        self.outcomes
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, outcome)| outcome)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(PendingCategory, SyncOutcome)> {
        self.outcomes.iter()
    }

    pub fn synced(&self) -> impl Iterator<Item = PendingCategory> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, SyncOutcome::Synced { .. }))
            .map(|(c, _)| *c)
    }

    pub fn failed(&self) -> impl Iterator<Item = PendingCategory> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, SyncOutcome::Failed { .. }))
            .map(|(c, _)| *c)
    }

    /// `true` if no category failed.
    pub fn is_clean(&self) -> bool {
        self.failed().next().is_none()
    }
}
