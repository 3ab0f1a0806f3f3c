use crate::error::BoxError;
use crate::PendingOperation;
use futures::future::BoxFuture;
use std::future::Future;
use std::marker::PhantomData;

/// Backend endpoint that accepts replayed operations of one category.
pub trait SyncDestination: Send + Sync {
    /// Submits one entry. Entries arrive in the order they were queued.
    fn submit<'a>(&'a self, operation: &'a PendingOperation) -> BoxFuture<'a, Result<(), BoxError>>;
}

/// A [`SyncDestination`] backed by an async closure.
pub struct FnDestination<F, Fut> {
    f: F,
    _fut: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnDestination<F, Fut>
where
    F: Fn(PendingOperation) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _fut: PhantomData,
        }
    }
}

impl<F, Fut> SyncDestination for FnDestination<F, Fut>
where
    F: Fn(PendingOperation) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    fn submit<'a>(&'a self, operation: &'a PendingOperation) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin((self.f)(operation.clone()))
    }
}
