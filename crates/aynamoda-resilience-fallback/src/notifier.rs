use aynamoda_resilience_sync::BoxError;
use futures::future::BoxFuture;
use std::future::Future;
use std::marker::PhantomData;

/// Secondary, non-push notification channel (an in-app banner or inbox).
///
/// Tried only when a notification could not be queued for later delivery.
pub trait InAppNotifier: Send + Sync {
    fn notify<'a>(
        &'a self,
        user_id: &'a str,
        payload: &'a serde_json::Value,
    ) -> BoxFuture<'a, Result<(), BoxError>>;
}

/// An [`InAppNotifier`] backed by an async closure.
pub struct FnNotifier<F, Fut> {
    f: F,
    _fut: PhantomData<fn() -> Fut>,
}

impl<F, Fut> FnNotifier<F, Fut>
where
    F: Fn(String, serde_json::Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _fut: PhantomData,
        }
    }
}

impl<F, Fut> InAppNotifier for FnNotifier<F, Fut>
where
    F: Fn(String, serde_json::Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    fn notify<'a>(
        &'a self,
        user_id: &'a str,
        payload: &'a serde_json::Value,
    ) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin((self.f)(user_id.to_string(), payload.clone()))
    }
}
