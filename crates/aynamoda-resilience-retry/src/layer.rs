use crate::{RetryExecutor, RetryOptions};
use aynamoda_resilience_core::OperationContext;
use futures::future::BoxFuture;
use std::fmt;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};

/// A Tower [`Layer`] that routes every call through a [`RetryExecutor`].
///
/// Useful for wrapping a backend client once instead of at every call site.
///
/// ```
/// use aynamoda_resilience_core::OperationContext;
/// use aynamoda_resilience_retry::{RetryExecutor, RetryLayer, RetryOptions};
/// use tower::ServiceBuilder;
/// use std::time::Duration;
///
/// let layer = RetryLayer::new(
///     RetryExecutor::builder().name("wardrobe-client").build(),
///     OperationContext::new("wardrobe", "fetchItems"),
///     RetryOptions::new(2, Duration::from_millis(50)),
/// );
///
/// let service = ServiceBuilder::new()
///     .layer(layer)
///     .service(tower::service_fn(|user_id: String| async move {
///         Ok::<_, String>(format!("items for {}", user_id))
///     }));
/// ```
#[derive(Clone, Debug)]
pub struct RetryLayer {
    executor: RetryExecutor,
    context: OperationContext,
    options: RetryOptions,
}

impl RetryLayer {
    pub fn new(executor: RetryExecutor, context: OperationContext, options: RetryOptions) -> Self {
        Self {
            executor,
            context,
            options,
        }
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = Retry<S>;

    fn layer(&self, service: S) -> Self::Service {
        Retry {
            inner: service,
            layer: self.clone(),
        }
    }
}

/// Service produced by [`RetryLayer`].
#[derive(Clone)]
pub struct Retry<S> {
    inner: S,
    layer: RetryLayer,
}

impl<S> fmt::Debug for Retry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("context", &self.layer.context)
            .finish_non_exhaustive()
    }
}

impl<S, Req> Service<Req> for Retry<S>
where
    S: Service<Req> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    S::Error: fmt::Display + Send + 'static,
    Req: Clone + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let service = self.inner.clone();
        let layer = self.layer.clone();

        Box::pin(async move {
            layer
                .executor
                .execute_with_retry(
                    move || {
                        let service = service.clone();
                        let req = req.clone();
                        async move { service.oneshot(req).await }
                    },
                    &layer.context,
                    &layer.options,
                )
                .await
        })
    }
}
