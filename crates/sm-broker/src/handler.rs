/// Callback invoked for every publish on a subscribed topic. Implemented
/// by the transformation pipeline; exposed as a trait object so the
/// broker client does not depend on the pipeline crate.
#[async_trait::async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, topic: &str, payload: Vec<u8>);
}

/// Adapts a plain async closure into a [`MessageHandler`], for tests and
/// small one-off subscriptions (e.g. `--simulate-sensor` does not need
/// one at all, since it only publishes).
pub struct FnHandler<F>(pub F);

#[async_trait::async_trait]
impl<F, Fut> MessageHandler for FnHandler<F>
where
    F: Fn(String, Vec<u8>) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = ()> + Send,
{
    async fn handle(&self, topic: &str, payload: Vec<u8>) {
        (self.0)(topic.to_string(), payload).await
    }
}
