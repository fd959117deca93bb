//! Ordered, copy-on-write interceptor list.
//!
//! The registry keeps one [`Chain`] and replaces it on every append, so a dispatch
//! works on the snapshot it cloned and is unaffected by later appends.

use std::sync::Arc;

use crate::context::Context;
use crate::error::BoxError;
use crate::interceptors::interceptor::{Interceptor, Invoke, Next};
use crate::interceptors::Payload;

#[derive(Clone)]
pub(crate) struct Chain {
    links: Arc<[Arc<dyn Interceptor>]>,
}

impl Default for Chain {
    fn default() -> Self {
        Self {
            links: Arc::from(Vec::new()),
        }
    }
}

impl Chain {
    /// Returns a new chain with `interceptor` appended as the innermost link.
    pub(crate) fn appended(&self, interceptor: Arc<dyn Interceptor>) -> Self {
        let links: Vec<Arc<dyn Interceptor>> = self
            .links
            .iter()
            .cloned()
            .chain(std::iter::once(interceptor))
            .collect();
        Self {
            links: links.into(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.links.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Runs `req` through every link, ending with `invoke`.
    pub(crate) async fn invoke(
        &self,
        ctx: Context,
        req: Payload,
        invoke: &Invoke,
    ) -> Result<Payload, BoxError> {
        Next::new(&self.links, invoke).run(ctx, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::future::BoxFuture;
    use std::sync::Mutex;

    struct Tag {
        label: &'static str,
        trace: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Interceptor for Tag {
        async fn intercept(
            &self,
            ctx: Context,
            req: Payload,
            next: Next<'_>,
        ) -> Result<Payload, BoxError> {
            self.trace.lock().unwrap().push(format!("pre-{}", self.label));
            let res = next.run(ctx, req).await;
            self.trace.lock().unwrap().push(format!("post-{}", self.label));
            res
        }
    }

    fn echo(_ctx: Context, req: Payload) -> BoxFuture<'static, Result<Payload, BoxError>> {
        Box::pin(async move { Ok::<_, BoxError>(req) })
    }

    #[tokio::test]
    async fn test_empty_chain_calls_terminal() {
        let chain = Chain::default();
        assert!(chain.is_empty());
        let out = chain
            .invoke(Context::new(), Payload::new(3u8), &echo)
            .await
            .unwrap();
        assert_eq!(out.downcast::<u8>().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_append_preserves_order_and_snapshot() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let a: Arc<dyn Interceptor> = Arc::new(Tag { label: "a", trace: trace.clone() });
        let b: Arc<dyn Interceptor> = Arc::new(Tag { label: "b", trace: trace.clone() });

        let one = Chain::default().appended(a);
        let two = one.appended(b);
        assert_eq!(one.len(), 1, "appending must not touch the previous snapshot");
        assert_eq!(two.len(), 2);

        two.invoke(Context::new(), Payload::new(()), &echo)
            .await
            .unwrap();
        assert_eq!(
            *trace.lock().unwrap(),
            vec!["pre-a", "pre-b", "post-b", "post-a"]
        );
    }
}
