//! # Request logging interceptor.
//!
//! A ready-made interceptor that records every `send` through [`tracing`].
//! Register it first to have it observe the whole chain.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO typemob::interceptors::log: send completed request="app::GetUser" response="app::User" elapsed_us=42
//! WARN typemob::interceptors::log: send failed request="app::GetUser" error="user 7 not found" elapsed_us=18
//! ```

use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::context::Context;
use crate::error::BoxError;
use crate::interceptors::{Interceptor, Next, Payload};

/// Interceptor that logs each request's type, outcome and latency.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogInterceptor;

impl LogInterceptor {
    /// Construct a new [`LogInterceptor`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Interceptor for LogInterceptor {
    async fn intercept(
        &self,
        ctx: Context,
        req: Payload,
        next: Next<'_>,
    ) -> Result<Payload, BoxError> {
        let request = req.type_name();
        let started = Instant::now();
        let result = next.run(ctx, req).await;
        let elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

        match &result {
            Ok(res) => info!(request, response = res.type_name(), elapsed_us, "send completed"),
            Err(err) => warn!(request, error = %err, elapsed_us, "send failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoxError, Context, Registry, RequestHandlerFn};

    #[tokio::test]
    async fn test_log_interceptor_is_transparent() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let registry = Registry::new();
        registry.add_interceptor(LogInterceptor::new());
        registry
            .register_request_handler(RequestHandlerFn::new(|_ctx: Context, s: String| async move {
                if s.is_empty() {
                    Err::<String, BoxError>("empty".into())
                } else {
                    Ok(s)
                }
            }))
            .unwrap();

        let ok: String = registry.send(Context::new(), "hi".to_string()).await.unwrap();
        assert_eq!(ok, "hi");

        let err = registry
            .send::<String, String>(Context::new(), String::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "empty");
    }
}
