//! # Event broadcast (`notify`).
//!
//! ```text
//! notify::<E>(ctx, event)
//!   ├─► lookup E                       ── missing ──► Error::HandlerNotFound
//!   ├─► Arc<E>
//!   ├──► task 1 ──► handler1.handle(ctx, &event) ──┐
//!   ├──► task 2 ──► handler2.handle(ctx, &event) ──┼──► [unbounded mpsc] ──► drain N outcomes
//!   └──► task N ──► handlerN.handle(ctx, &event) ──┘
//! ```
//!
//! ## Rules
//! - Every handler runs exactly once per call, regardless of sibling failures.
//! - Each task reports exactly one outcome; `notify` returns only after all N arrived
//!   (or every sender was dropped).
//! - Failures are wrapped with the handler's display name and collected into one
//!   [`AggregateError`]; its order follows completion, not registration.
//! - Panics are caught with `catch_unwind`; see [`RegistryConfig::catch_panics`].
//!
//! **Warning**: `AssertUnwindSafe` is used, so a handler that panics while holding a lock
//! on shared state can leave that state inconsistent.
//!
//! [`RegistryConfig::catch_panics`]: crate::RegistryConfig::catch_panics

use std::any::{type_name, Any};
use std::borrow::Cow;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::context::Context;
use crate::core::registry::Registry;
use crate::error::{AggregateError, Error, HandlerError, HandlerPanicked, Result};
use crate::key::{Slot, TypeKey};

/// Outcome reported by one handler task.
enum Outcome {
    Done,
    Failed(HandlerError),
    Panicked(Option<Cow<'static, str>>, Box<dyn Any + Send>),
}

impl Registry {
    /// Delivers `event` to every handler registered for `E` and waits for all of them.
    ///
    /// Handlers run concurrently, each on its own tokio task, so this must be called
    /// from within a tokio runtime.
    ///
    /// # Errors
    /// - [`Error::HandlerNotFound`] if no handler was ever registered for `E`
    /// - [`Error::Aggregate`] holding one named [`HandlerError`] per failed handler
    ///
    /// # Panics
    /// Resumes a handler's panic after all handlers finished, if
    /// [`catch_panics`](crate::RegistryConfig::catch_panics) is disabled.
    pub async fn notify<E>(&self, ctx: Context, event: E) -> Result<()>
    where
        E: Send + Sync + 'static,
    {
        let records = self
            .event_records::<E>()
            .ok_or_else(|| Error::HandlerNotFound {
                slot: Slot::Event(TypeKey::of::<E>()),
            })?;

        trace!(
            registry = %self.config.label,
            event = type_name::<E>(),
            handlers = records.len(),
            "notify"
        );

        let event = Arc::new(event);
        let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();
        let spawned = records.len();

        for record in records {
            let tx = tx.clone();
            let ctx = ctx.clone();
            let event = Arc::clone(&event);

            tokio::spawn(async move {
                let fut = record.handler.handle(ctx, event.as_ref());
                let outcome = match AssertUnwindSafe(fut).catch_unwind().await {
                    Ok(Ok(())) => Outcome::Done,
                    Ok(Err(cause)) => Outcome::Failed(HandlerError::new(record.name, cause)),
                    Err(panic) => Outcome::Panicked(record.name, panic),
                };
                let _ = tx.send(outcome);
            });
        }
        drop(tx);

        let mut failures = Vec::new();
        let mut resume = None;
        for _ in 0..spawned {
            let Some(outcome) = rx.recv().await else {
                break;
            };
            match outcome {
                Outcome::Done => {}
                Outcome::Failed(err) => failures.push(err),
                Outcome::Panicked(name, panic) => {
                    if self.config.catch_panics {
                        let cause = HandlerPanicked {
                            message: panic_message(panic.as_ref()),
                        };
                        failures.push(HandlerError::new(name, cause));
                    } else if resume.is_none() {
                        resume = Some(panic);
                    }
                }
            }
        }

        if let Some(panic) = resume {
            std::panic::resume_unwind(panic);
        }

        for err in &failures {
            debug!(
                registry = %self.config.label,
                event = type_name::<E>(),
                handler = err.name().unwrap_or(""),
                error = %err,
                "event handler failed"
            );
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::Aggregate(AggregateError::new(failures)))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RegistryConfig;
    use crate::error::BoxError;
    use crate::handlers::{with_name, EventHandler, EventHandlerFn};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use thiserror::Error as ThisError;

    #[derive(Clone, Debug)]
    struct LogEvent(&'static str);

    #[derive(ThisError, Debug, PartialEq)]
    #[error("disk full")]
    struct DiskFull;

    /// Counts calls and optionally fails.
    struct Sink {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl EventHandler<LogEvent> for Sink {
        async fn handle(&self, _ctx: Context, _ev: &LogEvent) -> std::result::Result<(), BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(Box::new(DiskFull))
            } else {
                Ok(())
            }
        }
    }

    fn sinks(registry: &Registry, fails: &[bool]) -> Vec<Arc<AtomicUsize>> {
        fails
            .iter()
            .enumerate()
            .map(|(i, &fail)| {
                let calls = Arc::new(AtomicUsize::new(0));
                registry
                    .register_event_handler_with(
                        Sink { calls: calls.clone(), fail },
                        with_name(format!("sink-{}", i + 1)),
                    )
                    .unwrap();
                calls
            })
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_notify_single_failure_among_three() {
        let registry = Registry::new();
        let calls = sinks(&registry, &[false, true, false]);

        let err = registry
            .notify(Context::new(), LogEvent("boot"))
            .await
            .unwrap_err();

        let Error::Aggregate(agg) = &err else {
            panic!("expected aggregate, got {err:?}");
        };
        assert_eq!(agg.len(), 1);
        assert_eq!(agg.errors()[0].name(), Some("sink-2"));
        assert_eq!(err.to_string(), "sink-2: disk full");
        assert!(err.wraps(&DiskFull));
        for (i, c) in calls.iter().enumerate() {
            assert_eq!(c.load(Ordering::SeqCst), 1, "handler {} must run exactly once", i + 1);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_notify_all_succeed() {
        let registry = Registry::new();
        let calls = sinks(&registry, &[false, false, false, false]);

        registry.notify(Context::new(), LogEvent("ok")).await.unwrap();
        assert!(calls.iter().all(|c| c.load(Ordering::SeqCst) == 1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_notify_collects_every_failure() {
        let registry = Registry::new();
        let calls = sinks(&registry, &[true, false, true, true, false]);

        let err = registry
            .notify(Context::new(), LogEvent("bad"))
            .await
            .unwrap_err();
        let Error::Aggregate(agg) = err else {
            panic!("expected aggregate");
        };
        assert_eq!(agg.len(), 3);

        let mut names: Vec<_> = agg.iter().filter_map(HandlerError::name).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["sink-1", "sink-3", "sink-4"]);
        assert!(agg.iter().all(|e| e.wraps(&DiskFull)));
        assert_eq!(calls.iter().map(|c| c.load(Ordering::SeqCst)).sum::<usize>(), 5);
    }

    #[tokio::test]
    async fn test_notify_unregistered_event_is_not_found() {
        let registry = Registry::new();
        let err = registry
            .notify(Context::new(), LogEvent("lost"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::HandlerNotFound { slot: Slot::Event(key) } if key == TypeKey::of::<LogEvent>()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_notify_runs_handlers_concurrently() {
        let registry = Registry::new();
        let gate = Arc::new(tokio::sync::Barrier::new(2));

        for _ in 0..2 {
            let gate = gate.clone();
            registry
                .register_event_handler(EventHandlerFn::new(move |_ctx: Context, _ev: LogEvent| {
                    let gate = gate.clone();
                    async move {
                        // Completes only if both handlers are in flight at once.
                        gate.wait().await;
                        Ok::<(), BoxError>(())
                    }
                }))
                .unwrap();
        }

        tokio::time::timeout(
            Duration::from_secs(5),
            registry.notify(Context::new(), LogEvent("sync")),
        )
        .await
        .expect("handlers must not run sequentially")
        .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_notify_shares_context() {
        #[derive(Debug)]
        struct RequestId(u32);

        let registry = Registry::new();
        let seen = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let seen = seen.clone();
            registry
                .register_event_handler(EventHandlerFn::new(move |ctx: Context, _ev: LogEvent| {
                    let seen = seen.clone();
                    async move {
                        if ctx.value::<RequestId>().map(|id| id.0) == Some(9) {
                            seen.fetch_add(1, Ordering::SeqCst);
                        }
                        Ok::<(), BoxError>(())
                    }
                }))
                .unwrap();
        }

        let ctx = Context::new().with_value(RequestId(9));
        registry.notify(ctx, LogEvent("ctx")).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    struct Explode;

    #[async_trait]
    impl EventHandler<LogEvent> for Explode {
        async fn handle(&self, _ctx: Context, ev: &LogEvent) -> std::result::Result<(), BoxError> {
            panic!("exploded on {}", ev.0);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_notify_catches_panics() {
        let registry = Registry::new();
        let calls = sinks(&registry, &[false]);
        registry
            .register_event_handler_with(Explode, with_name("explode"))
            .unwrap();

        let err = registry
            .notify(Context::new(), LogEvent("x"))
            .await
            .unwrap_err();
        assert!(err.is::<HandlerPanicked>());
        assert_eq!(err.to_string(), "explode: handler panicked: exploded on x");
        assert_eq!(calls[0].load(Ordering::SeqCst), 1, "sibling must still run");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_notify_resumes_panic_when_not_caught() {
        let registry = Arc::new(Registry::with_config(RegistryConfig {
            catch_panics: false,
            ..RegistryConfig::default()
        }));
        let calls = sinks(&registry, &[false, false]);
        registry.register_event_handler(Explode).unwrap();

        let caller = Arc::clone(&registry);
        let joined = tokio::spawn(async move { caller.notify(Context::new(), LogEvent("y")).await }).await;

        let err = joined.expect_err("notify must resume the panic");
        assert!(err.is_panic());
        assert!(calls.iter().all(|c| c.load(Ordering::SeqCst) == 1), "siblings finish first");
    }
}
