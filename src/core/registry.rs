//! # Handler registry.
//!
//! [`Registry`] owns the two handler mappings and the interceptor chain:
//!
//! ```text
//! Registry
//!   ├─ requests:  (Req, Res) ──► RequestRecord<Req, Res>   exactly one
//!   ├─ events:    E          ──► [EventRecord<E>, ...]     zero or more, insertion order
//!   └─ chain:     [Interceptor, ...]                       send only, registration order
//! ```
//!
//! ## Rules
//! - Registration validates first, then inserts; a rejected registration changes nothing.
//! - Entries are never removed or replaced.
//! - Each map slot stores a concrete record type fixed by its key, so lookups narrow the
//!   slot with a plain `downcast_ref` that cannot disagree with the key.
//! - Locks are held only to clone `Arc`s out; no lock is held across an `.await`.
//!
//! Registration is expected to finish before concurrent dispatch starts. Dispatch on a
//! populated registry may run from any number of tasks at once.

use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::core::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::handlers::{EventHandler, Options, RequestHandler};
use crate::interceptors::{Chain, Interceptor};
use crate::key::{RequestKey, Slot, TypeKey};

/// Boxed record; the concrete type is determined by the map key.
type AnySlot = Box<dyn Any + Send + Sync>;

/// The single request handler registered for `(Req, Res)`.
pub(crate) struct RequestRecord<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    pub(crate) handler: Arc<dyn RequestHandler<Req, Res>>,
    pub(crate) name: Option<Cow<'static, str>>,
}

impl<Req, Res> Clone for RequestRecord<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            name: self.name.clone(),
        }
    }
}

/// One event handler registered for `E`.
pub(crate) struct EventRecord<E>
where
    E: Send + Sync + 'static,
{
    pub(crate) handler: Arc<dyn EventHandler<E>>,
    pub(crate) name: Option<Cow<'static, str>>,
}

impl<E> Clone for EventRecord<E>
where
    E: Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            name: self.name.clone(),
        }
    }
}

/// # Type-indexed handler registry.
///
/// Create independent registries with [`Registry::new`] (handy for tests), or use the
/// process-wide instance through [`default_registry`](crate::default_registry) and the
/// crate-level free functions.
///
/// # Example
/// ```
/// use typemob::{with_name, BoxError, Context, Registry, RequestHandlerFn};
///
/// # async fn demo() -> Result<(), typemob::Error> {
/// let registry = Registry::new();
/// registry.register_request_handler_with(
///     RequestHandlerFn::new(|_ctx: Context, s: String| async move { Ok::<_, BoxError>(s) }),
///     with_name("echo"),
/// )?;
///
/// let out: String = registry.send(Context::new(), "hello".to_string()).await?;
/// assert_eq!(out, "hello");
/// # Ok(())
/// # }
/// ```
pub struct Registry {
    pub(crate) config: RegistryConfig,
    requests: RwLock<HashMap<RequestKey, AnySlot>>,
    events: RwLock<HashMap<TypeKey, AnySlot>>,
    chain: RwLock<Chain>,
}

impl Registry {
    /// Creates an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Creates an empty registry with `config`.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            requests: RwLock::new(HashMap::new()),
            events: RwLock::new(HashMap::new()),
            chain: RwLock::new(Chain::default()),
        }
    }

    /// Registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Registers the request handler for `(Req, Res)` without options.
    ///
    /// See [`register_request_handler_with`](Self::register_request_handler_with).
    pub fn register_request_handler<Req, Res, H>(&self, handler: H) -> Result<()>
    where
        Req: Send + 'static,
        Res: Send + 'static,
        H: RequestHandler<Req, Res>,
    {
        self.register_request_handler_with(handler, Options::default())
    }

    /// Registers the request handler for `(Req, Res)`.
    ///
    /// Only one handler per pair may exist. To serve the same payload twice, give one
    /// of the handlers a distinct newtype for its request or response.
    ///
    /// # Errors
    /// - [`Error::InvalidHandler`] if `handler` is empty
    /// - [`Error::DuplicateHandler`] if the pair is already taken
    ///
    /// In both cases the registry is left unchanged.
    pub fn register_request_handler_with<Req, Res, H>(&self, handler: H, opts: Options) -> Result<()>
    where
        Req: Send + 'static,
        Res: Send + 'static,
        H: RequestHandler<Req, Res>,
    {
        let key = RequestKey::of::<Req, Res>();
        if !handler.is_valid() {
            return Err(Error::InvalidHandler {
                slot: Slot::Request(key),
            });
        }
        let name = opts.into_name();

        let mut requests = write(&self.requests);
        if requests.contains_key(&key) {
            return Err(Error::DuplicateHandler { key });
        }
        let handler: Arc<dyn RequestHandler<Req, Res>> = Arc::new(handler);
        requests.insert(
            key,
            Box::new(RequestRecord {
                handler,
                name: name.clone(),
            }),
        );
        drop(requests);

        debug!(
            registry = %self.config.label,
            request = key.request().name(),
            response = key.response().name(),
            handler = name.as_deref().unwrap_or(""),
            "request handler registered"
        );
        Ok(())
    }

    /// Registers an event handler for `E` without options.
    ///
    /// See [`register_event_handler_with`](Self::register_event_handler_with).
    pub fn register_event_handler<E, H>(&self, handler: H) -> Result<()>
    where
        E: Send + Sync + 'static,
        H: EventHandler<E>,
    {
        self.register_event_handler_with(handler, Options::default())
    }

    /// Appends an event handler for `E`.
    ///
    /// # Errors
    /// - [`Error::InvalidHandler`] if `handler` is empty (registry unchanged)
    pub fn register_event_handler_with<E, H>(&self, handler: H, opts: Options) -> Result<()>
    where
        E: Send + Sync + 'static,
        H: EventHandler<E>,
    {
        let key = TypeKey::of::<E>();
        if !handler.is_valid() {
            return Err(Error::InvalidHandler {
                slot: Slot::Event(key),
            });
        }
        let name = opts.into_name();
        let handler: Arc<dyn EventHandler<E>> = Arc::new(handler);
        let record = EventRecord {
            handler,
            name: name.clone(),
        };

        let mut events = write(&self.events);
        let slot = events
            .entry(key)
            .or_insert_with(|| Box::new(Vec::<EventRecord<E>>::new()) as AnySlot);
        let count = match slot.downcast_mut::<Vec<EventRecord<E>>>() {
            Some(records) => {
                records.push(record);
                records.len()
            }
            // The slot type is fixed by the key; a mismatch cannot be produced by this API.
            None => {
                return Err(Error::InvalidHandler {
                    slot: Slot::Event(key),
                })
            }
        };
        drop(events);

        debug!(
            registry = %self.config.label,
            event = key.name(),
            handler = name.as_deref().unwrap_or(""),
            handlers = count,
            "event handler registered"
        );
        Ok(())
    }

    /// Appends `interceptor` to the chain wrapping every `send`.
    ///
    /// Interceptors run in the order they are added; there is no removal. A `send`
    /// already in flight keeps the chain it started with.
    pub fn add_interceptor<I: Interceptor>(&self, interceptor: I) {
        let interceptor: Arc<dyn Interceptor> = Arc::new(interceptor);
        let mut chain = write(&self.chain);
        *chain = chain.appended(interceptor);
        let len = chain.len();
        drop(chain);

        debug!(registry = %self.config.label, interceptors = len, "interceptor added");
    }

    /// Returns `true` if a request handler is registered for `(Req, Res)`.
    pub fn has_request_handler<Req: 'static, Res: 'static>(&self) -> bool {
        read(&self.requests).contains_key(&RequestKey::of::<Req, Res>())
    }

    /// Number of event handlers registered for `E`.
    pub fn event_handler_count<E: Send + Sync + 'static>(&self) -> usize {
        let events = read(&self.events);
        let count = events
            .get(&TypeKey::of::<E>())
            .and_then(|slot| slot.downcast_ref::<Vec<EventRecord<E>>>())
            .map_or(0, Vec::len);
        count
    }

    /// Number of interceptors in the chain.
    pub fn interceptor_count(&self) -> usize {
        read(&self.chain).len()
    }

    pub(crate) fn request_record<Req, Res>(&self) -> Option<RequestRecord<Req, Res>>
    where
        Req: Send + 'static,
        Res: Send + 'static,
    {
        let requests = read(&self.requests);
        let record = requests
            .get(&RequestKey::of::<Req, Res>())
            .and_then(|slot| slot.downcast_ref::<RequestRecord<Req, Res>>())
            .cloned();
        record
    }

    pub(crate) fn event_records<E>(&self) -> Option<Vec<EventRecord<E>>>
    where
        E: Send + Sync + 'static,
    {
        let events = read(&self.events);
        let records = events
            .get(&TypeKey::of::<E>())
            .and_then(|slot| slot.downcast_ref::<Vec<EventRecord<E>>>())
            .cloned();
        records
    }

    pub(crate) fn chain(&self) -> Chain {
        read(&self.chain).clone()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("label", &self.config.label)
            .field("request_handlers", &read(&self.requests).len())
            .field("event_types", &read(&self.events).len())
            .field("interceptors", &self.interceptor_count())
            .finish()
    }
}

// Registry operations never leave a map half-updated, so a poisoned lock still
// guards consistent data.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
