//! # Type keys for handler lookup.
//!
//! Handlers are addressed by the types they accept, never by string names.
//! [`TypeKey`] captures the identity of one type; [`RequestKey`] pairs the
//! request and response identities used by the mediator side.
//!
//! ## Rules
//! - Equality and hashing use [`TypeId`] only; the type name is diagnostic.
//! - Keys are stable within one process and are never serialized.
//! - Two distinct named types are always distinct keys, even if they share a layout.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a single payload type.
#[derive(Clone, Copy, Debug)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Returns the key of `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns the key of the value's static type.
    #[inline]
    pub fn of_val<T: ?Sized + 'static>(_value: &T) -> Self {
        Self::of::<T>()
    }

    /// Underlying [`TypeId`].
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name (diagnostics only).
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identity of a request handler slot: ordered `(request, response)` pair.
///
/// `(A, B)` and `(B, A)` are different keys; so are `(A, B)` and `(A, C)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestKey {
    request: TypeKey,
    response: TypeKey,
}

impl RequestKey {
    /// Returns the key of the `Req -> Res` pair.
    #[inline]
    pub fn of<Req: 'static, Res: 'static>() -> Self {
        Self {
            request: TypeKey::of::<Req>(),
            response: TypeKey::of::<Res>(),
        }
    }

    /// Request side of the pair.
    pub fn request(&self) -> TypeKey {
        self.request
    }

    /// Response side of the pair.
    pub fn response(&self) -> TypeKey {
        self.response
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.request, self.response)
    }
}

/// Which registry slot an operation addressed; used in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Single request handler for a `(request, response)` pair.
    Request(RequestKey),
    /// Event handler list for one event type.
    Event(TypeKey),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Request(key) => write!(f, "request handler for {key}"),
            Slot::Event(key) => write!(f, "event handler for {key}"),
        }
    }
}
