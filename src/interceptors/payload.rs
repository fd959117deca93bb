//! Type-erased values carried through the interceptor chain.

use std::any::{type_name, Any};
use std::fmt;

/// A request or response while it travels through interceptors.
///
/// Interceptors see values as opaque payloads; they may inspect them with
/// [`downcast_ref`](Payload::downcast_ref) or replace them with [`Payload::new`].
/// The dispatcher narrows the payload back to the concrete type at the chain boundary
/// and reports a mismatch as [`Error::Unmarshal`](crate::Error::Unmarshal).
pub struct Payload {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

impl Payload {
    /// Wraps `value`, remembering its type name for diagnostics.
    pub fn new<T: Send + 'static>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Name of the wrapped value's type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the payload holds a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Borrows the value as `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Mutably borrows the value as `T`.
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut::<T>()
    }

    /// Takes the value out as `T`, or hands the payload back unchanged.
    pub fn downcast<T: 'static>(self) -> Result<T, Payload> {
        let type_name = self.type_name;
        match self.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Payload { value, type_name }),
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_round_trip_and_mismatch() {
        let p = Payload::new(5u16);
        assert!(p.is::<u16>());
        assert_eq!(p.type_name(), "u16");

        let p = p.downcast::<u32>().unwrap_err();
        assert_eq!(p.type_name(), "u16", "failed downcast must hand the payload back");
        assert_eq!(p.downcast::<u16>().unwrap(), 5);
    }

    #[test]
    fn test_downcast_mut_edits_in_place() {
        let mut p = Payload::new(String::from("a"));
        p.downcast_mut::<String>().unwrap().push('b');
        assert_eq!(p.downcast_ref::<String>().map(String::as_str), Some("ab"));
    }
}
