//! Registration options.
//!
//! Options only carry metadata. They are applied after the handler passed validation
//! and never influence the lookup key or how the handler is dispatched.

use std::borrow::Cow;

/// Metadata attached to a handler at registration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    name: Option<Cow<'static, str>>,
}

impl Options {
    /// Empty options (unnamed handler).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the display name used to qualify the handler's errors.
    ///
    /// An empty name leaves the handler unnamed.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        self.name = (!name.is_empty()).then_some(name);
        self
    }

    /// Display name, if set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn into_name(self) -> Option<Cow<'static, str>> {
        self.name
    }
}

/// Shorthand for `Options::new().with_name(name)`.
///
/// ```
/// use typemob::with_name;
///
/// assert_eq!(with_name("audit").name(), Some("audit"));
/// assert_eq!(with_name("").name(), None);
/// ```
pub fn with_name(name: impl Into<Cow<'static, str>>) -> Options {
    Options::new().with_name(name)
}
