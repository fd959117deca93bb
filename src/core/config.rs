//! # Registry configuration.
//!
//! Provides [`RegistryConfig`] settings for one [`Registry`](crate::Registry).
//!
//! None of these settings change *which* handler is selected or how errors are
//! aggregated; they only affect diagnostics and what happens when an event handler
//! panics.

use std::borrow::Cow;

/// Configuration for a [`Registry`](crate::Registry).
///
/// ## Field semantics
/// - `label`: name recorded in log fields (`registry = <label>`)
/// - `catch_panics`: isolate panicking event handlers during `notify`
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// Label identifying the registry in log output.
    ///
    /// The process-wide default registry uses `"default"`.
    pub label: Cow<'static, str>,

    /// Whether a panicking event handler is reported as an error.
    ///
    /// - `true`: the panic is caught and recorded in the `notify` aggregate as a
    ///   [`HandlerError`](crate::HandlerError) whose cause is
    ///   [`HandlerPanicked`](crate::HandlerPanicked).
    /// - `false`: `notify` still waits for every sibling handler, then resumes the panic
    ///   on the caller.
    pub catch_panics: bool,
}

impl RegistryConfig {
    /// Returns the default configuration with `label` set.
    pub fn labeled(label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

impl Default for RegistryConfig {
    /// Default configuration:
    ///
    /// - `label = "registry"`
    /// - `catch_panics = true`
    fn default() -> Self {
        Self {
            label: Cow::Borrowed("registry"),
            catch_panics: true,
        }
    }
}
