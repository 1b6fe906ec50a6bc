//! # Notifier configuration.
//!
//! Provides [`NotifierConfig`], the per-notifier delivery settings.
//!
//! ## Defaults
//! - `failure = FailurePolicy::Aggregate` (attempt every consumer, fail once at the end)
//! - `isolate_panics = true` (a panicking consumer becomes a `ConsumerError::Panicked`)

/// What a sweep does when a consumer fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Attempt every eligible consumer, then report all failures together.
    #[default]
    Aggregate,
    /// Stop at the first failure and report only that one.
    FailFast,
}

/// Delivery settings for a [`Notifier`](crate::Notifier).
///
/// ## Field semantics
/// - `failure`: see [`FailurePolicy`]
/// - `isolate_panics`: catch consumer panics with `catch_unwind` and record them
///   as failures; when `false` a panic unwinds into the runner's context
///
/// ## Notes
/// All fields are public; use the helper accessors instead of matching on them
/// across the codebase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotifierConfig {
    /// Failure handling for one sweep.
    pub failure: FailurePolicy,

    /// Whether consumer panics are caught and reported as failures.
    pub isolate_panics: bool,
}

impl NotifierConfig {
    /// Returns `true` if a sweep stops at the first failing consumer.
    #[inline]
    pub fn stops_on_first_failure(&self) -> bool {
        self.failure == FailurePolicy::FailFast
    }

    /// Returns a copy with `failure` replaced.
    #[must_use]
    pub fn with_failure(mut self, failure: FailurePolicy) -> Self {
        self.failure = failure;
        self
    }

    /// Returns a copy with `isolate_panics` replaced.
    #[must_use]
    pub fn with_isolate_panics(mut self, isolate: bool) -> Self {
        self.isolate_panics = isolate;
        self
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            failure: FailurePolicy::Aggregate,
            isolate_panics: true,
        }
    }
}
