//! Error types used by the notivisor collections and notifier.
//!
//! This module defines three error enums:
//!
//! - [`CollectionError`] — misuse of a collection (bad argument, short buffer, read-only view).
//! - [`ConsumerError`] — a single consumer failed to accept a delivery.
//! - [`NotifyError`] — a notify sweep (or its runner) failed as a whole.
//!
//! All of them provide helper methods (`as_label`, `as_message`) for logging/metrics.

use thiserror::Error;

/// # Errors produced by the thread-safe collections.
///
/// These are raised synchronously by the operation that received the bad input.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// An argument was rejected at the call site (e.g. an already-dead weak target).
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the rejected argument.
        name: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Destination buffer cannot hold the snapshot starting at `offset`.
    #[error("destination too small: need {needed} slots from offset {offset}, have {available}")]
    Capacity {
        /// Number of elements that had to be copied.
        needed: usize,
        /// Requested start offset in the destination.
        offset: usize,
        /// Length of the destination buffer.
        available: usize,
    },

    /// Mutation attempted through a read-only view.
    #[error("collection is read-only")]
    ReadOnly,
}

impl CollectionError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use notivisor::CollectionError;
    ///
    /// assert_eq!(CollectionError::ReadOnly.as_label(), "collection_read_only");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CollectionError::InvalidArgument { .. } => "collection_invalid_argument",
            CollectionError::Capacity { .. } => "collection_capacity",
            CollectionError::ReadOnly => "collection_read_only",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CollectionError::InvalidArgument { name, reason } => {
                format!("invalid argument: {name} ({reason})")
            }
            CollectionError::Capacity {
                needed,
                offset,
                available,
            } => format!("capacity: needed={needed} offset={offset} available={available}"),
            CollectionError::ReadOnly => "read-only".to_string(),
        }
    }
}

/// # Errors produced by a single consumer.
///
/// Consumers return [`ConsumerError::Fail`]; [`ConsumerError::Panicked`] is
/// produced by the notifier when panic isolation catches an unwinding consumer.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsumerError {
    /// Consumer rejected or failed to process the delivery.
    #[error("delivery failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Consumer panicked while processing the delivery.
    #[error("consumer panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl ConsumerError {
    /// Shorthand for [`ConsumerError::Fail`].
    ///
    /// # Example
    /// ```
    /// use notivisor::ConsumerError;
    ///
    /// let err = ConsumerError::fail("disk full");
    /// assert_eq!(err.to_string(), "delivery failed: disk full");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        ConsumerError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConsumerError::Fail { .. } => "consumer_failed",
            ConsumerError::Panicked { .. } => "consumer_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ConsumerError::Fail { error } => format!("error: {error}"),
            ConsumerError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

/// One consumer's failure inside a notify sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerFailure {
    /// Name reported by the consumer.
    pub consumer: String,
    /// What went wrong.
    pub error: ConsumerError,
}

impl std::fmt::Display for ConsumerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.consumer, self.error)
    }
}

/// # Errors produced by a notify call.
///
/// A sweep never stops at the first failing consumer (unless configured with
/// [`FailurePolicy::FailFast`](crate::FailurePolicy::FailFast)); all failures are
/// reported together in [`NotifyError::Aggregate`].
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// One or more consumers failed during a single sweep.
    #[error("{} consumer(s) failed: [{}]", .failures.len(), join_failures(.failures))]
    Aggregate {
        /// Failures in the order the consumers were attempted.
        failures: Vec<ConsumerFailure>,
    },

    /// The runner refused to accept the unit of work.
    #[error("runner rejected work: {reason}")]
    RunnerRejected {
        /// Why the work could not be scheduled.
        reason: String,
    },
}

impl NotifyError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use notivisor::NotifyError;
    ///
    /// let err = NotifyError::Aggregate { failures: vec![] };
    /// assert_eq!(err.as_label(), "notify_aggregate");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            NotifyError::Aggregate { .. } => "notify_aggregate",
            NotifyError::RunnerRejected { .. } => "notify_runner_rejected",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            NotifyError::Aggregate { failures } => {
                format!("failed consumers={}", failures.len())
            }
            NotifyError::RunnerRejected { reason } => format!("runner rejected: {reason}"),
        }
    }

    /// Failures carried by an aggregate error; empty for other variants.
    pub fn failures(&self) -> &[ConsumerFailure] {
        match self {
            NotifyError::Aggregate { failures } => failures,
            NotifyError::RunnerRejected { .. } => &[],
        }
    }
}

fn join_failures(failures: &[ConsumerFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
