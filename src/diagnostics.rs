//! Unified diagnostics for the bridge.
//!
//! All failure modes of the crate are represented by [`BridgeError`], a single
//! `miette`-based diagnostic enum. Listener-visible failures are carried as
//! [`Cause`] values: small, cheaply clonable records of what went wrong,
//! classified by [`ErrorType`]. One `Cause` may be shared between the
//! first-failure slot and every subsequently aborted node, so it must stay
//! cheap to copy around.

use std::fmt;

use miette::{Diagnostic, Report};
use thiserror::Error;

/// Type-safe classification of bridge failures.
///
/// This is the taxonomy used both for [`BridgeError`] variants and for the
/// [`Cause`] values attached to listener results and abort reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// A suite class could not be resolved by the loader
    Load,
    /// A suite class resolved but could not be constructed
    Construction,
    /// A failed-assertion style error raised by the foreign framework
    Assertion,
    /// A runtime component the foreign framework needed was missing
    MissingDependency,
    /// Any other failure while executing a suite or test batch
    Execution,
    /// Unrecoverable failure category reserved by the runtime
    Fatal,
    /// Internal invariant violations of the bridge itself
    Internal,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Load => "Load",
            ErrorType::Construction => "Construction",
            ErrorType::Assertion => "Assertion",
            ErrorType::MissingDependency => "MissingDependency",
            ErrorType::Execution => "Execution",
            ErrorType::Fatal => "Fatal",
            ErrorType::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A captured failure cause, as surfaced through listener results.
///
/// Causes are recorded once (e.g. in a FailedInit node or the executor's
/// first-failure slot) and cloned into every result that refers back to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    error_type: ErrorType,
    message: String,
}

impl Cause {
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
        }
    }

    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

impl From<&BridgeError> for Cause {
    fn from(error: &BridgeError) -> Self {
        Cause::new(error.error_type(), error.to_string())
    }
}

/// Unified error type for all bridge failure modes.
#[derive(Debug, Error, Diagnostic)]
pub enum BridgeError {
    #[error("failed to load suite class '{class_name}': {message}")]
    #[diagnostic(
        code(suitebridge::loader::load),
        help("suite classes must be registered with the loader before discovery")
    )]
    Load { class_name: String, message: String },

    #[error("failed to instantiate suite class '{class_name}': {message}")]
    #[diagnostic(code(suitebridge::loader::instantiate))]
    Instantiate { class_name: String, message: String },

    #[error("native run of suite '{suite_name}' failed: {message}")]
    #[diagnostic(code(suitebridge::executor::run))]
    Run { suite_name: String, message: String },

    #[error("fatal failure in suite '{suite_name}': {message}")]
    #[diagnostic(
        code(suitebridge::executor::fatal),
        help("fatal failures are reported and then re-raised; the run does not continue")
    )]
    Fatal { suite_name: String, message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(suitebridge::config))]
    Config { message: String },

    #[error("internal error: {message}")]
    #[diagnostic(code(suitebridge::internal))]
    Internal { message: String },
}

impl BridgeError {
    /// Returns the type-safe classification for this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            BridgeError::Load { .. } => ErrorType::Load,
            BridgeError::Instantiate { .. } => ErrorType::Construction,
            BridgeError::Run { .. } => ErrorType::Execution,
            BridgeError::Fatal { .. } => ErrorType::Fatal,
            BridgeError::Config { .. } => ErrorType::Internal,
            BridgeError::Internal { .. } => ErrorType::Internal,
        }
    }

    /// True for the unrecoverable category that is re-raised after reporting.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BridgeError::Fatal { .. })
    }
}

/// Prints a [`BridgeError`] with full miette diagnostics.
pub fn print_error(error: BridgeError) {
    let report = Report::new(error);
    eprintln!("{report:?}");
}
