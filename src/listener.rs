//! The generic execution-listener protocol.
//!
//! The surrounding harness supplies the listener; the bridge guarantees that
//! every node reaching a terminal decision receives exactly one `started` /
//! `finished` pair (childless suites delegated to the unreported native run
//! are the single exemption and receive no events at all).

use crate::diagnostics::Cause;
use crate::tree::TestNode;

/// Terminal outcome of one tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Successful,
    Failed(Cause),
    Aborted(Cause),
}

impl ExecutionResult {
    pub fn is_successful(&self) -> bool {
        matches!(self, ExecutionResult::Successful)
    }

    pub fn cause(&self) -> Option<&Cause> {
        match self {
            ExecutionResult::Successful => None,
            ExecutionResult::Failed(cause) | ExecutionResult::Aborted(cause) => Some(cause),
        }
    }
}

/// Receiver of per-node execution events.
pub trait ExecutionListener {
    fn started(&mut self, node: &TestNode);
    fn finished(&mut self, node: &TestNode, result: ExecutionResult);
}
