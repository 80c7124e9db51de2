//! The cancellation/scope handle threaded through every stage operation.

use tokio_util::sync::CancellationToken;

/// Carries the cooperative-cancellation token for a single stage operation.
///
/// Every fallible I/O call a stage makes (an L1 fetch, a write to the downstream
/// stage) should happen before any mutation to the stage's own state, and should
/// check `ctx.is_cancelled()` at the fetch boundary. That ordering is what gives
/// stage operations their prepare-then-commit property: a cancelled operation
/// returns promptly without leaving the stage half-updated.
#[derive(Debug, Clone, Default)]
pub struct StageContext {
    cancellation: CancellationToken,
}

impl StageContext {
    /// Creates a new, not-yet-cancelled context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context linked to an existing cancellation token, e.g. one owned
    /// by the embedding node's shutdown path.
    pub const fn with_token(cancellation: CancellationToken) -> Self {
        Self { cancellation }
    }

    /// Returns `true` if the operation driving this context should abandon its
    /// in-flight work without mutating stage state.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// A child context that is cancelled whenever `self` is, but can also be
    /// cancelled independently (e.g. to bound a single fetch with a timeout).
    pub fn child(&self) -> Self {
        Self { cancellation: self.cancellation.child_token() }
    }

    /// Returns a handle to the underlying cancellation token.
    pub const fn token(&self) -> &CancellationToken {
        &self.cancellation
    }
}
