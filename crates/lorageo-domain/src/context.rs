use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Correlation context carried through every handler invocation: a
/// request-scoped id for log correlation and a cancellation token honored at
/// each I/O point.
#[derive(Debug, Clone)]
pub struct RequestContext {
    id: Uuid,
    cancellation: CancellationToken,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self {
            id: Uuid::new_v4(),
            cancellation,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_canceled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_observable() {
        let token = CancellationToken::new();
        let ctx = RequestContext::with_cancellation(token.clone());

        assert!(!ctx.is_canceled());
        token.cancel();
        assert!(ctx.is_canceled());
    }
}
