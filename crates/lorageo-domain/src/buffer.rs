use std::time::Duration;

use async_trait::async_trait;

use crate::error::DomainResult;
use crate::types::{Eui64, Frame};

/// Storage binding for the per-device frame buffer.
///
/// Entries are keyed purely on the device EUI. Implementations must preserve
/// receptions byte-for-byte (gateway ids, uplink ids, fine-timestamp nanos)
/// because the buffered frames flow into resolver requests. A zero TTL
/// disables buffering entirely: `get` returns empty and `save` is a no-op.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameBufferStore: Send + Sync {
    /// Returns the buffered frames, oldest first, or empty when absent or
    /// expired. Empty is not an error.
    async fn get(&self, dev_eui: Eui64, ttl: Duration) -> DomainResult<Vec<Frame>>;

    /// Writes the buffer and resets its TTL. Saving an empty buffer is a
    /// no-op; empty state is never persisted.
    async fn save(&self, dev_eui: Eui64, frames: &[Frame], ttl: Duration) -> DomainResult<()>;

    /// Drops the buffered frames for the device.
    async fn clear(&self, dev_eui: Eui64) -> DomainResult<()>;
}
