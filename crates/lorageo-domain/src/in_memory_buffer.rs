use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::buffer::FrameBufferStore;
use crate::error::DomainResult;
use crate::types::{Eui64, Frame};

/// In-memory implementation of [`FrameBufferStore`] with per-device expiry.
///
/// Expired entries are evicted lazily on access. Suitable for single-process
/// deployments and tests; a shared key-value store takes its place when
/// uplinks fan out across instances.
#[derive(Default)]
pub struct InMemoryFrameBufferStore {
    entries: RwLock<HashMap<Eui64, BufferEntry>>,
}

struct BufferEntry {
    expires_at: Instant,
    frames: Vec<Frame>,
}

impl InMemoryFrameBufferStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FrameBufferStore for InMemoryFrameBufferStore {
    async fn get(&self, dev_eui: Eui64, ttl: Duration) -> DomainResult<Vec<Frame>> {
        if ttl.is_zero() {
            return Ok(Vec::new());
        }

        let entries = self.entries.read().await;
        match entries.get(&dev_eui) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(entry.frames.clone()),
            _ => Ok(Vec::new()),
        }
    }

    async fn save(&self, dev_eui: Eui64, frames: &[Frame], ttl: Duration) -> DomainResult<()> {
        if ttl.is_zero() || frames.is_empty() {
            return Ok(());
        }

        let mut entries = self.entries.write().await;
        entries.insert(
            dev_eui,
            BufferEntry {
                expires_at: Instant::now() + ttl,
                frames: frames.to_vec(),
            },
        );
        Ok(())
    }

    async fn clear(&self, dev_eui: Eui64) -> DomainResult<()> {
        self.entries.write().await.remove(&dev_eui);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UplinkRxInfo;

    const DEV_EUI: Eui64 = Eui64([1, 2, 3, 4, 5, 6, 7, 8]);
    const TTL: Duration = Duration::from_secs(60);

    fn frame(uplink_id: u8) -> Frame {
        vec![UplinkRxInfo {
            gateway_id: Eui64([1; 8]),
            uplink_id: vec![uplink_id],
            time: None,
            rssi: 1,
            snr: 1.1,
            location: None,
            fine_timestamp_nanos: Some(111),
        }]
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let store = InMemoryFrameBufferStore::new();
        let frames = vec![frame(1), frame(2)];

        store.save(DEV_EUI, &frames, TTL).await.unwrap();

        assert_eq!(store.get(DEV_EUI, TTL).await.unwrap(), frames);
    }

    #[tokio::test]
    async fn get_of_unknown_device_is_empty() {
        let store = InMemoryFrameBufferStore::new();
        assert!(store.get(DEV_EUI, TTL).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let store = InMemoryFrameBufferStore::new();
        store.save(DEV_EUI, &[frame(1)], TTL).await.unwrap();

        tokio::time::advance(TTL + Duration::from_secs(1)).await;

        assert!(store.get(DEV_EUI, TTL).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn save_refreshes_ttl() {
        let store = InMemoryFrameBufferStore::new();
        store.save(DEV_EUI, &[frame(1)], TTL).await.unwrap();

        tokio::time::advance(Duration::from_secs(45)).await;
        store.save(DEV_EUI, &[frame(1), frame(2)], TTL).await.unwrap();
        tokio::time::advance(Duration::from_secs(45)).await;

        assert_eq!(store.get(DEV_EUI, TTL).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn zero_ttl_disables_buffering() {
        let store = InMemoryFrameBufferStore::new();

        store.save(DEV_EUI, &[frame(1)], Duration::ZERO).await.unwrap();

        assert!(store.get(DEV_EUI, Duration::ZERO).await.unwrap().is_empty());
        assert!(store.get(DEV_EUI, TTL).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_save_is_a_no_op() {
        let store = InMemoryFrameBufferStore::new();
        store.save(DEV_EUI, &[frame(1)], TTL).await.unwrap();

        store.save(DEV_EUI, &[], TTL).await.unwrap();

        assert_eq!(store.get(DEV_EUI, TTL).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn clear_drops_the_entry() {
        let store = InMemoryFrameBufferStore::new();
        store.save(DEV_EUI, &[frame(1)], TTL).await.unwrap();

        store.clear(DEV_EUI).await.unwrap();

        assert!(store.get(DEV_EUI, TTL).await.unwrap().is_empty());
    }
}
