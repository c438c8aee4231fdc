use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::buffer::FrameBufferStore;
use crate::config::Config;
use crate::context::RequestContext;
use crate::error::{DomainError, DomainResult};
use crate::event::{Location, LocationEvent, UplinkEvent};
use crate::resolver::{GeolocationResolver, ResolvedLocation};
use crate::strategy::{select_strategy, Strategy};
use crate::types::Frame;

/// Receptions an uplink needs before its frame is buffered. Fewer cannot
/// support either multi-gateway TDOA or RSSI resolution.
const MIN_FRAME_RECEPTIONS: usize = 3;

/// Orchestrates the per-uplink geolocation pipeline: buffer update, strategy
/// selection, resolver dispatch, and location-event construction.
pub struct GeolocationService {
    config: Config,
    store: Arc<dyn FrameBufferStore>,
    resolver: Arc<dyn GeolocationResolver>,
}

impl GeolocationService {
    pub fn new(
        config: Config,
        store: Arc<dyn FrameBufferStore>,
        resolver: Arc<dyn GeolocationResolver>,
    ) -> Self {
        Self {
            config,
            store,
            resolver,
        }
    }

    /// Runs the pipeline for one uplink. Returns `Ok(None)` when no strategy
    /// qualifies or the resolver reports no location.
    pub async fn locate(
        &self,
        ctx: &RequestContext,
        uplink: &UplinkEvent,
    ) -> DomainResult<Option<LocationEvent>> {
        let buffer = self.update_buffer(ctx, uplink).await?;

        let Some(strategy) = select_strategy(ctx, &self.config, &buffer, uplink) else {
            return Ok(None);
        };

        debug!(
            dev_eui = %uplink.dev_eui,
            ctx_id = %ctx.id(),
            source = ?strategy.source(),
            "attempting geolocation"
        );

        let uplink_ids = strategy.uplink_ids();
        let Some(resolved) = self.resolve(ctx, &strategy, uplink).await? else {
            return Ok(None);
        };

        Ok(Some(location_event(uplink, &strategy, uplink_ids, resolved)))
    }

    /// Reads the buffered frames, appends the current frame when it carries
    /// enough receptions, and persists the result. Empty buffers are never
    /// persisted.
    async fn update_buffer(
        &self,
        ctx: &RequestContext,
        uplink: &UplinkEvent,
    ) -> DomainResult<Vec<Frame>> {
        let ttl = self.config.buffer_ttl();

        let mut buffer = guard(ctx, self.store.get(uplink.dev_eui, ttl)).await?;

        if uplink.rx_info.len() >= MIN_FRAME_RECEPTIONS {
            buffer.push(uplink.rx_info.clone());
        }

        if !buffer.is_empty() {
            guard(ctx, self.store.save(uplink.dev_eui, &buffer, ttl)).await?;
        }

        Ok(buffer)
    }

    async fn resolve(
        &self,
        ctx: &RequestContext,
        strategy: &Strategy,
        uplink: &UplinkEvent,
    ) -> DomainResult<Option<ResolvedLocation>> {
        let attempt = async {
            match strategy {
                Strategy::Gnss { payload } => {
                    self.resolver
                        .gnss_lr1110_single_frame(
                            &uplink.rx_info,
                            self.config.geolocation_gnss_use_rx_time,
                            payload,
                        )
                        .await
                }
                Strategy::Wifi { access_points } => {
                    self.resolver
                        .wifi_tdoa_single_frame(&uplink.rx_info, access_points)
                        .await
                }
                Strategy::Tdoa { frames } if frames.len() == 1 => {
                    self.resolver.tdoa_single_frame(&frames[0]).await
                }
                Strategy::Tdoa { frames } => self.resolver.tdoa_multi_frame(frames).await,
                Strategy::Rssi { frames } if frames.len() == 1 => {
                    self.resolver.rssi_single_frame(&frames[0]).await
                }
                Strategy::Rssi { frames } => self.resolver.rssi_multi_frame(frames).await,
            }
        };

        guard(ctx, attempt).await
    }
}

/// Runs a fallible operation under the context's cancellation token.
async fn guard<T, F>(ctx: &RequestContext, operation: F) -> DomainResult<T>
where
    F: Future<Output = DomainResult<T>>,
{
    tokio::select! {
        biased;
        _ = ctx.cancellation().cancelled() => Err(DomainError::Canceled),
        result = operation => result,
    }
}

fn location_event(
    uplink: &UplinkEvent,
    strategy: &Strategy,
    uplink_ids: Vec<Vec<u8>>,
    resolved: ResolvedLocation,
) -> LocationEvent {
    LocationEvent {
        application_id: uplink.application_id,
        application_name: uplink.application_name.clone(),
        device_name: uplink.device_name.clone(),
        dev_eui: uplink.dev_eui,
        tags: uplink.tags.clone(),
        f_cnt: if uplink_ids.is_empty() {
            uplink.f_cnt
        } else {
            0
        },
        uplink_ids,
        location: Location {
            latitude: resolved.latitude,
            longitude: resolved.longitude,
            altitude: resolved.altitude,
            accuracy: resolved.accuracy,
            source: strategy.source(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::MockFrameBufferStore;
    use crate::event::LocationSource;
    use crate::resolver::MockGeolocationResolver;
    use crate::types::{Eui64, UplinkRxInfo};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    const DEV_EUI: Eui64 = Eui64([1, 2, 3, 4, 5, 6, 7, 8]);

    const RESOLVED: ResolvedLocation = ResolvedLocation {
        latitude: 1.123,
        longitude: 2.123,
        altitude: 3.123,
        accuracy: 10.0,
    };

    fn rx(uplink_id: u8, fine_timestamp_nanos: Option<u64>) -> UplinkRxInfo {
        UplinkRxInfo {
            gateway_id: Eui64([uplink_id; 8]),
            uplink_id: vec![uplink_id],
            time: None,
            rssi: uplink_id as i32,
            snr: 1.1,
            location: None,
            fine_timestamp_nanos,
        }
    }

    fn three_rx_uplink() -> UplinkEvent {
        UplinkEvent {
            application_id: 1,
            application_name: "test-app".to_string(),
            device_name: "test-device".to_string(),
            dev_eui: DEV_EUI,
            f_cnt: 10,
            rx_info: vec![rx(1, Some(111)), rx(2, Some(222)), rx(3, Some(333))],
            ..Default::default()
        }
    }

    fn empty_store() -> MockFrameBufferStore {
        let mut store = MockFrameBufferStore::new();
        store.expect_get().returning(|_, _| Ok(Vec::new()));
        store.expect_save().returning(|_, _, _| Ok(()));
        store
    }

    fn service(
        config: Config,
        store: MockFrameBufferStore,
        resolver: MockGeolocationResolver,
    ) -> GeolocationService {
        GeolocationService::new(config, Arc::new(store), Arc::new(resolver))
    }

    #[tokio::test]
    async fn single_frame_tdoa_produces_tagged_event() {
        let config = Config {
            geolocation_tdoa: true,
            ..Default::default()
        };
        let mut resolver = MockGeolocationResolver::new();
        resolver
            .expect_tdoa_single_frame()
            .withf(|frame| frame.len() == 3)
            .times(1)
            .returning(|_| Ok(Some(RESOLVED)));

        let service = service(config, empty_store(), resolver);
        let event = service
            .locate(&RequestContext::new(), &three_rx_uplink())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(event.location.source, LocationSource::GeoResolverTdoa);
        assert_eq!(event.location.latitude, 1.123);
        assert_eq!(event.uplink_ids, vec![vec![1], vec![2], vec![3]]);
        assert_eq!(event.f_cnt, 0);
        assert_eq!(event.dev_eui, DEV_EUI);
    }

    #[tokio::test]
    async fn multi_frame_tdoa_concatenates_uplink_ids() {
        let config = Config {
            geolocation_tdoa: true,
            geolocation_min_buffer_size: 2,
            geolocation_buffer_ttl: 60,
            ..Default::default()
        };

        let buffered = vec![vec![rx(4, Some(444)), rx(5, Some(555)), rx(6, Some(666))]];
        let mut store = MockFrameBufferStore::new();
        store
            .expect_get()
            .returning(move |_, _| Ok(buffered.clone()));
        store
            .expect_save()
            .withf(|_, frames, ttl| frames.len() == 2 && *ttl == Duration::from_secs(60))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut resolver = MockGeolocationResolver::new();
        resolver
            .expect_tdoa_multi_frame()
            .withf(|frames| frames.len() == 2)
            .times(1)
            .returning(|_| Ok(Some(RESOLVED)));

        let service = service(config, store, resolver);
        let event = service
            .locate(&RequestContext::new(), &three_rx_uplink())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            event.uplink_ids,
            vec![vec![4], vec![5], vec![6], vec![1], vec![2], vec![3]]
        );
    }

    #[tokio::test]
    async fn gnss_event_carries_f_cnt_instead_of_uplink_ids() {
        let config = Config {
            geolocation_gnss: true,
            geolocation_gnss_payload_field: "gnss".to_string(),
            ..Default::default()
        };
        let mut resolver = MockGeolocationResolver::new();
        resolver
            .expect_gnss_lr1110_single_frame()
            .withf(|_, use_rx_time, payload| !*use_rx_time && *payload == [1, 2, 3])
            .times(1)
            .returning(|_, _, _| Ok(Some(RESOLVED)));

        let mut uplink = three_rx_uplink();
        uplink.object_json = r#"{"gnss": "AQID"}"#.to_string();

        let service = service(config, empty_store(), resolver);
        let event = service
            .locate(&RequestContext::new(), &uplink)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(event.location.source, LocationSource::GeoResolverGnss);
        assert!(event.uplink_ids.is_empty());
        assert_eq!(event.f_cnt, 10);
    }

    #[tokio::test]
    async fn no_location_outcome_yields_no_event_and_no_fallback() {
        let config = Config {
            geolocation_tdoa: true,
            geolocation_rssi: true,
            ..Default::default()
        };
        let mut resolver = MockGeolocationResolver::new();
        resolver
            .expect_tdoa_single_frame()
            .times(1)
            .returning(|_| Ok(None));
        // No rssi expectation: a call would panic the mock.

        let service = service(config, empty_store(), resolver);
        let event = service
            .locate(&RequestContext::new(), &three_rx_uplink())
            .await
            .unwrap();

        assert!(event.is_none());
    }

    #[tokio::test]
    async fn short_frames_are_not_buffered() {
        let config = Config {
            geolocation_rssi: true,
            ..Default::default()
        };
        let mut store = MockFrameBufferStore::new();
        store.expect_get().times(1).returning(|_, _| Ok(Vec::new()));
        // No save expectation: the buffer stays empty and must not persist.
        let resolver = MockGeolocationResolver::new();

        let mut uplink = three_rx_uplink();
        uplink.rx_info.truncate(2);

        let service = service(config, store, resolver);
        let event = service.locate(&RequestContext::new(), &uplink).await.unwrap();

        assert!(event.is_none());
    }

    #[tokio::test]
    async fn store_failure_propagates_before_resolution() {
        let config = Config {
            geolocation_rssi: true,
            ..Default::default()
        };
        let mut store = MockFrameBufferStore::new();
        store
            .expect_get()
            .returning(|_, _| Err(DomainError::BufferStore(anyhow::anyhow!("kv down"))));
        let resolver = MockGeolocationResolver::new();

        let service = service(config, store, resolver);
        let err = service
            .locate(&RequestContext::new(), &three_rx_uplink())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::BufferStore(_)));
    }

    #[tokio::test]
    async fn resolver_failure_propagates() {
        let config = Config {
            geolocation_rssi: true,
            ..Default::default()
        };
        let mut resolver = MockGeolocationResolver::new();
        resolver
            .expect_rssi_single_frame()
            .returning(|_| Err(DomainError::Resolver(anyhow::anyhow!("http 500"))));

        let service = service(config, empty_store(), resolver);
        let err = service
            .locate(&RequestContext::new(), &three_rx_uplink())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Resolver(_)));
    }

    #[tokio::test]
    async fn canceled_context_aborts_before_buffer_io() {
        let config = Config {
            geolocation_rssi: true,
            ..Default::default()
        };
        let store = empty_store();
        let resolver = MockGeolocationResolver::new();

        let token = CancellationToken::new();
        token.cancel();
        let ctx = RequestContext::with_cancellation(token);

        let service = service(config, store, resolver);
        let err = service.locate(&ctx, &three_rx_uplink()).await.unwrap_err();

        assert!(matches!(err, DomainError::Canceled));
    }
}
