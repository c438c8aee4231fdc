use async_trait::async_trait;

use crate::error::DomainResult;
use crate::types::{Frame, UplinkRxInfo, WifiAccessPoint};

/// A fix computed by the external resolver, before source tagging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub accuracy: f64,
}

/// Typed surface of the external geolocation resolver.
///
/// `Ok(None)` is the resolver's "no location" outcome: the request was
/// answered but the signal was insufficient for a fix. It is not an error
/// and never triggers a fallback to another strategy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeolocationResolver: Send + Sync {
    async fn tdoa_single_frame(
        &self,
        frame: &[UplinkRxInfo],
    ) -> DomainResult<Option<ResolvedLocation>>;

    async fn tdoa_multi_frame(&self, frames: &[Frame])
        -> DomainResult<Option<ResolvedLocation>>;

    async fn rssi_single_frame(
        &self,
        frame: &[UplinkRxInfo],
    ) -> DomainResult<Option<ResolvedLocation>>;

    async fn rssi_multi_frame(&self, frames: &[Frame])
        -> DomainResult<Option<ResolvedLocation>>;

    async fn wifi_tdoa_single_frame(
        &self,
        frame: &[UplinkRxInfo],
        access_points: &[WifiAccessPoint],
    ) -> DomainResult<Option<ResolvedLocation>>;

    async fn gnss_lr1110_single_frame(
        &self,
        frame: &[UplinkRxInfo],
        use_rx_time: bool,
        payload: &[u8],
    ) -> DomainResult<Option<ResolvedLocation>>;
}
