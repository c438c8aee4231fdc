use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use lorageo_domain::{
    DomainError, DomainResult, Frame, GeolocationResolver, ResolvedLocation, UplinkRxInfo,
    WifiAccessPoint,
};

use crate::error::ResolverError;
use crate::metrics::observe_api_duration;
use crate::types::{
    gps_epoch_seconds, GnssLr1110SingleFrameRequest, HexBytes, Response, RssiMultiFrameRequest,
    RssiSingleFrameRequest, TdoaMultiFrameRequest, TdoaSingleFrameRequest, UplinkRssi, UplinkTdoa,
    V3Response, WifiTdoaSingleFrameRequest,
};

/// Production base URI of the geolocation resolver.
pub const DEFAULT_RESOLVER_URI: &str = "https://gls.loracloud.com";

/// Async client for the geolocation resolver API.
///
/// Serializes typed requests as JSON, authenticates with a bearer token, and
/// maps the response envelopes into a location or the
/// [`ResolverError::NoLocation`] sentinel.
pub struct GeolocationClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GeolocationClient {
    /// Builds a client for the given resolver base URI and bearer token.
    /// The token is injected as a sensitive default header on every request.
    pub fn new(base_uri: &str, token: &str) -> Result<Self, ResolverError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ResolverError::InvalidToken(e.to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let mut base_url = Url::parse(base_uri)?;
        // A trailing slash keeps Url::join from replacing the last segment.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        Ok(Self { http, base_url })
    }

    pub async fn tdoa_single_frame(
        &self,
        frame: &[UplinkRxInfo],
    ) -> Result<ResolvedLocation, ResolverError> {
        let request = TdoaSingleFrameRequest {
            lorawan: frame.iter().map(UplinkTdoa::from_rx_info).collect(),
        };
        let response: Response = self.post("api/v2/tdoa", "v2_tdoa_single", &request).await?;
        location_from_v2(response)
    }

    pub async fn tdoa_multi_frame(
        &self,
        frames: &[Frame],
    ) -> Result<ResolvedLocation, ResolverError> {
        let request = TdoaMultiFrameRequest {
            lorawan: frames
                .iter()
                .map(|frame| frame.iter().map(UplinkTdoa::from_rx_info).collect())
                .collect(),
        };
        let response: Response = self
            .post("api/v2/tdoaMultiframe", "v2_tdoa_multi", &request)
            .await?;
        location_from_v2(response)
    }

    pub async fn rssi_single_frame(
        &self,
        frame: &[UplinkRxInfo],
    ) -> Result<ResolvedLocation, ResolverError> {
        let request = RssiSingleFrameRequest {
            lorawan: frame.iter().map(UplinkRssi::from_rx_info).collect(),
        };
        let response: Response = self.post("api/v2/rssi", "v2_rssi_single", &request).await?;
        location_from_v2(response)
    }

    pub async fn rssi_multi_frame(
        &self,
        frames: &[Frame],
    ) -> Result<ResolvedLocation, ResolverError> {
        let request = RssiMultiFrameRequest {
            lorawan: frames
                .iter()
                .map(|frame| frame.iter().map(UplinkRssi::from_rx_info).collect())
                .collect(),
        };
        let response: Response = self
            .post("api/v2/rssiMultiframe", "v2_rssi_multi", &request)
            .await?;
        location_from_v2(response)
    }

    pub async fn wifi_tdoa_single_frame(
        &self,
        frame: &[UplinkRxInfo],
        access_points: &[WifiAccessPoint],
    ) -> Result<ResolvedLocation, ResolverError> {
        let request = WifiTdoaSingleFrameRequest {
            lorawan: frame
                .iter()
                .map(UplinkTdoa::from_rx_info_without_toa)
                .collect(),
            wifi_access_points: access_points.to_vec(),
        };
        let response: Response = self
            .post("api/v2/loraWifi", "v2_wifi_tdoa_single", &request)
            .await?;
        location_from_v2(response)
    }

    pub async fn gnss_lr1110_single_frame(
        &self,
        frame: &[UplinkRxInfo],
        use_rx_time: bool,
        payload: &[u8],
    ) -> Result<ResolvedLocation, ResolverError> {
        let mut request = GnssLr1110SingleFrameRequest {
            payload: HexBytes(payload.to_vec()),
            ..Default::default()
        };

        if let Some(first) = frame.first() {
            let location = first.location.unwrap_or_default();
            request.gnss_assist_position = Some([location.latitude, location.longitude]);
            request.gnss_assist_altitude = Some(location.altitude);
        }

        if use_rx_time {
            request.gnss_capture_time = frame
                .iter()
                .find_map(|rx| rx.time)
                .map(gps_epoch_seconds);
        }

        let response: V3Response = self
            .post(
                "api/v3/solve/gnss_lr1110_singleframe",
                "v3_gnss_rl1110_single",
                &request,
            )
            .await?;
        location_from_v3(response)
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        endpoint: &'static str,
        body: &B,
    ) -> Result<T, ResolverError> {
        let url = self.base_url.join(path)?;
        debug!(%url, endpoint, "posting geolocation request");

        let start = Instant::now();
        let response = self.http.post(url).json(body).send().await;
        observe_api_duration(endpoint, start.elapsed());

        self.handle_response(response?).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ResolverError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ResolverError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..body.len().min(200)];
            ResolverError::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }
}

fn location_from_v2(response: Response) -> Result<ResolvedLocation, ResolverError> {
    log_resolver_notes(&response.errors, &response.warnings);

    let Some(result) = response.result else {
        return Err(ResolverError::NoLocation);
    };

    Ok(ResolvedLocation {
        latitude: result.latitude,
        longitude: result.longitude,
        altitude: result.altitude,
        accuracy: result.accuracy,
    })
}

fn location_from_v3(response: V3Response) -> Result<ResolvedLocation, ResolverError> {
    log_resolver_notes(&response.errors, &response.warnings);

    let Some(result) = response.result else {
        return Err(ResolverError::NoLocation);
    };

    if result.llh.len() != 3 {
        return Err(ResolverError::Response(format!(
            "llh must contain 3 elements, got {}",
            result.llh.len()
        )));
    }

    Ok(ResolvedLocation {
        latitude: result.llh[0],
        longitude: result.llh[1],
        altitude: result.llh[2],
        accuracy: result.accuracy,
    })
}

fn log_resolver_notes(errors: &[String], warnings: &[String]) {
    if !errors.is_empty() {
        warn!(?errors, "resolver reported errors");
    }
    if !warnings.is_empty() {
        debug!(?warnings, "resolver reported warnings");
    }
}

fn outcome(
    result: Result<ResolvedLocation, ResolverError>,
) -> DomainResult<Option<ResolvedLocation>> {
    match result {
        Ok(location) => Ok(Some(location)),
        Err(ResolverError::NoLocation) => Ok(None),
        Err(err) => Err(DomainError::Resolver(anyhow::Error::new(err))),
    }
}

#[async_trait]
impl GeolocationResolver for GeolocationClient {
    async fn tdoa_single_frame(
        &self,
        frame: &[UplinkRxInfo],
    ) -> DomainResult<Option<ResolvedLocation>> {
        outcome(GeolocationClient::tdoa_single_frame(self, frame).await)
    }

    async fn tdoa_multi_frame(
        &self,
        frames: &[Frame],
    ) -> DomainResult<Option<ResolvedLocation>> {
        outcome(GeolocationClient::tdoa_multi_frame(self, frames).await)
    }

    async fn rssi_single_frame(
        &self,
        frame: &[UplinkRxInfo],
    ) -> DomainResult<Option<ResolvedLocation>> {
        outcome(GeolocationClient::rssi_single_frame(self, frame).await)
    }

    async fn rssi_multi_frame(
        &self,
        frames: &[Frame],
    ) -> DomainResult<Option<ResolvedLocation>> {
        outcome(GeolocationClient::rssi_multi_frame(self, frames).await)
    }

    async fn wifi_tdoa_single_frame(
        &self,
        frame: &[UplinkRxInfo],
        access_points: &[WifiAccessPoint],
    ) -> DomainResult<Option<ResolvedLocation>> {
        outcome(GeolocationClient::wifi_tdoa_single_frame(self, frame, access_points).await)
    }

    async fn gnss_lr1110_single_frame(
        &self,
        frame: &[UplinkRxInfo],
        use_rx_time: bool,
        payload: &[u8],
    ) -> DomainResult<Option<ResolvedLocation>> {
        outcome(
            GeolocationClient::gnss_lr1110_single_frame(self, frame, use_rx_time, payload).await,
        )
    }
}
