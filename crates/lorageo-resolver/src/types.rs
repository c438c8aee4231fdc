use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lorageo_domain::{AntennaLocation, Eui64, UplinkRxInfo, WifiAccessPoint};

/// Binary payload carried as a lower-hex string on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl Serialize for HexBytes {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map(HexBytes).map_err(serde::de::Error::custom)
    }
}

/// One reception in a TDOA request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UplinkTdoa {
    pub gateway_id: Eui64,
    pub rssi: i32,
    pub snr: f64,
    /// Time of arrival in nanoseconds, from the gateway fine timestamp.
    pub toa: u64,
    pub antenna_location: AntennaLocation,
}

impl UplinkTdoa {
    pub fn from_rx_info(rx: &UplinkRxInfo) -> Self {
        Self {
            gateway_id: rx.gateway_id,
            rssi: rx.rssi,
            snr: rx.snr,
            toa: rx.fine_timestamp_nanos.unwrap_or(0),
            antenna_location: rx.location.unwrap_or_default(),
        }
    }

    /// WiFi requests carry the reception without a time of arrival, even
    /// when the gateway reported a fine timestamp.
    pub fn from_rx_info_without_toa(rx: &UplinkRxInfo) -> Self {
        Self {
            toa: 0,
            ..Self::from_rx_info(rx)
        }
    }
}

/// One reception in an RSSI request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UplinkRssi {
    pub gateway_id: Eui64,
    pub rssi: i32,
    pub snr: f64,
    pub antenna_location: AntennaLocation,
}

impl UplinkRssi {
    pub fn from_rx_info(rx: &UplinkRxInfo) -> Self {
        Self {
            gateway_id: rx.gateway_id,
            rssi: rx.rssi,
            snr: rx.snr,
            antenna_location: rx.location.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdoaSingleFrameRequest {
    pub lorawan: Vec<UplinkTdoa>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdoaMultiFrameRequest {
    pub lorawan: Vec<Vec<UplinkTdoa>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssiSingleFrameRequest {
    pub lorawan: Vec<UplinkRssi>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssiMultiFrameRequest {
    pub lorawan: Vec<Vec<UplinkRssi>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiTdoaSingleFrameRequest {
    pub lorawan: Vec<UplinkTdoa>,
    pub wifi_access_points: Vec<WifiAccessPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GnssLr1110SingleFrameRequest {
    pub payload: HexBytes,

    /// Capture time in seconds since the GPS epoch; included only when the
    /// integration is configured to use the reception time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gnss_capture_time: Option<f64>,

    /// `[latitude, longitude]` of the assisting gateway antenna.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gnss_assist_position: Option<[f64; 2]>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gnss_assist_altitude: Option<f64>,
}

/// v2 response envelope. Unknown fields are tolerated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub result: Option<LocationResult>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationResult {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    #[serde(default)]
    pub accuracy: f64,
}

/// v3 (GNSS solver) response envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct V3Response {
    #[serde(default)]
    pub result: Option<LocationSolverResult>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationSolverResult {
    /// `[latitude, longitude, altitude]`.
    #[serde(default)]
    pub llh: Vec<f64>,
    #[serde(default)]
    pub accuracy: f64,
}

const GPS_UNIX_EPOCH_SECONDS: i64 = 315_964_800;

/// UTC runs behind GPS time by the accumulated leap seconds.
const GPS_LEAP_SECONDS: i64 = 18;

/// Seconds since the GPS epoch (1980-01-06T00:00:00Z) for a wall-clock time.
pub fn gps_epoch_seconds(time: DateTime<Utc>) -> f64 {
    (time.timestamp() - GPS_UNIX_EPOCH_SECONDS + GPS_LEAP_SECONDS) as f64
}
