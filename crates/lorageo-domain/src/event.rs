use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Eui64, Frame};

/// Uplink event as delivered by the host dispatcher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UplinkEvent {
    pub application_id: u64,
    pub application_name: String,
    pub device_name: String,
    pub dev_eui: Eui64,
    pub f_cnt: u32,
    /// Per-gateway receptions of this uplink, in reception order.
    pub rx_info: Frame,
    /// Device-decoded payload as a JSON object string; may be empty.
    pub object_json: String,
    pub tags: HashMap<String, String>,
}

/// Provenance of a resolved location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationSource {
    GeoResolverTdoa,
    GeoResolverRssi,
    GeoResolverGnss,
    GeoResolverWifi,
}

/// A geographic fix with provenance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub accuracy: f64,
    pub source: LocationSource,
}

/// Derived location event, emitted back into the integration bus.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationEvent {
    pub application_id: u64,
    pub application_name: String,
    pub device_name: String,
    pub dev_eui: Eui64,
    pub tags: HashMap<String, String>,
    /// Ids of every reception sent to the resolver, in request order.
    /// Empty for GNSS and WiFi fixes.
    pub uplink_ids: Vec<Vec<u8>>,
    /// Frame counter of the triggering uplink; populated only when
    /// `uplink_ids` is empty.
    pub f_cnt: u32,
    pub location: Location,
}

/// OTAA join event. Accepted by this integration without effect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinEvent {
    pub application_id: u64,
    pub application_name: String,
    pub device_name: String,
    pub dev_eui: Eui64,
    pub dev_addr: Vec<u8>,
    pub rx_info: Frame,
}

/// Downlink acknowledgement event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AckEvent {
    pub application_id: u64,
    pub device_name: String,
    pub dev_eui: Eui64,
    pub acknowledged: bool,
    pub f_cnt: u32,
}

/// Device or network error event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorEvent {
    pub application_id: u64,
    pub device_name: String,
    pub dev_eui: Eui64,
    pub error: String,
}

/// Device-status event (battery and link margin).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusEvent {
    pub application_id: u64,
    pub device_name: String,
    pub dev_eui: Eui64,
    pub margin: i32,
    pub battery_level_unavailable: bool,
    pub battery_level: f32,
}

/// Downlink transmission acknowledgement from the gateway.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TxAckEvent {
    pub application_id: u64,
    pub device_name: String,
    pub dev_eui: Eui64,
    pub f_cnt: u32,
}

/// Downlink payload accepted over an integration's downlink channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataDownPayload {
    pub application_id: u64,
    pub dev_eui: Eui64,
    pub confirmed: bool,
    pub f_port: u8,
    pub data: Vec<u8>,
}
