use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Geolocation integration configuration.
///
/// Stored by the host server as a JSON document per application; unknown
/// keys are ignored. Captured at integration construction and read-only
/// afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Master enable for the geolocation pipeline.
    pub geolocation: bool,

    /// Bearer token for the geolocation resolver.
    pub geolocation_token: String,

    /// Buffer TTL in seconds. Zero disables cross-frame buffering, making
    /// every resolution single-frame.
    #[serde(rename = "geolocationBufferTTL")]
    pub geolocation_buffer_ttl: u64,

    /// Minimum number of buffered frames before TDOA / RSSI fires.
    pub geolocation_min_buffer_size: usize,

    #[serde(rename = "geolocationTDOA")]
    pub geolocation_tdoa: bool,

    #[serde(rename = "geolocationRSSI")]
    pub geolocation_rssi: bool,

    #[serde(rename = "geolocationGNSS")]
    pub geolocation_gnss: bool,

    /// Object field holding the base64 GNSS (LR1110) scan payload.
    #[serde(rename = "geolocationGNSSPayloadField")]
    pub geolocation_gnss_payload_field: String,

    /// Include the reception timestamp as the GNSS capture time.
    #[serde(rename = "geolocationGNSSUseRxTime")]
    pub geolocation_gnss_use_rx_time: bool,

    pub geolocation_wifi: bool,

    /// Object field holding the reported WiFi access points.
    pub geolocation_wifi_payload_field: String,
}

impl Config {
    pub fn buffer_ttl(&self) -> Duration {
        Duration::from_secs(self.geolocation_buffer_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_document() {
        let config: Config = serde_json::from_str(
            r#"{
                "geolocation": true,
                "geolocationToken": "secret",
                "geolocationBufferTTL": 60,
                "geolocationMinBufferSize": 2,
                "geolocationTDOA": true,
                "geolocationRSSI": false,
                "geolocationGNSS": true,
                "geolocationGNSSPayloadField": "lr1110_gnss",
                "geolocationGNSSUseRxTime": true,
                "geolocationWifi": true,
                "geolocationWifiPayloadField": "wifi_aps"
            }"#,
        )
        .unwrap();

        assert!(config.geolocation);
        assert_eq!(config.geolocation_token, "secret");
        assert_eq!(config.geolocation_buffer_ttl, 60);
        assert_eq!(config.geolocation_min_buffer_size, 2);
        assert!(config.geolocation_tdoa);
        assert!(!config.geolocation_rssi);
        assert!(config.geolocation_gnss);
        assert_eq!(config.geolocation_gnss_payload_field, "lr1110_gnss");
        assert!(config.geolocation_gnss_use_rx_time);
        assert!(config.geolocation_wifi);
        assert_eq!(config.geolocation_wifi_payload_field, "wifi_aps");
        assert_eq!(config.buffer_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn missing_and_unknown_keys_are_tolerated() {
        let config: Config =
            serde_json::from_str(r#"{"geolocation": true, "marshaler": "protobuf"}"#).unwrap();

        assert!(config.geolocation);
        assert!(!config.geolocation_tdoa);
        assert_eq!(config.geolocation_min_buffer_size, 0);
        assert_eq!(config.buffer_ttl(), Duration::ZERO);
    }
}
