use std::fmt;

use serde::{Deserialize, Serialize};

/// EUI-64 identifier, used for both end-devices and gateways.
///
/// Rendered as 16 lower-hex characters on the wire and in log fields.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Eui64(pub [u8; 8]);

impl Eui64 {
    /// Builds an EUI from an opaque byte slice, copying at most 8 bytes.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut id = [0u8; 8];
        let n = bytes.len().min(8);
        id[..n].copy_from_slice(&bytes[..n]);
        Self(id)
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Display for Eui64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Serialize for Eui64 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Eui64 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        if bytes.len() != 8 {
            return Err(serde::de::Error::custom(format!(
                "eui64 must be 8 bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self::from_slice(&bytes))
    }
}

/// WiFi access-point MAC address.
///
/// Rendered as colon-separated lower hex (`01:02:03:04:05:06`), the format
/// the resolver expects.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bssid(pub [u8; 6]);

impl Bssid {
    /// Builds a BSSID from an opaque byte slice, copying at most 6 bytes.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut mac = [0u8; 6];
        let n = bytes.len().min(6);
        mac[..n].copy_from_slice(&bytes[..n]);
        Self(mac)
    }
}

impl fmt::Display for Bssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl Serialize for Bssid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Bssid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let mut mac = [0u8; 6];
        let mut parts = s.split(':');
        for byte in mac.iter_mut() {
            let part = parts
                .next()
                .ok_or_else(|| serde::de::Error::custom("bssid must contain 6 octets"))?;
            *byte = u8::from_str_radix(part, 16).map_err(serde::de::Error::custom)?;
        }
        if parts.next().is_some() {
            return Err(serde::de::Error::custom("bssid must contain 6 octets"));
        }
        Ok(Self(mac))
    }
}

/// Position of the receiving gateway antenna.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AntennaLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

/// One gateway's reception of one uplink frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UplinkRxInfo {
    pub gateway_id: Eui64,
    /// Opaque id, unique per reception. Flows back out on location events.
    pub uplink_id: Vec<u8>,
    pub time: Option<chrono::DateTime<chrono::Utc>>,
    pub rssi: i32,
    pub snr: f64,
    pub location: Option<AntennaLocation>,
    /// Sub-microsecond time of arrival, present on TDOA-capable gateways.
    pub fine_timestamp_nanos: Option<u64>,
}

/// One uplink as received by one or more gateways, in reception order.
pub type Frame = Vec<UplinkRxInfo>;

/// WiFi access point reported by the end-device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiAccessPoint {
    pub mac_address: Bssid,
    /// Signal strength in dBm.
    pub signal_strength: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eui64_display_and_serde_round_trip() {
        let eui = Eui64([1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(eui.to_string(), "0102030405060708");

        let json = serde_json::to_string(&eui).unwrap();
        assert_eq!(json, r#""0102030405060708""#);
        assert_eq!(serde_json::from_str::<Eui64>(&json).unwrap(), eui);
    }

    #[test]
    fn eui64_from_short_slice_zero_pads() {
        let eui = Eui64::from_slice(&[1, 2, 3]);
        assert_eq!(eui.0, [1, 2, 3, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn eui64_rejects_wrong_length() {
        assert!(serde_json::from_str::<Eui64>(r#""0102""#).is_err());
    }

    #[test]
    fn bssid_serializes_as_colon_hex() {
        let bssid = Bssid([0x01, 0x02, 0x03, 0xaa, 0xbb, 0xcc]);
        let json = serde_json::to_string(&bssid).unwrap();
        assert_eq!(json, r#""01:02:03:aa:bb:cc""#);
        assert_eq!(serde_json::from_str::<Bssid>(&json).unwrap(), bssid);
    }

    #[test]
    fn bssid_rejects_wrong_octet_count() {
        assert!(serde_json::from_str::<Bssid>(r#""01:02:03""#).is_err());
        assert!(serde_json::from_str::<Bssid>(r#""01:02:03:04:05:06:07""#).is_err());
    }

    #[test]
    fn wifi_access_point_uses_camel_case_keys() {
        let ap = WifiAccessPoint {
            mac_address: Bssid([1, 1, 1, 1, 1, 1]),
            signal_strength: -10,
        };
        let json = serde_json::to_value(ap).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"macAddress": "01:01:01:01:01:01", "signalStrength": -10})
        );
    }
}
