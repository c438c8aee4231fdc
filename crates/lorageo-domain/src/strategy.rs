use tracing::{debug, error};

use crate::config::Config;
use crate::context::RequestContext;
use crate::event::{LocationSource, UplinkEvent};
use crate::filters::filter_on_fine_timestamp;
use crate::object_fields::{gnss_payload, wifi_access_points};
use crate::types::{Frame, WifiAccessPoint};

/// Fine-timestamped receptions a frame needs before TDOA can use it.
pub const TDOA_MIN_FINE_TIMESTAMPS: usize = 3;

/// Resolution strategy selected for one uplink.
///
/// Strategies form a precedence, not a retry ladder: at most one is
/// attempted per uplink, and a resolver "no location" outcome never falls
/// through to a lower-priority strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Gnss { payload: Vec<u8> },
    Wifi { access_points: Vec<WifiAccessPoint> },
    Tdoa { frames: Vec<Frame> },
    Rssi { frames: Vec<Frame> },
}

impl Strategy {
    /// Source tag for a location produced by this strategy.
    pub fn source(&self) -> LocationSource {
        match self {
            Strategy::Gnss { .. } => LocationSource::GeoResolverGnss,
            Strategy::Wifi { .. } => LocationSource::GeoResolverWifi,
            Strategy::Tdoa { .. } => LocationSource::GeoResolverTdoa,
            Strategy::Rssi { .. } => LocationSource::GeoResolverRssi,
        }
    }

    /// Uplink ids of every reception that will reach the resolver, in
    /// request order. Empty for GNSS and WiFi, which resolve the current
    /// frame only.
    pub fn uplink_ids(&self) -> Vec<Vec<u8>> {
        match self {
            Strategy::Tdoa { frames } | Strategy::Rssi { frames } => frames
                .iter()
                .flat_map(|frame| frame.iter().map(|rx| rx.uplink_id.clone()))
                .collect(),
            Strategy::Gnss { .. } | Strategy::Wifi { .. } => Vec::new(),
        }
    }
}

/// Picks the resolution strategy for one uplink: GNSS, then WiFi, then
/// buffered TDOA, then buffered RSSI; the first that can produce an attempt
/// wins.
///
/// A malformed object field aborts selection entirely (logged, never an
/// error); an absent field merely passes priority to the next strategy.
pub fn select_strategy(
    ctx: &RequestContext,
    config: &Config,
    buffer: &[Frame],
    uplink: &UplinkEvent,
) -> Option<Strategy> {
    if config.geolocation_gnss {
        match gnss_payload(&config.geolocation_gnss_payload_field, &uplink.object_json) {
            Err(err) => {
                error!(
                    error = %err,
                    dev_eui = %uplink.dev_eui,
                    ctx_id = %ctx.id(),
                    payload_field = %config.geolocation_gnss_payload_field,
                    "reading gnss payload from object failed"
                );
                return None;
            }
            Ok(payload) if payload.is_empty() => {
                debug!(
                    dev_eui = %uplink.dev_eui,
                    ctx_id = %ctx.id(),
                    payload_field = %config.geolocation_gnss_payload_field,
                    "no gnss payload found in object"
                );
            }
            Ok(payload) => return Some(Strategy::Gnss { payload }),
        }
    }

    if config.geolocation_wifi {
        match wifi_access_points(&config.geolocation_wifi_payload_field, &uplink.object_json) {
            Err(err) => {
                error!(
                    error = %err,
                    dev_eui = %uplink.dev_eui,
                    ctx_id = %ctx.id(),
                    payload_field = %config.geolocation_wifi_payload_field,
                    "reading wifi access-points from object failed"
                );
                return None;
            }
            Ok(access_points) if access_points.is_empty() => {
                debug!(
                    dev_eui = %uplink.dev_eui,
                    ctx_id = %ctx.id(),
                    payload_field = %config.geolocation_wifi_payload_field,
                    "no wifi access-points found in object"
                );
            }
            Ok(access_points) => return Some(Strategy::Wifi { access_points }),
        }
    }

    let min_frames = config.geolocation_min_buffer_size.max(1);

    if config.geolocation_tdoa {
        let frames = filter_on_fine_timestamp(buffer, TDOA_MIN_FINE_TIMESTAMPS);
        if frames.len() < min_frames {
            debug!(
                dev_eui = %uplink.dev_eui,
                ctx_id = %ctx.id(),
                tdoa_suitable_frames = frames.len(),
                "not enough buffered meta-data for tdoa geolocation"
            );
        } else {
            return Some(Strategy::Tdoa { frames });
        }
    }

    if config.geolocation_rssi {
        if buffer.len() < min_frames {
            debug!(
                dev_eui = %uplink.dev_eui,
                ctx_id = %ctx.id(),
                frames = buffer.len(),
                "not enough buffered meta-data for rssi geolocation"
            );
        } else {
            return Some(Strategy::Rssi {
                frames: buffer.to_vec(),
            });
        }
    }

    None
}
