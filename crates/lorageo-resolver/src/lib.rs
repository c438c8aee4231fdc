pub mod client;
pub mod error;
mod metrics;
pub mod types;

pub use client::{GeolocationClient, DEFAULT_RESOLVER_URI};
pub use error::ResolverError;
pub use types::{
    gps_epoch_seconds, GnssLr1110SingleFrameRequest, HexBytes, LocationResult,
    LocationSolverResult, Response, RssiMultiFrameRequest, RssiSingleFrameRequest,
    TdoaMultiFrameRequest, TdoaSingleFrameRequest, UplinkRssi, UplinkTdoa, V3Response,
    WifiTdoaSingleFrameRequest,
};
