use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::context::RequestContext;
use crate::error::DomainResult;
use crate::event::{
    AckEvent, DataDownPayload, ErrorEvent, JoinEvent, LocationEvent, StatusEvent, TxAckEvent,
    UplinkEvent,
};

/// Opaque per-delivery variables attached by the host; passed through to
/// derived events untouched.
pub type Vars = HashMap<String, String>;

/// Receiving side of derived events: the host dispatcher re-enters the
/// integration bus through this surface. Failures are non-fatal to the
/// originating event.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn handle_location_event(
        &self,
        ctx: &RequestContext,
        vars: &Vars,
        event: LocationEvent,
    ) -> DomainResult<()>;
}

/// Event-handler contract consumed by the host dispatcher.
///
/// Handlers must be reentrant: the dispatcher invokes them from multiple
/// concurrent contexts, one per in-flight event.
#[async_trait]
pub trait IntegrationHandler: Send + Sync {
    async fn handle_uplink_event(
        &self,
        ctx: &RequestContext,
        sink: &dyn EventSink,
        vars: &Vars,
        event: UplinkEvent,
    ) -> DomainResult<()>;

    async fn handle_join_event(
        &self,
        ctx: &RequestContext,
        sink: &dyn EventSink,
        vars: &Vars,
        event: JoinEvent,
    ) -> DomainResult<()>;

    async fn handle_ack_event(
        &self,
        ctx: &RequestContext,
        sink: &dyn EventSink,
        vars: &Vars,
        event: AckEvent,
    ) -> DomainResult<()>;

    async fn handle_error_event(
        &self,
        ctx: &RequestContext,
        sink: &dyn EventSink,
        vars: &Vars,
        event: ErrorEvent,
    ) -> DomainResult<()>;

    async fn handle_status_event(
        &self,
        ctx: &RequestContext,
        sink: &dyn EventSink,
        vars: &Vars,
        event: StatusEvent,
    ) -> DomainResult<()>;

    async fn handle_location_event(
        &self,
        ctx: &RequestContext,
        sink: &dyn EventSink,
        vars: &Vars,
        event: LocationEvent,
    ) -> DomainResult<()>;

    async fn handle_tx_ack_event(
        &self,
        ctx: &RequestContext,
        sink: &dyn EventSink,
        vars: &Vars,
        event: TxAckEvent,
    ) -> DomainResult<()>;

    /// Sender for downlink payloads, when the integration accepts them.
    fn data_down_chan(&self) -> Option<mpsc::UnboundedSender<DataDownPayload>>;

    async fn close(&self) -> DomainResult<()>;
}
