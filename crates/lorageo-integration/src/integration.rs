use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::error;

use lorageo_domain::{
    AckEvent, Config, DataDownPayload, DomainResult, ErrorEvent, EventSink, FrameBufferStore,
    GeolocationResolver, GeolocationService, IntegrationHandler, JoinEvent, LocationEvent,
    RequestContext, StatusEvent, TxAckEvent, UplinkEvent, Vars,
};
use lorageo_resolver::{GeolocationClient, ResolverError};

use crate::settings::Settings;

/// Egress-side geolocation integration.
///
/// Subscribes to uplink events, consults the external resolver, and emits
/// derived location events back into the integration bus. Every other event
/// kind is accepted without effect.
pub struct GeolocationIntegration {
    config: Config,
    service: GeolocationService,
}

impl GeolocationIntegration {
    /// Builds the integration with explicit collaborators.
    pub fn new(
        config: Config,
        store: Arc<dyn FrameBufferStore>,
        resolver: Arc<dyn GeolocationResolver>,
    ) -> Self {
        let service = GeolocationService::new(config.clone(), store, resolver);
        Self { config, service }
    }

    /// Builds the integration against the configured resolver endpoint,
    /// authenticating with the application's geolocation token.
    pub fn from_settings(
        config: Config,
        settings: &Settings,
        store: Arc<dyn FrameBufferStore>,
    ) -> Result<Self, ResolverError> {
        let client = GeolocationClient::new(&settings.resolver_uri, &config.geolocation_token)?;
        Ok(Self::new(config, store, Arc::new(client)))
    }
}

#[async_trait]
impl IntegrationHandler for GeolocationIntegration {
    async fn handle_uplink_event(
        &self,
        ctx: &RequestContext,
        sink: &dyn EventSink,
        vars: &Vars,
        event: UplinkEvent,
    ) -> DomainResult<()> {
        if !self.config.geolocation {
            return Ok(());
        }

        let Some(location_event) = self.service.locate(ctx, &event).await? else {
            return Ok(());
        };

        // The location side-channel is best effort: a sink failure never
        // fails the uplink.
        if let Err(err) = sink.handle_location_event(ctx, vars, location_event).await {
            error!(
                error = %err,
                dev_eui = %event.dev_eui,
                ctx_id = %ctx.id(),
                "delivering location event failed"
            );
        }

        Ok(())
    }

    async fn handle_join_event(
        &self,
        _ctx: &RequestContext,
        _sink: &dyn EventSink,
        _vars: &Vars,
        _event: JoinEvent,
    ) -> DomainResult<()> {
        Ok(())
    }

    async fn handle_ack_event(
        &self,
        _ctx: &RequestContext,
        _sink: &dyn EventSink,
        _vars: &Vars,
        _event: AckEvent,
    ) -> DomainResult<()> {
        Ok(())
    }

    async fn handle_error_event(
        &self,
        _ctx: &RequestContext,
        _sink: &dyn EventSink,
        _vars: &Vars,
        _event: ErrorEvent,
    ) -> DomainResult<()> {
        Ok(())
    }

    async fn handle_status_event(
        &self,
        _ctx: &RequestContext,
        _sink: &dyn EventSink,
        _vars: &Vars,
        _event: StatusEvent,
    ) -> DomainResult<()> {
        Ok(())
    }

    async fn handle_location_event(
        &self,
        _ctx: &RequestContext,
        _sink: &dyn EventSink,
        _vars: &Vars,
        _event: LocationEvent,
    ) -> DomainResult<()> {
        Ok(())
    }

    async fn handle_tx_ack_event(
        &self,
        _ctx: &RequestContext,
        _sink: &dyn EventSink,
        _vars: &Vars,
        _event: TxAckEvent,
    ) -> DomainResult<()> {
        Ok(())
    }

    fn data_down_chan(&self) -> Option<mpsc::UnboundedSender<DataDownPayload>> {
        None
    }

    async fn close(&self) -> DomainResult<()> {
        Ok(())
    }
}
