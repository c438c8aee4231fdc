pub mod buffer;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod filters;
pub mod geolocation_service;
pub mod handler;
pub mod in_memory_buffer;
pub mod object_fields;
pub mod resolver;
pub mod strategy;
pub mod types;

pub use buffer::FrameBufferStore;
pub use config::Config;
pub use context::RequestContext;
pub use error::{DomainError, DomainResult};
pub use event::*;
pub use filters::filter_on_fine_timestamp;
pub use geolocation_service::GeolocationService;
pub use handler::{EventSink, IntegrationHandler, Vars};
pub use in_memory_buffer::InMemoryFrameBufferStore;
pub use object_fields::{gnss_payload, wifi_access_points, ObjectFieldError};
pub use resolver::{GeolocationResolver, ResolvedLocation};
pub use strategy::{select_strategy, Strategy};
pub use types::*;
