use std::sync::Arc;

use chrono_tz::Tz;

use crate::booking::SlotCatalog;
use crate::notify::{build_sink, MessageComposer};
use crate::source::google_api::GoogleCalendarClient;
use crate::source::google_auth::GoogleAuthenticator;
use crate::source::{
    AvailabilityLoader, AvailabilitySource, CalendarWriter, ExternalCalendarAdapter, MockGenerator,
    MockProfile,
};
use crate::storage::config::{Config, ConfigError, GoogleConfig};
use crate::submission::BookingFlow;

/// Everything the front ends need, wired from one config.
pub struct Services {
    pub loader: Arc<AvailabilityLoader>,
    pub flow: Arc<BookingFlow>,
    pub catalog: SlotCatalog,
    pub tz: Tz,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceOptions {
    pub force_mock: bool,
    pub seed: Option<u64>,
}

/// Connects to the venue calendar with the cached token. `None` means the
/// integration is inactive and availability comes from the mock source.
pub async fn connect_calendar(google: &GoogleConfig, tz: Tz) -> Option<Arc<ExternalCalendarAdapter>> {
    if !google.is_configured() {
        tracing::info!("Google credentials not configured, using mock availability");
        return None;
    }

    let auth = GoogleAuthenticator::new(google.clone());
    match auth.get_valid_token().await {
        Ok(token) => {
            tracing::info!("Connected to calendar {}", google.calendar_id);
            let client = GoogleCalendarClient::new(token.access_token)
                .with_base_url(google.api_base_url.clone());
            Some(Arc::new(ExternalCalendarAdapter::new(
                Arc::new(client),
                google.calendar_id.clone(),
                tz,
            )))
        }
        Err(e) => {
            tracing::warn!("Calendar integration inactive: {}", e);
            None
        }
    }
}

pub async fn build_services(config: &Config, options: &ServiceOptions) -> Result<Services, ConfigError> {
    let tz = config.booking.tz()?;
    let catalog = config.booking.catalog()?;
    let timeout = config.booking.source_timeout();

    let external = if options.force_mock {
        tracing::info!("Mock availability forced");
        None
    } else {
        connect_calendar(&config.google, tz).await
    };

    let seed = options.seed.or(config.mock.seed);
    let mock = Arc::new(MockGenerator::new(catalog.clone(), tz, MockProfile::default(), seed));

    let primary = external.clone().map(|a| a as Arc<dyn AvailabilitySource>);
    let loader = AvailabilityLoader::new(primary, mock, catalog.clone(), tz)
        .with_timeout(timeout)
        .with_window_days(config.booking.window_days);

    let writer = external.map(|a| a as Arc<dyn CalendarWriter>);
    let flow = BookingFlow::new(
        writer,
        build_sink(&config.notification),
        MessageComposer::new(&config.notification),
        catalog.clone(),
        config.event.clone(),
        tz,
    )
    .with_timeout(timeout);

    Ok(Services {
        loader: Arc::new(loader),
        flow: Arc::new(flow),
        catalog,
        tz,
    })
}
