use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::ReservationEvent;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Calendar not found: {0}")]
    NotFound(String),
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Start or end of a remote event. All-day events only carry a date.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteEvent {
    pub id: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
}

#[derive(Debug, Clone)]
pub struct CreatedEventInfo {
    pub id: String,
    pub html_link: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GoogleEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    start: GoogleDateTime,
    end: GoogleDateTime,
    #[serde(rename = "colorId", skip_serializing_if = "Option::is_none")]
    color_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reminders: Option<GoogleReminders>,
    #[serde(rename = "htmlLink", skip_serializing_if = "Option::is_none")]
    html_link: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GoogleDateTime {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GoogleReminders {
    #[serde(rename = "useDefault")]
    use_default: bool,
    overrides: Vec<GoogleReminder>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GoogleReminder {
    method: String,
    minutes: u32,
}

const PAGE_SIZE: &str = "250";

#[derive(Debug, Deserialize)]
struct EventListResponse {
    items: Option<Vec<GoogleEvent>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<RemoteEvent>, ApiError>;

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &ReservationEvent,
    ) -> Result<CreatedEventInfo, ApiError>;
}

pub struct GoogleCalendarClient {
    base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl GoogleCalendarClient {
    pub fn new(access_token: String) -> Self {
        Self {
            base_url: "https://www.googleapis.com/calendar/v3".to_string(),
            access_token,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        )
    }

    async fn fetch_page(
        &self,
        url: &str,
        calendar_id: &str,
        time_min: &str,
        time_max: &str,
        page_token: Option<&str>,
    ) -> Result<EventListResponse, ApiError> {
        let mut query = vec![
            ("timeMin", time_min),
            ("timeMax", time_max),
            ("singleEvents", "true"),
            ("orderBy", "startTime"),
            ("maxResults", PAGE_SIZE),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self.client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        tracing::info!("List events response status: {}", status);

        if status == 401 {
            tracing::error!("Authentication failed when listing events");
            return Err(ApiError::AuthenticationFailed);
        }

        if status == 404 {
            tracing::error!("Calendar not found: {}", calendar_id);
            return Err(ApiError::NotFound(calendar_id.to_string()));
        }

        if status == 429 {
            tracing::warn!("Rate limit exceeded");
            return Err(ApiError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("Failed to list events. Status: {}, Body: {}", status, body);
            return Err(ApiError::RequestError(format!("Status {}: {}", status, body)));
        }

        Ok(response.json().await?)
    }

    fn convert_from_google_event(ge: GoogleEvent) -> Result<RemoteEvent, ApiError> {
        Ok(RemoteEvent {
            id: ge.id,
            start: parse_event_time(&ge.start, "start")?,
            end: parse_event_time(&ge.end, "end")?,
        })
    }

    fn convert_to_google_event(event: &ReservationEvent) -> GoogleEvent {
        let time_zone = Some(event.timezone().to_string());
        GoogleEvent {
            id: None,
            summary: Some(event.title.clone()),
            description: Some(event.description.clone()),
            location: Some(event.location.clone()),
            start: GoogleDateTime {
                date_time: Some(event.start.to_rfc3339()),
                date: None,
                time_zone: time_zone.clone(),
            },
            end: GoogleDateTime {
                date_time: Some(event.end.to_rfc3339()),
                date: None,
                time_zone,
            },
            color_id: event.color_id.clone(),
            reminders: Some(GoogleReminders {
                use_default: false,
                overrides: vec![
                    GoogleReminder { method: "email".to_string(), minutes: 24 * 60 },
                    GoogleReminder { method: "popup".to_string(), minutes: 60 },
                ],
            }),
            html_link: None,
        }
    }
}

fn parse_event_time(value: &GoogleDateTime, field: &str) -> Result<EventTime, ApiError> {
    if let Some(raw) = &value.date_time {
        let parsed = DateTime::parse_from_rfc3339(raw)
            .map_err(|e| ApiError::ParseError(format!("Invalid {} time: {}", field, e)))?;
        return Ok(EventTime::DateTime(parsed.with_timezone(&Utc)));
    }

    if let Some(raw) = &value.date {
        let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| ApiError::ParseError(format!("Invalid {} date: {}", field, e)))?;
        return Ok(EventTime::Date(parsed));
    }

    Err(ApiError::ParseError(format!("Missing {} dateTime/date", field)))
}

#[async_trait]
impl CalendarApi for GoogleCalendarClient {
    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<RemoteEvent>, ApiError> {
        let url = self.events_url(calendar_id);
        let time_min = time_min.to_rfc3339();
        let time_max = time_max.to_rfc3339();

        tracing::info!("Fetching busy events from {} to {}", time_min, time_max);

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self
                .fetch_page(&url, calendar_id, &time_min, &time_max, page_token.as_deref())
                .await?;

            events.extend(page.items.unwrap_or_default().into_iter().filter_map(|ge| {
                match Self::convert_from_google_event(ge) {
                    Ok(event) => Some(event),
                    Err(e) => {
                        tracing::warn!("Skipping unparseable event: {}", e);
                        None
                    }
                }
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::info!("Fetched {} events successfully", events.len());
        Ok(events)
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &ReservationEvent,
    ) -> Result<CreatedEventInfo, ApiError> {
        let url = self.events_url(calendar_id);
        let google_event = Self::convert_to_google_event(event);

        tracing::info!("Creating reservation event on {}", event.start);
        tracing::debug!("POST {} with payload: {:?}", url, google_event);

        let response = self.client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&google_event)
            .send()
            .await?;

        let status = response.status();
        tracing::info!("Create event response status: {}", status);

        if status == 401 {
            tracing::error!("Authentication failed when creating event");
            return Err(ApiError::AuthenticationFailed);
        }

        if !status.is_success() {
            let body = response.text().await?;
            tracing::error!("Failed to create event. Status: {}, Body: {}", status, body);
            return Err(ApiError::RequestError(format!("Status {}: {}", status, body)));
        }

        let created_event: GoogleEvent = response.json().await?;
        let id = created_event.id
            .ok_or_else(|| ApiError::ParseError("Created event has no id".to_string()))?;
        tracing::info!("Event created successfully with ID: {}", id);

        Ok(CreatedEventInfo {
            id,
            html_link: created_event.html_link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::Chicago;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GoogleCalendarClient {
        GoogleCalendarClient::new("token".to_string()).with_base_url(server.uri())
    }

    fn reservation() -> ReservationEvent {
        ReservationEvent {
            title: "Reservation".to_string(),
            description: "Play area".to_string(),
            location: "Cafe".to_string(),
            color_id: Some("4".to_string()),
            start: Chicago.with_ymd_and_hms(2025, 7, 4, 14, 0, 0).unwrap(),
            end: Chicago.with_ymd_and_hms(2025, 7, 4, 17, 0, 0).unwrap(),
        }
    }

    #[test]
    fn google_calendar_client_has_default_base_url() {
        let client = GoogleCalendarClient::new("token".to_string());
        assert_eq!(client.base_url, "https://www.googleapis.com/calendar/v3");
    }

    #[test]
    fn calendar_id_is_url_encoded() {
        let client = GoogleCalendarClient::new("token".to_string())
            .with_base_url("http://localhost:8080".to_string());
        assert_eq!(
            client.events_url("venue@group.calendar.google.com"),
            "http://localhost:8080/calendars/venue%40group.calendar.google.com/events"
        );
    }

    #[test]
    fn outgoing_event_carries_timezone_and_reminders() {
        let google_event = GoogleCalendarClient::convert_to_google_event(&reservation());

        assert_eq!(google_event.start.time_zone.as_deref(), Some("America/Chicago"));
        assert_eq!(google_event.start.date_time.as_deref(), Some("2025-07-04T14:00:00-05:00"));
        let reminders = google_event.reminders.unwrap();
        assert_eq!(reminders.overrides.len(), 2);
        assert_eq!(reminders.overrides[0].minutes, 1440);
    }

    #[tokio::test]
    async fn list_events_parses_timed_and_all_day_events() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(header("authorization", "Bearer token"))
            .and(query_param("singleEvents", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {
                        "id": "timed",
                        "start": { "dateTime": "2025-07-04T10:30:00-05:00" },
                        "end": { "dateTime": "2025-07-04T11:30:00-05:00" }
                    },
                    {
                        "id": "all-day",
                        "start": { "date": "2025-07-05" },
                        "end": { "date": "2025-07-06" }
                    },
                    {
                        "id": "broken",
                        "start": {},
                        "end": {}
                    }
                ]
            })))
            .mount(&server)
            .await;

        let events = client_for(&server)
            .list_events("primary", Utc::now(), Utc::now())
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].start,
            EventTime::DateTime(Utc.with_ymd_and_hms(2025, 7, 4, 15, 30, 0).unwrap())
        );
        assert_eq!(
            events[1].start,
            EventTime::Date(NaiveDate::from_ymd_opt(2025, 7, 5).unwrap())
        );
    }

    #[tokio::test]
    async fn list_events_follows_next_page_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param_is_missing("pageToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "first",
                    "start": { "dateTime": "2025-07-04T10:00:00-05:00" },
                    "end": { "dateTime": "2025-07-04T11:00:00-05:00" }
                }],
                "nextPageToken": "p2"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param("pageToken", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "id": "second",
                    "start": { "dateTime": "2025-09-20T18:00:00-05:00" },
                    "end": { "dateTime": "2025-09-20T20:00:00-05:00" }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let events = client_for(&server)
            .list_events("primary", Utc::now(), Utc::now())
            .await
            .unwrap();

        let ids: Vec<_> = events.iter().map(|e| e.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("first"), Some("second")]);
    }

    #[tokio::test]
    async fn list_events_maps_unauthorized_to_authentication_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .list_events("primary", Utc::now(), Utc::now())
            .await;

        assert!(matches!(result, Err(ApiError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn list_events_maps_missing_calendar_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .list_events("missing", Utc::now(), Utc::now())
            .await;

        assert!(matches!(result, Err(ApiError::NotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn insert_event_returns_created_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(body_partial_json(json!({
                "summary": "Reservation",
                "colorId": "4",
                "start": { "timeZone": "America/Chicago" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "evt_1",
                "htmlLink": "https://calendar.example/evt_1",
                "start": { "dateTime": "2025-07-04T14:00:00-05:00" },
                "end": { "dateTime": "2025-07-04T17:00:00-05:00" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = client_for(&server)
            .insert_event("primary", &reservation())
            .await
            .unwrap();

        assert_eq!(created.id, "evt_1");
        assert_eq!(created.html_link.as_deref(), Some("https://calendar.example/evt_1"));
    }

    #[tokio::test]
    async fn insert_event_surfaces_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let result = client_for(&server).insert_event("primary", &reservation()).await;

        assert!(matches!(result, Err(ApiError::RequestError(msg)) if msg.contains("boom")));
    }
}
