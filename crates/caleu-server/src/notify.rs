//! Desktop notifications for new bookings.
//!
//! [`NotifySink`] consumes the coordinator's change events and shows one
//! desktop notification per [`NewBooking`].

use std::time::Duration;

use chrono::Local;
use notify_rust::Notification;
#[cfg(target_os = "linux")]
use notify_rust::Urgency;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use caleu_core::{ChangeEvent, NewBooking};

/// Configuration for the notification sink.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Whether notifications are shown at all.
    pub enabled: bool,
    /// Application name reported to the notification daemon.
    pub app_name: String,
    /// Notification timeout in seconds.
    pub timeout_secs: u32,
    /// Custom notification icon path.
    pub icon_path: Option<String>,
    /// Urgency override ("low", "normal", "critical").
    pub urgency: Option<String>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            app_name: "caleu".to_string(),
            timeout_secs: 10,
            icon_path: None,
            urgency: None,
        }
    }
}

impl NotifyConfig {
    /// Builder: enable or disable notifications.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builder: set app name.
    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Builder: set timeout.
    pub fn with_timeout(mut self, secs: u32) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Builder: set icon path.
    pub fn with_icon_path(mut self, path: impl Into<String>) -> Self {
        self.icon_path = Some(path.into());
        self
    }

    /// Builder: set urgency override.
    pub fn with_urgency(mut self, urgency: impl Into<String>) -> Self {
        self.urgency = Some(urgency.into());
        self
    }
}

/// Shows a desktop notification for every new booking.
#[derive(Debug, Clone)]
pub struct NotifySink {
    config: NotifyConfig,
}

impl NotifySink {
    pub fn new(config: NotifyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NotifyConfig {
        &self.config
    }

    /// Consumes events until the coordinator goes away.
    ///
    /// A receiver that falls behind skips the lost events and carries on.
    pub async fn run(self, mut events: broadcast::Receiver<ChangeEvent>) {
        loop {
            match events.recv().await {
                Ok(ChangeEvent::NewBooking(booking)) => {
                    self.notify(&booking);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Notification sink lagged, events were dropped");
                }
                Err(RecvError::Closed) => {
                    debug!("Event channel closed, notification sink stopping");
                    break;
                }
            }
        }
    }

    /// Shows the notification for one booking. Returns true if it was shown.
    pub fn notify(&self, booking: &NewBooking) -> bool {
        if !self.config.enabled {
            debug!(uid = %booking.uid, "Notifications disabled, skipping");
            return false;
        }

        let summary = notification_summary(booking);
        let body = notification_body(booking);

        let mut notification = Notification::new();
        notification
            .appname(&self.config.app_name)
            .summary(&summary)
            .body(&body)
            .timeout(Duration::from_secs(self.config.timeout_secs as u64));

        if let Some(ref icon) = self.config.icon_path {
            notification.icon(icon);
        }

        #[cfg(target_os = "linux")]
        notification.urgency(
            self.config
                .urgency
                .as_deref()
                .map(parse_urgency)
                .unwrap_or(Urgency::Normal),
        );

        match notification.show() {
            Ok(_) => {
                info!(uid = %booking.uid, title = %booking.title, "Notification sent");
                true
            }
            Err(e) => {
                error!(error = %e, uid = %booking.uid, "Failed to send notification");
                false
            }
        }
    }
}

/// Summary line of a new-booking notification.
pub fn notification_summary(booking: &NewBooking) -> String {
    format!("New booking: {}", booking.title)
}

/// Body of a new-booking notification: local start time, then attendees.
pub fn notification_body(booking: &NewBooking) -> String {
    let start = booking.start.with_timezone(&Local);
    let mut body = format!("Starts {}", start.format("%a %d %b %H:%M"));

    let names: Vec<&str> = booking.attendees.iter().map(|a| a.display_name()).collect();
    if !names.is_empty() {
        body.push_str("\nWith: ");
        body.push_str(&names.join(", "));
    }

    if let Some(ref location) = booking.location {
        body.push_str("\nWhere: ");
        body.push_str(location);
    }

    body
}

#[cfg(target_os = "linux")]
fn parse_urgency(s: &str) -> Urgency {
    match s.to_ascii_lowercase().as_str() {
        "low" => Urgency::Low,
        "critical" => Urgency::Critical,
        _ => Urgency::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caleu_core::{Attendee, BookingStatus};
    use chrono::{TimeZone, Utc};

    fn booking() -> NewBooking {
        let start = Utc.with_ymd_and_hms(2025, 3, 11, 9, 0, 0).unwrap();
        NewBooking {
            uid: "bk_1".to_string(),
            title: "Intro call".to_string(),
            start,
            end: start + chrono::Duration::minutes(30),
            status: BookingStatus::Pending,
            attendees: vec![
                Attendee::new("Ada Lovelace", "ada@example.com"),
                Attendee {
                    name: None,
                    email: Some("grace@example.com".to_string()),
                },
            ],
            location: None,
        }
    }

    #[test]
    fn config_default() {
        let config = NotifyConfig::default();
        assert!(config.enabled);
        assert_eq!(config.app_name, "caleu");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn config_builder() {
        let config = NotifyConfig::default()
            .with_enabled(false)
            .with_app_name("bookings")
            .with_timeout(30)
            .with_urgency("critical");
        assert!(!config.enabled);
        assert_eq!(config.app_name, "bookings");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.urgency.as_deref(), Some("critical"));
    }

    #[test]
    fn summary_names_the_booking() {
        assert_eq!(notification_summary(&booking()), "New booking: Intro call");
    }

    #[test]
    fn body_lists_start_and_attendees() {
        let body = notification_body(&booking());
        let mut lines = body.lines();
        assert!(lines.next().unwrap().starts_with("Starts "));
        assert_eq!(lines.next(), Some("With: Ada Lovelace, grace@example.com"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn body_includes_location() {
        let mut booking = booking();
        booking.attendees.clear();
        booking.location = Some("Room 4".to_string());
        let body = notification_body(&booking);
        assert!(body.ends_with("\nWhere: Room 4"));
        assert!(!body.contains("With:"));
    }

    #[test]
    fn disabled_sink_shows_nothing() {
        let sink = NotifySink::new(NotifyConfig::default().with_enabled(false));
        assert!(!sink.notify(&booking()));
    }

    #[tokio::test]
    async fn sink_stops_when_channel_closes() {
        let (tx, rx) = broadcast::channel(4);
        let sink = NotifySink::new(NotifyConfig::default().with_enabled(false));
        let task = tokio::spawn(sink.run(rx));

        tx.send(ChangeEvent::NewBooking(booking())).unwrap();
        drop(tx);
        task.await.unwrap();
    }
}
