//! Notification requests

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Severity {
    /// Operation succeeded
    #[default]
    Success,
    /// Something needs attention
    Warning,
    /// Operation failed
    Error,
}

impl Severity {
    /// Default background color for this severity
    pub fn default_color(&self) -> [f32; 4] {
        match self {
            Self::Success => [0.198, 0.720, 0.353, 1.0], // Green
            Self::Warning => [1.0, 0.661, 0.429, 1.0],   // Orange
            Self::Error => [1.0, 0.471, 0.471, 1.0],     // Red
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// Identifier assigned to each submitted notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Callback invoked when an interactive notification is clicked
#[derive(Clone)]
pub struct NotificationAction(Arc<dyn Fn() + Send + Sync>);

impl NotificationAction {
    /// Wrap a closure
    pub fn new<F>(action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self(Arc::new(action))
    }

    /// Run the callback
    pub fn invoke(&self) {
        (self.0)()
    }
}

impl fmt::Debug for NotificationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NotificationAction(..)")
    }
}

/// A message waiting to be shown
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    /// Message text, also the deduplication key
    pub message: Arc<str>,
    /// Severity (picks the background color)
    pub severity: Severity,
    /// Click action; `None` makes the notification non-interactive
    pub action: Option<NotificationAction>,
}

impl NotificationRequest {
    /// Create a new request
    pub fn new(severity: Severity, message: impl Into<Arc<str>>) -> Self {
        Self {
            message: message.into(),
            severity,
            action: None,
        }
    }

    /// Attach a click action
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.action = Some(NotificationAction::new(action));
        self
    }

    /// Whether clicking the notification does anything
    pub fn is_interactive(&self) -> bool {
        self.action.is_some()
    }
}

// Convenience constructors
impl NotificationRequest {
    /// Success notification
    pub fn success(message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Success, message)
    }

    /// Warning notification
    pub fn warning(message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Error notification
    pub fn error(message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Error, message)
    }
}

/// A request that passed admission and is waiting in the dispatch queue
#[derive(Debug, Clone)]
pub struct QueuedNotification {
    /// Assigned id
    pub id: NotificationId,
    /// The original request
    pub request: NotificationRequest,
}
