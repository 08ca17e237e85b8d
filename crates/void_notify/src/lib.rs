//! Void Notify - Toast Notifications
//!
//! This crate provides transient, auto-dismissing notifications for game UI.
//!
//! # Features
//!
//! - Duplicate suppression within a configurable window
//! - Bounded dispatch queue with rate limiting
//! - Paced display of notification bursts
//! - Slot-based vertical stacking
//! - Bézier slide in / slide out animation
//! - Optional click actions
//!
//! Drawing is left to the host: implement [`NotificationRenderer`] for the
//! UI layer and drive [`NotificationController::update`] from the frame loop.
//!
//! # Example
//!
//! ```ignore
//! use void_notify::prelude::*;
//!
//! let mut notifications = NotificationController::new(NotifyConfig::default(), ui_renderer)?;
//!
//! // Any thread
//! let notifier = notifications.notifier();
//! notifier.success("Game saved");
//! notifier.submit(NotificationRequest::error("Connection lost").with_action(reconnect));
//!
//! // Every frame
//! notifications.update(delta_time);
//! ```

pub mod admission;
pub mod animation;
pub mod clock;
pub mod config;
pub mod controller;
pub mod curve;
pub mod dispatch;
pub mod error;
pub mod notification;
pub mod render;
pub mod slots;
pub mod stats;

pub mod prelude {
    pub use crate::admission::Admission;
    pub use crate::animation::Tween;
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::config::{NotifyConfig, SeverityColors};
    pub use crate::controller::{NotificationController, Notifier, ToastInfo, ToastPhase};
    pub use crate::curve::BezierCurve;
    pub use crate::error::{NotifyError, RenderError};
    pub use crate::notification::{NotificationAction, NotificationId, NotificationRequest, Severity};
    pub use crate::render::{HeadlessRenderer, NotificationRenderer, VisualHandle, VisualSpec};
    pub use crate::slots::{SlotLayout, SlotTable};
    pub use crate::stats::NotifyStats;
}

pub use prelude::*;
