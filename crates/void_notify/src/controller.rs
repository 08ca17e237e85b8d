//! Notification controller
//!
//! Owns the dispatch queue consumer, the slot table and every visual on
//! screen. The host calls [`NotificationController::update`] once per frame
//! from its render thread; producers on any thread submit through a
//! [`Notifier`].
//!
//! Lifecycle of one notification:
//!
//! ```text
//! submitted ─┬─> rejected (suppressed / rate limited / closed)
//!            └─> queued ─> shown(slot) ─> visible ─> hiding ─> destroyed
//! ```

use crate::admission::{Admission, AdmissionGate, Janitor};
use crate::animation::Tween;
use crate::clock::{Clock, SystemClock};
use crate::config::NotifyConfig;
use crate::dispatch::{dispatch_queue, DispatchReceiver, Pacer};
use crate::error::{NotifyError, Result};
use crate::notification::{
    NotificationAction, NotificationId, NotificationRequest, QueuedNotification, Severity,
};
use crate::render::{NotificationRenderer, VisualSpec};
use crate::slots::{SlotLayout, SlotTable};
use crate::stats::{NotifyCounters, NotifyStats};
use std::sync::Arc;

/// Cloneable, thread-safe handle for submitting notifications
#[derive(Debug, Clone)]
pub struct Notifier {
    gate: Arc<AdmissionGate>,
}

impl Notifier {
    /// Submit a message
    pub fn send(
        &self,
        message: impl Into<Arc<str>>,
        severity: Severity,
        action: Option<NotificationAction>,
    ) -> Admission {
        self.submit(NotificationRequest {
            message: message.into(),
            severity,
            action,
        })
    }

    /// Submit a prepared request
    pub fn submit(&self, request: NotificationRequest) -> Admission {
        let admission = self.gate.admit(request);
        if let Admission::Accepted(id) = admission {
            log::trace!("Notification {} queued", id);
        }
        admission
    }

    /// Submit a request and await the admission decision
    ///
    /// Resolves once the request is queued or rejected, not when it has been
    /// displayed.
    pub async fn send_async(&self, request: NotificationRequest) -> Admission {
        self.submit(request)
    }

    /// Submit a success message
    pub fn success(&self, message: impl Into<Arc<str>>) -> Admission {
        self.send(message, Severity::Success, None)
    }

    /// Submit a warning message
    pub fn warning(&self, message: impl Into<Arc<str>>) -> Admission {
        self.send(message, Severity::Warning, None)
    }

    /// Submit an error message
    pub fn error(&self, message: impl Into<Arc<str>>) -> Admission {
        self.send(message, Severity::Error, None)
    }

    /// Notifications waiting for display
    pub fn pending(&self) -> usize {
        self.gate.pending()
    }

    /// Current counters
    pub fn stats(&self) -> NotifyStats {
        self.gate.counters().snapshot()
    }
}

/// Display phase of an on-screen notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    /// Sliding into its slot, display timer running
    Showing,
    /// Resting in its slot, display timer running
    Visible,
    /// Sliding off screen
    Hiding,
}

/// Snapshot of an on-screen notification
#[derive(Debug, Clone)]
pub struct ToastInfo {
    /// Notification id
    pub id: NotificationId,
    /// Message text
    pub message: Arc<str>,
    /// Occupied slot
    pub slot: usize,
    /// Current phase
    pub phase: ToastPhase,
    /// Current vertical offset
    pub position: f32,
}

enum Stage {
    Visible { show: Option<Tween>, remaining: f32 },
    Hiding(Tween),
}

struct ActiveToast<H> {
    id: NotificationId,
    message: Arc<str>,
    handle: H,
    slot: usize,
    position: f32,
    stage: Stage,
}

impl<H> ActiveToast<H> {
    fn phase(&self) -> ToastPhase {
        match &self.stage {
            Stage::Visible { show: Some(_), .. } => ToastPhase::Showing,
            Stage::Visible { show: None, .. } => ToastPhase::Visible,
            Stage::Hiding(_) => ToastPhase::Hiding,
        }
    }

    fn start_hiding(&mut self, layout: &SlotLayout, duration: f32) {
        if matches!(self.stage, Stage::Hiding(_)) {
            return;
        }
        log::trace!("Notification {} hiding from slot {}", self.id, self.slot);
        self.stage = Stage::Hiding(Tween::new(layout.hide_curve(self.position), duration));
    }
}

/// Shows admitted notifications through a renderer
pub struct NotificationController<R: NotificationRenderer> {
    config: NotifyConfig,
    layout: SlotLayout,
    renderer: R,
    notifier: Notifier,
    queue: Option<DispatchReceiver>,
    pacer: Pacer,
    slots: SlotTable,
    toasts: Vec<ActiveToast<R::Handle>>,
    janitor: Option<Janitor>,
    counters: Arc<NotifyCounters>,
}

impl<R: NotificationRenderer> NotificationController<R> {
    /// Create a controller using the system clock
    pub fn new(config: NotifyConfig, renderer: R) -> Result<Self> {
        Self::with_clock(config, renderer, Arc::new(SystemClock))
    }

    /// Create a controller with a custom clock for duplicate detection
    ///
    /// Fails if the config is invalid or the renderer cannot produce visuals
    /// for it. Starts the janitor thread.
    pub fn with_clock(config: NotifyConfig, renderer: R, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        match config.template.as_deref() {
            Some(name) if !renderer.has_template(name) => {
                return Err(NotifyError::MissingTemplate(name.to_string()));
            }
            None if !renderer.supports_default_visual() => {
                return Err(NotifyError::NoDefaultVisual);
            }
            _ => {}
        }

        let counters = Arc::new(NotifyCounters::new());
        let (sender, receiver) = dispatch_queue(config.queue_capacity);
        let gate = Arc::new(AdmissionGate::new(
            sender,
            config.duplicate_window,
            Arc::clone(&counters),
            clock,
        ));

        let janitor = Janitor::start(Arc::clone(&gate), config.cleanup_interval)
            .map_err(NotifyError::Janitor)?;

        log::info!(
            "Notification controller ready ({} slots, queue capacity {})",
            config.slot_count,
            config.queue_capacity
        );

        Ok(Self {
            layout: config.layout(),
            pacer: Pacer::new(config.dispatch_interval),
            slots: SlotTable::new(config.slot_count),
            config,
            renderer,
            notifier: Notifier { gate },
            queue: Some(receiver),
            toasts: Vec::new(),
            janitor: Some(janitor),
            counters,
        })
    }

    /// Handle for submitting from other threads
    pub fn notifier(&self) -> Notifier {
        self.notifier.clone()
    }

    /// Submit a message
    pub fn send(
        &self,
        message: impl Into<Arc<str>>,
        severity: Severity,
        action: Option<NotificationAction>,
    ) -> Admission {
        self.notifier.send(message, severity, action)
    }

    /// Submit a prepared request
    pub fn submit(&self, request: NotificationRequest) -> Admission {
        self.notifier.submit(request)
    }

    /// Submit a request and await the admission decision
    pub async fn send_async(&self, request: NotificationRequest) -> Admission {
        self.notifier.send_async(request).await
    }

    /// Advance by one frame
    ///
    /// Animates and retires on-screen notifications, then dispatches queued
    /// ones according to the pacing interval. Never blocks.
    pub fn update(&mut self, delta_time: f32) {
        let delta_time = if delta_time.is_finite() { delta_time.max(0.0) } else { 0.0 };

        self.animate(delta_time);
        self.dispatch(delta_time);
    }

    fn animate(&mut self, delta_time: f32) {
        let hide_duration = self.config.hide_duration;
        let layout = self.layout;
        let mut finished = Vec::new();

        for (index, toast) in self.toasts.iter_mut().enumerate() {
            match &mut toast.stage {
                Stage::Visible { show, remaining } => {
                    if let Some(tween) = show {
                        if let Some(position) = tween.advance(delta_time) {
                            toast.position = position;
                            self.renderer.set_position(&toast.handle, position);
                        }
                        if tween.is_finished() {
                            *show = None;
                        }
                    }

                    *remaining -= delta_time;
                    if *remaining <= 0.0 {
                        toast.start_hiding(&layout, hide_duration);
                    }
                }
                Stage::Hiding(tween) => {
                    if let Some(position) = tween.advance(delta_time) {
                        toast.position = position;
                        self.renderer.set_position(&toast.handle, position);
                    }
                    if tween.is_finished() {
                        finished.push(index);
                    }
                }
            }
        }

        for index in finished.into_iter().rev() {
            let toast = self.toasts.remove(index);
            self.retire(toast);
        }
    }

    fn dispatch(&mut self, delta_time: f32) {
        let Some(queue) = &self.queue else {
            return;
        };

        let ticks = self.pacer.advance(delta_time) as usize;
        let budget = ticks.min(queue.len());

        for _ in 0..budget {
            let Some(entry) = self.queue.as_ref().and_then(DispatchReceiver::try_dequeue) else {
                break;
            };
            self.show(entry);
        }
    }

    fn show(&mut self, entry: QueuedNotification) {
        let QueuedNotification { id, request } = entry;

        let spec = VisualSpec {
            id,
            message: Arc::clone(&request.message),
            severity: request.severity,
            background: self.config.colors.get(request.severity),
            height: self.config.element_height,
            min_font_size: self.config.min_font_size,
            max_font_size: self.config.max_font_size,
            action: request.action,
        };

        let handle = match self
            .renderer
            .create_visual(self.config.template.as_deref(), spec)
        {
            Ok(handle) => handle,
            Err(e) => {
                self.counters.record_render_failure();
                log::error!("Failed to create visual for notification {}: {}", id, e);
                return;
            }
        };

        let slot = self.slots.acquire();
        let curve = self.layout.show_curve(slot);
        let position = curve.start();
        self.renderer.set_position(&handle, position);
        self.counters.record_shown();

        log::debug!(
            "Showing notification {} ({}) in slot {}",
            id,
            request.severity,
            slot
        );

        self.toasts.push(ActiveToast {
            id,
            message: request.message,
            handle,
            slot,
            position,
            stage: Stage::Visible {
                show: Some(Tween::new(curve, self.config.show_duration)),
                remaining: self.config.display_duration,
            },
        });
    }

    fn retire(&mut self, toast: ActiveToast<R::Handle>) {
        self.renderer.destroy(toast.handle);
        self.slots.release(toast.slot);
        self.counters.record_destroyed();
        log::trace!("Notification {} destroyed, slot {} released", toast.id, toast.slot);
    }

    /// Start hiding one notification early
    ///
    /// Returns false if it is not on screen.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let hide_duration = self.config.hide_duration;
        match self.toasts.iter_mut().find(|t| t.id == id) {
            Some(toast) => {
                toast.start_hiding(&self.layout, hide_duration);
                true
            }
            None => false,
        }
    }

    /// Start hiding every notification on screen
    pub fn dismiss_all(&mut self) {
        let hide_duration = self.config.hide_duration;
        for toast in &mut self.toasts {
            toast.start_hiding(&self.layout, hide_duration);
        }
    }

    /// Stop background work, destroy all visuals and close the queue
    ///
    /// Later submissions return [`Admission::Closed`]. Safe to call twice.
    pub fn shutdown(&mut self) {
        if let Some(mut janitor) = self.janitor.take() {
            janitor.stop();
        }

        let dropped = self.queue.take().map(|queue| queue.len()).unwrap_or(0);

        let toasts = std::mem::take(&mut self.toasts);
        let live = toasts.len();
        for toast in toasts {
            self.retire(toast);
        }

        if live > 0 || dropped > 0 {
            log::info!(
                "Notification controller shut down ({} visible destroyed, {} pending dropped)",
                live,
                dropped
            );
        }
    }

    /// Whether [`shutdown`](Self::shutdown) has run
    pub fn is_shut_down(&self) -> bool {
        self.queue.is_none()
    }

    /// On-screen notifications
    pub fn toasts(&self) -> Vec<ToastInfo> {
        self.toasts
            .iter()
            .map(|toast| ToastInfo {
                id: toast.id,
                message: Arc::clone(&toast.message),
                slot: toast.slot,
                phase: toast.phase(),
                position: toast.position,
            })
            .collect()
    }

    /// Number of on-screen notifications
    pub fn visible_count(&self) -> usize {
        self.toasts.len()
    }

    /// Notifications waiting for display
    pub fn pending(&self) -> usize {
        self.queue.as_ref().map(DispatchReceiver::len).unwrap_or(0)
    }

    /// Slot occupancy
    pub fn slots(&self) -> &SlotTable {
        &self.slots
    }

    /// Current counters
    pub fn stats(&self) -> NotifyStats {
        self.counters.snapshot()
    }

    /// Active configuration
    pub fn config(&self) -> &NotifyConfig {
        &self.config
    }

    /// The renderer
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The renderer, mutably
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

impl<R: NotificationRenderer> Drop for NotificationController<R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
