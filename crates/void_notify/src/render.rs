//! Rendering collaborator interface
//!
//! The controller never draws anything itself. It asks a
//! [`NotificationRenderer`] to create a visual, move it vertically and
//! destroy it. The host UI layer implements the trait on top of its own
//! widget system.

use crate::error::RenderError;
use crate::notification::{NotificationAction, NotificationId, Severity};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Everything a renderer needs to build one notification visual
#[derive(Debug, Clone)]
pub struct VisualSpec {
    /// Notification id
    pub id: NotificationId,
    /// Message text
    pub message: Arc<str>,
    /// Severity
    pub severity: Severity,
    /// Background color (RGBA)
    pub background: [f32; 4],
    /// Element height
    pub height: f32,
    /// Smallest allowed font size when fitting the text
    pub min_font_size: f32,
    /// Largest allowed font size when fitting the text
    pub max_font_size: f32,
    /// Click action; `None` means the visual must not intercept input
    pub action: Option<NotificationAction>,
}

impl VisualSpec {
    /// Whether the visual reacts to clicks
    pub fn is_interactive(&self) -> bool {
        self.action.is_some()
    }
}

/// Host UI layer hooks used by the controller
///
/// All methods are called from the thread driving
/// [`NotificationController::update`](crate::controller::NotificationController::update).
pub trait NotificationRenderer {
    /// Handle to a created visual
    type Handle;

    /// Create and show a visual, from `template` or built with default styling
    fn create_visual(
        &mut self,
        template: Option<&str>,
        spec: VisualSpec,
    ) -> Result<Self::Handle, RenderError>;

    /// Move a visual to a vertical offset from the anchor edge
    fn set_position(&mut self, handle: &Self::Handle, offset: f32);

    /// Remove a visual
    fn destroy(&mut self, handle: Self::Handle);

    /// Whether visuals can be built without a template
    fn supports_default_visual(&self) -> bool {
        true
    }

    /// Whether a named template is available
    fn has_template(&self, _name: &str) -> bool {
        false
    }
}

/// Handle issued by [`HeadlessRenderer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualHandle(pub u32);

/// A visual tracked by [`HeadlessRenderer`]
#[derive(Debug, Clone)]
pub struct HeadlessVisual {
    /// Creation parameters
    pub spec: VisualSpec,
    /// Template it was created from
    pub template: Option<String>,
    /// Last position set
    pub position: Option<f32>,
    /// Number of position updates received
    pub moves: u32,
}

/// Renderer that keeps visuals in memory
///
/// Used by dedicated servers and tests, where notifications are tracked but
/// never drawn.
#[derive(Debug)]
pub struct HeadlessRenderer {
    visuals: HashMap<VisualHandle, HeadlessVisual>,
    templates: HashSet<String>,
    default_visual: bool,
    next_handle: u32,
    created: u32,
    destroyed: u32,
}

impl HeadlessRenderer {
    /// Create a renderer that can build default visuals
    pub fn new() -> Self {
        Self {
            visuals: HashMap::new(),
            templates: HashSet::new(),
            default_visual: true,
            next_handle: 0,
            created: 0,
            destroyed: 0,
        }
    }

    /// Create a renderer that only builds visuals from registered templates
    pub fn templates_only() -> Self {
        Self {
            default_visual: false,
            ..Self::new()
        }
    }

    /// Register a template name
    pub fn with_template(mut self, name: impl Into<String>) -> Self {
        self.templates.insert(name.into());
        self
    }

    /// Live visual for a handle
    pub fn visual(&self, handle: VisualHandle) -> Option<&HeadlessVisual> {
        self.visuals.get(&handle)
    }

    /// All live visuals
    pub fn visuals(&self) -> impl Iterator<Item = (&VisualHandle, &HeadlessVisual)> {
        self.visuals.iter()
    }

    /// Handle of the live visual showing `message`
    pub fn find(&self, message: &str) -> Option<VisualHandle> {
        self.visuals
            .iter()
            .find(|(_, visual)| &*visual.spec.message == message)
            .map(|(handle, _)| *handle)
    }

    /// Simulate a click, returning whether an action ran
    pub fn click(&self, handle: VisualHandle) -> bool {
        match self.visuals.get(&handle).and_then(|v| v.spec.action.as_ref()) {
            Some(action) => {
                action.invoke();
                true
            }
            None => false,
        }
    }

    /// Number of live visuals
    pub fn live_count(&self) -> usize {
        self.visuals.len()
    }

    /// Visuals created so far
    pub fn created_count(&self) -> u32 {
        self.created
    }

    /// Visuals destroyed so far
    pub fn destroyed_count(&self) -> u32 {
        self.destroyed
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationRenderer for HeadlessRenderer {
    type Handle = VisualHandle;

    fn create_visual(
        &mut self,
        template: Option<&str>,
        spec: VisualSpec,
    ) -> Result<VisualHandle, RenderError> {
        match template {
            Some(name) if !self.templates.contains(name) => {
                return Err(RenderError::UnknownTemplate(name.to_string()));
            }
            None if !self.default_visual => return Err(RenderError::NoDefaultVisual),
            _ => {}
        }

        let handle = VisualHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.created += 1;

        self.visuals.insert(
            handle,
            HeadlessVisual {
                spec,
                template: template.map(str::to_string),
                position: None,
                moves: 0,
            },
        );

        Ok(handle)
    }

    fn set_position(&mut self, handle: &VisualHandle, offset: f32) {
        if let Some(visual) = self.visuals.get_mut(handle) {
            visual.position = Some(offset);
            visual.moves += 1;
        }
    }

    fn destroy(&mut self, handle: VisualHandle) {
        if self.visuals.remove(&handle).is_some() {
            self.destroyed += 1;
        }
    }

    fn supports_default_visual(&self) -> bool {
        self.default_visual
    }

    fn has_template(&self, name: &str) -> bool {
        self.templates.contains(name)
    }
}
