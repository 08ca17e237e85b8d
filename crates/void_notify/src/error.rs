//! Error types for the notification system

use thiserror::Error;

/// Errors raised while setting up or running the notification controller
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Configuration value out of range
    #[error("Invalid notification config: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Failed to parse notification config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configured template is unknown to the renderer
    #[error("Notification template not found: {0}")]
    MissingTemplate(String),

    /// No template configured and the renderer cannot build a default visual
    #[error("No notification template configured and the renderer has no default visual")]
    NoDefaultVisual,

    /// Background cleanup thread could not be started
    #[error("Failed to start notification janitor: {0}")]
    Janitor(std::io::Error),
}

/// Errors reported by a [`NotificationRenderer`](crate::render::NotificationRenderer)
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// Template is not registered with the renderer
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// Renderer cannot build a visual without a template
    #[error("Default visual not supported")]
    NoDefaultVisual,

    /// Visual element could not be created
    #[error("Failed to create visual: {0}")]
    CreateFailed(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, NotifyError>;
