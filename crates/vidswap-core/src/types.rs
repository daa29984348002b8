//! Core types for vidswap

use crate::dom::NodeId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// CSS class applied to the container while the player is loading
pub const DEFAULT_LOADING_CLASS: &str = "v-loading";

/// CSS class applied to the container while the player is playing
pub const DEFAULT_PLAYING_CLASS: &str = "v-playing";

/// Fallback surface dimensions when the source element carries none
pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 360;

/// Unique identifier for an adapter instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a single adapter instance.
///
/// `Destroyed` is terminal and reachable from every other state. The
/// playing/idle distinction is tracked separately by [`PlaybackStatus`]
/// because it only applies once the player is `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerLifecycle {
    /// Container inserted, source element detached, nothing loaded yet
    Constructed,
    /// Waiting for the shared vendor script and the player-ready signal
    Loading,
    /// Vendor player constructed and ready
    Ready,
    /// Torn down; no transitions out
    Destroyed,
}

impl PlayerLifecycle {
    /// Check if a transition to the target state is allowed
    pub fn can_transition_to(self, target: PlayerLifecycle) -> bool {
        use PlayerLifecycle::*;
        match (self, target) {
            (_, Destroyed) => self != Destroyed,
            (Constructed, Loading) => true,
            (Loading, Ready) => true,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == PlayerLifecycle::Destroyed
    }
}

impl std::fmt::Display for PlayerLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PlayerLifecycle::Constructed => "constructed",
            PlayerLifecycle::Loading => "loading",
            PlayerLifecycle::Ready => "ready",
            PlayerLifecycle::Destroyed => "destroyed",
        };
        write!(f, "{name}")
    }
}

/// Orthogonal playback flag, meaningful once the lifecycle is `Ready`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Playing,
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackStatus::Idle => write!(f, "idle"),
            PlaybackStatus::Playing => write!(f, "playing"),
        }
    }
}

/// Adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// The native video element to replace
    pub el: Option<NodeId>,
    /// CSS class applied to the container while waiting for load
    pub loading_css_class: String,
    /// CSS class applied to the container while playback is active
    pub playing_css_class: String,
}

impl AdapterConfig {
    /// Configuration for the given source element with default CSS classes
    pub fn new(el: NodeId) -> Self {
        Self {
            el: Some(el),
            ..Self::default()
        }
    }

    /// Override the loading CSS class
    pub fn loading_css_class(mut self, class: impl Into<String>) -> Self {
        self.loading_css_class = class.into();
        self
    }

    /// Override the playing CSS class
    pub fn playing_css_class(mut self, class: impl Into<String>) -> Self {
        self.playing_css_class = class.into();
        self
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            el: None,
            loading_css_class: DEFAULT_LOADING_CLASS.to_string(),
            playing_css_class: DEFAULT_PLAYING_CLASS.to_string(),
        }
    }
}
