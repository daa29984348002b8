//! Vendor player boundary
//!
//! The third-party player (the YouTube IFrame API in production) is an
//! external collaborator: a remotely loaded script plus a constructor taking
//! a container id, surface options and two event hooks. This module pins
//! down that contract as traits; [`crate::simulation::SimVendor`] is the
//! scripted stand-in.

use crate::dom::{Document, NodeId};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

/// Fixed, well-known source URL of the vendor script. All adapter instances
/// agree on this so the script tag is shared.
pub const IFRAME_API_URL: &str = "https://www.youtube.com/iframe_api";

/// Vendor playback state codes as reported to `on_state_change`.
///
/// Exactly one value, [`PlayerStateCode::Playing`], means "now playing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerStateCode {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl PlayerStateCode {
    /// Decode the vendor's raw numeric state code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::Unstarted),
            0 => Some(Self::Ended),
            1 => Some(Self::Playing),
            2 => Some(Self::Paused),
            3 => Some(Self::Buffering),
            5 => Some(Self::Cued),
            _ => None,
        }
    }

    /// Raw numeric code on the vendor wire
    pub fn code(self) -> i32 {
        match self {
            Self::Unstarted => -1,
            Self::Ended => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Buffering => 3,
            Self::Cued => 5,
        }
    }

    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }
}

/// Options passed to the vendor player constructor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerOptions {
    pub width: u32,
    pub height: u32,
    pub video_id: String,
}

/// Event hooks wired into the vendor player at construction.
///
/// `on_ready` fires once; `on_state_change` fires repeatedly over the
/// player's life, always after `on_ready`.
pub struct PlayerHooks {
    pub on_ready: Box<dyn FnOnce() + Send>,
    pub on_state_change: Box<dyn FnMut(PlayerStateCode) + Send>,
}

/// Opaque handle returned by the vendor once the player is constructed
pub trait PlayerHandle: Send + Sync {
    /// Start or resume playback
    fn play_video(&self);
}

/// The vendor player capability
pub trait PlayerVendor: Send + Sync {
    /// Source URL of the vendor script
    fn script_url(&self) -> Url;

    /// Construct a player inside the container node carrying `container_id`.
    ///
    /// Must only be called once the vendor script has loaded. Construction
    /// failures propagate to the caller unchanged.
    fn create_player(
        &self,
        document: &dyn Document,
        container: NodeId,
        container_id: &str,
        options: PlayerOptions,
        hooks: PlayerHooks,
    ) -> Result<Arc<dyn PlayerHandle>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_code_round_trip() {
        for code in [-1, 0, 1, 2, 3, 5] {
            let state = PlayerStateCode::from_code(code).unwrap();
            assert_eq!(state.code(), code);
        }
        assert_eq!(PlayerStateCode::from_code(4), None);
    }

    #[test]
    fn test_only_playing_means_playing() {
        assert!(PlayerStateCode::Playing.is_playing());
        for state in [
            PlayerStateCode::Unstarted,
            PlayerStateCode::Ended,
            PlayerStateCode::Paused,
            PlayerStateCode::Buffering,
            PlayerStateCode::Cued,
        ] {
            assert!(!state.is_playing());
        }
    }
}
