//! Vidswap Core - Embedded Video Element Adapter
//!
//! This crate swaps a native video element for a third-party streaming
//! player while preserving the element's position in the document:
//! - Lazy, shared loading of the vendor player script (one tag per page)
//! - Container creation with source element detachment and restoration
//! - Vendor callback bridging onto CSS state classes and a native "play" event
//! - Lifecycle state machine with validated transitions
//! - In-memory document and scripted vendor for deterministic tests
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                      Vidswap Core                         │
//! ├───────────────────────────────────────────────────────────┤
//! │                                                           │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐     │
//! │  │    Media     │  │    Script    │  │    Vendor    │     │
//! │  │    Source    │  │    Loader    │  │   Boundary   │     │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘     │
//! │         │                 │                 │             │
//! │         └─────────────────┼─────────────────┘             │
//! │                           │                               │
//! │                    ┌──────┴──────┐                        │
//! │                    │ VideoPlayer │                        │
//! │                    │   Adapter   │                        │
//! │                    └──────┬──────┘                        │
//! │                           │                               │
//! │                    ┌──────┴──────┐                        │
//! │                    │  Document   │                        │
//! │                    │ Capability  │                        │
//! │                    └─────────────┘                        │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! The document and the vendor player are capability traits; production
//! embedders bind them to a real page, tests use [`simulation`].

pub mod adapter;
pub mod dom;
pub mod error;
pub mod loader;
pub mod simulation;
pub mod source;
pub mod types;
pub mod vendor;

pub use adapter::VideoPlayerAdapter;
pub use dom::{Document, NodeId};
pub use error::{Error, Result};
pub use loader::ScriptLoader;
pub use source::{extract_video_id_from_url, MediaSource};
pub use types::{AdapterConfig, InstanceId, PlaybackStatus, PlayerLifecycle};
pub use vendor::{PlayerHandle, PlayerHooks, PlayerOptions, PlayerStateCode, PlayerVendor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the adapter library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "Vidswap Core initialized");
}
