//! Video player adapter - main orchestrator
//!
//! Coordinates:
//! - Container creation and source element detachment/restoration
//! - Shared vendor script acquisition through the [`ScriptLoader`]
//! - Vendor player construction once the script is ready
//! - Bridging vendor callbacks onto CSS classes and a native "play" event
//! - Lifecycle state machine transitions

use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};
use crate::loader::ScriptLoader;
use crate::source::{self, MediaSource};
use crate::types::{AdapterConfig, InstanceId, PlaybackStatus, PlayerLifecycle};
use crate::vendor::{PlayerHandle, PlayerHooks, PlayerOptions, PlayerStateCode, PlayerVendor};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

type LoadCallback = Box<dyn FnOnce(Arc<dyn PlayerHandle>) + Send>;

struct AdapterInner {
    lifecycle: PlayerLifecycle,
    playback: PlaybackStatus,
    el: NodeId,
    container: NodeId,
    original_parent: NodeId,
    loading_css_class: String,
    playing_css_class: String,
    media: MediaSource,
    player: Option<Arc<dyn PlayerHandle>>,
    holds_script_ref: bool,
    load_callbacks: Vec<LoadCallback>,
}

impl AdapterInner {
    fn set_state(&mut self, id: InstanceId, target: PlayerLifecycle) -> Result<()> {
        if !self.lifecycle.can_transition_to(target) {
            return Err(Error::InvalidStateTransition {
                from: self.lifecycle.to_string(),
                to: target.to_string(),
            });
        }
        info!(instance = %id, from = %self.lifecycle, to = %target, "Lifecycle transition");
        self.lifecycle = target;
        Ok(())
    }
}

/// Adapter replacing one native video element with an embedded vendor player.
///
/// Construction swaps the element for a container node immediately; the
/// vendor script and player load lazily via [`load`](Self::load), and
/// [`destroy`](Self::destroy) reverses everything. Dropping the adapter
/// destroys it.
pub struct VideoPlayerAdapter {
    id: InstanceId,
    container_id: String,
    document: Arc<dyn Document>,
    vendor: Arc<dyn PlayerVendor>,
    loader: ScriptLoader,
    alive: Arc<AtomicBool>,
    inner: Arc<Mutex<AdapterInner>>,
}

impl std::fmt::Debug for VideoPlayerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoPlayerAdapter")
            .field("id", &self.id)
            .field("container_id", &self.container_id)
            .finish_non_exhaustive()
    }
}

impl VideoPlayerAdapter {
    /// Create the adapter and swap the source element for a container node.
    ///
    /// Fails before any document mutation when no element is supplied, the
    /// element is detached, or no video id can be extracted from its media
    /// source.
    pub fn new(
        document: Arc<dyn Document>,
        loader: ScriptLoader,
        vendor: Arc<dyn PlayerVendor>,
        config: AdapterConfig,
    ) -> Result<Self> {
        let el = config.el.ok_or(Error::MissingElement)?;
        if document.tag_name(el).is_none() {
            return Err(Error::MissingElement);
        }
        let original_parent = document.parent(el).ok_or(Error::DetachedElement)?;
        let media = source::resolve_media_source(&*document, el)?;

        if loader.script_url() != &vendor.script_url() {
            warn!(
                loader_url = %loader.script_url(),
                vendor_url = %vendor.script_url(),
                "Script loader and vendor disagree on the script URL"
            );
        }

        let id = InstanceId::new();
        let container_id = format!(
            "vidswap-player-{}",
            NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed)
        );
        let container = document.create_element("div");
        document.set_attribute(container, "id", &container_id);
        document.insert_before(original_parent, container, Some(el));
        document.detach(el);

        info!(
            instance = %id,
            container = %container_id,
            video_id = %media.video_id,
            "Adapter constructed"
        );

        Ok(Self {
            id,
            container_id,
            document,
            vendor,
            loader,
            alive: Arc::new(AtomicBool::new(true)),
            inner: Arc::new(Mutex::new(AdapterInner {
                lifecycle: PlayerLifecycle::Constructed,
                playback: PlaybackStatus::Idle,
                el,
                container,
                original_parent,
                loading_css_class: config.loading_css_class,
                playing_css_class: config.playing_css_class,
                media,
                player: None,
                holds_script_ref: false,
                load_callbacks: Vec::new(),
            })),
        })
    }

    /// Begin loading the vendor player. Idempotent: repeat calls while
    /// loading queue the callback, repeat calls once ready invoke it on the
    /// same turn, and no second player is ever constructed.
    ///
    /// `callback` fires exactly once with the vendor handle, after both the
    /// shared script and the player itself have signaled ready.
    pub fn load(
        &self,
        callback: impl FnOnce(Arc<dyn PlayerHandle>) + Send + 'static,
    ) -> Result<()> {
        {
            let mut inner = self.inner.lock();
            match inner.lifecycle {
                PlayerLifecycle::Destroyed => return Err(Error::Destroyed),
                PlayerLifecycle::Ready => {
                    let player = inner.player.clone();
                    drop(inner);
                    if let Some(player) = player {
                        callback(player);
                    }
                    return Ok(());
                }
                PlayerLifecycle::Loading => {
                    inner.load_callbacks.push(Box::new(callback));
                    return Ok(());
                }
                PlayerLifecycle::Constructed => {
                    self.document
                        .add_class(inner.container, &inner.loading_css_class);
                    inner.set_state(self.id, PlayerLifecycle::Loading)?;
                    inner.load_callbacks.push(Box::new(callback));
                    inner.holds_script_ref = true;
                }
            }
        }

        self.loader.acquire();
        self.loader.on_script_ready(self.script_ready_continuation());
        Ok(())
    }

    /// Continuation run once the shared script has loaded: constructs the
    /// vendor player unless this instance has been destroyed meanwhile.
    fn script_ready_continuation(&self) -> Box<dyn FnOnce() + Send> {
        let id = self.id;
        let container_id = self.container_id.clone();
        let document = self.document.clone();
        let vendor = self.vendor.clone();
        let state = self.inner.clone();
        let alive = self.alive.clone();

        Box::new(move || {
            if !alive.load(Ordering::SeqCst) {
                debug!(instance = %id, "Script ready after destroy; ignoring");
                return;
            }
            let (container, options) = {
                let inner = state.lock();
                if inner.lifecycle != PlayerLifecycle::Loading {
                    return;
                }
                (
                    inner.container,
                    PlayerOptions {
                        width: inner.media.width,
                        height: inner.media.height,
                        video_id: inner.media.video_id.clone(),
                    },
                )
            };

            let hooks = PlayerHooks {
                on_ready: on_ready_hook(id, document.clone(), state.clone(), alive.clone()),
                on_state_change: on_state_change_hook(id, document.clone(), state.clone(), alive),
            };

            match vendor.create_player(&*document, container, &container_id, options, hooks) {
                Ok(player) => {
                    state.lock().player = Some(player);
                    debug!(instance = %id, container = %container_id, "Vendor player constructed");
                }
                Err(err) => {
                    warn!(instance = %id, error = %err, "Vendor player construction failed");
                }
            }
        })
    }

    /// Start playback through the vendor handle. Only valid once ready.
    pub fn play(&self) -> Result<()> {
        let (lifecycle, player) = {
            let inner = self.inner.lock();
            (inner.lifecycle, inner.player.clone())
        };
        match lifecycle {
            PlayerLifecycle::Destroyed => Err(Error::Destroyed),
            PlayerLifecycle::Ready => {
                if let Some(player) = player {
                    player.play_video();
                }
                Ok(())
            }
            state => Err(Error::NotReady {
                state: state.to_string(),
            }),
        }
    }

    /// Tear down: remove the container (and the vendor surface with it),
    /// restore the source element to its original position, and release the
    /// shared script reference. Safe to call at any point in the lifecycle;
    /// repeat calls are no-ops.
    pub fn destroy(&self) {
        if !self.alive.swap(false, Ordering::SeqCst) {
            debug!(instance = %self.id, "Destroy called twice; ignoring");
            return;
        }

        let release_script = {
            let mut inner = self.inner.lock();

            let restore_anchor = match self.document.parent(inner.container) {
                Some(parent) if parent == inner.original_parent => {
                    self.document.next_sibling(inner.container)
                }
                _ => None,
            };
            self.document.detach(inner.container);
            self.document
                .insert_before(inner.original_parent, inner.el, restore_anchor);

            inner.player = None;
            inner.load_callbacks.clear();
            let _ = inner.set_state(self.id, PlayerLifecycle::Destroyed);
            std::mem::take(&mut inner.holds_script_ref)
        };

        if release_script {
            self.loader.release();
        }
        info!(instance = %self.id, "Adapter destroyed");
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Unique id attribute carried by the container node
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn container(&self) -> NodeId {
        self.inner.lock().container
    }

    /// The original native video element held for restoration
    pub fn source_element(&self) -> NodeId {
        self.inner.lock().el
    }

    pub fn lifecycle(&self) -> PlayerLifecycle {
        self.inner.lock().lifecycle
    }

    pub fn playback_status(&self) -> PlaybackStatus {
        self.inner.lock().playback
    }

    pub fn media(&self) -> MediaSource {
        self.inner.lock().media.clone()
    }
}

impl Drop for VideoPlayerAdapter {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn on_ready_hook(
    id: InstanceId,
    document: Arc<dyn Document>,
    state: Arc<Mutex<AdapterInner>>,
    alive: Arc<AtomicBool>,
) -> Box<dyn FnOnce() + Send> {
    Box::new(move || {
        if !alive.load(Ordering::SeqCst) {
            debug!(instance = %id, "Player ready after destroy; ignoring");
            return;
        }
        let (container, loading_class, player, callbacks) = {
            let mut inner = state.lock();
            if inner.set_state(id, PlayerLifecycle::Ready).is_err() {
                return;
            }
            (
                inner.container,
                inner.loading_css_class.clone(),
                inner.player.clone(),
                std::mem::take(&mut inner.load_callbacks),
            )
        };
        document.remove_class(container, &loading_class);
        match player {
            Some(player) => {
                for callback in callbacks {
                    callback(player.clone());
                }
            }
            None => warn!(instance = %id, "Ready signal arrived before the player handle was stored"),
        }
    })
}

fn on_state_change_hook(
    id: InstanceId,
    document: Arc<dyn Document>,
    state: Arc<Mutex<AdapterInner>>,
    alive: Arc<AtomicBool>,
) -> Box<dyn FnMut(PlayerStateCode) + Send> {
    Box::new(move |code| {
        if !alive.load(Ordering::SeqCst) {
            debug!(instance = %id, "State change after destroy; ignoring");
            return;
        }
        let mut inner = state.lock();
        if inner.lifecycle != PlayerLifecycle::Ready {
            debug!(instance = %id, state = %inner.lifecycle, code = code.code(), "State change before ready; ignoring");
            return;
        }
        if code.is_playing() {
            if inner.playback != PlaybackStatus::Playing {
                inner.playback = PlaybackStatus::Playing;
                document.add_class(inner.container, &inner.playing_css_class);
                document.dispatch_event(inner.el, "play", false);
                debug!(instance = %id, "Playback started");
            }
        } else {
            if inner.playback == PlaybackStatus::Playing {
                debug!(instance = %id, code = code.code(), "Playback stopped");
            }
            inner.playback = PlaybackStatus::Idle;
            document.remove_class(inner.container, &inner.playing_css_class);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{SimDocument, SimVendor};
    use crate::vendor::IFRAME_API_URL;
    use url::Url;

    fn harness() -> (Arc<SimDocument>, ScriptLoader, Arc<SimVendor>) {
        let document = Arc::new(SimDocument::new());
        let loader = ScriptLoader::new(
            document.clone(),
            Url::parse(IFRAME_API_URL).unwrap(),
        );
        (document, loader, Arc::new(SimVendor::new()))
    }

    #[test]
    fn test_construction_swaps_element_for_container() {
        let (document, loader, vendor) = harness();
        let el = document.video_element(640, 360, "http://www.youtube.com/watch?v=nOEw9iiopwI");
        let parent = document.parent(el).unwrap();
        let adapter = VideoPlayerAdapter::new(
            document.clone(),
            loader,
            vendor,
            AdapterConfig::new(el),
        )
        .unwrap();

        assert_eq!(adapter.lifecycle(), PlayerLifecycle::Constructed);
        assert_eq!(document.parent(adapter.container()), Some(parent));
        assert_eq!(document.parent(el), None);
        assert_eq!(
            document.attribute(adapter.container(), "id").as_deref(),
            Some(adapter.container_id())
        );
    }

    #[test]
    fn test_construction_requires_element() {
        let (document, loader, vendor) = harness();
        let err = VideoPlayerAdapter::new(document, loader, vendor, AdapterConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::MissingElement));
        assert!(err.is_config_error());
    }

    #[test]
    fn test_construction_requires_video_id() {
        let (document, loader, vendor) = harness();
        let el = document.video_element(640, 360, "https://example.com/clip.mp4");
        let err = VideoPlayerAdapter::new(document.clone(), loader, vendor, AdapterConfig::new(el))
            .unwrap_err();
        assert!(matches!(err, Error::NoVideoId { .. }));
        // failed construction leaves the element untouched
        assert!(document.parent(el).is_some());
    }

    #[test]
    fn test_play_before_ready_is_an_error() {
        let (document, loader, vendor) = harness();
        let el = document.video_element(640, 360, "http://www.youtube.com/watch?v=nOEw9iiopwI");
        let adapter =
            VideoPlayerAdapter::new(document, loader, vendor, AdapterConfig::new(el)).unwrap();
        assert!(matches!(adapter.play(), Err(Error::NotReady { .. })));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let (document, loader, vendor) = harness();
        let el = document.video_element(640, 360, "http://www.youtube.com/watch?v=nOEw9iiopwI");
        let parent = document.parent(el).unwrap();
        let adapter = VideoPlayerAdapter::new(
            document.clone(),
            loader.clone(),
            vendor,
            AdapterConfig::new(el),
        )
        .unwrap();

        adapter.destroy();
        adapter.destroy();

        assert_eq!(adapter.lifecycle(), PlayerLifecycle::Destroyed);
        assert_eq!(document.parent(el), Some(parent));
        assert_eq!(loader.active_instances(), 0);
    }
}
