//! Scripted vendor player

use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};
use crate::vendor::{PlayerHandle, PlayerHooks, PlayerOptions, PlayerStateCode, PlayerVendor, IFRAME_API_URL};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::warn;
use url::Url;

/// Handle returned by [`SimVendor`]; counts `play_video` calls
#[derive(Debug, Default)]
pub struct SimPlayerHandle {
    play_calls: AtomicUsize,
}

impl SimPlayerHandle {
    pub fn play_calls(&self) -> usize {
        self.play_calls.load(Ordering::SeqCst)
    }
}

impl PlayerHandle for SimPlayerHandle {
    fn play_video(&self) {
        self.play_calls.fetch_add(1, Ordering::SeqCst);
    }
}

struct SimPlayer {
    container_id: String,
    options: PlayerOptions,
    on_ready: Option<Box<dyn FnOnce() + Send>>,
    on_state_change: Box<dyn FnMut(PlayerStateCode) + Send>,
    handle: Arc<SimPlayerHandle>,
}

/// Scripted [`PlayerVendor`]: records every construction and lets the test
/// deliver the ready and state-change signals at the moment of its choosing.
pub struct SimVendor {
    script_url: Url,
    fail_construction: AtomicBool,
    players: Mutex<Vec<SimPlayer>>,
}

impl SimVendor {
    pub fn new() -> Self {
        Self {
            script_url: Url::parse(IFRAME_API_URL).expect("well-known script URL"),
            fail_construction: AtomicBool::new(false),
            players: Mutex::new(Vec::new()),
        }
    }

    /// Make subsequent `create_player` calls fail
    pub fn fail_construction(&self, fail: bool) {
        self.fail_construction.store(fail, Ordering::SeqCst);
    }

    /// Number of players constructed so far
    pub fn created_players(&self) -> usize {
        self.players.lock().len()
    }

    /// Constructor options recorded for the nth player
    pub fn options(&self, index: usize) -> Option<PlayerOptions> {
        self.players.lock().get(index).map(|p| p.options.clone())
    }

    /// Container id the nth player was constructed with
    pub fn container_id(&self, index: usize) -> Option<String> {
        self.players.lock().get(index).map(|p| p.container_id.clone())
    }

    /// Handle of the nth player, for asserting on `play_video` calls
    pub fn handle(&self, index: usize) -> Option<Arc<SimPlayerHandle>> {
        self.players.lock().get(index).map(|p| p.handle.clone())
    }

    /// Deliver the one-shot ready signal of the nth player
    pub fn fire_ready(&self, index: usize) {
        let hook = {
            let mut players = self.players.lock();
            match players.get_mut(index) {
                Some(player) => player.on_ready.take(),
                None => None,
            }
        };
        match hook {
            Some(hook) => hook(),
            None => warn!(index, "No pending ready signal for player"),
        }
    }

    /// Deliver a state-change signal to the nth player
    pub fn fire_state_change(&self, index: usize, code: PlayerStateCode) {
        // the hook must run outside the registry lock
        let mut hook = {
            let mut players = self.players.lock();
            let Some(player) = players.get_mut(index) else {
                warn!(index, "No such player for state change");
                return;
            };
            std::mem::replace(&mut player.on_state_change, Box::new(|_| {}))
        };
        hook(code);
        let mut players = self.players.lock();
        if let Some(player) = players.get_mut(index) {
            player.on_state_change = hook;
        }
    }
}

impl Default for SimVendor {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerVendor for SimVendor {
    fn script_url(&self) -> Url {
        self.script_url.clone()
    }

    fn create_player(
        &self,
        document: &dyn Document,
        container: NodeId,
        container_id: &str,
        options: PlayerOptions,
        hooks: PlayerHooks,
    ) -> Result<Arc<dyn PlayerHandle>> {
        if self.fail_construction.load(Ordering::SeqCst) {
            return Err(Error::Vendor("simulated construction failure".to_string()));
        }
        // render the vendor surface inside the container
        let surface = document.create_element("iframe");
        document.set_attribute(surface, "src", &format!("about:player/{}", options.video_id));
        document.insert_before(container, surface, None);

        let handle = Arc::new(SimPlayerHandle::default());
        self.players.lock().push(SimPlayer {
            container_id: container_id.to_string(),
            options,
            on_ready: Some(hooks.on_ready),
            on_state_change: hooks.on_state_change,
            handle: handle.clone(),
        });
        Ok(handle)
    }
}
