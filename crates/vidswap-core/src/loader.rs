//! Shared vendor script loading
//!
//! One [`ScriptLoader`] is shared by every adapter instance on a page. It
//! reference-counts the instances that requested the script, inserts the
//! script tag exactly once, queues ready continuations until the host
//! signals that the script finished loading, and removes the tag again when
//! the last instance releases its reference.

use crate::dom::{Document, NodeId};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

type ReadyCallback = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptState {
    NotRequested,
    Loading,
    Loaded,
}

struct LoaderInner {
    state: ScriptState,
    script_node: Option<NodeId>,
    pending: Vec<ReadyCallback>,
    active: usize,
}

/// Reference-counted loader for the shared vendor script.
///
/// Cheap to clone; all clones share one registry. Mutations happen under a
/// single lock, and queued continuations always run outside it so a
/// continuation may call back into the loader.
#[derive(Clone)]
pub struct ScriptLoader {
    document: Arc<dyn Document>,
    script_url: Url,
    inner: Arc<Mutex<LoaderInner>>,
}

impl ScriptLoader {
    pub fn new(document: Arc<dyn Document>, script_url: Url) -> Self {
        Self {
            document,
            script_url,
            inner: Arc::new(Mutex::new(LoaderInner {
                state: ScriptState::NotRequested,
                script_node: None,
                pending: Vec::new(),
                active: 0,
            })),
        }
    }

    /// URL of the script this loader manages
    pub fn script_url(&self) -> &Url {
        &self.script_url
    }

    /// Register one more active instance. The first acquisition inserts the
    /// script tag into the document and marks loading in progress.
    pub fn acquire(&self) {
        let mut inner = self.inner.lock();
        inner.active += 1;
        if inner.script_node.is_none() {
            let node = self.document.create_element("script");
            self.document
                .set_attribute(node, "src", self.script_url.as_str());
            self.document
                .insert_before(self.document.head(), node, None);
            inner.script_node = Some(node);
            inner.state = ScriptState::Loading;
            debug!(url = %self.script_url, node = %node, "Vendor script tag inserted");
        }
        debug!(active = inner.active, "Script reference acquired");
    }

    /// Release one active instance. When the count returns to zero the
    /// script tag is removed so a future instance re-fetches it. The count
    /// never goes negative; surplus releases are ignored.
    pub fn release(&self) {
        let mut inner = self.inner.lock();
        if inner.active == 0 {
            warn!("Script reference released with no active instances");
            return;
        }
        inner.active -= 1;
        debug!(active = inner.active, "Script reference released");
        if inner.active == 0 {
            if let Some(node) = inner.script_node.take() {
                self.document.detach(node);
                debug!(url = %self.script_url, "Vendor script tag removed");
            }
            inner.state = ScriptState::NotRequested;
            let dropped = inner.pending.len();
            if dropped > 0 {
                inner.pending.clear();
                debug!(dropped, "Dropped pending script-ready continuations");
            }
        }
    }

    /// Run `callback` once the script has loaded: immediately (on this same
    /// turn) when it already has, queued otherwise.
    pub fn on_script_ready(&self, callback: ReadyCallback) {
        {
            let mut inner = self.inner.lock();
            if inner.state != ScriptState::Loaded {
                inner.pending.push(callback);
                return;
            }
        }
        callback();
    }

    /// Host signal: the vendor script finished downloading and parsing.
    /// Drains the pending continuation queue in registration order.
    pub fn notify_script_loaded(&self) {
        let callbacks = {
            let mut inner = self.inner.lock();
            if inner.state != ScriptState::Loading {
                warn!(state = ?inner.state, "Ignoring script-loaded signal");
                return;
            }
            inner.state = ScriptState::Loaded;
            std::mem::take(&mut inner.pending)
        };
        debug!(callbacks = callbacks.len(), "Vendor script loaded");
        for callback in callbacks {
            callback();
        }
    }

    /// Count of instances currently holding a reference
    pub fn active_instances(&self) -> usize {
        self.inner.lock().active
    }

    pub fn is_script_loaded(&self) -> bool {
        self.inner.lock().state == ScriptState::Loaded
    }

    /// The inserted script tag, while one exists
    pub fn script_node(&self) -> Option<NodeId> {
        self.inner.lock().script_node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SimDocument;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn loader() -> (Arc<SimDocument>, ScriptLoader) {
        let document = Arc::new(SimDocument::new());
        let url = Url::parse(crate::vendor::IFRAME_API_URL).unwrap();
        let loader = ScriptLoader::new(document.clone(), url);
        (document, loader)
    }

    #[test]
    fn test_first_acquire_inserts_script_once() {
        let (document, loader) = loader();
        assert_eq!(document.script_count(crate::vendor::IFRAME_API_URL), 0);

        loader.acquire();
        loader.acquire();
        assert_eq!(document.script_count(crate::vendor::IFRAME_API_URL), 1);
        assert_eq!(loader.active_instances(), 2);
    }

    #[test]
    fn test_script_removed_only_at_zero() {
        let (document, loader) = loader();
        loader.acquire();
        loader.acquire();

        loader.release();
        assert_eq!(document.script_count(crate::vendor::IFRAME_API_URL), 1);

        loader.release();
        assert_eq!(document.script_count(crate::vendor::IFRAME_API_URL), 0);

        // a later instance re-fetches
        loader.acquire();
        assert_eq!(document.script_count(crate::vendor::IFRAME_API_URL), 1);
        assert!(!loader.is_script_loaded());
    }

    #[test]
    fn test_release_never_goes_negative() {
        let (_document, loader) = loader();
        loader.release();
        assert_eq!(loader.active_instances(), 0);

        loader.acquire();
        assert_eq!(loader.active_instances(), 1);
    }

    #[test]
    fn test_callbacks_queue_until_loaded() {
        let (_document, loader) = loader();
        let fired = Arc::new(AtomicUsize::new(0));

        loader.acquire();
        let fired_ref = fired.clone();
        loader.on_script_ready(Box::new(move || {
            fired_ref.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        loader.notify_script_loaded();
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // already loaded: runs on the same turn
        let fired_ref = fired.clone();
        loader.on_script_ready(Box::new(move || {
            fired_ref.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_pending_callbacks_dropped_at_zero() {
        let (_document, loader) = loader();
        let fired = Arc::new(AtomicUsize::new(0));

        loader.acquire();
        let fired_ref = fired.clone();
        loader.on_script_ready(Box::new(move || {
            fired_ref.fetch_add(1, Ordering::SeqCst);
        }));

        loader.release();
        loader.acquire();
        loader.notify_script_loaded();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
