//! Application-wide binding state shared by all player sessions
//!
//! Conf-file bindings and menu key-equivalent requests are owned once per
//! application and read by every session's rebuild. Readers get immutable
//! snapshots through an atomic pointer swap, so a rebuild never observes a
//! half-replaced list.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{error, info};

use crate::arbiter::MenuBindingRequest;
use crate::mapping::KeyMapping;

/// Immutable view of the shared state at one point in time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SharedSnapshot {
    /// Parsed conf-file bindings, in file order. These become the contents of
    /// every session's base section.
    pub conf_bindings: Vec<KeyMapping>,
    /// Menu key-equivalent requests, in request order.
    pub menu_requests: Vec<MenuBindingRequest>,
}

/// Shared binding state with snapshot publication.
///
/// Mutations go through the two `replace_*` entry points (main thread only);
/// any number of sessions may call [`SharedBindings::snapshot`] concurrently.
#[derive(Debug, Default)]
pub struct SharedBindings {
    snapshot: ArcSwap<SharedSnapshot>,
}

impl SharedBindings {
    pub fn new() -> SharedBindings {
        SharedBindings::default()
    }

    /// Replace the conf-file binding list wholesale.
    ///
    /// Conf-sourced mappings must carry a stable `binding_id` (the loader
    /// assigns one per line); a missing id is a collaborator contract breach.
    pub fn replace_conf_bindings(&self, bindings: Vec<KeyMapping>) {
        let bindings: Vec<KeyMapping> = bindings
            .into_iter()
            .map(|mapping| {
                if mapping.binding_id.is_none() && mapping.is_resolvable() {
                    debug_assert!(
                        false,
                        "conf-sourced mapping \"{}\" has no binding id",
                        mapping.raw_key
                    );
                    error!(
                        "conf-sourced mapping \"{}\" has no binding id, disabling it",
                        mapping.raw_key
                    );
                    mapping.into_problem("missing binding identity".to_string())
                } else {
                    mapping
                }
            })
            .collect();

        info!("replacing shared conf bindings ({} entries)", bindings.len());
        let prev = self.snapshot.load();
        self.snapshot.store(Arc::new(SharedSnapshot {
            conf_bindings: bindings,
            menu_requests: prev.menu_requests.clone(),
        }));
    }

    /// Replace the menu key-equivalent request list wholesale.
    pub fn replace_menu_requests(&self, requests: Vec<MenuBindingRequest>) {
        let prev = self.snapshot.load();
        self.snapshot.store(Arc::new(SharedSnapshot {
            conf_bindings: prev.conf_bindings.clone(),
            menu_requests: requests,
        }));
    }

    /// The current immutable snapshot.
    pub fn snapshot(&self) -> Arc<SharedSnapshot> {
        self.snapshot.load_full()
    }
}
