//! Per-player input session controller
//!
//! Ties the pieces together for one player: owns the section registry,
//! rebuilds the resolver table after every change, publishes the table as an
//! immutable snapshot, and feeds keystrokes through the sequence matcher.
//!
//! Mutations serialize on the registry lock (one writer at a time per
//! session); the event thread reads the published table without blocking and
//! always sees either the old or the new snapshot, never a torn one.
//! Listeners fire strictly after the new table is published
//! (rebuild-then-notify), so dependent UI state recomputes against the final
//! table.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use tracing::{debug, warn};

use crate::arbiter::{reconcile_menu_bindings, MenuReconciliation};
use crate::key::normalize_unit;
use crate::mapping::KeyMapping;
use crate::matcher::{KeyResolution, KeySequenceMatcher};
use crate::registry::SectionRegistry;
use crate::resolver::ResolverTable;
use crate::section::{parse_define_flag, EnableFlags, SectionOrigin};
use crate::shared::SharedBindings;

type BindingsListener = Box<dyn Fn(&Arc<ResolverTable>) + Send + Sync>;

/// Input controller for one player session.
pub struct PlayerInputSession {
    shared: Arc<SharedBindings>,
    registry: Mutex<SectionRegistry>,
    table: ArcSwap<ResolverTable>,
    matcher: Mutex<KeySequenceMatcher>,
    listeners: Mutex<Vec<BindingsListener>>,
}

impl PlayerInputSession {
    /// Create a session wired to the shared binding state, with the base
    /// section already populated from the current shared snapshot.
    pub fn new(shared: Arc<SharedBindings>) -> PlayerInputSession {
        let session = PlayerInputSession {
            shared,
            registry: Mutex::new(SectionRegistry::new()),
            table: ArcSwap::from_pointee(ResolverTable::default()),
            matcher: Mutex::new(KeySequenceMatcher::new()),
            listeners: Mutex::new(Vec::new()),
        };
        session.sync_shared();
        session
    }

    /// Define or replace a section, using the engine's define-section flag
    /// vocabulary (`force` / `default`), then rebuild.
    pub fn define_section(
        &self,
        name: &str,
        bindings: Vec<KeyMapping>,
        define_flag: &str,
        origin: SectionOrigin,
    ) {
        let is_force = parse_define_flag(define_flag);
        let mut registry = self.registry.lock().unwrap();
        registry.define_section(name, bindings, is_force, origin);
        self.rebuild(&registry);
    }

    /// Enable a defined section, then rebuild.
    pub fn enable_section<I, S>(&self, name: &str, flags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let flags = EnableFlags::parse(flags);
        let mut registry = self.registry.lock().unwrap();
        registry.enable_section(name, flags);
        self.rebuild(&registry);
    }

    /// Disable a section, then rebuild.
    pub fn disable_section(&self, name: &str) {
        let mut registry = self.registry.lock().unwrap();
        registry.disable_section(name);
        self.rebuild(&registry);
    }

    /// Pull the current shared snapshot into the base section and rebuild.
    /// Call after the shared conf bindings change.
    pub fn sync_shared(&self) {
        let snapshot = self.shared.snapshot();
        let mut registry = self.registry.lock().unwrap();
        registry.set_default_bindings(snapshot.conf_bindings.clone());
        self.rebuild(&registry);
    }

    /// The current published table snapshot.
    pub fn table(&self) -> Arc<ResolverTable> {
        self.table.load_full()
    }

    /// Feed one raw keystroke through normalization and the sequence matcher.
    pub fn resolve(&self, raw_keystroke: &str) -> KeyResolution {
        let unit = match normalize_unit(raw_keystroke) {
            Ok(unit) => unit,
            Err(err) => {
                warn!("unresolvable keystroke \"{}\": {}", raw_keystroke, err);
                return KeyResolution::NoMatch;
            }
        };
        let table = self.table.load();
        self.matcher.lock().unwrap().resolve(unit, &table)
    }

    /// A higher-priority dispatch path consumed the keystroke; drop any
    /// partial sequence so it does not go stale.
    pub fn notify_handled_elsewhere(&self) {
        self.matcher.lock().unwrap().notify_handled_elsewhere();
    }

    /// Run the menu key-equivalent arbiter against the current table and the
    /// shared menu requests.
    pub fn menu_reconciliation(&self) -> MenuReconciliation {
        let snapshot = self.shared.snapshot();
        reconcile_menu_bindings(&self.table.load(), &snapshot.menu_requests)
    }

    /// Register a listener invoked after every table rebuild, with the newly
    /// published snapshot. Listeners run on the mutating thread, in
    /// registration order.
    pub fn on_bindings_changed<F>(&self, listener: F)
    where
        F: Fn(&Arc<ResolverTable>) + Send + Sync + 'static,
    {
        self.listeners.lock().unwrap().push(Box::new(listener));
    }

    /// Rebuild and publish while the registry lock is held, then notify.
    fn rebuild(&self, registry: &SectionRegistry) {
        let table = Arc::new(ResolverTable::build(registry));
        debug!(
            "rebuilt resolver table: {} entries, {} candidates",
            table.len(),
            table.candidates().len()
        );
        self.table.store(Arc::clone(&table));
        for listener in self.listeners.lock().unwrap().iter() {
            listener(&table);
        }
    }
}
