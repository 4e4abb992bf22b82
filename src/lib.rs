//! keystack - input-binding resolution for media-player shells
//!
//! Maps raw keyboard events to executable commands, arbitrated across
//! overlapping binding sources: the user's conf file, script-defined
//! sections, and menu-item shortcuts.
//!
//! # Architecture
//!
//! ```text
//! conf loader / script host / menus
//!         → InputSection → SectionRegistry (define/enable/disable)
//!         → ResolverTable (rebuilt on every change, published as a snapshot)
//!         → KeySequenceMatcher (per keystroke)
//!         → Matched(command) | Ignored | NoMatch
//! ```
//!
//! Sections stack by enable order; `force` sections override weak ones, an
//! `exclusive` section suppresses everything below it, and unbound prefixes
//! of multi-key sequences are swallowed instead of leaking through as
//! unbound. Losing bindings stay visible, with a status message, in the
//! candidate list the bindings-table UI displays.

pub mod arbiter;
pub mod key;
pub mod mapping;
pub mod matcher;
pub mod registry;
pub mod resolver;
pub mod section;
pub mod session;
pub mod shared;

// Re-export commonly used types
pub use arbiter::{
    reconcile_menu_bindings, MenuBindingFailure, MenuBindingRequest, MenuBindingRow,
    MenuReconciliation,
};
pub use key::{normalize_unit, KeyParseError, KeySequence, Modifiers, MAX_SEQUENCE_KEYS};
pub use mapping::{KeyMapping, DEFAULT_SECTION, IGNORE_COMMAND};
pub use matcher::{KeyResolution, KeySequenceMatcher};
pub use registry::{EnabledSection, SectionRegistry};
pub use resolver::{ResolvedBinding, ResolverTable};
pub use section::{parse_define_flag, EnableFlags, InputSection, SectionOrigin};
pub use session::PlayerInputSession;
pub use shared::{SharedBindings, SharedSnapshot};
