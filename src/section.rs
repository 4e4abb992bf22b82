//! Input sections: named, ordered groups of bindings
//!
//! Sections are the unit of enable/disable. The flag vocabulary mirrors the
//! embedded media engine's section protocol so the scripting host can pass
//! its flags through unchanged.

use serde::Serialize;
use tracing::{debug, warn};

use crate::mapping::KeyMapping;

/// Which subsystem produced a section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SectionOrigin {
    ConfFile,
    Script,
    MenuItem,
}

/// A named, ordered collection of key mappings.
///
/// Insertion order is priority within the section: later entries override
/// earlier ones with the same normalized key.
#[derive(Clone, Debug, PartialEq)]
pub struct InputSection {
    pub name: String,
    pub bindings: Vec<KeyMapping>,
    /// Force (strong) sections may override bindings already claimed by weak
    /// sections; weak sections only fill gaps.
    pub is_force: bool,
    pub origin: SectionOrigin,
}

impl InputSection {
    pub fn new(
        name: impl Into<String>,
        bindings: Vec<KeyMapping>,
        is_force: bool,
        origin: SectionOrigin,
    ) -> InputSection {
        InputSection {
            name: name.into(),
            bindings,
            is_force,
            origin,
        }
    }
}

/// Parse the define-section priority flag: `force` is strong, `default`
/// (or empty) is weak. Anything else is logged and treated as weak.
pub fn parse_define_flag(flag: &str) -> bool {
    match flag {
        "force" => true,
        "" | "default" => false,
        other => {
            warn!("unknown define-section flag \"{}\", treating as weak", other);
            false
        }
    }
}

/// Flags accepted by enable-section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnableFlags {
    /// Stop the resolver walk after this section: nothing below it in the
    /// stack is consulted while it stays enabled.
    pub exclusive: bool,
}

impl EnableFlags {
    pub const EXCLUSIVE: EnableFlags = EnableFlags { exclusive: true };

    /// Parse enable-section flags. `exclusive` is honored;
    /// `allow-hide-cursor` and `allow-vo-dragging` are recognized but have no
    /// effect here; unknown flags are logged and ignored.
    pub fn parse<I, S>(flags: I) -> EnableFlags
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = EnableFlags::default();
        for flag in flags {
            match flag.as_ref() {
                "exclusive" => parsed.exclusive = true,
                "allow-hide-cursor" | "allow-vo-dragging" => {
                    debug!("ignoring engine flag \"{}\"", flag.as_ref());
                }
                other => {
                    warn!("unknown enable-section flag \"{}\", ignoring", other);
                }
            }
        }
        parsed
    }
}
