//! Section registry: defined sections and the enabled stack
//!
//! One registry per player session. It owns the set of *defined* sections and
//! the ordered *enabled* stack the resolver folds over. The stack behaves as
//! an ordered set: enabling a name already present moves it to the top rather
//! than duplicating it.
//!
//! The registry is a plain data structure; scheduling resolver rebuilds after
//! each change is the session controller's job.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::mapping::{KeyMapping, DEFAULT_SECTION};
use crate::section::{EnableFlags, InputSection, SectionOrigin};

/// One entry of the enabled stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnabledSection {
    pub name: String,
    /// Set when the section was enabled with the `exclusive` flag.
    pub exclusive: bool,
}

/// Owns section definitions and the enabled stack for one player session.
///
/// The base [`DEFAULT_SECTION`] always exists and is always enabled; it is
/// the fallback layer backed by the primary conf file.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionRegistry {
    defined: IndexMap<String, InputSection>,
    /// Most recently enabled first (index 0 is the top of the stack).
    enabled: Vec<EnabledSection>,
}

impl SectionRegistry {
    /// Create a registry with an empty, enabled base section.
    pub fn new() -> SectionRegistry {
        let mut defined = IndexMap::new();
        defined.insert(
            DEFAULT_SECTION.to_string(),
            InputSection::new(DEFAULT_SECTION, Vec::new(), true, SectionOrigin::ConfFile),
        );
        SectionRegistry {
            defined,
            enabled: vec![EnabledSection {
                name: DEFAULT_SECTION.to_string(),
                exclusive: false,
            }],
        }
    }

    /// Define or replace a section wholesale.
    ///
    /// An empty binding list removes an existing section entirely (the
    /// engine's own lifecycle contract), except for the base section, whose
    /// contents are merely cleared.
    pub fn define_section(
        &mut self,
        name: &str,
        bindings: Vec<KeyMapping>,
        is_force: bool,
        origin: SectionOrigin,
    ) {
        if bindings.is_empty() && name != DEFAULT_SECTION {
            if self.defined.contains_key(name) {
                debug!("empty definition removes section \"{}\"", name);
                self.disable_section(name);
            }
            return;
        }
        self.defined
            .insert(name.to_string(), InputSection::new(name, bindings, is_force, origin));
    }

    /// Replace the contents of the base section (conf-file bindings).
    pub fn set_default_bindings(&mut self, bindings: Vec<KeyMapping>) {
        self.defined.insert(
            DEFAULT_SECTION.to_string(),
            InputSection::new(DEFAULT_SECTION, bindings, true, SectionOrigin::ConfFile),
        );
    }

    /// Push a defined section to the top of the enabled stack.
    ///
    /// Enabling a name that is not defined is logged and ignored. Enabling a
    /// name already on the stack first removes its old position, so a name
    /// never appears twice.
    pub fn enable_section(&mut self, name: &str, flags: EnableFlags) {
        if !self.defined.contains_key(name) {
            warn!("cannot enable undefined section \"{}\"", name);
            return;
        }
        self.enabled.retain(|e| e.name != name);
        self.enabled.insert(
            0,
            EnabledSection {
                name: name.to_string(),
                exclusive: flags.exclusive,
            },
        );
    }

    /// Remove a section from the enabled stack and from the defined set.
    ///
    /// Idempotent: disabling an absent name is a no-op. The base section is
    /// never removed.
    pub fn disable_section(&mut self, name: &str) {
        if name == DEFAULT_SECTION {
            warn!("refusing to disable the base section");
            return;
        }
        self.enabled.retain(|e| e.name != name);
        self.defined.shift_remove(name);
    }

    /// Look up a defined section by name.
    pub fn section(&self, name: &str) -> Option<&InputSection> {
        self.defined.get(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defined.contains_key(name)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.iter().any(|e| e.name == name)
    }

    /// The enabled stack entries, top first.
    pub fn enabled_entries(&self) -> &[EnabledSection] {
        &self.enabled
    }

    /// Walk the enabled stack top to bottom, pairing each entry with its
    /// definition.
    pub fn enabled_stack(&self) -> impl Iterator<Item = (&EnabledSection, &InputSection)> {
        self.enabled.iter().filter_map(|entry| {
            // disable_section removes both, so a dangling entry is a bug
            debug_assert!(
                self.defined.contains_key(&entry.name),
                "enabled section \"{}\" has no definition",
                entry.name
            );
            self.defined.get(&entry.name).map(|section| (entry, section))
        })
    }
}

impl Default for SectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(key: &str, action: &str) -> KeyMapping {
        KeyMapping::new(key, action, false, None, None)
    }

    fn registry_with(name: &str, force: bool) -> SectionRegistry {
        let mut reg = SectionRegistry::new();
        reg.define_section(
            name,
            vec![mapping("x", "cmd")],
            force,
            SectionOrigin::Script,
        );
        reg
    }

    #[test]
    fn test_base_section_always_present() {
        let reg = SectionRegistry::new();
        assert!(reg.is_defined(DEFAULT_SECTION));
        assert!(reg.is_enabled(DEFAULT_SECTION));
    }

    #[test]
    fn test_define_does_not_enable() {
        let reg = registry_with("osc", false);
        assert!(reg.is_defined("osc"));
        assert!(!reg.is_enabled("osc"));
    }

    #[test]
    fn test_enable_pushes_to_top() {
        let mut reg = registry_with("osc", false);
        reg.enable_section("osc", EnableFlags::default());
        assert_eq!(reg.enabled_entries()[0].name, "osc");
        assert_eq!(reg.enabled_entries()[1].name, DEFAULT_SECTION);
    }

    #[test]
    fn test_enable_undefined_is_noop() {
        let mut reg = SectionRegistry::new();
        reg.enable_section("ghost", EnableFlags::default());
        assert_eq!(reg.enabled_entries().len(), 1);
    }

    #[test]
    fn test_enable_is_idempotent_ordered_set() {
        let mut reg = registry_with("osc", false);
        reg.define_section(
            "menu",
            vec![mapping("m", "cmd")],
            false,
            SectionOrigin::Script,
        );
        reg.enable_section("osc", EnableFlags::default());
        reg.enable_section("menu", EnableFlags::default());
        // Re-enabling moves osc back to the top without duplicating it
        reg.enable_section("osc", EnableFlags::default());

        let names: Vec<_> = reg.enabled_entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["osc", "menu", DEFAULT_SECTION]);
    }

    #[test]
    fn test_disable_removes_definition() {
        let mut reg = registry_with("osc", false);
        reg.enable_section("osc", EnableFlags::default());
        reg.disable_section("osc");
        assert!(!reg.is_enabled("osc"));
        assert!(!reg.is_defined("osc"));
        // Idempotent
        reg.disable_section("osc");
    }

    #[test]
    fn test_disable_base_section_refused() {
        let mut reg = SectionRegistry::new();
        reg.disable_section(DEFAULT_SECTION);
        assert!(reg.is_enabled(DEFAULT_SECTION));
    }

    #[test]
    fn test_empty_definition_removes_section() {
        let mut reg = registry_with("osc", false);
        reg.enable_section("osc", EnableFlags::default());
        reg.define_section("osc", Vec::new(), false, SectionOrigin::Script);
        assert!(!reg.is_defined("osc"));
        assert!(!reg.is_enabled("osc"));
    }

    #[test]
    fn test_empty_definition_of_base_clears_only() {
        let mut reg = SectionRegistry::new();
        reg.set_default_bindings(vec![mapping("q", "quit")]);
        reg.define_section(DEFAULT_SECTION, Vec::new(), true, SectionOrigin::ConfFile);
        assert!(reg.is_defined(DEFAULT_SECTION));
        assert!(reg.is_enabled(DEFAULT_SECTION));
    }

    #[test]
    fn test_exclusive_flag_recorded() {
        let mut reg = registry_with("modal", true);
        reg.enable_section("modal", EnableFlags::EXCLUSIVE);
        assert!(reg.enabled_entries()[0].exclusive);
    }

    #[test]
    fn test_redefine_replaces_wholesale() {
        let mut reg = registry_with("osc", false);
        reg.define_section(
            "osc",
            vec![mapping("y", "other")],
            true,
            SectionOrigin::Script,
        );
        let section = reg.section("osc").unwrap();
        assert_eq!(section.bindings.len(), 1);
        assert_eq!(section.bindings[0].normalized_key, "y");
        assert!(section.is_force);
    }
}
