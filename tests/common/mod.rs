//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::sync::Arc;

use keystack::{
    KeyMapping, MenuBindingRequest, PlayerInputSession, SectionOrigin, SectionRegistry,
    SharedBindings,
};

/// Build a conf-sourced mapping with a stable id.
pub fn conf_mapping(key: &str, action: &str, id: u64) -> KeyMapping {
    KeyMapping::new(key, action, false, Some(id), None)
}

/// Build a script-sourced mapping (no id required).
pub fn script_mapping(key: &str, action: &str) -> KeyMapping {
    KeyMapping::new(key, action, false, None, None)
}

/// Registry whose base section holds the given conf bindings.
pub fn registry_with_defaults(bindings: &[(&str, &str)]) -> SectionRegistry {
    let mut registry = SectionRegistry::new();
    registry.set_default_bindings(
        bindings
            .iter()
            .enumerate()
            .map(|(i, (k, a))| conf_mapping(k, a, i as u64 + 1))
            .collect(),
    );
    registry
}

/// Session whose shared conf bindings hold the given entries.
pub fn session_with_defaults(bindings: &[(&str, &str)]) -> PlayerInputSession {
    let shared = Arc::new(SharedBindings::new());
    shared.replace_conf_bindings(
        bindings
            .iter()
            .enumerate()
            .map(|(i, (k, a))| conf_mapping(k, a, i as u64 + 1))
            .collect(),
    );
    PlayerInputSession::new(shared)
}

/// Add a script section to a registry without enabling it.
pub fn define_script_section(
    registry: &mut SectionRegistry,
    name: &str,
    bindings: &[(&str, &str)],
    force: bool,
) {
    registry.define_section(
        name,
        bindings.iter().map(|(k, a)| script_mapping(k, a)).collect(),
        force,
        SectionOrigin::Script,
    );
}

pub fn menu_request(key: &str, requester: &str, label: &str) -> MenuBindingRequest {
    MenuBindingRequest {
        raw_key: key.to_string(),
        requester: requester.to_string(),
        label: label.to_string(),
    }
}
