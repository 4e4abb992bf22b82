//! Cross-source conflict arbitration for menu key-equivalents
//!
//! Menu-item shortcuts requested by the plugin host live outside the section
//! stack, so they are reconciled against the already-resolved table instead:
//! first claim wins, losers are reported back so the requester can clear its
//! own shortcut display. The whole reconciliation re-runs from scratch
//! whenever either side changes — a key that lost once is free to claim its
//! binding on a later pass.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::key::KeySequence;
use crate::resolver::ResolverTable;

/// One key-equivalent request from the menu subsystem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuBindingRequest {
    pub raw_key: String,
    /// Identifier of the requesting menu entry, echoed back on failure.
    pub requester: String,
    /// Human-readable menu label, for the bindings-table UI.
    pub label: String,
}

/// Outcome row for one request, kept for UI display whether or not the
/// request succeeded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuBindingRow {
    pub request: MenuBindingRequest,
    /// Canonical form of the requested key; `None` if it did not parse.
    pub normalized_key: Option<String>,
    pub enabled: bool,
    pub status: Option<String>,
    /// The single keystroke to assign as the host-side key equivalent.
    /// Multi-key sequences are valid bindings but have no menu equivalent.
    pub key_equivalent: Option<String>,
}

/// A request that could not claim its key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuBindingFailure {
    pub requester: String,
    pub raw_key: String,
    pub reason: String,
}

/// Full result of one reconciliation pass.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct MenuReconciliation {
    /// One row per request, in request order.
    pub rows: Vec<MenuBindingRow>,
    /// Requests that must clear their visual shortcut.
    pub failures: Vec<MenuBindingFailure>,
}

/// Reconcile menu key-equivalent requests against the active table.
///
/// A request fails when its key is already claimed by a non-ignored enabled
/// binding, or by an earlier request in the same pass. Synthetic `ignore`
/// fill-ins do not block a menu key.
pub fn reconcile_menu_bindings(
    table: &ResolverTable,
    requests: &[MenuBindingRequest],
) -> MenuReconciliation {
    let mut result = MenuReconciliation::default();
    let mut claimed: HashSet<String> = HashSet::new();

    for request in requests {
        let seq = match KeySequence::parse(&request.raw_key) {
            Ok(seq) => seq,
            Err(err) => {
                let reason = format!("cannot parse key \"{}\": {}", request.raw_key, err);
                result.rows.push(MenuBindingRow {
                    request: request.clone(),
                    normalized_key: None,
                    enabled: false,
                    status: Some(reason.clone()),
                    key_equivalent: None,
                });
                result.failures.push(MenuBindingFailure {
                    requester: request.requester.clone(),
                    raw_key: request.raw_key.clone(),
                    reason,
                });
                continue;
            }
        };
        let key = seq.joined();

        let conflict = if claimed.contains(&key) {
            Some("key is already claimed by an earlier menu entry".to_string())
        } else {
            table
                .lookup(&key)
                .filter(|row| row.enabled && !row.mapping.is_ignore())
                .map(|row| {
                    format!(
                        "key is in use by \"{}\" from section \"{}\"",
                        row.mapping.action_string(),
                        row.section
                    )
                })
        };

        match conflict {
            Some(reason) => {
                debug!(
                    "menu entry \"{}\" cannot claim \"{}\": {}",
                    request.requester, key, reason
                );
                result.rows.push(MenuBindingRow {
                    request: request.clone(),
                    normalized_key: Some(key),
                    enabled: false,
                    status: Some(reason.clone()),
                    key_equivalent: None,
                });
                result.failures.push(MenuBindingFailure {
                    requester: request.requester.clone(),
                    raw_key: request.raw_key.clone(),
                    reason,
                });
            }
            None => {
                let key_equivalent = (seq.len() == 1).then(|| key.clone());
                claimed.insert(key.clone());
                result.rows.push(MenuBindingRow {
                    request: request.clone(),
                    normalized_key: Some(key),
                    enabled: true,
                    status: None,
                    key_equivalent,
                });
            }
        }
    }

    result
}
