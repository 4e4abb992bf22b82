//! Binding resolver: flattens the enabled section stack into one table
//!
//! The resolver walks the enabled stack top to bottom and folds every
//! section's bindings into a single winners-only lookup table. The fold is
//! entirely over ordered structures, so the result is a pure function of the
//! (stack order, section contents) pair — no hash-iteration order anywhere.
//!
//! Precedence at each key:
//! - within one section, later entries beat earlier ones (last write wins);
//! - across sections, a force section's binding may evict one placed by a
//!   weak section, a weak section never overwrites anything;
//! - a section enabled `exclusive` ends the walk — nothing below it is
//!   consulted at all.
//!
//! Losing candidates are not discarded: every attempted binding survives in
//! the candidate list with an enabled flag and a status message, which is
//! what the bindings-table UI displays. After the walk, unbound strict
//! prefixes of every winning multi-key sequence get synthetic `ignore`
//! entries so half-typed sequences never fall through as unbound.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::mapping::KeyMapping;
use crate::registry::SectionRegistry;
use crate::section::SectionOrigin;

/// One attempted binding with its resolution outcome.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedBinding {
    pub mapping: KeyMapping,
    /// Name of the section the binding came from.
    pub section: String,
    pub origin: SectionOrigin,
    /// False when the binding lost a conflict or is a placeholder.
    pub enabled: bool,
    /// Human-readable explanation when not enabled.
    pub status: Option<String>,
    /// True for resolver-generated partial-sequence `ignore` stand-ins.
    pub synthetic: bool,
}

impl ResolvedBinding {
    fn active(mapping: KeyMapping, section: &str, origin: SectionOrigin) -> ResolvedBinding {
        ResolvedBinding {
            mapping,
            section: section.to_string(),
            origin,
            enabled: true,
            status: None,
            synthetic: false,
        }
    }

    fn disabled(
        mapping: KeyMapping,
        section: &str,
        origin: SectionOrigin,
        status: String,
    ) -> ResolvedBinding {
        ResolvedBinding {
            mapping,
            section: section.to_string(),
            origin,
            enabled: false,
            status: Some(status),
            synthetic: false,
        }
    }
}

/// Tracks the current winner for a key during the fold.
struct Winner {
    candidate_idx: usize,
    from_force_section: bool,
    section: String,
}

/// The flattened, winners-only key→binding table plus the full candidate
/// list for UI display.
///
/// Rebuilt from scratch on every registry change, never mutated in place;
/// published to readers as an immutable snapshot.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ResolverTable {
    entries: IndexMap<String, ResolvedBinding>,
    candidates: Vec<ResolvedBinding>,
}

impl ResolverTable {
    /// Flatten the registry's enabled stack into a fresh table.
    pub fn build(registry: &SectionRegistry) -> ResolverTable {
        let mut candidates: Vec<ResolvedBinding> = Vec::new();
        let mut winners: IndexMap<String, Winner> = IndexMap::new();

        'stack: for (entry, section) in registry.enabled_stack() {
            for mapping in &section.bindings {
                if let Some(problem) = mapping.problem() {
                    candidates.push(ResolvedBinding::disabled(
                        mapping.clone(),
                        &section.name,
                        section.origin,
                        problem.to_string(),
                    ));
                    continue;
                }

                let key = mapping.normalized_key.clone();
                match winners.get(&key) {
                    None => {
                        let idx = candidates.len();
                        candidates.push(ResolvedBinding::active(
                            mapping.clone(),
                            &section.name,
                            section.origin,
                        ));
                        winners.insert(
                            key,
                            Winner {
                                candidate_idx: idx,
                                from_force_section: section.is_force,
                                section: section.name.clone(),
                            },
                        );
                    }
                    Some(winner) => {
                        let same_section = winner.section == section.name;
                        let overwrite = may_overwrite(
                            same_section,
                            winner.from_force_section,
                            section.is_force,
                        );
                        if overwrite {
                            let prev_idx = winner.candidate_idx;
                            let idx = candidates.len();
                            candidates.push(ResolvedBinding::active(
                                mapping.clone(),
                                &section.name,
                                section.origin,
                            ));
                            let beaten_by = format!(
                                "\"{}\" is overridden by \"{}\" from section \"{}\"",
                                key,
                                mapping.action_string(),
                                section.name
                            );
                            let prev = &mut candidates[prev_idx];
                            prev.enabled = false;
                            prev.status = Some(beaten_by);
                            winners.insert(
                                key,
                                Winner {
                                    candidate_idx: idx,
                                    from_force_section: section.is_force,
                                    section: section.name.clone(),
                                },
                            );
                        } else {
                            let status = format!(
                                "\"{}\" is already claimed by section \"{}\"",
                                key, winner.section
                            );
                            candidates.push(ResolvedBinding::disabled(
                                mapping.clone(),
                                &section.name,
                                section.origin,
                                status,
                            ));
                        }
                    }
                }
            }

            if entry.exclusive {
                debug!(
                    "section \"{}\" is exclusive, ignoring the rest of the stack",
                    section.name
                );
                break 'stack;
            }
        }

        let mut entries: IndexMap<String, ResolvedBinding> = winners
            .into_iter()
            .map(|(key, winner)| (key, candidates[winner.candidate_idx].clone()))
            .collect();

        fill_in_partial_sequences(&mut entries);

        ResolverTable { entries, candidates }
    }

    /// Look up the winning binding for a normalized key, if any.
    pub fn lookup(&self, key: &str) -> Option<&ResolvedBinding> {
        self.entries.get(key)
    }

    /// Winning entries in first-claim order (synthetic fill-ins last).
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ResolvedBinding)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every attempted binding in stack-walk order, winners and losers alike.
    pub fn candidates(&self) -> &[ResolvedBinding] {
        &self.candidates
    }

    /// Number of winning entries, synthetic fill-ins included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The one place the overwrite policy lives.
///
/// Within one section, later entries always win. Across sections, only a
/// force section may overwrite, and only when the standing entry was not
/// itself placed by a force section (first force claim sticks).
fn may_overwrite(same_section: bool, existing_force: bool, candidate_force: bool) -> bool {
    if same_section {
        return true;
    }
    candidate_force && !existing_force
}

/// Insert synthetic `ignore` entries for every unbound strict prefix of a
/// winning multi-key sequence, attributed to the sequence's own section.
fn fill_in_partial_sequences(entries: &mut IndexMap<String, ResolvedBinding>) {
    let mut synthetic: Vec<(String, ResolvedBinding)> = Vec::new();

    for row in entries.values() {
        let units = row.mapping.key_units();
        if units.len() < 2 {
            continue;
        }
        for n in 1..units.len() {
            let prefix = units[..n].join("-");
            if entries.contains_key(&prefix) {
                continue;
            }
            if synthetic.iter().any(|(k, _)| *k == prefix) {
                continue;
            }
            synthetic.push((
                prefix.clone(),
                ResolvedBinding {
                    mapping: KeyMapping::synthetic_ignore(&units[..n]),
                    section: row.section.clone(),
                    origin: row.origin,
                    enabled: true,
                    status: None,
                    synthetic: true,
                },
            ));
        }
    }

    for (key, row) in synthetic {
        entries.insert(key, row);
    }
}
