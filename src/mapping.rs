//! KeyMapping: one key sequence bound to one command
//!
//! Mappings arrive from three places: the user's conf file (via the external
//! loader, one record per line), the scripting host (section definitions), and
//! the menu subsystem. All of them end up as [`KeyMapping`] values.
//!
//! Parsing never throws a mapping away: anything malformed becomes a disabled
//! placeholder carrying a human-readable `problem` string, so the bindings
//! table can show the user why a line did not take effect.

use serde::Serialize;

use crate::key::{KeyParseError, KeySequence};

/// The no-op command. A key resolved to `ignore` is swallowed without effect.
pub const IGNORE_COMMAND: &str = "ignore";

/// Name of the base section backed by the primary conf file.
pub const DEFAULT_SECTION: &str = "default";

/// Marker line emitted by the source conf format; not a real binding.
const DEFAULT_BINDINGS_SENTINEL: (&str, &str) = ("default-bindings", "start");

/// A single key binding: raw and normalized key forms, the tokenized command,
/// and provenance metadata.
///
/// Values are immutable once constructed. A mapping with a `problem` set is a
/// disabled placeholder: it participates in candidate lists (so the UI can
/// explain it) but never in key resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KeyMapping {
    /// The key specifier exactly as authored.
    pub raw_key: String,
    /// Canonical lookup form; empty only for unparseable placeholders.
    pub normalized_key: String,
    /// Canonical per-keystroke units of `normalized_key`.
    key_units: Vec<String>,
    /// The command and its arguments.
    pub action: Vec<String>,
    /// True for host-application commands that are not forwarded to the
    /// underlying media engine.
    pub is_host_command: bool,
    /// Explicit destination-section annotation stripped from the action.
    pub scope_section: Option<String>,
    /// Stable identity for change tracking; required for conf-file mappings.
    pub binding_id: Option<u64>,
    pub comment: Option<String>,
    problem: Option<String>,
}

impl KeyMapping {
    /// Parse a raw key specifier and raw action string into a mapping.
    ///
    /// Handles the section-prefix policy and the sentinel marker line; see the
    /// module docs. The returned mapping may be a disabled placeholder.
    pub fn new(
        raw_key: &str,
        raw_action: &str,
        is_host_command: bool,
        binding_id: Option<u64>,
        comment: Option<String>,
    ) -> KeyMapping {
        let action_text = raw_action.trim();

        if raw_key == DEFAULT_BINDINGS_SENTINEL.0 && action_text == DEFAULT_BINDINGS_SENTINEL.1 {
            return Self::placeholder(
                raw_key,
                binding_id,
                comment,
                "conf-file marker line, not a binding".to_string(),
            );
        }

        // Explicit `{section}` destination prefix. A redundant `{default}` is
        // stripped (it would otherwise reach the execution layer and fail);
        // any other destination is rejected here.
        let mut scope_section = None;
        let mut action_text = action_text;
        if let Some(rest) = action_text.strip_prefix('{') {
            match rest.split_once('}') {
                Some((name, after)) => {
                    let name = name.trim().to_string();
                    if name != DEFAULT_SECTION {
                        let mut placeholder = Self::placeholder(
                            raw_key,
                            binding_id,
                            comment,
                            format!(
                                "destination section \"{}\" is not supported here",
                                name
                            ),
                        );
                        placeholder.scope_section = Some(name);
                        return placeholder;
                    }
                    scope_section = Some(name);
                    action_text = after.trim_start();
                }
                None => {
                    return Self::placeholder(
                        raw_key,
                        binding_id,
                        comment,
                        "unterminated section prefix in command".to_string(),
                    );
                }
            }
        }

        let action = tokenize_action(action_text);
        if action.is_empty() {
            return Self::placeholder(raw_key, binding_id, comment, "empty command".to_string());
        }

        match KeySequence::parse(raw_key) {
            Ok(seq) => KeyMapping {
                raw_key: raw_key.to_string(),
                normalized_key: seq.joined(),
                key_units: seq.units().to_vec(),
                action,
                is_host_command,
                scope_section,
                binding_id,
                comment,
                problem: None,
            },
            Err(err) => Self::placeholder(raw_key, binding_id, comment, key_error_text(raw_key, &err)),
        }
    }

    /// Parse one conf-file line of the form `KEY command args # comment`.
    ///
    /// Returns `None` for blank and comment-only lines. Malformed content
    /// still yields a placeholder mapping, same as [`KeyMapping::new`].
    pub fn from_conf_line(line: &str, binding_id: Option<u64>) -> Option<KeyMapping> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (content, comment) = split_comment(line);
        let content = content.trim();
        if content.is_empty() {
            return None;
        }

        let (key, action) = match content.split_once(char::is_whitespace) {
            Some((key, rest)) => (key, rest.trim()),
            None => (content, ""),
        };

        Some(KeyMapping::new(key, action, false, binding_id, comment))
    }

    /// Synthetic `ignore` stand-in for an unbound prefix of a multi-key
    /// sequence, attributed by the resolver to the full sequence's section.
    pub(crate) fn synthetic_ignore(units: &[String]) -> KeyMapping {
        let joined = units.join("-");
        KeyMapping {
            raw_key: joined.clone(),
            normalized_key: joined,
            key_units: units.to_vec(),
            action: vec![IGNORE_COMMAND.to_string()],
            is_host_command: false,
            scope_section: None,
            binding_id: None,
            comment: None,
            problem: None,
        }
    }

    /// Copy of this mapping demoted to a disabled placeholder.
    pub(crate) fn into_problem(mut self, problem: String) -> KeyMapping {
        self.problem = Some(problem);
        self
    }

    fn placeholder(
        raw_key: &str,
        binding_id: Option<u64>,
        comment: Option<String>,
        problem: String,
    ) -> KeyMapping {
        KeyMapping {
            raw_key: raw_key.to_string(),
            normalized_key: String::new(),
            key_units: Vec::new(),
            action: Vec::new(),
            is_host_command: false,
            scope_section: None,
            binding_id,
            comment,
            problem: Some(problem),
        }
    }

    /// Canonical per-keystroke units of the normalized key.
    pub fn key_units(&self) -> &[String] {
        &self.key_units
    }

    /// Why this mapping cannot take effect, if it is a placeholder.
    pub fn problem(&self) -> Option<&str> {
        self.problem.as_deref()
    }

    /// True when this mapping can participate in key resolution.
    pub fn is_resolvable(&self) -> bool {
        self.problem.is_none()
    }

    /// True when the action is the no-op `ignore` command.
    pub fn is_ignore(&self) -> bool {
        self.action.len() == 1 && self.action[0] == IGNORE_COMMAND
    }

    /// The command with its arguments as one displayable string.
    pub fn action_string(&self) -> String {
        self.action.join(" ")
    }
}

fn key_error_text(raw_key: &str, err: &KeyParseError) -> String {
    format!("cannot parse key \"{}\": {}", raw_key, err)
}

/// Split a command string into tokens, keeping double-quoted arguments whole.
fn tokenize_action(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    for c in s.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !cur.is_empty() {
                    tokens.push(std::mem::take(&mut cur));
                }
            }
            c => cur.push(c),
        }
    }
    if !cur.is_empty() {
        tokens.push(cur);
    }
    tokens
}

/// Split a conf line at the first `#` that is not inside double quotes.
fn split_comment(line: &str) -> (&str, Option<String>) {
    let mut in_quotes = false;
    for (idx, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => {
                let comment = line[idx + 1..].trim();
                let comment = (!comment.is_empty()).then(|| comment.to_string());
                return (&line[..idx], comment);
            }
            _ => {}
        }
    }
    (line, None)
}
