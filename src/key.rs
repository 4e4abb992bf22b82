//! Key and modifier normalization
//!
//! Raw binding specifiers arrive in many spellings ("ctrl+q", "Ctrl+q",
//! "CTRL+Q"). Everything downstream (the resolver table, the keystroke
//! matcher, conflict checks) compares keys as strings, so parsing must
//! produce one canonical spelling per physical key combination.
//!
//! A specifier is a *sequence* of 1–4 keystroke units separated by `-`.
//! Modifiers attach to their unit with `+`, in the canonical order
//! Ctrl, Alt, Shift, Meta:
//!
//! ```text
//! "shift+cmd+left"  → "Shift+Meta+LEFT"
//! "a-b-c"           → "a-b-c"        (three-unit sequence)
//! "Ctrl+-"          → "Ctrl+-"       (literal dash key)
//! ```

use std::fmt;

/// Maximum number of keystroke units in one binding sequence.
pub const MAX_SEQUENCE_KEYS: usize = 4;

/// Separator between units of a multi-keystroke sequence.
pub const SEQUENCE_SEPARATOR: char = '-';

/// Modifier keys as a bitfield for efficient storage and comparison
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const ALT: Modifiers = Modifiers(0b0010);
    pub const SHIFT: Modifiers = Modifiers(0b0100);
    pub const META: Modifiers = Modifiers(0b1000); // Cmd on macOS, Win elsewhere

    /// Check if ctrl is held
    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b0001 != 0
    }

    /// Check if alt/option is held
    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & 0b0010 != 0
    }

    /// Check if shift is held
    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & 0b0100 != 0
    }

    /// Check if meta (cmd/win) is held
    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & 0b1000 != 0
    }

    /// Check if no modifiers are held
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Combine two modifier sets
    #[inline]
    pub const fn union(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 | other.0)
    }

    /// Remove the modifiers in `other` from this set
    #[inline]
    pub const fn without(self, other: Modifiers) -> Modifiers {
        Modifiers(self.0 & !other.0)
    }

    /// Parse a single modifier name, accepting common aliases.
    pub fn from_name(name: &str) -> Option<Modifiers> {
        match name.to_ascii_lowercase().as_str() {
            "ctrl" | "control" | "ctl" => Some(Modifiers::CTRL),
            "alt" | "option" | "opt" => Some(Modifiers::ALT),
            "shift" => Some(Modifiers::SHIFT),
            "meta" | "cmd" | "command" | "super" | "win" => Some(Modifiers::META),
            _ => None,
        }
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl() {
            parts.push("Ctrl");
        }
        if self.alt() {
            parts.push("Alt");
        }
        if self.shift() {
            parts.push("Shift");
        }
        if self.meta() {
            parts.push("Meta");
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// Errors that can occur when parsing a key specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    /// The specifier (or one of its units) was empty
    EmptyKey,
    /// A `+`-separated prefix was not a recognized modifier name
    UnknownModifier(String),
    /// More than [`MAX_SEQUENCE_KEYS`] units in one sequence
    TooManyKeys(usize),
}

impl fmt::Display for KeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyParseError::EmptyKey => write!(f, "empty key specifier"),
            KeyParseError::UnknownModifier(m) => write!(f, "unknown modifier: {}", m),
            KeyParseError::TooManyKeys(n) => {
                write!(f, "key sequence has {} units (max {})", n, MAX_SEQUENCE_KEYS)
            }
        }
    }
}

impl std::error::Error for KeyParseError {}

/// A normalized keystroke sequence: 1–4 canonical units.
///
/// The joined form (units joined with `-`) is the lookup key used by the
/// resolver table and the keystroke matcher.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeySequence {
    units: Vec<String>,
}

impl KeySequence {
    /// Parse and normalize a raw key specifier.
    pub fn parse(raw: &str) -> Result<KeySequence, KeyParseError> {
        let raw_units = split_units(raw)?;
        if raw_units.len() > MAX_SEQUENCE_KEYS {
            return Err(KeyParseError::TooManyKeys(raw_units.len()));
        }
        let units = raw_units
            .iter()
            .map(|u| normalize_unit(u))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(KeySequence { units })
    }

    /// The canonical per-keystroke units, in press order.
    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// Number of keystroke units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// The canonical joined form used as a lookup key.
    pub fn joined(&self) -> String {
        self.units.join("-")
    }

    /// The joined form of the first `n` units (strict prefixes for
    /// partial-sequence handling).
    pub fn prefix_joined(&self, n: usize) -> String {
        self.units[..n].join("-")
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.joined())
    }
}

/// Normalize a single keystroke unit like "ctrl+shift+q" to "Ctrl+Q".
pub fn normalize_unit(raw: &str) -> Result<String, KeyParseError> {
    if raw.is_empty() {
        return Err(KeyParseError::EmptyKey);
    }

    // Split off the key name. A trailing '+' means the key itself is '+'.
    let (mods_part, key_part) = match raw.rfind('+') {
        Some(idx) if idx + 1 < raw.len() => (&raw[..idx], &raw[idx + 1..]),
        Some(_) => {
            let head = raw.strip_suffix('+').unwrap_or(raw);
            match head.strip_suffix('+') {
                Some(mods) => (mods, "+"),
                None if head.is_empty() => ("", "+"),
                // "Ctrl+" and the like: modifiers with no key
                None => return Err(KeyParseError::EmptyKey),
            }
        }
        None => ("", raw),
    };

    let mut mods = Modifiers::NONE;
    if !mods_part.is_empty() {
        for name in mods_part.split('+') {
            if name.is_empty() {
                return Err(KeyParseError::EmptyKey);
            }
            match Modifiers::from_name(name) {
                Some(m) => mods = mods | m,
                None => return Err(KeyParseError::UnknownModifier(name.to_string())),
            }
        }
    }

    let mut key = canonical_key_name(key_part)?;

    // Shift plus a letter is the same physical press as the uppercase letter;
    // fold to one spelling so both collide in the table.
    if mods.shift() && key.len() == 1 && key.chars().all(|c| c.is_ascii_alphabetic()) {
        key = key.to_ascii_uppercase();
        mods = mods.without(Modifiers::SHIFT);
    }

    if mods.is_empty() {
        Ok(key)
    } else {
        Ok(format!("{}+{}", mods, key))
    }
}

/// Canonical spelling for a key name.
///
/// Single printable characters are case-sensitive and pass through
/// unchanged. Named keys are looked up case-insensitively against the alias
/// table; unrecognized multi-character names are uppercased so independent
/// parses still agree.
fn canonical_key_name(name: &str) -> Result<String, KeyParseError> {
    if name.is_empty() {
        return Err(KeyParseError::EmptyKey);
    }
    if name.chars().count() == 1 {
        return Ok(name.to_string());
    }

    let lower = name.to_ascii_lowercase();

    // F1-F24
    if let Some(num) = lower.strip_prefix('f') {
        if let Ok(n) = num.parse::<u8>() {
            if (1..=24).contains(&n) {
                return Ok(format!("F{}", n));
            }
        }
    }

    let canonical = match lower.as_str() {
        "space" | "spacebar" => "SPACE",
        "enter" | "return" | "cr" => "ENTER",
        "esc" | "escape" => "ESC",
        "tab" => "TAB",
        "bs" | "backspace" => "BS",
        "del" | "delete" => "DEL",
        "ins" | "insert" => "INS",
        "home" => "HOME",
        "end" => "END",
        "pgup" | "pageup" | "page_up" => "PGUP",
        "pgdwn" | "pgdown" | "pagedown" | "pgdn" | "page_down" => "PGDWN",
        "left" | "arrowleft" => "LEFT",
        "right" | "arrowright" => "RIGHT",
        "up" | "arrowup" => "UP",
        "down" | "arrowdown" => "DOWN",
        "sharp" | "hash" => "SHARP",
        "play" => "PLAY",
        "pause" => "PAUSE",
        "playpause" | "play_pause" => "PLAYPAUSE",
        "stop" => "STOP",
        "mute" => "MUTE",
        "prev" => "PREV",
        "next" => "NEXT",
        "volume_up" => "VOLUME_UP",
        "volume_down" => "VOLUME_DOWN",
        _ => return Ok(name.to_ascii_uppercase()),
    };
    Ok(canonical.to_string())
}

/// Split a raw specifier into its keystroke units.
///
/// A `-` separates units unless the text accumulated so far is empty or ends
/// with `+` (in which case the dash is the key itself: "-", "Ctrl+-", "a-Ctrl+-").
fn split_units(raw: &str) -> Result<Vec<String>, KeyParseError> {
    if raw.is_empty() {
        return Err(KeyParseError::EmptyKey);
    }
    let mut units = Vec::new();
    let mut cur = String::new();
    for c in raw.chars() {
        if c == SEQUENCE_SEPARATOR && !cur.is_empty() && !cur.ends_with('+') {
            units.push(std::mem::take(&mut cur));
        } else {
            cur.push(c);
        }
    }
    if cur.is_empty() {
        // Trailing separator, e.g. "a-"
        return Err(KeyParseError::EmptyKey);
    }
    units.push(cur);
    Ok(units)
}
