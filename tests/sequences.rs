//! End-to-end keystroke sequence tests through a player session
//!
//! Mirrors the event layer's view: raw keystrokes in, Matched / Ignored /
//! NoMatch out.

mod common;

use common::{script_mapping, session_with_defaults};
use keystack::{KeyResolution, SectionOrigin};

fn expect_match(result: KeyResolution) -> (String, String) {
    match result {
        KeyResolution::Matched { mapping, section } => (mapping.action_string(), section),
        other => panic!("expected Matched, got {:?}", other),
    }
}

#[test]
fn test_typing_a_full_sequence() {
    let session = session_with_defaults(&[("a-b-c", "cmd3")]);

    assert_eq!(session.resolve("a"), KeyResolution::Ignored);
    assert_eq!(session.resolve("b"), KeyResolution::Ignored);
    let (action, section) = expect_match(session.resolve("c"));
    assert_eq!(action, "cmd3");
    assert_eq!(section, "default");
}

#[test]
fn test_shortest_match_fires_and_resets() {
    let session = session_with_defaults(&[("a", "cmdA"), ("a-b", "cmdAB"), ("b", "cmdB")]);

    // "a" fires immediately even though it also starts "a-b"
    let (action, _) = expect_match(session.resolve("a"));
    assert_eq!(action, "cmdA");

    // The history was cleared, so "b" starts fresh instead of completing a-b
    let (action, _) = expect_match(session.resolve("b"));
    assert_eq!(action, "cmdB");
}

#[test]
fn test_unbound_key_is_no_match() {
    let session = session_with_defaults(&[("q", "quit")]);
    assert_eq!(session.resolve("z"), KeyResolution::NoMatch);
}

#[test]
fn test_partial_then_unrelated_key() {
    let session = session_with_defaults(&[("a-b", "cmdAB")]);

    assert_eq!(session.resolve("a"), KeyResolution::Ignored);
    // "z" completes nothing: not z, not a-z
    assert_eq!(session.resolve("z"), KeyResolution::NoMatch);
}

#[test]
fn test_handled_elsewhere_clears_partial_sequence() {
    let session = session_with_defaults(&[("a-b", "cmdAB"), ("b", "cmdB")]);

    assert_eq!(session.resolve("a"), KeyResolution::Ignored);
    // A menu accelerator consumed the next keystroke before us
    session.notify_handled_elsewhere();

    // "b" resolves on its own; the stale "a" prefix is gone
    let (action, _) = expect_match(session.resolve("b"));
    assert_eq!(action, "cmdB");
}

#[test]
fn test_keystroke_spelling_does_not_matter() {
    let session = session_with_defaults(&[("shift+ctrl+left", "seek-back")]);

    let (action, _) = expect_match(session.resolve("ctrl+shift+LEFT"));
    assert_eq!(action, "seek-back");
}

#[test]
fn test_modal_section_swallows_and_restores() {
    let session = session_with_defaults(&[("q", "quit")]);

    session.define_section(
        "modal",
        vec![script_mapping("x", "pick")],
        "force",
        SectionOrigin::Script,
    );
    session.enable_section("modal", ["exclusive"]);

    // Inside the modal section "q" no longer resolves
    assert_eq!(session.resolve("q"), KeyResolution::NoMatch);
    let (action, _) = expect_match(session.resolve("x"));
    assert_eq!(action, "pick");

    session.disable_section("modal");
    let (action, _) = expect_match(session.resolve("q"));
    assert_eq!(action, "quit");
}

#[test]
fn test_authored_ignore_binding() {
    let session = session_with_defaults(&[("w", "ignore")]);
    assert_eq!(session.resolve("w"), KeyResolution::Ignored);
}

#[test]
fn test_sequence_across_section_change_does_not_leak() {
    let session = session_with_defaults(&[("a-b", "cmdAB")]);

    assert_eq!(session.resolve("a"), KeyResolution::Ignored);

    // The sequence's section disappears mid-sequence
    session.define_section("noop", vec![script_mapping("z", "zed")], "force", SectionOrigin::Script);
    session.enable_section("noop", ["exclusive"]);

    // a-b is no longer in the table; "b" matches nothing
    assert_eq!(session.resolve("b"), KeyResolution::NoMatch);
}
