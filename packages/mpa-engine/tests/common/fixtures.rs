//! Test fixture generators
//!
//! Small control-flow automata and the property automata they exercise.

use std::sync::Arc;

use mpa_engine::{
    Automaton, Cfa, CfaBuilder, FileAutomaton, ForbiddenCallAutomaton, LockAutomaton, NodeId,
};

/// Statements that keep every fixpoint above the default sanity floor
pub const PADDING: usize = 10;

fn padded(b: &mut CfaBuilder) -> NodeId {
    let entry = b.entry();
    b.chain(entry, (0..PADDING).map(|i| format!("x = {};", i)))
}

/// Append one call per name after `from`; returns the last node
pub fn calls(b: &mut CfaBuilder, from: NodeId, functions: &[&str]) -> NodeId {
    let mut current = from;
    for function in functions {
        let next = b.add_node();
        b.call(current, next, *function);
        current = next;
    }
    current
}

/// Straight-line program calling `functions` in order
pub fn fixture_call_sequence(functions: &[&str]) -> Arc<Cfa> {
    let mut b = Cfa::builder("main");
    let start = padded(&mut b);
    let last = calls(&mut b, start, functions);
    b.mark_exit(last);
    Arc::new(b.build())
}

/// lock(); unlock(); lock(); lock();
pub fn fixture_double_lock() -> Arc<Cfa> {
    fixture_call_sequence(&["lock", "unlock", "lock", "lock"])
}

/// Two branches: one locks twice, the other unlocks an unlocked lock
pub fn fixture_two_violations() -> Arc<Cfa> {
    let mut b = Cfa::builder("main");
    let start = padded(&mut b);
    let then_node = b.add_node();
    let else_node = b.add_node();
    b.assume(start, then_node, "c", true);
    b.assume(start, else_node, "c", false);
    let then_end = calls(&mut b, then_node, &["lock", "lock"]);
    let else_end = calls(&mut b, else_node, &["unlock"]);
    let exit = b.add_node();
    b.blank(then_end, exit);
    b.blank(else_end, exit);
    b.mark_exit(exit);
    Arc::new(b.build())
}

/// `while (c) { body }` at `head`; returns the loop exit node
pub fn while_loop(b: &mut CfaBuilder, head: NodeId, body: &[&str]) -> NodeId {
    let body_start = b.add_node();
    b.assume(head, body_start, "c", true);
    let body_end = calls(b, body_start, body);
    b.blank(body_end, head);
    let out = b.add_node();
    b.assume(head, out, "c", false);
    out
}

/// while (c) { lock(); unlock(); }
pub fn fixture_lock_unlock_loop() -> Arc<Cfa> {
    let mut b = Cfa::builder("main");
    let head = padded(&mut b);
    let out = while_loop(&mut b, head, &["lock", "unlock"]);
    b.mark_exit(out);
    Arc::new(b.build())
}

/// while (c) { lock(); }
pub fn fixture_lock_loop() -> Arc<Cfa> {
    let mut b = Cfa::builder("main");
    let head = padded(&mut b);
    let out = while_loop(&mut b, head, &["lock"]);
    b.mark_exit(out);
    Arc::new(b.build())
}

/// A program that is safe for every property of [`fixture_five_properties`]
pub fn fixture_safe_program() -> Arc<Cfa> {
    fixture_call_sequence(&["lock", "unlock", "fopen", "fread", "fclose"])
}

/// Lock, file and call-forbidden automata: five properties in total
pub fn fixture_five_properties() -> Vec<Automaton> {
    vec![
        LockAutomaton::define().unwrap(),
        FileAutomaton::define().unwrap(),
        ForbiddenCallAutomaton::define("unreach_call", "reach_error").unwrap(),
    ]
}

/// Lock and file automata: four properties
pub fn fixture_lock_and_file() -> Vec<Automaton> {
    vec![LockAutomaton::define().unwrap(), FileAutomaton::define().unwrap()]
}

/// Locking automaton in the YAML definition format
pub const LOCKING_YAML: &str = r#"
automaton: Locking
initial_state: Unlocked
properties: [yaml_double_lock]
states:
  - name: Unlocked
  - name: Locked
  - name: Error
    kind: target
transitions:
  - from: Unlocked
    matcher: { kind: call, function: lock }
    to: Locked
  - from: Locked
    matcher: { kind: call, function: unlock }
    to: Unlocked
  - from: Locked
    matcher: { kind: call, function: lock }
    to: Error
    properties: [yaml_double_lock]
"#;
