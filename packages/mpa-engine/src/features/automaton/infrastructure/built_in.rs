/*
 * Built-in Automata
 *
 * Standard property automata usable without a definition file:
 * - LockAutomaton: double lock / double unlock
 * - FileAutomaton: close of an unopened file, use after close
 * - MemoryAutomaton: use after free, double free
 * - ForbiddenCallAutomaton: reachability of a call (e.g. `reach_error`)
 */

use crate::config::ConfigResult;
use crate::features::automaton::domain::{Automaton, EdgeMatcher, StateKind, TransitionSpec};

/// Lock automaton
///
/// States: Unlocked → Locked → Unlocked
///
/// Violations:
/// - `double_lock`: lock() while Locked
/// - `double_unlock`: unlock() while Unlocked
pub struct LockAutomaton;

impl LockAutomaton {
    pub fn define() -> ConfigResult<Automaton> {
        Automaton::builder("Lock")
            .state("Unlocked", StateKind::Normal)
            .state("Locked", StateKind::Normal)
            .state("DoubleLock", StateKind::Target)
            .state("DoubleUnlock", StateKind::Target)
            .initial("Unlocked")
            .property("double_lock")
            .property("double_unlock")
            .transition(TransitionSpec::new(
                "Unlocked",
                EdgeMatcher::call("lock"),
                "Locked",
            ))
            .transition(TransitionSpec::new(
                "Locked",
                EdgeMatcher::call("unlock"),
                "Unlocked",
            ))
            .transition(
                TransitionSpec::new("Locked", EdgeMatcher::call("lock"), "DoubleLock")
                    .for_property("double_lock"),
            )
            .transition(
                TransitionSpec::new("Unlocked", EdgeMatcher::call("unlock"), "DoubleUnlock")
                    .for_property("double_unlock"),
            )
            .build()
    }
}

/// File automaton
///
/// States: Closed → Open → Closed
///
/// Violations:
/// - `close_unopened`: fclose() on a Closed file
/// - `use_after_close`: fread()/fwrite() on a Closed file
pub struct FileAutomaton;

impl FileAutomaton {
    pub fn define() -> ConfigResult<Automaton> {
        let io = EdgeMatcher::AnyOf(vec![EdgeMatcher::call("fread"), EdgeMatcher::call("fwrite")]);
        Automaton::builder("File")
            .state("Closed", StateKind::Normal)
            .state("Open", StateKind::Normal)
            .state("CloseUnopened", StateKind::Target)
            .state("UseAfterClose", StateKind::Target)
            .initial("Closed")
            .property("close_unopened")
            .property("use_after_close")
            .transition(TransitionSpec::new("Closed", EdgeMatcher::call("fopen"), "Open"))
            .transition(TransitionSpec::new("Open", EdgeMatcher::call("fclose"), "Closed"))
            .transition(
                TransitionSpec::new("Closed", EdgeMatcher::call("fclose"), "CloseUnopened")
                    .for_property("close_unopened"),
            )
            .transition(
                TransitionSpec::new("Closed", io, "UseAfterClose").for_property("use_after_close"),
            )
            .build()
    }
}

/// Heap automaton
///
/// States: Unallocated → Allocated → Freed
///
/// Violations:
/// - `use_after_free`: a dereference (`*p`, `p->`, `p[`) after free()
/// - `double_free`: free() on a Freed block
pub struct MemoryAutomaton;

impl MemoryAutomaton {
    pub fn define() -> ConfigResult<Automaton> {
        let deref = EdgeMatcher::label(r"\*\s*p\b|\bp\s*->|\bp\s*\[")?;
        Automaton::builder("Memory")
            .state("Unallocated", StateKind::Normal)
            .state("Allocated", StateKind::Normal)
            .state("Freed", StateKind::Normal)
            .state("UseAfterFree", StateKind::Target)
            .state("DoubleFree", StateKind::Target)
            .initial("Unallocated")
            .property("use_after_free")
            .property("double_free")
            .transition(TransitionSpec::new(
                "Unallocated",
                EdgeMatcher::call("malloc"),
                "Allocated",
            ))
            .transition(TransitionSpec::new("Allocated", EdgeMatcher::call("free"), "Freed"))
            .transition(TransitionSpec::new("Freed", EdgeMatcher::call("malloc"), "Allocated"))
            .transition(
                TransitionSpec::new("Freed", deref, "UseAfterFree").for_property("use_after_free"),
            )
            .transition(
                TransitionSpec::new("Freed", EdgeMatcher::call("free"), "DoubleFree")
                    .for_property("double_free"),
            )
            .build()
    }
}

/// Reaching a call of `function` violates the property `name`
pub struct ForbiddenCallAutomaton;

impl ForbiddenCallAutomaton {
    pub fn define(name: &str, function: &str) -> ConfigResult<Automaton> {
        Automaton::builder(name)
            .state("Init", StateKind::Normal)
            .state("Error", StateKind::Target)
            .initial("Init")
            .transition(TransitionSpec::new(
                "Init",
                EdgeMatcher::call(function),
                "Error",
            ))
            .build()
    }
}
