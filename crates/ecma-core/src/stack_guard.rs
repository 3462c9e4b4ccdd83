//! Native stack budget for recursive walkers.
//!
//! The parser, the static checker and the interpreter all recurse over
//! guest-controlled structure. A [`StackGuard`] is anchored when one of them
//! starts and reports exhaustion once the walk has used more native stack
//! than its budget, so the walker can fail with a guest-visible error long
//! before the thread's real stack runs out.

use std::hint::black_box;

/// Budget of one evaluation's interpreter, nested `eval` included.
pub const INTERPRETER_STACK_BUDGET: usize = 768 * 1024;

/// Budget of one parse or check pass.
pub const COMPILE_STACK_BUDGET: usize = 512 * 1024;

/// Measures native stack use from the point it was anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackGuard {
    base: usize,
    budget: usize,
}

impl StackGuard {
    /// Anchor a guard at the caller's stack position.
    #[inline(never)]
    pub fn anchor(budget: usize) -> Self {
        Self {
            base: stack_position(),
            budget,
        }
    }

    /// Bytes of stack used since the guard was anchored.
    #[inline(never)]
    pub fn used(&self) -> usize {
        self.base.abs_diff(stack_position())
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Whether the walk has outgrown its budget.
    pub fn is_exhausted(&self) -> bool {
        self.used() > self.budget
    }
}

/// Address of a local in the current frame.
#[inline(always)]
fn stack_position() -> usize {
    let marker = 0u8;
    black_box(&marker) as *const u8 as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descend(guard: &StackGuard, depth: usize) -> usize {
        let padding = black_box([0u8; 512]);
        if guard.is_exhausted() {
            return depth;
        }
        descend(guard, depth + 1) + usize::from(padding[0])
    }

    #[test]
    fn fresh_guard_has_headroom() {
        let guard = StackGuard::anchor(64 * 1024);
        assert!(!guard.is_exhausted());
        assert!(guard.used() < guard.budget());
    }

    #[test]
    fn recursion_stops_at_budget() {
        let guard = StackGuard::anchor(64 * 1024);
        let depth = descend(&guard, 0);
        assert!(depth > 0);
        assert!(depth <= 64 * 1024 / 512 + 1);
    }
}
