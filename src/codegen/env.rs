use std::collections::HashMap;

use tracing::trace;

use super::instruction::Label;

/// Jump targets of one enclosing loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopLabels {
    /// Where `continue` goes: the loop's update phase
    pub continue_label: Label,
    /// Where `break` goes: just past the loop
    pub break_label: Label,
}

/// Per-compile code generation state: variable slots, the loop-control
/// stack and the label counter
#[derive(Debug, Default)]
pub struct Environment {
    slots: HashMap<String, usize>,
    loops: Vec<LoopLabels>,
    next_label: usize,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot of `name`, allocating the next free one on first reference
    pub fn slot(&mut self, name: &str) -> usize {
        if let Some(&slot) = self.slots.get(name) {
            return slot;
        }
        let slot = self.slots.len();
        self.slots.insert(name.to_string(), slot);
        trace!(name, slot, "allocated variable slot");
        slot
    }

    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    /// Number of distinct variables seen so far
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    /// A label never handed out before in this compile
    pub fn fresh_label(&mut self, category: &str) -> Label {
        let label = Label::new(category, self.next_label);
        self.next_label += 1;
        trace!(%label, "allocated label");
        label
    }

    /// Open a loop: allocate its continue/break labels and make them the
    /// innermost targets
    pub fn enter_loop(&mut self) -> LoopLabels {
        let labels = LoopLabels {
            continue_label: self.fresh_label("continue"),
            break_label: self.fresh_label("endloop"),
        };
        self.loops.push(labels.clone());
        labels
    }

    pub fn leave_loop(&mut self) -> Option<LoopLabels> {
        self.loops.pop()
    }

    /// Targets of the innermost loop, `None` outside any loop
    pub fn innermost_loop(&self) -> Option<&LoopLabels> {
        self.loops.last()
    }

    pub fn loop_depth(&self) -> usize {
        self.loops.len()
    }
}
