use std::cell::Cell;
use std::rc::Rc;

/// Hands out increasing tickets so only the most recently issued request may
/// apply its result. Older responses that resolve late are dropped.
#[derive(Clone, Default)]
pub struct Sequencer {
    latest: Rc<Cell<u64>>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> u64 {
        let next = self.latest.get() + 1;
        self.latest.set(next);
        next
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.get() == ticket
    }
}
