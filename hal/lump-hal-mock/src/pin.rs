//! Recording TX pin

use std::cell::RefCell;
use std::rc::Rc;

use lump_hal::TxPin;

#[derive(Default)]
struct PinState {
    is_output: bool,
    high: bool,
    /// Every driven level in order.
    levels: Vec<bool>,
}

/// Pin double recording direction and level changes.
#[derive(Clone, Default)]
pub struct MockPin {
    state: Rc<RefCell<PinState>>,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_output(&self) -> bool {
        self.state.borrow().is_output
    }

    pub fn is_high(&self) -> bool {
        self.state.borrow().high
    }

    /// Levels driven so far, oldest first.
    pub fn levels(&self) -> Vec<bool> {
        self.state.borrow().levels.clone()
    }
}

impl TxPin for MockPin {
    fn set_output(&mut self) {
        self.state.borrow_mut().is_output = true;
    }

    fn set_high(&mut self) {
        let mut state = self.state.borrow_mut();
        state.high = true;
        state.levels.push(true);
    }

    fn set_low(&mut self) {
        let mut state = self.state.borrow_mut();
        state.high = false;
        state.levels.push(false);
    }
}
