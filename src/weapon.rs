//! Weapon collaborator
//!
//! The session loads and empties the clip through [`WeaponAdapter`]. The weapon
//! side reports an empty clip back with `Session::on_ammunition_exhausted`.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::AdapterError;

pub trait WeaponAdapter {
    fn set_ammunition_capacity(&mut self, rounds: u32) -> Result<(), AdapterError>;
}

/// Clip shared between the session and whoever pulls the trigger
#[derive(Debug, Clone, Default)]
pub struct SharedClip {
    rounds: Rc<Cell<u32>>,
}

impl SharedClip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rounds(&self) -> u32 {
        self.rounds.get()
    }

    /// Spend one round. Returns false if the clip was already empty.
    pub fn fire(&self) -> bool {
        match self.rounds.get() {
            0 => false,
            n => {
                self.rounds.set(n - 1);
                true
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.get() == 0
    }
}

impl WeaponAdapter for SharedClip {
    fn set_ammunition_capacity(&mut self, rounds: u32) -> Result<(), AdapterError> {
        self.rounds.set(rounds);
        Ok(())
    }
}
