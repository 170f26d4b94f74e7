//! Menstrual cycle phase.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A coarse stage of the menstrual cycle.
///
/// The declaration order is the display order; comparison logic never
/// relies on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Menstrual,
    Follicular,
    Ovulatory,
    Luteal,
}

impl Phase {
    /// All phases in display order.
    pub const ALL: [Phase; 4] = [
        Phase::Menstrual,
        Phase::Follicular,
        Phase::Ovulatory,
        Phase::Luteal,
    ];

    /// Returns the machine identifier of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Menstrual => "menstrual",
            Phase::Follicular => "follicular",
            Phase::Ovulatory => "ovulatory",
            Phase::Luteal => "luteal",
        }
    }

    /// Returns the user-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Menstrual => "Menstruelle",
            Phase::Follicular => "Folliculaire",
            Phase::Ovulatory => "Ovulatoire",
            Phase::Luteal => "Lutéale",
        }
    }

    /// Position of the phase within a cycle, starting at 0.
    pub fn display_order(&self) -> u8 {
        match self {
            Phase::Menstrual => 0,
            Phase::Follicular => 1,
            Phase::Ovulatory => 2,
            Phase::Luteal => 3,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
