//! Units: archetype rules and the per-unit actor

pub mod actor;
pub mod archetype;

pub use actor::{UnitCommand, UnitHandle, UnitProfile, UnitState, UnitStatus};
pub use archetype::{Archetype, UnitStats, PRODUCIBLE};
