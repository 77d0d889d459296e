//! Application services orchestrating due-date automation.

mod automation;

pub use automation::{
    AutomationEngine, CycleError, CycleReport, EngineConfig, ItemFailure, ItemOperation,
};
