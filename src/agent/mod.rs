pub mod agent;
pub use agent::*;

pub mod undo;
pub use undo::*;
