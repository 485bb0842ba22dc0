pub mod coin;
pub use coin::*;

pub mod tiger;
pub use tiger::*;

pub mod grid;
pub use grid::*;

pub mod rps;
pub use rps::*;

pub mod kuhn;
pub use kuhn::*;

pub mod pacman;
pub use pacman::*;

use crate::Action;
use crate::Percept;

/// The capability set every environment driver offers the interaction
/// loop: take an action, expose the resulting percept, say when the game
/// is over. Environments with naturally signed rewards shift them into
/// the unsigned range behind this interface with a private offset.
pub trait Environment {
    /// receive the agent's action and compute the next percept
    fn perform_action(&mut self, action: Action);

    /// the current observation
    fn observation(&self) -> Percept;

    /// the current reward, already shifted into the unsigned range
    fn reward(&self) -> Percept;

    /// true once the environment can no longer interact
    fn is_finished(&self) -> bool {
        false
    }
}
