//! Presentation-agnostic state for the main screens.
//!
//! Each view model owns the data one screen renders plus the load/error
//! flags around it. They know nothing about widgets; a shell reads their
//! accessors after every await and redraws.

mod create;
mod detail;
mod list;

pub use create::*;
pub use detail::*;
pub use list::*;

/// Handle tying an in-flight load to the model generation that issued it.
///
/// A model hands out a ticket when a load starts and only accepts the
/// result if no newer load or invalidation happened in between, so a slow
/// response can never clobber fresher state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    fn new(generation: u64) -> Self {
        Self { generation }
    }

    fn matches(&self, generation: u64) -> bool {
        self.generation == generation
    }
}
