//! Long-press drag reordering for a grid of cards.
//!
//! [`ReorderController`] is the headless gesture state machine. It talks to
//! whatever draws the cards through [`CardSurface`]; [`ReorderGridPlugin`]
//! provides that surface for Bevy UI nodes.

mod config;
mod controller;
pub mod order;
mod overlap;
mod plugin;
mod surface;

pub use config::GridConfig;
pub use controller::{
    DragSession, GridEvent, PendingPress, PointerButton, ReorderController, SessionState,
};
pub use overlap::{SwapCandidate, best_candidate, overlap_area};
pub use plugin::{
    CardId, CardOffset, GridController, PointerCapture, PointerFrame, ReorderCard, ReorderGrid,
    ReorderGridEvent, ReorderGridPlugin,
};
pub use surface::{CardSurface, Transition};
