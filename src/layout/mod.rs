//! Layout flow: cursor state, page-break policy and block emitters.

pub mod engine;
pub mod policy;
pub mod state;
pub mod wrap;

pub use engine::{heading_font_size, HeadingMark, LayoutEngine};
pub use policy::{AffinityRule, BreakPolicy, BreakReason, ContentRule, Decision, HeadingRule};
pub use state::{HeadingPosition, LayoutState};
