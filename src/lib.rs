//! Core entry point for the md_report crate.
//!
//! Converts Markdown into paginated PDF reports.  The interesting part is the
//! layout flow in [`layout`]: every block consults a [`BreakPolicy`] before it
//! is drawn so headings stay with the content that follows them.

pub mod builder;
pub mod error;
pub mod fonts;
pub mod highlight;
pub mod layout;
pub mod logo;
pub mod markdown;
pub mod metadata;
pub mod model;
pub mod outline;
pub mod surface;
pub mod sysinfo;

pub use builder::{RenderedReport, ReportBuilder};
pub use error::ReportError;
pub use layout::{BreakPolicy, HeadingMark, LayoutEngine, LayoutState};
pub use model::{Block, BlockKind};
pub use surface::{PageGeometry, PageMargins, Surface};
