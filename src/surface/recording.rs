//! In-memory surface that records every drawing call.
//!
//! Used by the test-suite and handy for inspecting pagination decisions
//! without producing a PDF.  Text width is approximated from the character
//! count, which keeps results deterministic across platforms.

use genpdf::style::Color;

use super::{PageGeometry, Point, Surface, TextBox, TextStyle};
use crate::error::ReportError;

/// Approximate advance of one character per point of font size.
const CHAR_WIDTH_PER_PT: f64 = 0.18;

/// A single recorded drawing call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Text {
        page: usize,
        area: TextBox,
        text: String,
        style: TextStyle,
    },
    Line {
        page: usize,
        from: Point,
        to: Point,
        color: Color,
    },
    NewPage {
        page: usize,
    },
}

/// Surface implementation that keeps a log of [`DrawOp`]s.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    geometry: PageGeometry,
    page: usize,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            page: 1,
            ops: Vec::new(),
        }
    }

    /// Returns the recorded calls in order.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Number of pages started so far, the first page included.
    pub fn page_count(&self) -> usize {
        self.page
    }

    /// Number of page breaks requested.
    pub fn page_breaks(&self) -> usize {
        self.page - 1
    }

    /// Text runs in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = (&TextBox, &str, usize)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text {
                page, area, text, ..
            } => Some((area, text.as_str(), *page)),
            _ => None,
        })
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new(PageGeometry::default())
    }
}

impl Surface for RecordingSurface {
    fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> f64 {
        text.chars().count() as f64 * f64::from(style.size) * CHAR_WIDTH_PER_PT
    }

    fn draw_text_box(
        &mut self,
        area: TextBox,
        text: &str,
        style: &TextStyle,
    ) -> Result<(), ReportError> {
        self.ops.push(DrawOp::Text {
            page: self.page,
            area,
            text: text.to_owned(),
            style: *style,
        });
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color) -> Result<(), ReportError> {
        self.ops.push(DrawOp::Line {
            page: self.page,
            from,
            to,
            color,
        });
        Ok(())
    }

    fn new_page(&mut self) -> Result<usize, ReportError> {
        self.page += 1;
        self.ops.push(DrawOp::NewPage { page: self.page });
        Ok(self.page)
    }
}
