//! Drawing surfaces the layout engine renders onto.
//!
//! A [`Surface`] knows the page geometry, can measure text and draw boxed text
//! runs and lines at absolute positions, and can start a new page.  It keeps
//! no vertical cursor of its own: the layout engine owns the cursor through
//! [`crate::layout::LayoutState`] and passes explicit coordinates.  All values
//! are millimetres measured from the top-left corner of the page.

use genpdf::style::Color;

use crate::error::ReportError;

pub mod pdf;
pub mod recording;

pub use pdf::PdfSurface;
pub use recording::{DrawOp, RecordingSurface};

/// Page dimensions and content margins in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margins: PageMargins,
}

impl PageGeometry {
    /// A4 portrait with the report's default margins.
    pub fn a4() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margins: PageMargins::default(),
        }
    }

    /// Lowest position content may reach.
    pub fn content_bottom(&self) -> f64 {
        self.height - self.margins.bottom
    }

    /// Usable width between the left and right margins.
    pub fn content_width(&self) -> f64 {
        self.width - self.margins.left - self.margins.right
    }

    /// Right edge of the content area.
    pub fn content_right(&self) -> f64 {
        self.width - self.margins.right
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Page margins in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageMargins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl PageMargins {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

impl Default for PageMargins {
    fn default() -> Self {
        Self::new(30.0, 20.0, 20.0, 20.0)
    }
}

/// Font face selection within the report's font family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontFace {
    Regular,
    Bold,
    #[default]
    Italic,
    BoldItalic,
}

/// Text attributes understood by every surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in points.
    pub size: u8,
    pub face: FontFace,
    pub color: Color,
}

impl TextStyle {
    pub fn new(size: u8, face: FontFace) -> Self {
        Self {
            size,
            face,
            color: Color::Rgb(0, 0, 0),
        }
    }

    /// Returns a copy of the style using `color`.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Rectangle a single line of text is drawn into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Background painted behind the text.
    pub fill: Option<Color>,
    /// Horizontal inset of the text from the left edge.
    pub padding: f64,
}

impl TextBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            fill: None,
            padding: 0.0,
        }
    }

    pub fn with_fill(mut self, fill: Option<Color>) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }
}

/// A point on the current page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Drawing primitives consumed by the layout engine.
///
/// Surfaces are single-owner: a render holds the only `&mut` reference for
/// its whole duration.
pub trait Surface {
    /// Geometry shared by every page of the document.
    fn geometry(&self) -> PageGeometry;

    /// Width of `text` rendered with `style`.
    fn measure_text(&self, text: &str, style: &TextStyle) -> f64;

    /// Draws one line of text into `area` on the current page.
    fn draw_text_box(
        &mut self,
        area: TextBox,
        text: &str,
        style: &TextStyle,
    ) -> Result<(), ReportError>;

    /// Draws a straight line on the current page.
    fn draw_line(&mut self, from: Point, to: Point, color: Color) -> Result<(), ReportError>;

    /// Starts a new page and returns its 1-based number.
    fn new_page(&mut self) -> Result<usize, ReportError>;
}
