//! Surface implementation backed by the `genpdf` renderer.
//!
//! Pages are created eagerly; every new page receives the logo and the footer
//! before any content is drawn on it.

use genpdf::fonts::{FontCache, FontData, FontFamily};
use genpdf::render::{Area, Renderer};
use genpdf::style::{Color, Style};
use genpdf::{Mm, Position, Rotation, Scale, Size};
use log::debug;

use super::{FontFace, PageGeometry, Point, Surface, TextBox, TextStyle};
use crate::error::ReportError;
use crate::logo::Logo;

/// Distance between the page top and the logo.
const LOGO_TOP_MM: f64 = 10.0;
/// Distance between the page bottom and the footer line.
const FOOTER_OFFSET_MM: f64 = 15.0;
const FOOTER_FONT_SIZE: u8 = 9;
/// Spacing of the hairlines used to paint box backgrounds.
const FILL_STEP_MM: f64 = 0.3;

fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

fn position(x: f64, y: f64) -> Position {
    Position::new(mm_from_f64(x), mm_from_f64(y))
}

/// Content repeated on every page.
#[derive(Default)]
pub struct PageFurniture {
    pub logo: Option<Logo>,
    pub footer: Option<String>,
}

/// A [`Surface`] that renders into a PDF document.
pub struct PdfSurface {
    renderer: Renderer,
    font_cache: FontCache,
    geometry: PageGeometry,
    paper: Size,
    furniture: PageFurniture,
    pages: usize,
}

impl PdfSurface {
    /// Creates the document with its first page.
    pub fn new(
        geometry: PageGeometry,
        font_family: FontFamily<FontData>,
        title: &str,
        furniture: PageFurniture,
    ) -> Result<Self, ReportError> {
        let paper = Size::new(mm_from_f64(geometry.width), mm_from_f64(geometry.height));
        let renderer = Renderer::new(paper, title)?;
        let mut font_cache = FontCache::new(font_family);
        font_cache.load_pdf_fonts(&renderer)?;

        let mut surface = Self {
            renderer,
            font_cache,
            geometry,
            paper,
            furniture,
            pages: 1,
        };
        surface.decorate_page()?;
        Ok(surface)
    }

    /// Number of pages created so far.
    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Serializes the document.
    pub fn into_bytes(self) -> Result<Vec<u8>, ReportError> {
        let mut bytes = Vec::new();
        self.renderer.write(&mut bytes)?;
        Ok(bytes)
    }

    fn area(&self) -> Area<'_> {
        self.renderer.last_page().last_layer().area()
    }

    fn pdf_style(style: &TextStyle) -> Style {
        let mut pdf_style = Style::new();
        pdf_style.set_font_size(style.size);
        pdf_style.set_color(style.color);
        match style.face {
            FontFace::Regular => {}
            FontFace::Bold => pdf_style.set_bold(),
            FontFace::Italic => pdf_style.set_italic(),
            FontFace::BoldItalic => {
                pdf_style.set_bold();
                pdf_style.set_italic();
            }
        }
        pdf_style
    }

    fn fill(&self, area: &TextBox, color: Color) {
        let page = self.area();
        let mut y = area.y;
        while y <= area.y + area.height {
            page.draw_line(
                vec![position(area.x, y), position(area.x + area.width, y)],
                Style::new().with_color(color),
            );
            y += FILL_STEP_MM;
        }
    }

    fn decorate_page(&mut self) -> Result<(), ReportError> {
        if let Some(logo) = &self.furniture.logo {
            let (width, height) = logo.rendered_size();
            let x = self.geometry.width - self.geometry.margins.right - width;
            let scale = logo.scale();
            // genpdf anchors images at their lower-left corner.
            self.area().add_image(
                logo.image(),
                position(x, LOGO_TOP_MM + height),
                Scale::new(scale, scale),
                Rotation::default(),
                Some(logo.dpi()),
            );
        }

        if let Some(footer) = &self.furniture.footer {
            let style = TextStyle::new(FOOTER_FONT_SIZE, FontFace::Italic);
            let width = self.measure_text(footer, &style);
            let x = ((self.geometry.width - width) / 2.0).max(0.0);
            let y = self.geometry.height - FOOTER_OFFSET_MM;
            self.area()
                .print_str(&self.font_cache, position(x, y), Self::pdf_style(&style), footer)?;
        }
        Ok(())
    }
}

impl Surface for PdfSurface {
    fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> f64 {
        mm_to_f64(Self::pdf_style(style).str_width(&self.font_cache, text))
    }

    fn draw_text_box(
        &mut self,
        area: TextBox,
        text: &str,
        style: &TextStyle,
    ) -> Result<(), ReportError> {
        if let Some(color) = area.fill {
            self.fill(&area, color);
        }

        let pdf_style = Self::pdf_style(style);
        let line_height = mm_to_f64(pdf_style.line_height(&self.font_cache));
        let offset = ((area.height - line_height) / 2.0).max(0.0);
        let printed = self.area().print_str(
            &self.font_cache,
            position(area.x + area.padding, area.y + offset),
            pdf_style,
            text,
        )?;
        if !printed {
            debug!("Text at y={:.1}mm did not fit the page: {:?}", area.y, text);
        }
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color) -> Result<(), ReportError> {
        self.area().draw_line(
            vec![position(from.x, from.y), position(to.x, to.y)],
            Style::new().with_color(color),
        );
        Ok(())
    }

    fn new_page(&mut self) -> Result<usize, ReportError> {
        self.renderer.add_page(self.paper);
        self.pages += 1;
        self.decorate_page()?;
        Ok(self.pages)
    }
}
