//! Report construction: configuration plus the Markdown to PDF pipeline.

use std::cell::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{info, warn};

use crate::error::ReportError;
use crate::fonts::FontSource;
use crate::highlight::Highlighter;
use crate::layout::{BreakPolicy, HeadingMark, LayoutEngine};
use crate::logo::Logo;
use crate::markdown::parse_blocks;
use crate::metadata::{strip_declarations, Metadata};
use crate::outline::apply_document_extras;
use crate::surface::pdf::PageFurniture;
use crate::surface::{PageGeometry, PageMargins, PdfSurface, Surface};
use crate::sysinfo::system_description;

/// Title used when the document declares no project.
pub const DEFAULT_TITLE: &str = "Report";

/// Deepest heading level added to the outline unless configured otherwise.
pub const DEFAULT_OUTLINE_DEPTH: u8 = 2;

enum LogoSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum FooterSetting {
    Generated,
    Fixed(String),
    Disabled,
}

/// Output of a successful render.
#[derive(Clone, Debug)]
pub struct RenderedReport {
    /// The finished PDF document.
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Every heading with the page it was drawn on.
    pub headings: Vec<HeadingMark>,
    /// Metadata declared in the source.
    pub metadata: Metadata,
}

/// Builder for rendering Markdown reports with the crate defaults.
pub struct ReportBuilder {
    geometry: PageGeometry,
    logo: Option<LogoSource>,
    fonts: FontSource,
    footer: FooterSetting,
    policy: BreakPolicy,
    outline_depth: u8,
    highlighter: OnceCell<Highlighter>,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::a4(),
            logo: None,
            fonts: FontSource::new(),
            footer: FooterSetting::Generated,
            policy: BreakPolicy::default(),
            outline_depth: DEFAULT_OUTLINE_DEPTH,
            highlighter: OnceCell::new(),
        }
    }
}

impl ReportBuilder {
    /// Creates a new builder instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size in millimetres.
    pub fn with_paper_size(mut self, width: f64, height: f64) -> Self {
        self.geometry.width = width;
        self.geometry.height = height;
        self
    }

    pub fn with_margins(mut self, margins: PageMargins) -> Self {
        self.geometry.margins = margins;
        self
    }

    /// Places the image at `path` in the top-right corner of every page.
    ///
    /// A path that does not exist is skipped with a warning at render time.
    pub fn with_logo(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo = Some(LogoSource::Path(path.into()));
        self
    }

    /// Like [`with_logo`](Self::with_logo) with an encoded image in memory.
    pub fn with_logo_bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.logo = Some(LogoSource::Bytes(bytes.into()));
        self
    }

    /// Searches `directory` for the font family before the default locations.
    pub fn with_fonts_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.fonts = self.fonts.with_directory(directory);
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.fonts = self.fonts.with_family(family);
        self
    }

    /// Replaces the generated footer with fixed text.
    pub fn with_footer(mut self, text: impl Into<String>) -> Self {
        self.footer = FooterSetting::Fixed(text.into());
        self
    }

    pub fn without_footer(mut self) -> Self {
        self.footer = FooterSetting::Disabled;
        self
    }

    /// Overrides the page-break thresholds.
    pub fn with_policy(mut self, policy: BreakPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Adds headings up to `depth` to the PDF outline; `0` disables it.
    pub fn with_outline_depth(mut self, depth: u8) -> Self {
        self.outline_depth = depth;
        self
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    pub fn font_source(&self) -> &FontSource {
        &self.fonts
    }

    fn highlighter(&self) -> &Highlighter {
        self.highlighter.get_or_init(Highlighter::new)
    }

    fn footer_text(&self) -> Option<String> {
        match &self.footer {
            FooterSetting::Generated => Some(format!(
                "Report generated on: {} - {}",
                system_description(),
                Local::now().format("%d.%m.%Y")
            )),
            FooterSetting::Fixed(text) => Some(text.clone()),
            FooterSetting::Disabled => None,
        }
    }

    fn load_logo(&self) -> Result<Option<Logo>, ReportError> {
        match &self.logo {
            None => Ok(None),
            Some(LogoSource::Path(path)) if !path.exists() => {
                warn!("Logo {} not found, rendering without it", path.display());
                Ok(None)
            }
            Some(LogoSource::Path(path)) => Logo::from_path(path).map(Some),
            Some(LogoSource::Bytes(bytes)) => Logo::from_bytes(bytes).map(Some),
        }
    }

    /// Lays out the body of `markdown` onto `surface`.
    ///
    /// Metadata declarations are removed before layout.  Returns the surface
    /// together with the headings and the pages they landed on.
    pub fn layout_onto<S: Surface>(
        &self,
        markdown: &str,
        surface: S,
    ) -> Result<(S, Vec<HeadingMark>), ReportError> {
        let blocks = parse_blocks(&strip_declarations(markdown));
        let mut engine = LayoutEngine::with_policy(surface, self.policy);
        engine.emit_all(&blocks, self.highlighter())?;
        Ok(engine.into_parts())
    }

    /// Renders `markdown` into a PDF document.
    pub fn render(&self, markdown: &str) -> Result<RenderedReport, ReportError> {
        let metadata = Metadata::extract(markdown);
        let title = metadata
            .project
            .clone()
            .unwrap_or_else(|| DEFAULT_TITLE.to_owned());

        let furniture = PageFurniture {
            logo: self.load_logo()?,
            footer: self.footer_text(),
        };
        let surface = PdfSurface::new(self.geometry, self.fonts.load()?, &title, furniture)?;
        let (surface, headings) = self.layout_onto(markdown, surface)?;

        let page_count = surface.page_count();
        let bytes = surface.into_bytes()?;
        let outline: Vec<HeadingMark> = headings
            .iter()
            .filter(|heading| heading.level <= self.outline_depth)
            .cloned()
            .collect();
        let bytes = apply_document_extras(&bytes, &outline, &metadata)?;

        info!(
            "Rendered '{}': {} page(s), {} heading(s), {} bytes",
            title,
            page_count,
            headings.len(),
            bytes.len()
        );

        Ok(RenderedReport {
            bytes,
            page_count,
            headings,
            metadata,
        })
    }

    /// Renders `markdown` and writes the PDF to `path`.
    pub fn render_to_file(
        &self,
        markdown: &str,
        path: impl AsRef<Path>,
    ) -> Result<RenderedReport, ReportError> {
        let report = self.render(markdown)?;
        fs::write(path.as_ref(), &report.bytes)?;
        info!("Wrote {}", path.as_ref().display());
        Ok(report)
    }
}
