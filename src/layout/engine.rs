//! Block emitters driving a [`Surface`].
//!
//! Every emitter follows the same shape: skip empty input, consult the
//! [`BreakPolicy`], draw line by line (continuing on a new page when a line
//! does not fit), then advance the cursor and update the heading bookkeeping.

use genpdf::style::Color;
use log::{debug, trace};

use crate::error::ReportError;
use crate::highlight::{Highlighter, Token};
use crate::layout::policy::{BreakPolicy, Decision};
use crate::layout::state::LayoutState;
use crate::layout::wrap::{wrap_lines, wrap_verbatim};
use crate::model::{list_prefix, Block, BlockKind};
use crate::surface::{FontFace, Point, Surface, TextBox, TextStyle};

pub(crate) const HEADING_GAP_BEFORE: f64 = 4.0;
pub(crate) const HEADING_CELL_HEIGHT: f64 = 12.0;
pub(crate) const HEADING_GAP_AFTER: f64 = 3.0;
pub(crate) const LINE_HEIGHT: f64 = 6.0;
pub(crate) const PARAGRAPH_GAP_AFTER: f64 = 4.0;
pub(crate) const CODE_GAP_AFTER: f64 = 3.0;
pub(crate) const LIST_ITEM_GAP_AFTER: f64 = 2.0;
pub(crate) const RULE_GAP: f64 = 6.0;
pub(crate) const INLINE_CODE_HEIGHT: f64 = 7.0;
pub(crate) const INLINE_CODE_PADDING: f64 = 2.0;

const BODY_FONT_SIZE: u8 = 12;
const CODE_FONT_SIZE: u8 = 11;
const CODE_BACKGROUND: Color = Color::Rgb(240, 240, 240);
const INLINE_CODE_BACKGROUND: Color = Color::Rgb(245, 245, 245);
const RULE_COLOR: Color = Color::Rgb(200, 200, 200);
const TAB_WIDTH: usize = 4;

/// Font size of a heading at `level`.
pub fn heading_font_size(level: u8) -> u8 {
    match level {
        0 | 1 => 20,
        2 => 16,
        3 => 14,
        4 => 13,
        _ => 12,
    }
}

fn body_style() -> TextStyle {
    TextStyle::new(BODY_FONT_SIZE, FontFace::Italic)
}

fn code_style() -> TextStyle {
    TextStyle::new(CODE_FONT_SIZE, FontFace::Italic)
}

/// A heading together with the page it landed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadingMark {
    pub level: u8,
    pub title: String,
    pub page: usize,
}

/// Lays out blocks onto a surface, one render at a time.
pub struct LayoutEngine<S: Surface> {
    surface: S,
    state: LayoutState,
    policy: BreakPolicy,
    headings: Vec<HeadingMark>,
}

impl<S: Surface> LayoutEngine<S> {
    /// Creates an engine using the default [`BreakPolicy`].
    pub fn new(surface: S) -> Self {
        Self::with_policy(surface, BreakPolicy::default())
    }

    pub fn with_policy(surface: S, policy: BreakPolicy) -> Self {
        let top = surface.geometry().margins.top;
        Self {
            surface,
            state: LayoutState::new(top),
            policy,
            headings: Vec::new(),
        }
    }

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    /// Mutable access to the cursor, mainly for positioning content in tests.
    pub fn state_mut(&mut self) -> &mut LayoutState {
        &mut self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn policy(&self) -> &BreakPolicy {
        &self.policy
    }

    /// Headings emitted so far, in document order.
    pub fn headings(&self) -> &[HeadingMark] {
        &self.headings
    }

    /// Consumes the engine and returns the surface and the emitted headings.
    pub fn into_parts(self) -> (S, Vec<HeadingMark>) {
        (self.surface, self.headings)
    }

    /// Dispatches `block` to its emitter.
    pub fn emit(&mut self, block: &Block, highlighter: &Highlighter) -> Result<(), ReportError> {
        match block {
            Block::Heading { level, text } => self.heading(*level, text),
            Block::Paragraph(text) => self.paragraph(text),
            Block::Code(code) => self.code(code),
            Block::HighlightedCode { code, language } => {
                if code.trim().is_empty() {
                    return Ok(());
                }
                self.highlighted_code(highlighter.tokens(code, language))
            }
            Block::ListItem {
                text,
                marker,
                ordinal,
            } => self.list_item(text, *marker, *ordinal),
            Block::ThematicBreak => self.thematic_break(),
            Block::InlineCode(text) => self.inline_code(text),
        }
    }

    /// Emits every block in order.
    pub fn emit_all<'b, I>(&mut self, blocks: I, highlighter: &Highlighter) -> Result<(), ReportError>
    where
        I: IntoIterator<Item = &'b Block>,
    {
        for block in blocks {
            self.emit(block, highlighter)?;
        }
        Ok(())
    }

    pub fn heading(&mut self, level: u8, text: &str) -> Result<(), ReportError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        let in_fresh_zone = self.policy.in_fresh_zone(&self.state);
        if !self.consult(BlockKind::Heading(level))? && !in_fresh_zone {
            self.advance(HEADING_GAP_BEFORE);
        }

        // Recorded before drawing so the affinity check sees where the
        // section starts.
        self.state.record_heading(level);
        self.headings.push(HeadingMark {
            level,
            title: text.to_owned(),
            page: self.state.current_page(),
        });

        let style = TextStyle::new(heading_font_size(level), FontFace::BoldItalic);
        for line in self.wrap(text, &style) {
            self.draw_line_of_text(&line, &style, HEADING_CELL_HEIGHT, None)?;
        }
        self.advance(HEADING_GAP_AFTER);
        Ok(())
    }

    pub fn paragraph(&mut self, text: &str) -> Result<(), ReportError> {
        if text.trim().is_empty() {
            return Ok(());
        }

        self.consult(BlockKind::Paragraph)?;
        let style = body_style();
        for line in self.wrap(text.trim(), &style) {
            self.draw_line_of_text(&line, &style, LINE_HEIGHT, None)?;
        }
        self.advance(PARAGRAPH_GAP_AFTER);
        self.state.clear_heading();
        Ok(())
    }

    /// Emits a code block without highlighting on a gray background.
    pub fn code(&mut self, code: &str) -> Result<(), ReportError> {
        if code.trim().is_empty() {
            return Ok(());
        }

        self.consult(BlockKind::Code)?;
        let style = code_style();
        let width = self.content_width();
        let mut lines = Vec::new();
        for raw_line in code.lines() {
            let expanded = expand_tabs(raw_line);
            lines.extend(wrap_verbatim(&expanded, width, |candidate| {
                self.surface.measure_text(candidate, &style)
            }));
        }
        for line in lines {
            self.draw_line_of_text(&line, &style, LINE_HEIGHT, Some(CODE_BACKGROUND))?;
        }
        self.advance(CODE_GAP_AFTER);
        self.state.clear_heading();
        Ok(())
    }

    /// Emits a highlighted code block from a token stream.
    ///
    /// Newline tokens end the current line; a token that would run past the
    /// right margin starts a new one.
    pub fn highlighted_code<I>(&mut self, tokens: I) -> Result<(), ReportError>
    where
        I: IntoIterator<Item = Token>,
    {
        let mut tokens = tokens.into_iter().peekable();
        if tokens.peek().is_none() {
            return Ok(());
        }

        self.consult(BlockKind::HighlightedCode)?;
        let geometry = self.surface.geometry();
        let left = geometry.margins.left;
        let right = geometry.content_right();
        let mut x = left;
        let mut line_open = false;

        for token in tokens {
            if token.is_newline() {
                if !line_open {
                    self.ensure_room(LINE_HEIGHT)?;
                }
                self.advance(LINE_HEIGHT);
                x = left;
                line_open = false;
                continue;
            }

            let style = code_style().with_color(token.category.color());
            let text = expand_tabs(&token.text);
            let pieces = if self.surface.measure_text(&text, &style) > right - left {
                wrap_verbatim(&text, right - left, |candidate| {
                    self.surface.measure_text(candidate, &style)
                })
            } else {
                vec![text]
            };

            for piece in pieces {
                let width = self.surface.measure_text(&piece, &style);
                if line_open && x + width > right && x > left {
                    self.advance(LINE_HEIGHT);
                    x = left;
                    line_open = false;
                }
                if !line_open {
                    self.ensure_room(LINE_HEIGHT)?;
                    line_open = true;
                }
                let area = TextBox::new(x, self.state.cursor(), width, LINE_HEIGHT);
                self.surface.draw_text_box(area, &piece, &style)?;
                x += width;
            }
        }

        if line_open {
            self.advance(LINE_HEIGHT);
        }
        self.advance(CODE_GAP_AFTER);
        self.state.clear_heading();
        Ok(())
    }

    /// Emits a list item with a hanging indent after its prefix.
    pub fn list_item(&mut self, text: &str, marker: char, ordinal: Option<i64>) -> Result<(), ReportError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        self.consult(BlockKind::ListItem)?;
        let style = body_style();
        let prefix = list_prefix(marker, ordinal);
        let indent = self.surface.measure_text(&prefix, &style);
        let width = (self.content_width() - indent).max(indent);
        let lines = wrap_lines(text, width, |candidate| {
            self.surface.measure_text(candidate, &style)
        });

        for (index, line) in lines.iter().enumerate() {
            if index == 0 {
                let first = format!("{}{}", prefix, line);
                self.draw_line_of_text(&first, &style, LINE_HEIGHT, None)?;
            } else {
                self.draw_indented_line(line, &style, indent)?;
            }
        }
        self.advance(LIST_ITEM_GAP_AFTER);
        self.state.clear_heading();
        Ok(())
    }

    /// Draws a horizontal rule across the content width.
    ///
    /// A rule that would fall past the content bottom is dropped.
    pub fn thematic_break(&mut self) -> Result<(), ReportError> {
        let geometry = self.surface.geometry();
        let y = self.state.cursor() + RULE_GAP;
        if y <= geometry.content_bottom() {
            self.surface.draw_line(
                Point::new(geometry.margins.left, y),
                Point::new(geometry.content_right(), y),
                RULE_COLOR,
            )?;
        } else {
            trace!("Dropping thematic break below the content area");
        }
        self.advance(2.0 * RULE_GAP);
        self.state.clear_heading();
        Ok(())
    }

    /// Emits a standalone code span on a light background.
    pub fn inline_code(&mut self, text: &str) -> Result<(), ReportError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        self.consult(BlockKind::InlineCode)?;
        let style = code_style();
        let max_width = self.content_width() - 2.0 * INLINE_CODE_PADDING;
        let lines = wrap_verbatim(&expand_tabs(text), max_width, |candidate| {
            self.surface.measure_text(candidate, &style)
        });
        let left = self.surface.geometry().margins.left;

        for line in lines {
            self.ensure_room(INLINE_CODE_HEIGHT)?;
            let width = self.surface.measure_text(&line, &style) + 2.0 * INLINE_CODE_PADDING;
            let area = TextBox::new(left, self.state.cursor(), width, INLINE_CODE_HEIGHT)
                .with_fill(Some(INLINE_CODE_BACKGROUND))
                .with_padding(INLINE_CODE_PADDING);
            self.surface.draw_text_box(area, &line, &style)?;
            self.advance(INLINE_CODE_HEIGHT);
        }
        self.advance(CODE_GAP_AFTER);
        self.state.clear_heading();
        Ok(())
    }

    /// Asks the policy about `kind` and starts a new page if it says so.
    fn consult(&mut self, kind: BlockKind) -> Result<bool, ReportError> {
        let geometry = self.surface.geometry();
        let remaining = self.state.remaining(geometry.content_bottom());
        match self.policy.decide(&self.state, kind, remaining, geometry.height) {
            Decision::Continue => Ok(false),
            Decision::Break(reason) => {
                debug!(
                    "Page break before {:?} at y={:.1}mm ({:.1}mm left): {:?}",
                    kind,
                    self.state.cursor(),
                    remaining,
                    reason
                );
                self.break_page()?;
                Ok(true)
            }
        }
    }

    fn break_page(&mut self) -> Result<(), ReportError> {
        let page = self.surface.new_page()?;
        self.state.start_page(page);
        Ok(())
    }

    /// Continues on a new page when a line of `height` does not fit.
    fn ensure_room(&mut self, height: f64) -> Result<(), ReportError> {
        let bottom = self.surface.geometry().content_bottom();
        if self.state.cursor() + height > bottom && self.state.cursor() > self.state.top() {
            debug!(
                "Continuing on a new page from y={:.1}mm",
                self.state.cursor()
            );
            self.break_page()?;
        }
        Ok(())
    }

    fn advance(&mut self, delta: f64) {
        let bottom = self.surface.geometry().content_bottom();
        self.state.advance(delta, bottom);
    }

    fn content_width(&self) -> f64 {
        self.surface.geometry().content_width()
    }

    fn wrap(&self, text: &str, style: &TextStyle) -> Vec<String> {
        wrap_lines(text, self.content_width(), |candidate| {
            self.surface.measure_text(candidate, style)
        })
    }

    fn draw_line_of_text(
        &mut self,
        text: &str,
        style: &TextStyle,
        height: f64,
        fill: Option<Color>,
    ) -> Result<(), ReportError> {
        self.ensure_room(height)?;
        let geometry = self.surface.geometry();
        let area = TextBox::new(
            geometry.margins.left,
            self.state.cursor(),
            geometry.content_width(),
            height,
        )
        .with_fill(fill);
        self.surface.draw_text_box(area, text, style)?;
        self.advance(height);
        Ok(())
    }

    fn draw_indented_line(
        &mut self,
        text: &str,
        style: &TextStyle,
        indent: f64,
    ) -> Result<(), ReportError> {
        self.ensure_room(LINE_HEIGHT)?;
        let geometry = self.surface.geometry();
        let area = TextBox::new(
            geometry.margins.left + indent,
            self.state.cursor(),
            geometry.content_width() - indent,
            LINE_HEIGHT,
        );
        self.surface.draw_text_box(area, text, style)?;
        self.advance(LINE_HEIGHT);
        Ok(())
    }
}

fn expand_tabs(text: &str) -> String {
    text.replace('\t', &" ".repeat(TAB_WIDTH))
}
