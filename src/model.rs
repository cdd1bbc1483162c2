//! Data structures describing the structural content of a report.
//!
//! The Markdown front end produces a flat, document-ordered sequence of
//! [`Block`] values.  Inline structure (emphasis, links, images) has already
//! been flattened into plain text, so the layout engine only has to decide
//! where each block goes.

/// Bullet glyph used for unordered items and as the fallback prefix.
pub const BULLET_PREFIX: &str = "• ";

/// One structural unit of content handed to the layout engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    /// Section heading; levels start at 1.
    Heading {
        /// Nesting level, `1` for `#`.
        level: u8,
        /// Flattened heading text.
        text: String,
    },
    /// Body paragraph.
    Paragraph(String),
    /// Code block rendered without highlighting.
    Code(String),
    /// Fenced code block with a language tag.
    HighlightedCode {
        /// Raw source of the block.
        code: String,
        /// Language token from the fence info string.
        language: String,
    },
    /// Single list item.
    ListItem {
        /// Flattened item text, nested content included.
        text: String,
        /// Marker character as written in the source (`-`, `+`, `*`, `.` or `)`).
        marker: char,
        /// 1-based ordinal for ordered lists.
        ordinal: Option<i64>,
    },
    /// Horizontal rule.
    ThematicBreak,
    /// Paragraph consisting of a single code span.
    InlineCode(String),
}

impl Block {
    /// Convenience helper for building a heading block.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::Heading {
            level,
            text: text.into(),
        }
    }

    /// Convenience helper for building a paragraph block.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph(text.into())
    }

    /// Convenience helper for building an unhighlighted code block.
    pub fn code(code: impl Into<String>) -> Self {
        Self::Code(code.into())
    }

    /// Convenience helper for building a highlighted code block.
    pub fn highlighted_code(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self::HighlightedCode {
            code: code.into(),
            language: language.into(),
        }
    }

    /// Convenience helper for building a list item.
    pub fn list_item(text: impl Into<String>, marker: char, ordinal: Option<i64>) -> Self {
        Self::ListItem {
            text: text.into(),
            marker,
            ordinal,
        }
    }

    /// Returns the kind used by the page-break policy.
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Heading { level, .. } => BlockKind::Heading(*level),
            Self::Paragraph(_) => BlockKind::Paragraph,
            Self::Code(_) => BlockKind::Code,
            Self::HighlightedCode { .. } => BlockKind::HighlightedCode,
            Self::ListItem { .. } => BlockKind::ListItem,
            Self::ThematicBreak => BlockKind::ThematicBreak,
            Self::InlineCode(_) => BlockKind::InlineCode,
        }
    }
}

/// The shape of a block as far as pagination is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    Heading(u8),
    Paragraph,
    Code,
    HighlightedCode,
    ListItem,
    ThematicBreak,
    InlineCode,
}

impl BlockKind {
    /// Returns whether the kind is a heading of any level.
    pub fn is_heading(self) -> bool {
        matches!(self, Self::Heading(_))
    }
}

/// Resolves the display prefix for a list item.
///
/// Unordered markers render as a bullet.  Ordered markers render as
/// `"<ordinal>. "` when a positive ordinal is available and fall back to the
/// bullet otherwise, as do unknown markers.
pub fn list_prefix(marker: char, ordinal: Option<i64>) -> String {
    match (marker, ordinal) {
        ('.' | ')', Some(index)) if index > 0 => format!("{}. ", index),
        _ => BULLET_PREFIX.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unordered_markers_render_bullets() {
        for marker in ['-', '+', '*'] {
            assert_eq!(list_prefix(marker, None), BULLET_PREFIX);
            assert_eq!(list_prefix(marker, Some(3)), BULLET_PREFIX);
        }
    }

    #[test]
    fn ordered_markers_render_ordinals() {
        assert_eq!(list_prefix('.', Some(1)), "1. ");
        assert_eq!(list_prefix(')', Some(12)), "12. ");
    }

    #[test]
    fn non_positive_ordinal_falls_back_to_bullet() {
        assert_eq!(list_prefix('.', Some(0)), BULLET_PREFIX);
        assert_eq!(list_prefix(')', Some(-4)), BULLET_PREFIX);
        assert_eq!(list_prefix('.', None), BULLET_PREFIX);
    }

    #[test]
    fn unknown_marker_falls_back_to_bullet() {
        assert_eq!(list_prefix('#', Some(2)), BULLET_PREFIX);
    }

    #[test]
    fn block_kind_tracks_heading_level() {
        assert_eq!(Block::heading(3, "Intro").kind(), BlockKind::Heading(3));
        assert!(Block::heading(1, "x").kind().is_heading());
        assert!(!Block::paragraph("x").kind().is_heading());
    }
}
