//! Extraction of `__author__`, `__date__` and `__project__` declarations.

use std::ops::Range;
use std::sync::OnceLock;

use log::warn;
use pulldown_cmark::{Event, Parser, Tag};
use regex::Regex;

/// Report metadata declared inside the Markdown source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    pub author: Option<String>,
    pub date: Option<String>,
    pub project: Option<String>,
}

impl Metadata {
    /// Reads the first declaration of each field from `source`.
    ///
    /// Declarations inside code blocks are ignored.
    pub fn extract(source: &str) -> Self {
        let mut metadata = Self::default();
        let Some(pattern) = declaration_pattern() else {
            return metadata;
        };
        let code = code_block_ranges(source);

        for captures in pattern.captures_iter(source) {
            let (Some(field), Some(value)) = (captures.get(1), captures.get(2)) else {
                continue;
            };
            let value = value.as_str().trim();
            if value.is_empty() || in_code(&code, field.start()) {
                continue;
            }
            let slot = match field.as_str() {
                "author" => &mut metadata.author,
                "date" => &mut metadata.date,
                _ => &mut metadata.project,
            };
            slot.get_or_insert_with(|| value.to_owned());
        }
        metadata
    }

    pub fn is_empty(&self) -> bool {
        self.author.is_none() && self.date.is_none() && self.project.is_none()
    }
}

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!("Ignoring metadata declarations: {}", err);
            None
        }
    })
    .as_ref()
}

fn declaration_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&PATTERN, r"__(author|date|project)__[ \t]*:[ \t]*(.+)")
}

fn declaration_line() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    compiled(&PATTERN, r"^[ \t]*__(?:author|date|project)__[ \t]*:")
}

/// Byte ranges of fenced and indented code blocks.
fn code_block_ranges(source: &str) -> Vec<Range<usize>> {
    Parser::new(source)
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::CodeBlock(_)) => Some(range),
            _ => None,
        })
        .collect()
}

fn in_code(ranges: &[Range<usize>], offset: usize) -> bool {
    ranges.iter().any(|range| range.contains(&offset))
}

/// Returns `source` without the lines that hold metadata declarations.
///
/// Lines inside code blocks are kept as written.
pub fn strip_declarations(source: &str) -> String {
    let Some(pattern) = declaration_line() else {
        return source.to_owned();
    };
    let code = code_block_ranges(source);

    let mut body = Vec::new();
    let mut offset = 0;
    for raw in source.split_inclusive('\n') {
        let line = raw
            .strip_suffix('\n')
            .map_or(raw, |line| line.strip_suffix('\r').unwrap_or(line));
        let indent = line.len() - line.trim_start().len();
        if !pattern.is_match(line) || in_code(&code, offset + indent) {
            body.push(line);
        }
        offset += raw.len();
    }
    body.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "# Title\n__author__: Jane Doe  \n__date__ :2024-05-01\n\nBody text\n__project__:   Apollo\n";

    #[test]
    fn extracts_all_fields() {
        let metadata = Metadata::extract(SOURCE);
        assert_eq!(metadata.author.as_deref(), Some("Jane Doe"));
        assert_eq!(metadata.date.as_deref(), Some("2024-05-01"));
        assert_eq!(metadata.project.as_deref(), Some("Apollo"));
    }

    #[test]
    fn first_declaration_wins() {
        let metadata = Metadata::extract("__author__: A\n__author__: B\n");
        assert_eq!(metadata.author.as_deref(), Some("A"));
        assert!(metadata.project.is_none());
    }

    #[test]
    fn missing_fields_are_none() {
        let metadata = Metadata::extract("just text");
        assert!(metadata.is_empty());
    }

    #[test]
    fn declarations_are_removed_from_body() {
        let body = strip_declarations(SOURCE);
        assert_eq!(body, "# Title\n\nBody text");
    }

    const WITH_CODE: &str = "__author__: Real\n```\n__author__: Jane\nlet x = 1;\n```\n\n    __date__: 2020\n";

    #[test]
    fn code_blocks_keep_declaration_lines() {
        assert_eq!(
            strip_declarations(WITH_CODE),
            "```\n__author__: Jane\nlet x = 1;\n```\n\n    __date__: 2020"
        );
    }

    #[test]
    fn code_blocks_do_not_declare_metadata() {
        let metadata = Metadata::extract(WITH_CODE);
        assert_eq!(metadata.author.as_deref(), Some("Real"));
        assert!(metadata.date.is_none());

        let fenced_first = Metadata::extract("~~~\n__project__: Sample\n~~~\n__project__: Atlas\n");
        assert_eq!(fenced_first.project.as_deref(), Some("Atlas"));
    }
}
