//! Markdown front end: turns a document into a flat sequence of [`Block`]s.
//!
//! Inline structure is flattened into plain text.  List items swallow their
//! nested content, so a nested list contributes text to its parent item
//! instead of producing items of its own.

use std::ops::Range;

use log::debug;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::model::Block;

/// Parses `source` into blocks in document order.
pub fn parse_blocks(source: &str) -> Vec<Block> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut collector = BlockCollector::new(source);
    for (event, range) in Parser::new_ext(source, options).into_offset_iter() {
        collector.handle(event, range);
    }
    collector.blocks
}

#[derive(Default)]
struct ParagraphBuffer {
    text: String,
    code_spans: usize,
    has_plain_text: bool,
}

struct ItemBuffer {
    text: String,
    marker: char,
    ordinal: Option<i64>,
    depth: usize,
}

struct ListFrame {
    next_ordinal: Option<i64>,
}

struct BlockCollector<'s> {
    source: &'s str,
    blocks: Vec<Block>,
    heading: Option<(u8, String)>,
    paragraph: Option<ParagraphBuffer>,
    code: Option<(String, Option<String>)>,
    lists: Vec<ListFrame>,
    item: Option<ItemBuffer>,
    table_depth: usize,
}

impl<'s> BlockCollector<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            blocks: Vec::new(),
            heading: None,
            paragraph: None,
            code: None,
            lists: Vec::new(),
            item: None,
            table_depth: 0,
        }
    }

    fn handle(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.push_text(&text, false),
            Event::Code(code) => self.push_text(&code, true),
            Event::SoftBreak => self.push_text(" ", false),
            Event::HardBreak => self.push_text("\n", false),
            Event::Rule => {
                if self.item.is_none() {
                    self.blocks.push(Block::ThematicBreak);
                }
            }
            Event::TaskListMarker(checked) => {
                self.push_text(if checked { "[x] " } else { "[ ] " }, false)
            }
            Event::Html(_) | Event::InlineHtml(_) => debug!("Skipping raw HTML at {:?}", range),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>) {
        if self.table_depth > 0 {
            return;
        }

        match tag {
            Tag::Heading { level, .. } if self.item.is_none() => {
                self.heading = Some((level as u8, String::new()));
            }
            Tag::Paragraph => match self.item.as_mut() {
                Some(item) => separate(&mut item.text),
                None => self.paragraph = Some(ParagraphBuffer::default()),
            },
            Tag::CodeBlock(kind) => match self.item.as_mut() {
                Some(item) => separate(&mut item.text),
                None => {
                    let language = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(str::to_owned),
                        CodeBlockKind::Indented => None,
                    };
                    self.code = Some((String::new(), language));
                }
            },
            Tag::List(start) => {
                let next_ordinal = start.map(|value| i64::try_from(value).unwrap_or(i64::MAX));
                self.lists.push(ListFrame { next_ordinal });
            }
            Tag::Item => self.start_item(range),
            Tag::Table(_) => {
                self.table_depth += 1;
                debug!("Skipping table at {:?}", range);
            }
            Tag::Image { .. } => debug!("Image at {:?} rendered as its alt text", range),
            _ => {}
        }
    }

    fn start_item(&mut self, range: Range<usize>) {
        if let Some(item) = self.item.as_mut() {
            item.depth += 1;
            separate(&mut item.text);
            return;
        }

        let ordinal = self.lists.last().and_then(|frame| frame.next_ordinal);
        self.item = Some(ItemBuffer {
            text: String::new(),
            marker: list_marker(&self.source[range.start..]),
            ordinal,
            depth: 1,
        });
    }

    fn end(&mut self, tag: TagEnd) {
        if self.table_depth > 0 {
            if matches!(tag, TagEnd::Table) {
                self.table_depth -= 1;
            }
            return;
        }

        match tag {
            TagEnd::Heading(_) => {
                if let Some((level, text)) = self.heading.take() {
                    let text = text.trim();
                    if !text.is_empty() {
                        self.blocks.push(Block::heading(level, text));
                    }
                }
            }
            TagEnd::Paragraph => {
                if let Some(paragraph) = self.paragraph.take() {
                    self.finish_paragraph(paragraph);
                }
            }
            TagEnd::CodeBlock => {
                if let Some((code, language)) = self.code.take() {
                    let code = code.trim_end_matches('\n');
                    if !code.trim().is_empty() {
                        self.blocks.push(match language {
                            Some(language) => Block::highlighted_code(code, language),
                            None => Block::code(code),
                        });
                    }
                }
            }
            TagEnd::List(_) => {
                self.lists.pop();
            }
            TagEnd::Item => self.end_item(),
            _ => {}
        }
    }

    fn end_item(&mut self) {
        let Some(mut item) = self.item.take() else {
            return;
        };
        if item.depth > 1 {
            item.depth -= 1;
            self.item = Some(item);
            return;
        }

        let text = item.text.trim();
        if text.is_empty() {
            return;
        }
        self.blocks
            .push(Block::list_item(text, item.marker, item.ordinal));
        if let Some(next) = self
            .lists
            .last_mut()
            .and_then(|frame| frame.next_ordinal.as_mut())
        {
            *next = next.saturating_add(1);
        }
    }

    fn finish_paragraph(&mut self, paragraph: ParagraphBuffer) {
        let text = paragraph.text.trim();
        if text.is_empty() {
            return;
        }
        if paragraph.code_spans == 1 && !paragraph.has_plain_text {
            self.blocks.push(Block::InlineCode(text.to_owned()));
        } else {
            self.blocks.push(Block::paragraph(text));
        }
    }

    fn push_text(&mut self, text: &str, is_code: bool) {
        if self.table_depth > 0 {
            return;
        }
        if let Some((code, _)) = self.code.as_mut() {
            code.push_str(text);
        } else if let Some(item) = self.item.as_mut() {
            item.text.push_str(text);
        } else if let Some((_, heading)) = self.heading.as_mut() {
            heading.push_str(if text == "\n" { " " } else { text });
        } else if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.text.push_str(text);
            if is_code {
                paragraph.code_spans += 1;
            } else if !text.trim().is_empty() {
                paragraph.has_plain_text = true;
            }
        }
    }
}

/// Appends a space unless the buffer is empty or already ends in whitespace.
fn separate(buffer: &mut String) {
    if buffer.chars().last().map_or(false, |ch| !ch.is_whitespace()) {
        buffer.push(' ');
    }
}

/// Reads the list marker character from the start of an item's source.
fn list_marker(item_source: &str) -> char {
    let trimmed = item_source.trim_start();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(ch @ ('-' | '+' | '*')) => ch,
        Some(ch) if ch.is_ascii_digit() => trimmed
            .chars()
            .find(|c| !c.is_ascii_digit())
            .filter(|c| matches!(*c, '.' | ')'))
            .unwrap_or('.'),
        _ => '-',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_paragraphs_are_flattened() {
        let blocks = parse_blocks("# Hello *big* [world](http://x)\n\nSome **bold**\ntext here.\n");
        assert_eq!(
            blocks,
            vec![
                Block::heading(1, "Hello big world"),
                Block::paragraph("Some bold text here."),
            ]
        );
    }

    #[test]
    fn fenced_code_with_language_is_highlighted() {
        let blocks = parse_blocks("```rust\nfn main() {}\n```\n\n```\nplain\n```\n\n    indented\n");
        assert_eq!(
            blocks,
            vec![
                Block::highlighted_code("fn main() {}", "rust"),
                Block::code("plain"),
                Block::code("indented"),
            ]
        );
    }

    #[test]
    fn ordered_list_keeps_marker_and_ordinals() {
        let blocks = parse_blocks("3) three\n4) four\n");
        assert_eq!(
            blocks,
            vec![
                Block::list_item("three", ')', Some(3)),
                Block::list_item("four", ')', Some(4)),
            ]
        );
    }

    #[test]
    fn unordered_list_markers_are_recovered() {
        let blocks = parse_blocks("+ a\n+ b\n\n* c\n");
        assert_eq!(
            blocks,
            vec![
                Block::list_item("a", '+', None),
                Block::list_item("b", '+', None),
                Block::list_item("c", '*', None),
            ]
        );
    }

    #[test]
    fn nested_list_content_joins_parent_item() {
        let blocks = parse_blocks("- parent\n  - child\n- next\n");
        assert_eq!(
            blocks,
            vec![
                Block::list_item("parent child", '-', None),
                Block::list_item("next", '-', None),
            ]
        );
    }

    #[test]
    fn lone_code_span_becomes_inline_code() {
        let blocks = parse_blocks("`cargo build`\n\nRun `cargo build` now.\n");
        assert_eq!(
            blocks,
            vec![
                Block::InlineCode("cargo build".to_owned()),
                Block::paragraph("Run cargo build now."),
            ]
        );
    }

    #[test]
    fn rules_and_tables() {
        let blocks = parse_blocks("before\n\n---\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\nafter\n");
        assert_eq!(
            blocks,
            vec![
                Block::paragraph("before"),
                Block::ThematicBreak,
                Block::paragraph("after"),
            ]
        );
    }

    #[test]
    fn task_list_markers_are_kept() {
        let blocks = parse_blocks("- [x] done\n- [ ] todo\n");
        assert_eq!(
            blocks,
            vec![
                Block::list_item("[x] done", '-', None),
                Block::list_item("[ ] todo", '-', None),
            ]
        );
    }
}
