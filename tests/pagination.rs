use md_report::highlight::Highlighter;
use md_report::layout::{BreakPolicy, LayoutEngine};
use md_report::model::{Block, BULLET_PREFIX};
use md_report::surface::{DrawOp, RecordingSurface, Surface};
use md_report::ReportBuilder;

fn engine() -> LayoutEngine<RecordingSurface> {
    LayoutEngine::new(RecordingSurface::default())
}

fn page_height(engine: &LayoutEngine<RecordingSurface>) -> f64 {
    engine.surface().geometry().height
}

#[test]
fn short_document_stays_on_one_page() {
    let highlighter = Highlighter::new();
    let mut engine = engine();
    let blocks = [
        Block::heading(1, "Overview"),
        Block::paragraph("first line\nsecond line\nthird line"),
        Block::code("one\ntwo\nthree\nfour\nfive"),
    ];

    let mut previous = engine.state().cursor();
    for block in &blocks {
        engine.emit(block, &highlighter).unwrap();
        let cursor = engine.state().cursor();
        assert!(cursor > previous, "cursor did not move after {:?}", block);
        previous = cursor;
    }

    assert_eq!(engine.surface().page_breaks(), 0);
    assert_eq!(engine.surface().texts().count(), 1 + 3 + 5);
}

#[test]
fn low_level2_heading_moves_and_pulls_its_subsection_along() {
    let mut engine = engine();
    let height = page_height(&engine);
    engine.state_mut().set_cursor(0.85 * height);

    engine.heading(2, "Results").unwrap();
    assert_eq!(engine.surface().page_breaks(), 1);
    assert_eq!(engine.state().current_page(), 2);
    let parent = engine.state().last_level2().unwrap();
    assert_eq!(parent.page, 2);
    assert!(parent.y / height < BreakPolicy::default().affinity.parent_fraction);

    engine.heading(3, "Latency").unwrap();
    assert_eq!(engine.surface().page_breaks(), 1);

    let pages: Vec<usize> = engine.headings().iter().map(|mark| mark.page).collect();
    assert_eq!(pages, vec![2, 2]);
}

#[test]
fn ordered_list_with_parenthesis_markers() {
    let (surface, _) = ReportBuilder::new()
        .layout_onto("1) alpha\n2) beta\n3) gamma\n", RecordingSurface::default())
        .unwrap();
    let texts: Vec<&str> = surface.texts().map(|(_, text, _)| text).collect();
    assert_eq!(texts, vec!["1. alpha", "2. beta", "3. gamma"]);
}

#[test]
fn level3_follows_a_low_level2_parent_to_the_next_page() {
    let mut engine = engine();
    let height = page_height(&engine);
    engine.state_mut().set_cursor(118.0);
    engine.heading(2, "Parent").unwrap();
    assert_eq!(engine.surface().page_breaks(), 0);
    let parent = engine.state().last_level2().unwrap();
    assert!(parent.y / height > 0.40);

    engine.paragraph("Some introduction.").unwrap();
    engine.state_mut().set_cursor(155.0);

    // Level-3 rules alone would keep the heading on this page.
    let mut detached = LayoutEngine::new(RecordingSurface::default());
    detached.state_mut().set_cursor(155.0);
    detached.heading(3, "Child").unwrap();
    assert_eq!(detached.surface().page_breaks(), 0);

    engine.heading(3, "Child").unwrap();
    assert_eq!(engine.surface().page_breaks(), 1);
    assert_eq!(engine.headings().last().map(|mark| mark.page), Some(2));
}

#[test]
fn level3_under_an_upper_parent_uses_its_own_rules() {
    let mut engine = engine();
    engine.state_mut().set_cursor(75.0);
    engine.heading(2, "Parent").unwrap();
    let parent = engine.state().last_level2().unwrap();
    assert!(parent.y / page_height(&engine) < 0.30);

    engine.paragraph("Some introduction.").unwrap();
    engine.state_mut().set_cursor(155.0);
    engine.heading(3, "Child").unwrap();
    assert_eq!(engine.surface().page_breaks(), 0);

    engine.paragraph("Details.").unwrap();
    engine.state_mut().set_cursor(180.0);
    engine.heading(3, "Sibling").unwrap();
    assert_eq!(engine.surface().page_breaks(), 1);
}

#[test]
fn heading_level_is_cleared_by_content() {
    let highlighter = Highlighter::new();
    let mut engine = engine();
    let blocks = [
        Block::heading(1, "Title"),
        Block::list_item("item", '*', None),
        Block::heading(2, "Section"),
        Block::InlineCode("make".to_owned()),
        Block::heading(3, "Sub"),
        Block::ThematicBreak,
    ];
    for pair in blocks.chunks(2) {
        engine.emit(&pair[0], &highlighter).unwrap();
        assert!(engine.state().follows_heading());
        engine.emit(&pair[1], &highlighter).unwrap();
        assert_eq!(engine.state().last_heading_level(), 0);
    }
}

#[test]
fn non_positive_ordinal_renders_a_bullet() {
    let mut engine = engine();
    engine.list_item("zero", '.', Some(0)).unwrap();
    engine.list_item("negative", '.', Some(-1)).unwrap();
    let texts: Vec<String> = engine
        .surface()
        .texts()
        .map(|(_, text, _)| text.to_owned())
        .collect();
    assert_eq!(
        texts,
        vec![
            format!("{}zero", BULLET_PREFIX),
            format!("{}negative", BULLET_PREFIX)
        ]
    );
}

#[test]
fn long_document_keeps_content_inside_the_page() {
    let mut markdown = String::from("__project__: Atlas\n# Atlas report\n\n");
    for section in 1..=12 {
        markdown.push_str(&format!("## Section {}\n\n", section));
        markdown.push_str(&"Measured values stayed within the expected range. ".repeat(12));
        markdown.push_str("\n\n### Details\n\n- first finding\n- second finding\n\n");
        markdown.push_str("```rust\nfn check() -> bool {\n    true\n}\n```\n\n---\n\n");
    }

    let (surface, headings) = ReportBuilder::new()
        .layout_onto(&markdown, RecordingSurface::default())
        .unwrap();

    assert!(surface.page_breaks() > 2);
    assert_eq!(headings.len(), 1 + 12 * 2);
    assert!(headings.windows(2).all(|pair| pair[0].page <= pair[1].page));

    let geometry = surface.geometry();
    for op in surface.ops() {
        if let DrawOp::Text { area, .. } = op {
            assert!(area.y >= geometry.margins.top);
            assert!(area.y + area.height <= geometry.content_bottom() + 1e-9);
        }
    }
}
