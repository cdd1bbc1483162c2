use md_report::fonts::FontSource;
use md_report::ReportBuilder;
use sha2::{Digest, Sha256};

const SAMPLE: &str = "__author__: Jane Doe\n__project__: Sample\n\n# Sample\n\nHello, PDF!\n\n## Code\n\n```rust\nfn main() {\n    println!(\"hi\");\n}\n```\n\n- one\n- two\n";

fn render_sample_pdf() -> Option<Vec<u8>> {
    if !FontSource::new().is_available() {
        return None;
    }

    let bytes = ReportBuilder::new()
        .with_footer("Report generated on: test")
        .render(SAMPLE)
        .expect("render sample pdf")
        .bytes;

    Some(bytes)
}

/// Values printpdf fills with the clock or a random id, each given as the
/// marker before the value and the byte that ends it.
const VOLATILE_VALUES: &[(&[u8], u8)] = &[
    (b"/CreationDate(", b')'),
    (b"/ModDate(", b')'),
    (b"/ID[", b']'),
    (b"<xmp:CreateDate>", b'<'),
    (b"<xmp:ModifyDate>", b'<'),
    (b"<xmp:MetadataDate>", b'<'),
    (b"<xmpMM:DocumentID>", b'<'),
    (b"<xmpMM:InstanceID>", b'<'),
];

/// Overwrites every volatile value with zeros, keeping byte offsets intact.
fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    let mut scrubbed = bytes.to_vec();
    for &(marker, end) in VOLATILE_VALUES {
        let mut from = 0;
        while let Some(found) = find(&scrubbed[from..], marker) {
            let start = from + found + marker.len();
            let length = scrubbed[start..]
                .iter()
                .position(|&byte| byte == end)
                .unwrap_or(scrubbed.len() - start);
            scrubbed[start..start + length].fill(b'0');
            from = start + length;
        }
    }
    scrubbed
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    let normalized = scrub_pdf(bytes);
    let digest = Sha256::digest(&normalized);
    digest.into()
}

const SKIP_NOTE: &str = "fonts missing. Set MD_REPORT_FONTS_DIR or copy assets/fonts next to the binary.";

#[test]
fn renders_non_empty_output() {
    let Some(bytes) = render_sample_pdf() else {
        eprintln!("Skipping renders_non_empty_output: {}", SKIP_NOTE);
        return;
    };
    assert!(bytes.starts_with(b"%PDF"), "rendered PDF should start with a header");
}

#[test]
fn sample_report_metadata_and_outline() {
    if !FontSource::new().is_available() {
        eprintln!("Skipping sample_report_metadata_and_outline: {}", SKIP_NOTE);
        return;
    }

    let report = ReportBuilder::new()
        .without_footer()
        .render(SAMPLE)
        .expect("render sample pdf");
    assert_eq!(report.page_count, 1);
    assert_eq!(report.metadata.author.as_deref(), Some("Jane Doe"));
    assert_eq!(report.headings.len(), 2);

    let document = lopdf::Document::load_mem(&report.bytes).expect("reload rendered pdf");
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(lopdf::Object::as_reference)
        .expect("catalog reference");
    let catalog = document.get_dictionary(catalog_id).expect("catalog");
    assert!(catalog.has(b"Outlines"));
}

#[test]
fn rendering_is_deterministic() {
    let Some(bytes_a) = render_sample_pdf() else {
        eprintln!("Skipping rendering_is_deterministic: {}", SKIP_NOTE);
        return;
    };
    let Some(bytes_b) = render_sample_pdf() else {
        eprintln!("Skipping rendering_is_deterministic: {}", SKIP_NOTE);
        return;
    };

    assert_eq!(bytes_a.len(), bytes_b.len(), "PDF sizes should match");

    let hash_a = normalized_hash(&bytes_a);
    let hash_b = normalized_hash(&bytes_b);

    assert_eq!(
        hash_a, hash_b,
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn scrubbing_blanks_only_volatile_values() {
    let raw: &[u8] = b"<</CreationDate(D:2024)/Title(Sample)>>/ID[(abc)(def)]<xmpMM:InstanceID>uuid:xyz</xmpMM:InstanceID>";
    let expected: &[u8] = b"<</CreationDate(000000)/Title(Sample)>>/ID[0000000000]<xmpMM:InstanceID>00000000</xmpMM:InstanceID>";
    assert_eq!(scrub_pdf(raw), expected);
}
