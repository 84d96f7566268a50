use vecpdf::{BytesPayload, Command, Dictionary, Document, PageSize, Path, Payload, StateCommand, Transform};

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|window| window == needle)
}

fn render(doc: &mut Document) -> Vec<u8> {
    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

fn sample_document() -> Document {
    let mut doc = Document::with_compression(PageSize::A4, false);
    doc.handle(Command::Group(vec![StateCommand::ConcatTransform(Transform::translate(5.0, 5.0))]))
        .unwrap();
    doc.handle(Command::FillShape(
        Path::new().move_to(0.0, 0.0).line_to(50.0, 0.0).line_to(25.0, 40.0).close(),
    ))
    .unwrap();
    doc
}

#[test]
fn header_and_footer() {
    let out = render(&mut sample_document());
    assert!(out.starts_with(b"%PDF-1.4\n"));
    assert!(out.ends_with(b"%%EOF\n"));
}

#[test]
fn startxref_points_at_the_xref_keyword() {
    let out = render(&mut sample_document());
    let marker = rfind(&out, b"startxref\n").unwrap();
    let rest = &out[marker + b"startxref\n".len()..];
    let line_end = find(rest, b"\n").unwrap();
    let offset: usize = std::str::from_utf8(&rest[..line_end]).unwrap().parse().unwrap();
    assert_eq!(&out[offset..offset + 4], b"xref");
}

#[test]
fn xref_entries_match_object_offsets() {
    let mut doc = sample_document();
    let object_count = doc.objects().len();
    let out = render(&mut doc);

    let xref_at = rfind(&out, b"\nxref\n").unwrap() + 1;
    let table = &out[xref_at..];
    let subsection = format!("xref\n0 {}\n", object_count + 1);
    assert!(table.starts_with(subsection.as_bytes()));

    let entries = &table[subsection.len()..];
    assert_eq!(&entries[..20], b"0000000000 65535 f \n");
    for id in 1..=object_count {
        let entry = &entries[id * 20..(id + 1) * 20];
        assert_eq!(entry.len(), 20);
        let offset: usize = std::str::from_utf8(&entry[..10]).unwrap().parse().unwrap();
        assert_eq!(&entry[10..], b" 00000 n \n");
        let expected = format!("{} 0 obj\n", id);
        assert_eq!(&out[offset..offset + expected.len()], expected.as_bytes());
    }
}

#[test]
fn trailer_references_the_catalog() {
    let mut doc = sample_document();
    let object_count = doc.objects().len();
    let out = render(&mut doc);
    let trailer_at = rfind(&out, b"trailer\n").unwrap();
    let trailer = &out[trailer_at..];
    assert!(find(trailer, format!("/Size {}\n", object_count + 1).as_bytes()).is_some());
    assert!(find(trailer, b"/Root 1 0 R\n").is_some());
}

#[test]
fn content_length_matches_the_stream_bytes() {
    let out = render(&mut sample_document());
    let start = find(&out, b"stream\n").unwrap() + b"stream\n".len();
    let end = find(&out, b"endstream").unwrap();
    let stream_len = end - start;

    // The content dictionary points at the length object, which renders the
    // byte count of the closed stream as its payload.
    assert!(find(&out, b"/Length 5 0 R\n").is_some());
    let length_obj = find(&out, b"5 0 obj\n").unwrap() + b"5 0 obj\n".len();
    let length_end = length_obj + find(&out[length_obj..], b"\n").unwrap();
    let declared: usize = std::str::from_utf8(&out[length_obj..length_end]).unwrap().parse().unwrap();
    assert_eq!(declared, stream_len);
}

#[test]
fn compressed_content_stream_inflates_to_the_operators() {
    use std::io::Read;

    let mut doc = Document::new(PageSize::A4);
    doc.handle(Command::DrawShape(Path::new().move_to(0.0, 0.0).line_to(10.0, 10.0)))
        .unwrap();
    let out = render(&mut doc);
    assert!(find(&out, b"/Filter [/FlateDecode]\n").is_some());

    let start = find(&out, b"stream\n").unwrap() + b"stream\n".len();
    let end = find(&out, b"endstream").unwrap();
    let mut inflated = Vec::new();
    flate2::read::ZlibDecoder::new(&out[start..end])
        .read_to_end(&mut inflated)
        .unwrap();
    let content = String::from_utf8(inflated).unwrap();
    assert!(content.contains("0 0 m 10 10 l S\n"));
}

#[test]
fn empty_payload_is_written_without_stream_markers() {
    let mut doc = Document::with_compression(PageSize::A4, false);
    let id = doc.add_object(Dictionary::new(), Some(Payload::Bytes(BytesPayload::new(true))));
    let out = render(&mut doc);

    let open = format!("{} 0 obj\n", id.0);
    let at = find(&out, open.as_bytes()).unwrap();
    let end = at + find(&out[at..], b"endobj").unwrap();
    let block = &out[at..end];
    assert!(find(block, b"stream").is_none());
}

#[test]
fn save_writes_the_same_bytes_as_save_to() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.pdf");
    let mut doc = sample_document();
    doc.save(&path).unwrap();
    let from_disk = std::fs::read(&path).unwrap();

    let rendered = render(&mut sample_document());
    assert_eq!(from_disk, rendered);
}
