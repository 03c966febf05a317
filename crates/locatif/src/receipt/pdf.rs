//! Single-page PDF output.
//!
//! Text is set in the standard Helvetica font with `WinAnsiEncoding`, so the
//! document needs no embedded font and every string is written as Windows-1252
//! bytes. Streams are left uncompressed and no dates or ids are written: the
//! output depends on the text lines only.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use crate::error::Result;

/// A4 in points.
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN_LEFT: i64 = 56;
const FIRST_BASELINE: i64 = 780;
const TITLE_SIZE: i64 = 16;
const BODY_SIZE: i64 = 10;
const LEADING: i64 = 15;

/// Lines printed in bold: the title and the section headings.
const HEADINGS: &[&str] = &["Bailleur", "Locataire", "Détail des paiements"];

/// Render `lines` top to bottom on one A4 page.
///
/// The first line is the title. Empty lines leave a blank line.
pub(super) fn render(lines: &[String]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let content = Content {
        operations: text_operations(lines),
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1_i64,
        "Resources" => resources_id,
        "MediaBox" => vec![0_i64.into(), 0_i64.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn text_operations(lines: &[String]) -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![MARGIN_LEFT.into(), FIRST_BASELINE.into()]),
    ];

    for (i, line) in lines.iter().enumerate() {
        let (font, size) = if i == 0 {
            ("F2", TITLE_SIZE)
        } else if HEADINGS.contains(&line.as_str()) {
            ("F2", BODY_SIZE)
        } else {
            ("F1", BODY_SIZE)
        };
        if i > 0 {
            ops.push(Operation::new("T*", vec![]));
        }
        if !line.is_empty() {
            ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
            ops.push(Operation::new(
                "Tj",
                vec![Object::String(
                    encode_win_ansi(line),
                    StringFormat::Literal,
                )],
            ));
        }
        if i == 0 {
            // Extra room under the title.
            ops.push(Operation::new("T*", vec![]));
        }
    }

    ops.push(Operation::new("ET", vec![]));
    ops
}

/// Encode text as Windows-1252 bytes for a `WinAnsiEncoding` font.
///
/// Characters outside the code page become `?`.
#[must_use]
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match c {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        '\u{202f}' => 0xA0,
        _ => match u32::from(c) {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => u8::try_from(code).unwrap_or(b'?'),
            _ => b'?',
        },
    }
}
