//! Paragraph-level access to WordprocessingML text.
//!
//! Word splits the visible text of a paragraph over any number of runs
//! (`<w:r>`), each with its own `<w:t>` elements, so a token such as
//! `[INSURED_NAME]` can be spread over several of them. The functions here
//! present each paragraph as one string and, when it is edited, write the new
//! text into the paragraph's first `<w:t>` and empty the others. Text-box
//! paragraphs sit inside an outer paragraph and are handled as paragraphs of
//! their own.

use crate::DocxError;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::{HashMap, HashSet};

const PARAGRAPH: &[u8] = b"w:p";
const TEXT: &[u8] = b"w:t";

/// Calls `visit` with the text of every paragraph in `xml`.
pub fn for_each_paragraph<F>(xml: &[u8], mut visit: F) -> Result<(), DocxError>
where
    F: FnMut(&str),
{
    rewrite_paragraphs(xml, |text| {
        visit(text);
        None
    })
    .map(|_| ())
}

/// Offers the text of every paragraph to `edit` and applies the edits it returns.
///
/// Returns `Ok(None)` when no paragraph changed, so callers can keep the
/// original bytes untouched. A paragraph nested inside another (text boxes) is
/// offered separately, after the paragraph that contains it.
pub fn rewrite_paragraphs<F>(xml: &[u8], mut edit: F) -> Result<Option<Vec<u8>>, DocxError>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut paragraph: Vec<Event> = Vec::new();
    let mut depth = 0usize;
    let mut changed = false;

    loop {
        let event = reader.read_event()?;
        if matches!(event, Event::Eof) {
            break;
        }

        let closes_paragraph = match &event {
            Event::Start(e) if e.name().as_ref() == PARAGRAPH => {
                depth += 1;
                false
            }
            Event::End(e) if e.name().as_ref() == PARAGRAPH && depth > 0 => {
                depth -= 1;
                depth == 0
            }
            _ => false,
        };

        if closes_paragraph {
            paragraph.push(event);
            let events = std::mem::take(&mut paragraph);
            changed |= flush_paragraph(&mut writer, events, &mut edit)?;
            continue;
        }

        if depth > 0 {
            paragraph.push(event);
        } else {
            writer.write_event(event)?;
        }
    }

    for event in paragraph {
        writer.write_event(event)?;
    }

    Ok(changed.then(|| writer.into_inner()))
}

/// Text of one paragraph, excluding any paragraphs nested inside it.
#[derive(Default)]
struct ParagraphText {
    text: String,
    first_text_start: Option<usize>,
    text_nodes: Vec<usize>,
}

/// Writes one buffered top-level paragraph, applying `edit` to its text and to
/// the text of every paragraph nested in it. Returns whether anything changed.
fn flush_paragraph<F>(
    writer: &mut Writer<Vec<u8>>,
    events: Vec<Event<'_>>,
    edit: &mut F,
) -> Result<bool, DocxError>
where
    F: FnMut(&str) -> Option<String>,
{
    let mut paragraphs: Vec<ParagraphText> = Vec::new();
    let mut open: Vec<usize> = Vec::new();
    let mut in_text = false;

    for (index, event) in events.iter().enumerate() {
        match event {
            Event::Start(e) if e.name().as_ref() == PARAGRAPH => {
                open.push(paragraphs.len());
                paragraphs.push(ParagraphText::default());
            }
            Event::End(e) if e.name().as_ref() == PARAGRAPH => {
                open.pop();
            }
            Event::Start(e) if e.name().as_ref() == TEXT => {
                in_text = true;
                if let Some(&current) = open.last() {
                    paragraphs[current].first_text_start.get_or_insert(index);
                }
            }
            Event::End(e) if e.name().as_ref() == TEXT => in_text = false,
            Event::Text(t) if in_text => {
                if let Some(&current) = open.last() {
                    paragraphs[current].text.push_str(&t.unescape()?);
                    paragraphs[current].text_nodes.push(index);
                }
            }
            _ => {}
        }
    }

    let mut replacements: HashMap<usize, String> = HashMap::new();
    let mut dropped: HashSet<usize> = HashSet::new();
    for paragraph in paragraphs {
        match (edit(&paragraph.text), paragraph.first_text_start) {
            (Some(new_text), Some(start)) if new_text != paragraph.text => {
                replacements.insert(start, new_text);
                dropped.extend(paragraph.text_nodes);
            }
            _ => {}
        }
    }

    if replacements.is_empty() {
        for event in events {
            writer.write_event(event)?;
        }
        return Ok(false);
    }

    for (index, event) in events.into_iter().enumerate() {
        if dropped.contains(&index) {
            continue;
        }
        match (replacements.get(&index), event) {
            (Some(new_text), Event::Start(e)) => {
                writer.write_event(Event::Start(preserve_space(&e)))?;
                writer.write_event(Event::Text(BytesText::new(new_text)))?;
            }
            (_, event) => writer.write_event(event)?,
        }
    }
    Ok(true)
}

/// Copies a `<w:t>` start tag, making sure leading and trailing spaces survive.
fn preserve_space(start: &BytesStart<'_>) -> BytesStart<'static> {
    let mut tag = BytesStart::new("w:t");
    for attr in start.attributes().flatten() {
        if attr.key.as_ref() != b"xml:space" {
            tag.push_attribute(attr);
        }
    }
    tag.push_attribute(("xml:space", "preserve"));
    tag
}
