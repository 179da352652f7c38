// src/reference/sdn.rs
//! Streaming parser for the OFAC SDN XML list.
//!
//! Namespaces changed across list releases, so elements are matched by local name only.
//! Per `sdnEntry` we read the direct children `uid`, `lastName|last`, `firstName|first`,
//! `sdnName|name`, `sdnType|type` and `remarks`. Nested records (aka lists, addresses)
//! are ignored except as a last-resort source for the name.

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::index::ReferenceEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Uid,
    Last,
    First,
    Whole,
    Type,
    Remarks,
    NestedName,
}

fn direct_field(local: &[u8]) -> Option<Field> {
    match local {
        b"uid" => Some(Field::Uid),
        b"lastName" | b"last" => Some(Field::Last),
        b"firstName" | b"first" => Some(Field::First),
        b"sdnName" | b"name" => Some(Field::Whole),
        b"sdnType" | b"type" => Some(Field::Type),
        b"remarks" => Some(Field::Remarks),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct Draft {
    uid: Option<String>,
    first: Option<String>,
    last: Option<String>,
    whole: Option<String>,
    typ: Option<String>,
    remarks: Option<String>,
    nested_name: Option<String>,
}

impl Draft {
    fn set(&mut self, field: Field, value: String) {
        let v = value.trim();
        let v = (!v.is_empty()).then(|| v.to_string());
        match field {
            Field::Uid => self.uid = v.or(self.uid.take()),
            Field::Last => self.last = v,
            Field::First => self.first = v,
            Field::Whole => self.whole = v,
            Field::Type => self.typ = v,
            Field::Remarks => self.remarks = v,
            Field::NestedName => self.nested_name = v,
        }
    }

    /// Whole name, else "LAST, FIRST", else a nested name.
    fn into_entry(self) -> Option<ReferenceEntry> {
        let name = match self.whole {
            Some(w) => w,
            None => {
                let parts: Vec<String> = [self.last, self.first].into_iter().flatten().collect();
                if parts.is_empty() {
                    self.nested_name?
                } else {
                    parts.join(", ")
                }
            }
        };
        Some(ReferenceEntry {
            uid: self.uid,
            name,
            category: self.typ,
            remarks: self.remarks,
        })
    }
}

/// Parse SDN XML bytes into reference entries; entries without any name are skipped.
pub fn parse_sdn_xml(xml: &[u8]) -> Result<Vec<ReferenceEntry>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut out = Vec::new();
    let mut buf = Vec::new();
    let mut depth = 0usize;
    // (depth of the open sdnEntry element, collected fields)
    let mut entry: Option<(usize, Draft)> = None;
    // (field being captured, depth of its element)
    let mut field: Option<(Field, usize)> = None;
    let mut text = String::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .with_context(|| format!("parsing sdn xml at byte {}", reader.buffer_position()))?;

        match event {
            Event::Start(e) => {
                depth += 1;
                let local = e.local_name();
                let local = local.as_ref();

                match entry.as_mut() {
                    None if local == b"sdnEntry" => {
                        let mut draft = Draft::default();
                        for attr in e.attributes() {
                            let attr = attr.context("reading sdnEntry attribute")?;
                            if attr.key.local_name().as_ref() == b"uid" {
                                let v = attr.unescape_value().context("sdnEntry uid")?;
                                draft.set(Field::Uid, v.into_owned());
                            }
                        }
                        entry = Some((depth, draft));
                    }
                    Some((entry_depth, draft)) if field.is_none() => {
                        let f = if depth == *entry_depth + 1 {
                            direct_field(local)
                        } else if draft.nested_name.is_none()
                            && matches!(local, b"sdnName" | b"name")
                        {
                            Some(Field::NestedName)
                        } else {
                            None
                        };
                        if let Some(f) = f {
                            field = Some((f, depth));
                            text.clear();
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                if field.is_some() {
                    text.push_str(&t.unescape().context("unescaping sdn text")?);
                }
            }
            Event::CData(c) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => {
                if let Some((f, field_depth)) = field {
                    if field_depth == depth {
                        if let Some((_, draft)) = entry.as_mut() {
                            draft.set(f, std::mem::take(&mut text));
                        }
                        field = None;
                    }
                }
                if matches!(entry, Some((entry_depth, _)) if entry_depth == depth) {
                    if let Some((_, draft)) = entry.take() {
                        if let Some(e) = draft.into_entry() {
                            out.push(e);
                        }
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(out)
}
