//! The changelog document codec.
//!
//! The on-disk format is a fixed XML shape, one `<entry>` per changed
//! member, tab-indented. Decoding is fail-closed: a document without a
//! `<changelog>` root or an entry with an element outside the schema is a
//! hard error naming the offender, never a silently shortened entry list.

use std::fmt::Write as _;

use chrono::NaiveDateTime;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Result, SclmError};
use crate::member::{EditType, MemberState, DATE_FORMAT};

/// Stateless encoder/decoder for changelog documents.
pub struct ChangeLogCodec;

impl ChangeLogCodec {
    /// Serialize `entries` to a changelog document. Entries are written in
    /// canonical order; an absent classification is emitted as the
    /// synthetic `SAME` tag.
    pub fn encode(entries: &[MemberState]) -> String {
        let mut ordered: Vec<&MemberState> = entries.iter().collect();
        ordered.sort_by(|a, b| MemberState::canonical_order(a, b));

        let mut doc = String::new();
        doc.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        doc.push_str("<changelog>\n");
        for entry in ordered {
            let edit_type = entry
                .edit_type
                .map(EditType::as_str)
                .unwrap_or("SAME");
            let _ = write!(
                doc,
                "\t<entry>\n\
                 \t\t<date>{}</date>\n\
                 \t\t<project>{}</project>\n\
                 \t\t<alternate>{}</alternate>\n\
                 \t\t<group>{}</group>\n\
                 \t\t<type>{}</type>\n\
                 \t\t<name>{}</name>\n\
                 \t\t<version>{}</version>\n\
                 \t\t<userID>{}</userID>\n\
                 \t\t<changeGroup>{}</changeGroup>\n\
                 \t\t<editType>{}</editType>\n\
                 \t</entry>\n",
                entry.date_string(),
                escape(entry.project.as_str()),
                escape(entry.alternate.as_str()),
                escape(entry.group.as_str()),
                escape(entry.member_type.as_str()),
                escape(entry.name.as_str()),
                entry.version,
                escape(entry.change_user.as_str()),
                escape(entry.change_group.as_str()),
                edit_type,
            );
        }
        doc.push_str("</changelog>\n");
        doc
    }

    /// Parse a changelog document back into member states.
    pub fn decode(document: &str) -> Result<Vec<MemberState>> {
        let mut reader = Reader::from_reader(document.as_bytes());
        let mut buf = Vec::new();
        let mut root_seen = false;
        let mut entries = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if !root_seen {
                        if name != "changelog" {
                            return Err(SclmError::MissingRoot);
                        }
                        root_seen = true;
                    } else if name == "entry" {
                        entries.push(Self::decode_entry(&mut reader)?);
                    } else {
                        // Not part of the schema at this level; skip the
                        // whole subtree.
                        let end = e.to_end().into_owned();
                        reader.read_to_end_into(end.name(), &mut Vec::new())?;
                    }
                }
                Event::Empty(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if !root_seen {
                        if name != "changelog" {
                            return Err(SclmError::MissingRoot);
                        }
                        root_seen = true;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !root_seen {
            return Err(SclmError::MissingRoot);
        }
        Ok(entries)
    }

    fn decode_entry(reader: &mut Reader<&[u8]>) -> Result<MemberState> {
        const FIELDS: [&str; 10] = [
            "date",
            "project",
            "alternate",
            "group",
            "type",
            "name",
            "version",
            "userID",
            "changeGroup",
            "editType",
        ];

        let mut buf = Vec::new();
        let mut current: Option<usize> = None;
        let mut values: [Option<String>; 10] = Default::default();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    match FIELDS.iter().position(|field| *field == name) {
                        Some(idx) => current = Some(idx),
                        None => return Err(SclmError::UnexpectedElement(name)),
                    }
                }
                Event::Empty(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                    if !FIELDS.contains(&name.as_str()) {
                        return Err(SclmError::UnexpectedElement(name));
                    }
                }
                Event::Text(t) => {
                    if let Some(idx) = current {
                        values[idx] = Some(t.unescape()?.trim().to_string());
                    }
                }
                Event::End(e) if e.name().as_ref() == b"entry" => break,
                Event::End(_) => current = None,
                Event::Eof => return Err(SclmError::MissingField("entry")),
                _ => {}
            }
            buf.clear();
        }

        let mut take = |idx: usize| -> Result<String> {
            values[idx].take().ok_or(SclmError::MissingField(FIELDS[idx]))
        };

        let date_raw = take(0)?;
        let change_date =
            NaiveDateTime::parse_from_str(&date_raw, DATE_FORMAT).map_err(|_| {
                SclmError::MalformedField {
                    field: "date",
                    value: date_raw.clone(),
                }
            })?;
        let project = take(1)?;
        let alternate = take(2)?;
        let group = take(3)?;
        let member_type = take(4)?;
        let name = take(5)?;
        let version_raw = take(6)?;
        let version = version_raw
            .parse::<u32>()
            .map_err(|_| SclmError::MalformedField {
                field: "version",
                value: version_raw.clone(),
            })?;
        let change_user = take(7)?;
        let change_group = take(8)?;
        let edit_raw = take(9)?;
        let edit_type =
            EditType::parse(&edit_raw).ok_or(SclmError::MalformedField {
                field: "editType",
                value: edit_raw.clone(),
            })?;

        Ok(MemberState {
            project,
            alternate,
            group,
            member_type,
            name,
            version,
            change_user,
            change_group,
            change_date,
            edit_type,
        })
    }
}
