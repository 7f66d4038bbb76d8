use crate::xml;
use crate::{Codec, Record, RecordName};

/// Deliberate deviation from the E57 schema for a single point cloud.
///
/// Every variant only changes the generated XML of its point cloud,
/// the binary payload and the layout stay the same.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordDefect {
    /// Replaces the record count attribute values with this literal text.
    RecordCount(String),
    /// Omits the record count everywhere.
    MissingRecordCount,
    /// Drops the listed fields from the prototype and from codec entries.
    MissingFields(Vec<RecordName>),
    /// Omits the whole codecs vector.
    MissingCodecs,
    /// Emits a codecs vector without any entry.
    EmptyCodecs,
    /// Appends a second, conflicting codec entry.
    ExtraCodec(Codec),
    /// Declares this file offset instead of the planned one.
    FileOffset(u64),
    /// Omits the file offset attribute.
    MissingFileOffset,
}

/// Logical description of one point cloud as it appears in the XML section.
#[derive(Clone, Debug, PartialEq)]
pub struct PointRecord {
    pub guid: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Number of points in the binary payload.
    pub record_count: u64,
    /// Planned physical offset of the binary payload.
    pub file_offset: u64,
    pub prototype: Vec<Record>,
    pub codec: Codec,
    pub defects: Vec<RecordDefect>,
}

impl PointRecord {
    /// Record count as it will be written into the XML, if at all.
    pub fn declared_record_count(&self) -> Option<String> {
        let mut declared = Some(self.record_count.to_string());
        for defect in &self.defects {
            match defect {
                RecordDefect::RecordCount(text) => declared = Some(text.clone()),
                RecordDefect::MissingRecordCount => return None,
                _ => {}
            }
        }
        declared
    }

    /// File offset as it will be written into the XML, if at all.
    /// Differs from `file_offset` when a defect pins another value.
    pub fn declared_file_offset(&self) -> Option<u64> {
        let mut declared = Some(self.file_offset);
        for defect in &self.defects {
            match defect {
                RecordDefect::FileOffset(offset) => declared = Some(*offset),
                RecordDefect::MissingFileOffset => return None,
                _ => {}
            }
        }
        declared
    }

    /// Prototype fields that are actually written.
    pub fn declared_prototype(&self) -> Vec<Record> {
        let missing: Vec<RecordName> = self
            .defects
            .iter()
            .filter_map(|d| match d {
                RecordDefect::MissingFields(names) => Some(names.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect();
        self.prototype
            .iter()
            .filter(|r| !missing.contains(&r.name))
            .cloned()
            .collect()
    }

    /// True if the declared structure differs from the planned one.
    pub fn is_malformed(&self) -> bool {
        !self.defects.is_empty()
    }

    pub(crate) fn xml_string(&self) -> String {
        let record_count = self.declared_record_count();
        let file_offset = self.declared_file_offset().map(|o| o.to_string());
        let prototype = self.declared_prototype();

        let mut xml = String::from("<vectorChild type=\"Structure\">\n");
        if let Some(guid) = &self.guid {
            xml += &xml::gen_string("guid", guid);
        }
        if let Some(name) = &self.name {
            xml += &xml::gen_string("name", name);
        }
        if let Some(desc) = &self.description {
            xml += &xml::gen_string("description", desc);
        }

        xml += "<points type=\"CompressedVector\"";
        if let Some(offset) = &file_offset {
            xml += &format!(" fileOffset=\"{offset}\"");
        }
        if let Some(count) = &record_count {
            xml += &format!(" recordCount=\"{}\"", xml::escape_attribute(count));
        }
        xml += ">\n";

        xml += "<prototype type=\"Structure\">\n";
        for record in &prototype {
            xml += &record.xml_string();
        }
        xml += "</prototype>\n";

        let omit_codecs = self.defects.contains(&RecordDefect::MissingCodecs);
        if !omit_codecs {
            let count_attr = record_count.as_deref().map(xml::escape_attribute);
            xml += "<codecs type=\"Vector\" allowHeterogeneousChildren=\"1\">\n";
            if !self.defects.contains(&RecordDefect::EmptyCodecs) {
                xml += &self.codec.xml_string(
                    &prototype,
                    count_attr.as_deref(),
                    file_offset.as_deref(),
                );
                for defect in &self.defects {
                    if let RecordDefect::ExtraCodec(codec) = defect {
                        xml += &codec.xml_string(
                            &prototype,
                            count_attr.as_deref(),
                            file_offset.as_deref(),
                        );
                    }
                }
            }
            xml += "</codecs>\n";
        }

        xml += "</points>\n";
        xml += "</vectorChild>\n";
        xml
    }
}
