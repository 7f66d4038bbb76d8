use crate::{PointRecord, Root};
use std::fmt::Display;

/// UTF-8 encoded XML section of a fixture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlDocument {
    xml: String,
}

impl XmlDocument {
    pub fn as_str(&self) -> &str {
        &self.xml
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.xml.as_bytes()
    }

    /// Length of the document in bytes.
    pub fn len(&self) -> u64 {
        self.xml.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.xml.is_empty()
    }

    pub fn into_string(self) -> String {
        self.xml
    }
}

/// Composes the XML section for the given root and point clouds.
///
/// Malformed point clouds are rendered exactly as their defects describe.
/// The result is always well-formed XML, only its E57 semantics may be broken.
pub fn compose(root: &Root, records: &[PointRecord]) -> XmlDocument {
    let mut xml = root.xml_start();
    for record in records {
        xml += &record.xml_string();
    }
    xml += &root.xml_end();
    XmlDocument { xml }
}

pub(crate) fn gen_string(tag_name: &str, value: &str) -> String {
    // A CDATA section cannot contain its own terminator, split it in two sections
    let value = value.replace("]]>", "]]]]><![CDATA[>");
    format!("<{tag_name} type=\"String\"><![CDATA[{value}]]></{tag_name}>\n")
}

pub(crate) fn gen_int<T: Display>(tag_name: &str, value: T) -> String {
    format!("<{tag_name} type=\"Integer\">{value}</{tag_name}>\n")
}

pub(crate) fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Codec, Record, RecordDefect, RecordName};
    use roxmltree::Document;

    fn record(guid: &str, offset: u64) -> PointRecord {
        PointRecord {
            guid: Some(guid.to_owned()),
            name: None,
            description: None,
            record_count: 3,
            file_offset: offset,
            prototype: Record::xyz_single(),
            codec: Codec::Uncompressed,
            defects: Vec::new(),
        }
    }

    #[test]
    fn root_fields() {
        let mut root = Root::new("{file}");
        root.coordinate_metadata = Some(String::from("Test coordinate metadata"));
        let doc = compose(&root, &[]);
        let parsed = Document::parse(doc.as_str()).unwrap();
        let e57_root = parsed.root_element();
        assert_eq!(e57_root.tag_name().name(), "e57Root");
        assert!(doc.as_str().contains("<guid type=\"String\"><![CDATA[{file}]]></guid>"));
        assert!(doc.as_str().contains("<versionMajor type=\"Integer\">1</versionMajor>"));
        assert!(doc.as_str().contains("coordinateMetadata"));
        assert_eq!(doc.len(), doc.as_bytes().len() as u64);
    }

    #[test]
    fn multiple_records_in_order() {
        let root = Root::new("{file}");
        let doc = compose(&root, &[record("{a}", 100), record("{b}", 136)]);
        let parsed = Document::parse(doc.as_str()).unwrap();
        let offsets: Vec<&str> = parsed
            .descendants()
            .filter(|n| n.has_tag_name("points"))
            .filter_map(|n| n.attribute("fileOffset"))
            .collect();
        assert_eq!(offsets, vec!["100", "136"]);
    }

    #[test]
    fn malformed_is_still_well_formed_xml() {
        let mut broken = record("{a}", 100);
        broken.defects = vec![
            RecordDefect::RecordCount(String::from("<\"odd\" & count>")),
            RecordDefect::MissingFields(vec![RecordName::CartesianY]),
            RecordDefect::ExtraCodec(Codec::unsupported()),
        ];
        let doc = compose(&Root::new("{file}"), &[broken]);
        let parsed = Document::parse(doc.as_str()).unwrap();
        let points = parsed
            .descendants()
            .find(|n| n.has_tag_name("points"))
            .unwrap();
        assert_eq!(points.attribute("recordCount"), Some("<\"odd\" & count>"));
    }

    #[test]
    fn cdata_terminator_in_value() {
        let xml = gen_string("name", "a]]>b");
        let parsed = Document::parse(&xml).unwrap();
        let text: String = parsed
            .root_element()
            .children()
            .filter_map(|n| n.text())
            .collect();
        assert_eq!(text, "a]]>b");
    }
}
