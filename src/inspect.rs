use crate::error::Converter;
use crate::header::HEADER_BYTES;
use crate::{Error, Header, Result};
use roxmltree::{Document, Node};

/// Point cloud attributes exactly as declared in the XML section of an artifact.
///
/// All values are kept as raw text, since broken fixtures declare broken values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclaredRecord {
    pub guid: Option<String>,
    pub name: Option<String>,
    pub file_offset: Option<String>,
    pub record_count: Option<String>,
    /// Tag names of the prototype fields in declaration order.
    pub prototype: Vec<String>,
    /// Codec entry descriptions, `None` if there is no codecs vector at all.
    /// Uncompressed nodes are reported as "CompressedVectorNode",
    /// tagged nodes by the tag name of their codec structure.
    pub codecs: Option<Vec<String>>,
}

impl DeclaredRecord {
    /// Declared file offset parsed as number.
    pub fn file_offset_value(&self) -> Option<u64> {
        self.file_offset.as_deref().and_then(|s| s.parse().ok())
    }

    /// Declared record count parsed as number.
    pub fn record_count_value(&self) -> Option<u64> {
        self.record_count.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Result of reading back a produced artifact.
#[derive(Clone, Debug)]
pub struct Inspection {
    pub header: Header,
    pub xml: String,
    pub records: Vec<DeclaredRecord>,
    /// Number of bytes in the inspected data.
    pub length: u64,
}

/// Reads header and XML section of some E57 data and extracts the declared point clouds.
///
/// Fails if the data is shorter than announced or the XML is not well-formed.
/// Nothing is checked against the E57 schema.
pub fn inspect(data: &[u8]) -> Result<Inspection> {
    let header_data: &[u8; HEADER_BYTES] = data
        .get(..HEADER_BYTES)
        .and_then(|d| d.try_into().ok())
        .invalid_err(format!(
            "Data has only {} bytes, shorter than the file header",
            data.len()
        ))?;
    let header = Header::from_bytes(header_data)?;
    let start = usize::try_from(header.phys_xml_offset).invalid_err("XML offset is too large")?;
    let length = usize::try_from(header.xml_length).invalid_err("XML length is too large")?;
    let end = start
        .checked_add(length)
        .invalid_err("XML section end overflows")?;
    if end > data.len() {
        Error::invalid(format!(
            "XML section ends at {end} but data has only {} bytes",
            data.len()
        ))?
    }
    let xml = std::str::from_utf8(&data[start..end])
        .invalid_err("XML section is not valid UTF-8")?
        .to_owned();
    let records = {
        let document = Document::parse(&xml).invalid_err("Failed to parse XML section")?;
        declared_records(&document)
    };
    Ok(Inspection {
        header,
        xml,
        records,
        length: data.len() as u64,
    })
}

fn declared_records(document: &Document) -> Vec<DeclaredRecord> {
    let Some(data3d) = document.descendants().find(|n| n.has_tag_name("data3D")) else {
        return Vec::new();
    };
    data3d
        .children()
        .filter(|n| n.has_tag_name("vectorChild"))
        .map(|n| declared_record(&n))
        .collect()
}

fn declared_record(node: &Node) -> DeclaredRecord {
    let points = node.children().find(|n| n.has_tag_name("points"));
    let prototype = points
        .and_then(|p| p.children().find(|n| n.has_tag_name("prototype")))
        .map(|p| {
            p.children()
                .filter(|n| n.is_element())
                .map(|n| n.tag_name().name().to_owned())
                .collect()
        })
        .unwrap_or_default();
    let codecs = points
        .and_then(|p| p.children().find(|n| n.has_tag_name("codecs")))
        .map(|c| c.children().filter(|n| n.is_element()).map(codec_name).collect());
    DeclaredRecord {
        guid: child_text(node, "guid"),
        name: child_text(node, "name"),
        file_offset: points.and_then(|p| p.attribute("fileOffset")).map(String::from),
        record_count: points.and_then(|p| p.attribute("recordCount")).map(String::from),
        prototype,
        codecs,
    }
}

fn codec_name(node: Node) -> String {
    let tagged = node
        .children()
        .filter(|n| n.is_element())
        .find(|n| n.attribute("type") == Some("Structure") && !n.has_tag_name("prototype"));
    match tagged {
        Some(tag) => tag.tag_name().name().to_owned(),
        None => node.attribute("type").unwrap_or_default().to_owned(),
    }
}

fn child_text(node: &Node, tag_name: &str) -> Option<String> {
    node.children()
        .find(|n| n.has_tag_name(tag_name))
        .map(|n| n.children().filter_map(|c| c.text()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Codec, Fixture, Point, RecordDefect, Scan};

    #[test]
    fn declared_values() {
        let mut scan = Scan::new("{a}", vec![Point::new(1.0, 2.0, 3.0)]);
        scan.set_name("first");
        let mut second = Scan::new("{b}", Vec::new());
        second.set_codec(Codec::unsupported());
        second.add_defect(RecordDefect::RecordCount(String::from("invalid_count")));
        let mut fixture = Fixture::new("{file}");
        fixture.add_scan(scan);
        fixture.add_scan(second);

        let bytes = fixture.to_bytes().unwrap();
        let inspection = inspect(&bytes).unwrap();
        assert_eq!(inspection.length, bytes.len() as u64);
        assert_eq!(inspection.records.len(), 2);

        let first = &inspection.records[0];
        assert_eq!(first.guid.as_deref(), Some("{a}"));
        assert_eq!(first.name.as_deref(), Some("first"));
        assert_eq!(first.record_count_value(), Some(1));
        assert_eq!(first.prototype, vec!["cartesianX", "cartesianY", "cartesianZ"]);
        assert_eq!(
            first.codecs,
            Some(vec![String::from("CompressedVectorNode")])
        );

        let second = &inspection.records[1];
        assert_eq!(second.record_count.as_deref(), Some("invalid_count"));
        assert_eq!(second.record_count_value(), None);
        assert_eq!(second.codecs, Some(vec![String::from("zLibCodec")]));
        assert_eq!(
            second.file_offset_value(),
            first.file_offset_value().map(|o| o + 12)
        );
    }

    #[test]
    fn too_short() {
        assert!(matches!(inspect(&[0_u8; 10]), Err(Error::Invalid { .. })));
        assert!(matches!(inspect(&[]), Err(Error::Invalid { .. })));

        let mut fixture = Fixture::new("{file}");
        fixture.add_scan(Scan::new("{a}", Vec::new()));
        let bytes = fixture.to_bytes().unwrap();
        assert!(matches!(
            inspect(&bytes[..100]),
            Err(Error::Invalid { .. })
        ));
    }
}
