use crate::xml;
use crate::Record;

/// Default binary section identifier used by bit pack codec entries.
pub const DEFAULT_BINARY_SECTION: &str = "test_binary_section";

/// Codec name that common E57 readers do not implement.
pub const DEFAULT_UNSUPPORTED_CODEC: &str = "zLibCodec";

/// Describes how the binary payload of a point cloud is encoded.
///
/// The payload bytes are always the same packed floats,
/// only the metadata differs between the variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Codec {
    /// No transformation, offsets point directly at packed floats.
    /// Emits one codec node restating every prototype field.
    Uncompressed,
    /// Bit packing codec entry with its own record count and binary section name.
    BitPacked { binary_section: String },
    /// Codec tag that is not expected to have a decoder downstream.
    Unsupported { name: String },
}

impl Codec {
    /// Bit pack codec with the default binary section identifier.
    pub fn bit_packed() -> Self {
        Codec::BitPacked {
            binary_section: DEFAULT_BINARY_SECTION.to_owned(),
        }
    }

    /// Unsupported codec using the zLib codec tag.
    pub fn unsupported() -> Self {
        Codec::Unsupported {
            name: DEFAULT_UNSUPPORTED_CODEC.to_owned(),
        }
    }

    /// Serializes a single entry of a codecs vector.
    ///
    /// Record count and file offset are passed as already rendered attribute values,
    /// `None` omits the attribute.
    pub(crate) fn xml_string(
        &self,
        prototype: &[Record],
        record_count: Option<&str>,
        file_offset: Option<&str>,
    ) -> String {
        match self {
            Codec::Uncompressed => {
                let mut xml = String::from("<vectorChild type=\"CompressedVectorNode\"");
                if let Some(count) = record_count {
                    xml += &format!(" recordCount=\"{count}\"");
                }
                if let Some(offset) = file_offset {
                    xml += &format!(" fileOffset=\"{offset}\"");
                }
                xml += ">\n<prototype type=\"Structure\">\n";
                for record in prototype {
                    xml += &record.type_xml_string();
                }
                xml += "</prototype>\n</vectorChild>\n";
                xml
            }
            Codec::BitPacked { binary_section } => {
                tagged_node("bitPackCodec", record_count, binary_section)
            }
            Codec::Unsupported { name } => {
                tagged_node(name, record_count, DEFAULT_BINARY_SECTION)
            }
        }
    }
}

fn tagged_node(tag: &str, record_count: Option<&str>, binary_section: &str) -> String {
    let mut xml = String::from("<vector type=\"CompressedVectorNode\">\n");
    xml += &format!("<{tag} type=\"Structure\"/>\n");
    if let Some(count) = record_count {
        xml += &format!("<recordCount type=\"Integer\">{count}</recordCount>\n");
    }
    xml += &xml::gen_string("binarySection", binary_section);
    xml += "</vector>\n";
    xml
}
