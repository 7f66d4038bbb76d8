use crate::error::{Converter, Stage, WRONG_OFFSET};
use crate::Result;
use std::io::{Read, Write};

/// Signature that every well-formed E57 file starts with.
pub const SIGNATURE: &[u8; 8] = b"ASTM-E57";

/// Default page size announced in the header.
pub const PAGE_SIZE: u64 = 1024;

const MAJOR_VERSION: u32 = 1;
const MINOR_VERSION: u32 = 0;
pub(crate) const HEADER_BYTES: usize = Header::SIZE as usize;

/// Represents the fixed structure at the start of an E57 file.
///
/// The two length fields are unknown when the header is built
/// and get filled in later with [`Header::patch`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Header {
    /// File header signature, "ASTM-E57" for all well-formed files.
    pub signature: [u8; 8],

    /// Major version number of the E57 format of the file.
    pub major: u32,

    /// Minor version number of the E57 format of the file.
    pub minor: u32,

    /// Physical length of the E57 file on disk or in memory.
    pub phys_length: u64,

    /// Physical offset of the XML data inside the file.
    /// Always directly behind the header for generated fixtures.
    pub phys_xml_offset: u64,

    /// Length of the XML data in bytes.
    pub xml_length: u64,

    /// Page size of the E57 file.
    pub page_size: u64,
}

impl Header {
    /// Serialized size of the header in bytes.
    pub const SIZE: u64 = 48;

    /// Creates a header with placeholder values for both length fields.
    pub fn build(major: u32, minor: u32, page_size: u64) -> Self {
        Self {
            signature: *SIGNATURE,
            major,
            minor,
            phys_length: 0,
            phys_xml_offset: Self::SIZE,
            xml_length: 0,
            page_size,
        }
    }

    /// Returns a copy with the physical file length and the XML length replaced.
    /// All other fields stay untouched.
    pub fn patch(&self, phys_length: u64, xml_length: u64) -> Self {
        Self {
            phys_length,
            xml_length,
            ..self.clone()
        }
    }

    /// Serializes the header into its little endian on-disk representation.
    pub fn to_bytes(&self) -> [u8; HEADER_BYTES] {
        let mut data = [0_u8; HEADER_BYTES];
        data[0..8].copy_from_slice(&self.signature);
        data[8..12].copy_from_slice(&self.major.to_le_bytes());
        data[12..16].copy_from_slice(&self.minor.to_le_bytes());
        data[16..24].copy_from_slice(&self.phys_length.to_le_bytes());
        data[24..32].copy_from_slice(&self.phys_xml_offset.to_le_bytes());
        data[32..40].copy_from_slice(&self.xml_length.to_le_bytes());
        data[40..48].copy_from_slice(&self.page_size.to_le_bytes());
        data
    }

    /// Parses a header from its on-disk representation.
    /// No field is validated, broken fixtures must be readable too.
    pub fn from_bytes(data: &[u8; HEADER_BYTES]) -> Result<Self> {
        Ok(Self {
            signature: data[0..8].try_into().internal_err(WRONG_OFFSET)?,
            major: u32::from_le_bytes(data[8..12].try_into().internal_err(WRONG_OFFSET)?),
            minor: u32::from_le_bytes(data[12..16].try_into().internal_err(WRONG_OFFSET)?),
            phys_length: u64::from_le_bytes(data[16..24].try_into().internal_err(WRONG_OFFSET)?),
            phys_xml_offset: u64::from_le_bytes(
                data[24..32].try_into().internal_err(WRONG_OFFSET)?,
            ),
            xml_length: u64::from_le_bytes(data[32..40].try_into().internal_err(WRONG_OFFSET)?),
            page_size: u64::from_le_bytes(data[40..48].try_into().internal_err(WRONG_OFFSET)?),
        })
    }

    /// Reads a header structure from the start of some E57 data.
    pub fn read(reader: &mut dyn Read) -> Result<Self> {
        let mut data = [0_u8; HEADER_BYTES];
        reader
            .read_exact(&mut data)
            .read_err("Failed to read E57 file header")?;
        Self::from_bytes(&data)
    }

    /// Writes the header to the supplied writer.
    pub fn write(&self, writer: &mut dyn Write) -> Result<()> {
        writer
            .write_all(&self.to_bytes())
            .write_err(Stage::Header, "Failed to write file header")
    }

    /// Returns true if the header carries the regular E57 signature.
    pub fn has_valid_signature(&self) -> bool {
        &self.signature == SIGNATURE
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::build(MAJOR_VERSION, MINOR_VERSION, PAGE_SIZE)
    }
}
