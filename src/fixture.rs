use crate::container::{write_container, Truncated};
use crate::error::{Converter, Stage};
use crate::layout::{plan, Alignment, LayoutPlan};
use crate::payload::encode_points;
use crate::xml::{compose, XmlDocument};
use crate::{Codec, Header, Point, PointRecord, Record, RecordDefect, Result, Root};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Deliberate inconsistency on container level.
/// Applied after the layout was planned, so the planned values stay available for comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerDefect {
    /// Replaces the file signature.
    Signature([u8; 8]),
    /// Announces a wrong physical file length in the header.
    PhysicalLength(u64),
    /// Announces a wrong XML length in the header.
    XmlLength(u64),
    /// Stops the emitted data after this number of bytes.
    Truncate(u64),
}

/// A single point cloud of a fixture with its points and XML description.
#[derive(Clone, Debug, PartialEq)]
pub struct Scan {
    guid: Option<String>,
    name: Option<String>,
    description: Option<String>,
    prototype: Vec<Record>,
    codec: Codec,
    defects: Vec<RecordDefect>,
    points: Vec<Point>,
}

impl Scan {
    /// Creates an uncompressed single precision XYZ point cloud.
    pub fn new(guid: &str, points: Vec<Point>) -> Self {
        Self {
            guid: Some(guid.to_owned()),
            name: None,
            description: None,
            prototype: Record::xyz_single(),
            codec: Codec::Uncompressed,
            defects: Vec::new(),
            points,
        }
    }

    pub fn set_name(&mut self, value: &str) {
        self.name = Some(value.to_owned());
    }

    pub fn set_description(&mut self, value: &str) {
        self.description = Some(value.to_owned());
    }

    /// Removes the GUID so that the point cloud has no identification.
    pub fn clear_guid(&mut self) {
        self.guid = None;
    }

    pub fn set_codec(&mut self, codec: Codec) {
        self.codec = codec;
    }

    /// Replaces the prototype.
    /// The payload stays packed single precision XYZ, whatever the prototype claims.
    pub fn set_prototype(&mut self, prototype: Vec<Record>) {
        self.prototype = prototype;
    }

    pub fn add_defect(&mut self, defect: RecordDefect) {
        self.defects.push(defect);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Builds the XML description for this point cloud at a given payload offset.
    pub fn descriptor(&self, file_offset: u64) -> PointRecord {
        PointRecord {
            guid: self.guid.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            record_count: self.points.len() as u64,
            file_offset,
            prototype: self.prototype.clone(),
            codec: self.codec.clone(),
            defects: self.defects.clone(),
        }
    }
}

/// Everything needed to emit a fixture, computed in a single pass over its description.
#[derive(Clone, Debug)]
pub struct Assembly {
    /// Header as it will be written, including container defects.
    pub header: Header,
    pub xml: XmlDocument,
    pub plan: LayoutPlan,
    /// Point cloud descriptors with reconciled offsets.
    pub records: Vec<PointRecord>,
    pub payloads: Vec<Vec<u8>>,
    /// Number of composing passes until embedded and planned offsets agreed.
    pub passes: usize,
    /// Number of bytes the output is cut to, if truncated.
    pub truncate: Option<u64>,
}

impl Assembly {
    /// Number of bytes that end up in the output.
    pub fn output_length(&self) -> u64 {
        match self.truncate {
            Some(limit) => limit.min(self.plan.total_length),
            None => self.plan.total_length,
        }
    }
}

/// Complete description of a synthetic E57 file.
///
/// Building is deterministic: the same description always yields the same bytes.
#[derive(Clone, Debug)]
pub struct Fixture {
    root: Root,
    major: u32,
    minor: u32,
    page_size: u64,
    alignment: Alignment,
    scans: Vec<Scan>,
    defects: Vec<ContainerDefect>,
}

impl Fixture {
    /// Creates an empty E57 1.0 fixture with 1024 byte pages and 8 byte alignment.
    pub fn new(guid: &str) -> Self {
        let header = Header::default();
        Self {
            root: Root::new(guid),
            major: header.major,
            minor: header.minor,
            page_size: header.page_size,
            alignment: Alignment::default(),
            scans: Vec::new(),
            defects: Vec::new(),
        }
    }

    pub fn set_root(&mut self, root: Root) {
        self.root = root;
    }

    pub fn root_mut(&mut self) -> &mut Root {
        &mut self.root
    }

    /// Sets the version written into the binary header.
    pub fn set_version(&mut self, major: u32, minor: u32) {
        self.major = major;
        self.minor = minor;
    }

    /// Sets the page size announced in the header. Zero is replaced by one.
    pub fn set_page_size(&mut self, page_size: u64) {
        self.page_size = page_size.max(1);
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    pub fn add_scan(&mut self, scan: Scan) {
        self.scans.push(scan);
    }

    pub fn add_defect(&mut self, defect: ContainerDefect) {
        self.defects.push(defect);
    }

    pub fn scans(&self) -> &[Scan] {
        &self.scans
    }

    /// True if the fixture or any of its point clouds deliberately breaks the format.
    pub fn is_malformed(&self) -> bool {
        !self.defects.is_empty() || self.scans.iter().any(|s| !s.defects.is_empty())
    }

    /// Encodes payloads, composes the XML with reconciled offsets and plans the layout.
    pub fn assemble(&self) -> Assembly {
        let payloads: Vec<Vec<u8>> = self.scans.iter().map(|s| encode_points(&s.points)).collect();
        let lengths: Vec<u64> = payloads.iter().map(|p| p.len() as u64).collect();

        // Offsets are embedded into the XML and thus change its length.
        // Larger offsets never shorten the XML, so the offsets only grow until they settle.
        let mut offsets = vec![0_u64; self.scans.len()];
        let mut passes = 0;
        let (records, xml, layout) = loop {
            passes += 1;
            let records: Vec<PointRecord> = self
                .scans
                .iter()
                .zip(&offsets)
                .map(|(scan, offset)| scan.descriptor(*offset))
                .collect();
            let xml = compose(&self.root, &records);
            let layout = plan(xml.len(), self.page_size, &lengths, self.alignment);
            if layout.payload_offsets == offsets {
                break (records, xml, layout);
            }
            offsets = layout.payload_offsets.clone();
        };

        let mut header = Header::build(self.major, self.minor, self.page_size)
            .patch(layout.total_length, xml.len());
        let mut truncate = None;
        for defect in &self.defects {
            match defect {
                ContainerDefect::Signature(signature) => header.signature = *signature,
                ContainerDefect::PhysicalLength(length) => {
                    header = header.patch(*length, header.xml_length)
                }
                ContainerDefect::XmlLength(length) => {
                    header = header.patch(header.phys_length, *length)
                }
                ContainerDefect::Truncate(limit) => truncate = Some(*limit),
            }
        }

        tracing::debug!(
            passes,
            xml_length = layout.xml_length,
            binary_offset = layout.binary_offset,
            total_length = layout.total_length,
            "Planned fixture layout"
        );

        Assembly {
            header,
            xml,
            plan: layout,
            records,
            payloads,
            passes,
            truncate,
        }
    }

    /// Emits the fixture into the writer and returns the number of bytes that reached it.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<u64> {
        let assembly = self.assemble();
        let payloads: Vec<(u64, &[u8])> = assembly
            .plan
            .payload_offsets
            .iter()
            .copied()
            .zip(assembly.payloads.iter().map(|p| p.as_slice()))
            .collect();
        let header = &assembly.header;
        let xml = assembly.xml.as_bytes();
        let binary_offset = assembly.plan.binary_offset;
        let written = match assembly.truncate {
            Some(limit) => {
                let emitted = write_container(
                    header,
                    xml,
                    binary_offset,
                    &payloads,
                    Truncated::new(writer, limit),
                )?;
                emitted.min(limit)
            }
            None => write_container(header, xml, binary_offset, &payloads, writer)?,
        };
        Ok(written)
    }

    /// Builds the fixture in memory.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(buffer)
    }

    /// Creates or replaces the file at the given path with this fixture.
    ///
    /// If writing fails after the file was opened, the file is truncated to zero bytes
    /// before the error is returned, so no half-written fixture is left behind.
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<u64> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .write_err(
                Stage::Open,
                format!("Unable to create fixture file {}", path.display()),
            )?;
        let written = self.write_or_discard(&file, BufWriter::new(&file))?;
        tracing::debug!(path = %path.display(), written, "Wrote fixture file");
        Ok(written)
    }

    /// Writes the fixture through the writer and truncates the file on any failure.
    fn write_or_discard<W: Write>(&self, file: &File, writer: W) -> Result<u64> {
        match self.write_to(writer) {
            Ok(written) => Ok(written),
            Err(err) => {
                discard(file);
                Err(err)
            }
        }
    }
}

fn discard(file: &File) {
    if let Err(err) = file.set_len(0) {
        tracing::warn!(%err, "Failed to truncate incomplete fixture file");
    }
}
