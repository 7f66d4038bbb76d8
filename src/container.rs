use crate::error::{Converter, Stage};
use crate::{Header, Result};
use std::io::{copy, repeat, Read, Write};

/// Sequential emitter for the sections of an E57 container.
///
/// The writer never seeks and never checks the consistency of what it writes,
/// it only keeps track of the current position to produce padding.
/// Every section is flushed once written, so buffered writers report
/// failures with the stage of the section that caused them.
pub struct ContainerWriter<W: Write> {
    writer: W,
    position: u64,
}

impl<W: Write> ContainerWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            position: 0,
        }
    }

    /// Number of bytes emitted so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn write_header(&mut self, header: &Header) -> Result<()> {
        header.write(&mut self.writer)?;
        self.position += Header::SIZE;
        self.flush_section(Stage::Header)
    }

    pub fn write_xml(&mut self, xml: &[u8]) -> Result<()> {
        self.writer
            .write_all(xml)
            .write_err(Stage::Xml, "Failed to write XML section")?;
        self.position += xml.len() as u64;
        self.flush_section(Stage::Xml)
    }

    /// Writes zero bytes until the position reaches the offset.
    /// Nothing happens if the position is already at or behind the offset.
    pub fn pad_to(&mut self, offset: u64) -> Result<()> {
        if offset > self.position {
            let count = offset - self.position;
            let written = copy(&mut repeat(0).take(count), &mut self.writer)
                .write_err(Stage::Padding, "Failed to write zero padding")?;
            self.position += written;
            self.flush_section(Stage::Padding)?;
        }
        Ok(())
    }

    /// Writes a payload at its declared offset, padding with zeros if needed.
    /// Payloads declared before the current position are appended directly.
    pub fn write_payload(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        self.pad_to(offset)?;
        self.writer
            .write_all(bytes)
            .write_err(Stage::Payload, "Failed to write point payload")?;
        self.position += bytes.len() as u64;
        self.flush_section(Stage::Payload)?;
        tracing::trace!(offset, length = bytes.len(), "Wrote payload");
        Ok(())
    }

    fn flush_section(&mut self, stage: Stage) -> Result<()> {
        self.writer
            .flush()
            .write_err(stage, format!("Failed to flush {stage} section"))
    }

    /// Flushes the underlying writer and returns it together with the number of emitted bytes.
    pub fn finish(mut self) -> Result<(W, u64)> {
        self.writer
            .flush()
            .write_err(Stage::Flush, "Failed to flush writer at the end")?;
        Ok((self.writer, self.position))
    }
}

/// Emits header, XML, padding up to the binary offset and all payloads in ascending offset order.
///
/// Returns the number of bytes emitted.
pub fn write_container<W: Write>(
    header: &Header,
    xml: &[u8],
    binary_offset: u64,
    payloads: &[(u64, &[u8])],
    writer: W,
) -> Result<u64> {
    let mut ordered: Vec<&(u64, &[u8])> = payloads.iter().collect();
    ordered.sort_by_key(|(offset, _)| *offset);

    let mut container = ContainerWriter::new(writer);
    container.write_header(header)?;
    container.write_xml(xml)?;
    container.pad_to(binary_offset)?;
    for (offset, bytes) in ordered {
        container.write_payload(*offset, bytes)?;
    }
    let (_, written) = container.finish()?;
    Ok(written)
}

/// Writer adapter that forwards only the first `limit` bytes and silently drops the rest.
pub struct Truncated<W: Write> {
    writer: W,
    remaining: u64,
}

impl<W: Write> Truncated<W> {
    pub fn new(writer: W, limit: u64) -> Self {
        Self {
            writer,
            remaining: limit,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Write for Truncated<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let forward = buf.len().min(self.remaining.min(usize::MAX as u64) as usize);
        if forward > 0 {
            self.writer.write_all(&buf[..forward])?;
            self.remaining -= forward as u64;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}
