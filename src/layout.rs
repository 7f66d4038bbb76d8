use crate::Header;

/// Alignment rule for the start of the binary section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    /// Align to a fixed number of bytes. A unit of zero behaves like one.
    Bytes(u64),
    /// Align to the page size announced in the header.
    Page,
}

impl Alignment {
    /// Resolves the alignment unit in bytes for a given page size.
    pub fn unit(&self, page_size: u64) -> u64 {
        match self {
            Alignment::Bytes(unit) => (*unit).max(1),
            Alignment::Page => page_size.max(1),
        }
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Alignment::Bytes(8)
    }
}

/// Rounds up to the next multiple of the unit.
/// Values that are already a multiple stay unchanged, results saturate at `u64::MAX`.
pub fn align_up(value: u64, unit: u64) -> u64 {
    let unit = unit.max(1);
    value.saturating_add((unit - value % unit) % unit)
}

/// Physical layout of a fixture derived from the XML length and payload sizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutPlan {
    pub xml_offset: u64,
    pub xml_length: u64,
    /// Start of the binary section, aligned.
    pub binary_offset: u64,
    /// Start offset of each payload in declaration order.
    pub payload_offsets: Vec<u64>,
    pub total_length: u64,
}

impl LayoutPlan {
    /// Sum of all payload lengths.
    pub fn payload_length(&self) -> u64 {
        self.total_length.saturating_sub(self.binary_offset)
    }

    /// Re-derives the plan from the values stored in a header.
    /// Lying headers are fine, offsets saturate instead of overflowing.
    pub fn from_header(header: &Header, payload_lengths: &[u64], alignment: Alignment) -> Self {
        plan_at(
            header.phys_xml_offset,
            header.xml_length,
            header.page_size,
            payload_lengths,
            alignment,
        )
    }
}

/// Plans the layout of a file whose XML section starts right behind the header.
pub fn plan(
    xml_length: u64,
    page_size: u64,
    payload_lengths: &[u64],
    alignment: Alignment,
) -> LayoutPlan {
    plan_at(Header::SIZE, xml_length, page_size, payload_lengths, alignment)
}

fn plan_at(
    xml_offset: u64,
    xml_length: u64,
    page_size: u64,
    payload_lengths: &[u64],
    alignment: Alignment,
) -> LayoutPlan {
    let binary_offset = align_up(
        xml_offset.saturating_add(xml_length),
        alignment.unit(page_size),
    );
    let mut payload_offsets = Vec::with_capacity(payload_lengths.len());
    let mut offset = binary_offset;
    for length in payload_lengths {
        payload_offsets.push(offset);
        offset = offset.saturating_add(*length);
    }
    LayoutPlan {
        xml_offset,
        xml_length,
        binary_offset,
        payload_offsets,
        total_length: offset,
    }
}
