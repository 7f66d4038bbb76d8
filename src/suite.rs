use crate::layout::Alignment;
use crate::payload::{random_points, PointBounds};
use crate::{
    Codec, ContainerDefect, Fixture, Point, Record, RecordDefect, RecordName, Result, Root, Scan,
};
use std::path::{Path, PathBuf};

const FILE_GUID: &str = "{12345678-1234-5678-9ABC-123456789ABC}";
const SCAN_GUID: &str = "{87654321-4321-8765-CBA9-987654321CBA}";

/// A fixture of the standard suite together with its file name.
#[derive(Clone, Debug)]
pub struct NamedFixture {
    /// File name including the .e57 extension.
    pub name: &'static str,
    /// What the fixture is meant to provoke in a reader.
    pub purpose: &'static str,
    pub fixture: Fixture,
}

/// The three points (1,2,3), (4,5,6) and (7,8,9) used by most fixtures.
pub fn reference_points() -> Vec<Point> {
    vec![
        Point::new(1.0, 2.0, 3.0),
        Point::new(4.0, 5.0, 6.0),
        Point::new(7.0, 8.0, 9.0),
    ]
}

fn test_root() -> Root {
    let mut root = Root::new(FILE_GUID);
    root.library_version = Some(String::from("Test Library 1.0"));
    root.coordinate_metadata = Some(String::from("Test coordinate metadata"));
    root
}

fn reference_scan() -> Scan {
    let mut scan = Scan::new(SCAN_GUID, reference_points());
    scan.set_name("Test Point Cloud");
    scan.set_description("Test point cloud with CompressedVector");
    scan.set_prototype(Record::xyz_single_bounded(-1000.0, 1000.0));
    scan
}

fn fixture_with(scan: Scan) -> Fixture {
    let mut fixture = Fixture::new(FILE_GUID);
    fixture.set_root(test_root());
    fixture.add_scan(scan);
    fixture
}

/// Single uncompressed point cloud with the three reference points, 8 byte aligned.
pub fn uncompressed() -> Fixture {
    fixture_with(reference_scan())
}

/// Invalid record count, prototype without Y and Z and no codecs at all.
pub fn malformed_compressed_vector() -> Fixture {
    let mut scan = reference_scan();
    scan.add_defect(RecordDefect::RecordCount(String::from("invalid_count")));
    scan.add_defect(RecordDefect::MissingFields(vec![
        RecordName::CartesianY,
        RecordName::CartesianZ,
    ]));
    scan.add_defect(RecordDefect::MissingCodecs);
    fixture_with(scan)
}

/// Bit pack codec entry with page aligned binary section.
pub fn bit_pack_codec() -> Fixture {
    let mut scan = reference_scan();
    scan.set_codec(Codec::bit_packed());
    let mut fixture = fixture_with(scan);
    fixture.set_alignment(Alignment::Page);
    fixture
}

/// Well-formed file using the zLib codec tag.
pub fn unsupported_codec() -> Fixture {
    let mut scan = reference_scan();
    scan.set_codec(Codec::unsupported());
    fixture_with(scan)
}

/// Several random scans with growing point counts stored back to back.
pub fn multi_scan(scan_count: usize, seed: u64) -> Fixture {
    let mut fixture = Fixture::new("{MULTI-SCAN-TEST-FILE-GUID}");
    for i in 0..scan_count {
        let shift = i as f32 * 100.0;
        let bounds = PointBounds {
            x: -1000.0 + shift..1000.0 + shift,
            y: -1000.0 + shift..1000.0 + shift,
            z: 0.0..100.0,
        };
        let points = random_points(1000 + i * 500, seed + i as u64, &bounds);
        let mut scan = Scan::new(&format!("{{SCAN-{i}-GUID}}"), points);
        scan.set_name(&format!("Scan {i}"));
        scan.set_description(&format!("Test scan number {i}"));
        fixture.add_scan(scan);
    }
    fixture
}

/// Point cloud without points, the binary section is followed directly by the end of file.
pub fn empty_pointcloud() -> Fixture {
    let mut scan = Scan::new(SCAN_GUID, Vec::new());
    scan.set_name("Empty Point Cloud");
    fixture_with(scan)
}

/// Otherwise valid file with a broken signature.
pub fn corrupted_signature() -> Fixture {
    let mut fixture = uncompressed();
    fixture.add_defect(ContainerDefect::Signature(*b"XXXX-E57"));
    fixture
}

/// Valid header and XML, but the file stops in the middle of the point payload.
pub fn truncated() -> Fixture {
    let mut fixture = uncompressed();
    let total = fixture.assemble().plan.total_length;
    fixture.add_defect(ContainerDefect::Truncate(total - 18));
    fixture
}

/// Declared file offset points before the real binary section.
pub fn misplaced_offset() -> Fixture {
    let mut scan = reference_scan();
    scan.add_defect(RecordDefect::FileOffset(48 + 800));
    fixture_with(scan)
}

/// Two conflicting codec entries for a single point cloud.
pub fn conflicting_codecs() -> Fixture {
    let mut scan = reference_scan();
    scan.add_defect(RecordDefect::ExtraCodec(Codec::bit_packed()));
    fixture_with(scan)
}

/// Returns all fixtures of the standard suite.
pub fn standard_suite() -> Vec<NamedFixture> {
    vec![
        NamedFixture {
            name: "compressedvector_uncompressed_data.e57",
            purpose: "valid uncompressed XYZ point cloud",
            fixture: uncompressed(),
        },
        NamedFixture {
            name: "malformed_compressedvector.e57",
            purpose: "schema error: invalid count, incomplete prototype, no codecs",
            fixture: malformed_compressed_vector(),
        },
        NamedFixture {
            name: "e57_bitpack_codec_test.e57",
            purpose: "bitPackCodec entry with page aligned data",
            fixture: bit_pack_codec(),
        },
        NamedFixture {
            name: "e57_unsupported_codec_test.e57",
            purpose: "unsupported codec error",
            fixture: unsupported_codec(),
        },
        NamedFixture {
            name: "multi_scan.e57",
            purpose: "three scans stored back to back",
            fixture: multi_scan(3, 1),
        },
        NamedFixture {
            name: "empty_pointcloud.e57",
            purpose: "record count zero",
            fixture: empty_pointcloud(),
        },
        NamedFixture {
            name: "corrupted_signature.e57",
            purpose: "header signature error",
            fixture: corrupted_signature(),
        },
        NamedFixture {
            name: "truncated.e57",
            purpose: "file shorter than announced",
            fixture: truncated(),
        },
        NamedFixture {
            name: "misplaced_offset.e57",
            purpose: "declared file offset differs from data location",
            fixture: misplaced_offset(),
        },
        NamedFixture {
            name: "conflicting_codecs.e57",
            purpose: "multiple codecs for one point cloud",
            fixture: conflicting_codecs(),
        },
    ]
}

/// Writes fixtures into a folder and returns the paths with the number of written bytes.
/// The folder must exist.
pub fn write_suite(
    folder: impl AsRef<Path>,
    fixtures: &[NamedFixture],
) -> Result<Vec<(PathBuf, u64)>> {
    let folder = folder.as_ref();
    let mut written = Vec::with_capacity(fixtures.len());
    for named in fixtures {
        let path = folder.join(named.name);
        let bytes = named.fixture.write_file(&path)?;
        written.push((path, bytes));
    }
    Ok(written)
}
