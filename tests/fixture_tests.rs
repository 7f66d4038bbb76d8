use e57_fixtures::suite::{self, reference_points};
use e57_fixtures::{
    inspect, Alignment, Codec, Error, Fixture, Header, LayoutPlan, Point, RecordDefect, Scan,
    Stage,
};
use roxmltree::Document;
use std::fs::{read, remove_file};
use std::path::Path;

fn read_floats(data: &[u8]) -> Vec<f32> {
    data.chunks_exact(4)
        .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
        .collect()
}

#[test]
fn three_points_uncompressed() {
    let path = Path::new("three_points_uncompressed.e57");
    let mut fixture = Fixture::new("{file}");
    fixture.add_scan(Scan::new("{scan}", reference_points()));
    let written = fixture.write_file(path).unwrap();

    let data = read(path).unwrap();
    assert_eq!(data.len() as u64, written);

    let header = Header::read(&mut data.as_slice()).unwrap();
    assert_eq!(&header.signature, b"ASTM-E57");
    assert_eq!(header.major, 1);
    assert_eq!(header.minor, 0);
    assert_eq!(header.page_size, 1024);
    assert_eq!(header.phys_xml_offset, 48);
    assert_eq!(header.phys_length, data.len() as u64);

    let plan = LayoutPlan::from_header(&header, &[36], Alignment::Bytes(8));
    assert_eq!(plan.binary_offset % 8, 0);
    assert_eq!(plan.total_length, header.phys_length);
    assert!(data[(48 + header.xml_length) as usize..plan.binary_offset as usize]
        .iter()
        .all(|b| *b == 0));

    let floats = read_floats(&data[plan.binary_offset as usize..]);
    assert_eq!(floats, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);

    let inspection = inspect(&data).unwrap();
    assert_eq!(
        inspection.records[0].file_offset_value(),
        Some(plan.binary_offset)
    );
    assert_eq!(inspection.records[0].record_count_value(), Some(3));

    remove_file(path).unwrap();
}

#[test]
fn header_round_trip_reproduces_plan() {
    for named in suite::standard_suite() {
        if named.fixture.is_malformed() {
            continue;
        }
        let assembly = named.fixture.assemble();
        let bytes = named.fixture.to_bytes().unwrap();
        let header = Header::read(&mut bytes.as_slice()).unwrap();
        let lengths: Vec<u64> = assembly.payloads.iter().map(|p| p.len() as u64).collect();
        let alignment = if named.name == "e57_bitpack_codec_test.e57" {
            Alignment::Page
        } else {
            Alignment::default()
        };
        let replanned = LayoutPlan::from_header(&header, &lengths, alignment);
        assert_eq!(replanned, assembly.plan, "{}", named.name);
        assert!(header.phys_xml_offset + header.xml_length <= replanned.binary_offset);
        assert_eq!(header.phys_length, bytes.len() as u64, "{}", named.name);
        assert_eq!(
            header.phys_length,
            replanned.binary_offset + replanned.payload_length()
        );
    }
}

#[test]
fn building_is_idempotent() {
    for named in suite::standard_suite() {
        let first = named.fixture.to_bytes().unwrap();
        let second = named.fixture.to_bytes().unwrap();
        assert_eq!(first, second, "{}", named.name);
    }
    let a = suite::multi_scan(2, 99).to_bytes().unwrap();
    let b = suite::multi_scan(2, 99).to_bytes().unwrap();
    assert_eq!(a, b);
}

#[test]
fn zero_records() {
    let bytes = suite::empty_pointcloud().to_bytes().unwrap();
    let header = Header::read(&mut bytes.as_slice()).unwrap();
    let plan = LayoutPlan::from_header(&header, &[0], Alignment::default());
    assert_eq!(plan.binary_offset, bytes.len() as u64);
    let inspection = inspect(&bytes).unwrap();
    assert_eq!(inspection.records[0].record_count.as_deref(), Some("0"));
    assert_eq!(
        inspection.records[0].file_offset_value(),
        Some(bytes.len() as u64)
    );
}

#[test]
fn malformed_xml_is_parseable() {
    let bytes = suite::malformed_compressed_vector().to_bytes().unwrap();
    let inspection = inspect(&bytes).unwrap();
    let document = Document::parse(&inspection.xml).unwrap();

    let points = document
        .descendants()
        .find(|n| n.has_tag_name("points"))
        .unwrap();
    assert_eq!(points.attribute("type"), Some("CompressedVector"));
    assert_eq!(points.attribute("recordCount"), Some("invalid_count"));
    assert!(points.children().all(|n| !n.has_tag_name("codecs")));

    let record = &inspection.records[0];
    assert_eq!(record.prototype, vec!["cartesianX"]);
    assert_eq!(record.codecs, None);

    // Layout itself stays intact
    let header = &inspection.header;
    assert_eq!(header.phys_length, bytes.len() as u64);
    let floats = read_floats(&bytes[bytes.len() - 36..]);
    assert_eq!(floats[0], 1.0);
    assert_eq!(floats[8], 9.0);
}

#[test]
fn unsupported_codec_otherwise_valid() {
    let bytes = suite::unsupported_codec().to_bytes().unwrap();
    let inspection = inspect(&bytes).unwrap();
    let record = &inspection.records[0];
    assert_eq!(record.codecs, Some(vec![String::from("zLibCodec")]));
    assert_eq!(record.record_count_value(), Some(3));
    assert_eq!(record.prototype.len(), 3);
    let offset = record.file_offset_value().unwrap() as usize;
    assert_eq!(offset % 8, 0);
    assert_eq!(read_floats(&bytes[offset..]).len(), 9);
}

#[test]
fn bit_pack_page_aligned() {
    let fixture = suite::bit_pack_codec();
    let assembly = fixture.assemble();
    assert_eq!(assembly.plan.binary_offset % 1024, 0);
    let bytes = fixture.to_bytes().unwrap();
    let inspection = inspect(&bytes).unwrap();
    let record = &inspection.records[0];
    assert_eq!(record.codecs, Some(vec![String::from("bitPackCodec")]));
    assert_eq!(record.file_offset_value(), Some(assembly.plan.binary_offset));
    assert!(inspection.xml.contains("<recordCount type=\"Integer\">3</recordCount>"));
}

#[test]
fn multi_scan_offsets_abut() {
    let fixture = suite::multi_scan(3, 7);
    let bytes = fixture.to_bytes().unwrap();
    let inspection = inspect(&bytes).unwrap();
    assert_eq!(inspection.records.len(), 3);

    let mut expected = inspection.records[0].file_offset_value().unwrap();
    for (i, record) in inspection.records.iter().enumerate() {
        let count = record.record_count_value().unwrap();
        assert_eq!(count, 1000 + 500 * i as u64);
        assert_eq!(record.file_offset_value(), Some(expected));

        let start = expected as usize;
        let first = read_floats(&bytes[start..start + 12]);
        let point = fixture.scans()[i].points()[0];
        assert_eq!(first, vec![point.x, point.y, point.z]);

        expected += count * 12;
    }
    assert_eq!(expected, bytes.len() as u64);
}

#[test]
fn divergent_offset_is_written() {
    let mut scan = Scan::new("{scan}", reference_points());
    scan.add_defect(RecordDefect::FileOffset(1));
    let mut fixture = Fixture::new("{file}");
    fixture.add_scan(scan);
    let assembly = fixture.assemble();
    let bytes = fixture.to_bytes().unwrap();
    let inspection = inspect(&bytes).unwrap();
    assert_eq!(inspection.records[0].file_offset_value(), Some(1));
    let data = &bytes[assembly.plan.binary_offset as usize..];
    assert_eq!(read_floats(data)[0], 1.0);
}

#[test]
fn special_floats_survive() {
    let mut fixture = Fixture::new("{file}");
    let points = vec![Point::new(f32::NAN, f32::NEG_INFINITY, f32::MAX)];
    fixture.add_scan(Scan::new("{scan}", points));
    let assembly = fixture.assemble();
    let bytes = fixture.to_bytes().unwrap();
    let data = &bytes[assembly.plan.binary_offset as usize..];
    let floats = read_floats(data);
    assert!(floats[0].is_nan());
    assert_eq!(floats[1], f32::NEG_INFINITY);
    assert_eq!(floats[2], f32::MAX);
}

#[test]
fn codecs_per_variant() {
    let mut fixture = Fixture::new("{file}");
    for codec in [Codec::Uncompressed, Codec::bit_packed(), Codec::unsupported()] {
        let mut scan = Scan::new("{scan}", reference_points());
        scan.set_codec(codec);
        fixture.add_scan(scan);
    }
    let bytes = fixture.to_bytes().unwrap();
    let inspection = inspect(&bytes).unwrap();
    let codecs: Vec<Vec<String>> = inspection
        .records
        .iter()
        .map(|r| r.codecs.clone().unwrap())
        .collect();
    assert_eq!(
        codecs,
        vec![
            vec![String::from("CompressedVectorNode")],
            vec![String::from("bitPackCodec")],
            vec![String::from("zLibCodec")],
        ]
    );
}

#[test]
fn missing_folder_reports_open_stage() {
    let path = Path::new("missing_folder_for_fixture_test/fixture.e57");
    let err = suite::uncompressed().write_file(path).unwrap_err();
    assert!(matches!(err, Error::Write { .. }));
    assert_eq!(err.stage(), Some(Stage::Open));
    assert!(!path.exists());
}

#[test]
fn full_device_reports_header_stage() {
    let path = Path::new("/dev/full");
    if !path.exists() {
        return;
    }
    for fixture in [suite::uncompressed(), suite::multi_scan(3, 1)] {
        let err = fixture.write_file(path).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Header));
        assert!(err.to_string().contains("header stage"));
    }
}

#[test]
fn existing_file_is_replaced() {
    let path = Path::new("existing_file_is_replaced.e57");
    std::fs::write(path, vec![0xAB_u8; 10_000]).unwrap();
    let written = suite::uncompressed().write_file(path).unwrap();
    let data = read(path).unwrap();
    assert_eq!(data.len() as u64, written);
    assert_eq!(&data[0..8], b"ASTM-E57");
    remove_file(path).unwrap();
}

#[test]
fn write_suite_into_folder() {
    let folder = Path::new("write_suite_into_folder");
    std::fs::create_dir_all(folder).unwrap();
    let fixtures = suite::standard_suite();
    let written = suite::write_suite(folder, &fixtures).unwrap();
    assert_eq!(written.len(), fixtures.len());
    for (path, bytes) in &written {
        assert_eq!(path.metadata().unwrap().len(), *bytes);
    }

    let corrupted = read(folder.join("corrupted_signature.e57")).unwrap();
    assert_eq!(&corrupted[0..8], b"XXXX-E57");
    let truncated = read(folder.join("truncated.e57")).unwrap();
    let header = Header::read(&mut truncated.as_slice()).unwrap();
    assert!(header.phys_length > truncated.len() as u64);

    std::fs::remove_dir_all(folder).unwrap();
}
