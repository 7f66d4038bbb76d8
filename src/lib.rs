//! Builds synthetic files in the ASTM E57 container format to exercise E57 readers.
//!
//! A [`Fixture`] describes the file: root metadata, one or more point clouds
//! and optional deliberate defects. Building it lays out the 48 byte header,
//! the XML section and the aligned binary section with consistent offsets,
//! unless a defect explicitly asks for an inconsistency.
//!
//! ```no_run
//! use e57_fixtures::{Fixture, Point, Scan};
//!
//! let points = vec![Point::new(1.0, 2.0, 3.0), Point::new(4.0, 5.0, 6.0)];
//! let mut fixture = Fixture::new("{file-guid}");
//! fixture.add_scan(Scan::new("{scan-guid}", points));
//! fixture.write_file("two_points.e57").unwrap();
//! ```

#![forbid(unsafe_code)]

mod codec;
mod container;
mod error;
mod fixture;
mod header;
mod inspect;
mod layout;
mod payload;
mod pointcloud;
mod record;
mod root;
mod xml;

pub mod suite;

pub use self::codec::Codec;
pub use self::container::{write_container, ContainerWriter, Truncated};
pub use self::error::{Error, Result, Stage};
pub use self::fixture::{Assembly, ContainerDefect, Fixture, Scan};
pub use self::header::{Header, PAGE_SIZE, SIGNATURE};
pub use self::inspect::{inspect, DeclaredRecord, Inspection};
pub use self::layout::{align_up, plan, Alignment, LayoutPlan};
pub use self::payload::{encode_points, random_points, Point, PointBounds, POINT_SIZE};
pub use self::pointcloud::{PointRecord, RecordDefect};
pub use self::record::{Record, RecordDataType, RecordName};
pub use self::root::Root;
pub use self::xml::{compose, XmlDocument};
