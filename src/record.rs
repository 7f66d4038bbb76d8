/// Name of a prototype field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordName {
    /// Cartesian X coordinate (in meters).
    CartesianX,
    /// Cartesian Y coordinate (in meters).
    CartesianY,
    /// Cartesian Z coordinate (in meters).
    CartesianZ,
    /// Indicates whether the Cartesian coordinate or its magnitude is meaningful.
    CartesianInvalidState,
}

impl RecordName {
    /// XML tag name used inside prototype structures.
    pub fn tag_name(&self) -> &'static str {
        match self {
            RecordName::CartesianX => "cartesianX",
            RecordName::CartesianY => "cartesianY",
            RecordName::CartesianZ => "cartesianZ",
            RecordName::CartesianInvalidState => "cartesianInvalidState",
        }
    }
}

/// Semantic type of a prototype field with optional bounds.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordDataType {
    /// 32 bit IEEE float.
    Single { min: Option<f64>, max: Option<f64> },
    /// 64 bit IEEE float.
    Double { min: Option<f64>, max: Option<f64> },
    /// Signed integer.
    Integer { min: Option<i64>, max: Option<i64> },
    /// Text value.
    String,
}

impl RecordDataType {
    /// Value of the type attribute in XML.
    pub fn type_name(&self) -> &'static str {
        match self {
            RecordDataType::Single { .. } | RecordDataType::Double { .. } => "Float",
            RecordDataType::Integer { .. } => "Integer",
            RecordDataType::String => "String",
        }
    }

    fn attributes(&self, with_bounds: bool) -> String {
        let mut attrs = format!("type=\"{}\"", self.type_name());
        match self {
            RecordDataType::Single { min, max } | RecordDataType::Double { min, max } => {
                let precision = if matches!(self, RecordDataType::Single { .. }) {
                    "single"
                } else {
                    "double"
                };
                attrs += &format!(" precision=\"{precision}\"");
                if with_bounds {
                    if let Some(min) = min {
                        attrs += &format!(" minimum=\"{min}\"");
                    }
                    if let Some(max) = max {
                        attrs += &format!(" maximum=\"{max}\"");
                    }
                }
            }
            RecordDataType::Integer { min, max } => {
                if with_bounds {
                    if let Some(min) = min {
                        attrs += &format!(" minimum=\"{min}\"");
                    }
                    if let Some(max) = max {
                        attrs += &format!(" maximum=\"{max}\"");
                    }
                }
            }
            RecordDataType::String => {}
        }
        attrs
    }
}

/// Describes a single field of a point cloud prototype.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub name: RecordName,
    pub data_type: RecordDataType,
}

impl Record {
    pub const CARTESIAN_X_F32: Record = Record {
        name: RecordName::CartesianX,
        data_type: RecordDataType::Single {
            min: None,
            max: None,
        },
    };
    pub const CARTESIAN_Y_F32: Record = Record {
        name: RecordName::CartesianY,
        data_type: RecordDataType::Single {
            min: None,
            max: None,
        },
    };
    pub const CARTESIAN_Z_F32: Record = Record {
        name: RecordName::CartesianZ,
        data_type: RecordDataType::Single {
            min: None,
            max: None,
        },
    };
    pub const CARTESIAN_X_F64: Record = Record {
        name: RecordName::CartesianX,
        data_type: RecordDataType::Double {
            min: None,
            max: None,
        },
    };
    pub const CARTESIAN_Y_F64: Record = Record {
        name: RecordName::CartesianY,
        data_type: RecordDataType::Double {
            min: None,
            max: None,
        },
    };
    pub const CARTESIAN_Z_F64: Record = Record {
        name: RecordName::CartesianZ,
        data_type: RecordDataType::Double {
            min: None,
            max: None,
        },
    };

    /// Single precision XYZ prototype matching the encoded payload of this crate.
    pub fn xyz_single() -> Vec<Record> {
        vec![
            Self::CARTESIAN_X_F32,
            Self::CARTESIAN_Y_F32,
            Self::CARTESIAN_Z_F32,
        ]
    }

    /// Single precision XYZ prototype where all three axes share the same bounds.
    pub fn xyz_single_bounded(min: f64, max: f64) -> Vec<Record> {
        let data_type = RecordDataType::Single {
            min: Some(min),
            max: Some(max),
        };
        [
            RecordName::CartesianX,
            RecordName::CartesianY,
            RecordName::CartesianZ,
        ]
        .into_iter()
        .map(|name| Record {
            name,
            data_type: data_type.clone(),
        })
        .collect()
    }

    /// Prototype entry including bounds.
    pub(crate) fn xml_string(&self) -> String {
        let tag = self.name.tag_name();
        format!("<{tag} {}/>\n", self.data_type.attributes(true))
    }

    /// Restates only name and type, as done by codec entries.
    pub(crate) fn type_xml_string(&self) -> String {
        let tag = self.name.tag_name();
        format!("<{tag} {}/>\n", self.data_type.attributes(false))
    }
}
