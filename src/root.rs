use crate::xml;

/// Default E57 namespace of the root element.
pub const E57_NAMESPACE: &str = "http://www.astm.org/COMMIT/E57/2010-e57-v1.0";

/// E57 XML Root structure with information shared by all elements in the file.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Root {
    pub format: String,
    pub guid: Option<String>,
    pub major_version: u32,
    pub minor_version: u32,
    pub library_version: Option<String>,
    pub coordinate_metadata: Option<String>,
}

impl Root {
    /// Root with the default format name and version and the given GUID.
    pub fn new(guid: &str) -> Self {
        Self {
            guid: Some(guid.to_owned()),
            ..Default::default()
        }
    }

    /// Opening part of the XML document up to the point cloud vector.
    pub(crate) fn xml_start(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml += &format!("<e57Root type=\"Structure\" xmlns=\"{E57_NAMESPACE}\">\n");
        xml += &xml::gen_string("formatName", &self.format);
        if let Some(guid) = &self.guid {
            xml += &xml::gen_string("guid", guid);
        }
        xml += &xml::gen_int("versionMajor", self.major_version);
        xml += &xml::gen_int("versionMinor", self.minor_version);
        if let Some(lib) = &self.library_version {
            xml += &xml::gen_string("e57LibraryVersion", lib);
        }
        if let Some(cm) = &self.coordinate_metadata {
            xml += &xml::gen_string("coordinateMetadata", cm);
        }
        xml += "<data3D type=\"Vector\" allowHeterogeneousChildren=\"1\">\n";
        xml
    }

    pub(crate) fn xml_end(&self) -> String {
        String::from("</data3D>\n</e57Root>\n")
    }
}

impl Default for Root {
    fn default() -> Self {
        Self {
            format: String::from("ASTM E57 3D Imaging Data File"),
            guid: None,
            major_version: 1,
            minor_version: 0,
            library_version: Some(format!(
                "{} {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            )),
            coordinate_metadata: None,
        }
    }
}
