/// Footer id written by most FBX exporters. Used when a document was not decoded from a file.
pub const DEFAULT_FOOTER_ID: [u8; 16] = [
    0xfa, 0xbc, 0xab, 0x09, 0xd0, 0xc8, 0xd4, 0x66, 0xb1, 0x76, 0xfb, 0x83, 0x1c, 0xf7, 0x26, 0x7e,
];

/// A single value of a node record's property list.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    I16(i16),
    Bool(bool),
    I32(i32),
    F32(f32),
    F64(f64),
    I64(i64),
    F32Array(Vec<f32>),
    F64Array(Vec<f64>),
    I64Array(Vec<i64>),
    I32Array(Vec<i32>),
    BoolArray(Vec<bool>),
    // Kept as bytes: object names embed "\0\x01" separators.
    String(Vec<u8>),
    Raw(Vec<u8>),
}

impl Property {
    pub fn string(value: impl AsRef<str>) -> Self {
        Property::String(value.as_ref().as_bytes().to_vec())
    }

    pub fn type_code(&self) -> u8 {
        match self {
            Property::I16(_) => b'Y',
            Property::Bool(_) => b'C',
            Property::I32(_) => b'I',
            Property::F32(_) => b'F',
            Property::F64(_) => b'D',
            Property::I64(_) => b'L',
            Property::F32Array(_) => b'f',
            Property::F64Array(_) => b'd',
            Property::I64Array(_) => b'l',
            Property::I32Array(_) => b'i',
            Property::BoolArray(_) => b'b',
            Property::String(_) => b'S',
            Property::Raw(_) => b'R',
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Property::I64(value) => Some(value),
            Property::I32(value) => Some(value.into()),
            Property::I16(value) => Some(value.into()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Property::F64(value) => Some(value),
            Property::F32(value) => Some(value.into()),
            Property::I32(value) => Some(value.into()),
            Property::I16(value) => Some(value.into()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Property::String(bytes) | Property::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Property::String(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FbxNode {
    pub name: String,
    pub properties: Vec<Property>,
    pub children: Vec<FbxNode>,
    /// The source file closed this childless node with a null record anyway. Some exporters
    /// do this for records such as `AnimationLayer`, and the writer reproduces it.
    pub explicit_null_record: bool,
}

impl FbxNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_properties(name: impl Into<String>, properties: Vec<Property>) -> Self {
        Self {
            name: name.into(),
            properties,
            ..Default::default()
        }
    }

    pub fn child(&self, name: &str) -> Option<&FbxNode> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FbxNode> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// A decoded binary FBX file: the top-level node list plus what the footer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct FbxDocument {
    pub version: u32,
    pub nodes: Vec<FbxNode>,
    pub footer_id: [u8; 16],
}

impl FbxDocument {
    #[allow(dead_code)]
    pub fn new(version: u32) -> Self {
        Self {
            version,
            nodes: Vec::new(),
            footer_id: DEFAULT_FOOTER_ID,
        }
    }

    pub fn node(&self, name: &str) -> Option<&FbxNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut FbxNode> {
        self.nodes.iter_mut().find(|node| node.name == name)
    }
}

/// From 7.5 on, record headers use 64-bit fields.
pub(crate) fn uses_wide_records(version: u32) -> bool {
    version >= 7500
}
