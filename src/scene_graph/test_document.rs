//! Builds small but structurally faithful FBX documents for tests.

use glam::DVec3;

use crate::fbx::{FbxDocument, FbxNode, Property};
use crate::scene_graph::properties::{vector_record, LCL_TRANSLATION};

pub struct DocumentBuilder {
    version: u32,
    objects: Vec<FbxNode>,
    connections: Vec<FbxNode>,
}

impl DocumentBuilder {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            objects: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn model(mut self, id: i64, name: &str, class: &str, translation: Option<DVec3>) -> Self {
        let mut properties70 = FbxNode::new("Properties70");
        properties70.children.push(FbxNode::with_properties(
            "P",
            vec![
                Property::string("DefaultAttributeIndex"),
                Property::string("int"),
                Property::string("Integer"),
                Property::string(""),
                Property::I32(0),
            ],
        ));
        if let Some(translation) = translation {
            properties70
                .children
                .push(vector_record(LCL_TRANSLATION, translation));
        }

        let mut model = FbxNode::with_properties(
            "Model",
            vec![
                Property::I64(id),
                Property::string(format!("{}\x00\x01Model", name)),
                Property::string(class),
            ],
        );
        model
            .children
            .push(FbxNode::with_properties("Version", vec![Property::I32(232)]));
        model.children.push(properties70);
        model.children.push(FbxNode::with_properties(
            "Shading",
            vec![Property::Bool(true)],
        ));

        self.objects.push(model);
        self
    }

    pub fn mesh_geometry(mut self, id: i64, name: &str, points: &[[f64; 3]]) -> Self {
        let mut geometry = FbxNode::with_properties(
            "Geometry",
            vec![
                Property::I64(id),
                Property::string(format!("{}\x00\x01Geometry", name)),
                Property::string("Mesh"),
            ],
        );
        geometry.children.push(FbxNode::with_properties(
            "Vertices",
            vec![Property::F64Array(points.iter().flatten().copied().collect())],
        ));

        let indices = (0..points.len() as i32)
            .map(|i| if i + 1 == points.len() as i32 { -i - 1 } else { i })
            .collect();
        geometry.children.push(FbxNode::with_properties(
            "PolygonVertexIndex",
            vec![Property::I32Array(indices)],
        ));

        self.objects.push(geometry);
        self
    }

    pub fn node_attribute(mut self, id: i64, class: &str) -> Self {
        self.objects.push(FbxNode::with_properties(
            "NodeAttribute",
            vec![
                Property::I64(id),
                Property::string("\x00\x01NodeAttribute"),
                Property::string(class),
            ],
        ));
        self
    }

    pub fn connect(mut self, child: i64, parent: i64) -> Self {
        self.connections.push(FbxNode::with_properties(
            "C",
            vec![Property::string("OO"), Property::I64(child), Property::I64(parent)],
        ));
        self
    }

    pub fn build(self) -> FbxDocument {
        let mut header = FbxNode::new("FBXHeaderExtension");
        header.children.push(FbxNode::with_properties(
            "FBXHeaderVersion",
            vec![Property::I32(1003)],
        ));
        header.children.push(FbxNode::with_properties(
            "FBXVersion",
            vec![Property::I32(self.version as i32)],
        ));

        let mut objects = FbxNode::new("Objects");
        objects.children = self.objects;

        let mut connections = FbxNode::new("Connections");
        connections.children = self.connections;

        let mut document = FbxDocument::new(self.version);
        document.nodes = vec![header, objects, connections];
        document
    }
}
