use id_arena::Id;

use crate::scene_graph::mesh::MeshId;
use crate::scene_graph::scene::Scene;
use crate::scene_graph::transform::Transform;

pub type ObjectId = Id<Object3D>;

/// What a node carries besides its transform.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeAttribute {
    Mesh(MeshId),
    /// Any non-mesh attribute: lights, cameras, skeleton limbs, NURBS and so on.
    Other { class: String },
}

pub struct Object3D {
    pub name: String,
    pub fbx_id: i64,
    pub class: String,
    pub transform: Transform,
    pub attribute: Option<NodeAttribute>,
    pub parent_id: Option<ObjectId>,
    pub child_ids: Vec<ObjectId>,
}

impl Object3D {
    pub fn mesh_id(&self) -> Option<MeshId> {
        match self.attribute {
            Some(NodeAttribute::Mesh(mesh_id)) => Some(mesh_id),
            _ => None,
        }
    }

    #[allow(dead_code)]
    pub fn parent<'a>(&self, scene: &'a Scene) -> Option<&'a Object3D> {
        self.parent_id.and_then(|id| scene.get_object(id))
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            name: String::new(),
            fbx_id: 0,
            class: String::new(),
            transform: Transform::identity(),
            attribute: None,
            parent_id: None,
            child_ids: Vec::new(),
        }
    }
}
