use std::collections::{HashMap, HashSet};

use anyhow::Context;
use glam::DVec3;
use id_arena::Arena;

use crate::fbx::{FbxDocument, FbxNode, Property};
use crate::scene_graph::mesh::{ControlPointPrecision, Mesh, MeshId};
use crate::scene_graph::object3d::{NodeAttribute, Object3D, ObjectId};
use crate::scene_graph::properties::{
    self, child_or_insert, LCL_ROTATION, LCL_SCALING, LCL_TRANSLATION,
};
use crate::scene_graph::transform::Transform;

/// Object id the scene root has in `Connections`.
pub const ROOT_FBX_ID: i64 = 0;

/// Scene object model over a decoded FBX document.
///
/// The scene owns the document from load until export. Nodes and meshes are handed out as
/// arena ids and borrows, so nothing can outlive the scene itself.
pub struct Scene {
    document: FbxDocument,
    pub objects: Arena<Object3D>,
    pub meshes: Arena<Mesh>,
    root: ObjectId,
}

impl Scene {
    pub fn from_document(document: FbxDocument) -> anyhow::Result<Self> {
        let mut objects = Arena::new();
        let mut meshes = Arena::new();

        let root = objects.alloc(Object3D {
            name: "RootNode".to_string(),
            fbx_id: ROOT_FBX_ID,
            ..Default::default()
        });

        let mut models: HashMap<i64, ObjectId> = HashMap::from([(ROOT_FBX_ID, root)]);
        let mut attributes: HashMap<i64, NodeAttribute> = HashMap::new();

        match document.node("Objects") {
            Some(objects_node) => {
                for node in &objects_node.children {
                    let Some(fbx_id) = node.properties.first().and_then(Property::as_i64) else {
                        log::warn!("Skipping {} record without an object id", node.name);
                        continue;
                    };
                    let name = object_name(node);
                    let class = node
                        .properties
                        .get(2)
                        .and_then(Property::as_str)
                        .unwrap_or_default()
                        .to_string();

                    match node.name.as_str() {
                        "Model" => {
                            let object_id = objects.alloc(Object3D {
                                name,
                                fbx_id,
                                class,
                                transform: read_transform(node),
                                ..Default::default()
                            });
                            models.insert(fbx_id, object_id);
                        }
                        "Geometry" if class == "Mesh" => {
                            let vertices = node.child("Vertices").and_then(|v| v.properties.first());
                            let mesh = match vertices {
                                Some(vertices) => Mesh::from_vertices_property(&name, fbx_id, vertices)
                                    .with_context(|| format!("Failed to read geometry {}", name))?,
                                None => {
                                    Mesh::new(name, fbx_id, Vec::new(), ControlPointPrecision::F64)
                                }
                            };
                            attributes.insert(fbx_id, NodeAttribute::Mesh(meshes.alloc(mesh)));
                        }
                        "Geometry" | "NodeAttribute" => {
                            attributes.insert(fbx_id, NodeAttribute::Other { class });
                        }
                        _ => {}
                    }
                }
            }
            None => log::warn!("Document has no Objects section"),
        }

        let mut links = Vec::new();

        for connection in document
            .node("Connections")
            .into_iter()
            .flat_map(|connections| connections.children_named("C"))
        {
            let properties = &connection.properties;
            if properties.first().and_then(Property::as_str) != Some("OO") {
                continue;
            }

            let (Some(child), Some(parent)) = (
                properties.get(1).and_then(Property::as_i64),
                properties.get(2).and_then(Property::as_i64),
            ) else {
                continue;
            };

            let Some(&parent_id) = models.get(&parent) else {
                continue;
            };

            if let Some(&child_id) = models.get(&child) {
                links.push((child_id, parent_id));
            } else if let Some(attribute) = attributes.get(&child) {
                let parent_object = &mut objects[parent_id];
                // A node exposes its first attribute only.
                if parent_id != root && parent_object.attribute.is_none() {
                    parent_object.attribute = Some(attribute.clone());
                }
            }
        }

        let mut scene = Self {
            document,
            objects,
            meshes,
            root,
        };

        for (child_id, parent_id) in links {
            if child_id == parent_id || scene.descendants(child_id).contains(&parent_id) {
                log::warn!(
                    "Ignoring connection that would make {} its own ancestor",
                    scene.objects[child_id].name
                );
                continue;
            }

            scene.set_object_parent(child_id, Some(parent_id));
        }

        log::debug!(
            "Scene has {} nodes and {} meshes",
            scene.objects.len() - 1,
            scene.meshes.len()
        );

        Ok(scene)
    }

    pub fn version(&self) -> u32 {
        self.document.version
    }

    pub fn root(&self) -> ObjectId {
        self.root
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut Object3D> {
        self.objects.get_mut(id)
    }

    #[allow(dead_code)]
    pub fn get_object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    pub fn get_mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id)
    }

    pub fn get_mesh_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(id)
    }

    /// Direct children of a node, in connection order.
    pub fn children(&self, id: ObjectId) -> &[ObjectId] {
        self.objects
            .get(id)
            .map(|object| object.child_ids.as_slice())
            .unwrap_or_default()
    }

    /// Every node below `id` in depth-first pre-order, excluding `id` itself.
    pub fn descendants(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut visited = HashSet::from([id]);
        let mut result = Vec::new();
        let mut stack: Vec<ObjectId> = self.children(id).iter().rev().copied().collect();

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }

            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }

        result
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        if let Some(child) = self.objects.get(child_id) {
            if let Some(old_parent_id) = child.parent_id {
                if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                    old_parent.child_ids.retain(|&id| id != child_id);
                }
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;

            if let Some(new_parent_id) = new_parent_id {
                if let Some(new_parent) = self.objects.get_mut(new_parent_id) {
                    new_parent.child_ids.push(child_id);
                }
            }
        }
    }

    /// Writes modified meshes and transforms back into the document and returns it.
    /// Records of untouched objects are left exactly as they were decoded.
    pub fn into_document(self) -> anyhow::Result<FbxDocument> {
        let Scene {
            mut document,
            objects,
            meshes,
            root,
        } = self;

        let dirty_meshes: Vec<&Mesh> = meshes
            .iter()
            .map(|(_, mesh)| mesh)
            .filter(|mesh| mesh.is_dirty())
            .collect();
        let dirty_objects: Vec<&Object3D> = objects
            .iter()
            .filter(|(id, object)| *id != root && object.transform.is_dirty())
            .map(|(_, object)| object)
            .collect();

        if dirty_meshes.is_empty() && dirty_objects.is_empty() {
            return Ok(document);
        }

        let objects_node = document
            .node_mut("Objects")
            .context("Document has no Objects section")?;

        for mesh in dirty_meshes {
            let geometry = find_object_mut(objects_node, "Geometry", mesh.fbx_id)
                .with_context(|| format!("Geometry {} ({}) vanished", mesh.name, mesh.fbx_id))?;
            child_or_insert(geometry, "Vertices").properties = vec![mesh.to_vertices_property()];
        }

        for object in dirty_objects {
            let model = find_object_mut(objects_node, "Model", object.fbx_id)
                .with_context(|| format!("Model {} ({}) vanished", object.name, object.fbx_id))?;
            let transform = &object.transform;

            properties::write_vector(model, LCL_TRANSLATION, transform.translation());
            properties::write_vector(model, LCL_ROTATION, transform.rotation());
            properties::write_vector(model, LCL_SCALING, transform.scale());
        }

        Ok(document)
    }
}

/// Object names are stored as `"Name\0\x01Class"`.
fn object_name(node: &FbxNode) -> String {
    let bytes = node
        .properties
        .get(1)
        .and_then(Property::as_bytes)
        .unwrap_or_default();
    let name = bytes
        .windows(2)
        .position(|window| window == b"\x00\x01")
        .map_or(bytes, |end| &bytes[..end]);

    String::from_utf8_lossy(name).into_owned()
}

fn read_transform(model: &FbxNode) -> Transform {
    let vector = |name: &str, default: DVec3| properties::read_vector(model, name).unwrap_or(default);

    Transform::new(
        vector(LCL_TRANSLATION, DVec3::ZERO),
        vector(LCL_ROTATION, DVec3::ZERO),
        vector(LCL_SCALING, DVec3::ONE),
    )
}

fn find_object_mut<'a>(objects: &'a mut FbxNode, kind: &str, fbx_id: i64) -> Option<&'a mut FbxNode> {
    objects.children.iter_mut().find(|node| {
        node.name == kind && node.properties.first().and_then(Property::as_i64) == Some(fbx_id)
    })
}
