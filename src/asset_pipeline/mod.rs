pub mod center_of_gravity;
pub mod config;
pub mod reset_transform;

use std::collections::HashMap;

use anyhow::Context;
use glam::DVec3;

use crate::scene_graph::{MeshId, Scene};

pub use center_of_gravity::recenter_mesh;
pub use config::{RecenterConfig, TraversalScope};
pub use reset_transform::reset_transform;

#[derive(Debug, Clone, PartialEq)]
pub struct RecenteredNode {
    pub node_name: String,
    pub mesh_name: String,
    pub vertex_count: usize,
    pub center: DVec3,
    /// The geometry was already centered through another node that shares it.
    pub shared: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RecenterReport {
    pub nodes: Vec<RecenteredNode>,
}

/// Centers every mesh attached to a visited node on its center of gravity and resets the
/// node's local transform. Nodes without a mesh are left alone.
pub fn recenter_scene(scene: &mut Scene, config: &RecenterConfig) -> anyhow::Result<RecenterReport> {
    let targets = match config.scope {
        TraversalScope::DirectChildren => scene.children(scene.root()).to_vec(),
        TraversalScope::Recursive => scene.descendants(scene.root()),
    };

    let mut report = RecenterReport::default();
    let mut centered: HashMap<MeshId, DVec3> = HashMap::new();

    for object_id in targets {
        let Some(object) = scene.get_object(object_id) else {
            continue;
        };

        let Some(mesh_id) = object.mesh_id() else {
            log::debug!("Skipping {} ({}), not a mesh", object.name, object.class);
            continue;
        };

        let node_name = object.name.clone();
        let shared = centered.contains_key(&mesh_id);

        let center = match centered.get(&mesh_id) {
            Some(&center) => center,
            None => {
                let mesh = scene
                    .get_mesh_mut(mesh_id)
                    .with_context(|| format!("Mesh of {} is missing", node_name))?;
                let center = recenter_mesh(mesh)
                    .with_context(|| format!("Failed to center node {}", node_name))?;
                centered.insert(mesh_id, center);
                center
            }
        };

        if let Some(object) = scene.get_object_mut(object_id) {
            reset_transform(object);
        }

        let mesh = scene
            .get_mesh(mesh_id)
            .with_context(|| format!("Mesh of {} is missing", node_name))?;

        log::info!(
            "Centered {} ({} control points) by subtracting ({:.6}, {:.6}, {:.6}){}",
            node_name,
            mesh.control_points_count(),
            center.x,
            center.y,
            center.z,
            if shared { ", geometry shared" } else { "" }
        );

        report.nodes.push(RecenteredNode {
            node_name,
            mesh_name: mesh.name.clone(),
            vertex_count: mesh.control_points_count(),
            center,
            shared,
        });
    }

    if report.nodes.is_empty() {
        log::warn!("No mesh nodes found to center");
    }

    Ok(report)
}
