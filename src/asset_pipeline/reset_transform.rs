use glam::DVec3;

use crate::scene_graph::Object3D;

/// Zeroes translation and rotation and sets unit scale. Always marks the transform as written,
/// so the export states the identity explicitly.
pub fn reset_transform(object: &mut Object3D) {
    object
        .transform
        .set_transform(DVec3::ZERO, DVec3::ZERO, DVec3::ONE);
}
