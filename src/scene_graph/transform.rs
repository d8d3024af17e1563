use glam::DVec3;

/// Local transform of a node as FBX stores it: translation, Euler rotation in degrees and
/// per-axis scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    translation: DVec3,
    rotation: DVec3,
    scale: DVec3,

    dirty: bool,
}

impl Transform {
    pub fn new(translation: DVec3, rotation: DVec3, scale: DVec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
            dirty: false,
        }
    }

    pub fn identity() -> Self {
        Self::new(DVec3::ZERO, DVec3::ZERO, DVec3::ONE)
    }

    pub fn set_transform(&mut self, translation: DVec3, rotation: DVec3, scale: DVec3) {
        self.translation = translation;
        self.rotation = rotation;
        self.scale = scale;
        self.dirty = true;
    }

    pub fn translation(&self) -> DVec3 {
        self.translation
    }

    pub fn rotation(&self) -> DVec3 {
        self.rotation
    }

    pub fn scale(&self) -> DVec3 {
        self.scale
    }

    /// Whether the transform was written since it was loaded.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
