pub mod mesh;
pub mod object3d;
pub mod properties;
pub mod scene;
pub mod transform;

#[cfg(test)]
pub mod test_document;

// Re-export main types for convenience
pub use mesh::{Mesh, MeshId};
pub use object3d::Object3D;
pub use scene::Scene;
