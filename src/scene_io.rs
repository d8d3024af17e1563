use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use tempfile::NamedTempFile;

use crate::fbx;
use crate::scene_graph::Scene;

pub fn load_scene(path: &Path) -> anyhow::Result<Scene> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let document = fbx::decode_document(&data)
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    log::debug!(
        "Loaded {} ({} bytes, FBX {})",
        path.display(),
        data.len(),
        document.version
    );

    Scene::from_document(document)
        .with_context(|| format!("Failed to build scene from {}", path.display()))
}

/// Encodes the scene and writes it to `path`. The bytes go to a temporary file next to the
/// target first, so a failed export never leaves a partial file behind.
pub fn save_scene(scene: Scene, path: &Path) -> anyhow::Result<()> {
    let document = scene.into_document()?;
    let bytes = fbx::encode_document(&document)
        .with_context(|| format!("Failed to encode {}", path.display()))?;

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // Removed on drop unless persisted.
    let mut staging = NamedTempFile::new_in(directory)
        .with_context(|| format!("Failed to create a temporary file in {}", directory.display()))?;

    staging
        .write_all(&bytes)
        .and_then(|()| staging.as_file().sync_all())
        .with_context(|| format!("Failed to write {}", staging.path().display()))?;

    staging
        .persist(path)
        .with_context(|| format!("Failed to move output into place at {}", path.display()))?;

    log::debug!("Wrote {} ({} bytes)", path.display(), bytes.len());

    Ok(())
}
