use glam::{Mat4, Vec3};
use log::{debug, info};

use super::model::{Geometry, LoadedModel, Material, MeshNode, ResourceTracker};
use crate::api::download::decode_base64;
use crate::error::{Error, Result};

/// Decodes a base64 model payload into raw bytes.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    decode_base64(payload)
}

/// Parses a binary glTF (or self-contained JSON glTF) into a model.
///
/// Node transforms are baked into the vertex positions so the result is a
/// flat list of meshes in model space. Files referencing external buffers or
/// containing no triangles are rejected.
pub fn parse_glb(bytes: &[u8], tracker: &ResourceTracker) -> Result<LoadedModel> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).map_err(|e| Error::Load(e.to_string()))?;

    debug!(
        "glTF parsed: {} scenes, {} nodes, {} meshes",
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count()
    );

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| Error::Load("glTF contains no scene".to_string()))?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        process_node(&node, &buffers, &Mat4::IDENTITY, tracker, &mut meshes)?;
    }

    let model = LoadedModel::new(meshes);
    if model.triangle_count() == 0 {
        return Err(Error::Load("model contains no triangle geometry".to_string()));
    }

    info!(
        "Loaded model: {} meshes, {} triangles",
        model.meshes().len(),
        model.triangle_count()
    );
    Ok(model)
}

fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    tracker: &ResourceTracker,
    meshes: &mut Vec<MeshNode>,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, &global_transform, tracker, meshes)?;
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, tracker, meshes)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    tracker: &ResourceTracker,
    meshes: &mut Vec<MeshNode>,
) -> Result<()> {
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            debug!("Skipping {:?} primitive in mesh {:?}", primitive.mode(), mesh.name());
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

        let positions: Vec<Vec3> = match reader.read_positions() {
            Some(positions) => positions
                .map(|p| transform.transform_point3(Vec3::from_array(p)))
                .collect(),
            None => continue,
        };

        if positions.is_empty() {
            continue;
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let base_color = primitive
            .material()
            .pbr_metallic_roughness()
            .base_color_factor();

        meshes.push(MeshNode {
            name: mesh.name().map(str::to_string),
            geometry: Geometry::new(tracker, positions, indices),
            material: Material::new(tracker, base_color),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_malformed_payload() {
        assert!(matches!(decode_payload("@@not-base64@@"), Err(Error::Decode(_))));
    }

    #[test]
    fn garbage_bytes_are_a_load_error() {
        let tracker = ResourceTracker::new();
        let result = parse_glb(b"definitely not a gltf file", &tracker);
        assert!(matches!(result, Err(Error::Load(_))));
        assert_eq!(tracker.live_geometries(), 0);
    }

    #[test]
    fn document_without_geometry_is_rejected() {
        let tracker = ResourceTracker::new();
        let json = br#"{"asset": {"version": "2.0"}, "scenes": [{"nodes": []}], "scene": 0}"#;
        let result = parse_glb(json, &tracker);
        assert!(matches!(result, Err(Error::Load(_))));
    }
}
