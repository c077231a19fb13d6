use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use log::debug;

use crate::math::AABB;

#[derive(Debug, Default)]
struct Counters {
    geometries: AtomicUsize,
    materials: AtomicUsize,
}

/// Counts live geometry and material buffers.
///
/// Every [`Geometry`] and [`Material`] holds a [`BufferHandle`] allocated
/// here; the count drops when the owning model is disposed.
#[derive(Debug, Clone, Default)]
pub struct ResourceTracker {
    counters: Arc<Counters>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_geometries(&self) -> usize {
        self.counters.geometries.load(Ordering::SeqCst)
    }

    pub fn live_materials(&self) -> usize {
        self.counters.materials.load(Ordering::SeqCst)
    }

    fn allocate(&self, kind: BufferKind) -> BufferHandle {
        kind.counter(&self.counters).fetch_add(1, Ordering::SeqCst);
        BufferHandle {
            counters: Arc::clone(&self.counters),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum BufferKind {
    Geometry,
    Material,
}

impl BufferKind {
    fn counter(self, counters: &Counters) -> &AtomicUsize {
        match self {
            BufferKind::Geometry => &counters.geometries,
            BufferKind::Material => &counters.materials,
        }
    }
}

/// Released when dropped.
#[derive(Debug)]
struct BufferHandle {
    counters: Arc<Counters>,
    kind: BufferKind,
}

impl Drop for BufferHandle {
    fn drop(&mut self) {
        self.kind.counter(&self.counters).fetch_sub(1, Ordering::SeqCst);
    }
}

/// Triangle list in model space.
#[derive(Debug)]
pub struct Geometry {
    positions: Vec<Vec3>,
    indices: Vec<u32>,
    _buffer: BufferHandle,
}

impl Geometry {
    /// `indices` must reference `positions`; a trailing partial triangle is ignored.
    pub fn new(tracker: &ResourceTracker, positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            _buffer: tracker.allocate(BufferKind::Geometry),
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            Some([
                *self.positions.get(tri[0] as usize)?,
                *self.positions.get(tri[1] as usize)?,
                *self.positions.get(tri[2] as usize)?,
            ])
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Debug)]
pub struct Material {
    pub base_color: [f32; 4],
    pub wireframe: bool,
    pub double_sided: bool,
    _buffer: BufferHandle,
}

impl Material {
    pub fn new(tracker: &ResourceTracker, base_color: [f32; 4]) -> Self {
        Self {
            base_color,
            wireframe: false,
            double_sided: false,
            _buffer: tracker.allocate(BufferKind::Material),
        }
    }
}

#[derive(Debug)]
pub struct MeshNode {
    pub name: Option<String>,
    pub geometry: Geometry,
    pub material: Material,
}

/// Placement of the whole model: `translation + rotation * (scale * (p + offset))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    pub offset: Vec3,
    pub scale: f32,
    pub rotation_y: f32,
    pub translation: Vec3,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            scale: 1.0,
            rotation_y: 0.0,
            translation: Vec3::ZERO,
        }
    }
}

impl ModelTransform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
            * Mat4::from_quat(Quat::from_rotation_y(self.rotation_y))
            * Mat4::from_scale(Vec3::splat(self.scale))
            * Mat4::from_translation(self.offset)
    }
}

/// The decoded scene graph of one generated model.
#[derive(Debug)]
pub struct LoadedModel {
    meshes: Vec<MeshNode>,
    pub transform: ModelTransform,
}

impl LoadedModel {
    pub fn new(meshes: Vec<MeshNode>) -> Self {
        Self {
            meshes,
            transform: ModelTransform::default(),
        }
    }

    pub fn meshes(&self) -> &[MeshNode] {
        &self.meshes
    }

    pub fn meshes_mut(&mut self) -> &mut [MeshNode] {
        &mut self.meshes
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.geometry.triangle_count()).sum()
    }

    /// Bounds in model space, before the model transform.
    pub fn local_bounds(&self) -> AABB {
        AABB::from_points(
            self.meshes
                .iter()
                .flat_map(|m| m.geometry.positions().iter().copied()),
        )
    }

    /// Bounds after the model transform.
    pub fn world_bounds(&self) -> AABB {
        let matrix = self.transform.matrix();
        AABB::from_points(
            self.meshes
                .iter()
                .flat_map(|m| m.geometry.positions().iter())
                .map(|&p| matrix.transform_point3(p)),
        )
    }

    pub fn set_wireframe(&mut self, wireframe: bool) {
        for mesh in &mut self.meshes {
            mesh.material.wireframe = wireframe;
        }
    }

    /// Releases every geometry and material buffer.
    pub fn dispose(self) {
        debug!(
            "Disposing model: {} meshes, {} triangles",
            self.meshes.len(),
            self.triangle_count()
        );
        drop(self);
    }
}
