//! Viewer lifecycle: owns the render surface and the single displayed model.
//!
//! ```text
//! init ──► Ready ──load_model──► ModelLoaded
//!            ▲                       │
//!            └──────clear_model──────┘
//! ```
//!
//! `load_model` disposes the current model before decoding the replacement,
//! so two models never coexist. It borrows the viewer mutably across its
//! await point, which keeps the render loop (and any second load) out until
//! the new model is attached or the load has failed.
//!
//! Front ends that must keep drawing while a model decodes split the load:
//! [`ModelPreparer::prepare`] runs anywhere, and
//! [`Viewer::attach_prepared`] swaps the result in within a single call.

pub mod camera;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod raster;
pub mod scene;
pub mod state;
pub mod surface;

use log::{debug, info, warn};

use crate::error::{Error, Result};
use camera::OrbitCamera;
use model::{LoadedModel, ResourceTracker};
use normalize::{NormalizePolicy, Normalization};
use raster::FrameBuffer;
use scene::Scene;
use state::{rotate_speed_for_level, ViewerState};
use surface::{RenderSurface, SurfaceSize};

pub use normalize::VerticalAlign;
pub use surface::OffscreenSurface;

pub struct Viewer<S: RenderSurface> {
    surface: S,
    scene: Scene,
    camera: OrbitCamera,
    frame: FrameBuffer,
    state: ViewerState,
    policy: NormalizePolicy,
    resources: ResourceTracker,
    frames_rendered: u64,
}

impl<S: RenderSurface> Viewer<S> {
    /// Sets up camera, lights and grid on `surface`.
    ///
    /// Fails with [`Error::Init`] when there is no surface, its container is
    /// gone, or the drawing context cannot be configured.
    pub fn init(surface: Option<S>) -> Result<Self> {
        Self::init_with(surface, NormalizePolicy::default())
    }

    pub fn init_with(surface: Option<S>, policy: NormalizePolicy) -> Result<Self> {
        let mut surface = surface.ok_or_else(|| Error::Init("no rendering surface".to_string()))?;
        let size = surface
            .container_size()
            .ok_or_else(|| Error::Init("rendering surface has no container".to_string()))?;
        if size.is_empty() {
            return Err(Error::Init(format!(
                "rendering surface container is {}x{}",
                size.width, size.height
            )));
        }

        surface.configure(size).map_err(|e| match e {
            Error::Init(msg) => Error::Init(msg),
            other => Error::Init(other.to_string()),
        })?;

        info!("Viewer ready at {}x{}", size.width, size.height);
        Ok(Self {
            surface,
            scene: Scene::new(),
            camera: OrbitCamera::new(size.aspect()),
            frame: FrameBuffer::new(size.width, size.height),
            state: ViewerState::default(),
            policy,
            resources: ResourceTracker::new(),
            frames_rendered: 0,
        })
    }

    /// Replaces the displayed model with the base64 GLB `payload`.
    ///
    /// On failure the viewer is left without a model.
    pub async fn load_model(&mut self, payload: &str) -> Result<Normalization> {
        self.clear_model();
        let prepared = self.preparer().prepare(payload).await?;
        Ok(self.attach_prepared(prepared))
    }

    /// Handle for decoding models off the viewer, with this viewer's
    /// normalization policy and resource accounting.
    pub fn preparer(&self) -> ModelPreparer {
        ModelPreparer {
            policy: self.policy,
            resources: self.resources.clone(),
        }
    }

    /// Disposes the current model and attaches `prepared` in its place.
    pub fn attach_prepared(&mut self, prepared: PreparedModel) -> Normalization {
        let PreparedModel { mut model, normalization } = prepared;
        self.clear_model();

        model.set_wireframe(self.state.wireframe);
        self.scene.attach(model);
        self.state.model_loaded = true;
        self.camera.reset();
        normalization
    }

    /// Disposes the current model; a no-op when none is attached.
    pub fn clear_model(&mut self) {
        if let Some(model) = self.scene.detach() {
            model.dispose();
        }
        self.state.model_loaded = false;
    }

    pub fn toggle_wireframe(&mut self) -> bool {
        self.state.wireframe = !self.state.wireframe;
        if let Some(model) = self.scene.model_mut() {
            model.set_wireframe(self.state.wireframe);
        }
        self.state.wireframe
    }

    pub fn toggle_grid(&mut self) -> bool {
        self.state.grid_visible = !self.state.grid_visible;
        self.scene.grid_visible = self.state.grid_visible;
        self.state.grid_visible
    }

    pub fn toggle_auto_rotate(&mut self) -> bool {
        self.state.auto_rotate = !self.state.auto_rotate;
        self.state.auto_rotate
    }

    /// Level 1 (slowest) to 10 (fastest); out-of-range levels are clamped.
    pub fn set_rotate_speed(&mut self, level: u8) {
        self.state.rotate_speed = rotate_speed_for_level(level);
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
    }

    /// Re-reads the container size and resizes camera, frame and surface.
    pub fn on_resize(&mut self) -> Result<()> {
        let Some(size) = self.surface.container_size() else {
            warn!("Resize ignored: surface container is gone");
            return Ok(());
        };
        if size.is_empty() {
            return Ok(());
        }

        self.camera.set_aspect(size.aspect());
        self.frame.resize(size.width, size.height);
        self.surface.configure(size)
    }

    /// One iteration of the render loop: animate, draw, present.
    pub fn render_frame(&mut self) -> Result<()> {
        if self.state.auto_rotate {
            if let Some(model) = self.scene.model_mut() {
                model.transform.rotation_y += self.state.rotate_speed;
            }
        }
        self.camera.update();

        let (width, height) = self.frame.dimensions();
        if SurfaceSize::new(width, height).is_empty() {
            return Ok(());
        }

        raster::render_scene(&self.scene, &self.camera, &mut self.frame);
        self.surface.present(&self.frame)?;
        self.frames_rendered += 1;
        Ok(())
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn has_model(&self) -> bool {
        self.scene.has_model()
    }

    pub fn model(&self) -> Option<&LoadedModel> {
        self.scene.model()
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// For pointer-driven orbit and zoom.
    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn resources(&self) -> &ResourceTracker {
        &self.resources
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

/// Decodes, parses and normalizes models without touching a viewer.
#[derive(Debug, Clone)]
pub struct ModelPreparer {
    policy: NormalizePolicy,
    resources: ResourceTracker,
}

impl ModelPreparer {
    /// Builds a displayable model from the base64 GLB `payload`.
    ///
    /// Runs on the tokio blocking pool when a runtime is available.
    pub async fn prepare(&self, payload: &str) -> Result<PreparedModel> {
        let mut model = decode_and_parse(payload.to_owned(), self.resources.clone()).await?;

        for mesh in model.meshes_mut() {
            mesh.material.double_sided = true;
        }
        let normalization = self.policy.apply(&mut model);
        debug!(
            "Normalized model: size {:?}, scale {}",
            normalization.size, normalization.scale
        );

        Ok(PreparedModel { model, normalization })
    }
}

/// A decoded and normalized model waiting to be attached.
///
/// Dropping it releases its buffers.
#[derive(Debug)]
pub struct PreparedModel {
    model: LoadedModel,
    normalization: Normalization,
}

impl PreparedModel {
    pub fn model(&self) -> &LoadedModel {
        &self.model
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }
}

async fn decode_and_parse(payload: String, tracker: ResourceTracker) -> Result<LoadedModel> {
    let work = move || {
        let bytes = loader::decode_payload(&payload)?;
        loader::parse_glb(&bytes, &tracker)
    };

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle
            .spawn_blocking(work)
            .await
            .map_err(|e| Error::Load(format!("model loader task failed: {}", e)))?,
        Err(_) => work(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer() -> Viewer<OffscreenSurface> {
        Viewer::init(Some(OffscreenSurface::new(32, 24))).unwrap()
    }

    #[test]
    fn init_requires_surface_and_container() {
        assert!(matches!(
            Viewer::<OffscreenSurface>::init(None),
            Err(Error::Init(_))
        ));
        assert!(matches!(
            Viewer::init(Some(OffscreenSurface::detached())),
            Err(Error::Init(_))
        ));
        assert!(Viewer::init(Some(OffscreenSurface::new(10, 10))).is_ok());
    }

    #[test]
    fn init_rejects_collapsed_container() {
        assert!(matches!(
            Viewer::init(Some(OffscreenSurface::new(0, 0))),
            Err(Error::Init(_))
        ));
        assert!(matches!(
            Viewer::init(Some(OffscreenSurface::new(640, 0))),
            Err(Error::Init(_))
        ));
    }

    #[test]
    fn init_configures_surface() {
        let viewer = viewer();
        assert_eq!(
            viewer.surface().configured_size(),
            Some(SurfaceSize::new(32, 24))
        );
        assert_eq!(viewer.state(), ViewerState::default());
    }

    #[tokio::test]
    async fn malformed_payload_leaves_no_model() {
        let mut viewer = viewer();

        let err = viewer.load_model("not base64 at all!").await.unwrap_err();

        assert!(matches!(err, Error::Decode(_)));
        assert!(!viewer.has_model());
        assert!(!viewer.state().model_loaded);
        assert_eq!(viewer.resources().live_geometries(), 0);
    }

    #[tokio::test]
    async fn undecodable_model_is_a_load_error() {
        let mut viewer = viewer();

        // "hello world" is valid base64 but not a model.
        let err = viewer.load_model("aGVsbG8gd29ybGQ=").await.unwrap_err();

        assert!(matches!(err, Error::Load(_)));
        assert!(!viewer.has_model());
    }

    #[test]
    fn clear_without_model_is_noop() {
        let mut viewer = viewer();
        viewer.clear_model();
        viewer.clear_model();
        assert!(!viewer.has_model());
        assert_eq!(viewer.state(), ViewerState::default());
    }

    #[test]
    fn toggles_flip_and_return_state() {
        let mut viewer = viewer();
        assert!(viewer.toggle_wireframe());
        assert!(!viewer.toggle_wireframe());
        assert!(!viewer.toggle_grid());
        assert!(viewer.toggle_grid());
        assert!(viewer.toggle_auto_rotate());
        assert!(viewer.state().auto_rotate);
    }

    #[test]
    fn rotate_speed_follows_level() {
        let mut viewer = viewer();
        viewer.set_rotate_speed(1);
        let slow = viewer.state().rotate_speed;
        viewer.set_rotate_speed(10);
        let fast = viewer.state().rotate_speed;
        assert!(slow < fast);
    }

    #[test]
    fn resize_tracks_container() {
        let mut viewer = viewer();
        viewer.surface_mut().set_container_size(200, 100);

        viewer.on_resize().unwrap();

        assert_eq!(viewer.camera().aspect(), 2.0);
        assert_eq!(viewer.frame().dimensions(), (200, 100));
        assert_eq!(
            viewer.surface().configured_size(),
            Some(SurfaceSize::new(200, 100))
        );
    }

    #[test]
    fn collapsed_container_keeps_previous_size() {
        let mut viewer = viewer();
        viewer.surface_mut().set_container_size(0, 0);

        viewer.on_resize().unwrap();

        assert_eq!(viewer.frame().dimensions(), (32, 24));
    }

    #[test]
    fn render_frame_presents_to_surface() {
        let mut viewer = viewer();
        viewer.render_frame().unwrap();
        viewer.render_frame().unwrap();
        assert_eq!(viewer.frames_rendered(), 2);
        assert_eq!(viewer.surface().frames_presented(), 2);
        assert_eq!(viewer.surface().last_frame().map(<[u8]>::len), Some(32 * 24 * 4));
    }
}
