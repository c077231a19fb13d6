use glam::{Mat4, Vec3};

pub const DEFAULT_POSITION: Vec3 = Vec3::new(3.0, 2.0, 3.0);
pub const DEFAULT_TARGET: Vec3 = Vec3::ZERO;
pub const FOV_Y_DEGREES: f32 = 50.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1000.0;
pub const MIN_DISTANCE: f32 = 1.0;
pub const MAX_DISTANCE: f32 = 15.0;
pub const DAMPING: f32 = 0.05;

/// Radians of orbit per pixel of pointer drag.
const ROTATE_PER_PIXEL: f32 = 0.005;
const ZOOM_STEP: f32 = 0.95;
/// Keeps the camera off the poles.
const MAX_POLAR: f32 = std::f32::consts::PI - 0.01;
const MIN_POLAR: f32 = 0.01;

/// Perspective camera orbiting a target point.
///
/// Pointer input accumulates angular velocity that decays by `DAMPING`
/// each `update`, giving the same feel as damped orbit controls.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    distance: f32,
    azimuth: f32,
    polar: f32,
    aspect: f32,
    velocity_azimuth: f32,
    velocity_polar: f32,
}

impl OrbitCamera {
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            target: DEFAULT_TARGET,
            distance: 1.0,
            azimuth: 0.0,
            polar: 0.0,
            aspect: sanitize_aspect(aspect),
            velocity_azimuth: 0.0,
            velocity_polar: 0.0,
        };
        camera.reset();
        camera
    }

    /// Back to the default framing, dropping any residual motion.
    pub fn reset(&mut self) {
        let offset = DEFAULT_POSITION - DEFAULT_TARGET;
        self.target = DEFAULT_TARGET;
        self.distance = offset.length();
        self.azimuth = offset.x.atan2(offset.z);
        self.polar = (offset.y / self.distance).acos();
        self.velocity_azimuth = 0.0;
        self.velocity_polar = 0.0;
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = sanitize_aspect(aspect);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn position(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.target
            + self.distance
                * Vec3::new(
                    sin_polar * self.azimuth.sin(),
                    self.polar.cos(),
                    sin_polar * self.azimuth.cos(),
                )
    }

    /// Pointer drag in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.velocity_azimuth -= dx * ROTATE_PER_PIXEL;
        self.velocity_polar -= dy * ROTATE_PER_PIXEL;
    }

    /// Positive steps move closer.
    pub fn zoom(&mut self, steps: f32) {
        self.distance = (self.distance * ZOOM_STEP.powf(steps)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Advances damped motion by one frame.
    pub fn update(&mut self) {
        self.azimuth += self.velocity_azimuth * DAMPING;
        self.polar = (self.polar + self.velocity_polar * DAMPING).clamp(MIN_POLAR, MAX_POLAR);
        self.velocity_azimuth *= 1.0 - DAMPING;
        self.velocity_polar *= 1.0 - DAMPING;
        self.distance = self.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), self.aspect, NEAR, FAR)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}
