use glam::Vec3;

use super::model::LoadedModel;

pub const BACKGROUND: [u8; 3] = [0x1a, 0x1a, 0x1a];

/// Ground grid plane height.
pub const GRID_HEIGHT: f32 = -0.5;
pub const GRID_SIZE: f32 = 10.0;
pub const GRID_DIVISIONS: u32 = 20;
pub const GRID_CENTER_COLOR: [u8; 3] = [0x44, 0x44, 0x44];
pub const GRID_LINE_COLOR: [u8; 3] = [0x33, 0x33, 0x33];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    /// Light position; it shines toward the origin.
    pub position: Vec3,
}

impl DirectionalLight {
    pub fn direction_to_light(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub ambient: Vec3,
    pub main: DirectionalLight,
    pub fill: DirectionalLight,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient: Vec3::splat(0.5),
            main: DirectionalLight {
                color: Vec3::ONE,
                intensity: 0.8,
                position: Vec3::new(5.0, 10.0, 7.0),
            },
            fill: DirectionalLight {
                color: rgb_hex(0x4fc3f7),
                intensity: 0.3,
                position: Vec3::new(-5.0, 3.0, -5.0),
            },
        }
    }
}

impl LightRig {
    /// Lambert shading of `base` for a surface facing `normal`.
    pub fn shade(&self, base: Vec3, normal: Vec3) -> Vec3 {
        let diffuse = |light: &DirectionalLight| {
            light.color * light.intensity * normal.dot(light.direction_to_light()).max(0.0)
        };
        (base * (self.ambient + diffuse(&self.main) + diffuse(&self.fill))).clamp(Vec3::ZERO, Vec3::ONE)
    }
}

/// Everything the render loop draws: lights, grid and at most one model.
#[derive(Debug)]
pub struct Scene {
    pub lights: LightRig,
    pub grid_visible: bool,
    model: Option<LoadedModel>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            lights: LightRig::default(),
            grid_visible: true,
            model: None,
        }
    }

    pub fn model(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> Option<&mut LoadedModel> {
        self.model.as_mut()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Detaches the current model, if any, without releasing it.
    pub fn detach(&mut self) -> Option<LoadedModel> {
        self.model.take()
    }

    /// Attaches `model`. The slot must be empty: the previous model is
    /// disposed before the replacement is decoded.
    pub fn attach(&mut self, model: LoadedModel) {
        debug_assert!(self.model.is_none(), "attach over an attached model");
        if let Some(previous) = self.model.replace(model) {
            previous.dispose();
        }
    }

    /// World-space grid segments with their colors.
    pub fn grid_lines(&self) -> impl Iterator<Item = (Vec3, Vec3, [u8; 3])> {
        let half = GRID_SIZE / 2.0;
        let step = GRID_SIZE / GRID_DIVISIONS as f32;
        let center = GRID_DIVISIONS / 2;

        (0..=GRID_DIVISIONS).flat_map(move |i| {
            let t = -half + i as f32 * step;
            let color = if i == center {
                GRID_CENTER_COLOR
            } else {
                GRID_LINE_COLOR
            };
            [
                (
                    Vec3::new(t, GRID_HEIGHT, -half),
                    Vec3::new(t, GRID_HEIGHT, half),
                    color,
                ),
                (
                    Vec3::new(-half, GRID_HEIGHT, t),
                    Vec3::new(half, GRID_HEIGHT, t),
                    color,
                ),
            ]
        })
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

pub fn rgb_hex(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_two_lines_per_division_boundary() {
        let scene = Scene::new();
        let lines: Vec<_> = scene.grid_lines().collect();
        assert_eq!(lines.len(), 2 * (GRID_DIVISIONS as usize + 1));
        assert!(lines.iter().all(|(a, b, _)| a.y == GRID_HEIGHT && b.y == GRID_HEIGHT));
        assert_eq!(
            lines.iter().filter(|(_, _, c)| *c == GRID_CENTER_COLOR).count(),
            2
        );
    }

    #[test]
    fn shading_stays_in_range() {
        let rig = LightRig::default();
        let lit = rig.shade(Vec3::ONE, Vec3::new(5.0, 10.0, 7.0).normalize());
        assert!(lit.max_element() <= 1.0);

        let back = rig.shade(Vec3::new(0.5, 0.5, 0.5), Vec3::new(0.0, -1.0, 0.0));
        assert!((back - Vec3::splat(0.25)).length() < 1e-5);
    }

    #[test]
    fn hex_colors_decode() {
        assert_eq!(rgb_hex(0xff0000), Vec3::new(1.0, 0.0, 0.0));
    }
}
