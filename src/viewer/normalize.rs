use glam::Vec3;

use super::model::LoadedModel;
use super::scene::GRID_HEIGHT;

/// Largest allowed model extent after normalization, in scene units.
pub const DEFAULT_MAX_SIZE: f32 = 3.0;

/// Where the normalized model sits vertically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlign {
    /// Bounding-box center at the origin on every axis.
    #[default]
    Center,
    /// Centered horizontally, lowest point resting on the ground grid.
    Ground,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizePolicy {
    pub max_size: f32,
    pub vertical: VerticalAlign,
}

impl Default for NormalizePolicy {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            vertical: VerticalAlign::Center,
        }
    }
}

/// Outcome of normalizing one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub center: Vec3,
    pub size: Vec3,
    pub scale: f32,
}

impl NormalizePolicy {
    /// Scale factor for a model whose largest extent is `max_dimension`.
    ///
    /// Oversized models shrink to exactly `max_size`; smaller ones keep 1.0.
    pub fn scale_for(&self, max_dimension: f32) -> f32 {
        if max_dimension > self.max_size {
            self.max_size / max_dimension
        } else {
            1.0
        }
    }

    /// Centers and fits `model`, replacing its transform.
    pub fn apply(&self, model: &mut LoadedModel) -> Normalization {
        let bounds = model.local_bounds();
        let center = bounds.center();
        let size = bounds.size();
        let scale = self.scale_for(bounds.max_dimension());

        let translation = match self.vertical {
            VerticalAlign::Center => Vec3::ZERO,
            VerticalAlign::Ground => Vec3::new(0.0, GRID_HEIGHT + size.y * scale * 0.5, 0.0),
        };

        model.transform.offset = -center;
        model.transform.scale = scale;
        model.transform.rotation_y = 0.0;
        model.transform.translation = translation;

        Normalization { center, size, scale }
    }
}
