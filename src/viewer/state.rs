/// Slowest and fastest auto-rotation, radians per frame.
pub const MIN_ROTATE_SPEED: f32 = 0.003;
pub const MAX_ROTATE_SPEED: f32 = 0.05;
pub const MIN_SPEED_LEVEL: u8 = 1;
pub const MAX_SPEED_LEVEL: u8 = 10;
pub const DEFAULT_SPEED_LEVEL: u8 = 3;

/// Display toggles owned by the viewer.
///
/// Toggles are independent of whether a model is loaded; wireframe and
/// auto-rotate are applied to whichever model gets attached next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerState {
    pub model_loaded: bool,
    pub wireframe: bool,
    pub grid_visible: bool,
    pub auto_rotate: bool,
    pub rotate_speed: f32,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            model_loaded: false,
            wireframe: false,
            grid_visible: true,
            auto_rotate: false,
            rotate_speed: rotate_speed_for_level(DEFAULT_SPEED_LEVEL),
        }
    }
}

/// Maps a speed level (clamped to 1..=10) linearly onto the rotation range.
pub fn rotate_speed_for_level(level: u8) -> f32 {
    let level = level.clamp(MIN_SPEED_LEVEL, MAX_SPEED_LEVEL);
    let t = (level - MIN_SPEED_LEVEL) as f32 / (MAX_SPEED_LEVEL - MIN_SPEED_LEVEL) as f32;
    MIN_ROTATE_SPEED + t * (MAX_ROTATE_SPEED - MIN_ROTATE_SPEED)
}
