use glam::{Mat4, Vec3, Vec4Swizzles};

use super::camera::OrbitCamera;
use super::scene::{Scene, BACKGROUND};

/// RGBA8 color buffer with a matching depth buffer.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![0; count * 4],
            depth: vec![f32::INFINITY; count],
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            *self = Self::new(width, height);
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ])
    }

    pub fn clear(&mut self, rgb: [u8; 3]) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        self.depth.fill(f32::INFINITY);
    }

    fn set_pixel(&mut self, x: i32, y: i32, depth: f32, rgb: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let i = y as usize * self.width as usize + x as usize;
        if depth > self.depth[i] {
            return;
        }
        self.depth[i] = depth;
        self.pixels[i * 4..i * 4 + 4].copy_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
    }

    /// Bresenham line with linearly interpolated depth.
    fn draw_line(&mut self, a: Vec3, b: Vec3, rgb: [u8; 3]) {
        let Some((a, b)) = clip_segment(a, b, self.width as f32, self.height as f32) else {
            return;
        };
        let (mut x, mut y) = (a.x.round() as i32, a.y.round() as i32);
        let (x2, y2) = (b.x.round() as i32, b.y.round() as i32);

        let dx = (x2 - x).abs();
        let dy = -(y2 - y).abs();
        let sx = if x < x2 { 1 } else { -1 };
        let sy = if y < y2 { 1 } else { -1 };
        let mut err = dx + dy;
        let steps = dx.max(-dy).max(1) as f32;
        let mut step = 0.0;

        loop {
            let depth = a.z + (b.z - a.z) * (step / steps);
            self.set_pixel(x, y, depth, rgb);

            if x == x2 && y == y2 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            step += 1.0;
        }
    }

    /// Fills a screen-space triangle using edge functions.
    fn fill_triangle(&mut self, v: [Vec3; 3], rgb: [u8; 3]) {
        let area = edge(v[0], v[1], v[2]);
        if area.abs() < f32::EPSILON {
            return;
        }

        let min_x = v.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor().max(0.0) as i32;
        let max_x = v.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil()
            .min(self.width as f32 - 1.0) as i32;
        let min_y = v.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor().max(0.0) as i32;
        let max_y = v.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil()
            .min(self.height as f32 - 1.0) as i32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Vec3::new(x as f32 + 0.5, y as f32 + 0.5, 0.0);
                let w0 = edge(v[1], v[2], p) / area;
                let w1 = edge(v[2], v[0], p) / area;
                let w2 = edge(v[0], v[1], p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let depth = w0 * v[0].z + w1 * v[1].z + w2 * v[2].z;
                self.set_pixel(x, y, depth, rgb);
            }
        }
    }
}

/// Liang-Barsky clip of a screen-space segment against the viewport.
fn clip_segment(a: Vec3, b: Vec3, width: f32, height: f32) -> Option<(Vec3, Vec3)> {
    let d = b - a;
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    for (p, q) in [
        (-d.x, a.x),
        (d.x, width - 1.0 - a.x),
        (-d.y, a.y),
        (d.y, height - 1.0 - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some((a + d * t0, a + d * t1))
}

fn edge(a: Vec3, b: Vec3, p: Vec3) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// World → screen mapping for one frame.
struct Projector {
    view_projection: Mat4,
    width: f32,
    height: f32,
}

impl Projector {
    /// Screen position (pixels, y down) and NDC depth; `None` behind the camera.
    fn project(&self, world: Vec3) -> Option<Vec3> {
        let clip = self.view_projection * world.extend(1.0);
        if clip.w <= super::camera::NEAR {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        Some(Vec3::new(
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
            ndc.z,
        ))
    }
}

/// Draws `scene` as seen by `camera` into `frame`.
pub fn render_scene(scene: &Scene, camera: &OrbitCamera, frame: &mut FrameBuffer) {
    frame.clear(BACKGROUND);

    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    let projector = Projector {
        view_projection: camera.view_projection(),
        width: width as f32,
        height: height as f32,
    };

    if scene.grid_visible {
        for (a, b, color) in scene.grid_lines() {
            if let (Some(a), Some(b)) = (projector.project(a), projector.project(b)) {
                frame.draw_line(a, b, color);
            }
        }
    }

    let Some(model) = scene.model() else {
        return;
    };

    let to_world = model.transform.matrix();
    let eye = camera.position();

    for mesh in model.meshes() {
        let material = &mesh.material;
        let base = Vec3::new(
            material.base_color[0],
            material.base_color[1],
            material.base_color[2],
        );

        for triangle in mesh.geometry.triangles() {
            let world = triangle.map(|p| to_world.transform_point3(p));
            let [Some(a), Some(b), Some(c)] = world.map(|p| projector.project(p)) else {
                continue;
            };

            if material.wireframe {
                let rgb = to_rgb8(base);
                frame.draw_line(a, b, rgb);
                frame.draw_line(b, c, rgb);
                frame.draw_line(c, a, rgb);
                continue;
            }

            let mut normal = (world[1] - world[0]).cross(world[2] - world[0]).normalize_or_zero();
            let facing = normal.dot(eye - world[0]);
            if facing < 0.0 {
                if !material.double_sided {
                    continue;
                }
                normal = -normal;
            }

            frame.fill_triangle([a, b, c], to_rgb8(scene.lights.shade(base, normal)));
        }
    }
}

fn to_rgb8(color: Vec3) -> [u8; 3] {
    let c = color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    [c.x.round() as u8, c.y.round() as u8, c.z.round() as u8]
}
