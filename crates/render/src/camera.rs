use glam::{Mat4, Vec2, Vec3};
use isocity_common::CameraConfig;
use std::f32::consts::FRAC_PI_2;

/// Size of the drawable area in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Orbit camera around a look-at point, with +Z as the world up axis.
///
/// Only the spherical coordinates and the look-at point are stored; the eye
/// position and view matrix are always derived from them.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub azimuth: f32,
    /// Clamped to `[0, π/2]`.
    pub elevation: f32,
    /// Never below `min_radius`.
    pub radius: f32,
    pub look_at: Vec3,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub min_radius: f32,
    pub zoom_sensitivity: f32,
    pub orbit_gain: f32,
    pub pan_gain: f32,
    pub viewport: Viewport,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), Vec3::ZERO, Viewport::default())
    }
}

impl OrbitCamera {
    pub fn from_config(config: &CameraConfig, look_at: Vec3, viewport: Viewport) -> Self {
        Self {
            azimuth: config.initial_azimuth_degrees.to_radians(),
            elevation: config.initial_elevation_degrees.to_radians().clamp(0.0, FRAC_PI_2),
            radius: config.initial_radius.max(config.min_radius),
            look_at,
            fov: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
            min_radius: config.min_radius,
            zoom_sensitivity: config.zoom_sensitivity,
            orbit_gain: config.orbit_gain,
            pan_gain: config.pan_gain,
            viewport,
        }
    }

    /// Eye position: `look_at + radius·(cos az·cos el, sin az·cos el, sin el)`.
    pub fn position(&self) -> Vec3 {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_el, cos_el) = self.elevation.sin_cos();
        self.look_at + self.radius * Vec3::new(cos_az * cos_el, sin_az * cos_el, sin_el)
    }

    /// Unit vector from the eye towards the look-at point.
    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position()).normalize_or_zero()
    }

    /// Up vector for the view matrix. Straight overhead the +Z axis is
    /// parallel to the view direction, so fall back to the horizontal
    /// direction pointing away from the eye.
    fn up(&self) -> Vec3 {
        if self.forward().cross(Vec3::Z).length_squared() < 1e-8 {
            let (sin_az, cos_az) = self.azimuth.sin_cos();
            Vec3::new(-cos_az, -sin_az, 0.0)
        } else {
            Vec3::Z
        }
    }

    /// Rotate around the look-at point by a pointer delta in pixels.
    pub fn apply_orbit(&mut self, delta: Vec2) {
        let width = self.viewport.width.max(1.0);
        let deg_per_pixel = self.orbit_gain * self.fov.to_degrees() / width;
        self.azimuth -= (deg_per_pixel * delta.x).to_radians();
        self.elevation = (self.elevation + (deg_per_pixel * delta.y).to_radians()).clamp(0.0, FRAC_PI_2);
    }

    /// Slide the look-at point across the ground plane by a pointer delta.
    ///
    /// Distance per pixel scales with the radius so the grid tracks the
    /// pointer at the same visual speed at every zoom level.
    pub fn apply_pan(&mut self, delta: Vec2) {
        let width = self.viewport.width.max(1.0);
        let dist_per_pixel = self.radius * (0.5 * self.fov).tan() / width;
        let right = self.pan_gain * dist_per_pixel * delta.x;
        let fwd = self.pan_gain * dist_per_pixel * delta.y;

        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let wd = self.forward();
        self.look_at.x += sin_az * right + fwd * wd.x;
        self.look_at.y += -cos_az * right + fwd * wd.y;
    }

    /// Move towards (positive delta) or away from the look-at point.
    pub fn apply_zoom(&mut self, wheel_delta: f32) {
        self.radius = (self.radius - self.zoom_sensitivity * wheel_delta).max(self.min_radius);
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.look_at, self.up())
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.viewport.aspect(), self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn default_camera_matches_config() {
        let cam = OrbitCamera::default();
        assert!(approx(cam.azimuth, 30f32.to_radians()));
        assert!(approx(cam.elevation, 30f32.to_radians()));
        assert_eq!(cam.radius, 25.0);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn position_is_derived_from_spherical_coordinates() {
        let mut cam = OrbitCamera::default();
        cam.azimuth = 0.0;
        cam.elevation = 0.0;
        cam.radius = 10.0;
        cam.look_at = Vec3::new(1.0, 2.0, 0.0);
        let p = cam.position();
        assert!(approx(p.x, 11.0) && approx(p.y, 2.0) && approx(p.z, 0.0));
        assert!((cam.position() - cam.look_at).length() - cam.radius < 1e-4);
    }

    #[test]
    fn camera_faces_look_at() {
        let cam = OrbitCamera::default();
        let expected = (cam.look_at - cam.position()).normalize();
        assert!(cam.forward().abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn elevation_saturates_at_straight_down() {
        let mut cam = OrbitCamera::default();
        for _ in 0..20 {
            cam.apply_orbit(Vec2::new(0.0, 1000.0));
            assert!(cam.elevation <= FRAC_PI_2);
        }
        assert_eq!(cam.elevation, FRAC_PI_2);
        // The view matrix stays finite looking straight down.
        let view = cam.view_matrix();
        assert!(view.to_cols_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn elevation_never_below_ground() {
        let mut cam = OrbitCamera::default();
        for _ in 0..20 {
            cam.apply_orbit(Vec2::new(0.0, -1000.0));
        }
        assert_eq!(cam.elevation, 0.0);
    }

    #[test]
    fn elevation_stays_in_range_for_mixed_orbits() {
        let mut cam = OrbitCamera::default();
        let deltas = [
            Vec2::new(12.0, 300.0),
            Vec2::new(-50.0, -900.0),
            Vec2::new(0.0, 45.0),
            Vec2::new(400.0, 2000.0),
            Vec2::new(1.0, -1.0),
        ];
        for d in deltas.iter().cycle().take(100) {
            cam.apply_orbit(*d);
            assert!((0.0..=FRAC_PI_2).contains(&cam.elevation));
        }
    }

    #[test]
    fn horizontal_orbit_changes_azimuth_only() {
        let mut cam = OrbitCamera::default();
        let el = cam.elevation;
        let az = cam.azimuth;
        cam.apply_orbit(Vec2::new(100.0, 0.0));
        assert!(cam.azimuth < az);
        assert_eq!(cam.elevation, el);
        assert_eq!(cam.radius, 25.0);
    }

    #[test]
    fn zoom_clamps_to_min_radius() {
        let mut cam = OrbitCamera::default();
        for _ in 0..50 {
            cam.apply_zoom(1000.0);
            assert!(cam.radius >= cam.min_radius);
        }
        assert_eq!(cam.radius, cam.min_radius);
        cam.apply_zoom(-500.0);
        assert!(approx(cam.radius, cam.min_radius + 5.0));
    }

    #[test]
    fn pan_moves_look_at_in_ground_plane() {
        let mut cam = OrbitCamera::default();
        let before = cam.look_at;
        cam.apply_pan(Vec2::new(30.0, -20.0));
        assert_ne!(cam.look_at, before);
        assert_eq!(cam.look_at.z, before.z);
    }

    #[test]
    fn pan_speed_scales_with_radius() {
        let mut near = OrbitCamera::default();
        near.radius = 5.0;
        let mut far = near.clone();
        far.radius = 50.0;

        near.apply_pan(Vec2::new(10.0, 0.0));
        far.apply_pan(Vec2::new(10.0, 0.0));
        let near_dist = near.look_at.length();
        let far_dist = far.look_at.length();
        assert!(approx(far_dist / near_dist, 10.0));
    }

    #[test]
    fn horizontal_pan_is_perpendicular_to_view() {
        let mut cam = OrbitCamera::default();
        let fwd = cam.forward();
        cam.apply_pan(Vec2::new(25.0, 0.0));
        let moved = cam.look_at;
        let horizontal_fwd = Vec3::new(fwd.x, fwd.y, 0.0).normalize();
        assert!(moved.dot(horizontal_fwd).abs() < 1e-4);
    }

    #[test]
    fn viewport_aspect() {
        assert_eq!(Viewport::new(200.0, 100.0).aspect(), 2.0);
        assert_eq!(Viewport::new(200.0, 0.0).aspect(), 1.0);
        assert!(Viewport::new(0.0, 10.0).is_empty());
    }
}
