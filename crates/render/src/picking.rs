//! Screen-space picking: pointer pixel → world ray → nearest pickable.

use crate::camera::{OrbitCamera, Viewport};
use glam::{Vec2, Vec3};

/// A ray with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Distance along `ray` to the first intersection, using the slab method.
    ///
    /// A ray starting inside the box hits at distance 0.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let inv = ray.direction.recip();
        let t0 = (self.min - ray.origin) * inv;
        let t1 = (self.max - ray.origin) * inv;
        let t_near = t0.min(t1).max_element();
        let t_far = t0.max(t1).min_element();
        // NaN (ray parallel to and on a slab face) fails both comparisons.
        if t_near <= t_far && t_far >= 0.0 {
            Some(t_near.max(0.0))
        } else {
            None
        }
    }
}

/// Anything the picker can hit.
pub trait Pickable {
    fn bounds(&self) -> Aabb;
}

/// The nearest element under the pointer.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a, T> {
    pub element: &'a T,
    pub distance: f32,
    pub point: Vec3,
}

/// Convert pointer pixels to normalized device coordinates (y up).
pub fn pointer_to_ndc(pointer: Vec2, viewport: Viewport) -> Vec2 {
    Vec2::new(
        2.0 * pointer.x / viewport.width - 1.0,
        1.0 - 2.0 * pointer.y / viewport.height,
    )
}

/// Ray from the camera eye through the pointer position.
///
/// Returns `None` for an empty viewport.
pub fn screen_to_ray(pointer: Vec2, viewport: Viewport, camera: &OrbitCamera) -> Option<Ray> {
    if viewport.is_empty() {
        return None;
    }
    let ndc = pointer_to_ndc(pointer, viewport);
    let mut cam = camera.clone();
    cam.resize(viewport);
    let inv = cam.view_projection().inverse();
    // glam's right-handed perspective maps depth to [0, 1].
    let near = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
    let far = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
    let dir = far - near;
    if !dir.is_finite() || dir.length_squared() == 0.0 {
        return None;
    }
    Some(Ray::new(cam.position(), dir))
}

/// Nearest pickable under the pointer, or `None` when the ray misses everything.
///
/// Ties at equal distance go to the first element found.
pub fn pick<'a, T, I>(
    pointer: Vec2,
    viewport: Viewport,
    camera: &OrbitCamera,
    pickables: I,
) -> Option<Hit<'a, T>>
where
    T: Pickable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let ray = screen_to_ray(pointer, viewport, camera)?;
    pick_ray(&ray, pickables)
}

/// Nearest pickable along an explicit ray.
pub fn pick_ray<'a, T, I>(ray: &Ray, pickables: I) -> Option<Hit<'a, T>>
where
    T: Pickable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut best: Option<Hit<'a, T>> = None;
    for element in pickables {
        let Some(distance) = element.bounds().intersect(ray) else {
            continue;
        };
        if best.as_ref().is_none_or(|b| distance < b.distance) {
            best = Some(Hit {
                element,
                distance,
                point: ray.at(distance),
            });
        }
    }
    best
}
