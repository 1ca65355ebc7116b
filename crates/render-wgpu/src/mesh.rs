use bytemuck::{Pod, Zeroable};
use isocity_common::GridCoord;
use isocity_render::Scene;

/// Color multiplier for the tile under the pointer.
pub const HIGHLIGHT_TINT: [f32; 3] = [1.35, 1.35, 1.1];

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Per-box data uploaded to the instance buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct BoxInstance {
    pub center: [f32; 3],
    pub scale: [f32; 3],
    pub color: [f32; 4],
}

/// Instances for every scene element, terrain first.
///
/// Elements on `highlight` get brightened so the hovered tile stands out.
pub fn build_instances(scene: &Scene, highlight: Option<GridCoord>) -> Vec<BoxInstance> {
    scene
        .elements()
        .map(|element| {
            let mut color = element.material.color();
            if highlight == Some(element.coord) {
                for (c, tint) in color.iter_mut().zip(HIGHLIGHT_TINT) {
                    *c = (*c * tint).min(1.0);
                }
            }
            BoxInstance {
                center: element.position.to_array(),
                scale: element.scale.to_array(),
                color,
            }
        })
        .collect()
}

/// Unit box centred on the origin, one quad per face so normals stay flat.
pub(crate) fn unit_box() -> (Vec<Vertex>, Vec<u16>) {
    // (normal, tangent u, tangent v) with u × v = normal, so quads wind CCW.
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in FACES {
        let base = vertices.len() as u16;
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let position = std::array::from_fn(|i| 0.5 * normal[i] + su * u[i] + sv * v[i]);
            vertices.push(Vertex { position, normal });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use isocity_kernel::{BuildingKind, City};

    #[test]
    fn unit_box_has_flat_faces() {
        let (vertices, indices) = unit_box();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        for v in &vertices {
            let p = Vec3::from(v.position);
            let n = Vec3::from(v.normal);
            // Every vertex lies on the face its normal points out of.
            assert!((p.dot(n) - 0.5).abs() < 1e-6);
            assert!(p.abs().max_element() <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn one_instance_per_element() {
        let mut city = City::new(3);
        city.set_building(GridCoord::new(1, 2), Some(BuildingKind::Commercial));
        let scene = Scene::initialize(&mut city);
        let instances = build_instances(&scene, None);
        assert_eq!(instances.len(), 10);
        let last = instances.last().unwrap();
        assert_eq!(last.center, [1.0, 2.0, 0.5]);
        assert_eq!(last.scale, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn highlight_brightens_only_the_hovered_tile() {
        let mut city = City::new(2);
        let scene = Scene::initialize(&mut city);
        let plain = build_instances(&scene, None);
        let lit = build_instances(&scene, Some(GridCoord::new(0, 1)));
        let changed: Vec<_> = plain
            .iter()
            .zip(&lit)
            .filter(|(a, b)| a.color != b.color)
            .map(|(_, b)| b.center)
            .collect();
        assert_eq!(changed, vec![[0.0, 1.0, -0.5]]);
        assert!(lit.iter().all(|i| i.color.iter().all(|c| *c <= 1.0)));
    }

    #[test]
    fn triangles_wind_outward() {
        let (vertices, indices) = unit_box();
        for tri in indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(vertices[i as usize].position));
            let n = Vec3::from(vertices[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }
}
