//! Wireframe geometry of a perspective camera's view volume.
//!
//! Vertices live in the camera's local space: the apex at the origin, then the
//! four near-plane corners, then the four far-plane corners, both rings in
//! the order (+x,+y), (+x,-y), (-x,-y), (-x,+y).

use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};

pub const FRUSTUM_VERTEX_COUNT: usize = 9;
pub const FRUSTUM_EDGE_COUNT: usize = 16;
pub const FRUSTUM_INDEX_COUNT: usize = FRUSTUM_EDGE_COUNT * 2;

const APEX: u16 = 0;
const NEAR_RING: u16 = 1;
const FAR_RING: u16 = 5;
const RING_CORNERS: u16 = 4;

const CORNER_SIGNS: [(f32, f32); RING_CORNERS as usize] =
    [(1.0, 1.0), (1.0, -1.0), (-1.0, -1.0), (-1.0, 1.0)];

/// Projection parameters the geometry depends on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrustumParams {
    pub near: f32,
    pub far: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
}

impl FrustumParams {
    /// Half height of the view volume at `distance` from the apex.
    pub fn half_extent(&self, distance: f32) -> f32 {
        distance * (self.fov.to_radians() / 2.0).tan()
    }
}

/// The nine control points of a frustum.
pub fn frustum_vertices(params: &FrustumParams) -> [Vec3; FRUSTUM_VERTEX_COUNT] {
    let mut vertices = [Vec3::ZERO; FRUSTUM_VERTEX_COUNT];
    for (ring, distance) in [(NEAR_RING, params.near), (FAR_RING, params.far)] {
        let half = params.half_extent(distance);
        for (corner, (sx, sy)) in CORNER_SIGNS.iter().enumerate() {
            vertices[ring as usize + corner] =
                Vec3::new(sx * half * params.aspect, sy * half, -distance);
        }
    }
    vertices
}

/// Edge list as index pairs: apex to each near corner, the near ring, each
/// near corner to its far counterpart, then the far ring.
pub fn frustum_edges() -> [u16; FRUSTUM_INDEX_COUNT] {
    let next = |ring: u16, corner: u16| ring + (corner + 1) % RING_CORNERS;
    let mut edges = Vec::with_capacity(FRUSTUM_EDGE_COUNT);
    edges.extend((0..RING_CORNERS).map(|c| [APEX, NEAR_RING + c]));
    edges.extend((0..RING_CORNERS).map(|c| [NEAR_RING + c, next(NEAR_RING, c)]));
    edges.extend((0..RING_CORNERS).map(|c| [NEAR_RING + c, FAR_RING + c]));
    edges.extend((0..RING_CORNERS).map(|c| [FAR_RING + c, next(FAR_RING, c)]));

    let mut indices = [0u16; FRUSTUM_INDEX_COUNT];
    for (slot, index) in indices.iter_mut().zip(edges.into_iter().flatten()) {
        *slot = index;
    }
    indices
}

/// Frustum vertices plus their fixed edge topology.
#[derive(Debug, Clone, PartialEq)]
pub struct FrustumMesh {
    pub vertices: [Vec3; FRUSTUM_VERTEX_COUNT],
    pub indices: [u16; FRUSTUM_INDEX_COUNT],
}

impl FrustumMesh {
    pub fn new(params: &FrustumParams) -> Self {
        Self {
            vertices: frustum_vertices(params),
            indices: frustum_edges(),
        }
    }

    /// Vertex positions flattened to `x, y, z` triples.
    pub fn positions(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.to_array()).collect()
    }
}

/// World transform of the frustum: the camera's rotation with its position
/// as translation.
pub fn frustum_transform(rotation: Mat3, position: Vec3) -> Mat4 {
    let mut transform = Mat4::from_mat3(rotation);
    transform.w_axis = position.extend(1.0);
    transform
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(near: f32, far: f32, fov: f32, aspect: f32) -> FrustumParams {
        FrustumParams {
            near,
            far,
            fov,
            aspect,
        }
    }

    #[test]
    fn edges_follow_corner_adjacency() {
        assert_eq!(
            frustum_edges(),
            [
                0, 1, 0, 2, 0, 3, 0, 4, 1, 2, 2, 3, 3, 4, 4, 1, 1, 5, 2, 6, 3, 7, 4, 8, 5, 6, 6,
                7, 7, 8, 8, 5
            ]
        );
    }

    #[test]
    fn apex_never_connects_to_far_ring() {
        let edges = frustum_edges();
        for pair in edges.chunks(2) {
            if pair.contains(&APEX) {
                let other = pair[0].max(pair[1]);
                assert!((NEAR_RING..FAR_RING).contains(&other));
            }
        }
    }

    #[test]
    fn sixty_degree_unit_aspect_scaling() {
        let vertices = frustum_vertices(&params(1.0, 100_000.0, 60.0, 1.0));
        let h = 30f32.to_radians().tan();
        assert_eq!(vertices[0], Vec3::ZERO);
        assert!((vertices[1] - Vec3::new(h, h, -1.0)).length() < 1e-5);
        assert!((vertices[5].x - 57_735.03).abs() < 0.5);
        assert!((vertices[5].y - 57_735.03).abs() < 0.5);
        assert_eq!(vertices[5].z, -100_000.0);
    }

    #[test]
    fn corner_order_and_aspect() {
        let vertices = frustum_vertices(&params(2.0, 10.0, 90.0, 2.0));
        let signs: Vec<(f32, f32)> = vertices[1..5]
            .iter()
            .map(|v| (v.x.signum(), v.y.signum()))
            .collect();
        assert_eq!(signs, CORNER_SIGNS.to_vec());
        // tan(45deg) == 1, so half extents equal the plane distance.
        assert!((vertices[1].x - 4.0).abs() < 1e-5);
        assert!((vertices[1].y - 2.0).abs() < 1e-5);
        assert!((vertices[8].x + 20.0).abs() < 1e-4);
        assert!((vertices[8].y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn far_ring_is_strictly_larger_than_near_ring() {
        for (near, far, fov, aspect) in [
            (0.1, 100.0, 45.0, 16.0 / 9.0),
            (500.0, 2000.0, 60.0, 1.0),
            (1.0, 1.5, 170.0, 0.5),
            (10.0, 11.0, 1.0, 3.0),
        ] {
            let mesh = FrustumMesh::new(&params(near, far, fov, aspect));
            assert_eq!(mesh.vertices.len(), FRUSTUM_VERTEX_COUNT);
            assert_eq!(mesh.indices.len(), FRUSTUM_INDEX_COUNT);
            for corner in 0..4 {
                let n = mesh.vertices[1 + corner];
                let f = mesh.vertices[5 + corner];
                assert!(f.x.abs() > n.x.abs());
                assert!(f.y.abs() > n.y.abs());
                assert!(f.z.abs() > n.z.abs());
            }
        }
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let p = params(500.0, 2000.0, 60.0, 1280.0 / 720.0);
        assert_eq!(FrustumMesh::new(&p), FrustumMesh::new(&p));
        assert_eq!(FrustumMesh::new(&p).positions().len(), 27);
    }

    #[test]
    fn transform_copies_rotation_and_position() {
        let rotation = Mat3::from_rotation_y(0.5);
        let position = Vec3::new(1.0, 2.0, 3.0);
        let transform = frustum_transform(rotation, position);
        assert_eq!(transform.transform_point3(Vec3::ZERO), position);
        let dir = transform.transform_vector3(Vec3::NEG_Z);
        assert!((dir - rotation * Vec3::NEG_Z).length() < 1e-6);
    }
}
