//! UV sphere with random radial displacement.
//!
//! Vertices form a `(width_segments + 1) x (height_segments + 1)` grid in
//! row-major order, one row per latitude ring from the north pole (`y = 0`)
//! to the south pole. Each vertex is pushed in or out along its radius by a
//! multiplier drawn uniformly from `[1 - m/2, 1 + m/2)`, where `m` is the
//! displacement magnitude.
//!
//! Two rules keep the surface closed:
//!
//! - every vertex of a pole ring shares one draw, so the pole stays a point
//! - the last column of a ring reuses the first column's draw, so the
//!   longitude seam has no crack

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;

use crate::mesh::Mesh;

/// Parameters for [`generate_displaced_sphere`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereParams {
    /// Undisplaced radius.
    pub radius: f32,
    /// Longitude segments (columns).
    pub width_segments: u32,
    /// Latitude segments (rings).
    pub height_segments: u32,
    /// Peak-to-peak fractional radius perturbation.
    pub displacement: f32,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 100,
            height_segments: 100,
            displacement: 0.01,
        }
    }
}

impl SphereParams {
    /// Unit sphere with `segments` in both directions.
    pub fn unit(segments: u32, displacement: f32) -> Self {
        Self {
            radius: 1.0,
            width_segments: segments,
            height_segments: segments,
            displacement,
        }
    }

    /// Number of vertices in the generated grid.
    pub fn vertex_count(&self) -> usize {
        (self.width_segments as usize + 1) * (self.height_segments as usize + 1)
    }

    /// Number of indices in the generated mesh (two triangles per cell).
    pub fn index_count(&self) -> usize {
        6 * self.width_segments as usize * self.height_segments as usize
    }

    /// Closed interval every vertex distance falls into.
    pub fn radius_bounds(&self) -> (f32, f32) {
        let half = self.displacement * 0.5;
        (self.radius * (1.0 - half), self.radius * (1.0 + half))
    }
}

/// Per-vertex radius multipliers, indexed like the vertex grid.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplacementGrid {
    width_segments: u32,
    height_segments: u32,
    values: Vec<f32>,
}

impl DisplacementGrid {
    /// Draw a grid of multipliers with magnitude `displacement`.
    ///
    /// # Panics
    ///
    /// Panics if either segment count is zero.
    pub fn sample<R: Rng + ?Sized>(
        rng: &mut R,
        width_segments: u32,
        height_segments: u32,
        displacement: f32,
    ) -> Self {
        assert!(
            width_segments > 0 && height_segments > 0,
            "sphere needs at least one segment in each direction, got {width_segments}x{height_segments}"
        );

        let row = width_segments as usize + 1;
        let mut values = Vec::with_capacity(row * (height_segments as usize + 1));
        let draw = |rng: &mut R| 1.0 + (rng.random::<f32>() - 0.5) * displacement;

        for y in 0..=height_segments {
            let ring_start = values.len();
            if y == 0 || y == height_segments {
                let pole = draw(&mut *rng);
                values.extend(std::iter::repeat_n(pole, row));
                continue;
            }
            for _ in 0..width_segments {
                values.push(draw(&mut *rng));
            }
            values.push(values[ring_start]);
        }

        Self {
            width_segments,
            height_segments,
            values,
        }
    }

    /// A grid with no displacement at all.
    pub fn flat(width_segments: u32, height_segments: u32) -> Self {
        let len = (width_segments as usize + 1) * (height_segments as usize + 1);
        Self {
            width_segments,
            height_segments,
            values: vec![1.0; len],
        }
    }

    /// Multiplier at longitude `x`, latitude `y`.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.values[(y * (self.width_segments + 1) + x) as usize]
    }

    /// All multipliers of latitude ring `y`, including the seam column.
    pub fn ring(&self, y: u32) -> &[f32] {
        let row = self.width_segments as usize + 1;
        let start = y as usize * row;
        &self.values[start..start + row]
    }

    pub fn width_segments(&self) -> u32 {
        self.width_segments
    }

    pub fn height_segments(&self) -> u32 {
        self.height_segments
    }
}

/// Generate a displaced sphere using the thread-local random source.
pub fn generate_displaced_sphere(params: &SphereParams) -> Mesh {
    generate_displaced_sphere_with(params, &mut rand::rng())
}

/// Generate a displaced sphere drawing multipliers from `rng`.
pub fn generate_displaced_sphere_with<R: Rng + ?Sized>(params: &SphereParams, rng: &mut R) -> Mesh {
    let grid = DisplacementGrid::sample(
        rng,
        params.width_segments,
        params.height_segments,
        params.displacement,
    );
    build_sphere(params.radius, &grid)
}

/// Lay out positions, normals and UVs for `grid` at `radius`.
pub fn build_sphere(radius: f32, grid: &DisplacementGrid) -> Mesh {
    let (w, h) = (grid.width_segments(), grid.height_segments());
    let vertex_count = grid.values.len();
    let mut positions = Vec::with_capacity(vertex_count);
    let mut normals = Vec::with_capacity(vertex_count);
    let mut uvs = Vec::with_capacity(vertex_count);

    for y in 0..=h {
        let v = y as f32 / h as f32;
        let phi = v * PI;
        let (sin_phi, cos_phi) = phi.sin_cos();

        for x in 0..=w {
            let u = x as f32 / w as f32;
            let theta = u * TAU;
            let (sin_theta, cos_theta) = theta.sin_cos();

            let r = radius * grid.get(x, y);
            let position = Vec3::new(
                -r * sin_phi * cos_theta,
                r * cos_phi,
                r * sin_phi * sin_theta,
            );

            positions.push(position);
            normals.push(position.normalize_or_zero());
            uvs.push([u, 1.0 - v]);
        }
    }

    Mesh {
        positions,
        normals,
        uvs,
        indices: sphere_indices(w, h),
    }
}

/// Two outward-facing triangles per grid cell.
pub fn sphere_indices(width_segments: u32, height_segments: u32) -> Vec<u32> {
    let mut indices = Vec::with_capacity(6 * width_segments as usize * height_segments as usize);
    for y in 0..height_segments {
        for x in 0..width_segments {
            let first = y * (width_segments + 1) + x;
            let second = first + width_segments + 1;

            indices.extend_from_slice(&[first, second, first + 1]);
            indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const EPS: f32 = 1e-5;

    fn seeded(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn test_vertex_distances_within_displacement_bounds() {
        let cases = [
            SphereParams::default(),
            SphereParams::unit(16, 0.5),
            SphereParams {
                radius: 4.0,
                width_segments: 24,
                height_segments: 12,
                displacement: 0.2,
            },
        ];
        for (seed, params) in cases.iter().enumerate() {
            let mesh = generate_displaced_sphere_with(params, &mut seeded(seed as u64));
            let (lo, hi) = params.radius_bounds();
            for p in &mesh.positions {
                let d = p.length();
                assert!(
                    d >= lo - EPS * params.radius && d <= hi + EPS * params.radius,
                    "vertex distance {d} outside [{lo}, {hi}] for {params:?}"
                );
            }
        }
    }

    #[test]
    fn test_seam_column_matches_first_column() {
        let grid = DisplacementGrid::sample(&mut seeded(7), 32, 20, 0.5);
        for y in 0..=20 {
            assert_eq!(
                grid.get(0, y),
                grid.get(32, y),
                "seam mismatch on ring {y}"
            );
        }
    }

    #[test]
    fn test_seam_vertices_coincide() {
        let params = SphereParams::unit(16, 0.5);
        let mesh = generate_displaced_sphere_with(&params, &mut seeded(3));
        let row = 17;
        for y in 0..=16 {
            let first = mesh.positions[y * row];
            let last = mesh.positions[y * row + 16];
            assert!(
                (first - last).length() < 1e-5,
                "ring {y}: seam vertices {first} and {last} differ"
            );
        }
    }

    #[test]
    fn test_pole_rings_share_single_draw() {
        let grid = DisplacementGrid::sample(&mut seeded(11), 16, 16, 0.5);
        for y in [0, 16] {
            let ring = grid.ring(y);
            assert!(
                ring.iter().all(|&v| v == ring[0]),
                "pole ring {y} has more than one displacement value"
            );
        }
    }

    #[test]
    fn test_interior_rings_vary() {
        let grid = DisplacementGrid::sample(&mut seeded(5), 16, 16, 0.5);
        let ring = grid.ring(8);
        assert!(
            ring[..16].iter().any(|&v| v != ring[0]),
            "interior ring should use independent draws"
        );
    }

    #[test]
    fn test_pole_collapses_to_point() {
        let mesh = generate_displaced_sphere_with(&SphereParams::unit(12, 0.5), &mut seeded(1));
        let north = &mesh.positions[..13];
        for p in north {
            assert!((*p - north[0]).length() < 1e-5, "north pole is not a point");
            assert!(p.x.abs() < 1e-5 && p.z.abs() < 1e-5);
        }
    }

    #[test]
    fn test_index_count_and_bounds() {
        for (w, h) in [(1, 1), (16, 16), (100, 100), (7, 3)] {
            let indices = sphere_indices(w, h);
            assert_eq!(indices.len(), (6 * w * h) as usize);
            let limit = (w + 1) * (h + 1);
            assert!(
                indices.iter().all(|&i| i < limit),
                "index out of range for {w}x{h}"
            );
        }
    }

    #[test]
    fn test_generated_mesh_is_valid() {
        let params = SphereParams::default();
        let mesh = generate_displaced_sphere(&params);
        assert_eq!(mesh.validate(), Ok(()));
        assert_eq!(mesh.vertex_count(), params.vertex_count());
        assert_eq!(mesh.indices.len(), params.index_count());
    }

    #[test]
    fn test_normals_are_unit_and_radial() {
        let mesh = generate_displaced_sphere_with(&SphereParams::unit(16, 0.5), &mut seeded(9));
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!((p.normalize() - *n).length() < 1e-5);
        }
    }

    #[test]
    fn test_uvs_follow_grid() {
        let mesh = build_sphere(1.0, &DisplacementGrid::flat(4, 2));
        assert_eq!(mesh.uvs[0], [0.0, 1.0]);
        assert_eq!(mesh.uvs[4], [1.0, 1.0]);
        assert_eq!(mesh.uvs[5 * 2 + 2], [0.5, 0.0]);
    }

    #[test]
    fn test_flat_grid_matches_sign_convention() {
        // Equator, theta = 0 lies on -X; theta = 90 degrees on +Z.
        let mesh = build_sphere(2.0, &DisplacementGrid::flat(4, 2));
        let equator = 5;
        assert!((mesh.positions[equator] - Vec3::new(-2.0, 0.0, 0.0)).length() < EPS);
        assert!((mesh.positions[equator + 1] - Vec3::new(0.0, 0.0, 2.0)).length() < EPS);
        assert!((mesh.positions[0] - Vec3::new(0.0, 2.0, 0.0)).length() < EPS);
    }

    #[test]
    fn test_triangles_face_outward() {
        let mesh = build_sphere(1.0, &DisplacementGrid::flat(16, 16));
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| mesh.positions[tri[i] as usize]);
            let normal = (b - a).cross(c - a);
            if normal.length() < 1e-8 {
                continue; // degenerate pole triangle
            }
            let centroid = (a + b + c) / 3.0;
            assert!(
                normal.dot(centroid) > 0.0,
                "triangle {tri:?} faces inward"
            );
        }
    }

    #[test]
    #[should_panic(expected = "at least one segment")]
    fn test_zero_segments_rejected() {
        DisplacementGrid::sample(&mut seeded(0), 0, 4, 0.1);
    }
}
