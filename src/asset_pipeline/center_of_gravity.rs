use anyhow::{bail, Context};
use glam::DVec3;

use crate::scene_graph::Mesh;

/// Control points in index order.
pub fn extract_vertices(mesh: &Mesh) -> Vec<DVec3> {
    mesh.control_points().to_vec()
}

/// Unweighted mean of the given positions. `None` when there are none.
pub fn center_of_gravity(vertices: &[DVec3]) -> Option<DVec3> {
    if vertices.is_empty() {
        return None;
    }

    let sum: DVec3 = vertices.iter().copied().sum();
    Some(sum / vertices.len() as f64)
}

/// Moves every control point so that the mean of the mesh sits at the origin and returns the
/// mean that was subtracted.
pub fn recenter_mesh(mesh: &mut Mesh) -> anyhow::Result<DVec3> {
    let mut vertices = extract_vertices(mesh);

    let Some(center) = center_of_gravity(&vertices) else {
        bail!("Mesh {} has no control points to center", mesh.name);
    };

    for vertex in vertices.iter_mut() {
        *vertex -= center;
    }

    mesh.set_control_points(vertices)
        .with_context(|| format!("Failed to write centered points of {}", mesh.name))?;

    Ok(center)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::scene_graph::mesh::ControlPointPrecision;

    fn mesh(points: &[[f64; 3]]) -> Mesh {
        let points = points.iter().map(|&p| DVec3::from_array(p)).collect();
        Mesh::new("Test", 1, points, ControlPointPrecision::F64)
    }

    fn assert_points_eq(actual: &[DVec3], expected: &[DVec3]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!(a.abs_diff_eq(*e, 1e-9), "{} != {}", a, e);
        }
    }

    #[test]
    fn centers_the_reference_triangle() {
        let mut triangle = mesh(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [1.0, 2.0, 0.0]]);

        let center = recenter_mesh(&mut triangle).unwrap();

        assert!(center.abs_diff_eq(DVec3::new(1.0, 2.0 / 3.0, 0.0), 1e-12));
        assert_points_eq(
            triangle.control_points(),
            &[
                DVec3::new(-1.0, -2.0 / 3.0, 0.0),
                DVec3::new(1.0, -2.0 / 3.0, 0.0),
                DVec3::new(0.0, 4.0 / 3.0, 0.0),
            ],
        );
        assert!(triangle.is_dirty());
    }

    #[test]
    fn centered_mean_is_zero() {
        let mut cloud = mesh(&[
            [13.5, -2.25, 100.0],
            [-7.0, 4.0, 99.5],
            [0.125, 0.0, 101.0],
            [1e3, -1e3, 0.5],
            [42.0, 42.0, 42.0],
        ]);

        recenter_mesh(&mut cloud).unwrap();
        let mean = center_of_gravity(cloud.control_points()).unwrap();

        assert_abs_diff_eq!(mean.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(mean.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(mean.z, 0.0, epsilon = 1e-9);
        assert_eq!(cloud.control_points_count(), 5);
    }

    #[test]
    fn recentering_twice_is_a_no_op() {
        let mut quad = mesh(&[
            [3.0, 1.0, -2.0],
            [5.0, 1.0, -2.0],
            [5.0, 4.0, -2.0],
            [3.0, 4.0, -2.0],
        ]);

        recenter_mesh(&mut quad).unwrap();
        let once = quad.control_points().to_vec();
        let second_center = recenter_mesh(&mut quad).unwrap();

        assert!(second_center.abs_diff_eq(DVec3::ZERO, 1e-12));
        assert_points_eq(quad.control_points(), &once);
    }

    #[test]
    fn single_point_collapses_to_origin() {
        let mut point = mesh(&[[4.0, -5.0, 6.0]]);

        assert_eq!(recenter_mesh(&mut point).unwrap(), DVec3::new(4.0, -5.0, 6.0));
        assert_eq!(point.control_points(), &[DVec3::ZERO]);
    }

    #[test]
    fn empty_mesh_is_an_error() {
        let mut empty = mesh(&[]);

        assert_eq!(center_of_gravity(&[]), None);
        assert!(recenter_mesh(&mut empty).is_err());
        assert!(!empty.is_dirty());
    }

    #[test]
    fn extraction_keeps_index_order() {
        let points = [[1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [0.0, 0.0, 0.0]];
        let vertices = extract_vertices(&mesh(&points));

        assert_eq!(vertices, vec![DVec3::ONE, DVec3::ONE, DVec3::ZERO]);
    }
}
