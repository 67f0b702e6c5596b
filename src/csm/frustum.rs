use glam::{DMat4, DVec4, Mat4, Vec3};

/// Four world-space corners of a plane slicing the view frustum, in NDC
/// order `(-1,-1)`, `(-1,1)`, `(1,-1)`, `(1,1)`.
pub type FrustumQuad = [Vec3; 4];

const NDC_CORNERS: [(f64, f64); 4] = [(-1.0, -1.0), (-1.0, 1.0), (1.0, -1.0), (1.0, 1.0)];

fn unproject(inv_view_proj: &DMat4, x: f64, y: f64, z: f64) -> Vec3 {
    let p = *inv_view_proj * DVec4::new(x, y, z, 1.0);
    (p.truncate() / p.w).as_vec3()
}

/// World-space corners of the near plane and of every split plane.
///
/// `view_proj` uses the OpenGL clip convention (NDC depth in `[-1, 1]`).
/// Returns `splits.len() + 1` quads: quad 0 is the near plane and quad `i + 1`
/// sits at `splits[i]`, so cascade `i` is bounded by quads `i` and `i + 1`.
pub fn world_corners(view_proj: &Mat4, splits: &[f32], near: f32, far: f32) -> Vec<FrustumQuad> {
    let mut quads = Vec::with_capacity(splits.len() + 1);

    // In f32 the far-plane w of a perspective unprojection cancels down to
    // a few significant digits. Wide cameras also have legitimately tiny
    // determinants, so only an exact zero counts as singular.
    let view_proj = view_proj.as_dmat4();
    let det = view_proj.determinant();
    let inv = view_proj.inverse();
    if det == 0.0 || !det.is_finite() || !inv.is_finite() {
        tracing::warn!("view-projection matrix is not invertible, frustum corners collapse");
        quads.resize(splits.len() + 1, [Vec3::ZERO; 4]);
        return quads;
    }

    let mut near_quad = [Vec3::ZERO; 4];
    let mut edges = [Vec3::ZERO; 4];
    for (i, &(x, y)) in NDC_CORNERS.iter().enumerate() {
        near_quad[i] = unproject(&inv, x, y, -1.0);
        edges[i] = unproject(&inv, x, y, 1.0) - near_quad[i];
    }
    quads.push(near_quad);

    let depth = far - near;
    let degenerate = depth.is_nan() || depth.abs() <= f32::EPSILON;
    if degenerate {
        tracing::warn!(near, far, "near and far planes coincide, all split planes sit on the near plane");
    }

    for &split in splits {
        let ratio = if degenerate { 0.0 } else { (split - near) / depth };
        let mut quad = near_quad;
        for (corner, edge) in quad.iter_mut().zip(&edges) {
            *corner += *edge * ratio;
        }
        quads.push(quad);
    }

    quads
}

/// The 8 corners bounding cascade `index`, near quad first.
pub fn cascade_corners(quads: &[FrustumQuad], index: usize) -> Option<[Vec3; 8]> {
    let near = quads.get(index)?;
    let far = quads.get(index + 1)?;
    let mut corners = [Vec3::ZERO; 8];
    corners[..4].copy_from_slice(near);
    corners[4..].copy_from_slice(far);
    Some(corners)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csm::compute_splits;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    fn camera_view_proj() -> Mat4 {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh_gl(45.0_f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
        proj * view
    }

    #[test]
    fn quad_count_matches_cascades() {
        let vp = camera_view_proj();
        for count in [1, 2, 4, 8] {
            let splits = compute_splits(0.1, 100.0, count);
            let quads = world_corners(&vp, &splits, 0.1, 100.0);
            assert_eq!(quads.len(), count + 1);
            assert!(quads.iter().all(|q| q.len() == 4));
        }
    }

    #[test]
    fn identity_round_trip() {
        let quads = world_corners(&Mat4::IDENTITY, &[1.0], -1.0, 1.0);
        let expected = [
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
        ];
        for (got, want) in quads[0].iter().zip(&expected) {
            assert!(close(*got, *want), "{got} != {want}");
        }
        // the only split is the far plane
        assert!(close(quads[1][3], Vec3::ONE));
    }

    #[test]
    fn split_planes_sit_at_their_view_depth() {
        let view = Mat4::look_at_rh(Vec3::new(3.0, 1.0, -2.0), Vec3::new(0.0, 0.0, -10.0), Vec3::Y);
        let proj = Mat4::perspective_rh_gl(60.0_f32.to_radians(), 1.5, 0.5, 50.0);
        let splits = compute_splits(0.5, 50.0, 4);
        let quads = world_corners(&(proj * view), &splits, 0.5, 50.0);

        for (quad, &split) in quads[1..].iter().zip(&splits) {
            for corner in quad {
                let view_depth = -view.transform_point3(*corner).z;
                assert!((view_depth - split).abs() < split * 1e-3, "{view_depth} vs {split}");
            }
        }
        let near_depth = -view.transform_point3(quads[0][0]).z;
        assert!((near_depth - 0.5).abs() < 1e-3);
    }

    #[test]
    fn coincident_planes_do_not_divide_by_zero() {
        let quads = world_corners(&camera_view_proj(), &[5.0, 10.0], 1.0, 1.0);
        assert_eq!(quads.len(), 3);
        assert!(quads.iter().flatten().all(|c| c.is_finite()));
        assert_eq!(quads[1], quads[0]);
    }

    #[test]
    fn singular_matrix_yields_collapsed_quads() {
        let quads = world_corners(&Mat4::ZERO, &[1.0, 2.0], 0.1, 2.0);
        assert_eq!(quads.len(), 3);
        assert!(quads.iter().flatten().all(|c| *c == Vec3::ZERO));
    }

    #[test]
    fn wide_orthographic_camera_is_invertible() {
        // determinant around 1e-14, well below f32 epsilon squared
        let proj = Mat4::orthographic_rh_gl(-5e4, 5e4, -5e4, 5e4, 1.0, 1e5);
        let quads = world_corners(&proj, &[1e5], 1.0, 1e5);
        assert_eq!(quads.len(), 2);

        let rel = |got: Vec3, want: Vec3| (got - want).abs().max_element() <= want.abs().max_element() * 1e-4;
        assert!(rel(quads[0][0], Vec3::new(-5e4, -5e4, -1.0)), "{}", quads[0][0]);
        assert!(rel(quads[0][3], Vec3::new(5e4, 5e4, -1.0)), "{}", quads[0][3]);
        assert!(rel(quads[1][3], Vec3::new(5e4, 5e4, -1e5)), "{}", quads[1][3]);
    }

    #[test]
    fn non_finite_matrix_yields_collapsed_quads() {
        let mut m = Mat4::IDENTITY;
        m.x_axis.x = f32::NAN;
        let quads = world_corners(&m, &[1.0], 0.1, 1.0);
        assert!(quads.iter().flatten().all(|c| *c == Vec3::ZERO));
    }

    #[test]
    fn cascade_corner_bounds() {
        let quads = world_corners(&camera_view_proj(), &[10.0, 100.0], 0.1, 100.0);
        let corners = cascade_corners(&quads, 1).unwrap();
        assert_eq!(corners[0], quads[1][0]);
        assert_eq!(corners[7], quads[2][3]);
        assert!(cascade_corners(&quads, 2).is_none());
    }
}
