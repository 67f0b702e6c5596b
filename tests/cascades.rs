use glam::{Mat4, Vec3};
use umbra::csm::{compute_splits, fit_light_matrix, world_corners, FitSettings, LightSpace};
use umbra::{CascadedShadowMap, CsmConfig, Light};

const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;
const SHADOW_SIZE: u32 = 1024;

fn camera_view_proj(eye: Vec3, target: Vec3) -> Mat4 {
    camera_view_proj_range(eye, target, NEAR, FAR)
}

fn camera_view_proj_range(eye: Vec3, target: Vec3, near: f32, far: f32) -> Mat4 {
    let view = Mat4::look_at_rh(eye, target, Vec3::Y);
    let proj = Mat4::perspective_rh_gl(45.0_f32.to_radians(), 1280.0 / 720.0, near, far);
    proj * view
}

fn fit_all(view_proj: &Mat4, light: &Light, count: usize) -> (Vec<[Vec3; 4]>, Vec<LightSpace>) {
    fit_all_range(view_proj, light, count, NEAR, FAR)
}

fn fit_all_range(
    view_proj: &Mat4,
    light: &Light,
    count: usize,
    near: f32,
    far: f32,
) -> (Vec<[Vec3; 4]>, Vec<LightSpace>) {
    let splits = compute_splits(near, far, count);
    let quads = world_corners(view_proj, &splits, near, far);
    let fits = quads
        .windows(2)
        .map(|pair| fit_light_matrix(&pair[0], &pair[1], light, SHADOW_SIZE, SHADOW_SIZE, &FitSettings::default()))
        .collect();
    (quads, fits)
}

fn to_ndc(matrix: &Mat4, p: Vec3) -> Vec3 {
    let clip = *matrix * p.extend(1.0);
    clip.truncate() / clip.w
}

/// Shadow map texel coordinate of a world point.
fn texel_coord(fit: &LightSpace, p: Vec3) -> (f32, f32) {
    let ndc = to_ndc(&fit.matrix(), p);
    (
        (ndc.x * 0.5 + 0.5) * SHADOW_SIZE as f32,
        (ndc.y * 0.5 + 0.5) * SHADOW_SIZE as f32,
    )
}

#[test]
fn every_cascade_contains_its_corners() {
    let cameras = [
        (Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO),
        (Vec3::new(-12.0, 8.0, 3.0), Vec3::new(4.0, 0.0, -20.0)),
        (Vec3::new(30.0, 1.0, -30.0), Vec3::new(31.0, 1.5, -40.0)),
    ];
    let lights = [
        Light::directional("sun", Vec3::new(3.0, -4.0, 0.0)),
        Light::directional("sun", Vec3::NEG_Y),
        Light::directional("sun", Vec3::new(-0.5, -1.0, -0.3)),
    ];

    for (eye, target) in cameras {
        let vp = camera_view_proj(eye, target);
        for light in &lights {
            for count in [1, 2, 4, 5] {
                let (quads, fits) = fit_all(&vp, light, count);
                assert_eq!(fits.len(), count);
                for (i, fit) in fits.iter().enumerate() {
                    let m = fit.matrix();
                    for corner in quads[i].iter().chain(quads[i + 1].iter()) {
                        let ndc = to_ndc(&m, *corner);
                        assert!(
                            ndc.abs().max_element() <= 1.0 + 1e-4,
                            "cascade {i} of {count}: corner {corner} clipped at {ndc}"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn sub_texel_camera_motion_keeps_the_texel_grid() {
    // A tighter depth range than the other tests keeps the far plane of the
    // f32 camera projection precise to well below a texel.
    let (near, far) = (0.5, 60.0);
    let light = Light::directional("sun", Vec3::new(-0.5, -1.0, -0.3));
    let eye = Vec3::new(3.0, 4.0, 10.0);
    let target = Vec3::new(0.0, 0.0, -10.0);
    let (_, before) = fit_all_range(&camera_view_proj_range(eye, target, near, far), &light, 4, near, far);

    // a fraction of the smallest cascade's texel
    let step = before[0].texel_world_size.x * 0.37;
    let offset = Vec3::new(step, 0.0, step * 0.5);
    let moved = camera_view_proj_range(eye + offset, target + offset, near, far);
    let (_, after) = fit_all_range(&moved, &light, 4, near, far);

    let probe = Vec3::new(1.25, 0.5, -3.75);
    for (a, b) in before.iter().zip(&after) {
        let ua = texel_coord(a, probe);
        let ub = texel_coord(b, probe);
        for shift in [ua.0 - ub.0, ua.1 - ub.1] {
            assert!(shift.abs() <= 1.0 + 1e-2, "grid moved by {shift} texels");
            assert!(
                (shift - shift.round()).abs() < 2e-2,
                "grid moved by a fraction of a texel: {shift}"
            );
        }
        assert!((a.texel_world_size - b.texel_world_size).abs().max_element() < a.texel_world_size.x * 1e-4);
    }
}

#[test]
fn four_cascade_scenario() {
    let splits = compute_splits(NEAR, FAR, 4);
    let expected = [12.8186, 26.6061, 46.4039, 100.0];
    assert_eq!(splits.len(), 4);
    for (got, want) in splits.iter().zip(expected) {
        assert!((got - want).abs() < 1e-2, "split {got} != {want}");
    }
    assert_eq!(splits[3], FAR);

    let light = Light::directional("sun", Vec3::new(0.0, -1.0, 0.0));
    let vp = camera_view_proj(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO);
    let (_, fits) = fit_all(&vp, &light, 4);
    let area = |fit: &LightSpace| fit.extent.x * fit.extent.y;
    assert!(area(&fits[0]) < area(&fits[3]));
    for pair in fits.windows(2) {
        assert!(area(&pair[0]) < area(&pair[1]));
    }
}

#[test]
fn manager_matches_free_functions() {
    let light = Light::directional("sun", Vec3::new(3.0, -4.0, 0.0));
    let config = CsmConfig {
        cascade_count: 4,
        shadow_map_width: SHADOW_SIZE,
        shadow_map_height: SHADOW_SIZE,
        ..CsmConfig::default()
    };
    let vp = camera_view_proj(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO);

    let mut csm = CascadedShadowMap::new(config);
    csm.update(&vp, &light);
    let (_, fits) = fit_all(&vp, &light, 4);

    assert_eq!(csm.splits(), &compute_splits(NEAR, FAR, 4)[..]);
    for (m, fit) in csm.matrices().iter().zip(&fits) {
        assert!(m.abs_diff_eq(fit.matrix(), 1e-6));
    }
}
