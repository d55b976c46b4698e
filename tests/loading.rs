use nalgebra::Vector3;
use objviewer::io::config::Config;
use objviewer::io::loader::{LoadError, load, load_geometry, load_model, spawn_geometry_load, spawn_load};
use objviewer::pipeline::render_loop::{ModelOrientation, RenderLoop};
use objviewer::pipeline::software::SoftwareBackend;
use objviewer::scene::camera::Camera;
use objviewer::scene::palette::Palette;
use objviewer::ui::input::{OrientationTracker, RotationDelta};
use std::fs;
use std::path::PathBuf;

fn asset(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets").join(name)
}

/// Writes `contents` to a file unique to this test under the system temp dir.
fn temp_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("objviewer-tests-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn cube_loads_with_two_groups() {
    let model = load_model(asset("cube.obj"), asset("cube.mtl")).unwrap();

    assert_eq!(model.mesh.data.position_count(), 8);
    assert_eq!(model.mesh.data.normal_count(), 6);
    assert_eq!(model.materials.len(), 2);

    let order: Vec<_> = model.mesh.groups.iter().map(|g| g.material.clone()).collect();
    assert_eq!(order, vec![Some("Body".to_string()), Some("Cap".to_string())]);
    assert_eq!(model.mesh.groups.triangle_count(), 12);
    assert_eq!(model.mesh.groups.get(Some("Body")).map(<[u32]>::len), Some(24));

    let body = &model.materials["Body"];
    assert_eq!(body.diffuse, Some(Vector3::new(0.2, 0.4, 0.8)));
    assert_eq!(body.illumination_model, Some(2));
}

#[test]
fn every_index_is_within_the_position_range() {
    let mesh = load_geometry(asset("cube.obj")).unwrap();
    let n = mesh.data.position_count() as u32;
    assert_eq!(mesh.data.positions.len(), 24);
    assert_eq!(mesh.indices.len(), 36);
    assert!(mesh.indices.iter().all(|&i| i < n));
}

#[test]
fn grouped_and_plain_paths_agree_on_triangles() {
    let text = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
usemtl A
f 1 2 3
f 1 2 3 4 5
usemtl B
f 2 3 4
";
    let geometry = temp_file("agree.obj", text);
    let material = temp_file("agree.mtl", "newmtl A\nKd 1 0 0\n");

    let plain = load_geometry(&geometry).unwrap();
    let grouped = load_model(&geometry, &material).unwrap();

    assert_eq!(plain.indices.len() / 3, grouped.mesh.groups.triangle_count());
    assert_eq!(grouped.mesh.groups.len(), 3);
    assert_eq!(grouped.mesh.groups.get(None), Some(&[0, 1, 2, 0, 2, 3][..]));
}

#[test]
fn missing_material_file_aborts_the_load() {
    let geometry = temp_file("orphan.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
    let err = load_model(&geometry, asset("missing.mtl")).unwrap_err();
    assert!(matches!(err, LoadError::Read { .. }));
    assert!(err.to_string().contains("missing.mtl"));
}

#[test]
fn background_loads_resolve_through_the_handle() {
    let mesh = spawn_geometry_load(asset("cube.obj")).wait().unwrap();
    assert_eq!(mesh.indices.len(), 36);

    let model = spawn_load(asset("cube.obj"), None).wait().unwrap();
    assert_eq!(model.mesh.groups.len(), 1);
    assert!(model.materials.is_empty());

    assert!(spawn_load(asset("nope.obj"), None).wait().is_err());
}

#[test]
fn headless_frame_draws_the_cube() {
    let model = load(&asset("cube.obj"), Some(asset("cube.mtl").as_path())).unwrap();
    let config = Config::default();

    let mut backend = SoftwareBackend::new(64, 48, 1, Vector3::new(1.0, 1.0, 1.0));
    let mut render_loop = RenderLoop::new(
        model,
        Palette::from(&config.palette),
        Camera::from_config(&config.camera, 64.0 / 48.0),
        ModelOrientation::new(config.orientation.model_scale),
    );
    let mut tracker = OrientationTracker::new(config.orientation.sensitivity);
    tracker.accumulate(RotationDelta::new(0.7, 0.5));

    let stats = render_loop.frame(&mut backend, &mut tracker);
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(stats.triangles, 12);

    let white = Vector3::new(1.0, 1.0, 1.0);
    let mut covered = 0;
    for y in 0..48 {
        for x in 0..64 {
            if backend.framebuffer.get_pixel(x, y) != Some(white) {
                covered += 1;
            }
        }
    }
    assert!(covered > 0, "cube should cover part of the frame");
    assert!(covered < 64 * 48, "background should remain visible");
}
