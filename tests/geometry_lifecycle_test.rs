use cgmath::Vector3;
use pick_viewer::{
    GeometryBuffer, SceneObject, Shape, ViewerConfig,
    data_structures::{geometry::BufferState, vertex::Vertex},
    gpu::BufferUsage,
    scene::{ModelControls, Scene, StockTextures, stock_scene},
};

use crate::common::test_utils::{MockBackend, MockPass};

mod common;

fn triangle() -> (Vec<Vertex>, Vec<u32>) {
    let vertex = |x: f32, y: f32| Vertex {
        position: [x, y, 0.0],
        tex_coords: [0.0, 0.0],
        normal: [0.0, 0.0, 1.0],
    };
    (vec![vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0)], vec![0, 1, 2])
}

#[test]
fn stock_scene_owns_two_buffers_per_object() {
    let backend = MockBackend::new();
    {
        let scene = stock_scene(&backend, &ViewerConfig::default(), StockTextures::default())
            .unwrap();
        assert_eq!(scene.len(), 3);
        assert_eq!(backend.live(), 6);
        assert!(scene.objects().all(|(_, o)| o.geometry().is_ready()));
    }
    assert_eq!(backend.live(), 0, "dropping the scene frees every buffer");
}

#[test]
fn reinitialising_replaces_instead_of_leaking() {
    let backend = MockBackend::new();
    let (vertices, indices) = triangle();
    let mut geometry = GeometryBuffer::new();

    for _ in 0..5 {
        geometry.initialise(&backend, "tri", &vertices, &indices).unwrap();
        assert_eq!(backend.live(), 2);
    }
    assert_eq!(backend.created(), 10);
    assert_eq!(geometry.index_count(), 3);
}

#[test]
fn failed_index_upload_frees_the_vertex_buffer() {
    let backend = MockBackend::new();
    backend.fail_on.set(Some(BufferUsage::Index));
    let (vertices, indices) = triangle();
    let mut geometry = GeometryBuffer::<MockBackend>::new();

    assert!(geometry.initialise(&backend, "tri", &vertices, &indices).is_err());
    assert_eq!(backend.created(), 1);
    assert_eq!(backend.live(), 0);
    assert_eq!(geometry.state(), BufferState::Unallocated);

    let mut pass = MockPass::default();
    geometry.draw(&mut pass);
    assert!(pass.draws.is_empty());
}

#[test]
fn empty_geometry_is_refused_without_touching_the_gpu() {
    let backend = MockBackend::new();
    let (vertices, _) = triangle();
    let mut geometry = GeometryBuffer::<MockBackend>::new();

    assert!(geometry.initialise(&backend, "empty", &vertices, &[]).is_err());
    assert!(geometry.initialise(&backend, "empty", &[], &[0, 1, 2]).is_err());
    assert_eq!(backend.created(), 0);
    assert!(!geometry.is_ready());
}

#[test]
fn initialising_a_ready_buffer_with_empty_data_unallocates_it() {
    let backend = MockBackend::new();
    let (vertices, indices) = triangle();
    let mut geometry = GeometryBuffer::new();
    geometry.initialise(&backend, "tri", &vertices, &indices).unwrap();
    assert_eq!(backend.live(), 2);

    assert!(geometry.initialise(&backend, "tri", &[], &[]).is_err());

    let mut pass = MockPass::default();
    geometry.draw(&mut pass);
    assert_eq!(geometry.state(), BufferState::Unallocated);
    assert_eq!(geometry.index_count(), 0);
    assert!(pass.draws.is_empty());
    assert_eq!(backend.live(), 0);
}

#[test]
fn releasing_twice_is_the_same_as_once() {
    let backend = MockBackend::new();
    let (vertices, indices) = triangle();
    let mut geometry = GeometryBuffer::new();
    geometry.initialise(&backend, "tri", &vertices, &indices).unwrap();

    geometry.release();
    geometry.release();
    assert_eq!(backend.live(), 0);
    assert_eq!(geometry.index_count(), 0);

    geometry.initialise(&backend, "tri", &vertices, &indices).unwrap();
    let mut pass = MockPass::default();
    geometry.draw(&mut pass);
    assert_eq!(pass.draws.len(), 1);
    assert_eq!(pass.draws[0].index_count, 3);
}

#[test]
fn buffers_are_labelled_after_their_object() {
    let backend = MockBackend::new();
    let _scene = stock_scene(&backend, &ViewerConfig::default(), StockTextures::default()).unwrap();

    let labels = backend.labels.borrow();
    assert_eq!(labels[0], "Earth Vertex Buffer");
    assert_eq!(labels[1], "Earth Index Buffer");
    assert!(labels.iter().any(|l| l == "Skybox Index Buffer"));
}

#[test]
fn model_controls_leave_the_skybox_alone() {
    let backend = MockBackend::new();
    let mut scene =
        stock_scene(&backend, &ViewerConfig::default(), StockTextures::default()).unwrap();
    let skybox_before = scene
        .objects()
        .find(|(_, o)| o.shape().is_skybox())
        .map(|(_, o)| o.transform)
        .unwrap();

    let mut controls = ModelControls::default();
    controls.scale_by(-10.0);
    controls.rotate(Vector3::new(0.3, 0.0, 0.0));
    controls.apply(&mut scene);

    assert_eq!(controls.scaling, ModelControls::MIN_SCALING);
    for (_, object) in scene.objects() {
        if object.shape().is_skybox() {
            assert_eq!(object.transform, skybox_before);
        } else {
            assert_eq!(object.transform, controls.transform());
        }
    }
}

#[test]
fn skybox_refuses_a_pick_colour() {
    let backend = MockBackend::new();
    let mut skybox = SceneObject::new(&backend, "Skybox", Shape::Skybox { size: 20.0 }).unwrap();

    skybox.set_pick_id(0, 0, 255);

    assert_eq!(skybox.pick_id(), None);
    assert!(!skybox.matches([0, 0, 255]));
}

#[test]
fn retagging_an_object_moves_its_pick_colour() {
    let backend = MockBackend::new();
    let mut sphere = SceneObject::new(&backend, "Ball", Shape::Sphere { radius: 1.0 }).unwrap();

    sphere.set_pick_id(10, 20, 30);
    sphere.set_pick_id(40, 50, 60);

    assert!(sphere.matches([40, 50, 60]));
    assert!(!sphere.matches([10, 20, 30]));
}

#[test]
fn shared_pick_colours_resolve_to_the_first_object() {
    let backend = MockBackend::new();
    let mut scene = Scene::new();
    let mut first = SceneObject::new(&backend, "first", Shape::Sphere { radius: 1.0 }).unwrap();
    first.set_pick_id(7, 7, 7);
    let mut second = SceneObject::new(
        &backend,
        "second",
        Shape::Cuboid {
            size: Vector3::new(1.0, 1.0, 1.0),
        },
    )
    .unwrap();
    second.set_pick_id(7, 7, 7);

    let first = scene.add(first);
    scene.add(second);

    assert_eq!(scene.find_by_colour([7, 7, 7]), Some(first));
    assert_eq!(scene.find_by_colour([0, 0, 0]), None);
}
