#![cfg(feature = "integration-tests")]

use std::sync::Arc;

use cgmath::{Matrix4, SquareMatrix, Vector3, Zero};
use illumination::{
    Material, Mesh, MeshError, Object, ObjectError, Primitive, PrimitiveMode, Texture, Transform,
    resources::mesh::{GeometryError, IssueKind},
};

mod common;

#[tokio::test]
async fn object_copies_do_not_share_buffers_with_the_source_mesh() {
    let (device, queue) = common::noop_device().await;
    let mesh = Mesh::from_primitive(&device, Primitive::cube(), Transform::new()).unwrap();
    let before = *mesh.transform();

    let mut object = common::white_object(&device, &queue, &mesh);
    object.move_by(Vector3::new(1.0, 2.0, 3.0));
    object.scale_up(Vector3::new(1.0, 1.0, 1.0));

    let copy = &object.meshes()[0];
    assert_ne!(copy.vertex_buffer(), mesh.vertex_buffer());
    assert_ne!(copy.index_buffer(), mesh.index_buffer());
    assert_eq!(copy.vertices(), mesh.vertices());
    assert_eq!(copy.indices(), mesh.indices());
    assert_eq!(*mesh.transform(), before);
    assert_eq!(copy.position(), Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(copy.scale(), Vector3::new(2.0, 2.0, 2.0));
}

#[tokio::test]
async fn object_moves_meshes_by_its_origin_and_pivots_there() {
    let (device, queue) = common::noop_device().await;
    let white = Arc::new(Texture::create_solid(&device, &queue, [255; 4], "white"));
    let origin = Vector3::new(0.0, 0.0, -2.0);
    let first = Mesh::from_primitive(&device, Primitive::cube(), Transform::new()).unwrap();
    let second = Mesh::from_primitive(
        &device,
        Primitive::pyramid(),
        Transform::new().with_rotation(Vector3::new(0.0, 45.0, 0.0)),
    )
    .unwrap();

    let mut object = Object::new(
        &device,
        origin,
        Arc::new(Material::default()),
        white.clone(),
        white,
        &[first, second],
    )
    .unwrap();
    assert_eq!(object.origin(), origin);
    assert_eq!(object.position(), origin);

    object.rotate_around_origin(Vector3::new(0.0, 90.0, 0.0));
    for mesh in object.meshes() {
        assert_eq!(mesh.origin(), origin);
        assert_eq!(mesh.position(), origin);
        assert_eq!(mesh.rotation_around_origin(), Vector3::new(0.0, 90.0, 0.0));
    }
    assert_eq!(object.meshes()[1].rotation(), Vector3::new(0.0, 45.0, 0.0));
}

#[tokio::test]
async fn source_mesh_stays_usable_after_its_object_is_dropped() {
    let (device, queue) = common::noop_device().await;
    let mut mesh = Mesh::from_primitive(&device, Primitive::cube(), Transform::new()).unwrap();
    let vertices = mesh.vertices().to_vec();

    let mut object = common::object_at(&device, &queue, &mesh, Vector3::new(1.0, 0.0, 0.0));
    object.rotate_around_origin(Vector3::new(0.0, 90.0, 0.0));
    drop(object);

    assert_eq!(mesh.vertices(), &vertices[..]);
    assert_eq!(*mesh.transform(), Transform::new());
    let copy = mesh.deep_copy(&device);
    assert_ne!(copy.vertex_buffer(), mesh.vertex_buffer());

    // the source still uploads and draws with its own buffers
    mesh.move_by(Vector3::new(0.0, 0.0, -1.0));
    let mut again = common::white_object(&device, &queue, &mesh);
    for mode in [
        PrimitiveMode::Triangles,
        PrimitiveMode::Points,
        PrimitiveMode::patches(),
    ] {
        common::Offscreen::new(&device, &queue, [0.0, 0.0, 3.0]).draw(&device, &queue, &mut again, mode);
    }
    assert_eq!(again.position(), Vector3::new(0.0, 0.0, -1.0));
}

#[tokio::test]
async fn objects_share_material_and_textures_without_copying() {
    let (device, queue) = common::noop_device().await;
    let mesh = Mesh::from_primitive(&device, Primitive::sphere(8, 12), Transform::new()).unwrap();
    let material = Arc::new(Material::default());
    let white = Arc::new(Texture::create_solid(&device, &queue, [255; 4], "white"));

    let first = Object::new(
        &device,
        Vector3::zero(),
        material.clone(),
        white.clone(),
        white.clone(),
        std::slice::from_ref(&mesh),
    )
    .unwrap();
    let second = Object::new(
        &device,
        Vector3::new(2.0, 0.0, 0.0),
        material.clone(),
        white.clone(),
        white.clone(),
        std::slice::from_ref(&mesh),
    )
    .unwrap();

    assert!(Arc::ptr_eq(first.material(), second.material()));
    let (diffuse, specular) = first.textures();
    assert!(Arc::ptr_eq(diffuse, specular));
    assert!(Arc::ptr_eq(diffuse, &white));
    assert_eq!(Arc::strong_count(&material), 3);
    assert_eq!(Arc::strong_count(&white), 5);

    drop(first);
    drop(second);
    assert_eq!(Arc::strong_count(&material), 1);
    assert_eq!(Arc::strong_count(&white), 1);
}

#[tokio::test]
async fn object_without_meshes_is_rejected() {
    let (device, queue) = common::noop_device().await;
    let white = Arc::new(Texture::create_solid(&device, &queue, [255; 4], "white"));
    let result = Object::new(
        &device,
        Vector3::zero(),
        Arc::new(Material::default()),
        white.clone(),
        white,
        &[],
    );
    assert!(matches!(result, Err(ObjectError::NoMeshes)));
}

#[tokio::test]
async fn model_matrix_follows_the_transform_only_after_a_render() {
    let (device, queue) = common::noop_device().await;
    let mesh = Mesh::from_primitive(&device, Primitive::cube(), Transform::new()).unwrap();
    let mut object = common::white_object(&device, &queue, &mesh);

    object.move_by(Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(object.model_matrix(), Matrix4::identity());

    common::Offscreen::new(&device, &queue, [0.0, 0.0, 3.0]).draw(
        &device,
        &queue,
        &mut object,
        PrimitiveMode::Triangles,
    );
    assert_eq!(
        object.model_matrix(),
        Matrix4::from_translation(Vector3::new(0.0, 0.0, -1.0))
    );
}

#[tokio::test]
async fn mesh_rejects_bad_vertex_data() {
    let (device, _queue) = common::noop_device().await;
    let cube = Primitive::cube();
    assert!(matches!(
        Mesh::new(&device, Vec::new(), Vec::new(), Transform::new()),
        Err(MeshError::NoVertices)
    ));
    assert!(matches!(
        Mesh::new(&device, cube.vertices.clone(), vec![0, 1, 24], Transform::new()),
        Err(MeshError::IndexOutOfRange {
            index: 24,
            vertices: 24
        })
    ));
}

#[tokio::test]
async fn geometry_file_keeps_good_lines_and_reports_bad_ones() {
    let (device, _queue) = common::noop_device().await;
    let path = common::geometry_file(
        "lenient",
        "# two triangles\n\
         v 0 0 0\n\
         v 1 0 0\n\
         v 0 1 0\n\
         v 1 1\n\
         f 1 2 3\n\
         f 2 4 3\n",
    );

    let (mesh, issues) = Mesh::from_file(&device, &path, Transform::new()).unwrap();
    assert_eq!(mesh.vertices().len(), 3);
    assert!(mesh.indices().is_empty());
    assert!(mesh.index_buffer().is_none());
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].line, 5);
    assert_eq!(issues[0].kind, IssueKind::MalformedVertex);
    assert_eq!(
        issues[1].kind,
        IssueKind::IndexOutOfRange {
            index: 4,
            vertices: 3
        }
    );

    let strict = Mesh::from_file_strict(&device, &path, Transform::new());
    assert!(matches!(
        strict,
        Err(MeshError::Geometry(GeometryError::Rejected { ref issues, .. })) if issues.len() == 2
    ));
    std::fs::remove_file(path).unwrap();
}

#[tokio::test]
async fn geometry_file_without_faces_is_an_error() {
    let (device, _queue) = common::noop_device().await;
    let path = common::geometry_file("empty", "v 0 0 0\nv 1 0 0\n");
    assert!(matches!(
        Mesh::from_file(&device, &path, Transform::new()),
        Err(MeshError::Geometry(GeometryError::Empty(_)))
    ));
    std::fs::remove_file(path).unwrap();

    let missing = std::env::temp_dir().join("illumination-does-not-exist.txt");
    assert!(matches!(
        Mesh::from_file(&device, &missing, Transform::new()),
        Err(MeshError::Geometry(GeometryError::Open(..)))
    ));
}

#[tokio::test]
async fn shipped_sample_mesh_loads_cleanly() {
    let (device, _queue) = common::noop_device().await;
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/eight.txt");
    let mesh = Mesh::from_file_strict(&device, path, Transform::new()).unwrap();
    assert_eq!(mesh.vertices().len() % 3, 0);
    assert!(mesh.vertices().len() >= 3 * 1000);
}
