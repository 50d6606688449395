#![cfg(feature = "integration-tests")]

use cgmath::Vector3;
use illumination::{Mesh, MeshVertex, Primitive, PrimitiveMode, Transform};

mod common;

const EYE: [f32; 3] = [0.0, 0.0, 3.0];

fn centre(image: &image::RgbaImage) -> image::Rgba<u8> {
    *image.get_pixel(common::WIDTH / 2, common::HEIGHT / 2)
}

#[tokio::test]
async fn should_light_the_front_face_of_a_cube() {
    let Some((device, queue)) = common::gpu().await else {
        return;
    };
    let mesh = Mesh::from_primitive(&device, Primitive::cube(), Transform::new()).unwrap();
    let mut object = common::white_object(&device, &queue, &mesh);

    let image =
        common::render_offscreen(&device, &queue, &mut object, PrimitiveMode::Triangles, EYE).await;

    let pixel = centre(&image);
    assert_ne!(pixel, common::BACKGROUND);
    // white cube under white light: no channel dominates
    assert_eq!(pixel[0], pixel[1]);
    assert_eq!(pixel[1], pixel[2]);
    assert_eq!(*image.get_pixel(0, 0), common::BACKGROUND);
}

#[tokio::test]
async fn should_not_draw_patches_of_an_unsupported_size() {
    let Some((device, queue)) = common::gpu().await else {
        return;
    };
    let mesh = Mesh::from_primitive(&device, Primitive::cube(), Transform::new()).unwrap();
    let mut object = common::white_object(&device, &queue, &mesh);

    for mode in [PrimitiveMode::Patches(24), PrimitiveMode::Patches(81)] {
        let image = common::render_offscreen(&device, &queue, &mut object, mode, EYE).await;
        assert!(
            image.pixels().all(|p| *p == common::BACKGROUND),
            "{} drew something",
            mode
        );
    }
}

#[tokio::test]
async fn should_tessellate_a_bilinear_patch() {
    let Some((device, queue)) = common::gpu().await else {
        return;
    };
    let normal = [0.0, 0.0, 1.0];
    let white = [1.0; 4];
    // one 2x2 patch, row by row
    let corners = [[-0.5, -0.5], [0.5, -0.5], [-0.5, 0.5], [0.5, 0.5]];
    let vertices = corners
        .iter()
        .map(|&[x, y]| MeshVertex::new([x, y, 0.0], white, [x + 0.5, y + 0.5], normal))
        .collect();
    let mesh = Mesh::new(&device, vertices, Vec::new(), Transform::new()).unwrap();
    let mut object = common::white_object(&device, &queue, &mesh);

    let image =
        common::render_offscreen(&device, &queue, &mut object, PrimitiveMode::Patches(4), EYE)
            .await;
    assert_ne!(centre(&image), common::BACKGROUND);
    assert_eq!(*image.get_pixel(0, 0), common::BACKGROUND);
}

#[tokio::test]
async fn should_draw_points_only_around_vertices() {
    let Some((device, queue)) = common::gpu().await else {
        return;
    };
    let mesh = Mesh::from_primitive(&device, Primitive::cube(), Transform::new()).unwrap();
    let mut object = common::white_object(&device, &queue, &mesh);

    let image =
        common::render_offscreen(&device, &queue, &mut object, PrimitiveMode::Points, EYE).await;

    // the cube's corners project away from the centre of the image
    assert_eq!(centre(&image), common::BACKGROUND);
    assert!(image.pixels().any(|p| *p != common::BACKGROUND));
}

#[tokio::test]
async fn should_keep_each_objects_point_size_within_one_pass() {
    let Some((device, queue)) = common::gpu().await else {
        return;
    };
    let vertex = MeshVertex::new([0.0; 3], [1.0; 4], [0.0; 2], [0.0, 0.0, 1.0]);
    let mesh = Mesh::new(&device, vec![vertex], Vec::new(), Transform::new()).unwrap();
    let mut small = common::object_at(&device, &queue, &mesh, Vector3::new(-0.5, 0.0, 0.0));
    let mut large = common::object_at(&device, &queue, &mesh, Vector3::new(0.5, 0.0, 0.0));

    let mut offscreen = common::Offscreen::new(&device, &queue, EYE);
    offscreen.draw_with(&device, &queue, |pass, shader| {
        small.render_points(&queue, pass, shader, 2.0);
        large.render_points(&queue, pass, shader, 12.0);
    });
    let image = offscreen.read(&device, &queue).await;

    let lit = |columns: std::ops::Range<u32>| {
        image
            .enumerate_pixels()
            .filter(|(x, _, p)| columns.contains(x) && **p != common::BACKGROUND)
            .count()
    };
    let left = lit(0..common::WIDTH / 2);
    let right = lit(common::WIDTH / 2..common::WIDTH);
    assert!(left > 0, "the small point was not drawn");
    assert!(right >= 4 * left, "left {} vs right {} pixels", left, right);
}
