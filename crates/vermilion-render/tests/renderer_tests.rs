//! Frame lifecycle tests for `Renderer2D`, driven by the mock device.

use std::sync::Arc;

use glam::Vec3;
use vermilion_core::{Color, TextureRect};
use vermilion_device::{DeviceCall, MockDevice, RenderDevice, Topology};
use vermilion_render::{DrawStyle, Renderer2D, RendererSettings, Texture};

fn renderer_with(device: &Arc<MockDevice>, settings: RendererSettings) -> Renderer2D {
    let mut renderer =
        Renderer2D::with_settings(Arc::clone(device) as Arc<dyn RenderDevice>, 800, 600, settings);
    renderer.begin();
    assert!(renderer.is_initialized());
    device.clear_calls();
    renderer
}

fn renderer(device: &Arc<MockDevice>) -> Renderer2D {
    renderer_with(device, RendererSettings::default())
}

fn texture(device: &Arc<MockDevice>, renderer: &Renderer2D) -> Texture {
    Texture::new(
        device.as_ref(),
        renderer.pool(),
        16,
        16,
        Default::default(),
    )
}

#[test]
fn test_unavailable_device_leaves_renderer_inert() {
    let device = Arc::new(MockDevice::unavailable());
    let mut renderer = Renderer2D::new(Arc::clone(&device) as Arc<dyn RenderDevice>, 800, 600);

    renderer.begin();
    assert!(!renderer.is_initialized());

    renderer.draw_circle(Vec3::ZERO, 1.0, Color::RED);
    assert_eq!(renderer.flush(), 0);
    // Nothing reached the device: no frame, no draws.
    assert_eq!(device.call_count(), 0);
}

#[test]
fn test_renderer_recovers_once_context_is_available() {
    let device = Arc::new(MockDevice::unavailable());
    let mut renderer = Renderer2D::new(Arc::clone(&device) as Arc<dyn RenderDevice>, 800, 600);

    renderer.begin();
    assert!(!renderer.is_initialized());

    device.set_available(true);
    renderer.begin();
    assert!(renderer.is_initialized());
}

#[test]
fn test_program_failure_leaves_renderer_inert() {
    let device = Arc::new(MockDevice::new());
    device.fail_program_creation(true);
    let mut renderer = Renderer2D::new(Arc::clone(&device) as Arc<dyn RenderDevice>, 800, 600);

    renderer.begin();
    assert!(!renderer.is_initialized());
    assert_eq!(renderer.flush(), 0);
}

#[test]
fn test_begin_applies_viewport() {
    let device = Arc::new(MockDevice::new());
    let mut renderer = Renderer2D::new(Arc::clone(&device) as Arc<dyn RenderDevice>, 800, 600);

    renderer.begin();
    assert!(matches!(
        device.calls().last(),
        Some(DeviceCall::SetViewport {
            width: 800,
            height: 600
        })
    ));

    renderer.set_viewport(1024, 768);
    renderer.begin();
    assert!(matches!(
        device.calls().last(),
        Some(DeviceCall::SetViewport {
            width: 1024,
            height: 768
        })
    ));
}

#[test]
fn test_empty_flush_issues_no_draws() {
    let device = Arc::new(MockDevice::new());
    let mut renderer = renderer(&device);

    assert_eq!(renderer.flush(), 0);
    assert_eq!(device.count_draw_calls(), 0);
    // The frame itself still runs: clear happens even with nothing batched.
    let calls = device.calls();
    assert!(matches!(calls.first(), Some(DeviceCall::BeginFrame { .. })));
    assert!(matches!(calls.last(), Some(DeviceCall::EndFrame)));

    // Idempotent.
    assert_eq!(renderer.flush(), 0);
    assert_eq!(device.count_draw_calls(), 0);
}

#[test]
fn test_fill_rect_batches_six_vertices() {
    let device = Arc::new(MockDevice::new());
    let mut renderer = renderer(&device);

    renderer.draw_rect(Vec3::ZERO, 2.0, 2.0, Color::WHITE);
    assert_eq!(renderer.flush(), 1);
    assert_eq!(device.draws(), vec![(Topology::Triangles, 6)]);
}

#[test]
fn test_stroke_rect_batches_eight_vertices() {
    let device = Arc::new(MockDevice::new());
    let mut renderer = renderer(&device);

    renderer.set_style(DrawStyle::Stroke);
    renderer.draw_rect(Vec3::ZERO, 2.0, 2.0, Color::WHITE);
    assert_eq!(renderer.flush(), 1);
    assert_eq!(device.draws(), vec![(Topology::Lines, 8)]);
}

#[test]
fn test_circle_wedge_counts() {
    let device = Arc::new(MockDevice::new());
    let mut renderer = renderer(&device);

    // 20 wedges of 3 vertices filled, 20 segments of 2 vertices stroked.
    renderer.draw_circle(Vec3::ZERO, 1.0, Color::RED);
    renderer.set_style(DrawStyle::Stroke);
    renderer.draw_circle(Vec3::ZERO, 1.0, Color::RED);

    assert_eq!(renderer.flush(), 2);
    assert_eq!(
        device.draws(),
        vec![(Topology::Triangles, 60), (Topology::Lines, 40)]
    );
}

#[test]
fn test_line_and_point_primitives() {
    let device = Arc::new(MockDevice::new());
    let mut renderer = renderer(&device);

    renderer.draw_line(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0), Color::CYAN);
    renderer.draw_point(Vec3::ZERO, Color::CYAN);

    assert_eq!(renderer.flush(), 2);
    assert_eq!(
        device.draws(),
        vec![(Topology::Triangles, 6), (Topology::Lines, 2)]
    );
}

#[test]
fn test_flush_order_is_sprites_fills_strokes() {
    let device = Arc::new(MockDevice::new());
    let mut renderer = renderer(&device);
    let tex = texture(&device, &renderer);
    device.clear_calls();

    // Batch in the opposite order to the flush contract.
    renderer.set_style(DrawStyle::Stroke);
    renderer.draw_rect(Vec3::ZERO, 1.0, 1.0, Color::WHITE);
    renderer.set_style(DrawStyle::Fill);
    renderer.draw_rect(Vec3::ZERO, 1.0, 1.0, Color::WHITE);
    renderer.draw_texture_at(&tex, Vec3::ZERO, TextureRect::FULL, Color::WHITE);

    assert_eq!(renderer.flush(), 3);

    let order: Vec<&'static str> = device
        .calls()
        .iter()
        .filter_map(|call| match call {
            DeviceCall::DrawInstanced { .. } => Some("sprites"),
            DeviceCall::Draw {
                topology: Topology::Triangles,
                ..
            } => Some("fills"),
            DeviceCall::Draw {
                topology: Topology::Lines,
                ..
            } => Some("strokes"),
            _ => None,
        })
        .collect();
    assert_eq!(order, vec!["sprites", "fills", "strokes"]);
}

#[test]
fn test_sprites_group_by_texture_in_first_use_order() {
    let device = Arc::new(MockDevice::new());
    let mut renderer = renderer(&device);
    let first = texture(&device, &renderer);
    let second = texture(&device, &renderer);
    device.clear_calls();

    renderer.draw_texture_at(&first, Vec3::ZERO, TextureRect::FULL, Color::WHITE);
    renderer.draw_texture_at(&second, Vec3::ZERO, TextureRect::FULL, Color::WHITE);
    renderer.draw_texture_at(&first, Vec3::ONE, TextureRect::FULL, Color::WHITE);

    assert_eq!(renderer.flush(), 2);
    assert_eq!(
        device.instanced_draws(),
        vec![(first.id(), 2), (second.id(), 1)]
    );
}

#[test]
fn test_oversized_sprite_group_splits_by_capacity() {
    let device = Arc::new(MockDevice::new());
    let mut renderer = renderer_with(
        &device,
        RendererSettings {
            sprite_batch_capacity: 4,
            ..Default::default()
        },
    );
    let tex = texture(&device, &renderer);
    device.clear_calls();

    for i in 0..10 {
        renderer.draw_texture_at(
            &tex,
            Vec3::new(i as f32, 0.0, 0.0),
            TextureRect::FULL,
            Color::WHITE,
        );
    }

    // ceil(10 / 4) = 3 instanced draws, no sprite dropped.
    assert_eq!(renderer.flush(), 3);
    assert_eq!(
        device.instanced_draws(),
        vec![(tex.id(), 4), (tex.id(), 4), (tex.id(), 2)]
    );
}

#[test]
fn test_polygon_overflow_splits_submissions() {
    let device = Arc::new(MockDevice::new());
    let mut renderer = renderer_with(
        &device,
        RendererSettings {
            polygon_batch_capacity: 8,
            ..Default::default()
        },
    );

    // Two fill rects of 6 vertices exceed the 8-vertex capacity, so each
    // becomes its own submission.
    renderer.draw_rect(Vec3::ZERO, 1.0, 1.0, Color::WHITE);
    renderer.draw_rect(Vec3::ONE, 1.0, 1.0, Color::WHITE);

    assert_eq!(renderer.flush(), 2);
    assert_eq!(
        device.draws(),
        vec![(Topology::Triangles, 6), (Topology::Triangles, 6)]
    );
}

#[test]
fn test_flush_total_matches_device_draw_count() {
    let device = Arc::new(MockDevice::new());
    let mut renderer = renderer(&device);
    let tex = texture(&device, &renderer);
    device.clear_calls();

    renderer.draw_texture_at(&tex, Vec3::ZERO, TextureRect::FULL, Color::WHITE);
    renderer.draw_circle(Vec3::ZERO, 1.0, Color::RED);
    renderer.set_style(DrawStyle::Stroke);
    renderer.draw_rect(Vec3::ZERO, 1.0, 1.0, Color::GREEN);

    let total = renderer.flush();
    assert_eq!(total, 3);
    assert_eq!(device.count_draw_calls(), total);
}

#[test]
fn test_frame_clears_to_current_clear_color() {
    let device = Arc::new(MockDevice::new());
    let mut renderer = renderer(&device);

    renderer.set_clear_color(Color::BLUE);
    renderer.flush();

    match device.calls().into_iter().next() {
        Some(DeviceCall::BeginFrame { clear_color }) => assert_eq!(clear_color, Color::BLUE),
        other => panic!("expected BeginFrame first, got {:?}", other),
    }
}

#[test]
fn test_batches_reset_between_frames() {
    let device = Arc::new(MockDevice::new());
    let mut renderer = renderer(&device);

    renderer.draw_rect(Vec3::ZERO, 1.0, 1.0, Color::WHITE);
    assert_eq!(renderer.flush(), 1);

    device.clear_calls();
    assert_eq!(renderer.flush(), 0);
    assert_eq!(device.count_draw_calls(), 0);
}

#[test]
fn test_shutdown_clears_resource_pool() {
    let device = Arc::new(MockDevice::new());
    let renderer = renderer(&device);
    let pool = Arc::clone(renderer.pool());
    assert!(!pool.is_empty());

    drop(renderer);
    assert!(pool.is_empty());
}
