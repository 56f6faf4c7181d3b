//! Graphics context and wgpu backend tests.
//!
//! Most of these require a real GPU adapter and are `#[ignore]`d by default;
//! run with `cargo test --test context_tests -- --ignored` on a machine with
//! a GPU.

use std::sync::Arc;

use glam::Vec3;
use vermilion_core::Color;
use vermilion_render::{GraphicsContext, Renderer2D, WgpuDevice};

#[test]
#[ignore] // Requires GPU
fn test_context_creation_sync() {
    match GraphicsContext::new_owned_sync() {
        Ok(ctx) => {
            assert_eq!(Arc::strong_count(&ctx), 1);
            assert!(ctx.device().limits().max_texture_dimension_2d > 0);
        }
        Err(err) => {
            // CI machines without an adapter hit the recoverable path.
            println!("GPU not available: {}", err);
        }
    }
}

#[test]
#[ignore] // Requires GPU
fn test_full_frame_against_real_device() {
    let Ok(ctx) = GraphicsContext::new_owned_sync() else {
        println!("GPU not available, skipping");
        return;
    };

    let device = Arc::new(WgpuDevice::new(ctx, 320, 240));
    let mut renderer = Renderer2D::new(device, 320, 240);

    renderer.begin();
    assert!(renderer.is_initialized());

    renderer.set_clear_color(Color::BLACK);
    renderer.draw_circle(Vec3::ZERO, 0.5, Color::RED);
    renderer.draw_rect(Vec3::new(0.5, 0.5, 0.0), 0.25, 0.25, Color::GREEN);

    let draw_calls = renderer.flush();
    assert_eq!(draw_calls, 1); // circle and rect share one fill submission
}

#[test]
#[ignore] // Requires GPU
fn test_viewport_resize_recreates_target() {
    let Ok(ctx) = GraphicsContext::new_owned_sync() else {
        println!("GPU not available, skipping");
        return;
    };

    let device = Arc::new(WgpuDevice::new(ctx, 100, 100));
    let mut renderer = Renderer2D::new(
        Arc::clone(&device) as Arc<dyn vermilion_device::RenderDevice>,
        100,
        100,
    );
    renderer.begin();

    renderer.set_viewport(200, 150);
    renderer.begin();

    let target = device.target();
    assert_eq!((target.width(), target.height()), (200, 150));
}
