//! Orthographic camera producing the renderer's view and projection.

use glam::{Mat4, Vec3};

/// An orthographic 2D camera.
///
/// Produces a projection from the configured bounds and a view from the
/// camera's position and zoom. Feed the results to
/// `Renderer2D::set_projection_matrix` / `set_view_matrix`; the cached
/// view-projection is recomputed eagerly whenever either input changes.
pub struct OrthographicCamera {
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    near: f32,
    far: f32,
    position: Vec3,
    zoom: f32,
    projection: Mat4,
    view: Mat4,
    view_projection: Mat4,
}

impl OrthographicCamera {
    /// Create a camera centered on the origin covering `width` x `height`
    /// world units.
    pub fn new(width: f32, height: f32) -> Self {
        let half_width = width / 2.0;
        let half_height = height / 2.0;
        Self::from_bounds(-half_width, half_width, -half_height, half_height, -1.0, 1.0)
    }

    /// Create a camera with explicit bounds.
    pub fn from_bounds(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            left,
            right,
            bottom,
            top,
            near,
            far,
            position: Vec3::ZERO,
            zoom: 1.0,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            view_projection: Mat4::IDENTITY,
        };
        camera.update_matrices();
        camera
    }

    /// Move the camera.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_matrices();
    }

    /// Set the zoom factor (> 1 zooms in).
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
        self.update_matrices();
    }

    /// Replace the projection bounds, e.g. after a viewport resize.
    pub fn set_bounds(&mut self, left: f32, right: f32, bottom: f32, top: f32) {
        self.left = left;
        self.right = right;
        self.bottom = bottom;
        self.top = top;
        self.update_matrices();
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// The projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// The view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// The cached `projection * view` product.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection
    }

    fn update_matrices(&mut self) {
        self.projection = Mat4::orthographic_rh(
            self.left, self.right, self.bottom, self.top, self.near, self.far,
        );
        self.view =
            Mat4::from_scale(Vec3::splat(self.zoom)) * Mat4::from_translation(-self.position);
        self.view_projection = self.projection * self.view;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_projection_is_product() {
        let mut camera = OrthographicCamera::new(800.0, 600.0);
        camera.set_position(Vec3::new(10.0, -5.0, 0.0));
        camera.set_zoom(2.0);

        let expected = camera.projection_matrix() * camera.view_matrix();
        assert!(camera
            .view_projection_matrix()
            .abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_identity_at_origin() {
        let camera = OrthographicCamera::new(2.0, 2.0);
        // Unit bounds with no zoom/pan: view is identity, projection maps
        // [-1, 1] onto clip space.
        assert!(camera.view_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
        let projected = camera
            .view_projection_matrix()
            .transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert!((projected.x - 1.0).abs() < 1e-6);
        assert!((projected.y - 1.0).abs() < 1e-6);
    }
}
