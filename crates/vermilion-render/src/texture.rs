//! GPU texture resource.

use std::sync::Arc;

use vermilion_device::{DeviceTexture, RenderDevice, TextureDescriptor, TextureOptions};

use crate::pool::{PoolToken, ResourceKind, ResourcePool};

/// A 2D RGBA texture owned by the renderer's user.
///
/// The wrapped device handle carries a stable identity id; sprite instances
/// drawn with the same `Texture` batch into one instanced submission. Pixel
/// data arrives pre-decoded (image loading is a collaborator concern).
pub struct Texture {
    handle: DeviceTexture,
    width: u32,
    height: u32,
    options: TextureOptions,
    _token: PoolToken,
}

impl Texture {
    /// Create an empty texture of the given pixel size.
    pub fn new(
        device: &dyn RenderDevice,
        pool: &Arc<ResourcePool>,
        width: u32,
        height: u32,
        options: TextureOptions,
    ) -> Self {
        let handle = device.create_texture(&TextureDescriptor {
            label: None,
            width,
            height,
            options,
        });

        Self {
            handle,
            width,
            height,
            options,
            _token: pool.register(ResourceKind::Texture),
        }
    }

    /// Create a texture and upload raw RGBA8 pixels in one step.
    ///
    /// `data` must hold exactly `width * height * 4` bytes.
    pub fn from_data(
        device: &dyn RenderDevice,
        pool: &Arc<ResourcePool>,
        width: u32,
        height: u32,
        options: TextureOptions,
        data: &[u8],
    ) -> Self {
        let texture = Self::new(device, pool, width, height, options);
        texture.write(device, data);
        texture
    }

    /// Upload raw RGBA8 pixels covering the whole texture.
    pub fn write(&self, device: &dyn RenderDevice, data: &[u8]) {
        let expected = self.width as usize * self.height as usize * 4;
        if data.len() != expected {
            tracing::warn!(
                "Texture upload of {} bytes does not match {}x{} RGBA ({} bytes), skipping",
                data.len(),
                self.width,
                self.height,
                expected
            );
            return;
        }
        device.write_texture(&self.handle, data);
    }

    /// Stable identity id, the sprite-batching key.
    pub fn id(&self) -> u64 {
        self.handle.id()
    }

    /// The device handle.
    pub fn handle(&self) -> &DeviceTexture {
        &self.handle
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The sampling options the texture was created with.
    pub fn options(&self) -> TextureOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vermilion_device::MockDevice;

    #[test]
    fn test_upload_size_must_match() {
        let device = MockDevice::new();
        let pool = ResourcePool::new();
        let texture = Texture::new(&device, &pool, 2, 2, TextureOptions::default());

        texture.write(&device, &[0u8; 16]);
        texture.write(&device, &[0u8; 3]); // wrong size, skipped

        let uploads = device
            .calls()
            .iter()
            .filter(|call| matches!(call, vermilion_device::DeviceCall::WriteTexture { .. }))
            .count();
        assert_eq!(uploads, 1);
    }

    #[test]
    fn test_identity_is_stable_and_distinct() {
        let device = MockDevice::new();
        let pool = ResourcePool::new();
        let a = Texture::new(&device, &pool, 4, 4, TextureOptions::default());
        let b = Texture::new(&device, &pool, 4, 4, TextureOptions::default());
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), a.handle().id());
        assert_eq!(pool.count(ResourceKind::Texture), 2);
    }
}
