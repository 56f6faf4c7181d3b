//! Texture-grouped instanced sprite batching.

use glam::Mat4;
use indexmap::IndexMap;
use vermilion_core::{Color, TextureRect};
use vermilion_device::DeviceTexture;

/// One sprite instance: transform, texture crop, tint.
#[derive(Debug, Clone, Copy)]
pub struct SpriteInstance {
    /// Column-major 4x4 transform, consistent with the view-projection
    /// convention.
    pub transform: Mat4,
    /// Crop rectangle in normalized texture space.
    pub crop: TextureRect,
    /// RGBA tint in `0..=1`.
    pub color: Color,
}

struct SpriteGroup {
    texture: DeviceTexture,
    instances: Vec<SpriteInstance>,
}

/// Accumulates sprite instances grouped by texture identity.
///
/// Groups keep first-use order within the frame: the first sprite drawn with
/// a texture fixes where that texture's whole group lands in the submission
/// sequence, which determines the apparent z-order between sprites of
/// different textures. Within a group, instances keep call order.
///
/// There is no accumulation-time bound. At flush, a group larger than the
/// per-submission `capacity` is emitted in successive sub-batches of at most
/// `capacity` instances, never dropped.
pub struct SpriteBatch {
    capacity: usize,
    groups: IndexMap<u64, SpriteGroup>,
}

impl SpriteBatch {
    /// Create a batch with `capacity` instances per draw submission.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            groups: IndexMap::new(),
        }
    }

    /// Instance capacity per draw submission.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append one instance to `texture`'s group.
    pub fn batch(
        &mut self,
        texture: &DeviceTexture,
        transform: Mat4,
        crop: TextureRect,
        color: Color,
    ) {
        self.groups
            .entry(texture.id())
            .or_insert_with(|| SpriteGroup {
                texture: texture.clone(),
                instances: Vec::new(),
            })
            .instances
            .push(SpriteInstance {
                transform,
                crop,
                color,
            });
    }

    /// Number of distinct textures pending.
    pub fn texture_count(&self) -> usize {
        self.groups.len()
    }

    /// Total instances pending across all groups.
    pub fn instance_count(&self) -> usize {
        self.groups.values().map(|group| group.instances.len()).sum()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Drain every group in first-use order.
    ///
    /// For each sub-batch of at most `capacity` instances, packs the
    /// instances into three parallel float arrays - transforms (16 floats
    /// each, column-major), crops (4 floats), colors (4 floats) - and invokes
    /// `callback(texture, transforms, crops, colors)`. The callback uploads
    /// the arrays and issues one instanced draw. All group state is cleared
    /// afterwards; returns the number of callbacks (draw submissions).
    pub fn flush(
        &mut self,
        mut callback: impl FnMut(&DeviceTexture, &[f32], &[f32], &[f32]),
    ) -> usize {
        let mut submissions = 0;

        let mut transforms = Vec::new();
        let mut crops = Vec::new();
        let mut colors = Vec::new();

        for group in self.groups.values() {
            for chunk in group.instances.chunks(self.capacity) {
                transforms.clear();
                crops.clear();
                colors.clear();
                for instance in chunk {
                    transforms.extend_from_slice(&instance.transform.to_cols_array());
                    crops.extend_from_slice(&instance.crop.to_array());
                    colors.extend_from_slice(&instance.color.to_array());
                }
                callback(&group.texture, &transforms, &crops, &colors);
                submissions += 1;
            }
        }

        self.groups.clear();
        submissions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture(id: u64) -> DeviceTexture {
        DeviceTexture::mock(id, 16, 16)
    }

    fn batch_n(batch: &mut SpriteBatch, texture: &DeviceTexture, n: usize) {
        for _ in 0..n {
            batch.batch(
                texture,
                Mat4::IDENTITY,
                TextureRect::FULL,
                Color::WHITE,
            );
        }
    }

    #[test]
    fn test_groups_by_texture_identity() {
        let mut batch = SpriteBatch::new(100);
        let a = texture(1);
        let b = texture(2);
        batch_n(&mut batch, &a, 3);
        batch_n(&mut batch, &b, 2);
        batch_n(&mut batch, &a, 1);

        assert_eq!(batch.texture_count(), 2);
        assert_eq!(batch.instance_count(), 6);

        let mut flushed = Vec::new();
        let submissions = batch.flush(|texture, transforms, _, _| {
            flushed.push((texture.id(), transforms.len() / 16));
        });
        assert_eq!(submissions, 2);
        // First-use order: all of `a` first even though `b` was interleaved.
        assert_eq!(flushed, vec![(1, 4), (2, 2)]);
    }

    #[test]
    fn test_parallel_arrays_are_packed_per_instance() {
        let mut batch = SpriteBatch::new(100);
        let tex = texture(7);
        batch.batch(
            &tex,
            Mat4::from_translation(glam::Vec3::new(5.0, 0.0, 0.0)),
            TextureRect::new(0.0, 0.5, 1.0, 0.5),
            Color::rgba(0.1, 0.2, 0.3, 0.4),
        );

        batch.flush(|_, transforms, crops, colors| {
            assert_eq!(transforms.len(), 16);
            // Column-major: translation lands in the fourth column.
            assert_eq!(&transforms[12..15], &[5.0, 0.0, 0.0]);
            assert_eq!(crops, &[0.0, 0.5, 1.0, 0.5]);
            assert_eq!(colors, &[0.1, 0.2, 0.3, 0.4]);
        });
    }

    #[test]
    fn test_oversized_group_splits_into_sub_batches() {
        let mut batch = SpriteBatch::new(4);
        let tex = texture(3);
        batch_n(&mut batch, &tex, 10);

        let mut sizes = Vec::new();
        let submissions = batch.flush(|_, _, _, colors| sizes.push(colors.len() / 4));
        assert_eq!(submissions, 3);
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_draws_bounded_by_textures_times_chunks() {
        let mut batch = SpriteBatch::new(3);
        batch_n(&mut batch, &texture(1), 7); // ceil(7/3) = 3
        batch_n(&mut batch, &texture(2), 3); // ceil(3/3) = 1
        batch_n(&mut batch, &texture(3), 1); // ceil(1/3) = 1

        let submissions = batch.flush(|_, _, _, _| {});
        assert_eq!(submissions, 5);
    }

    #[test]
    fn test_flush_clears_groups() {
        let mut batch = SpriteBatch::new(8);
        batch_n(&mut batch, &texture(1), 2);
        assert_eq!(batch.flush(|_, _, _, _| {}), 1);
        assert!(batch.is_empty());
        assert_eq!(batch.flush(|_, _, _, _| panic!("no submissions expected")), 0);
    }
}
