use std::fmt;

use crate::math::UVec2;

/// A CPU-side bitmap, tightly packed row by row with no padding.
#[derive(Clone, PartialEq)]
pub struct ImageData {
    pub format: ImageFormat,
    pub size: UVec2,
    pub data: Vec<u8>,
}

impl ImageData {
    pub fn empty(format: ImageFormat) -> ImageData {
        ImageData {
            format,
            size: UVec2::ZERO,
            data: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size.x == 0 || self.size.y == 0
    }

    /// Returns the top-left `max_size` part of the image. Does nothing if the
    /// image already fits.
    pub fn crop(self, max_size: UVec2) -> ImageData {
        let size = self.size.min(max_size);
        if size == self.size {
            return self;
        }

        if size.x == 0 || size.y == 0 {
            return ImageData {
                size,
                data: Vec::new(),
                ..self
            };
        }

        let bpp = self.format.bytes_per_pixel();
        let src_stride = self.size.x as usize * bpp;
        let dst_stride = size.x as usize * bpp;

        let data = self
            .data
            .chunks_exact(src_stride)
            .take(size.y as usize)
            .flat_map(|row| &row[..dst_stride])
            .copied()
            .collect();

        ImageData {
            format: self.format,
            size,
            data,
        }
    }

    /// Grows the image to `min_size` by adding zeroed pixels to the right and
    /// bottom. Does nothing if the image is already large enough.
    pub fn pad(self, min_size: UVec2) -> ImageData {
        let size = self.size.max(min_size);
        if size == self.size {
            return self;
        }

        let bpp = self.format.bytes_per_pixel();
        let src_stride = self.size.x as usize * bpp;
        let dst_stride = size.x as usize * bpp;

        let mut data = vec![0; dst_stride * size.y as usize];
        if src_stride > 0 {
            let rows = data.chunks_exact_mut(dst_stride);
            for (dst, src) in rows.zip(self.data.chunks_exact(src_stride)) {
                dst[..src_stride].copy_from_slice(src);
            }
        }

        ImageData {
            format: self.format,
            size,
            data,
        }
    }

    /// Converts the image into [`ImageFormat::Srgba8`].
    ///
    /// Coverage masks become white with alpha equal to the coverage.
    pub fn into_srgba8(self) -> ImageData {
        match self.format {
            ImageFormat::Srgba8 => self,
            ImageFormat::Gray8 => ImageData {
                format: ImageFormat::Srgba8,
                size: self.size,
                data: self
                    .data
                    .iter()
                    .flat_map(|&a| [255, 255, 255, a])
                    .collect(),
            },
        }
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("format", &self.format)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ImageFormat {
    Srgba8,
    Gray8,
}

impl ImageFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ImageFormat::Srgba8 => 4,
            ImageFormat::Gray8 => 1,
        }
    }
}
