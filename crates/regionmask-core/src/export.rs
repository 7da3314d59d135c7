//! Region export: alpha-mask everything outside the region set.

use crate::error::{EditorError, EditorResult};
use crate::region::Region;
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::Point;

/// An RGBA8 pixel buffer, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA8 data, checking its length.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> EditorResult<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(EditorError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A buffer with every pixel set to `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            width,
            height,
            data: rgba.repeat(pixels),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x < self.width && y < self.height {
            let i = self.offset(x, y);
            self.data[i..i + 4].copy_from_slice(&rgba);
        }
    }

    /// Alpha at the pixel containing the content point `point`.
    pub fn alpha_at(&self, point: Point) -> Option<u8> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        self.pixel(point.x.floor() as u32, point.y.floor() as u32)
            .map(|p| p[3])
    }

    /// Blend `top` over this buffer (source-over, straight alpha).
    pub fn composite_over(&mut self, top: &PixelBuffer) {
        for (dst, src) in self.data.chunks_exact_mut(4).zip(top.data.chunks_exact(4)) {
            let sa = src[3] as u32;
            if sa == 0 {
                continue;
            }
            if sa == 255 {
                dst.copy_from_slice(src);
                continue;
            }
            let da = dst[3] as u32;
            let out_a = sa * 255 + da * (255 - sa);
            if out_a == 0 {
                continue;
            }
            for c in 0..3 {
                let value = (src[c] as u32 * sa * 255 + dst[c] as u32 * da * (255 - sa)) / out_a;
                dst[c] = value.min(255) as u8;
            }
            dst[3] = (out_a / 255).min(255) as u8;
        }
    }
}

/// Pixel coverage of one region, rasterized once over its bounding box.
struct RegionMask {
    x0: u32,
    y0: u32,
    width: u32,
    covered: Vec<bool>,
}

impl RegionMask {
    fn build(region: &Region, samples: usize, canvas_width: u32, canvas_height: u32) -> Option<Self> {
        // Curves stay inside the hull of their control points.
        let bounds = region.bounds()?;
        let outline = region.outline(samples);
        let x0 = bounds.x0.floor().max(0.0) as u32;
        let y0 = bounds.y0.floor().max(0.0) as u32;
        let x1 = (bounds.x1.ceil().max(0.0) as u32).min(canvas_width);
        let y1 = (bounds.y1.ceil().max(0.0) as u32).min(canvas_height);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        let width = x1 - x0;
        let mut covered = Vec::with_capacity(width as usize * (y1 - y0) as usize);
        for y in y0..y1 {
            for x in x0..x1 {
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                covered.push(crate::geometry::point_in_polygon(center, &outline));
            }
        }
        Some(Self {
            x0,
            y0,
            width,
            covered,
        })
    }

    fn apply(&self, coverage: &mut [bool], canvas_width: u32) {
        for (i, &inside) in self.covered.iter().enumerate() {
            if inside {
                let x = self.x0 + i as u32 % self.width;
                let y = self.y0 + i as u32 / self.width;
                coverage[y as usize * canvas_width as usize + x as usize] = true;
            }
        }
    }
}

/// Copy `base`, zeroing the alpha of every pixel outside all regions.
///
/// Pixel centers are tested, with the same containment rule as hit-testing.
pub fn mask_regions(base: &PixelBuffer, regions: &[Region], samples: usize) -> PixelBuffer {
    let (width, height) = (base.width, base.height);
    let mut coverage = vec![false; width as usize * height as usize];
    for mask in regions
        .iter()
        .filter_map(|r| RegionMask::build(r, samples, width, height))
    {
        mask.apply(&mut coverage, width);
    }

    let mut out = base.clone();
    for (pixel, inside) in out.data.chunks_exact_mut(4).zip(coverage) {
        if !inside {
            pixel[3] = 0;
        }
    }
    out
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(buffer: &PixelBuffer) -> EditorResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, buffer.width, buffer.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| EditorError::Encode(format!("PNG header: {e}")))?;
        writer
            .write_image_data(&buffer.data)
            .map_err(|e| EditorError::Encode(format!("PNG data: {e}")))?;
    }
    Ok(png_data)
}

/// Wrap PNG bytes as a `data:` URL.
pub fn png_data_url(png_data: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png_data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{CurveType, SerializableColor, Vertex};

    fn polygon(points: &[(f64, f64)]) -> Region {
        Region::closed_from(
            CurveType::Polygon,
            points
                .iter()
                .map(|&(x, y)| Vertex::anchor(Point::new(x, y), 5.0, SerializableColor::black()))
                .collect(),
        )
    }

    #[test]
    fn test_buffer_length_checked() {
        assert!(PixelBuffer::new(2, 2, vec![0; 16]).is_ok());
        assert_eq!(
            PixelBuffer::new(2, 2, vec![0; 15]),
            Err(EditorError::BufferSize {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn test_left_half_mask() {
        let base = PixelBuffer::filled(10, 10, [200, 100, 50, 255]);
        let left = polygon(&[(0.0, 0.0), (5.0, 0.0), (5.0, 10.0), (0.0, 10.0)]);
        let out = mask_regions(&base, &[left], 100);
        for y in 0..10 {
            for x in 0..10 {
                let pixel = out.pixel(x, y).unwrap();
                if x >= 5 {
                    assert_eq!(pixel[3], 0, "pixel ({x},{y}) should be transparent");
                } else {
                    assert_eq!(pixel, [200, 100, 50, 255], "pixel ({x},{y}) should be kept");
                }
            }
        }
    }

    #[test]
    fn test_union_of_regions() {
        let base = PixelBuffer::filled(10, 10, [1, 2, 3, 128]);
        let a = polygon(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let b = polygon(&[(8.0, 8.0), (10.0, 8.0), (10.0, 10.0), (8.0, 10.0)]);
        let out = mask_regions(&base, &[a, b], 100);
        assert_eq!(out.pixel(1, 1).unwrap()[3], 128);
        assert_eq!(out.pixel(9, 9).unwrap()[3], 128);
        assert_eq!(out.pixel(5, 5).unwrap()[3], 0);
        // Colour channels are untouched even when masked.
        assert_eq!(&out.pixel(5, 5).unwrap()[..3], &[1, 2, 3]);
    }

    #[test]
    fn test_region_outside_canvas() {
        let base = PixelBuffer::filled(4, 4, [0, 0, 0, 255]);
        let far = polygon(&[(100.0, 100.0), (110.0, 100.0), (110.0, 110.0)]);
        let out = mask_regions(&base, &[far], 100);
        assert!(out.data().chunks_exact(4).all(|p| p[3] == 0));
    }

    #[test]
    fn test_no_regions_masks_everything() {
        let base = PixelBuffer::filled(3, 3, [9, 9, 9, 255]);
        let out = mask_regions(&base, &[], 100);
        assert!(out.data().chunks_exact(4).all(|p| p[3] == 0));
    }

    #[test]
    fn test_encode_png_signature() {
        let png_data = encode_png(&PixelBuffer::filled(2, 2, [255, 0, 0, 255])).unwrap();
        assert_eq!(&png_data[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
        assert!(png_data_url(&png_data).starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn test_composite_over() {
        let mut bottom = PixelBuffer::filled(1, 1, [0, 0, 255, 255]);
        bottom.composite_over(&PixelBuffer::filled(1, 1, [255, 0, 0, 0]));
        assert_eq!(bottom.pixel(0, 0), Some([0, 0, 255, 255]));
        bottom.composite_over(&PixelBuffer::filled(1, 1, [255, 0, 0, 255]));
        assert_eq!(bottom.pixel(0, 0), Some([255, 0, 0, 255]));
    }
}
