//! RGBA page rasters and their PNG / data URL encodings.

use super::{BoxFuture, CanvasRasterizer, ImageExportOptions};
use crate::editor::Editor;
use crate::error::{PdfError, PdfResult};
use crate::shapes::{ColorStyle, SerializableColor, Shape, ShapeId, ShapeProps};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::Rect;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// An 8-bit RGBA pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap a row-major RGBA buffer. Fails if the buffer size does not match.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> PdfResult<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(PdfError::Rasterize(format!(
                "expected {expected} bytes for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A fully transparent image.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// An image filled with one colour.
    pub fn filled(width: u32, height: u32, color: SerializableColor) -> Self {
        let pixels = [color.r, color.g, color.b, color.a]
            .into_iter()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

    /// Overwrite the pixels covered by `rect` (pixel space), clipped to the image.
    pub fn fill_rect(&mut self, rect: Rect, color: SerializableColor) {
        let x0 = rect.x0.floor().max(0.0) as u32;
        let y0 = rect.y0.floor().max(0.0) as u32;
        let x1 = (rect.x1.ceil().max(0.0) as u32).min(self.width);
        let y1 = (rect.y1.ceil().max(0.0) as u32).min(self.height);
        let rgba = [color.r, color.g, color.b, color.a];
        for y in y0..y1 {
            let row = y as usize * self.width as usize;
            for x in x0..x1 {
                let i = (row + x as usize) * 4;
                self.pixels[i..i + 4].copy_from_slice(&rgba);
            }
        }
    }

    /// Encode as PNG.
    pub fn encode_png(&self) -> PdfResult<Vec<u8>> {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
            writer.finish()?;
        }
        Ok(bytes)
    }

    /// Encode as a `data:image/png;base64,...` URL.
    pub fn to_data_url(&self) -> PdfResult<String> {
        Ok(png_data_url(&self.encode_png()?))
    }
}

/// Wrap PNG bytes in a data URL.
pub fn png_data_url(png: &[u8]) -> String {
    format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png))
}

/// PNG bytes of a data URL produced by [`png_data_url`].
pub fn decode_png_data_url(src: &str) -> Option<Vec<u8>> {
    let encoded = src.strip_prefix(PNG_DATA_URL_PREFIX)?;
    STANDARD.decode(encoded).ok()
}

/// Decode PNG bytes into an RGBA raster.
pub fn decode_png(bytes: &[u8]) -> PdfResult<RasterImage> {
    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::ALPHA);
    let mut reader = decoder
        .read_info()
        .map_err(|e| PdfError::Decode(e.to_string()))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| PdfError::Decode(e.to_string()))?;
    if info.color_type != png::ColorType::Rgba || info.bit_depth != png::BitDepth::Eight {
        return Err(PdfError::Decode(format!(
            "unsupported PNG layout {:?}/{:?}",
            info.color_type, info.bit_depth
        )));
    }
    buf.truncate(info.buffer_size());
    RasterImage::from_rgba(info.width, info.height, buf)
}

/// Flat canvas rasterizer: every shape is drawn as its page bounds filled
/// with the shape's background colour, back to front. Images are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoxRasterizer;

impl BoxRasterizer {
    pub fn rasterize(
        &self,
        editor: &dyn Editor,
        ids: &[ShapeId],
        options: ImageExportOptions,
    ) -> RasterImage {
        let region = options.bounds.inflate(options.padding, options.padding);
        let width = (region.width() * options.scale).ceil().max(0.0) as u32;
        let height = (region.height() * options.scale).ceil().max(0.0) as u32;
        let mut image = if options.background {
            RasterImage::filled(width, height, ColorStyle::White.solid())
        } else {
            RasterImage::transparent(width, height)
        };

        let mut ordered: Vec<(usize, ShapeId)> = ids
            .iter()
            .filter_map(|&id| Some((editor.z_index(id)?, id)))
            .collect();
        ordered.sort();

        for (_, id) in ordered {
            let (Some(shape), Some(bounds)) = (editor.shape(id), editor.shape_page_bounds(id))
            else {
                continue;
            };
            let Some(color) = fill_color(shape) else {
                continue;
            };
            let local = (bounds - region.origin().to_vec2()).scale_from_origin(options.scale);
            image.fill_rect(local, color);
        }
        image
    }
}

impl CanvasRasterizer for BoxRasterizer {
    fn to_png<'a>(
        &'a self,
        editor: &'a dyn Editor,
        ids: &'a [ShapeId],
        options: ImageExportOptions,
    ) -> BoxFuture<'a, PdfResult<Vec<u8>>> {
        Box::pin(async move { self.rasterize(editor, ids, options).encode_png() })
    }
}

fn fill_color(shape: &Shape) -> Option<SerializableColor> {
    match &shape.props {
        ShapeProps::Geo(props) => Some(props.color.semi()),
        ShapeProps::Card(props) => Some(props.background()),
        ShapeProps::Frame(_) => Some(ColorStyle::White.solid()),
        ShapeProps::Pin(_) => Some(ColorStyle::Red.solid()),
        ShapeProps::Image(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::shapes::{GeoProps, ImageFormat};
    use kurbo::Point;

    #[test]
    fn test_size_mismatch_rejected() {
        assert!(RasterImage::from_rgba(2, 2, vec![0; 15]).is_err());
        assert!(RasterImage::from_rgba(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn test_data_url() {
        let image = RasterImage::from_rgba(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 128]).unwrap();
        let url = image.to_data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));

        let png = decode_png_data_url(&url).unwrap();
        assert_eq!(ImageFormat::from_magic_bytes(&png), Some(ImageFormat::Png));
        assert_eq!(decode_png(&png).unwrap(), image);
    }

    #[test]
    fn test_foreign_data_url() {
        assert!(decode_png_data_url("data:image/jpeg;base64,AAAA").is_none());
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut image = RasterImage::transparent(4, 4);
        image.fill_rect(Rect::new(-2.0, 2.0, 2.0, 10.0), ColorStyle::Red.solid());
        assert_eq!(image.pixel(0, 3), Some([0xe0, 0x31, 0x31, 255]));
        assert_eq!(image.pixel(2, 3), Some([0, 0, 0, 0]));
        assert_eq!(image.pixel(0, 1), Some([0, 0, 0, 0]));
        assert_eq!(image.pixel(4, 0), None);
    }

    #[test]
    fn test_box_rasterizer_clips_to_bounds() {
        let mut canvas = Canvas::default();
        let geo = Shape::new(ShapeProps::Geo(GeoProps::new(20.0, 20.0))).at(Point::new(90.0, 90.0));
        let id = geo.id;
        canvas.create_shapes(vec![geo]).unwrap();

        let options = ImageExportOptions::clipped(Rect::new(0.0, 0.0, 100.0, 100.0));
        let image = BoxRasterizer.rasterize(&canvas, &[id], options);
        assert_eq!((image.width, image.height), (100, 100));
        let semi = ColorStyle::Black.semi();
        assert_eq!(image.pixel(95, 95), Some([semi.r, semi.g, semi.b, 255]));
        assert_eq!(image.pixel(50, 50), Some([0, 0, 0, 0]));

        let png = pollster::block_on(BoxRasterizer.to_png(&canvas, &[id], options)).unwrap();
        assert_eq!(decode_png(&png).unwrap(), image);
    }
}
