//! Drawable pixel surfaces.
//!
//! The renderer only talks to [`Surface`]; [`PixmapSurface`] is the in-memory
//! implementation backed by a tiny-skia `Pixmap`.

use std::path::Path;

use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::canvas::glyphs;
use crate::error::{EngineError, Result};

/// Straight (non-premultiplied) colour with a fractional alpha.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_rgb(rgb: [u8; 3], a: f32) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2], a)
    }

    fn alpha_u8(&self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

/// Something the spectrogram can be painted onto.
///
/// Coordinates passed to the drawing calls are in CSS pixels; `set_scale`
/// maps them to device pixels.
pub trait Surface {
    /// Reallocate the backing store to `width` × `height` device pixels.
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    /// Current size in device pixels.
    fn size(&self) -> (u32, u32);

    fn set_scale(&mut self, scale: f32);

    fn clear(&mut self, color: Rgba);

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba);

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), line_width: f32, color: Rgba);

    /// Draw `text` with its top-left corner at (`x`, `y`). The default uses
    /// the built-in 5×7 bitmap glyphs.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Rgba) {
        let mut cursor = x;
        for ch in text.chars() {
            if let Some(rows) = glyphs::glyph(ch) {
                for (row, bits) in rows.iter().enumerate() {
                    for col in 0..glyphs::GLYPH_WIDTH {
                        if bits & (1 << (glyphs::GLYPH_WIDTH - 1 - col)) != 0 {
                            self.fill_rect(cursor + col as f32, y + row as f32, 1.0, 1.0, color);
                        }
                    }
                }
            }
            cursor += glyphs::GLYPH_ADVANCE as f32;
        }
    }

    fn text_width(&self, text: &str) -> f32 {
        glyphs::text_width(text)
    }
}

/// In-memory RGBA surface.
pub struct PixmapSurface {
    pixmap: Pixmap,
    transform: Transform,
}

impl PixmapSurface {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            pixmap: allocate(width, height)?,
            transform: Transform::identity(),
        })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Demultiplied RGBA at a device pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| EngineError::Export(e.to_string()))
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.pixmap
            .save_png(path)
            .map_err(|e| EngineError::Export(e.to_string()))
    }
}

fn allocate(width: u32, height: u32) -> Result<Pixmap> {
    Pixmap::new(width, height).ok_or_else(|| {
        EngineError::DrawSurfaceUnavailable(format!("cannot allocate a {width}x{height} pixmap"))
    })
}

fn paint_for(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba8(color.r, color.g, color.b, color.alpha_u8()));
    paint.anti_alias = false;
    paint
}

impl Surface for PixmapSurface {
    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if self.pixmap.width() != width || self.pixmap.height() != height {
            self.pixmap = allocate(width, height)?;
        }
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn set_scale(&mut self, scale: f32) {
        self.transform = Transform::from_scale(scale, scale);
    }

    fn clear(&mut self, color: Rgba) {
        self.pixmap
            .fill(Color::from_rgba8(color.r, color.g, color.b, color.alpha_u8()));
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        let Some(rect) = Rect::from_xywh(x, y, width, height) else {
            return;
        };
        self.pixmap
            .fill_rect(rect, &paint_for(color), self.transform, None);
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), line_width: f32, color: Rgba) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.0, from.1);
        pb.line_to(to.0, to.1);
        let Some(path) = pb.finish() else {
            return;
        };
        let stroke = Stroke {
            width: line_width,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(&path, &paint_for(color), &stroke, self.transform, None);
    }
}
