//! Drawing surface used by metafile replay
//!
//! The operations mirror a 2D canvas context: a save/restore state stack,
//! an affine transform, fill and stroke paints, a current path, text and
//! image drawing. Paint `None` is fully transparent.

use crate::common::error::Result;

/// 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Build from a stored `0x00RRGGBB` value; the high byte is ignored.
    pub fn from_u32(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }
}

/// Fill or stroke paint. `None` paints nothing.
pub type Paint = Option<Rgb>;

/// Affine transform in canvas order: `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// `self * other`: apply `other` first, then `self`.
    pub fn multiply(&self, o: &Matrix) -> Matrix {
        Matrix {
            a: self.a * o.a + self.c * o.b,
            b: self.b * o.a + self.d * o.b,
            c: self.a * o.c + self.c * o.d,
            d: self.b * o.c + self.d * o.d,
            e: self.a * o.e + self.c * o.f + self.e,
            f: self.b * o.e + self.d * o.f + self.f,
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Uniform scale factor, used for line widths.
    pub fn scale(&self) -> f64 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

/// CSS-like font selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub style: FontStyle,
    /// 100..=900, `None` for the default weight
    pub weight: Option<u16>,
    /// Pixel size
    pub size: f64,
    pub families: Vec<String>,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            style: FontStyle::Normal,
            weight: None,
            size: 10.0,
            families: vec!["sans-serif".to_string()],
        }
    }
}

/// A run of text at `(x, y)` in user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRun<'t> {
    pub text: &'t str,
    pub x: f64,
    pub y: f64,
    /// Stretch or compress the run to this advance width
    pub max_width: Option<f64>,
    /// Absolute x of every glyph, when positioned individually
    pub glyph_x: Option<&'t [f64]>,
}

/// Encoded image ready to be embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

impl RasterImage {
    pub fn new(mime_type: &'static str, data: Vec<u8>) -> Self {
        Self { mime_type, data }
    }

    /// `data:<mime>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        crate::images::data_url(self.mime_type, &self.data)
    }
}

/// Drawing operations needed by metafile replay.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);
    fn set_transform(&mut self, m: Matrix);
    fn translate(&mut self, x: f64, y: f64);
    /// Clockwise rotation in radians (canvas convention, y pointing down)
    fn rotate(&mut self, radians: f64);
    fn set_fill_style(&mut self, paint: Paint);
    fn set_stroke_style(&mut self, paint: Paint);
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_font(&mut self, font: FontSpec);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn fill(&mut self);
    fn stroke(&mut self);

    fn fill_text(&mut self, run: &TextRun<'_>);
    fn stroke_text(&mut self, run: &TextRun<'_>);
    fn draw_image(&mut self, image: &RasterImage, x: f64, y: f64, width: f64, height: f64);

    /// Decode `bitmap` and `mask` (BMP files) and composite them into one
    /// image with alpha. Blocks until the pixels are available.
    fn materialize_masked(&mut self, bitmap: &[u8], mask: &[u8]) -> Result<RasterImage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_multiply_order() {
        let scale = Matrix::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let translate = Matrix::new(1.0, 0.0, 0.0, 1.0, 10.0, 5.0);
        // Translate in scaled space
        let m = scale.multiply(&translate);
        assert_eq!(m.apply(1.0, 1.0), (22.0, 12.0));
        assert_eq!(m.scale(), 2.0);
    }

    #[test]
    fn test_rgb_ignores_high_byte() {
        assert_eq!(Rgb::from_u32(0xFF11_2233), Rgb { r: 0x11, g: 0x22, b: 0x33 });
    }

    #[test]
    fn test_data_url() {
        let image = RasterImage::new("image/png", b"abc".to_vec());
        assert_eq!(image.to_data_url(), "data:image/png;base64,YWJj");
    }
}
