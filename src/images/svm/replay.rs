//! Replay of decoded metafile actions onto a [`Surface`]
//!
//! Processes action records in stream order, keeping the text colors and
//! rotation that the surface itself does not track.

use super::constants::{MAX_NESTING_DEPTH, action_name};
use super::parser::{Action, BitmapEx, Font, Header, Point, SvmReader, SvmResult, Transparency};
use super::surface::{FontSpec, FontStyle, Matrix, Paint, RasterImage, Rgb, Surface, TextRun};
use log::warn;

/// Replays one metafile onto a surface.
pub struct Renderer<'s, S: Surface> {
    surface: &'s mut S,
    text_fill: Paint,
    text_stroke: Paint,
    /// Degrees, clockwise on screen
    text_rotation: f64,
    /// Number of enclosing metafiles
    depth: usize,
    unsupported: Vec<String>,
}

impl<'s, S: Surface> Renderer<'s, S> {
    pub fn new(surface: &'s mut S) -> Self {
        Self {
            surface,
            text_fill: Some(Rgb::default()),
            text_stroke: None,
            text_rotation: 0.0,
            depth: 0,
            unsupported: Vec::new(),
        }
    }

    /// Renderer for a metafile embedded `depth` levels deep.
    pub(crate) fn nested(surface: &'s mut S, depth: usize) -> Self {
        Self {
            depth,
            ..Self::new(surface)
        }
    }

    /// Replay every action announced by `header`. Returns the names of the
    /// action kinds that were skipped, in first-seen order.
    pub fn replay(mut self, reader: &mut SvmReader<'_>, header: &Header) -> SvmResult<Vec<String>> {
        let map = &header.map_mode;
        self.surface.set_fill_style(None);
        self.surface.set_stroke_style(None);
        self.surface.set_transform(Matrix::new(
            map.scale_x.value(),
            0.0,
            0.0,
            map.scale_y.value(),
            -map.origin.x,
            -map.origin.y,
        ));

        for _ in 0..header.action_count {
            let record = reader.action()?;
            self.apply(record.code, record.action)?;
        }
        Ok(self.unsupported)
    }

    fn note_unsupported(&mut self, name: String) {
        if !self.unsupported.contains(&name) {
            self.unsupported.push(name);
        }
    }

    fn apply(&mut self, code: u16, action: Action<'_>) -> SvmResult<()> {
        match action {
            Action::Font(font) => {
                self.surface.set_font(font_spec(&font));
                self.text_rotation = -(font.orientation as f64) / 10.0;
            },
            Action::Text { point, text } => self.text(point, &text, None, None),
            Action::TextArray { point, text, dx } => {
                // Glyph i starts where glyph i-1 ends
                let glyph_x: Vec<f64> = std::iter::once(0.0)
                    .chain(dx.iter().copied())
                    .take(text.chars().count())
                    .collect();
                self.text(point, &text, None, Some(&glyph_x));
            },
            Action::StretchText { point, text, width } => {
                self.text(point, &text, Some(width), None)
            },
            Action::FillColor { color, set } => {
                self.surface.set_fill_style(set.then_some(color));
            },
            Action::LineColor { color, set } => {
                self.surface.set_stroke_style(set.then_some(color));
            },
            Action::TextColor(color) => self.text_fill = Some(color),
            Action::TextFillColor { color, set } => {
                // Last one of TEXTCOLOR / TEXTFILLCOLOR wins
                if set {
                    self.text_fill = Some(color);
                }
            },
            Action::TextLineColor { color, set } => self.text_stroke = set.then_some(color),
            Action::Rect(rect) => {
                self.surface.begin_path();
                self.surface.rect(
                    rect.left,
                    rect.top,
                    rect.right - rect.left,
                    rect.bottom - rect.top,
                );
                self.surface.fill();
                self.surface.stroke();
            },
            Action::PolyLine { points, .. } => {
                if let Some((first, rest)) = points.split_first() {
                    self.surface.begin_path();
                    self.surface.move_to(first.x, first.y);
                    for p in rest {
                        self.surface.line_to(p.x, p.y);
                    }
                    // Filled as if closed, outline left open
                    self.surface.fill();
                    self.surface.stroke();
                }
            },
            Action::PolyPolygon(polygons) => self.polygons(&polygons),
            Action::Transparent { polygons, percent } => {
                self.surface
                    .set_global_alpha(1.0 - f64::from(percent.min(100)) / 100.0);
                self.polygons(&polygons);
                self.surface.set_global_alpha(1.0);
            },
            Action::BmpExScale {
                bitmap,
                point,
                size,
            } => {
                let image = self.materialize(&bitmap);
                self.surface
                    .draw_image(&image, point.x, point.y, size.width, size.height);
            },
            Action::FloatTransparent {
                metafile,
                point,
                size,
                ..
            } => {
                if self.depth >= MAX_NESTING_DEPTH {
                    warn!("Metafile nested deeper than {MAX_NESTING_DEPTH} levels was skipped");
                    self.note_unsupported(action_name(code));
                    return Ok(());
                }
                let nested = super::decode_nested(metafile, self.depth + 1)?;
                for name in nested.unsupported {
                    self.note_unsupported(name);
                }
                let image = RasterImage::new(nested.mime_type, nested.data);
                self.surface
                    .draw_image(&image, point.x, point.y, size.width, size.height);
            },
            Action::Unsupported(_) => self.note_unsupported(action_name(code)),
        }
        Ok(())
    }

    fn polygons(&mut self, polygons: &[Vec<Point>]) {
        for polygon in polygons {
            let Some((first, rest)) = polygon.split_first() else {
                continue;
            };
            self.surface.begin_path();
            self.surface.move_to(first.x, first.y);
            for p in rest {
                self.surface.line_to(p.x, p.y);
            }
            self.surface.close_path();
            self.surface.fill();
            self.surface.stroke();
        }
    }

    fn text(&mut self, point: Point, text: &str, max_width: Option<f64>, glyph_x: Option<&[f64]>) {
        let run = TextRun {
            text,
            x: 0.0,
            y: 0.0,
            max_width,
            glyph_x,
        };
        self.surface.save();
        self.surface.set_fill_style(self.text_fill);
        self.surface.set_stroke_style(self.text_stroke);
        self.surface.translate(point.x, point.y);
        self.surface.rotate(self.text_rotation.to_radians());
        self.surface.fill_text(&run);
        self.surface.stroke_text(&run);
        self.surface.restore();
    }

    /// Resolve a bitmap to something drawable. Masked bitmaps go through the
    /// surface's blocking compositing call.
    fn materialize(&mut self, bitmap: &BitmapEx<'_>) -> RasterImage {
        let plain = || RasterImage::new("image/bmp", bitmap.bitmap.to_vec());
        match bitmap.transparency {
            Transparency::Mask(mask) => {
                match self.surface.materialize_masked(bitmap.bitmap, mask) {
                    Ok(image) => image,
                    Err(e) => {
                        warn!("SVM masked bitmap could not be composited, drawing it opaque: {e}");
                        plain()
                    },
                }
            },
            Transparency::Color(_) | Transparency::None => plain(),
        }
    }
}

/// Font record to surface font.
fn font_spec(font: &Font) -> FontSpec {
    let style = match font.italic {
        2 => FontStyle::Italic,
        1 => FontStyle::Oblique,
        _ => FontStyle::Normal,
    };
    let weight = match font.weight {
        w @ 1..=10 => Some(((w - 1) * 100).max(100)),
        _ => None,
    };
    let families = font
        .family
        .split(';')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    FontSpec {
        style,
        weight,
        size: font.font_height,
        families: if families.is_empty() {
            FontSpec::default().families
        } else {
            families
        },
    }
}
