//! SVG recording surface
//!
//! Records canvas-style drawing calls as compact SVG. Path coordinates are
//! transformed when they are added, so paths carry no transform attribute;
//! text and images keep the current matrix as `transform="matrix(...)"`.

use super::bitmap::composite_masked;
use super::surface::{FontSpec, FontStyle, Matrix, Paint, RasterImage, Surface, TextRun};
use crate::common::error::Result;
use crate::common::xml::escape_xml;
use crate::images::svg_utils::{write_font_families, write_num, write_rgb, write_transform_attr};

#[derive(Debug, Clone)]
struct DrawState {
    transform: Matrix,
    fill: Paint,
    stroke: Paint,
    alpha: f64,
    font: FontSpec,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Matrix::IDENTITY,
            // Canvas defaults
            fill: Some(Default::default()),
            stroke: Some(Default::default()),
            alpha: 1.0,
            font: FontSpec::default(),
        }
    }
}

/// SVG document builder implementing [`Surface`].
#[derive(Debug)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    body: String,
    path: String,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            body: String::with_capacity(4096),
            path: String::new(),
            state: DrawState::default(),
            stack: Vec::new(),
        }
    }

    /// Close the document and return the SVG markup.
    pub fn finish(self) -> String {
        let mut svg = String::with_capacity(self.body.len() + 192);
        svg.push_str(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width=""#,
        );
        write_num(&mut svg, self.width);
        svg.push_str(r#"" height=""#);
        write_num(&mut svg, self.height);
        svg.push_str(r#"" viewBox="0 0 "#);
        write_num(&mut svg, self.width);
        svg.push(' ');
        write_num(&mut svg, self.height);
        svg.push_str(r#"">"#);
        svg.push_str(&self.body);
        svg.push_str("</svg>");
        svg
    }

    fn point(&mut self, cmd: char, x: f64, y: f64) {
        let (tx, ty) = self.state.transform.apply(x, y);
        self.path.push(cmd);
        write_num(&mut self.path, tx);
        self.path.push(' ');
        write_num(&mut self.path, ty);
    }

    fn write_opacity(&mut self, attr: &str) {
        if self.state.alpha < 1.0 {
            self.body.push(' ');
            self.body.push_str(attr);
            self.body.push_str("=\"");
            write_num(&mut self.body, self.state.alpha.max(0.0));
            self.body.push('"');
        }
    }

    fn write_stroke_attrs(&mut self) {
        let Some(color) = self.state.stroke else {
            return;
        };
        self.body.push_str(" stroke=\"");
        write_rgb(&mut self.body, color);
        self.body.push('"');
        let width = self.state.transform.scale();
        if (width - 1.0).abs() > 0.005 {
            self.body.push_str(" stroke-width=\"");
            write_num(&mut self.body, width);
            self.body.push('"');
        }
        self.write_opacity("stroke-opacity");
    }

    fn write_font_attrs(&mut self) {
        let font = &self.state.font;
        self.body.push_str(" font-family=\"");
        write_font_families(&mut self.body, &font.families);
        self.body.push_str("\" font-size=\"");
        write_num(&mut self.body, font.size);
        self.body.push('"');
        match font.style {
            FontStyle::Normal => {},
            FontStyle::Italic => self.body.push_str(" font-style=\"italic\""),
            FontStyle::Oblique => self.body.push_str(" font-style=\"oblique\""),
        }
        if let Some(weight) = font.weight {
            self.body.push_str(" font-weight=\"");
            self.body.push_str(&weight.to_string());
            self.body.push('"');
        }
    }

    fn text(&mut self, run: &TextRun<'_>, fill: bool) {
        self.body.push_str("<text");
        match run.glyph_x {
            Some(xs) if !xs.is_empty() => {
                self.body.push_str(" x=\"");
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 {
                        self.body.push(' ');
                    }
                    write_num(&mut self.body, run.x + x);
                }
                self.body.push('"');
            },
            _ => {
                self.body.push_str(" x=\"");
                write_num(&mut self.body, run.x);
                self.body.push('"');
            },
        }
        self.body.push_str(" y=\"");
        write_num(&mut self.body, run.y);
        self.body.push('"');
        self.write_font_attrs();
        if let Some(width) = run.max_width.filter(|w| *w > 0.0) {
            self.body.push_str(" textLength=\"");
            write_num(&mut self.body, width);
            self.body.push_str("\" lengthAdjust=\"spacingAndGlyphs\"");
        }
        if fill {
            if let Some(color) = self.state.fill {
                self.body.push_str(" fill=\"");
                write_rgb(&mut self.body, color);
                self.body.push('"');
            }
            self.write_opacity("fill-opacity");
        } else {
            self.body.push_str(" fill=\"none\"");
            self.write_stroke_attrs();
        }
        let transform = self.state.transform;
        write_transform_attr(&mut self.body, &transform);
        self.body.push('>');
        self.body.push_str(&escape_xml(run.text));
        self.body.push_str("</text>");
    }
}

impl Surface for SvgSurface {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn set_transform(&mut self, m: Matrix) {
        self.state.transform = m;
    }

    fn translate(&mut self, x: f64, y: f64) {
        let t = Matrix::new(1.0, 0.0, 0.0, 1.0, x, y);
        self.state.transform = self.state.transform.multiply(&t);
    }

    fn rotate(&mut self, radians: f64) {
        if radians == 0.0 {
            return;
        }
        let (sin, cos) = radians.sin_cos();
        let r = Matrix::new(cos, sin, -sin, cos, 0.0, 0.0);
        self.state.transform = self.state.transform.multiply(&r);
    }

    fn set_fill_style(&mut self, paint: Paint) {
        self.state.fill = paint;
    }

    fn set_stroke_style(&mut self, paint: Paint) {
        self.state.stroke = paint;
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_font(&mut self, font: FontSpec) {
        self.state.font = font;
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.point('M', x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        if self.path.is_empty() {
            self.point('M', x, y);
        } else {
            self.point('L', x, y);
        }
    }

    fn close_path(&mut self) {
        if !self.path.is_empty() {
            self.path.push('Z');
        }
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.move_to(x, y);
        self.point('L', x + width, y);
        self.point('L', x + width, y + height);
        self.point('L', x, y + height);
        self.path.push('Z');
    }

    fn fill(&mut self) {
        let Some(color) = self.state.fill else {
            return;
        };
        if self.path.is_empty() {
            return;
        }
        self.body.push_str("<path d=\"");
        self.body.push_str(&self.path);
        self.body.push_str("\" fill=\"");
        write_rgb(&mut self.body, color);
        self.body.push('"');
        self.write_opacity("fill-opacity");
        self.body.push_str("/>");
    }

    fn stroke(&mut self) {
        if self.state.stroke.is_none() || self.path.is_empty() {
            return;
        }
        self.body.push_str("<path d=\"");
        self.body.push_str(&self.path);
        self.body.push_str("\" fill=\"none\"");
        self.write_stroke_attrs();
        self.body.push_str("/>");
    }

    fn fill_text(&mut self, run: &TextRun<'_>) {
        if self.state.fill.is_some() && !run.text.is_empty() {
            self.text(run, true);
        }
    }

    fn stroke_text(&mut self, run: &TextRun<'_>) {
        if self.state.stroke.is_some() && !run.text.is_empty() {
            self.text(run, false);
        }
    }

    fn draw_image(&mut self, image: &RasterImage, x: f64, y: f64, width: f64, height: f64) {
        self.body.push_str("<image x=\"");
        write_num(&mut self.body, x);
        self.body.push_str("\" y=\"");
        write_num(&mut self.body, y);
        self.body.push_str("\" width=\"");
        write_num(&mut self.body, width);
        self.body.push_str("\" height=\"");
        write_num(&mut self.body, height);
        self.body.push_str("\" preserveAspectRatio=\"none\"");
        self.write_opacity("opacity");
        let transform = self.state.transform;
        write_transform_attr(&mut self.body, &transform);
        self.body.push_str(" xlink:href=\"");
        self.body.push_str(&image.to_data_url());
        self.body.push_str("\"/>");
    }

    fn materialize_masked(&mut self, bitmap: &[u8], mask: &[u8]) -> Result<RasterImage> {
        composite_masked(bitmap, mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::svm::surface::Rgb;

    #[test]
    fn test_transparent_paint_draws_nothing() {
        let mut s = SvgSurface::new(10.0, 10.0);
        s.set_fill_style(None);
        s.set_stroke_style(None);
        s.begin_path();
        s.rect(0.0, 0.0, 5.0, 5.0);
        s.fill();
        s.stroke();
        assert_eq!(s.body, "");
    }

    #[test]
    fn test_rect_fill_in_device_space() {
        let mut s = SvgSurface::new(10.0, 10.0);
        s.set_transform(Matrix::new(2.0, 0.0, 0.0, 2.0, -1.0, 0.0));
        s.set_fill_style(Some(Rgb { r: 255, g: 0, b: 0 }));
        s.set_stroke_style(None);
        s.begin_path();
        s.rect(1.0, 1.0, 2.0, 1.0);
        s.fill();
        assert_eq!(s.body, "<path d=\"M1 2L5 2L5 4L1 4Z\" fill=\"#ff0000\"/>");
    }

    #[test]
    fn test_save_restore_and_alpha() {
        let mut s = SvgSurface::new(10.0, 10.0);
        s.set_fill_style(Some(Rgb::default()));
        s.save();
        s.set_global_alpha(0.25);
        s.translate(3.0, 4.0);
        s.fill_text(&TextRun {
            text: "a<b",
            x: 0.0,
            y: 0.0,
            max_width: None,
            glyph_x: None,
        });
        s.restore();
        assert_eq!(s.state.alpha, 1.0);
        assert!(s.body.contains("fill-opacity=\"0.25\""));
        assert!(s.body.contains("transform=\"matrix(1 0 0 1 3 4)\""));
        assert!(s.body.ends_with(">a&lt;b</text>"));
    }

    #[test]
    fn test_finish_wraps_body() {
        let s = SvgSurface::new(96.0, 48.5);
        let svg = s.finish();
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("width=\"96\" height=\"48.5\" viewBox=\"0 0 96 48.5\""));
        assert!(svg.ends_with("></svg>"));
    }
}
