//! StarView Metafile stream reader
//!
//! Every read goes through one [`SvmReader`], which owns the cursor and the
//! text charset selected by the most recent font record. Versioned blocks
//! (`VersionCompat`: u16 version, u32 length) always leave the cursor at the
//! end of the block, whatever the decoder understood of its content.

use super::constants::{BITMAP_MAGIC, CHARSET_UNICODE, PX_PER_UNIT, SIGNATURE, action};
use crate::common::binary::{
    BinaryError, decode_utf16le, decode_windows1252, read_i8, read_i16_le, read_i32_le, read_u8,
    read_u16_le, read_u32_le,
};
use crate::images::svm::surface::Rgb;
use thiserror::Error;

/// Fatal metafile decoding errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SvmError {
    /// The stream does not start with `VCLMTF`
    #[error("missing VCLMTF signature")]
    BadSignature,

    /// A read ran past the end of the stream
    #[error("truncated metafile: {0}")]
    Truncated(#[from] BinaryError),

    /// A field whose width cannot be determined
    #[error("undecodable {primitive} at offset {offset}")]
    UnknownPrimitive {
        primitive: &'static str,
        offset: usize,
    },
}

/// Result type for metafile decoding
pub type SvmResult<T> = std::result::Result<T, SvmError>;

/// Version and extent of a versioned block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionCompat {
    pub version: u16,
    pub length: u32,
    /// Absolute offset of the first byte after the block
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    pub numerator: u32,
    pub denominator: u32,
}

impl Fraction {
    /// Value of the fraction; a zero denominator counts as 1:1.
    pub fn value(&self) -> f64 {
        if self.denominator == 0 {
            1.0
        } else {
            self.numerator as f64 / self.denominator as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapMode {
    pub unit: u16,
    pub origin: Point,
    pub scale_x: Fraction,
    pub scale_y: Fraction,
    pub is_simple: bool,
}

/// Metafile header. Width and height are already in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Header {
    pub version: u16,
    pub compression_mode: u32,
    pub map_mode: MapMode,
    pub width: f64,
    pub height: f64,
    pub action_count: u32,
}

/// Font record fields in stream order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Font {
    pub family: String,
    pub style: String,
    pub font_width: f64,
    pub font_height: f64,
    pub charset: u16,
    pub family_kind: u16,
    pub pitch: u16,
    pub weight: u16,
    pub underline: u16,
    pub strikeout: u16,
    pub italic: u16,
    pub language: u16,
    pub width: f64,
    /// Tenths of a degree, counter-clockwise
    pub orientation: i16,
    pub wordline: bool,
    pub outline: bool,
    pub shadow: bool,
    pub kerning: u8,
    // v2
    pub relief: Option<i8>,
    pub cjk_language: Option<u16>,
    pub vertical: Option<bool>,
    pub emphasis: Option<u16>,
    // v3
    pub overline: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineInfo {
    pub style: u16,
    pub width: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gradient {
    pub style: u16,
    pub start_color: Rgb,
    pub end_color: Rgb,
    pub angle: u16,
    pub border: u16,
    pub offset_x: u16,
    pub offset_y: u16,
    pub intensity_start: u16,
    pub intensity_end: u16,
    pub step_count: u16,
}

/// Transparency attached to a `BitmapEx`.
#[derive(Debug, Clone, PartialEq)]
pub enum Transparency<'a> {
    None,
    Color(Rgb),
    /// A second DIB whose luminance encodes coverage
    Mask(&'a [u8]),
}

/// Bitmap with optional transparency. Bitmaps are complete BMP files.
#[derive(Debug, Clone, PartialEq)]
pub struct BitmapEx<'a> {
    pub bitmap: &'a [u8],
    pub transparency: Transparency<'a>,
}

/// One decoded action record.
#[derive(Debug, Clone, PartialEq)]
pub enum Action<'a> {
    Font(Font),
    Text {
        point: Point,
        text: String,
    },
    TextArray {
        point: Point,
        text: String,
        /// End offset of each glyph relative to `point.x`
        dx: Vec<f64>,
    },
    StretchText {
        point: Point,
        text: String,
        width: f64,
    },
    FillColor {
        color: Rgb,
        set: bool,
    },
    LineColor {
        color: Rgb,
        set: bool,
    },
    TextColor(Rgb),
    TextFillColor {
        color: Rgb,
        set: bool,
    },
    TextLineColor {
        color: Rgb,
        set: bool,
    },
    Rect(Rect),
    PolyLine {
        points: Vec<Point>,
        line_info: Option<LineInfo>,
    },
    PolyPolygon(Vec<Vec<Point>>),
    Transparent {
        polygons: Vec<Vec<Point>>,
        percent: u16,
    },
    BmpExScale {
        bitmap: BitmapEx<'a>,
        point: Point,
        size: Size,
    },
    FloatTransparent {
        /// The nested metafile, signature included
        metafile: &'a [u8],
        point: Point,
        size: Size,
        gradient: Gradient,
    },
    /// Decoded only far enough to be skipped
    Unsupported(u16),
}

/// An action together with its record header.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord<'a> {
    pub code: u16,
    pub version: u16,
    pub action: Action<'a>,
}

/// Cursor over a metafile byte stream.
#[derive(Debug, Clone)]
pub struct SvmReader<'a> {
    data: &'a [u8],
    pos: usize,
    charset: u16,
}

impl<'a> SvmReader<'a> {
    /// Check the signature and position the cursor right after it.
    pub fn new(data: &'a [u8]) -> SvmResult<Self> {
        if !data.starts_with(SIGNATURE) {
            return Err(SvmError::BadSignature);
        }
        Ok(Self {
            data,
            pos: SIGNATURE.len(),
            charset: 0,
        })
    }

    /// Current cursor offset from the start of the stream.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Charset used for 8-bit strings, set by font records.
    pub fn charset(&self) -> u16 {
        self.charset
    }

    pub fn u8(&mut self) -> SvmResult<u8> {
        let v = read_u8(self.data, self.pos)?;
        self.pos += 1;
        Ok(v)
    }

    pub fn i8(&mut self) -> SvmResult<i8> {
        let v = read_i8(self.data, self.pos)?;
        self.pos += 1;
        Ok(v)
    }

    pub fn bool(&mut self) -> SvmResult<bool> {
        Ok(self.u8()? != 0)
    }

    pub fn u16(&mut self) -> SvmResult<u16> {
        let v = read_u16_le(self.data, self.pos)?;
        self.pos += 2;
        Ok(v)
    }

    pub fn i16(&mut self) -> SvmResult<i16> {
        let v = read_i16_le(self.data, self.pos)?;
        self.pos += 2;
        Ok(v)
    }

    pub fn u32(&mut self) -> SvmResult<u32> {
        let v = read_u32_le(self.data, self.pos)?;
        self.pos += 4;
        Ok(v)
    }

    pub fn i32(&mut self) -> SvmResult<i32> {
        let v = read_i32_le(self.data, self.pos)?;
        self.pos += 4;
        Ok(v)
    }

    fn bytes(&mut self, len: usize) -> SvmResult<&'a [u8]> {
        let end = self.pos.saturating_add(len);
        let slice = self
            .data
            .get(self.pos..end)
            .ok_or(BinaryError::InsufficientData {
                expected: end,
                available: self.data.len(),
            })?;
        self.pos = end;
        Ok(slice)
    }

    /// Unsigned length in 1/100 mm, converted to pixels.
    fn length_px(&mut self) -> SvmResult<f64> {
        Ok(self.u32()? as f64 * PX_PER_UNIT)
    }

    /// Signed coordinate in 1/100 mm, converted to pixels.
    fn coord_px(&mut self) -> SvmResult<f64> {
        Ok(self.i32()? as f64 * PX_PER_UNIT)
    }

    pub fn version_compat(&mut self) -> SvmResult<VersionCompat> {
        let version = self.u16()?;
        let length = self.u32()?;
        Ok(VersionCompat {
            version,
            length,
            end: self.pos.saturating_add(length as usize),
        })
    }

    /// Read a versioned block, then move the cursor to its declared end.
    pub fn compat<T>(
        &mut self,
        f: impl FnOnce(&mut Self, VersionCompat) -> SvmResult<T>,
    ) -> SvmResult<T> {
        let compat = self.version_compat()?;
        let value = f(self, compat)?;
        self.pos = compat.end;
        Ok(value)
    }

    pub fn point(&mut self) -> SvmResult<Point> {
        Ok(Point {
            x: self.coord_px()?,
            y: self.coord_px()?,
        })
    }

    pub fn size(&mut self) -> SvmResult<Size> {
        Ok(Size {
            width: self.length_px()?,
            height: self.length_px()?,
        })
    }

    pub fn rect(&mut self) -> SvmResult<Rect> {
        Ok(Rect {
            left: self.coord_px()?,
            top: self.coord_px()?,
            right: self.coord_px()?,
            bottom: self.coord_px()?,
        })
    }

    pub fn color(&mut self) -> SvmResult<Rgb> {
        Ok(Rgb::from_u32(self.u32()?))
    }

    pub fn fraction(&mut self) -> SvmResult<Fraction> {
        Ok(Fraction {
            numerator: self.u32()?,
            denominator: self.u32()?,
        })
    }

    /// u16 length followed by Windows-1252 bytes.
    pub fn byte_string(&mut self) -> SvmResult<String> {
        let len = self.u16()? as usize;
        Ok(decode_windows1252(self.bytes(len)?))
    }

    /// u16 length followed by UTF-16LE code units.
    pub fn utf16_string(&mut self) -> SvmResult<String> {
        let len = self.u16()? as usize;
        Ok(decode_utf16le(self.bytes(len.saturating_mul(2))?))
    }

    /// Text string in the active charset.
    pub fn string(&mut self) -> SvmResult<String> {
        if self.charset == CHARSET_UNICODE {
            let len = self.u32()? as usize;
            Ok(decode_utf16le(self.bytes(len.saturating_mul(2))?))
        } else {
            self.byte_string()
        }
    }

    pub fn polygon(&mut self) -> SvmResult<Vec<Point>> {
        let count = self.u16()? as usize;
        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            points.push(self.point()?);
        }
        Ok(points)
    }

    pub fn poly_polygon(&mut self) -> SvmResult<Vec<Vec<Point>>> {
        let count = self.u16()? as usize;
        let mut polygons = Vec::with_capacity(count);
        for _ in 0..count {
            polygons.push(self.polygon()?);
        }
        Ok(polygons)
    }

    pub fn map_mode(&mut self) -> SvmResult<MapMode> {
        self.compat(|r, _| {
            Ok(MapMode {
                unit: r.u16()?,
                origin: r.point()?,
                scale_x: r.fraction()?,
                scale_y: r.fraction()?,
                is_simple: r.bool()?,
            })
        })
    }

    pub fn header(&mut self) -> SvmResult<Header> {
        self.compat(|r, compat| {
            Ok(Header {
                version: compat.version,
                compression_mode: r.u32()?,
                map_mode: r.map_mode()?,
                width: r.length_px()?,
                height: r.length_px()?,
                action_count: r.u32()?,
            })
        })
    }

    pub fn font(&mut self) -> SvmResult<Font> {
        self.compat(|r, compat| {
            let mut font = Font {
                family: r.byte_string()?,
                style: r.byte_string()?,
                font_width: r.length_px()?,
                font_height: r.length_px()?,
                charset: r.u16()?,
                family_kind: r.u16()?,
                pitch: r.u16()?,
                weight: r.u16()?,
                underline: r.u16()?,
                strikeout: r.u16()?,
                italic: r.u16()?,
                language: r.u16()?,
                width: r.u16()? as f64 * PX_PER_UNIT,
                orientation: r.i16()?,
                wordline: r.bool()?,
                outline: r.bool()?,
                shadow: r.bool()?,
                kerning: r.u8()?,
                ..Default::default()
            };
            if compat.version >= 2 {
                font.relief = Some(r.i8()?);
                font.cjk_language = Some(r.u16()?);
                font.vertical = Some(r.bool()?);
                font.emphasis = Some(r.u16()?);
            }
            if compat.version >= 3 {
                font.overline = Some(r.u16()?);
            }
            Ok(font)
        })
    }

    pub fn line_info(&mut self) -> SvmResult<LineInfo> {
        // Dash/dot fields (v2) and line join (v3) are skipped by the block end
        self.compat(|r, _| {
            Ok(LineInfo {
                style: r.u16()?,
                width: r.i32()?,
            })
        })
    }

    pub fn gradient(&mut self) -> SvmResult<Gradient> {
        self.compat(|r, _| {
            Ok(Gradient {
                style: r.u16()?,
                start_color: r.color()?,
                end_color: r.color()?,
                angle: r.u16()?,
                border: r.u16()?,
                offset_x: r.u16()?,
                offset_y: r.u16()?,
                intensity_start: r.u16()?,
                intensity_end: r.u16()?,
                step_count: r.u16()?,
            })
        })
    }

    /// A DIB file (`BM` header included). A size running past the end of
    /// the stream is clamped to `limit`.
    pub fn bitmap(&mut self, limit: usize) -> SvmResult<&'a [u8]> {
        let start = self.pos;
        if self.u16()? != BITMAP_MAGIC {
            return Err(SvmError::UnknownPrimitive {
                primitive: "bitmap",
                offset: start,
            });
        }
        let size = self.u32()? as usize;
        let mut end = start.saturating_add(size);
        if end > self.data.len() {
            end = limit.min(self.data.len());
        }
        if end < self.pos {
            return Err(SvmError::UnknownPrimitive {
                primitive: "bitmap",
                offset: start,
            });
        }
        self.pos = end;
        Ok(&self.data[start..end])
    }

    pub fn bitmap_ex(&mut self, limit: usize) -> SvmResult<BitmapEx<'a>> {
        let bitmap = self.bitmap(limit)?;
        let _magic1 = self.u32()?;
        let _magic2 = self.u32()?;
        let transparency = match self.u8()? {
            1 => Transparency::Color(self.color()?),
            2 => Transparency::Mask(self.bitmap(limit)?),
            _ => Transparency::None,
        };
        Ok(BitmapEx {
            bitmap,
            transparency,
        })
    }

    /// Locate a nested metafile starting at the cursor and step over it.
    ///
    /// The nested stream is walked record by record exactly as a full
    /// decode would, so the outer cursor lands where the inner decode ends.
    pub fn metafile(&mut self) -> SvmResult<&'a [u8]> {
        let start = self.pos;
        let rest = self.data.get(start..).unwrap_or_default();
        let mut inner = SvmReader::new(rest)?;
        let header = inner.header()?;
        for _ in 0..header.action_count {
            inner.u16()?;
            let compat = inner.version_compat()?;
            inner.pos = compat.end;
        }
        let consumed = inner.pos;
        self.pos = start.saturating_add(consumed);
        Ok(&rest[..consumed.min(rest.len())])
    }

    /// Text record body: string, then index and length into it.
    fn text_body(
        &mut self,
        compat: VersionCompat,
        stretch: bool,
        dx: bool,
    ) -> SvmResult<(String, Option<f64>, Vec<f64>)> {
        let text = self.string()?;
        let width = if stretch {
            Some(self.length_px()?)
        } else {
            None
        };
        let index = self.u16()? as usize;
        let len = self.u16()? as usize;
        let mut offsets = Vec::new();
        if dx {
            let count = self.u32()? as usize;
            if count.saturating_mul(4) > self.data.len().saturating_sub(self.pos) {
                return Err(SvmError::Truncated(BinaryError::InsufficientData {
                    expected: self.pos.saturating_add(count.saturating_mul(4)),
                    available: self.data.len(),
                }));
            }
            offsets.reserve(count);
            for _ in 0..count {
                offsets.push(self.coord_px()?);
            }
        }
        let text = if compat.version >= 2 {
            self.utf16_string()?
        } else {
            text
        };
        let text: String = text.chars().skip(index).take(len).collect();
        Ok((text, width, offsets))
    }

    /// Read the next action record. The cursor always ends at the record's
    /// declared end.
    pub fn action(&mut self) -> SvmResult<ActionRecord<'a>> {
        let code = self.u16()?;
        self.compat(|r, compat| {
            let action = r.action_body(code, compat)?;
            Ok(ActionRecord {
                code,
                version: compat.version,
                action,
            })
        })
    }

    fn action_body(&mut self, code: u16, compat: VersionCompat) -> SvmResult<Action<'a>> {
        let action = match code {
            action::FONT => {
                let font = self.font()?;
                self.charset = font.charset;
                Action::Font(font)
            },
            action::TEXT => {
                let point = self.point()?;
                let (text, _, _) = self.text_body(compat, false, false)?;
                Action::Text { point, text }
            },
            action::TEXTARRAY => {
                let point = self.point()?;
                let (text, _, dx) = self.text_body(compat, false, true)?;
                Action::TextArray { point, text, dx }
            },
            action::STRETCHTEXT => {
                let point = self.point()?;
                let (text, width, _) = self.text_body(compat, true, false)?;
                Action::StretchText {
                    point,
                    text,
                    width: width.unwrap_or_default(),
                }
            },
            action::FILLCOLOR => Action::FillColor {
                color: self.color()?,
                set: self.bool()?,
            },
            action::LINECOLOR => Action::LineColor {
                color: self.color()?,
                set: self.bool()?,
            },
            action::TEXTCOLOR => Action::TextColor(self.color()?),
            action::TEXTFILLCOLOR => Action::TextFillColor {
                color: self.color()?,
                set: self.bool()?,
            },
            action::TEXTLINECOLOR => Action::TextLineColor {
                color: self.color()?,
                set: self.bool()?,
            },
            action::RECT => Action::Rect(self.rect()?),
            action::POLYLINE => {
                let mut points = self.polygon()?;
                let mut line_info = None;
                if compat.version >= 2 {
                    line_info = Some(self.line_info()?);
                }
                if compat.version >= 3 && self.bool()? {
                    points = self.polygon()?;
                }
                Action::PolyLine { points, line_info }
            },
            action::POLYPOLYGON => {
                let mut polygons = self.poly_polygon()?;
                if compat.version >= 2 {
                    let complex = self.u16()?;
                    for _ in 0..complex {
                        let index = self.u16()? as usize;
                        let polygon = self.polygon()?;
                        if let Some(slot) = polygons.get_mut(index) {
                            *slot = polygon;
                        }
                    }
                }
                Action::PolyPolygon(polygons)
            },
            action::TRANSPARENT => Action::Transparent {
                polygons: self.poly_polygon()?,
                percent: self.u16()?,
            },
            action::BMPEXSCALE => {
                // Point and size follow the bitmap data
                let limit = compat.end.saturating_sub(16);
                Action::BmpExScale {
                    bitmap: self.bitmap_ex(limit)?,
                    point: self.point()?,
                    size: self.size()?,
                }
            },
            action::FLOATTRANSPARENT => Action::FloatTransparent {
                metafile: self.metafile()?,
                point: self.point()?,
                size: self.size()?,
                gradient: self.gradient()?,
            },
            other => Action::Unsupported(other),
        };
        Ok(action)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Little-endian stream builder for synthetic metafiles.
    #[derive(Default)]
    pub(crate) struct StreamBuilder {
        pub bytes: Vec<u8>,
    }

    impl StreamBuilder {
        pub fn u8(&mut self, v: u8) -> &mut Self {
            self.bytes.push(v);
            self
        }
        pub fn u16(&mut self, v: u16) -> &mut Self {
            self.bytes.extend_from_slice(&v.to_le_bytes());
            self
        }
        pub fn u32(&mut self, v: u32) -> &mut Self {
            self.bytes.extend_from_slice(&v.to_le_bytes());
            self
        }
        pub fn i32(&mut self, v: i32) -> &mut Self {
            self.bytes.extend_from_slice(&v.to_le_bytes());
            self
        }
        pub fn raw(&mut self, v: &[u8]) -> &mut Self {
            self.bytes.extend_from_slice(v);
            self
        }
        /// Version-compat block around the bytes written by `body`.
        pub fn compat(&mut self, version: u16, body: impl FnOnce(&mut Self)) -> &mut Self {
            let mut inner = StreamBuilder::default();
            body(&mut inner);
            self.u16(version).u32(inner.bytes.len() as u32);
            self.bytes.extend_from_slice(&inner.bytes);
            self
        }
        pub fn record(&mut self, code: u16, version: u16, body: impl FnOnce(&mut Self)) -> &mut Self {
            self.u16(code).compat(version, body)
        }
    }

    /// Signature and header for a `width` x `height` (1/100 mm) metafile.
    pub(crate) fn metafile(width: u32, height: u32, actions: u32) -> StreamBuilder {
        let mut b = StreamBuilder::default();
        b.raw(SIGNATURE).compat(1, |h| {
            h.u32(0)
                .compat(1, |m| {
                    m.u16(0).i32(0).i32(0).u32(1).u32(1).u32(1).u32(1).u8(1);
                })
                .u32(width)
                .u32(height)
                .u32(actions);
        });
        b
    }

    #[test]
    fn test_rejects_bad_signature() {
        assert_eq!(SvmReader::new(b"NOTSVM").unwrap_err(), SvmError::BadSignature);
    }

    #[test]
    fn test_header_converts_units() {
        let b = metafile(2540, 5080, 0);
        let mut reader = SvmReader::new(&b.bytes).unwrap();
        let header = reader.header().unwrap();
        assert!((header.width - 96.0).abs() < 1e-9);
        assert!((header.height - 192.0).abs() < 1e-9);
        assert_eq!(header.action_count, 0);
        assert_eq!(header.map_mode.scale_x.value(), 1.0);
        assert_eq!(reader.position(), b.bytes.len());
    }

    #[test]
    fn test_record_end_is_declared_length() {
        let mut b = metafile(100, 100, 2);
        // Fill color followed by eight bytes nobody knows about
        b.record(action::FILLCOLOR, 1, |r| {
            r.u32(0x00FF0000).u8(1).raw(&[0xAB; 8]);
        });
        let payload_start = b.bytes.len() - 13;
        b.record(action::LINECOLOR, 1, |r| {
            r.u32(0x000000FF).u8(0);
        });

        let mut reader = SvmReader::new(&b.bytes).unwrap();
        reader.header().unwrap();
        let first = reader.action().unwrap();
        assert_eq!(
            first.action,
            Action::FillColor {
                color: Rgb { r: 255, g: 0, b: 0 },
                set: true
            }
        );
        assert_eq!(reader.position(), payload_start + 13);

        let second = reader.action().unwrap();
        assert_eq!(
            second.action,
            Action::LineColor {
                color: Rgb { r: 0, g: 0, b: 255 },
                set: false
            }
        );
        assert_eq!(reader.position(), b.bytes.len());
    }

    #[test]
    fn test_unknown_action_skipped_in_full() {
        let mut b = metafile(100, 100, 1);
        b.record(999, 1, |r| {
            r.raw(&[1, 2, 3, 4, 5]);
        });
        let mut reader = SvmReader::new(&b.bytes).unwrap();
        reader.header().unwrap();
        let record = reader.action().unwrap();
        assert_eq!(record.action, Action::Unsupported(999));
        assert_eq!(reader.position(), b.bytes.len());
    }

    #[test]
    fn test_unicode_charset_switches_string_width() {
        let mut b = metafile(100, 100, 2);
        b.record(action::FONT, 1, |r| {
            r.compat(1, |f| {
                f.u16(5).raw(b"Arial").u16(0);
                f.u32(0).u32(423);
                f.u16(CHARSET_UNICODE).u16(0).u16(0).u16(8);
                f.u16(0).u16(0).u16(0).u16(0).u16(0);
                f.u16(0).u8(0).u8(0).u8(0).u8(0);
            });
        });
        b.record(action::TEXT, 1, |r| {
            r.i32(0).i32(0).u32(2).raw(&[b'O', 0, b'K', 0]).u16(0).u16(2);
        });

        let mut reader = SvmReader::new(&b.bytes).unwrap();
        reader.header().unwrap();
        match reader.action().unwrap().action {
            Action::Font(font) => {
                assert_eq!(font.family, "Arial");
                assert_eq!(font.weight, 8);
            },
            other => panic!("expected font, got {other:?}"),
        }
        assert_eq!(reader.charset(), CHARSET_UNICODE);
        match reader.action().unwrap().action {
            Action::Text { text, .. } => assert_eq!(text, "OK"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_text_array_v2_prefers_utf16() {
        let mut b = metafile(100, 100, 1);
        b.record(action::TEXTARRAY, 2, |r| {
            r.i32(2540).i32(0);
            r.u16(3).raw(b"abc").u16(1).u16(2);
            r.u32(2).i32(254).i32(508);
            r.u16(3).raw(&[b'x', 0, 0xE9, 0, b'z', 0]);
        });
        let mut reader = SvmReader::new(&b.bytes).unwrap();
        reader.header().unwrap();
        match reader.action().unwrap().action {
            Action::TextArray { point, text, dx } => {
                assert!((point.x - 96.0).abs() < 1e-9);
                assert_eq!(text, "éz");
                assert_eq!(dx.len(), 2);
                assert!((dx[1] - 19.2).abs() < 1e-9);
            },
            other => panic!("expected text array, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_record_is_fatal() {
        let mut b = metafile(100, 100, 1);
        b.u16(action::RECT).u16(1).u32(16).i32(0);
        let mut reader = SvmReader::new(&b.bytes).unwrap();
        reader.header().unwrap();
        assert!(matches!(reader.action(), Err(SvmError::Truncated(_))));
    }

    #[test]
    fn test_bitmap_without_signature_is_fatal() {
        let mut b = metafile(100, 100, 1);
        b.record(action::BMPEXSCALE, 1, |r| {
            r.raw(b"XX").u32(6).raw(&[0; 16]);
        });
        let mut reader = SvmReader::new(&b.bytes).unwrap();
        reader.header().unwrap();
        assert!(matches!(
            reader.action(),
            Err(SvmError::UnknownPrimitive {
                primitive: "bitmap",
                ..
            })
        ));
    }

    #[test]
    fn test_nested_metafile_advances_outer_cursor() {
        let mut inner = metafile(1270, 1270, 1);
        inner.record(action::FILLCOLOR, 1, |r| {
            r.u32(0x123456).u8(1);
        });
        let inner_len = inner.bytes.len();

        let mut b = metafile(2540, 2540, 1);
        b.record(action::FLOATTRANSPARENT, 1, |r| {
            r.raw(&inner.bytes);
            r.i32(0).i32(0).u32(2540).u32(2540);
            r.compat(1, |g| {
                g.u16(0).u32(0).u32(0xFFFFFF).u16(0).u16(0).u16(0).u16(0);
                g.u16(100).u16(100).u16(0);
            });
        });

        let mut reader = SvmReader::new(&b.bytes).unwrap();
        reader.header().unwrap();
        match reader.action().unwrap().action {
            Action::FloatTransparent {
                metafile,
                size,
                gradient,
                ..
            } => {
                assert_eq!(metafile.len(), inner_len);
                assert!(metafile.starts_with(SIGNATURE));
                assert!((size.width - 96.0).abs() < 1e-9);
                assert_eq!(gradient.end_color, Rgb::from_u32(0xFFFFFF));
            },
            other => panic!("expected float transparent, got {other:?}"),
        }
        assert_eq!(reader.position(), b.bytes.len());
    }

    #[test]
    fn test_polypolygon_v2_replaces_complex_polygons() {
        let mut b = metafile(100, 100, 1);
        b.record(action::POLYPOLYGON, 2, |r| {
            r.u16(2);
            r.u16(1).i32(0).i32(0);
            r.u16(1).i32(2540).i32(2540);
            r.u16(1);
            r.u16(1).u16(2).i32(0).i32(0).i32(5080).i32(0);
        });
        let mut reader = SvmReader::new(&b.bytes).unwrap();
        reader.header().unwrap();
        match reader.action().unwrap().action {
            Action::PolyPolygon(polygons) => {
                assert_eq!(polygons.len(), 2);
                assert_eq!(polygons[0].len(), 1);
                assert_eq!(polygons[1].len(), 2);
                assert!((polygons[1][1].x - 192.0).abs() < 1e-9);
            },
            other => panic!("expected polypolygon, got {other:?}"),
        }
    }
}
