//! SVM constants and enumerations
//!
//! Action type codes as written by VCL's `MetaAction::Write`, plus the unit
//! conversion used for every length and coordinate field.

/// File signature at offset 0
pub const SIGNATURE: &[u8; 6] = b"VCLMTF";

/// Unicode text encoding marker (`RTL_TEXTENCODING_UNICODE`)
pub const CHARSET_UNICODE: u16 = 0xFFFF;

/// Pixels per stored unit: 1/100 mm to CSS pixels at 96 dpi.
pub const PX_PER_UNIT: f64 = 96.0 / 2540.0;

/// Deepest chain of metafiles embedded in transparency records that is drawn
pub const MAX_NESTING_DEPTH: usize = 8;

/// `BM` signature of an embedded DIB file header
pub const BITMAP_MAGIC: u16 = 0x4D42;

/// SVM action type codes
#[allow(dead_code)]
pub mod action {
    pub const NULL: u16 = 0;
    pub const PIXEL: u16 = 100;
    pub const POINT: u16 = 101;
    pub const LINE: u16 = 102;
    pub const RECT: u16 = 103;
    pub const ROUNDRECT: u16 = 104;
    pub const ELLIPSE: u16 = 105;
    pub const ARC: u16 = 106;
    pub const PIE: u16 = 107;
    pub const CHORD: u16 = 108;
    pub const POLYLINE: u16 = 109;
    pub const POLYGON: u16 = 110;
    pub const POLYPOLYGON: u16 = 111;
    pub const TEXT: u16 = 112;
    pub const TEXTARRAY: u16 = 113;
    pub const STRETCHTEXT: u16 = 114;
    pub const TEXTRECT: u16 = 115;
    pub const BMP: u16 = 116;
    pub const BMPSCALE: u16 = 117;
    pub const BMPSCALEPART: u16 = 118;
    pub const BMPEX: u16 = 119;
    pub const BMPEXSCALE: u16 = 120;
    pub const BMPEXSCALEPART: u16 = 121;
    pub const MASK: u16 = 122;
    pub const MASKSCALE: u16 = 123;
    pub const MASKSCALEPART: u16 = 124;
    pub const GRADIENT: u16 = 125;
    pub const HATCH: u16 = 126;
    pub const WALLPAPER: u16 = 127;
    pub const CLIPREGION: u16 = 128;
    pub const ISECTRECTCLIPREGION: u16 = 129;
    pub const ISECTREGIONCLIPREGION: u16 = 130;
    pub const MOVECLIPREGION: u16 = 131;
    pub const LINECOLOR: u16 = 132;
    pub const FILLCOLOR: u16 = 133;
    pub const TEXTCOLOR: u16 = 134;
    pub const TEXTFILLCOLOR: u16 = 135;
    pub const TEXTALIGN: u16 = 136;
    pub const MAPMODE: u16 = 137;
    pub const FONT: u16 = 138;
    pub const PUSH: u16 = 139;
    pub const POP: u16 = 140;
    pub const RASTEROP: u16 = 141;
    pub const TRANSPARENT: u16 = 142;
    pub const EPS: u16 = 143;
    pub const REFPOINT: u16 = 144;
    pub const TEXTLINECOLOR: u16 = 145;
    pub const TEXTLINE: u16 = 146;
    pub const FLOATTRANSPARENT: u16 = 147;
    pub const GRADIENTEX: u16 = 148;
    pub const LAYOUTMODE: u16 = 149;
    pub const TEXTLANGUAGE: u16 = 150;
    pub const OVERLINECOLOR: u16 = 151;
    pub const COMMENT: u16 = 512;
}

static ACTION_NAMES: phf::Map<u16, &'static str> = phf::phf_map! {
    0u16 => "META_NULL_ACTION",
    100u16 => "META_PIXEL_ACTION",
    101u16 => "META_POINT_ACTION",
    102u16 => "META_LINE_ACTION",
    103u16 => "META_RECT_ACTION",
    104u16 => "META_ROUNDRECT_ACTION",
    105u16 => "META_ELLIPSE_ACTION",
    106u16 => "META_ARC_ACTION",
    107u16 => "META_PIE_ACTION",
    108u16 => "META_CHORD_ACTION",
    109u16 => "META_POLYLINE_ACTION",
    110u16 => "META_POLYGON_ACTION",
    111u16 => "META_POLYPOLYGON_ACTION",
    112u16 => "META_TEXT_ACTION",
    113u16 => "META_TEXTARRAY_ACTION",
    114u16 => "META_STRETCHTEXT_ACTION",
    115u16 => "META_TEXTRECT_ACTION",
    116u16 => "META_BMP_ACTION",
    117u16 => "META_BMPSCALE_ACTION",
    118u16 => "META_BMPSCALEPART_ACTION",
    119u16 => "META_BMPEX_ACTION",
    120u16 => "META_BMPEXSCALE_ACTION",
    121u16 => "META_BMPEXSCALEPART_ACTION",
    122u16 => "META_MASK_ACTION",
    123u16 => "META_MASKSCALE_ACTION",
    124u16 => "META_MASKSCALEPART_ACTION",
    125u16 => "META_GRADIENT_ACTION",
    126u16 => "META_HATCH_ACTION",
    127u16 => "META_WALLPAPER_ACTION",
    128u16 => "META_CLIPREGION_ACTION",
    129u16 => "META_ISECTRECTCLIPREGION_ACTION",
    130u16 => "META_ISECTREGIONCLIPREGION_ACTION",
    131u16 => "META_MOVECLIPREGION_ACTION",
    132u16 => "META_LINECOLOR_ACTION",
    133u16 => "META_FILLCOLOR_ACTION",
    134u16 => "META_TEXTCOLOR_ACTION",
    135u16 => "META_TEXTFILLCOLOR_ACTION",
    136u16 => "META_TEXTALIGN_ACTION",
    137u16 => "META_MAPMODE_ACTION",
    138u16 => "META_FONT_ACTION",
    139u16 => "META_PUSH_ACTION",
    140u16 => "META_POP_ACTION",
    141u16 => "META_RASTEROP_ACTION",
    142u16 => "META_TRANSPARENT_ACTION",
    143u16 => "META_EPS_ACTION",
    144u16 => "META_REFPOINT_ACTION",
    145u16 => "META_TEXTLINECOLOR_ACTION",
    146u16 => "META_TEXTLINE_ACTION",
    147u16 => "META_FLOATTRANSPARENT_ACTION",
    148u16 => "META_GRADIENTEX_ACTION",
    149u16 => "META_LAYOUTMODE_ACTION",
    150u16 => "META_TEXTLANGUAGE_ACTION",
    151u16 => "META_OVERLINECOLOR_ACTION",
    512u16 => "META_COMMENT_ACTION",
};

/// Human-readable name of an action type code.
///
/// Codes outside the known table are reported as `META_UNKNOWN_ACTION(<code>)`.
pub fn action_name(code: u16) -> String {
    match ACTION_NAMES.get(&code) {
        Some(name) => (*name).to_string(),
        None => format!("META_UNKNOWN_ACTION({code})"),
    }
}
