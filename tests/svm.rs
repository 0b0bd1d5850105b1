mod common;

use common::Svm;
use odthtml::images::svm::constants::action;
use odthtml::{Error, decode_svm};

fn svg(data: &[u8]) -> String {
    String::from_utf8(data.to_vec()).expect("SVG output is UTF-8")
}

#[test]
fn one_inch_is_96_pixels() {
    let mut svm = Svm::new(2540, 5080, 2);
    svm.record(action::FILLCOLOR, 1, |r| {
        r.u32(0x336699).u8(1);
    });
    svm.record(action::RECT, 1, |r| {
        r.i32(0).i32(0).i32(1270).i32(1270);
    });

    let image = decode_svm(&svm.bytes).expect("decode");
    assert_eq!(image.mime_type, "image/svg+xml");
    assert!((image.width - 96.0).abs() < 1e-9);
    assert!((image.height - 192.0).abs() < 1e-9);
    let svg = svg(&image.data);
    assert!(svg.contains("width=\"96\" height=\"192\""));
    assert!(svg.contains("<path d=\"M0 0L48 0L48 48L0 48Z\" fill=\"#336699\"/>"));
    assert!(image.unsupported.is_empty());
}

#[test]
fn records_end_at_their_declared_length() {
    let mut svm = Svm::new(2540, 2540, 2);
    // Fill color from a newer writer, with trailing fields this reader skips
    svm.record(action::FILLCOLOR, 3, |r| {
        r.u32(0x336699).u8(1).raw(&[0xEE; 12]);
    });
    svm.record(action::RECT, 1, |r| {
        r.i32(0).i32(0).i32(1270).i32(1270);
    });

    let image = decode_svm(&svm.bytes).expect("decode");
    assert!(svg(&image.data).contains("<path d=\"M0 0L48 0L48 48L0 48Z\" fill=\"#336699\"/>"));
}

#[test]
fn unknown_actions_are_listed_once() {
    let mut svm = Svm::new(2540, 2540, 4);
    svm.record(999, 1, |r| {
        r.raw(&[1, 2, 3]);
    });
    svm.record(action::HATCH, 1, |r| {
        r.raw(&[0; 8]);
    });
    svm.record(999, 1, |_| {});
    svm.record(action::HATCH, 1, |_| {});

    let image = decode_svm(&svm.bytes).expect("decode");
    assert_eq!(
        image.unsupported,
        ["META_UNKNOWN_ACTION(999)", "META_HATCH_ACTION"]
    );
}

#[test]
fn truncated_stream_is_fatal() {
    let mut svm = Svm::new(2540, 2540, 1);
    svm.u16(action::RECT).u16(1).u32(16).i32(0);
    assert!(matches!(decode_svm(&svm.bytes), Err(Error::SvmFatal(_))));
    assert!(matches!(decode_svm(b"NOTSVM"), Err(Error::SvmFatal(_))));
}

#[test]
fn polylines_are_filled_without_closing() {
    let mut svm = Svm::new(2540, 2540, 3);
    svm.record(action::FILLCOLOR, 1, |r| {
        r.u32(0x336699).u8(1);
    });
    svm.record(action::LINECOLOR, 1, |r| {
        r.u32(0xFF0000).u8(1);
    });
    svm.record(action::POLYLINE, 1, |r| {
        r.u16(3).i32(0).i32(0).i32(2540).i32(0).i32(2540).i32(2540);
    });

    let image = decode_svm(&svm.bytes).expect("decode");
    let svg = svg(&image.data);
    assert!(svg.contains("<path d=\"M0 0L96 0L96 96\" fill=\"#336699\"/>"));
    assert!(svg.contains("<path d=\"M0 0L96 0L96 96\" fill=\"none\" stroke=\"#ff0000\""));
    assert!(image.unsupported.is_empty());
}

#[test]
fn polygons_are_closed_then_filled_and_stroked() {
    let mut svm = Svm::new(2540, 2540, 3);
    svm.record(action::FILLCOLOR, 1, |r| {
        r.u32(0x336699).u8(1);
    });
    svm.record(action::LINECOLOR, 1, |r| {
        r.u32(0xFF0000).u8(1);
    });
    svm.record(action::POLYPOLYGON, 1, |r| {
        r.u16(1).u16(3).i32(0).i32(0).i32(2540).i32(0).i32(2540).i32(2540);
    });

    let image = decode_svm(&svm.bytes).expect("decode");
    let svg = svg(&image.data);
    assert!(svg.contains("<path d=\"M0 0L96 0L96 96Z\" fill=\"#336699\"/>"));
    assert!(svg.contains("<path d=\"M0 0L96 0L96 96Z\" fill=\"none\" stroke=\"#ff0000\""));
}
