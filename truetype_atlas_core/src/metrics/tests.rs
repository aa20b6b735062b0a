use super::{FontExtents, Os2Metrics, RawGlyphMetrics, SizeMetrics, from_f26dot6, layout_differs, to_f26dot6};
use crate::glyph::GlyphInfo;

#[test]
fn fixed_point_conversion() {
    assert_eq!(from_f26dot6(64), 1.0);
    assert_eq!(from_f26dot6(96), 1.5);
    assert_eq!(from_f26dot6(-32), -0.5);
    assert_eq!(to_f26dot6(10.0), 640);
    assert_eq!(to_f26dot6(0.5), 32);
}

#[test]
fn glyph_info_from_raw_metrics() {
    let raw = RawGlyphMetrics {
        width: 7 * 64,
        height: 10 * 64,
        hori_bearing_x: 64,
        hori_bearing_y: 9 * 64,
        advance_x: 9 * 64,
    };
    let info = raw.to_glyph_info(0x41, 12, 0);

    assert_eq!(info.code_point, 0x41);
    assert_eq!(info.width, 7.0);
    assert_eq!(info.height, 10.0);
    assert_eq!(info.bearing_x, 1.0);
    // Advance excludes the left bearing.
    assert_eq!(info.advance, 8.0);
    // Measured down from the line top.
    assert_eq!(info.bearing_y, 3.0);
}

#[test]
fn offset_height_shifts_bearing_y() {
    let raw = RawGlyphMetrics {
        hori_bearing_y: 8 * 64,
        ..RawGlyphMetrics::default()
    };
    assert_eq!(raw.to_glyph_info(0x2E, 12, 0).bearing_y, 4.0);
    assert_eq!(raw.to_glyph_info(0x2E, 12, 3).bearing_y, 1.0);
    assert_eq!(raw.to_glyph_info(0x2E, 12, -2).bearing_y, 6.0);
}

#[test]
fn fractional_metrics_are_preserved() {
    let raw = RawGlyphMetrics {
        width: 421,
        height: 600,
        hori_bearing_x: 40,
        hori_bearing_y: 600,
        advance_x: 512,
    };
    let info = raw.to_glyph_info(0x61, 10, 0);
    assert_eq!(info.width, 421.0 / 64.0);
    assert_eq!(info.advance, 8.0 - 40.0 / 64.0);
    assert_eq!(info.pixel_width(), 7);
    assert_eq!(info.pixel_height(), 10);
}

#[test]
fn layout_differs_on_any_metric() {
    let layout = GlyphInfo::new(0x42, 6.0, 9.0, 7.0, 1.0, 2.0);
    let mut rendered = layout;
    rendered.bearing_y = 3.0;
    assert!(layout_differs(&rendered, &layout));
    rendered.bearing_y = 2.0;
    rendered.width = 7.0;
    assert!(layout_differs(&rendered, &layout));
}

#[test]
fn layout_ignores_code_point_and_placement() {
    let layout = GlyphInfo::new(0, 6.0, 9.0, 7.0, 1.0, 2.0);
    let mut rendered = GlyphInfo::new(0x43, 6.0, 9.0, 7.0, 1.0, 2.0);
    rendered.place(3, 4, 64, 64);
    assert!(!layout_differs(&rendered, &layout));
}

#[test]
fn extents_from_size_metrics_only() {
    let size = SizeMetrics {
        ascender: 10 * 64 + 20,
        descender: -(3 * 64),
        y_ppem: 13,
    };
    let ext = FontExtents::compute(&size, None);
    assert_eq!(ext.ascent, 10);
    assert_eq!(ext.descent, 3);
    assert_eq!(ext.height(), 13);
}

#[test]
fn extents_take_largest_source() {
    let size = SizeMetrics {
        ascender: 9 * 64,
        descender: -(2 * 64),
        y_ppem: 16,
    };
    // Win metrics give the larger ascent, typo metrics the larger descent.
    let os2 = Os2Metrics {
        units_per_em: 1000,
        win_ascent: 800,
        win_descent: 150,
        typo_ascender: 700,
        typo_descender: -250,
    };
    let ext = FontExtents::compute(&size, Some(&os2));
    assert_eq!(ext.ascent, 12); // 800 * 16 / 1000
    assert_eq!(ext.descent, 4); // 250 * 16 / 1000
    assert_eq!(ext.height(), 16);
}

#[test]
fn extents_ignore_os2_with_zero_units_per_em() {
    let size = SizeMetrics {
        ascender: 5 * 64,
        descender: -64,
        y_ppem: 8,
    };
    let os2 = Os2Metrics {
        win_ascent: 5000,
        ..Os2Metrics::default()
    };
    let ext = FontExtents::compute(&size, Some(&os2));
    assert_eq!(ext, FontExtents { ascent: 5, descent: 1 });
}
