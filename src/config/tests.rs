//! Configuration unit tests.

use truetype_atlas_core::AtlasSize;
use truetype_atlas_core::code_point;

use super::*;

#[test]
fn default_config_roundtrip() {
    let cfg = FontConfig::default();
    let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
    let parsed: FontConfig = toml::from_str(&toml_str).expect("deserialize");
    assert_eq!(parsed, cfg);
    assert_eq!(parsed.resolution, 96);
    assert!(!parsed.antialias);
    assert_eq!(parsed.substitute_code, code_point::NOT_DEFINED);
    assert_eq!(
        parsed.texture_size,
        TextureSize::Fixed {
            width: 0,
            height: 0
        }
    );
}

#[test]
fn partial_toml_uses_defaults() {
    let toml_str = r#"
source = "fonts/DejaVuSans.ttf"
size = 10.5
texture_size = "auto"

[[codes]]
range = "32 126"
"#;
    let parsed = FontConfig::from_toml(toml_str).expect("deserialize");
    assert_eq!(parsed.source, "fonts/DejaVuSans.ttf");
    assert!((parsed.size - 10.5).abs() < f32::EPSILON);
    assert_eq!(parsed.texture_size, TextureSize::Auto);
    assert_eq!(parsed.resolution, 96);
    assert_eq!(parsed.codes.len(), 1);
}

#[test]
fn empty_toml_gives_defaults() {
    let parsed = FontConfig::from_toml("").expect("deserialize");
    assert_eq!(parsed, FontConfig::default());
}

#[test]
fn bad_texture_size_in_toml_is_an_error() {
    let err = FontConfig::from_toml(r#"texture_size = "big""#).unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn texture_size_parsing() {
    assert_eq!("Auto".parse::<TextureSize>().unwrap(), TextureSize::Auto);
    assert_eq!("auto".parse::<TextureSize>().unwrap(), TextureSize::Auto);
    assert_eq!(
        "300".parse::<TextureSize>().unwrap(),
        TextureSize::Fixed {
            width: 512,
            height: 512
        }
    );
    assert_eq!(
        "256 100".parse::<TextureSize>().unwrap(),
        TextureSize::Fixed {
            width: 256,
            height: 128
        }
    );
    assert!("".parse::<TextureSize>().is_err());
    assert!("wide".parse::<TextureSize>().is_err());
}

#[test]
fn texture_size_resolution() {
    let planned = AtlasSize::new(256, 1024);
    assert_eq!(TextureSize::Auto.resolve(planned), planned);
    assert_eq!(
        TextureSize::default().resolve(planned),
        AtlasSize::new(512, 1024)
    );
    let fixed = TextureSize::Fixed {
        width: 2048,
        height: 0,
    };
    assert_eq!(fixed.resolve(planned), AtlasSize::new(2048, 1024));
}

#[test]
fn set_property_applies_known_keys() {
    let mut cfg = FontConfig::default();
    for (key, value) in [
        ("Source", "Comic.ttf"),
        ("Size", "19"),
        ("Resolution", "72"),
        ("Antialias", "true"),
        ("TabWidth", "20.5"),
        ("OffsetHeight", "-2"),
        ("SubstituteCode", "63"),
        ("TextureSize", "1024 512"),
    ] {
        cfg.set_property(key, value).unwrap();
    }

    assert_eq!(cfg.source, "Comic.ttf");
    assert!((cfg.size - 19.0).abs() < f32::EPSILON);
    assert_eq!(cfg.resolution, 72);
    assert!(cfg.antialias);
    assert!((cfg.tab_width - 20.5).abs() < f32::EPSILON);
    assert_eq!(cfg.offset_height, -2);
    assert_eq!(cfg.substitute_code, 63);
    assert_eq!(
        cfg.texture_size,
        TextureSize::Fixed {
            width: 1024,
            height: 512
        }
    );
}

#[test]
fn deprecated_keys_are_accepted() {
    let mut cfg = FontConfig::default();
    cfg.set_property("SpaceWidth", "4").unwrap();
    cfg.set_property("CursorWidth", "2").unwrap();
    cfg.set_property("Distance", "5").unwrap();
    cfg.set_property("Shadow", "whatever").unwrap();
    assert!((cfg.space_width - 4.0).abs() < f32::EPSILON);
}

#[test]
fn invalid_property_value_names_key() {
    let mut cfg = FontConfig::default();
    let err = cfg.set_property("Size", "huge").unwrap_err();
    match err {
        ConfigError::InvalidValue { key, value } => {
            assert_eq!(key, "Size");
            assert_eq!(value, "huge");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(cfg.set_property("Antialias", "yes").is_err());
}

#[test]
fn range_parsing() {
    assert_eq!(parse_range("32 126").unwrap(), Some((32, 126)));
    assert_eq!(parse_range("0x400 0x4FF").unwrap(), Some((0x400, 0x4FF)));
    assert_eq!(parse_range("65").unwrap(), Some((65, 65)));
    assert_eq!(parse_range("  ").unwrap(), None);
    assert!(parse_range("a b").is_err());
    assert!(parse_range("1 2 3").is_err());
}

#[test]
fn no_inclusions_means_bmp() {
    let cfg = FontConfig::default();
    let set = cfg.code_points().unwrap();
    assert_eq!(set.ranges(), vec![(0, 0xFFFF)]);
}

#[test]
fn inclusions_then_exclusions() {
    let mut cfg = FontConfig::default();
    cfg.add_code(Some("32 126"), None);
    cfg.add_code(None, Some("48 57"));
    cfg.add_code(Some("0x410 0x44F"), Some("0x419"));
    let set = cfg.code_points().unwrap();
    assert_eq!(
        set.ranges(),
        vec![(32, 47), (58, 126), (0x410, 0x418), (0x41A, 0x44F)]
    );
}

#[test]
fn exclusions_apply_after_default_bmp() {
    let mut cfg = FontConfig::default();
    cfg.add_code(None, Some("0 31"));
    cfg.add_code(None, Some("0x80 0xFFFF"));
    let set = cfg.code_points().unwrap();
    assert_eq!(set.ranges(), vec![(32, 0x7F)]);
}

#[test]
fn malformed_code_range_is_an_error() {
    let mut cfg = FontConfig::default();
    cfg.add_code(Some("x"), None);
    assert!(matches!(cfg.code_points(), Err(ConfigError::InvalidRange(_))));
}

#[test]
fn range_past_unicode_is_rejected() {
    assert_eq!(parse_range("0 0x10FFFF").unwrap(), Some((0, 0x10FFFF)));
    assert!(matches!(parse_range("0 4294967295"), Err(ConfigError::InvalidRange(_))));
    assert!(matches!(parse_range("0x110000"), Err(ConfigError::InvalidRange(_))));

    let mut cfg = FontConfig::default();
    cfg.add_code(Some("32 126"), Some("0 4294967295"));
    assert!(matches!(cfg.code_points(), Err(ConfigError::InvalidRange(_))));
}
