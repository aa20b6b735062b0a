use std::path::Path;
use std::process::ExitCode;

use truetype_atlas::backend::SwashBackend;
use truetype_atlas::data::FileSystemSource;
use truetype_atlas::texture::{MemoryTextureProvider, Texture};
use truetype_atlas::{FaceCache, FontConfig, FontResource, PixelFormat};

fn main() -> ExitCode {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--print-config") {
        match toml::to_string_pretty(&FontConfig::default()) {
            Ok(s) => print!("{s}"),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("ttatlas {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return ExitCode::SUCCESS;
    }

    let paths: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|a| !a.starts_with('-'))
        .collect();
    if paths.is_empty() {
        print_help();
        return ExitCode::FAILURE;
    }

    match run(Path::new(paths[0]), paths.get(1).map(Path::new)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("ttatlas {}", env!("CARGO_PKG_VERSION"));
    println!("Rasterize a TrueType font into a glyph atlas\n");
    println!("USAGE:");
    println!("    ttatlas [OPTIONS] <config.toml> [output.png]\n");
    println!("OPTIONS:");
    println!("    --print-config    Print the default configuration to stdout");
    println!("    --version, -V     Print version information");
    println!("    --help, -h        Print this help message");
}

fn run(config_path: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = FontConfig::load(config_path)?;
    let root = config_path.parent().unwrap_or_else(|| Path::new("."));
    let data = FileSystemSource::new(root);
    let textures = MemoryTextureProvider::default();

    let mut font = FontResource::new(config, FaceCache::new())?;
    font.initialise(&data, &SwashBackend::new(), &textures)?;

    let Some(texture) = font.texture() else {
        return Err("font built without a texture".into());
    };
    log::info!(
        "font '{}': {} glyphs, {}x{} {:?} atlas, default height {}px",
        font.name(),
        font.glyph_count(),
        texture.width(),
        texture.height(),
        texture.format(),
        font.default_height()
    );
    for (first, last) in font.code_point_ranges() {
        log::debug!("  {first:#06x}..={last:#06x}");
    }

    if let Some(path) = output {
        write_png(texture, path)?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}

/// Save the atlas as a gray+alpha or RGBA PNG, matching its pixel format.
fn write_png(texture: &dyn Texture, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let pixels = texture
        .buffer()
        .ok_or("atlas texture has no CPU copy")?
        .to_vec();
    let (w, h) = (texture.width(), texture.height());
    match texture.format() {
        PixelFormat::La8 => image::GrayAlphaImage::from_raw(w, h, pixels)
            .ok_or("atlas buffer size mismatch")?
            .save(path)?,
        PixelFormat::Rgba8 => image::RgbaImage::from_raw(w, h, pixels)
            .ok_or("atlas buffer size mismatch")?
            .save(path)?,
    }
    Ok(())
}
