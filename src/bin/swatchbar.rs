#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::{
    ffi::OsStr,
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use image::{
    codecs::{
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType, PngEncoder},
    },
    RgbImage,
};
use palette::Srgb;
use swatchbar::{
    apply_export_resize, BarOptions, ExportScale, PaletteSize, QuantizeMethod, SwatchAspect,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Extracts a color palette from an image and saves the image with a swatch bar beneath it.
#[derive(Parser)]
#[command(version, about)]
struct Options {
    /// The image to read.
    input: PathBuf,

    /// Where to save the image with the bar. The format follows the extension.
    output: PathBuf,

    /// The number of swatches.
    #[arg(short = 'k', long = "colors", default_value_t = PaletteSize::default(), value_parser = parse_palette_size)]
    k: PaletteSize,

    /// The quantization method: MedianCut, FastOctree, or KMeans (unknown names use MedianCut).
    #[arg(long, default_value = "MedianCut")]
    method: String,

    /// The swatch aspect as `W:H` or a number. Overrides the height ratio.
    #[arg(long)]
    aspect: Option<String>,

    /// The bar height as a fraction of the image height.
    #[arg(long, default_value_t = 0.09)]
    height_ratio: f64,

    /// The minimum bar height (without an aspect).
    #[arg(long, default_value_t = 60)]
    height_min: u32,

    /// The maximum bar height (without an aspect).
    #[arg(long, default_value_t = 200)]
    height_max: u32,

    /// The width of the gaps between swatches.
    #[arg(long, default_value_t = 2)]
    separator: u32,

    /// The thickness of the border.
    #[arg(long, default_value_t = 2)]
    border: u32,

    /// The background color as hex.
    #[arg(long, value_parser = parse_hex)]
    background: Option<Srgb<u8>>,

    /// The separator color as hex.
    #[arg(long, value_parser = parse_hex)]
    separator_color: Option<Srgb<u8>>,

    /// The border color as hex.
    #[arg(long, value_parser = parse_hex)]
    border_color: Option<Srgb<u8>>,

    /// Keep the quantizer order instead of sorting swatches from dark to light.
    #[arg(long)]
    no_sort: bool,

    /// Scale the saved images to this percentage.
    #[arg(long, conflicts_with = "long_edge")]
    scale: Option<u32>,

    /// Scale the saved images so their longer side has this length.
    #[arg(long)]
    long_edge: Option<u32>,

    /// The JPEG quality.
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: u8,

    /// The PNG compression level.
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(0..=9))]
    compression: u8,

    /// Also save the bar alone to this path.
    #[arg(long)]
    bar_output: Option<PathBuf>,

    /// Print the palette as hex colors with pixel counts.
    #[arg(long)]
    print_palette: bool,

    /// The k-means initialization seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// The k-means sampling seed. Sampling is not reproducible without it.
    #[arg(long)]
    sample_seed: Option<u64>,

    /// Log each stage of the pipeline.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_palette_size(s: &str) -> Result<PaletteSize, String> {
    let value: u16 = s.parse().map_err(|e| format!("{e}"))?;
    value.try_into().map_err(|e| format!("{e}"))
}

fn parse_hex(s: &str) -> Result<Srgb<u8>, String> {
    s.parse().map_err(|e| format!("invalid hex color {s:?}: {e}"))
}

impl Options {
    fn bar_options(&self) -> BarOptions {
        let method = match QuantizeMethod::from_name(&self.method) {
            #[cfg(feature = "kmeans")]
            QuantizeMethod::Kmeans(options) => {
                QuantizeMethod::Kmeans(options.seed(self.seed).sample_seed(self.sample_seed))
            }
            method => method,
        };

        let mut options = BarOptions::new()
            .palette_size(self.k)
            .quantize_method(method)
            .height_ratio(self.height_ratio)
            .height_min(self.height_min)
            .height_max(self.height_max)
            .separator_px(self.separator)
            .border_px(self.border)
            .sort_by_luma(!self.no_sort)
            .swatch_aspect(self.aspect.as_deref().map(SwatchAspect::parse));

        if let Some(color) = self.background {
            options = options.background(color);
        }
        if let Some(color) = self.separator_color {
            options = options.separator_color(color);
        }
        if let Some(color) = self.border_color {
            options = options.border_color(color);
        }

        options
    }

    fn export_scale(&self) -> ExportScale {
        match (self.scale, self.long_edge) {
            (_, Some(edge)) => ExportScale::LongEdge(edge),
            (Some(percent), None) => ExportScale::Percent(percent),
            (None, None) => ExportScale::default(),
        }
    }
}

fn compression_type(level: u8) -> CompressionType {
    match level {
        0..=2 => CompressionType::Fast,
        3..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

fn save(image: &RgbImage, path: &Path, quality: u8, compression: u8) -> anyhow::Result<()> {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);

    let create = || {
        File::create(path)
            .map(BufWriter::new)
            .with_context(|| format!("failed to create {}", path.display()))
    };

    match extension.as_deref() {
        Some("jpg" | "jpeg") => {
            let encoder = JpegEncoder::new_with_quality(create()?, quality.clamp(1, 100));
            image.write_with_encoder(encoder)
        }
        Some("png") => {
            let encoder = PngEncoder::new_with_quality(
                create()?,
                compression_type(compression),
                FilterType::Adaptive,
            );
            image.write_with_encoder(encoder)
        }
        _ => image.save(path),
    }
    .with_context(|| format!("failed to save {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let options = Options::parse();

    let default_level = if options.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_target(false).without_time())
        .init();

    let image = image::open(&options.input)
        .with_context(|| format!("failed to open {}", options.input.display()))?
        .into_rgb8();

    let bar_options = options.bar_options();

    #[cfg(feature = "threads")]
    let result = swatchbar::build_palette_bar_par(&image, &bar_options)?;
    #[cfg(not(feature = "threads"))]
    let result = swatchbar::build_palette_bar(&image, &bar_options)?;

    if options.print_palette {
        for sample in result.palette.iter() {
            let (r, g, b) = sample.color.into_components();
            println!("#{r:02x}{g:02x}{b:02x} {}", sample.count);
        }
    }

    let scale = options.export_scale();
    let composite = apply_export_resize(result.composite, scale);
    save(&composite, &options.output, options.quality, options.compression)?;
    info!(
        width = composite.width(),
        height = composite.height(),
        "saved {}",
        options.output.display()
    );

    if let Some(path) = &options.bar_output {
        let bar = apply_export_resize(result.bar, scale);
        save(&bar, path, options.quality, options.compression)?;
        info!(width = bar.width(), height = bar.height(), "saved {}", path.display());
    }

    Ok(())
}
