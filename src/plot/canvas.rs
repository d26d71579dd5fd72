use crate::config::RenderOptions;
use crate::error::{PulseError, Result};
use crate::output::write_atomic;
use ignore::WalkBuilder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::colors::colormaps::{ColorMap, ViridisRGB};
use plotters::style::FontStyle;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

pub const SERIES_BLUE: RGBColor = RGBColor(31, 119, 180);
pub const SERIES_ORANGE: RGBColor = RGBColor(255, 127, 14);
pub const GRID_GRAY: RGBColor = RGBColor(128, 128, 128);
pub const FONT: &str = "sans-serif";

const FONT_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

const FONT_FILES: &[&str] = &[
    "DejaVuSans.ttf",
    "LiberationSans-Regular.ttf",
    "Arial.ttf",
    "arial.ttf",
    "Helvetica.ttf",
    "NotoSans-Regular.ttf",
    "FreeSans.ttf",
    "Roboto-Regular.ttf",
];

static TEXT_ENABLED: OnceLock<bool> = OnceLock::new();

/// Registers the first usable system font with plotters. Without one, charts are drawn
/// with no text at all.
pub fn text_enabled() -> bool {
    *TEXT_ENABLED.get_or_init(|| match find_font() {
        Some((path, bytes)) => {
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            match plotters::style::register_font(FONT, FontStyle::Normal, bytes) {
                Ok(()) => {
                    debug!(font = %path.display(), "registered chart font");
                    true
                }
                Err(_) => {
                    warn!(font = %path.display(), "font could not be parsed; rendering charts without text");
                    false
                }
            }
        }
        None => {
            warn!("no usable font found; rendering charts without text");
            false
        }
    })
}

fn find_font() -> Option<(PathBuf, Vec<u8>)> {
    let mut dirs: Vec<PathBuf> = FONT_DIRS.iter().map(PathBuf::from).collect();
    if let Some(home) = std::env::var_os("HOME") {
        dirs.push(Path::new(&home).join(".fonts"));
        dirs.push(Path::new(&home).join(".local/share/fonts"));
    }

    for wanted in FONT_FILES {
        for dir in dirs.iter().filter(|d| d.is_dir()) {
            let found = WalkBuilder::new(dir)
                .standard_filters(false)
                .follow_links(true)
                .build()
                .filter_map(|entry| entry.ok())
                .find(|entry| entry.file_name().to_str() == Some(*wanted));
            if let Some(entry) = found {
                if let Ok(bytes) = std::fs::read(entry.path()) {
                    return Some((entry.into_path(), bytes));
                }
            }
        }
    }
    None
}

/// Pixel geometry for one figure at the configured DPI.
#[derive(Debug, Clone, Copy)]
pub struct Figure {
    pub width: u32,
    pub height: u32,
    pub opts: RenderOptions,
    pub text: bool,
}

impl Figure {
    pub fn new(opts: RenderOptions, width_in: f64, height_in: f64) -> Self {
        Self {
            width: opts.pixels(width_in).max(1),
            height: opts.pixels(height_in).max(1),
            opts,
            text: text_enabled(),
        }
    }

    pub fn pt(&self, points: f64) -> f64 {
        self.opts.points(points)
    }

    pub fn px(&self, points: f64) -> u32 {
        self.pt(points).round().max(1.0) as u32
    }

    pub fn font(&self, points: f64) -> FontDesc<'static> {
        (FONT, self.pt(points)).into_font()
    }

    /// Label count when text is available, zero otherwise.
    pub fn labels(&self, n: usize) -> usize {
        if self.text {
            n
        } else {
            0
        }
    }

    /// Label count for an axis over whole-number data, see [`whole_ticks`].
    pub fn whole_labels(&self, lo: f64, hi: f64, n: usize) -> usize {
        self.labels(whole_ticks(lo, hi, n))
    }

    /// Space reserved for axis labels; collapses when there is no text to place.
    pub fn label_area(&self, points: f64) -> u32 {
        if self.text {
            self.px(points)
        } else {
            self.px(6.0)
        }
    }

    /// Renders into an RGB buffer and writes it to `path` as PNG.
    pub fn render<F>(&self, path: &Path, draw: F) -> Result<()>
    where
        F: FnOnce(&DrawingArea<BitMapBackend, Shift>) -> Result<()>,
    {
        let mut buffer = vec![0u8; self.width as usize * self.height as usize * 3];
        {
            let root =
                BitMapBackend::with_buffer(&mut buffer, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE).map_err(PulseError::render)?;
            draw(&root)?;
            root.present().map_err(PulseError::render)?;
        }
        self.write_png(path, &buffer)
    }

    fn write_png(&self, path: &Path, buffer: &[u8]) -> Result<()> {
        // pHYs is expressed in pixels per metre.
        let ppm = (self.opts.dpi as f64 / 0.0254).round() as u32;
        let mut encode_error = None;
        write_atomic(path, |out| {
            let mut encoder = png::Encoder::new(out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_compression(png::Compression::Fast);
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppm,
                yppu: ppm,
                unit: png::Unit::Meter,
            }));
            let encoded = encoder.write_header().and_then(|mut writer| {
                writer.write_image_data(buffer)?;
                writer.finish()
            });
            encoded.map_err(|e| match e {
                png::EncodingError::IoError(io) => io,
                other => {
                    let io = std::io::Error::other(other.to_string());
                    encode_error = Some(other);
                    io
                }
            })
        })
        .map_err(|err| match encode_error {
            Some(e) => PulseError::render(e),
            None => err,
        })
    }
}

/// Caps `n` at the number of integers in `lo..=hi` so plotters settles on a whole tick step.
pub fn whole_ticks(lo: f64, hi: f64, n: usize) -> usize {
    let span = (hi - lo).max(0.0).floor() as usize;
    n.min(span + 1).max(1)
}

/// Tick text with only the decimals the value needs.
pub fn tick_label(v: f64) -> String {
    let rounded = v.round();
    if (v - rounded).abs() < 1e-9 * v.abs().max(1.0) {
        return format!("{}", rounded as i64);
    }
    let text = format!("{v:.6}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn viridis(t: f64) -> RGBColor {
    ViridisRGB.get_color(t.clamp(0.0, 1.0) as f32)
}

/// Vertical viridis gradient from `lo` (bottom) to `hi` (top) with a labelled axis.
pub fn draw_colorbar(
    area: &DrawingArea<BitMapBackend, Shift>,
    fig: &Figure,
    lo: f64,
    hi: f64,
    label: Option<&str>,
) -> Result<()> {
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, lo + 0.5) };
    let mut chart = ChartBuilder::on(area)
        .margin_top(fig.px(24.0))
        .margin_bottom(fig.px(36.0))
        .margin_left(fig.px(6.0))
        .margin_right(fig.px(6.0))
        .y_label_area_size(0)
        .right_y_label_area_size(fig.label_area(40.0))
        .build_cartesian_2d(0.0..1.0, lo..hi)
        .map_err(PulseError::render)?
        .set_secondary_coord(0.0..1.0, lo..hi);

    let tick = |v: &f64| tick_label(*v);
    let mut axes = chart.configure_secondary_axes();
    axes.y_labels(fig.whole_labels(lo, hi, 6))
        .label_style(fig.font(9.0))
        .y_label_formatter(&tick);
    if let (true, Some(label)) = (fig.text, label) {
        axes.y_desc(label).axis_desc_style(fig.font(10.0));
    }
    axes.draw().map_err(PulseError::render)?;

    let steps = 256;
    let step = (hi - lo) / steps as f64;
    chart
        .draw_series((0..steps).map(|i| {
            let y0 = lo + step * i as f64;
            let color = viridis((i as f64 + 0.5) / steps as f64);
            Rectangle::new([(0.0, y0), (1.0, y0 + step)], color.filled())
        }))
        .map_err(PulseError::render)?;
    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(0.0, lo), (1.0, hi)],
            BLACK.stroke_width(fig.px(0.5)),
        )))
        .map_err(PulseError::render)?;
    Ok(())
}
