#![cfg(feature = "web")]
use image::{ColorType, ImageEncoder, codecs::png::PngEncoder};
use plotters::prelude::*;

use crate::error::{AppError, AppResult};

/// Last month's progress
const PREVIOUS_COLOR: RGBColor = RGBColor(0xB0, 0xBE, 0xC5);
/// Progress added this month
const ADDED_COLOR: RGBColor = RGBColor(0xC6, 0x28, 0x28);

const BAR_BOTTOM: f64 = 0.25;
const BAR_TOP: f64 = 0.75;

/// Widths of the two bar segments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSegments {
    /// Progress reached before this month
    pub previous: f64,
    /// Progress added this month, never negative
    pub added: f64,
}

impl ProgressSegments {
    pub fn new(previous: f64, current: f64) -> Self {
        Self {
            previous,
            added: (current - previous).max(0.0),
        }
    }

    /// Right edge of the second segment
    pub fn end(&self) -> f64 {
        self.previous + self.added
    }
}

/// Pixel size of the rendered chart
#[derive(Clone, Debug)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 900,
            height: 150,
        }
    }
}

/// Render the previous-vs-added progress bar as a PNG
///
/// The x axis is fixed to 0-100 regardless of the values. Axis text and the
/// legend need a system font; without one the bars are still drawn and the
/// image returned.
///
/// # Arguments
/// * `term` - Term label shown as the bar's title, e.g. "초5-2"
/// * `previous` - Progress reached by the end of the prior month (%)
/// * `current` - Progress recorded for the selected month (%)
/// * `options` - Image size in pixels
///
/// # Returns
/// * A Result containing the PNG image data as bytes or an error
///
/// # Errors
/// * Returns `AppError::Chart` if the bars cannot be drawn
/// * Returns `AppError::Chart` if the buffer cannot be encoded as PNG
pub fn render_progress_bar(
    term: &str,
    previous: f64,
    current: f64,
    options: &ChartOptions,
) -> AppResult<Vec<u8>> {
    let segments = ProgressSegments::new(previous, current);
    let (width, height) = (options.width, options.height);
    let mut pixels = vec![0u8; width as usize * height as usize * 3];

    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(70)
            .build_cartesian_2d(0f64..100f64, 0f64..1f64)
            .map_err(chart_error)?;

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(0.0, BAR_BOTTOM), (segments.previous, BAR_TOP)],
                PREVIOUS_COLOR.filled(),
            )))
            .map_err(chart_error)?
            .label("Last month")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], PREVIOUS_COLOR.filled()));

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(segments.previous, BAR_BOTTOM), (segments.end(), BAR_TOP)],
                ADDED_COLOR.filled(),
            )))
            .map_err(chart_error)?
            .label("This month")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], ADDED_COLOR.filled()));

        let axes = chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(6)
            .x_label_formatter(&|v: &f64| format!("{:.0}", v))
            .x_desc("%")
            .y_labels(0)
            .y_desc(term)
            .draw();
        if let Err(err) = axes {
            log::warn!("progress chart drawn without axis text: {}", err);
        }

        let legend = chart
            .configure_series_labels()
            .position(SeriesLabelPosition::MiddleRight)
            .background_style(WHITE.mix(0.0))
            .border_style(WHITE.mix(0.0))
            .draw();
        if let Err(err) = legend {
            log::warn!("progress chart drawn without legend: {}", err);
        }

        root.present().map_err(chart_error)?;
    }

    encode_png(&pixels, width, height)
}

fn encode_png(pixels: &[u8], width: u32, height: u32) -> AppResult<Vec<u8>> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(pixels, width, height, ColorType::Rgb8)
        .map_err(chart_error)?;
    Ok(png)
}

fn chart_error(err: impl std::fmt::Display) -> AppError {
    AppError::Chart(err.to_string())
}
