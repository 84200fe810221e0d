use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::error::LogssarError;
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    /// Raw trace, corrected trace, onset marker.
    pub palette: [RGBColor; 3],
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 400,
            background: RGBColor(10, 10, 10),
            palette: [RGBColor(120, 120, 120), CYAN, RED],
        }
    }
}
/// Draws raw and corrected samples in `[onset - span.0, onset + span.1)` as a
/// PNG. Nothing is drawn as text, so no font backend is needed.
pub fn render_trial_png(
    raw: &[f64],
    corrected: &[f64],
    onset: usize,
    span: (usize, usize),
    style: &PlotStyle,
) -> Result<Vec<u8>, LogssarError> {
    if raw.len() != corrected.len() {
        return Err(LogssarError::Plot(format!(
            "raw has {} samples, corrected has {}",
            raw.len(),
            corrected.len()
        )));
    }
    if onset >= raw.len() {
        return Err(LogssarError::Plot(format!(
            "onset {onset} outside a trace of {} samples",
            raw.len()
        )));
    }
    let start = onset.saturating_sub(span.0);
    let end = (onset + span.1).min(raw.len()).max(onset + 1);
    let (y_min, y_max) = raw[start..end]
        .iter()
        .chain(&corrected[start..end])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let (y_min, y_max) = if (y_max - y_min).abs() < f64::EPSILON {
        (y_min - 50.0, y_max + 50.0)
    } else {
        let pad = 0.05 * (y_max - y_min);
        (y_min - pad, y_max + pad)
    };
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .build_cartesian_2d(start as f64..end as f64, y_min..y_max)?;
        let [raw_color, corrected_color, marker_color] = style.palette;
        chart.draw_series(LineSeries::new(
            [(start as f64, 0.0), (end as f64, 0.0)],
            &WHITE.mix(0.2),
        ))?;
        chart.draw_series(LineSeries::new(
            [(onset as f64, y_min), (onset as f64, y_max)],
            &marker_color,
        ))?;
        chart.draw_series(LineSeries::new(
            (start..end).map(|i| (i as f64, raw[i])),
            &raw_color,
        ))?;
        chart.draw_series(LineSeries::new(
            (start..end).map(|i| (i as f64, corrected[i])),
            &corrected_color,
        ))?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, LogssarError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| LogssarError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
