//! Daily candlestick chart for one instrument.

use super::theme;
use super::{date_range, ensure_parent, value_range, years_suffix, ChartError, DrawResult};
use crate::data::PriceSeries;
use plotters::prelude::*;
use std::path::Path;

const WIDTH: u32 = 1400;
const HEIGHT: u32 = 600;
// Pixels available to candles after label areas and margins
const PLOT_WIDTH: f64 = (WIDTH - 120) as f64;

/// Chart file name for a series: `{slug}_candlestick.svg`.
pub fn file_name(series: &PriceSeries) -> String {
    format!("{}_candlestick.svg", series.slug())
}

/// Render `series` as a candlestick chart at `path`.
pub fn candlestick(series: &PriceSeries, path: &Path) -> Result<(), ChartError> {
    let bars: Vec<_> = series
        .bars
        .iter()
        .filter(|b| b.open.is_finite() && b.high.is_finite() && b.low.is_finite() && b.close.is_finite())
        .collect();
    if bars.is_empty() {
        return Err(ChartError::Empty(series.name.clone()));
    }

    let x_range = date_range(bars.iter().map(|b| b.date))
        .ok_or_else(|| ChartError::Empty(series.name.clone()))?;
    let y_range = value_range(bars.iter().flat_map(|b| [b.low, b.high]))
        .ok_or_else(|| ChartError::Empty(series.name.clone()))?;

    let title = format!(
        "{} - Daily Candlestick Chart{}",
        series.name,
        years_suffix(series.span_years())
    );
    let candle_width = ((PLOT_WIDTH / bars.len() as f64) * 0.7).clamp(1.0, 15.0) as u32;

    ensure_parent(path)?;
    draw(path, &title, &bars, x_range, y_range, candle_width)
        .map_err(|e| ChartError::drawing(path, e))?;

    tracing::info!(chart = %path.display(), "saved candlestick chart");
    Ok(())
}

fn draw(
    path: &Path,
    title: &str,
    bars: &[&crate::data::RawBar],
    x_range: std::ops::Range<chrono::NaiveDate>,
    y_range: std::ops::Range<f64>,
    candle_width: u32,
) -> DrawResult<()> {
    let root = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&theme::BACKGROUND)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (theme::FONT, theme::TITLE_SIZE).into_font().color(&theme::TEXT))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)?;

    chart.plotting_area().fill(&theme::PLOT_BACKGROUND)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Price")
        .x_label_formatter(&|d: &chrono::NaiveDate| d.format("%Y-%m").to_string())
        .y_label_formatter(&|v: &f64| format!("{v:.2}"))
        .label_style((theme::FONT, theme::LABEL_SIZE).into_font().color(&theme::TEXT))
        .axis_desc_style((theme::FONT, theme::LABEL_SIZE).into_font().color(&theme::TEXT))
        .bold_line_style(theme::GRID)
        .light_line_style(theme::GRID_LIGHT)
        .axis_style(theme::GRID)
        .draw()?;

    chart.draw_series(bars.iter().map(|b| {
        CandleStick::new(
            b.date,
            b.open,
            b.high,
            b.low,
            b.close,
            theme::BULL.filled(),
            theme::BEAR.filled(),
            candle_width,
        )
    }))?;

    root.present()?;
    Ok(())
}
