//! Grid of side-by-side panels: each instrument on the left axis with the
//! benchmark overlaid on a secondary right axis.

use super::theme;
use super::{date_range, ensure_parent, value_range, ChartError, DrawResult};
use crate::data::PriceSeries;
use chrono::NaiveDate;
use plotters::prelude::*;
use std::path::Path;

pub const VERSUS_FILE: &str = "commodities_vs_nasdaq.svg";

const COLUMNS: usize = 2;
const PANEL_WIDTH: u32 = 700;
const PANEL_HEIGHT: u32 = 400;
const TITLE_HEIGHT: u32 = 50;

/// Grid shape for `panels` panels: two columns, as many rows as needed.
pub fn grid_shape(panels: usize) -> (usize, usize) {
    let rows = panels.div_ceil(COLUMNS).max(1);
    (rows, COLUMNS)
}

/// Render every non-benchmark series against `benchmark`.
pub fn versus_benchmark(
    series: &[PriceSeries],
    benchmark: &PriceSeries,
    path: &Path,
) -> Result<(), ChartError> {
    let others: Vec<&PriceSeries> = series.iter().filter(|s| s.name != benchmark.name).collect();
    if others.is_empty() || benchmark.is_empty() {
        return Err(ChartError::Empty(format!("comparison against {}", benchmark.name)));
    }

    ensure_parent(path)?;
    draw(&others, benchmark, path).map_err(|e| ChartError::drawing(path, e))?;
    tracing::info!(chart = %path.display(), "saved benchmark comparison chart");
    Ok(())
}

fn draw(others: &[&PriceSeries], benchmark: &PriceSeries, path: &Path) -> DrawResult<()> {
    let (rows, cols) = grid_shape(others.len());
    let size = (
        PANEL_WIDTH * cols as u32,
        PANEL_HEIGHT * rows as u32 + TITLE_HEIGHT,
    );

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&theme::BACKGROUND)?;
    let root = root.titled(
        &format!("Individual Commodities vs {} Comparison", benchmark.name),
        (theme::FONT, theme::TITLE_SIZE).into_font().color(&theme::TEXT),
    )?;

    let panels = root.split_evenly((rows, cols));
    let bench_points = finite_closes(benchmark);

    for (i, (panel, series)) in panels.iter().zip(others).enumerate() {
        let points = finite_closes(series);
        let (Some(x_range), Some(y_range), Some(y2_range)) = (
            date_range(points.iter().chain(&bench_points).map(|(d, _)| *d)),
            value_range(points.iter().map(|(_, v)| *v)),
            value_range(bench_points.iter().map(|(_, v)| *v)),
        ) else {
            continue;
        };

        let color = theme::panel_color(i);
        let mut chart = ChartBuilder::on(panel)
            .caption(
                format!("{} vs {}", series.name, benchmark.name),
                (theme::FONT, 18).into_font().color(&theme::TEXT),
            )
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .right_y_label_area_size(60)
            .build_cartesian_2d(x_range.clone(), y_range)?
            .set_secondary_coord(x_range, y2_range);

        chart
            .configure_mesh()
            .x_labels(6)
            .x_label_formatter(&|d: &NaiveDate| d.format("%Y").to_string())
            .y_label_formatter(&|v: &f64| format!("{v:.1}"))
            .label_style((theme::FONT, 12).into_font().color(&theme::TEXT))
            .bold_line_style(theme::GRID)
            .light_line_style(theme::GRID_LIGHT)
            .axis_style(theme::GRID)
            .draw()?;

        chart
            .configure_secondary_axes()
            .y_label_formatter(&|v: &f64| format!("{v:.0}"))
            .label_style((theme::FONT, 12).into_font().color(&theme::BENCHMARK))
            .axis_style(theme::GRID)
            .draw()?;

        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(series.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        let bench_style = theme::BENCHMARK.mix(0.7).stroke_width(1);
        chart
            .draw_secondary_series(LineSeries::new(bench_points.iter().copied(), bench_style))?
            .label(benchmark.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], bench_style));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(theme::PLOT_BACKGROUND.mix(0.85))
            .border_style(theme::GRID)
            .label_font((theme::FONT, 12).into_font().color(&theme::TEXT))
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn finite_closes(series: &PriceSeries) -> Vec<(NaiveDate, f64)> {
    series
        .close_points()
        .into_iter()
        .filter(|(_, c)| c.is_finite())
        .collect()
}
