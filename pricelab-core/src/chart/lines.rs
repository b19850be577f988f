//! Multi-series line charts: closing prices, percentage growth and rolling
//! correlation all share one renderer.

use super::theme;
use super::{date_range, ensure_parent, value_range, years_suffix, ChartError, DrawResult};
use crate::analysis::{series_growth, RollingCorrelation};
use crate::data::PriceSeries;
use chrono::NaiveDate;
use plotters::prelude::*;
use std::path::Path;

pub const PRICE_LINES_FILE: &str = "all_commodities_lines.svg";
pub const GROWTH_FILE: &str = "percentage_growth.svg";
pub const ROLLING_FILE: &str = "rolling_correlations.svg";

const WIDTH: u32 = 1400;
const HEIGHT: u32 = 600;
const DASHES: i64 = 80;

/// One legend entry, drawn as one or more unbroken segments.
#[derive(Debug, Clone)]
pub struct Curve {
    pub label: String,
    pub color: RGBColor,
    pub segments: Vec<Vec<(NaiveDate, f64)>>,
}

/// Horizontal reference line across the full date range.
#[derive(Debug, Clone, Copy)]
pub struct RefLine {
    pub y: f64,
    pub color: RGBColor,
    pub opacity: f64,
    pub dashed: bool,
}

#[derive(Debug, Clone)]
pub struct LineChart {
    pub title: String,
    pub y_desc: String,
    pub curves: Vec<Curve>,
    pub ref_lines: Vec<RefLine>,
}

/// Split points into runs of finite values; a gap breaks the line.
pub fn segments<I>(points: I) -> Vec<Vec<(NaiveDate, f64)>>
where
    I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
{
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (date, value) in points {
        match value.filter(|v| v.is_finite()) {
            Some(v) => current.push((date, v)),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Render a line chart to an SVG file.
pub fn render_line_chart(plot: &LineChart, path: &Path) -> Result<(), ChartError> {
    let all_points = || plot.curves.iter().flat_map(|c| c.segments.iter().flatten());

    let x_range = date_range(all_points().map(|(d, _)| *d))
        .ok_or_else(|| ChartError::Empty(plot.title.clone()))?;
    let y_range = value_range(
        all_points()
            .map(|(_, v)| *v)
            .chain(plot.ref_lines.iter().map(|r| r.y)),
    )
    .ok_or_else(|| ChartError::Empty(plot.title.clone()))?;

    ensure_parent(path)?;
    draw(plot, path, x_range, y_range).map_err(|e| ChartError::drawing(path, e))?;
    tracing::info!(chart = %path.display(), "saved line chart");
    Ok(())
}

fn draw(
    plot: &LineChart,
    path: &Path,
    x_range: std::ops::Range<NaiveDate>,
    y_range: std::ops::Range<f64>,
) -> DrawResult<()> {
    let root = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&theme::BACKGROUND)?;

    let (x0, x1) = (x_range.start, x_range.end);
    let mut chart = ChartBuilder::on(&root)
        .caption(
            &plot.title,
            (theme::FONT, theme::TITLE_SIZE).into_font().color(&theme::TEXT),
        )
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)?;

    chart.plotting_area().fill(&theme::PLOT_BACKGROUND)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(&plot.y_desc)
        .x_label_formatter(&|d: &NaiveDate| d.format("%Y").to_string())
        .y_label_formatter(&|v: &f64| format!("{v:.2}"))
        .label_style((theme::FONT, theme::LABEL_SIZE).into_font().color(&theme::TEXT))
        .axis_desc_style((theme::FONT, theme::LABEL_SIZE).into_font().color(&theme::TEXT))
        .bold_line_style(theme::GRID)
        .light_line_style(theme::GRID_LIGHT)
        .axis_style(theme::GRID)
        .draw()?;

    for line in &plot.ref_lines {
        let style = line.color.mix(line.opacity).stroke_width(1);
        let pieces = if line.dashed {
            dash_pieces(x0, x1)
        } else {
            vec![(x0, x1)]
        };
        chart.draw_series(
            pieces
                .into_iter()
                .map(|(a, b)| PathElement::new(vec![(a, line.y), (b, line.y)], style)),
        )?;
    }

    for curve in &plot.curves {
        let color = curve.color;
        for (k, seg) in curve.segments.iter().enumerate() {
            let anno = chart.draw_series(LineSeries::new(seg.iter().copied(), color.stroke_width(2)))?;
            if k == 0 {
                anno.label(curve.label.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            }
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(theme::PLOT_BACKGROUND.mix(0.85))
        .border_style(theme::GRID)
        .label_font((theme::FONT, theme::LABEL_SIZE).into_font().color(&theme::TEXT))
        .draw()?;

    root.present()?;
    Ok(())
}

/// Every other slice of `[start, end]`, for a dashed line.
fn dash_pieces(start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
    let days = (end - start).num_days().max(1);
    let step = (days / DASHES).max(1);
    let mut pieces = Vec::new();
    let mut a = start;
    while a < end {
        let b = (a + chrono::Duration::days(step)).min(end);
        pieces.push((a, b));
        a = b + chrono::Duration::days(step);
    }
    pieces
}

fn longest_span(series: &[PriceSeries]) -> i64 {
    series.iter().map(PriceSeries::span_years).max().unwrap_or(0)
}

/// Closing prices of every series on one chart.
pub fn price_lines(series: &[PriceSeries], path: &Path) -> Result<(), ChartError> {
    let curves = series
        .iter()
        .enumerate()
        .map(|(i, s)| Curve {
            label: s.name.clone(),
            color: theme::series_color(i),
            segments: segments(s.close_points().into_iter().map(|(d, c)| (d, Some(c)))),
        })
        .collect();

    let plot = LineChart {
        title: format!("All Commodities - Price Comparison{}", years_suffix(longest_span(series))),
        y_desc: "Price".into(),
        curves,
        ref_lines: Vec::new(),
    };
    render_line_chart(&plot, path)
}

/// Percentage growth from each series' first close, with a zero baseline.
pub fn percentage_growth(series: &[PriceSeries], path: &Path) -> Result<(), ChartError> {
    let curves = series
        .iter()
        .enumerate()
        .map(|(i, s)| Curve {
            label: s.name.clone(),
            color: theme::series_color(i),
            segments: segments(series_growth(s).into_iter().map(|(d, g)| (d, Some(g)))),
        })
        .collect();

    let plot = LineChart {
        title: format!(
            "Commodities Percentage Growth from Initial Point{}",
            years_suffix(longest_span(series))
        ),
        y_desc: "Percentage Growth (%)".into(),
        curves,
        ref_lines: vec![RefLine {
            y: 0.0,
            color: WHITE,
            opacity: 0.5,
            dashed: true,
        }],
    };
    render_line_chart(&plot, path)
}

/// Rolling correlation curves with reference lines at 0 and ±0.5.
pub fn rolling_correlations(
    curves: &[RollingCorrelation],
    path: &Path,
) -> Result<(), ChartError> {
    let (window, benchmark) = match curves.first() {
        Some(c) => (c.window, c.benchmark.clone()),
        None => return Err(ChartError::Empty("rolling correlations".into())),
    };

    let lines = curves
        .iter()
        .enumerate()
        .map(|(i, c)| Curve {
            label: c.label(),
            color: theme::series_color(i),
            segments: segments(c.points.iter().copied()),
        })
        .collect();

    let plot = LineChart {
        title: format!("Rolling Correlation vs {benchmark} ({window} days window)"),
        y_desc: "Correlation Coefficient".into(),
        curves: lines,
        ref_lines: vec![
            RefLine {
                y: 0.0,
                color: WHITE,
                opacity: 0.3,
                dashed: true,
            },
            RefLine {
                y: 0.5,
                color: GREEN,
                opacity: 0.3,
                dashed: true,
            },
            RefLine {
                y: -0.5,
                color: RED,
                opacity: 0.3,
                dashed: true,
            },
        ],
    };
    render_line_chart(&plot, path)
}
