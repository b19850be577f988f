//! Correlation matrix heatmap with per-cell value annotations.

use super::theme;
use super::{ensure_parent, years_suffix, ChartError, DrawResult};
use crate::analysis::CorrelationMatrix;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

pub const HEATMAP_FILE: &str = "correlation_heatmap.svg";

const WIDTH: u32 = 760;
const HEIGHT: u32 = 640;

/// Render `matrix` as a heatmap. `span_years` only feeds the title.
pub fn correlation_heatmap(
    matrix: &CorrelationMatrix,
    span_years: i64,
    path: &Path,
) -> Result<(), ChartError> {
    if matrix.is_empty() {
        return Err(ChartError::Empty("correlation matrix".into()));
    }

    let title = format!("Commodities Correlation Matrix{}", years_suffix(span_years));
    ensure_parent(path)?;
    draw(matrix, &title, path).map_err(|e| ChartError::drawing(path, e))?;
    tracing::info!(chart = %path.display(), "saved correlation heatmap");
    Ok(())
}

/// Cell annotation text: value rounded to three decimals.
pub fn cell_label(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.3}")
    } else {
        "n/a".into()
    }
}

fn draw(matrix: &CorrelationMatrix, title: &str, path: &Path) -> DrawResult<()> {
    let n = matrix.len() as i32;
    let names = &matrix.names;

    let root = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&theme::BACKGROUND)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (theme::FONT, theme::TITLE_SIZE).into_font().color(&theme::TEXT))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(110)
        .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())?;

    // Row 0 is drawn at the top, so the y axis runs in reverse
    let name_at = |v: &SegmentValue<i32>, reversed: bool| match v {
        SegmentValue::CenterOf(i) => {
            let idx = if reversed { n - 1 - i } else { *i };
            names.get(idx as usize).cloned().unwrap_or_default()
        }
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(n as usize)
        .y_labels(n as usize)
        .x_label_formatter(&|v: &SegmentValue<i32>| name_at(v, false))
        .y_label_formatter(&|v: &SegmentValue<i32>| name_at(v, true))
        .label_style((theme::FONT, theme::LABEL_SIZE).into_font().color(&theme::TEXT))
        .axis_style(theme::GRID)
        .draw()?;

    let cells = (0..n).flat_map(|row| (0..n).map(move |col| (row, col)));

    chart.draw_series(cells.clone().map(|(row, col)| {
        let value = matrix.get(row as usize, col as usize);
        let y = n - 1 - row;
        Rectangle::new(
            [
                (SegmentValue::Exact(col), SegmentValue::Exact(y)),
                (SegmentValue::Exact(col + 1), SegmentValue::Exact(y + 1)),
            ],
            theme::diverging(value).filled(),
        )
    }))?;

    chart.draw_series(cells.map(|(row, col)| {
        let value = matrix.get(row as usize, col as usize);
        let y = n - 1 - row;
        let style = (theme::FONT, 16)
            .into_font()
            .color(&theme::contrast_text(value))
            .pos(Pos::new(HPos::Center, VPos::Center));
        Text::new(
            cell_label(value),
            (SegmentValue::CenterOf(col), SegmentValue::CenterOf(y)),
            style,
        )
    }))?;

    root.present()?;
    Ok(())
}
