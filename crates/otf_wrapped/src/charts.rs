//! Chart rendering for the HTML report.
//!
//! The aggregation engines hand over plain data; everything here renders it
//! with plotters into standalone SVG strings that get inlined in the report
//! verbatim.

use crate::aggregate::ColumnSummary;
use crate::error::{ReportError, ReportResult};
use plotters::prelude::*;

const CHART_SIZE: (u32, u32) = (900, 500);

const MEAN_LINE: RGBColor = RGBColor(25, 36, 181);
const BAND_FILL: RGBColor = RGBColor(32, 46, 245);
const BAR_FILL: RGBColor = RGBColor(255, 121, 0);

fn chart_err<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::Chart(e.to_string())
}

/// Mean heart rate per minute with a shaded 25th-75th percentile band.
pub fn hr_progression_svg(
    summary: &[ColumnSummary],
    title: &str,
    class_count: usize,
) -> ReportResult<String> {
    if summary.is_empty() {
        return Err(ReportError::InsufficientData(
            "no minute columns to plot".into(),
        ));
    }

    let n = summary.len();
    let y_lo = summary.iter().map(|c| c.p25.min(c.mean)).fold(f64::MAX, f64::min);
    let y_hi = summary.iter().map(|c| c.p75.max(c.mean)).fold(f64::MIN, f64::max);
    let pad = ((y_hi - y_lo) * 0.1).max(5.0);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("{title} ({class_count} classes)"),
                ("sans-serif", 22),
            )
            .margin(10)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(0f64..(n.saturating_sub(1).max(1)) as f64, (y_lo - pad)..(y_hi + pad))
            .map_err(chart_err)?;

        chart
            .configure_mesh()
            .x_desc("Minutes into Class (min)")
            .y_desc("Heart Rate (BPM)")
            .draw()
            .map_err(chart_err)?;

        // Percentile band: p25 forward, p75 backward
        let mut band: Vec<(f64, f64)> = summary
            .iter()
            .enumerate()
            .map(|(i, c)| (i as f64, c.p25))
            .collect();
        band.extend(
            summary
                .iter()
                .enumerate()
                .rev()
                .map(|(i, c)| (i as f64, c.p75)),
        );
        chart
            .draw_series(std::iter::once(Polygon::new(band, BAND_FILL.mix(0.2))))
            .map_err(chart_err)?
            .label("25th-75th percentile")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], BAND_FILL.mix(0.2)));

        chart
            .draw_series(LineSeries::new(
                summary.iter().enumerate().map(|(i, c)| (i as f64, c.mean)),
                &MEAN_LINE,
            ))
            .map_err(chart_err)?
            .label("mean")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 10, y)], MEAN_LINE));

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }
    Ok(svg)
}

/// Generic categorical bar chart for the frequency counters and the
/// zone-minutes table.
pub fn bar_chart_svg(
    pairs: &[(String, f64)],
    title: &str,
    x_desc: &str,
    y_desc: &str,
) -> ReportResult<String> {
    if pairs.is_empty() {
        return Err(ReportError::InsufficientData(
            "no categories to plot".into(),
        ));
    }

    let y_max = pairs.iter().map(|(_, v)| *v).fold(0f64, f64::max).max(1.0) * 1.1;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(10)
            .x_label_area_size(90)
            .y_label_area_size(55)
            .build_cartesian_2d((0usize..pairs.len()).into_segmented(), 0f64..y_max)
            .map_err(chart_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .x_labels(pairs.len())
            .x_label_formatter(&|seg| match seg {
                SegmentValue::CenterOf(i) => pairs
                    .get(*i)
                    .map(|(name, _)| name.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .draw()
            .map_err(chart_err)?;

        chart
            .draw_series(pairs.iter().enumerate().map(|(i, (_, value))| {
                Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), *value),
                    ],
                    BAR_FILL.filled(),
                )
            }))
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }
    Ok(svg)
}
