// Chart library implementation drawing SVG line charts with plotters
use crate::application::chart_library::{ChartLibrary, LineChart};
use crate::domain::chart::{
    Cell, ChartError, ChartOptions, ChartPackage, ColumnType, CurveType, DataTable, LegendPosition,
    RenderedChart,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use plotters::prelude::*;

/// Interpolated points inserted between two samples when smoothing.
const SMOOTHING_STEPS: usize = 8;
const LINE_COLOR: RGBColor = RGBColor(51, 102, 204);

const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;

#[derive(Debug, Clone, Copy, Default)]
pub struct PlottersChartLibrary;

#[async_trait]
impl ChartLibrary for PlottersChartLibrary {
    async fn load(&self, packages: &[ChartPackage]) -> Result<Box<dyn LineChart>, ChartError> {
        if !packages.contains(&ChartPackage::Line) {
            return Err(ChartError::MissingPackage(ChartPackage::Line));
        }
        tracing::debug!("Chart packages ready: {:?}", packages);
        Ok(Box::new(PlottersLineChart))
    }
}

#[derive(Debug, Clone, Copy)]
struct PlottersLineChart;

/// Milliseconds since the epoch and watts. Time runs on an `f64` axis, so
/// padding the range needs no date arithmetic.
type Point = (f64, f64);

impl LineChart for PlottersLineChart {
    fn draw(&self, table: &DataTable, options: &ChartOptions) -> Result<RenderedChart, ChartError> {
        let segments = drawable_segments(table)?;
        let points_drawn = segments.iter().map(Vec::len).sum();

        let curves: Vec<Vec<Point>> = segments
            .iter()
            .map(|segment| match options.curve_type {
                CurveType::Function => catmull_rom(segment, SMOOTHING_STEPS),
                CurveType::None => segment.clone(),
            })
            .collect();

        let ((xmin, xmax), (ymin, ymax)) = axis_ranges(&curves);
        let xfmt = suitable_xfmt(xmax - xmin);
        let series_label = table.columns()[1].label.clone();

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
                .into_drawing_area();
            root.fill(&WHITE).map_err(draw_error)?;

            let mut chart = ChartBuilder::on(&root)
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(70)
                .build_cartesian_2d(xmin..xmax, ymin..ymax)
                .map_err(draw_error)?;

            chart
                .configure_mesh()
                .light_line_style(&TRANSPARENT)
                .bold_line_style(RGBColor(220, 220, 220).stroke_width(1))
                .label_style(("sans-serif", 12))
                .y_desc(options.v_axis_title.as_str())
                .x_labels(8)
                .x_label_formatter(&|x: &f64| format_time(*x, xfmt))
                .y_label_formatter(&|y: &f64| format!("{:.0}", y))
                .draw()
                .map_err(draw_error)?;

            for (i, curve) in curves.iter().enumerate() {
                let series = chart
                    .draw_series(LineSeries::new(curve.iter().copied(), LINE_COLOR.stroke_width(2)))
                    .map_err(draw_error)?;
                if i == 0 {
                    series.label(series_label.as_str()).legend(|(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], LINE_COLOR.stroke_width(2))
                    });
                }
            }

            if let Some(position) = legend_position(options.legend) {
                if !curves.is_empty() {
                    chart
                        .configure_series_labels()
                        .position(position)
                        .background_style(&WHITE.mix(0.8))
                        .border_style(&BLACK)
                        .label_font(("sans-serif", 12))
                        .draw()
                        .map_err(draw_error)?;
                }
            }

            root.present().map_err(draw_error)?;
        }

        Ok(RenderedChart { svg, points_drawn })
    }
}

fn draw_error<E: std::error::Error>(e: E) -> ChartError {
    ChartError::Draw(e.to_string())
}

fn legend_position(legend: LegendPosition) -> Option<SeriesLabelPosition> {
    match legend {
        LegendPosition::Bottom => Some(SeriesLabelPosition::LowerMiddle),
        LegendPosition::Top => Some(SeriesLabelPosition::UpperMiddle),
        LegendPosition::Right => Some(SeriesLabelPosition::UpperRight),
        LegendPosition::None => None,
    }
}

/// Tick label for an axis position; blank where no date exists.
fn format_time(ms: f64, xfmt: &str) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms.round() as i64)
        .map(|t| t.format(xfmt).to_string())
        .unwrap_or_default()
}

/// Split the table into runs of drawable rows. Rows with a missing time or a
/// non-finite value end the current run, leaving a gap in the line.
fn drawable_segments(table: &DataTable) -> Result<Vec<Vec<Point>>, ChartError> {
    let layout: Vec<ColumnType> = table.columns().iter().map(|c| c.kind).collect();
    if layout != [ColumnType::DateTime, ColumnType::Number] {
        return Err(ChartError::UnsupportedLayout);
    }

    let mut segments = Vec::new();
    let mut current = Vec::new();
    for row in table.rows() {
        match (row[0], row[1]) {
            (Cell::DateTime(Some(t)), Cell::Number(w)) if w.is_finite() => {
                current.push((t.timestamp_millis() as f64, w))
            }
            _ => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    Ok(segments)
}

/// Catmull-Rom spline through every input point, `steps` points per span.
fn catmull_rom(points: &[Point], steps: usize) -> Vec<Point> {
    if points.len() < 3 || steps < 2 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut out = Vec::with_capacity(last * steps + 1);
    for i in 0..last {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(last)];

        for step in 0..steps {
            let t = step as f64 / steps as f64;
            out.push((
                catmull_rom_axis(p0.0, p1.0, p2.0, p3.0, t),
                catmull_rom_axis(p0.1, p1.1, p2.1, p3.1, t),
            ));
        }
    }
    out.push(points[last]);
    out
}

fn catmull_rom_axis(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

type Ranges = ((f64, f64), (f64, f64));

fn axis_ranges(curves: &[Vec<Point>]) -> Ranges {
    let mut points = curves.iter().flatten();
    let Some(&(x0, y0)) = points.next() else {
        return ((0.0, MS_PER_HOUR), (0.0, 1.0));
    };

    let (mut xmin, mut xmax, mut ymin, mut ymax) = (x0, x0, y0, y0);
    for &(x, y) in points {
        xmin = xmin.min(x);
        xmax = xmax.max(x);
        ymin = ymin.min(y);
        ymax = ymax.max(y);
    }

    let xmargin = if xmax > xmin { (xmax - xmin) / 20.0 } else { 30_000.0 };
    let ymargin = if ymax > ymin { (ymax - ymin) / 10.0 } else { 1.0 };

    (
        (xmin - xmargin, xmax + xmargin),
        (ymin - ymargin, ymax + ymargin),
    )
}

fn suitable_xfmt(span_ms: f64) -> &'static str {
    if span_ms >= 2.0 * MS_PER_DAY {
        "%Y-%m-%d"
    } else if span_ms >= 6.0 * MS_PER_HOUR {
        "%m-%d %H:%M"
    } else {
        "%H:%M:%S"
    }
}
