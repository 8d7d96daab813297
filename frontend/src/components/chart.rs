//! Bar and line charts drawn as inline SVG.
//!
//! Geometry is computed by pure functions from the series alone, so every
//! render starts from scratch; the components only turn geometry into
//! elements.

use shared::{Series, SeriesPoint};
use yew::prelude::*;

/// Default number of most recent points a chart shows
pub const DEFAULT_MAX_POINTS: usize = 24;
/// Upper bound on x-axis labels before striding kicks in
const TARGET_LABELS: usize = 6;
/// Horizontal gridline intervals
const GRID_INTERVALS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    pub width: f64,
    pub height: f64,
    pub pad_left: f64,
    pub pad_right: f64,
    pub pad_top: f64,
    pub pad_bottom: f64,
    pub max_points: usize,
    pub bar_gap: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 720.0,
            height: 160.0,
            pad_left: 36.0,
            pad_right: 12.0,
            pad_top: 10.0,
            pad_bottom: 28.0,
            max_points: DEFAULT_MAX_POINTS,
            bar_gap: 4.0,
        }
    }
}

impl ChartOptions {
    pub fn with_max_points(max_points: usize) -> Self {
        Self {
            max_points,
            ..Self::default()
        }
    }

    fn inner_width(&self) -> f64 {
        self.width - self.pad_left - self.pad_right
    }

    fn inner_height(&self) -> f64 {
        self.height - self.pad_top - self.pad_bottom
    }

    fn y(&self, value: f64, max: f64) -> f64 {
        self.pad_top + (self.inner_height() - (value / max) * self.inner_height())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub x: f64,
    pub text: String,
}

/// Parts shared by both chart kinds
#[derive(Debug, Clone, PartialEq)]
pub struct ChartFrame {
    pub title: String,
    /// y coordinates of the horizontal gridlines
    pub gridlines: Vec<f64>,
    pub labels: Vec<AxisLabel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChartGeometry {
    pub frame: ChartFrame,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChartGeometry {
    pub frame: ChartFrame,
    /// SVG path data, empty for an empty series
    pub path: String,
}

/// The most recent `max_points` points; older ones are dropped
pub fn visible_points(points: &[SeriesPoint], max_points: usize) -> &[SeriesPoint] {
    if points.len() > max_points {
        &points[points.len() - max_points..]
    } else {
        points
    }
}

fn label_stride(len: usize) -> usize {
    (len / TARGET_LABELS).max(1)
}

fn frame(series: &Series, slice: &[SeriesPoint], opts: &ChartOptions, x_of: impl Fn(usize) -> f64) -> ChartFrame {
    let gridlines = (0..=GRID_INTERVALS)
        .map(|i| opts.pad_top + (opts.inner_height() / GRID_INTERVALS as f64) * i as f64)
        .collect();
    let labels = (0..slice.len())
        .step_by(label_stride(slice.len()))
        .map(|i| AxisLabel {
            x: x_of(i),
            text: slice[i].label.clone(),
        })
        .collect();

    ChartFrame {
        title: series.name.clone(),
        gridlines,
        labels,
    }
}

pub fn bar_chart(series: &Series, opts: &ChartOptions) -> BarChartGeometry {
    let slice = visible_points(&series.points, opts.max_points);
    let max = slice.iter().map(|p| p.value).fold(1.0_f64, f64::max);
    let n = slice.len().max(1) as f64;
    let bar_width = ((opts.inner_width() - opts.bar_gap * (n - 1.0)) / n).max(2.0);
    let x_of = |i: usize| opts.pad_left + i as f64 * (bar_width + opts.bar_gap);

    let bars = slice
        .iter()
        .enumerate()
        .map(|(i, p)| Bar {
            x: x_of(i),
            y: opts.y(p.value, max),
            width: bar_width,
            height: (p.value / max) * opts.inner_height(),
            tooltip: format!("{}: {}", p.label, p.value),
        })
        .collect();

    BarChartGeometry {
        frame: frame(series, slice, opts, |i| x_of(i) + bar_width / 2.0),
        bars,
    }
}

pub fn line_chart(series: &Series, opts: &ChartOptions) -> LineChartGeometry {
    let slice = visible_points(&series.points, opts.max_points);
    let max = slice.iter().map(|p| p.value).fold(1e-9_f64, f64::max);
    let n = slice.len().max(1);
    let x_of = |i: usize| {
        if n == 1 {
            opts.pad_left
        } else {
            opts.pad_left + (i as f64 / (n - 1) as f64) * opts.inner_width()
        }
    };

    let path = slice
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let cmd = if i == 0 { "M" } else { "L" };
            format!("{} {} {}", cmd, coord(x_of(i)), coord(opts.y(p.value, max)))
        })
        .collect::<Vec<_>>()
        .join(" ");

    LineChartGeometry {
        frame: frame(series, slice, opts, x_of),
        path,
    }
}

/// Coordinates are written with at most two decimals
fn coord(v: f64) -> String {
    let s = format!("{:.2}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn frame_html(frame: &ChartFrame, opts: &ChartOptions) -> Html {
    html! {
        <>
            {for frame.gridlines.iter().map(|gy| html! {
                <line class="gridline"
                    x1={coord(opts.pad_left)} y1={coord(*gy)}
                    x2={coord(opts.width - opts.pad_right)} y2={coord(*gy)} />
            })}
            {for frame.labels.iter().map(|l| html! {
                <text class="axis" x={coord(l.x)} y={coord(opts.height - 10.0)} text-anchor="middle">
                    {&l.text}
                </text>
            })}
            <text class="axis" x={coord(opts.pad_left)} y={coord(opts.pad_top + 10.0)} text-anchor="start">
                {&frame.title}
            </text>
        </>
    }
}

#[derive(Properties, PartialEq)]
pub struct ChartProps {
    pub series: Series,
    #[prop_or(DEFAULT_MAX_POINTS)]
    pub max_points: usize,
}

#[function_component(BarChart)]
pub fn bar_chart_view(props: &ChartProps) -> Html {
    let opts = ChartOptions::with_max_points(props.max_points);
    let geometry = bar_chart(&props.series, &opts);

    html! {
        <svg viewBox={format!("0 0 {} {}", opts.width, opts.height)} role="img" aria-label={props.series.name.clone()}>
            {for geometry.bars.iter().map(|b| html! {
                <rect class="bar" x={coord(b.x)} y={coord(b.y)} width={coord(b.width)} height={coord(b.height)}>
                    <title>{&b.tooltip}</title>
                </rect>
            })}
            {frame_html(&geometry.frame, &opts)}
        </svg>
    }
}

#[function_component(LineChart)]
pub fn line_chart_view(props: &ChartProps) -> Html {
    let opts = ChartOptions::with_max_points(props.max_points);
    let geometry = line_chart(&props.series, &opts);

    html! {
        <svg viewBox={format!("0 0 {} {}", opts.width, opts.height)} role="img" aria-label={props.series.name.clone()}>
            <path d={geometry.path.clone()} fill="none" stroke="#0b66c3" stroke-width="2" />
            {frame_html(&geometry.frame, &opts)}
        </svg>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> Series {
        Series {
            name: "Litters".to_string(),
            points: values
                .iter()
                .enumerate()
                .map(|(i, v)| SeriesPoint {
                    label: format!("2024-{:02}", i + 1),
                    value: *v,
                })
                .collect(),
        }
    }

    #[test]
    fn test_only_most_recent_points_are_drawn() {
        let values: Vec<f64> = (0..30).map(f64::from).collect();
        let geometry = bar_chart(&series(&values), &ChartOptions::default());

        assert_eq!(geometry.bars.len(), DEFAULT_MAX_POINTS);
        assert_eq!(geometry.bars[0].tooltip, "2024-07: 6");
        assert_eq!(geometry.bars.last().unwrap().tooltip, "2024-30: 29");
    }

    #[test]
    fn test_all_zero_series_gives_zero_height_bars() {
        let geometry = bar_chart(&series(&[0.0, 0.0, 0.0]), &ChartOptions::default());
        let opts = ChartOptions::default();

        for bar in &geometry.bars {
            assert_eq!(bar.height, 0.0);
            assert!(bar.y.is_finite());
            assert_eq!(bar.y, opts.height - opts.pad_bottom);
        }
    }

    #[test]
    fn test_empty_series_draws_frame_only() {
        let geometry = bar_chart(&series(&[]), &ChartOptions::default());
        assert!(geometry.bars.is_empty());
        assert!(geometry.frame.labels.is_empty());
        assert_eq!(geometry.frame.gridlines.len(), 4);
        assert_eq!(geometry.frame.title, "Litters");

        let line = line_chart(&series(&[]), &ChartOptions::default());
        assert_eq!(line.path, "");
    }

    #[test]
    fn test_bar_width_and_height_are_proportional() {
        let opts = ChartOptions::default();
        let geometry = bar_chart(&series(&[2.0, 4.0]), &opts);

        // inner width 672, one gap of 4
        assert_eq!(geometry.bars[0].width, 334.0);
        assert_eq!(geometry.bars[1].x, 36.0 + 334.0 + 4.0);
        assert_eq!(geometry.bars[1].height, 122.0);
        assert_eq!(geometry.bars[0].height, 61.0);
        assert_eq!(geometry.bars[1].y, 10.0);
    }

    #[test]
    fn test_labels_are_strided() {
        let values = vec![1.0; 24];
        let geometry = bar_chart(&series(&values), &ChartOptions::default());
        let texts: Vec<&str> = geometry.frame.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["2024-01", "2024-05", "2024-09", "2024-13", "2024-17", "2024-21"]);

        let few = bar_chart(&series(&[1.0, 2.0, 3.0]), &ChartOptions::default());
        assert_eq!(few.frame.labels.len(), 3);
    }

    #[test]
    fn test_line_path_spans_inner_width() {
        let geometry = line_chart(&series(&[0.0, 0.5, 1.0]), &ChartOptions::default());
        assert_eq!(geometry.path, "M 36 132 L 372 71 L 708 10");
    }

    #[test]
    fn test_single_point_line_and_zero_line_are_finite() {
        let single = line_chart(&series(&[3.0]), &ChartOptions::default());
        assert_eq!(single.path, "M 36 10");

        let flat = line_chart(&series(&[0.0, 0.0]), &ChartOptions::default());
        assert_eq!(flat.path, "M 36 132 L 708 132");
    }

    #[test]
    fn test_gridlines_are_evenly_spaced() {
        let geometry = line_chart(&series(&[1.0]), &ChartOptions::default());
        let expected = [10.0, 10.0 + 122.0 / 3.0, 10.0 + 244.0 / 3.0, 132.0];
        assert_eq!(geometry.frame.gridlines.len(), expected.len());
        for (got, want) in geometry.frame.gridlines.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{} vs {}", got, want);
        }
    }
}
