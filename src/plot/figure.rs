use std::fmt::Write;

use super::PlotOptions;

/// Marker drawn at every data point of a series
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    Diamond,
    Circle,
}

/// A polyline with its legend label and style
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub label: String,
    /// Any SVG color, e.g. `black` or `#ff0000`
    pub color: String,
    pub line_width: f64,
    pub marker: Option<Marker>,
    pub points: Vec<(f64, f64)>,
}

impl Series {
    pub fn new(label: &str, color: &str, line_width: f64, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.to_string(),
            color: color.to_string(),
            line_width,
            marker: None,
            points,
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }
}

/// Line plot rendered to SVG
#[derive(Clone, Debug, Default)]
pub struct Figure {
    x_label: String,
    y_label: String,
    series: Vec<Series>,
}

/// Mapping from data coordinates to pixels
struct Frame {
    x: (f64, f64),
    y: (f64, f64),
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Frame {
    fn px(&self, x: f64) -> f64 {
        self.left + (x - self.x.0) / (self.x.1 - self.x.0) * (self.right - self.left)
    }

    fn py(&self, y: f64) -> f64 {
        self.bottom - (y - self.y.0) / (self.y.1 - self.y.0) * (self.bottom - self.top)
    }
}

impl Figure {
    pub fn new(x_label: &str, y_label: &str) -> Self {
        Self {
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series: vec![],
        }
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Add a series
    /// # Failures
    /// - a coordinate is not finite
    pub fn push(&mut self, series: Series) -> anyhow::Result<()> {
        anyhow::ensure!(
            series
                .points
                .iter()
                .all(|(x, y)| x.is_finite() && y.is_finite()),
            "Series {} has non-finite coordinates",
            series.label
        );
        self.series.push(series);
        Ok(())
    }

    /// Render the figure as an SVG document
    pub fn render(&self, options: &PlotOptions) -> anyhow::Result<String> {
        options.validate()?;

        let (x_ticks, y_ticks) = self.ticks(options.ticks);
        let frame = Frame {
            x: (x_ticks[0], x_ticks[x_ticks.len() - 1]),
            y: (y_ticks[0], y_ticks[y_ticks.len() - 1]),
            left: options.margin,
            right: options.width - options.margin / 2.,
            top: options.margin / 2.,
            bottom: options.height - options.margin,
        };

        let gray = (options.grid_gray * 255.).round() as u8;
        let grid_color = format!("#{gray:02x}{gray:02x}{gray:02x}");

        let mut out = String::new();
        write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
            w = fmt(options.width),
            h = fmt(options.height)
        )?;
        write!(
            out,
            r#"<rect width="100%" height="100%" fill="white"/><g class="grid" stroke="{grid_color}" stroke-width="1">"#
        )?;
        for x in x_ticks.iter() {
            let px = fmt(frame.px(*x));
            write!(
                out,
                r#"<line x1="{px}" y1="{}" x2="{px}" y2="{}"/>"#,
                fmt(frame.top),
                fmt(frame.bottom)
            )?;
        }
        for y in y_ticks.iter() {
            let py = fmt(frame.py(*y));
            write!(
                out,
                r#"<line x1="{}" y1="{py}" x2="{}" y2="{py}"/>"#,
                fmt(frame.left),
                fmt(frame.right)
            )?;
        }
        out.push_str("</g>");

        write!(
            out,
            r#"<rect class="axes" x="{}" y="{}" width="{}" height="{}" fill="none" stroke="black"/>"#,
            fmt(frame.left),
            fmt(frame.top),
            fmt(frame.right - frame.left),
            fmt(frame.bottom - frame.top)
        )?;

        let tick_size = options.tick_font_size;
        write!(out, r#"<g class="ticks" font-size="{}">"#, fmt(tick_size))?;
        let x_decimals = decimals(x_ticks[1] - x_ticks[0]);
        for x in x_ticks.iter() {
            write!(
                out,
                r#"<text x="{}" y="{}" text-anchor="middle">{:.*}</text>"#,
                fmt(frame.px(*x)),
                fmt(frame.bottom + tick_size * 1.3),
                x_decimals,
                x
            )?;
        }
        let y_decimals = decimals(y_ticks[1] - y_ticks[0]);
        for y in y_ticks.iter() {
            write!(
                out,
                r#"<text x="{}" y="{}" text-anchor="end">{:.*}</text>"#,
                fmt(frame.left - tick_size * 0.5),
                fmt(frame.py(*y) + tick_size * 0.35),
                y_decimals,
                y
            )?;
        }
        out.push_str("</g>");

        for series in self.series.iter() {
            write_series(&mut out, series, &frame)?;
        }

        let label_size = options.label_font_size;
        write!(
            out,
            r#"<text class="x-label" x="{}" y="{}" font-size="{}" text-anchor="middle">{}</text>"#,
            fmt((frame.left + frame.right) / 2.),
            fmt(options.height - label_size * 0.6),
            fmt(label_size),
            escape(&self.x_label)
        )?;
        let (lx, ly) = (label_size * 1.2, (frame.top + frame.bottom) / 2.);
        write!(
            out,
            r#"<text class="y-label" x="{x}" y="{y}" font-size="{}" text-anchor="middle" transform="rotate(-90 {x} {y})">{}</text>"#,
            fmt(label_size),
            escape(&self.y_label),
            x = fmt(lx),
            y = fmt(ly)
        )?;

        self.write_legend(&mut out, &frame, options.legend_font_size)?;
        out.push_str("</svg>");
        Ok(out)
    }

    /// Legend box in the lower right corner of the plot area
    fn write_legend(&self, out: &mut String, frame: &Frame, font_size: f64) -> anyhow::Result<()> {
        if self.series.is_empty() {
            return Ok(());
        }
        let row = font_size * 1.5;
        let sample = font_size * 2.;
        let longest = self
            .series
            .iter()
            .map(|s| s.label.chars().count())
            .max()
            .unwrap_or(0) as f64;
        let width = sample + font_size * (1.5 + 0.6 * longest);
        let height = row * self.series.len() as f64 + font_size * 0.5;
        let x = frame.right - width - font_size * 0.5;
        let y = frame.bottom - height - font_size * 0.5;

        write!(
            out,
            r#"<g class="legend" font-size="{}"><rect x="{}" y="{}" width="{}" height="{}" fill="white" fill-opacity="0.8" stroke="{}"/>"#,
            fmt(font_size),
            fmt(x),
            fmt(y),
            fmt(width),
            fmt(height),
            "#cccccc"
        )?;
        for (i, series) in self.series.iter().enumerate() {
            let cy = y + font_size * 0.25 + row * (i as f64 + 0.5);
            let x0 = x + font_size * 0.5;
            write!(
                out,
                r#"<line x1="{}" y1="{cy}" x2="{}" y2="{cy}" stroke="{}" stroke-width="{}"/>"#,
                fmt(x0),
                fmt(x0 + sample),
                series.color,
                fmt(series.line_width),
                cy = fmt(cy)
            )?;
            if let Some(marker) = series.marker {
                write_marker(out, marker, x0 + sample / 2., cy, &series.color)?;
            }
            write!(
                out,
                r#"<text x="{}" y="{}">{}</text>"#,
                fmt(x0 + sample + font_size * 0.5),
                fmt(cy + font_size * 0.35),
                escape(&series.label)
            )?;
        }
        out.push_str("</g>");
        Ok(())
    }

    /// Ticks covering every series and the origin
    fn ticks(&self, count: usize) -> (Vec<f64>, Vec<f64>) {
        let points = self.series.iter().flat_map(|s| s.points.iter());
        let (mut x_max, mut y_max) = (0f64, 0f64);
        let (mut x_min, mut y_min) = (0f64, 0f64);
        for (x, y) in points {
            x_min = x_min.min(*x);
            x_max = x_max.max(*x);
            y_min = y_min.min(*y);
            y_max = y_max.max(*y);
        }
        (
            nice_ticks(x_min, x_max, count),
            nice_ticks(y_min, y_max, count),
        )
    }
}

fn write_series(out: &mut String, series: &Series, frame: &Frame) -> anyhow::Result<()> {
    if series.points.is_empty() {
        return Ok(());
    }
    let points: Vec<String> = series
        .points
        .iter()
        .map(|(x, y)| format!("{},{}", fmt(frame.px(*x)), fmt(frame.py(*y))))
        .collect();
    write!(
        out,
        r#"<polyline class="series" data-label="{}" points="{}" fill="none" stroke="{}" stroke-width="{}" stroke-linejoin="round"/>"#,
        escape(&series.label),
        points.join(" "),
        series.color,
        fmt(series.line_width)
    )?;
    if let Some(marker) = series.marker {
        for (x, y) in series.points.iter() {
            write_marker(out, marker, frame.px(*x), frame.py(*y), &series.color)?;
        }
    }
    Ok(())
}

fn write_marker(out: &mut String, marker: Marker, x: f64, y: f64, color: &str) -> anyhow::Result<()> {
    let r = 5.;
    match marker {
        Marker::Diamond => write!(
            out,
            r#"<polygon class="marker" points="{},{} {},{} {},{} {},{}" fill="{color}"/>"#,
            fmt(x),
            fmt(y - r),
            fmt(x + r),
            fmt(y),
            fmt(x),
            fmt(y + r),
            fmt(x - r),
            fmt(y)
        )?,
        Marker::Circle => write!(
            out,
            r#"<circle class="marker" cx="{}" cy="{}" r="{}" fill="{color}"/>"#,
            fmt(x),
            fmt(y),
            fmt(r)
        )?,
    }
    Ok(())
}

/// Evenly spaced ticks with a step of 1, 2, 2.5 or 5 times a power of ten,
/// enclosing `[lo, hi]`
pub(crate) fn nice_ticks(lo: f64, hi: f64, count: usize) -> Vec<f64> {
    let (lo, hi) = if hi - lo > f64::EPSILON {
        (lo, hi)
    } else {
        (lo, lo + 1.)
    };
    let raw = (hi - lo) / count.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1., 2., 2.5, 5., 10.]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw * (1. - 1e-9))
        .unwrap_or(10. * magnitude);
    let start = (lo / step + 1e-9).floor() * step;
    let end = (hi / step - 1e-9).ceil() * step;
    let n = ((end - start) / step).round().max(1.) as usize;
    (0..=n).map(|i| start + step * i as f64).collect()
}

/// Decimals needed to print multiples of `step` exactly
fn decimals(step: f64) -> usize {
    let mut d = 0;
    while d < 6 {
        let scaled = step * 10f64.powi(d as i32);
        if (scaled - scaled.round()).abs() < 1e-6 {
            break;
        }
        d += 1;
    }
    d
}

fn fmt(v: f64) -> String {
    let s = format!("{:.2}", v);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn ticks_enclose_the_range() {
        let ticks = nice_ticks(0., 6.698, 6);
        assert_eq!(ticks.first(), Some(&0.));
        assert!(*ticks.last().unwrap() >= 6.698);
        let step = ticks[1] - ticks[0];
        assert_relative_eq!(step, 2., epsilon = 1e-12);
        assert_eq!(decimals(step), 0);
        assert_eq!(decimals(0.25), 2);
    }

    #[test]
    fn flat_range_still_gets_ticks() {
        let ticks = nice_ticks(0., 0., 4);
        assert!(ticks.len() >= 2);
    }

    #[test]
    fn non_finite_points_are_rejected() {
        let mut figure = Figure::new("x", "y");
        let series = Series::new("bad", "red", 1., vec![(0., f64::NAN)]);
        assert!(figure.push(series).is_err());
        assert!(figure.series().is_empty());
    }

    #[test]
    fn render_markers_and_escaped_labels() {
        let mut figure = Figure::new("a < b", "y");
        figure
            .push(
                Series::new("s", "black", 2., vec![(0., 0.), (1., 1.), (2., 4.)])
                    .with_marker(Marker::Circle),
            )
            .unwrap();
        let svg = figure.render(&PlotOptions::default()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("a &lt; b"));
        // three data markers and one in the legend
        assert_eq!(svg.matches(r#"<circle class="marker""#).count(), 4);
    }

    #[test]
    fn options_shape_the_output() {
        let mut figure = Figure::new("x", "y");
        figure
            .push(Series::new("s", "black", 1., vec![(0., 0.), (2., 4.)]))
            .unwrap();

        let small = PlotOptions::default().with_size(100., 100.);
        assert!(figure.render(&small).is_err());
        let svg = figure.render(&small.with_margin(10.)).unwrap();
        assert!(svg.contains(r#"width="100" height="100""#));

        let svg = figure
            .render(&PlotOptions::default().with_grid_gray(0.5))
            .unwrap();
        assert!(svg.contains(r##"stroke="#808080""##));

        assert!(figure
            .render(&PlotOptions::default().with_ticks(0))
            .is_err());
        assert!(figure
            .render(&PlotOptions::default().with_grid_gray(1.5))
            .is_err());
        let svg = figure
            .render(&PlotOptions::default().with_ticks(2))
            .unwrap();
        // x ticks 0, 1, 2 and y ticks 0, 2, 4
        assert_eq!(svg.matches(r#"text-anchor="middle">"#).count(), 3 + 1);
        assert_eq!(svg.matches(r#"text-anchor="end">"#).count(), 3);
    }
}
