//! SVG charts for a finished run.
//!
//! One grouped bar chart per dataset size (four phases, one bar per backend)
//! and one line chart of the mean phase time per backend across sizes.

use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::info;

use crate::backend::Phase;
use crate::error::{Error, Result};
use crate::schema::{SizeResult, TimingMatrix};

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

const COLOR_RELATIONAL: RGBColor = RGBColor(52, 152, 219); // blue
const COLOR_KEY_VALUE: RGBColor = RGBColor(231, 76, 60); // red

const BAR_WIDTH: f64 = 0.38;

/// File name of the cross-size comparison chart.
pub const TREND_FILE: &str = "crud_times_trend.svg";

/// File name of the per-size bar chart.
pub fn size_file(size: usize) -> String {
    format!("crud_times_{size}.svg")
}

fn render_err(err: impl std::fmt::Display) -> Error {
    Error::Render(err.to_string())
}

fn y_fmt(y: &f64) -> String {
    if *y >= 1_000.0 {
        format!("{:.1} s", y / 1_000.0)
    } else {
        format!("{:.0} ms", y)
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Writes chart files into a single output directory.
pub struct ChartRenderer {
    dir: PathBuf,
}

impl ChartRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render every chart for `matrix`, creating the output directory if
    /// needed. Returns the written paths, per-size charts first.
    pub fn render(&self, matrix: &TimingMatrix) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.dir)?;

        let mut written = Vec::with_capacity(matrix.len() + 1);
        for result in matrix {
            let path = self.dir.join(size_file(result.size));
            size_chart(result, &path)?;
            written.push(path);
        }

        let trend = self.dir.join(TREND_FILE);
        trend_chart(matrix, &trend)?;
        written.push(trend);

        for path in &written {
            info!(path = %path.display(), "chart written");
        }
        Ok(written)
    }
}

// ---------------------------------------------------------------------------
// Per-size grouped bar chart
// ---------------------------------------------------------------------------

fn size_chart(result: &SizeResult, output: &Path) -> Result<()> {
    let y_max = result
        .backends()
        .iter()
        .flat_map(|b| b.as_array())
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    let title = format!("CRUD times, {} records", result.size);
    let root = SVGBackend::new(output, (800, 480)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let phases = Phase::ALL.len();
    let mut chart = ChartBuilder::on(&root)
        .caption(&title, ("sans-serif", 18))
        .margin(14)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..phases as f64, 0f64..y_max * 1.2)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(phases * 2 + 1)
        .y_desc("Elapsed (ms)")
        .y_label_formatter(&y_fmt)
        .x_label_formatter(&|x| {
            // Label only the group centers (0.5, 1.5, ...).
            let centered = x - 0.5;
            if (centered - centered.round()).abs() > 0.1 || centered < 0.0 {
                return String::new();
            }
            Phase::ALL
                .get(centered.round() as usize)
                .map(|p| p.title().to_string())
                .unwrap_or_default()
        })
        .draw()
        .map_err(render_err)?;

    let groups = [
        (&result.relational, COLOR_RELATIONAL, 0.5 - BAR_WIDTH),
        (&result.key_value, COLOR_KEY_VALUE, 0.5),
    ];
    for (timings, color, offset) in groups {
        let bars = timings.as_array().into_iter().enumerate().map(move |(i, ms)| {
            let x0 = i as f64 + offset;
            Rectangle::new([(x0, 0.0), (x0 + BAR_WIDTH, ms as f64)], color.mix(0.85).filled())
        });
        chart
            .draw_series(bars)
            .map_err(render_err)?
            .label(timings.backend.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK.mix(0.3))
        .label_font(("sans-serif", 13))
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Cross-size trend chart
// ---------------------------------------------------------------------------

fn trend_chart(matrix: &TimingMatrix, output: &Path) -> Result<()> {
    let y_max = matrix
        .iter()
        .flat_map(|r| r.backends().map(|b| b.mean_ms()))
        .fold(1.0f64, f64::max);
    let n = matrix.len().max(1);
    let sizes: Vec<usize> = matrix.iter().map(|r| r.size).collect();

    let root = SVGBackend::new(output, (800, 480)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Mean phase time by dataset size", ("sans-serif", 18))
        .margin(14)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5f64..n as f64 - 0.5, 0f64..y_max * 1.2)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_labels(n * 2 + 1)
        .x_desc("Records")
        .y_desc("Mean phase time (ms)")
        .y_label_formatter(&y_fmt)
        .x_label_formatter(&|x| {
            if (x - x.round()).abs() > 0.1 || *x < 0.0 {
                return String::new();
            }
            sizes
                .get(x.round() as usize)
                .map(|s| s.to_string())
                .unwrap_or_default()
        })
        .draw()
        .map_err(render_err)?;

    let (relational_name, key_value_name) = matrix
        .first()
        .map(|r| (r.relational.backend.as_str(), r.key_value.backend.as_str()))
        .unwrap_or(("relational", "key-value"));
    let series: [(&str, RGBColor, fn(&SizeResult) -> f64); 2] = [
        (relational_name, COLOR_RELATIONAL, |r| r.relational.mean_ms()),
        (key_value_name, COLOR_KEY_VALUE, |r| r.key_value.mean_ms()),
    ];
    for (label, color, mean) in series {
        let points: Vec<(f64, f64)> = matrix
            .iter()
            .enumerate()
            .map(|(i, r)| (i as f64, mean(r)))
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))
            .map_err(render_err)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart
            .draw_series(points.into_iter().map(|p| Circle::new(p, 3, color.filled())))
            .map_err(render_err)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK.mix(0.3))
        .label_font(("sans-serif", 13))
        .draw()
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}
