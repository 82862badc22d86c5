use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;

use crate::{benchmark::ReferenceCurves, misc::FloatingPoint};

use super::{Figure, Marker, PlotOptions, Series};

const LINE_WIDTH: f64 = 3.;

/// Load factors and the displacements computed at each of them
#[derive(Clone, Debug, PartialEq)]
pub struct LoadDisplacementSeries<T> {
    load_factors: Vec<T>,
    horizontal: Vec<T>,
    vertical: Vec<T>,
}

impl<T: FloatingPoint> LoadDisplacementSeries<T> {
    /// Create a series
    /// # Failures
    /// - the displacement sequences do not have one value per load factor
    pub fn try_new(load_factors: Vec<T>, horizontal: Vec<T>, vertical: Vec<T>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            horizontal.len() == load_factors.len() && vertical.len() == load_factors.len(),
            "Expected one displacement per load factor: {} load factors, {} horizontal, {} vertical",
            load_factors.len(),
            horizontal.len(),
            vertical.len()
        );
        Ok(Self {
            load_factors,
            horizontal,
            vertical,
        })
    }

    pub fn load_factors(&self) -> &[T] {
        &self.load_factors
    }

    pub fn horizontal(&self) -> &[T] {
        &self.horizontal
    }

    pub fn vertical(&self) -> &[T] {
        &self.vertical
    }

    pub fn len(&self) -> usize {
        self.load_factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.load_factors.is_empty()
    }
}

impl<T: FloatingPoint> TryFrom<ReferenceCurves<T>> for LoadDisplacementSeries<T> {
    type Error = anyhow::Error;

    fn try_from(curves: ReferenceCurves<T>) -> Result<Self, Self::Error> {
        Self::try_new(curves.load_factors, curves.horizontal, curves.vertical)
    }
}

/// Overlay the computed load/displacement curves on the reference curves
pub fn load_displacement_figure<T: FloatingPoint>(
    reference: &ReferenceCurves<T>,
    computed: &LoadDisplacementSeries<T>,
) -> anyhow::Result<Figure> {
    let reference = LoadDisplacementSeries::try_from(reference.clone())
        .context("Reference curves are inconsistent")?;

    let mut figure = Figure::new("u, w", "lambda");
    figure.push(
        Series::new(
            "u_ref",
            "black",
            LINE_WIDTH,
            pairs(reference.horizontal(), reference.load_factors())?,
        )
        .with_marker(Marker::Diamond),
    )?;
    figure.push(
        Series::new(
            "w_ref",
            "black",
            LINE_WIDTH,
            pairs(reference.vertical(), reference.load_factors())?,
        )
        .with_marker(Marker::Circle),
    )?;
    figure.push(Series::new(
        "u_FE",
        "red",
        LINE_WIDTH,
        pairs(computed.horizontal(), computed.load_factors())?,
    ))?;
    figure.push(Series::new(
        "w_FE",
        "blue",
        LINE_WIDTH,
        pairs(computed.vertical(), computed.load_factors())?,
    ))?;
    Ok(figure)
}

/// Render the load/displacement overlay as an SVG document
pub fn render_load_displacement<T: FloatingPoint>(
    reference: &ReferenceCurves<T>,
    computed: &LoadDisplacementSeries<T>,
    options: &PlotOptions,
) -> anyhow::Result<String> {
    load_displacement_figure(reference, computed)?.render(options)
}

/// Render the load/displacement overlay and write it to `path`.
/// The file is flushed and closed before returning.
pub fn load_displacement<T: FloatingPoint>(
    reference: &ReferenceCurves<T>,
    computed: &LoadDisplacementSeries<T>,
    path: impl AsRef<Path>,
    options: &PlotOptions,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let svg = render_load_displacement(reference, computed, options)?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create plot file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(svg.as_bytes())?;
    writer
        .into_inner()
        .map_err(|e| e.into_error())
        .with_context(|| format!("Failed to flush plot file {}", path.display()))?
        .sync_all()?;

    log::info!("load-displacement plot written to {}", path.display());
    Ok(())
}

fn pairs<T: FloatingPoint>(xs: &[T], ys: &[T]) -> anyhow::Result<Vec<(f64, f64)>> {
    xs.iter()
        .zip(ys.iter())
        .map(|(x, y)| match (x.to_f64(), y.to_f64()) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => anyhow::bail!("Value cannot be plotted: ({}, {})", x, y),
        })
        .collect()
}
