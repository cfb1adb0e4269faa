use std::path::Path;

use image::RgbImage;
use plotters::prelude::*;

use super::artifact;
use crate::color::series_colors;
use crate::data::model::{PairSeries, ScalarSeries};
use crate::error::{RenderError, RenderResult};

// ---------------------------------------------------------------------------
// Static line charts
// ---------------------------------------------------------------------------

/// Fixed layout of one static chart.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: Option<String>,
    pub x_desc: String,
    pub y_desc: String,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub size: (u32, u32),
    /// Title, axis labels and legend.
    pub annotate: bool,
}

/// One line per pair, labelled `"u-v"`.
pub fn plot_pairs(pairs: &[PairSeries], spec: &ChartSpec, path: &Path) -> RenderResult<()> {
    let series: Vec<ScalarSeries> = pairs.iter().map(ScalarSeries::from).collect();
    plot_lines(&series, spec, path)
}

/// Draw every series as a line over the fixed bounds and save a PNG.
pub fn plot_lines(series: &[ScalarSeries], spec: &ChartSpec, path: &Path) -> RenderResult<()> {
    let img = render_chart(series, spec)?;
    artifact::write_atomic(path, &artifact::encode_png(&img)?)?;
    log::info!("Wrote {} ({} series)", path.display(), series.len());
    Ok(())
}

/// Rasterise the chart without touching the filesystem.
pub fn render_chart(series: &[ScalarSeries], spec: &ChartSpec) -> RenderResult<RgbImage> {
    let (w, h) = spec.size;
    let mut buf = vec![0u8; (w as usize) * (h as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut builder = ChartBuilder::on(&root);
        builder.margin(12);
        if spec.annotate {
            builder.x_label_area_size(40).y_label_area_size(70);
            if let Some(title) = &spec.title {
                builder.caption(title, ("sans-serif", 18));
            }
        }
        let (x0, x1) = spec.x_range;
        let (y0, y1) = spec.y_range;
        let mut chart = builder.build_cartesian_2d(x0..x1, y0..y1)?;

        let mut mesh = chart.configure_mesh();
        if spec.annotate {
            mesh.x_desc(spec.x_desc.as_str()).y_desc(spec.y_desc.as_str());
        }
        mesh.draw()?;

        let colors = series_colors(series.len());
        let mut labelled = false;
        for (s, color) in series.iter().zip(colors) {
            // A non-finite sample breaks the line instead of being bridged.
            for run in finite_runs(&s.points) {
                chart.draw_series(LineSeries::new(run.iter().copied(), color.stroke_width(2)))?;
            }
            if let Some(label) = &s.label {
                chart
                    .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())?
                    .label(label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                labelled = true;
            }
        }

        if spec.annotate && labelled {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }
        root.present()?;
    }
    RgbImage::from_raw(w, h, buf)
        .ok_or_else(|| RenderError::Drawing("chart buffer size mismatch".to_string()))
}

/// Maximal stretches of finite points.
fn finite_runs<'a>(points: &'a [(f64, f64)]) -> impl Iterator<Item = &'a [(f64, f64)]> + 'a {
    points
        .split(|(x, y)| !(x.is_finite() && y.is_finite()))
        .filter(|run| !run.is_empty())
}
