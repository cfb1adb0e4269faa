use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;

use super::artifact;
use super::frame::{FrameSpec, Projected, Projection};
use crate::color::{Class, Classifier, legend_entries};
use crate::data::model::EntitySeries;
use crate::error::{RenderError, RenderResult};

/// NeuQuant sampling factor for GIF palettes (1 = best, 30 = fastest).
const GIF_SPEED: i32 = 10;

// ---------------------------------------------------------------------------
// Time-indexed scatter animation
// ---------------------------------------------------------------------------

/// Render `spec.frame_count` frames of `series` and write them to `path` as a
/// looping GIF.
///
/// Every entity must hold at least `frame_count` samples. All frames are
/// encoded in memory first; the file only appears once encoding succeeded.
pub fn render_animation(
    series: &[EntitySeries],
    spec: &FrameSpec,
    classifier: &Classifier,
    path: &Path,
) -> RenderResult<()> {
    check_inputs(series, spec)?;

    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut bytes, GIF_SPEED);
        encoder.set_repeat(Repeat::Infinite)?;
        for t in 0..spec.frame_count {
            let rgba = DynamicImage::ImageRgb8(render_frame(series, spec, classifier, t)?).into_rgba8();
            let delay = Delay::from_numer_denom_ms(spec.interval_ms, 1);
            encoder.encode_frame(Frame::from_parts(rgba, 0, 0, delay))?;
        }
    }

    artifact::write_atomic(path, &bytes)?;
    log::info!(
        "Wrote {} ({} frames, {} projection)",
        path.display(),
        spec.frame_count,
        spec.projection
    );
    Ok(())
}

/// Fail before drawing anything if the run cannot complete.
fn check_inputs(series: &[EntitySeries], spec: &FrameSpec) -> RenderResult<()> {
    spec.validate()?;
    if series.is_empty() {
        return Err(RenderError::NoEntities);
    }
    for e in series {
        if e.len() < spec.frame_count {
            return Err(RenderError::OutOfRange {
                entity: e.id,
                index: e.len(),
                available: e.len(),
            });
        }
        if e.len() > spec.frame_count {
            log::debug!(
                "entity {}: {} samples, drawing the first {}",
                e.id,
                e.len(),
                spec.frame_count
            );
        }
        if spec.projection.needs_z() {
            if let Some(index) = e.samples[..spec.frame_count].iter().position(|s| s.z.is_none()) {
                return Err(RenderError::MissingZ {
                    entity: e.id,
                    index,
                });
            }
        }
    }
    Ok(())
}

/// Draw frame `t` on a fresh white canvas.
///
/// Pure in its inputs: nothing carries over from earlier frames, and the axes
/// come from `spec` alone.
pub fn render_frame(
    series: &[EntitySeries],
    spec: &FrameSpec,
    classifier: &Classifier,
    t: usize,
) -> RenderResult<RgbImage> {
    let mut markers = Vec::with_capacity(series.len());
    let mut classes = Vec::with_capacity(series.len());
    for e in series {
        let sample = e.sample(t)?;
        let class = classifier.classify(e.id, sample);
        classes.push(class);
        log::debug!(
            "plot by {} t={t} entity={} ({}, {}, {:?}) {}",
            spec.projection,
            e.id,
            sample.x,
            sample.y,
            sample.z,
            class.label
        );
        if let Some(p) = spec.project(e.id, t, sample)? {
            markers.push((p, class));
        }
    }
    // Entities outside the bounds still count towards the legend.
    let legend = if spec.annotate {
        legend_entries(classes)
    } else {
        Vec::new()
    };

    let (w, h) = (spec.size, spec.size);
    let mut buf = vec![0u8; (w as usize) * (h as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
        root.fill(&WHITE)?;
        match spec.projection {
            Projection::Xy | Projection::Xz => draw_planar(&root, spec, &markers, &legend)?,
            Projection::Xyz => draw_volume(&root, spec, &markers, &legend)?,
        }
        root.present()?;
    }
    RgbImage::from_raw(w, h, buf)
        .ok_or_else(|| RenderError::Drawing("frame buffer size mismatch".to_string()))
}

fn draw_planar(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    spec: &FrameSpec,
    markers: &[(Projected, &Class)],
    legend: &[(String, RGBColor)],
) -> RenderResult<()> {
    let ((x0, x1), (y0, y1)) = spec.planar_ranges()?;
    let vertical = match spec.projection {
        Projection::Xz => "z",
        _ => "y",
    };

    let mut builder = ChartBuilder::on(root);
    builder.margin(10);
    if spec.annotate {
        builder.x_label_area_size(40).y_label_area_size(50);
    }
    let mut chart = builder.build_cartesian_2d(x0..x1, y0..y1)?;

    let mut mesh = chart.configure_mesh();
    if spec.annotate {
        mesh.x_desc("x").y_desc(vertical);
    }
    mesh.draw()?;

    let radius = spec.marker_size as i32;
    chart.draw_series(markers.iter().filter_map(|(p, class)| match *p {
        Projected::Planar(x, y) => {
            Some(EmptyElement::at((x, y)) + Circle::new((0, 0), radius, class.color.filled()))
        }
        Projected::Volume(..) => None,
    }))?;

    if !legend.is_empty() {
        for (label, color) in legend {
            let color = *color;
            chart
                .draw_series(std::iter::empty::<Circle<(f64, f64), i32>>())?
                .label(label.as_str())
                .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
        }
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

fn draw_volume(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    spec: &FrameSpec,
    markers: &[(Projected, &Class)],
    legend: &[(String, RGBColor)],
) -> RenderResult<()> {
    let ((x0, x1), (y0, y1), (z0, z1)) = spec.volume_ranges()?;

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .build_cartesian_3d(x0..x1, z0..z1, y0..y1)?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.35;
        pb.scale = 0.85;
        pb.into_matrix()
    });

    if spec.annotate {
        chart
            .configure_axes()
            .light_grid_style(BLACK.mix(0.15))
            .max_light_lines(3)
            .draw()?;
    }

    // plotters' 3D frame is (x, vertical, depth); altitude goes up.
    let radius = spec.marker_size as i32;
    chart.draw_series(markers.iter().filter_map(|(p, class)| match *p {
        Projected::Volume(x, y, z) => {
            Some(EmptyElement::at((x, z, y)) + Circle::new((0, 0), radius, class.color.filled()))
        }
        Projected::Planar(..) => None,
    }))?;

    if !legend.is_empty() {
        for (label, color) in legend {
            let color = *color;
            chart
                .draw_series(std::iter::empty::<Circle<(f64, f64, f64), i32>>())?
                .label(label.as_str())
                .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
        }
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}
