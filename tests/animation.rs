use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::AnimationDecoder;
use image::codecs::gif::GifDecoder;
use plotters::style::RGBColor;
use swarm_plot::color::{Class, Classifier, Predicate, TAB10};
use swarm_plot::config::Config;
use swarm_plot::data::model::{EntitySeries, Sample};
use swarm_plot::error::RenderError;
use swarm_plot::render::{Bounds, FrameSpec, Projection, artifact_path, render_animation};
use tempfile::TempDir;

fn spec(projection: Projection, frames: usize) -> FrameSpec {
    let bounds = match projection {
        Projection::Xy => Bounds::xy((-200.0, 200.0), (-200.0, 200.0)),
        Projection::Xz => Bounds::xz((-200.0, 200.0), (0.0, 400.0)),
        Projection::Xyz => Bounds::xyz((-150.0, 150.0), (-150.0, 150.0), (0.0, 100.0)),
    };
    FrameSpec {
        projection,
        bounds,
        frame_count: frames,
        interval_ms: 100,
        size: 64,
        marker_size: 3,
        annotate: false,
    }
}

fn relay_classifier() -> Classifier {
    Classifier::new(Class {
        color: TAB10[0].1,
        label: "Boids".into(),
    })
    .rule(Predicate::Id(7), TAB10[3].1, "Enemy")
    .rule(Predicate::IdRange { start: 0, end: 2 }, TAB10[1].1, "BS")
    .rule(Predicate::MinZ(35.0), TAB10[2].1, "Boids")
}

/// Eight entities drifting outward and upward.
fn swarm(steps: usize) -> Vec<EntitySeries> {
    (0..8)
        .map(|id| {
            let samples = (0..steps)
                .map(|t| {
                    let r = 10.0 * id as f64 + t as f64;
                    Sample::new(r, -r, 5.0 * t as f64)
                })
                .collect();
            EntitySeries::new(id, samples)
        })
        .collect()
}

fn gif_frames(path: &Path) -> Vec<image::Frame> {
    let decoder = GifDecoder::new(BufReader::new(File::open(path).unwrap())).unwrap();
    decoder.into_frames().collect_frames().unwrap()
}

#[test]
fn one_artifact_per_projection_with_every_frame() {
    let dir = TempDir::new().unwrap();
    let series = swarm(6);
    for projection in Projection::ALL {
        let path = artifact_path(dir.path(), "mobility", projection);
        render_animation(&series, &spec(projection, 5), &relay_classifier(), &path).unwrap();

        let frames = gif_frames(&path);
        assert_eq!(frames.len(), 5, "{projection}");
        assert_eq!(frames[0].buffer().dimensions(), (64, 64));
        let (n, d) = frames[0].delay().numer_denom_ms();
        assert_eq!(n / d, 100);
    }
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, ["mobility-xy.gif", "mobility-xyz.gif", "mobility-xz.gif"]);
}

#[test]
fn rerun_overwrites_instead_of_appending() {
    let dir = TempDir::new().unwrap();
    let path = artifact_path(dir.path(), "mobility", Projection::Xy);
    let series = swarm(4);
    render_animation(&series, &spec(Projection::Xy, 4), &relay_classifier(), &path).unwrap();
    render_animation(&series, &spec(Projection::Xy, 4), &relay_classifier(), &path).unwrap();
    assert_eq!(gif_frames(&path).len(), 4);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn too_few_samples_fails_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = artifact_path(dir.path(), "mobility", Projection::Xy);
    let mut series = swarm(5);
    series[3].samples.truncate(4);

    let err = render_animation(&series, &spec(Projection::Xy, 5), &relay_classifier(), &path)
        .unwrap_err();
    assert!(matches!(
        err,
        RenderError::OutOfRange {
            entity: 3,
            available: 4,
            ..
        }
    ));
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn planar_series_cannot_render_altitude_views() {
    let dir = TempDir::new().unwrap();
    let path = artifact_path(dir.path(), "flat", Projection::Xz);
    let series = vec![EntitySeries::new(0, vec![Sample::planar(0.0, 0.0); 2])];
    let err = render_animation(&series, &spec(Projection::Xz, 2), &relay_classifier(), &path)
        .unwrap_err();
    assert!(matches!(err, RenderError::MissingZ { entity: 0, index: 0 }));
    assert!(!path.exists());
}

#[test]
fn unwritable_destination_is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = artifact_path(&dir.path().join("missing"), "mobility", Projection::Xy);
    let err = render_animation(&swarm(2), &spec(Projection::Xy, 2), &relay_classifier(), &path)
        .unwrap_err();
    assert!(matches!(err, RenderError::Io { .. }));
}

#[test]
fn distinguished_entity_keeps_its_colour_above_threshold() {
    // Entity 7 flies high enough for the altitude rule, yet stays red.
    let series = vec![EntitySeries::new(7, vec![Sample::new(0.0, 0.0, 90.0)])];
    let img = swarm_plot::render::render_frame(&series, &spec(Projection::Xy, 1), &relay_classifier(), 0)
        .unwrap();
    let has = |c: RGBColor| img.pixels().any(|p| p.0 == [c.0, c.1, c.2]);
    assert!(has(TAB10[3].1));
    assert!(!has(TAB10[2].1));
}

#[test]
fn default_views_render_with_annotation() {
    let dir = TempDir::new().unwrap();
    let mobility = Config::default().mobility;
    let classifier = mobility.classifier().unwrap();
    let series = swarm(3);
    for view in &mobility.projections {
        let mut spec = mobility.frame_spec(view, true);
        spec.frame_count = 3;
        spec.size = 320;
        assert!(spec.annotate);

        let path = artifact_path(dir.path(), "mobility", view.projection);
        render_animation(&series, &spec, &classifier, &path).unwrap();
        let frames = gif_frames(&path);
        assert_eq!(frames.len(), 3, "{}", view.projection);
        assert_eq!(frames[0].buffer().dimensions(), (320, 320));
    }
}
