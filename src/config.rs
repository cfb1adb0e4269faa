use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::{Class, Classifier, Predicate, parse_color};
use crate::error::RenderResult;
use crate::render::{Bounds, ChartSpec, FrameSpec, Projection};

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

/// Every plot the tool knows how to make, with defaults matching the relay
/// experiment's output layout. Any field may be omitted from a config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where inputs are read from and artifacts written to.
    pub output_dir: PathBuf,
    /// Draw titles, axis labels and legends.
    pub annotate: bool,
    pub mobility: MobilityConfig,
    pub distance: Vec<PairPlotConfig>,
    pub velocity: VelocityConfig,
    pub total_rx: TotalRxConfig,
    pub correlation: CorrelationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output/boids_relay"),
            annotate: true,
            mobility: MobilityConfig::default(),
            distance: vec![
                PairPlotConfig {
                    prefix: "distance".into(),
                    pairs: vec![(0, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 1)],
                    chart: ChartLayout {
                        y_range: (0.0, 60.0),
                        ..ChartLayout::default()
                    },
                    ..PairPlotConfig::default()
                },
                PairPlotConfig::default(),
            ],
            velocity: VelocityConfig::default(),
            total_rx: TotalRxConfig::default(),
            correlation: CorrelationConfig::default(),
        }
    }
}

impl Config {
    /// Read a JSON config, or fall back to the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve a file name pattern against the output directory.
    pub fn input(&self, pattern: &str, vars: &[(&str, usize)]) -> PathBuf {
        self.output_dir.join(expand(pattern, vars))
    }
}

/// Substitute `{name}` placeholders, e.g. `"run-position-{id}.csv"`.
pub fn expand(pattern: &str, vars: &[(&str, usize)]) -> String {
    vars.iter().fold(pattern.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{name}}}"), &value.to_string())
    })
}

// ---------------------------------------------------------------------------
// Animated scatter views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MobilityConfig {
    /// Number of entities; ids run `0..entities`.
    pub entities: usize,
    /// Per-entity position file, `{id}` is substituted.
    pub source: String,
    pub prefix: String,
    pub frames: usize,
    pub interval_ms: u32,
    pub size_px: u32,
    pub marker_size: u32,
    /// Checked in order; the first matching rule colours the entity.
    pub rules: Vec<RuleConfig>,
    pub default_class: ClassConfig,
    pub projections: Vec<ProjectionConfig>,
}

impl Default for MobilityConfig {
    fn default() -> Self {
        Self {
            entities: 8,
            source: "boids_relay-position-{id}.csv".into(),
            prefix: "mobility".into(),
            frames: 100,
            interval_ms: 100,
            size_px: 800,
            marker_size: 5,
            rules: vec![
                RuleConfig::new(Predicate::Id(7), "tab:red", "Enemy"),
                RuleConfig::new(Predicate::IdRange { start: 0, end: 2 }, "tab:orange", "BS"),
                RuleConfig::new(Predicate::MinZ(35.0), "tab:green", "Boids"),
            ],
            default_class: ClassConfig {
                color: "tab:blue".into(),
                label: "Boids".into(),
            },
            projections: vec![
                ProjectionConfig {
                    projection: Projection::Xy,
                    bounds: Bounds::xy((-200.0, 200.0), (-200.0, 200.0)),
                },
                ProjectionConfig {
                    projection: Projection::Xz,
                    bounds: Bounds::xz((-200.0, 200.0), (0.0, 400.0)),
                },
                ProjectionConfig {
                    projection: Projection::Xyz,
                    bounds: Bounds::xyz((-150.0, 150.0), (-150.0, 150.0), (0.0, 100.0)),
                },
            ],
        }
    }
}

impl MobilityConfig {
    pub fn classifier(&self) -> RenderResult<Classifier> {
        let default = Class {
            color: parse_color(&self.default_class.color)?,
            label: self.default_class.label.clone(),
        };
        self.rules.iter().try_fold(Classifier::new(default), |c, rule| {
            Ok(c.rule(rule.when.clone(), parse_color(&rule.color)?, &rule.label))
        })
    }

    pub fn frame_spec(&self, view: &ProjectionConfig, annotate: bool) -> FrameSpec {
        FrameSpec {
            projection: view.projection,
            bounds: view.bounds,
            frame_count: self.frames,
            interval_ms: self.interval_ms,
            size: self.size_px,
            marker_size: self.marker_size,
            annotate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    pub when: Predicate,
    pub color: String,
    pub label: String,
}

impl RuleConfig {
    fn new(when: Predicate, color: &str, label: &str) -> Self {
        Self {
            when,
            color: color.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassConfig {
    pub color: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    pub projection: Projection,
    pub bounds: Bounds,
}

// ---------------------------------------------------------------------------
// Static charts
// ---------------------------------------------------------------------------

/// Axes and canvas shared by the line charts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLayout {
    pub x_desc: String,
    pub y_desc: String,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub size_px: (u32, u32),
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            x_desc: "Time [sec]".into(),
            y_desc: "Distance [m]".into(),
            x_range: (0.0, 100.0),
            y_range: (0.0, 200.0),
            size_px: (640, 480),
        }
    }
}

impl ChartLayout {
    pub fn spec(&self, title: Option<String>, annotate: bool) -> ChartSpec {
        ChartSpec {
            title,
            x_desc: self.x_desc.clone(),
            y_desc: self.y_desc.clone(),
            x_range: self.x_range,
            y_range: self.y_range,
            size: self.size_px,
            annotate,
        }
    }
}

/// Scalar measured between pairs of entities, one line per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PairPlotConfig {
    pub prefix: String,
    /// `{u}` and `{v}` are substituted.
    pub source: String,
    pub value_column: String,
    pub pairs: Vec<(usize, usize)>,
    pub chart: ChartLayout,
}

impl Default for PairPlotConfig {
    fn default() -> Self {
        Self {
            prefix: "distance-enemy".into(),
            source: "boids_relay-distance-{u}-{v}.csv".into(),
            value_column: "distance".into(),
            pairs: vec![(2, 7), (3, 7), (4, 7), (5, 7), (6, 7)],
            chart: ChartLayout::default(),
        }
    }
}

/// Per-node scalar series, one line per node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    pub prefix: String,
    /// `{id}` is substituted.
    pub source: String,
    pub value_column: String,
    pub nodes: Vec<usize>,
    /// Legend label, `{id}` is substituted.
    pub label: String,
    pub chart: ChartLayout,
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            prefix: "velocity".into(),
            source: "boids_relay-velocity-{id}.csv".into(),
            value_column: "velocity".into(),
            nodes: (2..=6).collect(),
            label: "node {id}".into(),
            chart: ChartLayout {
                y_desc: "Velocity [m/s]".into(),
                y_range: (0.0, 20.0),
                ..ChartLayout::default()
            },
        }
    }
}

/// Aggregate received-bytes counter of one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TotalRxConfig {
    pub prefix: String,
    pub source: String,
    pub value_column: String,
    pub chart: ChartLayout,
}

impl Default for TotalRxConfig {
    fn default() -> Self {
        Self {
            prefix: "total_rx".into(),
            source: "boids_relay-total_rx.csv".into(),
            value_column: "total_rx".into(),
            chart: ChartLayout {
                y_desc: "Total Rx [bytes]".into(),
                y_range: (0.0, 4_000_000.0),
                ..ChartLayout::default()
            },
        }
    }
}

/// Parameter-sweep summary table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    pub source: String,
    /// Names for a file without a header row; empty means the file has one.
    pub columns: Vec<String>,
    pub sort_by: String,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            source: "boids_relay.csv".into(),
            columns: ["ws", "wa", "wc", "dist", "enemy", "ploss"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sort_by: "ploss".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::TAB10;
    use crate::data::model::Sample;

    #[test]
    fn expands_placeholders() {
        assert_eq!(
            expand("boids_relay-distance-{u}-{v}.csv", &[("u", 2), ("v", 7)]),
            "boids_relay-distance-2-7.csv"
        );
        assert_eq!(expand("ex2-2_position_{id}.csv", &[("id", 25)]), "ex2-2_position_25.csv");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let c: Config = serde_json::from_str(
            r#"{ "output_dir": "output/ex2-2", "mobility": { "entities": 26, "frames": 10 } }"#,
        )
        .unwrap();
        assert_eq!(c.output_dir, PathBuf::from("output/ex2-2"));
        assert_eq!(c.mobility.entities, 26);
        assert_eq!(c.mobility.interval_ms, 100);
        assert_eq!(c.mobility.projections.len(), 3);
        assert_eq!(c.distance.len(), 2);
    }

    #[test]
    fn default_rules_follow_relay_precedence() {
        let classifier = MobilityConfig::default().classifier().unwrap();
        let high = Sample::new(0.0, 0.0, 40.0);
        assert_eq!(classifier.classify(7, &high).label, "Enemy");
        assert_eq!(classifier.classify(0, &high).label, "BS");
        assert_eq!(classifier.classify(3, &high).color, TAB10[2].1);
        assert_eq!(classifier.classify(3, &Sample::new(0.0, 0.0, 1.0)).color, TAB10[0].1);
    }

    #[test]
    fn bad_rule_colour_is_reported() {
        let mut m = MobilityConfig::default();
        m.rules[0].color = "tab:nope".into();
        assert!(m.classifier().is_err());
    }

    #[test]
    fn defaults_survive_json_round_trip() {
        let text = serde_json::to_string_pretty(&Config::default()).unwrap();
        let back: Config = serde_json::from_str(&text).unwrap();
        assert_eq!(back.mobility.projections[2].bounds, Config::default().mobility.projections[2].bounds);
        assert_eq!(back.correlation.columns.len(), 6);
    }
}
