use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

use crate::data::model::Sample;
use crate::error::{RenderError, RenderResult};

// ---------------------------------------------------------------------------
// Named colours
// ---------------------------------------------------------------------------

/// The ten-colour qualitative cycle (`tab:blue` … `tab:cyan`).
pub const TAB10: [(&str, RGBColor); 10] = [
    ("tab:blue", RGBColor(0x1f, 0x77, 0xb4)),
    ("tab:orange", RGBColor(0xff, 0x7f, 0x0e)),
    ("tab:green", RGBColor(0x2c, 0xa0, 0x2c)),
    ("tab:red", RGBColor(0xd6, 0x27, 0x28)),
    ("tab:purple", RGBColor(0x94, 0x67, 0xbd)),
    ("tab:brown", RGBColor(0x8c, 0x56, 0x4b)),
    ("tab:pink", RGBColor(0xe3, 0x77, 0xc2)),
    ("tab:gray", RGBColor(0x7f, 0x7f, 0x7f)),
    ("tab:olive", RGBColor(0xbc, 0xbd, 0x22)),
    ("tab:cyan", RGBColor(0x17, 0xbe, 0xcf)),
];

/// Parse `tab:<name>`, `#rrggbb` or a CSS/SVG colour name.
pub fn parse_color(spec: &str) -> RenderResult<RGBColor> {
    let spec = spec.trim();
    if let Some((_, c)) = TAB10.iter().find(|(name, _)| *name == spec) {
        return Ok(*c);
    }
    let rgb: Option<Srgb<u8>> = if spec.starts_with('#') {
        spec.parse().ok()
    } else {
        palette::named::from_str(&spec.to_ascii_lowercase())
    };
    rgb.map(|c| RGBColor(c.red, c.green, c.blue))
        .ok_or_else(|| RenderError::InvalidColor(spec.to_string()))
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<RGBColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = hsl.into_color();
            RGBColor(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Line colours for `n` series: the tab10 cycle, or evenly spaced hues once
/// the cycle would repeat.
pub fn series_colors(n: usize) -> Vec<RGBColor> {
    if n <= TAB10.len() {
        TAB10.iter().take(n).map(|(_, c)| *c).collect()
    } else {
        generate_palette(n)
    }
}

// ---------------------------------------------------------------------------
// Classification: (entity id, sample) → colour + legend label
// ---------------------------------------------------------------------------

/// Condition under which a rule applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Exactly this entity id.
    Id(usize),
    /// Ids in `start..end`.
    IdRange { start: usize, end: usize },
    /// Altitude at or above the threshold. Never matches a planar sample.
    MinZ(f64),
}

impl Predicate {
    pub fn matches(&self, id: usize, sample: &Sample) -> bool {
        match self {
            Predicate::Id(n) => id == *n,
            Predicate::IdRange { start, end } => (*start..*end).contains(&id),
            Predicate::MinZ(threshold) => sample.z.is_some_and(|z| z >= *threshold),
        }
    }
}

/// The colour and legend label an entity is drawn with.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub color: RGBColor,
    pub label: String,
}

/// Ordered rules, first match wins, with a fallback class.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<(Predicate, Class)>,
    default: Class,
}

impl Classifier {
    pub fn new(default: Class) -> Self {
        Classifier {
            rules: Vec::new(),
            default,
        }
    }

    /// Append a rule; it is checked after every rule already added.
    pub fn rule(mut self, when: Predicate, color: RGBColor, label: &str) -> Self {
        self.rules.push((
            when,
            Class {
                color,
                label: label.to_string(),
            },
        ));
        self
    }

    pub fn classify(&self, id: usize, sample: &Sample) -> &Class {
        self.rules
            .iter()
            .find(|(when, _)| when.matches(id, sample))
            .map(|(_, class)| class)
            .unwrap_or(&self.default)
    }
}

/// Legend entries for a set of drawn classes: one per label, first-seen
/// colour wins, in order of first appearance.
pub fn legend_entries<'a>(classes: impl IntoIterator<Item = &'a Class>) -> Vec<(String, RGBColor)> {
    let mut entries: Vec<(String, RGBColor)> = Vec::new();
    for class in classes {
        if !entries.iter().any(|(label, _)| *label == class.label) {
            entries.push((class.label.clone(), class.color));
        }
    }
    entries
}
