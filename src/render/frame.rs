use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::data::model::Sample;
use crate::error::{RenderError, RenderResult};

// ---------------------------------------------------------------------------
// Projection – which coordinates a scatter frame shows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    Xy,
    Xz,
    Xyz,
}

impl Projection {
    pub const ALL: [Projection; 3] = [Projection::Xy, Projection::Xz, Projection::Xyz];

    /// File-name suffix and display name.
    pub fn suffix(self) -> &'static str {
        match self {
            Projection::Xy => "xy",
            Projection::Xz => "xz",
            Projection::Xyz => "xyz",
        }
    }

    pub fn needs_z(self) -> bool {
        !matches!(self, Projection::Xy)
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

// ---------------------------------------------------------------------------
// Bounds – fixed axis limits
// ---------------------------------------------------------------------------

/// `(min, max)` per axis. Only the axes the projection draws are required.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: (f64, f64),
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<(f64, f64)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<(f64, f64)>,
}

impl Bounds {
    pub fn xy(x: (f64, f64), y: (f64, f64)) -> Self {
        Bounds {
            x,
            y: Some(y),
            z: None,
        }
    }

    pub fn xz(x: (f64, f64), z: (f64, f64)) -> Self {
        Bounds {
            x,
            y: None,
            z: Some(z),
        }
    }

    pub fn xyz(x: (f64, f64), y: (f64, f64), z: (f64, f64)) -> Self {
        Bounds {
            x,
            y: Some(y),
            z: Some(z),
        }
    }
}

fn contains(range: (f64, f64), v: f64) -> bool {
    v >= range.0 && v <= range.1
}

// ---------------------------------------------------------------------------
// FrameSpec – everything fixed for one animation run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FrameSpec {
    pub projection: Projection,
    pub bounds: Bounds,
    pub frame_count: usize,
    pub interval_ms: u32,
    /// Square canvas edge in pixels.
    pub size: u32,
    /// Marker radius in pixels.
    pub marker_size: u32,
    /// Axis labels, tick labels and legend.
    pub annotate: bool,
}

/// A sample mapped onto the axes of one projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projected {
    Planar(f64, f64),
    Volume(f64, f64, f64),
}

impl FrameSpec {
    /// Axis ranges for a 2D projection: (horizontal, vertical).
    /// For the 3D projection this is the ground plane (x, y).
    pub fn planar_ranges(&self) -> RenderResult<((f64, f64), (f64, f64))> {
        match self.projection {
            Projection::Xz => Ok((self.bounds.x, self.axis('z', self.bounds.z)?)),
            Projection::Xy | Projection::Xyz => Ok((self.bounds.x, self.axis('y', self.bounds.y)?)),
        }
    }

    /// Axis ranges for the 3D projection: (x, y, z).
    pub fn volume_ranges(&self) -> RenderResult<((f64, f64), (f64, f64), (f64, f64))> {
        Ok((
            self.bounds.x,
            self.axis('y', self.bounds.y)?,
            self.axis('z', self.bounds.z)?,
        ))
    }

    fn axis(&self, axis: char, range: Option<(f64, f64)>) -> RenderResult<(f64, f64)> {
        range.ok_or(RenderError::MissingBounds {
            projection: self.projection,
            axis,
        })
    }

    /// Check the frame count and that the bounds this projection needs are set.
    pub fn validate(&self) -> RenderResult<()> {
        if self.frame_count == 0 {
            return Err(RenderError::NoFrames);
        }
        match self.projection {
            Projection::Xyz => self.volume_ranges().map(|_| ()),
            _ => self.planar_ranges().map(|_| ()),
        }
    }

    /// Map a sample onto the drawn axes; `None` when it falls outside the bounds.
    pub fn project(&self, entity: usize, t: usize, s: &Sample) -> RenderResult<Option<Projected>> {
        let z = || s.z.ok_or(RenderError::MissingZ { entity, index: t });
        let projected = match self.projection {
            Projection::Xy => {
                let (h, v) = self.planar_ranges()?;
                (contains(h, s.x) && contains(v, s.y)).then_some(Projected::Planar(s.x, s.y))
            }
            Projection::Xz => {
                let z = z()?;
                let (h, v) = self.planar_ranges()?;
                (contains(h, s.x) && contains(v, z)).then_some(Projected::Planar(s.x, z))
            }
            Projection::Xyz => {
                let z = z()?;
                let (rx, ry, rz) = self.volume_ranges()?;
                (contains(rx, s.x) && contains(ry, s.y) && contains(rz, z))
                    .then_some(Projected::Volume(s.x, s.y, z))
            }
        };
        Ok(projected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(projection: Projection, bounds: Bounds) -> FrameSpec {
        FrameSpec {
            projection,
            bounds,
            frame_count: 1,
            interval_ms: 100,
            size: 64,
            marker_size: 3,
            annotate: false,
        }
    }

    #[test]
    fn xz_projects_altitude_onto_vertical_axis() {
        let s = spec(Projection::Xz, Bounds::xz((-200.0, 200.0), (0.0, 400.0)));
        let p = s.project(0, 0, &Sample::new(10.0, -999.0, 50.0)).unwrap();
        assert_eq!(p, Some(Projected::Planar(10.0, 50.0)));
    }

    #[test]
    fn outside_bounds_is_skipped() {
        let s = spec(Projection::Xy, Bounds::xy((-200.0, 200.0), (-200.0, 200.0)));
        assert_eq!(s.project(0, 0, &Sample::planar(250.0, 0.0)).unwrap(), None);
    }

    #[test]
    fn planar_sample_cannot_feed_xyz() {
        let s = spec(
            Projection::Xyz,
            Bounds::xyz((-1.0, 1.0), (-1.0, 1.0), (0.0, 1.0)),
        );
        assert!(matches!(
            s.project(4, 9, &Sample::planar(0.0, 0.0)),
            Err(RenderError::MissingZ { entity: 4, index: 9 })
        ));
    }

    #[test]
    fn validate_requires_projection_axes() {
        let s = spec(Projection::Xz, Bounds::xy((-1.0, 1.0), (-1.0, 1.0)));
        assert!(matches!(
            s.validate(),
            Err(RenderError::MissingBounds { axis: 'z', .. })
        ));
        let mut s = spec(Projection::Xy, Bounds::xy((-1.0, 1.0), (-1.0, 1.0)));
        assert!(s.validate().is_ok());
        s.frame_count = 0;
        assert!(matches!(s.validate(), Err(RenderError::NoFrames)));
    }
}
