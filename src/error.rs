use std::path::PathBuf;

use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

use crate::render::frame::Projection;

// ---------------------------------------------------------------------------
// Rendering errors
// ---------------------------------------------------------------------------

/// Everything that can stop a chart or animation from being written.
///
/// Data loading and CLI glue report through `anyhow`; the renderer keeps a
/// typed error so callers can tell a short series apart from a bad path.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("nothing to render: no entity series given")]
    NoEntities,

    #[error("entity {entity}: frame {index} requested but only {available} samples loaded")]
    OutOfRange {
        entity: usize,
        index: usize,
        available: usize,
    },

    #[error("entity {entity}: sample {index} has no z coordinate")]
    MissingZ { entity: usize, index: usize },

    #[error("{projection} projection needs {axis} bounds")]
    MissingBounds {
        projection: Projection,
        axis: char,
    },

    #[error("an animation needs at least one frame")]
    NoFrames,

    #[error("invalid color '{0}'")]
    InvalidColor(String),

    #[error("writing {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("drawing failed: {0}")]
    Drawing(String),

    #[error("image encoding failed")]
    Encode(#[from] image::ImageError),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Drawing(err.to_string())
    }
}

pub type RenderResult<T> = Result<T, RenderError>;
