use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};

use super::frame::Projection;
use crate::error::{RenderError, RenderResult};

// ---------------------------------------------------------------------------
// Output paths
// ---------------------------------------------------------------------------

/// `<dir>/<prefix>-<projection>.gif`
pub fn artifact_path(dir: &Path, prefix: &str, projection: Projection) -> PathBuf {
    dir.join(format!("{prefix}-{}.gif", projection.suffix()))
}

/// `<dir>/<prefix>.png`
pub fn chart_path(dir: &Path, prefix: &str) -> PathBuf {
    dir.join(format!("{prefix}.png"))
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Replace `path` with `bytes` in one step.
///
/// The bytes go to a temporary file beside the target which is then renamed
/// over it, so a failed run never leaves a truncated artifact behind. The file
/// gets the same mode a plain create would (0666 less the umask).
pub fn write_atomic(path: &Path, bytes: &[u8]) -> RenderResult<()> {
    let io_err = |source: std::io::Error| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".swarm-plot-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// PNG-encode an RGB image in memory.
pub fn encode_png(img: &RgbImage) -> RenderResult<Vec<u8>> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
