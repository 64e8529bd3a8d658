pub mod draw;
pub mod metadata;
pub mod overlay;

use std::{
    fs,
    path::{Path, PathBuf},
};

use ab_glyph::FontVec;
use snafu::ResultExt;
use tracing::*;

use crate::{
    annotation::image::AnnotatedImage,
    consts::{EXPORT_JSON_FILE_NAME, EXPORT_PNG_FILE_NAME},
    error::*,
};

/// Files written by [`export_to_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub annotated_png: PathBuf,
    pub metadata_json: PathBuf,
}

/// Writes the annotated PNG and the metadata JSON for `image` into `dir`.
///
/// Nothing is written when `image` has no detections.
pub fn export_to_dir<P: AsRef<Path>>(
    image: &AnnotatedImage,
    image_name: Option<&str>,
    font: Option<&FontVec>,
    dir: P,
) -> Result<ExportPaths, OrbisError> {
    let dir = dir.as_ref();
    let metadata = metadata::export_metadata(image, image_name)?;
    let png = draw::encode_png(&draw::render_annotated(image, font)?)?;

    fs::create_dir_all(dir).context(IoWriteSnafu {
        path: dir.display().to_string(),
    })?;

    let paths = ExportPaths {
        annotated_png: dir.join(EXPORT_PNG_FILE_NAME),
        metadata_json: dir.join(EXPORT_JSON_FILE_NAME),
    };
    write_file(&paths.annotated_png, &png)?;
    write_file(&paths.metadata_json, metadata.as_bytes())?;

    info!(
        "exported {} detections to {}",
        image.detections().len(),
        dir.display()
    );
    Ok(paths)
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), OrbisError> {
    fs::write(path, contents).context(IoWriteSnafu {
        path: path.display().to_string(),
    })
}
