// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh serialization
//!
//! Meshes are encoded fully in memory, then written through a temporary
//! sibling file and renamed into place, so a failed export never leaves a
//! truncated file behind.

pub mod obj;
pub mod stl;

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Wavefront OBJ (ASCII)
    Obj,
    /// Binary STL (little-endian)
    Stl,
}

impl ExportFormat {
    /// Pick a format from a file extension (case-insensitive, without dot)
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "obj" => Ok(ExportFormat::Obj),
            "stl" => Ok(ExportFormat::Stl),
            other => Err(Error::UnsupportedFormat(format!(
                "unrecognized extension '{}'",
                other
            ))),
        }
    }

    /// Pick a format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!("no extension on {}", path.display()))
            })?;
        Self::from_extension(ext)
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Obj => "obj",
            ExportFormat::Stl => "stl",
        }
    }

    /// The other supported format
    pub fn companion(self) -> Self {
        match self {
            ExportFormat::Obj => ExportFormat::Stl,
            ExportFormat::Stl => ExportFormat::Obj,
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serialize a mesh into memory
pub fn encode(mesh: &Mesh, format: ExportFormat) -> Result<Vec<u8>> {
    mesh.validate()?;

    let mut buf = Vec::new();
    let written = match format {
        ExportFormat::Obj => obj::write_obj(mesh, &mut buf),
        ExportFormat::Stl => {
            if mesh.triangle_count() > u32::MAX as usize {
                return Err(Error::InvalidMesh(format!(
                    "{} triangles exceed the STL limit",
                    mesh.triangle_count()
                )));
            }
            stl::write_stl(mesh, &mut buf)
        }
    };
    written.map_err(|e| Error::io(PathBuf::from("<memory>"), e))?;

    Ok(buf)
}

/// Fail early if `path` cannot be created as a file
pub fn check_writable(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Err(Error::io(
            path,
            std::io::Error::other("path is a directory"),
        ));
    }

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    match fs::metadata(parent) {
        Ok(meta) if meta.is_dir() => {
            if meta.permissions().readonly() {
                Err(Error::io(
                    path,
                    std::io::Error::new(
                        std::io::ErrorKind::PermissionDenied,
                        "parent directory is read-only",
                    ),
                ))
            } else {
                Ok(())
            }
        }
        Ok(_) => Err(Error::io(
            path,
            std::io::Error::other("parent is not a directory"),
        )),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Hidden sibling used to stage `path` before it is renamed into place
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Write `bytes` to `path` via a temporary sibling and a rename
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    write_atomic_all(&[(path, bytes)])
}

/// Write several files as a unit
///
/// Every file is staged first and only then renamed into place. On failure
/// staged files are removed, as are files this call already renamed, so
/// either all files are written or none are.
pub fn write_atomic_all(files: &[(&Path, &[u8])]) -> Result<()> {
    let mut staged: Vec<PathBuf> = Vec::with_capacity(files.len());

    for (path, bytes) in files {
        let tmp = staging_path(path);
        if let Err(e) = fs::write(&tmp, bytes) {
            let _ = fs::remove_file(&tmp);
            remove_all(&staged);
            return Err(Error::io(*path, e));
        }
        staged.push(tmp);
    }

    for (i, ((path, _), tmp)) in files.iter().zip(&staged).enumerate() {
        if let Err(e) = fs::rename(tmp, path) {
            remove_all(&staged[i..]);
            for (done, _) in &files[..i] {
                let _ = fs::remove_file(done);
            }
            return Err(Error::io(*path, e));
        }
    }

    Ok(())
}

fn remove_all(paths: &[PathBuf]) {
    for path in paths {
        let _ = fs::remove_file(path);
    }
}

/// One file written by an export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub bytes: usize,
}

/// Serializes meshes to files, choosing the format from the extension
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshExporter;

impl MeshExporter {
    pub fn new() -> Self {
        Self
    }

    /// Export `mesh` to `path`, returning the format used
    pub fn export(&self, mesh: &Mesh, path: &Path) -> Result<ExportFormat> {
        let format = ExportFormat::from_path(path)?;
        check_writable(path)?;

        let bytes = encode(mesh, format)?;
        write_atomic(path, &bytes)?;

        tracing::info!(
            path = %path.display(),
            format = %format,
            bytes = bytes.len(),
            "Exported mesh"
        );

        Ok(format)
    }

    /// Export `mesh` to every path in `paths` as a unit
    ///
    /// Formats and writability are checked for all paths before anything is
    /// encoded. No file is left behind if any of them fails.
    pub fn export_all(&self, mesh: &Mesh, paths: &[PathBuf]) -> Result<Vec<ExportedFile>> {
        let formats = paths
            .iter()
            .map(|p| ExportFormat::from_path(p))
            .collect::<Result<Vec<_>>>()?;
        for path in paths {
            check_writable(path)?;
        }

        let encoded = formats
            .iter()
            .map(|&format| encode(mesh, format))
            .collect::<Result<Vec<_>>>()?;

        let files: Vec<(&Path, &[u8])> = paths
            .iter()
            .zip(&encoded)
            .map(|(path, bytes)| (path.as_path(), bytes.as_slice()))
            .collect();
        write_atomic_all(&files)?;

        let exported: Vec<ExportedFile> = paths
            .iter()
            .zip(formats)
            .zip(&encoded)
            .map(|((path, format), bytes)| ExportedFile {
                path: path.clone(),
                format,
                bytes: bytes.len(),
            })
            .collect();

        for file in &exported {
            tracing::info!(
                path = %file.path.display(),
                format = %file.format,
                bytes = file.bytes,
                "Exported mesh"
            );
        }

        Ok(exported)
    }
}
