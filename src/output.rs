use crate::error::{Error, Result};
use crate::feed::Feed;
use crate::review;
use gtfs_structures::GtfsWriter;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, Copy)]
pub struct OutputOptions {
    /// Also write the tables as plain `.txt` files
    pub unpacked: bool,
    /// Also write the review GeoJSON
    pub geojson: bool,
}

/// Paths of everything a run wrote
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenFiles {
    pub archive: PathBuf,
    pub shapes_archive: PathBuf,
    pub unpacked: Option<PathBuf>,
    pub geojson: Option<PathBuf>,
}

/// Writes `<archive_name>.zip` (no shapes) and `<archive_name>_shapes.zip`
///
/// Everything is first written next to its final name with a `.tmp` suffix.
/// Only when every file is staged are they moved in place, and a failing move
/// puts back what the earlier moves replaced: a run leaves either all of its
/// outputs or none of them.
pub fn write_feed(
    feed: &Feed,
    output_dir: &Path,
    archive_name: &str,
    options: OutputOptions,
) -> Result<WrittenFiles> {
    let plain = GtfsWriter::default()
        .write_shapes(false)
        .to_zip_bytes(&feed.gtfs)?;
    let with_shapes = GtfsWriter::default().to_zip_bytes(&feed.gtfs)?;
    let geojson = if options.geojson {
        Some(geojson::GeoJson::from(review::to_geojson(feed)).to_string())
    } else {
        None
    };

    std::fs::create_dir_all(output_dir).map_err(|e| Error::io(output_dir, e))?;
    let written = WrittenFiles {
        archive: output_dir.join(format!("{archive_name}.zip")),
        shapes_archive: output_dir.join(format!("{archive_name}_shapes.zip")),
        unpacked: options.unpacked.then(|| output_dir.join(archive_name)),
        geojson: geojson
            .as_ref()
            .map(|_| output_dir.join(format!("{archive_name}.geojson"))),
    };

    let mut staged = Vec::new();
    let result = stage_file(&mut staged, &written.archive, &plain)
        .and_then(|_| stage_file(&mut staged, &written.shapes_archive, &with_shapes))
        .and_then(|_| match &written.unpacked {
            Some(dir) => stage_directory(&mut staged, dir, feed),
            None => Ok(()),
        })
        .and_then(|_| match (&written.geojson, &geojson) {
            (Some(path), Some(content)) => stage_file(&mut staged, path, content.as_bytes()),
            _ => Ok(()),
        });
    if let Err(e) = result {
        for stage in &staged {
            remove_path(&stage.tmp);
        }
        return Err(e);
    }
    commit(&staged)?;

    log::info!(
        "{} and {} written",
        written.archive.display(),
        written.shapes_archive.display()
    );
    if let Some(dir) = &written.unpacked {
        log::info!("tables written in {}", dir.display());
    }
    if let Some(path) = &written.geojson {
        log::info!("{} written", path.display());
    }
    Ok(written)
}

/// An output written under a temporary name
#[derive(Debug)]
struct Staged {
    tmp: PathBuf,
    target: PathBuf,
    is_dir: bool,
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn stage_file(staged: &mut Vec<Staged>, target: &Path, content: &[u8]) -> Result<()> {
    let tmp = with_suffix(target, ".tmp");
    std::fs::write(&tmp, content).map_err(|e| Error::io(&tmp, e))?;
    staged.push(Staged {
        tmp,
        target: target.to_path_buf(),
        is_dir: false,
    });
    Ok(())
}

fn stage_directory(staged: &mut Vec<Staged>, target: &Path, feed: &Feed) -> Result<()> {
    let tmp = with_suffix(target, ".tmp");
    if tmp.is_dir() {
        std::fs::remove_dir_all(&tmp).map_err(|e| Error::io(&tmp, e))?;
    }
    // pushed first so a half written directory is cleaned up too
    staged.push(Staged {
        tmp: tmp.clone(),
        target: target.to_path_buf(),
        is_dir: true,
    });
    GtfsWriter::default().write_to_directory(&feed.gtfs, &tmp)?;
    Ok(())
}

/// Moves every staged output in place, or none of them
fn commit(staged: &[Staged]) -> Result<()> {
    // target and the previous content it replaced
    let mut moved: Vec<(&Path, Option<PathBuf>)> = Vec::with_capacity(staged.len());
    for stage in staged {
        match replace(stage) {
            Ok(backup) => moved.push((stage.target.as_path(), backup)),
            Err(e) => {
                for stage in staged {
                    remove_path(&stage.tmp);
                }
                for (target, backup) in moved.into_iter().rev() {
                    remove_path(target);
                    if let Some(backup) = backup {
                        let _ = std::fs::rename(&backup, target);
                    }
                }
                return Err(e);
            }
        }
    }
    for (_, backup) in moved {
        if let Some(backup) = backup {
            remove_path(&backup);
        }
    }
    Ok(())
}

/// Renames the staged output to its target, keeping what was there as a backup
fn replace(stage: &Staged) -> Result<Option<PathBuf>> {
    let previous = if stage.is_dir {
        stage.target.is_dir()
    } else {
        stage.target.is_file()
    };
    let backup = if previous {
        let backup = with_suffix(&stage.target, ".bak");
        remove_path(&backup);
        std::fs::rename(&stage.target, &backup).map_err(|e| Error::io(&stage.target, e))?;
        Some(backup)
    } else {
        None
    };
    if let Err(e) = std::fs::rename(&stage.tmp, &stage.target) {
        if let Some(backup) = &backup {
            let _ = std::fs::rename(backup, &stage.target);
        }
        return Err(Error::io(&stage.target, e));
    }
    Ok(backup)
}

fn remove_path(path: &Path) {
    let _ = if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
}
