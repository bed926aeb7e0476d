//! Atomic output writes.
//!
//! Rendered glyphs are written to a hidden sibling file first and renamed
//! into place, so readers never observe a half-written document or image.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Component, Utf8Path};
use cap_std::fs::{Dir, OpenOptions};

use crate::error::OutputError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Writes `contents` to `path` inside `dir` atomically.
///
/// `path` must be a single file name relative to `dir`.
///
/// # Errors
///
/// Returns [`OutputError::NotAFile`] when `path` is not a bare file name and
/// [`OutputError::WriteError`] when any write, sync, or rename step fails.
pub(crate) fn write_atomic(
    dir: &Dir,
    path: &Utf8Path,
    contents: &[u8],
) -> Result<(), OutputError> {
    let mut components = path.components();
    let (Some(Utf8Component::Normal(file_name)), None) = (components.next(), components.next())
    else {
        return Err(OutputError::NotAFile {
            path: path.to_path_buf(),
        });
    };
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(".{file_name}.{}.{counter}.partial", std::process::id());

    let write_error = |err: io::Error| OutputError::WriteError {
        path: path.to_path_buf(),
        message: err.to_string(),
    };

    if let Err(err) = write_temp(dir, &tmp_name, contents) {
        drop(dir.remove_file(&tmp_name));
        return Err(write_error(err));
    }
    if let Err(err) = replace(dir, &tmp_name, file_name) {
        drop(dir.remove_file(&tmp_name));
        return Err(write_error(err));
    }

    // Best-effort; the rename has already landed.
    drop(dir.open(".").and_then(|parent| parent.sync_all()));
    Ok(())
}

fn write_temp(dir: &Dir, tmp_name: &str, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(windows)]
fn replace(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    // Windows rename fails if the target exists.
    match dir.remove_file(target_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target_name)
}

#[cfg(not(windows))]
fn replace(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target_name)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use camino::Utf8PathBuf;
    use cap_std::ambient_authority;
    use rstest::{fixture, rstest};

    use super::*;

    struct Scratch {
        path: PathBuf,
        dir: Dir,
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            drop(fs::remove_dir_all(&self.path));
        }
    }

    #[fixture]
    fn scratch() -> Scratch {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("target")
            .join(format!("atomic-io-{}-{counter}", std::process::id()));
        fs::create_dir_all(&path).expect("create scratch dir");
        let dir = Dir::open_ambient_dir(&path, ambient_authority()).expect("open scratch dir");
        Scratch { path, dir }
    }

    #[rstest]
    fn writes_and_replaces_contents(scratch: Scratch) {
        let target = Utf8Path::new("glyph.svg");
        write_atomic(&scratch.dir, target, b"<svg/>").expect("first write");
        write_atomic(&scratch.dir, target, b"<svg></svg>").expect("second write");

        let contents = scratch.dir.read_to_string(target).expect("read back");
        assert_eq!(contents, "<svg></svg>");
    }

    #[rstest]
    fn leaves_no_partial_files(scratch: Scratch) {
        write_atomic(&scratch.dir, Utf8Path::new("glyph.json"), b"{}").expect("write");
        let names: Vec<String> = scratch
            .dir
            .entries()
            .expect("list dir")
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        assert_eq!(names, vec!["glyph.json".to_owned()]);
    }

    #[rstest]
    fn writes_binary_contents_unchanged(scratch: Scratch) {
        let bytes = [0x89, b'P', b'N', b'G', 0x00, 0xff];
        write_atomic(&scratch.dir, Utf8Path::new("glyph.png"), &bytes).expect("write");
        assert_eq!(scratch.dir.read("glyph.png").expect("read back"), bytes);
    }

    #[rstest]
    #[case("nested/glyph.svg")]
    #[case("../glyph.svg")]
    #[case("")]
    fn rejects_paths_that_are_not_file_names(scratch: Scratch, #[case] raw: &str) {
        let result = write_atomic(&scratch.dir, Utf8Path::new(raw), b"<svg/>");
        assert_eq!(
            result,
            Err(OutputError::NotAFile {
                path: Utf8PathBuf::from(raw)
            })
        );
    }
}
