//! Scratch files for glyph-forge integration tests.
//!
//! Paths live under `target/glyph-forge-tests`, one directory per call, and
//! are read and written through capability-based `Dir` handles.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;

const SCRATCH_ROOT: &str = "target/glyph-forge-tests";

/// Reserve a fresh scratch file path; the file itself is not created.
///
/// # Errors
///
/// Returns any filesystem error raised while creating the parent directory.
pub fn scratch_file(prefix: &str, file_name: &str) -> io::Result<Utf8PathBuf> {
    static NEXT_ID: AtomicUsize = AtomicUsize::new(0);
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let dir = Utf8Path::new(SCRATCH_ROOT).join(format!("{prefix}-{}-{id}", std::process::id()));
    Dir::open_ambient_dir(".", ambient_authority())?.create_dir_all(&dir)?;
    Ok(dir.join(file_name))
}

/// Write `contents` to a scratch file.
///
/// # Errors
///
/// Returns any filesystem error raised while opening or writing.
pub fn write_scratch(path: &Utf8Path, contents: &str) -> io::Result<()> {
    let (dir, name) = open_parent(path)?;
    dir.write(name, contents)
}

/// Read a scratch file back as UTF-8.
///
/// # Errors
///
/// Returns any filesystem error raised while opening or reading.
pub fn read_scratch(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = open_parent(path)?;
    dir.read_to_string(name)
}

/// Read a scratch file back as raw bytes.
///
/// # Errors
///
/// Returns any filesystem error raised while opening or reading.
pub fn read_scratch_bytes(path: &Utf8Path) -> io::Result<Vec<u8>> {
    let (dir, name) = open_parent(path)?;
    dir.read(name)
}

fn open_parent(path: &Utf8Path) -> io::Result<(Dir, &str)> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("{path} names no file"))
    })?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    Ok((Dir::open_ambient_dir(parent, ambient_authority())?, name))
}
