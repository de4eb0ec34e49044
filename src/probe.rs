//! Apparent-size probing for single filesystem paths.
//!
//! Uses `lstat` so symbolic links are reported as links and never followed.
//! Sizes are the logical byte length (`st_size`), not allocated blocks.

use crate::error::ProbeError;
use std::path::Path;

/// What a path turned out to be when probed without following links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probed {
    File(u64),
    Directory,
    Symlink,
    /// Sockets, fifos, devices. Never counted.
    Other,
}

/// Probes `path` with `lstat` semantics.
///
/// # Errors
/// Returns [`ProbeError::AccessDenied`] or [`ProbeError::NotFound`] when the
/// underlying stat call fails for those reasons, [`ProbeError::Transient`]
/// otherwise. Callers treat every error as a zero contribution.
#[cfg(unix)]
pub fn probe(path: &Path) -> Result<Probed, ProbeError> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        ProbeError::from_io(path, std::io::Error::from(std::io::ErrorKind::InvalidInput))
    })?;

    let mut stat_buf = std::mem::MaybeUninit::<libc::stat>::uninit();
    let result = unsafe { libc::lstat(c_path.as_ptr(), stat_buf.as_mut_ptr()) };
    if result != 0 {
        return Err(ProbeError::from_io(path, std::io::Error::last_os_error()));
    }

    let stat_buf = unsafe { stat_buf.assume_init() };
    let probed = match stat_buf.st_mode & libc::S_IFMT {
        libc::S_IFREG => Probed::File(stat_buf.st_size.max(0) as u64),
        libc::S_IFDIR => Probed::Directory,
        libc::S_IFLNK => Probed::Symlink,
        _ => Probed::Other,
    };
    Ok(probed)
}

#[cfg(not(unix))]
pub fn probe(path: &Path) -> Result<Probed, ProbeError> {
    let metadata = std::fs::symlink_metadata(path).map_err(|e| ProbeError::from_io(path, e))?;
    let file_type = metadata.file_type();
    let probed = if file_type.is_symlink() {
        Probed::Symlink
    } else if file_type.is_dir() {
        Probed::Directory
    } else if file_type.is_file() {
        Probed::File(metadata.len())
    } else {
        Probed::Other
    };
    Ok(probed)
}

/// Returns the apparent size of `path` in bytes.
///
/// Anything that is not a regular file (directories, links, special files)
/// has an apparent size of zero here; directory totals come from
/// [`crate::aggregate::aggregate`].
pub fn apparent_size(path: &Path) -> Result<u64, ProbeError> {
    match probe(path)? {
        Probed::File(size) => Ok(size),
        _ => Ok(0),
    }
}
