// XXH3-128 over a streamed read; used to verify cross-filesystem copies

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;
use xxhash_rust::xxh3::{Xxh3, xxh3_128};

const BUFFER_SIZE: usize = 1024 * 1024;
const SMALL_FILE: u64 = 10 * 1024 * 1024;

/// Page-cache hint for the whole of `file`
#[cfg(target_os = "linux")]
fn advise(file: &File, advice: libc::c_int) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;

    // posix_fadvise returns the error number instead of setting errno
    let rc = unsafe { libc::posix_fadvise(file.as_raw_fd(), 0, 0, advice) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::from_raw_os_error(rc))
    }
}

/// Hash a file without keeping it in the page cache afterwards.
pub fn file_checksum(path: &Path) -> io::Result<u128> {
    let file = File::open(path)?;
    let file_size = file.metadata()?.len();

    #[cfg(target_os = "linux")]
    let _ = advise(&file, libc::POSIX_FADV_SEQUENTIAL);

    let hash = if file_size < SMALL_FILE {
        let mut buffer = Vec::with_capacity(file_size as usize);
        BufReader::new(&file).read_to_end(&mut buffer)?;
        xxh3_128(&buffer)
    } else {
        let mut reader = BufReader::with_capacity(BUFFER_SIZE, &file);
        let mut hasher = Xxh3::new();
        let mut buffer = vec![0u8; BUFFER_SIZE];
        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }
        hasher.digest128()
    };

    #[cfg(target_os = "linux")]
    {
        if let Err(e) = advise(&file, libc::POSIX_FADV_DONTNEED) {
            tracing::debug!("fadvise DONTNEED failed for {}: {e}", path.display());
        }
    }

    tracing::debug!(
        "Checksum {}: {:032x} ({:.2} MB)",
        path.display(),
        hash,
        file_size as f64 / (1024.0 * 1024.0)
    );

    Ok(hash)
}

/// Same length and same checksum
pub fn files_match(left: &Path, right: &Path) -> io::Result<bool> {
    if fs::metadata(left)?.len() != fs::metadata(right)?.len() {
        return Ok(false);
    }
    Ok(file_checksum(left)? == file_checksum(right)?)
}
