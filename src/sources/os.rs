use std::fs::File;
use std::io::Read;

use crate::error::Error;

/// Fills `buf` with OS randomness from /dev/urandom. Used for the one-shot
/// bootstrap seed; scheduled reseeding draws from the pools instead.
pub fn fill_os_random(buf: &mut [u8]) -> Result<(), Error> {
    File::open("/dev/urandom")?.read_exact(buf)?;
    Ok(())
}
