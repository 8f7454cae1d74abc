use crate::error::Error;

const TWO_32: u64 = 1 << 32;

/// Draws a uniformly distributed integer from the inclusive range
/// `min..=max` using rejection sampling, so no modulo bias survives.
///
/// `draw` fills its buffer with raw generator output; one call consumes 4
/// bytes (interpreted as a big-endian u32) for ranges up to 2^32, 8 bytes
/// for wider ranges. `min == max` returns without drawing at all.
pub fn sample_int<F>(min: i64, max: i64, mut draw: F) -> Result<i64, Error>
where
    F: FnMut(&mut [u8]) -> Result<(), Error>,
{
    if min > max {
        return Err(Error::InvalidArgument(format!(
            "inverted bounds: min {} > max {}",
            min, max
        )));
    }
    if min == max {
        return Ok(min);
    }

    let span = (max as u64).wrapping_sub(min as u64);
    if span == u64::MAX {
        // Full 64-bit range: one raw draw is already uniform.
        let mut buf = [0u8; 8];
        draw(&mut buf)?;
        let value = u64::from_be_bytes(buf);
        return Ok(min.wrapping_add(value as i64));
    }
    let range = span + 1;

    if range <= TWO_32 {
        let limit = TWO_32 - (TWO_32 % range);
        loop {
            let mut buf = [0u8; 4];
            draw(&mut buf)?;
            let value = u32::from_be_bytes(buf) as u64;
            if value < limit {
                return Ok(min.wrapping_add((value % range) as i64));
            }
        }
    }

    // Wide-range variant: same construction on 64-bit draws.
    // 2^64 mod range, kept in u64 arithmetic.
    let rem = ((u64::MAX % range) + 1) % range;
    let limit = 0u64.wrapping_sub(rem);
    loop {
        let mut buf = [0u8; 8];
        draw(&mut buf)?;
        let value = u64::from_be_bytes(buf);
        if rem == 0 || value < limit {
            return Ok(min.wrapping_add((value % range) as i64));
        }
    }
}
