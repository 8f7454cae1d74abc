/// Collects CPU timing jitter via clock_gettime(CLOCK_MONOTONIC).
///
/// Emits the deltas between successive samples rather than the raw
/// timestamps; the absolute clock value is guessable, the low bits of the
/// deltas are not. A data-dependent busy-spin between samples amplifies
/// cache/scheduler/interrupt jitter.
pub fn sample_deltas(count: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(count * 8);
    let mut accumulator: u64 = 0;
    let mut prev = clock_gettime_ns();

    for i in 0..count {
        // Spin length depends on previous timing so the loop cannot settle
        // into a fixed rhythm.
        let spin_count = 1000 + (accumulator & 0x1FF) as usize;
        let mut x: u64 = (i as u64).wrapping_mul(0x6C62272E07BB0142);
        for _ in 0..spin_count {
            x = x.wrapping_mul(0x5DEECE66D).wrapping_add(0xB);
        }
        // Prevent optimizer from eliminating the spin
        std::hint::black_box(x);

        let ts = clock_gettime_ns();
        let delta = ts.wrapping_sub(prev);
        prev = ts;
        accumulator = accumulator.wrapping_add(delta);
        out.extend_from_slice(&delta.to_le_bytes());
    }

    out
}

fn clock_gettime_ns() -> u64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    unsafe {
        libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts);
    }
    (ts.tv_sec as u64)
        .wrapping_mul(1_000_000_000)
        .wrapping_add(ts.tv_nsec as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_length() {
        assert_eq!(sample_deltas(0).len(), 0);
        assert_eq!(sample_deltas(4).len(), 32);
        assert_eq!(sample_deltas(64).len(), 512);
    }

    #[test]
    fn test_samples_vary() {
        // Timing deltas will not all be identical across two runs.
        assert_ne!(sample_deltas(64), sample_deltas(64));
    }
}
