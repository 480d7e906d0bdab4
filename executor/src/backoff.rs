//! Exponential backoff with jitter (§4.E): `min(base · 2^(retry-1) + jitter, max)`,
//! jitter uniform in `[-base, +base]`, delay always clamped into `[0, max]`
//! (Testable Property 8).

use std::time::Duration;

use rand::Rng;

pub fn backoff_delay(retry: u32, base_secs: u64, max_secs: u64) -> Duration {
    let exponent = retry.saturating_sub(1).min(32);
    let grown = base_secs.saturating_mul(1u64 << exponent);
    let jitter: i64 = rand::thread_rng().gen_range(-(base_secs as i64)..=(base_secs as i64));
    let raw = (grown as i64).saturating_add(jitter);
    let clamped = raw.clamp(0, max_secs as i64);
    Duration::from_secs(clamped as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_never_exceeds_max_even_at_high_retry_counts() {
        for retry in 1..20 {
            let d = backoff_delay(retry, 60, 300);
            assert!(d.as_secs() <= 300);
        }
    }

    #[test]
    fn first_retry_is_roughly_base_delay() {
        let d = backoff_delay(1, 60, 300);
        assert!(d.as_secs() <= 120);
    }
}
