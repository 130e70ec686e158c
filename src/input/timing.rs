//! Measuring and printing the runtime of the generator

use std::fmt;
use std::time::{Duration, Instant};

/// Estimated time to completion, based on amount of work done
pub fn ettc(start: Instant, current: usize, total: usize) -> Duration {
    let rt = start.elapsed().as_secs_f64();
    let ettc = if current > 0 && current < total {
        rt * ((total - current) as f64) / (current as f64)
    } else {
        0.0
    };
    Duration::from_secs_f64(ettc)
}

/// Wrapper around std::time::Duration
pub struct PrettyDuration {
    pub duration: Duration,
}

impl From<Duration> for PrettyDuration {
    fn from(duration: Duration) -> PrettyDuration {
        PrettyDuration {duration}
    }
}

impl fmt::Display for PrettyDuration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut t = self.duration.as_secs();
        let s = t % 60;
        t /= 60;
        let min = t % 60;
        t /= 60;
        let hr = t % 24;
        let d = t / 24;
        if d > 0 {
            write!(f, "{}d {:02}:{:02}:{:02}", d, hr, min, s)
        } else {
            write!(f, "{:02}:{:02}:{:02}", hr, min, s)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_format() {
        let t = Duration::from_secs(3 * 3600 + 25 * 60 + 7);
        let output = PrettyDuration::from(t).to_string();
        println!("{:?} => \"{}\"", t, output);
        assert_eq!(output, "03:25:07");

        let t = Duration::from_secs(2 * 86400 + 59);
        assert_eq!(PrettyDuration::from(t).to_string(), "2d 00:00:59");
    }

    #[test]
    fn nothing_done_yet() {
        let start = Instant::now();
        assert_eq!(ettc(start, 0, 100), Duration::from_secs(0));
        assert_eq!(ettc(start, 100, 100), Duration::from_secs(0));
    }
}
