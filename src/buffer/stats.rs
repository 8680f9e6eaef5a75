use std::fmt::{Display, Formatter};

/// Counters collected by the buffer manager. Failed operations leave the
/// access counters untouched, I/O counters follow the backend calls that
/// were actually issued.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub accesses: u64,
    pub hits: u64,
    pub writes: u64,
    pub read_io: u64,
    pub write_io: u64,
}

impl Stats {
    pub fn misses(&self) -> u64 {
        self.accesses - self.hits
    }

    pub fn total_io(&self) -> u64 {
        self.read_io + self.write_io
    }

    pub fn hit_rate(&self) -> f64 {
        ratio(self.hits, self.accesses)
    }

    pub fn write_rate(&self) -> f64 {
        ratio(self.writes, self.accesses)
    }
}

fn ratio(n: u64, d: u64) -> f64 {
    if d == 0 {
        return 0.0;
    }
    n as f64 / d as f64 * 100.0
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total: {}", self.accesses)?;
        writeln!(f, "Total hit: {}", self.hits)?;
        writeln!(f, "Hit rate: {:.3}%", self.hit_rate())?;
        writeln!(f, "Total write: {}", self.writes)?;
        writeln!(f, "Write rate: {:.3}%", self.write_rate())?;
        writeln!(f, "read_io: {}", self.read_io)?;
        writeln!(f, "write_io: {}", self.write_io)?;
        write!(f, "total_io: {}", self.total_io())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_report() {
        let stats = Stats { accesses: 8, hits: 6, writes: 2, read_io: 2, write_io: 1 };
        assert_eq!(2, stats.misses());
        assert_eq!(3, stats.total_io());
        assert_eq!(75.0, stats.hit_rate());

        let report = stats.to_string();
        assert!(report.contains("Hit rate: 75.000%"));
        assert!(report.contains("Write rate: 25.000%"));
        assert!(report.ends_with("total_io: 3"));

        assert_eq!(0.0, Stats::default().hit_rate());
    }
}
