use std::fmt;
use std::time::Duration;

/// What caused a route recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeTrigger {
    Creation,
    Edit,
    Expiry,
}

impl fmt::Display for RecomputeTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecomputeTrigger::Creation => write!(f, "map creation"),
            RecomputeTrigger::Edit => write!(f, "manual edit"),
            RecomputeTrigger::Expiry => write!(f, "obstacle expiry"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecomputeStats {
    pub creation_recomputes: usize,
    pub edit_recomputes: usize,
    pub expiry_recomputes: usize,
    pub no_path_results: usize,
    pub rejected_edits: usize,
    pub expiries_reverted: usize,
    pub expiries_stale: usize,
    pub find_path_times: Vec<Duration>,
}

impl RecomputeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_recompute(&mut self, trigger: RecomputeTrigger, elapsed: Duration, found: bool) {
        match trigger {
            RecomputeTrigger::Creation => self.creation_recomputes += 1,
            RecomputeTrigger::Edit => self.edit_recomputes += 1,
            RecomputeTrigger::Expiry => self.expiry_recomputes += 1,
        }
        if !found {
            self.no_path_results += 1;
        }
        self.find_path_times.push(elapsed);
    }

    pub fn record_expiry(&mut self, reverted: bool) {
        if reverted {
            self.expiries_reverted += 1;
        } else {
            self.expiries_stale += 1;
        }
    }

    pub fn total_recomputes(&self) -> usize {
        self.creation_recomputes + self.edit_recomputes + self.expiry_recomputes
    }

    pub fn total_find_path_time(&self) -> Duration {
        self.find_path_times.iter().sum()
    }

    pub fn average_find_path_time(&self) -> Duration {
        if self.find_path_times.is_empty() {
            Duration::from_nanos(0)
        } else {
            self.total_find_path_time() / self.find_path_times.len() as u32
        }
    }
}

impl fmt::Display for RecomputeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total recomputes: {}", self.total_recomputes())?;
        writeln!(f, "  map creation: {}", self.creation_recomputes)?;
        writeln!(f, "  manual edits: {}", self.edit_recomputes)?;
        writeln!(f, "  obstacle expiry: {}", self.expiry_recomputes)?;
        writeln!(f, "No-path results: {}", self.no_path_results)?;
        writeln!(f, "Rejected edits: {}", self.rejected_edits)?;
        writeln!(
            f,
            "Expiries fired: {} reverted, {} stale",
            self.expiries_reverted, self.expiries_stale
        )?;
        writeln!(
            f,
            "Average find_path time: {:.2?}",
            self.average_find_path_time()
        )?;
        writeln!(f, "Total find_path time: {:.2?}", self.total_find_path_time())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_per_trigger_and_no_path_results() {
        let mut stats = RecomputeStats::new();
        stats.record_recompute(RecomputeTrigger::Creation, Duration::from_micros(30), true);
        stats.record_recompute(RecomputeTrigger::Edit, Duration::from_micros(10), false);
        stats.record_recompute(RecomputeTrigger::Expiry, Duration::from_micros(20), true);

        assert_eq!(stats.total_recomputes(), 3);
        assert_eq!(stats.no_path_results, 1);
        assert_eq!(stats.average_find_path_time(), Duration::from_micros(20));
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(RecomputeStats::new().average_find_path_time(), Duration::ZERO);
    }
}
