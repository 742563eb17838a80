/// Turns a processed/total count into whole percentages.
///
/// A percentage is reported each time `floor(processed * 100 / total)`
/// increases. [`Progress::finish`] reports 100 if it has not been reported
/// yet, which also covers an empty run.
pub struct Progress<F: FnMut(u8)> {
    total: u64,
    processed: u64,
    last_reported: u8,
    report: F,
}

impl<F: FnMut(u8)> Progress<F> {
    pub fn new(total: u64, report: F) -> Self {
        Progress {
            total,
            processed: 0,
            last_reported: 0,
            report,
        }
    }

    pub fn advance(&mut self) {
        self.processed += 1;
        if self.total == 0 {
            return;
        }

        // Clamped in case the tree grew between counting and processing.
        let percent = (self.processed.saturating_mul(100) / self.total).min(100) as u8;
        if percent > self.last_reported {
            self.last_reported = percent;
            (self.report)(percent);
        }
    }

    pub fn finish(mut self) -> u64 {
        if self.last_reported != 100 {
            self.last_reported = 100;
            (self.report)(100);
        }
        self.processed
    }
}
