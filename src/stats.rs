use std::time::{Duration, Instant};

const REPORT_INTERVAL: Duration = Duration::from_millis(500);

pub trait Recorder {
    type Str: AsRef<str>;

    /// Records the state after a step
    fn record(&mut self, generation: u64, alive: usize);

    fn has_report(&self) -> bool;
    fn report(&mut self) -> Self::Str;
}

pub struct SimpleRecord {
    generation: u64,
    alive: usize,
    gens_in_report: usize,
    last_report: Instant,
}
impl SimpleRecord {
    pub fn new(generation: u64, alive: usize) -> Self {
        Self {
            generation,
            alive,
            gens_in_report: 0,
            last_report: Instant::now(),
        }
    }
}
impl Recorder for SimpleRecord {
    type Str = String;

    fn record(&mut self, generation: u64, alive: usize) {
        // paused steps and resets do not count towards the rate
        if generation > self.generation {
            self.gens_in_report += (generation - self.generation) as usize;
        }
        self.generation = generation;
        self.alive = alive;
    }

    fn has_report(&self) -> bool {
        self.last_report.elapsed() >= REPORT_INTERVAL
    }
    fn report(&mut self) -> Self::Str {
        let gens_per_sec = self.gens_in_report as f64 / self.last_report.elapsed().as_secs_f64();
        // reset stats for next report
        self.last_report = Instant::now();
        self.gens_in_report = 0;

        format!(
            "generation: {}  live cells: {}  {:.02} gen/s",
            self.generation, self.alive, gens_per_sec
        )
    }
}

/// Keeps one row per recorded step for [`CsvRecord::save`]
pub struct CsvRecord {
    inner: SimpleRecord,
    data: Vec<(u64, u128, usize)>,
    last: Instant,
}
impl CsvRecord {
    pub fn new(generation: u64, alive: usize) -> Self {
        Self {
            inner: SimpleRecord::new(generation, alive),
            data: Vec::new(),
            last: Instant::now(),
        }
    }

    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_to(std::io::BufWriter::new(file))
    }

    fn write_to<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        out.write_all(b"gen,delta_t,alive\n")?;
        for (generation, delta, alive) in &self.data {
            writeln!(out, "{},{},{}", generation, delta, alive)?;
        }
        out.flush()
    }
}
impl Recorder for CsvRecord {
    type Str = <SimpleRecord as Recorder>::Str;

    fn record(&mut self, generation: u64, alive: usize) {
        let delta = self.last.elapsed().as_micros();
        self.last = Instant::now();

        self.data.push((generation, delta, alive));
        self.inner.record(generation, alive);
    }

    fn has_report(&self) -> bool {
        self.inner.has_report()
    }
    fn report(&mut self) -> Self::Str {
        self.inner.report()
    }
}

pub enum SwitchRecorder {
    Csv(CsvRecord),
    Simple(SimpleRecord),
}
impl SwitchRecorder {
    pub fn new(generation: u64, alive: usize, csv: bool) -> Self {
        if csv {
            Self::Csv(CsvRecord::new(generation, alive))
        } else {
            Self::Simple(SimpleRecord::new(generation, alive))
        }
    }

    /// Writes the CSV rows; a no-op unless recording CSV
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> std::io::Result<()> {
        match self {
            Self::Csv(r) => r.save(path),
            Self::Simple(_) => Ok(()),
        }
    }
}
impl Recorder for SwitchRecorder {
    type Str = String;

    fn record(&mut self, generation: u64, alive: usize) {
        match self {
            Self::Csv(r) => r.record(generation, alive),
            Self::Simple(r) => r.record(generation, alive),
        }
    }
    fn has_report(&self) -> bool {
        match self {
            Self::Csv(r) => r.has_report(),
            Self::Simple(r) => r.has_report(),
        }
    }
    fn report(&mut self) -> Self::Str {
        match self {
            Self::Csv(r) => r.report(),
            Self::Simple(r) => r.report(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_shows_counters() {
        let mut record = SimpleRecord::new(0, 7);
        record.record(1, 8);
        record.record(2, 9);
        let report = record.report();

        assert!(report.starts_with("generation: 2  live cells: 9  "), "{report}");
        assert!(report.ends_with(" gen/s"));
    }

    #[test]
    fn paused_steps_do_not_count() {
        let mut record = SimpleRecord::new(4, 1);
        record.record(4, 1);
        record.record(0, 1);

        assert_eq!(record.gens_in_report, 0);
    }

    #[test]
    fn csv_rows_follow_records() {
        let mut record = CsvRecord::new(0, 3);
        record.record(1, 4);
        record.record(2, 0);
        let mut out = Vec::new();
        record.write_to(&mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[0], "gen,delta_t,alive");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("1,") && lines[1].ends_with(",4"));
        assert!(lines[2].starts_with("2,") && lines[2].ends_with(",0"));
    }
}
