use std::fmt;

use average::{Estimate, Mean};

use crate::core::ProcessReport;

/// Aggregate metrics of a run. Errored processes count towards burst and
/// response averages but have no turnaround or waiting time.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub finished: usize,
    pub errored: usize,
    pub context_switches: usize,
    pub burst: Mean,
    pub response: Mean,
    pub turnaround: Mean,
    pub waiting: Mean,
}

impl RunSummary {
    pub fn record(&mut self, report: &ProcessReport) {
        // The final run interval of every process is a switch too
        self.context_switches += 1;
        if report.errored {
            self.errored += 1;
        } else {
            self.finished += 1;
        }

        self.burst.add(report.burst_time as f64);
        self.response.add(report.response_time as f64);
        if let (Some(turnaround), Some(waiting)) = (report.turnaround_time, report.waiting_time) {
            self.turnaround.add(turnaround as f64);
            self.waiting.add(waiting as f64);
        }
    }

    pub fn record_preemption(&mut self) {
        self.context_switches += 1;
    }

    pub fn completed(&self) -> usize {
        self.finished + self.errored
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} finished, {} errored, {} context switches",
            self.finished, self.errored, self.context_switches
        )?;
        writeln!(f, "Average burst time: {:.2} ms", self.burst.estimate())?;
        writeln!(f, "Average response time: {:.2} ms", self.response.estimate())?;
        writeln!(f, "Average turnaround time: {:.2} ms", self.turnaround.estimate())?;
        write!(f, "Average waiting time: {:.2} ms", self.waiting.estimate())
    }
}
