use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use log::warn;

use crate::core::{ProcessReport, ReportSink, SchedEvent};

pub const CSV_HEADER: &str = "Command, Finished, Error, Burst Time (in ms), Turnaround Time (in ms), Waiting Time (in ms), Response Time (in ms)";

/// Prints `command|start|end` for every context switch.
#[derive(Debug)]
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn record(&mut self, event: &SchedEvent) {
        let SchedEvent::ContextSwitch { command, start, end } = event else {
            return;
        };
        let written = writeln!(self.out, "{command}|{start}|{end}").and_then(|()| self.out.flush());
        if let Err(err) = written {
            warn!("failed to print context switch: {err}");
        }
    }
}

/// One CSV row per completed process.
#[derive(Debug)]
pub struct CsvSink<W: Write> {
    out: W,
}

impl CsvSink<BufWriter<File>> {
    /// Creates (or truncates) `path` and writes the header line.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn new(mut out: W) -> io::Result<Self> {
        writeln!(out, "{CSV_HEADER}")?;
        Ok(Self { out })
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_row(&mut self, report: &ProcessReport) -> io::Result<()> {
        let flag = |set: bool| if set { "Yes" } else { "No" };
        let optional = |value: Option<u64>| value.map(|v| v.to_string()).unwrap_or_default();
        writeln!(
            self.out,
            "{}, {}, {}, {}, {}, {}, {}",
            report.command,
            flag(report.finished),
            flag(report.errored),
            report.burst_time,
            optional(report.turnaround_time),
            optional(report.waiting_time),
            report.response_time,
        )?;
        self.out.flush()
    }
}

impl<W: Write> ReportSink for CsvSink<W> {
    fn record(&mut self, event: &SchedEvent) {
        if let SchedEvent::Completed(report) = event {
            if let Err(err) = self.write_row(report) {
                warn!("failed to write report row for `{}`: {err}", report.command);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(errored: bool) -> ProcessReport {
        ProcessReport {
            command: "sleep 1".into(),
            finished: !errored,
            errored,
            arrival_time: 0,
            start_time: 2,
            completion_time: 1010,
            burst_time: 1000,
            turnaround_time: (!errored).then_some(1010),
            waiting_time: (!errored).then_some(10),
            response_time: 2,
        }
    }

    #[test]
    fn console_prints_switches_only() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.record(&SchedEvent::ContextSwitch {
            command: "ls".into(),
            start: 3,
            end: 9,
        });
        sink.record(&SchedEvent::Completed(report(false)));
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "ls|3|9\n");
    }

    #[test]
    fn csv_rows_follow_header() {
        let mut sink = CsvSink::new(Vec::new()).unwrap();
        sink.record(&SchedEvent::Completed(report(false)));
        sink.record(&SchedEvent::Completed(report(true)));
        sink.record(&SchedEvent::ContextSwitch {
            command: "ignored".into(),
            start: 0,
            end: 1,
        });

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "sleep 1, Yes, No, 1000, 1010, 10, 2");
        assert_eq!(lines[2], "sleep 1, No, Yes, 1000, , , 2");
    }
}
