use crate::core::{Millis, ProcessReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedEvent {
    // One run interval of a process, emitted when it is paused or exits
    ContextSwitch {
        command: String,
        start: Millis,
        end: Millis,
    },
    Completed(ProcessReport),
}

impl SchedEvent {
    pub fn command(&self) -> &str {
        match self {
            Self::ContextSwitch { command, .. } => command,
            Self::Completed(report) => &report.command,
        }
    }
}

/// Receives switch and completion events as they happen.
pub trait ReportSink {
    fn record(&mut self, event: &SchedEvent);
}

impl ReportSink for Vec<SchedEvent> {
    fn record(&mut self, event: &SchedEvent) {
        self.push(event.clone());
    }
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn record(&mut self, event: &SchedEvent) {
        (**self).record(event);
    }
}

impl<S: ReportSink> ReportSink for Option<S> {
    fn record(&mut self, event: &SchedEvent) {
        if let Some(sink) = self {
            sink.record(event);
        }
    }
}

impl<A: ReportSink, B: ReportSink> ReportSink for (A, B) {
    fn record(&mut self, event: &SchedEvent) {
        self.0.record(event);
        self.1.record(event);
    }
}
