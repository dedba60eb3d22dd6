use log::{debug, info};

use super::{input::InputSource, summary::RunSummary};
use crate::{
    core::{Millis, ReportSink, SchedCore, Step},
    error::SchedError,
    scheduler::Scheduler,
};

enum Arrivals {
    // Whole workload admitted up front
    Batch,
    Stream {
        input: Box<dyn InputSource>,
        idle_poll: Millis,
    },
}

/// A scheduling session: feeds arrivals into the core and steps it until
/// the workload is exhausted.
pub struct Sim<S: Scheduler> {
    pub core: SchedCore<S>,
    arrivals: Arrivals,
    summary: RunSummary,
}

impl<S: Scheduler> Sim<S> {
    /// Fixed workload; every command arrives at time 0 in the given order.
    pub fn offline<I>(mut core: SchedCore<S>, commands: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for command in commands {
            core.admit(command, 0);
        }

        Self {
            core,
            arrivals: Arrivals::Batch,
            summary: RunSummary::default(),
        }
    }

    /// Commands arrive whenever `input` yields a line.
    pub fn online(core: SchedCore<S>, input: Box<dyn InputSource>, idle_poll: Millis) -> Self {
        Self {
            core,
            arrivals: Arrivals::Stream { input, idle_poll },
            summary: RunSummary::default(),
        }
    }

    pub fn run(&mut self, sink: &mut dyn ReportSink) -> Result<RunSummary, SchedError> {
        info!(
            "starting {} with {} queued processes",
            self.core.scheduler.name(),
            self.core.ctx.remaining()
        );

        while !self.all_jobs_completed() {
            self.handle_arrivals();

            if self.core.ctx.remaining() == 0 {
                if let Arrivals::Stream { idle_poll, .. } = self.arrivals {
                    self.core.sleep(idle_poll);
                }
                continue;
            }

            self.step(sink)?;
        }

        Ok(self.summary.clone())
    }

    pub fn step(&mut self, sink: &mut dyn ReportSink) -> Result<Step, SchedError> {
        let step = self.core.step(sink)?;
        match &step {
            Step::Completed(pid, report) => {
                self.summary.record(report);
                if matches!(self.arrivals, Arrivals::Stream { .. }) {
                    self.core.ctx.release(*pid);
                }
            }
            Step::Preempted(_) => self.summary.record_preemption(),
            Step::Idle => {}
        }
        Ok(step)
    }

    /// Admits every line the input has ready, without blocking.
    pub fn handle_arrivals(&mut self) -> usize {
        let Arrivals::Stream { input, .. } = &mut self.arrivals else {
            return 0;
        };

        let mut admitted = 0;
        while let Some(command) = input.try_read_line() {
            let now = self.core.now();
            debug!("t={now} arrival `{command}`");
            self.core.admit(command, now);
            admitted += 1;
        }
        admitted
    }

    pub fn all_jobs_completed(&self) -> bool {
        let exhausted = match &self.arrivals {
            Arrivals::Batch => true,
            Arrivals::Stream { input, .. } => input.is_exhausted(),
        };
        exhausted && self.core.ctx.remaining() == 0
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }
}
