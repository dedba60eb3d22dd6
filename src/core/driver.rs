use log::{debug, error, warn};

use super::{
    clock::Clock,
    control::{ExitStatus, ProcessControl},
    event::{ReportSink, SchedEvent},
    observer::Observer,
    process::{Handle, Millis, ProcessReport, ProcessState},
    state::{ProcessId, SchedCtx},
};
use crate::{
    config::SchedConfig,
    error::SchedError,
    scheduler::{Dispatch, Scheduler, Slice},
};

/// Result of one driver step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Nothing was runnable.
    Idle,
    Preempted(ProcessId),
    Completed(ProcessId, ProcessReport),
}

/// Drives one scheduling policy against real (or scripted) processes on a
/// single logical CPU.
pub struct SchedCore<S: Scheduler> {
    pub ctx: SchedCtx,
    pub scheduler: S,
    control: Box<dyn ProcessControl>,
    clock: Box<dyn Clock>,
    observer: Observer,
}

impl<S: Scheduler> SchedCore<S> {
    pub fn new(
        config: &SchedConfig,
        control: Box<dyn ProcessControl>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let mut ctx = SchedCtx::new();
        let scheduler = S::init(&mut ctx, config);
        Self::with_scheduler(ctx, scheduler, control, clock)
    }

    pub fn with_scheduler(
        ctx: SchedCtx,
        scheduler: S,
        control: Box<dyn ProcessControl>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            ctx,
            scheduler,
            control,
            clock,
            observer: Observer::new(),
        }
    }

    pub fn now(&self) -> Millis {
        self.clock.now()
    }

    pub fn sleep(&mut self, duration: Millis) {
        self.clock.sleep(duration);
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    /// Adds a process to the session and hands it to the policy.
    pub fn admit(&mut self, command: impl Into<String>, arrival_time: Millis) -> ProcessId {
        let pid = self.ctx.admit(command, arrival_time);
        self.scheduler.enqueue(&mut self.ctx, pid);
        pid
    }

    pub fn step(&mut self, sink: &mut dyn ReportSink) -> Result<Step, SchedError> {
        let step = match self.scheduler.dispatch(&mut self.ctx) {
            Some(Dispatch { pid, slice }) => {
                let exit = match slice {
                    Slice::Quantum(quantum) => self.run_slice(pid, quantum, sink)?,
                    Slice::ToCompletion => self.run_to_completion(pid, sink)?,
                };

                if exit.has_exited() {
                    self.scheduler.completed(&mut self.ctx, pid, exit);
                    Step::Completed(pid, self.ctx.process(pid).report())
                } else {
                    self.scheduler.preempted(&mut self.ctx, pid);
                    Step::Preempted(pid)
                }
            }
            None => Step::Idle,
        };

        let now = self.clock.now();
        self.scheduler.tick(&mut self.ctx, now);
        self.observer.observe(&self.ctx);
        Ok(step)
    }

    /// Runs `pid` for at most `quantum` ms, then pauses it unless it exited.
    fn run_slice(
        &mut self,
        pid: ProcessId,
        quantum: Millis,
        sink: &mut dyn ReportSink,
    ) -> Result<ExitStatus, SchedError> {
        let Some(handle) = self.start_or_resume(pid, sink) else {
            return Ok(ExitStatus::ExitedError);
        };

        self.clock.sleep(quantum);

        let status = self
            .control
            .poll(handle)
            .map_err(|source| SchedError::Poll {
                command: self.ctx.command(pid).to_owned(),
                source,
            })?;

        match status {
            ExitStatus::Running => {
                self.pause(pid, handle, sink);
                Ok(ExitStatus::Running)
            }
            exit => {
                self.finish(pid, exit, sink);
                Ok(exit)
            }
        }
    }

    fn run_to_completion(
        &mut self,
        pid: ProcessId,
        sink: &mut dyn ReportSink,
    ) -> Result<ExitStatus, SchedError> {
        let Some(handle) = self.start_or_resume(pid, sink) else {
            return Ok(ExitStatus::ExitedError);
        };

        let exit = self
            .control
            .wait(handle)
            .map_err(|source| SchedError::Wait {
                command: self.ctx.command(pid).to_owned(),
                source,
            })?;
        debug_assert!(exit.has_exited(), "wait() returned a running process");

        self.finish(pid, exit, sink);
        Ok(exit)
    }

    /// Launches a fresh process or continues a paused one. Returns `None` if
    /// it could not be spawned, in which case it has already been completed
    /// as errored.
    fn start_or_resume(&mut self, pid: ProcessId, sink: &mut dyn ReportSink) -> Option<Handle> {
        let process = self.ctx.process(pid);
        match (process.state(), process.handle()) {
            (ProcessState::Ready, Some(handle)) => {
                if let Err(err) = self.control.resume(handle) {
                    warn!("{err}; continuing as if `{}` resumed", process.command());
                }
                let now = self.clock.now();
                self.ctx.resume(pid, now);
                debug!("t={now} resume `{}` ({handle})", self.ctx.command(pid));
                Some(handle)
            }
            _ => {
                let spawned = self.control.spawn(process.command());
                let now = self.clock.now();
                match spawned {
                    Ok(handle) => {
                        self.ctx.dispatch(pid, Some(handle), now);
                        debug!("t={now} dispatch `{}` ({handle})", self.ctx.command(pid));
                        Some(handle)
                    }
                    Err(err) => {
                        error!("{err}");
                        self.ctx.dispatch(pid, None, now);
                        self.finish(pid, ExitStatus::ExitedError, sink);
                        None
                    }
                }
            }
        }
    }

    fn pause(&mut self, pid: ProcessId, handle: Handle, sink: &mut dyn ReportSink) {
        if let Err(err) = self.control.suspend(handle) {
            warn!("{err}; continuing as if `{}` stopped", self.ctx.command(pid));
        }
        let now = self.clock.now();
        self.ctx.pause(pid, now);
        debug!("t={now} pause `{}` ({handle})", self.ctx.command(pid));
        self.emit_switch(pid, sink);
    }

    /// Shared completion path of every policy.
    fn finish(&mut self, pid: ProcessId, exit: ExitStatus, sink: &mut dyn ReportSink) {
        let now = self.clock.now();
        let ok = exit == ExitStatus::ExitedOk;
        self.ctx.complete(pid, now, ok);
        if !ok {
            warn!("t={now} `{}` exited with an error", self.ctx.command(pid));
        }

        self.emit_switch(pid, sink);
        sink.record(&SchedEvent::Completed(self.ctx.process(pid).report()));
    }

    fn emit_switch(&self, pid: ProcessId, sink: &mut dyn ReportSink) {
        let process = self.ctx.process(pid);
        sink.record(&SchedEvent::ContextSwitch {
            command: process.command().to_owned(),
            start: process.context_start_time(),
            end: process.context_end_time(),
        });
    }
}
