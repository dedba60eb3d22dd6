#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
    io,
    rc::Rc,
};

use nix::errno::Errno;
use procsched::{
    core::{Clock, ExitStatus, Handle, Millis, ProcessControl, SchedEvent},
    error::ControlError,
    sim::InputSource,
};

/// Virtual time shared by the clock, the scripted processes and the input.
pub type SharedTime = Rc<Cell<Millis>>;

pub struct VirtualClock {
    time: SharedTime,
}

impl Clock for VirtualClock {
    fn now(&self) -> Millis {
        self.time.get()
    }

    fn sleep(&mut self, duration: Millis) {
        self.time.set(self.time.get() + duration);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Job {
    pub run_ms: Millis,
    pub ok: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Spawn(String),
    Suspend(Handle),
    Resume(Handle),
}

#[derive(Debug)]
struct FakeProcess {
    job: Job,
    consumed: Millis,
    running_since: Option<Millis>,
}

impl FakeProcess {
    fn progress(&self, now: Millis) -> Millis {
        self.consumed + self.running_since.map_or(0, |since| now - since)
    }

    fn exit(&self) -> ExitStatus {
        if self.job.ok {
            ExitStatus::ExitedOk
        } else {
            ExitStatus::ExitedError
        }
    }
}

/// Processes whose CPU demand is known up front. Commands without a job
/// fail to spawn.
pub struct ScriptedControl {
    time: SharedTime,
    jobs: HashMap<String, Job>,
    processes: Vec<FakeProcess>,
    pub calls: Rc<RefCell<Vec<Call>>>,
    pub fail_signals: bool,
    pub fail_poll: bool,
}

impl ScriptedControl {
    fn process(&mut self, handle: Handle) -> &mut FakeProcess {
        &mut self.processes[handle.0 as usize - 100]
    }

    fn signal_error(&self, action: &'static str, handle: Handle) -> Result<(), ControlError> {
        if self.fail_signals {
            Err(ControlError::Signal {
                action,
                handle,
                source: Errno::EPERM,
            })
        } else {
            Ok(())
        }
    }
}

impl ProcessControl for ScriptedControl {
    fn spawn(&mut self, command: &str) -> Result<Handle, ControlError> {
        self.calls.borrow_mut().push(Call::Spawn(command.to_owned()));
        let Some(&job) = self.jobs.get(command) else {
            return Err(ControlError::Spawn {
                command: command.to_owned(),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        };
        self.processes.push(FakeProcess {
            job,
            consumed: 0,
            running_since: Some(self.time.get()),
        });
        Ok(Handle(self.processes.len() as i32 + 99))
    }

    fn suspend(&mut self, handle: Handle) -> Result<(), ControlError> {
        self.calls.borrow_mut().push(Call::Suspend(handle));
        let now = self.time.get();
        let process = self.process(handle);
        if let Some(since) = process.running_since.take() {
            process.consumed += now - since;
        }
        self.signal_error("suspend", handle)
    }

    fn resume(&mut self, handle: Handle) -> Result<(), ControlError> {
        self.calls.borrow_mut().push(Call::Resume(handle));
        let now = self.time.get();
        self.process(handle).running_since = Some(now);
        self.signal_error("resume", handle)
    }

    fn poll(&mut self, handle: Handle) -> Result<ExitStatus, ControlError> {
        if self.fail_poll {
            return Err(ControlError::Wait {
                handle,
                source: Errno::ECHILD,
            });
        }
        let now = self.time.get();
        let process = self.process(handle);
        if process.progress(now) >= process.job.run_ms {
            Ok(process.exit())
        } else {
            Ok(ExitStatus::Running)
        }
    }

    fn wait(&mut self, handle: Handle) -> Result<ExitStatus, ControlError> {
        let now = self.time.get();
        let process = self.process(handle);
        let left = process.job.run_ms.saturating_sub(process.progress(now));
        let exit = process.exit();
        self.time.set(now + left);
        Ok(exit)
    }
}

/// Lines that become readable at fixed virtual times.
pub struct ScriptedInput {
    time: SharedTime,
    arrivals: VecDeque<(Millis, String)>,
}

impl InputSource for ScriptedInput {
    fn try_read_line(&mut self) -> Option<String> {
        let (at, _) = self.arrivals.front()?;
        if *at <= self.time.get() {
            self.arrivals.pop_front().map(|(_, line)| line)
        } else {
            None
        }
    }

    fn is_exhausted(&self) -> bool {
        self.arrivals.is_empty()
    }
}

pub struct Harness {
    pub time: SharedTime,
    pub calls: Rc<RefCell<Vec<Call>>>,
    pub control: ScriptedControl,
    pub clock: VirtualClock,
}

pub fn harness(jobs: &[(&str, Millis, bool)]) -> Harness {
    let time = SharedTime::default();
    let calls = Rc::new(RefCell::new(Vec::new()));
    let control = ScriptedControl {
        time: time.clone(),
        jobs: jobs
            .iter()
            .map(|&(command, run_ms, ok)| (command.to_owned(), Job { run_ms, ok }))
            .collect(),
        processes: Vec::new(),
        calls: calls.clone(),
        fail_signals: false,
        fail_poll: false,
    };
    let clock = VirtualClock { time: time.clone() };
    Harness {
        time,
        calls,
        control,
        clock,
    }
}

pub fn scripted_input(time: &SharedTime, arrivals: &[(Millis, &str)]) -> Box<dyn InputSource> {
    Box::new(ScriptedInput {
        time: time.clone(),
        arrivals: arrivals
            .iter()
            .map(|&(at, line)| (at, line.to_owned()))
            .collect(),
    })
}

/// `(command, start, end)` of every context switch, in emission order.
pub fn switches(events: &[SchedEvent]) -> Vec<(String, Millis, Millis)> {
    events
        .iter()
        .filter_map(|event| match event {
            SchedEvent::ContextSwitch { command, start, end } => {
                Some((command.clone(), *start, *end))
            }
            SchedEvent::Completed(_) => None,
        })
        .collect()
}

pub fn completions(events: &[SchedEvent]) -> Vec<procsched::core::ProcessReport> {
    events
        .iter()
        .filter_map(|event| match event {
            SchedEvent::Completed(report) => Some(report.clone()),
            SchedEvent::ContextSwitch { .. } => None,
        })
        .collect()
}

/// Burst time of each completion equals the sum of its run intervals.
/// Commands must be unique within the run.
pub fn assert_bursts_match_intervals(events: &[SchedEvent]) {
    for report in completions(events) {
        let ran: Millis = switches(events)
            .iter()
            .filter(|(command, ..)| *command == report.command)
            .map(|(_, start, end)| end - start)
            .sum();
        assert_eq!(report.burst_time, ran, "burst of `{}`", report.command);
    }
}

pub fn assert_metrics_consistent(events: &[SchedEvent]) {
    for report in completions(events) {
        assert_eq!(report.response_time, report.start_time - report.arrival_time);
        if report.finished {
            let turnaround = report.turnaround_time.unwrap();
            assert_eq!(turnaround, report.waiting_time.unwrap() + report.burst_time);
            assert_eq!(turnaround, report.completion_time - report.arrival_time);
            assert!(turnaround >= report.burst_time);
        }
    }
}
