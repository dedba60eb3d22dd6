use std::{fmt, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use procsched::{
    SchedConfig, Sim,
    config::{DEFAULT_BOOST_INTERVAL, DEFAULT_QUANTA, DEFAULT_QUANTUM},
    core::{Clock, ProcessControl, ReportSink, SchedCore, SchedCtx, WallClock},
    scheduler::{FcfsScheduler, MlfqScheduler, RoundRobinScheduler, Scheduler, SjfScheduler},
    sim::{
        ConsoleSink, CsvSink, FdInput, OsProcessControl, RunSummary,
        workload::{bernoulli_workload, read_workload},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// First come first served (offline)
    Fcfs,
    /// Round robin (offline)
    Rr,
    /// Multi-level feedback queue (offline)
    Mlfq,
    /// Shortest job first with learned bursts (online)
    Sjf,
    /// Multi-level feedback queue with predicted placement (online)
    OnlineMlfq,
}

impl Policy {
    fn is_online(self) -> bool {
        matches!(self, Self::Sjf | Self::OnlineMlfq)
    }

    fn default_idle_poll(self) -> u64 {
        match self {
            Self::OnlineMlfq => 1,
            _ => 10,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fcfs => "FCFS",
            Self::Rr => "RR",
            Self::Mlfq | Self::OnlineMlfq => "MLFQ",
            Self::Sjf => "SJF",
        };
        write!(f, "{name}")
    }
}

/// Runs shell commands under a CPU scheduling policy and reports
/// per-process waiting, turnaround, response and burst times.
#[derive(Parser, Debug)]
#[command(name = "procsched", version, about, long_about = None)]
struct Args {
    /// Scheduling policy
    #[arg(short, long, value_enum)]
    policy: Policy,

    /// Round-robin quantum in ms
    #[arg(short, long, env = "PROCSCHED_QUANTUM", default_value_t = DEFAULT_QUANTUM)]
    quantum: u64,

    /// Feedback queue quanta in ms, top level first
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_QUANTA)]
    quanta: Vec<u64>,

    /// Priority boost interval in ms
    #[arg(short, long, env = "PROCSCHED_BOOST", default_value_t = DEFAULT_BOOST_INTERVAL)]
    boost: u64,

    /// Sleep between input polls while idle, in ms (online policies)
    #[arg(long)]
    idle_poll: Option<u64>,

    /// Offline workload file, one command per line (`-` for stdin)
    #[arg(short, long, default_value = "-", conflicts_with = "synthetic")]
    workload: PathBuf,

    /// Generate an offline workload of N sleep commands instead
    #[arg(long, value_name = "N")]
    synthetic: Option<usize>,

    /// Seed for the synthetic workload
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// CSV report path [default: result_<offline|online>_<POLICY>.csv]
    #[arg(long, conflicts_with = "no_csv")]
    csv: Option<PathBuf>,

    /// Do not write a CSV report
    #[arg(long)]
    no_csv: bool,

    /// Do not print context switches
    #[arg(long)]
    quiet: bool,
}

impl Args {
    fn config(&self) -> Result<SchedConfig> {
        let config = SchedConfig::default()
            .with_quantum(self.quantum)
            .with_quanta(&self.quanta)?
            .with_boost_interval(self.boost)
            .with_idle_poll(
                self.idle_poll
                    .unwrap_or_else(|| self.policy.default_idle_poll()),
            );
        config.validate()?;
        Ok(config)
    }

    fn csv_path(&self) -> Option<PathBuf> {
        if self.no_csv {
            return None;
        }
        let mode = if self.policy.is_online() { "online" } else { "offline" };
        Some(
            self.csv
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("result_{mode}_{}.csv", self.policy))),
        )
    }

    fn offline_workload(&self) -> Result<Vec<String>> {
        match self.synthetic {
            Some(count) => Ok(bernoulli_workload(count, 0.3, 50, 300, self.seed)),
            None => read_workload(&self.workload)
                .with_context(|| format!("loading workload for {}", self.policy)),
        }
    }
}

fn platform() -> (Box<dyn ProcessControl>, Box<dyn Clock>) {
    (Box::new(OsProcessControl::new()), Box::new(WallClock::new()))
}

fn run_offline<S: Scheduler>(
    core: SchedCore<S>,
    commands: Vec<String>,
    sink: &mut dyn ReportSink,
) -> Result<RunSummary> {
    Sim::offline(core, commands)
        .run(sink)
        .context("scheduling run aborted")
}

fn run_online<S: Scheduler>(
    core: SchedCore<S>,
    config: &SchedConfig,
    sink: &mut dyn ReportSink,
) -> Result<RunSummary> {
    Sim::online(core, Box::new(FdInput::stdin()), config.idle_poll)
        .run(sink)
        .context("scheduling run aborted")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.config().context("invalid scheduler configuration")?;

    let csv = args
        .csv_path()
        .map(|path| {
            CsvSink::create(&path).with_context(|| format!("creating report {}", path.display()))
        })
        .transpose()?;
    let console = (!args.quiet).then(ConsoleSink::stdout);
    let mut sink = (console, csv);

    let commands = if args.policy.is_online() {
        Vec::new()
    } else {
        args.offline_workload()?
    };

    let (control, clock) = platform();
    let summary = match args.policy {
        Policy::Fcfs => run_offline(
            SchedCore::<FcfsScheduler>::new(&config, control, clock),
            commands,
            &mut sink,
        )?,
        Policy::Rr => run_offline(
            SchedCore::<RoundRobinScheduler>::new(&config, control, clock),
            commands,
            &mut sink,
        )?,
        Policy::Mlfq => run_offline(
            SchedCore::<MlfqScheduler>::new(&config, control, clock),
            commands,
            &mut sink,
        )?,
        Policy::Sjf => run_online(
            SchedCore::<SjfScheduler>::new(&config, control, clock),
            &config,
            &mut sink,
        )?,
        Policy::OnlineMlfq => run_online(
            SchedCore::with_scheduler(
                SchedCtx::new(),
                MlfqScheduler::online(&config),
                control,
                clock,
            ),
            &config,
            &mut sink,
        )?,
    };

    info!("{} run complete", args.policy);
    for line in summary.to_string().lines() {
        info!("{line}");
    }
    Ok(())
}
