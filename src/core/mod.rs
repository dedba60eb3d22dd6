pub mod clock;
pub mod control;
pub mod driver;
pub mod estimate;
pub mod event;
pub mod observer;
pub mod process;
pub mod queue;
pub mod state;

pub use clock::{Clock, WallClock};
pub use control::{ExitStatus, ProcessControl};
pub use driver::{SchedCore, Step};
pub use estimate::{BurstEstimates, DEFAULT_EXPECTED_BURST};
pub use event::{ReportSink, SchedEvent};
pub use process::{Handle, Millis, Process, ProcessReport, ProcessState};
pub use queue::{BOTTOM_LEVEL, FeedbackQueues, Level, NUM_LEVELS, ReadyQueue, TOP_LEVEL};
pub use state::{ProcessId, SchedCtx};
