pub mod driver;
pub mod input;
pub mod os;
pub mod report;
pub mod summary;
pub mod workload;

pub use driver::Sim;
pub use input::{FdInput, InputSource, LineQueue};
pub use os::OsProcessControl;
pub use report::{ConsoleSink, CsvSink};
pub use summary::RunSummary;
