pub mod analytics;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod job;
pub mod policy;
pub mod queue;
pub mod server;
pub mod traits;

pub use analytics::{FarmReport, WaitingTimes};
pub use config::{ExperimentConfig, FarmConfig, WorkloadConfig};
pub use engine::Dispatcher;
pub use error::{FarmError, Result};
pub use generator::{JobStream, TIME_QUANTUM};
pub use job::{Job, JobId};
pub use policy::{DispatchPolicy, Selector};
pub use queue::QueueDiscipline;
pub use server::Server;
pub use traits::{FarmInspector, ServerLoad};
