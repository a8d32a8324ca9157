//! Pipeline components: queues and cancel token, feeder, worker pool, collector, coordinator.

pub mod collector;
pub mod context;
pub mod error_handler;
pub mod feeder;
pub mod orchestrator;
pub mod worker;

pub use collector::{ProgressCallback, collect_results};
pub use context::{CancelToken, PipelineChannels, create_pipeline_channels};
pub use error_handler::{list_lookup_failures, report_lookup_failures};
pub use feeder::{run_feed_loop, spawn_feeder_thread};
pub use orchestrator::{Pipeline, PipelineState};
pub use worker::{WorkerContext, WorkerReport, process_item, spawn_workers, worker_loop};
