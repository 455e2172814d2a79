pub mod job_registry;
pub mod orchestrator;

pub use job_registry::JobRegistry;
pub use orchestrator::AnalysisOrchestrator;
