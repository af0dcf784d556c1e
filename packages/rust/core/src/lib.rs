//! Pipeline orchestration for the land-bank address pipeline.

pub mod pipeline;

pub use pipeline::{
    AgendaTextSource, PdfAgendaSource, ProgressReporter, RunConfig, RunOutcome, RunSummary,
    SilentProgress, run_pipeline,
};
