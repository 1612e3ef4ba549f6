//! Application services for notebook reservation and evaluation.

mod requests;
mod review;

pub use requests::{EvaluateNotebookRequest, ImportNotebookRequest};
pub use review::{NotebookReviewError, NotebookReviewResult, NotebookReviewService};
