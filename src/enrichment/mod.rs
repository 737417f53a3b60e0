// Optional code-host enrichment. Everything here is best-effort: a missing
// credential or a failed lookup degrades to the basic MR reference and
// never aborts the run.

pub mod gitlab_api;
pub mod merge_requests;
