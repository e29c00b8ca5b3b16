//! Error types for model construction
//!
//! Navigation never fails: out-of-range requests degrade to no-ops. Only
//! building a model from an invalid setup produces an error.

/// Invalid surface setup
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("The {0} window needs a page size of at least 1")]
    EmptyPage(&'static str),

    #[error("{pages} parameter page(s) configured but no parameters per page")]
    PagesWithoutParameters { pages: usize },

    #[error("Follow-up delay '{name}' is {millis} ms, above the {max} ms limit")]
    DelayTooLong {
        name: &'static str,
        millis: u64,
        max: u64,
    },
}
