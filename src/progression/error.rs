/// Errors reported by the progression engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressionError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Duplicate achievement id in catalog: {0}")]
    DuplicateAchievement(String),
}
