use batchsim_core::error::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A run or a batch is already advancing this session.
    #[error("A run is already in progress")]
    AlreadyRunning,
}
