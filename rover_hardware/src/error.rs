use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("radio link closed")]
    LinkClosed,
    #[error("radio queue full ({0} packets)")]
    QueueFull(usize),
    #[error("motor fault: {0}")]
    Motor(String),
    #[error("model input has {actual} values, expected {expected}")]
    ModelInput { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, HwError>;
