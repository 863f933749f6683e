//! Helper functions for creating specific error types

use super::types::PipelineError;

/// Helper functions for creating specific errors
#[allow(dead_code)]
impl PipelineError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn processor_not_found<S: Into<String>>(name: S) -> Self {
        Self::ProcessorNotFound(name.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict(message.into())
    }

    pub fn vcs<S: Into<String>>(message: S) -> Self {
        Self::Vcs(message.into())
    }

    pub fn queue<S: Into<String>>(message: S) -> Self {
        Self::Queue(message.into())
    }

    pub fn processor<S: Into<String>>(message: S) -> Self {
        Self::Processor(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}
