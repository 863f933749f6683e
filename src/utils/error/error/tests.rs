//! Tests for error handling

#[cfg(test)]
mod tests {
    use super::super::types::PipelineError;

    #[test]
    fn test_error_creation() {
        let error = PipelineError::not_found("run 7");
        assert!(matches!(error, PipelineError::NotFound(msg) if msg == "run 7"));

        let error = PipelineError::processor_not_found("klingon");
        assert!(matches!(error, PipelineError::ProcessorNotFound(name) if name == "klingon"));
    }

    #[test]
    fn test_error_display() {
        let error = PipelineError::conflict("span changed");
        assert_eq!(error.to_string(), "Conflict: span changed");

        let error = PipelineError::vcs("git add failed");
        assert_eq!(error.to_string(), "VCS error: git add failed");
    }

    #[test]
    fn test_transient_classification() {
        assert!(PipelineError::queue("connection reset").is_transient());
        assert!(PipelineError::vcs("index.lock exists").is_transient());
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "slow disk");
        assert!(PipelineError::from(io).is_transient());

        assert!(!PipelineError::config("bad yaml").is_transient());
        assert!(!PipelineError::processor_not_found("nope").is_transient());
        assert!(!PipelineError::validation("blank replacement").is_transient());
        assert!(!PipelineError::processor("model refused").is_transient());
    }

    #[test]
    fn test_from_serde_json() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: PipelineError = err.into();
        assert!(matches!(error, PipelineError::Serialization(_)));
    }
}
