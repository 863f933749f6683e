//! Status enums and their string forms

use crate::utils::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Storage representation
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = PipelineError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(PipelineError::Validation(format!(
                        "unknown {} value: {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

string_enum!(
    /// Processing state of a lexeme
    LexemeStatus {
        Pending => "pending",
        Processing => "processing",
        Succeeded => "succeeded",
        Failed => "failed",
    }
);

string_enum!(
    /// Lifecycle of a process run. `Done` and `Failed` are absorbing.
    RunStatus {
        Pending => "pending",
        Running => "running",
        Done => "done",
        Failed => "failed",
    }
);

string_enum!(
    /// Human review state of an occurrence
    ReviewStatus {
        Pending => "pending",
        Reviewed => "reviewed",
        Approved => "approved",
        Rejected => "rejected",
    }
);

string_enum!(
    /// Outcome of writing a review's replacement into its file
    ApplyStatus {
        NotApplied => "not_applied",
        Applied => "applied",
        Failed => "failed",
        Conflict => "conflict",
    }
);

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Done | RunStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_str() {
        for status in [
            LexemeStatus::Pending,
            LexemeStatus::Processing,
            LexemeStatus::Succeeded,
            LexemeStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<LexemeStatus>().unwrap(), status);
        }
        assert_eq!("not_applied".parse::<ApplyStatus>().unwrap(), ApplyStatus::NotApplied);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = "archived".parse::<RunStatus>().unwrap_err();
        assert!(err.to_string().contains("RunStatus"));
    }

    #[test]
    fn test_terminal_run_statuses() {
        assert!(!RunStatus::Pending.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Done.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&ApplyStatus::NotApplied).unwrap();
        assert_eq!(json, "\"not_applied\"");
    }
}
