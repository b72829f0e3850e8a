/// Run state definitions for tracking crawl progress
///
/// A crawl moves `NotStarted -> Running -> {Completed, TimedOut}`.
use std::fmt;

/// Represents the lifecycle state of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Run has been created but no URL has been processed
    NotStarted,

    /// URLs are being fetched
    Running,

    /// Every URL in the list was processed
    Completed,

    /// The wall-clock budget elapsed; the remaining URLs were abandoned
    TimedOut,
}

impl RunState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::TimedOut)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::TimedOut)
        )
    }

    /// Converts the run state to the string used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!RunState::NotStarted.is_terminal());
        assert!(!RunState::Running.is_terminal());
        assert!(RunState::Completed.is_terminal());
        assert!(RunState::TimedOut.is_terminal());
    }

    #[test]
    fn test_legal_transitions() {
        assert!(RunState::NotStarted.can_transition_to(RunState::Running));
        assert!(RunState::Running.can_transition_to(RunState::Completed));
        assert!(RunState::Running.can_transition_to(RunState::TimedOut));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!RunState::NotStarted.can_transition_to(RunState::Completed));
        assert!(!RunState::NotStarted.can_transition_to(RunState::TimedOut));
        assert!(!RunState::Completed.can_transition_to(RunState::Running));
        assert!(!RunState::TimedOut.can_transition_to(RunState::Completed));
        assert!(!RunState::Running.can_transition_to(RunState::Running));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", RunState::Completed), "completed");
        assert_eq!(format!("{}", RunState::TimedOut), "timed_out");
    }
}
