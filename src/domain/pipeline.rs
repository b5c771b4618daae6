// Page load state machine
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Parsing,
    LibraryLoading,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetching => "fetching",
            Stage::Parsing => "parsing",
            Stage::LibraryLoading => "library loading",
        };
        f.write_str(name)
    }
}

/// `Idle -> Fetching -> Parsing -> LibraryLoading -> Rendered`, with
/// `Failed` as the only other terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Fetching,
    Parsing,
    LibraryLoading,
    Rendered,
    Failed { stage: Stage, reason: String },
}

impl PipelineState {
    fn rank(&self) -> u8 {
        match self {
            PipelineState::Idle => 0,
            PipelineState::Fetching => 1,
            PipelineState::Parsing => 2,
            PipelineState::LibraryLoading => 3,
            PipelineState::Rendered | PipelineState::Failed { .. } => 4,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Rendered | PipelineState::Failed { .. })
    }

    /// Only single forward steps are legal. A running stage may fail instead.
    pub fn can_advance_to(&self, next: &PipelineState) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            PipelineState::Failed { stage, .. } => self.stage() == Some(*stage),
            _ => next.rank() == self.rank() + 1,
        }
    }

    /// The stage that is currently running, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineState::Fetching => Some(Stage::Fetching),
            PipelineState::Parsing => Some(Stage::Parsing),
            PipelineState::LibraryLoading => Some(Stage::LibraryLoading),
            _ => None,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Idle => f.write_str("idle"),
            PipelineState::Fetching => f.write_str("fetching"),
            PipelineState::Parsing => f.write_str("parsing"),
            PipelineState::LibraryLoading => f.write_str("library loading"),
            PipelineState::Rendered => f.write_str("rendered"),
            PipelineState::Failed { stage, reason } => {
                write!(f, "failed while {}: {}", stage, reason)
            }
        }
    }
}
