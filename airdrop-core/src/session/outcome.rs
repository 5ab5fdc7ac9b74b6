use crate::model::AirdropStatus;
use std::fmt;

/// Result of a mutating session command that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The command had nothing to do or was blocked by a busy flag.
    /// No state was changed.
    Ignored(IgnoreReason),
    /// Interrupted by `cancel` or `disconnect_all` during a simulated wait.
    Cancelled,
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Outcome::Ignored(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NoWallets,
    ScanInProgress,
    BatchInProgress,
    TransferInProgress,
    NothingToProcess,
    NotFound,
    WrongStatus {
        expected: AirdropStatus,
        actual: AirdropStatus,
    },
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::NoWallets => write!(f, "no wallets connected"),
            IgnoreReason::ScanInProgress => write!(f, "scan already in progress"),
            IgnoreReason::BatchInProgress => write!(f, "batch already in progress"),
            IgnoreReason::TransferInProgress => write!(f, "transfer already in progress"),
            IgnoreReason::NothingToProcess => write!(f, "no eligible airdrops"),
            IgnoreReason::NotFound => write!(f, "airdrop not found"),
            IgnoreReason::WrongStatus { expected, actual } => {
                write!(f, "expected {} but airdrop is {}", expected, actual)
            }
        }
    }
}
