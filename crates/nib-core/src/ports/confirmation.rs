//! Operator confirmation port

/// Asks the operator a yes/no question before a destructive or bulk phase
pub trait IConfirmation: Send + Sync {
    /// Show `prompt` together with the number of affected items and wait for
    /// an answer.
    ///
    /// Returns `true` only for an affirmative answer. Read failures and end of
    /// input count as a refusal.
    fn confirm(&self, prompt: &str, count: usize) -> bool;
}

/// Answers every question the same way
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl IConfirmation for FixedAnswer {
    fn confirm(&self, _prompt: &str, _count: usize) -> bool {
        self.0
    }
}
