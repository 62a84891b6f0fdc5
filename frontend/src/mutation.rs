use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationState<V> {
    Idle,
    /// Shown optimistically until the server answers.
    Pending { optimistic: V },
    Committed,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("a mutation is already pending")]
    AlreadyPending,
    #[error("no mutation is pending")]
    NotPending,
}

/// A value edited optimistically: the view shows the submitted value right
/// away, and either keeps it once the server confirms or falls back to the
/// last confirmed value when it refuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation<V> {
    confirmed: V,
    state: MutationState<V>,
}

impl<V: Clone> Mutation<V> {
    pub fn new(confirmed: V) -> Self {
        Mutation {
            confirmed,
            state: MutationState::Idle,
        }
    }

    pub fn state(&self) -> &MutationState<V> {
        &self.state
    }

    pub fn confirmed(&self) -> &V {
        &self.confirmed
    }

    /// The value to render right now.
    pub fn displayed(&self) -> &V {
        match &self.state {
            MutationState::Pending { optimistic } => optimistic,
            _ => &self.confirmed,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, MutationState::Pending { .. })
    }

    pub fn submit(&mut self, value: V) -> Result<(), TransitionError> {
        if self.is_pending() {
            return Err(TransitionError::AlreadyPending);
        }
        self.state = MutationState::Pending { optimistic: value };
        Ok(())
    }

    /// The server accepted the pending value.
    pub fn confirm(&mut self) -> Result<&V, TransitionError> {
        match std::mem::replace(&mut self.state, MutationState::Committed) {
            MutationState::Pending { optimistic } => {
                self.confirmed = optimistic;
                Ok(&self.confirmed)
            }
            previous => {
                self.state = previous;
                Err(TransitionError::NotPending)
            }
        }
    }

    /// The server refused. The confirmed value is displayed again.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), TransitionError> {
        if !self.is_pending() {
            return Err(TransitionError::NotPending);
        }
        let reason = reason.into();
        debug!("mutation failed: {}", reason);
        self.state = MutationState::Failed(reason);
        Ok(())
    }

    /// Clears a settled outcome. A pending mutation cannot be reset.
    pub fn reset(&mut self) -> Result<(), TransitionError> {
        if self.is_pending() {
            return Err(TransitionError::AlreadyPending);
        }
        self.state = MutationState::Idle;
        Ok(())
    }

    /// Replaces the confirmed value with fresher server data, unless a
    /// mutation is out.
    pub fn sync(&mut self, confirmed: V) -> Result<(), TransitionError> {
        if self.is_pending() {
            return Err(TransitionError::AlreadyPending);
        }
        self.confirmed = confirmed;
        Ok(())
    }
}
