#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation<T> {
    Idle,
    Pending(T),
}

impl<T> Default for Confirmation<T> {
    fn default() -> Self {
        Confirmation::Idle
    }
}

impl<T> Confirmation<T> {
    /// Arms the gate. A second request replaces the earlier target.
    pub fn request(&mut self, target: T) {
        *self = Confirmation::Pending(target);
    }

    /// Returns the pending target, if any, and goes back to idle.
    pub fn confirm(&mut self) -> Option<T> {
        match std::mem::replace(self, Confirmation::Idle) {
            Confirmation::Pending(target) => Some(target),
            Confirmation::Idle => None,
        }
    }

    pub fn cancel(&mut self) {
        *self = Confirmation::Idle;
    }

    pub fn pending(&self) -> Option<&T> {
        match self {
            Confirmation::Pending(target) => Some(target),
            Confirmation::Idle => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Confirmation::Pending(_))
    }
}
