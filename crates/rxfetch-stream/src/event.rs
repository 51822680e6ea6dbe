/// A single notification delivered to an observer.
///
/// `Error` and `Completed` are terminal: an observer sees at most one of them
/// and nothing after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<T, E> {
    /// A produced value.
    Next(T),
    /// The source failed.
    Error(E),
    /// The source finished normally.
    Completed,
}

impl<T, E> Event<T, E> {
    /// Returns `true` for `Error` and `Completed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Event::Next(_))
    }

    /// Returns the carried value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Event::Next(value) => Some(value),
            Event::Error(_) | Event::Completed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_classification() {
        assert!(!Event::<u8, ()>::Next(1).is_terminal());
        assert!(Event::<u8, ()>::Error(()).is_terminal());
        assert!(Event::<u8, ()>::Completed.is_terminal());
    }

    #[test]
    fn test_into_value() {
        assert_eq!(Event::<u8, ()>::Next(7).into_value(), Some(7));
        assert_eq!(Event::<u8, ()>::Completed.into_value(), None);
    }
}
