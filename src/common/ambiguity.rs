//! Functionality for handling ambiguous local times.
use crate::common::scalar::Offset;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Ambiguity {
    Unambiguous(Offset),
    Gap(Offset, Offset),  // (earlier, later) occurrence, (a > b)
    Fold(Offset, Offset), // (earlier, later) occurrence, (a > b)
}

impl Ambiguity {
    /// Resolve to a single offset: inside a gap or fold,
    /// the offset that applies *after* the transition is used.
    pub(crate) fn after_transition(self) -> Offset {
        match self {
            Ambiguity::Unambiguous(offset) => offset,
            // A gap moves the clock forward: the earlier (larger) offset is the new one
            Ambiguity::Gap(new, _) => new,
            // A fold moves the clock back: the later (smaller) offset is the new one
            Ambiguity::Fold(_, new) => new,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_after_transition() {
        let a = Offset::new(7_200_000).unwrap();
        let b = Offset::new(3_600_000).unwrap();
        assert_eq!(Ambiguity::Unambiguous(b).after_transition(), b);
        assert_eq!(Ambiguity::Gap(a, b).after_transition(), a);
        assert_eq!(Ambiguity::Fold(a, b).after_transition(), b);
    }
}
