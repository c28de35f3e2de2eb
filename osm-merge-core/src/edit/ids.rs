//! Negative id allocation for created elements.

use crate::ElementId;

/// Hands out fresh negative ids.
#[derive(Debug)]
pub(super) struct IdAllocator {
    next: ElementId,
}

impl IdAllocator {
    pub(super) const fn new() -> Self {
        Self { next: -1 }
    }

    pub(super) fn allocate(&mut self) -> ElementId {
        let id = self.next;
        self.next -= 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn ids_count_down_from_minus_one() {
        let mut ids = IdAllocator::new();
        let allocated: Vec<_> = (0..3).map(|_| ids.allocate()).collect();
        assert_eq!(allocated, vec![-1, -2, -3]);
    }
}
