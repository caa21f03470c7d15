//! Per-question status tracking for the navigation sidebar.
//!
//! The tracker is a pure transition table. Callers pass the answered and
//! marked bits explicitly so the two never collapse into one flag.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::QuestionId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionStatus {
    NotVisited,
    NotAnswered,
    Answered,
    MarkedForReview,
    AnsweredAndMarked,
}

impl QuestionStatus {
    #[must_use]
    pub fn is_answered(self) -> bool {
        matches!(self, Self::Answered | Self::AnsweredAndMarked)
    }

    #[must_use]
    pub fn is_marked(self) -> bool {
        matches!(self, Self::MarkedForReview | Self::AnsweredAndMarked)
    }
}

/// Tally over all five statuses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub not_visited: usize,
    pub not_answered: usize,
    pub answered: usize,
    pub marked_review: usize,
    pub answered_marked: usize,
}

impl StatusCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.not_visited + self.not_answered + self.answered + self.marked_review + self.answered_marked
    }

    /// Questions carrying an answer, marked or not.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.answered + self.answered_marked
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTracker {
    entries: Vec<(QuestionId, QuestionStatus)>,
    index: HashMap<QuestionId, usize>,
}

impl StatusTracker {
    /// Start every question as `NotVisited`, in question order.
    ///
    /// Repeated ids keep their first position.
    pub fn new<'a>(questions: impl IntoIterator<Item = &'a QuestionId>) -> Self {
        let mut entries = Vec::new();
        let mut index = HashMap::new();
        for id in questions {
            if index.contains_key(id) {
                continue;
            }
            index.insert(id.clone(), entries.len());
            entries.push((id.clone(), QuestionStatus::NotVisited));
        }
        Self { entries, index }
    }

    #[must_use]
    pub fn status(&self, id: &QuestionId) -> Option<QuestionStatus> {
        self.index.get(id).map(|&i| self.entries[i].1)
    }

    /// Statuses in question order.
    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, QuestionStatus)> {
        self.entries.iter().map(|(id, status)| (id, *status))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn visit(&mut self, id: &QuestionId) {
        if let Some(slot) = self.slot_mut(id) {
            if *slot == QuestionStatus::NotVisited {
                *slot = QuestionStatus::NotAnswered;
            }
        }
    }

    pub fn select(&mut self, id: &QuestionId, has_mark: bool) {
        self.set(
            id,
            if has_mark {
                QuestionStatus::AnsweredAndMarked
            } else {
                QuestionStatus::Answered
            },
        );
    }

    pub fn clear(&mut self, id: &QuestionId, has_mark: bool) {
        self.set(
            id,
            if has_mark {
                QuestionStatus::MarkedForReview
            } else {
                QuestionStatus::NotAnswered
            },
        );
    }

    pub fn mark(&mut self, id: &QuestionId, is_answered: bool) {
        self.set(
            id,
            if is_answered {
                QuestionStatus::AnsweredAndMarked
            } else {
                QuestionStatus::MarkedForReview
            },
        );
    }

    /// Drop the review mark, keeping the answered bit.
    pub fn unmark(&mut self, id: &QuestionId, is_answered: bool) {
        self.set(
            id,
            if is_answered {
                QuestionStatus::Answered
            } else {
                QuestionStatus::NotAnswered
            },
        );
    }

    /// Recomputed from the mapping on every call.
    #[must_use]
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for (_, status) in &self.entries {
            match status {
                QuestionStatus::NotVisited => counts.not_visited += 1,
                QuestionStatus::NotAnswered => counts.not_answered += 1,
                QuestionStatus::Answered => counts.answered += 1,
                QuestionStatus::MarkedForReview => counts.marked_review += 1,
                QuestionStatus::AnsweredAndMarked => counts.answered_marked += 1,
            }
        }
        counts
    }

    fn set(&mut self, id: &QuestionId, status: QuestionStatus) {
        if let Some(slot) = self.slot_mut(id) {
            *slot = status;
        }
    }

    fn slot_mut(&mut self, id: &QuestionId) -> Option<&mut QuestionStatus> {
        let i = *self.index.get(id)?;
        Some(&mut self.entries[i].1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(n: usize) -> Vec<QuestionId> {
        (0..n).map(|i| QuestionId::new(format!("q{i}"))).collect()
    }

    #[test]
    fn visit_only_moves_not_visited() {
        let ids = ids(1);
        let mut tracker = StatusTracker::new(&ids);
        tracker.visit(&ids[0]);
        assert_eq!(tracker.status(&ids[0]), Some(QuestionStatus::NotAnswered));

        tracker.select(&ids[0], false);
        tracker.visit(&ids[0]);
        assert_eq!(tracker.status(&ids[0]), Some(QuestionStatus::Answered));
    }

    #[test]
    fn mark_survives_answer_clear() {
        let ids = ids(1);
        let mut tracker = StatusTracker::new(&ids);
        tracker.visit(&ids[0]);
        tracker.mark(&ids[0], false);
        assert_eq!(tracker.status(&ids[0]), Some(QuestionStatus::MarkedForReview));

        let marked = tracker.status(&ids[0]).unwrap().is_marked();
        tracker.select(&ids[0], marked);
        assert_eq!(
            tracker.status(&ids[0]),
            Some(QuestionStatus::AnsweredAndMarked)
        );

        let marked = tracker.status(&ids[0]).unwrap().is_marked();
        tracker.clear(&ids[0], marked);
        assert_eq!(tracker.status(&ids[0]), Some(QuestionStatus::MarkedForReview));
    }

    #[test]
    fn unmark_keeps_answer() {
        let ids = ids(1);
        let mut tracker = StatusTracker::new(&ids);
        tracker.mark(&ids[0], true);
        tracker.unmark(&ids[0], true);
        assert_eq!(tracker.status(&ids[0]), Some(QuestionStatus::Answered));
    }

    #[test]
    fn unknown_question_is_ignored() {
        let ids = ids(2);
        let mut tracker = StatusTracker::new(&ids);
        tracker.select(&QuestionId::new("missing"), false);
        assert_eq!(tracker.counts().not_visited, 2);
    }

    #[test]
    fn iteration_follows_question_order() {
        let ids = ids(3);
        let tracker = StatusTracker::new(&ids);
        let order: Vec<_> = tracker.iter().map(|(id, _)| id.clone()).collect();
        assert_eq!(order, ids);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Visit(usize),
        Select(usize),
        Clear(usize),
        Mark(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..8_usize).prop_map(Op::Visit),
            (0..8_usize).prop_map(Op::Select),
            (0..8_usize).prop_map(Op::Clear),
            (0..8_usize).prop_map(Op::Mark),
        ]
    }

    proptest! {
        #[test]
        fn counts_partition_question_set(n in 1..8_usize, ops in prop::collection::vec(op(), 0..64)) {
            let ids = ids(n);
            let mut tracker = StatusTracker::new(&ids);
            for op in ops {
                let (Op::Visit(i) | Op::Select(i) | Op::Clear(i) | Op::Mark(i)) = op.clone();
                let id = &ids[i % n];
                let current = tracker.status(id).unwrap();
                match op {
                    Op::Visit(_) => tracker.visit(id),
                    Op::Select(_) => tracker.select(id, current.is_marked()),
                    Op::Clear(_) => tracker.clear(id, current.is_marked()),
                    Op::Mark(_) => tracker.mark(id, current.is_answered()),
                }
            }
            prop_assert_eq!(tracker.counts().total(), n);
        }
    }
}
