use std::collections::BTreeMap;

use crate::{Answer, QuestionId};

/// Committed answers, keyed by question.
///
/// Only answers the server has accepted end up here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Answers {
    values: BTreeMap<QuestionId, Answer>,
}

impl Answers {
    /// Create an empty answer map.
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Insert (or replace) the answer to a question.
    pub fn insert(&mut self, id: impl Into<QuestionId>, answer: Answer) -> Option<Answer> {
        self.values.insert(id.into(), answer)
    }

    /// Get the answer to a question.
    pub fn get(&self, id: QuestionId) -> Option<&Answer> {
        self.values.get(&id)
    }

    /// Check if a question has been answered.
    pub fn contains(&self, id: QuestionId) -> bool {
        self.values.contains_key(&id)
    }

    /// Remove the answer to a question.
    pub fn remove(&mut self, id: QuestionId) -> Option<Answer> {
        self.values.remove(&id)
    }

    /// Iterate over answers in question id order.
    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &Answer)> {
        self.values.iter()
    }

    /// Get the number of answers.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no answers.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'a> IntoIterator for &'a Answers {
    type Item = (&'a QuestionId, &'a Answer);
    type IntoIter = std::collections::btree_map::Iter<'a, QuestionId, Answer>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl FromIterator<(QuestionId, Answer)> for Answers {
    fn from_iter<T: IntoIterator<Item = (QuestionId, Answer)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Validation messages reported by the server, keyed by question.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    messages: BTreeMap<QuestionId, String>,
}

impl ValidationErrors {
    /// Create an empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the message for a question, replacing any previous one.
    pub fn record(&mut self, id: QuestionId, message: impl Into<String>) {
        self.messages.insert(id, message.into());
    }

    /// Clear the message for a question.
    pub fn clear(&mut self, id: QuestionId) -> Option<String> {
        self.messages.remove(&id)
    }

    /// Get the message for a question.
    pub fn get(&self, id: QuestionId) -> Option<&str> {
        self.messages.get(&id).map(String::as_str)
    }

    /// Iterate over messages in question id order.
    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &String)> {
        self.messages.iter()
    }

    /// Get the number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces() {
        let mut answers = Answers::new();
        answers.insert(1, Answer::Text("first".into()));
        let previous = answers.insert(1, Answer::Text("second".into()));

        assert_eq!(previous, Some(Answer::Text("first".into())));
        assert_eq!(
            answers.get(QuestionId::new(1)).and_then(Answer::as_text),
            Some("second")
        );
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn iterates_in_id_order() {
        let answers: Answers = [
            (QuestionId::new(3), Answer::Text("c".into())),
            (QuestionId::new(1), Answer::Text("a".into())),
        ]
        .into_iter()
        .collect();

        let ids: Vec<_> = answers.iter().map(|(id, _)| id.get()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn validation_errors_record_and_clear() {
        let mut errors = ValidationErrors::new();
        errors.record(QuestionId::new(2), "Required");
        assert_eq!(errors.get(QuestionId::new(2)), Some("Required"));

        errors.clear(QuestionId::new(2));
        assert!(errors.is_empty());
    }
}
