use crate::{Answers, ConditionalConfig, Question};

/// Compute the questions the wizard walks through, as indices into `questions`.
///
/// Without conditional filtering this is every question in server order.
/// With it, the governing question comes first, followed by every question
/// whose `parent_answer` is among the values chosen in the governing answer,
/// sorted by `order` (questions without an order go last; ties keep server order).
///
/// Returns an empty list only if `questions` is empty or the governing question is missing.
pub fn active_questions(
    questions: &[Question],
    answers: &Answers,
    conditional: Option<&ConditionalConfig>,
) -> Vec<usize> {
    let Some(conditional) = conditional else {
        return (0..questions.len()).collect();
    };

    let governing_id = conditional.governing_question;
    let Some(governing) = questions.iter().position(|q| q.id == governing_id) else {
        return Vec::new();
    };

    let chosen = answers.get(governing_id);
    let mut included: Vec<usize> = questions
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != governing)
        .filter(|(_, question)| match (&question.parent_answer, chosen) {
            (Some(parent), Some(answer)) => answer.contains_choice(parent),
            _ => false,
        })
        .map(|(idx, _)| idx)
        .collect();

    // `sort_by_key` is stable, so equal orders keep server order.
    included.sort_by_key(|&idx| questions[idx].order.unwrap_or(i64::MAX));

    let mut active = Vec::with_capacity(included.len() + 1);
    active.push(governing);
    active.extend(included);
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Answer, QuestionId, QuestionKind};

    fn goals() -> Vec<Question> {
        vec![
            Question::new(1, "Which goals matter?", QuestionKind::MultiChoice)
                .with_options(["Goal A", "Goal B"]),
            Question::new(2, "About goal A", QuestionKind::FreeText)
                .with_parent_answer("Goal A")
                .with_order(3),
            Question::new(3, "About goal B", QuestionKind::FreeText)
                .with_parent_answer("Goal B")
                .with_order(1),
            Question::new(4, "More on goal A", QuestionKind::FreeText)
                .with_parent_answer("Goal A")
                .with_order(2),
        ]
    }

    fn conditional() -> ConditionalConfig {
        ConditionalConfig {
            governing_question: QuestionId::new(1),
        }
    }

    #[test]
    fn unconditional_keeps_everything() {
        let active = active_questions(&goals(), &Answers::new(), None);
        assert_eq!(active, vec![0, 1, 2, 3]);
    }

    #[test]
    fn includes_matching_children_sorted_by_order() {
        let mut answers = Answers::new();
        answers.insert(1, Answer::choices(["Goal A"]));

        let active = active_questions(&goals(), &answers, Some(&conditional()));
        // question 4 (order 2) before question 2 (order 3)
        assert_eq!(active, vec![0, 3, 1]);
    }

    #[test]
    fn no_governing_answer_means_only_the_governing_question() {
        let active = active_questions(&goals(), &Answers::new(), Some(&conditional()));
        assert_eq!(active, vec![0]);
    }

    #[test]
    fn several_goals() {
        let mut answers = Answers::new();
        answers.insert(1, Answer::choices(["Goal A", "Goal B"]));

        let active = active_questions(&goals(), &answers, Some(&conditional()));
        assert_eq!(active, vec![0, 2, 3, 1]);
    }

    #[test]
    fn missing_governing_question() {
        let config = ConditionalConfig {
            governing_question: QuestionId::new(99),
        };
        assert!(active_questions(&goals(), &Answers::new(), Some(&config)).is_empty());
    }
}
