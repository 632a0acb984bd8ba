use questionnaire_types::{ChoiceOption, Question, QuestionKind, SavedAnswer, ValidationRules};

/// Id of the question whose answer decides which follow-ups are asked.
pub const GOAL_QUESTION: i64 = 1;

/// Strategic goals offered by the governing question.
pub const GOALS: [&str; 4] = [
    "Reduce Risk",
    "Improve Compliance",
    "Accelerate Delivery",
    "Optimize Cost",
];

const MATURITY: [&str; 4] = ["Not started", "Planned", "Partially implemented", "Fully implemented"];

fn follow_up(id: i64, goal: &str, area: &str, order: i64, text: &str) -> Question {
    let mut question = Question::new(id, text, QuestionKind::SingleChoice)
        .with_options(MATURITY)
        .with_parent_answer(goal)
        .with_order(order);
    question.strategic_goal = Some(goal.to_string());
    question.area = Some(area.to_string());
    question
}

/// Conditional cloud-security roadmap questionnaire.
///
/// Question 1 picks up to two strategic goals; every other question belongs
/// to one goal and is only asked when that goal was picked.
pub fn cloud_security_roadmap() -> Vec<Question> {
    let goals = GOALS.iter().map(|goal| {
        ChoiceOption::new(*goal).with_description(format!(
            "Focus on {} to improve cloud security maturity",
            goal.to_lowercase()
        ))
    });

    vec![
        Question::new(
            GOAL_QUESTION,
            "Which strategic goals matter most to your organisation?",
            QuestionKind::MultiChoice,
        )
        .with_options(goals)
        .with_rules(ValidationRules::count(Some(1), Some(2))),
        follow_up(
            2,
            "Reduce Risk",
            "Posture Management",
            2,
            "How do you detect misconfigured cloud resources?",
        ),
        follow_up(
            3,
            "Reduce Risk",
            "Workload Protection",
            1,
            "Are running workloads scanned for vulnerabilities?",
        ),
        follow_up(
            4,
            "Improve Compliance",
            "Posture Management",
            1,
            "Do you continuously assess against a compliance framework?",
        ),
        follow_up(
            5,
            "Accelerate Delivery",
            "Infrastructure as Code",
            1,
            "Are infrastructure templates scanned before deployment?",
        ),
        follow_up(
            6,
            "Optimize Cost",
            "Entitlement Management",
            2,
            "Do you remove unused identities and permissions?",
        ),
        follow_up(
            7,
            "Optimize Cost",
            "Posture Management",
            1,
            "Are idle resources reported to their owners?",
        ),
        Question::new(8, "Anything else we should know?", QuestionKind::FreeText)
            .optional()
            .with_parent_answer("Reduce Risk")
            .with_order(9)
            .with_rules(ValidationRules::length(None, Some(500))),
    ]
}

/// Answers a returning user saved in an earlier session.
pub fn cloud_security_saved_answers() -> Vec<SavedAnswer> {
    vec![
        SavedAnswer::new(GOAL_QUESTION, vec!["Reduce Risk"]),
        SavedAnswer::new(3, "Planned"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_follow_up_belongs_to_a_goal() {
        for question in cloud_security_roadmap().iter().skip(1) {
            let parent = question.parent_answer.as_deref().unwrap_or_default();
            assert!(GOALS.contains(&parent), "question {} has parent {parent}", question.id);
        }
    }
}
