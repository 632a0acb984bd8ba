use questionnaire_types::{Question, QuestionKind, ValidationRules};

/// A short unconditional questionnaire covering every question kind.
pub fn team_profile() -> Vec<Question> {
    vec![
        Question::new(1, "What is your team called?", QuestionKind::FreeText)
            .with_rules(ValidationRules::length(Some(2), Some(40))),
        Question::new(2, "Where do you run workloads?", QuestionKind::MultiChoice)
            .with_options(["AWS", "Azure", "Google Cloud", "On-premises"])
            .with_rules(ValidationRules::count(Some(1), Some(3))),
        Question::new(3, "How large is the team?", QuestionKind::SingleChoice)
            .with_options(["1-5", "6-20", "21-100", "More than 100"]),
        Question::new(4, "Ticket prefix for roadmap items", QuestionKind::FreeText)
            .optional()
            .with_rules(ValidationRules::length(None, Some(8)).with_pattern("[A-Z]+-")),
    ]
}
