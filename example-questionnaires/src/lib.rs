//! Sample question sets used by the demo binary and the tests.

pub mod cloud_security;
pub mod team_profile;

pub use cloud_security::{
    GOAL_QUESTION, GOALS, cloud_security_roadmap, cloud_security_saved_answers,
};
pub use team_profile::team_profile;
