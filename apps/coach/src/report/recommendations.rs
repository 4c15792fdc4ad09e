//! Learning resources suggested alongside the report, bucketed by interview score.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub kind: &'static str,
    pub title: &'static str,
    pub link: &'static str,
}

const LOW: &[Resource] = &[Resource {
    kind: "YouTube",
    title: "Python for Beginners",
    link: "https://www.youtube.com/results?search_query=python+basics+tutorial",
}];

const MEDIUM: &[Resource] = &[Resource {
    kind: "Practice",
    title: "LeetCode Easy Problems",
    link: "https://leetcode.com/problemset/all/?difficulty=EASY",
}];

const HIGH: &[Resource] = &[Resource {
    kind: "YouTube",
    title: "System Design for Interviews",
    link: "https://www.youtube.com/results?search_query=system+design+interview",
}];

/// Interview score (1-10) → level: below 5 low, below 8 medium, else high.
pub fn level_for(interview_score: u32) -> Level {
    match interview_score {
        0..=4 => Level::Low,
        5..=7 => Level::Medium,
        _ => Level::High,
    }
}

pub fn resources_for(level: Level) -> Vec<Resource> {
    match level {
        Level::Low => LOW,
        Level::Medium => MEDIUM,
        Level::High => HIGH,
    }
    .to_vec()
}
