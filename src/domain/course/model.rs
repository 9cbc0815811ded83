use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MinimumSkill {
    Beginner,
    Intermediate,
    Advanced,
}

/// Course offered by a bootcamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    /// Free text, e.g. "8"
    pub weeks: String,
    pub tuition: f64,
    pub minimum_skill: MinimumSkill,
    #[serde(default)]
    pub scholarship_available: bool,
    /// Owning bootcamp id
    pub bootcamp: String,
    pub user: String,
    pub created_at: DateTime<Utc>,
}

/// Mean tuition, `None` for no courses.
pub fn average_tuition(courses: &[Course]) -> Option<f64> {
    if courses.is_empty() {
        return None;
    }
    let total: f64 = courses.iter().map(|c| c.tuition).sum();
    Some(total / courses.len() as f64)
}
