use super::MinimumSkill;

#[derive(Debug, Clone)]
pub struct CreateCourseDto {
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: f64,
    pub minimum_skill: MinimumSkill,
    pub scholarship_available: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCourseDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub weeks: Option<String>,
    pub tuition: Option<f64>,
    pub minimum_skill: Option<MinimumSkill>,
    pub scholarship_available: Option<bool>,
}
