//! Course request DTOs

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::course::{CreateCourseDto, UpdateCourseDto};
use crate::domain::MinimumSkill;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, message = "Course title is required."))]
    pub title: String,
    #[validate(length(min = 1, message = "Course desciption is required."))]
    pub description: String,
    #[validate(length(min = 1, message = "Please add number of weeks."))]
    pub weeks: String,
    #[validate(range(min = 0.0, message = "Please add tuition cost."))]
    pub tuition: f64,
    pub minimum_skill: MinimumSkill,
    #[serde(default)]
    pub scholarship_available: bool,
}

impl From<CreateCourseRequest> for CreateCourseDto {
    fn from(r: CreateCourseRequest) -> Self {
        CreateCourseDto {
            title: r.title,
            description: r.description,
            weeks: r.weeks,
            tuition: r.tuition,
            minimum_skill: r.minimum_skill,
            scholarship_available: r.scholarship_available,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, message = "Course title is required."))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Course desciption is required."))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Please add number of weeks."))]
    pub weeks: Option<String>,
    #[validate(range(min = 0.0, message = "Please add tuition cost."))]
    pub tuition: Option<f64>,
    pub minimum_skill: Option<MinimumSkill>,
    pub scholarship_available: Option<bool>,
}

impl From<UpdateCourseRequest> for UpdateCourseDto {
    fn from(r: UpdateCourseRequest) -> Self {
        UpdateCourseDto {
            title: r.title,
            description: r.description,
            weeks: r.weeks,
            tuition: r.tuition,
            minimum_skill: r.minimum_skill,
            scholarship_available: r.scholarship_available,
        }
    }
}
