//! Bootcamp request DTOs

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::bootcamp::{CreateBootcampDto, UpdateBootcampDto};
use crate::domain::Career;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBootcampRequest {
    #[validate(length(min = 1, max = 50, message = "Name is required and can not be more than 50 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 500, message = "Description is required and can not be more than 500 characters"))]
    pub description: String,
    #[validate(url(message = "Please use a valid URL with HTTP or HTTPS"))]
    pub website: Option<String>,
    #[validate(length(max = 20, message = "Phone number can not be longer than 20 characters"))]
    pub phone: Option<String>,
    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Please add an address"))]
    pub address: String,
    #[validate(length(min = 1, message = "Please add at least one career"))]
    pub careers: Vec<Career>,
    #[validate(range(min = 1.0, max = 10.0, message = "Rating must be between 1 and 10"))]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
}

impl From<CreateBootcampRequest> for CreateBootcampDto {
    fn from(r: CreateBootcampRequest) -> Self {
        CreateBootcampDto {
            name: r.name.trim().to_string(),
            description: r.description,
            website: r.website,
            phone: r.phone,
            email: r.email,
            address: r.address,
            careers: r.careers,
            average_rating: r.average_rating,
            housing: r.housing,
            job_assistance: r.job_assistance,
            job_guarantee: r.job_guarantee,
            accept_gi: r.accept_gi,
        }
    }
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBootcampRequest {
    #[validate(length(min = 1, max = 50, message = "Name is required and can not be more than 50 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 500, message = "Description is required and can not be more than 500 characters"))]
    pub description: Option<String>,
    #[validate(url(message = "Please use a valid URL with HTTP or HTTPS"))]
    pub website: Option<String>,
    #[validate(length(max = 20, message = "Phone number can not be longer than 20 characters"))]
    pub phone: Option<String>,
    #[validate(email(message = "Please add a valid email"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Please add at least one career"))]
    pub careers: Option<Vec<Career>>,
    #[validate(range(min = 1.0, max = 10.0, message = "Rating must be between 1 and 10"))]
    pub average_rating: Option<f64>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}

impl From<UpdateBootcampRequest> for UpdateBootcampDto {
    fn from(r: UpdateBootcampRequest) -> Self {
        UpdateBootcampDto {
            name: r.name.map(|n| n.trim().to_string()),
            description: r.description,
            website: r.website,
            phone: r.phone,
            email: r.email,
            careers: r.careers,
            average_rating: r.average_rating,
            housing: r.housing,
            job_assistance: r.job_assistance,
            job_guarantee: r.job_guarantee,
            accept_gi: r.accept_gi,
        }
    }
}
