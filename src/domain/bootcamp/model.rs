//! Bootcamp domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::geo::GeoLocation;

pub const DEFAULT_PHOTO: &str = "no-photo.jpg";
pub const NAME_MAX_LEN: u64 = 50;
pub const DESCRIPTION_MAX_LEN: u64 = 500;
pub const PHONE_MAX_LEN: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Career {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    #[serde(rename = "UI/UX")]
    UiUx,
    #[serde(rename = "Data Science")]
    DataScience,
    Business,
    Other,
}

fn default_photo() -> String {
    DEFAULT_PHOTO.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
    pub careers: Vec<Career>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_cost: Option<f64>,
    #[serde(default = "default_photo")]
    pub photo: String,
    #[serde(default)]
    pub housing: bool,
    #[serde(default)]
    pub job_assistance: bool,
    #[serde(default)]
    pub job_guarantee: bool,
    #[serde(default)]
    pub accept_gi: bool,
    pub user: String,
    pub created_at: DateTime<Utc>,
}
