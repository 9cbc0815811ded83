//! Bulk import and wipe of bootcamps, courses and users from JSON files
//!
//! A seed directory holds `users.json`, `bootcamps.json` and `courses.json`,
//! each a JSON array. Bootcamp and course ids are kept; user ids are
//! generated on insert and every `user` reference is remapped to them.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::CourseService;
use crate::domain::bootcamp::DEFAULT_PHOTO;
use crate::domain::{
    Bootcamp, Career, Course, CreateUserDto, DomainError, GeoLocation, Geocoder, MinimumSkill,
    RepositoryProvider, UserRole,
};
use crate::shared::slugify;

pub const USERS_FILE: &str = "users.json";
pub const BOOTCAMPS_FILE: &str = "bootcamps.json";
pub const COURSES_FILE: &str = "courses.json";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedUser {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<UserRole>,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedBootcamp {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub user: Option<String>,
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: String,
    pub careers: Vec<Career>,
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

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedCourse {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub weeks: String,
    pub tuition: f64,
    pub minimum_skill: MinimumSkill,
    #[serde(default)]
    pub scholarship_available: bool,
    pub bootcamp: String,
    pub user: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub users: Vec<SeedUser>,
    pub bootcamps: Vec<SeedBootcamp>,
    pub courses: Vec<SeedCourse>,
}

fn read_array<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Vec<T>, SeedError> {
    let path = dir.join(file);
    let raw = std::fs::read_to_string(&path).map_err(|source| SeedError::Read {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SeedError::Parse { path, source })
}

impl SeedData {
    pub fn load(dir: &Path) -> Result<Self, SeedError> {
        Ok(Self {
            users: read_array(dir, USERS_FILE)?,
            bootcamps: read_array(dir, BOOTCAMPS_FILE)?,
            courses: read_array(dir, COURSES_FILE)?,
        })
    }
}

/// Record counts touched by an import or wipe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: u64,
    pub bootcamps: u64,
    pub courses: u64,
}

pub struct Seeder {
    repos: Arc<dyn RepositoryProvider>,
    geocoder: Arc<dyn Geocoder>,
}

impl Seeder {
    pub fn new(repos: Arc<dyn RepositoryProvider>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { repos, geocoder }
    }

    pub async fn import(&self, data: SeedData) -> Result<SeedReport, SeedError> {
        let mut report = SeedReport::default();
        let users = self.repos.users();

        let mut user_ids = HashMap::new();
        for seed in data.users {
            let user = users
                .create_user(CreateUserDto {
                    name: seed.name,
                    email: seed.email.to_lowercase(),
                    role: seed.role,
                    password: seed.password,
                })
                .await?;
            if let Some(old) = seed.id {
                user_ids.insert(old, user.id.clone());
            }
            report.users += 1;
        }
        let owner = |id: Option<String>| -> String {
            id.map(|id| user_ids.get(&id).cloned().unwrap_or(id))
                .unwrap_or_default()
        };

        for seed in data.bootcamps {
            let location = self
                .geocoder
                .geocode(&seed.address)
                .await?
                .map(GeoLocation::from);
            if location.is_none() {
                warn!(address = %seed.address, "Address could not be geocoded");
            }
            let bootcamp = Bootcamp {
                id: seed
                    .id
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                slug: slugify(&seed.name),
                name: seed.name,
                description: seed.description,
                website: seed.website,
                phone: seed.phone,
                email: seed.email,
                location,
                careers: seed.careers,
                average_rating: seed.average_rating,
                average_cost: None,
                photo: DEFAULT_PHOTO.to_string(),
                housing: seed.housing,
                job_assistance: seed.job_assistance,
                job_guarantee: seed.job_guarantee,
                accept_gi: seed.accept_gi,
                user: owner(seed.user),
                created_at: Utc::now(),
            };
            self.repos.bootcamps().create(&bootcamp).await?;
            report.bootcamps += 1;
        }

        let mut touched = BTreeSet::new();
        for seed in data.courses {
            let course = Course {
                id: seed
                    .id
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                title: seed.title,
                description: seed.description,
                weeks: seed.weeks,
                tuition: seed.tuition,
                minimum_skill: seed.minimum_skill,
                scholarship_available: seed.scholarship_available,
                bootcamp: seed.bootcamp,
                user: owner(seed.user),
                created_at: Utc::now(),
            };
            self.repos.courses().create(&course).await?;
            touched.insert(course.bootcamp);
            report.courses += 1;
        }

        let courses = CourseService::new(self.repos.clone());
        for bootcamp_id in touched {
            courses.refresh_average_cost(&bootcamp_id).await?;
        }

        info!(
            users = report.users,
            bootcamps = report.bootcamps,
            courses = report.courses,
            "Data imported"
        );
        Ok(report)
    }

    pub async fn delete(&self) -> Result<SeedReport, SeedError> {
        let report = SeedReport {
            bootcamps: self.repos.bootcamps().delete_all().await?,
            courses: self.repos.courses().delete_all().await?,
            users: self.repos.users().delete_all_users().await?,
        };
        info!(
            users = report.users,
            bootcamps = report.bootcamps,
            courses = report.courses,
            "Data deleted"
        );
        Ok(report)
    }
}
