//! Course use-cases and the bootcamp `averageCost` aggregate

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::domain::access::ensure_owner_or_admin;
use crate::domain::course::{self, average_tuition, Course, CreateCourseDto, UpdateCourseDto};
use crate::domain::query::{Document, FilterExpr, QueryOptions, RelationSpec};
use crate::domain::{DomainError, DomainResult, RepositoryProvider, User};

pub const NOT_FOUND: &str = "No course exists with provided id.";
pub const BOOTCAMP_NOT_FOUND: &str = "No bootcamp exists with provided id.";
pub const PERMISSION_DENIED: &str = "Permission Denied";

/// The bootcamp relation expanded on course reads.
pub fn bootcamp_relation() -> RelationSpec {
    RelationSpec::belongs_to("bootcamp", crate::domain::bootcamp::COLLECTION)
        .with_select(&["name", "description"])
}

pub struct CourseService {
    repos: Arc<dyn RepositoryProvider>,
}

impl CourseService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn list_for_bootcamp(&self, bootcamp_id: &str) -> DomainResult<Vec<Course>> {
        self.repos.courses().find_by_bootcamp(bootcamp_id).await
    }

    /// Course document with its bootcamp expanded to `{_id, name, description}`.
    pub async fn get(&self, id: &str) -> DomainResult<Document> {
        let options = QueryOptions::new()
            .with_filter(FilterExpr::eq("_id", id))
            .with_limit(1)
            .with_relations(vec![bootcamp_relation()]);
        self.repos
            .collection(course::COLLECTION)
            .find(&options)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::not_found(NOT_FOUND))
    }

    async fn get_owned(&self, actor: &User, id: &str) -> DomainResult<Course> {
        let course = self
            .repos
            .courses()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(NOT_FOUND))?;
        ensure_owner_or_admin(actor, &course.user, PERMISSION_DENIED)?;
        Ok(course)
    }

    pub async fn add(
        &self,
        actor: &User,
        bootcamp_id: &str,
        dto: CreateCourseDto,
    ) -> DomainResult<Course> {
        let bootcamp = self
            .repos
            .bootcamps()
            .find_by_id(bootcamp_id)
            .await?
            .ok_or_else(|| DomainError::not_found(BOOTCAMP_NOT_FOUND))?;
        ensure_owner_or_admin(actor, &bootcamp.user, PERMISSION_DENIED)?;

        let course = Course {
            id: uuid::Uuid::new_v4().to_string(),
            title: dto.title,
            description: dto.description,
            weeks: dto.weeks,
            tuition: dto.tuition,
            minimum_skill: dto.minimum_skill,
            scholarship_available: dto.scholarship_available,
            bootcamp: bootcamp.id.clone(),
            user: actor.id.clone(),
            created_at: Utc::now(),
        };
        self.repos.courses().create(&course).await?;
        info!(course_id = %course.id, bootcamp_id = %bootcamp.id, "Course added");

        self.refresh_average_cost(&bootcamp.id).await?;
        Ok(course)
    }

    pub async fn update(&self, actor: &User, id: &str, dto: UpdateCourseDto) -> DomainResult<Course> {
        let mut course = self.get_owned(actor, id).await?;

        if let Some(title) = dto.title {
            course.title = title;
        }
        if let Some(description) = dto.description {
            course.description = description;
        }
        if let Some(weeks) = dto.weeks {
            course.weeks = weeks;
        }
        if let Some(tuition) = dto.tuition {
            course.tuition = tuition;
        }
        if let Some(skill) = dto.minimum_skill {
            course.minimum_skill = skill;
        }
        if let Some(scholarship) = dto.scholarship_available {
            course.scholarship_available = scholarship;
        }

        self.repos.courses().update(&course).await?;
        self.refresh_average_cost(&course.bootcamp).await?;
        Ok(course)
    }

    pub async fn delete(&self, actor: &User, id: &str) -> DomainResult<()> {
        let course = self.get_owned(actor, id).await?;
        self.repos.courses().delete(id).await?;
        info!(course_id = %id, "Course deleted");
        self.refresh_average_cost(&course.bootcamp).await
    }

    /// Mean tuition of the bootcamp's courses; cleared when none remain.
    pub async fn refresh_average_cost(&self, bootcamp_id: &str) -> DomainResult<()> {
        let Some(mut bootcamp) = self.repos.bootcamps().find_by_id(bootcamp_id).await? else {
            return Ok(());
        };
        let courses = self.repos.courses().find_by_bootcamp(bootcamp_id).await?;
        bootcamp.average_cost = average_tuition(&courses);
        debug!(bootcamp_id = %bootcamp_id, average_cost = ?bootcamp.average_cost, "Average cost refreshed");
        self.repos.bootcamps().update(&bootcamp).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::domain::bootcamp::{Bootcamp, DEFAULT_PHOTO};
    use crate::domain::{Career, MinimumSkill, UserRole};
    use crate::infrastructure::StoreRepositoryProvider;

    fn expanded_bootcamp(doc: &Document) -> Option<&serde_json::Map<String, Value>> {
        doc.get("bootcamp").and_then(Value::as_object)
    }

    fn user(id: &str, role: UserRole) -> User {
        User {
            id: id.into(),
            name: id.into(),
            email: format!("{id}@example.com"),
            role,
            password_hash: String::new(),
            reset_password_token: None,
            reset_password_expire: None,
            created_at: Utc::now(),
        }
    }

    fn dto(tuition: f64) -> CreateCourseDto {
        CreateCourseDto {
            title: "Full Stack Web Development".into(),
            description: "MERN stack".into(),
            weeks: "12".into(),
            tuition,
            minimum_skill: MinimumSkill::Intermediate,
            scholarship_available: false,
        }
    }

    async fn fixture() -> (CourseService, Arc<StoreRepositoryProvider>) {
        let repos = Arc::new(StoreRepositoryProvider::in_memory());
        repos
            .bootcamps()
            .create(&Bootcamp {
                id: "b1".into(),
                name: "Devworks".into(),
                slug: "devworks".into(),
                description: "Full stack".into(),
                website: None,
                phone: None,
                email: None,
                location: None,
                careers: vec![Career::WebDevelopment],
                average_rating: None,
                average_cost: None,
                photo: DEFAULT_PHOTO.into(),
                housing: false,
                job_assistance: false,
                job_guarantee: false,
                accept_gi: false,
                user: "owner".into(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        (CourseService::new(repos.clone()), repos)
    }

    async fn average_cost(repos: &StoreRepositoryProvider) -> Option<f64> {
        repos.bootcamps().find_by_id("b1").await.unwrap().unwrap().average_cost
    }

    #[tokio::test]
    async fn add_requires_existing_bootcamp_and_ownership() {
        let (service, _) = fixture().await;
        let owner = user("owner", UserRole::Publisher);

        assert_eq!(
            service.add(&owner, "missing", dto(1.0)).await.unwrap_err(),
            DomainError::NotFound(BOOTCAMP_NOT_FOUND.into())
        );
        assert_eq!(
            service
                .add(&user("other", UserRole::Publisher), "b1", dto(1.0))
                .await
                .unwrap_err(),
            DomainError::Forbidden(PERMISSION_DENIED.into())
        );
        let course = service.add(&owner, "b1", dto(1.0)).await.unwrap();
        assert_eq!(course.bootcamp, "b1");
        assert_eq!(course.user, "owner");
    }

    #[tokio::test]
    async fn average_cost_follows_courses() {
        let (service, repos) = fixture().await;
        let owner = user("owner", UserRole::Publisher);

        let first = service.add(&owner, "b1", dto(8000.0)).await.unwrap();
        assert_eq!(average_cost(&repos).await, Some(8000.0));

        let second = service.add(&owner, "b1", dto(12000.0)).await.unwrap();
        assert_eq!(average_cost(&repos).await, Some(10000.0));

        service
            .update(
                &owner,
                &second.id,
                UpdateCourseDto {
                    tuition: Some(10000.0),
                    ..UpdateCourseDto::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(average_cost(&repos).await, Some(9000.0));

        service.delete(&owner, &first.id).await.unwrap();
        service.delete(&owner, &second.id).await.unwrap();
        assert_eq!(average_cost(&repos).await, None);
    }

    #[tokio::test]
    async fn get_expands_bootcamp_name_and_description() {
        let (service, _) = fixture().await;
        let course = service
            .add(&user("owner", UserRole::Publisher), "b1", dto(5000.0))
            .await
            .unwrap();

        let doc = service.get(&course.id).await.unwrap();
        let bootcamp = expanded_bootcamp(&doc).unwrap();
        assert_eq!(bootcamp["name"], "Devworks");
        assert_eq!(bootcamp["description"], "Full stack");
        assert!(bootcamp.get("slug").is_none());

        assert_eq!(
            service.get("nope").await.unwrap_err(),
            DomainError::NotFound(NOT_FOUND.into())
        );
    }

    #[tokio::test]
    async fn admin_may_edit_any_course() {
        let (service, _) = fixture().await;
        let course = service
            .add(&user("owner", UserRole::Publisher), "b1", dto(5000.0))
            .await
            .unwrap();
        let updated = service
            .update(
                &user("root", UserRole::Admin),
                &course.id,
                UpdateCourseDto {
                    title: Some("Renamed".into()),
                    ..UpdateCourseDto::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(
            service
                .delete(&user("other", UserRole::Publisher), &course.id)
                .await
                .unwrap_err(),
            DomainError::Forbidden(PERMISSION_DENIED.into())
        );
    }
}
