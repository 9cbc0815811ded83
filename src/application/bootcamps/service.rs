//! Bootcamp use-cases: create/update/delete with ownership, radius search,
//! photo upload.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::access::ensure_owner_or_admin;
use crate::domain::bootcamp::{
    Bootcamp, CreateBootcampDto, UpdateBootcampDto, DEFAULT_PHOTO,
};
use crate::domain::geo::miles_to_radians;
use crate::domain::query::{FilterExpr, FilterNode};
use crate::domain::{DomainError, DomainResult, GeoLocation, Geocoder, RepositoryProvider, User};
use crate::infrastructure::uploads::PhotoStorage;
use crate::shared::slugify;

pub const NOT_FOUND: &str = "Bootcamp not found with provided id";
pub const PERMISSION_DENIED: &str = "Permission denied.";

/// A file received from a multipart form
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub struct BootcampService {
    repos: Arc<dyn RepositoryProvider>,
    geocoder: Arc<dyn Geocoder>,
    photos: PhotoStorage,
    /// Held across uniqueness checks and the write that follows them.
    writes: Mutex<()>,
}

impl BootcampService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        geocoder: Arc<dyn Geocoder>,
        photos: PhotoStorage,
    ) -> Self {
        Self {
            repos,
            geocoder,
            photos,
            writes: Mutex::new(()),
        }
    }

    pub async fn get(&self, id: &str) -> DomainResult<Bootcamp> {
        self.repos
            .bootcamps()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(NOT_FOUND))
    }

    /// Loads the bootcamp and checks that `actor` may modify it.
    async fn get_owned(&self, actor: &User, id: &str) -> DomainResult<Bootcamp> {
        let bootcamp = self.get(id).await?;
        ensure_owner_or_admin(actor, &bootcamp.user, PERMISSION_DENIED)?;
        Ok(bootcamp)
    }

    async fn ensure_unique_name(&self, name: &str, except_id: Option<&str>) -> DomainResult<()> {
        match self.repos.bootcamps().find_by_name(name).await? {
            Some(existing) if Some(existing.id.as_str()) != except_id => {
                Err(DomainError::Conflict("Duplicate value is provided".into()))
            }
            _ => Ok(()),
        }
    }

    async fn ensure_can_own(&self, actor: &User) -> DomainResult<()> {
        if !actor.is_admin() && self.repos.bootcamps().find_by_owner(&actor.id).await?.is_some() {
            return Err(DomainError::validation(
                "A bootcamp already exists with this user id",
            ));
        }
        Ok(())
    }

    pub async fn create(&self, actor: &User, dto: CreateBootcampDto) -> DomainResult<Bootcamp> {
        self.ensure_can_own(actor).await?;
        self.ensure_unique_name(&dto.name, None).await?;

        let location = self.geocoder.geocode(&dto.address).await?.map(GeoLocation::from);
        if location.is_none() {
            warn!(address = %dto.address, "Address could not be geocoded");
        }

        // Re-checked under the write lock.
        let _guard = self.writes.lock().await;
        self.ensure_can_own(actor).await?;
        self.ensure_unique_name(&dto.name, None).await?;

        let bootcamp = Bootcamp {
            id: uuid::Uuid::new_v4().to_string(),
            slug: slugify(&dto.name),
            name: dto.name,
            description: dto.description,
            website: dto.website,
            phone: dto.phone,
            email: dto.email,
            location,
            careers: dto.careers,
            average_rating: dto.average_rating,
            average_cost: None,
            photo: DEFAULT_PHOTO.to_string(),
            housing: dto.housing,
            job_assistance: dto.job_assistance,
            job_guarantee: dto.job_guarantee,
            accept_gi: dto.accept_gi,
            user: actor.id.clone(),
            created_at: Utc::now(),
        };
        self.repos.bootcamps().create(&bootcamp).await?;

        info!(bootcamp_id = %bootcamp.id, user_id = %actor.id, "Bootcamp created");
        Ok(bootcamp)
    }

    pub async fn update(
        &self,
        actor: &User,
        id: &str,
        dto: UpdateBootcampDto,
    ) -> DomainResult<Bootcamp> {
        let _guard = self.writes.lock().await;
        let mut bootcamp = self.get_owned(actor, id).await?;

        if let Some(name) = dto.name {
            self.ensure_unique_name(&name, Some(id)).await?;
            bootcamp.name = name;
        }
        if let Some(description) = dto.description {
            bootcamp.description = description;
        }
        if dto.website.is_some() {
            bootcamp.website = dto.website;
        }
        if dto.phone.is_some() {
            bootcamp.phone = dto.phone;
        }
        if dto.email.is_some() {
            bootcamp.email = dto.email;
        }
        if let Some(careers) = dto.careers {
            bootcamp.careers = careers;
        }
        if dto.average_rating.is_some() {
            bootcamp.average_rating = dto.average_rating;
        }
        bootcamp.housing = dto.housing.unwrap_or(bootcamp.housing);
        bootcamp.job_assistance = dto.job_assistance.unwrap_or(bootcamp.job_assistance);
        bootcamp.job_guarantee = dto.job_guarantee.unwrap_or(bootcamp.job_guarantee);
        bootcamp.accept_gi = dto.accept_gi.unwrap_or(bootcamp.accept_gi);

        self.repos.bootcamps().update(&bootcamp).await?;
        info!(bootcamp_id = %id, user_id = %actor.id, "Bootcamp updated");
        Ok(bootcamp)
    }

    /// Deletes the bootcamp and every course attached to it.
    pub async fn delete(&self, actor: &User, id: &str) -> DomainResult<()> {
        self.get_owned(actor, id).await?;

        let removed = self.repos.courses().delete_by_bootcamp(id).await?;
        self.repos.bootcamps().delete(id).await?;
        info!(bootcamp_id = %id, courses_removed = removed, "Bootcamp deleted");
        Ok(())
    }

    /// Bootcamps within `distance` miles of the geocoded `zipcode`.
    pub async fn within_radius(&self, zipcode: &str, distance: f64) -> DomainResult<Vec<Bootcamp>> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(DomainError::validation("Distance must be a positive number"));
        }
        let Some(center) = self.geocoder.geocode(zipcode).await? else {
            return Err(DomainError::validation(
                "Unable to locate the provided zipcode",
            ));
        };

        let filter = FilterExpr::new().and(
            "location",
            FilterNode::WithinSphere {
                lng: center.longitude,
                lat: center.latitude,
                radius: miles_to_radians(distance),
            },
        );
        self.repos.bootcamps().find(filter).await
    }

    /// Stores the photo as `photo_<id><ext>` and returns the file name.
    pub async fn upload_photo(
        &self,
        actor: &User,
        id: &str,
        upload: Option<PhotoUpload>,
    ) -> DomainResult<String> {
        let mut bootcamp = self.get_owned(actor, id).await?;

        let Some(upload) = upload else {
            return Err(DomainError::validation("Please upload a file."));
        };
        let is_image = upload
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"));
        if !is_image {
            return Err(DomainError::validation("Please upload a image file."));
        }
        if upload.bytes.len() > self.photos.max_file_size() {
            return Err(DomainError::validation(format!(
                "Please upload a image of size less than {}.",
                self.photos.max_file_size()
            )));
        }

        let file_name = self
            .photos
            .save(&bootcamp.id, upload.file_name.as_deref(), &upload.bytes)
            .await?;
        bootcamp.photo = file_name.clone();
        self.repos.bootcamps().update(&bootcamp).await?;
        Ok(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Career, GeocodedAddress, UserRole};
    use crate::infrastructure::geocoding::StaticGeocoder;
    use crate::infrastructure::StoreRepositoryProvider;

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

    fn point(lng: f64, lat: f64) -> GeocodedAddress {
        GeocodedAddress {
            latitude: lat,
            longitude: lng,
            formatted_address: None,
            street: None,
            city: None,
            state: None,
            zipcode: None,
            country: None,
        }
    }

    fn dto(name: &str, address: &str) -> CreateBootcampDto {
        CreateBootcampDto {
            name: name.into(),
            description: "Full stack web development".into(),
            address: address.into(),
            careers: vec![Career::WebDevelopment],
            ..CreateBootcampDto::default()
        }
    }

    struct Fixture {
        service: BootcampService,
        repos: Arc<StoreRepositoryProvider>,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let repos = Arc::new(StoreRepositoryProvider::in_memory());
        let geocoder = StaticGeocoder::new()
            .with("Boston MA", point(-71.06, 42.36))
            .with("Providence RI", point(-71.41, 41.82))
            .with("Los Angeles CA", point(-118.24, 34.05))
            .with("02118", point(-71.07, 42.34));
        let service = BootcampService::new(
            repos.clone(),
            Arc::new(geocoder),
            PhotoStorage::new(dir.path().join("uploads"), 16),
        );
        Fixture {
            service,
            repos,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn create_derives_slug_and_location() {
        let f = fixture();
        let owner = user("u1", UserRole::Publisher);
        let bootcamp = f.service.create(&owner, dto("Devworks Bootcamp", "Boston MA")).await.unwrap();

        assert_eq!(bootcamp.slug, "devworks-bootcamp");
        assert_eq!(bootcamp.user, "u1");
        assert_eq!(bootcamp.photo, DEFAULT_PHOTO);
        assert_eq!(bootcamp.location.unwrap().coordinates, [-71.06, 42.36]);
    }

    #[tokio::test]
    async fn one_bootcamp_per_publisher_but_not_for_admin() {
        let f = fixture();
        let publisher = user("u1", UserRole::Publisher);
        f.service.create(&publisher, dto("First", "Boston MA")).await.unwrap();
        assert_eq!(
            f.service.create(&publisher, dto("Second", "Boston MA")).await.unwrap_err(),
            DomainError::Validation("A bootcamp already exists with this user id".into())
        );

        let admin = user("a1", UserRole::Admin);
        f.service.create(&admin, dto("Third", "Boston MA")).await.unwrap();
        f.service.create(&admin, dto("Fourth", "Boston MA")).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_with_same_name_admit_one() {
        let Fixture { service, repos, _dir } = fixture();
        let service = Arc::new(service);
        let admin = user("a1", UserRole::Admin);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                let admin = admin.clone();
                tokio::spawn(async move { service.create(&admin, dto("Racing", "Boston MA")).await })
            })
            .collect();
        let mut created = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) => assert_eq!(e, DomainError::Conflict("Duplicate value is provided".into())),
            }
        }
        assert_eq!(created, 1);

        let stored = repos.bootcamps().find(FilterExpr::eq("name", "Racing")).await.unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_name_is_conflict() {
        let f = fixture();
        f.service.create(&user("u1", UserRole::Publisher), dto("Same", "Boston MA")).await.unwrap();
        assert_eq!(
            f.service.create(&user("u2", UserRole::Publisher), dto("Same", "Boston MA")).await.unwrap_err(),
            DomainError::Conflict("Duplicate value is provided".into())
        );
    }

    #[tokio::test]
    async fn update_requires_owner_or_admin() {
        let f = fixture();
        let owner = user("u1", UserRole::Publisher);
        let bootcamp = f.service.create(&owner, dto("Devworks", "Boston MA")).await.unwrap();

        let patch = UpdateBootcampDto {
            housing: Some(true),
            ..UpdateBootcampDto::default()
        };
        assert_eq!(
            f.service
                .update(&user("u2", UserRole::Publisher), &bootcamp.id, patch.clone())
                .await
                .unwrap_err(),
            DomainError::Forbidden(PERMISSION_DENIED.into())
        );

        let updated = f
            .service
            .update(&user("a1", UserRole::Admin), &bootcamp.id, patch)
            .await
            .unwrap();
        assert!(updated.housing);
        assert_eq!(updated.name, "Devworks");
    }

    #[tokio::test]
    async fn missing_bootcamp_is_not_found() {
        let f = fixture();
        assert_eq!(
            f.service.get("nope").await.unwrap_err(),
            DomainError::NotFound(NOT_FOUND.into())
        );
    }

    #[tokio::test]
    async fn delete_cascades_to_courses() {
        use crate::domain::course::{Course, MinimumSkill};

        let f = fixture();
        let owner = user("u1", UserRole::Publisher);
        let bootcamp = f.service.create(&owner, dto("Devworks", "Boston MA")).await.unwrap();
        f.repos
            .courses()
            .create(&Course {
                id: "c1".into(),
                title: "Front End".into(),
                description: "HTML".into(),
                weeks: "8".into(),
                tuition: 8000.0,
                minimum_skill: MinimumSkill::Beginner,
                scholarship_available: false,
                bootcamp: bootcamp.id.clone(),
                user: "u1".into(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        f.service.delete(&owner, &bootcamp.id).await.unwrap();
        assert!(f.repos.courses().find_by_id("c1").await.unwrap().is_none());
        assert!(f.service.get(&bootcamp.id).await.is_err());
    }

    #[tokio::test]
    async fn radius_search() {
        let f = fixture();
        let admin = user("a1", UserRole::Admin);
        f.service.create(&admin, dto("Boston Camp", "Boston MA")).await.unwrap();
        f.service.create(&admin, dto("Providence Camp", "Providence RI")).await.unwrap();
        f.service.create(&admin, dto("LA Camp", "Los Angeles CA")).await.unwrap();

        let near = f.service.within_radius("02118", 10.0).await.unwrap();
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].name, "Boston Camp");

        let wider = f.service.within_radius("02118", 100.0).await.unwrap();
        assert_eq!(wider.len(), 2);

        assert!(matches!(
            f.service.within_radius("00000", 10.0).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn photo_upload_checks() {
        let f = fixture();
        let owner = user("u1", UserRole::Publisher);
        let bootcamp = f.service.create(&owner, dto("Devworks", "Boston MA")).await.unwrap();
        let upload = |ct: &str, size: usize| PhotoUpload {
            file_name: Some("cover.jpg".into()),
            content_type: Some(ct.into()),
            bytes: vec![0; size],
        };

        assert_eq!(
            f.service.upload_photo(&owner, &bootcamp.id, None).await.unwrap_err(),
            DomainError::Validation("Please upload a file.".into())
        );
        assert_eq!(
            f.service
                .upload_photo(&owner, &bootcamp.id, Some(upload("text/plain", 4)))
                .await
                .unwrap_err(),
            DomainError::Validation("Please upload a image file.".into())
        );
        assert_eq!(
            f.service
                .upload_photo(&owner, &bootcamp.id, Some(upload("image/jpeg", 17)))
                .await
                .unwrap_err(),
            DomainError::Validation("Please upload a image of size less than 16.".into())
        );

        let name = f
            .service
            .upload_photo(&owner, &bootcamp.id, Some(upload("image/jpeg", 8)))
            .await
            .unwrap();
        assert_eq!(name, format!("photo_{}.jpg", bootcamp.id));
        assert_eq!(f.service.get(&bootcamp.id).await.unwrap().photo, name);
    }
}
