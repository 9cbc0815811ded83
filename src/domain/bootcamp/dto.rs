use super::Career;

#[derive(Debug, Clone, Default)]
pub struct CreateBootcampDto {
    pub name: String,
    pub description: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Geocoded into `location`; not stored
    pub address: String,
    pub careers: Vec<Career>,
    pub average_rating: Option<f64>,
    pub housing: bool,
    pub job_assistance: bool,
    pub job_guarantee: bool,
    pub accept_gi: bool,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateBootcampDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub careers: Option<Vec<Career>>,
    pub average_rating: Option<f64>,
    pub housing: Option<bool>,
    pub job_assistance: Option<bool>,
    pub job_guarantee: Option<bool>,
    pub accept_gi: Option<bool>,
}
