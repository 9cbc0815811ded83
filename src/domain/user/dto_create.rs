use super::UserRole;

#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub name: String,
    pub email: String,
    pub role: Option<UserRole>,
    /// Plain text; hashed by the repository
    pub password: String,
}
