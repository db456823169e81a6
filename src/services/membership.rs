//! Membership service: member CRUD, search and authentication

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::member::{CreateMember, Member, Role, UpdateMember},
    repository::Repository,
};

#[derive(Clone)]
pub struct MembershipService {
    repository: Repository,
}

impl MembershipService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a member, returning its id.
    pub async fn add_member(&self, member: CreateMember) -> AppResult<i32> {
        member
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.members.email_exists(&member.email, None).await? {
            return Err(AppError::Conflict(format!(
                "Email '{}' already exists",
                member.email
            )));
        }

        self.repository.members.create(&member).await
    }

    /// Update only the supplied fields of a member.
    pub async fn update_member(&self, id: i32, update: UpdateMember) -> AppResult<Member> {
        if update.is_empty() {
            return Err(AppError::Validation("No changes provided".to_string()));
        }
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository.members.get_by_id(id).await?;

        if let Some(ref email) = update.email {
            if self.repository.members.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict(format!("Email '{}' already exists", email)));
            }
        }

        self.repository.members.update(id, &update).await?;
        self.repository.members.get_by_id(id).await
    }

    /// Delete a member. Rejected while the member still holds open loans,
    /// so loan history never dangles.
    pub async fn delete_member(&self, id: i32) -> AppResult<()> {
        self.repository.members.get_by_id(id).await?;

        let open = self.repository.loans.count_issued(id).await?;
        if open > 0 {
            return Err(AppError::Conflict(format!(
                "Member {} still holds {} open loan(s)",
                id, open
            )));
        }

        self.repository.members.delete(id).await
    }

    pub async fn get_member(&self, id: i32) -> AppResult<Member> {
        self.repository.members.get_by_id(id).await
    }

    /// All members ordered by id.
    pub async fn list_members(&self) -> AppResult<Vec<Member>> {
        self.repository.members.list().await
    }

    /// Substring search over name and email.
    pub async fn search_members(&self, text: &str) -> AppResult<Vec<Member>> {
        self.repository.members.search(text).await
    }

    /// Authenticate a member for a session under the given role.
    pub async fn authenticate(&self, name: &str, password: &str, role: Role) -> AppResult<Member> {
        self.repository
            .members
            .find_by_credentials(name, password, role)
            .await?
            .ok_or_else(|| {
                AppError::Authentication(format!("Invalid credentials for {}", role))
            })
    }
}
