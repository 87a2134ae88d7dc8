use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use serde::Deserialize;

use crate::errors::{Error, Result};
use crate::officers::{NewOfficer, Officer, OfficerRepositoryTrait, OfficerRole, Rank};

/// Work factor for bcrypt. 12 keeps a verify in the tens of
/// milliseconds on current hardware.
pub const BCRYPT_COST: u32 = 12;

const MIN_PASSWORD_LENGTH: usize = 6;
const MIN_OFFICER_CODE_LENGTH: usize = 3;

/// Registration payload. `email` and `role` are optional: email
/// defaults to the force address for the code, role defaults to
/// `Officer`. Every field carries a serde default so an incomplete
/// body reaches [`AuthServiceTrait::signup`] and gets the missing-field
/// validation message rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupRequest {
    pub officer_id: String,
    pub name: String,
    pub password: String,
    pub rank: String,
    pub home_police_station: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[async_trait]
pub trait AuthServiceTrait: Send + Sync {
    async fn signup(&self, request: SignupRequest) -> Result<Officer>;
    /// Credential check by officer code. Failures are uniform so the
    /// response never reveals whether the code exists.
    async fn login(&self, officer_code: &str, password: &str) -> Result<Officer>;
}

#[derive(Clone)]
pub struct AuthService {
    officer_repository: Arc<dyn OfficerRepositoryTrait>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(officer_repository: Arc<dyn OfficerRepositoryTrait>) -> Self {
        Self {
            officer_repository,
            bcrypt_cost: BCRYPT_COST,
        }
    }

    /// Lower the work factor for tests; production wiring keeps the
    /// default.
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }
}

/// Hash on the blocking pool; a bcrypt round is far too slow for an
/// async worker thread.
pub(crate) async fn hash_password(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|err| Error::unexpected(format!("Hashing task failed: {err}")))?
        .map_err(|err| Error::unexpected(format!("Failed to hash password: {err}")))
}

async fn verify_password(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|err| Error::unexpected(format!("Verification task failed: {err}")))?
        .map_err(|err| Error::unexpected(format!("Failed to verify password: {err}")))
}

#[async_trait]
impl AuthServiceTrait for AuthService {
    async fn signup(&self, request: SignupRequest) -> Result<Officer> {
        let officer_code = request.officer_id.trim().to_string();
        let name = request.name.trim().to_string();
        let home_police_station = request.home_police_station.trim().to_string();

        if officer_code.is_empty()
            || name.is_empty()
            || request.password.is_empty()
            || request.rank.trim().is_empty()
            || home_police_station.is_empty()
        {
            return Err(Error::validation(
                "officerId, name, password, rank, and homePoliceStation are required",
            ));
        }
        if request.password.len() < MIN_PASSWORD_LENGTH {
            return Err(Error::validation(
                "Password must be at least 6 characters long",
            ));
        }
        if officer_code.len() < MIN_OFFICER_CODE_LENGTH {
            return Err(Error::validation(
                "Officer ID must be at least 3 characters long",
            ));
        }

        let rank = Rank::parse(request.rank.trim()).ok_or_else(|| {
            let allowed: Vec<&str> = Rank::ALL.iter().map(|rank| rank.as_str()).collect();
            Error::validation(format!("Rank must be one of: {}", allowed.join(", ")))
        })?;

        let role = match request.role.as_deref() {
            None => OfficerRole::Officer,
            Some(value) => OfficerRole::parse(value)
                .ok_or_else(|| Error::validation("Role must be one of: Officer, Supervisor"))?,
        };

        if self
            .officer_repository
            .find_by_code(&officer_code)?
            .is_some()
        {
            return Err(Error::conflict(
                "An officer with this ID is already registered",
            ));
        }

        let email = match request.email.map(|email| email.trim().to_lowercase()) {
            Some(email) if !email.is_empty() => {
                if self.officer_repository.find_by_email(&email)?.is_some() {
                    return Err(Error::conflict(
                        "An officer with this email is already registered",
                    ));
                }
                email
            }
            _ => format!("{}@police.gov.in", officer_code.to_lowercase()),
        };

        let password_hash = hash_password(request.password, self.bcrypt_cost).await?;

        let officer = self
            .officer_repository
            .insert(NewOfficer {
                officer_id: officer_code,
                name,
                email,
                password_hash,
                rank,
                role,
                home_police_station,
            })
            .await?;

        info!(
            "Registered {} {} ({})",
            officer.rank, officer.name, officer.officer_id
        );
        Ok(officer)
    }

    async fn login(&self, officer_code: &str, password: &str) -> Result<Officer> {
        let Some(officer) = self
            .officer_repository
            .find_by_code(officer_code.trim())?
            .filter(|officer| officer.is_active)
        else {
            return Err(Error::unauthorized("Invalid credentials"));
        };

        let matches =
            verify_password(password.to_string(), officer.password_hash.clone()).await?;
        if !matches {
            return Err(Error::unauthorized("Invalid credentials"));
        }

        info!("Officer {} logged in", officer.officer_id);
        Ok(officer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryOfficerRepository;

    /// Cost 4 is the bcrypt minimum; plenty for tests.
    const TEST_COST: u32 = 4;

    fn service() -> (AuthService, Arc<InMemoryOfficerRepository>) {
        let officers = Arc::new(InMemoryOfficerRepository::default());
        let service = AuthService::new(officers.clone()).with_bcrypt_cost(TEST_COST);
        (service, officers)
    }

    fn signup_request(code: &str) -> SignupRequest {
        SignupRequest {
            officer_id: code.to_string(),
            name: "Asha Naik".to_string(),
            password: "password123".to_string(),
            rank: "PSI".to_string(),
            home_police_station: "Panaji Police Station".to_string(),
            email: None,
            role: None,
        }
    }

    #[tokio::test]
    async fn test_signup_defaults_email_and_role() {
        let (service, _officers) = service();

        let officer = service.signup(signup_request("OFF001")).await.unwrap();

        assert_eq!(officer.email, "off001@police.gov.in");
        assert_eq!(officer.role, OfficerRole::Officer);
        assert_eq!(officer.rank, Rank::Psi);
        assert!(officer.is_active);
        assert_ne!(officer.password_hash, "password123");
        assert!(officer.password_hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn test_signup_rejects_short_password_and_code() {
        let (service, _officers) = service();

        let mut request = signup_request("OFF001");
        request.password = "12345".to_string();
        let err = service.signup(request).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("at least 6 characters"));

        let mut request = signup_request("AB");
        request.password = "password123".to_string();
        let err = service.signup(request).await.unwrap_err();
        assert!(err.to_string().contains("at least 3 characters"));
    }

    #[tokio::test]
    async fn test_signup_rejects_unknown_rank_and_role() {
        let (service, _officers) = service();

        let mut request = signup_request("OFF001");
        request.rank = "DGP".to_string();
        let err = service.signup(request).await.unwrap_err();
        assert!(err.to_string().starts_with("Rank must be one of:"));

        let mut request = signup_request("OFF001");
        request.role = Some("Admin".to_string());
        let err = service.signup(request).await.unwrap_err();
        assert_eq!(err.to_string(), "Role must be one of: Officer, Supervisor");
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicate_code_and_email() {
        let (service, _officers) = service();
        service.signup(signup_request("OFF001")).await.unwrap();

        let err = service.signup(signup_request("OFF001")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        let mut request = signup_request("OFF002");
        request.email = Some("off001@police.gov.in".to_string());
        let err = service.signup(request).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert!(err.to_string().contains("email"));
    }

    #[tokio::test]
    async fn test_login_accepts_the_registered_password() {
        let (service, _officers) = service();
        service.signup(signup_request("OFF001")).await.unwrap();

        let officer = service.login("OFF001", "password123").await.unwrap();
        assert_eq!(officer.officer_id, "OFF001");
    }

    #[tokio::test]
    async fn test_login_failures_all_look_the_same() {
        let (service, officers) = service();
        service.signup(signup_request("OFF001")).await.unwrap();

        let wrong_password = service.login("OFF001", "hunter2").await.unwrap_err();
        let unknown_code = service.login("GHOST99", "password123").await.unwrap_err();
        assert_eq!(wrong_password.to_string(), "Invalid credentials");
        assert_eq!(unknown_code.to_string(), "Invalid credentials");
        assert!(matches!(wrong_password, Error::Unauthorized(_)));
        assert!(matches!(unknown_code, Error::Unauthorized(_)));

        officers.deactivate("OFF001");
        let deactivated = service.login("OFF001", "password123").await.unwrap_err();
        assert_eq!(deactivated.to_string(), "Invalid credentials");
    }
}
