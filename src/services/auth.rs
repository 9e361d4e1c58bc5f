use color_eyre::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::db::models::Parent;
use crate::db::Db;
use crate::email::ResendEmailSender;
use crate::names;

// ---------------------------------------------------------------------------
// AuthRepository trait (DIP: service defines the abstraction it needs)
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait AuthRepository: Send + Sync {
    fn find_parent_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<Parent>>> + Send;

    fn create_parent(
        &self,
        email: &str,
        otp: &str,
    ) -> impl std::future::Future<Output = Result<i64>> + Send;

    fn set_parent_otp(
        &self,
        email: &str,
        otp: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

// ---------------------------------------------------------------------------
// EmailSender trait (DIP: service defines the abstraction it needs)
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait EmailSender: Send + Sync {
    /// Whether email sending is configured (false in dev mode).
    fn is_enabled(&self) -> bool;

    fn send_otp_email(
        &self,
        to_email: &str,
        otp: &str,
        is_new_user: bool,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

// ---------------------------------------------------------------------------
// Token claims and outcomes
// ---------------------------------------------------------------------------

/// Bearer token payload: who the caller is, expiring per the configured TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub exp: u64,
}

pub struct IssueOtpOutcome {
    /// True when the parent account was created by this issuance.
    pub is_new_user: bool,
}

pub enum VerifyOtpOutcome {
    /// Code matched. Contains the signed bearer token and the identity it embeds.
    Success { token: String, user: TokenUser },
    UserNotFound,
    InvalidOtp,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenUser {
    pub id: i64,
    pub email: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// AuthService
// ---------------------------------------------------------------------------

pub struct AuthService<R: AuthRepository = Db, E: EmailSender = ResendEmailSender> {
    repo: R,
    email: E,
    jwt_secret: String,
    token_ttl_hours: u64,
}

impl<R: AuthRepository + Clone, E: EmailSender + Clone> Clone for AuthService<R, E> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            email: self.email.clone(),
            jwt_secret: self.jwt_secret.clone(),
            token_ttl_hours: self.token_ttl_hours,
        }
    }
}

impl<R: AuthRepository, E: EmailSender> AuthService<R, E> {
    pub fn new(repo: R, email: E, jwt_secret: String, token_ttl_hours: u64) -> Self {
        Self {
            repo,
            email,
            jwt_secret,
            token_ttl_hours,
        }
    }

    /// Generate a fresh OTP for the email, creating the parent account on
    /// first contact. The stored code is overwritten on every issuance; no
    /// expiry or attempt counter is kept.
    pub async fn issue_otp(&self, email: &str) -> Result<IssueOtpOutcome> {
        let otp = generate_otp();

        let existing = self.repo.find_parent_by_email(email).await?;
        let is_new_user = match existing {
            Some(_) => {
                self.repo.set_parent_otp(email, &otp).await?;
                false
            }
            None => {
                self.repo.create_parent(email, &otp).await?;
                true
            }
        };

        if self.email.is_enabled() {
            self.email.send_otp_email(email, &otp, is_new_user).await?;
        } else {
            tracing::info!("dev mode: OTP for {email} is {otp}");
        }

        Ok(IssueOtpOutcome { is_new_user })
    }

    /// Compare the submitted code against the stored one and issue a bearer
    /// token on an exact match. The code is not invalidated on success, so a
    /// replay succeeds until the next issuance.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<VerifyOtpOutcome> {
        let Some(parent) = self.repo.find_parent_by_email(email).await? else {
            return Ok(VerifyOtpOutcome::UserNotFound);
        };

        if parent.otp.as_deref() != Some(otp) {
            return Ok(VerifyOtpOutcome::InvalidOtp);
        }

        let user = TokenUser {
            id: parent.id,
            email: parent.email,
            role: parent.role,
        };
        let token = self.sign_token(&user)?;

        tracing::info!("parent login verified: id={}, email={}", user.id, user.email);
        Ok(VerifyOtpOutcome::Success { token, user })
    }

    fn sign_token(&self, user: &TokenUser) -> Result<String> {
        let claims = Claims {
            id: user.id,
            email: user.email.clone(),
            role: user.role.clone(),
            exp: jsonwebtoken::get_current_timestamp() + self.token_ttl_hours * 3600,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Decode and validate a bearer token. `None` covers malformed, tampered
    /// and expired tokens alike.
    pub fn verify_token(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .ok()
    }
}

fn generate_otp() -> String {
    let mut rng = rand::thread_rng();
    (0..names::OTP_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parent(otp: Option<&str>) -> Parent {
        Parent {
            id: 7,
            email: "parent@example.com".to_string(),
            otp: otp.map(str::to_string),
            role: "parent".to_string(),
        }
    }

    fn service(mock_repo: MockAuthRepository) -> AuthService<MockAuthRepository, MockEmailSender> {
        let mut mock_email = MockEmailSender::new();
        mock_email.expect_is_enabled().returning(|| false);
        AuthService::new(mock_repo, mock_email, "test-secret".to_string(), 24)
    }

    fn service_with_email(
        mock_repo: MockAuthRepository,
        mock_email: MockEmailSender,
    ) -> AuthService<MockAuthRepository, MockEmailSender> {
        AuthService::new(mock_repo, mock_email, "test-secret".to_string(), 24)
    }

    // ----- issue_otp tests -----

    #[tokio::test]
    async fn issue_otp_creates_parent_on_first_contact() {
        let mut mock = MockAuthRepository::new();
        mock.expect_find_parent_by_email()
            .returning(|_| Box::pin(async { Ok(None) }));
        mock.expect_create_parent()
            .withf(|email, otp| email == "new@example.com" && otp.len() == 6)
            .returning(|_, _| Box::pin(async { Ok(1) }));

        let svc = service(mock);
        let outcome = svc.issue_otp("new@example.com").await.unwrap();

        assert!(outcome.is_new_user);
    }

    #[tokio::test]
    async fn issue_otp_overwrites_code_for_existing_parent() {
        let mut mock = MockAuthRepository::new();
        mock.expect_find_parent_by_email()
            .returning(|_| Box::pin(async { Ok(Some(parent(Some("111111")))) }));
        mock.expect_set_parent_otp()
            .withf(|_, otp| otp.len() == 6 && otp.chars().all(|c| c.is_ascii_digit()))
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let svc = service(mock);
        let outcome = svc.issue_otp("parent@example.com").await.unwrap();

        assert!(!outcome.is_new_user);
    }

    #[tokio::test]
    async fn issue_otp_sends_email_when_configured() {
        let mut mock = MockAuthRepository::new();
        mock.expect_find_parent_by_email()
            .returning(|_| Box::pin(async { Ok(Some(parent(None))) }));
        mock.expect_set_parent_otp()
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let mut mock_email = MockEmailSender::new();
        mock_email.expect_is_enabled().returning(|| true);
        mock_email
            .expect_send_otp_email()
            .withf(|to, _, is_new| to == "parent@example.com" && !is_new)
            .returning(|_, _, _| Box::pin(async { Ok(()) }));

        let svc = service_with_email(mock, mock_email);
        svc.issue_otp("parent@example.com").await.unwrap();
    }

    #[tokio::test]
    async fn issue_otp_email_failure_propagates() {
        let mut mock = MockAuthRepository::new();
        mock.expect_find_parent_by_email()
            .returning(|_| Box::pin(async { Ok(None) }));
        mock.expect_create_parent()
            .returning(|_, _| Box::pin(async { Ok(1) }));

        let mut mock_email = MockEmailSender::new();
        mock_email.expect_is_enabled().returning(|| true);
        mock_email
            .expect_send_otp_email()
            .returning(|_, _, _| Box::pin(async { Err(color_eyre::eyre::eyre!("send failed")) }));

        let svc = service_with_email(mock, mock_email);
        assert!(svc.issue_otp("new@example.com").await.is_err());
    }

    // ----- verify_otp tests -----

    #[tokio::test]
    async fn verify_otp_unknown_email_returns_user_not_found() {
        let mut mock = MockAuthRepository::new();
        mock.expect_find_parent_by_email()
            .returning(|_| Box::pin(async { Ok(None) }));

        let svc = service(mock);
        let outcome = svc.verify_otp("ghost@example.com", "123456").await.unwrap();

        assert!(matches!(outcome, VerifyOtpOutcome::UserNotFound));
    }

    #[tokio::test]
    async fn verify_otp_mismatch_returns_invalid_otp() {
        let mut mock = MockAuthRepository::new();
        mock.expect_find_parent_by_email()
            .returning(|_| Box::pin(async { Ok(Some(parent(Some("123456")))) }));

        let svc = service(mock);
        let outcome = svc.verify_otp("parent@example.com", "654321").await.unwrap();

        assert!(matches!(outcome, VerifyOtpOutcome::InvalidOtp));
    }

    #[tokio::test]
    async fn verify_otp_without_stored_code_returns_invalid_otp() {
        let mut mock = MockAuthRepository::new();
        mock.expect_find_parent_by_email()
            .returning(|_| Box::pin(async { Ok(Some(parent(None))) }));

        let svc = service(mock);
        let outcome = svc.verify_otp("parent@example.com", "123456").await.unwrap();

        assert!(matches!(outcome, VerifyOtpOutcome::InvalidOtp));
    }

    #[tokio::test]
    async fn verify_otp_match_issues_decodable_token() {
        let mut mock = MockAuthRepository::new();
        mock.expect_find_parent_by_email()
            .returning(|_| Box::pin(async { Ok(Some(parent(Some("123456")))) }));

        let svc = service(mock);
        let outcome = svc.verify_otp("parent@example.com", "123456").await.unwrap();

        let VerifyOtpOutcome::Success { token, user } = outcome else {
            panic!("expected success");
        };
        assert_eq!(user.id, 7);
        assert_eq!(user.role, "parent");

        let claims = svc.verify_token(&token).expect("token should verify");
        assert_eq!(claims.id, 7);
        assert_eq!(claims.email, "parent@example.com");
        assert_eq!(claims.role, "parent");
    }

    #[tokio::test]
    async fn verify_otp_is_replayable_until_next_issuance() {
        let mut mock = MockAuthRepository::new();
        mock.expect_find_parent_by_email()
            .returning(|_| Box::pin(async { Ok(Some(parent(Some("123456")))) }));

        let svc = service(mock);
        for _ in 0..2 {
            let outcome = svc.verify_otp("parent@example.com", "123456").await.unwrap();
            assert!(matches!(outcome, VerifyOtpOutcome::Success { .. }));
        }
    }

    // ----- token tests -----

    #[test]
    fn verify_token_rejects_garbage() {
        let svc = service(MockAuthRepository::new());
        assert!(svc.verify_token("not-a-token").is_none());
    }

    #[test]
    fn verify_token_rejects_foreign_secret() {
        let issuing = service(MockAuthRepository::new());
        let token = issuing
            .sign_token(&TokenUser {
                id: 1,
                email: "a@b.com".to_string(),
                role: "parent".to_string(),
            })
            .unwrap();

        let other = AuthService::new(
            MockAuthRepository::new(),
            MockEmailSender::new(),
            "different-secret".to_string(),
            24,
        );
        assert!(other.verify_token(&token).is_none());
    }

    #[test]
    fn generated_otp_is_six_digits() {
        for _ in 0..32 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
