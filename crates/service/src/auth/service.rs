use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use rand::rngs::OsRng;
use tracing::{info, debug, warn, instrument};

use super::domain::{RegisterInput, LoginInput, AuthUser, AuthSession, NewUser};
use super::errors::AuthError;
use super::otp::{OtpManager, OtpPurpose};
use super::repository::AuthRepository;
use super::token::{Claims, TokenIssuer, TokenKind};

pub const PIN_LENGTH: usize = 4;
/// Width of the `phone_number` column.
pub const PHONE_MAX_LENGTH: usize = 32;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
    pub default_avatar_url: String,
    /// Where per-user avatars are provisioned; `None` always uses `default_avatar_url`.
    pub uploads: Option<configs::UploadsConfig>,
}

impl AuthConfig {
    pub fn from_app(cfg: &configs::AppConfig) -> Self {
        Self {
            jwt_secret: cfg.auth.jwt_secret.clone(),
            access_ttl_secs: cfg.auth.access_ttl_secs,
            refresh_ttl_secs: cfg.auth.refresh_ttl_secs,
            default_avatar_url: cfg.auth.default_avatar_url.clone(),
            uploads: Some(cfg.uploads.clone()),
        }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository + ?Sized> {
    repo: Arc<R>,
    cfg: AuthConfig,
    tokens: TokenIssuer,
    otp: OtpManager,
}

fn validate_phone(phone_number: &str) -> Result<(), AuthError> {
    if phone_number.trim().is_empty() {
        return Err(AuthError::Validation("phone number required".into()));
    }
    if phone_number.chars().count() > PHONE_MAX_LENGTH {
        return Err(AuthError::Validation(format!("phone number must be at most {} characters", PHONE_MAX_LENGTH)));
    }
    Ok(())
}

fn validate_pin(pin: &str) -> Result<(), AuthError> {
    if pin.chars().count() != PIN_LENGTH {
        return Err(AuthError::Validation(format!("pin must be exactly {} characters", PIN_LENGTH)));
    }
    Ok(())
}

fn hash_pin(pin: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

impl<R: AuthRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig, otp: OtpManager) -> Self {
        let tokens = TokenIssuer::new(&cfg.jwt_secret, cfg.access_ttl_secs, cfg.refresh_ttl_secs);
        Self { repo, cfg, tokens, otp }
    }

    fn session(&self, user: AuthUser) -> Result<AuthSession, AuthError> {
        let pair = self.tokens.issue_pair(user.id)?;
        Ok(AuthSession { user, access_token: pair.access_token, refresh_token: pair.refresh_token })
    }

    /// Register a new user with a hashed pin and return a fresh token pair.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::otp::{OtpManager, OtpConfig, LogSmsGateway};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let cfg = AuthConfig { jwt_secret: "secret".into(), access_ttl_secs: 60, refresh_ttl_secs: 120, default_avatar_url: "/uploads/defaultAvatar.jpg".into(), uploads: None };
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()), cfg, OtpManager::new(OtpConfig::default(), Arc::new(LogSmsGateway)));
    /// let input = RegisterInput { phone_number: "70000000001".into(), name: "Test".into(), pin: "1234".into() };
    /// let session = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(session.user.balance, 0.0);
    /// assert_eq!(session.user.picture, "/uploads/defaultAvatar.jpg");
    /// ```
    #[instrument(skip(self, input), fields(phone = %input.phone_number))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        self.check_registrable(&input).await?;

        // the per-user copy is only made once the row exists
        let own_avatar = match &self.cfg.uploads {
            Some(uploads) => crate::uploads::user_avatar_url(uploads, &input.phone_number).await,
            None => None,
        };
        let picture = own_avatar.clone().unwrap_or_else(|| self.cfg.default_avatar_url.clone());

        let pin_hash = hash_pin(&input.pin)?;
        let mut user = self.repo
            .create_user(NewUser { phone_number: input.phone_number, name: input.name, picture, pin_hash })
            .await?;

        if let (Some(uploads), Some(_)) = (&self.cfg.uploads, own_avatar) {
            if let Err(e) = crate::uploads::copy_default_avatar(uploads, &user.phone_number).await {
                warn!(user_id = %user.id, error = %e, "avatar copy failed, using shared default");
                self.repo.update_picture(user.id, self.cfg.default_avatar_url.clone()).await?;
                user.picture = self.cfg.default_avatar_url.clone();
            }
        }
        info!(user_id = %user.id, event = "user_registered", "user registered");
        self.session(user)
    }

    async fn check_registrable(&self, input: &RegisterInput) -> Result<(), AuthError> {
        validate_phone(&input.phone_number)?;
        validate_pin(&input.pin)?;
        if input.name.trim().is_empty() {
            return Err(AuthError::Validation("name required".into()));
        }
        if let Some(existing) = self.repo.find_user_by_phone(&input.phone_number).await? {
            debug!("user exists: {}", existing.id);
            return Err(AuthError::Conflict);
        }
        Ok(())
    }

    /// Authenticate by phone and pin.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::otp::{OtpManager, OtpConfig, LogSmsGateway};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let cfg = AuthConfig { jwt_secret: "secret".into(), access_ttl_secs: 60, refresh_ttl_secs: 120, default_avatar_url: "/a.jpg".into(), uploads: None };
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()), cfg, OtpManager::new(OtpConfig::default(), Arc::new(LogSmsGateway)));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { phone_number: "70000000002".into(), name: "N".into(), pin: "4321".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { phone_number: "70000000002".into(), pin: "4321".into() })).unwrap();
    /// assert_eq!(session.user.phone_number, "70000000002");
    /// assert!(!session.access_token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(phone = %input.phone_number))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_phone(&input.phone_number)
            .await?
            .ok_or(AuthError::NotFound)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.pin_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.pin.as_bytes(), &parsed).is_err() {
            info!(user_id = %user.id, event = "login_rejected", "pin mismatch");
            return Err(AuthError::Unauthorized);
        }

        info!(user_id = %user.id, event = "login", "user logged in");
        self.session(user)
    }

    /// Send a PIN-reset code to a registered phone.
    #[instrument(skip(self))]
    pub async fn send_otp(&self, phone_number: &str) -> Result<(), AuthError> {
        validate_phone(phone_number)?;
        self.repo.find_user_by_phone(phone_number).await?.ok_or(AuthError::NotFound)?;
        self.otp.issue(OtpPurpose::ResetPin, phone_number).await
    }

    /// Send a registration code to a phone that is not registered yet.
    #[instrument(skip(self))]
    pub async fn send_registration_otp(&self, phone_number: &str) -> Result<(), AuthError> {
        validate_phone(phone_number)?;
        if self.repo.find_user_by_phone(phone_number).await?.is_some() {
            return Err(AuthError::Conflict);
        }
        self.otp.issue(OtpPurpose::Register, phone_number).await
    }

    /// Verify a PIN-reset code and store the new pin.
    #[instrument(skip(self, otp, new_pin))]
    pub async fn verify_otp_and_set_new_pin(&self, phone_number: &str, otp: &str, new_pin: &str) -> Result<(), AuthError> {
        validate_pin(new_pin)?;
        let user = self.repo.find_user_by_phone(phone_number).await?.ok_or(AuthError::NotFound)?;
        self.otp.verify(OtpPurpose::ResetPin, phone_number, otp).await?;
        let pin_hash = hash_pin(new_pin)?;
        self.repo.update_pin(user.id, pin_hash).await?;
        info!(user_id = %user.id, event = "pin_reset", "pin updated");
        Ok(())
    }

    /// Verify a registration code, then register.
    ///
    /// The code is left pending when the input would be rejected anyway.
    #[instrument(skip(self, input, otp), fields(phone = %input.phone_number))]
    pub async fn verify_otp_and_register(&self, input: RegisterInput, otp: &str) -> Result<AuthSession, AuthError> {
        self.check_registrable(&input).await?;
        self.otp.verify(OtpPurpose::Register, &input.phone_number, otp).await?;
        self.register(input).await
    }

    pub async fn check_user_exists(&self, phone_number: &str) -> Result<bool, AuthError> {
        Ok(self.repo.find_user_by_phone(phone_number).await?.is_some())
    }

    /// Exchange a refresh token for a new pair.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        if refresh_token.trim().is_empty() {
            return Err(AuthError::Validation("refresh token required".into()));
        }
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;
        let user = self.repo.find_user_by_id(claims.id).await?.ok_or(AuthError::NotFound)?;
        self.session(user)
    }

    /// Validate a bearer access token.
    pub fn authenticate(&self, access_token: &str) -> Result<Claims, AuthError> {
        self.tokens.verify(access_token, TokenKind::Access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::otp::{mock::RecordingSmsGateway, OtpConfig};
    use crate::auth::repository::mock::MockAuthRepository;

    fn service() -> (AuthService<MockAuthRepository>, Arc<RecordingSmsGateway>) {
        let gw = Arc::new(RecordingSmsGateway::default());
        let cfg = AuthConfig {
            jwt_secret: "test-secret".into(),
            access_ttl_secs: 60,
            refresh_ttl_secs: 120,
            default_avatar_url: "/uploads/defaultAvatar.jpg".into(),
            uploads: None,
        };
        let svc = AuthService::new(Arc::new(MockAuthRepository::default()), cfg, OtpManager::new(OtpConfig::default(), gw.clone()));
        (svc, gw)
    }

    fn reg(phone: &str, pin: &str) -> RegisterInput {
        RegisterInput { phone_number: phone.into(), name: "Test".into(), pin: pin.into() }
    }

    fn cfg_with_uploads(uploads: &configs::UploadsConfig) -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".into(),
            access_ttl_secs: 60,
            refresh_ttl_secs: 120,
            default_avatar_url: "/uploads/defaultAvatar.jpg".into(),
            uploads: Some(uploads.clone()),
        }
    }

    async fn uploads_with_template() -> configs::UploadsConfig {
        let dir = std::env::temp_dir().join(format!("carwash-auth-uploads-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join(crate::uploads::DEFAULT_AVATAR_FILE), b"template").await.unwrap();
        configs::UploadsConfig { dir: dir.to_string_lossy().into_owned(), public_prefix: "/uploads".into() }
    }

    /// Never sees existing users, so duplicates are only caught by `create_user`.
    #[derive(Default)]
    struct StaleLookupRepository(MockAuthRepository);

    #[async_trait::async_trait]
    impl AuthRepository for StaleLookupRepository {
        async fn find_user_by_phone(&self, _: &str) -> Result<Option<AuthUser>, AuthError> { Ok(None) }
        async fn find_user_by_id(&self, id: uuid::Uuid) -> Result<Option<AuthUser>, AuthError> { self.0.find_user_by_id(id).await }
        async fn create_user(&self, input: NewUser) -> Result<AuthUser, AuthError> { self.0.create_user(input).await }
        async fn get_credentials(&self, user_id: uuid::Uuid) -> Result<Option<crate::auth::domain::Credentials>, AuthError> {
            self.0.get_credentials(user_id).await
        }
        async fn update_pin(&self, user_id: uuid::Uuid, pin_hash: String) -> Result<(), AuthError> { self.0.update_pin(user_id, pin_hash).await }
        async fn update_picture(&self, user_id: uuid::Uuid, picture: String) -> Result<(), AuthError> {
            self.0.update_picture(user_id, picture).await
        }
    }

    #[tokio::test]
    async fn register_twice_conflicts() {
        let (svc, _) = service();
        let first = svc.register(reg("70000000001", "1234")).await.unwrap();
        assert_eq!(first.user.balance, 0.0);
        assert_eq!(first.user.cashback, 0.0);
        assert!(svc.check_user_exists("70000000001").await.unwrap());
        assert!(!svc.check_user_exists("70000000009").await.unwrap());

        let second = svc.register(reg("70000000001", "1234")).await;
        assert!(matches!(second, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn login_issues_tokens_for_same_user() {
        let (svc, _) = service();
        let created = svc.register(reg("70000000002", "1234")).await.unwrap();
        let session = svc.login(LoginInput { phone_number: "70000000002".into(), pin: "1234".into() }).await.unwrap();
        assert_eq!(session.user.id, created.user.id);
        assert_eq!(svc.authenticate(&session.access_token).unwrap().id, created.user.id);

        let json = serde_json::to_value(&session).unwrap();
        assert!(json["user"].get("pin").is_none());
        assert!(json.get("accessToken").is_some());
    }

    #[tokio::test]
    async fn login_failures() {
        let (svc, _) = service();
        svc.register(reg("70000000003", "1234")).await.unwrap();
        let wrong = svc.login(LoginInput { phone_number: "70000000003".into(), pin: "0000".into() }).await;
        assert!(matches!(wrong, Err(AuthError::Unauthorized)));
        let unknown = svc.login(LoginInput { phone_number: "79999999999".into(), pin: "1234".into() }).await;
        assert!(matches!(unknown, Err(AuthError::NotFound)));
    }

    #[tokio::test]
    async fn pin_length_enforced() {
        let (svc, _) = service();
        assert!(matches!(svc.register(reg("70000000004", "123")).await, Err(AuthError::Validation(_))));
        assert!(matches!(svc.register(reg("70000000004", "12345")).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn pin_reset_via_otp() {
        let (svc, gw) = service();
        svc.register(reg("70000000005", "1234")).await.unwrap();

        assert!(matches!(svc.send_otp("70000000077").await, Err(AuthError::NotFound)));
        svc.send_otp("70000000005").await.unwrap();
        let code = gw.last_code_for("70000000005").unwrap();

        let bad = svc.verify_otp_and_set_new_pin("70000000005", "nope", "5678").await;
        assert!(matches!(bad, Err(AuthError::InvalidOtp)));

        svc.verify_otp_and_set_new_pin("70000000005", &code, "5678").await.unwrap();
        assert!(svc.login(LoginInput { phone_number: "70000000005".into(), pin: "5678".into() }).await.is_ok());
        assert!(svc.login(LoginInput { phone_number: "70000000005".into(), pin: "1234".into() }).await.is_err());
    }

    #[tokio::test]
    async fn register_via_otp() {
        let (svc, gw) = service();
        svc.send_registration_otp("70000000006").await.unwrap();
        let code = gw.last_code_for("70000000006").unwrap();

        assert!(matches!(svc.verify_otp_and_register(reg("70000000006", "1234"), "000").await, Err(AuthError::InvalidOtp)));
        let session = svc.verify_otp_and_register(reg("70000000006", "1234"), &code).await.unwrap();
        assert_eq!(session.user.phone_number, "70000000006");

        assert!(matches!(svc.send_registration_otp("70000000006").await, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn registration_code_survives_conflict() {
        let (svc, gw) = service();
        svc.send_registration_otp("70000000008").await.unwrap();
        let code = gw.last_code_for("70000000008").unwrap();
        svc.register(reg("70000000008", "1234")).await.unwrap();

        let dup = svc.verify_otp_and_register(reg("70000000008", "1234"), &code).await;
        assert!(matches!(dup, Err(AuthError::Conflict)));
        let bad_pin = svc.verify_otp_and_register(reg("70000000008", "12"), &code).await;
        assert!(matches!(bad_pin, Err(AuthError::Validation(_))));

        // still pending after both rejections
        svc.otp.verify(OtpPurpose::Register, "70000000008", &code).await.unwrap();
    }

    #[tokio::test]
    async fn phone_length_is_bounded() {
        let (svc, _) = service();
        let long = "7".repeat(PHONE_MAX_LENGTH + 1);
        assert!(matches!(svc.register(reg(&long, "1234")).await, Err(AuthError::Validation(_))));
        assert!(matches!(svc.send_registration_otp(&long).await, Err(AuthError::Validation(_))));
        assert!(svc.register(reg(&"7".repeat(PHONE_MAX_LENGTH), "1234")).await.is_ok());
    }

    #[tokio::test]
    async fn own_avatar_copied_after_registration() {
        let uploads = uploads_with_template().await;
        let svc = AuthService::new(
            Arc::new(MockAuthRepository::default()),
            cfg_with_uploads(&uploads),
            OtpManager::new(OtpConfig::default(), Arc::new(crate::auth::otp::LogSmsGateway)),
        );

        let session = svc.register(reg("70000000010", "1234")).await.unwrap();
        assert_eq!(session.user.picture, "/uploads/users/70000000010/avatar.jpg");
        let copied = std::path::Path::new(&uploads.dir).join("users/70000000010/avatar.jpg");
        assert_eq!(tokio::fs::read(copied).await.unwrap(), b"template");

        tokio::fs::remove_dir_all(&uploads.dir).await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_insert_keeps_existing_avatar() {
        let uploads = uploads_with_template().await;
        let repo = Arc::new(StaleLookupRepository::default());
        let svc = AuthService::new(
            repo.clone(),
            cfg_with_uploads(&uploads),
            OtpManager::new(OtpConfig::default(), Arc::new(crate::auth::otp::LogSmsGateway)),
        );
        svc.register(reg("70000000011", "1234")).await.unwrap();
        let avatar = std::path::Path::new(&uploads.dir).join("users/70000000011/avatar.jpg");
        tokio::fs::write(&avatar, b"uploaded by owner").await.unwrap();

        let dup = svc.register(reg("70000000011", "4321")).await;
        assert!(matches!(dup, Err(AuthError::Conflict)));
        assert_eq!(tokio::fs::read(&avatar).await.unwrap(), b"uploaded by owner");

        tokio::fs::remove_dir_all(&uploads.dir).await.unwrap();
    }

    #[tokio::test]
    async fn failed_avatar_copy_falls_back_to_shared_default() {
        let uploads = uploads_with_template().await;
        // a plain file where the user's folder should go
        let users = std::path::Path::new(&uploads.dir).join("users");
        tokio::fs::create_dir_all(&users).await.unwrap();
        tokio::fs::write(users.join("70000000012"), b"").await.unwrap();

        let repo = Arc::new(MockAuthRepository::default());
        let svc = AuthService::new(
            repo.clone(),
            cfg_with_uploads(&uploads),
            OtpManager::new(OtpConfig::default(), Arc::new(crate::auth::otp::LogSmsGateway)),
        );
        let session = svc.register(reg("70000000012", "1234")).await.unwrap();
        assert_eq!(session.user.picture, "/uploads/defaultAvatar.jpg");
        let stored = repo.find_user_by_phone("70000000012").await.unwrap().unwrap();
        assert_eq!(stored.picture, "/uploads/defaultAvatar.jpg");

        tokio::fs::remove_dir_all(&uploads.dir).await.unwrap();
    }

    #[tokio::test]
    async fn refresh_accepts_only_refresh_tokens() {
        let (svc, _) = service();
        let session = svc.register(reg("70000000007", "1234")).await.unwrap();

        let renewed = svc.refresh(&session.refresh_token).await.unwrap();
        assert_eq!(renewed.user.id, session.user.id);

        assert!(matches!(svc.refresh(&session.access_token).await, Err(AuthError::InvalidToken)));
        assert!(matches!(svc.refresh("").await, Err(AuthError::Validation(_))));
        assert!(matches!(svc.authenticate(&session.refresh_token), Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn refresh_for_vanished_user_is_not_found() {
        let (svc, _) = service();
        let orphan = svc.tokens.issue(uuid::Uuid::new_v4(), TokenKind::Refresh).unwrap();
        assert!(matches!(svc.refresh(&orphan).await, Err(AuthError::NotFound)));
    }
}
