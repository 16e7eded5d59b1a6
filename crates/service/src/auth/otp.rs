//! One-time codes: issuance, delivery, and verification.
//!
//! Codes live in a TTL-bounded in-process cache keyed by (purpose, phone). A successful
//! verification consumes the code; too many failures discard it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::ops::compute::Op;
use rand::Rng;
use serde::Serialize;
use subtle::ConstantTimeEq;
use tracing::{info, warn, instrument};

use super::errors::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OtpPurpose {
    Register,
    ResetPin,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpPurpose::Register => "register",
            OtpPurpose::ResetPin => "reset_pin",
        }
    }
}

/// Delivers a text message to a phone number.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send(&self, phone_number: &str, text: &str) -> Result<(), AuthError>;
}

/// Development gateway: writes the message to the log instead of sending it.
pub struct LogSmsGateway;

#[async_trait]
impl SmsGateway for LogSmsGateway {
    async fn send(&self, phone_number: &str, text: &str) -> Result<(), AuthError> {
        info!(phone = %phone_number, text = %text, event = "sms_logged", "sms gateway not configured");
        Ok(())
    }
}

/// Gateway posting `{to, from, text}` as JSON to a provider endpoint.
pub struct HttpSmsGateway {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    sender: String,
}

#[derive(Serialize)]
struct SmsRequest<'a> {
    to: &'a str,
    from: &'a str,
    text: &'a str,
}

impl HttpSmsGateway {
    pub fn new(endpoint: String, api_key: Option<String>, sender: String, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Delivery(e.to_string()))?;
        Ok(Self { client, endpoint, api_key, sender })
    }
}

#[async_trait]
impl SmsGateway for HttpSmsGateway {
    async fn send(&self, phone_number: &str, text: &str) -> Result<(), AuthError> {
        let mut req = self.client.post(&self.endpoint).json(&SmsRequest { to: phone_number, from: &self.sender, text });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await.map_err(|e| AuthError::Delivery(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(AuthError::Delivery(format!("gateway responded with {}", resp.status())));
        }
        Ok(())
    }
}

/// Pick the HTTP gateway when an endpoint is configured, the logging one otherwise.
pub fn gateway_from_settings(settings: &configs::SmsSettings) -> Result<Arc<dyn SmsGateway>, AuthError> {
    match &settings.endpoint {
        Some(endpoint) => Ok(Arc::new(HttpSmsGateway::new(
            endpoint.clone(),
            settings.api_key.clone(),
            settings.sender.clone(),
            Duration::from_secs(settings.timeout_secs),
        )?)),
        None => Ok(Arc::new(LogSmsGateway)),
    }
}

#[derive(Debug, Clone)]
pub struct OtpConfig {
    pub code_length: usize,
    pub ttl: Duration,
    pub max_attempts: u32,
}

impl From<&configs::OtpSettings> for OtpConfig {
    fn from(s: &configs::OtpSettings) -> Self {
        Self { code_length: s.code_length, ttl: Duration::from_secs(s.ttl_secs), max_attempts: s.max_attempts }
    }
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self { code_length: 6, ttl: Duration::from_secs(300), max_attempts: 5 }
    }
}

#[derive(Debug, Clone)]
struct PendingOtp {
    code: String,
    failed_attempts: u32,
    issued_at: Instant,
}

pub struct OtpManager {
    codes: Cache<(OtpPurpose, String), PendingOtp>,
    cfg: OtpConfig,
    gateway: Arc<dyn SmsGateway>,
}

fn generate_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect()
}

impl OtpManager {
    pub fn new(cfg: OtpConfig, gateway: Arc<dyn SmsGateway>) -> Self {
        let codes = Cache::builder()
            .max_capacity(100_000)
            .time_to_live(cfg.ttl)
            .build();
        Self { codes, cfg, gateway }
    }

    /// Generate a fresh code (replacing any pending one) and deliver it.
    #[instrument(skip(self), fields(purpose = purpose.as_str()))]
    pub async fn issue(&self, purpose: OtpPurpose, phone_number: &str) -> Result<(), AuthError> {
        let code = generate_code(self.cfg.code_length);
        let key = (purpose, phone_number.to_string());
        self.codes
            .insert(key.clone(), PendingOtp { code: code.clone(), failed_attempts: 0, issued_at: Instant::now() })
            .await;

        let text = format!("Your verification code: {}", code);
        if let Err(e) = self.gateway.send(phone_number, &text).await {
            self.codes.invalidate(&key).await;
            warn!(error = %e, event = "otp_delivery_failed", "could not deliver otp");
            return Err(e);
        }
        info!(event = "otp_issued", "otp issued");
        Ok(())
    }

    /// Check `code` against the pending one. Success consumes it.
    ///
    /// The whole check runs under moka's per-key entry lock, so concurrent guesses for the
    /// same phone are counted one after another.
    #[instrument(skip(self, code), fields(purpose = purpose.as_str()))]
    pub async fn verify(&self, purpose: OtpPurpose, phone_number: &str, code: &str) -> Result<(), AuthError> {
        let key = (purpose, phone_number.to_string());
        let ttl = self.cfg.ttl;
        let max_attempts = self.cfg.max_attempts;
        let mut verdict = Verdict::Missing;

        self.codes
            .entry(key)
            .and_compute_with(|entry| {
                let op = match entry.map(|e| e.into_value()) {
                    None => Op::Nop,
                    // a Put after a failure resets the cache ttl, so expiry is checked here too
                    Some(pending) if pending.issued_at.elapsed() > ttl => {
                        verdict = Verdict::Expired;
                        Op::Remove
                    }
                    Some(pending) if codes_match(&pending.code, code) => {
                        verdict = Verdict::Accepted;
                        Op::Remove
                    }
                    Some(mut pending) => {
                        pending.failed_attempts += 1;
                        if pending.failed_attempts >= max_attempts {
                            verdict = Verdict::Discarded;
                            Op::Remove
                        } else {
                            verdict = Verdict::Rejected;
                            Op::Put(pending)
                        }
                    }
                };
                std::future::ready(op)
            })
            .await;

        match verdict {
            Verdict::Accepted => {
                info!(event = "otp_verified", "otp verified");
                Ok(())
            }
            Verdict::Discarded => {
                warn!(event = "otp_discarded", "too many failed otp attempts");
                Err(AuthError::InvalidOtp)
            }
            Verdict::Missing | Verdict::Expired | Verdict::Rejected => Err(AuthError::InvalidOtp),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Missing,
    Expired,
    Accepted,
    Rejected,
    Discarded,
}

fn codes_match(expected: &str, given: &str) -> bool {
    expected.as_bytes().ct_eq(given.as_bytes()).into()
}

/// Recording gateway for tests and doc examples.
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingSmsGateway {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSmsGateway {
        /// Digits of the last message sent to `phone_number`.
        pub fn last_code_for(&self, phone_number: &str) -> Option<String> {
            let sent = self.sent.lock().ok()?;
            sent.iter()
                .rev()
                .find(|(to, _)| to == phone_number)
                .map(|(_, text)| text.chars().filter(|c| c.is_ascii_digit()).collect())
        }

        pub fn sent_count(&self) -> usize {
            self.sent.lock().map(|s| s.len()).unwrap_or(0)
        }
    }

    #[async_trait]
    impl SmsGateway for RecordingSmsGateway {
        async fn send(&self, phone_number: &str, text: &str) -> Result<(), AuthError> {
            let mut sent = self.sent.lock().map_err(|_| AuthError::Delivery("recorder lock poisoned".into()))?;
            sent.push((phone_number.to_string(), text.to_string()));
            Ok(())
        }
    }

    /// Gateway that always fails delivery.
    pub struct FailingSmsGateway;

    #[async_trait]
    impl SmsGateway for FailingSmsGateway {
        async fn send(&self, _phone_number: &str, _text: &str) -> Result<(), AuthError> {
            Err(AuthError::Delivery("gateway unavailable".into()))
        }
    }
}
