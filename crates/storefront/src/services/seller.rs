//! Seller onboarding and moderation.
//!
//! An applicant works through three independent steps (profile, sample
//! upload, payout setup) in any order. Finishing the last one queues the
//! application for approval. Admins approve, block and unblock by email.
//!
//! The application lives inside the session document, so every step is one
//! read-modify-write of the `user` key followed by `user-updated`.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use soundsync_core::Email;

use crate::config::SimulatedDelays;
use crate::events::Signal;
use crate::models::seller::ALLOWED_UPLOAD_EXTENSIONS;
use crate::models::{
    PayoutDetails, PayoutMethod, SellerApplication, SellerProfile, SellerStage, TaxFormKind,
    UploadedFile,
};
use crate::services::missing_fields_message;
use crate::store::{Storage, StoreError, keys};

/// Errors that can occur during seller onboarding.
#[derive(Debug, Error)]
pub enum SellerError {
    #[error("sign in to apply as a seller")]
    NotSignedIn,

    #[error("seller account is blocked")]
    Blocked,

    #[error("a different user signed in before the step finished")]
    SessionChanged,

    #[error("{0}")]
    Validation(String),

    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("jurisdiction {jurisdiction} requires tax form {expected}")]
    TaxFormMismatch {
        jurisdiction: String,
        expected: &'static str,
    },

    #[error("no seller application for {0}")]
    ApplicantNotFound(Email),

    #[error("application has not completed every onboarding step")]
    NotReadyForApproval,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Sample upload request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadForm {
    pub file_name: String,
    #[serde(default)]
    pub size_bytes: u64,
}

/// Payout setup request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentForm {
    pub method: PayoutMethod,
    pub account: String,
    pub jurisdiction: String,
    pub tax_form: TaxFormKind,
    pub legal_name: String,
    pub tax_id: String,
}

impl PaymentForm {
    fn validate(&self) -> Result<(), SellerError> {
        let mut missing = Vec::new();
        if self.account.trim().is_empty() {
            missing.push("account");
        }
        if self.jurisdiction.trim().is_empty() {
            missing.push("jurisdiction");
        }
        if self.legal_name.trim().is_empty() {
            missing.push("legalName");
        }
        if self.tax_id.trim().is_empty() {
            missing.push("taxId");
        }
        if !missing.is_empty() {
            return Err(SellerError::Validation(missing_fields_message(&missing)));
        }

        let expected = TaxFormKind::required_for(&self.jurisdiction);
        if self.tax_form != expected {
            return Err(SellerError::TaxFormMismatch {
                jurisdiction: self.jurisdiction.trim().to_uppercase(),
                expected: tax_form_label(expected),
            });
        }
        Ok(())
    }

    fn into_details(self) -> PayoutDetails {
        let tax_id = self.tax_id.trim();
        let skip = tax_id.chars().count().saturating_sub(4);
        PayoutDetails {
            method: self.method,
            account: self.account.trim().to_owned(),
            jurisdiction: self.jurisdiction.trim().to_uppercase(),
            tax_form: self.tax_form,
            legal_name: self.legal_name.trim().to_owned(),
            tax_id_last4: tax_id.chars().skip(skip).collect(),
        }
    }
}

const fn tax_form_label(form: TaxFormKind) -> &'static str {
    match form {
        TaxFormKind::W9 => "W-9",
        TaxFormKind::W8Ben => "W-8BEN",
    }
}

/// The seller tab's view of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerStatus {
    pub stage: SellerStage,
    pub application: SellerApplication,
}

impl SellerStatus {
    fn of(application: &SellerApplication) -> Self {
        Self {
            stage: application.stage(),
            application: application.clone(),
        }
    }

    fn ensure_not_blocked(&self) -> Result<(), SellerError> {
        if self.stage == SellerStage::Blocked {
            Err(SellerError::Blocked)
        } else {
            Ok(())
        }
    }
}

/// Service for the signed-in user's seller application.
pub struct SellerService<'a> {
    storage: &'a Storage,
    delays: SimulatedDelays,
}

impl<'a> SellerService<'a> {
    /// Create a seller service with the given simulated latencies.
    #[must_use]
    pub const fn new(storage: &'a Storage, delays: SimulatedDelays) -> Self {
        Self { storage, delays }
    }

    /// The signed-in user's application and its stage.
    ///
    /// # Errors
    ///
    /// Returns `SellerError::NotSignedIn` when nobody is signed in.
    pub fn status(&self) -> Result<SellerStatus, SellerError> {
        let session = self
            .storage
            .read(keys::USER)?
            .filter(|session| session.signed_in)
            .ok_or(SellerError::NotSignedIn)?;
        Ok(SellerStatus::of(&session.seller.unwrap_or_default()))
    }

    /// Email of the signed-in applicant, refusing blocked sellers.
    fn applicant(&self) -> Result<Email, SellerError> {
        let session = self
            .storage
            .read(keys::USER)?
            .filter(|session| session.signed_in)
            .ok_or(SellerError::NotSignedIn)?;
        SellerStatus::of(&session.seller.unwrap_or_default()).ensure_not_blocked()?;
        Ok(session.email)
    }

    /// Step one: save the artist profile.
    ///
    /// # Errors
    ///
    /// Returns `SellerError::Validation` if required fields are blank.
    #[instrument(skip(self, profile))]
    pub fn submit_profile(&self, profile: SellerProfile) -> Result<SellerStatus, SellerError> {
        let missing = profile.missing_fields();
        if !missing.is_empty() {
            return Err(SellerError::Validation(missing_fields_message(&missing)));
        }
        let applicant = self.applicant()?;

        self.step(&applicant, |application, _| {
            application.profile = Some(profile);
            application.profile_submitted = true;
        })
    }

    /// Step two: upload a sample, taking the configured upload time.
    ///
    /// # Errors
    ///
    /// Returns `SellerError::UnsupportedFile` for a file that is not audio
    /// or a zip archive.
    #[instrument(skip(self, form), fields(file = %form.file_name))]
    pub async fn upload(&self, form: UploadForm) -> Result<SellerStatus, SellerError> {
        let file_name = form.file_name.trim().to_owned();
        if file_name.is_empty() {
            return Err(SellerError::Validation(missing_fields_message(&["fileName"])));
        }
        if !is_allowed_upload(&file_name) {
            return Err(SellerError::UnsupportedFile(file_name));
        }
        let applicant = self.applicant()?;

        sleep(self.delays.upload).await;

        self.step(&applicant, |application, now| {
            application.uploads.push(UploadedFile {
                file_name,
                size_bytes: form.size_bytes,
                uploaded_at: now,
            });
            application.upload_done = true;
        })
    }

    /// Step three: save payout details, taking the configured setup time.
    ///
    /// # Errors
    ///
    /// Returns `SellerError::Validation` for blank fields and
    /// `SellerError::TaxFormMismatch` when the form does not match the
    /// jurisdiction.
    #[instrument(skip(self, form), fields(method = ?form.method))]
    pub async fn submit_payment(&self, form: PaymentForm) -> Result<SellerStatus, SellerError> {
        form.validate()?;
        let applicant = self.applicant()?;

        sleep(self.delays.payment).await;

        let details = form.into_details();
        self.step(&applicant, |application, _| {
            application.payout = Some(details);
            application.payment_done = true;
        })
    }

    /// Approve a completed application.
    ///
    /// # Errors
    ///
    /// Returns `SellerError::ApplicantNotFound` if `email` has no application
    /// and `SellerError::NotReadyForApproval` unless it is awaiting approval.
    #[instrument(skip(self, email), fields(email = %email))]
    pub fn approve(&self, email: &Email) -> Result<SellerStatus, SellerError> {
        let status = self.moderate(email, |application, now| {
            if !application.awaiting_approval() {
                return Err(SellerError::NotReadyForApproval);
            }
            application.approve(now);
            Ok(())
        })?;
        tracing::info!("Seller approved");
        Ok(status)
    }

    /// Block a seller. Blocking wins over every other stage.
    ///
    /// # Errors
    ///
    /// Returns `SellerError::ApplicantNotFound` if `email` has no application.
    #[instrument(skip(self, email), fields(email = %email))]
    pub fn block(&self, email: &Email) -> Result<SellerStatus, SellerError> {
        let status = self.moderate(email, |application, _| {
            application.blocked = true;
            Ok(())
        })?;
        tracing::warn!("Seller blocked");
        Ok(status)
    }

    /// Lift a block; the application returns to the stage its flags give.
    ///
    /// # Errors
    ///
    /// Returns `SellerError::ApplicantNotFound` if `email` has no application.
    #[instrument(skip(self, email), fields(email = %email))]
    pub fn unblock(&self, email: &Email) -> Result<SellerStatus, SellerError> {
        let status = self.moderate(email, |application, _| {
            application.blocked = false;
            Ok(())
        })?;
        tracing::info!("Seller unblocked");
        Ok(status)
    }

    /// Apply one onboarding step to `applicant`'s application.
    ///
    /// The session may have changed while a step was in flight; the step
    /// only lands if `applicant` is still the one signed in.
    fn step(
        &self,
        applicant: &Email,
        f: impl FnOnce(&mut SellerApplication, DateTime<Utc>),
    ) -> Result<SellerStatus, SellerError> {
        let status = self.storage.try_update(keys::USER, |stored| {
            let session = stored
                .as_mut()
                .filter(|session| session.signed_in)
                .ok_or(SellerError::NotSignedIn)?;
            if &session.email != applicant {
                return Err(SellerError::SessionChanged);
            }
            let application = session.seller.get_or_insert_with(SellerApplication::default);
            if application.blocked {
                return Err(SellerError::Blocked);
            }

            let now = Utc::now();
            f(application, now);
            if application.refresh_completion(now) {
                tracing::info!(email = %session.email, "Seller application submitted for approval");
            }
            Ok(SellerStatus::of(application))
        })?;

        self.changed();
        Ok(status)
    }

    fn moderate(
        &self,
        email: &Email,
        f: impl FnOnce(&mut SellerApplication, DateTime<Utc>) -> Result<(), SellerError>,
    ) -> Result<SellerStatus, SellerError> {
        let status = self.storage.try_update(keys::USER, |stored| {
            let application = stored
                .as_mut()
                .filter(|session| &session.email == email)
                .and_then(|session| session.seller.as_mut())
                .ok_or_else(|| SellerError::ApplicantNotFound(email.clone()))?;
            f(application, Utc::now())?;
            Ok::<_, SellerError>(SellerStatus::of(application))
        })?;

        self.changed();
        Ok(status)
    }

    fn changed(&self) {
        self.storage.events().emit(Signal::UserUpdated);
    }
}

fn is_allowed_upload(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ALLOWED_UPLOAD_EXTENSIONS
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
}

async fn sleep(delay: std::time::Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::services::{SessionService, SignInForm};

    fn signed_in() -> Storage {
        let storage = Storage::in_memory();
        SessionService::new(&storage)
            .sign_in(SignInForm {
                name: "Kay".to_string(),
                email: "kay@example.com".to_string(),
                avatar_url: None,
            })
            .unwrap();
        storage
    }

    fn profile() -> SellerProfile {
        SellerProfile {
            artist_name: "Kay Beats".to_string(),
            bio: "Trap and lofi".to_string(),
            genres: vec!["trap".to_string()],
            website: None,
            country: "US".to_string(),
        }
    }

    fn payment(jurisdiction: &str, tax_form: TaxFormKind) -> PaymentForm {
        PaymentForm {
            method: PayoutMethod::Paypal,
            account: "kay@example.com".to_string(),
            jurisdiction: jurisdiction.to_string(),
            tax_form,
            legal_name: "Kay Smith".to_string(),
            tax_id: "123-45-6789".to_string(),
        }
    }

    fn upload(name: &str) -> UploadForm {
        UploadForm {
            file_name: name.to_string(),
            size_bytes: 1024,
        }
    }

    fn kay() -> Email {
        Email::parse("kay@example.com").unwrap()
    }

    #[tokio::test]
    async fn test_steps_in_any_order_queue_for_approval() {
        let storage = signed_in();
        let seller = SellerService::new(&storage, SimulatedDelays::none());

        let status = seller
            .submit_payment(payment("US", TaxFormKind::W9))
            .await
            .unwrap();
        assert!(matches!(status.stage, SellerStage::Onboarding { payment: true, .. }));

        seller.upload(upload("demo.WAV")).await.unwrap();
        let status = seller.submit_profile(profile()).unwrap();
        assert_eq!(status.stage, SellerStage::PendingAdminApproval);
        assert!(status.application.all_steps_complete);
        assert!(status.application.submitted_at.is_some());
        assert_eq!(
            status.application.payout.unwrap().tax_id_last4,
            "6789"
        );
    }

    #[tokio::test]
    async fn test_tax_form_must_match_jurisdiction() {
        let storage = signed_in();
        let seller = SellerService::new(&storage, SimulatedDelays::none());
        let err = seller
            .submit_payment(payment("DE", TaxFormKind::W9))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "jurisdiction DE requires tax form W-8BEN");
        assert_eq!(seller.status().unwrap().stage, SellerStage::NotApplied);
    }

    #[tokio::test]
    async fn test_upload_rejects_unsupported_files() {
        let storage = signed_in();
        let seller = SellerService::new(&storage, SimulatedDelays::none());
        assert!(matches!(
            seller.upload(upload("cover.png")).await,
            Err(SellerError::UnsupportedFile(_))
        ));
        assert!(matches!(
            seller.upload(upload("noextension")).await,
            Err(SellerError::UnsupportedFile(_))
        ));
    }

    #[test]
    fn test_profile_validation() {
        let storage = signed_in();
        let seller = SellerService::new(&storage, SimulatedDelays::none());
        let mut incomplete = profile();
        incomplete.bio = String::new();
        let err = seller.submit_profile(incomplete).unwrap_err();
        assert_eq!(err.to_string(), "missing required fields: bio");
    }

    #[test]
    fn test_signed_out_cannot_apply() {
        let storage = Storage::in_memory();
        let seller = SellerService::new(&storage, SimulatedDelays::none());
        assert!(matches!(
            seller.submit_profile(profile()),
            Err(SellerError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn test_approve_block_unblock() {
        let storage = signed_in();
        let seller = SellerService::new(&storage, SimulatedDelays::none());
        seller.submit_profile(profile()).unwrap();
        assert!(matches!(
            seller.approve(&kay()),
            Err(SellerError::NotReadyForApproval)
        ));

        seller.upload(upload("demo.mp3")).await.unwrap();
        seller
            .submit_payment(payment("us", TaxFormKind::W9))
            .await
            .unwrap();

        let approved = seller.approve(&kay()).unwrap();
        assert_eq!(approved.stage, SellerStage::Approved);
        assert!(!approved.application.pending_admin_approval);

        assert_eq!(seller.block(&kay()).unwrap().stage, SellerStage::Blocked);
        assert!(matches!(
            seller.submit_profile(profile()),
            Err(SellerError::Blocked)
        ));
        assert_eq!(seller.unblock(&kay()).unwrap().stage, SellerStage::Approved);
    }

    #[test]
    fn test_moderating_unknown_applicant() {
        let storage = signed_in();
        let seller = SellerService::new(&storage, SimulatedDelays::none());
        let stranger = Email::parse("lee@example.com").unwrap();
        assert!(matches!(
            seller.block(&stranger),
            Err(SellerError::ApplicantNotFound(_))
        ));
        // Signed in but never applied.
        assert!(matches!(
            seller.block(&kay()),
            Err(SellerError::ApplicantNotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_dropped_when_someone_else_signs_in() {
        let storage = signed_in();
        let delays = SimulatedDelays {
            upload: Duration::from_millis(1000),
            ..SimulatedDelays::none()
        };
        let seller = SellerService::new(&storage, delays);

        let switch_user = async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            SessionService::new(&storage)
                .sign_in(SignInForm {
                    name: "Lee".to_string(),
                    email: "lee@example.com".to_string(),
                    avatar_url: None,
                })
                .unwrap();
        };
        let (result, ()) = tokio::join!(seller.upload(upload("demo.wav")), switch_user);

        assert!(matches!(result, Err(SellerError::SessionChanged)));
        let session = storage.read(keys::USER).unwrap().unwrap();
        assert_eq!(session.email, Email::parse("lee@example.com").unwrap());
        assert!(session.seller.is_none());
    }

    #[test]
    fn test_steps_emit_user_updated() {
        let storage = signed_in();
        let mut sub = storage.events().subscribe();
        SellerService::new(&storage, SimulatedDelays::none())
            .submit_profile(profile())
            .unwrap();

        let mut seen = Vec::new();
        while let Some(signal) = sub.try_recv() {
            seen.push(signal);
        }
        assert!(seen.contains(&Signal::UserUpdated));
    }
}
