//! Seller onboarding application.
//!
//! The application is stored inside the session as a set of independent
//! boolean step flags, which keeps older stored documents readable. Code
//! never branches on the raw flags directly; it asks for the derived
//! [`SellerStage`], in which a block always wins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File extensions accepted by the onboarding upload step.
pub const ALLOWED_UPLOAD_EXTENSIONS: &[&str] = &["wav", "mp3", "aiff", "flac", "zip"];

/// Where an application is in the onboarding flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum SellerStage {
    /// No application has been started.
    NotApplied,
    /// Some of the three steps are done.
    Onboarding {
        profile: bool,
        upload: bool,
        payment: bool,
    },
    /// All steps are done but the application was not queued for review.
    AllStepsComplete,
    /// Waiting for an admin (or the mock approver) to approve.
    PendingAdminApproval,
    /// May list items for sale.
    Approved,
    /// Blocked by an admin.
    Blocked,
}

/// Artist profile submitted in the first step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerProfile {
    pub artist_name: String,
    pub bio: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub website: Option<String>,
    pub country: String,
}

impl SellerProfile {
    /// Names of required fields that are blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.artist_name.trim().is_empty() {
            missing.push("artistName");
        }
        if self.bio.trim().is_empty() {
            missing.push("bio");
        }
        if self.country.trim().is_empty() {
            missing.push("country");
        }
        missing
    }
}

/// A file accepted by the upload step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_name: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// How the seller wants to be paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    Paypal,
    BankTransfer,
    Stripe,
}

/// Tax form matching the seller's jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxFormKind {
    /// US persons.
    #[serde(rename = "W-9")]
    W9,
    /// Everyone else.
    #[serde(rename = "W-8BEN")]
    W8Ben,
}

impl TaxFormKind {
    /// The form required for a jurisdiction (ISO country code).
    #[must_use]
    pub fn required_for(jurisdiction: &str) -> Self {
        if jurisdiction.trim().eq_ignore_ascii_case("US") {
            Self::W9
        } else {
            Self::W8Ben
        }
    }
}

/// Payout details saved by the payment step.
///
/// Only the last four characters of the tax ID are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutDetails {
    pub method: PayoutMethod,
    pub account: String,
    pub jurisdiction: String,
    pub tax_form: TaxFormKind,
    pub legal_name: String,
    pub tax_id_last4: String,
}

/// A seller onboarding application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SellerApplication {
    pub profile: Option<SellerProfile>,
    pub uploads: Vec<UploadedFile>,
    pub payout: Option<PayoutDetails>,
    pub profile_submitted: bool,
    pub upload_done: bool,
    pub payment_done: bool,
    pub all_steps_complete: bool,
    pub pending_admin_approval: bool,
    pub approved: bool,
    pub blocked: bool,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl SellerApplication {
    /// Derive the stage from the stored flags.
    #[must_use]
    pub const fn stage(&self) -> SellerStage {
        if self.blocked {
            return SellerStage::Blocked;
        }
        if self.approved {
            return SellerStage::Approved;
        }
        if self.steps_done() {
            return if self.pending_admin_approval {
                SellerStage::PendingAdminApproval
            } else {
                SellerStage::AllStepsComplete
            };
        }
        if !self.profile_submitted && !self.upload_done && !self.payment_done {
            return SellerStage::NotApplied;
        }
        SellerStage::Onboarding {
            profile: self.profile_submitted,
            upload: self.upload_done,
            payment: self.payment_done,
        }
    }

    const fn steps_done(&self) -> bool {
        self.profile_submitted && self.upload_done && self.payment_done
    }

    /// Whether the mock approver (or an admin) may approve this application.
    #[must_use]
    pub const fn awaiting_approval(&self) -> bool {
        matches!(
            self.stage(),
            SellerStage::PendingAdminApproval | SellerStage::AllStepsComplete
        )
    }

    /// Recompute `all_steps_complete` after a step flag changed.
    ///
    /// When the application becomes complete it is queued for admin
    /// approval. Returns whether it became complete on this call.
    pub fn refresh_completion(&mut self, now: DateTime<Utc>) -> bool {
        let complete = self.steps_done();
        let newly_complete = complete && !self.all_steps_complete;
        self.all_steps_complete = complete;
        if newly_complete && !self.approved {
            self.pending_admin_approval = true;
            self.submitted_at = Some(now);
        }
        newly_complete
    }

    /// Mark the application approved.
    pub fn approve(&mut self, now: DateTime<Utc>) {
        self.approved = true;
        self.pending_admin_approval = false;
        self.approved_at = Some(now);
    }
}
