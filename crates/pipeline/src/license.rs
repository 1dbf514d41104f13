//! License gate and single-session lock.
//!
//! The license table lives in the control-plane sheet. An email is valid
//! for a paid run iff it appears in the table with an empty used marker;
//! an unknown email gets exactly one trial run per process lifetime.
//!
//! The claim is irrevocable but not transactional: the table is read,
//! checked, and the used marker written back as separate requests. Two
//! runs racing on the same row can both pass the check before either
//! write lands. That window exists in the product's established behavior
//! and is kept as-is rather than narrowed here.

use async_trait::async_trait;
use chrono::NaiveDate;

use capforge_sheets::tables::LicenseRow;
use capforge_sheets::SheetsClient;

use crate::error::BatchError;

/// Read/claim access to the license table.
#[async_trait]
pub trait LicenseStore: Send + Sync {
    /// Fetch the full license table.
    async fn fetch_rows(&self) -> Result<Vec<LicenseRow>, BatchError>;

    /// Set the used marker on the row for `email` and persist it.
    async fn mark_used(&self, email: &str) -> Result<(), BatchError>;
}

#[async_trait]
impl LicenseStore for SheetsClient {
    async fn fetch_rows(&self) -> Result<Vec<LicenseRow>, BatchError> {
        Ok(self.load_license_rows().await?)
    }

    async fn mark_used(&self, email: &str) -> Result<(), BatchError> {
        Ok(self.mark_license_used(email).await?)
    }
}

/// Paid license or one-shot trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseKind {
    /// Known email, now claimed; full batch allowed.
    Paid,
    /// Unknown email; batch truncated to one line, process exits after.
    Trial,
}

/// Outcome of a successful license check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseGrant {
    pub kind: LicenseKind,
    /// Expiry parsed from the sheet when it is ISO-formatted.
    pub expiry: Option<NaiveDate>,
    /// Raw expiry cell for display (paid licenses only).
    pub expiry_text: Option<String>,
}

impl LicenseGrant {
    fn trial() -> Self {
        Self {
            kind: LicenseKind::Trial,
            expiry: None,
            expiry_text: None,
        }
    }

    fn paid(expiry_cell: &str) -> Self {
        let expiry_text = (!expiry_cell.is_empty()).then(|| expiry_cell.to_string());
        let expiry = NaiveDate::parse_from_str(expiry_cell, "%Y-%m-%d").ok();
        Self {
            kind: LicenseKind::Paid,
            expiry,
            expiry_text,
        }
    }

    /// Whether this grant is the one-shot trial.
    pub fn is_trial(&self) -> bool {
        self.kind == LicenseKind::Trial
    }
}

/// Per-process license session state.
///
/// The first successful check is cached; later runs with the same email
/// skip the remote lookup entirely. A *different* email in the same
/// session is rejected outright without re-validation — the session is
/// locked to one email to prevent license sharing mid-process, at the
/// cost of requiring a restart to switch accounts.
#[derive(Debug, Default)]
pub struct LicenseSession {
    validated: Option<(String, LicenseGrant)>,
}

impl LicenseSession {
    /// Create a fresh, unvalidated session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The validated email and grant, once a check has succeeded.
    pub fn grant(&self) -> Option<&(String, LicenseGrant)> {
        self.validated.as_ref()
    }

    /// Check `email` against the license table per the session rules.
    ///
    /// On the first call this fetches the table once. A paid match claims
    /// the row (remote used-marker write) before returning.
    pub async fn check(
        &mut self,
        email: &str,
        store: &dyn LicenseStore,
    ) -> Result<LicenseGrant, BatchError> {
        if let Some((validated_email, grant)) = &self.validated {
            if validated_email == email {
                tracing::debug!(email, "License already validated this session");
                return Ok(grant.clone());
            }
            return Err(BatchError::EmailMismatch);
        }

        let rows = store.fetch_rows().await?;
        let row = rows.iter().find(|r| r.email == email);

        let grant = match row {
            None => {
                tracing::info!(email, "Unknown email, granting one-shot trial");
                LicenseGrant::trial()
            }
            Some(r) if r.used_marker.is_empty() => {
                store.mark_used(email).await?;
                tracing::info!(email, expiry = %r.expiry, "License claimed");
                LicenseGrant::paid(&r.expiry)
            }
            Some(_) => return Err(BatchError::EmailInUse),
        };

        self.validated = Some((email.to_string(), grant.clone()));
        Ok(grant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::Mutex;

    struct FakeStore {
        rows: Vec<LicenseRow>,
        marked: Mutex<Vec<String>>,
    }

    impl FakeStore {
        fn new(rows: Vec<(&str, &str, &str)>) -> Self {
            let rows = rows
                .into_iter()
                .map(|(email, expiry, used_marker)| LicenseRow {
                    email: email.to_string(),
                    expiry: expiry.to_string(),
                    used_marker: used_marker.to_string(),
                })
                .collect();
            Self {
                rows,
                marked: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LicenseStore for FakeStore {
        async fn fetch_rows(&self) -> Result<Vec<LicenseRow>, BatchError> {
            Ok(self.rows.clone())
        }

        async fn mark_used(&self, email: &str) -> Result<(), BatchError> {
            self.marked.lock().unwrap().push(email.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn unknown_email_gets_trial() {
        let store = FakeStore::new(vec![("other@x.com", "2026-01-01", "")]);
        let mut session = LicenseSession::new();
        let grant = session.check("new@x.com", &store).await.unwrap();
        assert!(grant.is_trial());
        assert!(store.marked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn known_unused_email_is_paid_and_claimed() {
        let store = FakeStore::new(vec![("a@x.com", "2026-01-01", "")]);
        let mut session = LicenseSession::new();
        let grant = session.check("a@x.com", &store).await.unwrap();
        assert_eq!(grant.kind, LicenseKind::Paid);
        assert_eq!(grant.expiry, NaiveDate::from_ymd_opt(2026, 1, 1));
        assert_eq!(grant.expiry_text.as_deref(), Some("2026-01-01"));
        assert_eq!(*store.marked.lock().unwrap(), vec!["a@x.com".to_string()]);
    }

    #[tokio::test]
    async fn used_email_is_rejected() {
        let store = FakeStore::new(vec![("a@x.com", "2026-01-01", "a@x.com")]);
        let mut session = LicenseSession::new();
        let result = session.check("a@x.com", &store).await;
        assert_matches!(result, Err(BatchError::EmailInUse));
    }

    #[tokio::test]
    async fn same_email_reuses_cached_grant_without_refetch() {
        let store = FakeStore::new(vec![("a@x.com", "", "")]);
        let mut session = LicenseSession::new();
        session.check("a@x.com", &store).await.unwrap();
        // A second check must not claim the row again.
        session.check("a@x.com", &store).await.unwrap();
        assert_eq!(store.marked.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn different_email_mid_session_is_rejected() {
        let store = FakeStore::new(vec![("a@x.com", "", ""), ("b@x.com", "", "")]);
        let mut session = LicenseSession::new();
        session.check("a@x.com", &store).await.unwrap();
        let result = session.check("b@x.com", &store).await;
        assert_matches!(result, Err(BatchError::EmailMismatch));
    }

    #[tokio::test]
    async fn trial_is_cached_for_the_session_too() {
        let store = FakeStore::new(vec![]);
        let mut session = LicenseSession::new();
        assert!(session.check("t@x.com", &store).await.unwrap().is_trial());
        assert!(session.check("t@x.com", &store).await.unwrap().is_trial());
    }

    #[tokio::test]
    async fn unparseable_expiry_keeps_display_text() {
        let store = FakeStore::new(vec![("a@x.com", "31/12/2026", "")]);
        let mut session = LicenseSession::new();
        let grant = session.check("a@x.com", &store).await.unwrap();
        assert_eq!(grant.expiry, None);
        assert_eq!(grant.expiry_text.as_deref(), Some("31/12/2026"));
    }
}
