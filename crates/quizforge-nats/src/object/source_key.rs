//! Locator for uploaded quiz source documents.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use uuid::Uuid;

use crate::{Error, Result};

/// Locator of one uploaded source document in the quiz bucket.
///
/// Rendered as `<owner>.<upload>` with hyphenless UUID text, one segment
/// per scoping level. The upload segment is always a UUID v7 minted at
/// upload time, which gives every key two quiz-side properties: keys for
/// one account sort by upload order, and the upload instant can be
/// recovered from the locator alone when a job finally runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey {
    owner_id: Uuid,
    upload_id: Uuid,
}

impl SourceKey {
    /// Mints the locator for a fresh upload by the given account.
    pub fn for_upload(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            upload_id: Uuid::now_v7(),
        }
    }

    /// Returns the owning account ID.
    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    /// Returns the per-upload ID.
    pub fn upload_id(&self) -> Uuid {
        self.upload_id
    }

    /// Checks whether this locator was minted for the given account.
    ///
    /// Generation jobs carry both the locator and the requesting account;
    /// the pipeline refuses to fetch a document across that boundary.
    pub fn is_owned_by(&self, account_id: Uuid) -> bool {
        self.owner_id == account_id
    }

    /// Recovers the upload instant embedded in the v7 upload segment.
    pub fn uploaded_at(&self) -> Option<Timestamp> {
        let (secs, nanos) = self.upload_id.get_timestamp()?.to_unix();
        Timestamp::new(secs as i64, nanos as i32).ok()
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner_id.simple(), self.upload_id.simple())
    }
}

impl FromStr for SourceKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some((owner, upload)) = s.split_once('.') else {
            return Err(Error::operation(
                "parse_key",
                "expected '<owner>.<upload>' locator",
            ));
        };

        let owner_id = Uuid::try_parse(owner)
            .map_err(|e| Error::operation("parse_key", format!("bad owner segment: {e}")))?;
        let upload_id = Uuid::try_parse(upload)
            .map_err(|e| Error::operation("parse_key", format!("bad upload segment: {e}")))?;

        // Keys are only ever minted with v7 upload ids; anything else is
        // not a locator this store produced.
        if upload_id.get_version_num() != 7 {
            return Err(Error::operation(
                "parse_key",
                "upload segment is not a v7 UUID",
            ));
        }

        Ok(Self {
            owner_id,
            upload_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locator_round_trips() {
        let key = SourceKey::for_upload(Uuid::new_v4());
        let parsed: SourceKey = key.to_string().parse().unwrap();

        assert_eq!(parsed, key);
        assert_eq!(parsed.owner_id(), key.owner_id());
        assert_eq!(parsed.upload_id(), key.upload_id());
    }

    #[test]
    fn ownership_check_scopes_to_the_minting_account() {
        let owner = Uuid::new_v4();
        let key = SourceKey::for_upload(owner);

        assert!(key.is_owned_by(owner));
        assert!(!key.is_owned_by(Uuid::new_v4()));
    }

    #[test]
    fn keys_for_one_account_sort_by_upload_order() {
        let owner = Uuid::new_v4();
        let first = SourceKey::for_upload(owner);
        let second = SourceKey::for_upload(owner);

        assert!(second.upload_id() >= first.upload_id());
        assert_ne!(first.to_string(), second.to_string());
    }

    #[test]
    fn upload_instant_is_recoverable() {
        let before = Timestamp::now();
        let key = SourceKey::for_upload(Uuid::new_v4());
        let after = Timestamp::now();

        let uploaded_at = key.uploaded_at().expect("v7 keys carry a timestamp");
        // v7 timestamps have millisecond precision; allow for truncation.
        assert!(uploaded_at >= before - jiff::Span::new().milliseconds(1));
        assert!(uploaded_at <= after + jiff::Span::new().milliseconds(1));
    }

    #[test]
    fn rejects_locators_this_store_never_minted() {
        // No separator.
        assert!(SourceKey::from_str("deadbeef").is_err());
        // Bad segments.
        assert!(SourceKey::from_str("not-a-uuid.also-not").is_err());
        // Valid UUIDs, but the upload segment is v4, not v7.
        let forged = format!("{}.{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        assert!(SourceKey::from_str(&forged).is_err());
    }
}
