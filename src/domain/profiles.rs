//! Profile domain types
//!
//! A profile is stored as a single record at `(USER#<userId>, PROFILE)`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{require, validate_bio, validate_email, validate_name, Field, FieldError};
use crate::store::CompositeKey;

pub const PARTITION_PREFIX: &str = "USER#";
pub const PROFILE_SORT_KEY: &str = "PROFILE";

pub fn profile_key(user_id: &str) -> CompositeKey {
    CompositeKey::new(format!("{PARTITION_PREFIX}{user_id}"), PROFILE_SORT_KEY)
}

/// User profile entity, also the exact shape returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

/// Stored timestamps are RFC 3339, but older records carry a bare
/// `YYYY-MM-DDTHH:MM:SS[.ffffff]` without an offset. Those are UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer};

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT)
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp '{raw}'")))
    }
}

/// Request DTO for creating a profile
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Validated fields of a profile about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub name: String,
    pub email: String,
    pub bio: String,
}

impl CreateProfileRequest {
    pub fn validate(&self) -> Result<NewProfile, FieldError> {
        let name = require(self.name.as_deref(), Field::Name, validate_name)?;
        let email = require(self.email.as_deref(), Field::Email, validate_email)?;
        let bio = validate_bio(self.bio.as_deref());
        Ok(NewProfile { name, email, bio })
    }
}

impl NewProfile {
    pub fn into_profile(self, user_id: String, now: DateTime<Utc>) -> Profile {
        Profile {
            user_id,
            name: self.name,
            email: self.email,
            bio: self.bio,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request DTO for a partial profile update.
///
/// `None` means "keep the stored value"; an explicit JSON `null` is treated
/// the same as an omitted field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl UpdateProfileRequest {
    /// Merge the supplied fields over `existing`.
    ///
    /// Every supplied field is validated before anything is applied, so an
    /// invalid field rejects the whole update. `userId` and `createdAt` are
    /// carried over untouched.
    pub fn merge(&self, existing: &Profile, now: DateTime<Utc>) -> Result<Profile, FieldError> {
        let name = self.name.as_deref().map(validate_name).transpose()?;
        let email = self.email.as_deref().map(validate_email).transpose()?;
        let bio = self.bio.as_deref().map(|b| validate_bio(Some(b)));

        Ok(Profile {
            user_id: existing.user_id.clone(),
            name: name.unwrap_or_else(|| existing.name.clone()),
            email: email.unwrap_or_else(|| existing.email.clone()),
            bio: bio.unwrap_or_else(|| existing.bio.clone()),
            created_at: existing.created_at,
            updated_at: next_updated_at(existing.updated_at, now),
        })
    }
}

/// Smallest timestamp step used to keep `updatedAt` strictly increasing
pub fn timestamp_step() -> Duration {
    Duration::microseconds(1)
}

/// `now`, unless the clock has not moved past `previous`, in which case one
/// step after `previous`.
pub fn next_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + timestamp_step()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn ada() -> Profile {
        CreateProfileRequest {
            name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            bio: Some("engineer".into()),
        }
        .validate()
        .unwrap()
        .into_profile("u-1".into(), at(0))
    }

    #[test]
    fn profile_key_uses_user_partition() {
        let key = profile_key("abc");
        assert_eq!(key.pk, "USER#abc");
        assert_eq!(key.sk, "PROFILE");
    }

    #[test]
    fn create_requires_name_before_email() {
        let err = CreateProfileRequest::default().validate().unwrap_err();
        assert_eq!(err, FieldError::Required(Field::Name));

        let err = CreateProfileRequest {
            name: Some("Ada".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, FieldError::Required(Field::Email));
    }

    #[test]
    fn new_profile_has_equal_timestamps() {
        let profile = ada();
        assert_eq!(profile.created_at, profile.updated_at);
        assert_eq!(profile.bio, "engineer");
    }

    #[test]
    fn serialized_profile_has_exactly_six_camel_case_fields() {
        let value = serde_json::to_value(ada()).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["bio", "createdAt", "email", "name", "updatedAt", "userId"]);
    }

    #[test]
    fn stored_profile_without_bio_decodes_to_empty_bio() {
        let value = serde_json::json!({
            "userId": "u-1",
            "name": "Ada",
            "email": "ada@example.com",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
        });
        let profile: Profile = serde_json::from_value(value).unwrap();
        assert_eq!(profile.bio, "");
    }

    #[test]
    fn stored_profile_with_offsetless_timestamps_decodes_as_utc() {
        let value = serde_json::json!({
            "userId": "legacy",
            "name": "Ada",
            "email": "ada@example.com",
            "bio": "",
            "createdAt": "2024-05-01T12:00:00.123456",
            "updatedAt": "2024-05-01T12:00:00",
        });
        let profile: Profile = serde_json::from_value(value).unwrap();
        assert_eq!(
            profile.created_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::microseconds(123_456)
        );
        assert_eq!(profile.updated_at, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());

        // Written back in RFC 3339
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["createdAt"], "2024-05-01T12:00:00.123456Z");
    }

    #[test]
    fn timestamps_with_offsets_are_normalized_and_garbage_is_rejected() {
        assert_eq!(
            timestamp::parse("2024-05-01T14:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(timestamp::parse("yesterday"), None);
        assert_eq!(timestamp::parse("2024-05-01"), None);
    }

    #[test]
    fn merge_keeps_unspecified_fields() {
        let existing = ada();
        let req = UpdateProfileRequest {
            bio: Some("scientist".into()),
            ..Default::default()
        };
        let merged = req.merge(&existing, at(10)).unwrap();

        assert_eq!(merged.name, "Ada");
        assert_eq!(merged.email, "ada@example.com");
        assert_eq!(merged.bio, "scientist");
        assert_eq!(merged.user_id, existing.user_id);
        assert_eq!(merged.created_at, existing.created_at);
        assert_eq!(merged.updated_at, at(10));
    }

    #[test]
    fn merge_rejects_whole_update_on_any_invalid_field() {
        let existing = ada();
        let req = UpdateProfileRequest {
            name: Some("Grace".into()),
            email: Some("not-an-email".into()),
            bio: None,
        };
        assert_eq!(req.merge(&existing, at(10)), Err(FieldError::InvalidEmail));

        let req = UpdateProfileRequest {
            name: Some("   ".into()),
            ..Default::default()
        };
        let err = req.merge(&existing, at(10)).unwrap_err();
        assert_eq!(err.to_string(), "Name cannot be empty");
    }

    #[test]
    fn merge_allows_clearing_bio() {
        let req = UpdateProfileRequest {
            bio: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(req.merge(&ada(), at(1)).unwrap().bio, "");
    }

    #[test]
    fn updated_at_is_strictly_increasing_even_if_clock_stalls() {
        let previous = at(5);
        assert_eq!(next_updated_at(previous, at(6)), at(6));
        assert_eq!(next_updated_at(previous, previous), previous + timestamp_step());
        assert_eq!(next_updated_at(previous, at(1)), previous + timestamp_step());
    }
}
