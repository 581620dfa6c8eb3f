//! Core domain vocabulary shared by the session issuer, the access gate and
//! every role-scoped handler.
//!
//! Role comparison used to be scattered string equality with ad hoc case
//! normalization; here it is a single enum with one case-insensitive parse.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Role tag carried inside the session token and stored on accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Alumni,
    Admin,
    Leadership,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alumni => "ALUMNI",
            Self::Admin => "ADMIN",
            Self::Leadership => "LEADERSHIP",
        }
    }

    /// Staff roles see the moderation and analytics surfaces.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Leadership)
    }
}

#[derive(Debug, Error)]
#[error("unknown role tag: {0}")]
pub struct RoleParseError(String);

impl FromStr for Role {
    type Err = RoleParseError;

    /// Case-insensitive by requirement: stored role tags and session role
    /// tags have been observed to disagree in case upstream.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ALUMNI" => Ok(Self::Alumni),
            "ADMIN" => Ok(Self::Admin),
            "LEADERSHIP" => Ok(Self::Leadership),
            _ => Err(RoleParseError(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Self-reported status on a career record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareerStatus {
    Employed,
    SelfEmployed,
    FurtherStudy,
    NotEmployed,
}

impl CareerStatus {
    pub const ALL: [Self; 4] = [
        Self::Employed,
        Self::SelfEmployed,
        Self::FurtherStudy,
        Self::NotEmployed,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employed => "EMPLOYED",
            Self::SelfEmployed => "SELF_EMPLOYED",
            Self::FurtherStudy => "FURTHER_STUDY",
            Self::NotEmployed => "NOT_EMPLOYED",
        }
    }

    /// Employed and self-employed both count toward the absorption rate
    /// reported to accreditation.
    #[must_use]
    pub const fn counts_as_absorbed(self) -> bool {
        matches!(self, Self::Employed | Self::SelfEmployed)
    }
}

#[derive(Debug, Error)]
#[error("unknown career status: {0}")]
pub struct CareerStatusParseError(String);

impl FromStr for CareerStatus {
    type Err = CareerStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EMPLOYED" => Ok(Self::Employed),
            "SELF_EMPLOYED" => Ok(Self::SelfEmployed),
            "FURTHER_STUDY" => Ok(Self::FurtherStudy),
            "NOT_EMPLOYED" => Ok(Self::NotEmployed),
            _ => Err(CareerStatusParseError(s.to_string())),
        }
    }
}

impl fmt::Display for CareerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moderation state for a testimonial. New submissions land as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestimonialStatus {
    Pending,
    Approved,
    Rejected,
}

impl TestimonialStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown testimonial status: {0}")]
pub struct TestimonialStatusParseError(String);

impl FromStr for TestimonialStatus {
    type Err = TestimonialStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(TestimonialStatusParseError(s.to_string())),
        }
    }
}

impl fmt::Display for TestimonialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who may see an alumni profile in the network directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileVisibility {
    Public,
    AlumniOnly,
    Private,
}

impl ProfileVisibility {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::AlumniOnly => "ALUMNI_ONLY",
            Self::Private => "PRIVATE",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown profile visibility: {0}")]
pub struct ProfileVisibilityParseError(String);

impl FromStr for ProfileVisibility {
    type Err = ProfileVisibilityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PUBLIC" => Ok(Self::Public),
            "ALUMNI_ONLY" => Ok(Self::AlumniOnly),
            "PRIVATE" => Ok(Self::Private),
            _ => Err(ProfileVisibilityParseError(s.to_string())),
        }
    }
}

impl fmt::Display for ProfileVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("leadership".parse::<Role>().unwrap(), Role::Leadership);
        assert_eq!("aLuMnI".parse::<Role>().unwrap(), Role::Alumni);
        assert!("rector".parse::<Role>().is_err());
    }

    #[test]
    fn role_round_trips_through_serde() {
        let json = serde_json::to_string(&Role::Leadership).unwrap();
        assert_eq!(json, "\"LEADERSHIP\"");
        let back: Role = serde_json::from_str("\"leadership\"").unwrap();
        assert_eq!(back, Role::Leadership);
    }

    #[test]
    fn staff_roles() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Leadership.is_staff());
        assert!(!Role::Alumni.is_staff());
    }

    #[test]
    fn career_status_parse() {
        assert_eq!(
            "further_study".parse::<CareerStatus>().unwrap(),
            CareerStatus::FurtherStudy
        );
        assert!(CareerStatus::SelfEmployed.counts_as_absorbed());
        assert!(!CareerStatus::FurtherStudy.counts_as_absorbed());
        assert!("RETIRED".parse::<CareerStatus>().is_err());
    }
}
