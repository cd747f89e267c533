//! Multi-tenant clinic scope.
//!
//! Every list query runs inside an organization and is optionally narrowed to
//! a single clinic. The narrowing travels in the `X-Clinic-Scope` header as
//! either `"all"` or a clinic id.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::shared::constants::CLINIC_SCOPE_ALL;

/// Which clinics a request is filtered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClinicScope {
    #[default]
    All,
    Clinic(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid clinic scope '{0}': expected \"all\" or a clinic id")]
pub struct InvalidClinicScope(pub String);

impl ClinicScope {
    pub fn clinic_id(&self) -> Option<Uuid> {
        match self {
            ClinicScope::All => None,
            ClinicScope::Clinic(id) => Some(*id),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ClinicScope::All)
    }
}

impl FromStr for ClinicScope {
    type Err = InvalidClinicScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(CLINIC_SCOPE_ALL) {
            return Ok(ClinicScope::All);
        }
        Uuid::parse_str(trimmed)
            .map(ClinicScope::Clinic)
            .map_err(|_| InvalidClinicScope(s.to_string()))
    }
}

impl fmt::Display for ClinicScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClinicScope::All => write!(f, "{}", CLINIC_SCOPE_ALL),
            ClinicScope::Clinic(id) => write!(f, "{}", id),
        }
    }
}

impl Serialize for ClinicScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClinicScope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Organization plus optional clinic narrowing, resolved per request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantScope {
    pub organization_id: Uuid,
    pub clinic: ClinicScope,
}

impl TenantScope {
    pub fn new(organization_id: Uuid, clinic: ClinicScope) -> Self {
        Self {
            organization_id,
            clinic,
        }
    }

    /// Clinic filter bound as `$n::uuid IS NULL OR clinic_id = $n`
    pub fn clinic_id(&self) -> Option<Uuid> {
        self.clinic.clinic_id()
    }

    /// Pick the clinic for a new record: explicit value wins, then the scope.
    pub fn clinic_for_create(&self, explicit: Option<Uuid>) -> Option<Uuid> {
        explicit.or(self.clinic.clinic_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all() {
        assert_eq!("all".parse::<ClinicScope>(), Ok(ClinicScope::All));
        assert_eq!("ALL".parse::<ClinicScope>(), Ok(ClinicScope::All));
        assert_eq!("".parse::<ClinicScope>(), Ok(ClinicScope::All));
    }

    #[test]
    fn test_parse_clinic_id() {
        let id = Uuid::new_v4();
        assert_eq!(
            id.to_string().parse::<ClinicScope>(),
            Ok(ClinicScope::Clinic(id))
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!("clinic-1".parse::<ClinicScope>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_header_form() {
        let id = Uuid::new_v4();
        assert_eq!(ClinicScope::All.to_string(), "all");
        assert_eq!(ClinicScope::Clinic(id).to_string(), id.to_string());
    }

    #[test]
    fn test_serde_uses_header_form() {
        let json = serde_json::to_string(&ClinicScope::All).unwrap();
        assert_eq!(json, "\"all\"");
        let back: ClinicScope = serde_json::from_str(&json).unwrap();
        assert!(back.is_all());
    }

    #[test]
    fn test_clinic_for_create() {
        let org = Uuid::new_v4();
        let scoped = Uuid::new_v4();
        let explicit = Uuid::new_v4();

        let all = TenantScope::new(org, ClinicScope::All);
        assert_eq!(all.clinic_for_create(None), None);
        assert_eq!(all.clinic_for_create(Some(explicit)), Some(explicit));

        let one = TenantScope::new(org, ClinicScope::Clinic(scoped));
        assert_eq!(one.clinic_for_create(None), Some(scoped));
        assert_eq!(one.clinic_for_create(Some(explicit)), Some(explicit));
    }
}
