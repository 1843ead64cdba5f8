use serde::{Deserialize, Serialize};

/// Authoritative role codes stored in a user profile
///
/// This is the closed set of values the profile store may contain.
/// A profile row with any other code fails to deserialize instead of
/// being routed somewhere by guesswork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Student,
    Faculty,
    Hod,
    Coordinator,
    Admin,
}

impl Role {
    /// Map an authoritative role to its landing destination.
    ///
    /// HOD, COORDINATOR and ADMIN all land on the coordinator portal.
    pub fn destination(&self) -> Destination {
        match self {
            Role::Student => Destination::Student,
            Role::Faculty => Destination::Faculty,
            Role::Hod | Role::Coordinator | Role::Admin => Destination::Coordinator,
        }
    }
}

/// Role-specific landing view picked after login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Destination {
    Student,
    Faculty,
    Coordinator,
}

impl Destination {
    /// Route the routing layer navigates to for this destination.
    pub fn path(&self) -> &'static str {
        match self {
            Destination::Student => "/dashboard/student",
            Destination::Faculty => "/dashboard/faculty",
            Destination::Coordinator => "/dashboard/coordinator",
        }
    }
}

/// Role hint carried in identity-provider metadata
///
/// Signup stores the applicant's chosen role as provider metadata. The
/// raw string is parsed into this enum exactly once, at the provider
/// boundary; everything downstream works with the enum. The hint is not
/// authoritative and only matters when no profile row exists yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleClaim {
    #[serde(rename = "Student")]
    Student,
    #[serde(rename = "Head of Dept")]
    HeadOfDept,
    #[serde(rename = "Time Table Coordinator")]
    TimetableCoordinator,
}

impl RoleClaim {
    /// Parse a raw metadata string into a claim.
    ///
    /// Unrecognized strings yield `None`, which downstream treats as
    /// "no claim" rather than an error.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Student" => Some(RoleClaim::Student),
            "Head of Dept" => Some(RoleClaim::HeadOfDept),
            "Time Table Coordinator" => Some(RoleClaim::TimetableCoordinator),
            _ => None,
        }
    }

    /// The authoritative role a claim provisions when a profile row is
    /// created from it at signup.
    pub fn profile_role(&self) -> Role {
        match self {
            RoleClaim::Student => Role::Student,
            RoleClaim::HeadOfDept => Role::Hod,
            RoleClaim::TimetableCoordinator => Role::Coordinator,
        }
    }

    fn destination(&self) -> Destination {
        self.profile_role().destination()
    }
}

/// Result of the best-effort profile lookup performed after login
///
/// A lookup failure carries its reason for logging but is otherwise
/// handled exactly like a missing row.
#[derive(Debug, Clone)]
pub enum ProfileLookup {
    Found(Role),
    Missing,
    Failed(String),
}

/// Outcome of destination resolution
///
/// `degraded` marks the fallback-of-last-resort outcome so the caller can
/// log it; it is never set when an authoritative role or a claim decided
/// the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub destination: Destination,
    pub degraded: bool,
}

/// Resolve the landing destination for a freshly authenticated session
///
/// Resolution order, first match wins:
/// 1. an authoritative role from a successful profile lookup;
/// 2. the provider role claim, if any;
/// 3. the student portal, flagged as degraded.
///
/// A failed lookup is treated the same as an absent profile; this
/// function always produces a destination and performs no I/O.
///
/// # Arguments
/// * `lookup` - Result of the profile lookup (found, missing, or failed)
/// * `claim` - Optional role claim from provider metadata
///
/// # Returns
/// * `Resolution` - The chosen destination plus the degraded flag
pub fn resolve_destination(lookup: ProfileLookup, claim: Option<RoleClaim>) -> Resolution {
    if let ProfileLookup::Found(role) = lookup {
        return Resolution {
            destination: role.destination(),
            degraded: false,
        };
    }

    if let Some(claim) = claim {
        return Resolution {
            destination: claim.destination(),
            degraded: false,
        };
    }

    Resolution {
        destination: Destination::Student,
        degraded: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_role_wins_over_any_claim() {
        let cases = [
            (Role::Student, Destination::Student),
            (Role::Faculty, Destination::Faculty),
            (Role::Hod, Destination::Coordinator),
            (Role::Coordinator, Destination::Coordinator),
            (Role::Admin, Destination::Coordinator),
        ];

        for (role, expected) in cases {
            // A conflicting claim must not matter once the profile answers.
            let resolution =
                resolve_destination(ProfileLookup::Found(role), Some(RoleClaim::Student));
            assert_eq!(resolution.destination, expected);
            assert!(!resolution.degraded);
        }
    }

    #[test]
    fn claim_decides_when_profile_is_missing() {
        let resolution =
            resolve_destination(ProfileLookup::Missing, Some(RoleClaim::HeadOfDept));
        assert_eq!(resolution.destination, Destination::Coordinator);
        assert!(!resolution.degraded);

        let resolution = resolve_destination(
            ProfileLookup::Missing,
            Some(RoleClaim::TimetableCoordinator),
        );
        assert_eq!(resolution.destination, Destination::Coordinator);
        assert!(!resolution.degraded);

        let resolution = resolve_destination(ProfileLookup::Missing, Some(RoleClaim::Student));
        assert_eq!(resolution.destination, Destination::Student);
        assert!(!resolution.degraded);
    }

    #[test]
    fn failed_lookup_is_treated_like_missing() {
        let resolution = resolve_destination(
            ProfileLookup::Failed("connection refused".to_string()),
            Some(RoleClaim::HeadOfDept),
        );
        assert_eq!(resolution.destination, Destination::Coordinator);
        assert!(!resolution.degraded);
    }

    #[test]
    fn no_profile_and_no_claim_degrades_to_student() {
        let resolution = resolve_destination(ProfileLookup::Missing, None);
        assert_eq!(resolution.destination, Destination::Student);
        assert!(resolution.degraded);

        let resolution =
            resolve_destination(ProfileLookup::Failed("timeout".to_string()), None);
        assert_eq!(resolution.destination, Destination::Student);
        assert!(resolution.degraded);
    }

    #[test]
    fn claim_parsing_recognizes_only_known_strings() {
        assert_eq!(RoleClaim::parse("Student"), Some(RoleClaim::Student));
        assert_eq!(RoleClaim::parse("Head of Dept"), Some(RoleClaim::HeadOfDept));
        assert_eq!(
            RoleClaim::parse("Time Table Coordinator"),
            Some(RoleClaim::TimetableCoordinator)
        );
        assert_eq!(RoleClaim::parse("student"), None);
        assert_eq!(RoleClaim::parse("HOD"), None);
        assert_eq!(RoleClaim::parse(""), None);
    }

    #[test]
    fn destination_paths() {
        assert_eq!(Destination::Student.path(), "/dashboard/student");
        assert_eq!(Destination::Faculty.path(), "/dashboard/faculty");
        assert_eq!(Destination::Coordinator.path(), "/dashboard/coordinator");
    }
}
