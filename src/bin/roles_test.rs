use portal::roles::{
    Destination, ProfileLookup, Role, RoleClaim, resolve_destination,
};

// Helper to assert one resolution case
fn assert_resolves(
    lookup: ProfileLookup,
    claim: Option<RoleClaim>,
    expected: Destination,
    expected_degraded: bool,
) {
    let resolution = resolve_destination(lookup, claim);
    assert_eq!(resolution.destination, expected);
    assert_eq!(resolution.degraded, expected_degraded);
    println!(
        "✓ resolved to {:?} (degraded: {})",
        resolution.destination, resolution.degraded
    );
}

fn main() {
    println!("\n====== Testing authoritative profile roles ======");
    assert_resolves(
        ProfileLookup::Found(Role::Student),
        None,
        Destination::Student,
        false,
    );
    assert_resolves(
        ProfileLookup::Found(Role::Faculty),
        Some(RoleClaim::Student),
        Destination::Faculty,
        false,
    );
    assert_resolves(
        ProfileLookup::Found(Role::Hod),
        Some(RoleClaim::Student),
        Destination::Coordinator,
        false,
    );
    assert_resolves(
        ProfileLookup::Found(Role::Coordinator),
        None,
        Destination::Coordinator,
        false,
    );
    assert_resolves(
        ProfileLookup::Found(Role::Admin),
        None,
        Destination::Coordinator,
        false,
    );

    println!("\n====== Testing claim fallback ======");
    assert_resolves(
        ProfileLookup::Missing,
        Some(RoleClaim::HeadOfDept),
        Destination::Coordinator,
        false,
    );
    assert_resolves(
        ProfileLookup::Missing,
        Some(RoleClaim::TimetableCoordinator),
        Destination::Coordinator,
        false,
    );
    assert_resolves(
        ProfileLookup::Missing,
        Some(RoleClaim::Student),
        Destination::Student,
        false,
    );
    assert_resolves(
        ProfileLookup::Failed("store unreachable".to_string()),
        Some(RoleClaim::HeadOfDept),
        Destination::Coordinator,
        false,
    );

    println!("\n====== Testing degraded default ======");
    assert_resolves(ProfileLookup::Missing, None, Destination::Student, true);
    assert_resolves(
        ProfileLookup::Failed("timeout".to_string()),
        None,
        Destination::Student,
        true,
    );

    println!("\n====== Testing claim parsing ======");
    assert_eq!(RoleClaim::parse("Student"), Some(RoleClaim::Student));
    assert_eq!(RoleClaim::parse("Head of Dept"), Some(RoleClaim::HeadOfDept));
    assert_eq!(
        RoleClaim::parse("Time Table Coordinator"),
        Some(RoleClaim::TimetableCoordinator)
    );
    assert_eq!(RoleClaim::parse("Registrar"), None);
    println!("✓ only the three known claim strings parse");

    println!("\nAll tests completed.");
}
