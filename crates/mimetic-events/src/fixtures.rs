//! Sample graph fixtures for testing.
//!
//! This module provides ready-made graphs for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // mimetic-events = { path = "../mimetic-events", features = ["test-fixtures"] }
//!
//! use mimetic_events::fixtures;
//!
//! let salem = fixtures::salem_four();
//! ```

use crate::GraphSnapshot;

fn parse(name: &str, json: &str) -> GraphSnapshot {
    GraphSnapshot::from_json(json)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", name, e))
}

/// Four villagers, everyone friends with everyone.
pub fn salem_four() -> GraphSnapshot {
    parse("salem_four.json", include_str!("../tests/fixtures/salem_four.json"))
}

/// Four villagers where Alice's only friend is Betty.
///
/// Accusing Betty leaves Alice with no friends to spread the accusation to.
pub fn isolated_accuser() -> GraphSnapshot {
    parse(
        "isolated_accuser.json",
        include_str!("../tests/fixtures/isolated_accuser.json"),
    )
}

/// Two friendship components with no edges between them:
/// - Alice, Betty, Charlie, David (complete, all friends)
/// - Eve, Frank, Grace (complete, all friends)
pub fn two_components() -> GraphSnapshot {
    parse(
        "two_components.json",
        include_str!("../tests/fixtures/two_components.json"),
    )
}

/// Six villagers with mixed signs and several unbalanced triangles.
/// Not complete: Elizabeth-Tituba, John-Sarah are missing.
pub fn village_six() -> GraphSnapshot {
    parse("village_six.json", include_str!("../tests/fixtures/village_six.json"))
}
