//! Requirement resolution for incoming trip requests
//!
//! Decides whether a request carries enough information to plan against, or
//! whether the caller has to be asked for the missing fields first. Pure
//! logic, no side effects.

use crate::config::DefaultsConfig;
use crate::models::{ResolvedTrip, TripRequest};

/// Outcome of requirement resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The request is complete enough to plan; fields are normalized
    Ready(ResolvedTrip),
    /// Required fields are missing; contains their wire names in check order
    NeedsInfo(Vec<String>),
}

/// Validate a trip request and either normalize it or report what's missing.
///
/// `destination` and `durationDays` are required. Without `forceProceed`,
/// either one missing yields [`Resolution::NeedsInfo`] with the missing field
/// names, destination checked first. With `forceProceed`, the configured
/// placeholder destination and default duration stand in and the result is
/// always [`Resolution::Ready`].
#[must_use]
pub fn resolve(req: &TripRequest, defaults: &DefaultsConfig) -> Resolution {
    let mut missing = Vec::new();
    if !req.has_destination() {
        missing.push("destination".to_string());
    }
    if !req.has_duration() {
        missing.push("durationDays".to_string());
    }

    if !missing.is_empty() && !req.force_proceed {
        return Resolution::NeedsInfo(missing);
    }

    let destination = req
        .destination
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map_or_else(|| defaults.placeholder_destination.clone(), str::to_string);

    let duration_days = req
        .duration_days
        .filter(|d| *d > 0)
        .unwrap_or(defaults.default_duration_days);

    Resolution::Ready(ResolvedTrip {
        destination,
        duration_days,
        origin: req.origin.clone(),
        budget_usd: req.budget_usd,
        party_size: req.party_size,
        interests: dedup_preserving_order(&req.interests),
        travel_dates: req.travel_dates.clone(),
        check_in_date: req.check_in_date.clone(),
        check_out_date: req.check_out_date.clone(),
        user_query: req.user_query.clone(),
    })
}

/// Keep the first occurrence of each interest, in original order
fn dedup_preserving_order(interests: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    interests
        .iter()
        .filter(|i| seen.insert(i.trim().to_lowercase()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn defaults() -> DefaultsConfig {
        DefaultsConfig {
            placeholder_destination: "your chosen destination".to_string(),
            default_duration_days: 3,
        }
    }

    #[rstest]
    #[case(None, None, vec!["destination", "durationDays"])]
    #[case(None, Some(5), vec!["destination"])]
    #[case(Some("Lisbon"), None, vec!["durationDays"])]
    #[case(Some("  "), Some(5), vec!["destination"])]
    #[case(Some("Lisbon"), Some(0), vec!["durationDays"])]
    fn test_missing_fields_reported_in_order(
        #[case] destination: Option<&str>,
        #[case] duration_days: Option<u32>,
        #[case] expected: Vec<&str>,
    ) {
        let req = TripRequest {
            destination: destination.map(str::to_string),
            duration_days,
            ..Default::default()
        };
        match resolve(&req, &defaults()) {
            Resolution::NeedsInfo(missing) => assert_eq!(missing, expected),
            Resolution::Ready(_) => panic!("expected NeedsInfo"),
        }
    }

    #[test]
    fn test_complete_request_is_ready() {
        let req = TripRequest {
            destination: Some(" Lisbon ".to_string()),
            duration_days: Some(5),
            party_size: Some(2),
            ..Default::default()
        };
        match resolve(&req, &defaults()) {
            Resolution::Ready(trip) => {
                assert_eq!(trip.destination, "Lisbon");
                assert_eq!(trip.duration_days, 5);
                assert_eq!(trip.party_size, Some(2));
            }
            Resolution::NeedsInfo(missing) => panic!("unexpected NeedsInfo: {missing:?}"),
        }
    }

    #[test]
    fn test_force_proceed_always_ready_with_defaults() {
        let req = TripRequest {
            force_proceed: true,
            ..Default::default()
        };
        match resolve(&req, &defaults()) {
            Resolution::Ready(trip) => {
                assert_eq!(trip.destination, "your chosen destination");
                assert_eq!(trip.duration_days, 3);
            }
            Resolution::NeedsInfo(missing) => panic!("unexpected NeedsInfo: {missing:?}"),
        }
    }

    #[test]
    fn test_force_proceed_keeps_supplied_fields() {
        let req = TripRequest {
            destination: Some("Kyoto".to_string()),
            force_proceed: true,
            ..Default::default()
        };
        match resolve(&req, &defaults()) {
            Resolution::Ready(trip) => {
                assert_eq!(trip.destination, "Kyoto");
                assert_eq!(trip.duration_days, 3);
            }
            Resolution::NeedsInfo(missing) => panic!("unexpected NeedsInfo: {missing:?}"),
        }
    }

    #[test]
    fn test_interests_deduplicated_keeping_first() {
        let req = TripRequest {
            destination: Some("Lisbon".to_string()),
            duration_days: Some(4),
            interests: vec![
                "Food".to_string(),
                "hiking".to_string(),
                "food".to_string(),
                "Museums".to_string(),
            ],
            ..Default::default()
        };
        match resolve(&req, &defaults()) {
            Resolution::Ready(trip) => {
                assert_eq!(trip.interests, vec!["Food", "hiking", "Museums"]);
            }
            Resolution::NeedsInfo(_) => panic!("expected Ready"),
        }
    }
}
