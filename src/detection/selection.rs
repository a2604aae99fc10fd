use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::RectangleFeature;

/// Which candidate is rendered when a frame yields several rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CandidateSelection {
    /// First candidate in detector order.
    First,
    /// Last candidate in detector order.
    #[default]
    Last,
    /// Candidate with the largest area in detector space.
    Largest,
    /// Candidate with the highest confidence.
    MostConfident,
}

impl CandidateSelection {
    /// Pick one candidate. Ties keep the earliest candidate.
    pub fn select(self, candidates: Vec<RectangleFeature>) -> Option<RectangleFeature> {
        match self {
            CandidateSelection::First => candidates.into_iter().next(),
            CandidateSelection::Last => candidates.into_iter().last(),
            CandidateSelection::Largest => max_by_key(candidates, |c| c.quad.area()),
            CandidateSelection::MostConfident => max_by_key(candidates, |c| c.confidence),
        }
    }
}

fn max_by_key(
    candidates: Vec<RectangleFeature>,
    key: impl Fn(&RectangleFeature) -> f32,
) -> Option<RectangleFeature> {
    let mut best: Option<(f32, RectangleFeature)> = None;
    for candidate in candidates {
        let k = key(&candidate);
        match best {
            Some((best_k, _)) if best_k >= k => {}
            _ => best = Some((k, candidate)),
        }
    }
    best.map(|(_, c)| c)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown candidate selection `{0}` (expected first, last, largest or most-confident)")]
pub struct ParseSelectionError(String);

impl FromStr for CandidateSelection {
    type Err = ParseSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "largest" => Ok(Self::Largest),
            "most-confident" | "most_confident" => Ok(Self::MostConfident),
            _ => Err(ParseSelectionError(s.to_owned())),
        }
    }
}

impl fmt::Display for CandidateSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::First => "first",
            Self::Last => "last",
            Self::Largest => "largest",
            Self::MostConfident => "most-confident",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Quadrilateral};

    fn square(side: f32, confidence: f32) -> RectangleFeature {
        RectangleFeature::new(
            Quadrilateral::new(
                Point::new(0.0, 0.0),
                Point::new(side, 0.0),
                Point::new(side, side),
                Point::new(0.0, side),
            ),
            confidence,
        )
    }

    fn candidates() -> Vec<RectangleFeature> {
        vec![square(10.0, 0.7), square(30.0, 0.8), square(20.0, 0.95)]
    }

    #[test]
    fn test_policies() {
        assert_eq!(CandidateSelection::First.select(candidates()), Some(square(10.0, 0.7)));
        assert_eq!(CandidateSelection::Last.select(candidates()), Some(square(20.0, 0.95)));
        assert_eq!(CandidateSelection::Largest.select(candidates()), Some(square(30.0, 0.8)));
        assert_eq!(
            CandidateSelection::MostConfident.select(candidates()),
            Some(square(20.0, 0.95))
        );
    }

    #[test]
    fn test_empty_candidates() {
        for policy in [
            CandidateSelection::First,
            CandidateSelection::Last,
            CandidateSelection::Largest,
            CandidateSelection::MostConfident,
        ] {
            assert_eq!(policy.select(Vec::new()), None);
        }
    }

    #[test]
    fn test_ties_keep_earliest() {
        let tied = vec![square(10.0, 0.5), square(10.0, 0.9)];
        assert_eq!(CandidateSelection::Largest.select(tied), Some(square(10.0, 0.5)));
    }

    #[test]
    fn test_parse_round_trip() {
        assert_eq!(
            "Largest".parse::<CandidateSelection>(),
            Ok(CandidateSelection::Largest)
        );
        assert_eq!(
            "most-confident".parse::<CandidateSelection>().map(|s| s.to_string()),
            Ok("most-confident".to_string())
        );
        assert!("biggest".parse::<CandidateSelection>().is_err());
    }
}
