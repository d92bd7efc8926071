//! Bias cycle and overall-bias aggregation
//!
//! The aggregate verdict is a pure function of the current per-timeframe
//! state set: the state with a strictly greater count than every other wins;
//! any tie for the top count reports neutral, whether or not neutral is one
//! of the tied states.

use crate::models::bias::{BiasCounts, BiasState};

/// Advance one step along the fixed cycle neutral -> bullish -> bearish -> neutral.
/// This is the only transition the bias control exposes.
pub fn advance(state: BiasState) -> BiasState {
    match state {
        BiasState::Neutral => BiasState::Bullish,
        BiasState::Bullish => BiasState::Bearish,
        BiasState::Bearish => BiasState::Neutral,
    }
}

/// Count the states and compute the overall verdict. Order-independent;
/// the counts always sum to the number of inputs.
pub fn aggregate<I>(states: I) -> (BiasCounts, BiasState)
where
    I: IntoIterator<Item = BiasState>,
{
    let mut counts = BiasCounts::default();
    for state in states {
        match state {
            BiasState::Bullish => counts.bullish += 1,
            BiasState::Bearish => counts.bearish += 1,
            BiasState::Neutral => counts.neutral += 1,
        }
    }

    let mut tallies = [
        (BiasState::Bullish, counts.bullish),
        (BiasState::Bearish, counts.bearish),
        (BiasState::Neutral, counts.neutral),
    ];
    tallies.sort_by(|a, b| b.1.cmp(&a.1));

    let overall = if tallies[0].1 == tallies[1].1 {
        // Tie for the top count, even bullish/bearish
        BiasState::Neutral
    } else {
        tallies[0].0
    };

    (counts, overall)
}

#[cfg(test)]
mod tests {
    use super::*;
    use BiasState::*;

    #[test]
    fn test_cycle_order() {
        assert_eq!(advance(Neutral), Bullish);
        assert_eq!(advance(Bullish), Bearish);
        assert_eq!(advance(Bearish), Neutral);
    }

    #[test]
    fn test_cycle_three_times_is_identity() {
        for start in [Neutral, Bullish, Bearish] {
            assert_eq!(advance(advance(advance(start))), start);
        }
    }

    #[test]
    fn test_strict_majority_wins() {
        let (counts, overall) = aggregate([Bullish, Bullish, Bullish, Bearish, Neutral]);
        assert_eq!(counts.bullish, 3);
        assert_eq!(counts.bearish, 1);
        assert_eq!(counts.neutral, 1);
        assert_eq!(overall, Bullish);
    }

    #[test]
    fn test_top_tie_reports_neutral() {
        // bullish=2, neutral=2, bearish=1 -> tie for top -> neutral
        let (counts, overall) = aggregate([Bullish, Bullish, Bearish, Neutral, Neutral]);
        assert_eq!((counts.bullish, counts.bearish, counts.neutral), (2, 1, 2));
        assert_eq!(overall, Neutral);
    }

    #[test]
    fn test_bullish_bearish_tie_reports_neutral() {
        let (_, overall) = aggregate([Bullish, Bearish]);
        assert_eq!(overall, Neutral);
    }

    #[test]
    fn test_single_timeframe() {
        let (counts, overall) = aggregate([Bearish]);
        assert_eq!(counts.bearish, 1);
        assert_eq!(overall, Bearish);
    }

    #[test]
    fn test_counts_sum_to_input_size() {
        let states = [Bullish, Bearish, Neutral, Neutral, Bullish, Bearish, Neutral];
        let (counts, _) = aggregate(states);
        assert_eq!(
            counts.bullish + counts.bearish + counts.neutral,
            states.len() as u32
        );
    }

    #[test]
    fn test_order_independent() {
        let (a, overall_a) = aggregate([Bullish, Bullish, Bearish]);
        let (b, overall_b) = aggregate([Bearish, Bullish, Bullish]);
        assert_eq!(a, b);
        assert_eq!(overall_a, overall_b);
    }
}
