//! Aggregate statistics over a finished run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sim::trial::{AbortReason, TrialState, TrialSummary};

/// Summary measures over every trial of a run.
///
/// Built once after the join barrier; never updated concurrently.
/// Rates are fractions in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimStats {
    /// Trials run, including failed ones.
    pub trials: u64,

    /// Trials that reached the profit target.
    pub won: u64,

    /// Trials that did not (`ruined + aborted + failed`).
    pub lost: u64,

    /// Trials that ended with a balance of zero or less.
    pub ruined: u64,

    /// Trials closed for any abort reason.
    pub aborted: u64,

    /// Abort count per reason.
    pub aborted_by_reason: BTreeMap<AbortReason, u64>,

    /// Trials abandoned on a fatal game error.
    pub failed: u64,

    /// Rounds played across all completed trials.
    pub total_rounds: u64,

    /// `won / trials`.
    pub win_rate: f64,

    /// `lost / trials`.
    pub loss_rate: f64,

    /// Mean rounds per completed trial.
    pub average_rounds: f64,

    /// Population standard deviation of the per-trial win indicator.
    pub win_rate_std_dev: f64,

    /// Wall-clock time of the run (in seconds).
    pub elapsed_seconds: f64,

    /// Trials per second.
    pub trials_per_second: f64,

    /// Per-trial pass/fail indicator, in trial order.
    #[serde(skip)]
    pub outcomes: Vec<bool>,
}

impl SimStats {
    /// Aggregate completed trial summaries plus a count of failed trials.
    pub fn from_summaries<I>(summaries: I, failed: u64) -> Self
    where
        I: IntoIterator<Item = TrialSummary>,
    {
        let mut stats = SimStats::default();
        let mut completed = 0u64;

        for summary in summaries {
            completed += 1;
            stats.total_rounds += summary.rounds_played;
            stats.outcomes.push(summary.state.is_won());
            match summary.state {
                TrialState::WonTarget => stats.won += 1,
                TrialState::Ruined => stats.ruined += 1,
                TrialState::Aborted(reason) => {
                    stats.aborted += 1;
                    *stats.aborted_by_reason.entry(reason).or_insert(0) += 1;
                }
                // The runner never returns a running trial.
                TrialState::Running => debug_assert!(false, "trial {} still running", summary.trial),
            }
        }

        stats.failed = failed;
        stats.outcomes.extend(std::iter::repeat(false).take(failed as usize));
        stats.trials = completed + failed;
        stats.lost = stats.trials - stats.won;

        if stats.trials > 0 {
            let n = stats.trials as f64;
            stats.win_rate = stats.won as f64 / n;
            stats.loss_rate = stats.lost as f64 / n;
            let indicators: Vec<f64> = stats
                .outcomes
                .iter()
                .map(|&won| if won { 1.0 } else { 0.0 })
                .collect();
            stats.win_rate_std_dev = population_std_dev(&indicators, stats.win_rate);
        }
        if completed > 0 {
            stats.average_rounds = stats.total_rounds as f64 / completed as f64;
        }
        stats
    }

    /// Record the run's wall-clock time and derive the trial rate.
    pub fn update_rate(&mut self, elapsed_seconds: f64) {
        self.elapsed_seconds = elapsed_seconds;
        if elapsed_seconds > 0.0 {
            self.trials_per_second = self.trials as f64 / elapsed_seconds;
        }
    }

    /// Aborts for one reason.
    pub fn aborted_for(&self, reason: AbortReason) -> u64 {
        self.aborted_by_reason.get(&reason).copied().unwrap_or(0)
    }
}

/// Population standard deviation: `sqrt(mean((x - mean)^2))`.
pub fn population_std_dev(data: &[f64], mean: f64) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum_of_squares: f64 = data.iter().map(|&x| (x - mean).powi(2)).sum();
    (sum_of_squares / data.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(trial: u64, state: TrialState, rounds: u64) -> TrialSummary {
        TrialSummary {
            trial,
            state,
            final_balance: 0,
            rounds_played: rounds,
        }
    }

    #[test]
    fn test_counts_and_rates() {
        let stats = SimStats::from_summaries(
            vec![
                summary(0, TrialState::WonTarget, 10),
                summary(1, TrialState::Ruined, 20),
                summary(2, TrialState::Aborted(AbortReason::StakeExceedsBalance), 30),
                summary(3, TrialState::WonTarget, 40),
            ],
            0,
        );

        assert_eq!(stats.trials, 4);
        assert_eq!(stats.won, 2);
        assert_eq!(stats.lost, 2);
        assert_eq!(stats.ruined, 1);
        assert_eq!(stats.aborted, 1);
        assert_eq!(stats.aborted_for(AbortReason::StakeExceedsBalance), 1);
        assert_eq!(stats.aborted_for(AbortReason::RoundCap), 0);
        assert_eq!(stats.total_rounds, 100);
        assert!((stats.win_rate - 0.5).abs() < 1e-12);
        assert!((stats.loss_rate - 0.5).abs() < 1e-12);
        assert!((stats.average_rounds - 25.0).abs() < 1e-12);
        // Bernoulli(0.5) population std dev
        assert!((stats.win_rate_std_dev - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_failed_trials_count_as_losses() {
        let stats = SimStats::from_summaries(vec![summary(0, TrialState::WonTarget, 5)], 1);
        assert_eq!(stats.trials, 2);
        assert_eq!(stats.won, 1);
        assert_eq!(stats.lost, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.outcomes, vec![true, false]);
        assert!((stats.average_rounds - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_population_std_dev() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std_dev(&data, 5.0) - 2.0).abs() < 1e-12);
        assert_eq!(population_std_dev(&[], 0.0), 0.0);
    }

    #[test]
    fn test_update_rate() {
        let mut stats = SimStats::from_summaries(vec![summary(0, TrialState::Ruined, 1)], 0);
        stats.update_rate(0.5);
        assert!((stats.trials_per_second - 2.0).abs() < 1e-12);
    }
}
