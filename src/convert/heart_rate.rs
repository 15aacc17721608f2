// ABOUTME: Stateful IBI-to-heart-rate estimator with physiological bounds checking
// ABOUTME: One instance per conversion run; estimates only flow while no direct HR exists
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ambitsync contributors

use std::collections::VecDeque;

use crate::models::{Sample, SampleKind};

/// Minimum credible human heart rate, bpm
const MIN_BPM: f64 = 40.0;

/// Maximum credible human heart rate, bpm
const MAX_BPM: f64 = 220.0;

/// Derives a continuous heart-rate signal from inter-beat-interval bursts.
///
/// The belt delivers IBI data in batches tagged with a `Time` value;
/// consecutive samples may reference the same batch, which must only be
/// consumed once. Each [`observe`] call pops one pending interval (or
/// repeats the last emitted rate when the queue is dry) and rejects
/// estimates outside the physiological range, so a single glitched beat
/// never shows up in the output.
///
/// [`observe`]: HeartRateEstimator::observe
#[derive(Debug)]
pub struct HeartRateEstimator {
    pending: VecDeque<f64>,
    last_batch: Option<String>,
    last_bpm: f64,
    average: bool,
}

impl HeartRateEstimator {
    /// Create an estimator. With `average` set, each IBI batch collapses to
    /// its arithmetic mean before queueing, trading temporal resolution for
    /// less per-beat noise.
    #[must_use]
    pub fn new(average: bool) -> Self {
        Self {
            pending: VecDeque::new(),
            last_batch: None,
            last_bpm: 0.0,
            average,
        }
    }

    /// Feed one sample and get the current heart-rate estimate.
    ///
    /// Returns `None` until the first valid estimate has been produced.
    pub fn observe(&mut self, sample: &Sample) -> Option<u32> {
        if sample.kind == Some(SampleKind::Ibi) {
            if self.last_batch != sample.ibi_time {
                self.pending = sample.ibi.iter().map(|&ms| f64::from(ms)).collect();
                if self.average && !self.pending.is_empty() {
                    let mean = self.pending.iter().sum::<f64>() / self.pending.len() as f64;
                    self.pending.clear();
                    self.pending.push_back(mean);
                }
            }
            self.last_batch.clone_from(&sample.ibi_time);
        }

        let mut bpm = self
            .pending
            .pop_front()
            .map_or(self.last_bpm, |interval_ms| 60_000.0 / interval_ms);

        // sensor glitch filter
        if !(MIN_BPM..=MAX_BPM).contains(&bpm) {
            bpm = self.last_bpm;
        }

        self.last_bpm = bpm;
        if self.last_bpm == 0.0 {
            None
        } else {
            Some(self.last_bpm as u32)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ibi_sample(batch: &str, intervals: &[u32]) -> Sample {
        Sample {
            kind: Some(SampleKind::Ibi),
            ibi_time: Some(batch.to_owned()),
            ibi: intervals.to_vec(),
            ..Sample::default()
        }
    }

    #[test]
    fn test_no_estimate_before_beat_data() {
        let mut estimator = HeartRateEstimator::new(false);
        assert_eq!(estimator.observe(&Sample::default()), None);
        assert_eq!(estimator.observe(&Sample::default()), None);
    }

    #[test]
    fn test_interval_to_bpm_conversion() {
        let mut estimator = HeartRateEstimator::new(false);
        // 1000 ms between beats is exactly 60 bpm; 900 ms is 66.67, truncated
        let sample = ibi_sample("100", &[1000, 900]);
        assert_eq!(estimator.observe(&sample), Some(60));
        assert_eq!(estimator.observe(&Sample::default()), Some(66));
    }

    #[test]
    fn test_same_batch_not_reloaded() {
        let mut estimator = HeartRateEstimator::new(false);
        let sample = ibi_sample("100", &[1000]);
        assert_eq!(estimator.observe(&sample), Some(60));
        // the batch tag did not change, so the queue is not refilled and
        // the last value repeats
        assert_eq!(estimator.observe(&sample), Some(60));
    }

    #[test]
    fn test_new_batch_replaces_queue() {
        let mut estimator = HeartRateEstimator::new(false);
        assert_eq!(estimator.observe(&ibi_sample("100", &[1000])), Some(60));
        assert_eq!(estimator.observe(&ibi_sample("101", &[500])), Some(120));
    }

    #[test]
    fn test_averaged_batch_collapses_to_one_value() {
        let mut estimator = HeartRateEstimator::new(true);
        // mean of 500/1000/1500 is 1000 ms -> 60 bpm, a single queue entry
        let sample = ibi_sample("100", &[500, 1000, 1500]);
        assert_eq!(estimator.observe(&sample), Some(60));
        assert_eq!(estimator.observe(&Sample::default()), Some(60));
    }

    #[test]
    fn test_out_of_range_estimate_falls_back() {
        let mut estimator = HeartRateEstimator::new(false);
        assert_eq!(estimator.observe(&ibi_sample("100", &[1000])), Some(60));
        // 200 ms would be 300 bpm; rejected, last value repeats
        assert_eq!(estimator.observe(&ibi_sample("101", &[200])), Some(60));
        // 2000 ms would be 30 bpm; also rejected
        assert_eq!(estimator.observe(&ibi_sample("102", &[2000])), Some(60));
    }

    #[test]
    fn test_out_of_range_first_estimate_stays_absent() {
        let mut estimator = HeartRateEstimator::new(false);
        assert_eq!(estimator.observe(&ibi_sample("100", &[200])), None);
    }

    #[test]
    fn test_boundary_rates_accepted() {
        let mut estimator = HeartRateEstimator::new(false);
        // 1500 ms -> exactly 40 bpm, the lower bound is inclusive
        assert_eq!(estimator.observe(&ibi_sample("100", &[1500])), Some(40));
        // 273 ms -> 219.78 bpm, just inside the upper bound
        let interval = (60_000.0_f64 / 220.0).ceil() as u32;
        assert_eq!(estimator.observe(&ibi_sample("101", &[interval])), Some(219));
    }
}
