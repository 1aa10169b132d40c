//! Recognized configuration options (spec §6). These are plain data, the
//! way the teacher's `consensus::genesis::Genesis<D>` is plain data that the
//! chain consumes without owning how it was loaded from disk — config
//! *loading* (file/env/CLI) stays outside the core.

use serde::{Deserialize, Serialize};

/// One point on the payout difficulty-ratio curve (spec §4.3/F.4.3):
/// `ratio` is `endorsed_difficulty / endorsing_difficulty`, `multiplier`
/// scales the base reward at that ratio. The curve is linearly interpolated
/// between consecutive points and clamped at the ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutCurvePoint {
  pub ratio: f64,
  pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AltParams {
  /// Globally unique network identifier.
  pub network_id: i32,
  /// Number of blocks within which an endorsement may still contribute to
  /// fork choice and payouts.
  pub endorsement_settlement_interval: u32,
  /// Number of blocks to walk back from a tip before the payout window
  /// begins.
  pub payout_delay: u32,
  /// Size of the payout window, counted backwards from `payout_delay`.
  pub payout_window_size: u32,
  pub max_pop_data_per_block: usize,
  pub payout_curve: Vec<PayoutCurvePoint>,
  /// Maximum allowed drift, in seconds, between a block's timestamp and
  /// the median time of its last N ancestors.
  pub max_block_time_drift: i64,
  /// Number of ancestor timestamps used to compute median-time-past.
  pub median_time_past_blocks: usize,
}

impl AltParams {
  /// Interpolates the configured payout curve at `ratio`.
  pub fn payout_multiplier(&self, ratio: f64) -> f64 {
    if self.payout_curve.is_empty() {
      return 1.0;
    }
    if ratio <= self.payout_curve[0].ratio {
      return self.payout_curve[0].multiplier;
    }
    for w in self.payout_curve.windows(2) {
      let (a, b) = (&w[0], &w[1]);
      if ratio >= a.ratio && ratio <= b.ratio {
        if (b.ratio - a.ratio).abs() < f64::EPSILON {
          return a.multiplier;
        }
        let t = (ratio - a.ratio) / (b.ratio - a.ratio);
        return a.multiplier + t * (b.multiplier - a.multiplier);
      }
    }
    self.payout_curve.last().unwrap().multiplier
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VbkParams {
  pub network_magic: u32,
  pub minimum_difficulty: u32,
  pub settlement_interval: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BtcParams {
  /// Compact-encoded maximum allowed proof-of-work target.
  pub pow_limit: u32,
  pub retarget_interval: u32,
  pub retarget_period_seconds: i64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn payout_curve_interpolates() {
    let p = AltParams {
      network_id: 1,
      endorsement_settlement_interval: 400,
      payout_delay: 500,
      payout_window_size: 50,
      max_pop_data_per_block: 64,
      max_block_time_drift: 600,
      median_time_past_blocks: 11,
      payout_curve: vec![
        PayoutCurvePoint { ratio: 0.0, multiplier: 0.0 },
        PayoutCurvePoint { ratio: 1.0, multiplier: 1.0 },
        PayoutCurvePoint { ratio: 2.0, multiplier: 1.5 },
      ],
    };
    assert_eq!(p.payout_multiplier(-1.0), 0.0);
    assert_eq!(p.payout_multiplier(0.5), 0.5);
    assert_eq!(p.payout_multiplier(1.5), 1.25);
    assert_eq!(p.payout_multiplier(10.0), 1.5);
  }
}
