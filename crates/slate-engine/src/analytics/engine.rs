//! Batch analytics computation.

use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;

use slate_core::config::AnalyticsConfig;
use slate_core::constants::{CENTS_PER_THOUSAND, Z_90};
use slate_core::{Platform, Player};

use super::types::{AnalyticsBatch, DegradedPlayer, PlayerAnalytics};

/// Computes [`PlayerAnalytics`] for a pool. A bad player never aborts
/// the batch; it is listed in [`AnalyticsBatch::degraded`].
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    ceiling_multiplier: f64,
    floor_multiplier: f64,
    default_spread: f64,
    min_history: usize,
    history_weight: f64,
}

impl AnalyticsEngine {
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            ceiling_multiplier: config.effective_ceiling_multiplier(),
            floor_multiplier: config.effective_floor_multiplier(),
            default_spread: config.effective_default_spread(),
            min_history: config.effective_min_history(),
            history_weight: config.effective_history_weight(),
        }
    }

    pub fn analyze(&self, pool: &[Player], platform: Platform) -> AnalyticsBatch {
        let mut degraded = Vec::new();
        let players = pool
            .iter()
            .map(|p| {
                let mut reasons = Vec::new();
                let a = self.analyze_player(p, platform, &mut reasons);
                if !reasons.is_empty() {
                    degraded.push(DegradedPlayer {
                        player: p.id,
                        reason: reasons.join("; "),
                    });
                }
                a
            })
            .collect();
        if !degraded.is_empty() {
            tracing::warn!(count = degraded.len(), "analytics fell back to defaults for some players");
        }
        AnalyticsBatch::new(players, degraded)
    }

    fn analyze_player(
        &self,
        player: &Player,
        platform: Platform,
        reasons: &mut Vec<String>,
    ) -> PlayerAnalytics {
        let projection = player.projection;
        if !projection.is_finite() {
            reasons.push("non-finite projection".to_string());
            return PlayerAnalytics::zeroed(player.id);
        }

        let salary_k = match player.salary_on(platform) {
            Some(s) if s > 0 => s as f64 / CENTS_PER_THOUSAND,
            _ => {
                reasons.push(format!("no positive salary on {platform}"));
                0.0
            }
        };
        let value = if salary_k > 0.0 { projection / salary_k } else { 0.0 };

        let range_ok = player.floor.is_finite()
            && player.ceiling.is_finite()
            && player.ceiling >= player.floor;
        let spread_volatility = if range_ok {
            (player.ceiling - player.floor) / 2.0
        } else {
            reasons.push("ceiling below floor".to_string());
            self.default_spread * projection.abs()
        };
        let volatility = match player.volatility {
            Some(v) if v.is_finite() && v >= 0.0 => v,
            Some(_) => {
                reasons.push("invalid volatility override".to_string());
                spread_volatility
            }
            None => spread_volatility,
        };

        let mut sigma = volatility / Z_90;
        if !player.history.is_empty() {
            let usable = player.history.len() >= self.min_history
                && player.history.iter().all(|h| h.is_finite());
            if usable {
                let empirical = player.history.iter().std_dev();
                if empirical.is_finite() {
                    sigma = (1.0 - self.history_weight) * sigma + self.history_weight * empirical;
                }
            } else {
                reasons.push("insufficient history".to_string());
            }
        }

        let ceiling_target = self.ceiling_multiplier * salary_k;
        let floor_target = self.floor_multiplier * salary_k;
        PlayerAnalytics {
            player: player.id,
            volatility,
            sigma,
            value,
            ceiling_target,
            floor_target,
            ceiling_prob: exceed_probability(projection, sigma, ceiling_target),
            floor_prob: exceed_probability(projection, sigma, floor_target),
        }
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(&AnalyticsConfig::default())
    }
}

/// P(X >= target) for X ~ Normal(mean, sigma). Degenerate at sigma = 0.
fn exceed_probability(mean: f64, sigma: f64, target: f64) -> f64 {
    if sigma <= f64::EPSILON {
        return if mean >= target { 1.0 } else { 0.0 };
    }
    match Normal::new(mean, sigma) {
        Ok(dist) => dist.sf(target),
        Err(_) => if mean >= target { 1.0 } else { 0.0 },
    }
}
