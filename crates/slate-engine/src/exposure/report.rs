//! Realized exposure and violations for a finished lineup set.

use std::collections::BTreeMap;

use slate_core::{
    Constraints, ExposureReport, ExposureViolation, GeneratedLineup, PlayerExposure, PlayerId,
};

/// Fill `exposures` and `violations` of `report` from the accepted lineups.
/// Bounds are checked against the number of lineups actually generated.
pub fn summarize(report: &mut ExposureReport, constraints: &Constraints, lineups: &[GeneratedLineup]) {
    let generated = lineups.len();
    report.generated = generated;

    let mut counts: BTreeMap<PlayerId, usize> =
        constraints.exposure.keys().map(|&id| (id, 0)).collect();
    for lineup in lineups {
        for id in lineup.player_ids() {
            *counts.entry(id).or_insert(0) += 1;
        }
    }

    report.exposures.clear();
    report.violations.clear();
    for (id, count) in counts {
        let bounds = constraints.exposure_for(id);
        let realized = if generated == 0 {
            0.0
        } else {
            count as f64 / generated as f64
        };
        report.exposures.push(PlayerExposure {
            player: id,
            count,
            exposure: realized,
            min: bounds.min,
            max: bounds.max,
        });
        if generated == 0 {
            continue;
        }
        if count < bounds.min_count(generated) || count > bounds.max_count(generated) {
            report.violations.push(ExposureViolation {
                player: id,
                realized,
                min: bounds.min,
                max: bounds.max,
                shortfall: (bounds.min - realized).max(0.0),
                excess: (realized - bounds.max).max(0.0),
            });
        }
    }
}
