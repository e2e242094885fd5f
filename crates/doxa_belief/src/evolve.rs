//! Belief Evolver - reinforcement from new evidence, lazy passive decay
//!
//! Evolution blends the belief's decayed prior confidence with the strength
//! of the incoming evidence, weighted by the belief's adaptability: an
//! adaptable belief chases new evidence, an inert one barely moves. Passive
//! decay is never driven by a timer - it is folded in lazily here and at read
//! time, so unreinforced beliefs erode without global scans.

use chrono::{DateTime, Utc};

use doxa_core::{Belief, DoxaConfig, Feeling};

/// Fold one piece of evidence into the belief. Pure: returns the evolved
/// copy, leaving the caller's snapshot untouched.
pub fn evolve(belief: &Belief, evidence: &Feeling, now: DateTime<Utc>, config: &DoxaConfig) -> Belief {
    let rate = config.tunables.decay_rate;
    let prior = belief.current_confidence(now, rate);
    let evidence_strength = evidence.current_strength(now, rate);

    let mut next = belief.clone();
    next.confidence = (prior * (1.0 - belief.adaptability)
        + evidence_strength * belief.adaptability)
        .clamp(0.0, 1.0);

    next.evidence.feelings.push(evidence.id);
    if !next.evidence.contexts.contains(&evidence.context.environment) {
        next.evidence.contexts.push(evidence.context.environment);
    }
    if !next.evidence.contexts.contains(&evidence.context.trigger) {
        next.evidence.contexts.push(evidence.context.trigger);
    }
    if !next.sources.primary.contains(&evidence.source) {
        next.sources.supporting.insert(evidence.source);
    }

    next.version += 1;
    next.last_updated = now;
    next
}
