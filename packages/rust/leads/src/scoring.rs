//! Heuristic lead scoring.
//!
//! Weights and thresholds are fixed business rules. The maximum reachable
//! score is 100 and no clamp is applied.

use salesagent_shared::LeadStatus;

/// Budgets strictly above this earn [`BUDGET_POINTS`].
const BUDGET_THRESHOLD: f64 = 100.0;
const BUDGET_POINTS: u32 = 30;

/// Purchase-intent keywords, matched as substrings of the lower-cased interest.
const INTENT_KEYWORDS: &[&str] = &["buy", "purchase", "order", "need", "urgent"];
const INTENT_POINTS: u32 = 30;

const EMAIL_POINTS: u32 = 10;

const POINTS_PER_INTERACTION: u32 = 10;
const INTERACTION_CAP: u32 = 30;

/// Inclusive lower bounds of the status tiers.
const HOT_THRESHOLD: u32 = 70;
const WARM_THRESHOLD: u32 = 40;

/// Result of scoring one lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadScore {
    pub score: u32,
    pub status: LeadStatus,
}

/// Score a lead from its free-text fields and the number of chat turns so far.
pub fn score_lead(
    interest: &str,
    budget: &str,
    email: &str,
    interaction_count: usize,
) -> LeadScore {
    let mut score = 0;

    if parse_budget(budget).is_some_and(|b| b > BUDGET_THRESHOLD) {
        score += BUDGET_POINTS;
    }

    if has_purchase_intent(interest) {
        score += INTENT_POINTS;
    }

    if !email.is_empty() {
        score += EMAIL_POINTS;
    }

    score += interaction_points(interaction_count);

    LeadScore {
        score,
        status: status_for_score(score),
    }
}

/// Attempt to read a budget as a decimal number.
///
/// Single underscores between digits are accepted as group separators
/// (`1_000`). Anything unparseable yields `None`, which scores as "no bonus".
pub fn parse_budget(budget: &str) -> Option<f64> {
    let budget = budget.trim();
    if !budget.contains('_') {
        return budget.parse::<f64>().ok();
    }

    let bytes = budget.as_bytes();
    let separators_ok = bytes.iter().enumerate().all(|(i, &b)| {
        b != b'_'
            || (i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    });
    if !separators_ok {
        return None;
    }
    budget.replace('_', "").parse::<f64>().ok()
}

/// Map a score onto its status tier.
pub fn status_for_score(score: u32) -> LeadStatus {
    if score >= HOT_THRESHOLD {
        LeadStatus::Hot
    } else if score >= WARM_THRESHOLD {
        LeadStatus::Warm
    } else {
        LeadStatus::Cold
    }
}

fn has_purchase_intent(interest: &str) -> bool {
    if interest.is_empty() {
        return false;
    }
    let lowered = interest.to_lowercase();
    INTENT_KEYWORDS.iter().any(|k| lowered.contains(k))
}

fn interaction_points(interaction_count: usize) -> u32 {
    let count = u32::try_from(interaction_count).unwrap_or(u32::MAX);
    count
        .saturating_mul(POINTS_PER_INTERACTION)
        .min(INTERACTION_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget_points(budget: &str) -> u32 {
        score_lead("", budget, "", 0).score
    }

    #[test]
    fn budget_above_threshold_scores() {
        assert_eq!(budget_points("150"), 30);
        assert_eq!(budget_points("100.01"), 30);
        assert_eq!(budget_points(" 2500 "), 30);
        assert_eq!(budget_points("1e3"), 30);
    }

    #[test]
    fn budget_boundary_is_strict() {
        assert_eq!(budget_points("100"), 0);
        assert_eq!(budget_points("100.0"), 0);
        assert_eq!(budget_points("99"), 0);
        assert_eq!(budget_points("-500"), 0);
    }

    #[test]
    fn malformed_budget_is_neutral() {
        assert_eq!(budget_points("abc"), 0);
        assert_eq!(budget_points(""), 0);
        assert_eq!(budget_points("$200"), 0);
        assert_eq!(budget_points("NaN"), 0);
        assert_eq!(parse_budget("abc"), None);
        assert_eq!(parse_budget("42.5"), Some(42.5));
    }

    #[test]
    fn budget_digit_separators() {
        assert_eq!(parse_budget("1_000"), Some(1000.0));
        assert_eq!(parse_budget(" 1_000.5 "), Some(1000.5));
        assert_eq!(budget_points("1_000"), 30);
        for bad in ["_1000", "1000_", "1__000", "1_.5", "1._5"] {
            assert_eq!(parse_budget(bad), None, "{bad}");
        }
    }

    #[test]
    fn intent_keywords_case_insensitive() {
        for interest in [
            "I want to BUY a camera",
            "Purchase order for 10 units",
            "placing an Order",
            "we NEED tripods",
            "Urgent request",
            "rebuying",
        ] {
            assert_eq!(score_lead(interest, "", "", 0).score, 30, "{interest}");
        }
    }

    #[test]
    fn no_intent_keywords() {
        assert_eq!(score_lead("just browsing", "", "", 0).score, 0);
        assert_eq!(score_lead("", "", "", 0).score, 0);
    }

    #[test]
    fn any_non_empty_email_scores() {
        assert_eq!(score_lead("", "", "a@b.com", 0).score, 10);
        assert_eq!(score_lead("", "", "not-an-email", 0).score, 10);
        assert_eq!(score_lead("", "", "", 0).score, 0);
    }

    #[test]
    fn interactions_are_capped() {
        let expected = [(0, 0), (1, 10), (2, 20), (3, 30), (4, 30), (10, 30)];
        for (count, points) in expected {
            assert_eq!(score_lead("", "", "", count).score, points, "count={count}");
        }
        assert_eq!(score_lead("", "", "", usize::MAX).score, 30);
    }

    #[test]
    fn status_boundaries() {
        assert_eq!(status_for_score(0), LeadStatus::Cold);
        assert_eq!(status_for_score(39), LeadStatus::Cold);
        assert_eq!(status_for_score(40), LeadStatus::Warm);
        assert_eq!(status_for_score(69), LeadStatus::Warm);
        assert_eq!(status_for_score(70), LeadStatus::Hot);
        assert_eq!(status_for_score(100), LeadStatus::Hot);
    }

    #[test]
    fn hot_lead_scenario() {
        let result = score_lead("I need this urgently", "150", "a@b.com", 2);
        assert_eq!(result.score, 90);
        assert_eq!(result.status, LeadStatus::Hot);
    }

    #[test]
    fn cold_lead_scenario() {
        let result = score_lead("", "abc", "", 0);
        assert_eq!(result.score, 0);
        assert_eq!(result.status, LeadStatus::Cold);
    }

    #[test]
    fn maximum_score_is_one_hundred() {
        let result = score_lead("urgent order", "5000", "x@y.z", 7);
        assert_eq!(result.score, 100);
        assert_eq!(result.status, LeadStatus::Hot);
    }

    #[test]
    fn warm_lead() {
        // intent + email
        let result = score_lead("need a quote", "", "sales@example.com", 0);
        assert_eq!(result.score, 40);
        assert_eq!(result.status, LeadStatus::Warm);
    }
}
