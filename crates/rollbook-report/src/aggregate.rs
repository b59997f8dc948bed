use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::warn;

use rollbook_types::{EnrollmentStatus, PaymentStatus, Record};

/// Total collected in one billing period.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PeriodRevenue {
    pub period: String,
    pub total: f64,
}

/// Number of active enrollments in one class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassHeadcount {
    pub class_id: String,
    /// Empty when the class id does not resolve to a known class.
    pub class_name: String,
    pub active: usize,
}

/// Parse a stored amount. Accepts `150`, `150.5` and the comma-decimal
/// `150,50`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>()
        .ok()
        .or_else(|| {
            if raw.contains('.') {
                None
            } else {
                raw.replacen(',', ".", 1).parse::<f64>().ok()
            }
        })
        .filter(|amount| amount.is_finite())
}

/// Sum of `amount` over paid payments, grouped by `period`, sorted by period.
///
/// Payments in any other status are ignored. An amount that does not parse
/// counts as zero and is logged.
pub fn revenue_by_period(payments: &[Record]) -> Vec<PeriodRevenue> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for payment in payments {
        let paid = payment
            .get_or_empty("status")
            .parse::<PaymentStatus>()
            .is_ok_and(PaymentStatus::is_paid);
        if !paid {
            continue;
        }
        let raw = payment.get_or_empty("amount");
        let amount = parse_amount(raw).unwrap_or_else(|| {
            warn!(id = payment.id().unwrap_or_default(), amount = raw, "unparseable amount counted as zero");
            0.0
        });
        *totals
            .entry(payment.get_or_empty("period").to_string())
            .or_default() += amount;
    }
    totals
        .into_iter()
        .map(|(period, total)| PeriodRevenue { period, total })
        .collect()
}

/// Active enrollments per class, labelled with the class name and sorted by
/// name (then id).
pub fn active_enrollments_by_class(enrollments: &[Record], classes: &[Record]) -> Vec<ClassHeadcount> {
    let names: HashMap<&str, &str> = classes
        .iter()
        .filter_map(|class| Some((class.id()?, class.get_or_empty("name"))))
        .collect();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for enrollment in enrollments {
        let active = enrollment.get_or_empty("status").parse::<EnrollmentStatus>()
            == Ok(EnrollmentStatus::Active);
        if active {
            *counts.entry(enrollment.get_or_empty("class_id")).or_default() += 1;
        }
    }

    let mut rows: Vec<ClassHeadcount> = counts
        .into_iter()
        .map(|(class_id, active)| ClassHeadcount {
            class_id: class_id.to_string(),
            class_name: names.get(class_id).copied().unwrap_or_default().to_string(),
            active,
        })
        .collect();
    rows.sort_by(|a, b| {
        a.class_name
            .cmp(&b.class_name)
            .then_with(|| a.class_id.cmp(&b.class_id))
    });
    rows
}
