//! Display labels for features and values.

use crate::types::FeatureValue;

/// Labels for the attributes of the credit dataset the scoring model is trained on.
const FEATURE_LABELS: &[(&str, &str)] = &[
    ("checking_status", "Checking Account Status"),
    ("duration", "Loan Duration"),
    ("credit_history", "Credit History"),
    ("purpose", "Loan Purpose"),
    ("credit_amount", "Credit Amount"),
    ("savings_status", "Savings"),
    ("employment", "Employment Duration"),
    ("installment_commitment", "Installment Rate"),
    ("personal_status", "Personal Status"),
    ("other_parties", "Other Debtors / Guarantors"),
    ("residence_since", "Years at Residence"),
    ("property_magnitude", "Property"),
    ("age", "Age"),
    ("other_payment_plans", "Other Installment Plans"),
    ("housing", "Housing"),
    ("existing_credits", "Existing Credits"),
    ("job", "Job"),
    ("num_dependents", "Dependents"),
    ("own_telephone", "Telephone"),
    ("foreign_worker", "Foreign Worker"),
];

/// Human-readable label for a feature name.
///
/// Known dataset attributes use their dictionary label; anything else is split on
/// `_`, `-` and spaces and title-cased.
pub fn humanize_feature(name: &str) -> String {
    let normalized: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect();
    if let Some((_, label)) = FEATURE_LABELS.iter().find(|(k, _)| *k == normalized) {
        return (*label).to_string();
    }

    normalized
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Display form of a raw feature value.
pub fn format_value(value: &FeatureValue) -> String {
    match value {
        FeatureValue::Flag(true) => "yes".to_string(),
        FeatureValue::Flag(false) => "no".to_string(),
        FeatureValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{:.0}", n),
        FeatureValue::Number(n) => format!("{:.2}", n),
        FeatureValue::Text(s) => s
            .trim()
            .trim_matches('\'')
            .replace('_', " "),
    }
}
