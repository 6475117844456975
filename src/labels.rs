//! Document-type label catalogue and sentinel values.
//!
//! Classification always yields a label: one of the catalogued type strings, or
//! one of the three sentinels when no stage accepts.

/// No stage produced a confident label.
pub const UNKNOWN: &str = "unknown";

/// Text-heavy page that failed the keyword and text stages; assumed to be an
/// unclassifiable tax-form variant not worth an image-based guess.
pub const UNKNOWN_TEXT_TYPE: &str = "unknown_text_type";

/// Zero-shot stages recognized a tax document without a specific form type.
pub const UNKNOWN_TAX_FORM_TYPE: &str = "unknown_tax_form_type";

/// The reserved "could not classify" outcomes.
pub const SENTINELS: &[&str] = &[UNKNOWN, UNKNOWN_TEXT_TYPE, UNKNOWN_TAX_FORM_TYPE];

/// Returns `true` for sentinel labels, which carry no extractable fields and
/// skip entity resolution.
pub fn is_sentinel(label: &str) -> bool {
    SENTINELS.contains(&label)
}

/// Fallback catalogue for the zero-shot stages: natural-language hypothesis
/// prompts paired with the canonical type string each one maps to.
///
/// The prompts are what the entailment/similarity models score against; the
/// cascade translates the winning prompt back through this table. The tax-form
/// prompt deliberately maps to a sentinel: the zero-shot stages can tell a page
/// is *some* tax document without knowing which form.
pub const FALLBACK_CATALOGUE: &[(&str, &str)] = &[
    (
        "This is a government-issued driver's license.",
        "drivers_license",
    ),
    ("This is a government-issued passport.", "passport"),
    (
        "This a legal lease agreement between a landlord and tenant, with lease agreement verbiage.",
        "lease_document",
    ),
    (
        "This a certificate verifying good standing of a business, issued or provided by a state agency.",
        "certificate_of_good_standing",
    ),
    (
        "This a document issued or provided by a state or locality that explicitly authorizes a business to legally operate, and explicitly states it needs to be displayed.",
        "business_license",
    ),
    (
        "This is a tax document used for financial reporting, tax filing, or recording business financials.",
        UNKNOWN_TAX_FORM_TYPE,
    ),
];

/// The hypothesis prompts, in catalogue order.
pub fn fallback_prompts() -> Vec<&'static str> {
    FALLBACK_CATALOGUE.iter().map(|(prompt, _)| *prompt).collect()
}

/// Translates a fallback prompt back to its canonical type string.
pub fn canonical_fallback_label(prompt: &str) -> Option<&'static str> {
    FALLBACK_CATALOGUE
        .iter()
        .find(|(p, _)| *p == prompt)
        .map(|(_, label)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_sentinels() {
        assert!(is_sentinel(UNKNOWN));
        assert!(is_sentinel(UNKNOWN_TEXT_TYPE));
        assert!(is_sentinel(UNKNOWN_TAX_FORM_TYPE));
        assert!(!is_sentinel("drivers_license"));
    }

    #[test]
    fn every_prompt_round_trips() {
        for (prompt, label) in FALLBACK_CATALOGUE {
            assert_eq!(canonical_fallback_label(prompt), Some(*label));
        }
        assert_eq!(canonical_fallback_label("not a prompt"), None);
    }

    #[test]
    fn tax_prompt_maps_to_sentinel() {
        let (_, label) = FALLBACK_CATALOGUE.last().unwrap();
        assert!(is_sentinel(label));
    }
}
