use super::*;

fn data(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn registry_covers_the_full_catalogue() {
    let labels = [
        "1040_p1",
        "1040_sch_c",
        "1120s_p1",
        "1120_p1",
        "1065_p1",
        "1065_k1",
        "1120s_k1",
        "acord_25",
        "acord_28",
        "drivers_license",
        "passport",
        "lease_document",
        "certificate_of_good_standing",
        "business_license",
        "1120s_bal_sheet",
        "1065_bal_sheet",
        "1120_bal_sheet",
    ];

    for label in labels {
        assert!(field_mapping(label).is_some(), "missing mapping for {label}");
        assert!(
            !identity_rules(label).is_empty(),
            "missing identity rules for {label}"
        );
    }
}

#[test]
fn unmapped_labels_are_absent() {
    assert!(field_mapping("unknown").is_none());
    assert!(field_mapping("unknown_text_type").is_none());
    assert!(field_mapping("w2").is_none());
    assert!(identity_rules("unknown").is_empty());
}

#[test]
fn only_balance_sheets_are_cross_page() {
    for label in ["1120s_bal_sheet", "1065_bal_sheet", "1120_bal_sheet"] {
        assert!(field_mapping(label).unwrap().cross_page, "{label}");
    }
    for label in ["1040_p1", "drivers_license", "acord_25", "1065_k1"] {
        assert!(!field_mapping(label).unwrap().cross_page, "{label}");
    }
}

#[test]
fn field_spec_trims_and_skips_blank() {
    let spec = ValueSpec::Field("ein");
    assert_eq!(
        spec.resolve(&data(&[("ein", " 12-3456789 ")])),
        Some("12-3456789".to_string())
    );
    assert_eq!(spec.resolve(&data(&[("ein", "   ")])), None);
    assert_eq!(spec.resolve(&data(&[])), None);
}

#[test]
fn normalized_resolution_lowercases() {
    let spec = ValueSpec::Field("business_name");
    assert_eq!(
        spec.resolve_normalized(&data(&[("business_name", "  Acme LLC ")])),
        Some("acme llc".to_string())
    );
}

#[test]
fn first_of_takes_first_non_blank() {
    let spec = ValueSpec::FirstOf(&["business_ein", "ein"]);
    assert_eq!(
        spec.resolve_normalized(&data(&[("business_ein", ""), ("ein", "11-1111111")])),
        Some("11-1111111".to_string())
    );
    assert_eq!(
        spec.resolve_normalized(&data(&[("business_ein", "22-2222222"), ("ein", "11-1111111")])),
        Some("22-2222222".to_string())
    );
}

#[test]
fn join_skips_blank_parts() {
    let spec = ValueSpec::Join(&["street_address", "city_state"]);
    assert_eq!(
        spec.resolve(&data(&[("street_address", "1 Main St"), ("city_state", "Derry, NH")])),
        Some("1 Main St Derry, NH".to_string())
    );
    assert_eq!(
        spec.resolve(&data(&[("street_address", "1 Main St")])),
        Some("1 Main St".to_string())
    );
    assert_eq!(spec.resolve(&data(&[])), None);
}

#[test]
fn composite_requires_every_field() {
    let spec = ValueSpec::Composite(&["first_name", "last_name", "dob"]);

    assert_eq!(
        spec.resolve_normalized(&data(&[
            ("first_name", "Jane"),
            ("last_name", "Doe"),
            ("dob", "1980-01-02"),
        ])),
        Some("janedoe1980-01-02".to_string())
    );

    // Missing dob: the whole composite yields nothing.
    assert_eq!(
        spec.resolve_normalized(&data(&[("first_name", "Jane"), ("last_name", "Doe")])),
        None
    );
    assert_eq!(
        spec.resolve_normalized(&data(&[
            ("first_name", "Jane"),
            ("last_name", "Doe"),
            ("dob", "  "),
        ])),
        None
    );
}

#[test]
fn k1_rules_declare_both_roles() {
    let rules = identity_rules("1065_k1");
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].kind, EntityKind::Business);
    assert_eq!(rules[1].kind, EntityKind::Person);
}

#[test]
fn balance_sheet_falls_back_to_business_name() {
    let rules = identity_rules("1120s_bal_sheet");
    let id = rules[0]
        .identifier
        .resolve_normalized(&data(&[("business_name", "Acme LLC")]));
    assert_eq!(id, Some("acme llc".to_string()));
}
