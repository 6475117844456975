//! Field-Mapping Registry: which extracted fields establish identity for
//! each document type, and how identifiers are assembled from them.
//!
//! Two static tables, both keyed by lowercased label:
//! - [`field_mapping`]: the person/business identity fields and the
//!   cross-page flag. A label missing here means "nothing to resolve".
//! - [`identity_rules`]: declarative (role, identifier, name, info) entries
//!   consumed by one generic resolution routine. A label present in the
//!   registry but absent here performs no matching.

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use crate::store::EntityKind;

/// Normalizes a raw field value the way identifiers are compared: trimmed
/// and lowercased. Empty input normalizes to the empty string.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// How a value is assembled from a page's extracted key/value data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSpec {
    /// A single field; absent or blank yields nothing.
    Field(&'static str),
    /// First non-blank field in the list.
    FirstOf(&'static [&'static str]),
    /// Non-blank fields joined with a single space (addresses, full names).
    Join(&'static [&'static str]),
    /// Every field required; normalized values concatenated with no
    /// separator. Used by ID documents keying on first+last+dob, where the
    /// concatenation is the stored identifier format.
    Composite(&'static [&'static str]),
}

impl ValueSpec {
    /// Resolves the spec against extracted data, trimmed but otherwise raw.
    /// Returns `None` when the spec cannot be satisfied.
    pub fn resolve(&self, data: &BTreeMap<String, String>) -> Option<String> {
        self.assemble(data, |v| v.trim().to_string())
    }

    /// Resolves the spec with identifier normalization (trim + lowercase)
    /// applied to every part.
    pub fn resolve_normalized(&self, data: &BTreeMap<String, String>) -> Option<String> {
        self.assemble(data, |v| normalize(v))
    }

    fn assemble(
        &self,
        data: &BTreeMap<String, String>,
        clean: impl Fn(&str) -> String,
    ) -> Option<String> {
        let non_blank = |field: &str| -> Option<String> {
            data.get(field)
                .map(|v| clean(v))
                .filter(|v| !v.is_empty())
        };

        match self {
            ValueSpec::Field(field) => non_blank(field),
            ValueSpec::FirstOf(fields) => fields.iter().find_map(|f| non_blank(f)),
            ValueSpec::Join(fields) => {
                let parts: Vec<String> = fields.iter().filter_map(|f| non_blank(f)).collect();
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(" "))
                }
            }
            ValueSpec::Composite(fields) => {
                let mut out = String::new();
                for field in *fields {
                    out.push_str(&non_blank(field)?);
                }
                Some(out)
            }
        }
    }
}

/// One identity signal for a document type: which entity role it resolves,
/// how its identifier and display name are built, and which attributes go
/// into the entity's info bag.
#[derive(Debug, Clone, Copy)]
pub struct IdentityRule {
    pub kind: EntityKind,
    pub identifier: ValueSpec,
    pub entity_name: ValueSpec,
    pub info: &'static [(&'static str, ValueSpec)],
}

/// Registry entry: identity fields per role plus the cross-page flag.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub person: &'static [&'static str],
    pub business: &'static [&'static str],
    /// Multi-page forms whose identity fields may appear on any page; the
    /// resolver merges extracted data across the whole upload before
    /// evaluating rules.
    pub cross_page: bool,
}

const BUSINESS_TAX_RETURN: FieldMapping = FieldMapping {
    person: &[],
    business: &["ein", "business_name", "street_address", "city_state"],
    cross_page: false,
};

const K1: FieldMapping = FieldMapping {
    person: &["shareholder_name", "ssn_last_4"],
    business: &["business_ein", "business_name"],
    cross_page: false,
};

const ACORD: FieldMapping = FieldMapping {
    person: &[],
    business: &["named_insured_name", "named_insured_address"],
    cross_page: false,
};

const BAL_SHEET: FieldMapping = FieldMapping {
    person: &[],
    business: &["ein", "business_name"],
    cross_page: true,
};

const BUSINESS_NAME_ONLY: FieldMapping = FieldMapping {
    person: &[],
    business: &["business_name"],
    cross_page: false,
};

/// Looks up the registry entry for a lowercased document-type label.
/// `None` means resolution is a no-op for this label, not an error.
pub fn field_mapping(doc_type: &str) -> Option<&'static FieldMapping> {
    match doc_type {
        "1040_p1" => Some(&FieldMapping {
            person: &["primary_first_name", "primary_last_name", "primary_ssn_last_4"],
            business: &[],
            cross_page: false,
        }),
        "1040_sch_c" => Some(&FieldMapping {
            person: &["ssn_last_4"],
            business: &["ein", "business_name", "street_address", "city_state"],
            cross_page: false,
        }),
        "1120s_p1" | "1120_p1" | "1065_p1" => Some(&BUSINESS_TAX_RETURN),
        "1065_k1" | "1120s_k1" => Some(&K1),
        "acord_25" | "acord_28" => Some(&ACORD),
        "drivers_license" => Some(&FieldMapping {
            person: &["first_name", "last_name", "street_address", "city_state_zip", "dob"],
            business: &[],
            cross_page: false,
        }),
        "passport" => Some(&FieldMapping {
            person: &["first_name", "last_name", "dob", "country"],
            business: &[],
            cross_page: false,
        }),
        "lease_document" => Some(&FieldMapping {
            person: &["renter_name"],
            business: &[],
            cross_page: false,
        }),
        "certificate_of_good_standing" | "business_license" => Some(&BUSINESS_NAME_ONLY),
        "1120s_bal_sheet" | "1065_bal_sheet" | "1120_bal_sheet" => Some(&BAL_SHEET),
        _ => None,
    }
}

/// Identity-extraction rules per document type. Empty for labels with no
/// matching semantics (even if they appear in the registry).
pub fn identity_rules(doc_type: &str) -> &'static [IdentityRule] {
    match doc_type {
        "1040_p1" => &[IdentityRule {
            kind: EntityKind::Person,
            identifier: ValueSpec::Field("primary_ssn_last_4"),
            entity_name: ValueSpec::Join(&["primary_first_name", "primary_last_name"]),
            info: &[
                ("ssn_last_4", ValueSpec::Field("primary_ssn_last_4")),
                ("address", ValueSpec::Field("full_address")),
            ],
        }],
        "1040_sch_c" => &[
            IdentityRule {
                kind: EntityKind::Business,
                identifier: ValueSpec::Field("ein"),
                entity_name: ValueSpec::Field("business_name"),
                info: &[
                    ("ein", ValueSpec::Field("ein")),
                    ("address", ValueSpec::Join(&["street_address", "city_state"])),
                ],
            },
            IdentityRule {
                kind: EntityKind::Person,
                identifier: ValueSpec::Field("ssn_last_4"),
                entity_name: ValueSpec::Field("owner_name"),
                info: &[("ssn_last_4", ValueSpec::Field("ssn_last_4"))],
            },
        ],
        "1120s_p1" | "1120_p1" | "1065_p1" => &[IdentityRule {
            kind: EntityKind::Business,
            identifier: ValueSpec::Field("ein"),
            entity_name: ValueSpec::Field("business_name"),
            info: &[
                ("ein", ValueSpec::Field("ein")),
                ("address", ValueSpec::Join(&["street_address", "city_state"])),
            ],
        }],
        "1065_k1" | "1120s_k1" => &[
            IdentityRule {
                kind: EntityKind::Business,
                identifier: ValueSpec::FirstOf(&["business_ein", "ein"]),
                entity_name: ValueSpec::Field("business_name"),
                info: &[("ein", ValueSpec::FirstOf(&["business_ein", "ein"]))],
            },
            IdentityRule {
                kind: EntityKind::Person,
                identifier: ValueSpec::Field("ssn_last_4"),
                entity_name: ValueSpec::Field("shareholder_name"),
                info: &[("ssn_last_4", ValueSpec::Field("ssn_last_4"))],
            },
        ],
        "acord_25" | "acord_28" => &[IdentityRule {
            kind: EntityKind::Business,
            identifier: ValueSpec::Field("named_insured_name"),
            entity_name: ValueSpec::Field("named_insured_name"),
            info: &[("address", ValueSpec::Field("named_insured_address"))],
        }],
        "drivers_license" => &[IdentityRule {
            kind: EntityKind::Person,
            identifier: ValueSpec::Composite(&["first_name", "last_name", "dob"]),
            entity_name: ValueSpec::Join(&["first_name", "last_name"]),
            info: &[
                ("dob", ValueSpec::Field("dob")),
                ("address", ValueSpec::Join(&["street_address", "city_state_zip"])),
            ],
        }],
        "passport" => &[IdentityRule {
            kind: EntityKind::Person,
            identifier: ValueSpec::Composite(&["first_name", "last_name", "dob"]),
            entity_name: ValueSpec::Join(&["first_name", "last_name"]),
            info: &[
                ("dob", ValueSpec::Field("dob")),
                ("country", ValueSpec::Field("country")),
            ],
        }],
        "lease_document" => &[IdentityRule {
            kind: EntityKind::Person,
            identifier: ValueSpec::Field("renter_name"),
            entity_name: ValueSpec::Field("renter_name"),
            info: &[],
        }],
        "certificate_of_good_standing" | "business_license" => &[IdentityRule {
            kind: EntityKind::Business,
            identifier: ValueSpec::Field("business_name"),
            entity_name: ValueSpec::Field("business_name"),
            info: &[],
        }],
        "1120s_bal_sheet" | "1065_bal_sheet" | "1120_bal_sheet" => &[IdentityRule {
            kind: EntityKind::Business,
            identifier: ValueSpec::FirstOf(&["ein", "business_name"]),
            entity_name: ValueSpec::Field("business_name"),
            info: &[("ein", ValueSpec::Field("ein"))],
        }],
        _ => &[],
    }
}
