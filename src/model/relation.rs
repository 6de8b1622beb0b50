//! The seven typed gloss relations plus the `examples` reverse view.

use serde::{Deserialize, Serialize};

/// Relation between two glosses.
///
/// `Examples` is not stored on its own: it is the inbound side of
/// `ClarifiesUsage` (A clarifies the usage of B ⇔ A is an example of B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// A→B: A is composed of B.
    Contains,
    Translations,
    NearSynonyms,
    NearHomophones,
    /// A→B: A is an example sentence for B.
    ClarifiesUsage,
    ToBeDifferentiatedFrom,
    Collocations,
    /// Reverse view of `ClarifiesUsage`.
    Examples,
}

impl Relation {
    /// Relations with their own storage, in data-model order.
    pub const STORED: [Relation; 7] = [
        Relation::Contains,
        Relation::Translations,
        Relation::NearSynonyms,
        Relation::NearHomophones,
        Relation::ClarifiesUsage,
        Relation::ToBeDifferentiatedFrom,
        Relation::Collocations,
    ];

    /// Phase-2 expansion order.
    pub const LATERAL: [Relation; 6] = [
        Relation::NearSynonyms,
        Relation::NearHomophones,
        Relation::ClarifiesUsage,
        Relation::ToBeDifferentiatedFrom,
        Relation::Collocations,
        Relation::Examples,
    ];

    /// Field order of an exported record.
    pub const EXPORTED: [Relation; 8] = [
        Relation::Contains,
        Relation::Translations,
        Relation::NearSynonyms,
        Relation::NearHomophones,
        Relation::ClarifiesUsage,
        Relation::ToBeDifferentiatedFrom,
        Relation::Collocations,
        Relation::Examples,
    ];

    /// Wire name, as used in record fields.
    pub fn name(self) -> &'static str {
        match self {
            Relation::Contains => "contains",
            Relation::Translations => "translations",
            Relation::NearSynonyms => "near_synonyms",
            Relation::NearHomophones => "near_homophones",
            Relation::ClarifiesUsage => "clarifies_usage",
            Relation::ToBeDifferentiatedFrom => "to_be_differentiated_from",
            Relation::Collocations => "collocations",
            Relation::Examples => "examples",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::EXPORTED.into_iter().find(|r| r.name() == name)
    }

    pub fn is_symmetric(self) -> bool {
        !matches!(self, Relation::Contains | Relation::ClarifiesUsage | Relation::Examples)
    }

    /// The view maintained on the other endpoint of an asymmetric edge,
    /// if the graph exposes one.
    pub fn inverse(self) -> Option<Relation> {
        match self {
            Relation::ClarifiesUsage => Some(Relation::Examples),
            Relation::Examples => Some(Relation::ClarifiesUsage),
            _ => None,
        }
    }

    pub fn is_reverse_view(self) -> bool {
        self == Relation::Examples
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for r in Relation::EXPORTED {
            assert_eq!(Relation::from_name(r.name()), Some(r));
        }
        assert_eq!(Relation::from_name("contained_by"), None);
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&Relation::ToBeDifferentiatedFrom).unwrap();
        assert_eq!(json, "\"to_be_differentiated_from\"");
    }

    #[test]
    fn test_symmetry_table() {
        let symmetric: Vec<_> = Relation::STORED.into_iter().filter(|r| r.is_symmetric()).collect();
        assert_eq!(
            symmetric,
            vec![
                Relation::Translations,
                Relation::NearSynonyms,
                Relation::NearHomophones,
                Relation::ToBeDifferentiatedFrom,
                Relation::Collocations,
            ]
        );
        assert_eq!(Relation::ClarifiesUsage.inverse(), Some(Relation::Examples));
        assert_eq!(Relation::Contains.inverse(), None);
    }

    #[test]
    fn test_lateral_excludes_contains_and_translations() {
        assert!(!Relation::LATERAL.contains(&Relation::Contains));
        assert!(!Relation::LATERAL.contains(&Relation::Translations));
        assert_eq!(Relation::LATERAL.last(), Some(&Relation::Examples));
    }
}
