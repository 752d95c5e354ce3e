//! Keyword-based offense classification.
//!
//! Each charge text is matched (case-insensitively, by substring) against a
//! fixed keyword list per category; when several categories match, the one
//! with the highest severity wins, ties going to the earlier category.

/// Label for charge texts that match no category.
pub const UNCLASSIFIED: &str = "Non classé";

struct Category {
    label: &'static str,
    severity: u8,
    keywords: &'static [&'static str],
}

const CATEGORIES: &[Category] = &[
    Category {
        label: "Terrorisme et sécurité publique",
        severity: 10,
        keywords: &[
            "terrorism", "terrorist", "armed formation", "explosive", "bomb", "attack",
            "recruit", "training", "organization", "wmd", "conspiracy to kill", "armed group",
            "national defence", "terror plot", "bombing", "mass destruction",
        ],
    },
    Category {
        label: "Meurtre, tentative de meurtre et crimes violents",
        severity: 9,
        keywords: &[
            "murder", "homicide", "attempted murder", "assault", "aggravated assault",
            "armed robbery", "violence", "robbery", "femicidio", "feminicidio", "asesinato",
            "agravado", "homicidio", "manslaughter", "kill", "slaying",
        ],
    },
    Category {
        label: "Crimes sexuels aggravés et abus",
        severity: 8,
        keywords: &[
            "rape", "sexual assault", "sexual abuse", "indecent", "sex offence", "sodomy",
            "abuso", "viol", "violación", "agression sexuelle", "statutory rape",
            "harcèlement sexuel", "violence sexuelle", "attentat à la pudeur",
        ],
    },
    Category {
        label: "Exploitation et pornographie infantile",
        severity: 8,
        keywords: &[
            "child pornography", "pornography", "mineur", "minor", "child",
            "indecency with a child", "sexual abuse of minor", "exploitation enfant",
            "abus sur mineur", "child abuse",
        ],
    },
    Category {
        label: "Traite des êtres humains et enlèvements",
        severity: 7,
        keywords: &[
            "trafficking", "human", "kidnapping", "hostage", "abduction", "slavery", "migrant",
            "illegal entry", "smuggling", "captivity", "traite", "enlèvement", "séquestration",
            "aide à l'entrée irrégulière", "migration illégale",
        ],
    },
    Category {
        label: "Criminalité organisée et conspiration",
        severity: 6,
        keywords: &[
            "organized crime", "criminal organization", "association de malfaiteurs",
            "conspiracy", "participation", "illicit association", "gang", "group",
            "asociacion ilicita", "membership of a criminal organisation", "union criminelle",
        ],
    },
    Category {
        label: "Cybercriminalité et crimes technologiques",
        severity: 5,
        keywords: &[
            "cybercrime", "hacking", "malware", "phishing", "ransomware", "computer", "digital",
            "data", "cryptology", "encryption", "forgery digital", "piratage", "usurpation",
            "intrusion", "cryptographie", "refus de remettre clé de chiffrement",
        ],
    },
    Category {
        label: "Trafic de drogues et substances illicites",
        severity: 5,
        keywords: &[
            "drug", "drugs", "narcotic", "psychotropic", "trafficking", "marijuana", "cocaine",
            "heroin", "distribution", "stupéfiant", "importation", "transport", "unauthorised",
            "production", "manufacturing", "cannabis", "substance", "illicit traffic",
        ],
    },
    Category {
        label: "Crimes financiers et corruption",
        severity: 4,
        keywords: &[
            "fraud", "money laundering", "bribery", "forgery", "financial", "corruption",
            "laundering", "breach of trust", "false declaration", "market manipulation",
            "escroquerie", "abus de confiance", "blanchiment", "détournement", "pots-de-vin",
            "fraude fiscale",
        ],
    },
    Category {
        label: "Trafic d'armes et explosifs",
        severity: 4,
        keywords: &[
            "firearms", "weapons", "arms", "ammunition", "explosives", "illegal possession",
            "transport", "acquisition", "armas", "munitions", "fabrication d'explosifs",
            "arme de guerre", "arms act", "catégorie b", "catégorie c", "catégorie d",
        ],
    },
    Category {
        label: "Crimes environnementaux et patrimoine culturel",
        severity: 3,
        keywords: &[
            "environment", "wildlife", "pollution", "cultural", "heritage", "artefact",
            "environmental", "illegal logging", "braconnage", "espèces protégées",
            "trafic d'ivoire", "musée", "art theft",
        ],
    },
    Category {
        label: "Autres infractions",
        severity: 2,
        keywords: &[
            "evasion", "escape", "absconding", "custody", "unlawful", "detention",
            "obstruction", "entrave", "fuite", "détention illégale", "désobéissance",
        ],
    },
];

/// Classifies a charge text.
///
/// Returns an empty string for empty input and [`UNCLASSIFIED`] when no
/// keyword matches.
#[must_use]
pub fn classify_offense(text: &str) -> &'static str {
    if text.is_empty() {
        return "";
    }
    let lowered = text.to_lowercase();
    let mut best: Option<&Category> = None;
    for category in CATEGORIES {
        let matched = category.keywords.iter().any(|kw| lowered.contains(kw));
        if matched && best.is_none_or(|b| category.severity > b.severity) {
            best = Some(category);
        }
    }
    best.map_or(UNCLASSIFIED, |category| category.label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_yields_empty_label() {
        assert_eq!(classify_offense(""), "");
    }

    #[test]
    fn test_unmatched_text_is_unclassified() {
        assert_eq!(classify_offense("jaywalking"), UNCLASSIFIED);
    }

    #[test]
    fn test_highest_severity_wins() {
        // "robbery" (9) and "fraud" (4) both match.
        assert_eq!(
            classify_offense("Armed ROBBERY and fraud"),
            "Meurtre, tentative de meurtre et crimes violents"
        );
    }

    #[test]
    fn test_tie_goes_to_earlier_category() {
        // "rape" (8, sexual crimes) and "child" (8, child exploitation).
        assert_eq!(
            classify_offense("rape of a child"),
            "Crimes sexuels aggravés et abus"
        );
    }

    #[test]
    fn test_non_ascii_keywords_match() {
        assert_eq!(
            classify_offense("Blanchiment d'argent"),
            "Crimes financiers et corruption"
        );
    }
}
