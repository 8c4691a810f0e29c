// SPDX-License-Identifier: MIT
// chat/intent.rs — Keyword table and gender detection for the outfit
// assistant.
//
// Pure functions over normalized (lowercased, trimmed) input. The table is
// scanned in order and the first entry with a trigger-keyword substring
// match wins; later entries are never revisited.

/// One intent: trigger keywords, broader fallback search terms, and the
/// category lists per detected gender.
#[derive(Debug)]
pub struct IntentEntry {
    pub keywords: &'static [&'static str],
    pub search_terms: &'static [&'static str],
    pub male_categories: &'static [&'static str],
    pub female_categories: &'static [&'static str],
}

/// Ordered intent table. Order matters: the first matching entry is used.
pub const INTENT_TABLE: &[IntentEntry] = &[
    IntentEntry {
        keywords: &["party", "pesta", "malam", "clubbing"],
        search_terms: &["party", "pesta", "malam", "clubbing", "night"],
        male_categories: &["Kemeja", "Blazer", "T-Shirt", "Pants"],
        female_categories: &["Dress", "Sepatu cewe"],
    },
    IntentEntry {
        keywords: &["nongkrong", "hangout", "jalan", "kumpul"],
        search_terms: &["nongkrong", "casual", "hangout", "jalan", "santai"],
        male_categories: &["T-Shirt", "Pants", "Sepatu cowo"],
        female_categories: &["Dress"],
    },
    IntentEntry {
        keywords: &["date", "kencan", "romantis", "makan malam"],
        search_terms: &["date", "kencan", "romantis", "dinner", "malam"],
        male_categories: &["Kemeja", "Blazer", "Pants"],
        female_categories: &["Dress"],
    },
    IntentEntry {
        keywords: &["kerja", "kantor", "office", "meeting"],
        search_terms: &["kerja", "kantor", "office", "formal", "business"],
        male_categories: &["Kemeja", "Blazer", "Pants"],
        female_categories: &["Dress"],
    },
    IntentEntry {
        keywords: &["olahraga", "sport", "gym", "lari", "fitness"],
        search_terms: &["olahraga", "sport", "gym", "lari", "fitness", "workout"],
        male_categories: &["T-Shirt", "Pants"],
        female_categories: &["Dress"],
    },
    IntentEntry {
        keywords: &["liburan", "traveling", "jalan-jalan", "wisata"],
        search_terms: &["liburan", "travel", "wisata", "jalan-jalan", "vacation"],
        male_categories: &["T-Shirt", "Pants"],
        female_categories: &["Dress"],
    },
];

const MALE_TOKENS: &[&str] = &["cowo", "pria", "laki", "male"];
const FEMALE_TOKENS: &[&str] = &["cewe", "wanita", "perempuan", "female"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Neutral,
}

/// Detect a gender hint in normalized input. When both token sets are
/// present the male check runs first and wins.
pub fn detect_gender(input: &str) -> Gender {
    if MALE_TOKENS.iter().any(|t| input.contains(t)) {
        Gender::Male
    } else if FEMALE_TOKENS.iter().any(|t| input.contains(t)) {
        Gender::Female
    } else {
        Gender::Neutral
    }
}

/// First table entry with a trigger-keyword substring match, or `None`.
pub fn match_intent(input: &str) -> Option<&'static IntentEntry> {
    if input.is_empty() {
        return None;
    }
    INTENT_TABLE
        .iter()
        .find(|entry| entry.keywords.iter().any(|kw| input.contains(kw)))
}

/// Category list for a matched intent: the gendered list when a gender was
/// detected, the union of both lists otherwise.
pub fn target_categories(entry: &IntentEntry, gender: Gender) -> Vec<String> {
    let cats: Vec<&str> = match gender {
        Gender::Male => entry.male_categories.to_vec(),
        Gender::Female => entry.female_categories.to_vec(),
        Gender::Neutral => entry
            .male_categories
            .iter()
            .chain(entry.female_categories.iter())
            .copied()
            .collect(),
    };
    cats.into_iter().map(str::to_string).collect()
}

/// Deduplicated term set for the substring fallback stage: the matched
/// entry's broader search terms (if any) plus every input token longer
/// than two characters.
pub fn fallback_terms(entry: Option<&IntentEntry>, input: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    if let Some(entry) = entry {
        terms.extend(entry.search_terms.iter().map(|t| t.to_string()));
    }
    terms.extend(input.split_whitespace().map(str::to_string));

    let mut unique: Vec<String> = Vec::new();
    for term in terms {
        if term.len() > 2 && !unique.contains(&term) {
            unique.push(term);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_male_token_selects_male_categories_of_first_match() {
        let input = "mau nongkrong sama temen cowo";
        assert_eq!(detect_gender(input), Gender::Male);
        let entry = match_intent(input).unwrap();
        assert_eq!(entry.keywords[0], "nongkrong");
        assert_eq!(
            target_categories(entry, Gender::Male),
            vec!["T-Shirt", "Pants", "Sepatu cowo"]
        );
    }

    #[test]
    fn test_first_entry_wins_in_table_order() {
        // "pesta" (entry 0) and "kencan" (entry 2) both present.
        let entry = match_intent("kencan lalu pesta malam").unwrap();
        assert_eq!(entry.keywords[0], "party");
    }

    #[test]
    fn test_both_gender_tokens_male_wins() {
        assert_eq!(detect_gender("outfit buat cowo dan cewe"), Gender::Male);
    }

    #[test]
    fn test_neutral_uses_union_of_both_lists() {
        let entry = match_intent("outfit buat pesta").unwrap();
        let cats = target_categories(entry, Gender::Neutral);
        assert_eq!(cats, vec!["Kemeja", "Blazer", "T-Shirt", "Pants", "Dress", "Sepatu cewe"]);
    }

    #[test]
    fn test_no_trigger_keyword_matches_nothing() {
        assert!(match_intent("beli sesuatu yang bagus").is_none());
        assert!(match_intent("").is_none());
    }

    #[test]
    fn test_fallback_terms_dedup_and_length_filter() {
        let entry = match_intent("mau nongkrong di mall").unwrap();
        let terms = fallback_terms(Some(entry), "mau nongkrong di mall");
        // Entry terms first, then input tokens; "nongkrong" not duplicated,
        // "di" dropped (only terms longer than two characters survive).
        assert!(terms.contains(&"casual".to_string()));
        assert!(terms.contains(&"mall".to_string()));
        assert!(terms.contains(&"mau".to_string()));
        assert!(!terms.contains(&"di".to_string()));
        assert_eq!(terms.iter().filter(|t| *t == "nongkrong").count(), 1);
    }

    #[test]
    fn test_fallback_terms_without_intent_uses_input_tokens_only() {
        let terms = fallback_terms(None, "kemeja flanel merah");
        assert_eq!(terms, vec!["kemeja", "flanel", "merah"]);
    }
}
