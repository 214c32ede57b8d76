//! Post-processing fixups for NER spans tagged `person`, correcting two
//! common misclassifications: product model numbers ("iPhone 15 Pro") and
//! food names read as proper nouns ("Caesar Salad").

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

/// Common titles stripped from the front of a person name before it's
/// used as a graph identity.
fn person_titles() -> &'static HashSet<&'static str> {
    static TITLES: OnceLock<HashSet<&'static str>> = OnceLock::new();
    TITLES.get_or_init(|| {
        [
            "dr", "dr.", "mr", "mr.", "mrs", "mrs.", "ms", "ms.", "miss", "prof", "prof.",
            "professor", "sir", "madam", "rev", "rev.",
        ]
        .into_iter()
        .collect()
    })
}

pub fn strip_person_title(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    if parts.len() > 1 && person_titles().contains(parts[0].to_lowercase().trim_end_matches('.')) {
        parts[1..].join(" ")
    } else {
        name.to_string()
    }
}

fn product_brand_words() -> &'static HashSet<&'static str> {
    static BRANDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    BRANDS.get_or_init(|| {
        [
            "iphone", "ipad", "macbook", "galaxy", "pixel", "kindle", "playstation", "xbox",
            "toyota", "honda", "ford", "tesla", "samsung", "sony", "nike", "adidas",
        ]
        .into_iter()
        .collect()
    })
}

fn food_names() -> &'static HashSet<&'static str> {
    static FOODS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    FOODS.get_or_init(|| {
        [
            "pizza", "sushi", "burger", "pasta", "salad", "taco", "sandwich", "burrito", "ramen",
            "lasagna", "risotto", "falafel", "dumpling", "pancake", "waffle",
        ]
        .into_iter()
        .collect()
    })
}

fn model_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^[a-z]+-?\d+[a-z0-9]*$").unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonVerdict {
    Keep,
    Reject,
    ReclassifyAsProduct,
}

/// Judge a person-typed NER span after title-stripping. `name` should
/// already have `strip_person_title` applied.
pub fn classify_person(name: &str) -> PersonVerdict {
    let lower = name.to_lowercase();

    let looks_like_model_number = name
        .split_whitespace()
        .any(|token| model_number_pattern().is_match(token));
    let mentions_product_brand = product_brand_words().iter().any(|brand| lower.contains(brand));

    if looks_like_model_number && !mentions_product_brand {
        return PersonVerdict::Reject;
    }
    if food_names().iter().any(|food| lower.contains(food)) {
        return PersonVerdict::Reject;
    }
    if mentions_product_brand {
        return PersonVerdict::ReclassifyAsProduct;
    }

    PersonVerdict::Keep
}
