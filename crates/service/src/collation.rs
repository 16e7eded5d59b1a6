//! Russian collation for city names.
//!
//! Primary level: punctuation, then digits, then the Russian alphabet (`ё` shares the
//! weight of `е`), then other Cyrillic, then Latin, case-insensitive. Secondary level
//! puts `е` before `ё`. Tertiary level puts lowercase before uppercase.

use std::cmp::Ordering;

const RUSSIAN: &str = "абвгдежзийклмнопрстуфхцчшщъыьэюя";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Class {
    Space,
    Punct,
    Digit,
    Russian,
    OtherCyrillic,
    Latin,
    Other,
}

fn primary(c: char) -> (Class, u32) {
    let lower = c.to_lowercase().next().unwrap_or(c);
    let lower = if lower == 'ё' { 'е' } else { lower };
    if lower.is_whitespace() {
        (Class::Space, 0)
    } else if lower.is_ascii_digit() {
        (Class::Digit, lower as u32)
    } else if let Some(pos) = RUSSIAN.chars().position(|r| r == lower) {
        (Class::Russian, pos as u32)
    } else if ('\u{0400}'..='\u{04FF}').contains(&lower) {
        (Class::OtherCyrillic, lower as u32)
    } else if lower.is_ascii_alphabetic() {
        (Class::Latin, lower as u32)
    } else if lower.is_ascii_punctuation() {
        (Class::Punct, lower as u32)
    } else {
        (Class::Other, lower as u32)
    }
}

fn secondary(c: char) -> u8 {
    matches!(c, 'ё' | 'Ё') as u8
}

fn tertiary(c: char) -> u8 {
    c.is_uppercase() as u8
}

/// Compare two strings the way a Russian-locale collator would.
pub fn compare_ru(a: &str, b: &str) -> Ordering {
    a.chars().map(primary).cmp(b.chars().map(primary))
        .then_with(|| a.chars().map(secondary).cmp(b.chars().map(secondary)))
        .then_with(|| a.chars().map(tertiary).cmp(b.chars().map(tertiary)))
}

pub fn sort_by_name_ru<T>(items: &mut [T], name: impl Fn(&T) -> &str) {
    items.sort_by(|x, y| compare_ru(name(x), name(y)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(input: &[&str]) -> Vec<String> {
        let mut v: Vec<String> = input.iter().map(|s| s.to_string()).collect();
        sort_by_name_ru(&mut v, |s| s.as_str());
        v
    }

    #[test]
    fn cyrillic_before_latin() {
        assert_eq!(sorted(&["Berlin", "Москва", "Amsterdam", "Астана"]), ["Астана", "Москва", "Amsterdam", "Berlin"]);
    }

    #[test]
    fn digits_before_letters() {
        assert_eq!(sorted(&["Ялта", "1-й квартал", "Abc"]), ["1-й квартал", "Ялта", "Abc"]);
    }

    #[test]
    fn case_insensitive_primary() {
        assert_eq!(sorted(&["бийск", "Архангельск", "Вологда"]), ["Архангельск", "бийск", "Вологда"]);
    }

    #[test]
    fn yo_is_secondary_variant_of_ye() {
        // ё ties with е at the primary level, so the following letter decides
        assert_eq!(sorted(&["Ёлкино", "Ежово", "Елец"]), ["Ежово", "Елец", "Ёлкино"]);
        // full primary tie: е before ё
        assert_eq!(compare_ru("ёж", "еж"), Ordering::Greater);
    }

    #[test]
    fn lowercase_before_uppercase_on_tie() {
        assert_eq!(compare_ru("орёл", "Орёл"), Ordering::Less);
        assert_eq!(compare_ru("Орёл", "Орёл"), Ordering::Equal);
    }

    #[test]
    fn prefix_sorts_first() {
        assert_eq!(sorted(&["Новосибирск", "Нов"]), ["Нов", "Новосибирск"]);
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let a = sorted(&["Тула", "Омск", "Zürich", "Пермь", "Екатеринбург"]);
        let b = sorted(&["Екатеринбург", "Zürich", "Пермь", "Омск", "Тула"]);
        assert_eq!(a, b);
        assert_eq!(a, ["Екатеринбург", "Омск", "Пермь", "Тула", "Zürich"]);
    }
}
