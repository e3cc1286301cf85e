use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 标题排序键，近似区域化比较（root collation）的三级强度：
/// 1. 去重音、忽略大小写
/// 2. 重音
/// 3. 大小写（小写在前）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleKey {
    primary: String,
    secondary: String,
    tertiary: Vec<bool>,
}

impl TitleKey {
    pub fn new(title: &str) -> Self {
        let decomposed: Vec<char> = title.nfd().collect();
        let primary = decomposed
            .iter()
            .filter(|c| !is_combining_mark(**c))
            .flat_map(|c| c.to_lowercase())
            .collect();
        let secondary = decomposed.iter().flat_map(|c| c.to_lowercase()).collect();
        let tertiary = decomposed
            .iter()
            .filter(|c| !is_combining_mark(**c))
            .map(|c| c.is_uppercase())
            .collect();
        Self {
            primary,
            secondary,
            tertiary,
        }
    }
}

impl Ord for TitleKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.primary
            .cmp(&other.primary)
            .then_with(|| self.secondary.cmp(&other.secondary))
            .then_with(|| self.tertiary.cmp(&other.tertiary))
    }
}

impl PartialOrd for TitleKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(titles: &[&str]) -> Vec<String> {
        let mut v: Vec<&str> = titles.to_vec();
        v.sort_by_key(|t| TitleKey::new(t));
        v.into_iter().map(String::from).collect()
    }

    #[test]
    fn case_is_not_primary() {
        assert_eq!(sorted(&["Banana", "apple"]), ["apple", "Banana"]);
    }

    #[test]
    fn lowercase_before_uppercase_on_tie() {
        assert_eq!(sorted(&["Apple", "apple"]), ["apple", "Apple"]);
    }

    #[test]
    fn accents_sort_next_to_base_letter() {
        assert_eq!(sorted(&["zebra", "éclair", "eclair", "dog"]), ["dog", "eclair", "éclair", "zebra"]);
    }
}
