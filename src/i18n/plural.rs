use std::fmt;
use std::str::FromStr;

/// CLDR plural category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    pub const ALL: [Self; 6] = [
        Self::Zero,
        Self::One,
        Self::Two,
        Self::Few,
        Self::Many,
        Self::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::One => "one",
            Self::Two => "two",
            Self::Few => "few",
            Self::Many => "many",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluralCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|c| c.as_str() == s).ok_or(())
    }
}

/// Integer plural rule of a language family.
///
/// Negative counts are categorized by their absolute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PluralRule {
    /// one: 1; other. English, German, Spanish, Italian, Dutch, Nordic languages, …
    OneOther,
    /// one: 0 and 1; other. French, Brazilian Portuguese, Hindi, Persian.
    ZeroOneOther,
    /// other only. Chinese, Japanese, Korean, Thai, Vietnamese, Indonesian.
    Invariant,
    /// one / few / many by last digits. Russian, Ukrainian, Belarusian.
    EastSlavic,
    /// one / few / other by last digits. Serbian, Croatian, Bosnian.
    SouthSlavic,
    /// one: 1; few: 2-4 by last digits; many. Polish.
    Polish,
    /// one: 1; few: 2-4; other. Czech, Slovak.
    CzechSlovak,
    /// zero / one / two / few / many / other. Arabic.
    Arabic,
}

impl PluralRule {
    /// The rule for a language tag (`"en"`, `"pt-BR"`, `"uk_UA"`, …).
    ///
    /// Unlisted languages use [`PluralRule::OneOther`].
    #[must_use]
    pub fn for_language(tag: &str) -> Self {
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "fr" | "pt" | "hi" | "fa" | "bn" => Self::ZeroOneOther,
            "zh" | "ja" | "ko" | "th" | "vi" | "id" | "ms" | "lo" | "my" => Self::Invariant,
            "ru" | "uk" | "be" => Self::EastSlavic,
            "sr" | "hr" | "bs" => Self::SouthSlavic,
            "pl" => Self::Polish,
            "cs" | "sk" => Self::CzechSlovak,
            "ar" => Self::Arabic,
            _ => Self::OneOther,
        }
    }

    #[must_use]
    pub fn categorize(self, count: i64) -> PluralCategory {
        let n = count.unsigned_abs();
        let mod10 = n % 10;
        let mod100 = n % 100;
        match self {
            Self::OneOther => {
                if n == 1 {
                    PluralCategory::One
                } else {
                    PluralCategory::Other
                }
            }
            Self::ZeroOneOther => {
                if n <= 1 {
                    PluralCategory::One
                } else {
                    PluralCategory::Other
                }
            }
            Self::Invariant => PluralCategory::Other,
            Self::EastSlavic => {
                if mod10 == 1 && mod100 != 11 {
                    PluralCategory::One
                } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
                    PluralCategory::Few
                } else {
                    PluralCategory::Many
                }
            }
            Self::SouthSlavic => {
                if mod10 == 1 && mod100 != 11 {
                    PluralCategory::One
                } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
                    PluralCategory::Few
                } else {
                    PluralCategory::Other
                }
            }
            Self::Polish => {
                if n == 1 {
                    PluralCategory::One
                } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
                    PluralCategory::Few
                } else {
                    PluralCategory::Many
                }
            }
            Self::CzechSlovak => match n {
                1 => PluralCategory::One,
                2..=4 => PluralCategory::Few,
                _ => PluralCategory::Other,
            },
            Self::Arabic => match n {
                0 => PluralCategory::Zero,
                1 => PluralCategory::One,
                2 => PluralCategory::Two,
                _ if (3..=10).contains(&mod100) => PluralCategory::Few,
                _ if (11..=99).contains(&mod100) => PluralCategory::Many,
                _ => PluralCategory::Other,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_tags() {
        assert_eq!(PluralRule::for_language("en"), PluralRule::OneOther);
        assert_eq!(PluralRule::for_language("pt-BR"), PluralRule::ZeroOneOther);
        assert_eq!(PluralRule::for_language("uk_UA"), PluralRule::EastSlavic);
        assert_eq!(PluralRule::for_language("ZH"), PluralRule::Invariant);
        assert_eq!(PluralRule::for_language("xx"), PluralRule::OneOther);
        assert_eq!(PluralRule::for_language(""), PluralRule::OneOther);
    }

    #[test]
    fn english() {
        let r = PluralRule::OneOther;
        assert_eq!(r.categorize(1), PluralCategory::One);
        assert_eq!(r.categorize(-1), PluralCategory::One);
        assert_eq!(r.categorize(0), PluralCategory::Other);
        assert_eq!(r.categorize(2), PluralCategory::Other);
    }

    #[test]
    fn french_zero_is_singular() {
        assert_eq!(PluralRule::ZeroOneOther.categorize(0), PluralCategory::One);
        assert_eq!(PluralRule::ZeroOneOther.categorize(2), PluralCategory::Other);
    }

    #[test]
    fn russian() {
        let r = PluralRule::EastSlavic;
        assert_eq!(r.categorize(1), PluralCategory::One);
        assert_eq!(r.categorize(21), PluralCategory::One);
        assert_eq!(r.categorize(11), PluralCategory::Many);
        assert_eq!(r.categorize(3), PluralCategory::Few);
        assert_eq!(r.categorize(13), PluralCategory::Many);
        assert_eq!(r.categorize(24), PluralCategory::Few);
        assert_eq!(r.categorize(5), PluralCategory::Many);
        assert_eq!(r.categorize(0), PluralCategory::Many);
    }

    #[test]
    fn polish() {
        let r = PluralRule::Polish;
        assert_eq!(r.categorize(1), PluralCategory::One);
        assert_eq!(r.categorize(21), PluralCategory::Many);
        assert_eq!(r.categorize(22), PluralCategory::Few);
        assert_eq!(r.categorize(12), PluralCategory::Many);
    }

    #[test]
    fn arabic() {
        let r = PluralRule::Arabic;
        assert_eq!(r.categorize(0), PluralCategory::Zero);
        assert_eq!(r.categorize(2), PluralCategory::Two);
        assert_eq!(r.categorize(103), PluralCategory::Few);
        assert_eq!(r.categorize(111), PluralCategory::Many);
        assert_eq!(r.categorize(100), PluralCategory::Other);
    }

    #[test]
    fn category_names_round_trip() {
        for c in PluralCategory::ALL {
            assert_eq!(c.as_str().parse::<PluralCategory>(), Ok(c));
        }
        assert!("several".parse::<PluralCategory>().is_err());
    }
}
