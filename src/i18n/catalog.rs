use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde_json::{Map, Value};

use super::plural::{PluralCategory, PluralRule};

/// Template variables, by placeholder name.
pub type Variables = BTreeMap<String, Value>;

/// Builds [`Variables`] from name/value pairs.
///
/// ```
/// use bot_settings_portal::i18n::vars;
///
/// let v = vars([("name", "Ann")]);
/// assert_eq!(v["name"], "Ann");
/// ```
pub fn vars<K, V, I>(pairs: I) -> Variables
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Translation failures. All of them are content or caller bugs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum TranslationError {
    #[error("no dictionary loaded for language '{0}'")]
    MissingDictionary(String),
    #[error("missing translation '{key}' for language '{language}'")]
    MissingKey { language: String, key: String },
    #[error("translation '{key}' is plural and needs a numeric 'count'")]
    MissingCount { key: String },
    #[error("translation '{key}' for language '{language}' has neither '{category}' nor 'other'")]
    MissingPluralForm {
        language: String,
        key: String,
        category: PluralCategory,
    },
    #[error("invalid dictionary for language '{language}': {reason}")]
    InvalidDictionary { language: String, reason: String },
}

/// Per-call options for [`Translator::resolve`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions<'a> {
    /// Count selecting the plural form, when `variables` has no `count`.
    pub count: Option<i64>,
    /// Language of the current page; falls back to the default language.
    pub language: Option<&'a str>,
}

impl<'a> ResolveOptions<'a> {
    #[must_use]
    pub fn count(count: i64) -> Self {
        Self {
            count: Some(count),
            language: None,
        }
    }

    #[must_use]
    pub fn language(language: &'a str) -> Self {
        Self {
            count: None,
            language: Some(language),
        }
    }

    #[must_use]
    pub fn with_count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: &'a str) -> Self {
        self.language = Some(language);
        self
    }
}

enum Entry<'a> {
    Template(&'a str),
    Plural(&'a Map<String, Value>),
}

/// Dictionary-backed translator for the portal's interface languages.
#[derive(Debug, Clone)]
pub struct Translator {
    dictionaries: HashMap<String, Value>,
    default_language: String,
}

impl Translator {
    #[must_use]
    pub fn new(default_language: impl Into<String>) -> Self {
        Self {
            dictionaries: HashMap::new(),
            default_language: default_language.into(),
        }
    }

    /// Adds or replaces the dictionary of `language`.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::InvalidDictionary`] if the root is not an object.
    pub fn add_dictionary(
        &mut self,
        language: impl Into<String>,
        dictionary: Value,
    ) -> Result<(), TranslationError> {
        let language = language.into();
        if !dictionary.is_object() {
            return Err(TranslationError::InvalidDictionary {
                language,
                reason: "root must be an object".into(),
            });
        }
        self.dictionaries.insert(language, dictionary);
        Ok(())
    }

    /// Parses and adds a JSON dictionary.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::InvalidDictionary`] on invalid JSON or a non-object root.
    pub fn add_json(
        &mut self,
        language: impl Into<String>,
        json: &str,
    ) -> Result<(), TranslationError> {
        let language = language.into();
        let dictionary = serde_json::from_str(json).map_err(|e| {
            TranslationError::InvalidDictionary {
                language: language.clone(),
                reason: e.to_string(),
            }
        })?;
        self.add_dictionary(language, dictionary)
    }

    #[must_use]
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    #[must_use]
    pub fn supports(&self, language: &str) -> bool {
        self.dictionaries.contains_key(language)
    }

    /// Loaded languages, sorted.
    #[must_use]
    pub fn languages(&self) -> Vec<&str> {
        let mut langs: Vec<&str> = self.dictionaries.keys().map(String::as_str).collect();
        langs.sort_unstable();
        langs
    }

    /// Language named by the first segment of a request path (`/uk/settings` → `uk`).
    ///
    /// Falls back to the default language when the segment is absent or
    /// has no dictionary.
    #[must_use]
    pub fn language_from_path<'s>(&'s self, path: &str) -> &'s str {
        path.split('/')
            .find(|s| !s.is_empty())
            .and_then(|segment| {
                self.dictionaries
                    .keys()
                    .find(|lang| lang.eq_ignore_ascii_case(segment))
            })
            .map_or(self.default_language.as_str(), String::as_str)
    }

    /// Resolves `key` to a localized string.
    ///
    /// A trailing `_<category>` suffix (`items_one`) is ignored when looking up
    /// the entry. Plural entries select their form from `count`, taken from
    /// `variables["count"]` or `options.count`. Placeholders without a
    /// variable are left as written.
    ///
    /// # Errors
    ///
    /// - [`TranslationError::MissingDictionary`] if neither the requested nor
    ///   the default language is loaded.
    /// - [`TranslationError::MissingKey`] if the key does not resolve to a
    ///   template or plural entry.
    /// - [`TranslationError::MissingCount`] for plural entries without a count.
    /// - [`TranslationError::MissingPluralForm`] if neither the selected
    ///   category nor `other` exists.
    pub fn resolve(
        &self,
        key: &str,
        variables: &Variables,
        options: ResolveOptions<'_>,
    ) -> Result<String, TranslationError> {
        let (language, dictionary) = self.dictionary_for(options.language)?;
        let base_key = strip_plural_suffix(key);

        let entry = lookup(dictionary, base_key)
            .or_else(|| lookup(dictionary, key))
            .ok_or_else(|| TranslationError::MissingKey {
                language: language.to_owned(),
                key: key.to_owned(),
            })?;

        match entry {
            Entry::Template(template) => Ok(interpolate(template, variables)),
            Entry::Plural(forms) => {
                let from_vars = variables.get("count").and_then(numeric_count);
                let count = from_vars.or(options.count).ok_or_else(|| {
                    TranslationError::MissingCount {
                        key: key.to_owned(),
                    }
                })?;

                let category = PluralRule::for_language(language).categorize(count);
                let template = forms
                    .get(category.as_str())
                    .or_else(|| forms.get(PluralCategory::Other.as_str()))
                    .and_then(Value::as_str)
                    .ok_or_else(|| TranslationError::MissingPluralForm {
                        language: language.to_owned(),
                        key: base_key.to_owned(),
                        category,
                    })?;

                if from_vars.is_none() {
                    let mut with_count = variables.clone();
                    with_count.insert("count".into(), count.into());
                    Ok(interpolate(template, &with_count))
                } else {
                    Ok(interpolate(template, variables))
                }
            }
        }
    }

    /// Resolves a plain entry with no variables.
    ///
    /// # Errors
    ///
    /// As for [`resolve`](Self::resolve).
    pub fn text(&self, key: &str, language: Option<&str>) -> Result<String, TranslationError> {
        self.resolve(
            key,
            &Variables::new(),
            ResolveOptions {
                count: None,
                language,
            },
        )
    }

    fn dictionary_for<'s>(
        &'s self,
        requested: Option<&'s str>,
    ) -> Result<(&'s str, &'s Value), TranslationError> {
        if let Some(lang) = requested {
            if let Some(dictionary) = self.dictionaries.get(lang) {
                return Ok((lang, dictionary));
            }
            tracing::debug!(language = %lang, "No dictionary, using default language");
        }
        self.dictionaries
            .get(&self.default_language)
            .map(|d| (self.default_language.as_str(), d))
            .ok_or_else(|| TranslationError::MissingDictionary(self.default_language.clone()))
    }

    /// Compares every loaded dictionary against the default language.
    ///
    /// Reports keys missing from or extra to a language, and keys whose
    /// placeholder names differ. Plural entries are compared by base key
    /// and the union of placeholders across their forms, since languages
    /// legitimately use different categories.
    #[must_use]
    pub fn parity_report(&self) -> ParityReport {
        let mut issues = Vec::new();
        let Some(reference) = self.dictionaries.get(&self.default_language) else {
            return ParityReport { issues };
        };
        let reference = flatten(reference);

        for language in self.languages() {
            if language == self.default_language {
                continue;
            }
            let Some(dictionary) = self.dictionaries.get(language) else {
                continue;
            };
            let other = flatten(dictionary);

            for (key, expected) in &reference {
                match other.get(key) {
                    None => issues.push(ParityIssue::MissingKey {
                        language: language.to_owned(),
                        key: key.clone(),
                    }),
                    Some(found) if found != expected => {
                        issues.push(ParityIssue::PlaceholderMismatch {
                            language: language.to_owned(),
                            key: key.clone(),
                            expected: expected.clone(),
                            found: found.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }
            for key in other.keys().filter(|k| !reference.contains_key(*k)) {
                issues.push(ParityIssue::ExtraKey {
                    language: language.to_owned(),
                    key: key.clone(),
                });
            }
        }

        ParityReport { issues }
    }
}

/// Structural differences between dictionaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParityReport {
    pub issues: Vec<ParityIssue>,
}

impl ParityReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParityIssue {
    MissingKey {
        language: String,
        key: String,
    },
    ExtraKey {
        language: String,
        key: String,
    },
    PlaceholderMismatch {
        language: String,
        key: String,
        expected: BTreeSet<String>,
        found: BTreeSet<String>,
    },
}

/// Any JSON number selects a plural form: integers beyond `i64` saturate,
/// fractions truncate toward zero.
#[allow(clippy::cast_possible_truncation)]
fn numeric_count(value: &Value) -> Option<i64> {
    let Value::Number(n) = value else {
        return None;
    };
    n.as_i64()
        .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
        .or_else(|| n.as_f64().map(|f| f as i64))
}

fn strip_plural_suffix(key: &str) -> &str {
    match key.rsplit_once('_') {
        Some((base, suffix)) if !base.is_empty() && suffix.parse::<PluralCategory>().is_ok() => {
            base
        }
        _ => key,
    }
}

fn is_plural_object(map: &Map<String, Value>) -> bool {
    !map.is_empty() && map.keys().all(|k| k.parse::<PluralCategory>().is_ok())
}

fn lookup<'a>(dictionary: &'a Value, key: &str) -> Option<Entry<'a>> {
    let mut node = dictionary;
    for segment in key.split('.') {
        node = node.as_object()?.get(segment)?;
    }
    match node {
        Value::String(s) => Some(Entry::Template(s)),
        Value::Object(map) if is_plural_object(map) => Some(Entry::Plural(map)),
        _ => None,
    }
}

/// Replaces `{name}` placeholders in one pass; substituted text is not rescanned.
fn interpolate(template: &str, variables: &Variables) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let name = &after[..close];
        match variables.get(name) {
            Some(value) if !name.is_empty() && !name.contains('{') => {
                match value {
                    Value::String(s) => out.push_str(s),
                    other => out.push_str(&other.to_string()),
                }
                rest = &after[close + 1..];
            }
            _ => {
                // Keep the brace literally and continue scanning after it, so
                // `{{name}` still finds the inner placeholder.
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn placeholders(template: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else { break };
        let name = &after[..close];
        if !name.is_empty() && !name.contains('{') {
            names.insert(name.to_owned());
            rest = &after[close + 1..];
        } else {
            rest = after;
        }
    }
    names
}

fn flatten(dictionary: &Value) -> BTreeMap<String, BTreeSet<String>> {
    fn walk(node: &Value, prefix: &str, out: &mut BTreeMap<String, BTreeSet<String>>) {
        match node {
            Value::String(s) => {
                out.insert(prefix.to_owned(), placeholders(s));
            }
            Value::Object(map) if is_plural_object(map) => {
                let names = map
                    .values()
                    .filter_map(Value::as_str)
                    .flat_map(placeholders)
                    .collect();
                out.insert(prefix.to_owned(), names);
            }
            Value::Object(map) => {
                for (k, v) in map {
                    let path = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    walk(v, &path, out);
                }
            }
            _ => {
                out.insert(prefix.to_owned(), BTreeSet::new());
            }
        }
    }

    let mut out = BTreeMap::new();
    walk(dictionary, "", &mut out);
    out
}
