//! Interface translations.
//!
//! Dictionaries are nested JSON objects, one per language, with identical
//! key structure. Leaves are either template strings with `{name}`
//! placeholders or plural objects keyed by CLDR category:
//!
//! ```json
//! { "chats": { "count": { "one": "{count} chat", "other": "{count} chats" } } }
//! ```
//!
//! The page language is derived by the routing layer (see
//! [`Translator::language_from_path`]) and passed explicitly to every
//! [`Translator::resolve`] call.

mod catalog;
mod plural;

pub use catalog::{
    ParityIssue, ParityReport, ResolveOptions, TranslationError, Translator, Variables, vars,
};
pub use plural::{PluralCategory, PluralRule};
