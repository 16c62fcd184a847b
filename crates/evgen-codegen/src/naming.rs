//! # Identifier Derivation
//!
//! Event titles are free text ("registers a user"). Generated identifiers
//! are derived with one rule:
//!
//! 1. Split the title on every character that is not ASCII alphanumeric.
//!    Non-ASCII letters, punctuation, and whitespace are all separators.
//! 2. Drop empty words.
//! 3. Upper-case the first character of each word; keep the rest verbatim.
//! 4. Concatenate.
//!
//! The factory is `make` + that name. Type names use the same name, prefixed
//! with `Event` when it would otherwise start with a digit.
//!
//! | Title | Factory | Properties type |
//! |-------|---------|-----------------|
//! | `registers a user` | `makeRegistersAUser` | `RegistersAUserProperties` |
//! | `user.signed-up (v2)` | `makeUserSignedUpV2` | `UserSignedUpV2Properties` |
//! | `2fa enabled` | `make2faEnabled` | `Event2faEnabledProperties` |
//! | `BaseType` | `makeBaseType` | `BaseTypeProperties` |

use crate::error::CodegenError;

/// Identifiers generated for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventNames {
    /// PascalCase form of the title, before any type-name prefix.
    pub pascal: String,
    /// Factory function name.
    pub factory: String,
    /// Properties interface name.
    pub properties_type: String,
    /// Event envelope interface name.
    pub event_type: String,
}

/// PascalCase a title. Returns `None` if it has no ASCII alphanumerics.
pub fn pascal_case(title: &str) -> Option<String> {
    let mut out = String::with_capacity(title.len());
    for word in title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    (!out.is_empty()).then_some(out)
}

/// Derive all identifiers for an event title.
///
/// # Errors
///
/// Returns [`CodegenError::InvalidIdentifier`] if the title has no ASCII
/// alphanumeric characters.
pub fn event_names(title: &str) -> Result<EventNames, CodegenError> {
    let pascal = pascal_case(title).ok_or_else(|| CodegenError::InvalidIdentifier {
        title: title.to_string(),
    })?;
    let type_base = if pascal.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Event{pascal}")
    } else {
        pascal.clone()
    };
    Ok(EventNames {
        factory: format!("make{pascal}"),
        properties_type: format!("{type_base}Properties"),
        event_type: format!("{type_base}Event"),
        pascal,
    })
}

/// Render an object key: bare when it is a plain identifier, quoted otherwise.
pub fn property_key(name: &str) -> String {
    let mut chars = name.chars();
    let is_identifier = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };
    if is_identifier {
        name.to_string()
    } else {
        serde_json::Value::String(name.to_string()).to_string()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any title with an ASCII alphanumeric yields a valid identifier.
        #[test]
        fn factory_is_always_an_identifier(title in "\\PC{0,40}") {
            if let Ok(names) = event_names(&title) {
                prop_assert!(names.factory.starts_with("make"));
                prop_assert!(names.factory.chars().all(|c| c.is_ascii_alphanumeric()));
                prop_assert!(names.properties_type.starts_with(|c: char| c.is_ascii_uppercase()));
            } else {
                prop_assert!(!title.chars().any(|c| c.is_ascii_alphanumeric()));
            }
        }
    }
}
