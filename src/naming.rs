//! Field name normalization.
//!
//! Change records arrive with camelCase or PascalCase keys (`UserName`,
//! `createdAt`) while the target tables use snake_case columns.

/// Convert a camelCase/PascalCase field name to snake_case.
///
/// Every uppercase letter becomes an underscore followed by its lowercase
/// form, then leading underscores are stripped. Everything else is copied
/// through untouched, so already-snake names come back unchanged.
///
/// Acronyms are not grouped: `userID` becomes `user_i_d`.
pub fn camel_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_uppercase() {
            out.push('_');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    match out.find(|c: char| c != '_') {
        Some(start) => out.split_off(start),
        None => String::new(),
    }
}
