//! Member directory filtering.

use crate::types::Role;

/// Shown wherever a user has no name on file.
pub const NO_NAME: &str = "No Name";

/// A row of the members page.
pub trait DirectoryEntry {
    fn full_name(&self) -> &str;
    fn email(&self) -> &str;
    fn role(&self) -> Role;
}

/// Keep entries in the active role tab whose name or email contains
/// `needle`, ignoring case. A blank needle keeps the whole tab.
pub fn filter_directory<'a, T: DirectoryEntry>(
    entries: &'a [T],
    role_tab: Role,
    needle: &str,
) -> Vec<&'a T> {
    let needle = needle.trim().to_lowercase();
    entries
        .iter()
        .filter(|entry| entry.role() == role_tab)
        .filter(|entry| {
            needle.is_empty()
                || entry.full_name().to_lowercase().contains(&needle)
                || entry.email().to_lowercase().contains(&needle)
        })
        .collect()
}

/// Upper-cased first letter of a name, or `?` for a blank name.
#[must_use]
pub fn avatar_initial(name: &str) -> String {
    name.trim()
        .chars()
        .next()
        .map_or_else(|| "?".to_owned(), |c| c.to_uppercase().collect())
}

/// The name to show for a user, falling back to [`NO_NAME`].
#[must_use]
pub fn display_name(name: &str) -> &str {
    let trimmed = name.trim();
    if trimmed.is_empty() { NO_NAME } else { trimmed }
}
