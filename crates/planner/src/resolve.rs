/// Separates an alias from the field it qualifies, as in `u.email`.
pub const SEPARATOR: char = '.';

/// Qualifies `field` with `alias` unless it already names a relation.
pub fn resolve(field: &str, alias: &str) -> String {
    if field.contains(SEPARATOR) {
        field.to_string()
    } else {
        format!("{alias}{SEPARATOR}{field}")
    }
}
