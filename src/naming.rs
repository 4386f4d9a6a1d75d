/// Convert a camel-case identifier into a snake-case column or table name.
///
/// [`record!`](crate::record) names columns after the field identifiers as written; call this
/// when deriving names from camel-case identifiers yourself.
///
/// Words split on lower-to-upper transitions and at the end of an acronym, so `UserJSON`
/// becomes `user_json` and `JSONData` becomes `json_data`. Input already in snake case is
/// returned unchanged.
#[must_use]
pub fn to_snake_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}
