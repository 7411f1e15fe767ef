use crate::{errors::AppError, models::Restaurant};

/// URL slug of a restaurant name: lowercase, runs of anything outside
/// `[a-z0-9]` collapsed to one `-`, no leading or trailing `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

pub fn find_by_slug<'a>(restaurants: &'a [Restaurant], slug: &str) -> Result<&'a Restaurant, AppError> {
    restaurants
        .iter()
        .find(|r| slugify(&r.name) == slug)
        .ok_or_else(|| AppError::NotFound(format!("Restaurant not found: {slug}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_and_trims_separators() {
        assert_eq!(slugify("Alpha Cafe"), "alpha-cafe");
        assert_eq!(slugify("  Joe's   Diner & Grill!! "), "joe-s-diner-grill");
        assert_eq!(slugify("--Café 24/7--"), "caf-24-7");
        assert_eq!(slugify("!!!"), "");
    }
}
