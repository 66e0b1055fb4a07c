//! Public slugs and shareable links.

/// Lowercase the title and collapse every run of non-alphanumerics into `-`.
///
/// Never returns an empty string.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        slug.push_str("event");
    }
    slug
}

/// Slug used when the plain one is already taken.
///
/// Takes the last 8 hex digits of `suffix`; for v7 ids those are random bits.
pub fn disambiguate(slug: &str, suffix: &str) -> String {
    let hex: Vec<char> = suffix.chars().filter(|c| c.is_ascii_hexdigit()).collect();
    let short: String = hex[hex.len().saturating_sub(8)..].iter().collect();
    format!("{slug}-{short}")
}

/// Link attendees use to open the public event page.
pub fn share_url(base_url: &str, slug: &str) -> String {
    format!("{}/event/{}", base_url.trim_end_matches('/'), slug)
}
