//! Cache key derivation.

use crate::domain::settings::LookupConfig;

pub const CACHE_NAMESPACE: &str = "posts_on_this_day";

const TYPE_SEPARATOR: &str = "+";

/// Key for the result of a lookup with `config`.
///
/// Only options that change the query take part: display options
/// (thumbnails, year grouping) share one entry. Content types are already
/// sorted and restricted to `[a-z0-9_-]`, so neither input order nor the
/// separator can make two different sets collide.
pub fn cache_key(config: &LookupConfig) -> String {
    let types = config
        .content_types()
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(TYPE_SEPARATOR);

    format!(
        "{CACHE_NAMESPACE}_{}_{}_{types}_{}",
        config.max_results(),
        config.years_back(),
        if config.exact_match() { "exact" } else { "aweek" },
    )
}
