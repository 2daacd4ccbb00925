/// Builds a `cookie` request header from `set-cookie` response values.
///
/// Keeps only the leading `name=value` of each entry (attributes such as
/// `Path`, `Expires` or `HttpOnly` are dropped), preserves order and joins
/// with `"; "`. Returns an empty string when there is nothing to carry.
pub fn cookie_header<I, S>(set_cookies: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    set_cookies
        .into_iter()
        .filter_map(|raw| {
            let pair = raw.as_ref().split(';').next().unwrap_or_default().trim();
            (!pair.is_empty()).then(|| pair.to_string())
        })
        .collect::<Vec<_>>()
        .join("; ")
}
