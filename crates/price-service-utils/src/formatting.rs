use std::fmt::Display;

/// Renders an optional value for logging, mirroring how the coordinator logs
/// `Option<PriceRecord>` lookups without exposing internal `Debug` noise.
pub fn format_opt<T: Display>(opt: Option<&T>) -> String {
    opt.map_or("None".to_owned(), ToString::to_string)
}

/// Renders a key/value mapping as a single log-friendly string, e.g. for
/// summarizing a commit's per-instrument outcome.
pub fn format_map<'a, K: Display + 'a, V: Display + 'a>(
    map: impl IntoIterator<Item = (&'a K, &'a V)>,
) -> String {
    let map_str = map
        .into_iter()
        .map(|(key, val)| format!("{key}: {val}"))
        .collect::<Vec<_>>()
        .join(", ");
    if map_str.is_empty() {
        "None".to_owned()
    } else {
        format!("{{ {map_str} }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_opt_renders_none_and_some() {
        assert_eq!(format_opt::<u32>(None), "None");
        assert_eq!(format_opt(Some(&42u32)), "42");
    }

    #[test]
    fn format_map_renders_empty_and_populated() {
        let empty: Vec<(&String, &u32)> = Vec::new();
        assert_eq!(format_map(empty), "None");

        let key = "AAPL".to_owned();
        let val = 10u32;
        let entries = vec![(&key, &val)];
        assert_eq!(format_map(entries), "{ AAPL: 10 }");
    }
}
