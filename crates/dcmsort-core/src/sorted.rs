use regex::Regex;

lazy_static::lazy_static! {
    static ref CANONICAL_FILE_NAME: Regex =
        Regex::new(r"^IMAGE\.[0-9]{4}\.[0-9]{4}$").expect("Invalid canonical file name pattern");
}

pub fn is_canonical_file_name(name: &str) -> bool {
    CANONICAL_FILE_NAME.is_match(name)
}

/// True when every name is already `IMAGE.####.####`. An empty listing counts as sorted.
pub fn is_sorted<I, S>(file_names: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    file_names
        .into_iter()
        .all(|name| is_canonical_file_name(name.as_ref()))
}
