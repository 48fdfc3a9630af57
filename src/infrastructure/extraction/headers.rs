use std::collections::{HashMap, HashSet};

const EMPTY_HEADER: &str = "__EMPTY";

/// Make raw header cells usable as a unique column set.
///
/// Blank names become `__EMPTY`, `__EMPTY_1`, ...; repeated names get a
/// `_1`, `_2`, ... suffix in order of appearance.
pub fn normalize_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::new();

    for name in raw {
        let name = name.as_ref();
        let base = if name.trim().is_empty() {
            EMPTY_HEADER.to_string()
        } else {
            name.to_string()
        };

        let mut candidate = base.clone();
        while seen.contains(&candidate) {
            let n = suffixes.entry(base.clone()).or_insert(0);
            *n += 1;
            candidate = format!("{}_{}", base, n);
        }

        seen.insert(candidate.clone());
        out.push(candidate);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_headers_pass_through() {
        assert_eq!(normalize_headers(["a", "b"]), vec!["a", "b"]);
    }

    #[test]
    fn test_blank_and_duplicate_headers() {
        assert_eq!(
            normalize_headers(["", "name", " ", "name", "name"]),
            vec!["__EMPTY", "name", "__EMPTY_1", "name_1", "name_2"]
        );
    }

    #[test]
    fn test_suffix_collision_with_existing_name() {
        assert_eq!(
            normalize_headers(["a_1", "a", "a"]),
            vec!["a_1", "a", "a_2"]
        );
    }
}
