/// Sort key for load level labels such as `50 RPS`.
///
/// Labels starting with an integer sort numerically, anything else sorts after them, and the
/// configured maximum label sorts last of all.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadLabelKey {
    Numeric(u64),
    Other(String),
    Max,
}

pub fn load_label_key(label: &str, max_label: Option<&str>) -> LoadLabelKey {
    if max_label.is_some_and(|max| max == label) {
        return LoadLabelKey::Max;
    }

    label
        .split_whitespace()
        .next()
        .and_then(|n| n.parse::<u64>().ok())
        .map(LoadLabelKey::Numeric)
        .unwrap_or_else(|| LoadLabelKey::Other(label.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sort_load_labels(labels: &mut [&str], max_label: Option<&str>) {
        labels.sort_by_cached_key(|label| load_label_key(label, max_label));
    }

    #[test]
    fn numeric_order() {
        let mut labels = vec!["50 RPS", "800 RPS", "1000 RPS", "100 RPS"];
        sort_load_labels(&mut labels, None);
        assert_eq!(vec!["50 RPS", "100 RPS", "800 RPS", "1000 RPS"], labels);
    }

    #[test]
    fn max_label_sorts_last() {
        let mut labels = vec!["1000 VU", "1200 VU", "50 VU"];
        sort_load_labels(&mut labels, Some("1000 VU"));
        assert_eq!(vec!["50 VU", "1200 VU", "1000 VU"], labels);
    }

    #[test]
    fn thousands_without_max_label() {
        let mut labels = vec!["4000 RPS", "1000 RPS", "800 RPS", "2000 RPS"];
        sort_load_labels(&mut labels, None);
        assert_eq!(vec!["800 RPS", "1000 RPS", "2000 RPS", "4000 RPS"], labels);
    }

    #[test]
    fn non_numeric_after_numeric() {
        let mut labels = vec!["ramp VU", "10 VU", "burst VU"];
        sort_load_labels(&mut labels, None);
        assert_eq!(vec!["10 VU", "burst VU", "ramp VU"], labels);
    }

    #[test]
    fn keys() {
        assert_eq!(LoadLabelKey::Numeric(50), load_label_key("50 RPS", None));
        assert_eq!(LoadLabelKey::Max, load_label_key("1000 RPS", Some("1000 RPS")));
        assert_eq!(
            LoadLabelKey::Numeric(11000),
            load_label_key("11000 RPS", Some("1000 RPS"))
        );
    }
}
