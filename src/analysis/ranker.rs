//! KU identifier ordering.

use crate::models::KuId;
use std::cmp::Ordering;

/// Compare two KU identifiers by their numeric suffix.
///
/// Well-formed identifiers come first in ascending numeric order, with the
/// raw text breaking ties between equal ordinals (`K2` vs `K02`). Identifiers
/// without a numeric suffix follow, ordered by their raw text.
pub fn compare_ku_ids(a: &KuId, b: &KuId) -> Ordering {
    match (a.ordinal(), b.ordinal()) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.as_str().cmp(b.as_str())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.as_str().cmp(b.as_str()),
    }
}

/// Produce a total order over a set of KU identifiers.
pub fn rank<'a, I>(ku_ids: I) -> Vec<KuId>
where
    I: IntoIterator<Item = &'a KuId>,
{
    let mut ranked: Vec<KuId> = ku_ids.into_iter().cloned().collect();
    ranked.sort_by(compare_ku_ids);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<KuId> {
        raw.iter().map(|s| KuId::from(*s)).collect()
    }

    fn ranked(raw: &[&str]) -> Vec<String> {
        rank(&ids(raw)).into_iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_numeric_not_lexical() {
        assert_eq!(ranked(&["K2", "K10", "K1"]), vec!["K1", "K2", "K10"]);
    }

    #[test]
    fn test_empty() {
        assert!(rank(&Vec::<KuId>::new()).is_empty());
    }

    #[test]
    fn test_malformed_sorted_last() {
        assert_eq!(
            ranked(&["Kfoo", "K3", "", "K", "K1"]),
            vec!["K1", "K3", "", "K", "Kfoo"]
        );
    }

    #[test]
    fn test_equal_ordinals_are_distinguished() {
        assert_eq!(ranked(&["K2", "K02", "K1"]), vec!["K1", "K02", "K2"]);
    }

    #[test]
    fn test_order_independent_of_input_order() {
        let forward = ranked(&["K5", "Kx", "K12", "K3", "Ky"]);
        let backward = ranked(&["Ky", "K3", "K12", "Kx", "K5"]);
        assert_eq!(forward, backward);
        assert_eq!(forward, vec!["K3", "K5", "K12", "Kx", "Ky"]);
    }
}
