//! Stable ordering of tokens against a priority ranking.

/// Position of a token within a [`PriorityRanking`].
///
/// Unlisted tokens compare greater than every listed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    Listed(usize),
    Unlisted,
}

impl Rank {
    /// Numeric form: the index for listed tokens, `ranking_len` otherwise.
    pub fn value(self, ranking_len: usize) -> usize {
        match self {
            Rank::Listed(i) => i,
            Rank::Unlisted => ranking_len,
        }
    }
}

/// An ordered list of tokens defining sort precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityRanking<T> {
    tokens: Vec<T>,
}

impl<T: PartialEq> PriorityRanking<T> {
    pub fn new(tokens: Vec<T>) -> Self {
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Rank of `token`. A token listed twice ranks at its first position.
    pub fn rank_of<Q>(&self, token: &Q) -> Rank
    where
        T: PartialEq<Q>,
        Q: ?Sized,
    {
        match self.tokens.iter().position(|t| t == token) {
            Some(i) => Rank::Listed(i),
            None => Rank::Unlisted,
        }
    }

    /// Reorder `values` by rank. The sort is stable: equal ranks, including
    /// every unlisted token, keep their input order.
    pub fn sort<V>(&self, values: impl IntoIterator<Item = V>) -> Vec<V>
    where
        T: PartialEq<V>,
    {
        let mut keyed: Vec<(Rank, V)> = values
            .into_iter()
            .map(|v| (self.rank_of(&v), v))
            .collect();
        keyed.sort_by_key(|(rank, _)| *rank);
        keyed.into_iter().map(|(_, v)| v).collect()
    }
}

impl<T, const N: usize> From<[T; N]> for PriorityRanking<T>
where
    T: PartialEq,
{
    fn from(tokens: [T; N]) -> Self {
        Self::new(tokens.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_duplicates_share_rank() {
        let ranking = PriorityRanking::from([2, 3, 1]);
        assert_eq!(ranking.sort([1, 2, 2, 3]), vec![2, 2, 3, 1]);
    }

    #[test]
    fn test_unlisted_sorts_last_in_input_order() {
        let ranking = PriorityRanking::from([2, 3]);
        assert_eq!(ranking.sort([5, 1, 3, 4, 2]), vec![2, 3, 5, 1, 4]);
    }

    #[test]
    fn test_empty_ranking_keeps_input_order() {
        let ranking: PriorityRanking<&str> = PriorityRanking::new(Vec::new());
        assert_eq!(ranking.sort(["c", "a", "b"]), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_empty_input() {
        let ranking = PriorityRanking::from(["MC", "Land"]);
        let sorted: Vec<&str> = ranking.sort(Vec::<&str>::new());
        assert!(sorted.is_empty());
    }

    #[test]
    fn test_rank_of_two_branches() {
        let ranking = PriorityRanking::from(["U", "G"]);
        assert_eq!(ranking.rank_of(&"G"), Rank::Listed(1));
        assert_eq!(ranking.rank_of(&"3"), Rank::Unlisted);
        assert_eq!(ranking.rank_of(&"3").value(ranking.len()), 2);
        assert!(Rank::Listed(usize::MAX - 1) < Rank::Unlisted);
    }

    #[test]
    fn test_string_values_against_str_ranking() {
        let ranking = PriorityRanking::from(["MC", "Land", "U", "G"]);
        let tags = vec!["3".to_string(), "G".to_string(), "MC".to_string()];
        assert_eq!(ranking.sort(tags), vec!["MC", "G", "3"]);
    }

    #[test]
    fn test_sort_preserves_multiset() {
        let ranking = PriorityRanking::from(['b', 'x', 'a']);
        let input: Vec<char> = "abracadabra".chars().collect();
        let mut sorted = ranking.sort(input.clone());
        let mut original = input;
        sorted.sort_unstable();
        original.sort_unstable();
        assert_eq!(sorted, original);
    }

    #[test]
    fn test_stability_with_tagged_values() {
        // (token, original index) pairs; ranking compares on the token only.
        #[derive(Debug, PartialEq)]
        struct Tagged(&'static str, usize);
        impl PartialEq<Tagged> for &str {
            fn eq(&self, other: &Tagged) -> bool {
                *self == other.0
            }
        }

        let ranking = PriorityRanking::from(["R", "W"]);
        let sorted = ranking.sort([
            Tagged("W", 0),
            Tagged("z", 1),
            Tagged("R", 2),
            Tagged("W", 3),
            Tagged("y", 4),
            Tagged("R", 5),
        ]);
        let order: Vec<usize> = sorted.iter().map(|t| t.1).collect();
        assert_eq!(order, vec![2, 5, 0, 3, 1, 4]);
    }
}
