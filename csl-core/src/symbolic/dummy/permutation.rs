/// Rearranges `v` into the next permutation in lexicographic order. If `v` is the last
/// permutation, it is reset to the first one (sorted) and `false` is returned.
pub fn next_permutation(v: &mut [usize]) -> bool {
    if v.len() < 2 {
        return false;
    }

    // longest non-increasing suffix
    let mut i = v.len() - 1;
    while i > 0 && v[i - 1] >= v[i] {
        i -= 1;
    }
    if i == 0 {
        v.reverse();
        return false;
    }

    let mut j = v.len() - 1;
    while v[j] <= v[i - 1] {
        j -= 1;
    }
    v.swap(i - 1, j);
    v[i..].reverse();
    true
}

/// Enumerates every combination of permutations of several independent groups, like an
/// odometer: the first group turns fastest, and the next group advances each time the previous
/// one wraps around.
///
/// The number of states is the product of the factorials of the group sizes, which is far
/// smaller than the factorial of the total size when items can only be exchanged within their
/// group.
#[derive(Debug, Clone)]
pub struct MultiPermutation {
    groups: Vec<Vec<usize>>,
}

impl MultiPermutation {
    /// Starts at the identity permutation of each group.
    pub fn new(sizes: impl IntoIterator<Item = usize>) -> Self {
        Self {
            groups: sizes.into_iter().map(|size| (0..size).collect()).collect(),
        }
    }

    /// The current permutation of the `g`-th group.
    pub fn group(&self, g: usize) -> &[usize] {
        &self.groups[g]
    }

    /// Moves to the next state. Returns `false` once every state has been visited, leaving the
    /// permutation back at its starting state.
    pub fn advance(&mut self) -> bool {
        self.groups.iter_mut().any(|group| next_permutation(group))
    }

    /// The total number of states, saturating at [`usize::MAX`].
    pub fn len(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|group| 1..=group.len())
            .fold(1usize, |acc, k| acc.saturating_mul(k))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn lexicographic_order() {
        let mut v = vec![0, 1, 2];
        let mut seen = vec![v.clone()];
        while next_permutation(&mut v) {
            seen.push(v.clone());
        }
        assert_eq!(seen, vec![
            vec![0, 1, 2],
            vec![0, 2, 1],
            vec![1, 0, 2],
            vec![1, 2, 0],
            vec![2, 0, 1],
            vec![2, 1, 0],
        ]);
        assert_eq!(v, vec![0, 1, 2]);
    }

    #[test]
    fn odometer_visits_every_state_once() {
        let mut permutation = MultiPermutation::new([2, 3, 1]);
        assert_eq!(permutation.len(), 12);

        let mut states = Vec::new();
        loop {
            states.push((permutation.group(0).to_vec(), permutation.group(1).to_vec()));
            if !permutation.advance() {
                break;
            }
        }
        assert_eq!(states.len(), 12);
        states.sort();
        states.dedup();
        assert_eq!(states.len(), 12);
        assert_eq!(permutation.group(1), &[0, 1, 2]);
    }
}
