/// Attributes still eligible for splitting along a tree path
///
/// The set is a bitset over attribute indices. Tree induction removes the split attribute before
/// descending into a branch and restores it afterwards, so at every node the set holds exactly the
/// attributes not yet used between the root and that node. It is owned by a single induction call
/// and passed down by mutable reference, never shared between branches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeSet {
    eligible: Vec<bool>,
    len: usize,
}

impl AttributeSet {
    /// Every attribute in `0..nattributes` is eligible
    pub fn all(nattributes: usize) -> Self {
        AttributeSet {
            eligible: vec![true; nattributes],
            len: nattributes,
        }
    }

    /// Only the given attributes are eligible
    ///
    /// ### Panics
    ///
    /// If an attribute is not smaller than `nattributes`
    pub fn from_indices(nattributes: usize, attributes: &[usize]) -> Self {
        let mut set = AttributeSet {
            eligible: vec![false; nattributes],
            len: 0,
        };
        for attribute in attributes {
            set.restore(*attribute);
        }

        set
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, attribute: usize) -> bool {
        self.eligible.get(attribute).copied().unwrap_or(false)
    }

    /// Mark `attribute` as used, returns false if it was not eligible
    pub fn remove(&mut self, attribute: usize) -> bool {
        match self.eligible.get_mut(attribute) {
            Some(flag) if *flag => {
                *flag = false;
                self.len -= 1;
                true
            }
            _ => false,
        }
    }

    /// Make `attribute` eligible again
    ///
    /// ### Panics
    ///
    /// If `attribute` is out of range
    pub fn restore(&mut self, attribute: usize) {
        let flag = &mut self.eligible[attribute];
        if !*flag {
            *flag = true;
            self.len += 1;
        }
    }

    /// Iterate over the eligible attributes in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.eligible
            .iter()
            .enumerate()
            .filter(|(_, eligible)| **eligible)
            .map(|(attribute, _)| attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::AttributeSet;

    #[test]
    fn remove_and_restore() {
        let mut set = AttributeSet::all(4);
        assert_eq!(set.len(), 4);

        assert!(set.remove(2));
        assert!(!set.remove(2));
        assert!(!set.contains(2));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 1, 3]);

        set.restore(2);
        set.restore(2);
        assert_eq!(set, AttributeSet::all(4));
    }

    #[test]
    fn from_indices() {
        let set = AttributeSet::from_indices(5, &[4, 1, 1]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 4]);
        assert!(!set.contains(7));
    }

    #[test]
    fn empty_set() {
        let mut set = AttributeSet::all(1);
        assert!(!set.is_empty());
        set.remove(0);
        assert!(set.is_empty());
        assert_eq!(set.iter().next(), None);
    }
}
