use serde::{Deserialize, Serialize};

/// Represents zero, one, or many items of `T`.
///
/// Used to normalise a [`Strategy::analyze`](https://docs.rs/vantage-strategy)
/// return value — a single [`Decision`](https://docs.rs/vantage-strategy) or
/// a `Vec` of them — into one shape the engine can iterate uniformly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NoneOneOrMany<T> {
    #[default]
    None,
    One(T),
    Many(Vec<T>),
}

impl<T> NoneOneOrMany<T> {
    pub fn len(&self) -> usize {
        match self {
            NoneOneOrMany::None => 0,
            NoneOneOrMany::One(_) => 1,
            NoneOneOrMany::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            NoneOneOrMany::None => Vec::new(),
            NoneOneOrMany::One(item) => vec![item],
            NoneOneOrMany::Many(items) => items,
        }
    }
}

impl<T> From<T> for NoneOneOrMany<T> {
    fn from(value: T) -> Self {
        NoneOneOrMany::One(value)
    }
}

impl<T> From<Vec<T>> for NoneOneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        NoneOneOrMany::Many(values)
    }
}

impl<T> IntoIterator for NoneOneOrMany<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_single_and_many() {
        let single: NoneOneOrMany<i32> = 1.into();
        assert_eq!(single.into_vec(), vec![1]);

        let many: NoneOneOrMany<i32> = vec![1, 2, 3].into();
        assert_eq!(many.into_vec(), vec![1, 2, 3]);

        let none: NoneOneOrMany<i32> = NoneOneOrMany::None;
        assert!(none.is_empty());
    }
}
