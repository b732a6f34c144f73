use std::collections::{HashMap, HashSet};

use crate::core::Key;
use crate::error::{ChartError, ChartResult};

/// Result of matching new data against previously rendered keys.
///
/// Every key of the new data lands in exactly one of `enter`/`update`; every
/// previous key missing from the new data is listed once in `exit`.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<'a, T> {
    /// Records without a rendered element, in data order.
    pub enter: Vec<&'a T>,
    /// Records whose key already has an element, in data order.
    pub update: Vec<(Key, &'a T)>,
    /// Previous keys absent from the new data, in previous order.
    pub exit: Vec<Key>,
}

impl<T> Partition<'_, T> {
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.enter.is_empty() && self.exit.is_empty()
    }
}

/// Partitions `new_data` against `previous_keys`.
///
/// Pure: nothing is created or removed here. Fails with
/// [`ChartError::DuplicateKey`] when two records share a key.
pub fn reconcile<'a, T, F>(
    previous_keys: &[Key],
    new_data: &'a [T],
    key_fn: F,
) -> ChartResult<Partition<'a, T>>
where
    F: Fn(&T) -> Key,
{
    let previous: HashSet<&str> = previous_keys.iter().map(Key::as_str).collect();
    let mut seen: HashMap<Key, usize> = HashMap::with_capacity(new_data.len());
    let mut enter = Vec::new();
    let mut update = Vec::new();

    for (index, datum) in new_data.iter().enumerate() {
        let key = key_fn(datum);
        if let Some(&first_index) = seen.get(&key) {
            return Err(ChartError::DuplicateKey {
                key: key.to_string(),
                first_index,
                second_index: index,
            });
        }
        seen.insert(key.clone(), index);

        if previous.contains(key.as_str()) {
            update.push((key, datum));
        } else {
            enter.push(datum);
        }
    }

    let exit = previous_keys
        .iter()
        .filter(|key| !seen.contains_key(key.as_str()))
        .cloned()
        .collect();

    Ok(Partition {
        enter,
        update,
        exit,
    })
}

#[cfg(test)]
mod tests {
    use super::reconcile;
    use crate::core::Key;

    #[test]
    fn empty_data_exits_every_previous_key() {
        let previous = vec![Key::from("a"), Key::from("b")];
        let data: Vec<&str> = vec![];
        let partition = reconcile(&previous, &data, |d| Key::from(*d)).expect("partition");
        assert_eq!(partition.exit, previous);
        assert!(partition.enter.is_empty());
    }
}
