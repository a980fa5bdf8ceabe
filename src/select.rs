use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{Entry, TestItem, ITEMS_PER_TEST};

/// Draw the items for one test.
///
/// Entries numbered within `start..=end` are shuffled with `rng`, the first
/// 40 are kept, and the tail is padded with empty placeholders. Display
/// indices follow the final order, so they are always exactly `1..=40`.
pub fn select_items<R: Rng + ?Sized>(
    entries: &[Entry],
    start: i64,
    end: i64,
    rng: &mut R,
) -> Vec<TestItem> {
    let mut pool: Vec<&Entry> = entries
        .iter()
        .filter(|e| e.number.is_some_and(|n| start <= n && n <= end))
        .collect();

    log::debug!(
        "{} of {} entries fall within {}..={}",
        pool.len(),
        entries.len(),
        start,
        end
    );

    pool.shuffle(rng);
    pool.truncate(ITEMS_PER_TEST);

    let mut items: Vec<TestItem> = pool
        .into_iter()
        .map(|e| TestItem {
            display_index: 0,
            number: e.number,
            question: e.question.clone(),
            answer: e.answer.clone(),
        })
        .collect();

    while items.len() < ITEMS_PER_TEST {
        items.push(TestItem {
            display_index: 0,
            number: None,
            question: String::new(),
            answer: String::new(),
        });
    }

    for (position, item) in items.iter_mut().enumerate() {
        item.display_index = position + 1;
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn numbered(count: i64) -> Vec<Entry> {
        (1..=count)
            .map(|n| Entry::new(Some(n), format!("word{}", n), format!("meaning{}", n)))
            .collect()
    }

    #[test]
    fn ten_entries_are_padded_to_forty() {
        let entries = numbered(10);
        let mut rng = StdRng::seed_from_u64(7);
        let items = select_items(&entries, 1, 10, &mut rng);

        assert_eq!(items.len(), ITEMS_PER_TEST);
        let real: Vec<&TestItem> = items.iter().filter(|i| !i.is_placeholder()).collect();
        assert_eq!(real.len(), 10);
        assert!(items[..10].iter().all(|i| !i.is_placeholder()));
        assert!(items[10..].iter().all(|i| i.question.is_empty() && i.answer.is_empty()));

        let mut numbers: Vec<i64> = real.iter().filter_map(|i| i.number).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn no_qualifying_entries_gives_placeholders() {
        let entries = numbered(5);
        let mut rng = StdRng::seed_from_u64(1);
        let items = select_items(&entries, 100, 200, &mut rng);
        assert_eq!(items.len(), ITEMS_PER_TEST);
        assert!(items.iter().all(TestItem::is_placeholder));
    }

    #[test]
    fn inverted_range_selects_nothing() {
        let entries = numbered(50);
        let mut rng = StdRng::seed_from_u64(1);
        let items = select_items(&entries, 30, 10, &mut rng);
        assert!(items.iter().all(TestItem::is_placeholder));
    }

    #[test]
    fn unnumbered_rows_are_never_selected() {
        let mut entries = numbered(3);
        entries.push(Entry::new(None, "orphan", "no number"));
        let mut rng = StdRng::seed_from_u64(3);
        let items = select_items(&entries, i64::MIN, i64::MAX, &mut rng);
        assert!(items.iter().all(|i| i.question != "orphan"));
        assert_eq!(items.iter().filter(|i| !i.is_placeholder()).count(), 3);
    }

    #[test]
    fn large_pool_is_sampled_down_to_forty() {
        let entries = numbered(1000);
        let mut rng = StdRng::seed_from_u64(11);
        let items = select_items(&entries, 1, 1000, &mut rng);
        assert_eq!(items.len(), ITEMS_PER_TEST);
        assert!(items.iter().all(|i| !i.is_placeholder()));
    }

    #[test]
    fn same_seed_gives_same_order() {
        let entries = numbered(100);
        let first = select_items(&entries, 1, 100, &mut StdRng::seed_from_u64(42));
        let second = select_items(&entries, 1, 100, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn always_forty_contiguous_in_range(
            count in 0i64..300,
            start in -10i64..200,
            span in 0i64..200,
            seed in any::<u64>(),
        ) {
            let entries = numbered(count);
            let end = start + span;
            let mut rng = StdRng::seed_from_u64(seed);
            let items = select_items(&entries, start, end, &mut rng);

            prop_assert_eq!(items.len(), ITEMS_PER_TEST);
            let indices: Vec<usize> = items.iter().map(|i| i.display_index).collect();
            prop_assert_eq!(indices, (1..=ITEMS_PER_TEST).collect::<Vec<_>>());
            for item in items.iter().filter(|i| !i.is_placeholder()) {
                let n = item.number.unwrap_or(i64::MIN);
                prop_assert!(start <= n && n <= end);
            }
        }
    }
}
