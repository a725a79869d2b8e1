//! Integration tests for rank navigation over models and proxies.

use std::sync::Arc;

use canopy::ItemId;
use canopy::model::{
    ArrayProxyConfig, CachingProxyModel, ItemModel, ListModel, ListStateModel, RankNavigation,
    SortFilter, SortProxyModel, StateModel, TreeModel, TreeNavigation, TreeStateModel,
};

/// Builds a tree where top-level item `i` has `i % 4` children and every
/// second child has two grandchildren.
fn build_tree() -> Arc<TreeModel<String>> {
    let model = Arc::new(TreeModel::new());
    for i in 0..12 {
        let top = model.add_root(format!("{:02}", 11 - i));
        for j in 0..(i % 4) {
            let child = model.add_child(&top, format!("{:02}.{j}", 11 - i));
            if j % 2 == 1 {
                model.add_child(&child, format!("{:02}.{j}.a", 11 - i));
                model.add_child(&child, format!("{:02}.{j}.b", 11 - i));
            }
        }
    }
    model
}

/// Expands every item whose position in pre-order is divisible by `stride`.
fn expand_some(model: &dyn ItemModel, stride: usize) -> TreeStateModel {
    let mut state = TreeStateModel::new();
    let items: Vec<ItemId> = model.descendants(&ItemId::root()).collect();
    for (position, item) in items.iter().enumerate() {
        if position % stride == 0 {
            state.expand(model, item, true, false);
        }
    }
    state
}

/// Flattens the visible tree by walking expanded items only.
fn visible_items(model: &dyn ItemModel, state: &TreeStateModel) -> Vec<ItemId> {
    let mut out = Vec::new();
    let mut pending: Vec<ItemId> = model.all_children(&ItemId::root()).iter().rev().copied().collect();
    while let Some(item) = pending.pop() {
        out.push(item);
        if state.is_expanded(&item) {
            pending.extend(model.all_children(&item).iter().rev().copied());
        }
    }
    out
}

#[test]
fn test_rank_round_trip_on_sorted_proxy() {
    let source = build_tree();
    let proxy = SortProxyModel::from_source(source);
    assert!(proxy.set_sort_filters(vec![SortFilter::ascending(0)]));

    for stride in [1, 2, 3, 5] {
        let state = expand_some(&proxy, stride);
        let visible = visible_items(&proxy, &state);
        assert_eq!(proxy.visible_count(&state), visible.len(), "stride {stride}");

        for (rank, item) in visible.iter().enumerate() {
            assert_eq!(proxy.find_item(rank, &state), *item, "stride {stride} rank {rank}");
            assert_eq!(proxy.item_rank(item, &state), Some(rank), "stride {stride} rank {rank}");
        }
        assert!(!proxy.find_item(visible.len(), &state).is_valid());
    }
}

#[test]
fn test_relative_navigation_matches_absolute() {
    let source = build_tree();
    let state = expand_some(&*source, 2);
    let visible = visible_items(&*source, &state);

    for (start_rank, start) in visible.iter().enumerate().step_by(3) {
        for offset in [0, 1, 2, 7, 40] {
            let expected = visible.get(start_rank + offset).copied().unwrap_or_else(ItemId::invalid);
            assert_eq!(source.next_item(start, offset, &state), expected);

            let expected = start_rank
                .checked_sub(offset)
                .map(|rank| visible[rank])
                .unwrap_or_else(ItemId::invalid);
            assert_eq!(source.prev_item(start, offset, &state), expected);
        }
    }
}

#[test]
fn test_find_item_from_nearby_start() {
    let source = build_tree();
    let state = expand_some(&*source, 1);
    let visible = visible_items(&*source, &state);
    let middle = visible.len() / 2;

    for rank in 0..visible.len() {
        assert_eq!(
            source.find_item_from(rank, &visible[middle], middle, &state),
            visible[rank]
        );
    }
    assert_eq!(
        source.find_item_from(3, &ItemId::invalid(), 99, &state),
        visible[3]
    );
}

#[test]
fn test_collapsing_hides_descendants() {
    let source = build_tree();
    let mut state = TreeStateModel::new();
    state.expand(&*source, &ItemId::root(), true, true);
    let all = source.visible_count(&state);
    assert_eq!(all, source.len());

    // Fourth top-level item: three children, the second with two more
    let top = source.child(&ItemId::root(), 3);
    let hidden = source.visible_descendant_count(&top, &state);
    assert_eq!(hidden, 5);
    let child = source.first_child(&top);

    state.expand(&*source, &top, false, false);
    assert_eq!(source.visible_count(&state), all - hidden);
    assert_eq!(source.item_rank(&child, &state), None);
    assert!(source.item_rank(&top, &state).is_some());
}

#[test]
fn test_flat_list_ranks_are_rows() {
    let list = Arc::new(ListModel::new((0..50).map(|n| format!("{n:03}")).collect()));
    let sorted = SortProxyModel::from_source(list.clone());
    sorted.set_sort_filters(vec![SortFilter::descending(0)]);
    let state = ListStateModel::new();

    assert_eq!(sorted.visible_count(&state), 50);
    let first = sorted.find_item(0, &state);
    assert_eq!(first, list.item_id(49));
    assert_eq!(sorted.item_rank(&list.item_id(0), &state), Some(49));
    assert_eq!(sorted.next_item(&first, 10, &state), list.item_id(39));
}

/// Child array lookups served by `proxy` since its stats were last reset.
fn lookups<S: ItemModel + ?Sized>(proxy: &CachingProxyModel<S>) -> u64 {
    let stats = proxy.cache_stats();
    stats.hits + stats.misses
}

#[test]
fn test_rank_queries_on_large_tree_use_memoized_counts() {
    let model = Arc::new(TreeModel::new());
    let tops: Vec<ItemId> = (0..200)
        .map(|i| {
            let top = model.add_root(format!("{i:03}"));
            for j in 0..50 {
                model.add_child(&top, format!("{i:03}.{j:02}"));
            }
            top
        })
        .collect();
    let proxy = CachingProxyModel::from_source(model)
        .with_config(ArrayProxyConfig::new().with_min_children_for_caching(0))
        .unwrap();

    let mut state = TreeStateModel::new();
    for top in &tops {
        state.expand(&proxy, top, true, false);
    }
    assert_eq!(proxy.visible_count(&state), 10_200);

    proxy.reset_cache_stats();
    let last = proxy.find_item(10_199, &state);
    assert!(lookups(&proxy) <= 4, "find_item used {} lookups", lookups(&proxy));
    assert_eq!(last, proxy.last_child(&tops[199]));

    proxy.reset_cache_stats();
    assert_eq!(proxy.item_rank(&last, &state), Some(10_199));
    assert!(lookups(&proxy) <= 4, "item_rank used {} lookups", lookups(&proxy));

    // Collapsing one item only recounts the top level
    state.expand(&proxy, &tops[0], false, false);
    proxy.reset_cache_stats();
    assert_eq!(proxy.visible_count(&state), 10_150);
    assert!(lookups(&proxy) <= 2, "visible_count used {} lookups", lookups(&proxy));

    assert_eq!(proxy.find_item(2, &state), proxy.first_child(&tops[1]));
    assert_eq!(proxy.find_item(10_149, &state), last);
    assert_eq!(proxy.prev_item(&last, 10_149, &state), tops[0]);
}

#[test]
fn test_memoized_counts_follow_expansion_changes() {
    let source = build_tree();
    let proxy = CachingProxyModel::from_source(source);
    let items: Vec<ItemId> = proxy.descendants(&ItemId::root()).collect();
    let mut state = TreeStateModel::new();

    for step in 0..40 {
        let item = items[(step * 7) % items.len()];
        state.toggle_expanded(&proxy, &item);
        if step % 13 == 0 {
            state.expand(&proxy, &items[step % items.len()], true, true);
        }

        let visible = visible_items(&proxy, &state);
        assert_eq!(proxy.visible_count(&state), visible.len(), "step {step}");
        for (rank, item) in visible.iter().enumerate().step_by(3) {
            assert_eq!(proxy.find_item(rank, &state), *item, "step {step} rank {rank}");
            assert_eq!(proxy.item_rank(item, &state), Some(rank), "step {step} rank {rank}");
        }
    }

    // A second state model shares the proxy without seeing the first one's counts
    let other = TreeStateModel::new();
    assert_eq!(proxy.visible_count(&other), 12);
    let visible = visible_items(&proxy, &state);
    assert_eq!(proxy.visible_count(&state), visible.len());
}
