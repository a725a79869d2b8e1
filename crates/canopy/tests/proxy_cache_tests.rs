//! Integration tests for cached child arrays and proxy chains.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use canopy::model::{
    ArrayProxyConfig, CachingProxyModel, FilterProxyModel, ItemData, ItemModel, SortFilter,
    SortProxyModel, TreeModel, TreeNavigation,
};
use canopy::{ItemId, ModelId};

/// Wraps a tree and counts how often children are materialized upstream.
struct CountingModel {
    inner: TreeModel<String>,
    materialized: AtomicUsize,
}

impl CountingModel {
    fn new() -> Self {
        Self {
            inner: TreeModel::new(),
            materialized: AtomicUsize::new(0),
        }
    }

    fn materialized(&self) -> usize {
        self.materialized.load(Ordering::SeqCst)
    }
}

impl ItemModel for CountingModel {
    fn model_id(&self) -> ModelId {
        self.inner.model_id()
    }

    fn child_count(&self, parent: &ItemId) -> usize {
        self.inner.child_count(parent)
    }

    fn child(&self, parent: &ItemId, index: usize) -> ItemId {
        self.inner.child(parent, index)
    }

    fn parent(&self, item: &ItemId) -> ItemId {
        self.inner.parent(item)
    }

    fn column_count(&self) -> usize {
        self.inner.column_count()
    }

    fn data(&self, item: &ItemId, field: usize) -> ItemData {
        self.inner.data(item, field)
    }

    fn all_children(&self, parent: &ItemId) -> Arc<[ItemId]> {
        self.materialized.fetch_add(1, Ordering::SeqCst);
        self.inner.all_children(parent)
    }
}

fn top_level_names(model: &dyn ItemModel) -> Vec<String> {
    model
        .all_children(&ItemId::root())
        .iter()
        .filter_map(|item| model.data(item, 0).into_string())
        .collect()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("canopy=trace")
        .with_test_writer()
        .try_init();
}

#[test]
fn test_capacity_two_evicts_least_recently_requested() {
    init_tracing();
    let source = Arc::new(TreeModel::<String>::new());
    let parents: Vec<ItemId> = ["A", "B", "C"]
        .into_iter()
        .map(|name| {
            let parent = source.add_root(name.into());
            source.add_child(&parent, format!("{name}0"));
            parent
        })
        .collect();
    let [a, b, c] = [parents[0], parents[1], parents[2]];

    let proxy = CachingProxyModel::from_source(source)
        .with_config(
            ArrayProxyConfig::new()
                .with_capacity(2)
                .with_min_children_for_caching(0),
        )
        .expect("valid config");

    for parent in [a, b, c] {
        proxy.child_count(&parent);
    }
    assert_eq!(proxy.cached_parents(), vec![c, b]);

    proxy.child_count(&a);
    assert_eq!(proxy.cached_parents(), vec![a, c]);
    assert!(!proxy.is_cached(&b));

    let stats = proxy.cache_stats();
    assert_eq!(stats.misses, 4);
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.evictions, 2);
}

#[test]
fn test_hits_do_not_reach_upstream() {
    let source = Arc::new(CountingModel::new());
    let parent = source.inner.add_root("parent".into());
    for i in 0..10 {
        source.inner.add_child(&parent, format!("child{i}"));
    }
    let proxy = CachingProxyModel::from_source(source.clone());

    for index in 0..10 {
        assert!(proxy.child(&parent, index).is_valid());
    }
    assert!(proxy.is_last_child(&proxy.child(&parent, 9)));
    assert_eq!(source.materialized(), 1);

    proxy.invalidate();
    proxy.child_count(&parent);
    assert_eq!(source.materialized(), 2);
}

#[test]
fn test_small_arrays_are_rebuilt_each_time() {
    let source = Arc::new(CountingModel::new());
    let parent = source.inner.add_root("parent".into());
    for i in 0..4 {
        source.inner.add_child(&parent, format!("child{i}"));
    }
    let proxy = CachingProxyModel::from_source(source.clone());

    proxy.child_count(&parent);
    proxy.child_count(&parent);
    assert_eq!(source.materialized(), 2);
    assert_eq!(proxy.cache_stats().entries, 0);
}

#[test]
fn test_cache_is_transparent() {
    let source = Arc::new(TreeModel::<String>::new());
    for i in 0..6 {
        let top = source.add_root(format!("top{i}"));
        for j in 0..i {
            let mid = source.add_child(&top, format!("mid{i}.{j}"));
            for k in 0..3 {
                source.add_child(&mid, format!("leaf{i}.{j}.{k}"));
            }
        }
    }

    let cached = CachingProxyModel::from_source(source.clone())
        .with_config(ArrayProxyConfig::new().with_min_children_for_caching(0).with_capacity(3))
        .expect("valid config");

    let direct: Vec<ItemId> = source.descendants(&ItemId::root()).collect();
    // Walk twice so the second pass mixes hits with capacity evictions
    for _ in 0..2 {
        let through_proxy: Vec<ItemId> = cached.descendants(&ItemId::root()).collect();
        assert_eq!(through_proxy, direct);
    }
    for item in &direct {
        assert_eq!(cached.child_count(item), source.child_count(item));
        assert_eq!(cached.parent(item), source.parent(item));
        assert_eq!(cached.child_index(item), source.child_index(item));
        assert_eq!(cached.next_sibling(item), source.next_sibling(item));
    }
}

#[test]
fn test_sort_over_filter_chain() {
    let source = Arc::new(TreeModel::<String>::new());
    for name in ["delta", "alpha", "tmp-1", "charlie", "bravo", "tmp-2", "echo"] {
        source.add_root(name.into());
    }

    let filtered = Arc::new(FilterProxyModel::from_source(source.clone()));
    filtered.set_filter(|model: &TreeModel<String>, item: &ItemId| {
        !model
            .data(item, 0)
            .as_string()
            .is_some_and(|name| name.starts_with("tmp"))
    });
    let sorted = SortProxyModel::from_source(filtered.clone());
    assert!(sorted.set_sort_filters(vec![SortFilter::ascending(0)]));

    assert_eq!(top_level_names(&sorted), ["alpha", "bravo", "charlie", "delta", "echo"]);
    assert_eq!(sorted.model_id(), source.model_id());

    // A structural edit is invisible until the chain is invalidated
    source.add_root("able".into());
    assert_eq!(sorted.child_count(&ItemId::root()), 5);
    sorted.invalidate();
    assert_eq!(top_level_names(&sorted)[0], "able");
    assert_eq!(filtered.child_count(&ItemId::root()), 6);
}

#[test]
fn test_chain_through_trait_objects() {
    let source: Arc<dyn ItemModel> = Arc::new(TreeModel::<String>::new());
    let cached: Arc<dyn ItemModel> = Arc::new(CachingProxyModel::from_source(source.clone()));
    let sorted = SortProxyModel::from_source(cached);

    assert_eq!(sorted.child_count(&ItemId::root()), 0);
    assert!(sorted.set_sort_filters(vec![SortFilter::descending(0)]));
    assert!(!sorted.set_sort_filters(vec![SortFilter::descending(1)]));
}
