//! Persisting view settings with the `serde` feature.
#![cfg(feature = "serde")]

use canopy::model::{ArrayProxyConfig, SortFilter, SortOrder, TreePath};

#[test]
fn test_sort_filters_json() {
    let filters = vec![SortFilter::descending(2), SortFilter::new(0, SortOrder::None)];
    let json = serde_json::to_string(&filters).unwrap();
    assert_eq!(
        json,
        r#"[{"field":2,"order":"Descending"},{"field":0,"order":"None"}]"#
    );
    let back: Vec<SortFilter> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, filters);
}

#[test]
fn test_config_missing_fields_take_defaults() {
    let config: ArrayProxyConfig = serde_json::from_str(r#"{"capacity":64}"#).unwrap();
    assert_eq!(config, ArrayProxyConfig::new().with_capacity(64));
    assert!(config.validate().is_ok());

    let bounded: ArrayProxyConfig =
        serde_json::from_str(r#"{"min_children_for_caching":1,"max_children_for_caching":8}"#)
            .unwrap();
    assert!(bounded.should_cache(8));
    assert!(!bounded.should_cache(9));
}

#[test]
fn test_deep_tree_path_json() {
    let path: TreePath = (0..14).collect();
    assert!(path.is_spilled());

    let json = serde_json::to_value(&path).unwrap();
    assert_eq!(json["indices"].as_array().map(Vec::len), Some(14));

    let back: TreePath = serde_json::from_value(json).unwrap();
    assert_eq!(back, path);
    assert_eq!(back.index_at_level(13), Some(13));
}
