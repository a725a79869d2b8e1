//! Integration tests for view state kept alongside proxy chains.

use std::sync::Arc;

use canopy::ItemId;
use canopy::model::{
    BulkSelection, CheckState, FilterProxyModel, ItemModel, RankNavigation, StateModel,
    TreeModel, TreeNavigation, TreeStateModel,
};

fn sample() -> (Arc<TreeModel<String>>, Vec<ItemId>) {
    let model = Arc::new(TreeModel::new());
    let mut items = Vec::new();
    for i in 0..3 {
        let top = model.add_root(format!("t{i}"));
        items.push(top);
        for j in 0..2 {
            items.push(model.add_child(&top, format!("t{i}.{j}")));
        }
    }
    (model, items)
}

#[test]
fn test_bulk_and_override_precedence() {
    let (model, items) = sample();
    let mut state = TreeStateModel::new();

    state.select(&*model, &items[0], true, true);
    assert!(items[..3].iter().all(|item| state.is_selected(item)));

    state.deselect_all();
    assert_eq!(state.bulk_selection(), BulkSelection::AllOff);
    assert!(items.iter().all(|item| !state.is_selected(item)));

    state.select(&*model, &items[4], true, false);
    assert!(state.is_selected(&items[4]));

    state.select_all();
    state.select(&*model, &items[3], false, true);
    let selected: Vec<bool> = items.iter().map(|item| state.is_selected(item)).collect();
    assert_eq!(selected, vec![true, true, true, false, false, false, true, true, true]);
}

#[test]
fn test_state_shared_across_proxy_layers() {
    let (model, items) = sample();
    let proxy = FilterProxyModel::from_source(model.clone());
    proxy.set_filter(|model: &TreeModel<String>, item: &ItemId| {
        model.data(item, 0).as_string() != Some("t1")
    });

    let mut state = TreeStateModel::new();
    state.expand(&proxy, &ItemId::root(), true, true);

    // t1 and its children are hidden, so they were never expanded
    assert!(!state.is_expanded(&items[3]));
    assert!(state.is_expanded(&items[0]));
    assert_eq!(proxy.visible_count(&state), 6);
    assert_eq!(model.visible_count(&state), 7);
}

#[test]
fn test_recursive_check_and_enable() {
    let (model, items) = sample();
    let mut state = TreeStateModel::new();

    state.set_check(&*model, &items[6], CheckState::Checked, true);
    state.enable(&*model, &items[6], false, true);
    for item in &items[6..] {
        assert_eq!(state.check_state(item), CheckState::Checked);
        assert!(!state.is_enabled(item));
    }
    assert!(state.is_enabled(&items[0]));
    assert_eq!(state.len(), 3);

    state.set_check(&*model, &items[6], CheckState::Unchecked, true);
    state.enable(&*model, &items[6], true, true);
    assert!(state.is_empty());
}

#[test]
fn test_model_change_prunes_state() {
    let (model, items) = sample();
    let mut state = TreeStateModel::new();
    for item in model.descendants(&ItemId::root()).collect::<Vec<_>>() {
        state.set_focus(&*model, &item, true, false);
    }
    assert_eq!(state.len(), items.len());

    model.remove(&items[3]);
    state.on_data_model_changed(&*model);
    assert_eq!(state.len(), items.len() - 3);
    assert!(!state.has_focus(&items[4]));

    state.delete_item(&items[0]);
    assert!(!state.has_focus(&items[0]));
    assert!(state.has_focus(&items[1]));
}
