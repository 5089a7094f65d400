use super::*;
use crate::config::{AddCollisionPolicy, EditorConfig};
use crate::datatypes::{Row, RowIdentity, Selection};
use crate::projection::DisplayState;
use crate::utils::OverlayError;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn row(value: serde_json::Value) -> Row {
    value.as_object().unwrap().clone()
}

fn id(key: &str) -> RowIdentity {
    RowIdentity::from(key)
}

/// 创建测试用的编辑器
fn create_test_editor() -> GridEditor {
    let rows = vec![
        row(json!({"id": "1", "name": "Ada", "age": 28})),
        row(json!({"id": "2", "name": "Linus", "age": 54})),
        row(json!({"id": "3", "name": "Grace", "age": 85})),
    ];
    GridEditor::new(rows, EditorConfig::default()).unwrap()
}

fn set_age(age: i64) -> impl FnMut(Row) -> Row {
    set_field("age", json!(age))
}

#[test]
fn test_modify_and_revert_scenario() {
    let mut editor = GridEditor::new(
        vec![row(json!({"id": "1", "age": 28}))],
        EditorConfig::default(),
    )
    .unwrap();

    editor.modify_rows([id("1")], set_age(99)).unwrap();
    assert_eq!(
        editor.get_changes().to_json(),
        json!({"1": {"type": "modified", "data": {"id": "1", "age": 99}}})
    );

    editor.modify_rows([id("1")], set_age(28)).unwrap();
    assert!(editor.get_changes().is_empty());
    assert_eq!(editor.get_changes().to_json(), json!({}));
}

#[test]
fn test_revert_with_float_number_removes_entry() {
    let mut editor = GridEditor::new(
        vec![row(json!({"id": "1", "age": 28}))],
        EditorConfig::default(),
    )
    .unwrap();

    editor.modify_rows([id("1")], set_age(99)).unwrap();
    assert_eq!(editor.change_count(), 1);

    editor.modify_rows([id("1")], set_field("age", json!(28.0))).unwrap();
    assert!(editor.get_changes().is_empty());
    assert_eq!(editor.display_state(&id("1")), Some(DisplayState::Unchanged));
}

#[test]
fn test_identity_transform_never_creates_entry() {
    let mut editor = create_test_editor();
    let affected = editor
        .modify_rows([id("1"), id("2"), id("3")], |r: Row| r)
        .unwrap();
    assert_eq!(affected, 0);
    assert!(!editor.has_changes());
}

#[test]
fn test_add_then_delete_vanishes() {
    let mut editor = create_test_editor();

    editor.add_row(row(json!({"id": "4", "age": 50}))).unwrap();
    assert_eq!(
        editor.get_changes().get(&id("4")),
        Some(&Modification::Added {
            data: row(json!({"id": "4", "age": 50}))
        })
    );

    editor.delete_rows([id("4")]);
    assert!(editor.get_changes().is_empty());
}

#[test]
fn test_added_row_stays_added_when_modified() {
    let mut editor = create_test_editor();
    editor.add_row(row(json!({"id": "10", "age": 1}))).unwrap();

    editor.modify_rows([id("10")], set_age(2)).unwrap();
    let changes = editor.get_changes();
    assert!(changes.get(&id("10")).unwrap().is_added());
    assert_eq!(changes.get(&id("10")).unwrap().data().unwrap()["age"], json!(2));

    editor.modify_rows([id("10")], set_age(1)).unwrap();
    assert!(editor.get_changes().get(&id("10")).unwrap().is_added());
}

#[test]
fn test_modify_on_deleted_row_is_noop() {
    let mut editor = create_test_editor();
    editor.delete_rows([id("2")]);

    let affected = editor.modify_rows([id("2")], set_age(1)).unwrap();
    assert_eq!(affected, 0);
    assert_eq!(editor.get_changes().get(&id("2")), Some(&Modification::Deleted));
}

#[test]
fn test_delete_discards_modified_data() {
    let mut editor = create_test_editor();
    editor.modify_rows([id("1")], set_age(99)).unwrap();
    editor.delete_rows([id("1")]);

    assert_eq!(editor.get_changes().get(&id("1")), Some(&Modification::Deleted));

    let view = editor.project();
    assert_eq!(view[0].state, DisplayState::Deleted);
    assert_eq!(view[0].row["age"], json!(28));
}

#[test]
fn test_undo_row_for_every_kind() {
    let mut editor = create_test_editor();
    editor.add_row(row(json!({"id": "4"}))).unwrap();
    editor.modify_rows([id("1")], set_age(99)).unwrap();
    editor.delete_rows([id("2")]);

    for key in ["4", "1", "2"] {
        assert!(editor.undo_row(&id(key)));
        assert!(editor.get_changes().get(&id(key)).is_none());
    }
    assert!(!editor.undo_row(&id("1")));
    assert_eq!(editor.effective_row(&id("1")).unwrap()["age"], json!(28));
}

#[test]
fn test_reset_restores_base_view() {
    let mut editor = create_test_editor();
    editor.add_row(row(json!({"id": "4"}))).unwrap();
    editor.modify_rows([id("1"), id("3")], set_age(0)).unwrap();
    editor.delete_rows([id("2")]);

    assert_eq!(editor.reset(), 4);
    assert!(editor.get_changes().is_empty());

    let view: Vec<Row> = editor.project().iter().map(|r| r.row.clone()).collect();
    assert_eq!(view.as_slice(), editor.base().rows());
}

#[test]
fn test_cell_edit_uses_modify_path() {
    let mut editor = create_test_editor();

    editor
        .apply_cell_edit(CellEdit::new("3", "name", json!("Hopper")))
        .unwrap();
    assert_eq!(editor.display_state(&id("3")), Some(DisplayState::Modified));

    editor
        .apply_cell_edit(CellEdit::new("3", "name", json!("Grace")))
        .unwrap();
    assert_eq!(editor.display_state(&id("3")), Some(DisplayState::Unchanged));
}

#[test]
fn test_selection_commands() {
    let mut editor = create_test_editor();
    let selection: Selection = [id("1"), id("3")].into_iter().collect();

    let affected = editor
        .modify_selected(&selection, set_fields(row(json!({"age": 1, "team": "x"}))))
        .unwrap();
    assert_eq!(affected, 2);

    assert_eq!(editor.delete_selected(&selection), 2);
    assert!(editor.get_changes().iter().all(|(_, m)| m.is_deleted()));

    assert_eq!(editor.delete_selected(&Selection::new()), 0);
}

#[test]
fn test_on_change_notifications() {
    let seen: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);

    let mut editor = create_test_editor().on_change(move |snapshot| {
        sink.borrow_mut().push(snapshot.len());
    });

    editor.modify_rows([id("1")], set_age(99)).unwrap();
    editor.modify_rows([id("1")], set_age(28)).unwrap();
    editor.delete_rows(Vec::<RowIdentity>::new());
    editor.undo_row(&id("404"));
    editor.add_row(row(json!({"id": "4"}))).unwrap();

    assert_eq!(*seen.borrow(), vec![1, 0, 1]);
}

#[test]
fn test_add_without_identity_is_rejected() {
    let mut editor = create_test_editor();
    let result = editor.add_row(row(json!({"name": "nobody"})));
    assert!(matches!(result, Err(OverlayError::MissingIdentity { .. })));
    assert!(!editor.has_changes());
}

#[test]
fn test_add_over_deleted_overwrites_by_default() {
    let mut editor = create_test_editor();
    editor.delete_rows([id("2")]);
    editor.add_row(row(json!({"id": "2", "name": "New"}))).unwrap();

    assert!(editor.get_changes().get(&id("2")).unwrap().is_added());

    let ids: Vec<_> = editor.project().iter().map(|r| r.id.to_string()).collect();
    assert_eq!(ids, vec!["1", "3", "2"]);

    editor.undo_row(&id("2"));
    assert_eq!(editor.effective_row(&id("2")).unwrap()["name"], json!("Linus"));
}

#[test]
fn test_add_collision_reject_policy() {
    let rows = vec![row(json!({"id": "1"}))];
    let config = EditorConfig::default().add_collision(AddCollisionPolicy::Reject);
    let mut editor = GridEditor::new(rows, config).unwrap();

    editor.delete_rows([id("1")]);
    let result = editor.add_row(row(json!({"id": "1"})));
    assert!(matches!(result, Err(OverlayError::AddCollision(key)) if key == "1"));
    assert_eq!(editor.get_changes().get(&id("1")), Some(&Modification::Deleted));

    editor.add_row(row(json!({"id": "2"}))).unwrap();
    assert!(editor.add_row(row(json!({"id": "2", "x": 1}))).is_err());
}

#[test]
fn test_undo_redo_last_instruction() {
    let mut editor = create_test_editor();
    editor.modify_rows([id("1")], set_age(99)).unwrap();
    editor.delete_rows([id("1"), id("2")]);

    editor.undo_last().unwrap();
    assert!(editor.get_changes().get(&id("1")).unwrap().is_modified());
    assert!(editor.get_changes().get(&id("2")).is_none());

    editor.redo_last().unwrap();
    assert_eq!(editor.get_changes().get(&id("1")), Some(&Modification::Deleted));
    assert_eq!(editor.get_changes().get(&id("2")), Some(&Modification::Deleted));

    editor.reset();
    editor.undo_last().unwrap();
    assert_eq!(editor.change_count(), 2);

    editor.undo_last().unwrap();
    editor.undo_last().unwrap();
    assert!(!editor.has_changes());
    assert!(matches!(editor.undo_last(), Err(OverlayError::NothingToUndo)));
}

#[test]
fn test_undo_reset_keeps_added_order() {
    let mut editor = GridEditor::new(vec![row(json!({"id": "1"}))], EditorConfig::default()).unwrap();
    for key in ["a", "b", "c"] {
        editor.add_row(row(json!({"id": key}))).unwrap();
    }
    editor.apply_cell_edit(CellEdit::new("1", "name", json!("Ada"))).unwrap();

    let view_ids = |editor: &GridEditor| -> Vec<String> {
        editor.project().iter().map(|r| r.id.to_string()).collect()
    };
    let before = view_ids(&editor);
    assert_eq!(before, vec!["1", "a", "b", "c"]);

    editor.reset();
    assert_eq!(view_ids(&editor), vec!["1"]);

    editor.undo_last().unwrap();
    assert_eq!(view_ids(&editor), before);
    assert_eq!(editor.display_state(&id("1")), Some(DisplayState::Modified));
}

#[test]
fn test_history_can_be_disabled() {
    let rows = vec![row(json!({"id": "1"}))];
    let mut editor = GridEditor::new(rows, EditorConfig::default().track_history(false)).unwrap();
    editor.delete_rows([id("1")]);

    assert!(!editor.can_undo());
    assert!(matches!(editor.undo_last(), Err(OverlayError::NothingToUndo)));
}

#[test]
fn test_independent_instances() {
    let mut first = create_test_editor();
    let second = create_test_editor();

    first.delete_rows([id("1")]);
    assert!(first.has_changes());
    assert!(!second.has_changes());
}

#[test]
fn test_integer_identity_field() {
    let rows = vec![row(json!({"sku": 100, "qty": 1})), row(json!({"sku": 200, "qty": 2}))];
    let mut editor = GridEditor::new(rows, EditorConfig::with_identity_field("sku")).unwrap();

    editor.modify_rows([RowIdentity::from(100)], set_field("qty", json!(5))).unwrap();
    assert!(editor.get_changes().contains(&id("100")));
    assert_eq!(editor.identity_field(), "sku");
}

#[test]
fn test_summary() {
    let mut editor = create_test_editor();
    editor.delete_rows([id("1")]);
    let summary = editor.summary();
    assert!(summary.contains("已修改"));
    assert!(summary.contains("删除: 1"));
}
