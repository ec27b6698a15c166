use canvas::{
    Editor, EditorConfig, EditorError, Key, KeyEvent, Modifiers, PointerEvent, Preview, RecordingRenderer,
    RenderEvent, Tool,
};
use glam::DVec2;
use history::{Command, CommandKind, HistoryError};
use node::{Color, Element, ElementKind, Point, Transform};
use scene_graph::SceneChange;

fn recording_editor(config: EditorConfig) -> Editor<RecordingRenderer> {
    Editor::with_renderer(config, RecordingRenderer::new())
}

#[test]
fn test_insert_then_undo_leaves_an_empty_document() {
    let mut editor = Editor::new(EditorConfig::default());
    let document = editor.document();
    assert_eq!((document.width, document.height), (800.0, 600.0));
    assert_eq!(document.background, Color::WHITE);

    let id = editor.next_id();
    let command = Command::insert(editor.scene(), None, Element::rect(id, 10.0, 10.0, 100.0, 50.0), 0).unwrap();
    editor.execute(command).unwrap();
    assert_eq!(editor.document().element_count(), 1);

    assert_eq!(editor.undo().unwrap(), CommandKind::Insert);
    assert_eq!(editor.document().element_count(), 0);
}

#[test]
fn test_overlapping_circles_hit_the_later_one() {
    let mut editor = Editor::new(EditorConfig::default());
    let first = editor.next_id();
    let second = editor.next_id();
    editor.insert(None, Element::circle(first, 50.0, 50.0, 30.0)).unwrap();
    editor.insert(None, Element::circle(second, 60.0, 50.0, 30.0)).unwrap();

    assert_eq!(editor.hit_test(Point::new(55.0, 50.0)), Some(second));
    assert_eq!(editor.hit_test_all(Point::new(55.0, 50.0)), vec![second, first]);
    assert_eq!(editor.hit_test(Point::new(500.0, 500.0)), None);
}

#[test]
fn test_bounded_history_keeps_the_newest_commands() {
    let config = EditorConfig {
        history_capacity: Some(3),
        ..EditorConfig::default()
    };
    let mut editor = Editor::new(config);
    for i in 0..5 {
        let id = editor.next_id();
        editor
            .insert(None, Element::rect(id, i as f64 * 10.0, 0.0, 5.0, 5.0))
            .unwrap();
    }

    for _ in 0..3 {
        editor.undo().unwrap();
    }
    assert!(matches!(
        editor.undo(),
        Err(EditorError::History(HistoryError::NothingToUndo))
    ));
    assert_eq!(editor.scene().len(), 2);
}

#[test]
fn test_removing_a_group_prunes_selected_descendants() {
    let mut editor = recording_editor(EditorConfig::default());
    let child = editor.next_id();
    let group = editor.next_id();
    editor
        .insert(
            None,
            Element::group(group, vec![Element::rect(child, 0.0, 0.0, 10.0, 10.0)]),
        )
        .unwrap();
    editor.select(&[child], false).unwrap();
    editor.renderer_mut().take();

    let removed = editor.delete(&[group]).unwrap();
    assert!(removed.contains(&group) && removed.contains(&child));
    assert!(editor.selection().is_empty());

    let events = editor.renderer_mut().take();
    assert!(matches!(
        &events[0],
        RenderEvent::Scene(SceneChange::Removed { id, subtree }) if *id == group && subtree.contains(&child)
    ));
    assert_eq!(events.last(), Some(&RenderEvent::Selection(vec![])));
}

#[test]
fn test_drag_moves_the_selection_with_one_command() {
    let mut editor = Editor::new(EditorConfig::default());
    let id = editor.next_id();
    editor.insert(None, Element::rect(id, 0.0, 0.0, 20.0, 20.0)).unwrap();
    let undo_len = editor.history().undo_len();

    editor.pointer_down(PointerEvent::at(5.0, 5.0)).unwrap();
    editor.pointer_move(PointerEvent::at(10.0, 5.0));
    editor.pointer_move(PointerEvent::at(15.0, 8.0));
    assert!(editor.selection().contains(id));
    assert_eq!(
        editor.preview(),
        Some(Preview::Translate {
            ids: vec![id],
            delta: DVec2::new(10.0, 3.0)
        })
    );
    // Nothing moves until the pointer is released.
    assert_eq!(editor.scene().world_transform(id), Some(Transform::IDENTITY));

    let kind = editor.pointer_up(PointerEvent::at(25.0, 5.0)).unwrap();
    assert_eq!(kind, Some(CommandKind::Translate));
    assert_eq!(editor.history().undo_len(), undo_len + 1);
    assert_eq!(editor.scene().world_transform(id), Some(Transform::translate(20.0, 0.0)));
}

#[test]
fn test_escape_cancels_a_drag_without_touching_the_scene() {
    let mut editor = Editor::new(EditorConfig::default());
    let a = editor.next_id();
    let b = editor.next_id();
    editor.insert(None, Element::rect(a, 0.0, 0.0, 20.0, 20.0)).unwrap();
    editor.insert(None, Element::rect(b, 50.0, 0.0, 20.0, 20.0)).unwrap();
    editor.select(&[b], false).unwrap();
    let undo_len = editor.history().undo_len();

    editor.pointer_down(PointerEvent::at(5.0, 5.0)).unwrap();
    editor.pointer_move(PointerEvent::at(40.0, 40.0));
    assert_eq!(editor.selection().ids(), &[a]);

    assert!(editor.key_down(KeyEvent::plain(Key::Escape)).unwrap());
    assert!(editor.gesture().is_none());
    assert_eq!(editor.selection().ids(), &[b]);
    assert_eq!(editor.history().undo_len(), undo_len);
    assert_eq!(editor.pointer_up(PointerEvent::at(40.0, 40.0)).unwrap(), None);

    // A second escape, with no gesture, clears the selection.
    assert!(editor.key_down(KeyEvent::plain(Key::Escape)).unwrap());
    assert!(editor.selection().is_empty());
}

#[test]
fn test_click_selects_and_shift_click_toggles() {
    let mut editor = Editor::new(EditorConfig::default());
    let a = editor.next_id();
    let b = editor.next_id();
    editor.insert(None, Element::rect(a, 0.0, 0.0, 20.0, 20.0)).unwrap();
    editor.insert(None, Element::rect(b, 50.0, 0.0, 20.0, 20.0)).unwrap();

    editor.pointer_down(PointerEvent::at(5.0, 5.0)).unwrap();
    assert_eq!(editor.pointer_up(PointerEvent::at(6.0, 5.0)).unwrap(), None);
    assert_eq!(editor.selection().ids(), &[a]);

    let shift = |x, y| PointerEvent::at(x, y).with_modifiers(Modifiers::shift());
    editor.pointer_down(shift(55.0, 5.0)).unwrap();
    editor.pointer_up(shift(55.0, 5.0)).unwrap();
    assert_eq!(editor.selection().ids(), &[a, b]);

    editor.pointer_down(shift(5.0, 5.0)).unwrap();
    editor.pointer_up(shift(5.0, 5.0)).unwrap();
    assert_eq!(editor.selection().ids(), &[b]);

    // Clicking empty canvas clears.
    editor.pointer_down(PointerEvent::at(300.0, 300.0)).unwrap();
    editor.pointer_up(PointerEvent::at(300.0, 300.0)).unwrap();
    assert!(editor.selection().is_empty());
}

#[test]
fn test_marquee_selects_intersecting_roots() {
    let mut editor = Editor::new(EditorConfig::default());
    let a = editor.next_id();
    let b = editor.next_id();
    editor.insert(None, Element::rect(a, 100.0, 100.0, 20.0, 20.0)).unwrap();
    editor.insert(None, Element::rect(b, 300.0, 300.0, 20.0, 20.0)).unwrap();

    editor.pointer_down(PointerEvent::at(90.0, 90.0)).unwrap();
    editor.pointer_move(PointerEvent::at(150.0, 150.0));
    assert!(matches!(editor.preview(), Some(Preview::Marquee(_))));
    assert_eq!(editor.pointer_up(PointerEvent::at(150.0, 150.0)).unwrap(), None);
    assert_eq!(editor.selection().ids(), &[a]);
}

#[test]
fn test_drawing_a_rect_inserts_and_selects_it() {
    let mut editor = Editor::new(EditorConfig::default());
    assert!(editor.key_down(KeyEvent::plain(Key::Char('r'))).unwrap());
    assert_eq!(editor.tool(), Tool::Rect);

    editor.pointer_down(PointerEvent::at(10.0, 10.0)).unwrap();
    editor.pointer_move(PointerEvent::at(60.0, 40.0));
    assert!(editor.scene().is_empty());
    let kind = editor.pointer_up(PointerEvent::at(110.0, 60.0)).unwrap();
    assert_eq!(kind, Some(CommandKind::Insert));

    let [id] = editor.selection().ids() else {
        panic!("expected one selected element");
    };
    let element = editor.scene().find(*id).unwrap();
    assert_eq!(
        element.kind,
        ElementKind::Rect {
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 50.0,
            rx: 0.0
        }
    );
    assert_eq!(element.style, editor.config().default_style);
}

#[test]
fn test_short_draw_emits_nothing() {
    let mut editor = Editor::new(EditorConfig::default());
    editor.set_tool(Tool::Circle);
    editor.pointer_down(PointerEvent::at(10.0, 10.0)).unwrap();
    assert_eq!(editor.pointer_up(PointerEvent::at(11.0, 11.0)).unwrap(), None);
    assert!(editor.scene().is_empty());
    assert!(!editor.history().can_undo());
}

#[test]
fn test_keyboard_edits() {
    let mut editor = Editor::new(EditorConfig::default());
    let a = editor.next_id();
    let b = editor.next_id();
    editor.insert(None, Element::rect(a, 0.0, 0.0, 10.0, 10.0)).unwrap();
    editor.insert(None, Element::rect(b, 20.0, 0.0, 10.0, 10.0)).unwrap();

    let command = |c| KeyEvent::new(Key::Char(c), Modifiers::command());
    assert!(editor.key_down(command('a')).unwrap());
    assert_eq!(editor.selection().ids(), &[a, b]);

    assert!(editor.key_down(KeyEvent::new(Key::ArrowRight, Modifiers::shift())).unwrap());
    assert_eq!(editor.scene().world_transform(a), Some(Transform::translate(10.0, 0.0)));
    assert!(editor.key_down(KeyEvent::plain(Key::ArrowUp)).unwrap());
    assert_eq!(editor.scene().world_transform(b), Some(Transform::translate(10.0, -1.0)));

    assert!(editor.key_down(command('g')).unwrap());
    let [group] = editor.selection().ids() else {
        panic!("expected the new group to be selected");
    };
    let group = *group;
    assert_eq!(editor.scene().root_ids(), vec![group]);

    assert!(editor
        .key_down(KeyEvent::new(Key::Char('g'), Modifiers::command_shift()))
        .unwrap());
    assert_eq!(editor.scene().root_ids(), vec![a, b]);
    assert_eq!(editor.selection().ids(), &[a, b]);

    editor.select(&[a], false).unwrap();
    assert!(editor.key_down(KeyEvent::plain(Key::Char(']'))).unwrap());
    assert_eq!(editor.scene().root_ids(), vec![b, a]);
    // Already on top.
    assert!(!editor.key_down(KeyEvent::plain(Key::Char(']'))).unwrap());

    assert!(editor.key_down(KeyEvent::plain(Key::Delete)).unwrap());
    assert_eq!(editor.scene().root_ids(), vec![b]);
    assert!(editor.selection().is_empty());

    assert!(editor.key_down(command('z')).unwrap());
    assert_eq!(editor.scene().root_ids(), vec![b, a]);
    assert!(editor.key_down(KeyEvent::new(Key::Char('z'), Modifiers::command_shift())).unwrap());
    assert_eq!(editor.scene().root_ids(), vec![b]);
}

#[test]
fn test_renderer_sees_changes_in_order() {
    let mut editor = recording_editor(EditorConfig::default());
    let id = editor.next_id();
    editor.insert(None, Element::rect(id, 0.0, 0.0, 10.0, 10.0)).unwrap();
    editor.translate(&[id], DVec2::new(1.0, 0.0)).unwrap();
    editor.undo().unwrap();

    let changes: Vec<_> = editor.renderer().scene_changes().cloned().collect();
    assert_eq!(
        changes,
        vec![
            SceneChange::Inserted { id },
            SceneChange::Updated { id },
            SceneChange::Updated { id },
        ]
    );
}
