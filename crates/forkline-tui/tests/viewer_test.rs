use forkline_core::export::ConversationFile;
use forkline_core::{ConversationView, Message, Preferences};
use forkline_tui::tui::app::App;
use forkline_tui::tui::follow::FollowMode;
use forkline_tui::tui::replay::{ReplayEvent, chunks};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

fn screen(terminal: &Terminal<TestBackend>) -> String {
    let buf = terminal.backend().buffer();
    (0..buf.area.height)
        .map(|y| {
            (0..buf.area.width)
                .map(|x| buf[(x, y)].symbol())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn wheel_up() -> MouseEvent {
    MouseEvent {
        kind: MouseEventKind::ScrollUp,
        column: 5,
        row: 5,
        modifiers: KeyModifiers::NONE,
    }
}

/// Two answers to the first question; the second answer continues for a
/// few more turns with long replies.
fn exported() -> ConversationFile {
    let long = |tag: &str| {
        (1..=8)
            .map(|n| format!("{tag} paragraph {n}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    ConversationFile {
        messages: vec![
            Message::user("u1", "tell me a story").with_children(["a1", "a2"]),
            Message::assistant("a1", "once upon a time").with_parent("u1"),
            Message::assistant("a2", long("a2"))
                .with_parent("u1")
                .with_children(["u2"]),
            Message::user("u2", "go on").with_parent("a2").with_children(["a3"]),
            Message::assistant("a3", long("a3"))
                .with_parent("u2")
                .with_children(["u3"]),
            Message::user("u3", "and then?").with_parent("a3").with_children(["a4"]),
            Message::assistant("a4", long("a4")).with_parent("u3"),
        ],
        active_leaf_id: None,
    }
}

fn viewer(file: ConversationFile) -> App {
    let leaf = file.initial_leaf();
    App::new(
        ConversationView::new(file.messages).with_active_leaf(leaf),
        Preferences::default(),
    )
}

#[test]
fn opens_on_the_latest_leaf_with_branch_switcher() {
    let mut app = viewer(exported());
    let mut terminal = Terminal::new(TestBackend::new(70, 16)).unwrap();
    terminal.draw(|f| app.render(f)).unwrap();

    let path: Vec<String> = app
        .conversation()
        .displayed_path()
        .iter()
        .map(|m| m.id.clone())
        .collect();
    assert_eq!(path, ["u1", "a2", "u2", "a3", "u3", "a4"]);

    let text = screen(&terminal);
    assert!(text.contains("a4 paragraph 8"));
    assert!(text.contains("FOLLOW"));
    assert!(text.contains("6 messages │ leaf a4"));
}

#[test]
fn switching_to_the_short_branch_drops_the_tail() {
    let mut app = viewer(exported());
    let mut terminal = Terminal::new(TestBackend::new(70, 16)).unwrap();
    terminal.draw(|f| app.render(f)).unwrap();

    app.handle_key(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE));
    terminal.draw(|f| app.render(f)).unwrap();

    assert_eq!(app.conversation().resolved_leaf(), Some("a1"));
    let text = screen(&terminal);
    assert!(text.contains("once upon a time"));
    assert!(text.contains("‹ 1 / 2 ›"));
    assert!(text.contains("2 messages"));
}

#[test]
fn scrolling_up_during_a_stream_detaches_until_jumping_back() {
    let mut app = viewer(exported());
    let mut terminal = Terminal::new(TestBackend::new(70, 16)).unwrap();
    let content = app.prepare_replay().unwrap();
    terminal.draw(|f| app.render(f)).unwrap();

    let mut pieces = chunks(&content).into_iter();
    app.handle_replay_event(ReplayEvent::Started);
    app.handle_replay_event(ReplayEvent::Chunk(pieces.next().unwrap()));
    for _ in 0..10 {
        terminal.draw(|f| app.render(f)).unwrap();
    }
    assert!(app.follow().is_following());

    for _ in 0..2 {
        app.handle_mouse(wheel_up());
        terminal.draw(|f| app.render(f)).unwrap();
    }
    assert_eq!(app.follow().mode(), FollowMode::Detached);
    let parked = app.viewport().state().offset;

    for piece in pieces {
        app.handle_replay_event(ReplayEvent::Chunk(piece));
        terminal.draw(|f| app.render(f)).unwrap();
    }
    assert_eq!(app.viewport().state().offset, parked);
    assert!(screen(&terminal).contains("DETACHED"));

    app.handle_key(KeyEvent::new(KeyCode::End, KeyModifiers::NONE));
    for _ in 0..20 {
        terminal.draw(|f| app.render(f)).unwrap();
    }
    let state = app.viewport().state();
    assert_eq!(state.offset, state.max_offset());
    assert!(app.follow().is_following());

    app.handle_replay_event(ReplayEvent::Finished);
    assert!(!app.follow().is_loading());
}
