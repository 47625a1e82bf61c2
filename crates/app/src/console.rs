use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::io::{AsyncBufReadExt, BufReader};

use confab_core::{
    ConversationId, ConversationRoster, Navigator, Role, Route, SessionProvider, ShellState,
    resolve_route,
};

use crate::config::AppSettings;
use crate::coordinator::{ChatCoordinator, ChatEvent};
use crate::reply::{CannedReplies, SUGGESTED_PROMPTS};
use crate::resize::ResizeDebouncer;
use crate::session::InMemorySession;

/// Stand-in for the routing layer: echoes where the shell would navigate.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        println!("-> {}", route.as_path());
    }
}

/// Line-oriented front-end for the chat core.
///
/// This is deliberately thin: it renders events and translates lines into the
/// same submit/toggle/navigate/resize inputs a graphical shell would send.
pub async fn run(settings: AppSettings) {
    let session = InMemorySession::anonymous();
    let navigator = ConsoleNavigator;
    let mut roster = ConversationRoster::with_seed_data();
    let shell = Arc::new(Mutex::new(ShellState::new()));
    let (coordinator, mut events) =
        ChatCoordinator::new(Arc::new(CannedReplies), settings.reply_delay());

    let shell_for_resize = Arc::clone(&shell);
    let mut debouncer = ResizeDebouncer::new(settings.resize_debounce(), move |width| {
        let mut shell = lock_shell(&shell_for_resize);
        match shell.observe_width(width) {
            Ok(viewport) => println!("viewport: {viewport:?}, layout: {:?}", shell.layout()),
            Err(error) => tracing::warn!(%error, "keeping last known layout"),
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("email to sign in:");
    while !session.current().is_authenticated() {
        match lines.next_line().await {
            Ok(Some(line)) if !line.trim().is_empty() => session.sign_in(line.trim()),
            Ok(Some(_)) => println!("email to sign in:"),
            Ok(None) => return,
            Err(error) => {
                tracing::error!(%error, "failed to read stdin");
                return;
            }
        }
    }

    let current = session.current();
    println!(
        "signed in as {}",
        current.user_email().unwrap_or("unknown user")
    );

    // Land on the most recent conversation, through the auth guard like any
    // other navigation.
    if let Some(first) = roster.visible().next().map(|conversation| conversation.id) {
        open_conversation(&coordinator, &roster, &shell, &navigator, &session, first);
    }

    println!("try asking:");
    for prompt in SUGGESTED_PROMPTS {
        println!("  {prompt}");
    }
    println!("(/help lists commands)");

    loop {
        tokio::select! {
            maybe_line = lines.next_line() => {
                match maybe_line {
                    Ok(Some(line)) => {
                        if !handle_line(
                            &line,
                            &coordinator,
                            &mut roster,
                            &shell,
                            &navigator,
                            &session,
                            &mut debouncer,
                        ) {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(error) => {
                        tracing::error!(%error, "failed to read stdin");
                        break;
                    }
                }
            }
            maybe_event = events.recv() => {
                match maybe_event {
                    Some(event) => render_event(event, &settings),
                    None => break,
                }
            }
        }
    }

    coordinator.cancel_pending_reply();
}

/// Returns false when the session should end.
fn handle_line(
    line: &str,
    coordinator: &ChatCoordinator,
    roster: &mut ConversationRoster,
    shell: &Arc<Mutex<ShellState>>,
    navigator: &ConsoleNavigator,
    session: &InMemorySession,
    debouncer: &mut ResizeDebouncer,
) -> bool {
    let trimmed = line.trim();

    match trimmed.split_once(' ').unwrap_or((trimmed, "")) {
        ("/quit", _) => return false,
        ("/logout", _) => {
            session.sign_out();
            navigator.navigate(Route::Login);
            return false;
        }
        ("/help", _) => {
            println!("/search <text>  filter conversations");
            println!("/list           show conversations");
            println!("/open <id>      switch conversation");
            println!("/panel          toggle the attachment panel");
            println!("/width <px>     report a viewport width");
            println!("/collapse       toggle the desktop sidebar");
            println!("/overlay        toggle the mobile overlay");
            println!("/logout, /quit");
            println!("end a line with \\ to keep typing on a new line");
        }
        ("/search", query) => {
            roster.set_query(query);
            print_roster(roster);
        }
        ("/list", _) => print_roster(roster),
        ("/open", raw_id) => match raw_id.trim().parse::<u64>() {
            Ok(raw_id) => {
                let id = ConversationId::new(raw_id);
                if roster.get(id).is_some() {
                    open_conversation(coordinator, roster, shell, navigator, session, id);
                } else {
                    println!("no conversation {raw_id}");
                }
            }
            Err(_) => println!("usage: /open <id>"),
        },
        ("/panel", _) => {
            let open = coordinator.toggle_attachment_panel();
            println!("attachment panel {}", if open { "open" } else { "closed" });
        }
        ("/width", raw_width) => match raw_width.trim().parse::<f32>() {
            Ok(width) => debouncer.observe(width),
            Err(_) => println!("usage: /width <px>"),
        },
        ("/collapse", _) => match lock_shell(shell).toggle_collapse() {
            Ok(collapsed) => println!("sidebar collapsed: {collapsed}"),
            Err(rejection) => println!("unavailable: {rejection:?}"),
        },
        ("/overlay", _) => match lock_shell(shell).toggle_mobile_overlay() {
            Ok(open) => println!("mobile overlay open: {open}"),
            Err(rejection) => println!("unavailable: {rejection:?}"),
        },
        (command, _) if command.starts_with('/') => {
            println!("unknown command {command}; /help lists commands");
        }
        _ => {
            if let Some(kept) = line.strip_suffix('\\') {
                coordinator.set_draft_text(format!("{}{kept}", coordinator.draft_text()));
                coordinator.handle_enter(true);
            } else {
                coordinator.set_draft_text(format!("{}{line}", coordinator.draft_text()));
                coordinator.handle_enter(false);
            }
        }
    }

    true
}

fn open_conversation(
    coordinator: &ChatCoordinator,
    roster: &ConversationRoster,
    shell: &Arc<Mutex<ShellState>>,
    navigator: &ConsoleNavigator,
    session: &InMemorySession,
    id: ConversationId,
) {
    let Some(requested) = roster.select(id) else {
        return;
    };

    let resolved = resolve_route(requested, &session.current());
    navigator.navigate(resolved);
    lock_shell(shell).handle_navigation();

    if let Route::Chat(conversation_id) = resolved {
        coordinator.open_conversation(conversation_id);
        if let Some(conversation) = roster.get(conversation_id) {
            println!("opened \"{}\"", conversation.title);
        }
    }
}

fn print_roster(roster: &ConversationRoster) {
    let mut any = false;
    for conversation in roster.visible() {
        any = true;
        println!("  [{}] {}", conversation.id, conversation.title);
    }
    if !any {
        println!("  no conversations match the search");
    }
}

fn render_event(event: ChatEvent, settings: &AppSettings) {
    match event {
        ChatEvent::MessageAppended(message) => match message.role {
            Role::User => println!("you> {}", message.content),
            Role::Assistant => println!("{}> {}", settings.assistant_name, message.content),
        },
        ChatEvent::CompositionStarted { .. } => {
            println!("{} is typing...", settings.assistant_name);
        }
        ChatEvent::CompositionEnded { .. } => {}
        ChatEvent::TranscriptCleared => println!("---"),
    }
}

fn lock_shell(shell: &Mutex<ShellState>) -> MutexGuard<'_, ShellState> {
    shell.lock().unwrap_or_else(PoisonError::into_inner)
}
