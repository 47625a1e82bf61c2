use confab::config::SettingsStore;

/// Application entry point.
///
/// Bootstraps tracing, loads persisted settings, and hands control to the
/// console front-end on a single-threaded runtime; the chat core relies on
/// cooperative scheduling, not parallelism.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = SettingsStore::load().settings().clone();
    confab::console::run(settings).await;
}
