use console_search::app::SearchSession;
use console_search::kernel::services::adapters::{
    ensure_settings_file, get_recent_tokens_path, load_settings_or_default, JsonRecentTokens,
    MemoryEntityStore, MemoryRecentTokens,
};
use console_search::kernel::services::ports::{
    Entity, EntityStore, RecentTokenStore, SearchResult, Settings,
};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

mod logging;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn main() -> io::Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: console-search <entities.json> [query...]");
        std::process::exit(2);
    };
    let query = args.collect::<Vec<_>>().join(" ");

    let _logging = logging::init(None);

    let settings = match ensure_settings_file() {
        Ok(path) => load_settings_or_default(&path),
        Err(e) => {
            tracing::warn!(error = %e, "settings unavailable, using defaults");
            Settings::default()
        }
    };
    let config = settings.search_config();
    let recents = open_recents(config.recent_token_limit);

    let entities = load_entities(Path::new(&path))?;
    let store = Arc::new(MemoryEntityStore::with_entities(entities));
    tracing::info!(path = %path, entities = store.len(), "entities loaded");

    let mut session = SearchSession::with_memory_store(Arc::clone(&store), recents, config)?;
    session.set_view_visible(true);
    session.submit_criteria(query, Vec::new());

    loop {
        while session.state().is_searching() {
            session.wait(POLL_INTERVAL);
        }
        if !session.state().has_more() {
            break;
        }
        session.load_more_results();
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for result in session.state().results() {
        print_result(&mut out, store.as_ref(), result)?;
    }
    writeln!(out, "{} result(s)", session.state().results().len())?;
    Ok(())
}

fn open_recents(limit: usize) -> Arc<dyn RecentTokenStore> {
    if let Some(path) = get_recent_tokens_path() {
        match JsonRecentTokens::open(path.clone(), limit) {
            Ok(recents) => return Arc::new(recents),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "recent tokens unavailable")
            }
        }
    }
    Arc::new(MemoryRecentTokens::new(limit))
}

fn load_entities(path: &Path) -> io::Result<Vec<Entity>> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn print_result(
    out: &mut impl Write,
    store: &dyn EntityStore,
    result: &SearchResult,
) -> io::Result<()> {
    match store.entity(result.entity_id).as_deref() {
        Some(Entity::Message(message)) => writeln!(
            out,
            "{} [{}] {}: {}",
            message.id,
            message.level.name(),
            message.label,
            message.text.lines().next().unwrap_or("")
        )?,
        Some(Entity::Task(task)) => {
            let status = task
                .status_code
                .map(|code| code.to_string())
                .unwrap_or_else(|| "-".to_string());
            let failed = if task.is_failed() { " failed" } else { "" };
            writeln!(
                out,
                "{} {} {} {}{}",
                task.id, task.method, task.url, status, failed
            )?
        }
        None => return Ok(()),
    }
    for occurrence in &result.occurrences {
        writeln!(
            out,
            "    {}:{}  {}",
            occurrence.scope.title(),
            occurrence.line + 1,
            occurrence.preview
        )?;
    }
    Ok(())
}
