//! Pokedex TUI - catalog list, search, and detail overlay

use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pokedex::action::Action;
use pokedex::components::{is_quit_chord, CatalogPage};
use pokedex::effect::Effect;
use pokedex::graphql::{GraphqlClient, DEFAULT_ENDPOINT};
use pokedex::query::{self, SearchMode};
use pokedex::reducer::reducer;
use pokedex::route::LIST_PATH;
use pokedex::sprite;
use pokedex::state::{AppState, FocusArea, SPINNER_TICK_MS};
use pokedex::view;
use ratatui::{backend::CrosstermBackend, layout::Rect, Frame, Terminal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

/// Pokedex TUI - browse and search the PokeAPI catalog
#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "A searchable Pokemon catalog in the terminal")]
struct Args {
    /// GraphQL endpoint to query
    #[arg(long, env = "POKEDEX_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Start location, e.g. /list or /pokemon/25
    #[arg(long, default_value = LIST_PATH)]
    route: String,

    /// How the search term is turned into the name filter
    #[arg(long, value_enum, default_value_t = SearchMode::Pattern)]
    search_mode: SearchMode,

    /// Disable the in-memory response cache
    #[arg(long)]
    no_cache: bool,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "15", value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,

    /// Write logs to this file (filter with POKEDEX_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum PokedexComponentId {
    Search,
    Cards,
    Overlay,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum PokedexContext {
    Main,
    Search,
    Overlay,
}

impl EventRoutingState<PokedexComponentId, PokedexContext> for AppState {
    fn focused(&self) -> Option<PokedexComponentId> {
        if let Some(modal) = self.modal() {
            return Some(modal);
        }
        match self.focus {
            FocusArea::SearchInput | FocusArea::SearchButton => Some(PokedexComponentId::Search),
            FocusArea::Cards => Some(PokedexComponentId::Cards),
        }
    }

    fn modal(&self) -> Option<PokedexComponentId> {
        view::with_view(self, |view| view.is_modal()).then_some(PokedexComponentId::Overlay)
    }

    fn binding_context(&self, id: PokedexComponentId) -> PokedexContext {
        match id {
            PokedexComponentId::Cards => PokedexContext::Main,
            PokedexComponentId::Search => PokedexContext::Search,
            PokedexComponentId::Overlay => PokedexContext::Overlay,
        }
    }

    fn default_context(&self) -> PokedexContext {
        PokedexContext::Main
    }
}

static CLIENT: OnceLock<GraphqlClient> = OnceLock::new();

fn init_tracing(log_file: Option<&PathBuf>) -> io::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_env("POKEDEX_LOG")
        .unwrap_or_else(|_| EnvFilter::new("pokedex=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        endpoint,
        route,
        search_mode,
        no_cache,
        timeout_secs,
        log_file,
        debug: debug_args,
    } = Args::parse();

    init_tracing(log_file.as_ref())?;
    info!(%endpoint, %route, ?search_mode, cache = !no_cache, "starting pokedex");

    let client = GraphqlClient::new(endpoint, Duration::from_secs(timeout_secs), !no_cache)
        .map_err(|e| io::Error::other(format!("failed to build http client: {e}")))?;
    if CLIENT.set(client).is_err() {
        return Err(io::Error::other("graphql client already initialized"));
    }

    let debug = DebugSession::new(debug_args);

    // Export JSON schemas if requested
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState::new(route, search_mode))
        })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;

    let (middleware, action_recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug
        .save_actions(action_recorder.as_ref())
        .map_err(debug_error)?;

    Ok(())
}

struct PokedexUi {
    page: CatalogPage,
}

impl PokedexUi {
    fn new() -> Self {
        Self {
            page: CatalogPage::new(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        event_ctx: &mut EventContext<PokedexComponentId>,
    ) {
        let areas = self.page.render(frame, area, state);
        for (id, rect) in [
            (PokedexComponentId::Search, areas.search),
            (PokedexComponentId::Cards, areas.cards),
            (PokedexComponentId::Overlay, areas.overlay),
        ] {
            match rect {
                Some(rect) => event_ctx.set_component_area(id, rect),
                None => {
                    event_ctx.component_areas.remove(&id);
                }
            }
        }
    }
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(PokedexUi::new()));
    let mut bus: EventBus<AppState, Action, PokedexComponentId, PokedexContext> = EventBus::new();
    let keybindings: Keybindings<PokedexContext> = Keybindings::new();

    let ui_search = Rc::clone(&ui);
    bus.register(PokedexComponentId::Search, move |event, state| {
        handler_response(
            ui_search
                .borrow_mut()
                .page
                .handle_search_event(&event.kind, state),
        )
    });

    let ui_cards = Rc::clone(&ui);
    bus.register(PokedexComponentId::Cards, move |event, state| {
        handler_response(
            ui_cards
                .borrow_mut()
                .page
                .handle_cards_event(&event.kind, state),
        )
    });

    let ui_overlay = Rc::clone(&ui);
    bus.register(PokedexComponentId::Overlay, move |event, state| {
        // Quit still reaches the global handler
        if is_quit_chord(&event.kind) {
            return HandlerResponse::ignored();
        }
        let actions = ui_overlay
            .borrow_mut()
            .page
            .handle_overlay_event(&event.kind, state);
        // The overlay swallows everything else while open
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    });

    bus.register_global(|event, _state| match &event.kind {
        EventKind::Resize(_, _) => HandlerResponse::ignored().with_render(),
        kind if is_quit_chord(kind) => handler_response(vec![Action::Quit]),
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }

                runtime.subscriptions().interval(
                    "tick",
                    Duration::from_millis(SPINNER_TICK_MS),
                    || Action::Tick,
                );
            },
            &mut bus,
            &keybindings,
            |frame, area, state, _render_ctx, event_ctx| {
                ui.borrow_mut().render(frame, area, state, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

/// Handle effects by spawning keyed tasks; respawning a key replaces the previous task
fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    let Some(client) = CLIENT.get() else {
        return;
    };
    match effect {
        Effect::FetchSummaries { search } => {
            ctx.tasks().spawn("summaries", async move {
                match query::fetch_summaries(client, &search).await {
                    Ok(records) => Action::SummariesDidLoad { search, records },
                    Err(e) => Action::SummariesDidError {
                        search,
                        error: e.to_string(),
                    },
                }
            });
        }
        Effect::FetchDetail { id } => {
            ctx.tasks().spawn("detail", async move {
                match query::fetch_detail(client, Some(id.as_str())).await {
                    Ok(records) => Action::DetailDidLoad { id, records },
                    Err(e) => Action::DetailDidError {
                        id,
                        error: e.to_string(),
                    },
                }
            });
        }
        Effect::CancelDetail => {
            ctx.tasks().cancel(&TaskKey::new("detail"));
        }
        Effect::FetchSprite { url } => {
            let key = format!("sprite_{url}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                let decoded = match client.fetch_bytes(&url).await {
                    Ok(bytes) => sprite::decode_sprite(&bytes),
                    Err(e) => Err(e.to_string()),
                };
                match decoded {
                    Ok(sprite) => Action::SpriteDidLoad { url, sprite },
                    Err(error) => Action::SpriteDidError { url, error },
                }
            });
        }
    }
}
