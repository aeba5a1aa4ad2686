//! # IRONHOLD Server
//!
//! Headless host that replays a scripted crafting session against the
//! transaction engine and prints the `/status` report.
//!
//! ```bash
//! # Defaults
//! ./ironhold_server
//!
//! # With a config file and debug logs
//! RUST_LOG=debug ./ironhold_server server.toml
//! ```

use std::process::ExitCode;
use std::time::{Duration, Instant};

use ironhold_inventory::{
    EventBus, Inventory, InventoryAction, InventoryId, InventorySet, Item, TransactionEvent,
    TransactionLimits,
};
use ironhold_server::{
    load_recipes, HandlerOutcome, Player, ServerConfig, ServerResult, StatusCommand,
    StatusSnapshot, TransactionHandler, TransactionRequest, WorldStatus,
};
use ironhold_shared::Vec3;
use tracing_subscriber::EnvFilter;

const PLAYER_INVENTORY: InventoryId = InventoryId(0);
const LOG: u32 = 17;
const PLANKS: u32 = 5;
const TABLE: u32 = 58;
/// Items no player may craft on this server.
const BANNED_ITEMS: [u32; 1] = [46];

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Server stopped");
            ExitCode::FAILURE
        }
    }
}

fn run() -> ServerResult<()> {
    let started = Instant::now();
    let config = match std::env::args().nth(1) {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    tracing::info!(name = %config.name, "Starting");

    let book = load_recipes(&config)?;
    let bus = EventBus::new(config.engine.event_bus_capacity);
    let events = bus.receiver();
    let mut handler =
        TransactionHandler::new(book, TransactionLimits::from(&config.engine), bus.sender());
    handler.add_gate(|event: &mut TransactionEvent<'_>| {
        if event
            .outputs()
            .iter()
            .any(|item| BANNED_ITEMS.contains(&item.id()))
        {
            event.cancel();
        }
    });

    let mut player = Player::new(1, "Steve", Vec3::new(0.5, 64.0, 0.5));
    player.grant_permission(config.status_permission.clone());

    let mut inventories = InventorySet::new();
    let mut inventory = Inventory::new(PLAYER_INVENTORY, 36, config.engine.default_max_stack);
    inventory.add(&Item::new(LOG, 2))?;
    inventories.insert(inventory);

    // Two logs into eight planks
    let planks = TransactionRequest::Crafting {
        actions: vec![
            InventoryAction::new(PLAYER_INVENTORY, 0, Item::new(LOG, 2), Item::air()),
            InventoryAction::new(PLAYER_INVENTORY, 1, Item::air(), Item::new(PLANKS, 8)),
        ],
        recipe_id: None,
        repetitions: None,
    };
    report("planks", &handler.handle(&player, &mut inventories, planks));

    // Four planks into a crafting table
    let table = TransactionRequest::Crafting {
        actions: vec![
            InventoryAction::new(PLAYER_INVENTORY, 1, Item::new(PLANKS, 8), Item::new(PLANKS, 4)),
            InventoryAction::new(PLAYER_INVENTORY, 2, Item::air(), Item::new(TABLE, 1)),
        ],
        recipe_id: Some(1),
        repetitions: Some(1),
    };
    report("table", &handler.handle(&player, &mut inventories, table));

    // A duplication attempt: move four planks but claim five
    let dupe = TransactionRequest::Normal {
        actions: vec![
            InventoryAction::new(PLAYER_INVENTORY, 1, Item::new(PLANKS, 4), Item::air()),
            InventoryAction::new(PLAYER_INVENTORY, 3, Item::air(), Item::new(PLANKS, 5)),
        ],
    };
    report("dupe", &handler.handle(&player, &mut inventories, dupe));

    let published = events.drain();
    tracing::info!(events = published.len(), "Drained inventory events");

    let snapshot = StatusSnapshot {
        uptime: started.elapsed() + Duration::from_secs(3_725),
        tps: 20.0,
        tick_usage: 1.5,
        tps_average: 19.97,
        tick_usage_average: 2.1,
        threads: 1,
        worlds: vec![WorldStatus {
            folder_name: "world".to_string(),
            display_name: "Ironhold".to_string(),
            loaded_chunks: 441,
            entities: 1,
            tick_time_ms: 0.8,
        }],
        ..StatusSnapshot::default()
    };
    StatusCommand::new(config.status_permission.as_str()).execute(&mut player, &snapshot);
    for line in player.take_messages() {
        println!("{line}");
    }
    Ok(())
}

fn report(label: &str, outcome: &HandlerOutcome) {
    match outcome {
        HandlerOutcome::Committed { slots_changed } => {
            tracing::info!(label, slots_changed, "Committed");
        }
        HandlerOutcome::Cancelled => tracing::info!(label, "Cancelled"),
        HandlerOutcome::Rejected(err) => tracing::info!(label, error = %err, "Rejected"),
    }
}
