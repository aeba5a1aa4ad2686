//! Integration tests for request handling and the status command.

use std::time::Duration;

use ironhold_inventory::{
    EventBus, Inventory, InventoryAction, InventoryEvent, InventoryId, InventorySet, Item,
    SlotStore, TransactionError, TransactionEvent, TransactionLimits,
};
use ironhold_server::{
    load_recipes, CommandSender, HandlerOutcome, MemoryUsage, Player, ServerConfig, ServerError,
    StatusCommand, StatusSnapshot, TransactionHandler, TransactionRequest, WorldStatus,
    DEFAULT_STATUS_PERMISSION, PERMISSION_DENIED,
};
use ironhold_shared::Vec3;

const INV: InventoryId = InventoryId(0);
const LOG: u32 = 17;
const PLANKS: u32 = 5;
const CHEST: u32 = 54;

fn setup() -> (TransactionHandler, InventorySet, EventBus, Player) {
    let config = ServerConfig::default();
    let book = load_recipes(&config).unwrap();
    let bus = EventBus::new(64);
    let handler = TransactionHandler::new(book, TransactionLimits::default(), bus.sender());

    let mut inv = Inventory::new(INV, 9, 64);
    inv.set(0, Item::new(LOG, 3)).unwrap();
    inv.set(1, Item::new(PLANKS, 8)).unwrap();
    let mut store = InventorySet::new();
    store.insert(inv);

    let player = Player::new(9, "Tester", Vec3::ZERO);
    (handler, store, bus, player)
}

fn log_to_planks() -> TransactionRequest {
    TransactionRequest::Crafting {
        actions: vec![
            InventoryAction::new(INV, 0, Item::new(LOG, 3), Item::air()),
            InventoryAction::new(INV, 5, Item::air(), Item::new(PLANKS, 12)),
        ],
        recipe_id: None,
        repetitions: None,
    }
}

fn planks_to_chest() -> TransactionRequest {
    TransactionRequest::Crafting {
        actions: vec![
            InventoryAction::new(INV, 1, Item::new(PLANKS, 8), Item::air()),
            InventoryAction::new(INV, 6, Item::air(), Item::new(CHEST, 1)),
        ],
        recipe_id: Some(2),
        repetitions: None,
    }
}

#[test]
fn test_crafting_commits_and_publishes() {
    let (mut handler, mut store, bus, player) = setup();

    let outcome = handler.handle(&player, &mut store, log_to_planks());
    assert!(matches!(outcome, HandlerOutcome::Committed { slots_changed: 2 }));
    assert_eq!(store.slot(INV, 5), Some(&Item::new(PLANKS, 12)));

    let events = bus.receiver().drain();
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[2],
        InventoryEvent::ItemCrafted {
            actor: 9,
            recipe_id: 5,
            repetitions: 3,
        }
    );
}

#[test]
fn test_normal_move_commits() {
    let (mut handler, mut store, _bus, player) = setup();
    let request = TransactionRequest::Normal {
        actions: vec![
            InventoryAction::new(INV, 1, Item::new(PLANKS, 8), Item::new(PLANKS, 2)),
            InventoryAction::new(INV, 7, Item::air(), Item::new(PLANKS, 6)),
        ],
    };
    assert!(handler.handle(&player, &mut store, request).is_committed());
    assert_eq!(store.slot(INV, 7), Some(&Item::new(PLANKS, 6)));
}

#[test]
fn test_duplication_rejected_with_event() {
    let (mut handler, mut store, bus, player) = setup();
    let request = TransactionRequest::Normal {
        actions: vec![
            InventoryAction::new(INV, 1, Item::new(PLANKS, 8), Item::air()),
            InventoryAction::new(INV, 7, Item::air(), Item::new(PLANKS, 9)),
        ],
    };

    let outcome = handler.handle(&player, &mut store, request);
    assert!(matches!(
        outcome,
        HandlerOutcome::Rejected(ServerError::Transaction(TransactionError::Unbalanced { .. }))
    ));
    assert_eq!(store.slot(INV, 1), Some(&Item::new(PLANKS, 8)));
    assert!(matches!(
        bus.receiver().try_recv(),
        Some(InventoryEvent::TransactionRejected { actor: 9, .. })
    ));
}

#[test]
fn test_unknown_recipe_rejected() {
    let (mut handler, mut store, _bus, player) = setup();
    let request = TransactionRequest::Crafting {
        actions: vec![
            InventoryAction::new(INV, 0, Item::new(LOG, 3), Item::air()),
            InventoryAction::new(INV, 5, Item::air(), Item::new(PLANKS, 12)),
        ],
        recipe_id: Some(404),
        repetitions: None,
    };
    assert!(matches!(
        handler.handle(&player, &mut store, request),
        HandlerOutcome::Rejected(ServerError::UnknownRecipe(404))
    ));
}

#[test]
fn test_chest_needs_crafting_table() {
    let (mut handler, mut store, _bus, mut player) = setup();

    assert!(matches!(
        handler.handle(&player, &mut store, planks_to_chest()),
        HandlerOutcome::Rejected(ServerError::Transaction(TransactionError::EmptyRecipeSet))
    ));

    player.open_crafting_table();
    assert!(handler.handle(&player, &mut store, planks_to_chest()).is_committed());
    assert_eq!(store.slot(INV, 6), Some(&Item::new(CHEST, 1)));
}

#[test]
fn test_gate_veto() {
    let (mut handler, mut store, bus, player) = setup();
    handler.add_gate(|event: &mut TransactionEvent<'_>| {
        if event.repetitions().is_some_and(|k| k > 2) {
            event.cancel();
        }
    });

    assert!(matches!(
        handler.handle(&player, &mut store, log_to_planks()),
        HandlerOutcome::Cancelled
    ));
    assert_eq!(store.slot(INV, 0), Some(&Item::new(LOG, 3)));
    assert!(bus.receiver().drain().is_empty());
}

fn snapshot() -> StatusSnapshot {
    StatusSnapshot {
        uptime: Duration::from_secs(90_061),
        tps: 15.5,
        tick_usage: 40.0,
        tps_average: 18.0,
        tick_usage_average: 30.25,
        upload_bytes_per_second: 2048.0,
        download_bytes_per_second: 512.0,
        threads: 12,
        memory: MemoryUsage {
            main_thread: 64 * 1024 * 1024,
            total: 128 * 1024 * 1024,
            virtual_memory: 2048 * 1024 * 1024,
        },
        global_memory_limit: 0,
        worlds: vec![WorldStatus {
            folder_name: "world".into(),
            display_name: "world".into(),
            loaded_chunks: 2,
            entities: 0,
            tick_time_ms: 12.5,
        }],
    }
}

#[test]
fn test_status_report() {
    let mut player = Player::new(1, "Op", Vec3::ZERO);
    player.grant_permission(DEFAULT_STATUS_PERMISSION);

    let command = StatusCommand::new(DEFAULT_STATUS_PERMISSION);
    assert!(command.execute(&mut player, &snapshot()));

    let lines = player.take_messages();
    assert_eq!(
        lines,
        vec![
            "§e[§6!§e] §r§aServer status:".to_string(),
            "§6» §fUptime: §e1 day 1 hour 1 minute 1 second".to_string(),
            "§6» §fCurrent TPS: §615.5 (40%)".to_string(),
            "§6» §fAverage TPS: §618 (30.25%)".to_string(),
            "§6» §fUpload: §e2.00 kB/s".to_string(),
            "§6» §fDownload: §e0.50 kB/s".to_string(),
            "§6» §fThreads: §e12".to_string(),
            "§6» §fMain thread memory: §e64.00 MB.".to_string(),
            "§6» §fTotal memory: §e128.00 MB.".to_string(),
            "§6» §fTotal virtual memory: §e2,048.00 MB.".to_string(),
            "§6World \"world\": §c2§a chunks, §c0§a entities. §fTick time §e12.5ms".to_string(),
        ]
    );
}

#[test]
fn test_status_memory_limit_line() {
    let mut player = Player::new(1, "Op", Vec3::ZERO);
    player.grant_permission(DEFAULT_STATUS_PERMISSION);
    let mut status = snapshot();
    status.global_memory_limit = 512 * 1024 * 1024;

    StatusCommand::new(DEFAULT_STATUS_PERMISSION).execute(&mut player, &status);
    assert!(player
        .messages()
        .contains(&"§6Maximum memory (manager): §c512.00 MB.".to_string()));
}

#[test]
fn test_status_requires_permission() {
    let mut player = Player::new(2, "Guest", Vec3::ZERO);
    let command = StatusCommand::new(DEFAULT_STATUS_PERMISSION);

    assert!(!command.execute(&mut player, &snapshot()));
    assert_eq!(player.messages(), &[PERMISSION_DENIED.to_string()]);
    assert_eq!(player.name(), "Guest");
}
