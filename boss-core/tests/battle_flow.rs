//! End-to-end battles through the dispatcher with a scripted narrative backend.

use boss_core::narrative::{LAST_WORDS_FALLBACK, RETORT_FALLBACK};
use boss_core::{BossTemplate, Catalog, GameConfig, NarrativeError, Reply, ScriptedGenerator, TestHarness};
use std::sync::Arc;
use std::time::Duration;

/// 50 hp, takes 10 per default hit, hits back for 5.
fn warden() -> BossTemplate {
    BossTemplate::new("Stone Warden", 50, 15, 20)
}

// =============================================================================
// Summoning
// =============================================================================

#[tokio::test]
async fn test_summon_announces_full_health_boss() {
    let game = TestHarness::new(warden());

    let reply = game.summon("g1", "alice").await.expect("summon should reply");
    let Reply::Summoned { boss, attack_command } = &reply else {
        panic!("unexpected reply: {reply:?}");
    };

    assert_eq!(boss.name, "Stone Warden");
    assert_eq!(boss.hp, 50);
    assert_eq!(boss.max_hp, 50);
    assert_eq!(boss.personality, "stubborn");
    assert_eq!(attack_command, "!attack boss");
    assert!(reply.to_string().contains("[HP] 50/50"));
}

#[tokio::test]
async fn test_summon_during_battle_leaves_boss_untouched() {
    let game = TestHarness::new(warden());
    game.summon("g1", "alice").await;
    game.attack("g1", "alice", 0).await;
    let before = game.dispatcher.boss(&"g1".into()).await.unwrap();

    let reply = game.summon("g1", "bob").await;

    assert_eq!(reply, Some(Reply::AlreadyActive { boss_name: "Stone Warden".into() }));
    assert_eq!(game.dispatcher.boss(&"g1".into()).await, Some(before));
}

#[tokio::test]
async fn test_reference_catalog_summons_match_one_template() {
    let game = TestHarness::with_config(GameConfig::default(), ScriptedGenerator::new());
    let catalog = Catalog::default();

    for group in 0..20 {
        let group = format!("g{group}");
        let Some(Reply::Summoned { boss, .. }) = game.summon(&group, "alice").await else {
            panic!("expected a summon in {group}");
        };
        let matching: Vec<_> = catalog
            .bosses
            .iter()
            .filter(|t| t.name == boss.name && t.hp == boss.max_hp && t.attack == boss.attack && t.defense == boss.defense)
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(boss.hp, boss.max_hp);
        assert!(catalog.personalities.contains(&boss.personality));
    }
}

// =============================================================================
// Attacking
// =============================================================================

#[tokio::test]
async fn test_attack_without_boss_has_no_side_effects() {
    let game = TestHarness::new(warden());

    let reply = game.attack("g1", "alice", 0).await;

    assert_eq!(reply, Some(Reply::NoBoss { summon_command: "!summon boss".into() }));
    game.dispatcher
        .inspect(|state| {
            assert!(state.players.is_empty());
            assert!(state.cooldowns.last_attack(&"alice".into()).is_none());
        })
        .await;
    assert!(game.backend.calls().is_empty());
}

#[tokio::test]
async fn test_exchange_applies_damage_both_ways() {
    let backend = ScriptedGenerator::new().reply(r#"{"response": "You call that a hit?"}"#);
    let game = TestHarness::with_backend(warden(), backend);
    game.summon("g1", "alice").await;

    let reply = game.attack("g1", "alice", 0).await.unwrap();

    let Reply::Exchange { player_damage, boss_damage, retort, boss } = &reply else {
        panic!("unexpected reply: {reply:?}");
    };
    assert_eq!(*player_damage, 10);
    assert_eq!(*boss_damage, 5);
    assert_eq!(retort, "You call that a hit?");
    assert_eq!(boss.hp, 40);
    assert_eq!(game.boss_hp("g1").await, Some(40));
    assert_eq!(game.player_hp("alice").await, Some(95));

    let calls = game.backend.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].prompt.contains("40/50"));
    assert!(reply.to_string().contains("Stone Warden says: You call that a hit?"));
}

#[tokio::test]
async fn test_cooldown_gates_second_attack() {
    let game = TestHarness::new(warden());
    game.summon("g1", "alice").await;

    assert!(matches!(game.attack("g1", "alice", 0).await, Some(Reply::Exchange { .. })));
    assert_eq!(game.boss_hp("g1").await, Some(40));

    let rejected = game.attack("g1", "alice", 10).await;
    assert_eq!(rejected, Some(Reply::MustRest { remaining: Duration::from_secs(20) }));
    assert_eq!(game.boss_hp("g1").await, Some(40));
    assert_eq!(game.player_hp("alice").await, Some(95));
    game.dispatcher
        .inspect(|state| assert_eq!(state.cooldowns.last_attack(&"alice".into()), Some(game.at(0))))
        .await;

    assert!(matches!(game.attack("g1", "alice", 31).await, Some(Reply::Exchange { .. })));
    assert_eq!(game.boss_hp("g1").await, Some(30));
}

#[tokio::test]
async fn test_cooldown_does_not_block_other_users() {
    let game = TestHarness::new(warden());
    game.summon("g1", "alice").await;

    game.attack("g1", "alice", 0).await;
    let reply = game.attack("g1", "bob", 1).await;

    assert!(matches!(reply, Some(Reply::Exchange { .. })));
    assert_eq!(game.boss_hp("g1").await, Some(30));
}

#[tokio::test]
async fn test_stats_and_cooldown_shared_across_groups() {
    let game = TestHarness::new(warden());
    game.summon("g1", "alice").await;
    game.summon("g2", "bob").await;

    game.attack("g1", "alice", 0).await;
    let reply = game.attack("g2", "alice", 5).await;
    assert!(matches!(reply, Some(Reply::MustRest { .. })));

    game.attack("g2", "alice", 40).await;
    assert_eq!(game.player_hp("alice").await, Some(90));
    assert_eq!(game.boss_hp("g1").await, Some(40));
    assert_eq!(game.boss_hp("g2").await, Some(40));
}

// =============================================================================
// Defeat
// =============================================================================

#[tokio::test]
async fn test_final_blow_defeats_and_removes_boss() {
    let backend = ScriptedGenerator::new()
        .reply(r#"{"response": "Again."}"#)
        .reply(r#"{"response": "Again!"}"#)
        .reply(r#"{"response": "AGAIN!"}"#)
        .reply(r#"{"response": "...again."}"#)
        .reply(r#"{"last_words": "Stone endures, even in dust."}"#);
    let game = TestHarness::with_backend(warden(), backend);
    game.summon("g1", "alice").await;

    for (i, user) in ["u1", "u2", "u3", "u4"].into_iter().enumerate() {
        assert!(matches!(game.attack("g1", user, 0).await, Some(Reply::Exchange { .. })));
        assert_eq!(game.boss_hp("g1").await, Some(40 - 10 * i as i32));
    }

    let reply = game.attack("g1", "u5", 0).await.unwrap();

    let Reply::Defeated { boss, player_damage } = &reply else {
        panic!("unexpected reply: {reply:?}");
    };
    assert_eq!(*player_damage, 10);
    assert_eq!(boss.hp, 0);
    assert!(boss.is_defeated());
    assert_eq!(boss.last_words, "Stone endures, even in dust.");
    assert!(reply.to_string().contains("The boss's last words: Stone endures, even in dust."));

    // No counter-attack on the killing blow.
    assert_eq!(game.player_hp("u5").await, Some(100));
    assert!(game.dispatcher.boss(&"g1".into()).await.is_none());

    let after = game.attack("g1", "u6", 0).await;
    assert!(matches!(after, Some(Reply::NoBoss { .. })));

    // A new boss can be summoned afterwards.
    assert!(matches!(game.summon("g1", "alice").await, Some(Reply::Summoned { .. })));
    assert_eq!(game.boss_hp("g1").await, Some(50));
}

#[tokio::test]
async fn test_player_records_survive_boss_defeat() {
    let game = TestHarness::new(warden());
    game.summon("g1", "alice").await;

    game.attack("g1", "alice", 0).await;
    for user in ["u2", "u3", "u4", "u5"] {
        game.attack("g1", user, 0).await;
    }
    assert!(game.dispatcher.boss(&"g1".into()).await.is_none());
    assert_eq!(game.player_hp("alice").await, Some(95));

    assert!(matches!(game.summon("g1", "bob").await, Some(Reply::Summoned { .. })));
    assert_eq!(game.player_hp("alice").await, Some(95));

    game.attack("g1", "alice", 31).await;
    assert_eq!(game.player_hp("alice").await, Some(90));
}

// =============================================================================
// Narrative failures
// =============================================================================

#[tokio::test]
async fn test_narrative_failures_fall_back_without_touching_outcome() {
    let backend = ScriptedGenerator::new()
        .fail(NarrativeError::Unreachable("connection refused".into()))
        .reply("{ not json")
        .fail(NarrativeError::Malformed("no tool call".into()));
    let game = TestHarness::with_backend(BossTemplate::new("Glass Cannon", 30, 50, 20), backend);
    game.summon("g1", "alice").await;

    let first = game.attack("g1", "a", 0).await.unwrap();
    let second = game.attack("g1", "b", 0).await.unwrap();
    let last = game.attack("g1", "c", 0).await.unwrap();

    for reply in [&first, &second] {
        let Reply::Exchange { retort, boss_damage, .. } = reply else {
            panic!("unexpected reply: {reply:?}");
        };
        assert_eq!(retort, RETORT_FALLBACK);
        assert_eq!(*boss_damage, 40);
    }
    let Reply::Defeated { boss, .. } = &last else {
        panic!("unexpected reply: {last:?}");
    };
    assert_eq!(boss.last_words, LAST_WORDS_FALLBACK);

    assert_eq!(game.player_hp("a").await, Some(60));
    assert!(game.dispatcher.boss(&"g1".into()).await.is_none());
}

#[tokio::test]
async fn test_slow_narrative_times_out_after_state_is_final() {
    let backend = ScriptedGenerator::new()
        .reply(r#"{"last_words": "far too late"}"#)
        .with_delay(Duration::from_millis(500));
    let config = GameConfig::default()
        .with_catalog(Catalog::single(BossTemplate::new("Snail", 10, 1, 0), "patient"))
        .with_narrative_timeout(Duration::from_millis(20));
    let game = TestHarness::with_config(config, backend);
    game.summon("g1", "alice").await;

    let reply = game.attack("g1", "alice", 0).await.unwrap();

    let Reply::Defeated { boss, .. } = reply else {
        panic!("expected defeat");
    };
    assert_eq!(boss.last_words, LAST_WORDS_FALLBACK);
    assert!(game.dispatcher.boss(&"g1".into()).await.is_none());
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_attacks_defeat_boss_exactly_once() {
    let game = Arc::new(TestHarness::new(warden()));
    game.summon("g1", "host").await;

    let mut handles = Vec::new();
    for i in 0..12 {
        let game = Arc::clone(&game);
        handles.push(tokio::spawn(async move { game.attack("g1", &format!("user{i}"), 0).await }));
    }

    let mut exchanges = 0;
    let mut defeats = 0;
    let mut no_boss = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Some(Reply::Exchange { .. }) => exchanges += 1,
            Some(Reply::Defeated { .. }) => defeats += 1,
            Some(Reply::NoBoss { .. }) => no_boss += 1,
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    assert_eq!(exchanges, 4);
    assert_eq!(defeats, 1);
    assert_eq!(no_boss, 7);
    game.dispatcher
        .inspect(|state| {
            assert!(state.bosses.is_empty());
            assert_eq!(state.players.len(), 5);
        })
        .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_slow_narrative_does_not_block_other_commands() {
    let backend = ScriptedGenerator::new()
        .reply(r#"{"response": "Patience..."}"#)
        .with_delay(Duration::from_secs(2));
    let game = Arc::new(TestHarness::with_backend(warden(), backend));
    game.summon("g1", "alice").await;

    let slow = {
        let game = Arc::clone(&game);
        tokio::spawn(async move { game.attack("g1", "alice", 0).await })
    };

    // Wait until the retort request is in flight.
    tokio::time::timeout(Duration::from_secs(1), async {
        while game.backend.calls().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("attack should reach the narrative backend");

    let summoned = tokio::time::timeout(Duration::from_millis(500), game.summon("g2", "bob"))
        .await
        .expect("summon in another group must not wait for the retort");
    assert!(matches!(summoned, Some(Reply::Summoned { .. })));

    let g1_hp = tokio::time::timeout(Duration::from_millis(500), game.boss_hp("g1"))
        .await
        .expect("state reads must not wait for the retort");
    assert_eq!(g1_hp, Some(40));
    assert!(!slow.is_finished());

    let reply = slow.await.unwrap().unwrap();
    let Reply::Exchange { retort, .. } = reply else {
        panic!("expected an exchange");
    };
    assert_eq!(retort, "Patience...");
}

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test]
async fn test_custom_commands_replace_defaults() {
    let config = GameConfig::default()
        .with_catalog(Catalog::single(warden(), "stubborn"))
        .with_summon_command("!boss")
        .with_attack_command("!hit");
    let game = TestHarness::with_config(config, ScriptedGenerator::new());

    assert_eq!(game.send("g1", "alice", "!summon boss", 0).await, None);
    let Some(Reply::Summoned { attack_command, .. }) = game.send("g1", "alice", "!boss", 0).await else {
        panic!("custom summon command should summon");
    };
    assert_eq!(attack_command, "!hit");

    assert_eq!(game.send("g1", "alice", "!attack boss", 0).await, None);
    assert!(matches!(game.send("g1", "alice", "!hit", 0).await, Some(Reply::Exchange { .. })));
    assert_eq!(game.boss_hp("g1").await, Some(40));
}
