//! Board rule integration tests: movement, combat, production, elimination

use proptest::prelude::*;

use hexfront::board::{BoardHandle, FieldSnapshot, HexCoord, Outcome};
use hexfront::core::config::GameConfig;
use hexfront::core::types::{FactionId, Position, UnitId};
use hexfront::unit::{Archetype, PRODUCIBLE};

const RED: FactionId = FactionId(1);
const BLUE: FactionId = FactionId(2);

async fn place(board: &BoardHandle, faction: FactionId, archetype: Archetype, x: i32, y: i32) -> UnitId {
    board
        .place_unit(faction, archetype, Position::new(x, y))
        .await
        .unwrap()
        .expect("field should be free")
}

async fn field(board: &BoardHandle, unit: UnitId) -> Option<FieldSnapshot> {
    board
        .snapshot()
        .await
        .unwrap()
        .into_iter()
        .find(|f| f.unit == unit)
}

fn hex_distance(a: Position, b: Position) -> u32 {
    HexCoord::from_position(a).distance(&HexCoord::from_position(b))
}

#[tokio::test]
async fn test_spearman_cannot_reach_distant_archer() {
    let board = BoardHandle::spawn(&GameConfig::default());
    let spearman = place(&board, RED, Archetype::Spearman, 0, 5).await;
    place(&board, BLUE, Archetype::Archer, 4, 5).await;
    board.start_game().await.unwrap();
    board.start_turn(RED, 1).await.unwrap();

    let outcome = board.attack(spearman, Position::new(4, 5)).await.unwrap();
    assert_eq!(outcome, Outcome::OutOfRange);
}

#[tokio::test]
async fn test_production_arrives_after_lead_time() {
    let board = BoardHandle::spawn(&GameConfig::default());
    let base = place(&board, RED, Archetype::Base, 1, 1).await;
    board.start_game().await.unwrap();

    board.start_turn(RED, 3).await.unwrap();
    assert_eq!(board.produce(Archetype::Archer).await.unwrap(), Outcome::Executed);
    assert_eq!(
        board.produce(Archetype::Spearman).await.unwrap(),
        Outcome::ProdInProgress
    );
    board.end_turn().await.unwrap();

    for turn in 4..=5 {
        board.start_turn(RED, turn).await.unwrap();
        assert!(!board.get_moves(RED).await.unwrap().can_produce);
        assert_eq!(
            board.produce(Archetype::Worker).await.unwrap(),
            Outcome::ProdInProgress
        );
        board.end_turn().await.unwrap();
    }
    assert_eq!(board.snapshot().await.unwrap().len(), 1);

    board.start_turn(RED, 6).await.unwrap();
    let fields = board.snapshot().await.unwrap();
    let base_pos = field(&board, base).await.unwrap().position;
    let archer = fields
        .iter()
        .find(|f| f.archetype == Archetype::Archer)
        .expect("archer should have been delivered");
    assert_eq!(archer.faction, RED);
    assert_eq!(hex_distance(archer.position, base_pos), 1);

    let moves = board.get_moves(RED).await.unwrap();
    assert!(moves.can_produce);
    assert_eq!(moves.units.len(), 1);
}

#[tokio::test]
async fn test_base_is_not_producible() {
    let board = BoardHandle::spawn(&GameConfig::default());
    place(&board, RED, Archetype::Base, 1, 1).await;
    board.start_game().await.unwrap();
    board.start_turn(RED, 1).await.unwrap();
    assert_eq!(
        board.produce(Archetype::Base).await.unwrap(),
        Outcome::NotProducible
    );
}

#[tokio::test]
async fn test_move_there_and_back_restores_placement() {
    let board = BoardHandle::spawn(&GameConfig::default());
    let archer = place(&board, RED, Archetype::Archer, 5, 5).await;
    place(&board, BLUE, Archetype::Horseman, 9, 2).await;
    board.start_game().await.unwrap();
    let before = board.snapshot().await.unwrap();

    board.start_turn(RED, 1).await.unwrap();
    assert_eq!(
        board.move_unit(archer, Position::new(6, 5)).await.unwrap(),
        Outcome::Executed
    );
    let moved = board.snapshot().await.unwrap();
    assert_eq!(moved.len(), before.len());
    assert_eq!(field(&board, archer).await.unwrap().position, Position::new(6, 5));
    assert!(moved.iter().all(|f| f.position != Position::new(5, 5)));
    assert!(board.get_moves(RED).await.unwrap().units.is_empty());
    board.end_turn().await.unwrap();

    board.start_turn(RED, 2).await.unwrap();
    assert_eq!(
        board.move_unit(archer, Position::new(5, 5)).await.unwrap(),
        Outcome::Executed
    );
    let positions = |fields: &[FieldSnapshot]| {
        let mut p: Vec<_> = fields.iter().map(|f| (f.unit, f.position)).collect();
        p.sort_by_key(|(_, pos)| (pos.y, pos.x));
        p
    };
    assert_eq!(positions(&board.snapshot().await.unwrap()), positions(&before));
}

#[tokio::test]
async fn test_move_guards() {
    let board = BoardHandle::spawn(&GameConfig::default());
    let horseman = place(&board, RED, Archetype::Horseman, 5, 5).await;
    place(&board, RED, Archetype::Spearman, 5, 6).await;
    place(&board, BLUE, Archetype::Worker, 5, 4).await;
    board.start_game().await.unwrap();
    board.start_turn(RED, 1).await.unwrap();

    assert_eq!(
        board.move_unit(horseman, Position::new(5, 6)).await.unwrap(),
        Outcome::OccAlly
    );
    assert_eq!(
        board.move_unit(horseman, Position::new(5, 4)).await.unwrap(),
        Outcome::OccEnemy
    );
    assert_eq!(
        board.move_unit(horseman, Position::new(12, 5)).await.unwrap(),
        Outcome::OutOfRange
    );
    assert_eq!(
        board.move_unit(horseman, Position::new(20, 5)).await.unwrap(),
        Outcome::OutOfRange
    );
    assert_eq!(
        board.move_unit(UnitId::new(), Position::new(6, 5)).await.unwrap(),
        Outcome::ExistsNot
    );
    assert_eq!(
        board.attack(horseman, Position::new(6, 5)).await.unwrap(),
        Outcome::OccNot
    );
}

#[tokio::test]
async fn test_effective_attack_and_retaliation() {
    let board = BoardHandle::spawn(&GameConfig::default());
    let horseman = place(&board, RED, Archetype::Horseman, 5, 5).await;
    let archer = place(&board, BLUE, Archetype::Archer, 6, 5).await;
    board.start_game().await.unwrap();
    board.start_turn(RED, 1).await.unwrap();

    assert_eq!(
        board.attack(horseman, Position::new(6, 5)).await.unwrap(),
        Outcome::Executed
    );
    // Horseman doubles against archers, the archer halves against horsemen
    assert_eq!(field(&board, archer).await.unwrap().health, 40);
    assert_eq!(field(&board, horseman).await.unwrap().health, 85);
}

#[tokio::test]
async fn test_no_retaliation_beyond_defender_range() {
    let board = BoardHandle::spawn(&GameConfig::default());
    let archer = place(&board, RED, Archetype::Archer, 5, 5).await;
    let spearman = place(&board, BLUE, Archetype::Spearman, 7, 5).await;
    board.start_game().await.unwrap();
    board.start_turn(RED, 1).await.unwrap();

    assert_eq!(
        board.attack(archer, Position::new(7, 5)).await.unwrap(),
        Outcome::Executed
    );
    assert_eq!(field(&board, spearman).await.unwrap().health, 40);
    assert_eq!(field(&board, archer).await.unwrap().health, 100);
}

#[tokio::test]
async fn test_killed_unit_leaves_the_board() {
    let board = BoardHandle::spawn(&GameConfig::default());
    let spearman = place(&board, RED, Archetype::Spearman, 5, 5).await;
    let horseman = place(&board, BLUE, Archetype::Horseman, 6, 5).await;
    board.start_game().await.unwrap();

    // 60 per hit against 100 health; the horseman strikes back both times
    for turn in 1..=2 {
        board.start_turn(RED, turn).await.unwrap();
        assert_eq!(
            board.attack(spearman, Position::new(6, 5)).await.unwrap(),
            Outcome::Executed
        );
        board.end_turn().await.unwrap();
    }
    assert!(field(&board, horseman).await.is_none());
    assert_eq!(field(&board, spearman).await.unwrap().health, 70);
}

#[tokio::test]
async fn test_destroying_base_eliminates_empire() {
    let board = BoardHandle::spawn(&GameConfig::default());
    place(&board, RED, Archetype::Base, 1, 1).await;
    let archer = place(&board, RED, Archetype::Archer, 8, 5).await;
    place(&board, BLUE, Archetype::Base, 10, 5).await;
    place(&board, BLUE, Archetype::Worker, 12, 8).await;
    board.start_game().await.unwrap();
    assert_eq!(board.living_empires().await.unwrap(), vec![RED, BLUE]);

    // The base cannot hit back at range 2; 30 per hit against 250 health
    for turn in 1..=9 {
        board.start_turn(RED, turn).await.unwrap();
        assert_eq!(
            board.attack(archer, Position::new(10, 5)).await.unwrap(),
            Outcome::Executed
        );
        board.end_turn().await.unwrap();
    }

    assert_eq!(board.living_empires().await.unwrap(), vec![RED]);
    let fields = board.snapshot().await.unwrap();
    assert!(fields.iter().all(|f| f.faction == RED));
    assert_eq!(field(&board, archer).await.unwrap().health, 100);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_fallen_base_takes_whole_empire(
        escorts in proptest::collection::vec((0i32..15, 0i32..10, 0usize..4), 0..8),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let board = BoardHandle::spawn(&GameConfig::default());
            place(&board, RED, Archetype::Base, 1, 1).await;
            let archer = place(&board, RED, Archetype::Archer, 8, 5).await;
            place(&board, BLUE, Archetype::Base, 10, 5).await;
            for (x, y, kind) in escorts {
                let archetype = PRODUCIBLE[kind];
                // Taken fields are simply skipped
                let _ = board
                    .place_unit(BLUE, archetype, Position::new(x, y))
                    .await
                    .unwrap();
            }
            board.start_game().await.unwrap();

            for turn in 1..=9 {
                board.start_turn(RED, turn).await.unwrap();
                prop_assert_eq!(
                    board.attack(archer, Position::new(10, 5)).await.unwrap(),
                    Outcome::Executed
                );
                board.end_turn().await.unwrap();
            }

            prop_assert_eq!(board.living_empires().await.unwrap(), vec![RED]);
            let fields = board.snapshot().await.unwrap();
            prop_assert!(fields.iter().all(|f| f.faction == RED));
            prop_assert_eq!(fields.len(), 2);
            Ok(())
        })?;
    }
}
