//! Whole games run by the director

use std::time::Duration;

use hexfront::core::config::GameConfig;
use hexfront::core::error::GameError;
use hexfront::director::{Director, GameOutcome, USER_FACTION};
use hexfront::nlu::{KeywordNlu, Nlu};
use hexfront::voice::{ScriptLine, ScriptedSpeech, VoiceHandle};

fn config(ai_empires: u8, max_turns: u32) -> GameConfig {
    GameConfig {
        ai_empires,
        max_turns: Some(max_turns),
        seed: 7,
        ..GameConfig::default()
    }
}

#[tokio::test]
async fn test_ai_only_game_stops_at_turn_limit() {
    let director = Director::new(config(3, 5), None, Nlu::Keyword(KeywordNlu::new()));
    let board = director.board();
    let outcome = director.run().await.unwrap();

    let living = board.living_empires().await.unwrap();
    match outcome {
        GameOutcome::Abandoned { turns } => {
            assert_eq!(turns, 5);
            assert!(living.contains(&USER_FACTION));
            assert!(living.len() > 1);
            assert_eq!(board.turn().await.unwrap(), 5);
        }
        GameOutcome::Lost => assert!(!living.contains(&USER_FACTION)),
        GameOutcome::Won => panic!("an idle player cannot win in five turns"),
    }

    // Nothing of an eliminated empire stays on the board
    let fields = board.snapshot().await.unwrap();
    assert!(fields.iter().all(|f| living.contains(&f.faction)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_seed_replays_the_same_game() {
    let mut layouts = Vec::new();
    for _ in 0..2 {
        let director = Director::new(config(3, 4), None, Nlu::Keyword(KeywordNlu::new()));
        let board = director.board();
        director.run().await.unwrap();

        // Unit ids are fresh every game; compare what sits where
        let mut fields: Vec<_> = board
            .snapshot()
            .await
            .unwrap()
            .into_iter()
            .map(|f| (f.position, f.faction, f.archetype, f.health))
            .collect();
        fields.sort_by_key(|(p, ..)| (p.y, p.x));
        layouts.push(fields);
    }
    assert!(!layouts[0].is_empty());
    assert_eq!(layouts[0], layouts[1]);
}

#[tokio::test]
async fn test_voiced_game_announces_start_and_plays_user_turns() {
    let speech = ScriptedSpeech::default()
        .then_repeat([ScriptLine::say("skip"), ScriptLine::say("yes")]);
    let transcript = speech.transcript();
    let voice = VoiceHandle::start(Box::new(speech), Duration::from_secs(4))
        .await
        .unwrap();

    let director = Director::new(config(1, 2), Some(voice), Nlu::Keyword(KeywordNlu::new()));
    let outcome = director.run().await.unwrap();
    assert_eq!(outcome, GameOutcome::Abandoned { turns: 2 });

    let lines = transcript.lines();
    assert_eq!(lines[0], "The game is starting! We are playing black.");
    let ended = lines.iter().filter(|l| *l == "Ending your turn.").count();
    assert_eq!(ended, 2);
}

#[tokio::test]
async fn test_broken_device_falls_back_to_ai_only() {
    let failed = VoiceHandle::start(
        Box::new(ScriptedSpeech::failing()),
        Duration::from_secs(4),
    )
    .await;
    assert!(matches!(failed, Err(GameError::VoiceSetup(_))));

    let director = Director::new(config(1, 1), None, Nlu::Keyword(KeywordNlu::new()));
    assert_eq!(
        director.run().await.unwrap(),
        GameOutcome::Abandoned { turns: 1 }
    );
}
