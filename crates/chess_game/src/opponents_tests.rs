use super::*;

const MATE_FEN: &str = "r1bqkbnr/pppp1Qpp/2n5/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 1";

#[tokio::test]
async fn random_opponent_only_plays_legal_moves() {
    let game = Game::new();
    let legal = game.legal_moves();
    let mut opponent = RandomOpponent;

    for _ in 0..50 {
        let mv = opponent.choose_move(&game).await.unwrap();
        assert!(legal.contains(&mv), "{} is not legal from the start", mv);
    }
}

#[tokio::test]
async fn random_opponent_reports_none_in_a_dead_position() {
    let game = Game::from_fen(MATE_FEN).unwrap();
    let mut opponent = RandomOpponent;

    match opponent.choose_move(&game).await {
        Err(EngineError::MalformedReply(token)) => assert_eq!(token, "(none)"),
        other => panic!("expected the (none) reply, got {:?}", other),
    }
}

#[tokio::test]
async fn engine_opponent_surfaces_transport_failures() {
    let endpoint = uci_client::EngineEndpoint::default();
    let mut opponent = EngineOpponent::new(endpoint, Duration::from_secs(1));

    match opponent.choose_move(&Game::new()).await {
        Err(EngineError::TransportUnavailable(_)) => {}
        other => panic!("expected a transport failure, got {:?}", other),
    }
}

#[test]
fn selector_hands_humans_no_opponent() {
    let selector = OpponentSelector::new(PlaySettings::default());
    assert!(selector.for_side(Side::White).is_none());
    assert!(selector.for_side(Side::Black).is_some());
}

#[tokio::test]
async fn selector_builds_a_working_random_opponent() {
    let mut settings = PlaySettings::default();
    settings.black.controller = Controller::Random;
    let selector = OpponentSelector::new(settings);

    let mut opponent = selector.for_side(Side::Black).unwrap();
    let game = Game::new();
    let mv = opponent.choose_move(&game).await.unwrap();
    assert!(game.legal_moves().contains(&mv));
}
