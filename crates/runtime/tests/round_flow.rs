use std::sync::Arc;
use std::time::Duration;

use client_blockchain_core::abi;
use client_blockchain_core::types::to_quantity;
use client_blockchain_core::{MockWalletProvider, ProviderContract, WalletProvider};
use game_core::{Choice, GamePhase, Outcome, SelectError, Settlement, WagerError, Wei};
use runtime::{Event, GameEvent, Runtime, RuntimeError, RuntimeHandle, Topic, WalletError};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

const MILLI: u128 = 1_000_000_000_000_000;

async fn start(mock: &Arc<MockWalletProvider>) -> (Runtime, RuntimeHandle) {
    let provider: Arc<dyn WalletProvider> = mock.clone();
    let contract = ProviderContract::new(Arc::clone(&provider), mock.contract_address().clone())
        .with_poll_interval(Duration::from_millis(200));

    let runtime = Runtime::builder()
        .provider(provider)
        .contract(Arc::new(contract))
        .build()
        .await
        .expect("runtime should build");
    let handle = runtime.handle();
    (runtime, handle)
}

async fn wait_for(
    rx: &mut broadcast::Receiver<Event>,
    matches: impl Fn(&GameEvent) -> bool,
) -> GameEvent {
    tokio::time::timeout(Duration::from_secs(600), async {
        loop {
            match rx.recv().await {
                Ok(Event::Game(event)) if matches(&event) => return event,
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => panic!("event bus closed"),
            }
        }
    })
    .await
    .expect("expected game event was not published")
}

/// Scenario 1: choosing without a wallet is refused and nothing changes.
#[tokio::test(start_paused = true)]
async fn choice_without_wallet_requires_connection() {
    let mock = Arc::new(MockWalletProvider::new());
    let (runtime, handle) = start(&mock).await;
    let mut game = handle.subscribe(Topic::Game);

    let err = handle.select_choice(Choice::Rock).await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Select(SelectError::WalletRequired)
    ));
    wait_for(&mut game, |e| matches!(e, GameEvent::SelectionRejected { .. })).await;

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.session.phase(), GamePhase::Idle);
    assert_eq!(snapshot.session.player_choice(), None);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(mock.sent_transactions().is_empty());

    runtime.shutdown().await.unwrap();
}

/// Scenario 2: a committed Paper against Rock wins and is counted once.
#[tokio::test(start_paused = true)]
async fn winning_round_updates_score() {
    let mock = Arc::new(MockWalletProvider::new());
    mock.push_bot_choice(Choice::Rock);
    let (runtime, handle) = start(&mock).await;
    let mut game = handle.subscribe(Topic::Game);

    let session = handle.connect().await.unwrap();
    assert_eq!(session.account, mock.accounts()[0]);
    assert_eq!(handle.set_wager("0.001").await.unwrap().amount(), Wei(MILLI));

    let ticket = handle.select_choice(Choice::Paper).await.unwrap();
    assert_eq!(ticket.seconds, 5);

    let chosen = handle.snapshot().await.unwrap();
    assert_eq!(chosen.session.phase(), GamePhase::Choosing);
    assert_eq!(chosen.session.player_choice(), Some(Choice::Paper));

    wait_for(&mut game, |e| matches!(e, GameEvent::TransactionSent { .. })).await;
    let GameEvent::RoundResolved {
        round,
        settlement,
        score,
    } = wait_for(&mut game, |e| matches!(e, GameEvent::RoundResolved { .. })).await
    else {
        unreachable!()
    };
    assert_eq!(round.generation, ticket.generation);
    assert_eq!(round.outcome.outcome, Outcome::Win);
    assert_eq!(settlement, Settlement::Credited(Wei(2 * MILLI)));
    assert_eq!(score.player_wins, 1);

    let sent = mock.sent_transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, *mock.contract_address());
    assert_eq!(sent[0].value, to_quantity(MILLI));
    assert_eq!(abi::decode_play(&sent[0].data).unwrap(), Choice::Paper);

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.session.phase(), GamePhase::Result);
    assert_eq!(snapshot.session.player_choice(), Some(Choice::Paper));
    assert_eq!(snapshot.session.bot_choice(), Some(Choice::Rock));
    assert_eq!(snapshot.session.outcome(), Some(Outcome::Win));
    assert_eq!(snapshot.score.player_wins, 1);
    assert_eq!(snapshot.score.bot_wins, 0);

    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn countdown_ticks_down_before_submission() {
    let mock = Arc::new(MockWalletProvider::new());
    let (runtime, handle) = start(&mock).await;
    let mut game = handle.subscribe(Topic::Game);

    handle.connect().await.unwrap();
    handle.select_choice(Choice::Rock).await.unwrap();

    let mut remaining = Vec::new();
    loop {
        match wait_for(&mut game, |e| {
            matches!(
                e,
                GameEvent::CountdownTick { .. } | GameEvent::Submitting { .. }
            )
        })
        .await
        {
            GameEvent::CountdownTick { remaining: r, .. } => remaining.push(r),
            _ => break,
        }
    }
    assert_eq!(remaining, vec![4, 3, 2, 1, 0]);

    let err = handle.select_choice(Choice::Paper).await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Select(SelectError::NotIdle(GamePhase::Result))
    ));

    runtime.shutdown().await.unwrap();
}

/// Scenario 3: a rejected signature leaves Result with no outcome until reset.
#[tokio::test(start_paused = true)]
async fn rejected_transaction_is_recorded_and_resettable() {
    let mock = Arc::new(MockWalletProvider::new());
    mock.set_reject_signing(true);
    let (runtime, handle) = start(&mock).await;
    let mut game = handle.subscribe(Topic::Game);

    handle.connect().await.unwrap();
    handle.select_choice(Choice::Scissors).await.unwrap();
    wait_for(&mut game, |e| matches!(e, GameEvent::RoundFailed { .. })).await;

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.session.phase(), GamePhase::Result);
    assert_eq!(snapshot.session.outcome(), None);
    assert!(snapshot.session.failure().is_some());
    assert_eq!(snapshot.score.player_wins + snapshot.score.bot_wins, 0);

    handle.reset().await.unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.session.phase(), GamePhase::Idle);
    assert_eq!(snapshot.session.failure(), None);
    assert_eq!(snapshot.session.player_choice(), None);

    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn known_low_balance_fails_without_signing() {
    let mock = Arc::new(MockWalletProvider::new());
    let account = mock.accounts()[0].clone();
    mock.set_balance(&account, MILLI / 2);
    let (runtime, handle) = start(&mock).await;
    let mut game = handle.subscribe(Topic::Game);

    handle.connect().await.unwrap();
    handle.select_choice(Choice::Rock).await.unwrap();
    let GameEvent::RoundFailed { reason, .. } =
        wait_for(&mut game, |e| matches!(e, GameEvent::RoundFailed { .. })).await
    else {
        unreachable!()
    };
    assert!(reason.contains("insufficient funds"));
    assert!(mock.sent_transactions().is_empty());

    runtime.shutdown().await.unwrap();
}

/// Scenario 4: an invalid wager is rejected and the previous one retained.
#[tokio::test]
async fn invalid_wager_keeps_previous_value() {
    let mock = Arc::new(MockWalletProvider::new());
    let (runtime, handle) = start(&mock).await;

    handle.set_wager("0.001").await.unwrap();
    let err = handle.set_wager("0.0005").await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Wager(WagerError::BelowMinimum(_))
    ));
    assert!(matches!(
        handle.set_wager("0.0015").await.unwrap_err(),
        RuntimeError::Wager(WagerError::OffStep(_))
    ));
    assert!(handle.set_wager("abc").await.is_err());

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.session.wager().as_str(), "0.001");

    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn reset_during_countdown_never_submits() {
    let mock = Arc::new(MockWalletProvider::new());
    let (runtime, handle) = start(&mock).await;

    handle.connect().await.unwrap();
    handle.select_choice(Choice::Rock).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    handle.reset().await.unwrap();

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(mock.sent_transactions().is_empty());
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.session.phase(), GamePhase::Idle);
    assert_eq!(snapshot.session.seconds_remaining(), None);

    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn reset_while_awaiting_outcome_releases_subscription() {
    let mock = Arc::new(MockWalletProvider::new());
    mock.set_withhold_events(true);
    let (runtime, handle) = start(&mock).await;
    let mut game = handle.subscribe(Topic::Game);
    let account = mock.accounts()[0].clone();

    handle.connect().await.unwrap();
    handle.select_choice(Choice::Rock).await.unwrap();
    wait_for(&mut game, |e| {
        matches!(e, GameEvent::TransactionConfirmed { .. })
    })
    .await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    handle.reset().await.unwrap();
    tokio::task::yield_now().await;
    let polls = mock.request_count("eth_getLogs");

    // An outcome for the abandoned round shows up later.
    mock.emit_game_played(&account, Wei(MILLI), Choice::Rock, Choice::Scissors, Outcome::Win);
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(mock.request_count("eth_getLogs"), polls);
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.session.phase(), GamePhase::Idle);
    assert_eq!(snapshot.score.player_wins, 0);

    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn disconnect_clears_score_and_session() {
    let mock = Arc::new(MockWalletProvider::new());
    mock.push_bot_choice(Choice::Paper);
    let (runtime, handle) = start(&mock).await;
    let mut game = handle.subscribe(Topic::Game);

    handle.connect().await.unwrap();
    handle.select_choice(Choice::Rock).await.unwrap();
    wait_for(&mut game, |e| matches!(e, GameEvent::RoundResolved { .. })).await;
    assert_eq!(handle.snapshot().await.unwrap().score.bot_wins, 1);

    handle.disconnect();
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.wallet, None);
    assert_eq!(snapshot.session.phase(), GamePhase::Idle);
    assert_eq!(snapshot.score.bot_wins, 0);

    let err = handle.select_choice(Choice::Rock).await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Select(SelectError::WalletRequired)
    ));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn missing_provider_is_reported_not_fatal() {
    let runtime = Runtime::builder().build().await.unwrap();
    let handle = runtime.handle();

    assert!(!handle.has_provider());
    assert_eq!(
        handle.connect().await.unwrap_err(),
        WalletError::ProviderUnavailable
    );
    assert!(matches!(
        handle.min_bet().await,
        Err(RuntimeError::ContractNotConfigured)
    ));
    assert_eq!(handle.snapshot().await.unwrap().wallet, None);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn exposes_contract_views_and_withdraw() {
    let mock = Arc::new(MockWalletProvider::new());
    let (runtime, handle) = start(&mock).await;

    assert_eq!(handle.min_bet().await.unwrap(), Wei(MILLI));
    assert_eq!(&handle.recipient().await.unwrap(), mock.recipient());
    assert!(matches!(
        handle.withdraw().await,
        Err(RuntimeError::NotConnected)
    ));

    handle.connect().await.unwrap();
    let receipt = handle.withdraw().await.unwrap();
    assert!(receipt.success);

    runtime.shutdown().await.unwrap();
}
