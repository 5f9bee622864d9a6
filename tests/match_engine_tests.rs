//! Match engine tests: line clears, formations, pair explosions, cascades

use blockchain_breakout::core::config::default_currencies;
use blockchain_breakout::core::{
    find_component, Block, BlockId, Board, ComboState, FormationKind, GameEvent, Market, MatchContext,
    MatchEngine, PassOutcome, SimpleRng,
};
use blockchain_breakout::types::{BlockFlags, CurrencyKind, GridPos, MarketEvent, MAX_COMBO, VALUE_CEILING};

/// Threshold above every formation size: only rows and detonations resolve.
const NO_FORMATIONS: u8 = 5;

struct Table {
    board: Board,
    market: Market,
    combo: ComboState,
    score: u32,
    event: MarketEvent,
    events: Vec<GameEvent>,
}

impl Table {
    fn new(width: u8, height: u8) -> Self {
        Self {
            board: Board::new(width, height),
            market: Market::new(&default_currencies()),
            combo: ComboState::new(),
            score: 0,
            event: MarketEvent::None,
            events: Vec::new(),
        }
    }

    fn put(&mut self, x: i32, y: i32, kind: CurrencyKind) -> BlockId {
        let id = self.board.alloc_id();
        self.board
            .set(x, y, Some(Block::new(id, Some(kind), BlockFlags::TETRIS)));
        id
    }

    fn with_ctx<T>(&mut self, threshold: u8, f: impl FnOnce(&mut Board, &mut MatchContext<'_>) -> T) -> T {
        let mut ctx = MatchContext::new(
            &mut self.market,
            &mut self.combo,
            &mut self.score,
            self.event,
            threshold,
            &mut self.events,
        );
        f(&mut self.board, &mut ctx)
    }

    fn pass(&mut self, threshold: u8) -> PassOutcome {
        self.with_ctx(threshold, |board, ctx| MatchEngine::default().run_pass(board, ctx))
    }

    fn settle(&mut self, threshold: u8) {
        let report = self.with_ctx(threshold, |board, ctx| MatchEngine::default().settle(board, ctx));
        assert!(report.settled);
    }
}

#[test]
fn test_full_bitcoin_row_scores_fifteen_prices() {
    let mut t = Table::new(15, 20);
    for x in 0..15 {
        t.put(x, 0, CurrencyKind::Bitcoin);
    }
    let above = t.put(4, 1, CurrencyKind::Solana);
    let btc = t.market.price_of(CurrencyKind::Bitcoin).unwrap_or(0);

    assert_eq!(t.pass(NO_FORMATIONS), PassOutcome::Changed);

    assert_eq!(t.score, 15 * btc);
    assert_eq!(t.board.position_of(above), Some(GridPos::new(4, 0)));
    for x in 0..15 {
        assert_eq!(t.board.get(x, 19), Some(None));
    }
    assert_eq!(t.board.block_count(), 1);
    assert!(t.events.contains(&GameEvent::ScoreChanged(15 * btc)));
    assert!(t.events.contains(&GameEvent::ComboChanged(1)));
}

#[test]
fn test_stacked_full_rows_clear_in_one_pass() {
    let mut t = Table::new(4, 6);
    for y in 0..3 {
        for x in 0..4 {
            t.put(x, y, CurrencyKind::Polkadot);
        }
    }
    t.pass(NO_FORMATIONS);
    assert_eq!(t.board.block_count(), 0);
    assert_eq!(t.score, 12 * 10);
    assert_eq!(t.combo.count(), 3);
}

#[test]
fn test_row_clear_uses_market_event() {
    let mut t = Table::new(4, 4);
    t.event = MarketEvent::CryptoCrash;
    for x in 0..4 {
        t.put(x, 0, CurrencyKind::Solana);
    }
    t.pass(NO_FORMATIONS);
    assert_eq!(t.score, 4 * 505 / 2);
}

#[test]
fn test_bitcoin_pair_explodes_and_biases_market_down() {
    let mut t = Table::new(6, 6);
    let a = t.put(1, 0, CurrencyKind::Bitcoin);
    let b = t.put(2, 0, CurrencyKind::Bitcoin);

    assert_eq!(t.pass(2), PassOutcome::Changed);

    assert_eq!(t.board.block_count(), 0);
    assert!(t.events.contains(&GameEvent::BlockDestroyed { id: a }));
    assert!(t.events.contains(&GameEvent::BlockDestroyed { id: b }));
    assert!(t.market.values().iter().all(|v| v.force_down));

    let mut rng = SimpleRng::new(3);
    let before: Vec<u32> = t.market.values().iter().map(|v| v.price).collect();
    t.market.tick(&mut rng);
    for (v, old) in t.market.values().iter().zip(before) {
        assert!(v.price <= old, "{} rose after a forced-down tick", v.symbol);
        assert!(!v.force_down);
    }
}

#[test]
fn test_pairs_need_threshold_two() {
    let mut t = Table::new(6, 6);
    t.put(1, 0, CurrencyKind::Bitcoin);
    t.put(2, 0, CurrencyKind::Bitcoin);
    assert_eq!(t.pass(3), PassOutcome::Stable);
    assert_eq!(t.board.block_count(), 2);
}

#[test]
fn test_three_connected_form_one_super_at_anchor() {
    let mut t = Table::new(6, 6);
    t.put(2, 0, CurrencyKind::Ethereum);
    t.put(3, 0, CurrencyKind::Ethereum);
    t.put(3, 1, CurrencyKind::Ethereum);

    let formation = match t.pass(3) {
        PassOutcome::Forming(f) => f,
        other => panic!("expected a formation, got {:?}", other),
    };
    assert_eq!(formation.kind, FormationKind::Super);
    assert_eq!(formation.anchor, GridPos::new(2, 0));
    assert!(t
        .board
        .blocks()
        .all(|(_, b)| b.flags.contains(BlockFlags::GLOWING)));

    t.with_ctx(3, |board, ctx| MatchEngine::default().complete_formation(board, &formation, ctx));

    assert_eq!(t.board.block_count(), 1);
    let merged = t.board.block(2, 0).expect("super block at anchor");
    assert!(merged.flags.contains(BlockFlags::SUPER));
    assert!(merged.flags.contains(BlockFlags::CLEAR_THREE_ROWS));
    assert!(merged.flags.contains(BlockFlags::CANNOT_BLOW_UP_YET));
    assert_eq!(merged.currency, Some(CurrencyKind::Ethereum));
}

#[test]
fn test_four_connected_form_a_bomb_first() {
    let mut t = Table::new(6, 6);
    for x in 0..4 {
        t.put(x, 0, CurrencyKind::Xrp);
    }
    match t.pass(4) {
        PassOutcome::Forming(f) => {
            assert_eq!(f.kind, FormationKind::Bomb);
            assert_eq!(f.members.len(), 4);
        }
        other => panic!("expected a bomb formation, got {:?}", other),
    }
}

#[test]
fn test_super_waits_one_lock_then_clears_three_rows() {
    let mut t = Table::new(5, 6);
    let super_id = t.board.alloc_id();
    t.board.set(
        2,
        1,
        Some(Block::new(
            super_id,
            Some(CurrencyKind::Tether),
            BlockFlags::TETRIS | BlockFlags::SUPER | BlockFlags::CLEAR_THREE_ROWS | BlockFlags::CANNOT_BLOW_UP_YET,
        )),
    );
    t.put(0, 0, CurrencyKind::Bitcoin);
    t.put(4, 2, CurrencyKind::Ethereum);
    let high = t.put(1, 4, CurrencyKind::Solana);
    let officer = t.board.alloc_id();
    t.board.set(0, 1, Some(Block::new(officer, None, BlockFlags::OFFICER)));

    assert_eq!(t.pass(NO_FORMATIONS), PassOutcome::Stable);

    t.board.clear_flag(BlockFlags::CANNOT_BLOW_UP_YET);
    assert_eq!(t.pass(NO_FORMATIONS), PassOutcome::Changed);

    assert_eq!(t.board.position_of(super_id), None);
    assert_eq!(t.board.block(0, 0), None);
    assert_eq!(t.board.block(4, 2), None);
    assert_eq!(t.board.block(0, 1).map(|b| b.id), Some(officer));
    assert_eq!(t.board.position_of(high), Some(GridPos::new(1, 4)));
    assert_eq!(t.score, 100 + 20_000 + 12_000);
}

#[test]
fn test_component_is_the_same_from_every_member() {
    let mut rng = SimpleRng::new(99);
    for _ in 0..10 {
        let mut t = Table::new(8, 8);
        for y in 0..8 {
            for x in 0..8 {
                if rng.next_range(4) > 0 {
                    let kind = [CurrencyKind::Bitcoin, CurrencyKind::Usdc][rng.next_range(2) as usize];
                    t.put(x, y, kind);
                }
            }
        }
        for (pos, _) in t.board.blocks() {
            let mut reference = find_component(&t.board, pos);
            assert_eq!(reference.first(), Some(&pos));
            reference.sort_by_key(|p| (p.y, p.x));
            for member in &reference {
                let mut other = find_component(&t.board, *member);
                other.sort_by_key(|p| (p.y, p.x));
                assert_eq!(other, reference);
            }
        }
    }
}

#[test]
fn test_combo_never_exceeds_max() {
    let mut t = Table::new(3, 10);
    for y in 0..9 {
        for x in 0..3 {
            t.put(x, y, CurrencyKind::Tether);
        }
    }
    t.pass(NO_FORMATIONS);
    assert_eq!(t.combo.count(), MAX_COMBO);
}

#[test]
fn test_score_is_clamped_under_bull_run() {
    let mut t = Table::new(4, 4);
    t.event = MarketEvent::BullRun;
    t.score = VALUE_CEILING - 10;
    for x in 0..4 {
        t.put(x, 0, CurrencyKind::Bitcoin);
    }
    t.pass(NO_FORMATIONS);
    assert_eq!(t.score, VALUE_CEILING);

    for x in 0..4 {
        t.put(x, 0, CurrencyKind::Bitcoin);
    }
    t.pass(NO_FORMATIONS);
    assert_eq!(t.score, VALUE_CEILING);
}

#[test]
fn test_settle_leaves_a_stable_board_and_monotone_score() {
    let mut rng = SimpleRng::new(2024);
    for threshold in 2..=5 {
        let mut t = Table::new(6, 10);
        for y in 0..7 {
            for x in 0..6 {
                t.put(x, y, CurrencyKind::ALL[rng.next_range(7) as usize]);
            }
        }
        t.settle(threshold);

        let score_before = t.score;
        assert_eq!(t.pass(threshold), PassOutcome::Stable);
        assert_eq!(t.score, score_before);
        assert!(t.combo.count() <= MAX_COMBO);

        let mut last = 0;
        for e in &t.events {
            if let GameEvent::ScoreChanged(s) = e {
                assert!(*s >= last);
                last = *s;
            }
        }
    }
}
