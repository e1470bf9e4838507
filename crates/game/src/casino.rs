//! Casino mini-games: slot machine, European roulette, single-deck blackjack.
//!
//! Every round takes its stake from the inventory chip balance up front and
//! credits the total return (stake included) afterwards.

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::state::Inventory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasinoGame {
    Slots,
    Roulette(RouletteBet),
    Blackjack,
}

impl CasinoGame {
    pub fn name(&self) -> &'static str {
        match self {
            CasinoGame::Slots => "slots",
            CasinoGame::Roulette(_) => "roulette",
            CasinoGame::Blackjack => "blackjack",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CasinoError {
    #[error("a bet of {bet} chips exceeds the balance of {balance}")]
    InsufficientChips { bet: u32, balance: u32 },
    #[error("bets must be at least one chip")]
    ZeroBet,
    #[error("{0} is not a pocket on a European wheel")]
    NoSuchPocket(u8),
}

/// Outcome of one round.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub game: CasinoGame,
    pub bet: u32,
    /// Chips handed back, stake included. Zero on a loss.
    pub payout: u32,
    pub summary: String,
}

impl Round {
    pub fn won(&self) -> bool {
        self.payout > self.bet
    }
}

/// Play one round, settling chips in `inventory`.
pub fn play<R: Rng>(game: CasinoGame, bet: u32, inventory: &mut Inventory, rng: &mut R) -> Result<Round, CasinoError> {
    if bet == 0 {
        return Err(CasinoError::ZeroBet);
    }
    if bet > inventory.chips {
        return Err(CasinoError::InsufficientChips { bet, balance: inventory.chips });
    }
    if let CasinoGame::Roulette(RouletteBet::Straight(n)) = game {
        if n > 36 {
            return Err(CasinoError::NoSuchPocket(n));
        }
    }

    inventory.chips -= bet;
    let (payout, summary) = match game {
        CasinoGame::Slots => {
            let reels = spin_reels(rng);
            let payout = slot_payout(reels, bet);
            (payout, format!("{} | {} | {}", reels[0].name(), reels[1].name(), reels[2].name()))
        }
        CasinoGame::Roulette(wager) => {
            let pocket = rng.gen_range(0..=36u8);
            let colour = if pocket == 0 {
                "green"
            } else if is_red(pocket) {
                "red"
            } else {
                "black"
            };
            (roulette_payout(wager, pocket, bet), format!("{pocket} {colour}"))
        }
        CasinoGame::Blackjack => {
            let hand = deal_blackjack(rng);
            let outcome = hand.outcome();
            (
                outcome.payout(bet),
                format!(
                    "{:?}: you {} vs dealer {}",
                    outcome,
                    hand_value(&hand.player).total,
                    hand_value(&hand.dealer).total
                ),
            )
        }
    };
    inventory.chips = inventory.chips.saturating_add(payout);

    log::info!("{} bet {} -> {} ({})", game.name(), bet, payout, summary);
    Ok(Round { game, bet, payout, summary })
}

// ── Slots ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Cherry,
    Lemon,
    Bell,
    Bar,
    Seven,
}

const SYMBOLS: [Symbol; 5] = [Symbol::Cherry, Symbol::Lemon, Symbol::Bell, Symbol::Bar, Symbol::Seven];
/// Reel strip weights, same order as `SYMBOLS`.
const REEL_WEIGHTS: [u32; 5] = [6, 5, 4, 2, 1];

impl Symbol {
    pub fn name(&self) -> &'static str {
        match self {
            Symbol::Cherry => "cherry",
            Symbol::Lemon => "lemon",
            Symbol::Bell => "bell",
            Symbol::Bar => "BAR",
            Symbol::Seven => "7",
        }
    }

    /// Multiplier for three of a kind.
    fn triple_multiplier(&self) -> u32 {
        match self {
            Symbol::Cherry => 5,
            Symbol::Lemon => 8,
            Symbol::Bell => 12,
            Symbol::Bar => 25,
            Symbol::Seven => 50,
        }
    }
}

pub fn spin_reels<R: Rng>(rng: &mut R) -> [Symbol; 3] {
    // Weights are constant and non-zero.
    let dist = WeightedIndex::new(REEL_WEIGHTS).unwrap();
    [SYMBOLS[dist.sample(rng)], SYMBOLS[dist.sample(rng)], SYMBOLS[dist.sample(rng)]]
}

/// Three of a kind pays its multiplier; any two cherries pay 2x.
pub fn slot_payout(reels: [Symbol; 3], bet: u32) -> u32 {
    if reels[0] == reels[1] && reels[1] == reels[2] {
        return bet.saturating_mul(reels[0].triple_multiplier());
    }
    let cherries = reels.iter().filter(|s| **s == Symbol::Cherry).count();
    if cherries == 2 {
        bet.saturating_mul(2)
    } else {
        0
    }
}

// ── Roulette ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouletteBet {
    Straight(u8),
    Red,
    Black,
    Odd,
    Even,
}

const RED_POCKETS: [u8; 18] = [1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36];

pub fn is_red(pocket: u8) -> bool {
    RED_POCKETS.contains(&pocket)
}

/// Straight up pays 35:1, outside bets 1:1. Zero loses every outside bet.
pub fn roulette_payout(bet: RouletteBet, pocket: u8, stake: u32) -> u32 {
    let hit = match bet {
        RouletteBet::Straight(n) => n == pocket,
        _ if pocket == 0 => false,
        RouletteBet::Red => is_red(pocket),
        RouletteBet::Black => !is_red(pocket),
        RouletteBet::Odd => pocket % 2 == 1,
        RouletteBet::Even => pocket % 2 == 0,
    };
    match (hit, bet) {
        (false, _) => 0,
        (true, RouletteBet::Straight(_)) => stake.saturating_mul(36),
        (true, _) => stake.saturating_mul(2),
    }
}

// ── Blackjack ──────────────────────────────────────────────────────────────

/// Card rank 1 (ace) to 13 (king). Suits do not matter.
pub type Card = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandValue {
    pub total: u8,
    /// An ace is currently counted as 11.
    pub soft: bool,
}

pub fn hand_value(cards: &[Card]) -> HandValue {
    let mut total: u8 = 0;
    let mut aces = 0;
    for &card in cards {
        total += card.min(10);
        if card == 1 {
            aces += 1;
        }
    }
    if aces > 0 && total + 10 <= 21 {
        HandValue { total: total + 10, soft: true }
    } else {
        HandValue { total, soft: false }
    }
}

fn is_natural(cards: &[Card]) -> bool {
    cards.len() == 2 && hand_value(cards).total == 21
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlackjackOutcome {
    Natural,
    Win,
    Push,
    Lose,
    Bust,
}

impl BlackjackOutcome {
    /// Total return for `bet`, saturating at `u32::MAX`. A natural pays 3:2, rounded down.
    pub fn payout(&self, bet: u32) -> u32 {
        match self {
            BlackjackOutcome::Natural => bet.saturating_mul(2).saturating_add(bet / 2),
            BlackjackOutcome::Win => bet.saturating_mul(2),
            BlackjackOutcome::Push => bet,
            BlackjackOutcome::Lose | BlackjackOutcome::Bust => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlackjackHand {
    pub player: Vec<Card>,
    pub dealer: Vec<Card>,
}

impl BlackjackHand {
    pub fn outcome(&self) -> BlackjackOutcome {
        let player_natural = is_natural(&self.player);
        let dealer_natural = is_natural(&self.dealer);
        if player_natural || dealer_natural {
            return match (player_natural, dealer_natural) {
                (true, true) => BlackjackOutcome::Push,
                (true, false) => BlackjackOutcome::Natural,
                _ => BlackjackOutcome::Lose,
            };
        }
        let player = hand_value(&self.player).total;
        if player > 21 {
            return BlackjackOutcome::Bust;
        }
        let dealer = hand_value(&self.dealer).total;
        if dealer > 21 || player > dealer {
            BlackjackOutcome::Win
        } else if player == dealer {
            BlackjackOutcome::Push
        } else {
            BlackjackOutcome::Lose
        }
    }
}

fn shuffled_deck<R: Rng>(rng: &mut R) -> Vec<Card> {
    let mut deck: Vec<Card> = (1..=13).flat_map(|rank| [rank; 4]).collect();
    deck.shuffle(rng);
    deck
}

/// Deal and play out a hand from a fresh single deck.
///
/// The player draws to 17 like the dealer; the dealer stands on every 17,
/// soft ones included. Naturals end the hand before anyone draws.
pub fn deal_blackjack<R: Rng>(rng: &mut R) -> BlackjackHand {
    let mut deck = shuffled_deck(rng);
    // 52 cards always cover two hands that stop at 17.
    let mut draw = move || deck.pop().unwrap_or(10);
    let mut hand = BlackjackHand {
        player: vec![draw(), draw()],
        dealer: vec![draw(), draw()],
    };
    if is_natural(&hand.player) || is_natural(&hand.dealer) {
        return hand;
    }
    while hand_value(&hand.player).total < 17 {
        hand.player.push(draw());
    }
    if hand_value(&hand.player).total <= 21 {
        while hand_value(&hand.dealer).total < 17 {
            hand.dealer.push(draw());
        }
    }
    hand
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Item;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn purse(chips: u32) -> Inventory {
        Inventory { chips, ..Default::default() }
    }

    #[test]
    fn bets_over_balance_are_rejected_untouched() {
        let mut inv = purse(4);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            play(CasinoGame::Slots, 5, &mut inv, &mut rng),
            Err(CasinoError::InsufficientChips { bet: 5, balance: 4 })
        );
        assert_eq!(play(CasinoGame::Blackjack, 0, &mut inv, &mut rng), Err(CasinoError::ZeroBet));
        assert_eq!(
            play(CasinoGame::Roulette(RouletteBet::Straight(37)), 1, &mut inv, &mut rng),
            Err(CasinoError::NoSuchPocket(37))
        );
        assert_eq!(inv.chips, 4);
    }

    #[test]
    fn chips_are_conserved_across_rounds() {
        let mut inv = purse(500);
        let mut rng = StdRng::seed_from_u64(42);
        let games = [
            CasinoGame::Slots,
            CasinoGame::Roulette(RouletteBet::Red),
            CasinoGame::Roulette(RouletteBet::Straight(17)),
            CasinoGame::Blackjack,
        ];
        let mut expected: i64 = 500;
        for i in 0..200 {
            let game = games[i % games.len()];
            match play(game, 2, &mut inv, &mut rng) {
                Ok(round) => expected += round.payout as i64 - round.bet as i64,
                Err(CasinoError::InsufficientChips { .. }) => break,
                Err(e) => panic!("unexpected {e}"),
            }
            assert_eq!(inv.chips as i64, expected);
        }
    }

    #[test]
    fn slot_payout_table() {
        use Symbol::*;
        assert_eq!(slot_payout([Seven, Seven, Seven], 2), 100);
        assert_eq!(slot_payout([Cherry, Cherry, Cherry], 2), 10);
        assert_eq!(slot_payout([Cherry, Bar, Cherry], 3), 6);
        assert_eq!(slot_payout([Cherry, Bar, Bell], 3), 0);
    }

    #[test]
    fn huge_stakes_saturate_instead_of_wrapping() {
        use Symbol::*;
        assert_eq!(roulette_payout(RouletteBet::Straight(5), 5, 200_000_000), u32::MAX);
        assert_eq!(slot_payout([Seven, Seven, Seven], 100_000_000), u32::MAX);
        assert_eq!(BlackjackOutcome::Natural.payout(u32::MAX / 2), u32::MAX);
        assert_eq!(BlackjackOutcome::Win.payout(3_000_000_000), u32::MAX);

        let mut inv = purse(u32::MAX);
        let mut rng = StdRng::seed_from_u64(5);
        let stake = u32::MAX / 2;
        for _ in 0..20 {
            inv.chips = u32::MAX;
            let round = play(CasinoGame::Roulette(RouletteBet::Red), stake, &mut inv, &mut rng).unwrap();
            if round.won() {
                assert_eq!(inv.chips, u32::MAX);
            } else {
                assert_eq!(inv.chips, u32::MAX - stake);
            }
        }
        inv.add(Item::Chips(u32::MAX));
        assert_eq!(inv.chips, u32::MAX);
    }

    #[test]
    fn zero_loses_outside_bets() {
        for bet in [RouletteBet::Red, RouletteBet::Black, RouletteBet::Odd, RouletteBet::Even] {
            assert_eq!(roulette_payout(bet, 0, 10), 0);
        }
        assert_eq!(roulette_payout(RouletteBet::Straight(0), 0, 10), 360);
        assert_eq!(roulette_payout(RouletteBet::Red, 32, 10), 20);
        assert_eq!(roulette_payout(RouletteBet::Black, 32, 10), 0);
        assert_eq!(roulette_payout(RouletteBet::Even, 32, 10), 20);
    }

    #[test]
    fn aces_count_soft_then_hard() {
        assert_eq!(hand_value(&[1, 13]), HandValue { total: 21, soft: true });
        assert_eq!(hand_value(&[1, 1, 9]), HandValue { total: 21, soft: true });
        assert_eq!(hand_value(&[1, 6, 10]), HandValue { total: 17, soft: false });
        assert_eq!(hand_value(&[13, 12, 5]), HandValue { total: 25, soft: false });
    }

    #[test]
    fn blackjack_settlement() {
        let hand = |player: &[Card], dealer: &[Card]| BlackjackHand { player: player.to_vec(), dealer: dealer.to_vec() };
        assert_eq!(hand(&[1, 12], &[10, 9]).outcome(), BlackjackOutcome::Natural);
        assert_eq!(hand(&[1, 12], &[13, 1]).outcome(), BlackjackOutcome::Push);
        assert_eq!(hand(&[10, 9], &[1, 11]).outcome(), BlackjackOutcome::Lose);
        assert_eq!(hand(&[10, 5, 9], &[10, 7]).outcome(), BlackjackOutcome::Bust);
        assert_eq!(hand(&[10, 8], &[10, 6, 9]).outcome(), BlackjackOutcome::Win);
        assert_eq!(hand(&[10, 7], &[9, 8]).outcome(), BlackjackOutcome::Push);
        assert_eq!(BlackjackOutcome::Natural.payout(10), 25);
        assert_eq!(BlackjackOutcome::Natural.payout(5), 12);
    }

    #[test]
    fn dealt_hands_follow_house_rules() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..300 {
            let hand = deal_blackjack(&mut rng);
            if is_natural(&hand.player) || is_natural(&hand.dealer) {
                assert_eq!(hand.player.len(), 2);
                assert_eq!(hand.dealer.len(), 2);
                continue;
            }
            let player = hand_value(&hand.player).total;
            assert!(player >= 17);
            if player <= 21 {
                let dealer = hand_value(&hand.dealer).total;
                assert!(dealer >= 17);
                // Dealer stops on the first total of 17 or more.
                assert!(hand_value(&hand.dealer[..hand.dealer.len() - 1]).total < 17 || hand.dealer.len() == 2);
            }
        }
    }
}
