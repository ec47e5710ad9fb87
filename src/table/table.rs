use super::command::TakeRule;
use super::event::Event;
use super::event::Winner;
use crate::Chips;
use crate::TableId;
use crate::TournamentId;
use crate::UserId;
use crate::cards::deck::Deck;
use crate::cards::hand::Hand;
use crate::cards::street::Street;
use crate::cards::strength::Strength;
use crate::error::{Error, Result};
use crate::gameplay::action::Action;
use crate::gameplay::deal::Deal;
use crate::gameplay::rotation::Rotation;
use crate::gameplay::round::Round;
use crate::gameplay::seat::Seat;
use crate::gameplay::showdown::{Payout, Showdown};
use std::collections::BTreeMap;

/// One table's hand machine: seats, stacks, the in-flight deal, and
/// the blinds currently in force. Purely synchronous; the actor wraps
/// it with a mailbox, timers and broadcast.
#[derive(Debug)]
pub struct Table {
    id: TableId,
    tournament: TournamentId,
    number: u32,
    capacity: u8,
    seats: BTreeMap<u8, Seat>,
    blinds: (Chips, Chips),
    level: usize,
    deal: Option<Deal>,
    dealer: Option<u8>,
    prev_bb: Option<u8>,
    hands: u64,
}

impl Table {
    pub fn new(
        id: TableId,
        tournament: TournamentId,
        number: u32,
        capacity: u8,
        blinds: (Chips, Chips),
        level: usize,
    ) -> Self {
        Self {
            id,
            tournament,
            number,
            capacity,
            seats: BTreeMap::new(),
            blinds,
            level,
            deal: None,
            dealer: None,
            prev_bb: None,
            hands: 0,
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }
    pub fn tournament(&self) -> TournamentId {
        self.tournament
    }
    pub fn number(&self) -> u32 {
        self.number
    }
    pub fn level(&self) -> usize {
        self.level
    }
    pub fn blinds(&self) -> (Chips, Chips) {
        self.blinds
    }
    pub fn seats(&self) -> &BTreeMap<u8, Seat> {
        &self.seats
    }
    pub fn deal(&self) -> Option<&Deal> {
        self.deal.as_ref()
    }
    pub fn is_dealing(&self) -> bool {
        self.deal.is_some()
    }
    pub fn hands_dealt(&self) -> u64 {
        self.hands
    }

    /// seats that would be dealt into the next hand
    pub fn dealt_in(&self) -> usize {
        self.seats.values().filter(|s| s.is_dealt_in()).count()
    }
    pub fn can_deal(&self) -> bool {
        self.deal.is_none() && self.dealt_in() >= 2
    }

    /// blinds for the NEXT hand; never touches a hand in flight
    pub fn set_blinds(&mut self, level: usize, blinds: (Chips, Chips)) {
        self.level = level;
        self.blinds = blinds;
    }

    /// the seat, user and bot flag whose turn it is
    pub fn turn(&self) -> Option<(u8, UserId, bool)> {
        let seat = self.deal.as_ref()?.turn?;
        let seat = self.seats.get(&seat)?;
        Some((seat.number(), seat.user(), seat.is_bot()))
    }

    pub fn seat_by_user(&self, user: UserId) -> Option<&Seat> {
        self.seats.values().find(|s| s.user() == user)
    }

    /// seat a player before the tournament starts
    pub fn seat_player(&mut self, seat: Seat) -> Result<()> {
        if self.seats.contains_key(&seat.number()) {
            return Err(Error::InvalidState(format!(
                "seat {} is taken",
                seat.number()
            )));
        }
        if seat.number() == 0 || seat.number() > self.capacity {
            return Err(Error::InvalidState(format!(
                "seat {} is out of range",
                seat.number()
            )));
        }
        self.seats.insert(seat.number(), seat);
        Ok(())
    }

    /// consolidation inbound: lowest vacant seat number, between hands only
    pub fn add_seat(&mut self, mut seat: Seat) -> Result<u8> {
        if self.deal.is_some() {
            return Err(Error::InvalidState("table is mid-hand".into()));
        }
        let number = (1..=self.capacity)
            .find(|n| !self.seats.contains_key(n))
            .ok_or_else(|| Error::InvalidState("table is full".into()))?;
        seat.renumber(number);
        self.seats.insert(number, seat);
        Ok(number)
    }

    /// consolidation outbound, between hands only
    pub fn take_seat(&mut self, rule: TakeRule) -> Option<Seat> {
        if self.deal.is_some() {
            return None;
        }
        let rotation = self.rotation();
        let number = match rule {
            TakeRule::BigBlindOut => self
                .prev_bb
                .and_then(|bb| rotation.clockwise(bb))
                .or_else(|| rotation.clockwise(u8::MAX)),
            TakeRule::Any => rotation.clockwise(u8::MAX),
        }?;
        self.seats.remove(&number)
    }

    fn rotation(&self) -> Rotation {
        Rotation::new(
            self.seats
                .values()
                .filter(|s| s.is_dealt_in())
                .map(|s| s.number()),
        )
    }

    /// deal the next hand with a fresh shuffle; dealer rotates
    /// clockwise, or is drawn at random for the table's first hand
    pub fn start_hand(&mut self) -> Result<Vec<Event>> {
        let rotation = self.rotation();
        let dealer = match self.dealer {
            Some(prev) => rotation
                .clockwise(prev)
                .ok_or_else(|| Error::InvalidState("no seats to deal".into()))?,
            None => {
                let numbers = self
                    .seats
                    .values()
                    .filter(|s| s.is_dealt_in())
                    .map(|s| s.number())
                    .collect::<Vec<u8>>();
                *numbers
                    .get(rand::random_range(0..numbers.len().max(1)))
                    .ok_or_else(|| Error::InvalidState("no seats to deal".into()))?
            }
        };
        self.start_hand_from(Deck::shuffled(), dealer)
    }

    /// deal with an explicit deck and dealer
    pub fn start_hand_from(&mut self, mut deck: Deck, dealer: u8) -> Result<Vec<Event>> {
        if self.deal.is_some() {
            return Err(Error::InvalidState("hand already in progress".into()));
        }
        let rotation = self.rotation();
        if rotation.len() < 2 {
            return Err(Error::InvalidState("fewer than two stacks to deal".into()));
        }
        if !rotation.contains(dealer) {
            return Err(Error::InvalidState(format!("dealer seat {} is not live", dealer)));
        }

        // heads-up: the dealer posts the small blind
        let (sb, bb) = if rotation.len() == 2 {
            let other = rotation.clockwise(dealer).expect("two seats");
            (dealer, other)
        } else {
            let sb = rotation.clockwise(dealer).expect("three seats");
            let bb = rotation.clockwise(sb).expect("three seats");
            (sb, bb)
        };

        // deal order runs clockwise from the small blind
        let mut order = vec![sb];
        while order.len() < rotation.len() {
            let next = rotation.clockwise(*order.last().expect("non-empty")).expect("ring");
            order.push(next);
        }
        let holes = deck.holes(order.len())?;

        let mut round = Round::new(self.blinds.0, self.blinds.1);
        let sb_stack = self.seats.get(&sb).expect("seated").chips();
        let bb_stack = self.seats.get(&bb).expect("seated").chips();
        let (posted_sb, posted_bb) = round.post_blinds((sb, sb_stack), (bb, bb_stack));

        let mut deal = Deal::new(self.hands + 1, deck, round, dealer, sb, bb);
        deal.players = order.clone();
        for (&number, seat) in self.seats.iter() {
            if order.contains(&number) {
                deal.starting.insert(number, seat.chips());
            }
        }
        for (number, hole) in order.iter().zip(holes) {
            self.seats
                .get_mut(number)
                .expect("seated")
                .reset(Some(hole));
        }
        for (_, seat) in self.seats.iter_mut().filter(|(n, _)| !order.contains(n)) {
            seat.reset(None);
        }
        self.seats.get_mut(&sb).expect("seated").pay(posted_sb);
        self.seats.get_mut(&bb).expect("seated").pay(posted_bb);
        deal.commit(sb, posted_sb);
        deal.commit(bb, posted_bb);
        deal.record(sb, "SMALL_BLIND", posted_sb, false);
        deal.record(bb, "BIG_BLIND", posted_bb, false);
        log::debug!(
            "table {} hand {} dealer {} sb {} bb {}",
            self.number,
            deal.number,
            dealer,
            sb,
            bb
        );
        self.deal = Some(deal);

        let mut events = Vec::new();
        match self.resolve(&mut events, bb) {
            Ok(()) => Ok(events),
            Err(Error::Fatal(reason)) => {
                self.abort(reason, &mut events);
                Ok(events)
            }
            Err(e) => Err(e),
        }
    }

    /// a player action, validated for turn and legality
    pub fn act(&mut self, user: UserId, action: Action) -> Result<Vec<Event>> {
        let deal = self
            .deal
            .as_ref()
            .ok_or_else(|| Error::InvalidState("no hand in progress".into()))?;
        let number = deal.turn.ok_or(Error::OutOfTurn)?;
        if self.seats.get(&number).map(|s| s.user()) != Some(user) {
            return Err(Error::OutOfTurn);
        }
        self.apply(number, action, false)
    }

    /// turn clock expiry: check when free, fold otherwise
    pub fn act_timeout(&mut self) -> Result<Vec<Event>> {
        let deal = self
            .deal
            .as_ref()
            .ok_or_else(|| Error::InvalidState("no hand in progress".into()))?;
        let number = deal.turn.ok_or(Error::OutOfTurn)?;
        let action = match deal.round.owed(number) {
            0 => Action::Check,
            _ => Action::Fold,
        };
        self.apply(number, action, true)
    }

    /// bot policy decision for the seat on the clock
    pub fn act_bot(&mut self, action: Action) -> Result<Vec<Event>> {
        let deal = self
            .deal
            .as_ref()
            .ok_or_else(|| Error::InvalidState("no hand in progress".into()))?;
        let number = deal.turn.ok_or(Error::OutOfTurn)?;
        self.apply(number, action, true)
    }

    /// the acting seat's view for the bot policy
    pub fn bot_view(&self) -> Option<super::bot::BotView> {
        let deal = self.deal.as_ref()?;
        let number = deal.turn?;
        let seat = self.seats.get(&number)?;
        let street_chips = deal
            .players
            .iter()
            .map(|&n| deal.round.contribution(n))
            .sum::<Chips>();
        Some(super::bot::BotView {
            current_bet: deal.round.current_bet(),
            contribution: deal.round.contribution(number),
            owed: deal.round.owed(number),
            minimum_raise: deal.round.minimum_raise(),
            pot: deal.pot + street_chips,
            stack: seat.chips(),
        })
    }

    fn apply(&mut self, number: u8, action: Action, auto: bool) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        match self.apply_inner(number, action, auto, &mut events) {
            Ok(()) => Ok(events),
            Err(Error::Fatal(reason)) => {
                self.abort(reason, &mut events);
                Ok(events)
            }
            Err(e) => Err(e),
        }
    }

    fn apply_inner(
        &mut self,
        number: u8,
        action: Action,
        auto: bool,
        events: &mut Vec<Event>,
    ) -> Result<()> {
        let stack = self.seats.get(&number).expect("turn seat exists").chips();
        let deal = self.deal.as_mut().expect("applying into an open deal");
        // a short all-in does not reopen the action: a seat that has
        // already acted this round may call or fold, never raise
        if matches!(action, Action::Raise(_) | Action::Bet(_)) && deal.has_acted(number) {
            return Err(Error::InvalidAction("betting is not reopened".into()));
        }
        let (delta, reopened) = match action {
            Action::Fold => (0, false),
            Action::Check => (deal.round.check(number)?, false),
            Action::Call => (deal.round.call(number, stack)?, false),
            Action::Bet(amount) => {
                let commit = deal.round.bet(number, amount, stack)?;
                (commit.delta, commit.reopened)
            }
            Action::Raise(total) => {
                let commit = deal.round.raise(number, total, stack)?;
                (commit.delta, commit.reopened)
            }
            Action::AllIn => {
                let commit = deal.round.all_in(number, stack)?;
                (commit.delta, commit.reopened)
            }
        };
        if reopened {
            deal.reopen(number);
        } else {
            deal.mark_acted(number);
        }
        deal.commit(number, delta);
        deal.record(number, action.label(), delta, auto);
        let seat = self.seats.get_mut(&number).expect("turn seat exists");
        seat.pay(delta);
        if action == Action::Fold {
            seat.fold();
        }
        seat.record(action);
        events.push(Event::Applied {
            seat: number,
            user: seat.user(),
            action,
            amount: delta,
            auto,
        });
        self.resolve(events, number)
    }

    /// drive the hand forward until it needs another decision or ends
    fn resolve(&mut self, events: &mut Vec<Event>, mut from: u8) -> Result<()> {
        loop {
            if self.live_players().len() == 1 {
                return self.walkover(events);
            }
            if !self.round_complete() {
                let next = self
                    .next_to_act(from)
                    .ok_or_else(|| Error::Fatal("open round with nobody to act".into()))?;
                let deal = self.deal.as_mut().expect("open deal");
                deal.turn = Some(next);
                let seat = self.seats.get(&next).expect("seated");
                events.push(Event::TurnBegin {
                    seat: next,
                    user: seat.user(),
                    bot: seat.is_bot(),
                });
                return Ok(());
            }
            let deal = self.deal.as_mut().expect("open deal");
            deal.collect();
            if deal.street == Street::River {
                return self.showdown(events);
            }
            let (street, cards) = deal.advance()?;
            from = deal.dealer;
            events.push(Event::Dealt { street, cards });
        }
    }

    fn live_players(&self) -> Vec<u8> {
        self.deal
            .as_ref()
            .map(|deal| {
                deal.players
                    .iter()
                    .filter(|n| self.seats.get(n).map(|s| s.is_live()).unwrap_or(false))
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn actionable(&self) -> Vec<u8> {
        self.deal
            .as_ref()
            .map(|deal| {
                deal.players
                    .iter()
                    .filter(|n| self.seats.get(n).map(|s| s.can_act()).unwrap_or(false))
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// the street is closed when no actionable seat owes chips and
    /// either everyone actionable has acted since the last full raise
    /// or at most one seat can still act at all
    fn round_complete(&self) -> bool {
        let deal = self.deal.as_ref().expect("open deal");
        let actionable = self.actionable();
        if actionable.iter().any(|&n| deal.round.owed(n) > 0) {
            return false;
        }
        actionable.len() <= 1 || actionable.iter().all(|&n| deal.has_acted(n))
    }

    /// first seat clockwise from `from` that can act and either has
    /// not acted this round or is short of the current bet
    fn next_to_act(&self, from: u8) -> Option<u8> {
        let deal = self.deal.as_ref().expect("open deal");
        let rotation = Rotation::new(deal.players.iter().copied());
        rotation.clockwise_find(from, |n| {
            self.seats.get(&n).map(|s| s.can_act()).unwrap_or(false)
                && (!deal.has_acted(n) || deal.round.owed(n) > 0)
        })
    }

    /// everyone folded to one seat: ship it without a showdown
    fn walkover(&mut self, events: &mut Vec<Event>) -> Result<()> {
        let deal = self.deal.as_mut().expect("open deal");
        deal.collect();
        let winner = *self
            .live_players()
            .first()
            .expect("exactly one live player");
        let deal = self.deal.as_ref().expect("open deal");
        let pot = deal.pot;
        let board = deal.board.cards().to_vec();
        let history = deal.history.clone();
        let seat = self.seats.get_mut(&winner).expect("seated");
        seat.win(pot);
        events.push(Event::Settled {
            pot,
            winners: vec![Winner {
                user: seat.user(),
                amount: pot,
                category: None,
            }],
            reveals: Vec::new(),
            board,
            history,
        });
        self.finish(events);
        Ok(())
    }

    /// evaluate the live hands and carve the pot into side pots
    fn showdown(&mut self, events: &mut Vec<Event>) -> Result<()> {
        let deal = self.deal.as_ref().expect("open deal");
        let rotation = Rotation::new(deal.players.iter().copied());
        let board = Hand::from(&deal.board);
        let mut payouts = Vec::with_capacity(deal.players.len());
        for &number in deal.players.iter() {
            let seat = self.seats.get(&number).expect("seated");
            let strength = match seat.is_live() {
                false => None,
                true => {
                    let hole = seat
                        .hole()
                        .ok_or_else(|| Error::Fatal("live seat without cards".into()))?;
                    Some(
                        Strength::try_from(Hand::add(Hand::from(hole), board))
                            .map_err(|e| Error::Fatal(e.to_string()))?,
                    )
                }
            };
            payouts.push(Payout::from((
                number,
                deal.committed(number),
                !seat.is_live(),
                strength,
            )));
        }
        payouts.sort_by_key(|p| rotation.distance(deal.dealer, p.seat));
        let settled = Showdown::from(payouts).settle();

        let pot = deal.pot;
        let board = deal.board.cards().to_vec();
        let history = deal.history.clone();
        let reveals = deal
            .players
            .iter()
            .filter_map(|n| self.seats.get(n))
            .filter(|s| s.is_live())
            .filter_map(|s| s.hole().map(|hole| (s.user(), hole)))
            .collect::<Vec<_>>();
        let mut winners = Vec::new();
        for payout in settled.iter() {
            let seat = self.seats.get_mut(&payout.seat).expect("seated");
            seat.win(payout.reward);
            if payout.reward > 0 {
                winners.push(Winner {
                    user: seat.user(),
                    amount: payout.reward,
                    category: payout.strength.map(|s| s.value().label()),
                });
            }
        }
        events.push(Event::Settled {
            pot,
            winners,
            reveals,
            board,
            history,
        });
        self.finish(events);
        Ok(())
    }

    /// tear the deal down: rotate markers, eliminate busted stacks
    fn finish(&mut self, events: &mut Vec<Event>) {
        let deal = self.deal.take().expect("open deal");
        let before = deal.starting.values().sum::<Chips>();
        let after = deal
            .players
            .iter()
            .filter_map(|n| self.seats.get(n))
            .map(|s| s.chips())
            .sum::<Chips>();
        if before != after {
            log::error!(
                "table {} hand {}: chip supply drifted {} -> {}",
                self.number,
                deal.number,
                before,
                after
            );
        }
        let mut busted = deal
            .players
            .iter()
            .filter(|n| self.seats.get(n).map(|s| s.chips() == 0).unwrap_or(false))
            .map(|&n| (deal.starting.get(&n).copied().unwrap_or(0), n))
            .collect::<Vec<(Chips, u8)>>();
        // shorter starting stacks finish lower
        busted.sort_unstable();
        for &(_, number) in busted.iter() {
            self.seats.get_mut(&number).expect("seated").eliminate();
        }
        if !busted.is_empty() {
            events.push(Event::Eliminated {
                order: busted
                    .iter()
                    .map(|&(_, n)| self.seats.get(&n).expect("seated").user())
                    .collect(),
            });
        }
        self.dealer = Some(deal.dealer);
        self.prev_bb = Some(deal.bb);
        self.hands = deal.number;
    }

    /// invariant violation mid-hand: void the deal, return every stake
    fn abort(&mut self, reason: String, events: &mut Vec<Event>) {
        log::error!("table {}: hand aborted: {}", self.number, reason);
        if let Some(deal) = self.deal.take() {
            for &number in deal.players.iter() {
                if let Some(seat) = self.seats.get_mut(&number) {
                    seat.win(deal.committed(number));
                    seat.reset(None);
                }
            }
            self.dealer = Some(deal.dealer);
            self.prev_bb = Some(deal.bb);
            self.hands = deal.number;
        }
        events.push(Event::Aborted { reason });
    }
}
