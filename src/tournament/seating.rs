use crate::TableId;
use crate::table::command::TakeRule;
use rand::seq::SliceRandom;

/// Deal registrants into balanced tables: ceil(n / seats) tables,
/// sizes within one of each other, players and seat numbers drawn at
/// random. Returns per-table lists of (seat_number, player).
pub fn partition<T>(mut players: Vec<T>, seats_per_table: u8) -> Vec<Vec<(u8, T)>> {
    let ref mut rng = rand::rng();
    players.shuffle(rng);
    let n = players.len();
    let tables = n.div_ceil(seats_per_table as usize).max(1);
    let base = n / tables;
    let extra = n % tables;
    let mut assigned = Vec::with_capacity(tables);
    let mut players = players.into_iter();
    for t in 0..tables {
        let size = base + if t < extra { 1 } else { 0 };
        let mut numbers = (1..=seats_per_table).collect::<Vec<u8>>();
        numbers.shuffle(rng);
        let mut seats = numbers
            .into_iter()
            .take(size)
            .zip(players.by_ref())
            .collect::<Vec<(u8, T)>>();
        seats.sort_by_key(|(number, _)| *number);
        assigned.push(seats);
    }
    assigned
}

/// A table as the controller mirrors it while planning moves.
#[derive(Debug, Clone, Copy)]
pub struct TableView {
    pub id: TableId,
    pub number: u32,
    pub count: usize,
    pub busy: bool,
}

/// One player relocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePlan {
    pub from: TableId,
    pub to: TableId,
    pub rule: TakeRule,
}

/// The next single consolidation move, or None when tables are as
/// balanced as the rules ask for. Mid-hand tables neither donate nor
/// receive; a move involving one is deferred to the next boundary.
pub fn next_move(tables: &[TableView], seats_per_table: u8) -> Option<MovePlan> {
    let open = tables.iter().filter(|t| t.count > 0).collect::<Vec<_>>();
    let remaining: usize = open.iter().map(|t| t.count).sum();
    if remaining < 2 || open.len() < 2 {
        return None;
    }
    let desired = remaining.div_ceil(seats_per_table as usize);

    // more tables than needed: break the smallest, largest number first
    if open.len() > desired {
        let breaking = open
            .iter()
            .min_by_key(|t| (t.count, std::cmp::Reverse(t.number)))
            .copied()?;
        let recipient = open
            .iter()
            .filter(|t| t.id != breaking.id)
            .filter(|t| t.count < seats_per_table as usize)
            .min_by_key(|t| (t.count, t.number))
            .copied()?;
        if breaking.busy || recipient.busy {
            return None;
        }
        return Some(MovePlan {
            from: breaking.id,
            to: recipient.id,
            rule: TakeRule::Any,
        });
    }

    // rebalance when two tables differ by more than one player
    let largest = open.iter().max_by_key(|t| (t.count, std::cmp::Reverse(t.number))).copied()?;
    let smallest = open
        .iter()
        .filter(|t| t.count < seats_per_table as usize)
        .min_by_key(|t| (t.count, t.number))
        .copied()?;
    if largest.count > smallest.count + 1 {
        if largest.busy || smallest.busy {
            return None;
        }
        return Some(MovePlan {
            from: largest.id,
            to: smallest.id,
            rule: TakeRule::BigBlindOut,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(id: TableId, number: u32, count: usize) -> TableView {
        TableView {
            id,
            number,
            count,
            busy: false,
        }
    }

    #[test]
    fn partition_balances_within_one() {
        for n in 2..=40usize {
            let players = (0..n as u64).collect::<Vec<u64>>();
            let tables = partition(players, 6);
            assert_eq!(tables.len(), n.div_ceil(6));
            let sizes = tables.iter().map(|t| t.len()).collect::<Vec<_>>();
            let max = sizes.iter().max().unwrap();
            let min = sizes.iter().min().unwrap();
            assert!(max - min <= 1, "n={} sizes={:?}", n, sizes);
            assert_eq!(sizes.iter().sum::<usize>(), n);
        }
    }

    #[test]
    fn partition_seats_are_unique_and_in_range() {
        let tables = partition((0..13u64).collect::<Vec<u64>>(), 5);
        for table in tables {
            let mut numbers = table.iter().map(|(n, _)| *n).collect::<Vec<u8>>();
            numbers.sort_unstable();
            let deduped = numbers.len();
            numbers.dedup();
            assert_eq!(numbers.len(), deduped);
            assert!(numbers.iter().all(|n| (1..=5).contains(n)));
        }
    }

    #[test]
    fn balanced_tables_need_no_move() {
        // 5 vs 6 is within tolerance
        assert_eq!(next_move(&[view(1, 1, 5), view(2, 2, 6)], 6), None);
    }

    #[test]
    fn imbalance_above_one_moves_big_blind_out() {
        let plan = next_move(&[view(1, 1, 4), view(2, 2, 6)], 6).unwrap();
        assert_eq!(plan.from, 2);
        assert_eq!(plan.to, 1);
        assert_eq!(plan.rule, TakeRule::BigBlindOut);
    }

    #[test]
    fn surplus_table_breaks_smallest_largest_number_first() {
        let tables = [view(1, 1, 2), view(2, 2, 2), view(3, 3, 4)];
        // 8 players fit on two tables of 6
        let plan = next_move(&tables, 6).unwrap();
        assert_eq!(plan.from, 2);
        assert_eq!(plan.rule, TakeRule::Any);
        assert_eq!(plan.to, 1);
    }

    #[test]
    fn busy_tables_defer_consolidation() {
        let tables = [
            TableView { id: 1, number: 1, count: 4, busy: false },
            TableView { id: 2, number: 2, count: 6, busy: true },
        ];
        assert_eq!(next_move(&tables, 6), None);
    }

    #[test]
    fn lone_player_table_gets_refilled() {
        let plan = next_move(&[view(1, 1, 6), view(2, 2, 1)], 6).unwrap();
        assert_eq!(plan.from, 1);
        assert_eq!(plan.to, 2);
    }

    #[test]
    fn moves_converge_to_balance() {
        let mut tables = vec![view(1, 1, 6), view(2, 2, 6), view(3, 3, 2)];
        let mut steps = 0;
        while let Some(plan) = next_move(&tables, 6) {
            let from = tables.iter_mut().find(|t| t.id == plan.from).unwrap();
            from.count -= 1;
            let to = tables.iter_mut().find(|t| t.id == plan.to).unwrap();
            to.count += 1;
            steps += 1;
            assert!(steps < 20, "consolidation does not converge");
        }
        let counts = tables
            .iter()
            .map(|t| t.count)
            .filter(|&c| c > 0)
            .collect::<Vec<_>>();
        let max = counts.iter().max().unwrap();
        let min = counts.iter().min().unwrap();
        assert!(max - min <= 1, "{:?}", counts);
    }
}
