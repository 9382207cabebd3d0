use chrono::{DateTime, Utc};

/// USD changes smaller than this do not move the "previous" reference,
/// so a flickering last decimal does not reset the delta display.
pub const SIGNIFICANT_CHANGE_USD: f64 = 0.0001;

/// One poll's resolved balance/price/value triple.
///
/// `usd_value` is always recomputed from its inputs; it is never stored
/// independently of them.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSnapshot {
    pub balance: f64,
    pub price: f64,
    pub usd_value: f64,
    pub timestamp: DateTime<Utc>,
}

impl TokenSnapshot {
    pub fn new(balance: f64, price: f64) -> Self {
        Self {
            balance,
            price,
            usd_value: balance * price,
            timestamp: Utc::now(),
        }
    }
}

/// Direction of a value move, for the delta indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

/// Percentage move between two snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChange {
    pub direction: Direction,
    pub percentage: f64,
}

impl ValueChange {
    /// Delta from `previous` to `current`. A zero-valued previous snapshot
    /// yields a neutral change rather than a division by zero.
    pub fn between(previous: &TokenSnapshot, current: &TokenSnapshot) -> Self {
        if previous.usd_value == 0.0 {
            return Self { direction: Direction::Neutral, percentage: 0.0 };
        }

        let percentage =
            (current.usd_value - previous.usd_value) / previous.usd_value * 100.0;

        let direction = if percentage > 0.0 {
            Direction::Up
        } else if percentage < 0.0 {
            Direction::Down
        } else {
            Direction::Neutral
        };

        Self { direction, percentage }
    }

    pub fn is_neutral(&self) -> bool {
        self.direction == Direction::Neutral
    }
}

/// Reference snapshots kept across polls for delta display.
///
/// Only two snapshots survive a poll: the last significantly different one
/// ("previous") and the first of the session. Everything else is discarded.
#[derive(Debug, Default)]
pub struct ValueHistory {
    previous: Option<TokenSnapshot>,
    session_start: Option<TokenSnapshot>,
}

impl ValueHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a snapshot and return the delta against the previous
    /// reference. The first observation establishes both references and has
    /// no delta.
    pub fn observe(&mut self, snapshot: &TokenSnapshot) -> Option<ValueChange> {
        let Some(previous) = &self.previous else {
            self.previous = Some(snapshot.clone());
            self.session_start = Some(snapshot.clone());
            return None;
        };

        let change = ValueChange::between(previous, snapshot);

        if (snapshot.usd_value - previous.usd_value).abs() > SIGNIFICANT_CHANGE_USD {
            self.previous = Some(snapshot.clone());
        }

        Some(change)
    }

    /// Delta against the session-start reference.
    pub fn since_start(&self, current: &TokenSnapshot) -> Option<ValueChange> {
        self.session_start
            .as_ref()
            .map(|start| ValueChange::between(start, current))
    }

    pub fn previous(&self) -> Option<&TokenSnapshot> {
        self.previous.as_ref()
    }
}

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone)]
pub struct ValueUpdate {
    pub snapshot: TokenSnapshot,
    pub change: Option<ValueChange>,
    pub since_start: Option<ValueChange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usd_value_is_product_of_balance_and_price() {
        let snapshot = TokenSnapshot::new(1_234_567.89, 0.052);
        assert_eq!(snapshot.usd_value, 1_234_567.89 * 0.052);
    }

    #[test]
    fn zero_balance_has_zero_value() {
        let snapshot = TokenSnapshot::new(0.0, 0.052);
        assert_eq!(snapshot.usd_value, 0.0);
    }

    #[test]
    fn change_percentage_matches_formula() {
        let previous = TokenSnapshot::new(100.0, 1.0);
        let current = TokenSnapshot::new(110.0, 1.0);
        let change = ValueChange::between(&previous, &current);
        assert_eq!(change.direction, Direction::Up);
        assert!((change.percentage - 10.0).abs() < 1e-9);
    }

    #[test]
    fn falling_value_points_down() {
        let previous = TokenSnapshot::new(100.0, 1.0);
        let current = TokenSnapshot::new(90.0, 1.0);
        let change = ValueChange::between(&previous, &current);
        assert_eq!(change.direction, Direction::Down);
        assert!((change.percentage + 10.0).abs() < 1e-9);
    }

    #[test]
    fn zero_previous_value_is_neutral_not_a_division() {
        let previous = TokenSnapshot::new(0.0, 0.0);
        let current = TokenSnapshot::new(10.0, 1.0);
        let change = ValueChange::between(&previous, &current);
        assert_eq!(change.direction, Direction::Neutral);
        assert_eq!(change.percentage, 0.0);
    }

    #[test]
    fn first_observation_has_no_delta() {
        let mut history = ValueHistory::new();
        let snapshot = TokenSnapshot::new(100.0, 1.0);
        assert!(history.observe(&snapshot).is_none());
        assert!(history.previous().is_some());
    }

    #[test]
    fn insignificant_move_keeps_previous_reference() {
        let mut history = ValueHistory::new();
        let first = TokenSnapshot::new(100.0, 1.0);
        history.observe(&first);

        // 0.00005 USD move is below the threshold
        let second = TokenSnapshot::new(100.00005, 1.0);
        history.observe(&second);

        assert_eq!(history.previous().unwrap().usd_value, 100.0);
    }

    #[test]
    fn significant_move_advances_previous_reference() {
        let mut history = ValueHistory::new();
        history.observe(&TokenSnapshot::new(100.0, 1.0));
        history.observe(&TokenSnapshot::new(105.0, 1.0));

        assert_eq!(history.previous().unwrap().usd_value, 105.0);
    }

    #[test]
    fn since_start_ignores_previous_updates() {
        let mut history = ValueHistory::new();
        history.observe(&TokenSnapshot::new(100.0, 1.0));
        history.observe(&TokenSnapshot::new(105.0, 1.0));

        let current = TokenSnapshot::new(110.0, 1.0);
        let change = history.since_start(&current).unwrap();
        assert!((change.percentage - 10.0).abs() < 1e-9);
    }
}
