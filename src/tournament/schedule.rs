use crate::Chips;
use crate::error::{Error, Result};

/// One rung of the blind ladder. A level without a duration is
/// terminal: play continues at it indefinitely.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlindLevel {
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub duration_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_after_seconds: Option<u64>,
}

impl From<(Chips, Chips, Option<u64>)> for BlindLevel {
    fn from((small_blind, big_blind, duration_seconds): (Chips, Chips, Option<u64>)) -> Self {
        Self {
            small_blind,
            big_blind,
            duration_seconds,
            break_after_seconds: None,
        }
    }
}

/// Ordered blind levels. Breaks are elapsed wall-clock only: they
/// stretch a level's span, play never pauses.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlindSchedule(Vec<BlindLevel>);

impl BlindSchedule {
    pub fn new(levels: Vec<BlindLevel>) -> Result<Self> {
        let schedule = Self(levels);
        schedule.validate()?;
        Ok(schedule)
    }

    fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(Error::InvalidState("blind schedule is empty".into()));
        }
        for (i, level) in self.0.iter().enumerate() {
            if level.small_blind >= level.big_blind {
                return Err(Error::InvalidState(format!(
                    "level {}: small blind {} must be below big blind {}",
                    i, level.small_blind, level.big_blind
                )));
            }
            if level.duration_seconds.is_none() && i + 1 != self.0.len() {
                return Err(Error::InvalidState(format!(
                    "level {}: only the last level may be terminal",
                    i
                )));
            }
        }
        for pair in self.0.windows(2) {
            if pair[1].big_blind < pair[0].big_blind {
                return Err(Error::InvalidState(
                    "big blinds must be non-decreasing".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn levels(&self) -> &[BlindLevel] {
        &self.0
    }

    pub fn level(&self, index: usize) -> &BlindLevel {
        self.0.get(index).unwrap_or_else(|| self.0.last().expect("non-empty"))
    }

    pub fn blinds(&self, index: usize) -> (Chips, Chips) {
        let level = self.level(index);
        (level.small_blind, level.big_blind)
    }

    /// index of the level in force after `elapsed` seconds of play:
    /// the first level whose cumulative span (durations plus breaks)
    /// strictly exceeds the elapsed time, else the terminal level
    pub fn level_at(&self, elapsed: u64) -> usize {
        let mut cumulative = 0u64;
        for (i, level) in self.0.iter().enumerate() {
            match level.duration_seconds {
                None => return i,
                Some(duration) => {
                    cumulative += duration + level.break_after_seconds.unwrap_or(0);
                    if cumulative > elapsed {
                        return i;
                    }
                }
            }
        }
        self.0.len() - 1
    }
}
