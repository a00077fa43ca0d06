//! Display values computed from a cache snapshot: rank order, prize shares, the leader
//! line and the progress bars. Everything here is pure.

use std::fmt;

use crate::client::records::{ChannelRecord, PlayerRecord};

/// Players sorted by score, highest first. Ties keep the order they had in `players`.
pub fn ranked_players(players: &[PlayerRecord]) -> Vec<&PlayerRecord> {
    let mut ranked: Vec<&PlayerRecord> = players.iter().collect();
    // `sort_by` is stable, which is what keeps tied players in fetch order.
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Share of `pool` earned by `player` given the sum of all scores.
pub fn prize_share(player: &PlayerRecord, pool: f64, total_score: u64) -> f64 {
    if total_score == 0 || player.score == 0 {
        return 0.0;
    }
    (f64::from(player.score) / total_score as f64) * pool
}

/// Render a prize amount the way the board shows it (`$12.50`).
pub fn format_prize(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Width of a player's score bar, in percent of `ceiling`.
pub fn score_bar_percent(score: u32, ceiling: u32) -> f64 {
    if ceiling == 0 {
        return 0.0;
    }
    (f64::from(score) / f64::from(ceiling) * 100.0).min(100.0)
}

/// Colour slot (1, 2 or 3) for the bar of the player at `rank_index`.
pub fn bar_slot(rank_index: usize) -> usize {
    rank_index % 3 + 1
}

/// Who is ahead, as announced above the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Standing {
    /// The board is empty.
    NoPlayers,
    /// Nobody has scored yet.
    StartScoring,
    /// One player holds the top score.
    SingleLeader {
        /// Leader name.
        name: String,
        /// Leading score.
        score: u32,
    },
    /// Every player shares the top score.
    AllTied {
        /// Shared score.
        score: u32,
    },
    /// Some, but not all, players share the top score.
    PartialTie {
        /// Tied names in rank order.
        names: Vec<String>,
        /// Shared score.
        score: u32,
    },
}

impl fmt::Display for Standing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Standing::NoPlayers => write!(f, "No players yet."),
            Standing::StartScoring => write!(f, "Start scoring to see who leads!"),
            Standing::SingleLeader { name, score } => {
                write!(f, "{name} is leading with {score} points!")
            }
            Standing::AllTied { score } => {
                write!(f, "It's a tight race! All players tied at {score}!")
            }
            Standing::PartialTie { names, score } => {
                write!(f, "Tie between {} at {score} points!", names.join(" & "))
            }
        }
    }
}

/// Classify the current standings.
///
/// Scores are unsigned, so the "negative top score" case of the classic board collapses into
/// [`Standing::StartScoring`] together with the all-zero case.
pub fn leader_announcement(players: &[PlayerRecord]) -> Standing {
    let ranked = ranked_players(players);
    let Some(top) = ranked.first().map(|player| player.score) else {
        return Standing::NoPlayers;
    };

    if top == 0 {
        return Standing::StartScoring;
    }

    let leaders: Vec<&PlayerRecord> = ranked
        .iter()
        .copied()
        .take_while(|player| player.score == top)
        .collect();

    match leaders.as_slice() {
        [leader] => Standing::SingleLeader {
            name: leader.name.clone(),
            score: top,
        },
        _ if leaders.len() == players.len() => Standing::AllTied { score: top },
        _ => Standing::PartialTie {
            names: leaders.iter().map(|player| player.name.clone()).collect(),
            score: top,
        },
    }
}

/// Colour band of a channel progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Below half of the ceiling.
    Low,
    /// Between half and the ceiling.
    Mid,
    /// Ceiling reached.
    Full,
}

impl Tier {
    fn for_percent(percent: f64) -> Self {
        if percent >= 100.0 {
            Tier::Full
        } else if percent >= 50.0 {
            Tier::Mid
        } else {
            Tier::Low
        }
    }

    /// Lowercase label used in rendering.
    pub fn label(self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Mid => "mid",
            Tier::Full => "full",
        }
    }
}

/// Progress of a channel towards the ceiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelProgress {
    /// Displayed count: the stored count minus one. May be negative.
    pub raw_count: i64,
    /// Percentage of the ceiling, clamped to `[0, 100]`.
    pub percent: f64,
    /// Colour band for `percent`.
    pub tier: Tier,
}

/// Offset subtracted from the stored message count before display.
pub const CHANNEL_COUNT_OFFSET: i64 = 1;

/// Compute the progress bar of a channel against `ceiling`.
pub fn channel_progress(channel: &ChannelRecord, ceiling: i64) -> ChannelProgress {
    let raw_count = channel.scheduled_messages_count - CHANNEL_COUNT_OFFSET;
    let percent = if ceiling > 0 {
        (raw_count as f64 / ceiling as f64 * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    ChannelProgress {
        raw_count,
        percent,
        tier: Tier::for_percent(percent),
    }
}
