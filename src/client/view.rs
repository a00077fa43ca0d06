//! Render model for the board: everything a presentation layer needs, already derived from a
//! session snapshot.

use std::fmt;

use tokio::time::Instant;

use crate::client::{
    derive::{
        Standing, Tier, bar_slot, channel_progress, format_prize, leader_announcement,
        prize_share, ranked_players, score_bar_percent,
    },
    feedback::{Feedback, FeedbackKind, FeedbackTarget},
    session::Session,
};

/// Display constants used while deriving a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardSettings {
    /// Reward pool split between players by score.
    pub prize_pool: f64,
    /// Score at which a player's bar is full.
    pub score_bar_ceiling: u32,
    /// Message count at which a channel bar is full.
    pub channel_ceiling: i64,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            prize_pool: 50.0,
            score_bar_ceiling: 100,
            channel_ceiling: 100,
        }
    }
}

/// One player card.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCard {
    /// 1-based position in the ranking.
    pub rank: usize,
    /// Player identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Avatar URL.
    pub avatar_url: String,
    /// Current score.
    pub score: u32,
    /// Prize share, formatted (`$12.50`).
    pub prize: String,
    /// Bar width in percent.
    pub bar_percent: f64,
    /// Bar colour slot (1 to 3).
    pub bar_slot: usize,
}

/// One channel row.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRow {
    /// Channel username.
    pub username: String,
    /// Displayed message count.
    pub count: i64,
    /// Bar width in percent.
    pub percent: f64,
    /// Bar colour band.
    pub tier: Tier,
}

/// Headline above the cards: the standings, or the load error that replaced them.
#[derive(Debug, Clone, PartialEq)]
pub enum Headline {
    /// Standings computed from the cache.
    Standing(Standing),
    /// Players could not be loaded.
    LoadError(String),
}

/// Full board derived from a session.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    /// Leader line.
    pub headline: Headline,
    /// Ranked player cards.
    pub players: Vec<PlayerCard>,
    /// Channel rows in fetch order.
    pub channels: Vec<ChannelRow>,
    /// Channel load failure, if any.
    pub channels_error: Option<String>,
    /// Visible add-player message.
    pub add_player_feedback: Option<Feedback>,
    /// Visible board message.
    pub board_feedback: Option<Feedback>,
}

impl BoardView {
    /// Derive the board from `session` as of `now`.
    pub fn build(session: &Session, settings: &BoardSettings, now: Instant) -> Self {
        let cache = session.cache();
        let total = cache.total_score();

        let players = ranked_players(cache.players())
            .into_iter()
            .enumerate()
            .map(|(index, player)| PlayerCard {
                rank: index + 1,
                id: player.id.clone(),
                name: player.name.clone(),
                avatar_url: player.avatar_url.clone(),
                score: player.score,
                prize: format_prize(prize_share(player, settings.prize_pool, total)),
                bar_percent: score_bar_percent(player.score, settings.score_bar_ceiling),
                bar_slot: bar_slot(index),
            })
            .collect();

        let channels = cache
            .channels()
            .iter()
            .map(|channel| {
                let progress = channel_progress(channel, settings.channel_ceiling);
                ChannelRow {
                    username: channel.username.clone(),
                    count: progress.raw_count,
                    percent: progress.percent,
                    tier: progress.tier,
                }
            })
            .collect();

        let headline = match &session.load_errors().players {
            Some(error) => Headline::LoadError(error.clone()),
            None => Headline::Standing(leader_announcement(cache.players())),
        };

        let feedback = session.feedback();
        Self {
            headline,
            players,
            channels,
            channels_error: session.load_errors().channels.clone(),
            add_player_feedback: feedback.visible(FeedbackTarget::AddPlayer, now).cloned(),
            board_feedback: feedback.visible(FeedbackTarget::Board, now).cloned(),
        }
    }

    /// Player card at 1-based `rank`.
    pub fn card_at(&self, rank: usize) -> Option<&PlayerCard> {
        rank.checked_sub(1).and_then(|index| self.players.get(index))
    }
}

const BAR_WIDTH: usize = 20;

fn bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn write_feedback(f: &mut fmt::Formatter<'_>, feedback: &Option<Feedback>) -> fmt::Result {
    if let Some(feedback) = feedback {
        let marker = match feedback.kind {
            FeedbackKind::Success => "ok",
            FeedbackKind::Error => "error",
        };
        writeln!(f, "({marker}) {}", feedback.message)?;
    }
    Ok(())
}

impl fmt::Display for BoardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.headline {
            Headline::Standing(standing) => writeln!(f, "{standing}")?,
            Headline::LoadError(error) => writeln!(f, "{error}")?,
        }
        write_feedback(f, &self.board_feedback)?;

        if self.players.is_empty() {
            writeln!(f, "No players yet. Add one above!")?;
        }
        for card in &self.players {
            writeln!(
                f,
                "{:>2}. {:<16} {:>5} pts  {:>8}  {} bar-{}  [{}]",
                card.rank,
                card.name,
                card.score,
                card.prize,
                bar(card.bar_percent),
                card.bar_slot,
                card.id,
            )?;
        }

        if !self.channels.is_empty() || self.channels_error.is_some() {
            writeln!(f, "-- channels --")?;
        }
        if let Some(error) = &self.channels_error {
            writeln!(f, "{error}")?;
        }
        for row in &self.channels {
            writeln!(
                f,
                "{:<20} {:>5}  {} {:>5.1}% {}",
                row.username,
                row.count,
                bar(row.percent),
                row.percent,
                row.tier.label(),
            )?;
        }

        write_feedback(f, &self.add_player_feedback)
    }
}
