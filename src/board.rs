//! In-memory song board: submissions, votes, and moderation flags.
//!
//! All state lives in process memory; nothing is persisted. If the board
//! ever needs to survive restarts, the relational layout sketched for it
//! looks like this:
//!
//! **Users** — `user_id` (PK), `username`, `first_login_datetime`,
//! `last_login_datetime`, `first_login_ip`, `last_login_ip`,
//! `last_song_submission_datetime`, plus denormalized `voted_songs_ids` /
//! `submitted_songs_ids` lists.
//!
//! **Songs** — `song_id` (PK), `is_being_hidden`, `user_id` (FK Users),
//! `song_name`, `is_explicit`, `vote_count`.
//!
//! **Song_Votes** / **Song_Submissions** — (`user_id`, `song_id`, datetime)
//! join tables, with indexes on `user_id` + datetime for per-user queries,
//! partitioned by date or user_id if the board ever grows that far.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// One entry on the board, keyed by its Spotify track id
#[derive(Debug, Clone, Serialize)]
pub struct Song {
    pub song_id: String,
    pub title: String,
    pub is_explicit: bool,
    #[serde(skip)]
    pub is_hidden: bool,
    pub vote_count: u32,
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteError {
    UnknownSong,
    AlreadyVoted,
}

impl fmt::Display for VoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteError::UnknownSong => f.write_str("Unknown song"),
            VoteError::AlreadyVoted => f.write_str("Already voted for this song"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    DuplicateSong,
    CooldownActive { remaining_minutes: i64 },
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::DuplicateSong => f.write_str("Song was already submitted"),
            SubmitError::CooldownActive { remaining_minutes } => write!(
                f,
                "Submission cooldown active, try again in {} minutes",
                remaining_minutes
            ),
        }
    }
}

/// Shared song board.
///
/// Votes are recorded per user email so a user gets at most one vote per
/// song; submissions are throttled per user with a configurable cooldown.
pub struct SongBoard {
    songs: DashMap<String, Song>,
    votes: DashMap<String, HashSet<String>>,
    last_submission: DashMap<String, DateTime<Utc>>,
}

impl SongBoard {
    pub fn new() -> Self {
        SongBoard {
            songs: DashMap::new(),
            votes: DashMap::new(),
            last_submission: DashMap::new(),
        }
    }

    /// Board pre-filled with the demo songs shown before anyone submits
    pub fn with_demo_songs() -> Self {
        let board = SongBoard::new();
        let demo = [
            ("1158ckiB5S4cpsdYHDB9IF", 420),
            ("33tYADyL2aZctrvR59K1bQ", 69),
            ("6zeE5tKyr8Nu882DQhhSQI", 0),
            ("0g9rT6fMXZoZ2D69p571Q3", 0),
            ("44AyOl4qVkzS48vBsbNXaC", 0),
        ];
        for (song_id, vote_count) in demo {
            board.songs.insert(
                song_id.to_string(),
                Song {
                    song_id: song_id.to_string(),
                    title: String::new(),
                    is_explicit: false,
                    is_hidden: false,
                    vote_count,
                    submitted_by: "GTDT".to_string(),
                    submitted_at: Utc::now(),
                },
            );
        }
        board
    }

    /// All visible songs, most voted first (ties broken by id)
    pub fn list(&self) -> Vec<Song> {
        let mut songs: Vec<Song> = self
            .songs
            .iter()
            .filter(|entry| !entry.value().is_hidden)
            .map(|entry| entry.value().clone())
            .collect();
        songs.sort_by(|a, b| {
            b.vote_count
                .cmp(&a.vote_count)
                .then_with(|| a.song_id.cmp(&b.song_id))
        });
        songs
    }

    pub fn contains(&self, song_id: &str) -> bool {
        self.songs.contains_key(song_id)
    }

    /// Record a vote; at most one per user per song
    pub fn vote(&self, user_email: &str, song_id: &str) -> Result<u32, VoteError> {
        let mut song = self
            .songs
            .get_mut(song_id)
            .ok_or(VoteError::UnknownSong)?;

        let mut voted = self.votes.entry(user_email.to_string()).or_default();
        if !voted.insert(song_id.to_string()) {
            return Err(VoteError::AlreadyVoted);
        }

        song.vote_count += 1;
        Ok(song.vote_count)
    }

    /// Song ids this user has voted for
    pub fn voted_songs(&self, user_email: &str) -> HashSet<String> {
        self.votes
            .get(user_email)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Submit a new song
    pub fn submit(
        &self,
        user_email: &str,
        submitted_by: &str,
        song_id: &str,
        title: &str,
        is_explicit: bool,
        cooldown_minutes: i64,
    ) -> Result<(), SubmitError> {
        self.submit_at(
            user_email,
            submitted_by,
            song_id,
            title,
            is_explicit,
            cooldown_minutes,
            Utc::now(),
        )
    }

    /// Submit with an explicit clock (for testing)
    pub fn submit_at(
        &self,
        user_email: &str,
        submitted_by: &str,
        song_id: &str,
        title: &str,
        is_explicit: bool,
        cooldown_minutes: i64,
        now: DateTime<Utc>,
    ) -> Result<(), SubmitError> {
        let cooldown = Duration::try_minutes(cooldown_minutes).expect("Valid minutes");
        if let Some(last) = self.last_submission.get(user_email) {
            let elapsed = now - *last.value();
            if elapsed < cooldown {
                let remaining = cooldown - elapsed;
                return Err(SubmitError::CooldownActive {
                    remaining_minutes: remaining.num_minutes() + 1,
                });
            }
        }

        if self.songs.contains_key(song_id) {
            return Err(SubmitError::DuplicateSong);
        }

        self.songs.insert(
            song_id.to_string(),
            Song {
                song_id: song_id.to_string(),
                title: title.to_string(),
                is_explicit,
                is_hidden: false,
                vote_count: 0,
                submitted_by: submitted_by.to_string(),
                submitted_at: now,
            },
        );
        self.last_submission.insert(user_email.to_string(), now);
        Ok(())
    }

    /// Flip a song's moderation flag; false when the song is unknown
    pub fn set_hidden(&self, song_id: &str, hidden: bool) -> bool {
        match self.songs.get_mut(song_id) {
            Some(mut song) => {
                song.is_hidden = hidden;
                true
            }
            None => false,
        }
    }
}

impl Default for SongBoard {
    fn default() -> Self {
        SongBoard::new()
    }
}
