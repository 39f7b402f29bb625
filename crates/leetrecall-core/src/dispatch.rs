//! Request/response surface exposed to UI layers.
//!
//! UI surfaces (popup, injected page button) send one tagged request per
//! action and get one response back. The match below is exhaustive: adding a
//! variant without handling it is a compile error, replacing the "impossible
//! default case" pattern of a stringly-typed dispatcher.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use leetrecall_algo::Grade;

use crate::cards::Card;
use crate::error::CoreResult;
use crate::queue::{build_queue, due_forecast, phase_counts, DueForecastEntry, PhaseCounts};
use crate::state::App;
use crate::stats::DailyStats;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    AddCard {
        slug: String,
        name: String,
        #[serde(default)]
        difficulty: Option<String>,
        #[serde(default)]
        leetcode_id: Option<u32>,
    },
    GetAllCards,
    RemoveCard {
        slug: String,
    },
    RateCard {
        slug: String,
        #[serde(default)]
        name: Option<String>,
        grade: Grade,
        #[serde(default)]
        difficulty: Option<String>,
        #[serde(default)]
        leetcode_id: Option<u32>,
    },
    GetReviewQueue,
    DelayCard {
        slug: String,
        days: i64,
    },
    SetPauseStatus {
        slug: String,
        paused: bool,
    },
    GetTodayStats,
    GetCardStateStats,
    GetLastNDaysStats {
        n: u32,
    },
    GetNextNDaysStats {
        n: u32,
    },
    GetNewCardLimit,
    SetNewCardLimit {
        limit: i64,
    },
    SaveNote {
        slug: String,
        text: String,
    },
    GetNote {
        slug: String,
    },
    ResetAllData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Response {
    Card {
        card: Card,
    },
    Cards {
        cards: Vec<Card>,
    },
    /// `should_requeue` is true iff the new due instant still falls on
    /// today's local calendar day, i.e. the card will reappear in this
    /// session (typically a same-day learning step).
    Rated {
        card: Card,
        should_requeue: bool,
    },
    Queue {
        cards: Vec<Card>,
    },
    TodayStats {
        stats: Option<DailyStats>,
    },
    CardStateStats {
        counts: PhaseCounts,
    },
    DailyHistory {
        days: Vec<DailyStats>,
    },
    DueForecast {
        days: Vec<DueForecastEntry>,
    },
    NewCardLimit {
        limit: i64,
    },
    Note {
        text: Option<String>,
    },
    Done,
}

/// Handles one request against the app state. Mutating requests take the
/// writer lock for their whole read-modify-write; for a rating, the card
/// write always lands before the counter write.
#[instrument(skip_all, fields(request = ?std::mem::discriminant(&request)))]
pub async fn handle(app: &App, request: Request) -> CoreResult<Response> {
    match request {
        Request::AddCard {
            slug,
            name,
            difficulty,
            leetcode_id,
        } => {
            let _write = app.write_lock().await;
            let card = app.cards().add_card(&slug, &name, difficulty, leetcode_id).await?;
            Ok(Response::Card { card })
        }

        Request::GetAllCards => {
            let cards = app.cards().get_all().await?;
            Ok(Response::Cards { cards })
        }

        Request::RemoveCard { slug } => {
            let _write = app.write_lock().await;
            app.cards().remove_card(&slug).await?;
            Ok(Response::Done)
        }

        Request::RateCard {
            slug,
            name,
            grade,
            difficulty,
            leetcode_id,
        } => {
            let _write = app.write_lock().await;
            let now = app.clock().now();
            let (card, was_new) = app
                .cards()
                .rate_card(&slug, name.as_deref(), grade, difficulty, leetcode_id, now)
                .await?;
            // Counter update second; a crash between the two writes leaves the
            // counter one short, which the original system accepts.
            app.stats().record_review(grade, was_new, now).await?;
            let should_requeue =
                app.clock().local_date(card.memory.due) <= app.clock().local_date(now);
            Ok(Response::Rated {
                card,
                should_requeue,
            })
        }

        Request::GetReviewQueue => {
            let cards = app.cards().get_all().await?;
            let already_new_today = app
                .stats()
                .get_today()
                .await?
                .map(|d| d.new_cards)
                .unwrap_or(0);
            let cap = app.settings().get().await?.new_cards_per_day;
            let queue = build_queue(cards, already_new_today, cap, app.clock().now());
            Ok(Response::Queue { cards: queue })
        }

        Request::DelayCard { slug, days } => {
            let _write = app.write_lock().await;
            let card = app.cards().delay(&slug, days).await?;
            Ok(Response::Card { card })
        }

        Request::SetPauseStatus { slug, paused } => {
            let _write = app.write_lock().await;
            let card = app.cards().set_paused(&slug, paused).await?;
            Ok(Response::Card { card })
        }

        Request::GetTodayStats => {
            let stats = app.stats().get_today().await?;
            Ok(Response::TodayStats { stats })
        }

        Request::GetCardStateStats => {
            let cards = app.cards().get_all().await?;
            Ok(Response::CardStateStats {
                counts: phase_counts(&cards),
            })
        }

        Request::GetLastNDaysStats { n } => {
            let days = app.stats().last_n_days(n, app.clock().now()).await?;
            Ok(Response::DailyHistory { days })
        }

        Request::GetNextNDaysStats { n } => {
            let cards = app.cards().get_all().await?;
            let days = due_forecast(&cards, n, app.clock(), app.clock().now());
            Ok(Response::DueForecast { days })
        }

        Request::GetNewCardLimit => {
            let settings = app.settings().get().await?;
            Ok(Response::NewCardLimit {
                limit: settings.new_cards_per_day,
            })
        }

        Request::SetNewCardLimit { limit } => {
            let _write = app.write_lock().await;
            let settings = app.settings().set_new_card_limit(limit).await?;
            Ok(Response::NewCardLimit {
                limit: settings.new_cards_per_day,
            })
        }

        Request::SaveNote { slug, text } => {
            let _write = app.write_lock().await;
            let card = app.cards().save_note(&slug, &text).await?;
            Ok(Response::Card { card })
        }

        Request::GetNote { slug } => {
            let text = app.cards().get_note(&slug).await?;
            Ok(Response::Note { text })
        }

        Request::ResetAllData => {
            let _write = app.write_lock().await;
            app.storage().clear().await?;
            Ok(Response::Done)
        }
    }
}
