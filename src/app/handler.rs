//! Event handling and state transition logic.
//!
//! Events arrive from the identity boundary (token changes), from the user
//! (query, filters, sort, paging, reload) and from the load worker. Each one
//! is applied to the [`ViewSession`] synchronously; the handler reports
//! whether the view changed and which side effects to run.
//!
//! ```text
//! Event ─► handle_event ─► ViewSession mutation ─► (changed, Vec<Action>)
//!                ▲                                         │
//!                └──────── WorkerResponse ◄── LoadWorker ◄─┘
//! ```

use crate::app::state::LoadRequest;
use crate::app::{Action, ViewSession};
use crate::domain::{BrowserError, Result};
use crate::view::filters::{GroupFilter, MemberFilter, SortKey, SortSpec, WorksheetFilter};
use crate::worker::{WorkerMessage, WorkerResponse};

/// Inputs to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The identity provider delivered a token, or signed out (`None`).
    TokenChanged(Option<String>),
    /// Explicit user request to load the current token's data again.
    Reload,

    QueryChanged(String),
    MemberSelected(MemberFilter),
    GroupSelected(GroupFilter),
    WorksheetSelected(WorksheetFilter),
    SortSelected(SortSpec),
    /// Column header click: flips direction on the active column.
    SortToggled(SortKey),

    FirstPage,
    PrevPage,
    NextPage,
    LastPage,
    GoToPage(usize),

    /// The session is going away: the current epoch is superseded and
    /// outstanding script callbacks are revoked.
    Teardown,

    /// Settlement of a load from the worker.
    WorkerResponse(WorkerResponse),
}

/// Applies `event` to `session` and returns `(changed, actions)`.
///
/// `changed` is `true` when the view model would differ and the caller
/// should re-render.
///
/// # Errors
///
/// Returns [`BrowserError::Worker`] for a worker response tagged with an
/// epoch the session never issued.
pub fn handle_event(session: &mut ViewSession, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = event_kind(event)).entered();

    match event {
        Event::TokenChanged(token) => {
            let was_loading = session.is_loading();
            let had_token = session.token().is_some();
            let request = session.set_token(token.clone());
            let changed = request.is_some()
                || was_loading != session.is_loading()
                || had_token != session.token().is_some();
            Ok((changed, load_actions(request)))
        }
        Event::Reload => {
            let request = session.reload();
            Ok((request.is_some(), load_actions(request)))
        }
        Event::QueryChanged(query) => {
            tracing::trace!(query = %query, "search query updated");
            Ok((session.set_query(query.clone()), vec![]))
        }
        Event::MemberSelected(member) => Ok((session.set_member(member.clone()), vec![])),
        Event::GroupSelected(group) => Ok((session.set_group(*group), vec![])),
        Event::WorksheetSelected(worksheet) => Ok((session.set_worksheet(worksheet.clone()), vec![])),
        Event::SortSelected(sort) => Ok((session.set_sort(*sort), vec![])),
        Event::SortToggled(key) => Ok((session.toggle_sort(*key), vec![])),
        Event::FirstPage => Ok((session.first_page(), vec![])),
        Event::PrevPage => Ok((session.prev_page(), vec![])),
        Event::NextPage => Ok((session.next_page(), vec![])),
        Event::LastPage => Ok((session.last_page(), vec![])),
        Event::GoToPage(page) => Ok((session.set_page(*page), vec![])),
        Event::Teardown => {
            tracing::debug!("session teardown requested");
            let changed = session.teardown();
            Ok((changed, vec![Action::PostToWorker(WorkerMessage::Shutdown)]))
        }
        Event::WorkerResponse(response) => {
            let epoch = response.epoch();
            if epoch > session.epoch() {
                return Err(BrowserError::Worker(format!(
                    "response for epoch {epoch} which was never issued (current {})",
                    session.epoch()
                )));
            }
            let (epoch, outcome) = response.clone().into_outcome();
            Ok((session.apply_load(epoch, outcome), vec![]))
        }
    }
}

fn load_actions(request: Option<LoadRequest>) -> Vec<Action> {
    request
        .map(|LoadRequest { epoch, token }| Action::PostToWorker(WorkerMessage::load(epoch, token)))
        .into_iter()
        .collect()
}

/// Event name for spans; keeps tokens and payloads out of trace output.
const fn event_kind(event: &Event) -> &'static str {
    match event {
        Event::TokenChanged(_) => "TokenChanged",
        Event::Reload => "Reload",
        Event::QueryChanged(_) => "QueryChanged",
        Event::MemberSelected(_) => "MemberSelected",
        Event::GroupSelected(_) => "GroupSelected",
        Event::WorksheetSelected(_) => "WorksheetSelected",
        Event::SortSelected(_) => "SortSelected",
        Event::SortToggled(_) => "SortToggled",
        Event::FirstPage => "FirstPage",
        Event::PrevPage => "PrevPage",
        Event::NextPage => "NextPage",
        Event::LastPage => "LastPage",
        Event::GoToPage(_) => "GoToPage",
        Event::Teardown => "Teardown",
        Event::WorkerResponse(WorkerResponse::Loaded { .. }) => "WorkerResponse::Loaded",
        Event::WorkerResponse(WorkerResponse::Failed { .. }) => "WorkerResponse::Failed",
    }
}
