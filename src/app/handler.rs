use crate::app::action::Action;
use crate::app::commands::{parse_command, ParsedCommand};
use crate::app::event::AppEvent;
use crate::app::render;
use crate::app::state::Session;
use crate::error::StoreError;
use crate::models::EntityRecord;
use crate::store::{Completion, Intent, Operation, PageRequest, UpdateKind};
use serde_json::Value;
use tracing::debug;

pub fn handle_event(session: &mut Session, event: AppEvent) -> Vec<Action> {
    match event {
        AppEvent::Input(line) => handle_input(session, &line),
        AppEvent::InputClosed => {
            session.input_closed = true;
            let busy = session.busy_stores();
            if !busy.is_empty() {
                session.print(format!(
                    "Input closed, waiting for pending requests: {}",
                    busy.join(", ")
                ));
            }
            quit_when_drained(session)
        }
        AppEvent::Completed { entity, completion } => {
            handle_completion(session, entity, completion);
            quit_when_drained(session)
        }
    }
}

/// After stdin has closed, quit once no store has a request in flight.
fn quit_when_drained(session: &mut Session) -> Vec<Action> {
    if session.input_closed && session.busy_stores().is_empty() {
        session.should_quit = true;
        vec![Action::Quit]
    } else {
        vec![]
    }
}

fn handle_input(session: &mut Session, line: &str) -> Vec<Action> {
    let line = line.trim();
    if line.is_empty() {
        return vec![];
    }
    if !line.starts_with('/') {
        session.error("Commands start with '/'. Type /help for a list.");
        return vec![];
    }
    match parse_command(line) {
        Some(command) => handle_command(session, command),
        None => {
            session.error(format!("Unknown command or missing arguments: {}", line));
            vec![]
        }
    }
}

fn handle_command(session: &mut Session, command: ParsedCommand) -> Vec<Action> {
    match command {
        ParsedCommand::List {
            kind,
            page,
            size,
            sort,
        } => {
            let Some(entity) = resolve(session, &kind) else {
                return vec![];
            };
            let request = if page.is_none() && size.is_none() && sort.is_none() {
                session.last_sort.remove(entity);
                PageRequest::unsorted()
            } else {
                let sort =
                    sort.unwrap_or_else(|| session.config.pagination.default_sort.clone());
                session.last_sort.insert(entity, sort.clone());
                PageRequest {
                    page: Some(page.unwrap_or(0)),
                    size,
                    sort: Some(sort),
                }
            };
            dispatch(session, entity, Intent::FetchList(request))
        }
        ParsedCommand::More { kind } => {
            let Some(entity) = resolve(session, &kind) else {
                return vec![];
            };
            // Later pages must come from the same order as the first one.
            let Some(sort) = session.last_sort.get(entity).cloned() else {
                session.error(format!(
                    "[{}] /more needs a sorted list first, e.g. /list {} 0",
                    entity, entity
                ));
                return vec![];
            };
            match session.store(entity).and_then(|s| s.next_page(&sort)) {
                Some(page) => dispatch(session, entity, Intent::FetchList(page)),
                None => {
                    session.print(format!("[{}] no further pages", entity));
                    vec![]
                }
            }
        }
        ParsedCommand::Get { kind, id } => match resolve(session, &kind) {
            Some(entity) => dispatch(session, entity, Intent::FetchOne { id }),
            None => vec![],
        },
        ParsedCommand::Create { kind, json } => {
            with_record(session, &kind, &json, |record| Intent::Create { record })
        }
        ParsedCommand::Update { kind, json } => {
            with_record(session, &kind, &json, |record| Intent::Update {
                record,
                kind: UpdateKind::Replace,
            })
        }
        ParsedCommand::Patch { kind, json } => {
            with_record(session, &kind, &json, |record| Intent::Update {
                record,
                kind: UpdateKind::Merge,
            })
        }
        ParsedCommand::Delete { kind, id } => match resolve(session, &kind) {
            Some(entity) => dispatch(session, entity, Intent::Delete { id }),
            None => vec![],
        },
        ParsedCommand::Blob {
            kind,
            field,
            content_type,
            data,
        } => match resolve(session, &kind) {
            Some(entity) => dispatch(
                session,
                entity,
                Intent::SetBlob {
                    field,
                    data: Value::String(data),
                    content_type,
                },
            ),
            None => vec![],
        },
        ParsedCommand::Reset { kind } => match resolve(session, &kind) {
            Some(entity) => dispatch(session, entity, Intent::Reset),
            None => vec![],
        },
        ParsedCommand::Show { kind } => {
            if let Some(entity) = resolve(session, &kind) {
                show(session, entity);
            }
            vec![]
        }
        ParsedCommand::ConfigSave => vec![Action::SaveConfig],
        ParsedCommand::Help => {
            for line in render::HELP {
                session.print(*line);
            }
            vec![]
        }
        ParsedCommand::Quit => {
            session.should_quit = true;
            vec![Action::Quit]
        }
    }
}

fn resolve(session: &mut Session, kind: &str) -> Option<&'static str> {
    let entity = session.resolve_kind(kind);
    if entity.is_none() {
        session.error(format!("Unknown entity kind '{}' (expected blog or entry)", kind));
    }
    entity
}

/// Parse a JSON object argument and dispatch the intent built from it.
fn with_record(
    session: &mut Session,
    kind: &str,
    json: &str,
    intent: impl FnOnce(EntityRecord) -> Intent,
) -> Vec<Action> {
    let Some(entity) = resolve(session, kind) else {
        return vec![];
    };
    let value: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            session.error(format!("Invalid JSON: {}", e));
            return vec![];
        }
    };
    match EntityRecord::from_value(value) {
        Some(record) => dispatch(session, entity, intent(record)),
        None => {
            session.error("Expected a JSON object");
            vec![]
        }
    }
}

fn dispatch(session: &mut Session, entity: &'static str, intent: Intent) -> Vec<Action> {
    let Some(store) = session.store_mut(entity) else {
        return vec![];
    };
    match store.dispatch(intent) {
        Ok(Some(pending)) => {
            session.print(format!(
                "[{}] {} {} {} {}",
                entity,
                pending.operation(),
                pending.id(),
                pending.api_request().method,
                pending.api_request().display_path()
            ));
            vec![Action::Send { entity, pending }]
        }
        Ok(None) => {
            show(session, entity);
            vec![]
        }
        Err(e) => {
            session.error(format!("[{}] {}", entity, e));
            vec![]
        }
    }
}

fn handle_completion(session: &mut Session, entity: &'static str, completion: Completion) {
    let operation = completion.operation;
    let request = completion.request;
    let Some(store) = session.store_mut(entity) else {
        debug!(entity, %request, "completion for unknown store dropped");
        return;
    };

    match store.complete(completion) {
        Ok(Some(_)) if operation == Operation::Delete => {
            session.print(format!("[{}] {} {} ok", entity, operation, request));
        }
        Ok(Some(record)) => {
            let line = render::record_line(entity, &record);
            session.print(format!("[{}] {} {} ok: {}", entity, operation, request, line));
        }
        Ok(None) => {}
        Err(StoreError::Superseded { .. }) => {
            session.print(format!(
                "[{}] {} {} discarded, a newer request or reset superseded it",
                entity, operation, request
            ));
            return;
        }
        Err(e) => {
            session.error(format!("[{}] {} {} failed: {}", entity, operation, request, e));
        }
    }
    show(session, entity);
}

fn show(session: &mut Session, entity: &str) {
    let lines = session
        .store(entity)
        .map(render::store_summary)
        .unwrap_or_default();
    for line in lines {
        session.print(line);
    }
}
