// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod dashboard;
mod report;
mod views;

pub use dashboard::{DashboardPane, RefreshTimer, join_activity, join_stats};
pub use report::{DetailsPane, OverviewPane};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use std::collections::BTreeSet;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::PrimitiveDateTime;
use tracing::{debug, info, warn};
use workdesk_app::{
    AppCommand, AppEvent, AppMode, AppState, AssignedTask, ConfirmAction, DashboardData,
    Department, Employee, EmployeeId, FilterSpec, FormDraft, FormKind, FormPayload, ListView,
    LoadError, LoadOutcome, LoadTicket, LocalClock, Machine, MachineId, MutationError, Notice,
    PaginationControls, PortalError, Record, RenderedList, RenderedRow, Task, TaskDetails,
    TaskId, TaskOverview, ViewKind, format_local_datetime, parse_date,
};

use views::{
    AssignmentRows, CREATOR_TYPE_CYCLE, EmployeeRows, MachineRows, MyTaskRows, OVERDUE_CYCLE,
    OverviewRows, ROLE_CYCLE, TaskRows, department_schema, department_sorts, employee_schema,
    employee_sorts, machine_schema, machine_sorts, my_overview_schema, my_task_schema,
    my_task_sorts, next_in_cycle, overview_sorts, status_cycle, task_schema, task_sorts,
    type_cycle,
};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);
const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);

/// Backend access the front end needs. Every call blocks; [`spawn_load`]
/// is the seam for moving fetches off the UI thread.
///
/// [`spawn_load`]: AppRuntime::spawn_load
pub trait AppRuntime {
    fn load_employees(&mut self) -> Result<Vec<Employee>, LoadError>;
    fn load_tasks(&mut self, filter: &FilterSpec) -> Result<Vec<Task>, LoadError>;
    fn load_my_tasks(&mut self) -> Result<Vec<AssignedTask>, LoadError>;
    fn load_departments(&mut self) -> Result<Vec<Department>, LoadError>;
    fn load_machines(&mut self) -> Result<Vec<Machine>, LoadError>;
    fn load_dashboard(&mut self) -> Result<DashboardData, LoadError>;
    fn load_overview(&mut self, filter: &FilterSpec) -> Result<TaskOverview, LoadError>;
    fn load_task_details(&mut self, id: TaskId) -> Result<TaskDetails, LoadError>;
    fn load_my_overview(&mut self, filter: &FilterSpec) -> Result<Vec<AssignedTask>, LoadError>;
    fn next_machine_id(&mut self) -> Result<MachineId, LoadError>;
    fn submit_form(
        &mut self,
        target: Option<&str>,
        payload: &FormPayload,
    ) -> Result<(), MutationError>;
    fn delete(&mut self, action: &ConfirmAction) -> Result<(), MutationError>;
    /// The signed-in employee, when the session belongs to one.
    fn employee(&self) -> Option<EmployeeId> {
        None
    }
    fn spawn_load(&mut self, request: LoadRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let batch = load_batch(self, request);
        tx.send(InternalEvent::Loaded(batch))
            .map_err(|_| anyhow::anyhow!("load event channel closed"))?;
        Ok(())
    }
}

/// A fetch the UI has issued a ticket for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    Dashboard(LoadTicket),
    Employees(LoadTicket),
    Tasks(LoadTicket, FilterSpec),
    MyTasks(LoadTicket),
    Departments(LoadTicket),
    Machines(LoadTicket),
    Overview(LoadTicket, FilterSpec),
    TaskDetails(LoadTicket, TaskId),
    MyOverview(LoadTicket, FilterSpec),
}

/// A finished fetch, tagged with the ticket it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadBatch {
    Dashboard(LoadTicket, Result<DashboardData, LoadError>),
    Employees(LoadTicket, Result<Vec<Employee>, LoadError>),
    Tasks(LoadTicket, Result<Vec<Task>, LoadError>),
    MyTasks(LoadTicket, Result<Vec<AssignedTask>, LoadError>),
    Departments(LoadTicket, Result<Vec<Department>, LoadError>),
    Machines(LoadTicket, Result<Vec<Machine>, LoadError>),
    Overview(LoadTicket, Result<TaskOverview, LoadError>),
    TaskDetails(LoadTicket, Result<TaskDetails, LoadError>),
    MyOverview(LoadTicket, Result<Vec<AssignedTask>, LoadError>),
}

/// Runs `request` to completion on the calling thread.
pub fn load_batch<R: AppRuntime + ?Sized>(runtime: &mut R, request: LoadRequest) -> LoadBatch {
    match request {
        LoadRequest::Dashboard(ticket) => LoadBatch::Dashboard(ticket, runtime.load_dashboard()),
        LoadRequest::Employees(ticket) => LoadBatch::Employees(ticket, runtime.load_employees()),
        LoadRequest::Tasks(ticket, filter) => LoadBatch::Tasks(ticket, runtime.load_tasks(&filter)),
        LoadRequest::MyTasks(ticket) => LoadBatch::MyTasks(ticket, runtime.load_my_tasks()),
        LoadRequest::Departments(ticket) => {
            LoadBatch::Departments(ticket, runtime.load_departments())
        }
        LoadRequest::Machines(ticket) => LoadBatch::Machines(ticket, runtime.load_machines()),
        LoadRequest::Overview(ticket, filter) => {
            LoadBatch::Overview(ticket, runtime.load_overview(&filter))
        }
        LoadRequest::TaskDetails(ticket, id) => {
            LoadBatch::TaskDetails(ticket, runtime.load_task_details(id))
        }
        LoadRequest::MyOverview(ticket, filter) => {
            LoadBatch::MyOverview(ticket, runtime.load_my_overview(&filter))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Loaded(LoadBatch),
    RefreshDashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiOptions {
    /// Zero disables dashboard polling.
    pub refresh_interval: Duration,
    /// Decides which tasks are overdue.
    pub clock: LocalClock,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            clock: LocalClock::default(),
        }
    }
}

/// The controller behind whichever view is on screen. Replacing it tears
/// down the previous view, including its refresh timer.
#[derive(Debug)]
enum Pane {
    Dashboard(DashboardPane),
    Employees(ListView<Employee>),
    Tasks(ListView<Task>),
    MyTasks(ListView<AssignedTask>),
    Departments(ListView<Department>),
    Machines(ListView<Machine>),
    Overview(OverviewPane),
    /// Drill-down from the overview; it keeps the report to return to.
    TaskDetails(DetailsPane),
    MyOverview(ListView<AssignedTask>),
}

impl Default for Pane {
    fn default() -> Self {
        Self::Dashboard(DashboardPane::default())
    }
}

impl Pane {
    fn for_view(view: ViewKind, now: PrimitiveDateTime) -> Self {
        match view {
            ViewKind::Dashboard => Self::Dashboard(DashboardPane::default()),
            ViewKind::Employees => Self::Employees(ListView::new(employee_schema())),
            ViewKind::Tasks => Self::Tasks(ListView::new(task_schema(now))),
            ViewKind::MyTasks => Self::MyTasks(ListView::new(my_task_schema(now))),
            ViewKind::Departments => Self::Departments(ListView::new(department_schema())),
            ViewKind::Machines => Self::Machines(ListView::new(machine_schema())),
            ViewKind::Overview => Self::Overview(OverviewPane::new(now)),
            ViewKind::MyOverview => Self::MyOverview(ListView::new(my_overview_schema(now))),
        }
    }

    const fn kind(&self) -> ViewKind {
        match self {
            Self::Dashboard(_) => ViewKind::Dashboard,
            Self::Employees(_) => ViewKind::Employees,
            Self::Tasks(_) => ViewKind::Tasks,
            Self::MyTasks(_) => ViewKind::MyTasks,
            Self::Departments(_) => ViewKind::Departments,
            Self::Machines(_) => ViewKind::Machines,
            Self::Overview(_) | Self::TaskDetails(_) => ViewKind::Overview,
            Self::MyOverview(_) => ViewKind::MyOverview,
        }
    }
}

/// Runs `$body` against the list behind any list pane, `$fallback` on the
/// dashboard.
macro_rules! with_list {
    ($pane:expr, |$list:ident| $body:expr, $fallback:expr) => {
        match $pane {
            Pane::Employees($list) => $body,
            Pane::Tasks($list) => $body,
            Pane::MyTasks($list) => $body,
            Pane::Departments($list) => $body,
            Pane::Machines($list) => $body,
            Pane::Overview(OverviewPane { list: $list, .. }) => $body,
            Pane::TaskDetails(DetailsPane { list: $list, .. }) => $body,
            Pane::MyOverview($list) => $body,
            Pane::Dashboard(_) => $fallback,
        }
    };
}

#[derive(Debug, Default)]
struct ViewData {
    pane: Pane,
    cursor: usize,
    sort_index: usize,
    marked: BTreeSet<EmployeeId>,
    search_input: String,
    prompt: Prompt,
    form: Option<FormDraft>,
    status_token: u64,
    options: UiOptions,
}

/// Which filter the text prompt edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Prompt {
    #[default]
    Search,
    From,
    To,
}

impl Prompt {
    const fn filter(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::From => "from",
            Self::To => "to",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageMove {
    Next,
    Prev,
    First,
    Last,
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    options: UiOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData {
        options,
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();

    if !state.views().contains(&state.active_view) {
        state.active_view = ViewKind::Dashboard;
    }
    open_view(state, runtime, &mut view_data, &internal_tx, state.active_view);
    info!(role = state.role.as_str(), view = state.active_view.label(), "ui started");

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    // Stops the dashboard timer before the terminal is restored.
    drop(view_data);
    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Loaded(batch) => apply_batch(state, view_data, tx, batch),
            InternalEvent::RefreshDashboard => {
                if matches!(view_data.pane, Pane::Dashboard(_)) {
                    start_load(state, runtime, view_data, tx);
                }
            }
        }
    }
}

fn apply_batch(
    state: &mut AppState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    batch: LoadBatch,
) {
    let (outcome, dashboard) = match (&mut view_data.pane, batch) {
        (Pane::Dashboard(pane), LoadBatch::Dashboard(ticket, result)) => {
            (pane.finish_load(ticket, result), true)
        }
        (Pane::Employees(list), LoadBatch::Employees(ticket, result)) => {
            (list.finish_load(ticket, result), false)
        }
        (Pane::Tasks(list), LoadBatch::Tasks(ticket, result)) => {
            (list.finish_load(ticket, result), false)
        }
        (Pane::MyTasks(list), LoadBatch::MyTasks(ticket, result)) => {
            (list.finish_load(ticket, result), false)
        }
        (Pane::Departments(list), LoadBatch::Departments(ticket, result)) => {
            (list.finish_load(ticket, result), false)
        }
        (Pane::Machines(list), LoadBatch::Machines(ticket, result)) => {
            (list.finish_load(ticket, result), false)
        }
        (Pane::Overview(pane), LoadBatch::Overview(ticket, result)) => {
            (pane.finish_load(ticket, result), false)
        }
        (Pane::TaskDetails(pane), LoadBatch::TaskDetails(ticket, result)) => {
            (pane.finish_load(ticket, result), false)
        }
        (Pane::MyOverview(list), LoadBatch::MyOverview(ticket, result)) => {
            (list.finish_load(ticket, result), false)
        }
        (pane, _) => {
            debug!(view = pane.kind().label(), "discarding load for a view no longer shown");
            return;
        }
    };

    match outcome {
        Ok(LoadOutcome::Applied { .. }) => {
            let marked = &mut view_data.marked;
            if let Pane::Employees(list) = &view_data.pane {
                marked.retain(|id| list.find(id).is_some());
            }
            clamp_cursor(view_data);
        }
        Ok(LoadOutcome::Stale) => {}
        // The dashboard keeps its last figures and retries on the next tick.
        Err(error) if dashboard => {
            emit_status(state, view_data, tx, format!("stats unavailable: {error}"));
        }
        Err(error) => show_error(state, PortalError::Load(error)),
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn bump_status_token(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    bump_status_token(view_data, internal_tx);
}

fn show_error(state: &mut AppState, error: PortalError) {
    state.dispatch(AppCommand::ShowNotice(Notice::from(&error)));
}

/// Applies `command` and reacts to the events it produces.
fn dispatch<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    for event in state.dispatch(command) {
        match event {
            AppEvent::ViewChanged(view) => open_view(state, runtime, view_data, tx, view),
            AppEvent::Confirmed(action) => perform_confirmed(state, runtime, view_data, tx, action),
            AppEvent::StatusUpdated(_) => bump_status_token(view_data, tx),
            AppEvent::ModeChanged(_)
            | AppEvent::ModalOpened(_)
            | AppEvent::ModalClosed(_)
            | AppEvent::StatusCleared => {}
        }
    }
}

fn open_view<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    view: ViewKind,
) {
    view_data.pane = Pane::for_view(view, view_data.options.clock.now());
    view_data.cursor = 0;
    view_data.sort_index = 0;
    view_data.marked.clear();
    view_data.search_input.clear();
    view_data.prompt = Prompt::default();
    view_data.form = None;
    if let Pane::Dashboard(pane) = &mut view_data.pane {
        pane.start_polling(view_data.options.refresh_interval, tx.clone());
    }
    debug!(view = view.label(), "view opened");
    start_load(state, runtime, view_data, tx);
}

fn start_load<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let request = match &mut view_data.pane {
        Pane::Dashboard(pane) => LoadRequest::Dashboard(pane.begin_load()),
        Pane::Employees(list) => LoadRequest::Employees(list.begin_load()),
        Pane::Tasks(list) => {
            let ticket = list.begin_load();
            LoadRequest::Tasks(ticket, list.filter().clone())
        }
        Pane::MyTasks(list) => LoadRequest::MyTasks(list.begin_load()),
        Pane::Departments(list) => LoadRequest::Departments(list.begin_load()),
        Pane::Machines(list) => LoadRequest::Machines(list.begin_load()),
        Pane::Overview(pane) => {
            let ticket = pane.list.begin_load();
            LoadRequest::Overview(ticket, pane.list.filter().clone())
        }
        Pane::TaskDetails(pane) => LoadRequest::TaskDetails(pane.list.begin_load(), pane.task_id()),
        Pane::MyOverview(list) => {
            let ticket = list.begin_load();
            LoadRequest::MyOverview(ticket, list.filter().clone())
        }
    };
    if let Err(error) = runtime.spawn_load(request, tx.clone()) {
        warn!(%error, "could not start load");
        emit_status(state, view_data, tx, format!("load failed: {error}"));
    }
}

fn perform_confirmed<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    action: ConfirmAction,
) {
    let bulk = matches!(action, ConfirmAction::DeleteEmployees(_));
    match runtime.delete(&action) {
        Ok(()) => {
            info!(?action, "deleted");
            if bulk {
                view_data.marked.clear();
            }
            emit_status(state, view_data, tx, "deleted");
            start_load(state, runtime, view_data, tx);
        }
        Err(error) => {
            warn!(?action, %error, "delete rejected");
            show_error(state, PortalError::Mutation(error));
            if bulk {
                // Some of the batch may have gone through.
                start_load(state, runtime, view_data, tx);
            }
        }
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    if state.notice.is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ')) {
            state.dispatch(AppCommand::DismissNotice);
        }
        return false;
    }

    match state.mode {
        AppMode::Nav => return handle_nav_key(state, runtime, view_data, internal_tx, key),
        AppMode::Filter => handle_search_key(state, runtime, view_data, internal_tx, key),
        AppMode::Form(_) => handle_form_key(state, runtime, view_data, internal_tx, key),
        AppMode::Confirm => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                dispatch(state, runtime, view_data, internal_tx, AppCommand::Confirm);
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                dispatch(state, runtime, view_data, internal_tx, AppCommand::Cancel);
            }
            _ => {}
        },
    }
    false
}

fn handle_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => dispatch(state, runtime, view_data, tx, AppCommand::NextView),
        KeyCode::BackTab => dispatch(state, runtime, view_data, tx, AppCommand::PrevView),
        KeyCode::Char(digit @ '1'..='9') => {
            let index = digit as usize - '1' as usize;
            if let Some(view) = state.views().get(index).copied() {
                dispatch(state, runtime, view_data, tx, AppCommand::SelectView(view));
            }
        }
        KeyCode::Down | KeyCode::Char('j') => move_cursor(view_data, 1),
        KeyCode::Up | KeyCode::Char('k') => move_cursor(view_data, -1),
        KeyCode::Right | KeyCode::PageDown | KeyCode::Char('n') => {
            turn_page(view_data, PageMove::Next);
        }
        KeyCode::Left | KeyCode::PageUp | KeyCode::Char('p') => {
            turn_page(view_data, PageMove::Prev);
        }
        KeyCode::Home | KeyCode::Char('g') => turn_page(view_data, PageMove::First),
        KeyCode::End | KeyCode::Char('G') => turn_page(view_data, PageMove::Last),
        KeyCode::Char('R') | KeyCode::F(5) => {
            start_load(state, runtime, view_data, tx);
            emit_status(state, view_data, tx, "reloading");
        }
        KeyCode::Char('/') => start_prompt(state, view_data, Prompt::Search),
        KeyCode::Char('F') => start_prompt(state, view_data, Prompt::From),
        KeyCode::Char('T') => start_prompt(state, view_data, Prompt::To),
        KeyCode::Char('c') => {
            let cleared = with_list!(&mut view_data.pane, |list| {
                list.clear_filters();
                true
            }, false);
            if cleared {
                view_data.cursor = 0;
                reload_if_server_filtered(state, runtime, view_data, tx);
                emit_status(state, view_data, tx, "filters cleared");
            }
        }
        KeyCode::Char('S') => cycle_sort(state, view_data, tx),
        KeyCode::Char(key @ ('s' | 't' | 'r' | 'd' | 'm' | 'o')) => {
            cycle_filter(state, runtime, view_data, tx, key);
        }
        KeyCode::Char(' ') => toggle_mark(view_data),
        KeyCode::Char('a') => open_create_form(state, runtime, view_data, tx),
        KeyCode::Char('e') => open_edit_form(state, view_data),
        KeyCode::Enter => match view_data.pane {
            Pane::MyTasks(_) => open_assignment_form(state, view_data, FormKind::TaskStatus),
            Pane::Overview(_) => open_task_details(state, runtime, view_data, tx),
            _ => open_edit_form(state, view_data),
        },
        KeyCode::Esc | KeyCode::Backspace => close_task_details(view_data),
        KeyCode::Char('u') => open_assignment_form(state, view_data, FormKind::TaskStatus),
        KeyCode::Char('w') => open_assignment_form(state, view_data, FormKind::TaskReport),
        KeyCode::Char('x') | KeyCode::Delete => request_delete(state, runtime, view_data, tx),
        KeyCode::Char('X') => request_bulk_delete(state, runtime, view_data, tx),
        _ => {}
    }
    false
}

fn handle_search_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.search_input.clear();
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Enter => {
            let value = std::mem::take(&mut view_data.search_input);
            let prompt = view_data.prompt;
            let filter = prompt.filter();
            if prompt != Prompt::Search && !value.trim().is_empty() && parse_date(&value).is_none() {
                state.dispatch(AppCommand::ExitToNav);
                emit_status(state, view_data, tx, format!("{filter}: expected YYYY-MM-DD"));
                return;
            }
            let matched = with_list!(
                &mut view_data.pane,
                |list| list.set_filter(filter, value.trim()),
                0
            );
            state.dispatch(AppCommand::ExitToNav);
            view_data.cursor = 0;
            reload_if_server_filtered(state, runtime, view_data, tx);
            emit_status(state, view_data, tx, format!("{matched} matching"));
        }
        KeyCode::Backspace => {
            view_data.search_input.pop();
        }
        KeyCode::Char(ch) => view_data.search_input.push(ch),
        _ => {}
    }
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(draft) = view_data.form.as_mut() else {
        state.dispatch(AppCommand::ExitToNav);
        return;
    };
    match key.code {
        KeyCode::Esc => {
            view_data.form = None;
            state.dispatch(AppCommand::ExitToNav);
        }
        KeyCode::Tab | KeyCode::Down => draft.focus_next(),
        KeyCode::BackTab | KeyCode::Up => draft.focus_prev(),
        KeyCode::Backspace => draft.pop_char(),
        KeyCode::Enter => submit_form(state, runtime, view_data, tx),
        KeyCode::Char(ch) => draft.push_char(ch),
        _ => {}
    }
}

fn submit_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let Some(draft) = view_data.form.as_ref() else {
        return;
    };
    let payload = match draft.to_payload() {
        Ok(payload) => payload,
        Err(error) => {
            warn!(form = draft.kind.label(), %error, "form not submitted");
            show_error(state, PortalError::Validation(error));
            return;
        }
    };
    let target = draft.target.clone();
    let title = draft.title();

    match runtime.submit_form(target.as_deref(), &payload) {
        Ok(()) => {
            info!(form = payload.kind().label(), target = ?target, "form saved");
            view_data.form = None;
            state.dispatch(AppCommand::ExitToNav);
            emit_status(state, view_data, tx, format!("{title}: saved"));
            start_load(state, runtime, view_data, tx);
        }
        Err(error) => {
            warn!(form = payload.kind().label(), %error, "form rejected");
            show_error(state, PortalError::Mutation(error));
        }
    }
}

/// Opens the text prompt for `prompt` when the list has that filter.
fn start_prompt(state: &mut AppState, view_data: &mut ViewData, prompt: Prompt) {
    let filter = prompt.filter();
    let current = with_list!(
        &view_data.pane,
        |list| list
            .schema()
            .filters
            .iter()
            .any(|field| field.key == filter)
            .then(|| list.filter().get(filter).unwrap_or_default().to_owned()),
        None
    );
    if let Some(current) = current {
        view_data.search_input = current;
        view_data.prompt = prompt;
        state.dispatch(AppCommand::StartFilter);
    }
}

fn open_task_details<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let Pane::Overview(report) = &view_data.pane else {
        return;
    };
    let Some(task_id) = selected(&report.list, view_data.cursor).map(|task| task.id) else {
        return;
    };
    let Pane::Overview(report) = std::mem::take(&mut view_data.pane) else {
        return;
    };
    view_data.pane = Pane::TaskDetails(DetailsPane::new(task_id, report));
    view_data.cursor = 0;
    debug!(task = %task_id, "task details opened");
    start_load(state, runtime, view_data, tx);
}

fn close_task_details(view_data: &mut ViewData) {
    if !matches!(view_data.pane, Pane::TaskDetails(_)) {
        return;
    }
    if let Pane::TaskDetails(details) = std::mem::take(&mut view_data.pane) {
        view_data.pane = Pane::Overview(details.close());
    }
    view_data.cursor = 0;
}

fn open_form(state: &mut AppState, view_data: &mut ViewData, draft: FormDraft) {
    state.dispatch(AppCommand::OpenForm(draft.kind));
    view_data.form = Some(draft);
}

fn open_create_form<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let kind = match view_data.pane {
        Pane::Employees(_) => FormKind::Employee,
        Pane::Tasks(_) => FormKind::Task,
        Pane::Departments(_) => FormKind::Department,
        Pane::Machines(_) => FormKind::Machine,
        Pane::MyTasks(_) => FormKind::PersonalTask,
        Pane::Dashboard(_) | Pane::Overview(_) | Pane::TaskDetails(_) | Pane::MyOverview(_) => {
            return;
        }
    };
    let mut draft = FormDraft::blank(kind);
    if kind == FormKind::Machine {
        match runtime.next_machine_id() {
            Ok(id) => draft.set("id", id.as_str()),
            Err(error) => {
                emit_status(state, view_data, tx, format!("no suggested machine id: {error}"));
            }
        }
    }
    open_form(state, view_data, draft);
}

fn open_edit_form(state: &mut AppState, view_data: &mut ViewData) {
    let cursor = view_data.cursor;
    let draft = match &view_data.pane {
        Pane::Employees(list) => selected(list, cursor).map(FormDraft::for_employee),
        Pane::Tasks(list) => selected(list, cursor).map(FormDraft::for_task),
        Pane::Departments(list) => selected(list, cursor).map(FormDraft::for_department),
        Pane::Machines(list) => selected(list, cursor).map(FormDraft::for_machine),
        Pane::Dashboard(_)
        | Pane::MyTasks(_)
        | Pane::Overview(_)
        | Pane::TaskDetails(_)
        | Pane::MyOverview(_) => None,
    };
    if let Some(draft) = draft {
        open_form(state, view_data, draft);
    }
}

fn open_assignment_form(state: &mut AppState, view_data: &mut ViewData, kind: FormKind) {
    let Pane::MyTasks(list) = &view_data.pane else {
        return;
    };
    let draft = selected(list, view_data.cursor).map(|assigned| match kind {
        FormKind::TaskReport => FormDraft::for_report(assigned),
        _ => FormDraft::for_status(assigned),
    });
    if let Some(draft) = draft {
        open_form(state, view_data, draft);
    }
}

fn request_delete<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let cursor = view_data.cursor;
    let mut not_mine = false;
    let action = match &view_data.pane {
        Pane::Employees(list) => {
            selected(list, cursor).map(|employee| ConfirmAction::DeleteEmployee(employee.id()))
        }
        Pane::Tasks(list) => selected(list, cursor).map(|task| ConfirmAction::DeleteTask(task.id)),
        Pane::Departments(list) => selected(list, cursor)
            .map(|department| ConfirmAction::DeleteDepartment(department.id)),
        Pane::Machines(list) => {
            selected(list, cursor).map(|machine| ConfirmAction::DeleteMachine(machine.id()))
        }
        Pane::MyTasks(list) => {
            let me = runtime.employee();
            let task = selected(list, cursor).map(|assigned| &assigned.task);
            not_mine = task.is_some_and(|task| !created_by(task, me.as_ref()));
            task.filter(|_| !not_mine)
                .map(|task| ConfirmAction::DeletePersonalTask(task.id))
        }
        Pane::Dashboard(_) | Pane::Overview(_) | Pane::TaskDetails(_) | Pane::MyOverview(_) => {
            None
        }
    };
    if not_mine {
        emit_status(state, view_data, tx, "only tasks you created can be deleted");
        return;
    }
    if let Some(action) = action {
        dispatch(
            state,
            runtime,
            view_data,
            tx,
            AppCommand::RequestConfirmation(action),
        );
    }
}

fn request_bulk_delete<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    if !matches!(view_data.pane, Pane::Employees(_)) {
        return;
    }
    if view_data.marked.is_empty() {
        emit_status(state, view_data, tx, "no employees marked");
        return;
    }
    let ids = view_data.marked.iter().cloned().collect();
    dispatch(
        state,
        runtime,
        view_data,
        tx,
        AppCommand::RequestConfirmation(ConfirmAction::DeleteEmployees(ids)),
    );
}

fn toggle_mark(view_data: &mut ViewData) {
    let Pane::Employees(list) = &view_data.pane else {
        return;
    };
    let Some(id) = selected(list, view_data.cursor).map(Record::id) else {
        return;
    };
    if !view_data.marked.remove(&id) {
        view_data.marked.insert(id);
    }
}

fn created_by(task: &Task, employee: Option<&EmployeeId>) -> bool {
    task.creator
        .as_ref()
        .zip(employee)
        .is_some_and(|(creator, employee)| creator.id == *employee)
}

fn selected<R: Record>(list: &ListView<R>, cursor: usize) -> Option<&R> {
    list.page().rows.get(cursor).copied()
}

fn page_len(pane: &Pane) -> usize {
    with_list!(pane, |list| list.page().rows.len(), 0)
}

fn clamp_cursor(view_data: &mut ViewData) {
    let len = page_len(&view_data.pane);
    view_data.cursor = view_data.cursor.min(len.saturating_sub(1));
}

fn move_cursor(view_data: &mut ViewData, delta: isize) {
    let len = page_len(&view_data.pane);
    if len == 0 {
        view_data.cursor = 0;
        return;
    }
    let next = (view_data.cursor as isize + delta).clamp(0, len as isize - 1);
    view_data.cursor = next as usize;
}

fn turn_page(view_data: &mut ViewData, movement: PageMove) {
    let moved = with_list!(
        &mut view_data.pane,
        |list| match movement {
            PageMove::Next => list.next_page().is_some(),
            PageMove::Prev => list.prev_page().is_some(),
            PageMove::First => list.first_page().is_some(),
            PageMove::Last => list.last_page().is_some(),
        },
        false
    );
    if moved {
        view_data.cursor = 0;
    }
}

fn reload_if_server_filtered<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    if matches!(
        view_data.pane,
        Pane::Tasks(_) | Pane::Overview(_) | Pane::MyOverview(_)
    ) {
        start_load(state, runtime, view_data, tx);
    }
}

/// The filter `key` cycles on this pane. A key may stand for different
/// filters on different lists; the first one the list has wins.
fn filter_key_for(pane: &Pane, key: char) -> Option<&'static str> {
    let candidates: &[&'static str] = match key {
        's' => &["status"],
        't' => &["type"],
        'r' => &["role", "creator"],
        'd' => &["department"],
        'm' => &["machine"],
        'o' => &["overdue"],
        _ => return None,
    };
    with_list!(
        pane,
        |list| candidates
            .iter()
            .copied()
            .find(|filter| list.schema().filters.iter().any(|field| field.key == *filter)),
        None
    )
}

/// Values a filter cycles through, blank first. Department and machine
/// choices come from the loaded records.
fn cycle_values(pane: &Pane, filter: &str) -> Vec<String> {
    let fixed: Option<Vec<&str>> = match filter {
        "status" => Some(status_cycle()),
        "type" => Some(type_cycle()),
        "role" => Some(ROLE_CYCLE.to_vec()),
        "overdue" => Some(OVERDUE_CYCLE.to_vec()),
        "creator" if matches!(pane, Pane::Overview(_)) => Some(CREATOR_TYPE_CYCLE.to_vec()),
        "creator" => Some(ROLE_CYCLE.to_vec()),
        _ => None,
    };
    if let Some(values) = fixed {
        return values.into_iter().map(str::to_owned).collect();
    }

    let mut seen = BTreeSet::new();
    match (pane, filter) {
        (Pane::Employees(list), "department") => {
            seen.extend(list.loaded().iter().filter_map(|employee| {
                employee.department.as_ref().map(|department| department.id)
            }));
        }
        (Pane::Tasks(list) | Pane::Overview(OverviewPane { list, .. }), "department") => {
            seen.extend(
                list.loaded()
                    .iter()
                    .filter_map(|task| task.department.as_ref().map(|department| department.id)),
            );
        }
        (Pane::Machines(list), "department") => {
            seen.extend(list.loaded().iter().filter_map(|machine| {
                machine.department.as_ref().map(|department| department.id)
            }));
        }
        (Pane::Employees(list), "machine") => {
            let machines: BTreeSet<String> = list
                .loaded()
                .iter()
                .flat_map(|employee| employee.assigned_machines.iter())
                .map(|machine| machine.id.to_string())
                .collect();
            return std::iter::once(String::new()).chain(machines).collect();
        }
        _ => {}
    }
    std::iter::once(String::new())
        .chain(seen.into_iter().map(|id| id.to_string()))
        .collect()
}

fn cycle_filter<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: char,
) {
    let Some(filter) = filter_key_for(&view_data.pane, key) else {
        return;
    };
    let values = cycle_values(&view_data.pane, filter);
    let next = with_list!(
        &mut view_data.pane,
        |list| {
            let next = next_in_cycle(&values, list.filter().get(filter));
            list.set_filter(filter, &next);
            next
        },
        return
    );
    view_data.cursor = 0;
    reload_if_server_filtered(state, runtime, view_data, tx);
    let message = if next.is_empty() {
        format!("{filter}: any")
    } else {
        format!("{filter}: {next}")
    };
    emit_status(state, view_data, tx, message);
}

fn cycle_sort(state: &mut AppState, view_data: &mut ViewData, tx: &Sender<InternalEvent>) {
    let now = view_data.options.clock.now();
    view_data.sort_index = view_data.sort_index.wrapping_add(1);
    let index = view_data.sort_index;
    let name = match &mut view_data.pane {
        Pane::Employees(list) => apply_sort_at(list, employee_sorts(), index),
        Pane::Tasks(list) => apply_sort_at(list, task_sorts(now), index),
        Pane::MyTasks(list) => apply_sort_at(list, my_task_sorts(now), index),
        Pane::Departments(list) => apply_sort_at(list, department_sorts(), index),
        Pane::Machines(list) => apply_sort_at(list, machine_sorts(), index),
        Pane::Overview(pane) => apply_sort_at(&mut pane.list, overview_sorts(now), index),
        Pane::MyOverview(list) => apply_sort_at(list, my_task_sorts(now), index),
        Pane::Dashboard(_) | Pane::TaskDetails(_) => return,
    };
    view_data.cursor = 0;
    emit_status(state, view_data, tx, format!("sorted by {name}"));
}

fn apply_sort_at<R: Record>(
    list: &mut ListView<R>,
    mut options: Vec<workdesk_app::SortKey<R>>,
    index: usize,
) -> &'static str {
    if options.is_empty() {
        return list.sort().name;
    }
    let key = options.swap_remove(index % options.len());
    let name = key.name;
    list.apply_sort(Some(key));
    name
}

fn rendered_list(view_data: &ViewData) -> Option<RenderedList> {
    let now = view_data.options.clock.now();
    let mut rendered = match &view_data.pane {
        Pane::Dashboard(_) => return None,
        Pane::Employees(list) => list.render(&EmployeeRows {
            marked: &view_data.marked,
        }),
        Pane::Tasks(list) => list.render(&TaskRows { now }),
        Pane::MyTasks(list) => list.render(&MyTaskRows { now }),
        Pane::Departments(list) => list.render(&views::DepartmentRows),
        Pane::Machines(list) => list.render(&MachineRows),
        Pane::Overview(pane) => pane.list.render(&OverviewRows { now }),
        Pane::TaskDetails(pane) => pane.list.render(&AssignmentRows),
        Pane::MyOverview(list) => list.render(&MyTaskRows { now }),
    };
    let (loaded, failed) = with_list!(
        &view_data.pane,
        |list| (list.is_loaded(), list.last_error().is_some()),
        (true, false)
    );
    if !loaded {
        let message = if failed { "Could not load records" } else { "Loading..." };
        rendered.rows = vec![RenderedRow::Placeholder {
            message: message.to_owned(),
        }];
    }
    Some(rendered)
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let views = state.views();
    let selected = views
        .iter()
        .position(|view| *view == state.active_view)
        .unwrap_or(0);
    let tab_titles = views
        .iter()
        .map(|view| view.label().to_owned())
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("workdesk").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match &view_data.pane {
        Pane::Dashboard(pane) => {
            let body = Paragraph::new(dashboard_text(pane))
                .block(Block::default().borders(Borders::ALL).title("dashboard"));
            frame.render_widget(body, layout[1]);
        }
        _ => render_table(frame, layout[1], view_data),
    }

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if let (AppMode::Form(_), Some(draft)) = (state.mode, &view_data.form) {
        let area = centered_rect(60, 70, frame.area());
        frame.render_widget(Clear, area);
        let form = Paragraph::new(form_text(draft)).block(
            Block::default()
                .title(draft.title())
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(form, area);
    }

    if let Some(pending) = &state.pending {
        let area = centered_rect(50, 20, frame.area());
        frame.render_widget(Clear, area);
        let confirm = Paragraph::new(format!("{}\n\ny confirm | n cancel", pending.prompt))
            .block(
                Block::default()
                    .title("confirm")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(confirm, area);
    }

    if let Some(notice) = &state.notice {
        let area = centered_rect(60, 30, frame.area());
        frame.render_widget(Clear, area);
        let body = Paragraph::new(format!("{}\n\nenter to dismiss", notice.message))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(notice.title.as_str())
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Yellow)),
            );
        frame.render_widget(body, area);
    }
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let Some(rendered) = rendered_list(view_data) else {
        return;
    };
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let columns = rendered.columns.len().max(1);
    let widths = vec![Constraint::Min(4); columns];
    let header = Row::new(rendered.columns.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows = rendered.rows.iter().enumerate().map(|(index, row)| match row {
        RenderedRow::Record { cells, emphasized } => {
            let mut style = Style::default();
            if *emphasized {
                style = style.fg(Color::Red);
            }
            if index == view_data.cursor {
                style = style.bg(Color::DarkGray);
            }
            Row::new(cells.iter().map(|cell| Cell::from(cell.clone()))).style(style)
        }
        RenderedRow::Placeholder { message } => Row::new(vec![
            Cell::from(message.clone()).style(Style::default().fg(Color::DarkGray)),
        ]),
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(list_title(view_data)),
        );
    frame.render_widget(table, sections[0]);

    let mut footer = match &rendered.pagination {
        Some(controls) => format!("{}  {}", rendered.summary, pagination_text(controls)),
        None => rendered.summary.clone(),
    };
    if let Pane::Overview(report) = &view_data.pane
        && let Some(counts) = report_counts(report)
    {
        footer = format!("{counts}  {footer}");
    }
    frame.render_widget(Paragraph::new(footer), sections[1]);
}

fn list_title(view_data: &ViewData) -> String {
    let (filters, sort) = with_list!(
        &view_data.pane,
        |list| {
            let filters = list
                .filter()
                .active()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            (filters, list.sort().name)
        },
        (String::new(), "")
    );
    let mut title = match &view_data.pane {
        Pane::TaskDetails(details) => match details.task() {
            Some(task) => format!("task {}: {}", task.id, task.title),
            None => format!("task {}", details.task_id()),
        },
        pane => pane.kind().label().to_owned(),
    };
    if !filters.is_empty() {
        title.push_str(&format!(" | {filters}"));
    }
    if !sort.is_empty() {
        title.push_str(&format!(" | sort: {sort}"));
    }
    if !view_data.marked.is_empty() {
        title.push_str(&format!(" | {} marked", view_data.marked.len()));
    }
    title
}

fn pagination_text(controls: &PaginationControls) -> String {
    let pages = controls
        .pages
        .iter()
        .map(|page| {
            if *page == controls.current_page {
                format!("[{page}]")
            } else {
                page.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let prev = if controls.prev_enabled { "<" } else { " " };
    let next = if controls.next_enabled { ">" } else { " " };
    format!("{prev} {pages} {next}")
}

/// The server's counts for the current report filters.
fn report_counts(report: &OverviewPane) -> Option<String> {
    let stats = report.statistics()?;
    let mut counts = format!(
        "{} tasks | {} pending | {} in progress | {} completed",
        report.total(),
        stats.pending_tasks,
        stats.in_progress_tasks,
        stats.completed_tasks
    );
    if let Some(overdue) = stats.overdue_tasks {
        counts.push_str(&format!(" | {overdue} overdue"));
    }
    Some(counts)
}

fn dashboard_text(pane: &DashboardPane) -> String {
    let Some(stats) = pane.stats() else {
        return match pane.last_error() {
            Some(error) => format!("stats unavailable: {error}"),
            None => "Loading...".to_owned(),
        };
    };

    let mut lines = Vec::new();
    if let Some(total) = stats.total_employees {
        lines.push(format!("Total employees  {total}"));
    }
    lines.push(format!("Total tasks      {}", stats.total_tasks));
    lines.push(format!("Active tasks     {}", stats.active_tasks));
    if let Some(overdue) = stats.overdue_tasks {
        lines.push(format!("Overdue tasks    {overdue}"));
    }
    lines.push(format!("Completed tasks  {}", stats.completed_tasks));
    if let Some(activity) = pane.activity() {
        let when = |at: Option<PrimitiveDateTime>| at.map(format_local_datetime).unwrap_or_default();
        lines.push(String::new());
        lines.push("Due in the next three days".to_owned());
        if activity.upcoming.is_empty() {
            lines.push("  nothing due".to_owned());
        }
        for task in &activity.upcoming {
            lines.push(format!(
                "  {}  {}  {}",
                when(task.due_date_time),
                task.title,
                task.individual_status.label()
            ));
        }
        lines.push(String::new());
        lines.push("Recently assigned".to_owned());
        if activity.recent.is_empty() {
            lines.push("  nothing new".to_owned());
        }
        for recent in &activity.recent {
            let from = recent
                .task
                .creator
                .as_ref()
                .map(|creator| format!("  from {}", creator.name))
                .unwrap_or_default();
            lines.push(format!("  {}  {}{from}", when(recent.assigned_at), recent.task.title));
        }
    }
    if let Some(error) = pane.last_error() {
        lines.push(String::new());
        lines.push(format!("last refresh failed: {error}"));
    }
    lines.join("\n")
}

fn form_text(draft: &FormDraft) -> String {
    draft
        .fields
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let marker = if index == draft.focus { ">" } else { " " };
            let required = if field.required { "*" } else { "" };
            let value = if field.value.is_empty() && !field.hint.is_empty() {
                format!("({})", field.hint)
            } else {
                field.value.clone()
            };
            format!("{marker} {}{required}: {value}", field.label)
        })
        .chain(std::iter::once(
            "\ntab next | enter save | esc cancel".to_owned(),
        ))
        .collect::<Vec<_>>()
        .join("\n")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let mode = match state.mode {
        AppMode::Nav => "NAV",
        AppMode::Filter => "SEARCH",
        AppMode::Form(_) => "FORM",
        AppMode::Confirm => "CONFIRM",
    };
    let hints = match state.mode {
        AppMode::Nav => match view_data.pane {
            Pane::Dashboard(_) => "tab views | R refresh | q quit".to_owned(),
            Pane::MyTasks(_) => {
                "j/k row | n/p page | / search | s status | enter update | w report | a add | x delete mine"
                    .to_owned()
            }
            Pane::Overview(_) => {
                "enter details | / search | t type | s status | d dept | r creator | F/T dates | c clear"
                    .to_owned()
            }
            Pane::TaskDetails(_) => "esc back | j/k row | s status | R refresh".to_owned(),
            Pane::MyOverview(_) => {
                "j/k row | / search | t type | s status | r creator | o overdue | F/T dates | c clear"
                    .to_owned()
            }
            Pane::Employees(_) => {
                "j/k row | n/p page | / search | a add | e edit | x delete | space mark | X delete marked"
                    .to_owned()
            }
            _ => "j/k row | n/p page | / search | S sort | c clear | a add | e edit | x delete"
                .to_owned(),
        },
        AppMode::Filter => format!(
            "{}: {}_ | enter apply | esc cancel",
            view_data.prompt.filter(),
            view_data.search_input
        ),
        AppMode::Form(kind) => format!("{} | enter save | esc cancel", kind.label()),
        AppMode::Confirm => "y confirm | n cancel".to_owned(),
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
