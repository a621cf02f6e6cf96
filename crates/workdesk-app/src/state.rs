// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::debug;

use crate::error::PortalError;
use crate::{AppMode, DepartmentId, EmployeeId, FormKind, MachineId, Role, TaskId, ViewKind};

/// Containers the front end can open and close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalId {
    Form(FormKind),
    Confirmation,
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteEmployee(EmployeeId),
    DeleteEmployees(Vec<EmployeeId>),
    DeleteTask(TaskId),
    DeletePersonalTask(TaskId),
    DeleteDepartment(DepartmentId),
    DeleteMachine(MachineId),
}

impl ConfirmAction {
    pub fn prompt(&self) -> String {
        match self {
            Self::DeleteEmployee(id) => format!("Delete employee {id}?"),
            Self::DeleteEmployees(ids) => format!("Delete {} selected employees?", ids.len()),
            Self::DeleteTask(id) => format!("Delete task {id}?"),
            Self::DeletePersonalTask(id) => format!("Delete your task {id}?"),
            Self::DeleteDepartment(id) => format!("Delete department {id}?"),
            Self::DeleteMachine(id) => format!("Delete machine {id}?"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub action: ConfirmAction,
    pub prompt: String,
}

impl PendingConfirmation {
    pub fn new(action: ConfirmAction) -> Self {
        let prompt = action.prompt();
        Self { action, prompt }
    }
}

/// A message the user has to dismiss before doing anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl From<&PortalError> for Notice {
    fn from(error: &PortalError) -> Self {
        Self {
            title: error.title().to_owned(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub role: Role,
    pub active_view: ViewKind,
    pub pending: Option<PendingConfirmation>,
    pub notice: Option<Notice>,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::for_role(Role::User)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextView,
    PrevView,
    SelectView(ViewKind),
    StartFilter,
    ExitToNav,
    OpenForm(FormKind),
    RequestConfirmation(ConfirmAction),
    Confirm,
    Cancel,
    ShowNotice(Notice),
    DismissNotice,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    ViewChanged(ViewKind),
    ModalOpened(ModalId),
    ModalClosed(ModalId),
    Confirmed(ConfirmAction),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn for_role(role: Role) -> Self {
        Self {
            mode: AppMode::Nav,
            role,
            active_view: ViewKind::Dashboard,
            pending: None,
            notice: None,
            status_line: None,
        }
    }

    pub fn views(&self) -> &'static [ViewKind] {
        ViewKind::for_role(self.role)
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextView => self.rotate_view(1),
            AppCommand::PrevView => self.rotate_view(-1),
            AppCommand::SelectView(view) => {
                if !self.views().contains(&view) || view == self.active_view {
                    return Vec::new();
                }
                self.active_view = view;
                vec![AppEvent::ViewChanged(view)]
            }
            AppCommand::StartFilter => {
                self.mode = AppMode::Filter;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ExitToNav => {
                let mut events = Vec::new();
                if let AppMode::Form(kind) = self.mode {
                    events.push(AppEvent::ModalClosed(ModalId::Form(kind)));
                }
                self.mode = AppMode::Nav;
                events.push(AppEvent::ModeChanged(self.mode));
                events
            }
            AppCommand::OpenForm(kind) => {
                self.mode = AppMode::Form(kind);
                vec![
                    AppEvent::ModeChanged(self.mode),
                    AppEvent::ModalOpened(ModalId::Form(kind)),
                ]
            }
            AppCommand::RequestConfirmation(action) => {
                self.pending = Some(PendingConfirmation::new(action));
                self.mode = AppMode::Confirm;
                vec![
                    AppEvent::ModeChanged(self.mode),
                    AppEvent::ModalOpened(ModalId::Confirmation),
                ]
            }
            AppCommand::Confirm => {
                let Some(pending) = self.pending.take() else {
                    return Vec::new();
                };
                debug!(prompt = %pending.prompt, "confirmed");
                self.mode = AppMode::Nav;
                vec![
                    AppEvent::ModalClosed(ModalId::Confirmation),
                    AppEvent::ModeChanged(self.mode),
                    AppEvent::Confirmed(pending.action),
                ]
            }
            AppCommand::Cancel => {
                if self.pending.take().is_none() {
                    return Vec::new();
                }
                self.mode = AppMode::Nav;
                vec![
                    AppEvent::ModalClosed(ModalId::Confirmation),
                    AppEvent::ModeChanged(self.mode),
                    self.set_status("cancelled"),
                ]
            }
            AppCommand::ShowNotice(notice) => {
                self.notice = Some(notice);
                vec![AppEvent::ModalOpened(ModalId::Notice)]
            }
            AppCommand::DismissNotice => {
                if self.notice.take().is_none() {
                    return Vec::new();
                }
                vec![AppEvent::ModalClosed(ModalId::Notice)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_view(&mut self, delta: isize) -> Vec<AppEvent> {
        let views = self.views();
        let current = views
            .iter()
            .position(|view| *view == self.active_view)
            .unwrap_or(0) as isize;
        let len = views.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_view = views[next];
        vec![AppEvent::ViewChanged(self.active_view)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
