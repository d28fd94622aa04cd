mod config;
mod error;
pub mod national_id;
pub mod options;
pub mod state;
pub mod steps;
pub mod submit;
pub mod ui;
mod widgets;

pub use config::{default_config_path, ApiConfig, CandidateConfig, GeneralConfig, WizardConfig};
pub use error::{Result, WizardError};
pub use options::{FetchOutcome, FetchTicket, OptionCatalog};
pub use state::{FieldId, FieldKind, WizardState};
pub use steps::{Step, StepError, StepResult, ValidationError};
pub use submit::{SubmissionReceipt, SubmitError};
pub use widgets::StatusBarState;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{self, EnrollmentApi, OptionItem, OptionKind};
use crate::ui::Theme;
use crate::vim::{parse_command, Command, InputBuffer, ModeAction, VimMode};
use national_id::normalize_national_id;

/// Results sent back to the UI loop by background tasks
#[derive(Debug)]
pub enum WizardMessage {
    TaskStarted(usize),
    TaskSuccess(usize, Option<String>),
    TaskFailed(usize, String),
    OptionsLoaded {
        ticket: FetchTicket,
        result: api::Result<Vec<OptionItem>>,
    },
    SubmissionFinished(std::result::Result<SubmissionReceipt, SubmitError>),
}

/// Work the event loop must start on behalf of the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardAction {
    /// Confirmed submission of the dossier
    Submit,
    /// Re-fetch the reference lists
    RetryOptions,
}

/// Which panel is focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    /// Welcome screen (before the wizard starts)
    Welcome,
    /// Sidebar with step list
    Sidebar,
    /// Current step form
    Content,
    /// Receipt after a successful submission
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

/// Message displayed to the user
#[derive(Debug, Clone)]
pub struct Message {
    pub text: String,
    pub level: MessageLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Submit,
    Quit,
}

/// Option picker opened on a choice field
#[derive(Debug, Clone)]
pub struct PickerState {
    pub field: FieldId,
    pub kind: OptionKind,
    pub filter: InputBuffer,
    pub selected: usize,
}

/// Status of a submission task
#[derive(Debug, Clone)]
pub struct TaskStatus {
    pub name: String,
    pub status: TaskState,
    pub output: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Success,
    Failed,
}

/// Enrollment wizard controller; owns the form state
pub struct WizardApp {
    pub config: WizardConfig,
    pub theme: Theme,

    // Vim mode state
    pub vim_mode: VimMode,
    pub command_buffer: InputBuffer,

    // Navigation
    pub panel_focus: PanelFocus,
    pub sidebar_cursor: usize,
    pub field_cursor: usize,

    // Form
    pub state: WizardState,
    pub catalog: OptionCatalog,
    pub step_results: [StepResult; 4],
    pub edit_buffer: InputBuffer,
    pub picker: Option<PickerState>,

    // Submission
    pub tasks: Vec<TaskStatus>,
    pub is_executing: bool,
    pub receipt: Option<SubmissionReceipt>,

    // UI state
    pub message: Option<Message>,
    pub confirm_action: Option<ConfirmAction>,
    pub show_help: bool,
    pub should_exit: bool,
    pub status_bar: StatusBarState,
    spinner_frame: usize,

    api: Arc<dyn EnrollmentApi>,
    tx: mpsc::UnboundedSender<WizardMessage>,
}

impl WizardApp {
    pub fn new(
        config: WizardConfig,
        api: Arc<dyn EnrollmentApi>,
        tx: mpsc::UnboundedSender<WizardMessage>,
    ) -> Self {
        let state = WizardState::new(&config.candidate.default_language);

        Self {
            config,
            theme: Theme::default(),
            vim_mode: VimMode::Normal,
            command_buffer: InputBuffer::new(),
            panel_focus: PanelFocus::Welcome,
            sidebar_cursor: 0,
            field_cursor: 0,
            state,
            catalog: OptionCatalog::new(),
            step_results: [StepResult::Pending; 4],
            edit_buffer: InputBuffer::new(),
            picker: None,
            tasks: Vec::new(),
            is_executing: false,
            receipt: None,
            message: None,
            confirm_action: None,
            show_help: false,
            should_exit: false,
            status_bar: StatusBarState::welcome(),
            spinner_frame: 0,
            api,
            tx,
        }
    }

    /// Check if running against the demo backend
    pub fn is_dryrun(&self) -> bool {
        self.config.general.dryrun
    }

    pub fn current_step(&self) -> Step {
        self.state.current_step
    }

    /// Field under the cursor on the current step
    pub fn current_field(&self) -> Option<FieldId> {
        self.current_step().fields().get(self.field_cursor).copied()
    }

    /// Fetch every reference list, plus dependent lists for current selections.
    /// Results arrive as [`WizardMessage::OptionsLoaded`].
    pub fn start_reference_fetches(&mut self) {
        let mut tickets = self.catalog.reference_tickets();
        tickets.extend(self.catalog.dependent_tickets(&self.state));
        info!("Fetching {} option lists", tickets.len());

        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let fetches = tickets.into_iter().map(|ticket| {
                let api = Arc::clone(&api);
                async move {
                    let result = api.list_options(ticket.kind, ticket.query).await;
                    (ticket, result)
                }
            });
            for (ticket, result) in join_all(fetches).await {
                let _ = tx.send(WizardMessage::OptionsLoaded { ticket, result });
            }
        });
    }

    fn spawn_fetch(&self, ticket: FetchTicket) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.list_options(ticket.kind, ticket.query).await;
            let _ = tx.send(WizardMessage::OptionsLoaded { ticket, result });
        });
    }

    /// Set a choice field, fetching dependent lists as needed.
    pub fn select_choice(&mut self, field: FieldId, value: Option<i64>) {
        if let Some(ticket) = self.catalog.select(&mut self.state, field, value) {
            self.spawn_fetch(ticket);
        }
    }

    /// Start the ordered submission in the background.
    pub fn start_submission(&mut self) {
        if self.is_executing {
            return;
        }

        self.tasks = submit::plan(&self.state)
            .iter()
            .map(|task| TaskStatus {
                name: task.name(),
                status: TaskState::Pending,
                output: None,
            })
            .collect();
        self.is_executing = true;
        self.update_status_bar();
        info!("Submitting enrollment ({} tasks)", self.tasks.len());

        let api = Arc::clone(&self.api);
        let state = self.state.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = submit::submit(api.as_ref(), &state, &tx).await;
            let _ = tx.send(WizardMessage::SubmissionFinished(result));
        });
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<WizardAction> {
        // Clear message on any key (unless working)
        if self.message.is_some() && !self.is_executing {
            self.message = None;
        }

        if let Some(action) = self.confirm_action {
            let result = self.handle_confirm_key(key, action);
            self.update_status_bar();
            return result;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                self.show_help = false;
            }
            self.update_status_bar();
            return None;
        }

        if self.is_executing {
            return None;
        }

        let result = if self.panel_focus == PanelFocus::Done {
            self.handle_done_key(key)
        } else if self.picker.is_some() {
            self.handle_picker_key(key);
            None
        } else {
            match self.vim_mode {
                VimMode::Normal => self.handle_normal_mode(key),
                VimMode::Insert => {
                    self.handle_insert_mode(key);
                    None
                }
                VimMode::Command => self.handle_command_mode(key),
            }
        };

        self.update_status_bar();
        result
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) -> Option<WizardAction> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('h') => self.focus_sidebar(),
                KeyCode::Char('l') => self.focus_content(),
                _ => {}
            }
            return None;
        }

        if self.panel_focus == PanelFocus::Welcome {
            match key.code {
                KeyCode::Enter | KeyCode::Char('l') => self.start(),
                KeyCode::Char(':') => self.enter_command_mode(),
                KeyCode::Char('?') | KeyCode::F(1) => self.show_help = true,
                _ => {}
            }
            return None;
        }

        match key.code {
            KeyCode::Char(':') => self.enter_command_mode(),

            KeyCode::Char('j') | KeyCode::Down | KeyCode::Tab => self.navigate_down(),
            KeyCode::Char('k') | KeyCode::Up | KeyCode::BackTab => self.navigate_up(),

            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => match self.panel_focus {
                PanelFocus::Sidebar => {
                    if let Some(step) = Step::from_number(self.sidebar_cursor as u8 + 1) {
                        self.go_to_step(step);
                    }
                }
                _ if self.current_step() == Step::Summary => self.request_submit(),
                _ => self.activate_field(),
            },

            KeyCode::Char('i') | KeyCode::Char('a') => {
                if self.panel_focus == PanelFocus::Content {
                    if let Some(field) = self.current_field() {
                        if !matches!(field.kind(), FieldKind::Choice(_)) {
                            self.begin_edit(field);
                        }
                    }
                }
            }

            KeyCode::Char('x') | KeyCode::Delete => {
                if self.panel_focus == PanelFocus::Content {
                    self.clear_current_field();
                }
            }

            KeyCode::Char('h') | KeyCode::Left | KeyCode::Esc => {
                if self.panel_focus == PanelFocus::Content {
                    self.focus_sidebar();
                }
            }

            KeyCode::Char('>') => {
                self.next_step();
            }
            KeyCode::Char('<') => self.prev_step(),

            KeyCode::Char(c @ '1'..='4') => {
                if let Some(step) = c.to_digit(10).and_then(|n| Step::from_number(n as u8)) {
                    self.go_to_step(step);
                }
            }

            KeyCode::Char('?') | KeyCode::F(1) => self.show_help = true,

            _ => {}
        }
        None
    }

    fn handle_insert_mode(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.commit_edit();
                self.vim_mode = self.vim_mode.transition(ModeAction::Escape);
            }
            KeyCode::Enter => {
                self.commit_edit();
                self.vim_mode = self.vim_mode.transition(ModeAction::Commit);
                self.navigate_down();
            }
            KeyCode::Tab => {
                self.commit_edit();
                self.vim_mode = self.vim_mode.transition(ModeAction::Commit);
                self.navigate_down();
                if let Some(field) = self.current_field() {
                    if !matches!(field.kind(), FieldKind::Choice(_)) {
                        self.begin_edit(field);
                    }
                }
            }
            KeyCode::Backspace => {
                self.edit_buffer.delete_back();
            }
            KeyCode::Delete => {
                self.edit_buffer.delete_forward();
            }
            KeyCode::Left => self.edit_buffer.move_left(),
            KeyCode::Right => self.edit_buffer.move_right(),
            KeyCode::Home => self.edit_buffer.move_start(),
            KeyCode::End => self.edit_buffer.move_end(),
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    match c {
                        'u' => self.edit_buffer.clear(),
                        'w' => self.edit_buffer.delete_word_back(),
                        'a' => self.edit_buffer.move_start(),
                        'e' => self.edit_buffer.move_end(),
                        _ => {}
                    }
                } else {
                    self.edit_buffer.insert(c);
                }
            }
            _ => {}
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => return self.close_picker(),
            KeyCode::Enter => return self.pick_selected(),
            _ => {}
        }

        let count = self.picker_items().len();
        let Some(picker) = self.picker.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Down => {
                if picker.selected + 1 < count {
                    picker.selected += 1;
                }
            }
            KeyCode::Up => {
                picker.selected = picker.selected.saturating_sub(1);
            }
            KeyCode::Backspace => {
                picker.filter.delete_back();
                picker.selected = 0;
            }
            KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => match c {
                'j' | 'n' if picker.selected + 1 < count => picker.selected += 1,
                'k' | 'p' => picker.selected = picker.selected.saturating_sub(1),
                'u' => {
                    picker.filter.clear();
                    picker.selected = 0;
                }
                _ => {}
            },
            KeyCode::Char(c) => {
                picker.filter.insert(c);
                picker.selected = 0;
            }
            _ => {}
        }
    }

    fn pick_selected(&mut self) {
        let Some((field, selected)) = self.picker.as_ref().map(|p| (p.field, p.selected)) else {
            return;
        };
        let chosen = self
            .picker_items()
            .get(selected)
            .map(|item| (item.id, item.label.clone()));
        self.close_picker();

        if let Some((id, label)) = chosen {
            self.select_choice(field, Some(id));
            self.set_info(format!("{}: {}", field.label(), label));
            self.navigate_down();
        }
    }

    fn handle_command_mode(&mut self, key: KeyEvent) -> Option<WizardAction> {
        match key.code {
            KeyCode::Esc => {
                self.vim_mode = self.vim_mode.transition(ModeAction::Escape);
                self.command_buffer.clear();
            }
            KeyCode::Enter => {
                let cmd = self.command_buffer.content().to_string();
                self.vim_mode = self.vim_mode.transition(ModeAction::Execute);
                self.command_buffer.clear();
                return self.execute_command(&cmd);
            }
            KeyCode::Backspace => {
                if self.command_buffer.is_empty() {
                    self.vim_mode = self.vim_mode.transition(ModeAction::Escape);
                } else {
                    self.command_buffer.delete_back();
                }
            }
            KeyCode::Char(c) => {
                self.command_buffer.insert(c);
            }
            _ => {}
        }
        None
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, action: ConfirmAction) -> Option<WizardAction> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.confirm_action = None;
                match action {
                    ConfirmAction::Submit => return Some(WizardAction::Submit),
                    ConfirmAction::Quit => self.should_exit = true,
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_action = None;
            }
            _ => {}
        }
        None
    }

    fn handle_done_key(&mut self, key: KeyEvent) -> Option<WizardAction> {
        if matches!(key.code, KeyCode::Char('q') | KeyCode::Enter | KeyCode::Esc) {
            self.should_exit = true;
        }
        None
    }

    pub fn execute_command(&mut self, cmd: &str) -> Option<WizardAction> {
        let command = match parse_command(cmd) {
            Ok(command) => command,
            Err(e) => {
                self.set_error(e.to_string());
                return None;
            }
        };
        debug!("command {:?}", command);

        if self.panel_focus == PanelFocus::Welcome
            && matches!(command, Command::Next | Command::Back | Command::Goto(_))
        {
            self.start();
            return None;
        }

        match command {
            Command::Next => {
                self.next_step();
            }
            Command::Back => self.prev_step(),
            Command::Goto(step) => self.go_to_step(step),
            Command::Submit => self.request_submit(),
            Command::Retry => return Some(WizardAction::RetryOptions),
            Command::Help => self.show_help = true,
            Command::Quit => {
                if self.receipt.is_some() {
                    self.should_exit = true;
                } else {
                    self.confirm_action = Some(ConfirmAction::Quit);
                }
            }
        }
        None
    }

    fn enter_command_mode(&mut self) {
        self.vim_mode = self.vim_mode.transition(ModeAction::EnterCommand);
        self.command_buffer.clear();
    }

    fn start(&mut self) {
        self.enter_step(Step::Personal);
    }

    fn focus_sidebar(&mut self) {
        if matches!(self.panel_focus, PanelFocus::Content) {
            self.panel_focus = PanelFocus::Sidebar;
            self.sidebar_cursor = self.current_step().index();
        }
    }

    fn focus_content(&mut self) {
        if matches!(self.panel_focus, PanelFocus::Sidebar) {
            self.panel_focus = PanelFocus::Content;
        }
    }

    fn navigate_down(&mut self) {
        match self.panel_focus {
            PanelFocus::Sidebar => {
                if self.sidebar_cursor + 1 < Step::ALL.len() {
                    self.sidebar_cursor += 1;
                }
            }
            PanelFocus::Content => {
                if self.field_cursor + 1 < self.current_step().fields().len() {
                    self.field_cursor += 1;
                }
            }
            PanelFocus::Welcome | PanelFocus::Done => {}
        }
    }

    fn navigate_up(&mut self) {
        match self.panel_focus {
            PanelFocus::Sidebar => self.sidebar_cursor = self.sidebar_cursor.saturating_sub(1),
            PanelFocus::Content => self.field_cursor = self.field_cursor.saturating_sub(1),
            PanelFocus::Welcome | PanelFocus::Done => {}
        }
    }

    /// Reset per-step UI state after the step changed.
    fn enter_step(&mut self, step: Step) {
        self.panel_focus = PanelFocus::Content;
        self.sidebar_cursor = step.index();
        self.field_cursor = 0;
        self.picker = None;
        self.vim_mode = VimMode::Normal;

        if step == Step::Summary {
            if let Some(warning) = self.national_id_warning() {
                self.set_warning(warning);
            }
        }
    }

    /// Validate and move forward; on the summary this asks to submit instead.
    pub fn next_step(&mut self) -> bool {
        let from = self.current_step();
        if from == Step::Summary {
            self.request_submit();
            return false;
        }

        match steps::advance(&mut self.state) {
            Ok(to) => {
                self.step_results[from.index()] = StepResult::Completed;
                self.enter_step(to);
                true
            }
            Err(e) => {
                warn!("{:?} incomplete: {:?}", e.step, e.missing);
                self.step_results[from.index()] = StepResult::Failed;
                if let Some(pos) = e.missing.first().and_then(|f| from.fields().iter().position(|x| x == f)) {
                    self.field_cursor = pos;
                }
                self.set_error(e.to_string());
                false
            }
        }
    }

    pub fn prev_step(&mut self) {
        let step = steps::retreat(&mut self.state);
        self.enter_step(step);
    }

    /// Move to `target` the way the sequencer allows: jump from the summary,
    /// retreat freely, advance one validated step at a time.
    pub fn go_to_step(&mut self, target: Step) {
        let current = self.current_step();
        if target == current {
            self.panel_focus = PanelFocus::Content;
            return;
        }

        if current == Step::Summary {
            match steps::jump_to(&mut self.state, target) {
                Ok(step) => self.enter_step(step),
                Err(e) => self.set_error(e.to_string()),
            }
        } else if target < current {
            while self.current_step() > target {
                steps::retreat(&mut self.state);
            }
            self.enter_step(target);
        } else {
            while self.current_step() < target {
                if !self.next_step() {
                    break;
                }
            }
        }
    }

    /// Ask for confirmation when the whole dossier is valid.
    pub fn request_submit(&mut self) {
        if self.current_step() != Step::Summary {
            self.set_error("Go to the summary to submit".to_string());
            return;
        }

        match steps::validate_all(&self.state) {
            Ok(()) => self.confirm_action = Some(ConfirmAction::Submit),
            Err(e) => {
                self.step_results[e.step.index()] = StepResult::Failed;
                self.set_error(e.to_string());
            }
        }
    }

    fn activate_field(&mut self) {
        let Some(field) = self.current_field() else {
            return;
        };

        match field.kind() {
            FieldKind::Text | FieldKind::File(_) => self.begin_edit(field),
            FieldKind::Choice(kind) => self.open_picker(field, kind),
        }
    }

    fn begin_edit(&mut self, field: FieldId) {
        self.edit_buffer = InputBuffer::with_content(self.state.text(field));
        self.vim_mode = self.vim_mode.transition(ModeAction::EnterInsert);
    }

    fn commit_edit(&mut self) {
        if let Some(field) = self.current_field() {
            self.state.set_text(field, self.edit_buffer.content());
        }
        self.edit_buffer.clear();
    }

    fn clear_current_field(&mut self) {
        let Some(field) = self.current_field() else {
            return;
        };
        match field.kind() {
            FieldKind::Choice(_) => self.select_choice(field, None),
            FieldKind::Text | FieldKind::File(_) => self.state.set_text(field, ""),
        }
    }

    fn open_picker(&mut self, field: FieldId, kind: OptionKind) {
        if self.catalog.list(kind).is_empty() {
            let hint = match field {
                FieldId::Department if self.state.personal.region_id.is_none() => {
                    "Select a region first".to_string()
                }
                FieldId::Program
                    if self.state.academic.diploma_id.is_none()
                        || self.state.academic.bac_series_id.is_none() =>
                {
                    "Select a diploma and a bac series first".to_string()
                }
                _ => format!("No {} available (:retry to reload)", kind.plural_name()),
            };
            self.set_warning(hint);
            return;
        }

        let selected = self
            .state
            .choice(field)
            .and_then(|id| self.catalog.list(kind).iter().position(|item| item.id == id))
            .unwrap_or(0);

        self.picker = Some(PickerState {
            field,
            kind,
            filter: InputBuffer::new(),
            selected,
        });
        self.vim_mode = self.vim_mode.transition(ModeAction::EnterInsert);
    }

    fn close_picker(&mut self) {
        self.picker = None;
        self.vim_mode = self.vim_mode.transition(ModeAction::Escape);
    }

    /// Items of the open picker matching its filter
    pub fn picker_items(&self) -> Vec<&OptionItem> {
        let Some(picker) = &self.picker else {
            return Vec::new();
        };
        let filter = picker.filter.content().to_lowercase();
        self.catalog
            .list(picker.kind)
            .iter()
            .filter(|item| filter.is_empty() || item.label.to_lowercase().contains(&filter))
            .collect()
    }

    /// Display value of a field: option labels for choices, raw text otherwise
    pub fn field_display(&self, field: FieldId) -> String {
        match field.kind() {
            FieldKind::Choice(kind) => match self.state.choice(field) {
                Some(id) => self
                    .catalog
                    .label_for(kind, id)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{id}")),
                None => String::new(),
            },
            FieldKind::Text | FieldKind::File(_) => self.state.text(field).to_string(),
        }
    }

    /// Warning for a national id that will be left out of the enrollment
    pub fn national_id_warning(&self) -> Option<String> {
        let raw = self.state.personal.national_id.trim();
        if raw.is_empty() || normalize_national_id(raw).is_some() {
            return None;
        }
        Some(format!(
            "National ID '{raw}' is not CNIEU followed by 3 digits; it will not be sent"
        ))
    }

    /// Handle a message from a background task
    pub fn handle_wizard_message(&mut self, msg: WizardMessage) {
        match msg {
            WizardMessage::TaskStarted(idx) => {
                if let Some(task) = self.tasks.get_mut(idx) {
                    task.status = TaskState::Running;
                }
            }
            WizardMessage::TaskSuccess(idx, output) => {
                if let Some(task) = self.tasks.get_mut(idx) {
                    task.status = TaskState::Success;
                    task.output = output;
                }
            }
            WizardMessage::TaskFailed(idx, error) => {
                if let Some(task) = self.tasks.get_mut(idx) {
                    task.status = TaskState::Failed;
                    task.output = Some(error);
                }
            }
            WizardMessage::OptionsLoaded { ticket, result } => {
                match self.catalog.apply(&mut self.state, ticket, result) {
                    FetchOutcome::Applied { cleared: Some(field) } => {
                        self.set_warning(format!(
                            "{} cleared: not available for the new selection",
                            field.label()
                        ));
                    }
                    FetchOutcome::Failed(warning) => self.set_warning(warning),
                    FetchOutcome::Applied { cleared: None } | FetchOutcome::Stale => {}
                }
                if let Some(picker) = self.picker.as_mut().filter(|p| p.kind == ticket.kind) {
                    picker.selected = 0;
                }
            }
            WizardMessage::SubmissionFinished(Ok(receipt)) => {
                self.is_executing = false;
                info!(
                    "Enrollment {} submitted for student {} ({} uploads, {} warnings)",
                    receipt.enrollment_id,
                    receipt.student_id,
                    receipt.uploaded.len(),
                    receipt.warnings.len()
                );

                if receipt.warnings.is_empty() {
                    self.set_info(format!("Enrollment #{} submitted", receipt.enrollment_id));
                } else {
                    self.set_warning(format!(
                        "Enrollment #{} submitted, but: {}",
                        receipt.enrollment_id,
                        receipt.warnings.join("; ")
                    ));
                }

                self.step_results = [StepResult::Completed; 4];
                self.state = WizardState::new(&self.config.candidate.default_language);
                self.receipt = Some(receipt);
                self.panel_focus = PanelFocus::Done;
                self.vim_mode = VimMode::Normal;
            }
            WizardMessage::SubmissionFinished(Err(e)) => {
                self.is_executing = false;
                warn!("Submission failed: {}", e);
                if let SubmitError::Incomplete(v) = &e {
                    self.step_results[v.step.index()] = StepResult::Failed;
                }
                self.set_error(e.user_message());
            }
        }
        self.update_status_bar();
    }

    pub fn set_error(&mut self, text: String) {
        self.message = Some(Message {
            text,
            level: MessageLevel::Error,
        });
    }

    pub fn set_warning(&mut self, text: String) {
        self.message = Some(Message {
            text,
            level: MessageLevel::Warning,
        });
    }

    pub fn set_info(&mut self, text: String) {
        self.message = Some(Message {
            text,
            level: MessageLevel::Info,
        });
    }

    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % 4;
        self.update_status_bar();
    }

    pub fn spinner_char(&self) -> char {
        const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
        SPINNER[self.spinner_frame]
    }

    /// Update status bar based on current application state
    pub fn update_status_bar(&mut self) {
        self.status_bar = if self.is_executing {
            StatusBarState::submitting()
        } else if self.vim_mode == VimMode::Command {
            StatusBarState::command_mode()
        } else if self.picker.is_some() {
            StatusBarState::picker()
        } else {
            match self.panel_focus {
                PanelFocus::Welcome => StatusBarState::welcome(),
                PanelFocus::Sidebar => StatusBarState::sidebar_normal(),
                PanelFocus::Done => StatusBarState::receipt(),
                PanelFocus::Content => self.content_status_bar(),
            }
        };
    }

    fn content_status_bar(&self) -> StatusBarState {
        if self.current_step() == Step::Summary {
            return StatusBarState::summary();
        }
        if self.vim_mode == VimMode::Insert {
            return StatusBarState::form_insert();
        }
        match self.current_field().map(|f| f.kind()) {
            Some(FieldKind::Choice(kind)) => {
                StatusBarState::form_choice_field(!self.catalog.list(kind).is_empty())
            }
            _ => StatusBarState::form_text_field(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{ApiCall, RecordingApi};
    use crate::api::{DocumentKind, OptionQuery};
    use std::path::Path;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut WizardApp, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn app_with(api: RecordingApi) -> (WizardApp, Arc<RecordingApi>, mpsc::UnboundedReceiver<WizardMessage>) {
        let api = Arc::new(api);
        let (tx, rx) = mpsc::unbounded_channel();
        let app = WizardApp::new(WizardConfig::default(), api.clone(), tx);
        (app, api, rx)
    }

    fn fill_all(app: &mut WizardApp, dir: &Path) {
        let file = dir.join("scan.pdf");
        std::fs::write(&file, b"scan").unwrap();
        let file = file.to_string_lossy().to_string();

        for step in [Step::Personal, Step::Family] {
            for field in step.required_fields() {
                app.state.set_text(*field, "value");
            }
        }
        for field in [FieldId::Photo, FieldId::IdentityDocument, FieldId::DiplomaFile] {
            app.state.set_text(field, &file);
        }
        for field in [FieldId::Diploma, FieldId::Program, FieldId::ExamCenter, FieldId::DepotCenter] {
            app.state.set_choice(field, Some(1));
        }
    }

    #[tokio::test]
    async fn next_with_missing_photo_stays_on_personal() {
        let (mut app, _api, _rx) = app_with(RecordingApi::new());
        let dir = tempfile::tempdir().unwrap();
        fill_all(&mut app, dir.path());
        app.state.set_text(FieldId::Photo, "");
        app.handle_key(key(KeyCode::Enter));

        app.execute_command("next");

        assert_eq!(app.current_step(), Step::Personal);
        assert_eq!(app.step_results[0], StepResult::Failed);
        assert_eq!(app.current_field(), Some(FieldId::Photo));
        let message = app.message.as_ref().unwrap();
        assert_eq!(message.level, MessageLevel::Error);
        assert!(message.text.contains("photo"));
    }

    #[tokio::test]
    async fn typing_in_insert_mode_sets_the_field() {
        let (mut app, _api, _rx) = app_with(RecordingApi::new());
        app.handle_key(key(KeyCode::Enter)); // welcome -> Personal
        app.handle_key(key(KeyCode::Char('i')));
        assert_eq!(app.vim_mode, VimMode::Insert);

        type_text(&mut app, "Ngono");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.state.text(FieldId::Surname), "Ngono");
        assert_eq!(app.vim_mode, VimMode::Normal);
        assert_eq!(app.current_field(), Some(FieldId::GivenName));
    }

    #[tokio::test]
    async fn picking_a_region_loads_its_departments() {
        let api = RecordingApi::new()
            .with_options(
                OptionKind::Region,
                OptionQuery::All,
                vec![OptionItem::new(1, "Centre"), OptionItem::new(2, "Littoral")],
            )
            .with_options(
                OptionKind::Department,
                OptionQuery::ByRegion { region_id: 2 },
                vec![OptionItem::new(21, "Wouri")],
            );
        let (mut app, api, mut rx) = app_with(api);

        app.start_reference_fetches();
        for _ in 0..OptionKind::REFERENCE.len() {
            let msg = rx.recv().await.unwrap();
            app.handle_wizard_message(msg);
        }
        assert_eq!(app.catalog.list(OptionKind::Region).len(), 2);

        app.handle_key(key(KeyCode::Enter));
        app.field_cursor = Step::Personal
            .fields()
            .iter()
            .position(|f| *f == FieldId::Region)
            .unwrap();
        app.handle_key(key(KeyCode::Enter));
        assert!(app.picker.is_some());

        type_text(&mut app, "lit");
        assert_eq!(app.picker_items().len(), 1);
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.state.personal.region_id, Some(2));
        assert!(app.picker.is_none());

        let msg = rx.recv().await.unwrap();
        app.handle_wizard_message(msg);
        assert_eq!(app.catalog.label_for(OptionKind::Department, 21), Some("Wouri"));
        assert!(api.calls().contains(&ApiCall::ListOptions(
            OptionKind::Department,
            OptionQuery::ByRegion { region_id: 2 }
        )));
    }

    #[tokio::test]
    async fn failed_reference_fetch_is_a_warning() {
        let api = RecordingApi::new();
        api.failing_options.lock().unwrap().insert(OptionKind::ExamCenter);
        let (mut app, _api, mut rx) = app_with(api);

        app.start_reference_fetches();
        let mut warned = false;
        for _ in 0..OptionKind::REFERENCE.len() {
            let msg = rx.recv().await.unwrap();
            app.handle_wizard_message(msg);
            warned |= app
                .message
                .as_ref()
                .is_some_and(|m| m.level == MessageLevel::Warning && m.text.contains("exam centers"));
        }

        assert!(warned);
        assert!(app.catalog.list(OptionKind::ExamCenter).is_empty());
    }

    #[tokio::test]
    async fn summary_jumps_back_and_sidebar_walks_forward() {
        let (mut app, _api, _rx) = app_with(RecordingApi::new());
        let dir = tempfile::tempdir().unwrap();
        fill_all(&mut app, dir.path());
        app.handle_key(key(KeyCode::Enter));

        app.handle_key(key(KeyCode::Char('4')));
        assert_eq!(app.current_step(), Step::Summary);
        assert_eq!(app.step_results[..3], [StepResult::Completed; 3]);

        app.execute_command("goto 2");
        assert_eq!(app.current_step(), Step::Academic);
        app.handle_key(key(KeyCode::Char('<')));
        assert_eq!(app.current_step(), Step::Personal);
    }

    #[tokio::test]
    async fn malformed_national_id_warns_on_summary() {
        let (mut app, _api, _rx) = app_with(RecordingApi::new());
        let dir = tempfile::tempdir().unwrap();
        fill_all(&mut app, dir.path());
        app.state.set_text(FieldId::NationalId, "CNIEU12");
        app.handle_key(key(KeyCode::Enter));

        app.go_to_step(Step::Summary);

        let message = app.message.as_ref().unwrap();
        assert_eq!(message.level, MessageLevel::Warning);
        assert!(message.text.contains("CNIEU12"));
    }

    #[tokio::test]
    async fn confirmed_submission_ends_on_receipt() {
        let (mut app, api, mut rx) = app_with(RecordingApi::new());
        let dir = tempfile::tempdir().unwrap();
        fill_all(&mut app, dir.path());
        app.handle_key(key(KeyCode::Enter));
        app.go_to_step(Step::Summary);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.confirm_action, Some(ConfirmAction::Submit));
        let action = app.handle_key(key(KeyCode::Char('y')));
        assert_eq!(action, Some(WizardAction::Submit));

        app.start_submission();
        assert!(app.is_executing);
        assert_eq!(app.tasks.len(), 5);

        while app.is_executing {
            let msg = rx.recv().await.unwrap();
            app.handle_wizard_message(msg);
        }

        assert_eq!(app.panel_focus, PanelFocus::Done);
        assert_eq!(app.receipt.as_ref().map(|r| r.enrollment_id), Some(501));
        assert!(app.tasks.iter().all(|t| t.status == TaskState::Success));
        assert_eq!(app.state.text(FieldId::Surname), "");
        assert_eq!(api.calls().len(), 5);
    }

    #[tokio::test]
    async fn submit_outside_summary_is_refused() {
        let (mut app, _api, _rx) = app_with(RecordingApi::new());
        app.handle_key(key(KeyCode::Enter));
        app.execute_command("submit");
        assert!(app.confirm_action.is_none());
        assert_eq!(app.message.as_ref().unwrap().level, MessageLevel::Error);
    }

    #[tokio::test]
    async fn retry_is_handed_to_the_loop() {
        let (mut app, _api, _rx) = app_with(RecordingApi::new());
        assert_eq!(app.execute_command("retry"), Some(WizardAction::RetryOptions));
        assert_eq!(app.execute_command("bogus"), None);
        assert!(app.message.is_some());
    }

    #[tokio::test]
    async fn diploma_upload_failure_still_reaches_receipt_with_warning() {
        let mut api = RecordingApi::new();
        api.failing_uploads.insert(DocumentKind::Diploma);
        let (mut app, api, mut rx) = app_with(api);
        let dir = tempfile::tempdir().unwrap();
        fill_all(&mut app, dir.path());
        app.handle_key(key(KeyCode::Enter));
        app.go_to_step(Step::Summary);

        app.start_submission();
        while app.is_executing {
            let msg = rx.recv().await.unwrap();
            app.handle_wizard_message(msg);
        }

        assert_eq!(app.panel_focus, PanelFocus::Done);
        let receipt = app.receipt.as_ref().unwrap();
        assert_eq!(receipt.enrollment_id, 501);
        assert!(!receipt.uploaded.contains(&DocumentKind::Diploma));

        let message = app.message.as_ref().unwrap();
        assert_eq!(message.level, MessageLevel::Warning);
        assert!(message.text.contains("diploma"));

        let diploma = app.tasks.iter().find(|t| t.name == "Uploading diploma").unwrap();
        assert_eq!(diploma.status, TaskState::Failed);
        assert!(api
            .calls()
            .iter()
            .any(|c| matches!(c, ApiCall::CreateEnrollment(_))));
    }
}
