/// Context key hints shown in the status bar
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusBarState {
    /// Left side hint text (e.g., "j/k: fields  i: edit")
    pub left_hint: String,
    /// Right side hint text (e.g., "Ctrl+h: steps")
    pub right_hint: String,
}

impl StatusBarState {
    fn new(left: &str, right: &str) -> Self {
        Self {
            left_hint: left.to_string(),
            right_hint: right.to_string(),
        }
    }

    pub fn welcome() -> Self {
        Self::new("", "Enter: start enrollment  :q quit")
    }

    pub fn sidebar_normal() -> Self {
        Self::new("j/k: steps", "l/Enter: go to step  :help")
    }

    pub fn form_text_field() -> Self {
        Self::new("j/k: fields  i/Enter: edit", ">: next step  <: back")
    }

    pub fn form_choice_field(loaded: bool) -> Self {
        if loaded {
            Self::new("j/k: fields  Enter: choose  x: clear", ">: next step  <: back")
        } else {
            Self::new("List not loaded", ":retry  >: next step")
        }
    }

    pub fn form_insert() -> Self {
        Self::new("Type to enter text", "Esc/Enter: done  Tab: next field")
    }

    pub fn picker() -> Self {
        Self::new("Type to filter  Up/Down: move", "Enter: select  Esc: close")
    }

    pub fn summary() -> Self {
        Self::new("Review your dossier", "Enter: submit  1-3: correct a step")
    }

    pub fn command_mode() -> Self {
        Self::new("", "Enter: run  Esc: cancel")
    }

    pub fn submitting() -> Self {
        Self::new("Submitting...", "")
    }

    pub fn receipt() -> Self {
        Self::new("Enrollment submitted", "q: quit")
    }
}
