use qdl_core::DialogueBranch;

pub(crate) const CHOICE_VIEWPORT_ROWS: usize = 5;

#[derive(Debug, Default)]
pub(crate) struct TuiUiState {
    pub(crate) header: String,
    pub(crate) message: String,
    pub(crate) typing_chars: usize,
    pub(crate) choices: Vec<String>,
    pub(crate) selected_choice_index: usize,
    pub(crate) choice_scroll_offset: usize,
    pub(crate) fresh_turn: bool,
    pub(crate) ended: bool,
    pub(crate) help_visible: bool,
    pub(crate) status: String,
}

impl TuiUiState {
    pub(crate) fn new() -> Self {
        Self {
            fresh_turn: true,
            status: "ready".to_string(),
            ..Self::default()
        }
    }

    /// Shows `branch` with `cursor` highlighted. The message restarts its
    /// typewriter only when a new turn begins.
    pub(crate) fn show_branch(&mut self, branch: &DialogueBranch, cursor: usize) {
        if self.fresh_turn || self.header != branch.header() {
            self.header = branch.header().to_string();
            self.message = branch.message().to_string();
            self.typing_chars = 0;
            self.choices = branch
                .objects()
                .iter()
                .map(|object| object.response().to_string())
                .collect();
            self.selected_choice_index = 0;
            self.choice_scroll_offset = 0;
            self.fresh_turn = false;
        }
        self.ended = false;
        self.select(cursor);
    }

    pub(crate) fn select(&mut self, cursor: usize) {
        let last = self.choices.len().saturating_sub(1);
        self.selected_choice_index = cursor.min(last);
        if self.selected_choice_index < self.choice_scroll_offset {
            self.choice_scroll_offset = self.selected_choice_index;
        }
        if self.selected_choice_index >= self.choice_scroll_offset + CHOICE_VIEWPORT_ROWS {
            self.choice_scroll_offset = self.selected_choice_index + 1 - CHOICE_VIEWPORT_ROWS;
        }
    }

    pub(crate) fn start_new_turn(&mut self) {
        self.fresh_turn = true;
    }

    pub(crate) fn mark_ended(&mut self) {
        self.header.clear();
        self.message.clear();
        self.typing_chars = 0;
        self.choices.clear();
        self.selected_choice_index = 0;
        self.choice_scroll_offset = 0;
        self.fresh_turn = true;
        self.ended = true;
    }

    pub(crate) fn typing_in_progress(&self) -> bool {
        self.typing_chars < self.message.chars().count()
    }

    pub(crate) fn advance_typewriter(&mut self) -> bool {
        if !self.typing_in_progress() {
            return false;
        }
        self.typing_chars += 1;
        true
    }

    pub(crate) fn finish_typing(&mut self) {
        self.typing_chars = self.message.chars().count();
    }

    pub(crate) fn visible_message(&self) -> String {
        self.message.chars().take(self.typing_chars).collect()
    }
}
