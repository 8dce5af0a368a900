// Editor composition root: owns the modal state, the command bus and the
// cursor renderer for one document, and applies dispatched commands to it.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::bus::{CommandBus, Dispatcher, ListenerHandle, PRIORITY_LOW};
use crate::caret::{move_caret_vertically, scroll_selection_into_view};
use crate::config::types::{Config, MotionConfig};
use crate::cursor::offset::{ContainerOffset, OffsetTracker, RemeasureTimer};
use crate::cursor::{CursorBox, CursorRenderer};
use crate::document::TextDocument;
use crate::geometry::SelectionPort;
use crate::input::{Key, KeyEvent, NamedKey};
use crate::vim::command::{CommandTable, EditorCommand};
use crate::vim::{EditMode, KeyOutcome, Vim};

/// One editor instance over a document backend.
pub struct Editor<B: SelectionPort + TextDocument> {
    backend: B,
    vim: Vim,
    bus: CommandBus<EditorCommand>,
    dispatcher: Dispatcher<EditorCommand>,
    cursor: Rc<RefCell<CursorRenderer>>,
    offsets: OffsetTracker,
    remeasure: RemeasureTimer,
    motion: MotionConfig,
    _listeners: Vec<ListenerHandle>,
}

impl<B: SelectionPort + TextDocument> Editor<B> {
    /// Build the editor and broadcast the initial mode.
    pub fn new(backend: B, config: &Config) -> Self {
        let bus = CommandBus::new();
        let dispatcher = bus.dispatcher();
        let cursor = Rc::new(RefCell::new(CursorRenderer::new(config.cursor.clone())));

        let renderer = Rc::clone(&cursor);
        let mode_listener = bus.register(PRIORITY_LOW, move |command| {
            if let EditorCommand::ModeChange(mode) = command {
                renderer.borrow_mut().set_mode(*mode);
            }
            false
        });

        let mut editor = Self {
            backend,
            vim: Vim::new(CommandTable::with_bindings(&config.keys.bindings)),
            bus,
            dispatcher,
            cursor,
            offsets: OffsetTracker::new(),
            remeasure: RemeasureTimer::new(Duration::from_millis(
                config.view.sidebar_transition_ms,
            )),
            motion: config.motion.clone(),
            _listeners: vec![mode_listener],
        };

        editor
            .dispatcher
            .dispatch(EditorCommand::ModeChange(EditMode::default()));
        editor.process_pending();
        editor
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn mode(&self) -> EditMode {
        self.vim.mode()
    }

    pub fn pending_keys(&self) -> &str {
        self.vim.pending_keys()
    }

    pub fn horizontal_anchor(&self) -> Option<f64> {
        self.vim.horizontal()
    }

    pub fn cursor_box(&self) -> Option<CursorBox> {
        self.cursor.borrow().render()
    }

    /// A sender for commands from outside the keyboard path.
    pub fn dispatcher(&self) -> Dispatcher<EditorCommand> {
        self.dispatcher.clone()
    }

    /// Observe applied commands. Observers run after the editor applied the
    /// command, highest priority first.
    pub fn subscribe<F>(&self, priority: u8, listener: F) -> ListenerHandle
    where
        F: FnMut(&EditorCommand) -> bool + 'static,
    {
        self.bus.register(priority, listener)
    }

    /// Keydown entry point. Keys the modal layer does not intercept are
    /// inserted natively while in Edit mode.
    pub fn handle_key(&mut self, event: &KeyEvent) -> KeyOutcome {
        let outcome = self.vim.handle_keydown(event, &self.dispatcher);
        if outcome == KeyOutcome::PassThrough && self.vim.mode() == EditMode::Edit {
            self.native_input(event);
        }
        self.process_pending();
        outcome
    }

    /// Place the caret at a viewport point.
    pub fn handle_click(&mut self, x: f64, y: f64) {
        self.vim.reset_horizontal();
        match self.backend.caret_range_from_point(x, y) {
            Some(range) => self.backend.set_selection(range),
            None => log::debug!("Click at ({x}, {y}) hit no text"),
        }
        self.cursor.borrow_mut().focus();
        self.sync_cursor();
    }

    pub fn focus_out(&mut self) {
        self.cursor.borrow_mut().blur();
    }

    /// Re-focus the editor.
    pub fn focus(&mut self) {
        self.dispatcher.dispatch(EditorCommand::Focus);
        self.process_pending();
    }

    pub fn set_container_offset(&mut self, offset: Option<ContainerOffset>) {
        self.offsets.set_measured(offset);
        self.cursor.borrow_mut().set_offset(self.offsets.combined());
    }

    pub fn set_scroll_position(&mut self, scroll: ContainerOffset) {
        self.offsets.set_scroll_position(scroll);
        self.cursor.borrow_mut().set_offset(self.offsets.combined());
    }

    /// A sidebar started its open/close transition; re-measure the container
    /// once it settles.
    pub fn on_sidebar_toggled(&mut self, now: Instant) {
        self.remeasure.schedule(now);
    }

    /// Run due timers. `measure` reads the container's current offset.
    /// Returns whether a re-measure happened.
    pub fn tick<F>(&mut self, now: Instant, measure: F) -> bool
    where
        F: FnOnce() -> Option<ContainerOffset>,
    {
        if !self.remeasure.due(now) {
            return false;
        }
        self.set_container_offset(measure());
        true
    }

    /// Apply every queued command, notifying observers after each.
    pub fn process_pending(&mut self) {
        while let Some(command) = self.bus.try_next() {
            self.apply(command);
            self.bus.notify(&command);
            self.sync_cursor();
        }
    }

    fn apply(&mut self, command: EditorCommand) {
        match command {
            EditorCommand::ModeChange(mode) => {
                self.vim.set_mode(mode);
                self.vim.reset_horizontal();
            }
            EditorCommand::MoveVertical(direction) => {
                match move_caret_vertically(
                    &mut self.backend,
                    direction,
                    self.vim.horizontal(),
                    &self.motion,
                ) {
                    Ok(x) => self.vim.set_horizontal(x),
                    Err(err) => {
                        log::debug!("Vertical motion failed: {err}");
                        self.vim.reset_horizontal();
                    }
                }
                scroll_selection_into_view(&mut self.backend);
            }
            EditorCommand::MoveHorizontal(direction) => {
                self.backend.move_character(direction.is_backward());
                self.after_edit();
            }
            EditorCommand::DeleteCharacter(direction) => {
                self.backend.delete_character(direction.is_backward());
                self.after_edit();
            }
            EditorCommand::DeleteWord(direction) => {
                self.backend.delete_word(direction.is_backward());
                self.after_edit();
            }
            EditorCommand::DeleteLine => {
                self.backend.delete_line();
                self.after_edit();
            }
            EditorCommand::Undo => {
                if !self.backend.undo() {
                    log::debug!("Nothing to undo");
                }
            }
            EditorCommand::Redo => {
                if !self.backend.redo() {
                    log::debug!("Nothing to redo");
                }
            }
            EditorCommand::Focus => self.cursor.borrow_mut().focus(),
        }
    }

    fn after_edit(&mut self) {
        self.vim.reset_horizontal();
        scroll_selection_into_view(&mut self.backend);
    }

    fn native_input(&mut self, event: &KeyEvent) {
        if event.modifiers.has_command_modifier() {
            return;
        }
        let changed = match &event.key {
            Key::Character(text) => self.backend.insert_text(text),
            Key::Named(NamedKey::Enter) => self.backend.split_paragraph(),
            Key::Named(NamedKey::Backspace) => self.backend.delete_character(true),
            Key::Named(NamedKey::Delete) => self.backend.delete_character(false),
            Key::Named(NamedKey::ArrowLeft) => self.backend.move_character(true),
            Key::Named(NamedKey::ArrowRight) => self.backend.move_character(false),
            Key::Named(_) => false,
        };
        if changed {
            self.after_edit();
            self.sync_cursor();
        }
    }

    fn sync_cursor(&mut self) {
        if let Err(err) = self.cursor.borrow_mut().on_selection_change(&self.backend) {
            log::debug!("Cursor kept its last position: {err}");
        }
    }
}
