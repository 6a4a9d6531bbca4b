use blockfall_engine::{Command, Engine, MoveOutcome};
use crossterm::event::{Event, KeyCode};
use log::{debug, info};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout},
    style::{Color, Style},
    text::Line,
    widgets::Block as BlockWidget,
};

use crate::view::widgets::{BoardDisplay, KeyBinding, KeyBindingDisplay};

const PLAYING_BINDINGS: &[KeyBinding] = &[
    (&["←", "→"], "Move"),
    (&["↓"], "Soft Drop"),
    (&["↑"], "Rotate"),
    (&["Space"], "Hard Drop"),
    (&["p"], "Pause"),
    (&["q"], "Quit"),
];
const PAUSED_BINDINGS: &[KeyBinding] = &[(&["p"], "Resume"), (&["q"], "Quit")];
const GAME_OVER_BINDINGS: &[KeyBinding] = &[(&["r"], "Restart"), (&["q"], "Quit")];

const STATUS_STYLE: Style = Style::new().fg(Color::White);
const ALERT_STYLE: Style = Style::new().fg(Color::Yellow);

#[derive(Debug)]
pub(crate) struct PlayScreen {
    engine: Engine,
    paused: bool,
    exiting: bool,
    pieces_locked: usize,
    lines_cleared: usize,
}

impl PlayScreen {
    pub(crate) fn new(engine: Engine) -> Self {
        Self {
            engine,
            paused: false,
            exiting: false,
            pieces_locked: 0,
            lines_cleared: 0,
        }
    }

    pub(crate) fn is_exiting(&self) -> bool {
        self.exiting
    }

    /// Returns whether commands and gravity currently reach the engine.
    pub(crate) fn is_running(&self) -> bool {
        !self.exiting && !self.paused && self.engine.state().is_playing()
    }

    pub(crate) fn handle_event(&mut self, event: &Event) {
        let Some(key) = event.as_key_press_event() else {
            return;
        };
        let game_over = self.engine.state().is_game_over();

        match key.code {
            KeyCode::Left => self.apply(Command::MoveLeft),
            KeyCode::Right => self.apply(Command::MoveRight),
            KeyCode::Down => self.apply(Command::SoftDrop),
            KeyCode::Up => self.apply(Command::Rotate),
            KeyCode::Char(' ') => self.apply(Command::HardDrop),
            KeyCode::Char('p') if !game_over => self.paused = !self.paused,
            KeyCode::Char('r') if game_over => self.restart(),
            KeyCode::Char('q') | KeyCode::Esc => self.exiting = true,
            _ => {}
        }
    }

    pub(crate) fn on_gravity(&mut self) {
        self.apply(Command::SoftDrop);
    }

    fn apply(&mut self, command: Command) {
        if !self.is_running() {
            return;
        }
        match command.apply(&mut self.engine) {
            Ok(outcome) => self.record(outcome),
            Err(e) => debug!("{command:?} rejected: {e}"),
        }
    }

    fn record(&mut self, outcome: MoveOutcome) {
        match outcome {
            MoveOutcome::Moved => {}
            MoveOutcome::Locked { cleared_lines } => {
                self.pieces_locked += 1;
                self.lines_cleared += cleared_lines;
            }
            MoveOutcome::ToppedOut { cleared_lines } => {
                self.pieces_locked += 1;
                self.lines_cleared += cleared_lines;
                info!(
                    "game over: {} pieces locked, {} lines cleared",
                    self.pieces_locked, self.lines_cleared
                );
            }
        }
    }

    fn restart(&mut self) {
        self.engine.reset();
        self.paused = false;
        self.pieces_locked = 0;
        self.lines_cleared = 0;
    }

    fn status_line(&self) -> Line<'static> {
        let counters = format!(
            "Lines: {}  Pieces: {}",
            self.lines_cleared, self.pieces_locked
        );
        if self.engine.state().is_game_over() {
            Line::styled(format!("{counters}  GAME OVER"), ALERT_STYLE)
        } else if self.paused {
            Line::styled(format!("{counters}  PAUSED"), ALERT_STYLE)
        } else {
            Line::styled(counters, STATUS_STYLE)
        }
    }

    fn key_bindings(&self) -> &'static [KeyBinding<'static>] {
        if self.engine.state().is_game_over() {
            GAME_OVER_BINDINGS
        } else if self.paused {
            PAUSED_BINDINGS
        } else {
            PLAYING_BINDINGS
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame<'_>) {
        let board = BoardDisplay::new(self.engine.board())
            .block(BlockWidget::bordered().title(Line::from(" blockfall ").centered()));
        let help = KeyBindingDisplay::new(self.key_bindings()).block(BlockWidget::new());

        let [board_area, status_area, help_area] = Layout::vertical([
            Constraint::Length(board.height()),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .flex(Flex::Center)
        .areas(frame.area());
        let [board_area] = Layout::horizontal([Constraint::Length(board.width())])
            .flex(Flex::Center)
            .areas(board_area);

        frame.render_widget(&board, board_area);
        frame.render_widget(self.status_line().centered(), status_area);
        frame.render_widget(help, help_area);
    }
}
