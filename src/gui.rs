//! The chessboard GUI, built with Iced.
//!
//! Model-View-Update: `BoardApp` holds the whole application state,
//! `Message` names every event that can change it, `update` applies the
//! transitions and `view` renders the result. Board state and legality
//! live in the rules library; Black's moves come from a child process
//! reached through [`crate::uci`].

use std::str::FromStr;
use std::time::Duration;

use chess::{Board, BoardStatus, ChessMove, Color, Piece, Square};
use iced::{
    executor, mouse,
    widget::{
        canvas::{self, event, Frame, Geometry, Path, Program, Stroke},
        text, Button, Column, Container, Row, TextInput,
    },
    Application, Command, Element, Font, Length, Pixels, Point, Rectangle, Renderer, Settings,
    Size, Theme,
};
use tracing::{info, warn};

use crate::board::{self, BOARD_SIZE, TILE_SIZE};
use crate::config::Config;
use crate::pieces;
use crate::uci::{self, EngineReply};

const PIECE_FONT: Font = Font::with_name("DejaVu Sans");

/// Width of the evaluation-bar column to the right of the board.
const PANEL_WIDTH: f32 = 50.0;
/// Height of the text strip under the board.
const PANEL_HEIGHT: f32 = 100.0;
const SCENE_WIDTH: f32 = BOARD_SIZE + PANEL_WIDTH;
const SCENE_HEIGHT: f32 = BOARD_SIZE + PANEL_HEIGHT;

/// Runs the GUI application.
pub fn run(config: Config) -> iced::Result {
    BoardApp::run(Settings {
        window: iced::window::Settings {
            size: Size::new(SCENE_WIDTH + 40.0, SCENE_HEIGHT + 180.0),
            ..iced::window::Settings::default()
        },
        ..Settings::with_flags(config)
    })
}

/// Defines the messages that can be sent to the `update` function.
#[derive(Debug, Clone)]
enum Message {
    DragStarted(Point),
    DragMoved(Point),
    DragDropped(Point),
    EngineReplied(Result<EngineReply, String>),
    NewGame,
    UndoMove,
    FenInputChanged(String),
    LoadFen,
}

/// A drag-and-drop gesture in flight: the square the piece was picked up
/// from and the cursor position it is being held at.
#[derive(Debug, Clone, Copy)]
struct Drag {
    from: Square,
    at: Point,
}

/// Represents the current high-level state of the game.
enum Phase {
    PlayerTurn,
    EngineThinking,
    GameOver(String),
}

/// The main application state (the "Model").
struct BoardApp {
    config: Config,

    // --- Game state, owned by the rules library ---
    start: Board,
    board: Board,
    moves: Vec<ChessMove>,

    // --- UI-specific state ---
    drag: Option<Drag>,
    last_engine_move: Option<ChessMove>,
    score_cp: i32,
    engine_move_time: Option<Duration>,
    fen_input: String,
    phase: Phase,
    board_cache: canvas::Cache,
}

impl Application for BoardApp {
    type Executor = executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = Config;

    fn new(config: Config) -> (Self, Command<Message>) {
        let board = Board::default();
        let app = BoardApp {
            config,
            start: board,
            board,
            moves: Vec::new(),
            drag: None,
            last_engine_move: None,
            score_cp: 0,
            engine_move_time: None,
            fen_input: board.to_string(),
            phase: Phase::PlayerTurn,
            board_cache: canvas::Cache::new(),
        };
        (app, Command::none())
    }

    fn title(&self) -> String {
        String::from("Chess Board")
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match self.phase {
            Phase::PlayerTurn => self.handle_player_turn(message),
            Phase::EngineThinking => self.handle_engine_thinking(message),
            Phase::GameOver(_) => self.handle_game_over(message),
        }
    }

    fn view(&'_ self) -> Element<'_, Message> {
        let status_text = match &self.phase {
            Phase::PlayerTurn => "Your move",
            Phase::EngineThinking => "Engine is thinking...",
            Phase::GameOver(ref message) => message.as_str(),
        };

        let canvas = canvas::Canvas::new(BoardCanvas {
            board: self.board,
            drag: self.drag,
            last_engine_move: self.last_engine_move,
            score_cp: self.score_cp,
            engine_move_time: self.engine_move_time,
            cache: &self.board_cache,
        })
        .width(Length::Fixed(SCENE_WIDTH))
        .height(Length::Fixed(SCENE_HEIGHT));

        let controls = Row::new()
            .spacing(10)
            .push(Button::new(text("New Game")).on_press(Message::NewGame))
            .push(Button::new(text("Undo Move")).on_press(Message::UndoMove));

        let fen_controls = Row::new()
            .spacing(10)
            .align_items(iced::Alignment::Center)
            .push(
                TextInput::new("FEN string...", &self.fen_input)
                    .on_input(Message::FenInputChanged)
                    .width(Length::Fill),
            )
            .push(Button::new(text("Load FEN")).on_press(Message::LoadFen));

        let content = Column::new()
            .spacing(20)
            .align_items(iced::Alignment::Center)
            .push(text(status_text).size(Pixels(24.0)))
            .push(canvas)
            .push(controls)
            .push(fen_controls);

        Container::new(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x()
            .center_y()
            .into()
    }
}

// --- Update Helper Functions ---

impl BoardApp {
    /// Handles all messages received when it is the player's turn.
    fn handle_player_turn(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::DragStarted(at) => self.handle_drag_started(at),
            Message::DragMoved(at) => {
                if let Some(drag) = self.drag.as_mut() {
                    drag.at = at;
                    self.board_cache.clear();
                }
                Command::none()
            }
            Message::DragDropped(at) => self.handle_drag_dropped(at),
            Message::NewGame => self.handle_new_game(),
            Message::UndoMove => self.handle_undo_move(),
            Message::FenInputChanged(new_fen) => {
                self.fen_input = new_fen;
                Command::none()
            }
            Message::LoadFen => self.handle_load_fen(),
            _ => Command::none(),
        }
    }

    /// Handles all messages received while the engine is thinking.
    fn handle_engine_thinking(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::EngineReplied(Ok(reply)) => self.handle_engine_reply(reply),
            Message::EngineReplied(Err(error)) => {
                // No retry: the turn simply produces no move.
                warn!(%error, "engine request failed");
                self.phase = Phase::PlayerTurn;
                Command::none()
            }
            // Board input is refused until the engine answers.
            _ => Command::none(),
        }
    }

    /// Handles all messages received after the game has ended.
    fn handle_game_over(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::NewGame => self.handle_new_game(),
            _ => Command::none(),
        }
    }

    /// Picks up a piece of the side to move, if one sits under the cursor.
    fn handle_drag_started(&mut self, at: Point) -> Command<Message> {
        if let Some(square) = board::point_to_square(at.x, at.y) {
            let side_to_move = self.board.side_to_move();
            if self.board.color_on(square) == Some(side_to_move) {
                self.drag = Some(Drag { from: square, at });
                self.board_cache.clear();
            }
        }
        Command::none()
    }

    /// Drops the held piece, shaping and legality-checking the move.
    fn handle_drag_dropped(&mut self, at: Point) -> Command<Message> {
        let drag = match self.drag.take() {
            Some(drag) => drag,
            None => return Command::none(),
        };
        self.board_cache.clear();

        let target = match board::point_to_square(at.x, at.y) {
            Some(square) => square,
            None => return Command::none(),
        };
        let mv = board::coerce_promotion(&self.board, ChessMove::new(drag.from, target, None));
        if !self.board.legal(mv) {
            warn!(%mv, "illegal move attempted");
            return Command::none();
        }
        self.apply_move(mv);
        self.after_move()
    }

    /// Pushes a legality-checked move onto the session.
    fn apply_move(&mut self, mv: ChessMove) {
        self.board = self.board.make_move_new(mv);
        self.moves.push(mv);
        self.fen_input = self.board.to_string();
        self.board_cache.clear();
    }

    /// After any applied move: end the game, or hand Black to the engine.
    fn after_move(&mut self) -> Command<Message> {
        if let Some(message) = board::game_over_text(&self.board) {
            self.phase = Phase::GameOver(message);
            return Command::none();
        }
        if self.board.side_to_move() == Color::Black {
            return self.trigger_engine_move();
        }
        Command::none()
    }

    /// Hands the current position to the engine on a blocking worker.
    fn trigger_engine_move(&mut self) -> Command<Message> {
        self.phase = Phase::EngineThinking;
        let config = self.config.clone();
        let fen = self.board.to_string();

        Command::perform(
            async move {
                tokio::task::spawn_blocking(move || {
                    uci::request_move(&config, &fen).map_err(|error| error.to_string())
                })
                .await
                .unwrap_or_else(|error| Err(error.to_string()))
            },
            Message::EngineReplied,
        )
    }

    /// Applies the engine's answer, discarding illegal or unparseable moves.
    fn handle_engine_reply(&mut self, reply: EngineReply) -> Command<Message> {
        self.phase = Phase::PlayerTurn;
        if let Some(cp) = reply.score_cp {
            self.score_cp = cp;
        }
        self.engine_move_time = Some(reply.elapsed);
        self.board_cache.clear();

        let mv = match ChessMove::from_str(&reply.best_move) {
            Ok(mv) => mv,
            Err(_) => {
                warn!(token = %reply.best_move, "engine sent an unparseable move");
                return Command::none();
            }
        };
        if !self.board.legal(mv) {
            warn!(%mv, "engine attempted an illegal move");
            return Command::none();
        }

        info!(%mv, score_cp = self.score_cp, "engine move");
        self.apply_move(mv);
        self.last_engine_move = Some(mv);
        if let Some(message) = board::game_over_text(&self.board) {
            self.phase = Phase::GameOver(message);
        }
        Command::none()
    }

    /// Resets the application to the initial state for a new game.
    fn handle_new_game(&mut self) -> Command<Message> {
        self.start = Board::default();
        self.board = self.start;
        self.moves.clear();
        self.drag = None;
        self.last_engine_move = None;
        self.score_cp = 0;
        self.engine_move_time = None;
        self.fen_input = self.board.to_string();
        self.phase = Phase::PlayerTurn;
        self.board_cache.clear();
        Command::none()
    }

    /// Undoes the last full turn (player and engine).
    fn handle_undo_move(&mut self) -> Command<Message> {
        if self.moves.len() >= 2 {
            self.moves.truncate(self.moves.len() - 2);
            self.board = board::replay(&self.start, &self.moves);
            self.fen_input = self.board.to_string();
            self.drag = None;
            self.last_engine_move = None;
            self.phase = Phase::PlayerTurn;
            self.board_cache.clear();
        }
        Command::none()
    }

    /// Loads a new position from the FEN string in the input box. A loaded
    /// position with Black to move goes straight to the engine.
    fn handle_load_fen(&mut self) -> Command<Message> {
        match Board::from_str(&self.fen_input) {
            Ok(new_board) => {
                self.start = new_board;
                self.board = new_board;
                self.moves.clear();
                self.drag = None;
                self.last_engine_move = None;
                self.score_cp = 0;
                self.engine_move_time = None;
                self.phase = Phase::PlayerTurn;
                self.board_cache.clear();
                self.after_move()
            }
            Err(error) => {
                warn!(%error, fen = %self.fen_input, "rejected FEN input");
                Command::none()
            }
        }
    }
}

// --- Canvas Drawing Logic ---

struct BoardCanvas<'a> {
    board: Board,
    drag: Option<Drag>,
    last_engine_move: Option<ChessMove>,
    score_cp: i32,
    engine_move_time: Option<Duration>,
    cache: &'a canvas::Cache,
}

impl<'a> Program<Message> for BoardCanvas<'a> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let geometry = self.cache.draw(renderer, bounds.size(), |frame| {
            self.draw_background(frame);
            self.draw_squares(frame);
            self.draw_last_move_highlight(frame);
            self.draw_pieces(frame);
            self.draw_turn_indicator(frame);
            self.draw_move_time(frame);
            self.draw_evaluation_bar(frame);
            self.draw_checkmate_highlight(frame);
        });
        vec![geometry]
    }

    fn update(
        &self,
        _state: &mut Self::State,
        event: event::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (event::Status, Option<Message>) {
        match event {
            event::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(position) = cursor.position_in(bounds) {
                    return (event::Status::Captured, Some(Message::DragStarted(position)));
                }
            }
            event::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if self.drag.is_some() {
                    if let Some(position) = cursor.position_in(bounds) {
                        return (event::Status::Captured, Some(Message::DragMoved(position)));
                    }
                }
            }
            event::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if self.drag.is_some() {
                    // A release outside the canvas abandons the gesture.
                    let position = cursor
                        .position_in(bounds)
                        .unwrap_or(Point::new(-1.0, -1.0));
                    return (event::Status::Captured, Some(Message::DragDropped(position)));
                }
            }
            _ => {}
        }
        (event::Status::Ignored, None)
    }
}

// --- Canvas Drawing Helper Functions ---

impl<'a> BoardCanvas<'a> {
    fn draw_background(&self, frame: &mut Frame) {
        let background = Path::rectangle(Point::ORIGIN, frame.size());
        frame.fill(&background, iced::Color::BLACK);
    }

    fn draw_squares(&self, frame: &mut Frame) {
        for square in chess::ALL_SQUARES {
            let (x, y) = board::square_origin(square);
            let light = (square.get_rank().to_index() + square.get_file().to_index()) % 2 == 1;
            let color = if light {
                iced::Color::from_rgb8(240, 217, 181)
            } else {
                iced::Color::from_rgb8(181, 136, 99)
            };
            let path = Path::rectangle(Point::new(x, y), Size::new(TILE_SIZE, TILE_SIZE));
            frame.fill(&path, color);
        }
    }

    fn outline_square(&self, frame: &mut Frame, square: Square, color: iced::Color) {
        let (x, y) = board::square_origin(square);
        let path = Path::rectangle(Point::new(x, y), Size::new(TILE_SIZE, TILE_SIZE));
        frame.stroke(&path, Stroke::default().with_width(4.0).with_color(color));
    }

    fn draw_last_move_highlight(&self, frame: &mut Frame) {
        if let Some(mv) = self.last_engine_move {
            let green = iced::Color::from_rgb8(0, 255, 0);
            self.outline_square(frame, mv.get_source(), green);
            self.outline_square(frame, mv.get_dest(), green);
        }
    }

    fn draw_pieces(&self, frame: &mut Frame) {
        for square in chess::ALL_SQUARES {
            if self.drag.map_or(false, |drag| drag.from == square) {
                continue;
            }
            if let (Some(piece), Some(color)) =
                (self.board.piece_on(square), self.board.color_on(square))
            {
                let (x, y) = board::square_origin(square);
                let center = Point::new(x + TILE_SIZE / 2.0, y + TILE_SIZE / 2.0);
                self.draw_piece_sprite(frame, piece, color, center);
            }
        }

        // The held piece rides the cursor.
        if let Some(drag) = self.drag {
            if let (Some(piece), Some(color)) =
                (self.board.piece_on(drag.from), self.board.color_on(drag.from))
            {
                self.draw_piece_sprite(frame, piece, color, drag.at);
            }
        }
    }

    fn draw_piece_sprite(&self, frame: &mut Frame, piece: Piece, color: Color, center: Point) {
        let glyph = pieces::glyph(piece, color).to_string();
        let (fill, shadow) = match color {
            Color::White => (
                iced::Color::from_rgb8(248, 248, 248),
                iced::Color::from_rgb8(40, 40, 40),
            ),
            Color::Black => (
                iced::Color::from_rgb8(25, 25, 25),
                iced::Color::from_rgb8(200, 200, 200),
            ),
        };

        let sprite = |content: String, position: Point, color: iced::Color| canvas::Text {
            content,
            position,
            color,
            size: Pixels(TILE_SIZE * 0.9),
            font: PIECE_FONT,
            horizontal_alignment: iced::alignment::Horizontal::Center,
            vertical_alignment: iced::alignment::Vertical::Center,
            line_height: iced::widget::text::LineHeight::default(),
            shaping: iced::widget::text::Shaping::Advanced,
        };

        let shadow_offset = 1.5;
        frame.fill_text(sprite(
            glyph.clone(),
            Point::new(center.x + shadow_offset, center.y + shadow_offset),
            shadow,
        ));
        frame.fill_text(sprite(glyph, center, fill));
    }

    fn draw_turn_indicator(&self, frame: &mut Frame) {
        let turn_text = match self.board.side_to_move() {
            Color::White => "White's turn",
            Color::Black => "Black's turn",
        };
        frame.fill_text(panel_text(
            turn_text.to_string(),
            Point::new(10.0, BOARD_SIZE + 10.0),
            20.0,
        ));
    }

    fn draw_move_time(&self, frame: &mut Frame) {
        if let Some(elapsed) = self.engine_move_time {
            frame.fill_text(panel_text(
                format!("AI move time: {:.2} seconds", elapsed.as_secs_f64()),
                Point::new(10.0, BOARD_SIZE + 30.0),
                20.0,
            ));
        }
    }

    fn draw_evaluation_bar(&self, frame: &mut Frame) {
        let bar_x = BOARD_SIZE + 10.0;
        let bar_width = 10.0;
        let bar_height = BOARD_SIZE;
        // Scores past ten pawns saturate the bar.
        let max_cp = 1000.0;
        let magnitude = (self.score_cp.abs() as f32).min(max_cp);
        let fill_height = magnitude / max_cp * bar_height / 2.0;

        let backdrop = Path::rectangle(
            Point::new(bar_x, 0.0),
            Size::new(bar_width, bar_height),
        );
        frame.fill(&backdrop, iced::Color::from_rgb8(120, 148, 84));

        if self.score_cp > 0 {
            let fill = Path::rectangle(
                Point::new(bar_x, bar_height / 2.0 - fill_height),
                Size::new(bar_width, fill_height),
            );
            frame.fill(&fill, iced::Color::BLACK);
        } else if self.score_cp < 0 {
            let fill = Path::rectangle(
                Point::new(bar_x, bar_height / 2.0),
                Size::new(bar_width, fill_height),
            );
            frame.fill(&fill, iced::Color::WHITE);
        }

        frame.fill_text(panel_text(
            format!("{:.2}", self.score_cp as f32 / 100.0),
            Point::new(BOARD_SIZE + 35.0, bar_height / 2.0 - 10.0),
            16.0,
        ));
    }

    fn draw_checkmate_highlight(&self, frame: &mut Frame) {
        if self.board.status() == BoardStatus::Checkmate {
            let king = self.board.king_square(self.board.side_to_move());
            self.outline_square(frame, king, iced::Color::from_rgb8(255, 0, 0));
        }
    }
}

// --- Utility Functions ---

fn panel_text(content: String, position: Point, size: f32) -> canvas::Text {
    canvas::Text {
        content,
        position,
        color: iced::Color::WHITE,
        size: Pixels(size),
        font: Font::DEFAULT,
        horizontal_alignment: iced::alignment::Horizontal::Left,
        vertical_alignment: iced::alignment::Vertical::Top,
        line_height: iced::widget::text::LineHeight::default(),
        shaping: iced::widget::text::Shaping::Basic,
    }
}
