//! Terminal UI rendering with ratatui

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use stackdrop::board::{Cell, BOARD_HEIGHT, BOARD_WIDTH};
use stackdrop::game::{Game, GameState};
use stackdrop::piece::Piece;
use stackdrop::settings::Settings;

const EMPTY: &str = "  ";

/// Total width needed: stats(14) + board(22) + next(14) = 50
const GAME_WIDTH: u16 = 50;
/// Total height needed: board(20) + 2 buffer rows + 2 for borders = 24
const GAME_HEIGHT: u16 = 24;
/// Number of rows to show above the visible board (spawn area)
const VISIBLE_BUFFER: i32 = 2;
/// Times cleared rows blink before they go
const CLEAR_FLASHES: f64 = 3.0;

/// Render the entire game UI
pub fn render_game(frame: &mut Frame, game: &Game, settings: &Settings) {
    let area = frame.area();
    let (block_char, _) = settings.visual.block_chars();

    // Center the game area
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    // Create main layout: stats | board | next
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(14), // Stats
            Constraint::Length(22), // Board (10*2 + 2 for borders)
            Constraint::Length(14), // Next piece
        ])
        .split(game_area);

    render_stats(frame, main_layout[0], game);
    render_board(frame, main_layout[1], game, settings);

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0)])
        .split(main_layout[2]);
    render_next(frame, right_layout[0], &game.next_piece, block_char);

    // Overlays
    match game.state {
        GameState::Paused => render_overlay(frame, area, "PAUSED", "Press P to resume"),
        GameState::GameOver => render_overlay(frame, area, "GAME OVER", "R restart  Q quit"),
        GameState::Playing => {}
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the next piece box
fn render_next(frame: &mut Frame, area: Rect, next: &Piece, block_char: &str) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 1 || inner.width < 4 {
        return;
    }

    let shape = &next.shape;
    let lines: Vec<Line> = (0..shape.height())
        .map(|row| {
            let spans: Vec<Span> = (0..shape.width())
                .map(|col| {
                    if shape.is_filled(col, row) {
                        Span::styled(block_char, Style::default().fg(next.color))
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

/// Render the game board
fn render_board(frame: &mut Frame, area: Rect, game: &Game, settings: &Settings) {
    let (block_char, ghost_char) = settings.visual.block_chars();

    let block = Block::default()
        .title(" STACKDROP ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let active: Vec<(i32, i32)> = game
        .current_piece
        .as_ref()
        .map(|piece| piece.cells().collect())
        .unwrap_or_default();
    let color = game.current_piece.as_ref().map_or(Color::Reset, |p| p.color);

    let ghost: Vec<(i32, i32)> = match (&game.current_piece, game.ghost_y()) {
        (Some(piece), Some(y)) if settings.visual.show_ghost => {
            piece.shifted(0, y - piece.y).cells().collect()
        }
        _ => Vec::new(),
    };

    // Cleared rows blink until the batch finishes
    let (flashing, flash_on) = match game.line_clear() {
        Some((rows, progress)) => (rows, (progress * CLEAR_FLASHES * 2.0) as u32 % 2 == 0),
        None => (&[][..], false),
    };

    // Render from top to bottom (buffer rows first, then main board)
    let lines: Vec<Line> = (-VISIBLE_BUFFER..BOARD_HEIGHT as i32)
        .map(|y| {
            let is_buffer_row = y < 0;
            let is_flashing = y >= 0 && flashing.contains(&(y as usize));
            let spans: Vec<Span> = (0..BOARD_WIDTH as i32)
                .map(|x| {
                    let (text, style) = if active.contains(&(x, y)) {
                        (block_char, Style::default().fg(color))
                    } else if is_flashing {
                        let fg = if flash_on { Color::White } else { Color::DarkGray };
                        (block_char, Style::default().fg(fg))
                    } else if !is_buffer_row && ghost.contains(&(x, y)) {
                        (ghost_char, Style::default().fg(color).dim())
                    } else {
                        match game.board.get(x, y) {
                            Some(Cell::Filled(color)) => (block_char, Style::default().fg(color)),
                            _ => (EMPTY, Style::default()),
                        }
                    };
                    Span::styled(text, style)
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

fn stat(lines: &mut Vec<Line<'static>>, label: &'static str, value: String, color: Color) {
    if !lines.is_empty() {
        lines.push(Line::raw(""));
    }
    lines.push(Line::from(Span::styled(label, Style::default().fg(Color::Gray))));
    lines.push(Line::from(Span::styled(value, Style::default().fg(color).bold())));
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, game: &Game) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let config = game.config();
    let mut lines = Vec::new();
    stat(&mut lines, "SCORE", game.score.points.to_string(), Color::Yellow);
    stat(&mut lines, "LEVEL", game.score.level.to_string(), Color::Cyan);
    stat(&mut lines, "LINES", game.score.lines.to_string(), Color::Green);
    stat(&mut lines, "PALETTE", config.palette.name().to_string(), Color::Magenta);
    let animations = if config.animations { "on" } else { "off" };
    stat(&mut lines, "ANIMATION", animations.to_string(), Color::Blue);

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render an overlay (for pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_width = 24u16;
    let popup_height = 5u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle, Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
