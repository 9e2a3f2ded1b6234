use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::adaptive::PlacementStrategy;
use crate::game::{GameState, Position};

/// Everything the HUD shows besides the board itself
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HudView {
    pub difficulty: u8,
    pub strategy: PlacementStrategy,
    /// Combined visual intensity, 1..=5
    pub visual_intensity: u8,
    pub elapsed: Duration,
    pub best_score: u32,
    pub show_heatmap: bool,
    /// Normalized heatmap, `heat[row][column]` in `[0, 1]`
    pub heat: Vec<Vec<f64>>,
}

impl HudView {
    fn heat_at(&self, pos: Position) -> f64 {
        if pos.x < 0 || pos.y < 0 {
            return 0.0;
        }
        self.heat
            .get(pos.y as usize)
            .and_then(|row| row.get(pos.x as usize))
            .copied()
            .unwrap_or(0.0)
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState, hud: &HudView) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(chunks[0], state, hud);
        frame.render_widget(stats, chunks[0]);

        // Center the game grid horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        if state.is_alive {
            let grid = self.render_grid(game_area, state, hud);
            frame.render_widget(grid, game_area);
        } else {
            let game_over = self.render_game_over(game_area, state, hud);
            frame.render_widget(game_over, game_area);
        }

        let controls = self.render_controls(chunks[2], hud);
        frame.render_widget(controls, chunks[2]);
    }

    fn render_grid(&self, _area: Rect, state: &GameState, hud: &HudView) -> Paragraph<'_> {
        let accent = intensity_color(hud.visual_intensity);
        let mut lines = Vec::new();

        for y in 0..state.grid_height {
            let mut spans = Vec::new();

            for x in 0..state.grid_width {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == state.snake.head() {
                    Span::styled("■ ", head_style(hud.visual_intensity))
                } else if state.snake.body.contains(&pos) {
                    Span::styled("□ ", Style::default().fg(Color::Green))
                } else if pos == state.food {
                    Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else if hud.show_heatmap {
                    let (glyph, color) = heat_glyph(hud.heat_at(pos));
                    Span::styled(glyph, Style::default().fg(color))
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        let title = if hud.show_heatmap {
            " Snake · heatmap "
        } else {
            " Snake "
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(accent))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, _area: Rect, state: &GameState, hud: &HudView) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = vec![
            Line::from(vec![
                Span::styled("Score: ", label),
                Span::styled(state.score.to_string(), value.add_modifier(Modifier::BOLD)),
                Span::raw("    "),
                Span::styled("Best: ", label),
                Span::styled(hud.best_score.to_string(), value),
                Span::raw("    "),
                Span::styled("Steps: ", label),
                Span::styled(state.steps.to_string(), value),
                Span::raw("    "),
                Span::styled("Time: ", label),
                Span::styled(format_time(hud.elapsed), value),
            ]),
            Line::from(vec![
                Span::styled("Difficulty: ", label),
                Span::styled(
                    format!("{}/10", hud.difficulty),
                    value.add_modifier(Modifier::BOLD),
                ),
                Span::raw("    "),
                Span::styled("Placement: ", label),
                Span::styled(hud.strategy.name(), value),
                Span::raw("    "),
                Span::styled("Intensity: ", label),
                Span::styled(
                    intensity_bar(hud.visual_intensity),
                    Style::default().fg(intensity_color(hud.visual_intensity)),
                ),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_game_over(&self, _area: Rect, state: &GameState, hud: &HudView) -> Paragraph<'_> {
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("Next difficulty: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!("{}/10", hud.difficulty),
                    Style::default().fg(Color::White),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, _area: Rect, hud: &HudView) -> Paragraph<'_> {
        let heatmap_label = if hud.show_heatmap {
            " to hide heatmap | "
        } else {
            " to show heatmap | "
        };

        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("H", Style::default().fg(Color::Magenta)),
            Span::raw(heatmap_label),
            Span::styled("C", Style::default().fg(Color::Magenta)),
            Span::raw(" to clear it | "),
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" to restart | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a duration as MM:SS
fn format_time(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Accent color for a visual intensity level
fn intensity_color(level: u8) -> Color {
    match level {
        0 | 1 => Color::Green,
        2 => Color::LightGreen,
        3 => Color::Yellow,
        4 => Color::LightRed,
        _ => Color::Red,
    }
}

fn head_style(level: u8) -> Style {
    let style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    if level >= 4 {
        style.fg(intensity_color(level))
    } else {
        style
    }
}

fn intensity_bar(level: u8) -> String {
    let filled = level.min(5) as usize;
    format!("{}{}", "●".repeat(filled), "○".repeat(5 - filled))
}

/// Glyph and color for a normalized heat value
fn heat_glyph(value: f64) -> (&'static str, Color) {
    if value <= 0.0 {
        (". ", Color::DarkGray)
    } else if value < 0.25 {
        ("░ ", Color::Blue)
    } else if value < 0.5 {
        ("▒ ", Color::Cyan)
    } else if value < 0.75 {
        ("▓ ", Color::Yellow)
    } else {
        ("█ ", Color::Red)
    }
}
