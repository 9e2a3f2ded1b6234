use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::time::{Interval, interval, interval_at};
use tracing::{debug, info, warn};

use crate::game::{Action, Direction, GameConfig, GameEngine, GameState};
use crate::input::{InputHandler, KeyAction};
use crate::persistence;
use crate::render::{HudView, Renderer};

/// Options for an interactive session beyond the game configuration
#[derive(Debug, Clone, Default)]
pub struct HumanModeOptions {
    /// Where the adaptive state is loaded from and saved to
    pub state_path: Option<PathBuf>,
}

pub struct HumanMode {
    engine: GameEngine,
    state: GameState,
    options: HumanModeOptions,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    pending_direction: Option<Direction>,
    show_heatmap: bool,
    best_score: u32,
    started_at: Instant,
    /// Frozen play time once the game is over
    finished_after: Option<Duration>,
}

impl HumanMode {
    pub fn new(config: GameConfig, options: HumanModeOptions) -> Self {
        let mut engine = GameEngine::new(config);

        if let Some(path) = &options.state_path {
            match persistence::restore_engine(engine.adaptive_mut(), path) {
                Ok(true) => info!(
                    difficulty = engine.adaptive().difficulty(),
                    "resuming adaptive profile"
                ),
                Ok(false) => info!(path = %path.display(), "no saved profile, starting fresh"),
                Err(err) => warn!(error = %format!("{err:#}"), "ignoring saved profile"),
            }
        }

        let state = engine.reset();

        Self {
            engine,
            state,
            options,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            pending_direction: None,
            show_heatmap: false,
            best_score: 0,
            started_at: Instant::now(),
            finished_after: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        // An unfinished game still counts as a session
        self.engine.abandon(&self.state);
        self.save_profile()?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Game speed follows difficulty, so the tick timer is rebuilt when it changes
        let mut tick_period = self.engine.tick_interval();
        let mut tick_timer = game_timer(tick_period);

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event)?;
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    if self.state.is_alive {
                        self.update_game()?;
                    }
                }

                // Render frame
                _ = render_timer.tick() => {
                    let hud = self.hud();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.state, &hud);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }

            let period = self.engine.tick_interval();
            if period != tick_period {
                debug!(?period, "game speed changed");
                tick_period = period;
                tick_timer = game_timer(period);
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            let action = self.input_handler.handle_key_event(key);

            match action {
                KeyAction::GameAction(Action::Move(dir)) => {
                    self.pending_direction = Some(dir);
                }
                KeyAction::GameAction(Action::Continue) => {
                    // No action needed
                }
                KeyAction::Restart => {
                    self.reset_game();
                }
                KeyAction::ToggleHeatmap => {
                    self.show_heatmap = !self.show_heatmap;
                }
                KeyAction::ClearHeatmap => {
                    self.engine.adaptive_mut().reset_heatmap();
                }
                KeyAction::Quit => {
                    self.should_quit = true;
                }
                KeyAction::None => {}
            }
        }

        Ok(())
    }

    fn update_game(&mut self) -> Result<()> {
        let action = self
            .pending_direction
            .map(Action::Move)
            .unwrap_or(Action::Continue);

        self.pending_direction = None;

        let result = self.engine.step(&mut self.state, action);
        self.best_score = self.best_score.max(self.state.score);

        if result.terminated && !self.state.is_alive {
            self.on_game_over();
        }

        Ok(())
    }

    fn on_game_over(&mut self) {
        self.finished_after = Some(self.started_at.elapsed());
        info!(
            score = self.state.score,
            steps = self.state.steps,
            difficulty = self.engine.adaptive().difficulty(),
            "game over"
        );

        if let Err(err) = self.save_profile() {
            warn!(error = %format!("{err:#}"), "failed to save profile");
        }
    }

    fn reset_game(&mut self) {
        self.engine.abandon(&self.state);
        self.state = self.engine.reset();
        self.pending_direction = None;
        self.started_at = Instant::now();
        self.finished_after = None;
    }

    fn save_profile(&self) -> Result<()> {
        match &self.options.state_path {
            Some(path) => persistence::persist_engine(self.engine.adaptive(), path),
            None => Ok(()),
        }
    }

    fn hud(&self) -> HudView {
        let adaptive = self.engine.adaptive();
        HudView {
            difficulty: adaptive.difficulty(),
            strategy: adaptive.placement_strategy(),
            visual_intensity: adaptive.visual_intensity(),
            elapsed: self
                .finished_after
                .unwrap_or_else(|| self.started_at.elapsed()),
            best_score: self.best_score,
            show_heatmap: self.show_heatmap,
            heat: if self.show_heatmap {
                adaptive.normalized_heatmap()
            } else {
                Vec::new()
            },
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

/// A timer whose first tick is one full period away
fn game_timer(period: Duration) -> Interval {
    interval_at(tokio::time::Instant::now() + period, period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptive::AdaptiveConfig;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use tempfile::TempDir;

    fn config() -> GameConfig {
        GameConfig {
            adaptive: AdaptiveConfig {
                seed: Some(4),
                ..AdaptiveConfig::default()
            },
            ..GameConfig::default()
        }
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_game_initialization() {
        let mode = HumanMode::new(config(), HumanModeOptions::default());
        assert!(mode.state.is_alive);
        assert_eq!(mode.state.score, 0);
        assert!(mode.engine.adaptive().session_active());
    }

    #[test]
    fn test_game_reset() {
        let mut mode = HumanMode::new(config(), HumanModeOptions::default());
        mode.state.score = 10;
        mode.state.is_alive = false;
        mode.reset_game();
        assert_eq!(mode.state.score, 0);
        assert!(mode.state.is_alive);
    }

    #[test]
    fn test_restart_mid_game_closes_session() {
        let mut mode = HumanMode::new(config(), HumanModeOptions::default());
        mode.state.score = 3;
        mode.reset_game();

        let performance = mode.engine.adaptive().performance();
        assert_eq!(performance.total_sessions, 1);
        assert_eq!(performance.recent_outcomes, vec![3]);
        assert!(mode.engine.adaptive().session_active());
    }

    #[test]
    fn test_heatmap_toggle() {
        let mut mode = HumanMode::new(config(), HumanModeOptions::default());
        assert!(mode.hud().heat.is_empty());

        mode.handle_event(press(KeyCode::Char('h'))).unwrap();
        let hud = mode.hud();
        assert!(hud.show_heatmap);
        assert_eq!(hud.heat.len(), 20);
    }

    #[test]
    fn test_clear_heatmap_key() {
        let mut mode = HumanMode::new(config(), HumanModeOptions::default());
        mode.update_game().unwrap();
        assert_eq!(mode.engine.adaptive().heatmap_statistics().total_moves, 1);

        mode.handle_event(press(KeyCode::Char('c'))).unwrap();
        assert_eq!(mode.engine.adaptive().heatmap_statistics().total_moves, 0);
    }

    #[test]
    fn test_pending_direction_applies_on_tick() {
        let mut mode = HumanMode::new(config(), HumanModeOptions::default());
        mode.handle_event(press(KeyCode::Down)).unwrap();
        mode.update_game().unwrap();
        assert_eq!(mode.state.snake.direction, Direction::Down);
        assert!(mode.pending_direction.is_none());
    }

    #[test]
    fn test_profile_saved_on_game_over_and_restored() {
        let temp_dir = TempDir::new().unwrap();
        let options = HumanModeOptions {
            state_path: Some(temp_dir.path().join("profile.json")),
        };

        let mut mode = HumanMode::new(config(), options.clone());
        assert!(mode.engine.adaptive_mut().set_difficulty(8));
        // Run straight into the right wall
        while mode.state.is_alive {
            mode.update_game().unwrap();
        }
        assert!(mode.finished_after.is_some());

        let resumed = HumanMode::new(config(), options);
        assert_eq!(resumed.engine.adaptive().difficulty(), 8);
        assert_eq!(resumed.engine.adaptive().performance().total_sessions, 1);
    }
}
