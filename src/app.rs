use crate::api::ApiClient;
use crate::commands;
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::renderfns::{draw_footer, draw_header};
use crate::ui::view::{View, ViewAction, ViewContext};
use crate::ui::views::resource_view;
use color_eyre::{eyre::eyre, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{info, warn};

const TICK_RATE: Duration = Duration::from_millis(100);

/// Main application state
pub struct App {
  /// Navigation stack - root is always at index 0
  view_stack: Vec<Box<dyn View>>,
  command: CommandInput,
  ctx: ViewContext,
  title: String,
  should_quit: bool,
}

impl App {
  /// Build the app with `resource` as the root view.
  ///
  /// Must be called from within a tokio runtime: the root view starts
  /// fetching immediately.
  pub fn new(config: Config, resource: &str) -> Result<Self> {
    let api = ApiClient::new(&config)?;
    let ctx = ViewContext::new(api, config.listing.clone());

    let root = commands::resolve(resource)
      .and_then(|name| resource_view(name, &ctx))
      .ok_or_else(|| eyre!("Unknown resource '{}'", resource))?;

    Ok(Self {
      view_stack: vec![root],
      command: CommandInput::new(),
      ctx,
      title: config.title.unwrap_or_else(|| "stockroom".to_string()),
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let result = self.event_loop().await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut events = EventHandler::new(TICK_RATE);

    while !self.should_quit {
      terminal.draw(|frame| self.render(frame))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.tick(),
        Some(Event::Resize) => {}
        None => break,
      }
    }

    Ok(())
  }

  fn tick(&mut self) {
    // Views below the top keep polling so their state is current on return
    for view in &mut self.view_stack {
      view.tick();
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let view_has_input = self.view_stack.last().is_some_and(|v| v.input_active());
    if !view_has_input {
      match self.command.handle_key(key) {
        KeyResult::Handled | KeyResult::Event(CommandEvent::Cancelled) => return,
        KeyResult::Event(CommandEvent::Submitted(cmd)) => {
          self.execute_command(&cmd);
          return;
        }
        KeyResult::NotHandled => {}
      }
    }

    let Some(view) = self.view_stack.last_mut() else {
      return;
    };
    match view.handle_key(key) {
      ViewAction::None => {}
      ViewAction::Push(next) => self.view_stack.push(next),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else if key.code == KeyCode::Char('q') {
          self.should_quit = true;
        }
      }
    }
  }

  fn execute_command(&mut self, cmd: &str) {
    if cmd == "quit" {
      self.should_quit = true;
      return;
    }

    match resource_view(cmd, &self.ctx) {
      Some(view) => {
        info!(resource = cmd, "switching root view");
        // Dropping the old views cancels their in-flight fetches
        self.view_stack.clear();
        self.view_stack.push(view);
      }
      None => warn!(command = cmd, "unknown command"),
    }
  }

  fn render(&mut self, frame: &mut Frame) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
      ])
      .split(frame.area());

    let breadcrumb: Vec<String> = self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect();

    if let Some(view) = self.view_stack.last_mut() {
      draw_header(
        frame,
        chunks[0],
        &self.title,
        self.ctx.api.base_url().as_str(),
        view.resource(),
        &view.shortcuts(),
      );
      view.render(frame, chunks[1]);
    }

    draw_footer(frame, chunks[2], &breadcrumb);
    self.command.render_overlay(frame, chunks[1]);
  }
}
