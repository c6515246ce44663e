use crate::api::{ApiClient, Resource};
use crate::listing::{ListQuery, Listing, ListingStatus, Mutation, Page, QueryValue};
use crate::ui::components::{KeyResult, SearchEvent, SearchInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{fit, status_color};
use crate::ui::view::{ShortcutInfo, View, ViewAction, ViewContext};
use crate::ui::views::RecordDetailView;
use color_eyre::{eyre::eyre, Result};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tokio::sync::oneshot;
use tracing::{info, warn};

/// A delete request sent to the backend, waiting for its reply
struct PendingDelete {
  id: u64,
  rx: oneshot::Receiver<Result<()>>,
}

/// One-line message shown under the list
struct Notice {
  text: String,
  is_error: bool,
}

/// Paginated table of one backend collection
pub struct ResourceListView<R: Resource> {
  api: ApiClient,
  listing: Listing<R>,
  list_state: ListState,
  search: SearchInput,
  pending_delete: Option<PendingDelete>,
  notice: Option<Notice>,
}

impl<R: Resource> ResourceListView<R> {
  pub fn new(ctx: &ViewContext) -> Self {
    let listing = Listing::new(ctx.api.fetcher::<R>(), ctx.listing_options::<R>());
    Self {
      api: ctx.api.clone(),
      listing,
      list_state: ListState::default(),
      search: SearchInput::new(),
      pending_delete: None,
      notice: None,
    }
  }

  fn current_search(&self) -> String {
    self
      .listing
      .query()
      .get("search")
      .and_then(QueryValue::as_text)
      .unwrap_or("")
      .to_string()
  }

  fn selected(&self) -> Option<&R> {
    self
      .list_state
      .selected()
      .and_then(|idx| self.listing.content().get(idx))
  }

  fn set_notice(&mut self, text: impl Into<String>, is_error: bool) {
    self.notice = Some(Notice {
      text: text.into(),
      is_error,
    });
  }

  fn apply_query(&mut self, partial: ListQuery) {
    if let Err(e) = self.listing.set_query(partial) {
      self.set_notice(e.to_string(), true);
    }
  }

  fn goto_page(&mut self, forward: bool) {
    let Some(target) = self.listing.data().and_then(|page| adjacent_page(page, forward)) else {
      return;
    };

    let target = i64::try_from(target).unwrap_or(i64::MAX);
    self.list_state.select(Some(0));
    self.apply_query(ListQuery::new().with("page", target));
  }

  fn start_delete(&mut self) {
    if self.pending_delete.is_some() {
      self.set_notice("A delete is already in progress", true);
      return;
    }
    let Some(id) = self.selected().map(|record| record.id()) else {
      return;
    };

    info!(resource = R::PATH, id, "deleting record");
    let api = self.api.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(api.delete::<R>(id).await);
    });

    self.pending_delete = Some(PendingDelete { id, rx });
    self.set_notice(format!("Deleting #{}...", id), false);
  }

  fn poll_delete(&mut self) {
    let Some(pending) = self.pending_delete.as_mut() else {
      return;
    };
    let outcome = match pending.rx.try_recv() {
      Ok(outcome) => outcome,
      Err(oneshot::error::TryRecvError::Empty) => return,
      Err(oneshot::error::TryRecvError::Closed) => Err(eyre!("Delete ended without a result")),
    };
    let id = pending.id;
    self.pending_delete = None;
    self.notice = Some(commit_delete(&mut self.listing, id, outcome));
  }

  fn title(&self) -> String {
    let search = self.current_search();
    let search = if search.is_empty() {
      String::new()
    } else {
      format!(" [/{}]", search)
    };

    match (self.listing.status(), self.listing.data()) {
      (ListingStatus::Loading, _) => format!(" {}{} (loading...) ", R::TITLE, search),
      (ListingStatus::Failed, _) => format!(" {}{} (error) ", R::TITLE, search),
      (_, Some(page)) => format!(
        " {}{} (page {}/{}, {} total) ",
        R::TITLE,
        search,
        page.page + 1,
        page.total_pages.max(1),
        page.total_elements
      ),
      (_, None) => format!(" {}{} ", R::TITLE, search),
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.listing.content().len();
    ensure_valid_selection(&mut self.list_state, len);

    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let notice_height = u16::from(self.notice.is_some() || self.listing.error().is_some());
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(notice_height),
      ])
      .split(inner);

    frame.render_widget(Paragraph::new(column_header::<R>()), chunks[0]);

    if len == 0 && !self.listing.is_loading() {
      let content = if self.listing.error().is_some() {
        format!("Failed to load {}. Press 'r' to retry.", R::TITLE.to_lowercase())
      } else {
        format!("No {} found.", R::TITLE.to_lowercase())
      };
      let paragraph = Paragraph::new(content).style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, chunks[1]);
    } else {
      let items: Vec<ListItem> = self
        .listing
        .content()
        .iter()
        .map(|record| ListItem::new(row_line(record)))
        .collect();

      let list = List::new(items)
        .highlight_style(
          Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
      frame.render_stateful_widget(list, chunks[1], &mut self.list_state);
    }

    let notice = match (self.listing.error(), &self.notice) {
      (Some(e), _) => Some(Span::styled(
        format!("Error: {}", e),
        Style::default().fg(Color::Red),
      )),
      (None, Some(notice)) => {
        let color = if notice.is_error { Color::Red } else { Color::Green };
        Some(Span::styled(notice.text.clone(), Style::default().fg(color)))
      }
      (None, None) => None,
    };
    if let Some(span) = notice {
      frame.render_widget(Paragraph::new(Line::from(span)), chunks[2]);
    }
  }
}

/// Index of the page before or after `page`, if there is one.
fn adjacent_page<R>(page: &Page<R>, forward: bool) -> Option<u64> {
  if forward && page.has_next() {
    Some(page.page + 1)
  } else if !forward && page.has_previous() {
    Some(page.page - 1)
  } else {
    None
  }
}

/// Fold a finished backend delete into the listing. The row is removed
/// locally; when a fetch is in flight the page is fetched again instead.
fn commit_delete<R: Resource>(listing: &mut Listing<R>, id: u64, outcome: Result<()>) -> Notice {
  match outcome {
    Ok(()) => {
      match listing.remove(|record| record.id() == id) {
        Mutation::Busy => listing.refetch(),
        Mutation::Applied | Mutation::Unchanged => {}
      }
      Notice {
        text: format!("Deleted #{}", id),
        is_error: false,
      }
    }
    Err(e) => {
      warn!(resource = R::PATH, id, error = %e, "delete failed");
      Notice {
        text: format!("Delete failed: {}", e),
        is_error: true,
      }
    }
  }
}

/// Partial query applied when a search is submitted: an empty search clears
/// the field, and results restart at the first page.
fn search_query(text: &str) -> ListQuery {
  let search = (!text.is_empty()).then(|| text.to_string());
  ListQuery::new().with("search", search).with("page", 0)
}

fn column_header<R: Resource>() -> Line<'static> {
  let cells: Vec<String> = R::COLUMNS.iter().map(|c| fit(c.title, c.width)).collect();
  Line::from(Span::styled(
    format!("  {}", cells.join(" ")),
    Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
  ))
}

fn row_line<R: Resource>(record: &R) -> Line<'static> {
  let mut spans = Vec::with_capacity(R::COLUMNS.len() * 2);
  for (i, (column, cell)) in R::COLUMNS.iter().zip(record.row()).enumerate() {
    if i > 0 {
      spans.push(Span::raw(" "));
    }
    let style = match (i, column.title) {
      (0, _) => Style::default().fg(Color::Cyan),
      (_, "Status") => Style::default().fg(status_color(&cell)),
      _ => Style::default(),
    };
    spans.push(Span::styled(fit(&cell, column.width), style));
  }
  Line::from(spans)
}

impl<R: Resource> View for ResourceListView<R> {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    let current = self.current_search();
    match self.search.handle_key(key, &current) {
      KeyResult::Handled => return ViewAction::None,
      KeyResult::Event(SearchEvent::Submitted(text)) => {
        if text != current {
          self.list_state.select(Some(0));
          self.apply_query(search_query(&text));
        }
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Cancelled) => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('n') | KeyCode::Right => self.goto_page(true),
      KeyCode::Char('p') | KeyCode::Left => self.goto_page(false),
      KeyCode::Char('r') => {
        self.notice = None;
        self.listing.refetch();
      }
      KeyCode::Char('c') => {
        self.listing.clear_cache();
        self.set_notice("Cache cleared", false);
      }
      KeyCode::Char('d') => self.start_delete(),
      KeyCode::Enter => {
        if let Some(record) = self.selected() {
          return ViewAction::Push(Box::new(RecordDetailView::new(record.clone())));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    self.search.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    R::TITLE.to_string()
  }

  fn resource(&self) -> Option<&str> {
    Some(R::TITLE)
  }

  fn input_active(&self) -> bool {
    self.search.is_active()
  }

  fn tick(&mut self) {
    self.listing.poll();
    self.poll_delete();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("n/p", "page").with_priority(30),
      ShortcutInfo::new("r", "refresh").with_priority(40),
      ShortcutInfo::new("d", "delete").with_priority(50),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
