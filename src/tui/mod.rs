// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! Interactive dataset browser (ratatui + crossterm): an expandable tree of groups, variables,
//! and attributes, plus statistics and plot screens for the selected variable.

use std::{
    error::Error,
    io,
    ops::{Deref, DerefMut},
    panic,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    layout::Flex,
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use tracing::{debug, info};

use crate::config::{Config, ThemeMode};
use crate::file_info::FileInfo;
use crate::model::DataTree;

mod search;
mod theme;
mod tree;
mod views;

use search::{Search, SearchKind, SearchMode};
use theme::{Tone, TuiTheme};
use tree::{NodeId, NodeKind, Outline};
use views::{PlotView, StatsView};

const FOOTER_BRAND: &str = "xr-tui";
const TOAST_DURATION: Duration = Duration::from_secs(2);

/// Runs the interactive terminal UI until the user quits.
pub fn run(
    data: DataTree,
    source: &str,
    info: &FileInfo,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let theme = TuiTheme::from_env(config.theme)?;
    let mut app = App::new(data, source, info, theme, config.histogram_bins);
    info!(source, nodes = app.outline.len(), "starting tui");

    install_panic_hook();
    let mut terminal = TerminalSession::enter()?;

    while !app.should_quit {
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                _ => {}
            }
        }
    }

    Ok(())
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.area();
    frame.render_widget(Block::default().style(app.theme.base_style()), area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let main_area = layout[0];
    let status_area = layout[1];

    match &app.screen {
        Screen::Tree => {}
        Screen::Statistics(view) => views::draw_statistics(frame, main_area, view, &app.theme),
        Screen::Plot(view) => views::draw_plot(frame, main_area, view, &app.theme),
    }
    if app.screen.is_tree() {
        draw_tree(frame, app, main_area);
    }

    if app.toast.as_ref().is_some_and(|toast| toast.expires_at <= Instant::now()) {
        app.toast = None;
    }

    if app.search.is_active() {
        let status = Paragraph::new(search_footer_line(app));
        frame.render_widget(status, status_area);
        if app.search.mode == SearchMode::Editing {
            let typed = u16::try_from(app.search.query.chars().count()).unwrap_or(u16::MAX);
            let right_edge = status_area.right().saturating_sub(1);
            let cursor_x = status_area.x.saturating_add(1).saturating_add(typed).min(right_edge);
            frame.set_cursor_position((cursor_x, status_area.y));
        }
    } else {
        let status = Paragraph::new(footer_help_line(app));
        frame.render_widget(status, status_area);
        let brand = Paragraph::new(footer_brand_line(&app.theme)).alignment(Alignment::Right);
        frame.render_widget(brand, status_area);
    }

    if let Some(pager) = app.help.as_mut() {
        render_help(frame, pager, &app.theme, main_area);
    }
}

fn draw_tree(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.panel_border_style(true))
        .title(view_title("Dataset", Some(&app.source)))
        .style(app.theme.base_style());
    app.page_height = usize::from(block.inner(area).height).max(1);

    let items: Vec<ListItem<'_>> = app
        .outline
        .visible()
        .iter()
        .map(|id| ListItem::new(outline_line(&app.outline, *id, &app.theme)))
        .collect();
    app.list_state.select(app.outline.visible_index(app.selected));

    let list = List::new(items)
        .block(block)
        .highlight_style(app.theme.selection_style());
    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn outline_line(outline: &Outline, id: NodeId, theme: &TuiTheme) -> Line<'static> {
    let node = outline.node(id);
    let marker = match (node.has_children(), node.expanded) {
        (false, _) => "  ",
        (true, true) => "▼ ",
        (true, false) => "▶ ",
    };
    let mut spans = vec![
        Span::raw("  ".repeat(node.depth)),
        Span::styled(marker, theme.tone_style(Tone::Muted)),
    ];
    spans.extend(
        node.label
            .iter()
            .map(|(text, tone)| Span::styled(text.clone(), theme.tone_style(*tone))),
    );
    Line::from(spans)
}

// Extracted title/footer/help rendering helpers.
include!("chrome.rs");

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    expires_at: Instant,
}

#[derive(Debug, Clone)]
enum Screen {
    Tree,
    Statistics(StatsView),
    Plot(PlotView),
}

impl Screen {
    fn is_tree(&self) -> bool {
        matches!(self, Self::Tree)
    }
}

struct App {
    data: DataTree,
    source: String,
    outline: Outline,
    selected: NodeId,
    list_state: ListState,
    page_height: usize,
    screen: Screen,
    theme: TuiTheme,
    bins: usize,
    help: Option<HelpPager>,
    toast: Option<Toast>,
    search: Search,
    should_quit: bool,
}

impl App {
    fn new(data: DataTree, source: &str, info: &FileInfo, theme: TuiTheme, bins: usize) -> Self {
        let outline = Outline::build(source, info, &data);
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self {
            data,
            source: source.to_owned(),
            outline,
            selected: 0,
            list_state,
            page_height: 1,
            screen: Screen::Tree,
            theme,
            bins,
            help: None,
            toast: None,
            search: Search::default(),
            should_quit: false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.handle_key_code(key.code) {
            self.should_quit = true;
        }
    }

    fn toggle_help(&mut self) {
        self.help = match self.help {
            Some(_) => None,
            None => {
                self.search.clear();
                Some(HelpPager::default())
            }
        };
    }

    /// Handles one key press; returns `true` when the app should quit.
    fn handle_key_code(&mut self, code: KeyCode) -> bool {
        if let Some(pager) = self.help.as_mut() {
            match code {
                KeyCode::Char('q') => return true,
                KeyCode::Esc | KeyCode::Char('?') => self.help = None,
                KeyCode::Down | KeyCode::Char('j') => pager.scroll(1),
                KeyCode::Up | KeyCode::Char('k') => pager.scroll(-1),
                KeyCode::PageDown => pager.page(true),
                KeyCode::PageUp => pager.page(false),
                KeyCode::Home => pager.offset = 0,
                KeyCode::End => pager.offset = u16::MAX,
                _ => {}
            }
            return false;
        }

        match (self.search.mode, code) {
            (SearchMode::Editing, _) => {
                let hit = self.search.edit(code);
                self.select_hit(hit);
                return false;
            }
            (SearchMode::Results, KeyCode::Esc) => {
                self.search.clear();
                return false;
            }
            _ => {}
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('?') => self.toggle_help(),
            KeyCode::Char('d') => self.toggle_theme(),
            _ => match self.screen {
                Screen::Tree => return self.handle_tree_key(code),
                Screen::Statistics(_) => {
                    if matches!(code, KeyCode::Esc) {
                        self.screen = Screen::Tree;
                    }
                }
                Screen::Plot(_) => self.handle_plot_key(code),
            },
        }

        false
    }

    fn handle_tree_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => return true,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::PageDown => self.move_selection(self.page_height as isize),
            KeyCode::PageUp => self.move_selection(-(self.page_height as isize)),
            KeyCode::Home | KeyCode::Char('g') => self.select_visible(0),
            KeyCode::End | KeyCode::Char('G') => {
                self.select_visible(self.outline.visible().len().saturating_sub(1))
            }
            KeyCode::Left | KeyCode::Char('h') => self.collapse_or_parent(),
            KeyCode::Right | KeyCode::Char('l') => self.outline.set_expanded(self.selected, true),
            KeyCode::Enter | KeyCode::Char(' ') => self.outline.toggle(self.selected),
            KeyCode::Char('e') => self.outline.expand_all(),
            KeyCode::Char('c') => {
                self.outline.collapse_all();
                self.selected = self.outline.visible_ancestor(self.selected);
            }
            KeyCode::Char('s') => self.open_statistics(),
            KeyCode::Char('p') => self.open_plot(),
            KeyCode::Char('/') => self.search.begin(SearchKind::Regular, &self.outline),
            KeyCode::Char('\\') => self.search.begin(SearchKind::Fuzzy, &self.outline),
            KeyCode::Char('n') => {
                let hit = self.search.step(true);
                self.select_hit(hit);
            }
            KeyCode::Char('N') => {
                let hit = self.search.step(false);
                self.select_hit(hit);
            }
            _ => {}
        }
        false
    }

    fn handle_plot_key(&mut self, code: KeyCode) {
        if matches!(code, KeyCode::Esc) {
            self.screen = Screen::Tree;
            return;
        }
        let Screen::Plot(view) = &mut self.screen else {
            return;
        };
        if !view.handle_key(code) {
            return;
        }
        if let Err(err) = view.rebuild(&self.data) {
            self.set_toast(err.to_string());
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let current = self.outline.visible_index(self.selected).unwrap_or(0);
        let next = if delta.is_negative() {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta.unsigned_abs())
        };
        self.select_visible(next);
    }

    fn select_visible(&mut self, index: usize) {
        let visible = self.outline.visible();
        if let Some(last) = visible.len().checked_sub(1) {
            self.selected = visible[index.min(last)];
        }
    }

    fn select_node(&mut self, id: NodeId) {
        self.outline.reveal(id);
        self.selected = id;
    }

    fn collapse_or_parent(&mut self) {
        let node = self.outline.node(self.selected);
        if node.has_children() && node.expanded {
            self.outline.set_expanded(self.selected, false);
        } else if let Some(parent) = node.parent {
            self.selected = parent;
        }
    }

    fn toggle_theme(&mut self) {
        self.theme.toggle_mode();
        self.set_toast(format!("Theme: {}", self.theme.mode().as_str()));
    }

    fn selected_variable(&self) -> Option<(String, String)> {
        match &self.outline.node(self.selected).kind {
            NodeKind::Variable { group, name } => Some((group.clone(), name.clone())),
            _ => None,
        }
    }

    fn open_statistics(&mut self) {
        let Some((group, name)) = self.selected_variable() else {
            self.set_toast("Select a variable to show statistics");
            return;
        };
        let result = views::lookup(&self.data, &group, &name)
            .map_err(|err| err.to_string())
            .and_then(|(_, var)| StatsView::new(var, self.bins).map_err(|err| err.to_string()));
        match result {
            Ok(view) => {
                debug!(group, name, "opened statistics");
                self.screen = Screen::Statistics(view);
            }
            Err(err) => self.set_toast(err),
        }
    }

    fn open_plot(&mut self) {
        let Some((group, name)) = self.selected_variable() else {
            self.set_toast("Select a variable to plot");
            return;
        };
        match PlotView::open(&self.data, &group, &name) {
            Ok(view) => {
                debug!(group, name, "opened plot");
                self.screen = Screen::Plot(view);
            }
            Err(err) => self.set_toast(err.to_string()),
        }
    }

    fn select_hit(&mut self, hit: Option<NodeId>) {
        if let Some(id) = hit {
            self.select_node(id);
        }
    }

    fn set_toast(&mut self, message: impl Into<String>) {
        self.toast =
            Some(Toast { message: message.into(), expires_at: Instant::now() + TOAST_DURATION });
    }
}

/// Raw mode on the alternate screen; dropping it hands the terminal back.
struct TerminalSession(Terminal<CrosstermBackend<io::Stdout>>);

impl TerminalSession {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let opened = execute!(io::stdout(), EnterAlternateScreen)
            .and_then(|()| Terminal::new(CrosstermBackend::new(io::stdout())))
            .and_then(|mut terminal| terminal.clear().map(|()| terminal));
        opened.map(Self).map_err(|err| {
            restore_terminal();
            err
        })
    }
}

impl Deref for TerminalSession {
    type Target = Terminal<CrosstermBackend<io::Stdout>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for TerminalSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(err) = self.0.show_cursor() {
            debug!(%err, "cursor not restored");
        }
        restore_terminal();
    }
}

/// A panic message printed inside the alternate screen would be wiped with it.
fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        previous(info);
    }));
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

#[cfg(test)]
mod tests;
