// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::{
    draw, footer_help_line, search_footer_line, view_title, App, NodeKind, Screen, SearchKind,
    SearchMode,
};
use crate::config::ThemeMode;
use crate::file_info::FileInfo;
use crate::model::fixtures::climate_tree;
use crate::store::Location;
use crossterm::event::KeyCode;
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use rstest::rstest;

use super::theme::TuiTheme;

const SOURCE: &str = "https://example.com/climate.zarr";

fn line_to_string(line: &ratatui::text::Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect::<String>()
}

fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    (0..area.height)
        .map(|y| (0..area.width).map(|x| buffer[(x, y)].symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn app() -> App {
    let location = Location::parse(SOURCE).expect("url");
    let info = FileInfo::collect(&[location]).expect("info");
    App::new(climate_tree(), SOURCE, &info, TuiTheme::new(ThemeMode::Dark), 10)
}

fn select_path(app: &mut App, path: &str) {
    let id = app
        .outline
        .searchable()
        .find(|(id, candidate)| {
            *candidate == path && matches!(app.outline.node(*id).kind, NodeKind::Variable { .. })
        })
        .map(|(id, _)| id)
        .expect("variable path");
    app.select_node(id);
}

fn selected_label(app: &App) -> String {
    app.outline.node(app.selected).label_text()
}

fn render(app: &mut App, width: u16, height: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
    terminal.draw(|frame| draw(frame, app)).expect("draw");
    buffer_to_string(terminal.backend().buffer())
}

fn press(app: &mut App, keys: &[KeyCode]) -> bool {
    keys.iter().fold(false, |quit, key| quit | app.handle_key_code(*key))
}

#[rstest]
#[case(KeyCode::Char('q'))]
#[case(KeyCode::Esc)]
fn tree_quit_keys(#[case] key: KeyCode) {
    let mut app = app();
    assert!(app.handle_key_code(key));
}

#[test]
fn cursor_moves_through_visible_rows() {
    let mut app = app();
    assert_eq!(app.selected, 0);
    press(&mut app, &[KeyCode::Char('j'), KeyCode::Down]);
    assert_eq!(selected_label(&app), format!("URL: {SOURCE}"));
    press(&mut app, &[KeyCode::Up]);
    assert_eq!(selected_label(&app), "File Information");
    press(&mut app, &[KeyCode::Char('G')]);
    let last = *app.outline.visible().last().expect("rows");
    assert_eq!(app.selected, last);
    press(&mut app, &[KeyCode::Char('g')]);
    assert_eq!(app.selected, 0);
    press(&mut app, &[KeyCode::Up]);
    assert_eq!(app.selected, 0);
}

#[test]
fn left_collapses_then_moves_to_parent() {
    let mut app = app();
    press(&mut app, &[KeyCode::Down]);
    assert_eq!(selected_label(&app), "File Information");
    let rows = app.outline.visible().len();

    press(&mut app, &[KeyCode::Left]);
    assert_eq!(app.outline.visible().len(), rows - 2);
    assert_eq!(selected_label(&app), "File Information");

    press(&mut app, &[KeyCode::Char('h')]);
    assert_eq!(app.selected, 0);

    press(&mut app, &[KeyCode::Down, KeyCode::Right]);
    assert_eq!(app.outline.visible().len(), rows);
}

#[test]
fn enter_toggles_variable_attributes() {
    let mut app = app();
    select_path(&mut app, "temperature");
    let rows = app.outline.visible().len();
    press(&mut app, &[KeyCode::Enter]);
    assert_eq!(app.outline.visible().len(), rows + 1);
    press(&mut app, &[KeyCode::Char(' ')]);
    assert_eq!(app.outline.visible().len(), rows);
}

#[test]
fn collapse_all_keeps_selection_visible() {
    let mut app = app();
    select_path(&mut app, "surface/pressure");
    press(&mut app, &[KeyCode::Char('c')]);
    assert!(app.outline.visible_index(app.selected).is_some());
    assert_eq!(app.outline.visible().len(), 3);

    press(&mut app, &[KeyCode::Char('e')]);
    assert_eq!(app.outline.visible().len(), app.outline.len());
}

#[test]
fn statistics_screen_opens_for_numeric_variable() {
    let mut app = app();
    select_path(&mut app, "temperature");
    press(&mut app, &[KeyCode::Char('s')]);
    let Screen::Statistics(view) = &app.screen else {
        panic!("expected statistics screen");
    };
    assert_eq!(view.name, "temperature");
    assert_eq!(view.histogram.bins(), 10);

    let text = render(&mut app, 100, 30);
    assert!(text.contains("Statistics for temperature"));
    assert!(text.contains("Histogram of temperature"));
    assert!(text.contains("Mean"));
    assert!(text.contains("11.5000"));

    assert!(!press(&mut app, &[KeyCode::Esc]));
    assert!(app.screen.is_tree());
}

#[test]
fn statistics_on_text_variable_shows_toast() {
    let mut app = app();
    select_path(&mut app, "station");
    press(&mut app, &[KeyCode::Char('s')]);
    assert!(app.screen.is_tree());
    let toast = app.toast.as_ref().expect("toast");
    assert!(toast.message.contains("not numeric"));
}

#[test]
fn statistics_requires_a_variable() {
    let mut app = app();
    press(&mut app, &[KeyCode::Char('s')]);
    assert!(app.screen.is_tree());
    assert_eq!(
        app.toast.as_ref().map(|toast| toast.message.as_str()),
        Some("Select a variable to show statistics")
    );
}

#[test]
fn plot_screen_steps_through_slices() {
    let mut app = app();
    select_path(&mut app, "temperature");
    press(&mut app, &[KeyCode::Char('p')]);
    let title = |app: &App| match &app.screen {
        Screen::Plot(view) => view.model.title().to_owned(),
        _ => panic!("expected plot screen"),
    };
    assert_eq!(title(&app), "temperature (lon=1)");

    press(&mut app, &[KeyCode::Left]);
    assert_eq!(title(&app), "temperature (lon=0)");

    press(&mut app, &[KeyCode::Char('y')]);
    assert_eq!(title(&app), "temperature (lon=0)");

    let text = render(&mut app, 100, 30);
    assert!(text.contains("Y Dimension: lat"));
    assert!(text.contains("X Dimension: time"));
    assert!(text.contains("Slice Position: lon=0/1"));

    press(&mut app, &[KeyCode::Esc]);
    assert!(app.screen.is_tree());
}

#[test]
fn line_plot_renders_title() {
    let mut app = app();
    select_path(&mut app, "time");
    press(&mut app, &[KeyCode::Char('p')]);
    assert!(matches!(app.screen, Screen::Plot(_)));
    let text = render(&mut app, 80, 24);
    assert!(text.contains("1D Plot of time"));
}

#[test]
fn plotting_text_shows_error_toast() {
    let mut app = app();
    select_path(&mut app, "station");
    press(&mut app, &[KeyCode::Char('p')]);
    assert!(app.screen.is_tree());
    let toast = app.toast.as_ref().expect("toast").message.clone();
    assert_eq!(
        toast,
        "Cannot plot variable 'station' with dtype str! Plotting is only supported for numeric data types."
    );
    let footer = line_to_string(&footer_help_line(&app));
    assert!(footer.contains("Toast:Cannot plot variable 'station'"));
}

#[test]
fn theme_key_toggles_mode_on_every_screen() {
    let mut app = app();
    press(&mut app, &[KeyCode::Char('d')]);
    assert_eq!(app.theme.mode(), ThemeMode::Light);

    select_path(&mut app, "temperature");
    press(&mut app, &[KeyCode::Char('s'), KeyCode::Char('d')]);
    assert_eq!(app.theme.mode(), ThemeMode::Dark);
    assert!(matches!(app.screen, Screen::Statistics(_)));
}

#[test]
fn regular_search_jumps_to_single_match() {
    let mut app = app();
    press(&mut app, &[KeyCode::Char('/')]);
    assert_eq!(app.search.mode, SearchMode::Editing);
    for ch in "pressure".chars() {
        press(&mut app, &[KeyCode::Char(ch)]);
    }
    assert_eq!(app.search.results.len(), 1);
    assert!(selected_label(&app).starts_with("pressure: (lat, lon)"));

    press(&mut app, &[KeyCode::Enter]);
    assert_eq!(app.search.mode, SearchMode::Inactive);
}

#[test]
fn search_results_cycle_and_escape_clears() {
    let mut app = app();
    press(&mut app, &[KeyCode::Char('/')]);
    for ch in "units".chars() {
        press(&mut app, &[KeyCode::Char(ch)]);
    }
    press(&mut app, &[KeyCode::Enter]);
    assert_eq!(app.search.mode, SearchMode::Results);
    assert_eq!(app.search.results.len(), 3);
    assert_eq!(app.outline.node(app.selected).path, "lat/units");

    press(&mut app, &[KeyCode::Char('n')]);
    assert_eq!(app.outline.node(app.selected).path, "time/units");
    press(&mut app, &[KeyCode::Char('N'), KeyCode::Char('N')]);
    assert_eq!(app.outline.node(app.selected).path, "temperature/units");

    let footer = line_to_string(&search_footer_line(&app));
    assert!(footer.starts_with('/'));
    assert!(footer.contains("3/3"));

    assert!(!press(&mut app, &[KeyCode::Esc]));
    assert_eq!(app.search.mode, SearchMode::Inactive);
    assert!(press(&mut app, &[KeyCode::Esc]));
}

#[test]
fn fuzzy_search_matches_subsequences() {
    let mut app = app();
    press(&mut app, &[KeyCode::Char('\\')]);
    assert_eq!(app.search.kind, SearchKind::Fuzzy);
    for ch in "srfprs".chars() {
        press(&mut app, &[KeyCode::Char(ch)]);
    }
    assert!(!app.search.results.is_empty());
    assert_eq!(app.outline.node(app.selected).path, "surface/pressure");
    assert!(line_to_string(&search_footer_line(&app)).starts_with('\\'));

    press(&mut app, &[KeyCode::Esc, KeyCode::Char('/')]);
    for ch in "srfprs".chars() {
        press(&mut app, &[KeyCode::Char(ch)]);
    }
    assert!(app.search.results.is_empty());
    assert!(line_to_string(&search_footer_line(&app)).contains("srfprs   0"));
}

#[test]
fn help_overlay_scrolls_and_closes() {
    let mut app = app();
    press(&mut app, &[KeyCode::Char('?')]);
    assert!(app.help.is_some());
    let text = render(&mut app, 80, 20);
    assert!(text.contains("--- Global ---"));

    press(&mut app, &[KeyCode::Char('j'), KeyCode::Char('j')]);
    assert_eq!(app.help.map(|pager| pager.offset), Some(2));
    press(&mut app, &[KeyCode::Home]);
    assert_eq!(app.help.map(|pager| pager.offset), Some(0));
    assert!(!press(&mut app, &[KeyCode::Esc]));
    assert!(app.help.is_none());
}

#[test]
fn tree_renders_dataset_outline() {
    let mut app = app();
    let text = render(&mut app, 100, 30);
    assert!(text.contains(&format!("Dataset: {SOURCE}")));
    assert!(text.contains("Root (Data Variables: 2 Coordinates: 3)"));
    assert!(text.contains("Quit:q"));
    assert!(text.contains("xr-tui"));
}

#[test]
fn page_keys_use_rendered_height() {
    let mut app = app();
    render(&mut app, 80, 10);
    assert_eq!(app.page_height, 7);
    press(&mut app, &[KeyCode::PageDown]);
    assert_eq!(app.outline.visible_index(app.selected), Some(7));
    press(&mut app, &[KeyCode::PageUp]);
    assert_eq!(app.selected, 0);
}

#[test]
fn view_title_appends_tail() {
    assert_eq!(view_title("Dataset", Some("air.nc")), "─ Dataset ─ air.nc ");
    assert_eq!(view_title("Dataset", Some("  ")), "─ Dataset ");
    assert_eq!(view_title("Dataset", None), "─ Dataset ");
}
