// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Title, footer, and help rendering helpers used by TUI rendering.
fn view_title(label: &str, tail: Option<&str>) -> String {
    let mut title = format!("─ {label}");
    if let Some(tail) = tail {
        let tail = tail.trim();
        if !tail.is_empty() {
            title.push_str(" ─ ");
            title.push_str(tail);
        }
    }
    title.push(' ');
    title
}

fn footer_help_line(app: &App) -> Line<'static> {
    let mut footer = Footer::new(&app.theme);

    match &app.screen {
        Screen::Tree => {
            footer.hint("Move", "j/k").hint("Toggle", "⏎").hint("All", "e/c");
            footer.hint("Stats", "s").hint("Plot", "p").hint("Search", "/");
        }
        Screen::Statistics(_) => {
            footer.hint("Back", "Esc");
        }
        Screen::Plot(view) => {
            if view.selection.is_some() {
                footer.hint("Y dim", "y").hint("X dim", "x");
                footer.hint("Slice", "Tab").hint("Step", "←/→");
            }
            footer.hint("Back", "Esc");
        }
    }

    let mode_glyph = match app.theme.mode() {
        ThemeMode::Dark => "d◼ ",
        ThemeMode::Light => "d◻ ",
    };
    footer.hint("Dark", mode_glyph).hint("Help", "?").hint("Quit", "q");
    footer.finish(app.toast.as_ref())
}

fn search_footer_line(app: &App) -> Line<'static> {
    let search = &app.search;
    let mut footer = Footer::new(&app.theme);
    footer.push(search.kind.prefix().to_string(), app.theme.footer_key_style());
    footer.push(format!("{}   ", search.query), Style::default());
    if let Some(counter) = search.counter() {
        footer.push(counter, app.theme.tone_style(Tone::DType));
    }

    if search.mode == SearchMode::Results {
        footer.hint("Next", "n/N");
    }
    footer.hint("Accept", "Enter").hint("Close", "Esc");
    footer.finish(app.toast.as_ref())
}

/// One status line of `Label:key` hints joined by ` | `, with the live toast last.
struct Footer<'t> {
    theme: &'t TuiTheme,
    spans: Vec<Span<'static>>,
}

impl<'t> Footer<'t> {
    const SEPARATOR: &'static str = " | ";

    fn new(theme: &'t TuiTheme) -> Self {
        Self { theme, spans: Vec::new() }
    }

    fn push(&mut self, text: String, style: Style) {
        self.spans.push(Span::styled(text, style));
    }

    fn hint(&mut self, label: &str, key: &str) -> &mut Self {
        let label_style = self.theme.footer_label_style();
        if !self.spans.is_empty() {
            self.push(Self::SEPARATOR.to_owned(), label_style);
        }
        self.push(format!("{label}:"), label_style);
        self.push(key.to_owned(), self.theme.footer_key_style());
        self
    }

    fn finish(mut self, toast: Option<&Toast>) -> Line<'static> {
        if let Some(message) = toast.map(|toast| toast.message.trim()).filter(|m| !m.is_empty()) {
            let label_style = self.theme.footer_label_style();
            self.push(Self::SEPARATOR.to_owned(), label_style);
            self.push("Toast:".to_owned(), label_style);
            self.push(message.to_owned(), toast_style(self.theme, message));
        }
        Line::from(self.spans)
    }
}

fn toast_style(theme: &TuiTheme, message: &str) -> Style {
    if message.starts_with("Cannot") || message.contains("error") {
        theme.error_style()
    } else {
        theme.base_style()
    }
}

fn footer_brand_line(theme: &TuiTheme) -> Line<'static> {
    Line::from(vec![Span::styled(FOOTER_BRAND.to_owned(), theme.header_style())])
}

fn centered_rect(width_percent: u16, height_percent: u16, area: Rect) -> Rect {
    let [band] = Layout::vertical([Constraint::Percentage(height_percent)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Percentage(width_percent)])
        .flex(Flex::Center)
        .areas(band);
    cell
}

fn help_kv(key: &str, desc: &str, key_width: usize, key_style: Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{key:>width$}", width = key_width), key_style),
        Span::raw("  "),
        Span::raw(desc.to_owned()),
    ])
}

/// `(section, [(keys, description)])` rows shown in the help overlay.
const HELP_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Global",
        &[
            ("?", "Help (toggle)"),
            ("q", "Quit"),
            ("d", "Toggle dark/light theme"),
        ],
    ),
    (
        "Tree",
        &[
            ("↑/↓ or j/k", "Move cursor"),
            ("PgUp/PgDn", "Move by page"),
            ("g/G, Home/End", "First/last row"),
            ("←/h", "Collapse, or go to parent"),
            ("→/l", "Expand"),
            ("Enter/Space", "Toggle node"),
            ("e", "Expand all"),
            ("c", "Collapse all"),
            ("s", "Statistics of selected variable"),
            ("p", "Plot selected variable"),
            ("/", "Regular search"),
            ("\\", "Fuzzy search"),
            ("n/N", "Search next/previous result"),
            ("Esc", "Clear search, or quit"),
        ],
    ),
    (
        "Search",
        &[
            ("Type", "Update query"),
            ("Enter", "Commit results mode"),
            ("Backspace", "Delete query char"),
            ("Esc", "Clear search"),
        ],
    ),
    ("Statistics", &[("Esc", "Back to tree")]),
    (
        "Plot",
        &[
            ("y", "Cycle Y dimension"),
            ("x", "Cycle X dimension"),
            ("Tab", "Cycle active slice dimension"),
            ("←/→", "Step slice position"),
            ("PgUp/PgDn", "Step slice position by 10"),
            ("Esc", "Back to tree"),
        ],
    ),
    (
        "Help",
        &[
            ("j/k, ↑/↓, PgUp/PgDn, Home/End", "Scroll help"),
            ("Esc/?", "Close help"),
        ],
    ),
];

fn help_lines(theme: &TuiTheme) -> Vec<Line<'static>> {
    let key_style = theme.footer_key_style();
    let header_style = theme.header_style();
    let key_col_width = HELP_SECTIONS
        .iter()
        .flat_map(|(_, rows)| rows.iter())
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::<Line<'static>>::new();
    for (idx, (section, rows)) in HELP_SECTIONS.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(format!("--- {section} ---"), header_style)));
        for (key, desc) in rows.iter() {
            lines.push(help_kv(key, desc, key_col_width, key_style));
        }
    }
    lines
}

/// Scroll position of the open help overlay. `viewport` is refreshed on every draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct HelpPager {
    offset: u16,
    viewport: u16,
}

impl HelpPager {
    fn scroll(&mut self, lines: i32) {
        let next = (i32::from(self.offset) + lines).max(0);
        self.offset = u16::try_from(next).unwrap_or(u16::MAX);
    }

    fn page(&mut self, down: bool) {
        let step = i32::from(self.viewport.saturating_sub(1).max(1));
        self.scroll(if down { step } else { -step });
    }
}

fn render_help(frame: &mut Frame<'_>, pager: &mut HelpPager, theme: &TuiTheme, main_area: Rect) {
    let area = centered_rect(82, 84, main_area);
    frame.render_widget(Clear, area);

    let lines = help_lines(theme);
    let border_style = theme.panel_border_style(true);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("─ Help ─")
        .border_style(border_style)
        .title_style(border_style.add_modifier(Modifier::BOLD));
    let inner = block.inner(area);

    let overflow = lines.len().saturating_sub(usize::from(inner.height.max(1)));
    pager.viewport = inner.height;
    pager.offset = pager.offset.min(u16::try_from(overflow).unwrap_or(u16::MAX));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(theme.base_style())
        .wrap(Wrap { trim: false })
        .scroll((pager.offset, 0));
    frame.render_widget(paragraph, area);
}

