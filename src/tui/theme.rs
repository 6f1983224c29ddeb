// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-XrTui-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of xr-tui and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;
use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style};
use thiserror::Error;

use crate::config::ThemeMode;

pub(crate) const PALETTE_ENV: &str = "XR_TUI_PALETTE";

/// Semantic colour roles used by tree labels and screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tone {
    Plain,
    Key,
    Dims,
    DType,
    Count,
    Muted,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct TuiTheme {
    mode: ThemeMode,
    palette: Option<TuiPalette>,
}

impl TuiTheme {
    pub(crate) fn new(mode: ThemeMode) -> Self {
        Self { mode, palette: None }
    }

    pub(crate) fn from_env(mode: ThemeMode) -> Result<Self, ThemeError> {
        let palette = palette_override_from_env()?;
        Ok(Self { mode, palette })
    }

    pub(crate) fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub(crate) fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    pub(crate) fn base_style(&self) -> Style {
        match (&self.palette, self.mode) {
            (Some(palette), ThemeMode::Dark) => Style::default().fg(palette.fg).bg(palette.bg),
            (Some(palette), ThemeMode::Light) => Style::default().fg(palette.bg).bg(palette.fg),
            (None, ThemeMode::Dark) => Style::default().fg(Color::Reset).bg(Color::Reset),
            (None, ThemeMode::Light) => Style::default().fg(Color::Black).bg(Color::White),
        }
    }

    fn ansi_color(&self, color: Ansi16) -> Color {
        let slots = self.palette.as_ref().map_or(&DEFAULT_ANSI, |palette| &palette.ansi);
        slots[color as usize]
    }

    /// Bright variants read poorly on a light background, so light mode uses the dim ones.
    fn accent(&self, dark: Ansi16, light: Ansi16) -> Color {
        match self.mode {
            ThemeMode::Dark => self.ansi_color(dark),
            ThemeMode::Light => self.ansi_color(light),
        }
    }

    pub(crate) fn panel_border_style(&self, focused: bool) -> Style {
        if focused {
            self.base_style().fg(self.accent(Ansi16::BrightGreen, Ansi16::Green))
        } else {
            self.base_style()
        }
    }

    pub(crate) fn selection_style(&self) -> Style {
        self.base_style().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    }

    pub(crate) fn error_style(&self) -> Style {
        self.base_style().fg(self.ansi_color(Ansi16::Red))
    }

    pub(crate) fn footer_label_style(&self) -> Style {
        self.base_style().fg(self.accent(Ansi16::White, Ansi16::BrightBlack))
    }

    pub(crate) fn footer_key_style(&self) -> Style {
        self.base_style()
            .fg(self.accent(Ansi16::Cyan, Ansi16::Blue))
            .add_modifier(Modifier::BOLD)
    }

    pub(crate) fn header_style(&self) -> Style {
        self.base_style().add_modifier(Modifier::BOLD)
    }

    pub(crate) fn tone_style(&self, tone: Tone) -> Style {
        let base = self.base_style();
        match tone {
            Tone::Plain => base,
            Tone::Key => base.fg(self.accent(Ansi16::Yellow, Ansi16::Magenta)),
            Tone::Dims => base.fg(self.accent(Ansi16::BrightRed, Ansi16::Red)),
            Tone::DType => base.fg(self.accent(Ansi16::BrightGreen, Ansi16::Green)),
            Tone::Count => base.fg(self.accent(Ansi16::BrightBlue, Ansi16::Blue)),
            Tone::Muted => base.fg(self.ansi_color(Ansi16::BrightBlack)),
        }
    }

    /// Colour of histogram bars and line plots.
    pub(crate) fn chart_color(&self) -> Color {
        self.accent(Ansi16::BrightCyan, Ansi16::Blue)
    }
}

/// Override colours read from `XR_TUI_PALETTE`: foreground, background, then the 16 ANSI slots.
#[derive(Debug, Clone, PartialEq)]
struct TuiPalette {
    fg: Color,
    bg: Color,
    ansi: [Color; 16],
}

const PALETTE_SLOTS: [&str; 18] = [
    "fg",
    "bg",
    "black",
    "red",
    "green",
    "yellow",
    "blue",
    "magenta",
    "cyan",
    "white",
    "bright_black",
    "bright_red",
    "bright_green",
    "bright_yellow",
    "bright_blue",
    "bright_magenta",
    "bright_cyan",
    "bright_white",
];

impl TuiPalette {
    fn parse_csv(value: &str) -> Result<Self, PaletteError> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        if parts.len() != PALETTE_SLOTS.len() {
            return Err(PaletteError::WrongCount { found: parts.len() });
        }

        let mut colors = [Color::Reset; 18];
        for ((slot, raw), color) in PALETTE_SLOTS.iter().zip(&parts).zip(colors.iter_mut()) {
            *color = parse_color(raw).ok_or_else(|| PaletteError::BadColor {
                slot: *slot,
                value: (*raw).to_owned(),
            })?;
        }

        let [fg, bg, ansi @ ..] = colors;
        Ok(Self { fg, bg, ansi })
    }
}

fn palette_override_from_env() -> Result<Option<TuiPalette>, ThemeError> {
    match env::var(PALETTE_ENV) {
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ThemeError::NotUnicode),
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(TuiPalette::parse_csv(value.trim())?)),
    }
}

/// Accepts `#rrggbb`, `0xrrggbb`, `rgb:rr/gg/bb` (2 or 4 hex digits per channel), and the
/// colour names and indices ratatui understands.
fn parse_color(raw: &str) -> Option<Color> {
    let lower = raw.trim().to_ascii_lowercase();
    if lower.is_empty() {
        return None;
    }

    if let Some(channels) = lower.strip_prefix("rgb:") {
        let mut parsed = channels.split('/').map(hex_channel);
        let (r, g, b) = (parsed.next()??, parsed.next()??, parsed.next()??);
        return parsed.next().is_none().then_some(Color::Rgb(r, g, b));
    }

    let hex = lower.strip_prefix('#').or_else(|| lower.strip_prefix("0x")).unwrap_or(&lower);
    if hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        let rgb = u32::from_str_radix(hex, 16).ok()?;
        let [_, r, g, b] = rgb.to_be_bytes();
        return Some(Color::Rgb(r, g, b));
    }

    Color::from_str(&lower).ok()
}

/// One `rgb:` channel; 4-digit channels keep their high byte.
fn hex_channel(raw: &str) -> Option<u8> {
    match raw.len() {
        2 => u8::from_str_radix(raw, 16).ok(),
        4 => u16::from_str_radix(raw, 16).ok().map(|value| (value >> 8) as u8),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
enum Ansi16 {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

/// Terminal-default colours in `Ansi16` order.
const DEFAULT_ANSI: [Color; 16] = [
    Color::Black,
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::Gray,
    Color::DarkGray,
    Color::LightRed,
    Color::LightGreen,
    Color::LightYellow,
    Color::LightBlue,
    Color::LightMagenta,
    Color::LightCyan,
    Color::White,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum PaletteError {
    #[error("expected {} comma-separated colors ({}), got {found}", PALETTE_SLOTS.len(), PALETTE_SLOTS.join(","))]
    WrongCount { found: usize },
    #[error("invalid color {value:?} for {slot}")]
    BadColor { slot: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ThemeError {
    #[error("invalid env XR_TUI_PALETTE: value is not unicode")]
    NotUnicode,
    #[error("invalid env XR_TUI_PALETTE: {0}")]
    Palette(#[from] PaletteError),
}
