//! Semantic color tokens for dashboard rendering, with `NO_COLOR` support.

#![allow(missing_docs)]

use std::env;

use crossterm::style::Color;

use crate::queue::view::Status;
use crate::tui::notifications::Severity;

/// Color output mode for compatibility with `NO_COLOR` and terminal policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Enabled,
    Disabled,
}

impl ColorMode {
    #[must_use]
    pub const fn from_no_color_flag(no_color: bool) -> Self {
        if no_color {
            Self::Disabled
        } else {
            Self::Enabled
        }
    }

    /// `--no-color` wins; otherwise honor the `NO_COLOR` convention.
    #[must_use]
    pub fn from_environment(no_color_flag: bool) -> Self {
        Self::from_no_color_flag(no_color_flag || env::var_os("NO_COLOR").is_some())
    }
}

/// Semantic token category independent of concrete color codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Accent,
    Success,
    Warning,
    Danger,
    Muted,
    Neutral,
}

impl Token {
    #[must_use]
    pub const fn for_status(status: Status) -> Self {
        match status {
            Status::Normal => Self::Success,
            Status::Warning => Self::Warning,
            Status::Critical => Self::Danger,
        }
    }

    #[must_use]
    pub const fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Info => Self::Accent,
            Severity::Success => Self::Success,
            Severity::Warning => Self::Warning,
            Severity::Error => Self::Danger,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub color: ColorMode,
}

impl Theme {
    #[must_use]
    pub const fn new(color: ColorMode) -> Self {
        Self { color }
    }

    /// Concrete foreground color, `None` when color is disabled.
    #[must_use]
    pub const fn color(self, token: Token) -> Option<Color> {
        if matches!(self.color, ColorMode::Disabled) {
            return None;
        }
        Some(match token {
            Token::Accent => Color::Cyan,
            Token::Success => Color::Green,
            Token::Warning => Color::Yellow,
            Token::Danger => Color::Red,
            Token::Muted => Color::DarkGrey,
            Token::Neutral => Color::White,
        })
    }
}
