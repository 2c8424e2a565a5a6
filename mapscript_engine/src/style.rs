//! Styling helpers for console output.
//!
//! [`GameStyle`] applies ANSI styling via the `colored` crate and is
//! implemented for `&str` and `String` so literals can be styled directly.

use colored::{ColoredString, Colorize};

pub trait GameStyle {
    fn map_title_style(&self) -> ColoredString;
    fn map_text_style(&self) -> ColoredString;
    fn prompt_style(&self) -> ColoredString;
    fn world_style(&self) -> ColoredString;
    fn outcome_style(&self) -> ColoredString;
    fn denied_style(&self) -> ColoredString;
    fn error_style(&self) -> ColoredString;
    fn section_style(&self) -> ColoredString;
}

impl GameStyle for &str {
    fn map_title_style(&self) -> ColoredString {
        self.truecolor(223, 77, 10).underline()
    }
    fn map_text_style(&self) -> ColoredString {
        self.italic().truecolor(102, 208, 250)
    }
    fn prompt_style(&self) -> ColoredString {
        self.bold().truecolor(220, 180, 40)
    }
    fn world_style(&self) -> ColoredString {
        self.italic().truecolor(110, 220, 110)
    }
    fn outcome_style(&self) -> ColoredString {
        self.italic().truecolor(230, 230, 30)
    }
    fn denied_style(&self) -> ColoredString {
        self.italic().truecolor(200, 50, 50)
    }
    fn error_style(&self) -> ColoredString {
        self.bold().truecolor(230, 30, 30)
    }
    fn section_style(&self) -> ColoredString {
        let bracketed = format!("[{self}]");
        bracketed.truecolor(75, 80, 75)
    }
}

impl GameStyle for String {
    fn map_title_style(&self) -> ColoredString {
        self.as_str().map_title_style()
    }
    fn map_text_style(&self) -> ColoredString {
        self.as_str().map_text_style()
    }
    fn prompt_style(&self) -> ColoredString {
        self.as_str().prompt_style()
    }
    fn world_style(&self) -> ColoredString {
        self.as_str().world_style()
    }
    fn outcome_style(&self) -> ColoredString {
        self.as_str().outcome_style()
    }
    fn denied_style(&self) -> ColoredString {
        self.as_str().denied_style()
    }
    fn error_style(&self) -> ColoredString {
        self.as_str().error_style()
    }
    fn section_style(&self) -> ColoredString {
        self.as_str().section_style()
    }
}
