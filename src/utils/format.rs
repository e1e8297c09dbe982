//! Console output utilities
//!
//! Colored progress lines and table rendering for the sample's console
//! output. Everything printed here is informational; the same events are
//! also emitted through `tracing`.

use crate::error::Result;
use crossterm::{
    style::{Color as CrosstermColor, Stylize},
    terminal::size,
};
use tabled::{
    settings::{object::Rows, Alignment, Color, Modify, Padding, Style, Width},
    Table, Tabled,
};

/// Color theme for console output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub header: CrosstermColor,
    pub success: CrosstermColor,
    pub warning: CrosstermColor,
    pub error: CrosstermColor,
    pub info: CrosstermColor,
    pub accent: CrosstermColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            header: CrosstermColor::Blue,
            success: CrosstermColor::Green,
            warning: CrosstermColor::Yellow,
            error: CrosstermColor::Red,
            info: CrosstermColor::Cyan,
            accent: CrosstermColor::Magenta,
        }
    }
}

/// Display utilities for progress messages
#[derive(Debug, Clone)]
pub struct DisplayUtils {
    theme: ColorTheme,
    no_color: bool,
}

impl DisplayUtils {
    /// Create new display utilities
    pub fn new(no_color: bool) -> Self {
        Self {
            theme: ColorTheme::default(),
            no_color,
        }
    }

    /// Print a header underlined to its own width
    pub fn print_header(&self, title: &str) -> Result<()> {
        let underline = "-".repeat(title.chars().count());
        if self.no_color {
            println!("{}\n{}", title, underline);
        } else {
            println!(
                "{}\n{}",
                title.with(self.theme.header).bold(),
                underline.with(self.theme.header)
            );
        }
        Ok(())
    }

    /// Print success message
    pub fn print_success(&self, message: &str) -> Result<()> {
        let styled_message = if self.no_color {
            format!("✓ {}", message)
        } else {
            format!("✓ {}", message.with(self.theme.success))
        };

        println!("{}", styled_message);
        Ok(())
    }

    /// Print warning message
    pub fn print_warning(&self, message: &str) -> Result<()> {
        let styled_message = if self.no_color {
            format!("⚠ {}", message)
        } else {
            format!("⚠ {}", message.with(self.theme.warning))
        };

        println!("{}", styled_message);
        Ok(())
    }

    /// Print error message
    pub fn print_error(&self, message: &str) -> Result<()> {
        let styled_message = if self.no_color {
            format!("✗ {}", message)
        } else {
            format!("✗ {}", message.with(self.theme.error))
        };

        eprintln!("{}", styled_message);
        Ok(())
    }

    /// Print info message
    pub fn print_info(&self, message: &str) -> Result<()> {
        let styled_message = if self.no_color {
            format!("ℹ {}", message)
        } else {
            format!("ℹ {}", message.with(self.theme.info))
        };

        println!("{}", styled_message);
        Ok(())
    }

    /// Format key-value pairs
    pub fn format_key_value_pairs(&self, pairs: &[(&str, &str)]) -> String {
        let max_key_length = pairs.iter().map(|(key, _)| key.len()).max().unwrap_or(0);

        pairs
            .iter()
            .map(|(key, value)| {
                let formatted_key = if self.no_color {
                    format!("{:width$}", key, width = max_key_length)
                } else {
                    format!(
                        "{:width$}",
                        key.with(self.theme.accent).bold(),
                        width = max_key_length
                    )
                };
                format!("{}: {}", formatted_key, value)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Render rows as a rounded table sized to the terminal
pub fn format_rows<T: Tabled>(rows: &[T], no_color: bool) -> String {
    if rows.is_empty() {
        return "No data to display".to_string();
    }

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .with(Padding::new(1, 1, 0, 0));

    if !no_color {
        table.with(Modify::new(Rows::first()).with(Color::FG_BLUE));
    }

    if let Ok((width, _)) = size() {
        table.with(Width::wrap(width as usize));
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Tabled)]
    struct TestRow {
        stage: String,
        status: String,
    }

    #[test]
    fn test_format_rows() {
        let rows = vec![
            TestRow {
                stage: "Account".to_string(),
                status: "Succeeded".to_string(),
            },
            TestRow {
                stage: "Pool".to_string(),
                status: "Failed".to_string(),
            },
        ];

        let output = format_rows(&rows, true);
        assert!(output.contains("Account"));
        assert!(output.contains("Failed"));
    }

    #[test]
    fn test_format_rows_empty() {
        let rows: Vec<TestRow> = Vec::new();
        assert_eq!(format_rows(&rows, true), "No data to display");
    }

    #[test]
    fn test_key_value_formatting() {
        let display = DisplayUtils::new(true);
        let pairs = vec![("Resource group", "anf02-rg"), ("Kind", "capacity pool")];

        let result = display.format_key_value_pairs(&pairs);
        assert!(result.contains("Resource group: anf02-rg"));
        assert!(result.contains("capacity pool"));
    }
}
