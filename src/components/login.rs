//! Login screen for Dentoria.
//!
//! Provides the authenticated-session context the rest of the application
//! runs inside: staff sign in with a username and password verified against
//! the bcrypt hashes in the users table.

use crate::components::Component;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::time::{Duration, Instant};

/// Selection indices on the login screen.
const USERNAME_FIELD: usize = 0;
const PASSWORD_FIELD: usize = 1;
const EXIT_OPTION: usize = 2;

/// Represents the login UI component.
#[derive(Debug, Default)]
pub struct Login {
    /// The username input field.
    pub username: String,
    /// The password input field.
    pub password: String,
    /// Optional error message to display.
    pub error_message: Option<String>,
    /// Optional success message (e.g. after logout).
    pub success_message: Option<String>,
    /// Current selection (username, password, exit).
    pub selected_index: usize,
    /// Whether the exit confirmation dialog is open.
    pub show_exit_dialog: bool,
    /// Selected option in the exit dialog (0: Yes, 1: No).
    pub exit_dialog_selected: usize,
    /// Time when the error message was last shown.
    error_message_time: Option<Instant>,
}

impl Login {
    pub fn new() -> Self {
        Self {
            selected_index: USERNAME_FIELD,
            exit_dialog_selected: 1,
            ..Default::default()
        }
    }

    /// Clears both input fields, e.g. after a logout.
    pub fn reset_fields(&mut self) {
        self.username.clear();
        self.password.clear();
        self.selected_index = USERNAME_FIELD;
    }

    pub fn set_error_message(&mut self, message: String) {
        self.success_message = None;
        self.error_message = Some(message);
        self.error_message_time = Some(Instant::now());
    }

    pub fn set_success_message(&mut self, message: String) {
        self.error_message = None;
        self.success_message = Some(message);
        self.error_message_time = Some(Instant::now());
    }

    fn clear_messages(&mut self) {
        self.error_message = None;
        self.success_message = None;
        self.error_message_time = None;
    }

    /// Hides timed-out messages; called on every tick.
    pub fn check_error_timeout(&mut self) {
        if let Some(time) = self.error_message_time {
            if time.elapsed() >= Duration::from_secs(5) {
                self.clear_messages();
            }
        }
    }

    /// Handles a key while the exit dialog is open.
    ///
    /// Returns `true` if the user confirmed the exit.
    fn handle_exit_dialog_input(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                self.exit_dialog_selected = 1 - self.exit_dialog_selected;
            }
            KeyCode::Enter => {
                if self.exit_dialog_selected == 0 {
                    return true;
                }
                self.show_exit_dialog = false;
            }
            KeyCode::Esc => {
                self.show_exit_dialog = false;
            }
            _ => {}
        }
        false
    }
}

impl Component for Login {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<crate::app::SelectedApp>> {
        self.check_error_timeout();

        if self.show_exit_dialog {
            if self.handle_exit_dialog_input(event) {
                return Ok(Some(crate::app::SelectedApp::Quit));
            }
            return Ok(None);
        }

        match event.code {
            KeyCode::Char(c) => {
                match self.selected_index {
                    USERNAME_FIELD => self.username.push(c),
                    PASSWORD_FIELD => self.password.push(c),
                    _ => {}
                }
                self.clear_messages();
            }
            KeyCode::Backspace => {
                match self.selected_index {
                    USERNAME_FIELD => {
                        self.username.pop();
                    }
                    PASSWORD_FIELD => {
                        self.password.pop();
                    }
                    _ => {}
                }
                self.clear_messages();
            }
            KeyCode::Tab | KeyCode::Down => {
                self.selected_index = (self.selected_index + 1) % 3;
            }
            KeyCode::Up => {
                self.selected_index = (self.selected_index + 2) % 3;
            }
            KeyCode::Enter => {
                if self.selected_index == EXIT_OPTION {
                    self.show_exit_dialog = true;
                } else {
                    if self.username.is_empty() {
                        self.set_error_message("Username cannot be empty.".to_string());
                        return Ok(None);
                    }
                    if self.password.is_empty() {
                        self.set_error_message("Password cannot be empty.".to_string());
                        return Ok(None);
                    }
                    // Signal the shell to attempt authentication.
                    return Ok(Some(crate::app::SelectedApp::None));
                }
            }
            KeyCode::Esc => {
                self.show_exit_dialog = true;
            }
            _ => {}
        }

        Ok(None)
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(
            Block::default().style(Style::default().bg(Color::Rgb(16, 16, 28))),
            area,
        );

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(4),
                Constraint::Length(16),
                Constraint::Min(4),
            ])
            .split(area);

        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(10),
                Constraint::Length(52),
                Constraint::Min(10),
            ])
            .split(vertical[1]);

        let card = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(75, 75, 120)))
            .title(Span::styled(
                " 🦷 DENTORIA ",
                Style::default()
                    .fg(Color::Rgb(230, 230, 250))
                    .add_modifier(Modifier::BOLD),
            ))
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Rgb(22, 22, 35)));
        frame.render_widget(card.clone(), horizontal[1]);
        let inner = card.inner(horizontal[1]);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Caption
                Constraint::Length(3), // Username
                Constraint::Length(3), // Password
                Constraint::Length(1), // Message
                Constraint::Length(1), // Exit option
                Constraint::Min(1),    // Help
            ])
            .margin(1)
            .split(inner);

        let caption = Paragraph::new("Practice administration — please sign in")
            .style(Style::default().fg(Color::Rgb(140, 140, 170)))
            .alignment(Alignment::Center);
        frame.render_widget(caption, rows[0]);

        let username_input = Paragraph::new(self.username.clone())
            .style(Style::default().fg(Color::Rgb(220, 220, 240)))
            .block(input_block(
                " Username ",
                self.selected_index == USERNAME_FIELD,
            ));
        frame.render_widget(username_input, rows[1]);

        let masked: String = "•".repeat(self.password.chars().count());
        let password_input = Paragraph::new(masked)
            .style(Style::default().fg(Color::Rgb(220, 220, 240)))
            .block(input_block(
                " Password ",
                self.selected_index == PASSWORD_FIELD,
            ));
        frame.render_widget(password_input, rows[2]);

        let message = if let Some(error) = &self.error_message {
            Paragraph::new(error.clone())
                .style(Style::default().fg(Color::Rgb(255, 100, 100)))
                .alignment(Alignment::Center)
        } else if let Some(success) = &self.success_message {
            Paragraph::new(success.clone())
                .style(Style::default().fg(Color::Rgb(140, 219, 140)))
                .alignment(Alignment::Center)
        } else {
            Paragraph::new("")
        };
        frame.render_widget(message, rows[3]);

        let exit_text = if self.selected_index == EXIT_OPTION {
            "► Exit ◄"
        } else {
            "  Exit  "
        };
        let exit_style = if self.selected_index == EXIT_OPTION {
            Style::default()
                .fg(Color::Rgb(129, 199, 245))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Rgb(180, 180, 200))
        };
        frame.render_widget(
            Paragraph::new(exit_text)
                .style(exit_style)
                .alignment(Alignment::Center),
            rows[4],
        );

        let help = Paragraph::new("Tab: Switch Field | Enter: Sign In | Esc: Exit")
            .style(Style::default().fg(Color::Rgb(140, 140, 170)))
            .alignment(Alignment::Center);
        frame.render_widget(help, rows[5]);

        if self.show_exit_dialog {
            render_exit_dialog(frame, self.exit_dialog_selected);
        }
    }
}

fn input_block(title: &str, focused: bool) -> Block<'_> {
    let color = if focused {
        Color::Rgb(250, 250, 110)
    } else {
        Color::Rgb(140, 140, 200)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(Span::styled(title.to_string(), Style::default().fg(color)))
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(Color::Rgb(26, 26, 36)))
}

fn render_exit_dialog(frame: &mut Frame, selected: usize) {
    let area = frame.area();
    let width = 36u16.min(area.width);
    let height = 6u16.min(area.height);
    let dialog = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );

    frame.render_widget(Clear, dialog);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(255, 100, 100)))
        .title(" Exit Dentoria? ")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(Color::Rgb(22, 22, 35)));
    frame.render_widget(block.clone(), dialog);

    let inner = block.inner(dialog);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(1)])
        .margin(1)
        .split(inner);

    let options = if selected == 0 {
        "► Yes ◄      No  "
    } else {
        "  Yes      ► No ◄"
    };
    frame.render_widget(
        Paragraph::new("Unsaved input will be lost.")
            .style(Style::default().fg(Color::Rgb(180, 180, 200)))
            .alignment(Alignment::Center),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(options)
            .style(Style::default().fg(Color::Rgb(230, 230, 250)))
            .alignment(Alignment::Center),
        rows[1],
    );
}
