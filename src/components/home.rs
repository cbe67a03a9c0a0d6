//! Home screen for Dentoria.
//!
//! Shown after a successful sign-in; routes to the administration screens.

use crate::app::SelectedApp;
use crate::components::Component;
use crate::db;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};

const MENU_ITEMS: [&str; 4] = ["Add Doctor", "Doctor Directory", "Logout", "Quit"];

/// The post-login menu component.
pub struct Home {
    selected_index: usize,
    /// Username of the signed-in staff member.
    username: Option<String>,
}

impl Home {
    pub fn new() -> Self {
        Self {
            selected_index: 0,
            username: None,
        }
    }

    /// Loads the signed-in user's name for the header.
    pub fn load_username(&mut self, user_id: i64) -> Result<()> {
        self.username = Some(db::client()?.username_of(user_id)?);
        Ok(())
    }
}

impl Default for Home {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Home {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<SelectedApp>> {
        match event.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_index =
                    (self.selected_index + MENU_ITEMS.len() - 1) % MENU_ITEMS.len();
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                self.selected_index = (self.selected_index + 1) % MENU_ITEMS.len();
            }
            KeyCode::Enter => {
                return Ok(Some(match self.selected_index {
                    0 => SelectedApp::DoctorAdd,
                    1 => SelectedApp::DoctorDirectory,
                    2 => SelectedApp::None, // Logout
                    _ => SelectedApp::Quit,
                }));
            }
            KeyCode::Esc => {
                return Ok(Some(SelectedApp::None)); // Logout
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

        let main_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(10),   // Menu
                Constraint::Length(2), // Help
            ])
            .margin(1)
            .split(area);

        let header = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::Rgb(75, 75, 120)));
        frame.render_widget(header, main_layout[0]);

        let welcome = match &self.username {
            Some(name) => format!("🦷 DENTORIA — signed in as {name}"),
            None => "🦷 DENTORIA".to_string(),
        };
        let title = Paragraph::new(welcome)
            .style(
                Style::default()
                    .fg(Color::Rgb(230, 230, 250))
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center);
        frame.render_widget(title, main_layout[0]);

        let menu_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(10),
                Constraint::Length(40),
                Constraint::Min(10),
            ])
            .split(main_layout[1]);

        let items: Vec<ListItem> = MENU_ITEMS
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let style = if i == self.selected_index {
                    Style::default()
                        .fg(Color::Rgb(250, 250, 110))
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Rgb(180, 180, 200))
                };
                let prefix = if i == self.selected_index { "► " } else { "  " };
                ListItem::new(format!("{prefix}{item}")).style(style)
            })
            .collect();

        let menu = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Rgb(75, 75, 120)))
                .title(" Menu ")
                .style(Style::default().bg(Color::Rgb(22, 22, 35))),
        );
        frame.render_widget(menu, menu_area[1]);

        let help = Paragraph::new("↑/↓: Navigate | Enter: Select | Esc: Logout")
            .style(Style::default().fg(Color::Rgb(140, 140, 170)))
            .alignment(Alignment::Center);
        frame.render_widget(help, main_layout[2]);
    }
}
