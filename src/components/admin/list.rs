//! Doctor directory.
//!
//! Displays the practice's doctors in a searchable table with a per-doctor
//! detail view. All reads go through the shared [`DoctorCache`]: the list is
//! fetched once, then served from the cache until a mutation marks it stale.

use crate::app::SelectedApp;
use crate::cache::DoctorCache;
use crate::components::Component;
use crate::db;
use crate::models::{Doctor, Gender};
use crate::tui::Frame;
use crate::utils::avatar_initials;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use time::macros::format_description;
use time::PrimitiveDateTime;

/// The two views of the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryViewState {
    ViewingList,
    ViewingDetails,
}

/// Component for browsing the doctor directory.
pub struct DoctorDirectory {
    cache: DoctorCache,
    /// Snapshot of the cached doctor list.
    doctors: Vec<Doctor>,
    /// Doctors matching the current search query.
    filtered_doctors: Vec<Doctor>,
    search_input: String,
    is_searching: bool,
    state: TableState,
    error_message: Option<String>,
    view_state: DirectoryViewState,
}

impl DoctorDirectory {
    pub fn new(cache: DoctorCache) -> Self {
        Self {
            cache,
            doctors: Vec::new(),
            filtered_doctors: Vec::new(),
            search_input: String::new(),
            is_searching: false,
            state: TableState::default(),
            error_message: None,
            view_state: DirectoryViewState::ViewingList,
        }
    }

    /// Fetches the doctor list through the persistence client and stores it
    /// in the shared cache. Fetch errors are shown inline, not propagated.
    pub fn refresh(&mut self) {
        match db::client().and_then(|client| client.all_doctors()) {
            Ok(doctors) => {
                self.cache.store(doctors);
                self.error_message = None;
            }
            Err(e) => {
                self.error_message = Some(format!("Failed to fetch doctors: {}", e));
            }
        }
        self.doctors = self.cache.doctors();
        self.filter_doctors();
    }

    /// Refetches only when a mutation has marked the cache stale (or no
    /// fetch has happened yet). Called on every tick while visible.
    pub fn refresh_if_stale(&mut self) {
        if self.cache.needs_fetch() {
            self.refresh();
        }
    }

    /// Applies the search query across name, speciality, email and phone.
    fn filter_doctors(&mut self) {
        if self.search_input.is_empty() {
            self.filtered_doctors = self.doctors.clone();
        } else {
            let term = self.search_input.to_lowercase();
            self.filtered_doctors = self
                .doctors
                .iter()
                .filter(|doctor| {
                    doctor.name.to_lowercase().contains(&term)
                        || doctor.speciality.to_lowercase().contains(&term)
                        || doctor.email.to_lowercase().contains(&term)
                        || doctor.phone.contains(&term)
                })
                .cloned()
                .collect();
        }

        if self.filtered_doctors.is_empty() {
            self.state.select(None);
        } else {
            let selection = self
                .state
                .selected()
                .unwrap_or(0)
                .min(self.filtered_doctors.len() - 1);
            self.state.select(Some(selection));
        }
    }

    fn selected_doctor(&self) -> Option<&Doctor> {
        self.state
            .selected()
            .and_then(|index| self.filtered_doctors.get(index))
    }

    fn select_next(&mut self) {
        if self.filtered_doctors.is_empty() {
            return;
        }
        let next = match self.state.selected() {
            Some(i) => (i + 1) % self.filtered_doctors.len(),
            None => 0,
        };
        self.state.select(Some(next));
    }

    fn select_previous(&mut self) {
        if self.filtered_doctors.is_empty() {
            return;
        }
        let previous = match self.state.selected() {
            Some(i) => (i + self.filtered_doctors.len() - 1) % self.filtered_doctors.len(),
            None => 0,
        };
        self.state.select(Some(previous));
    }

    /// Flips the selected doctor's active flag and invalidates the cache so
    /// every reader sees the change.
    fn toggle_selected_active(&mut self) {
        let Some(doctor) = self.selected_doctor() else {
            return;
        };
        let (id, next) = (doctor.id, !doctor.is_active);

        match db::client().and_then(|client| client.set_doctor_active(id, next)) {
            Ok(()) => {
                self.cache.invalidate();
                self.refresh();
            }
            Err(e) => {
                self.error_message = Some(format!("Failed to update doctor: {}", e));
            }
        }
    }
}

impl Component for DoctorDirectory {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<SelectedApp>> {
        if self.view_state == DirectoryViewState::ViewingDetails {
            match event.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace => {
                    self.view_state = DirectoryViewState::ViewingList;
                }
                KeyCode::Char('a') => self.toggle_selected_active(),
                _ => {}
            }
            return Ok(None);
        }

        if self.is_searching {
            match event.code {
                KeyCode::Char(c) => {
                    self.search_input.push(c);
                    self.filter_doctors();
                }
                KeyCode::Backspace => {
                    self.search_input.pop();
                    self.filter_doctors();
                }
                KeyCode::Esc => {
                    self.is_searching = false;
                    self.search_input.clear();
                    self.filter_doctors();
                }
                KeyCode::Enter | KeyCode::Down => {
                    self.is_searching = false;
                }
                _ => {}
            }
            return Ok(None);
        }

        match event.code {
            KeyCode::Char('/') => {
                self.is_searching = true;
            }
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Char('r') => {
                self.cache.invalidate();
                self.refresh();
            }
            KeyCode::Char('a') => self.toggle_selected_active(),
            KeyCode::Enter => {
                if self.selected_doctor().is_some() {
                    self.view_state = DirectoryViewState::ViewingDetails;
                }
            }
            KeyCode::Esc => {
                return Ok(Some(SelectedApp::None));
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
                Constraint::Length(3), // Search
                Constraint::Min(10),   // Table or details
                Constraint::Length(1), // Error line
                Constraint::Length(2), // Help
            ])
            .margin(1)
            .split(area);

        let header = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::Rgb(75, 75, 120)));
        frame.render_widget(header, main_layout[0]);

        let title = Paragraph::new("🦷 DOCTOR DIRECTORY")
            .style(
                Style::default()
                    .fg(Color::Rgb(230, 230, 250))
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center);
        frame.render_widget(title, main_layout[0]);

        let search_color = if self.is_searching {
            Color::Rgb(250, 250, 110)
        } else {
            Color::Rgb(140, 140, 200)
        };
        let search = Paragraph::new(self.search_input.clone())
            .style(Style::default().fg(Color::Rgb(220, 220, 240)))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(Span::styled(
                        " Search (name, speciality, email, phone) ",
                        Style::default().fg(search_color),
                    ))
                    .border_style(Style::default().fg(search_color))
                    .style(Style::default().bg(Color::Rgb(26, 26, 36))),
            );
        frame.render_widget(search, main_layout[1]);

        match self.view_state {
            DirectoryViewState::ViewingList => self.render_table(frame, main_layout[2]),
            DirectoryViewState::ViewingDetails => self.render_details(frame, main_layout[2]),
        }

        if let Some(error) = &self.error_message {
            let status = Paragraph::new(format!("⚠️ {}", error))
                .style(Style::default().fg(Color::Rgb(255, 100, 100)))
                .alignment(Alignment::Center);
            frame.render_widget(status, main_layout[3]);
        }

        let help_text = match self.view_state {
            DirectoryViewState::ViewingList => {
                "/: Search | ↑/↓: Navigate | Enter: Details | a: Toggle Active | r: Refresh | Esc: Back"
            }
            DirectoryViewState::ViewingDetails => "a: Toggle Active | Esc: Back to List",
        };
        let help = Paragraph::new(help_text)
            .style(Style::default().fg(Color::Rgb(140, 140, 170)))
            .alignment(Alignment::Center);
        frame.render_widget(help, main_layout[4]);
    }
}

impl DoctorDirectory {
    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let rows: Vec<Row> = self
            .filtered_doctors
            .iter()
            .map(|doctor| {
                let status = if doctor.is_active { "Active" } else { "Inactive" };
                Row::new(vec![
                    doctor.name.clone(),
                    doctor.speciality.clone(),
                    doctor.email.clone(),
                    doctor.phone.clone(),
                    status.to_string(),
                ])
                .style(Style::default().fg(Color::Rgb(220, 220, 240)))
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(25),
                Constraint::Percentage(20),
                Constraint::Percentage(30),
                Constraint::Percentage(15),
                Constraint::Percentage(10),
            ],
        )
        .header(
            Row::new(vec!["Name", "Speciality", "Email", "Phone", "Status"]).style(
                Style::default()
                    .fg(Color::Rgb(230, 230, 250))
                    .add_modifier(Modifier::BOLD),
            ),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Rgb(75, 75, 120)))
                .title(format!(" Doctors ({}) ", self.filtered_doctors.len()))
                .style(Style::default().bg(Color::Rgb(22, 22, 35))),
        )
        .row_highlight_style(
            Style::default()
                .fg(Color::Rgb(250, 250, 110))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("► ");

        let mut state = self.state.clone();
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_details(&self, frame: &mut Frame, area: Rect) {
        let Some(doctor) = self.selected_doctor() else {
            return;
        };

        let gender = match doctor.gender {
            Gender::Male => "Male",
            Gender::Female => "Female",
        };
        let avatar = if doctor.image_url.is_empty() {
            format!("{} (initials)", avatar_initials(&doctor.name))
        } else {
            "🖼 image on file".to_string()
        };
        let status = if doctor.is_active { "Active" } else { "Inactive" };

        let lines = vec![
            Line::from(vec![
                Span::styled("Name:        ", Style::default().fg(Color::Rgb(140, 140, 200))),
                Span::raw(doctor.name.clone()),
            ]),
            Line::from(vec![
                Span::styled("Speciality:  ", Style::default().fg(Color::Rgb(140, 140, 200))),
                Span::raw(doctor.speciality.clone()),
            ]),
            Line::from(vec![
                Span::styled("Email:       ", Style::default().fg(Color::Rgb(140, 140, 200))),
                Span::raw(doctor.email.clone()),
            ]),
            Line::from(vec![
                Span::styled("Phone:       ", Style::default().fg(Color::Rgb(140, 140, 200))),
                Span::raw(doctor.phone.clone()),
            ]),
            Line::from(vec![
                Span::styled("Gender:      ", Style::default().fg(Color::Rgb(140, 140, 200))),
                Span::raw(gender),
            ]),
            Line::from(vec![
                Span::styled("Status:      ", Style::default().fg(Color::Rgb(140, 140, 200))),
                Span::raw(status),
            ]),
            Line::from(vec![
                Span::styled("Avatar:      ", Style::default().fg(Color::Rgb(140, 140, 200))),
                Span::raw(avatar),
            ]),
            Line::from(vec![
                Span::styled("Added:       ", Style::default().fg(Color::Rgb(140, 140, 200))),
                Span::raw(format_created_at(&doctor.created_at)),
            ]),
        ];

        let details = Paragraph::new(lines)
            .style(Style::default().fg(Color::Rgb(220, 220, 240)))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Rgb(75, 75, 120)))
                    .title(format!(" {} ", doctor.name))
                    .style(Style::default().bg(Color::Rgb(22, 22, 35))),
            );
        frame.render_widget(details, area);
    }
}

/// Renders SQLite's `datetime('now')` output as e.g. "Jan 02, 2026".
/// Falls back to the raw value if it does not parse.
fn format_created_at(raw: &str) -> String {
    let stored = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    match PrimitiveDateTime::parse(raw, &stored) {
        Ok(datetime) => datetime
            .format(format_description!("[month repr:short] [day], [year]"))
            .unwrap_or_else(|_| raw.to_string()),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor(name: &str, speciality: &str, email: &str, phone: &str) -> Doctor {
        Doctor {
            id: 1,
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            speciality: speciality.into(),
            gender: Gender::Male,
            is_active: true,
            image_url: String::new(),
            created_at: "2026-08-30 10:00:00".into(),
        }
    }

    fn directory_with(doctors: Vec<Doctor>) -> DoctorDirectory {
        let mut directory = DoctorDirectory::new(DoctorCache::new());
        directory.doctors = doctors;
        directory.filter_doctors();
        directory
    }

    #[test]
    fn search_matches_across_fields() {
        let mut directory = directory_with(vec![
            doctor("Dr. Jane Roe", "Orthodontics", "jane@example.com", "(555) 123-4567"),
            doctor("Dr. Zoe Park", "Endodontics", "zoe@example.com", "(555) 987-6543"),
        ]);

        directory.search_input = "ortho".into();
        directory.filter_doctors();
        assert_eq!(directory.filtered_doctors.len(), 1);
        assert_eq!(directory.filtered_doctors[0].name, "Dr. Jane Roe");

        directory.search_input = "987".into();
        directory.filter_doctors();
        assert_eq!(directory.filtered_doctors.len(), 1);
        assert_eq!(directory.filtered_doctors[0].name, "Dr. Zoe Park");

        directory.search_input = "example.com".into();
        directory.filter_doctors();
        assert_eq!(directory.filtered_doctors.len(), 2);
    }

    #[test]
    fn empty_filter_clears_selection() {
        let mut directory = directory_with(vec![doctor(
            "Dr. Jane Roe",
            "Orthodontics",
            "jane@example.com",
            "",
        )]);
        directory.state.select(Some(0));
        directory.search_input = "no such doctor".into();
        directory.filter_doctors();
        assert!(directory.filtered_doctors.is_empty());
        assert_eq!(directory.state.selected(), None);
    }

    #[test]
    fn created_at_renders_short_form() {
        assert_eq!(format_created_at("2026-08-30 10:00:00"), "Aug 30, 2026");
        assert_eq!(format_created_at("not a date"), "not a date");
    }
}
