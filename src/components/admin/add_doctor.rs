//! Doctor-creation dialog.
//!
//! Collects a new doctor draft, validates it field by field, and delegates
//! persistence to the create mutation. The dialog owns no database logic:
//! it edits an immutable [`DoctorDraft`] through pure transitions, snapshots
//! it at submit time, and reacts to the mutation's observable state.

use super::draft::{self, DoctorDraft, TextField};
use crate::cache::DoctorCache;
use crate::components::Component;
use crate::db;
use crate::models::{Doctor, Gender};
use crate::mutation::{CreateDoctorMutation, MutationState};
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use std::fs;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

/// Focus positions in the form.
const NAME_FIELD: usize = 0;
const SPECIALITY_FIELD: usize = 1;
const EMAIL_FIELD: usize = 2;
const PHONE_FIELD: usize = 3;
const GENDER_FIELD: usize = 4;
const STATUS_FIELD: usize = 5;
const AVATAR_FIELD: usize = 6;
const SUBMIT_BUTTON: usize = 7;
const BACK_BUTTON: usize = 8;

/// Component for adding a new doctor to the practice.
pub struct AddDoctor {
    /// The draft being edited; replaced wholesale on every transition.
    draft: DoctorDraft,
    /// Raw path typed into the avatar field, confirmed with Enter.
    avatar_path: String,
    /// Receiver for an avatar read running on a worker thread.
    avatar_rx: Option<Receiver<(&'static str, Vec<u8>)>>,
    /// The create mutation this dialog submits through.
    mutation: CreateDoctorMutation,
    /// Currently focused position.
    focus_index: usize,
    /// Error message to display (if any).
    error_message: Option<String>,
    /// Timer for auto-clearing error messages.
    error_timer: Option<Instant>,
}

impl AddDoctor {
    pub fn new(cache: DoctorCache) -> Self {
        Self {
            draft: DoctorDraft::new(),
            avatar_path: String::new(),
            avatar_rx: None,
            mutation: CreateDoctorMutation::new(cache),
            focus_index: NAME_FIELD,
            error_message: None,
            error_timer: None,
        }
    }

    fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
        self.error_timer = Some(Instant::now());
    }

    fn clear_error(&mut self) {
        self.error_message = None;
        self.error_timer = None;
    }

    fn check_error_timeout(&mut self) {
        if let Some(timer) = self.error_timer {
            if timer.elapsed() > Duration::from_secs(5) {
                self.clear_error();
            }
        }
    }

    fn update_draft(&mut self, transition: impl FnOnce(DoctorDraft) -> DoctorDraft) {
        self.draft = transition(std::mem::take(&mut self.draft));
    }

    /// Resets the dialog to its just-opened state.
    ///
    /// Does not abort an in-flight write; the mutation worker finishes on
    /// its own and still invalidates the cache on a late success.
    fn close_reset(&mut self) {
        self.update_draft(DoctorDraft::reset);
        self.avatar_path.clear();
        self.avatar_rx = None;
        self.mutation.reset();
        self.focus_index = NAME_FIELD;
        self.clear_error();
    }

    /// Confirms the typed avatar path: validates type and size from
    /// metadata, then hands the read+encode to a worker thread so the UI
    /// loop never blocks on disk.
    fn confirm_avatar_selection(&mut self) {
        let path = self.avatar_path.trim().to_string();

        if path.is_empty() {
            self.update_draft(DoctorDraft::without_avatar_selection);
            return;
        }

        let size = match fs::metadata(&path) {
            Ok(metadata) => metadata.len(),
            Err(_) => {
                self.update_draft(|d| d.with_avatar_error("Could not open file.".to_string()));
                return;
            }
        };

        match draft::validate_avatar_file(&path, size) {
            Ok(mime) => {
                let (sender, receiver) = channel();
                thread::spawn(move || {
                    // A file that vanished between metadata and read is
                    // abandoned silently; the channel just disconnects.
                    if let Ok(bytes) = fs::read(&path) {
                        let _ = sender.send((mime, bytes));
                    }
                });
                self.avatar_rx = Some(receiver);
            }
            Err(message) => {
                self.update_draft(|d| d.with_avatar_error(message));
            }
        }
    }

    fn poll_avatar(&mut self) {
        let Some(receiver) = &self.avatar_rx else {
            return;
        };
        match receiver.try_recv() {
            Ok((mime, bytes)) => {
                self.update_draft(|d| d.with_avatar_data(mime, &bytes));
                self.avatar_rx = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.avatar_rx = None;
            }
        }
    }

    fn submit(&mut self) {
        if self.mutation.is_pending() {
            return;
        }
        if self.draft.name.is_empty() {
            self.set_error("Name cannot be empty".to_string());
            return;
        }
        if self.draft.email.is_empty() {
            self.set_error("Email cannot be empty".to_string());
            return;
        }
        if self.draft.speciality.is_empty() {
            self.set_error("Speciality cannot be empty".to_string());
            return;
        }

        match db::client() {
            Ok(client) => {
                self.mutation.submit(client, self.draft.to_doctor());
                self.clear_error();
            }
            Err(e) => self.set_error(format!("Database error: {}", e)),
        }
    }

    /// Per-tick upkeep: drains the avatar worker and the mutation.
    ///
    /// Returns the created doctor once a submission succeeds; the dialog
    /// has then already closed and reset itself. A rejected submission
    /// leaves the dialog open with the draft intact so the user can retry.
    pub fn on_tick(&mut self) -> Option<Doctor> {
        self.check_error_timeout();
        self.poll_avatar();
        self.mutation.poll();

        match self.mutation.state().clone() {
            MutationState::Success(doctor) => {
                self.close_reset();
                Some(doctor)
            }
            MutationState::Error(message) => {
                self.set_error(message);
                self.mutation.reset();
                None
            }
            _ => None,
        }
    }

    fn process_input(&mut self, key: KeyEvent) -> Result<Option<crate::app::SelectedApp>> {
        self.check_error_timeout();
        match key.code {
            KeyCode::Char(c) => {
                match self.focus_index {
                    NAME_FIELD => self.update_draft(|d| {
                        let mut name = d.name.clone();
                        name.push(c);
                        d.with_field(TextField::Name, name)
                    }),
                    SPECIALITY_FIELD => self.update_draft(|d| {
                        let mut speciality = d.speciality.clone();
                        speciality.push(c);
                        d.with_field(TextField::Speciality, speciality)
                    }),
                    EMAIL_FIELD => self.update_draft(|d| {
                        let mut email = d.email.clone();
                        email.push(c);
                        d.with_field(TextField::Email, email)
                    }),
                    PHONE_FIELD => self.update_draft(|d| {
                        let raw = format!("{}{}", d.phone, c);
                        d.with_formatted_phone(&raw)
                    }),
                    GENDER_FIELD => {
                        if c.to_ascii_lowercase() == 'm' {
                            self.update_draft(|d| d.with_gender(Gender::Male));
                        } else if c.to_ascii_lowercase() == 'f' {
                            self.update_draft(|d| d.with_gender(Gender::Female));
                        }
                    }
                    STATUS_FIELD => {
                        if c.to_ascii_lowercase() == 'a' {
                            self.update_draft(|d| d.with_active(true));
                        } else if c.to_ascii_lowercase() == 'i' {
                            self.update_draft(|d| d.with_active(false));
                        } else if c == ' ' {
                            self.update_draft(|d| {
                                let flipped = !d.is_active;
                                d.with_active(flipped)
                            });
                        }
                    }
                    AVATAR_FIELD => self.avatar_path.push(c),
                    _ => {}
                }
                if self.focus_index <= AVATAR_FIELD {
                    self.clear_error();
                }
            }
            KeyCode::Backspace => {
                match self.focus_index {
                    NAME_FIELD => self.update_draft(|d| {
                        let mut name = d.name.clone();
                        name.pop();
                        d.with_field(TextField::Name, name)
                    }),
                    SPECIALITY_FIELD => self.update_draft(|d| {
                        let mut speciality = d.speciality.clone();
                        speciality.pop();
                        d.with_field(TextField::Speciality, speciality)
                    }),
                    EMAIL_FIELD => self.update_draft(|d| {
                        let mut email = d.email.clone();
                        email.pop();
                        d.with_field(TextField::Email, email)
                    }),
                    PHONE_FIELD => self.update_draft(|d| {
                        let mut masked = d.phone.clone();
                        masked.pop();
                        d.with_formatted_phone(&masked)
                    }),
                    AVATAR_FIELD => {
                        self.avatar_path.pop();
                    }
                    _ => {}
                }
                if self.focus_index <= AVATAR_FIELD {
                    self.clear_error();
                }
            }
            KeyCode::Delete => {
                if self.focus_index == AVATAR_FIELD {
                    self.update_draft(DoctorDraft::with_avatar_removed);
                }
            }
            KeyCode::Tab => {
                if self.focus_index <= AVATAR_FIELD {
                    self.focus_index = SUBMIT_BUTTON;
                } else if self.focus_index == SUBMIT_BUTTON {
                    self.focus_index = BACK_BUTTON;
                } else {
                    self.focus_index = NAME_FIELD;
                }
            }
            KeyCode::Down => {
                self.focus_index = (self.focus_index + 1) % (BACK_BUTTON + 1);
            }
            KeyCode::Up => {
                self.focus_index = (self.focus_index + BACK_BUTTON) % (BACK_BUTTON + 1);
            }
            KeyCode::Enter => {
                match self.focus_index {
                    AVATAR_FIELD => self.confirm_avatar_selection(),
                    SUBMIT_BUTTON => self.submit(),
                    BACK_BUTTON => {
                        self.close_reset();
                        return Ok(Some(crate::app::SelectedApp::None));
                    }
                    _ => {}
                }
            }
            KeyCode::Esc => {
                self.close_reset();
                return Ok(Some(crate::app::SelectedApp::None));
            }
            _ => {}
        }

        Ok(None)
    }
}

impl Component for AddDoctor {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<crate::app::SelectedApp>> {
        self.process_input(event)
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
                Constraint::Length(3),  // Header
                Constraint::Min(21),    // Form body
                Constraint::Length(1),  // Error message
                Constraint::Length(1),  // Spacer
                Constraint::Length(6),  // Buttons and help
            ])
            .margin(1)
            .split(area);

        let header = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::Rgb(75, 75, 120)));
        frame.render_widget(header, main_layout[0]);

        let title = Paragraph::new("🦷 ADD DOCTOR")
            .style(
                Style::default()
                    .fg(Color::Rgb(230, 230, 250))
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center);
        frame.render_widget(title, main_layout[0]);

        let body_block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(75, 75, 120)))
            .style(Style::default().bg(Color::Rgb(22, 22, 35)));
        frame.render_widget(body_block.clone(), main_layout[1]);
        let body_inner = body_block.inner(main_layout[1]);

        let body_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Name
                Constraint::Length(3), // Speciality
                Constraint::Length(3), // Email
                Constraint::Length(3), // Phone
                Constraint::Length(3), // Gender + Status
                Constraint::Length(3), // Avatar
                Constraint::Length(1), // Avatar hint
            ])
            .margin(1)
            .split(body_inner);

        frame.render_widget(
            input_paragraph(&self.draft.name, " Name * ", self.focus_index == NAME_FIELD),
            body_layout[0],
        );
        frame.render_widget(
            input_paragraph(
                &self.draft.speciality,
                " Speciality * ",
                self.focus_index == SPECIALITY_FIELD,
            ),
            body_layout[1],
        );
        frame.render_widget(
            input_paragraph(&self.draft.email, " Email * ", self.focus_index == EMAIL_FIELD),
            body_layout[2],
        );
        frame.render_widget(
            input_paragraph(&self.draft.phone, " Phone ", self.focus_index == PHONE_FIELD),
            body_layout[3],
        );

        let toggles = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body_layout[4]);

        let gender_text = match self.draft.gender {
            Gender::Male => "Male",
            Gender::Female => "Female",
        };
        frame.render_widget(
            input_paragraph(gender_text, " Gender (M/F) ", self.focus_index == GENDER_FIELD),
            toggles[0],
        );

        let status_text = if self.draft.is_active { "Active" } else { "Inactive" };
        frame.render_widget(
            input_paragraph(
                status_text,
                " Status (A/I) ",
                self.focus_index == STATUS_FIELD,
            ),
            toggles[1],
        );

        let avatar_row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(8), Constraint::Min(10)])
            .split(body_layout[5]);

        // Preview box: the attached image, or initials derived from the name.
        let preview = if self.draft.image_url.is_empty() {
            self.draft.initials()
        } else {
            "🖼".to_string()
        };
        let preview_widget = Paragraph::new(preview)
            .style(
                Style::default()
                    .fg(Color::Rgb(129, 199, 245))
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Rgb(75, 75, 120)))
                    .style(Style::default().bg(Color::Rgb(26, 26, 36))),
            );
        frame.render_widget(preview_widget, avatar_row[0]);

        frame.render_widget(
            input_paragraph(
                &self.avatar_path,
                " Avatar file ",
                self.focus_index == AVATAR_FIELD,
            ),
            avatar_row[1],
        );

        let hint = match &self.draft.avatar_error {
            Some(error) => Paragraph::new(error.clone())
                .style(Style::default().fg(Color::Rgb(255, 100, 100)))
                .alignment(Alignment::Center),
            None => Paragraph::new("PNG or JPG, up to 2MB. Enter: attach | Del: remove")
                .style(Style::default().fg(Color::Rgb(140, 140, 170)))
                .alignment(Alignment::Center),
        };
        frame.render_widget(hint, body_layout[6]);

        if let Some(error) = &self.error_message {
            let status = Paragraph::new(format!("⚠️ {}", error))
                .style(
                    Style::default()
                        .fg(Color::Rgb(255, 100, 100))
                        .add_modifier(Modifier::BOLD),
                )
                .alignment(Alignment::Center);
            frame.render_widget(status, main_layout[2]);
        }

        let footer_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Submit
                Constraint::Length(2), // Back
                Constraint::Min(2),    // Help
            ])
            .split(main_layout[4]);

        let submit_enabled = self.draft.can_submit(self.mutation.is_pending());
        let submit_text = if self.mutation.is_pending() {
            "  Adding...  "
        } else if self.focus_index == SUBMIT_BUTTON {
            "► Add Doctor ◄"
        } else {
            "  Add Doctor  "
        };
        let submit_style = if !submit_enabled {
            Style::default().fg(Color::Rgb(100, 100, 120))
        } else if self.focus_index == SUBMIT_BUTTON {
            Style::default()
                .fg(Color::Rgb(140, 219, 140))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Rgb(180, 180, 200))
        };
        frame.render_widget(
            Paragraph::new(submit_text)
                .style(submit_style)
                .alignment(Alignment::Center),
            footer_layout[0],
        );

        let back_text = if self.focus_index == BACK_BUTTON {
            "► Cancel ◄"
        } else {
            "  Cancel  "
        };
        let back_style = if self.focus_index == BACK_BUTTON {
            Style::default()
                .fg(Color::Rgb(129, 199, 245))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Rgb(180, 180, 200))
        };
        frame.render_widget(
            Paragraph::new(back_text)
                .style(back_style)
                .alignment(Alignment::Center),
            footer_layout[1],
        );

        let help_text = "Tab: Switch Focus | Arrow Keys: Switch Fields | Enter: Confirm | Esc: Cancel\nGender: M/F | Status: A/I | Avatar: type a file path, Enter to attach";
        let help_paragraph = Paragraph::new(help_text)
            .style(Style::default().fg(Color::Rgb(140, 140, 170)))
            .alignment(Alignment::Center);
        frame.render_widget(help_paragraph, footer_layout[2]);
    }
}

fn input_paragraph<'a>(value: &'a str, title: &'a str, focused: bool) -> Paragraph<'a> {
    let color = if focused {
        Color::Rgb(250, 250, 110)
    } else {
        Color::Rgb(140, 140, 200)
    };
    Paragraph::new(value)
        .style(
            Style::default()
                .fg(Color::Rgb(220, 220, 240))
                .bg(Color::Rgb(26, 26, 36)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(Span::styled(title, Style::default().fg(color)))
                .border_style(Style::default().fg(color))
                .style(Style::default().bg(Color::Rgb(26, 26, 36))),
        )
}
