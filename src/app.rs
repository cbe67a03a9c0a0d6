//! The main application state and logic for Dentoria.
//!
//! The composition root: wires the authenticated-session context (login),
//! the shared doctor-list cache, and global toast notifications around
//! every screen exactly once, and routes input to the active component.
//! No business logic lives here.

use crate::auth::{login, Credentials};
use crate::cache::DoctorCache;
use crate::components::admin::{AdminApp, AdminState};
use crate::components::{home::Home, login::Login, Component};
use crate::tui::{self, Tui};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph};
use std::time::{Duration, Instant};

/// Enum representing the different screens within Dentoria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectedApp {
    /// The "Add Doctor" dialog.
    DoctorAdd,
    /// The doctor directory.
    DoctorDirectory,
    /// No specific selection (back / logout / close).
    None,
    /// The "Quit" action.
    Quit,
}

/// Enum representing the possible states of the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Init,
    Login,
    Home,
    Running(SelectedApp),
}

/// Kind of a transient toast notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// A transient status line shown at the bottom of every screen.
struct Toast {
    message: String,
    kind: ToastKind,
    shown_at: Instant,
}

/// Main application struct for Dentoria.
pub struct App {
    pub state: AppState,
    pub should_quit: bool,
    pub home: Home,
    pub login: Login,
    /// The administration component (exists only while active).
    pub admin: Option<AdminApp>,
    /// Shared doctor-list cache; outlives individual admin screens.
    cache: DoctorCache,
    toast: Option<Toast>,
}

impl App {
    pub fn new() -> Self {
        Self {
            state: AppState::Init,
            should_quit: false,
            home: Home::new(),
            login: Login::new(),
            admin: None,
            cache: DoctorCache::new(),
            toast: None,
        }
    }

    /// Runs the application's main loop: render, then handle one event.
    pub fn run(&mut self, tui: &mut Tui) -> Result<()> {
        self.state = AppState::Login;

        while !self.should_quit {
            tui.draw(|frame| self.render_ui(frame))?;
            self.handle_input(tui)?;
        }
        Ok(())
    }

    fn set_toast(&mut self, message: String, kind: ToastKind) {
        self.toast = Some(Toast {
            message,
            kind,
            shown_at: Instant::now(),
        });
    }

    fn check_toast_timeout(&mut self) {
        if let Some(toast) = &self.toast {
            if toast.shown_at.elapsed() > Duration::from_secs(4) {
                self.toast = None;
            }
        }
    }

    fn handle_input(&mut self, tui: &mut Tui) -> Result<()> {
        match tui.next_event()? {
            tui::Event::Input(event) => {
                // Global keybinding: Ctrl+Q to quit
                if let crossterm::event::Event::Key(KeyEvent {
                    code: KeyCode::Char('q'),
                    modifiers: crossterm::event::KeyModifiers::CONTROL,
                    ..
                }) = event
                {
                    self.should_quit = true;
                    return Ok(());
                }

                match self.state {
                    AppState::Init => {
                        self.state = AppState::Login;
                    }
                    AppState::Login => {
                        if let crossterm::event::Event::Key(key) = event {
                            if let Some(selected_app) = self.login.handle_input(key)? {
                                match selected_app {
                                    SelectedApp::Quit => {
                                        self.should_quit = true;
                                        return Ok(());
                                    }
                                    SelectedApp::None => {
                                        // Attempt to sign in.
                                        let credentials = Credentials {
                                            username: self.login.username.clone(),
                                            password: self.login.password.clone(),
                                        };

                                        match login(credentials) {
                                            Ok(user_id) => {
                                                if let Err(err) = self.home.load_username(user_id)
                                                {
                                                    self.set_toast(
                                                        format!("⚠ {}", err),
                                                        ToastKind::Error,
                                                    );
                                                }
                                                self.login.reset_fields();
                                                self.state = AppState::Home;
                                            }
                                            Err(err) => {
                                                self.login.set_error_message(format!("{}", err));
                                            }
                                        }
                                    }
                                    _ => {}
                                }
                            }
                        }
                    }
                    AppState::Home => {
                        if let crossterm::event::Event::Key(key) = event {
                            if let Some(selected_app) = self.home.handle_input(key)? {
                                match selected_app {
                                    SelectedApp::DoctorAdd => {
                                        let mut admin = AdminApp::new(self.cache.clone());
                                        admin.set_state(AdminState::AddDoctor);
                                        self.admin = Some(admin);
                                        self.state = AppState::Running(selected_app);
                                    }
                                    SelectedApp::DoctorDirectory => {
                                        let mut admin = AdminApp::new(self.cache.clone());
                                        admin.set_state(AdminState::DoctorDirectory);
                                        self.admin = Some(admin);
                                        self.state = AppState::Running(selected_app);
                                    }
                                    SelectedApp::Quit => {
                                        self.should_quit = true;
                                        return Ok(());
                                    }
                                    SelectedApp::None => {
                                        // Logout: back to the login screen.
                                        self.login.reset_fields();
                                        self.login
                                            .set_success_message("Signed out.".to_string());
                                        self.state = AppState::Login;
                                    }
                                }
                            }
                        }
                    }
                    AppState::Running(_) => {
                        if let Some(admin) = &mut self.admin {
                            if let crossterm::event::Event::Key(key) = event {
                                if let Some(SelectedApp::None) = admin.handle_input(key)? {
                                    // Back to Home; drop the admin component.
                                    self.state = AppState::Home;
                                    self.admin = None;
                                }
                            }
                        } else {
                            self.state = AppState::Home;
                        }
                    }
                }
            }
            tui::Event::Tick => {
                self.check_toast_timeout();
                if let AppState::Login = self.state {
                    self.login.check_error_timeout();
                }
                if let AppState::Running(_) = self.state {
                    if let Some(admin) = &mut self.admin {
                        if let Some(created) = admin.on_tick() {
                            self.set_toast(
                                format!("✓ {} added to the practice", created.name),
                                ToastKind::Success,
                            );
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn render_ui(&self, frame: &mut crate::tui::Frame<'_>) {
        match self.state {
            AppState::Init => {}
            AppState::Login => self.login.render(frame),
            AppState::Home => self.home.render(frame),
            AppState::Running(_) => {
                if let Some(admin) = &self.admin {
                    admin.render(frame);
                }
            }
        }

        // The toast overlays the bottom row of whatever screen is active.
        if let Some(toast) = &self.toast {
            let area = frame.area();
            if area.height > 0 {
                let line = Rect::new(area.x, area.y + area.height - 1, area.width, 1);
                let color = match toast.kind {
                    ToastKind::Success => Color::Rgb(140, 219, 140),
                    ToastKind::Error => Color::Rgb(255, 100, 100),
                };
                let widget = Paragraph::new(toast.message.clone())
                    .style(
                        Style::default()
                            .fg(color)
                            .add_modifier(Modifier::BOLD)
                            .bg(Color::Rgb(16, 16, 28)),
                    )
                    .alignment(Alignment::Center)
                    .block(Block::default());
                frame.render_widget(widget, line);
            }
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
