//! Practice administration module.
//!
//! Hosts the doctor-creation dialog and the doctor directory, and routes
//! between them: a successful create (or a cancel) lands back on the
//! directory, which reads through the shared cache.

use self::add_doctor::AddDoctor;
use self::list::DoctorDirectory;
use crate::cache::DoctorCache;
use crate::components::Component;
use crate::models::Doctor;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::KeyEvent;

pub mod add_doctor;
pub mod draft;
pub mod list;

/// Which administration screen is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminState {
    AddDoctor,
    DoctorDirectory,
}

/// The administration sub-application.
pub struct AdminApp {
    pub state: AdminState,
    add_doctor: AddDoctor,
    directory: DoctorDirectory,
}

impl AdminApp {
    pub fn new(cache: DoctorCache) -> Self {
        let mut directory = DoctorDirectory::new(cache.clone());
        directory.refresh();

        Self {
            state: AdminState::DoctorDirectory,
            add_doctor: AddDoctor::new(cache),
            directory,
        }
    }

    pub fn set_state(&mut self, state: AdminState) {
        self.state = state;
        if state == AdminState::DoctorDirectory {
            self.directory.refresh();
        }
    }

    /// Per-tick upkeep: polls the dialog's in-flight work and keeps the
    /// directory fresh. Returns the created doctor when a submission
    /// completed, so the shell can raise a toast.
    pub fn on_tick(&mut self) -> Option<Doctor> {
        match self.state {
            AdminState::AddDoctor => {
                if let Some(created) = self.add_doctor.on_tick() {
                    // Dialog closed itself on success; land on the directory.
                    self.set_state(AdminState::DoctorDirectory);
                    return Some(created);
                }
            }
            AdminState::DoctorDirectory => {
                self.directory.refresh_if_stale();
            }
        }
        None
    }
}

impl Component for AdminApp {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<crate::app::SelectedApp>> {
        match self.state {
            AdminState::AddDoctor => {
                if let Some(crate::app::SelectedApp::None) = self.add_doctor.handle_input(event)? {
                    // Cancel/close: back to the directory, never to login.
                    self.set_state(AdminState::DoctorDirectory);
                }
            }
            AdminState::DoctorDirectory => {
                if let Some(action) = self.directory.handle_input(event)? {
                    return Ok(Some(action));
                }
            }
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame) {
        match self.state {
            AdminState::AddDoctor => self.add_doctor.render(frame),
            AdminState::DoctorDirectory => self.directory.render(frame),
        }
    }
}
