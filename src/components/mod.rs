use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::KeyEvent;

pub mod admin;
pub mod home;
pub mod login;

pub trait Component {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<crate::app::SelectedApp>>;
    fn render(&self, frame: &mut Frame);
}
