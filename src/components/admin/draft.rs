//! Draft state for the doctor-creation dialog.
//!
//! The draft is an immutable record with pure transition functions, so the
//! dialog's state machine is testable without a terminal harness. The dialog
//! owns one `DoctorDraft`, replaces it on every edit, snapshots it at submit
//! time, and resets it on cancel or successful close.

use crate::models::{Doctor, Gender};
use crate::utils::{avatar_initials, format_phone_number, guess_image_mime};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Largest avatar file accepted, in bytes.
pub const MAX_AVATAR_BYTES: u64 = 2 * 1024 * 1024;

/// Free-text fields the dialog edits directly (phone goes through the mask).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Name,
    Email,
    Speciality,
}

/// The locally held, not-yet-persisted doctor being created.
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub speciality: String,
    pub gender: Gender,
    pub is_active: bool,
    pub image_url: String,
    /// Field-scoped avatar error; never blocks submission of other fields.
    pub avatar_error: Option<String>,
}

impl Default for DoctorDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            speciality: String::new(),
            gender: Gender::Male,
            is_active: true,
            image_url: String::new(),
            avatar_error: None,
        }
    }
}

impl DoctorDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces exactly one free-text field.
    pub fn with_field(mut self, field: TextField, value: String) -> Self {
        match field {
            TextField::Name => self.name = value,
            TextField::Email => self.email = value,
            TextField::Speciality => self.speciality = value,
        }
        self
    }

    /// Stores raw phone input reformatted through the display mask.
    pub fn with_formatted_phone(mut self, raw: &str) -> Self {
        self.phone = format_phone_number(raw);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Stores a validated avatar as a data URI and clears the field error.
    pub fn with_avatar_data(mut self, mime: &str, bytes: &[u8]) -> Self {
        self.image_url = format!("data:{mime};base64,{}", STANDARD.encode(bytes));
        self.avatar_error = None;
        self
    }

    /// Records a rejected avatar selection; the image stays unchanged.
    pub fn with_avatar_error(mut self, message: String) -> Self {
        self.avatar_error = Some(message);
        self
    }

    /// Selecting "no file" clears both the image and the error.
    pub fn without_avatar_selection(mut self) -> Self {
        self.image_url.clear();
        self.avatar_error = None;
        self
    }

    /// "Remove avatar" clears the image only.
    pub fn with_avatar_removed(mut self) -> Self {
        self.image_url.clear();
        self
    }

    /// Returns the draft to its defaults (dialog open, cancel, or close).
    pub fn reset(self) -> Self {
        Self::default()
    }

    /// Whether the submit control is enabled.
    ///
    /// Requires the three mandatory fields and no request in flight. The
    /// avatar error does not gate submission; a rejected file simply left
    /// the image empty.
    pub fn can_submit(&self, mutation_pending: bool) -> bool {
        !self.name.is_empty()
            && !self.email.is_empty()
            && !self.speciality.is_empty()
            && !mutation_pending
    }

    /// Initials shown while no avatar image is set.
    pub fn initials(&self) -> String {
        avatar_initials(&self.name)
    }

    /// Immutable snapshot handed to the create mutation.
    pub fn to_doctor(&self) -> Doctor {
        Doctor {
            id: 0,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            speciality: self.speciality.clone(),
            gender: self.gender,
            is_active: self.is_active,
            image_url: self.image_url.clone(),
            created_at: String::new(),
        }
    }
}

/// Validates a selected avatar file before it is read.
///
/// Returns the MIME type to encode with, or the field-scoped message the
/// dialog shows next to the avatar input.
pub fn validate_avatar_file(path: &str, size: u64) -> Result<&'static str, String> {
    let Some(mime) = guess_image_mime(path) else {
        return Err(String::from("Please upload an image file."));
    };
    if size > MAX_AVATAR_BYTES {
        return Err(String::from("Image must be 2MB or smaller."));
    }
    Ok(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_draft() -> DoctorDraft {
        DoctorDraft::new()
            .with_field(TextField::Name, "Dr. Jane Roe".into())
            .with_field(TextField::Email, "jane@example.com".into())
            .with_field(TextField::Speciality, "Orthodontics".into())
    }

    #[test]
    fn submit_requires_all_mandatory_fields() {
        let draft = DoctorDraft::new()
            .with_field(TextField::Email, "a@b.com".into())
            .with_field(TextField::Speciality, "General".into());
        assert!(!draft.can_submit(false));

        let draft = draft.with_field(TextField::Name, "Dr. Roe".into());
        assert!(draft.can_submit(false));

        assert!(!filled_draft()
            .with_field(TextField::Email, String::new())
            .can_submit(false));
        assert!(!filled_draft()
            .with_field(TextField::Speciality, String::new())
            .can_submit(false));
    }

    #[test]
    fn submit_disabled_while_mutation_pending() {
        assert!(!filled_draft().can_submit(true));
    }

    #[test]
    fn phone_edits_go_through_the_mask() {
        let draft = DoctorDraft::new().with_formatted_phone("5551234567");
        assert_eq!(draft.phone, "(555) 123-4567");
    }

    #[test]
    fn snapshot_carries_defaults() {
        let doctor = filled_draft().to_doctor();
        assert_eq!(doctor.id, 0);
        assert_eq!(doctor.gender, Gender::Male);
        assert!(doctor.is_active);
        assert_eq!(doctor.image_url, "");
    }

    #[test]
    fn snapshot_serializes_like_the_create_payload() {
        let value = serde_json::to_value(filled_draft().to_doctor()).unwrap();
        assert_eq!(value["name"], "Dr. Jane Roe");
        assert_eq!(value["gender"], "MALE");
        assert_eq!(value["isActive"], true);
        assert_eq!(value["imageUrl"], "");
    }

    #[test]
    fn non_image_files_are_rejected() {
        let err = validate_avatar_file("resume.pdf", 1024).unwrap_err();
        assert_eq!(err, "Please upload an image file.");

        let draft = filled_draft().with_avatar_error(err);
        assert_eq!(draft.image_url, "");
        assert!(draft.avatar_error.is_some());
    }

    #[test]
    fn oversized_images_are_rejected() {
        assert!(validate_avatar_file("photo.png", MAX_AVATAR_BYTES).is_ok());
        let err = validate_avatar_file("photo.png", MAX_AVATAR_BYTES + 1).unwrap_err();
        assert_eq!(err, "Image must be 2MB or smaller.");
    }

    #[test]
    fn accepted_image_becomes_data_uri_and_clears_error() {
        let draft = filled_draft()
            .with_avatar_error("Please upload an image file.".into())
            .with_avatar_data("image/png", b"\x89PNG");
        assert!(draft.image_url.starts_with("data:image/png;base64,"));
        assert!(draft.avatar_error.is_none());
    }

    #[test]
    fn empty_selection_clears_image_and_error() {
        let draft = filled_draft()
            .with_avatar_data("image/png", b"\x89PNG")
            .with_avatar_error("stale".into())
            .without_avatar_selection();
        assert_eq!(draft.image_url, "");
        assert!(draft.avatar_error.is_none());
    }

    #[test]
    fn remove_avatar_keeps_field_error() {
        let draft = filled_draft()
            .with_avatar_data("image/png", b"\x89PNG")
            .with_avatar_error("late error".into())
            .with_avatar_removed();
        assert_eq!(draft.image_url, "");
        assert_eq!(draft.avatar_error.as_deref(), Some("late error"));
    }

    #[test]
    fn cancelling_twice_matches_cancelling_once() {
        let edited = filled_draft()
            .with_formatted_phone("5551234567")
            .with_gender(Gender::Female)
            .with_active(false);
        let once = edited.reset();
        let twice = once.clone().reset();
        assert_eq!(once, DoctorDraft::default());
        assert_eq!(once, twice);
    }

    #[test]
    fn initials_fall_back_to_dr() {
        assert_eq!(DoctorDraft::new().initials(), "DR");
        assert_eq!(filled_draft().initials(), "DJ");
    }
}
