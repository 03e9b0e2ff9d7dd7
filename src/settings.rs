// src/settings.rs

use crate::api::ReplyOutcome;
use crate::constants::{MAX_ITERATIONS_MAX, MAX_ITERATIONS_MIN, TEMPERATURE_MAX_TENTHS};
use crate::errors::{ChatError, ChatResult};
use crate::models::Settings;
use crate::panel::{status_from_outcome, FailureText, PanelStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Model,
    Temperature,
    MaxIterations,
    Reflect,
    Framework,
    Save,
}

const FIELD_ORDER: [SettingsField; 6] = [
    SettingsField::Model,
    SettingsField::Temperature,
    SettingsField::MaxIterations,
    SettingsField::Reflect,
    SettingsField::Framework,
    SettingsField::Save,
];

/// Code generation settings form.
#[derive(Debug, Clone)]
pub struct SettingsForm {
    pub models: Vec<String>,
    pub model_idx: usize,
    // kept in tenths so stepping never drifts
    temperature_tenths: u8,
    max_iterations: u32,
    pub reflect: bool,
    pub framework: String,
    pub focus: SettingsField,
    pub status: Option<PanelStatus>,
    saving: bool,
}

impl SettingsForm {
    pub fn new(models: Vec<String>) -> Self {
        let models: Vec<String> = models
            .into_iter()
            .filter(|m| !m.trim().is_empty())
            .collect();
        Self {
            models,
            model_idx: 0,
            temperature_tenths: 0,
            max_iterations: 3,
            reflect: true,
            framework: String::new(),
            focus: SettingsField::Model,
            status: None,
            saving: false,
        }
    }

    /// Preselects `name` when it is one of the configured models.
    pub fn with_default_model(mut self, name: &str) -> Self {
        match self.models.iter().position(|m| m == name) {
            Some(idx) => self.model_idx = idx,
            None => log::warn!("Default model '{}' is not in the model list", name),
        }
        self
    }

    pub fn model(&self) -> Option<&str> {
        self.models.get(self.model_idx).map(String::as_str)
    }

    pub fn temperature(&self) -> f32 {
        f32::from(self.temperature_tenths) / 10.0
    }

    /// Slider readout, e.g. `0.7`.
    pub fn temperature_label(&self) -> String {
        format!("{:.1}", self.temperature())
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn focus_next(&mut self) {
        let idx = FIELD_ORDER.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = FIELD_ORDER[(idx + 1) % FIELD_ORDER.len()];
    }

    pub fn focus_previous(&mut self) {
        let idx = FIELD_ORDER.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = FIELD_ORDER[(idx + FIELD_ORDER.len() - 1) % FIELD_ORDER.len()];
    }

    /// Moves the focused control one step left (`-1`) or right (`+1`).
    pub fn adjust(&mut self, step: i32) {
        match self.focus {
            SettingsField::Model if !self.models.is_empty() => {
                let len = self.models.len() as i32;
                self.model_idx = (self.model_idx as i32 + step).rem_euclid(len) as usize;
            }
            SettingsField::Temperature => {
                let value = i32::from(self.temperature_tenths) + step;
                self.temperature_tenths = value.clamp(0, i32::from(TEMPERATURE_MAX_TENTHS)) as u8;
            }
            SettingsField::MaxIterations => {
                let value = self.max_iterations as i32 + step;
                self.max_iterations =
                    value.clamp(MAX_ITERATIONS_MIN as i32, MAX_ITERATIONS_MAX as i32) as u32;
            }
            SettingsField::Reflect => self.reflect = !self.reflect,
            _ => {}
        }
    }

    pub fn push_char(&mut self, c: char) {
        if self.focus == SettingsField::Framework {
            self.framework.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if self.focus == SettingsField::Framework {
            self.framework.pop();
        }
    }

    /// The payload for `POST /api/settings`. A blank framework is sent as null.
    pub fn to_settings(&self) -> ChatResult<Settings> {
        let model = self
            .model()
            .ok_or_else(|| ChatError::invalid_input("No model selected"))?;
        let framework = self.framework.trim();

        let settings = Settings {
            model: model.to_string(),
            temperature: self.temperature(),
            max_iterations: self.max_iterations,
            reflect: self.reflect,
            framework: (!framework.is_empty()).then(|| framework.to_string()),
        };
        validate_settings(&settings)?;
        Ok(settings)
    }

    /// Starts a save. Returns `None` while a save is already in flight or
    /// the form is invalid (the status line then says why).
    pub fn begin_save(&mut self) -> Option<Settings> {
        if self.saving {
            return None;
        }
        match self.to_settings() {
            Ok(settings) => {
                self.saving = true;
                self.status = Some(PanelStatus::info("Saving settings..."));
                Some(settings)
            }
            Err(e) => {
                self.status = Some(PanelStatus::error(e.to_string()));
                None
            }
        }
    }

    pub fn finish_save(&mut self, result: &ChatResult<ReplyOutcome>) {
        self.saving = false;
        self.status = Some(status_from_outcome(
            result,
            "Settings saved successfully!",
            "Failed to save settings.",
            FailureText::DetailOnly,
        ));
    }
}

/// Mirrors the backend's bounds so obviously bad values never leave the client.
pub fn validate_settings(settings: &Settings) -> ChatResult<()> {
    if settings.model.trim().is_empty() {
        return Err(ChatError::invalid_input("Model name is required"));
    }
    if !(0.0..=1.0).contains(&settings.temperature) {
        return Err(ChatError::invalid_input(
            "Temperature must be between 0.0 and 1.0",
        ));
    }
    if !(MAX_ITERATIONS_MIN..=MAX_ITERATIONS_MAX).contains(&settings.max_iterations) {
        return Err(ChatError::invalid_input(format!(
            "Max iterations must be between {} and {}",
            MAX_ITERATIONS_MIN, MAX_ITERATIONS_MAX
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServerReply;
    use crate::panel::StatusKind;

    fn form() -> SettingsForm {
        SettingsForm::new(vec![
            "gemini-2.0-flash".to_string(),
            "gemini-2.0-flash-lite".to_string(),
        ])
    }

    #[test]
    fn test_defaults() {
        let form = form();
        let settings = form.to_settings().unwrap();
        assert_eq!(settings.model, "gemini-2.0-flash");
        assert_eq!(settings.temperature, 0.0);
        assert_eq!(settings.max_iterations, 3);
        assert!(settings.reflect);
        assert_eq!(settings.framework, None);
    }

    #[test]
    fn test_sliders_clamp() {
        let mut form = form();

        form.focus = SettingsField::Temperature;
        form.adjust(-1);
        assert_eq!(form.temperature_label(), "0.0");
        for _ in 0..7 {
            form.adjust(1);
        }
        assert_eq!(form.temperature_label(), "0.7");
        for _ in 0..10 {
            form.adjust(1);
        }
        assert_eq!(form.temperature(), 1.0);

        form.focus = SettingsField::MaxIterations;
        for _ in 0..20 {
            form.adjust(1);
        }
        assert_eq!(form.max_iterations(), 10);
        for _ in 0..20 {
            form.adjust(-1);
        }
        assert_eq!(form.max_iterations(), 1);
    }

    #[test]
    fn test_model_cycles_and_reflect_toggles() {
        let mut form = form();
        form.adjust(1);
        assert_eq!(form.model(), Some("gemini-2.0-flash-lite"));
        form.adjust(1);
        assert_eq!(form.model(), Some("gemini-2.0-flash"));
        form.adjust(-1);
        assert_eq!(form.model(), Some("gemini-2.0-flash-lite"));

        form.focus = SettingsField::Reflect;
        form.adjust(1);
        assert!(!form.reflect);
    }

    #[test]
    fn test_framework_is_trimmed() {
        let mut form = form();
        form.focus = SettingsField::Framework;
        for c in "  langchain ".chars() {
            form.push_char(c);
        }
        assert_eq!(form.to_settings().unwrap().framework.as_deref(), Some("langchain"));

        form.framework = "   ".to_string();
        assert_eq!(form.to_settings().unwrap().framework, None);
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = form();
        form.focus_previous();
        assert_eq!(form.focus, SettingsField::Save);
        form.focus_next();
        assert_eq!(form.focus, SettingsField::Model);
    }

    #[test]
    fn test_save_lifecycle() {
        let mut form = form();
        assert!(form.begin_save().is_some());
        assert_eq!(form.status, Some(PanelStatus::info("Saving settings...")));
        assert!(form.begin_save().is_none());

        form.finish_save(&Ok(ReplyOutcome {
            success: true,
            reply: ServerReply::default(),
        }));
        assert!(!form.is_saving());
        assert_eq!(
            form.status,
            Some(PanelStatus::success("Settings saved successfully!"))
        );
    }

    #[test]
    fn test_default_model_is_preselected() {
        let lite = form().with_default_model("gemini-2.0-flash-lite");
        assert_eq!(lite.model(), Some("gemini-2.0-flash-lite"));
        assert_eq!(lite.to_settings().unwrap().model, "gemini-2.0-flash-lite");

        let unknown = form().with_default_model("gpt-unknown");
        assert_eq!(unknown.model(), Some("gemini-2.0-flash"));
    }

    #[test]
    fn test_save_without_models_is_rejected() {
        let mut form = SettingsForm::new(vec![]);
        assert!(form.begin_save().is_none());
        assert_eq!(form.status.as_ref().map(|s| s.kind), Some(StatusKind::Error));
        assert!(!form.is_saving());
    }

    #[test]
    fn test_validate_settings_bounds() {
        let mut settings = form().to_settings().unwrap();
        settings.temperature = 1.5;
        assert!(validate_settings(&settings).is_err());
        settings.temperature = 0.5;
        settings.max_iterations = 0;
        assert!(validate_settings(&settings).is_err());
    }
}
