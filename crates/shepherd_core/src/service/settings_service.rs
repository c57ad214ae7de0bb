//! Business settings use-cases.

use crate::model::settings::{CategoryThresholds, Settings};
use crate::model::validation::ValidationError;
use crate::repo::settings_repo::SettingsRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum SettingsServiceError {
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for SettingsServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SettingsServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SettingsServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for SettingsServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

pub struct SettingsService<S: SettingsRepository> {
    store: S,
}

impl<S: SettingsRepository> SettingsService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored settings, or the defaults when none were saved yet.
    pub fn settings(&self) -> Result<Settings, SettingsServiceError> {
        Ok(self.store.get_settings()?)
    }

    pub fn update_thresholds(
        &self,
        thresholds: CategoryThresholds,
    ) -> Result<Settings, SettingsServiceError> {
        thresholds.validate()?;
        let mut settings = self.store.get_settings()?;
        settings.thresholds = thresholds;
        self.store.set_settings(&settings)?;
        info!(
            "event=settings_update module=service status=ok field=thresholds attention={} low={} critical={}",
            thresholds.attention, thresholds.low, thresholds.critical
        );
        Ok(settings)
    }

    /// Replaces the access password. Surrounding whitespace is dropped.
    pub fn update_access_password(
        &self,
        password: impl Into<String>,
    ) -> Result<(), SettingsServiceError> {
        let password = password.into().trim().to_string();
        if password.is_empty() {
            return Err(ValidationError::BlankPassword.into());
        }
        let mut settings = self.store.get_settings()?;
        settings.access_password = password;
        self.store.set_settings(&settings)?;
        info!("event=settings_update module=service status=ok field=access_password");
        Ok(())
    }
}
