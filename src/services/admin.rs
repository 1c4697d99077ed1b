// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Admin editing of the allow-list and the maintenance duration.

use crate::models::admin::{AdminCredentials, AdminSession};
use crate::models::domain::AllowedDomainSet;
use crate::models::duration::DurationConfig;
use crate::services::local_storage::{LocalStorage, ALLOWED_DOMAINS_KEY, DURATION_KEY};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Admin login is disabled: no password configured")]
    LoginDisabled,

    #[error("Incorrect password")]
    WrongPassword,

    #[error("Admin login required")]
    NotAuthorized,

    #[error("Domain \"{0}\" is already in the list")]
    DuplicateDomain(String),

    #[error("Domain cannot be empty")]
    EmptyDomain,

    #[error("Domain \"{0}\" is not in the list")]
    UnknownDomain(String),

    #[error("Maintenance duration cannot exceed 366 days")]
    DurationTooLong,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Load the allow-list, seeding and persisting the defaults on first use.
pub fn load_allowed_domains(storage: &mut LocalStorage) -> anyhow::Result<AllowedDomainSet> {
    match storage.get::<AllowedDomainSet>(ALLOWED_DOMAINS_KEY)? {
        Some(domains) => Ok(domains),
        None => {
            let domains = AllowedDomainSet::default();
            storage.set(ALLOWED_DOMAINS_KEY, &domains)?;
            Ok(domains)
        }
    }
}

/// Load the maintenance duration, seeding the 2-day default on first use.
pub fn load_duration(storage: &mut LocalStorage) -> anyhow::Result<DurationConfig> {
    match storage.get::<DurationConfig>(DURATION_KEY)? {
        Some(duration) => Ok(duration),
        None => {
            let duration = DurationConfig::default();
            storage.set(DURATION_KEY, &duration)?;
            Ok(duration)
        }
    }
}

/// Page-lifetime admin state: an in-memory session over persisted settings.
pub struct AdminConsole {
    storage: LocalStorage,
    credentials: Option<AdminCredentials>,
    session: AdminSession,
    domains: AllowedDomainSet,
    duration: DurationConfig,
}

impl AdminConsole {
    pub fn load(
        mut storage: LocalStorage,
        credentials: Option<AdminCredentials>,
    ) -> anyhow::Result<Self> {
        let domains = load_allowed_domains(&mut storage)?;
        let duration = load_duration(&mut storage)?;
        Ok(Self {
            storage,
            credentials,
            session: AdminSession::new(),
            domains,
            duration,
        })
    }

    /// Simulate a page reload: settings are re-read, the session is dropped.
    pub fn reload(self) -> anyhow::Result<Self> {
        let path = self.storage.path().map(|p| p.to_path_buf());
        let storage = match path {
            Some(path) => LocalStorage::open(path)?,
            None => self.storage,
        };
        Self::load(storage, self.credentials)
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_active()
    }

    pub fn domains(&self) -> &AllowedDomainSet {
        &self.domains
    }

    pub fn duration(&self) -> DurationConfig {
        self.duration
    }

    pub fn login(&mut self, password: &str) -> Result<(), AdminError> {
        let credentials = self.credentials.as_ref().ok_or(AdminError::LoginDisabled)?;
        if self.session.login(credentials, password) {
            info!("Admin session started");
            Ok(())
        } else {
            warn!("Admin login failed");
            Err(AdminError::WrongPassword)
        }
    }

    pub fn logout(&mut self) {
        self.session.logout();
    }

    fn require_admin(&self) -> Result<(), AdminError> {
        if self.session.is_active() {
            Ok(())
        } else {
            Err(AdminError::NotAuthorized)
        }
    }

    pub fn add_domain(&mut self, domain: &str) -> Result<(), AdminError> {
        self.require_admin()?;
        if domain.trim().is_empty() {
            return Err(AdminError::EmptyDomain);
        }
        if !self.domains.insert(domain) {
            return Err(AdminError::DuplicateDomain(domain.trim().to_lowercase()));
        }
        self.storage.set(ALLOWED_DOMAINS_KEY, &self.domains)?;
        Ok(())
    }

    pub fn remove_domain(&mut self, domain: &str) -> Result<(), AdminError> {
        self.require_admin()?;
        if !self.domains.remove(domain) {
            return Err(AdminError::UnknownDomain(domain.trim().to_lowercase()));
        }
        self.storage.set(ALLOWED_DOMAINS_KEY, &self.domains)?;
        Ok(())
    }

    pub fn set_duration(&mut self, duration: DurationConfig) -> Result<(), AdminError> {
        self.require_admin()?;
        if !duration.is_within_limit() {
            return Err(AdminError::DurationTooLong);
        }
        self.duration = duration;
        self.storage.set(DURATION_KEY, &self.duration)?;
        Ok(())
    }
}
