//! Domain types shared by the normalizer, the planner and the PPTX backend.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rows × cells exactly as the spreadsheet source returned them.
pub type RawTable = Vec<Vec<String>>;

/// A normalized product, the unit every downstream stage consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub code: String,
    pub name: String,
    pub description: String,
    /// Deduplicated bullet points, URLs excluded.
    pub specs_bullets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_proxied: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_proxied: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ProductRecord {
    /// Whether at least one identifying field is present.
    pub fn is_identifiable(&self) -> bool {
        !self.name.trim().is_empty()
            || !self.code.trim().is_empty()
            || self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
            || self.image_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }

    /// Name to show on slides and listings, falling back to the code.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.code.trim()
        } else {
            self.name.trim()
        }
    }
}

/// Salesperson contact details shown on the title slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub title: String,
    pub company: String,
}

/// Per-proposal metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectMeta {
    pub project_name: String,
    pub client_name: String,
    pub presentation_date: String,
}

/// Settings carried across one working session and persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub contact: ContactInfo,
    pub project: ProjectMeta,
}

impl Session {
    /// Load a session file. A missing file yields an empty session.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No session file at {}, starting fresh", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the session as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Build the export form from the current session.
    pub fn export_form(&self) -> ExportForm {
        ExportForm {
            project_name: self.project.project_name.clone(),
            client_name: self.project.client_name.clone(),
            contact_name: self.contact.name.clone(),
            contact_title: self.contact.title.clone(),
            company: self.contact.company.clone(),
            email: self.contact.email.clone(),
            phone: self.contact.phone.clone(),
            date: self.project.presentation_date.clone(),
        }
    }
}

/// The form values handed to the deck assembler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportForm {
    pub project_name: String,
    pub client_name: String,
    pub contact_name: String,
    pub contact_title: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiable_with_only_image() {
        let record = ProductRecord {
            image_url: Some("https://cdn.example/a.png".to_string()),
            ..Default::default()
        };
        assert!(record.is_identifiable());
    }

    #[test]
    fn test_blank_record_not_identifiable() {
        let record = ProductRecord {
            name: "   ".to_string(),
            description: "Only a description".to_string(),
            ..Default::default()
        };
        assert!(!record.is_identifiable());
    }

    #[test]
    fn test_display_name_falls_back_to_code() {
        let record = ProductRecord {
            code: "SKU-1".to_string(),
            ..Default::default()
        };
        assert_eq!(record.display_name(), "SKU-1");
    }

    #[test]
    fn test_session_export_form() {
        let session = Session {
            contact: ContactInfo {
                name: "Sam Rivera".to_string(),
                email: "sam@example.com".to_string(),
                ..Default::default()
            },
            project: ProjectMeta {
                project_name: "Lobby Refresh".to_string(),
                client_name: "Acme".to_string(),
                presentation_date: "2026-10-18".to_string(),
            },
        };
        let form = session.export_form();
        assert_eq!(form.project_name, "Lobby Refresh");
        assert_eq!(form.contact_name, "Sam Rivera");
        assert_eq!(form.date, "2026-10-18");
    }

    #[test]
    fn test_session_deserializes_partial_json() {
        let session: Session =
            serde_json::from_str(r#"{"contact":{"name":"Ana"}}"#).unwrap();
        assert_eq!(session.contact.name, "Ana");
        assert!(session.project.project_name.is_empty());
    }

    #[test]
    fn test_session_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        assert_eq!(Session::load(&path).unwrap(), Session::default());
    }

    #[test]
    fn test_session_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("session.json");

        let mut session = Session::default();
        session.contact.name = "Ana".to_string();
        session.save(&path).unwrap();

        assert_eq!(Session::load(&path).unwrap(), session);
    }
}
