use std::path::PathBuf;

use tokio::sync::Mutex;

use crate::features::notifications::models::{
    EmailField, MailingList, MailingListFile, StoredMailingList,
};

use super::mailer::MailError;

/// Named recipient lists kept in a JSON file
pub struct MailingListStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl MailingListStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    async fn read_file(&self) -> Result<MailingListFile, MailError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No mailing list file at {}", self.path.display());
                Ok(MailingListFile::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn all(&self) -> Result<Vec<MailingList>, MailError> {
        let file = self.read_file().await?;
        Ok(file.lists.iter().map(MailingList::from).collect())
    }

    /// Addresses of the named list, `None` when there is no such list
    pub async fn recipients(&self, name: &str) -> Result<Option<Vec<String>>, MailError> {
        let file = self.read_file().await?;
        Ok(file
            .lists
            .iter()
            .find(|list| list.name == name)
            .map(|list| list.emails.addresses()))
    }

    /// Replace the list's addresses, appending the list if it is new
    pub async fn save(&self, name: &str, emails: Vec<String>) -> Result<MailingList, MailError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.read_file().await?;

        let emails: Vec<String> = EmailField::List(emails).addresses();
        match file.lists.iter_mut().find(|list| list.name == name) {
            Some(list) => list.emails = EmailField::List(emails.clone()),
            None => file.lists.push(StoredMailingList {
                name: name.to_string(),
                emails: EmailField::List(emails.clone()),
            }),
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(&file)?;
        tokio::fs::write(&self.path, json).await?;

        tracing::info!("Saved mailing list {} ({} addresses)", name, emails.len());
        Ok(MailingList {
            name: name.to_string(),
            emails,
        })
    }
}
