/*!
 * Edits to stored files and vocabulary.
 *
 * Extraction output can be corrected by hand: items renamed, re-read or
 * removed, and files given a new display name. Input is trimmed before it
 * is stored.
 */

use log::info;

use crate::database::models::VocabularyRecord;
use crate::database::Repository;
use crate::errors::LibraryError;

const SRT_EXTENSION: &str = ".srt";

fn storage_error(e: anyhow::Error) -> LibraryError {
    LibraryError::Storage(e.to_string())
}

/// Trimmed value, or `InvalidInput` naming the empty field
fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, LibraryError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LibraryError::InvalidInput(format!("{} is required", field)));
    }
    Ok(value)
}

#[derive(Clone)]
pub struct LibraryService {
    repository: Repository,
}

impl LibraryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Replace word, reading and meaning of one vocabulary item
    pub async fn update_vocabulary(
        &self,
        vocabulary_id: &str,
        word: &str,
        reading: &str,
        meaning: &str,
    ) -> Result<VocabularyRecord, LibraryError> {
        let word = required("word", word)?;
        let reading = required("reading", reading)?;
        let meaning = required("meaning", meaning)?;

        let updated = self
            .repository
            .update_vocabulary(vocabulary_id, word, reading, meaning)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| LibraryError::NotFound(vocabulary_id.to_string()))?;

        info!("Updated vocabulary item {} ({})", updated.word, vocabulary_id);
        Ok(updated)
    }

    pub async fn delete_vocabulary(&self, vocabulary_id: &str) -> Result<(), LibraryError> {
        if !self
            .repository
            .delete_vocabulary(vocabulary_id)
            .await
            .map_err(storage_error)?
        {
            return Err(LibraryError::NotFound(vocabulary_id.to_string()));
        }

        info!("Deleted vocabulary item {}", vocabulary_id);
        Ok(())
    }

    /// Rename a file, appending `.srt` when the new name lacks it.
    ///
    /// Returns the stored name.
    pub async fn rename_file(&self, file_id: &str, filename: &str) -> Result<String, LibraryError> {
        let trimmed = required("filename", filename)?;
        let filename = if trimmed.ends_with(SRT_EXTENSION) {
            trimmed.to_string()
        } else {
            format!("{}{}", trimmed, SRT_EXTENSION)
        };

        if !self
            .repository
            .rename_file(file_id, &filename)
            .await
            .map_err(storage_error)?
        {
            return Err(LibraryError::NotFound(file_id.to_string()));
        }

        info!("Renamed file {} to {}", file_id, filename);
        Ok(filename)
    }
}
