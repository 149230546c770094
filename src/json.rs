/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`ToJson`] trait that is used to dump configuration and
//! declarations as JSON, mostly for inspection and debugging.

use crate::config::Config;
use crate::error::FoliaError;
use crate::file::*;
use crate::types::*;

pub trait ToJson
where
    Self: TypeInfo + serde::Serialize,
{
    /// Writes a JSON serialisation to any writer
    fn to_json_writer<W>(&self, writer: W, compact: bool) -> Result<(), FoliaError>
    where
        W: std::io::Write,
    {
        match compact {
            false => serde_json::to_writer_pretty(writer, &self),
            true => serde_json::to_writer(writer, &self),
        }
        .map_err(|e| {
            FoliaError::SerializationError(format!("Writing {} as JSON: {}", Self::typeinfo(), e))
        })
    }

    /// Writes a JSON serialisation to a file
    fn to_json_file(&self, filename: &str, config: &Config) -> Result<(), FoliaError> {
        debug(config, || {
            format!("{}.to_json_file: filename={:?}", Self::typeinfo(), filename)
        });
        let writer = open_file_writer(filename, config)?;
        self.to_json_writer(writer, false)
    }

    /// Serializes this structure to a JSON string
    fn to_json_string(&self, compact: bool) -> Result<String, FoliaError> {
        match compact {
            false => serde_json::to_string_pretty(&self),
            true => serde_json::to_string(&self),
        }
        .map_err(|e| {
            FoliaError::SerializationError(format!("Writing {} to string: {}", Self::typeinfo(), e))
        })
    }
}
