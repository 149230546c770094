/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module contains some common helper functions for dealing with file I/O

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::FoliaError;
use crate::types::*;

/// Get a file for reading or writing, this resolves `file://` URLs and rejects remote ones
pub(crate) fn get_filepath(filename: &str) -> Result<PathBuf, FoliaError> {
    if filename == "-" {
        //designates stdin or stdout
        return Ok(filename.into());
    }
    if filename.starts_with("https://") || filename.starts_with("http://") {
        return Err(FoliaError::NotImplementedError(
            format!("Loading remote URLs is not supported: {}", filename),
            "get_filepath",
        ));
    }
    if let Some(stripped) = filename.strip_prefix("file://") {
        Ok(PathBuf::from(stripped))
    } else {
        Ok(PathBuf::from(filename))
    }
}

/// Auxiliary function to help open files
pub(crate) fn open_file(filename: &str, config: &Config) -> Result<File, FoliaError> {
    let found_filename = get_filepath(filename)?;
    debug(config, || format!("open_file: {:?}", found_filename));
    File::open(found_filename.as_path()).map_err(|e| {
        FoliaError::IOError(
            e,
            found_filename.to_string_lossy().into_owned(),
            "Opening file for reading failed",
        )
    })
}

/// Auxiliary function to help create files
pub(crate) fn create_file(filename: &str, config: &Config) -> Result<File, FoliaError> {
    let found_filename = get_filepath(filename)?;
    debug(config, || format!("create_file: {:?}", found_filename));
    File::create(found_filename.as_path()).map_err(|e| {
        FoliaError::IOError(
            e,
            found_filename.to_string_lossy().into_owned(),
            "Opening file for writing failed",
        )
    })
}

/// Auxiliary function to help open files, `-` reads from standard input
pub(crate) fn open_file_reader(
    filename: &str,
    config: &Config,
) -> Result<Box<dyn BufRead>, FoliaError> {
    if filename == "-" {
        Ok(Box::new(std::io::stdin().lock()))
    } else {
        Ok(Box::new(BufReader::new(open_file(filename, config)?)))
    }
}

/// Auxiliary function to help open files, `-` writes to standard output
pub(crate) fn open_file_writer(
    filename: &str,
    config: &Config,
) -> Result<Box<dyn Write>, FoliaError> {
    if filename == "-" {
        Ok(Box::new(std::io::stdout()))
    } else {
        Ok(Box::new(BufWriter::new(create_file(filename, config)?)))
    }
}
