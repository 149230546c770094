/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module contains the [`Config`] structure which holds all document modes and settings.

use sealed::sealed;
use serde::{Deserialize, Serialize};

use crate::error::FoliaError;
use crate::file::open_file_reader;
use crate::json::ToJson;
use crate::types::*;

pub trait Configurable: Sized {
    //// Obtain the configuration
    fn config(&self) -> &Config;

    //// Obtain the configuration mutably
    fn config_mut(&mut self) -> &mut Config;

    ///Builder pattern to associate a configuration
    fn with_config(mut self, config: Config) -> Self {
        self.set_config(config);
        self
    }

    ///Setter to associate a configuration
    fn set_config(&mut self, config: Config) -> &mut Self;
}

/// This holds the configuration. It unifies all document modes (as they can be set via [`Config::set_mode()`])
/// and a few serialisation settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Debug mode
    pub(crate) debug: bool,

    /// Permissive parsing: unrecognised attributes are logged and preserved rather than raising an error
    pub(crate) permissive: bool,

    /// Check text consistency after parsing
    pub(crate) checktext: bool,

    /// Fix inconsistent text offsets rather than failing
    pub(crate) fixtext: bool,

    /// Strip generator, annotator and datetime information on output (deterministic output)
    pub(crate) strip: bool,

    /// Write children in canonical order on output
    pub(crate) canonical: bool,

    /// Automatically declare annotation types and sets that are used but not declared
    pub(crate) autodeclare: bool,

    /// Always write sets and declaration defaults explicitly on output
    pub(crate) explicit: bool,

    ///generate a pseudo-random document identifier when none is provided
    pub(crate) generate_ids: bool,

    /// Number of spaces per indentation level on output
    pub(crate) indent: usize,

    /// Optional namespace label (prefix) for FoLiA elements on output
    pub(crate) ns_label: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            permissive: false,
            checktext: true,
            fixtext: false,
            strip: false,
            canonical: false,
            autodeclare: false,
            explicit: false,
            generate_ids: true,
            indent: 2,
            ns_label: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable debug mode. In debug mode, verbose output will be sent to the logger
    pub fn with_debug(mut self, value: bool) -> Self {
        self.debug = value;
        self
    }

    /// Is debug mode enabled or not?
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Enable or disable permissive mode
    pub fn with_permissive(mut self, value: bool) -> Self {
        self.permissive = value;
        self
    }

    /// Is permissive mode enabled?
    pub fn permissive(&self) -> bool {
        self.permissive
    }

    /// Enable or disable text consistency checking
    pub fn with_checktext(mut self, value: bool) -> Self {
        self.checktext = value;
        self
    }

    /// Is text consistency checking enabled?
    pub fn checktext(&self) -> bool {
        self.checktext
    }

    /// Enable or disable the automatic fixing of text offsets
    pub fn with_fixtext(mut self, value: bool) -> Self {
        self.fixtext = value;
        self
    }

    pub fn fixtext(&self) -> bool {
        self.fixtext
    }

    /// Strip generator, annotator and datetime information on output
    pub fn with_strip(mut self, value: bool) -> Self {
        self.strip = value;
        self
    }

    pub fn strip(&self) -> bool {
        self.strip
    }

    /// Output children in canonical order
    pub fn with_canonical(mut self, value: bool) -> Self {
        self.canonical = value;
        self
    }

    pub fn canonical(&self) -> bool {
        self.canonical
    }

    /// Automatically declare missing annotation declarations
    pub fn with_autodeclare(mut self, value: bool) -> Self {
        self.autodeclare = value;
        self
    }

    pub fn autodeclare(&self) -> bool {
        self.autodeclare
    }

    /// Always output sets and declaration defaults explicitly
    pub fn with_explicit(mut self, value: bool) -> Self {
        self.explicit = value;
        self
    }

    pub fn explicit(&self) -> bool {
        self.explicit
    }

    /// Generate a document ID when missing.
    pub fn with_generate_ids(mut self, value: bool) -> Self {
        self.generate_ids = value;
        self
    }

    /// Is generation of document IDs enabled?
    pub fn generate_ids(&self) -> bool {
        self.generate_ids
    }

    /// Number of spaces per indentation level on output, 0 disables indentation
    pub fn with_indent(mut self, value: usize) -> Self {
        self.indent = value;
        self
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Sets a namespace label (prefix) for FoLiA elements on output
    pub fn with_ns_label(mut self, value: Option<String>) -> Self {
        self.ns_label = value.filter(|label| !label.is_empty());
        self
    }

    pub fn ns_label(&self) -> Option<&str> {
        self.ns_label.as_deref()
    }

    /// Sets one or more modes from a comma separated string. Modes may be prefixed with `no` to disable them.
    /// Recognised modes are: `permissive`, `checktext`, `fixtext`, `strip`, `canonical`,
    /// `autodeclare`, `explicit` and `debug`.
    pub fn set_mode(&mut self, modes: &str) -> Result<(), FoliaError> {
        for mode in modes.split(',').map(|m| m.trim()).filter(|m| !m.is_empty()) {
            let (name, value) = if let Some(name) = mode.strip_prefix("no") {
                (name, false)
            } else {
                (mode, true)
            };
            match name {
                "permissive" => self.permissive = value,
                "checktext" => self.checktext = value,
                "fixtext" => self.fixtext = value,
                "strip" => self.strip = value,
                "canonical" => self.canonical = value,
                "autodeclare" => self.autodeclare = value,
                "explicit" => self.explicit = value,
                "debug" => self.debug = value,
                _ => {
                    return Err(FoliaError::AttributeError(
                        format!("unknown mode: {}", mode),
                        "Config::set_mode",
                    ))
                }
            }
        }
        Ok(())
    }

    /// Builder variant of [`Self::set_mode()`]
    pub fn with_mode(mut self, modes: &str) -> Result<Self, FoliaError> {
        self.set_mode(modes)?;
        Ok(self)
    }

    /// Returns all modes as a comma separated string, the inverse of [`Self::set_mode()`]
    pub fn mode(&self) -> String {
        let flags = [
            ("permissive", self.permissive),
            ("checktext", self.checktext),
            ("fixtext", self.fixtext),
            ("strip", self.strip),
            ("canonical", self.canonical),
            ("autodeclare", self.autodeclare),
            ("explicit", self.explicit),
            ("debug", self.debug),
        ];
        flags
            .iter()
            .map(|(name, value)| {
                if *value {
                    name.to_string()
                } else {
                    format!("no{}", name)
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Loads configuration from a JSON file
    pub fn from_file(filename: &str) -> Result<Self, FoliaError> {
        let reader = open_file_reader(filename, &Config::default())?;
        let deserializer = &mut serde_json::Deserializer::from_reader(reader);
        let result: Result<Self, _> = serde_path_to_error::deserialize(deserializer);
        result
            .map_err(|e| FoliaError::JsonError(e, filename.to_string(), "Reading config from file"))
    }
}

#[sealed]
impl TypeInfo for Config {
    fn typeinfo() -> Type {
        Type::Config
    }
}

impl ToJson for Config {}
