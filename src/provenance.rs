/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module contains the provenance model: a tree of [`Processor`]s, the tools and people that
//! produced annotations in a document.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use sealed::sealed;

use crate::error::FoliaError;
use crate::store::*;
use crate::types::*;

static TRAILING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)(\d+)$").expect("regular expression must compile"));

/// A processor is a named and versioned entity (a tool, a processing pass, or a human) that has
/// produced annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct Processor {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) annotatortype: AnnotatorType,
    pub(crate) version: Option<String>,
    pub(crate) document_version: Option<String>,
    pub(crate) command: Option<String>,
    pub(crate) folia_version: Option<String>,
    pub(crate) host: Option<String>,
    pub(crate) user: Option<String>,
    pub(crate) begindatetime: Option<NaiveDateTime>,
    pub(crate) enddatetime: Option<NaiveDateTime>,
    pub(crate) src: Option<String>,
    pub(crate) format: Option<String>,
    pub(crate) resourcelink: Option<String>,
    pub(crate) metadata: Vec<(String, String)>,
    pub(crate) children: Vec<ProcessorHandle>,
    pub(crate) parent: Option<ProcessorHandle>,
    pub(crate) handle: Option<ProcessorHandle>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessorHandle {
    index: u32,
    generation: u32,
}

#[sealed]
impl Handle for ProcessorHandle {
    fn new(index: usize, generation: u32) -> Self {
        Self {
            index: index as u32,
            generation,
        }
    }
    fn index(&self) -> usize {
        self.index as usize
    }
    fn generation(&self) -> u32 {
        self.generation
    }
}

#[sealed]
impl TypeInfo for Processor {
    fn typeinfo() -> Type {
        Type::Processor
    }
}

#[sealed]
impl Storable for Processor {
    type HandleType = ProcessorHandle;

    fn handle(&self) -> Option<ProcessorHandle> {
        self.handle
    }

    fn id(&self) -> Option<&str> {
        Some(self.id.as_str())
    }

    fn set_handle(&mut self, handle: ProcessorHandle) {
        self.handle = Some(handle);
    }
}

impl Processor {
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn annotatortype(&self) -> AnnotatorType {
        self.annotatortype
    }
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
    pub fn document_version(&self) -> Option<&str> {
        self.document_version.as_deref()
    }
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }
    pub fn folia_version(&self) -> Option<&str> {
        self.folia_version.as_deref()
    }
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
    pub fn begindatetime(&self) -> Option<&NaiveDateTime> {
        self.begindatetime.as_ref()
    }
    pub fn enddatetime(&self) -> Option<&NaiveDateTime> {
        self.enddatetime.as_ref()
    }
    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }
    pub fn resourcelink(&self) -> Option<&str> {
        self.resourcelink.as_deref()
    }
    /// Free-form metadata as key/value pairs
    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }
    pub fn children(&self) -> &[ProcessorHandle] {
        &self.children
    }
    pub fn parent(&self) -> Option<ProcessorHandle> {
        self.parent
    }
}

/// Builds a [`Processor`], pass it to [`crate::Document::add_processor()`]. If no ID is set, one is
/// generated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessorBuilder {
    pub(crate) id: Option<String>,
    pub(crate) name: String,
    pub(crate) annotatortype: Option<AnnotatorType>,
    pub(crate) version: Option<String>,
    pub(crate) document_version: Option<String>,
    pub(crate) command: Option<String>,
    pub(crate) folia_version: Option<String>,
    pub(crate) host: Option<String>,
    pub(crate) user: Option<String>,
    pub(crate) begindatetime: Option<NaiveDateTime>,
    pub(crate) enddatetime: Option<NaiveDateTime>,
    pub(crate) src: Option<String>,
    pub(crate) format: Option<String>,
    pub(crate) resourcelink: Option<String>,
    pub(crate) metadata: Vec<(String, String)>,
}

impl ProcessorBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
    pub fn with_annotatortype(mut self, annotatortype: AnnotatorType) -> Self {
        self.annotatortype = Some(annotatortype);
        self
    }
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
    pub fn with_document_version(mut self, version: impl Into<String>) -> Self {
        self.document_version = Some(version.into());
        self
    }
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
    pub fn with_folia_version(mut self, version: impl Into<String>) -> Self {
        self.folia_version = Some(version.into());
        self
    }
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
    pub fn with_begindatetime(mut self, datetime: NaiveDateTime) -> Self {
        self.begindatetime = Some(datetime);
        self
    }
    pub fn with_enddatetime(mut self, datetime: NaiveDateTime) -> Self {
        self.enddatetime = Some(datetime);
        self
    }
    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
    pub fn with_resourcelink(mut self, link: impl Into<String>) -> Self {
        self.resourcelink = Some(link.into());
        self
    }
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    /// Sets a field by its XML attribute name
    pub(crate) fn set_attribute(&mut self, key: &str, value: &str) -> Result<(), FoliaError> {
        match key {
            "xml:id" | "id" => self.id = Some(value.to_string()),
            "name" => self.name = value.to_string(),
            "type" => self.annotatortype = Some(value.parse()?),
            "version" => self.version = Some(value.to_string()),
            "document_version" => self.document_version = Some(value.to_string()),
            "command" => self.command = Some(value.to_string()),
            "folia_version" => self.folia_version = Some(value.to_string()),
            "host" => self.host = Some(value.to_string()),
            "user" => self.user = Some(value.to_string()),
            "begindatetime" => self.begindatetime = Some(parse_datetime(value)?),
            "enddatetime" => self.enddatetime = Some(parse_datetime(value)?),
            "src" => self.src = Some(value.to_string()),
            "format" => self.format = Some(value.to_string()),
            "resourcelink" => self.resourcelink = Some(value.to_string()),
            _ => {
                return Err(FoliaError::AttributeError(
                    format!("unknown processor attribute: {}", key),
                    "ProcessorBuilder::set_attribute",
                ))
            }
        }
        Ok(())
    }
}

/// Holds all processors of a document
#[derive(Debug, Clone, Default)]
pub struct Provenance {
    processors: Store<Processor>,
    idmap: IdMap<ProcessorHandle>,
    /// Top-level processors, in order
    roots: Vec<ProcessorHandle>,
}

#[sealed]
impl StoreFor<Processor> for Provenance {
    fn store(&self) -> &Store<Processor> {
        &self.processors
    }
    fn store_mut(&mut self) -> &mut Store<Processor> {
        &mut self.processors
    }
    fn idmap(&self) -> Option<&IdMap<ProcessorHandle>> {
        Some(&self.idmap)
    }
    fn idmap_mut(&mut self) -> Option<&mut IdMap<ProcessorHandle>> {
        Some(&mut self.idmap)
    }
    fn store_typeinfo() -> &'static str {
        "Processor in Provenance"
    }

    fn inserted(&mut self, handle: ProcessorHandle) -> Result<(), FoliaError> {
        // link the processor into the tree
        let parent = self.get(handle)?.parent;
        if let Some(parent) = parent {
            self.get_mut(parent)?.children.push(handle);
        } else {
            self.roots.push(handle);
        }
        Ok(())
    }
}

impl Provenance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level processors in order
    pub fn roots(&self) -> &[ProcessorHandle] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Adds a processor, optionally as a sub-processor of `parent`. Returns the handle.
    pub fn add(
        &mut self,
        builder: ProcessorBuilder,
        parent: Option<ProcessorHandle>,
    ) -> Result<ProcessorHandle, FoliaError> {
        if let Some(parent) = parent {
            //validate the parent
            self.get(parent)?;
        }
        let id = match builder.id {
            Some(id) => id,
            None => self.generate_id(&builder.name, parent)?,
        };
        let processor = Processor {
            id,
            name: builder.name,
            annotatortype: builder.annotatortype.unwrap_or(AnnotatorType::Auto),
            version: builder.version,
            document_version: builder.document_version,
            command: builder.command,
            folia_version: builder.folia_version,
            host: builder.host,
            user: builder.user,
            begindatetime: builder.begindatetime,
            enddatetime: builder.enddatetime,
            src: builder.src,
            format: builder.format,
            resourcelink: builder.resourcelink,
            metadata: builder.metadata,
            children: Vec::new(),
            parent,
            handle: None,
        };
        self.insert(processor)
    }

    /// Generates a fresh processor ID. If there are sibling processors already, this is the
    /// successor of the ID of the last sibling, otherwise it is derived from the name.
    pub fn generate_id(
        &self,
        name: &str,
        parent: Option<ProcessorHandle>,
    ) -> Result<String, FoliaError> {
        let siblings: &[ProcessorHandle] = match parent {
            Some(parent) => &self.get(parent)?.children,
            None => &self.roots,
        };
        let mut candidate = if let Some(last) = siblings.last() {
            successor(&self.get(*last)?.id)
        } else {
            format!("{}.1", sanitize_id(name))
        };
        while self.has_id(&candidate) {
            candidate = successor(&candidate);
        }
        Ok(candidate)
    }

    /// Iterate over all processors in depth-first order
    pub fn iter_depthfirst(&self) -> impl Iterator<Item = &Processor> {
        let mut stack: Vec<ProcessorHandle> = self.roots.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            while let Some(handle) = stack.pop() {
                if let Ok(processor) = self.get(handle) {
                    stack.extend(processor.children.iter().rev().copied());
                    return Some(processor);
                }
            }
            None
        })
    }
}

/// Returns the successor of an identifier: a trailing number is incremented, otherwise `.1` is appended.
pub(crate) fn successor(id: &str) -> String {
    if let Some(captures) = TRAILING_NUMBER.captures(id) {
        if let (Some(prefix), Some(number)) = (captures.get(1), captures.get(2)) {
            if let Ok(n) = number.as_str().parse::<u64>() {
                return format!("{}{}", prefix.as_str(), n + 1);
            }
        }
    }
    format!("{}.1", id)
}

/// Turns an arbitrary name into something usable as an XML identifier
pub(crate) fn sanitize_id(name: &str) -> String {
    let mut id: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if id.is_empty() || !id.starts_with(|c: char| c.is_alphabetic() || c == '_') {
        id.insert(0, '_');
    }
    id
}
