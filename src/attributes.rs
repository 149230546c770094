/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module implements the validation and assignment of element attributes. All attributes of
//! an element are validated against the schema (required and optional attributes) and the
//! annotation declarations before anything is committed to the element.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::declaration::Declaration;
use crate::document::Document;
use crate::element::{Element, ElementHandle};
use crate::error::FoliaError;
use crate::schema::{feature_for_subset, Attrib, ElementFamily, ElementType, Properties};
use crate::store::*;
use crate::types::*;

static NCNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}_][\p{L}\p{N}_.\-]*$").expect("regular expression must compile")
});

/// Is this a valid XML identifier (NCName)?
pub fn is_valid_id(id: &str) -> bool {
    NCNAME.is_match(id)
}

/// The attribute values of an element, staged for validation before they are committed
#[derive(Debug, Clone, Default)]
struct Staged {
    id: Option<String>,
    set: Option<String>,
    class: Option<String>,
    annotator: Option<String>,
    annotatortype: Option<AnnotatorType>,
    confidence: Option<f64>,
    n: Option<String>,
    datetime: Option<NaiveDateTime>,
    begintime: Option<String>,
    endtime: Option<String>,
    src: Option<String>,
    speaker: Option<String>,
    textclass: Option<String>,
    metadata: Option<String>,
    space: Option<bool>,
    tag: Option<String>,
    processor: Option<String>,
    auth: Option<bool>,
    subset: Option<String>,
    offset: Option<usize>,
    extra: Vec<(String, String)>,
}

impl Staged {
    fn from_element(element: &Element) -> Self {
        Self {
            id: element.id.clone(),
            set: element.set.clone(),
            class: element.class.clone(),
            annotator: element.annotator.clone(),
            annotatortype: if element.annotatortype.is_undefined() {
                None
            } else {
                Some(element.annotatortype)
            },
            confidence: element.confidence,
            n: element.n.clone(),
            datetime: element.datetime,
            begintime: element.begintime.clone(),
            endtime: element.endtime.clone(),
            src: element.src.clone(),
            speaker: element.speaker.clone(),
            textclass: element.textclass.clone(),
            metadata: element.metadata.clone(),
            space: Some(element.space),
            tag: element.tag.clone(),
            processor: element.processor.clone(),
            auth: Some(element.auth),
            subset: element.subset.clone(),
            offset: element.offset,
            extra: element.extra.clone(),
        }
    }

    fn has(&self, attrib: Attrib) -> bool {
        if attrib == Attrib::ID {
            self.id.is_some()
        } else if attrib == Attrib::CLASS {
            self.class.is_some()
        } else if attrib == Attrib::SET {
            self.set.is_some()
        } else if attrib == Attrib::ANNOTATOR {
            self.annotator.is_some()
        } else if attrib == Attrib::CONFIDENCE {
            self.confidence.is_some()
        } else if attrib == Attrib::N {
            self.n.is_some()
        } else if attrib == Attrib::DATETIME {
            self.datetime.is_some()
        } else if attrib == Attrib::BEGINTIME {
            self.begintime.is_some()
        } else if attrib == Attrib::ENDTIME {
            self.endtime.is_some()
        } else if attrib == Attrib::SRC {
            self.src.is_some()
        } else if attrib == Attrib::SPEAKER {
            self.speaker.is_some()
        } else if attrib == Attrib::TEXTCLASS {
            self.textclass.is_some()
        } else if attrib == Attrib::METADATA {
            self.metadata.is_some()
        } else if attrib == Attrib::TAG {
            self.tag.is_some()
        } else if attrib == Attrib::PROCESSOR {
            self.processor.is_some()
        } else if attrib == Attrib::OFFSET {
            self.offset.is_some()
        } else if attrib == Attrib::SUBSET {
            self.subset.is_some()
        } else {
            true
        }
    }

    fn commit(self, element: &mut Element) {
        element.id = self.id;
        element.set = self.set;
        element.class = self.class;
        element.annotator = self.annotator;
        element.annotatortype = self.annotatortype.unwrap_or_default();
        element.confidence = self.confidence;
        element.n = self.n;
        element.datetime = self.datetime;
        element.begintime = self.begintime;
        element.endtime = self.endtime;
        element.src = self.src;
        element.speaker = self.speaker;
        element.textclass = self.textclass;
        element.metadata = self.metadata;
        element.space = self.space.unwrap_or(true);
        element.tag = self.tag;
        element.processor = self.processor;
        element.auth = self.auth.unwrap_or(true);
        element.subset = self.subset;
        element.offset = self.offset;
        element.extra = self.extra;
    }
}

fn attribute_error(message: String) -> FoliaError {
    FoliaError::AttributeError(message, "set_attributes")
}

impl Document {
    /// Sets attributes on an element. All attributes are validated first (against the schema, the
    /// annotation declarations and the ID index), and only committed if all are valid.
    ///
    /// Keys that are not standard attributes but match the subset of a feature the element accepts
    /// (e.g. `head` on a part-of-speech annotation) are shorthand for adding a feature child.
    /// Other unrecognised keys are an error, unless the document is in permissive mode, in which case
    /// they are preserved verbatim and a warning is issued.
    pub fn set_attributes<K, V>(
        &mut self,
        handle: ElementHandle,
        attributes: impl IntoIterator<Item = (K, V)>,
    ) -> Result<(), FoliaError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let element = self.get(handle)?;
        let elementtype = element.elementtype;
        let properties = elementtype.properties();
        let allowed = properties.allowed();
        let mut staged = Staged::from_element(element);
        let mut features: Vec<(ElementType, String, String)> = Vec::new();

        for (key, value) in attributes {
            let (key, value) = (key.as_ref(), value.as_ref());
            if properties.extra_attributes.contains(&key) {
                set_extra(&mut staged.extra, key, value);
                continue;
            }
            match Attrib::from_attribute_name(key) {
                Some(attrib) if allowed.contains(attrib) => {
                    self.stage(&mut staged, handle, key, value)?
                }
                Some(_) => {
                    return Err(attribute_error(format!(
                        "attribute '{}' is not supported on <{}>",
                        key, elementtype
                    )))
                }
                None if key == "auth" => staged.auth = Some(parse_bool(key, value)?),
                None => {
                    if let Some(featuretype) = feature_for_subset(elementtype, key) {
                        features.push((featuretype, key.to_string(), value.to_string()));
                    } else if key.contains(':') && !key.starts_with("xml:") {
                        //namespaced attributes (xlink) are always preserved
                        set_extra(&mut staged.extra, key, value);
                    } else if self.config.permissive() {
                        self.warn(format_args!(
                            "unsupported attribute '{}' on <{}> preserved (permissive mode)",
                            key, elementtype
                        ));
                        set_extra(&mut staged.extra, key, value);
                    } else {
                        return Err(attribute_error(format!(
                            "attribute '{}' is not supported on <{}>",
                            key, elementtype
                        )));
                    }
                }
            }
        }

        for attrib in properties.required.iter() {
            if !staged.has(attrib) {
                return Err(attribute_error(format!(
                    "required attribute {:?} is missing on <{}>",
                    attrib, elementtype
                )));
            }
        }

        let autodeclare = self.resolve_declaration(properties, &mut staged)?;
        self.resolve_processor(&mut staged)?;

        let mut children = Vec::with_capacity(features.len());
        for (featuretype, subset, class) in features {
            let mut feature = Element::new(featuretype);
            feature.class = Some(class);
            if featuretype == ElementType::Feature {
                feature.subset = Some(subset);
            }
            let checked = self.insert(feature).and_then(|feature| {
                children.push(feature);
                self.check_append(handle, feature, None)
            });
            if let Err(e) = checked {
                for feature in children {
                    let _ = self.destroy(feature);
                }
                return Err(e);
            }
        }

        // all validated: commit
        if let Some(declaration) = autodeclare {
            self.warn(format_args!(
                "auto-declaring {} with set {:?}",
                declaration.annotationtype(),
                declaration.set()
            ));
            self.declarations.add(declaration);
        }
        let old_id = self.get(handle)?.id.clone();
        let new_id = staged.id.clone();
        staged.commit(self.get_mut(handle)?);
        if old_id != new_id {
            if let Some(old_id) = old_id {
                self.idmap.remove(&old_id);
            }
            if let Some(new_id) = new_id {
                self.idmap.insert(new_id, handle);
            }
        }
        for feature in children {
            self.append(handle, feature)?;
        }
        Ok(())
    }

    /// Parses and validates a single standard attribute into the staging area
    fn stage(
        &self,
        staged: &mut Staged,
        handle: ElementHandle,
        key: &str,
        value: &str,
    ) -> Result<(), FoliaError> {
        match key {
            "xml:id" | "id" => {
                if !is_valid_id(value) {
                    return Err(attribute_error(format!("invalid ID: '{}'", value)));
                }
                if let Some(existing) = self.idmap.get(value) {
                    if existing != handle {
                        return Err(FoliaError::DuplicateIdError(
                            value.to_string(),
                            "set_attributes",
                        ));
                    }
                }
                staged.id = Some(value.to_string());
            }
            "set" => staged.set = Some(value.to_string()).filter(|s| !s.is_empty()),
            "class" => staged.class = Some(value.to_string()),
            "annotator" => staged.annotator = Some(value.to_string()),
            "annotatortype" => {
                let annotatortype: AnnotatorType = value.parse()?;
                staged.annotatortype = Some(annotatortype).filter(|t| !t.is_undefined());
            }
            "confidence" => {
                let confidence: f64 = value.parse().map_err(|_| {
                    attribute_error(format!("invalid confidence value: '{}'", value))
                })?;
                if !(0.0..=1.0).contains(&confidence) {
                    return Err(attribute_error(format!(
                        "confidence must be between 0 and 1, got {}",
                        confidence
                    )));
                }
                staged.confidence = Some(confidence);
            }
            "n" => staged.n = Some(value.to_string()),
            "datetime" => staged.datetime = Some(parse_datetime(value)?),
            "begintime" => {
                parse_time(value)?;
                staged.begintime = Some(value.to_string());
            }
            "endtime" => {
                parse_time(value)?;
                staged.endtime = Some(value.to_string());
            }
            "src" => staged.src = Some(value.to_string()),
            "speaker" => staged.speaker = Some(value.to_string()),
            "textclass" => staged.textclass = Some(value.to_string()),
            "metadata" => staged.metadata = Some(value.to_string()),
            "space" => staged.space = Some(parse_bool(key, value)?),
            "tag" => staged.tag = Some(value.to_string()),
            "processor" => staged.processor = Some(value.to_string()),
            "offset" => {
                staged.offset = Some(value.parse().map_err(|_| {
                    attribute_error(format!("invalid offset: '{}'", value))
                })?)
            }
            "subset" => staged.subset = Some(value.to_string()),
            _ => {
                return Err(attribute_error(format!("unhandled attribute '{}'", key)));
            }
        }
        Ok(())
    }

    /// Checks the set and class against the declarations and fills in declared defaults.
    /// Returns a declaration to add if the type needs to be auto-declared.
    fn resolve_declaration(
        &self,
        properties: &Properties,
        staged: &mut Staged,
    ) -> Result<Option<Declaration>, FoliaError> {
        let annotationtype = properties.annotationtype;
        if annotationtype == AnnotationType::NoAnnotation {
            return Ok(None);
        }
        let textclass_semantics = matches!(
            properties.family,
            ElementFamily::Content | ElementFamily::TextMarkup
        );
        if textclass_semantics && staged.set.is_none() {
            //the class of text content is a text class, no declaration needed
            return Ok(None);
        }
        if staged.class.is_none() && staged.set.is_none() {
            return Ok(None);
        }

        let mut autodeclare = None;
        match staged.set.clone() {
            Some(set) => {
                let set = self
                    .declarations
                    .resolve_alias(annotationtype, &set)
                    .map(|s| s.to_string())
                    .unwrap_or(set);
                if !self.declarations.is_declared(annotationtype, Some(&set)) {
                    if self.config.autodeclare() {
                        autodeclare = Some(Declaration::new(annotationtype, Some(&set)));
                    } else {
                        return Err(FoliaError::DeclarationError(
                            format!(
                                "set '{}' is not declared for annotation type {}",
                                set, annotationtype
                            ),
                            "set_attributes",
                        ));
                    }
                }
                staged.set = Some(set);
            }
            None => {
                let count = self.declarations.of_type(annotationtype).count();
                match count {
                    0 => {
                        if self.config.autodeclare() {
                            autodeclare = Some(Declaration::new(annotationtype, None));
                        } else {
                            return Err(FoliaError::DeclarationError(
                                format!("annotation type {} is not declared", annotationtype),
                                "set_attributes",
                            ));
                        }
                    }
                    1 => {
                        staged.set = self
                            .declarations
                            .default_set(annotationtype)
                            .filter(|s| !s.is_empty())
                            .map(|s| s.to_string());
                    }
                    _ => {
                        return Err(FoliaError::DeclarationError(
                            format!(
                                "multiple sets are declared for annotation type {}, an explicit set is required",
                                annotationtype
                            ),
                            "set_attributes",
                        ));
                    }
                }
            }
        }

        //fill in the defaults from the declaration
        let set = staged.set.as_deref();
        if staged.annotator.is_none() {
            staged.annotator = self
                .declarations
                .default_annotator(annotationtype, set)
                .map(|s| s.to_string());
        }
        if staged.annotatortype.is_none() {
            staged.annotatortype = self.declarations.default_annotatortype(annotationtype, set);
        }
        if staged.datetime.is_none() {
            staged.datetime = self
                .declarations
                .default_datetime(annotationtype, set)
                .copied();
        }
        if staged.processor.is_none() {
            staged.processor = self
                .declarations
                .default_processor(annotationtype, set)
                .map(|s| s.to_string());
        }
        Ok(autodeclare)
    }

    /// Checks the processor exists and fills in annotator information from it
    fn resolve_processor(&self, staged: &mut Staged) -> Result<(), FoliaError> {
        if let Some(processor_id) = staged.processor.as_deref() {
            let processor = self.provenance.get_by_id(processor_id).map_err(|_| {
                attribute_error(format!("processor '{}' does not exist", processor_id))
            })?;
            if staged.annotator.is_none() {
                staged.annotator = Some(processor.name().to_string());
            }
            if staged.annotatortype.is_none() {
                staged.annotatortype = Some(processor.annotatortype());
            }
        }
        Ok(())
    }
}

fn set_extra(extra: &mut Vec<(String, String)>, key: &str, value: &str) {
    if let Some(entry) = extra.iter_mut().find(|(k, _)| k == key) {
        entry.1 = value.to_string();
    } else {
        extra.push((key.to_string(), value.to_string()));
    }
}
