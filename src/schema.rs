/*
    FoLiA Library (Format for Linguistic Annotation)

        Licensed under the GNU General Public License v3
*/

//! This module contains the schema registry: the closed set of element kinds ([`ElementType`]),
//! the families they are grouped in ([`ElementFamily`]), and a static table of [`Properties`]
//! describing, per kind, which children are accepted, which attributes are required or optional,
//! occurrence limits, text delimiters and the associated annotation category.
//!
//! The table is built once, lazily, and never mutated afterwards.

use bitflags::bitflags;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::FoliaError;
use crate::types::AnnotationType;

/// Families group element kinds that are accepted in the same places. A parent that accepts a
/// family accepts every kind in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementFamily {
    /// Structural elements (divisions, paragraphs, sentences, words, ...)
    Structure,
    /// Sub-token structure (morphemes, phonemes)
    Subtoken,
    /// Text and phonetic content
    Content,
    /// Markup inside text content
    TextMarkup,
    /// Token annotations that are embedded in the element they annotate
    InlineAnnotation,
    /// Annotations that refer to a span of tokens
    SpanAnnotation,
    /// Roles inside span annotations
    SpanRole,
    /// Layers holding span annotations (or morphemes/phonemes)
    AnnotationLayer,
    /// Features (key/value pairs attached to annotations)
    Feature,
    /// Higher order annotations: corrections, alternatives, comments, ...
    HigherOrder,
    /// The wrappers inside a correction (new, original, current, suggestion)
    CorrectionChild,
    /// Raw XML nodes: text nodes and comments
    Raw,
}

bitflags! {
    /// The attributes an element kind may carry
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Attrib: u32 {
        const ID = 1;
        const CLASS = 1 << 1;
        const SET = 1 << 2;
        const ANNOTATOR = 1 << 3;
        const CONFIDENCE = 1 << 4;
        const N = 1 << 5;
        const DATETIME = 1 << 6;
        const BEGINTIME = 1 << 7;
        const ENDTIME = 1 << 8;
        const SRC = 1 << 9;
        const SPEAKER = 1 << 10;
        const TEXTCLASS = 1 << 11;
        const METADATA = 1 << 12;
        const SPACE = 1 << 13;
        const TAG = 1 << 14;
        const PROCESSOR = 1 << 15;
        const OFFSET = 1 << 16;
        const SUBSET = 1 << 17;
    }
}

impl Attrib {
    /// Maps an attribute name (as it appears in XML) to its flag
    pub fn from_attribute_name(name: &str) -> Option<Self> {
        match name {
            "xml:id" | "id" => Some(Self::ID),
            "class" => Some(Self::CLASS),
            "set" => Some(Self::SET),
            "annotator" | "annotatortype" => Some(Self::ANNOTATOR),
            "confidence" => Some(Self::CONFIDENCE),
            "n" => Some(Self::N),
            "datetime" => Some(Self::DATETIME),
            "begintime" => Some(Self::BEGINTIME),
            "endtime" => Some(Self::ENDTIME),
            "src" => Some(Self::SRC),
            "speaker" => Some(Self::SPEAKER),
            "textclass" => Some(Self::TEXTCLASS),
            "metadata" => Some(Self::METADATA),
            "space" => Some(Self::SPACE),
            "tag" => Some(Self::TAG),
            "processor" => Some(Self::PROCESSOR),
            "offset" => Some(Self::OFFSET),
            "subset" => Some(Self::SUBSET),
            _ => None,
        }
    }
}

/// An entry in the list of accepted children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    Kind(ElementType),
    Family(ElementFamily),
}

macro_rules! element_types {
    ( $( $variant:ident => $tag:expr ),* $(,)? ) => {
        /// The closed set of element kinds
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum ElementType {
            $( $variant ),*
        }

        impl ElementType {
            /// All element kinds, in declaration order
            pub const ALL: &'static [ElementType] = &[ $( ElementType::$variant ),* ];

            /// The XML tag of this element kind
            pub fn xmltag(&self) -> &'static str {
                match self {
                    $( ElementType::$variant => $tag ),*
                }
            }
        }
    };
}

element_types! {
    //structure
    Text => "text",
    Speech => "speech",
    Division => "div",
    Paragraph => "p",
    Head => "head",
    Sentence => "s",
    Word => "w",
    Hiddenword => "hiddenw",
    Part => "part",
    List => "list",
    ListItem => "item",
    Label => "label",
    Figure => "figure",
    Caption => "caption",
    Table => "table",
    TableHead => "tablehead",
    Row => "row",
    Cell => "cell",
    Quote => "quote",
    Event => "event",
    Utterance => "utt",
    Entry => "entry",
    Term => "term",
    Definition => "def",
    Example => "ex",
    Note => "note",
    Reference => "ref",
    LineBreak => "br",
    Whitespace => "whitespace",
    Gap => "gap",
    //subtokens
    Morpheme => "morpheme",
    Phoneme => "phoneme",
    //content
    TextContent => "t",
    PhonContent => "ph",
    GapContent => "content",
    //text markup
    TextMarkupString => "t-str",
    TextMarkupGap => "t-gap",
    TextMarkupCorrection => "t-correction",
    TextMarkupError => "t-error",
    TextMarkupStyle => "t-style",
    TextMarkupHSpace => "t-hspace",
    TextMarkupLanguage => "t-lang",
    TextMarkupReference => "t-ref",
    TextMarkupHyphenation => "t-hbr",
    //inline annotation
    PosAnnotation => "pos",
    LemmaAnnotation => "lemma",
    DomainAnnotation => "domain",
    SenseAnnotation => "sense",
    SubjectivityAnnotation => "subjectivity",
    ErrorDetection => "errordetection",
    LangAnnotation => "lang",
    //span annotation
    Entity => "entity",
    Chunk => "chunk",
    SyntacticUnit => "su",
    Dependency => "dependency",
    CoreferenceChain => "coreferencechain",
    CoreferenceLink => "coreferencelink",
    SemanticRole => "semrole",
    Predicate => "predicate",
    Sentiment => "sentiment",
    Statement => "statement",
    Observation => "observation",
    Modality => "modality",
    TimeSegment => "timesegment",
    SpanRelation => "spanrelation",
    //span roles
    Headspan => "hd",
    DependencyDependent => "dep",
    Source => "source",
    Target => "target",
    Scope => "scope",
    StatementRelation => "rel",
    Polarity => "polarity",
    Strength => "strength",
    LinkReference => "xref",
    //layers
    EntitiesLayer => "entities",
    ChunkingLayer => "chunking",
    SyntaxLayer => "syntax",
    DependenciesLayer => "dependencies",
    CoreferenceLayer => "coreferences",
    SemanticRolesLayer => "semroles",
    SentimentLayer => "sentiments",
    StatementLayer => "statements",
    ObservationLayer => "observations",
    ModalitiesLayer => "modalities",
    TimingLayer => "timing",
    SpanRelationLayer => "spanrelations",
    MorphologyLayer => "morphology",
    PhonologyLayer => "phonology",
    //features
    Feature => "feat",
    SynsetFeature => "synset",
    ActorFeature => "actor",
    HeadFeature => "headfeature",
    ValueFeature => "value",
    TimeFeature => "time",
    LevelFeature => "level",
    FunctionFeature => "function",
    BegindatetimeFeature => "begindatetime",
    EnddatetimeFeature => "enddatetime",
    StyleFeature => "style",
    FontFeature => "font",
    SizeFeature => "size",
    //higher order
    Correction => "correction",
    Alternative => "alt",
    AlternativeLayers => "altlayers",
    Comment => "comment",
    Description => "desc",
    Metric => "metric",
    String => "str",
    Relation => "relation",
    ForeignData => "foreign-data",
    External => "external",
    //correction children
    New => "new",
    Original => "original",
    Current => "current",
    Suggestion => "suggestion",
    //raw
    XmlText => "#text",
    XmlComment => "#comment",
}

static TAGMAP: Lazy<HashMap<&'static str, ElementType>> = Lazy::new(|| {
    ElementType::ALL
        .iter()
        .filter(|t| !t.is_raw())
        .map(|t| (t.xmltag(), *t))
        .collect()
});

static PROPERTIES: Lazy<Vec<Properties>> =
    Lazy::new(|| ElementType::ALL.iter().map(|t| build(*t)).collect());

impl ElementType {
    /// Look up an element kind by its XML tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        TAGMAP.get(tag).copied()
    }

    /// Returns the static properties of this element kind
    pub fn properties(&self) -> &'static Properties {
        properties(*self)
    }

    pub fn family(&self) -> ElementFamily {
        self.properties().family
    }

    pub fn annotationtype(&self) -> AnnotationType {
        self.properties().annotationtype
    }

    pub fn is_structure(&self) -> bool {
        matches!(self.family(), ElementFamily::Structure | ElementFamily::Subtoken)
    }

    pub fn is_content(&self) -> bool {
        matches!(self, Self::TextContent | Self::PhonContent)
    }

    pub fn is_textmarkup(&self) -> bool {
        self.family() == ElementFamily::TextMarkup
    }

    pub fn is_span(&self) -> bool {
        self.family() == ElementFamily::SpanAnnotation
    }

    /// Span annotations and span roles may hold references to tokens
    pub fn is_span_or_role(&self) -> bool {
        matches!(
            self.family(),
            ElementFamily::SpanAnnotation | ElementFamily::SpanRole
        )
    }

    pub fn is_layer(&self) -> bool {
        self.family() == ElementFamily::AnnotationLayer
    }

    pub fn is_feature(&self) -> bool {
        self.family() == ElementFamily::Feature
    }

    pub fn is_raw(&self) -> bool {
        self.family() == ElementFamily::Raw
    }

    /// Kinds that may be referred to from span annotations (rather than owned)
    pub fn is_wrefable(&self) -> bool {
        self.properties().wrefable
    }

    /// Does this kind accept inline annotations?
    pub fn allows_annotation(&self) -> bool {
        accepts_family(*self, ElementFamily::InlineAnnotation)
    }

    /// Can corrections be placed inside this kind?
    pub fn allows_correction(&self) -> bool {
        accepts(*self, Self::Correction)
    }

    /// Does this kind reference other elements rather than only owning them?
    pub fn is_cross_referencing(&self) -> bool {
        self.is_span_or_role() || matches!(self, Self::Relation | Self::LinkReference)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.xmltag())
    }
}

impl FromStr for ElementType {
    type Err = FoliaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| {
            FoliaError::XmlFormatError(format!("unknown element: {}", s), "ElementType::from_str")
        })
    }
}

/// Static properties of an element kind
#[derive(Debug, Clone)]
pub struct Properties {
    pub elementtype: ElementType,
    pub xmltag: &'static str,
    pub family: ElementFamily,
    pub annotationtype: AnnotationType,
    pub accepted: Vec<Accept>,
    pub required: Attrib,
    pub optional: Attrib,
    /// Kind specific attribute names, kept verbatim
    pub extra_attributes: &'static [&'static str],
    /// Maximum number of occurrences under a single parent, `None` is unbounded
    pub occurrences: Option<usize>,
    /// Maximum number of occurrences per set under a single parent, `None` is unbounded
    pub occurrences_per_set: Option<usize>,
    /// The delimiter that follows the text of this element, `None` borrows the delimiter of the last child
    pub textdelimiter: Option<&'static str>,
    pub printable: bool,
    pub speakable: bool,
    pub hidden: bool,
    pub wrefable: bool,
    /// For features: the subset name, also usable as attribute shorthand on the parent
    pub subset: Option<&'static str>,
    /// For span annotations: the layer they live in
    pub layer: Option<ElementType>,
}

impl Properties {
    /// All attributes this kind may carry
    pub fn allowed(&self) -> Attrib {
        self.required | self.optional
    }
}

/// Returns the properties for an element kind
pub fn properties(elementtype: ElementType) -> &'static Properties {
    &PROPERTIES[elementtype as usize]
}

/// Does `parent` accept `child` as a direct child?
pub fn accepts(parent: ElementType, child: ElementType) -> bool {
    if child == ElementType::XmlComment {
        return true;
    }
    let family = properties(child).family;
    properties(parent).accepted.iter().any(|a| match a {
        Accept::Kind(k) => *k == child,
        Accept::Family(f) => *f == family,
    })
}

/// Does `parent` accept the entire family?
pub fn accepts_family(parent: ElementType, family: ElementFamily) -> bool {
    properties(parent)
        .accepted
        .iter()
        .any(|a| matches!(a, Accept::Family(f) if *f == family))
}

/// Is the kind accepted wherever the family is accepted?
pub fn is_subkind(elementtype: ElementType, family: ElementFamily) -> bool {
    properties(elementtype).family == family
}

/// Finds a feature kind accepted by `parent` whose subset matches `subset`
pub fn feature_for_subset(parent: ElementType, subset: &str) -> Option<ElementType> {
    properties(parent).accepted.iter().find_map(|a| match a {
        Accept::Kind(k) if k.is_feature() && properties(*k).subset == Some(subset) => Some(*k),
        _ => None,
    })
}

use Accept::{Family as F, Kind as K};
use ElementFamily as EF;
use ElementType as ET;

const STRUCTURE_ATTRIBS: Attrib = Attrib::ID
    .union(Attrib::CLASS)
    .union(Attrib::SET)
    .union(Attrib::ANNOTATOR)
    .union(Attrib::CONFIDENCE)
    .union(Attrib::N)
    .union(Attrib::DATETIME)
    .union(Attrib::SRC)
    .union(Attrib::BEGINTIME)
    .union(Attrib::ENDTIME)
    .union(Attrib::SPEAKER)
    .union(Attrib::TEXTCLASS)
    .union(Attrib::METADATA)
    .union(Attrib::TAG)
    .union(Attrib::PROCESSOR);

const ANNOTATION_ATTRIBS: Attrib = Attrib::ID
    .union(Attrib::SET)
    .union(Attrib::ANNOTATOR)
    .union(Attrib::CONFIDENCE)
    .union(Attrib::N)
    .union(Attrib::DATETIME)
    .union(Attrib::SRC)
    .union(Attrib::BEGINTIME)
    .union(Attrib::ENDTIME)
    .union(Attrib::SPEAKER)
    .union(Attrib::TEXTCLASS)
    .union(Attrib::METADATA)
    .union(Attrib::TAG)
    .union(Attrib::PROCESSOR);

const CONTENT_ATTRIBS: Attrib = Attrib::ID
    .union(Attrib::CLASS)
    .union(Attrib::SET)
    .union(Attrib::OFFSET)
    .union(Attrib::ANNOTATOR)
    .union(Attrib::CONFIDENCE)
    .union(Attrib::DATETIME)
    .union(Attrib::METADATA)
    .union(Attrib::TAG)
    .union(Attrib::PROCESSOR);

const MARKUP_ATTRIBS: Attrib = Attrib::ID
    .union(Attrib::CLASS)
    .union(Attrib::SET)
    .union(Attrib::ANNOTATOR)
    .union(Attrib::CONFIDENCE)
    .union(Attrib::N)
    .union(Attrib::DATETIME)
    .union(Attrib::TEXTCLASS)
    .union(Attrib::METADATA)
    .union(Attrib::TAG)
    .union(Attrib::PROCESSOR);

const LAYER_ATTRIBS: Attrib = Attrib::ID
    .union(Attrib::SET)
    .union(Attrib::ANNOTATOR)
    .union(Attrib::CONFIDENCE)
    .union(Attrib::N)
    .union(Attrib::DATETIME)
    .union(Attrib::TAG)
    .union(Attrib::PROCESSOR);

const CORRECTIONCHILD_ATTRIBS: Attrib = Attrib::ID
    .union(Attrib::ANNOTATOR)
    .union(Attrib::CONFIDENCE)
    .union(Attrib::N)
    .union(Attrib::DATETIME)
    .union(Attrib::PROCESSOR);

/// Children every structural element accepts
const STRUCTURE_COMMON: &[Accept] = &[
    F(EF::InlineAnnotation),
    F(EF::AnnotationLayer),
    K(ET::TextContent),
    K(ET::PhonContent),
    K(ET::Correction),
    K(ET::Alternative),
    K(ET::AlternativeLayers),
    K(ET::Comment),
    K(ET::Description),
    K(ET::Metric),
    K(ET::String),
    K(ET::Relation),
    K(ET::ForeignData),
    K(ET::External),
    K(ET::Feature),
    K(ET::Part),
];

/// Children every annotation accepts
const ANNOTATION_COMMON: &[Accept] = &[
    K(ET::Comment),
    K(ET::Description),
    K(ET::Metric),
    K(ET::ForeignData),
    K(ET::Feature),
];

/// Token references accepted by spans
const TOKENS: &[Accept] = &[
    K(ET::Word),
    K(ET::Hiddenword),
    K(ET::Morpheme),
    K(ET::Phoneme),
];

/// Children of anything that contains running text structure
const BLOCK: &[Accept] = &[
    K(ET::Paragraph),
    K(ET::Sentence),
    K(ET::Word),
    K(ET::Head),
    K(ET::List),
    K(ET::Figure),
    K(ET::Table),
    K(ET::Quote),
    K(ET::Event),
    K(ET::Note),
    K(ET::Reference),
    K(ET::Gap),
    K(ET::LineBreak),
    K(ET::Whitespace),
    K(ET::Example),
    K(ET::Entry),
];

/// Children of text-level structure (below sentences)
const INLINE_STRUCTURE: &[Accept] = &[
    K(ET::Word),
    K(ET::Hiddenword),
    K(ET::Quote),
    K(ET::Note),
    K(ET::Reference),
    K(ET::Gap),
    K(ET::LineBreak),
    K(ET::Whitespace),
    K(ET::Event),
];

/// Anything that can be placed under correction
const CORRECTABLE: &[Accept] = &[
    F(EF::Structure),
    F(EF::Subtoken),
    F(EF::InlineAnnotation),
    F(EF::SpanAnnotation),
    F(EF::SpanRole),
    K(ET::TextContent),
    K(ET::PhonContent),
    K(ET::Correction),
    K(ET::Comment),
    K(ET::Description),
    K(ET::Metric),
    K(ET::String),
];

fn concat(parts: &[&[Accept]]) -> Vec<Accept> {
    parts.concat()
}

fn base(elementtype: ElementType, family: ElementFamily, annotationtype: AnnotationType) -> Properties {
    Properties {
        elementtype,
        xmltag: elementtype.xmltag(),
        family,
        annotationtype,
        accepted: Vec::new(),
        required: Attrib::empty(),
        optional: Attrib::empty(),
        extra_attributes: &[],
        occurrences: None,
        occurrences_per_set: None,
        textdelimiter: None,
        printable: false,
        speakable: false,
        hidden: false,
        wrefable: false,
        subset: None,
        layer: None,
    }
}

fn structure(
    elementtype: ElementType,
    annotationtype: AnnotationType,
    accepted: &[Accept],
    textdelimiter: Option<&'static str>,
) -> Properties {
    Properties {
        accepted: concat(&[STRUCTURE_COMMON, accepted]),
        optional: STRUCTURE_ATTRIBS,
        textdelimiter,
        printable: true,
        speakable: true,
        ..base(elementtype, EF::Structure, annotationtype)
    }
}

fn inline(elementtype: ElementType, annotationtype: AnnotationType, accepted: &[Accept]) -> Properties {
    Properties {
        accepted: concat(&[ANNOTATION_COMMON, accepted]),
        required: Attrib::CLASS,
        optional: ANNOTATION_ATTRIBS,
        occurrences_per_set: Some(1),
        ..base(elementtype, EF::InlineAnnotation, annotationtype)
    }
}

fn span(
    elementtype: ElementType,
    annotationtype: AnnotationType,
    layer: Option<ElementType>,
    accepted: &[Accept],
) -> Properties {
    Properties {
        accepted: concat(&[ANNOTATION_COMMON, TOKENS, accepted]),
        optional: ANNOTATION_ATTRIBS | Attrib::CLASS,
        layer,
        ..base(elementtype, EF::SpanAnnotation, annotationtype)
    }
}

fn role(elementtype: ElementType, accepted: &[Accept]) -> Properties {
    Properties {
        accepted: concat(&[ANNOTATION_COMMON, TOKENS, accepted]),
        optional: Attrib::ID | Attrib::CLASS | Attrib::SET | Attrib::TEXTCLASS | Attrib::N,
        ..base(elementtype, EF::SpanRole, AnnotationType::NoAnnotation)
    }
}

fn layer(elementtype: ElementType, annotationtype: AnnotationType, spantypes: &[Accept]) -> Properties {
    Properties {
        accepted: concat(&[
            &[
                K(ET::Correction),
                K(ET::Comment),
                K(ET::Description),
                K(ET::ForeignData),
            ],
            spantypes,
        ]),
        optional: LAYER_ATTRIBS,
        ..base(elementtype, EF::AnnotationLayer, annotationtype)
    }
}

fn feature(elementtype: ElementType, subset: &'static str) -> Properties {
    Properties {
        required: Attrib::CLASS,
        subset: Some(subset),
        ..base(elementtype, EF::Feature, AnnotationType::NoAnnotation)
    }
}

fn markup(elementtype: ElementType, annotationtype: AnnotationType) -> Properties {
    Properties {
        accepted: vec![F(EF::TextMarkup), K(ET::XmlText), K(ET::LineBreak)],
        optional: MARKUP_ATTRIBS,
        printable: true,
        textdelimiter: Some(""),
        ..base(elementtype, EF::TextMarkup, annotationtype)
    }
}

fn higherorder(elementtype: ElementType, annotationtype: AnnotationType, accepted: &[Accept]) -> Properties {
    Properties {
        accepted: accepted.to_vec(),
        ..base(elementtype, EF::HigherOrder, annotationtype)
    }
}

fn correctionchild(elementtype: ElementType) -> Properties {
    Properties {
        accepted: CORRECTABLE.to_vec(),
        optional: CORRECTIONCHILD_ATTRIBS,
        occurrences: Some(1),
        printable: true,
        speakable: true,
        ..base(elementtype, EF::CorrectionChild, AnnotationType::NoAnnotation)
    }
}

fn build(t: ElementType) -> Properties {
    use AnnotationType as AT;
    match t {
        ET::Text => structure(
            t,
            AT::NoAnnotation,
            &[
                &[K(ET::Division), K(ET::Utterance), K(ET::Part)][..],
                BLOCK,
            ]
            .concat(),
            Some("\n\n"),
        ),
        ET::Speech => structure(
            t,
            AT::NoAnnotation,
            &[
                &[K(ET::Division), K(ET::Utterance), K(ET::Part)][..],
                BLOCK,
            ]
            .concat(),
            Some("\n\n"),
        ),
        ET::Division => structure(
            t,
            AT::Division,
            &[&[K(ET::Division), K(ET::Utterance)][..], BLOCK].concat(),
            Some("\n\n"),
        ),
        ET::Paragraph => structure(t, AT::Paragraph, BLOCK, Some("\n\n")),
        ET::Head => structure(
            t,
            AT::Head,
            &[&[K(ET::Sentence), K(ET::Paragraph)][..], INLINE_STRUCTURE].concat(),
            Some("\n\n"),
        ),
        ET::Sentence => structure(t, AT::Sentence, INLINE_STRUCTURE, Some(" ")),
        ET::Word => Properties {
            accepted: vec![
                F(EF::InlineAnnotation),
                K(ET::MorphologyLayer),
                K(ET::PhonologyLayer),
                K(ET::TextContent),
                K(ET::PhonContent),
                K(ET::Correction),
                K(ET::Alternative),
                K(ET::AlternativeLayers),
                K(ET::Comment),
                K(ET::Description),
                K(ET::Metric),
                K(ET::String),
                K(ET::Relation),
                K(ET::Reference),
                K(ET::ForeignData),
                K(ET::External),
                K(ET::Feature),
            ],
            optional: STRUCTURE_ATTRIBS | Attrib::SPACE,
            textdelimiter: Some(" "),
            printable: true,
            speakable: true,
            wrefable: true,
            ..base(t, EF::Structure, AT::Token)
        },
        ET::Hiddenword => Properties {
            accepted: vec![
                F(EF::InlineAnnotation),
                K(ET::MorphologyLayer),
                K(ET::PhonologyLayer),
                K(ET::TextContent),
                K(ET::PhonContent),
                K(ET::Correction),
                K(ET::Comment),
                K(ET::Description),
                K(ET::Feature),
            ],
            optional: STRUCTURE_ATTRIBS | Attrib::SPACE,
            textdelimiter: Some(" "),
            hidden: true,
            wrefable: true,
            ..base(t, EF::Structure, AT::Hiddentoken)
        },
        ET::Part => structure(
            t,
            AT::Part,
            &[&[K(ET::Sentence), K(ET::Paragraph)][..], INLINE_STRUCTURE].concat(),
            None,
        ),
        ET::List => structure(
            t,
            AT::List,
            &[
                K(ET::ListItem),
                K(ET::Label),
                K(ET::Caption),
                K(ET::Note),
                K(ET::Reference),
                K(ET::LineBreak),
            ],
            Some("\n\n"),
        ),
        ET::ListItem => structure(
            t,
            AT::List,
            &[&[K(ET::List), K(ET::Label)][..], BLOCK].concat(),
            Some("\n"),
        ),
        ET::Label => structure(t, AT::List, INLINE_STRUCTURE, Some("\t")),
        ET::Figure => Properties {
            occurrences: None,
            ..structure(t, AT::Figure, &[K(ET::Caption)], Some("\n\n"))
        },
        ET::Caption => Properties {
            occurrences: Some(1),
            ..structure(
                t,
                AT::Figure,
                &[&[K(ET::Sentence), K(ET::Paragraph)][..], INLINE_STRUCTURE].concat(),
                Some("\n"),
            )
        },
        ET::Table => structure(t, AT::Table, &[K(ET::TableHead), K(ET::Row)], Some("\n\n")),
        ET::TableHead => structure(t, AT::Table, &[K(ET::Row)], Some("\n")),
        ET::Row => structure(t, AT::Table, &[K(ET::Cell)], Some("\n")),
        ET::Cell => structure(t, AT::Table, BLOCK, Some(" | ")),
        ET::Quote => structure(
            t,
            AT::Quote,
            &[
                &[K(ET::Division), K(ET::Paragraph), K(ET::Sentence)][..],
                INLINE_STRUCTURE,
            ]
            .concat(),
            Some(" "),
        ),
        ET::Event => structure(
            t,
            AT::Event,
            &[
                &[
                    K(ET::Utterance),
                    K(ET::ActorFeature),
                    K(ET::BegindatetimeFeature),
                    K(ET::EnddatetimeFeature),
                ][..],
                BLOCK,
            ]
            .concat(),
            Some("\n\n"),
        ),
        ET::Utterance => structure(
            t,
            AT::Utterance,
            &[&[K(ET::Sentence)][..], INLINE_STRUCTURE].concat(),
            Some(" "),
        ),
        ET::Entry => structure(
            t,
            AT::Entry,
            &[
                K(ET::Term),
                K(ET::Definition),
                K(ET::Example),
                K(ET::Note),
            ],
            Some("\n\n"),
        ),
        ET::Term => structure(t, AT::Term, BLOCK, Some("\n\n")),
        ET::Definition => structure(t, AT::Definition, BLOCK, Some("\n\n")),
        ET::Example => structure(t, AT::Example, BLOCK, Some("\n\n")),
        ET::Note => structure(t, AT::Note, BLOCK, Some("\n\n")),
        ET::Reference => Properties {
            extra_attributes: &["type", "format"],
            ..structure(
                t,
                AT::Reference,
                &[K(ET::Sentence), K(ET::Word), K(ET::LineBreak), K(ET::Whitespace)],
                Some(" "),
            )
        },
        ET::LineBreak => Properties {
            accepted: vec![K(ET::Comment), K(ET::Description)],
            optional: Attrib::ID | Attrib::CLASS | Attrib::SET | Attrib::N | Attrib::TAG,
            extra_attributes: &["linenr", "pagenr", "newpage"],
            textdelimiter: Some(""),
            ..base(t, EF::Structure, AT::LineBreak)
        },
        ET::Whitespace => Properties {
            accepted: vec![K(ET::Comment), K(ET::Description)],
            optional: Attrib::ID | Attrib::CLASS | Attrib::SET | Attrib::N | Attrib::TAG,
            textdelimiter: Some(""),
            ..base(t, EF::Structure, AT::Whitespace)
        },
        ET::Gap => Properties {
            accepted: vec![
                K(ET::GapContent),
                K(ET::Description),
                K(ET::Comment),
                K(ET::Part),
            ],
            optional: STRUCTURE_ATTRIBS,
            textdelimiter: Some(" "),
            ..base(t, EF::Structure, AT::Gap)
        },
        ET::Morpheme | ET::Phoneme => Properties {
            accepted: vec![
                F(EF::InlineAnnotation),
                K(ET::TextContent),
                K(ET::PhonContent),
                K(t),
                K(ET::Correction),
                K(ET::Alternative),
                K(ET::Comment),
                K(ET::Description),
                K(ET::Metric),
                K(ET::ForeignData),
                K(ET::Feature),
                K(ET::FunctionFeature),
            ],
            optional: STRUCTURE_ATTRIBS,
            textdelimiter: Some(""),
            printable: true,
            speakable: true,
            wrefable: true,
            ..base(
                t,
                EF::Subtoken,
                if t == ET::Morpheme {
                    AT::Morphological
                } else {
                    AT::Phonological
                },
            )
        },
        ET::TextContent => Properties {
            accepted: vec![F(EF::TextMarkup), K(ET::XmlText), K(ET::LineBreak)],
            optional: CONTENT_ATTRIBS,
            printable: true,
            textdelimiter: Some(""),
            ..base(t, EF::Content, AT::Text)
        },
        ET::PhonContent => Properties {
            accepted: vec![K(ET::XmlText)],
            optional: CONTENT_ATTRIBS,
            speakable: true,
            textdelimiter: Some(""),
            ..base(t, EF::Content, AT::Phon)
        },
        ET::GapContent => Properties {
            accepted: vec![K(ET::XmlText)],
            occurrences: Some(1),
            ..base(t, EF::Content, AT::NoAnnotation)
        },
        ET::TextMarkupString => markup(t, AT::String),
        ET::TextMarkupGap => markup(t, AT::Gap),
        ET::TextMarkupCorrection => Properties {
            extra_attributes: &["original"],
            ..markup(t, AT::Correction)
        },
        ET::TextMarkupError => markup(t, AT::ErrorDetection),
        ET::TextMarkupStyle => Properties {
            accepted: vec![
                F(EF::TextMarkup),
                K(ET::XmlText),
                K(ET::LineBreak),
                K(ET::StyleFeature),
                K(ET::FontFeature),
                K(ET::SizeFeature),
            ],
            ..markup(t, AT::Style)
        },
        ET::TextMarkupHSpace => Properties {
            accepted: Vec::new(),
            ..markup(t, AT::Whitespace)
        },
        ET::TextMarkupLanguage => markup(t, AT::Lang),
        ET::TextMarkupReference => Properties {
            extra_attributes: &["id", "type", "format"],
            ..markup(t, AT::Reference)
        },
        ET::TextMarkupHyphenation => Properties {
            accepted: Vec::new(),
            ..markup(t, AT::Hyphenation)
        },
        ET::PosAnnotation => inline(t, AT::Pos, &[K(ET::HeadFeature)]),
        ET::LemmaAnnotation => inline(t, AT::Lemma, &[]),
        ET::DomainAnnotation => inline(t, AT::Domain, &[]),
        ET::SenseAnnotation => inline(t, AT::Sense, &[K(ET::SynsetFeature)]),
        ET::SubjectivityAnnotation => inline(t, AT::Subjectivity, &[]),
        ET::ErrorDetection => Properties {
            occurrences_per_set: None,
            ..inline(t, AT::ErrorDetection, &[])
        },
        ET::LangAnnotation => inline(t, AT::Lang, &[]),
        ET::Entity => Properties {
            required: Attrib::CLASS,
            ..span(t, AT::Entity, Some(ET::EntitiesLayer), &[])
        },
        ET::Chunk => span(t, AT::Chunking, Some(ET::ChunkingLayer), &[]),
        ET::SyntacticUnit => span(
            t,
            AT::Syntax,
            Some(ET::SyntaxLayer),
            &[K(ET::SyntacticUnit), K(ET::FunctionFeature)],
        ),
        ET::Dependency => span(
            t,
            AT::Dependency,
            Some(ET::DependenciesLayer),
            &[K(ET::Headspan), K(ET::DependencyDependent)],
        ),
        ET::CoreferenceChain => span(
            t,
            AT::Coreference,
            Some(ET::CoreferenceLayer),
            &[K(ET::CoreferenceLink)],
        ),
        ET::CoreferenceLink => span(
            t,
            AT::NoAnnotation,
            None,
            &[K(ET::Headspan), K(ET::TimeFeature), K(ET::LevelFeature)],
        ),
        ET::SemanticRole => span(
            t,
            AT::Semrole,
            Some(ET::SemanticRolesLayer),
            &[K(ET::Headspan)],
        ),
        ET::Predicate => span(
            t,
            AT::Predicate,
            Some(ET::SemanticRolesLayer),
            &[K(ET::SemanticRole)],
        ),
        ET::Sentiment => span(
            t,
            AT::Sentiment,
            Some(ET::SentimentLayer),
            &[
                K(ET::Headspan),
                K(ET::Source),
                K(ET::Target),
                K(ET::Polarity),
                K(ET::Strength),
            ],
        ),
        ET::Statement => span(
            t,
            AT::Statement,
            Some(ET::StatementLayer),
            &[K(ET::Headspan), K(ET::Source), K(ET::StatementRelation)],
        ),
        ET::Observation => span(t, AT::Observation, Some(ET::ObservationLayer), &[]),
        ET::Modality => span(
            t,
            AT::Modality,
            Some(ET::ModalitiesLayer),
            &[K(ET::Headspan), K(ET::Scope), K(ET::Source), K(ET::Target)],
        ),
        ET::TimeSegment => span(
            t,
            AT::Timesegment,
            Some(ET::TimingLayer),
            &[
                K(ET::ActorFeature),
                K(ET::BegindatetimeFeature),
                K(ET::EnddatetimeFeature),
            ],
        ),
        ET::SpanRelation => span(
            t,
            AT::Spanrelation,
            Some(ET::SpanRelationLayer),
            &[K(ET::Relation)],
        ),
        ET::Headspan => Properties {
            occurrences: Some(1),
            ..role(t, &[])
        },
        ET::DependencyDependent => role(t, &[]),
        ET::Source | ET::Target | ET::Polarity | ET::Strength => role(t, &[]),
        ET::Scope => role(t, &[K(ET::Source), K(ET::Target)]),
        ET::StatementRelation => role(t, &[]),
        ET::LinkReference => Properties {
            accepted: Vec::new(),
            optional: Attrib::empty(),
            extra_attributes: &["id", "type", "t"],
            ..base(t, EF::SpanRole, AnnotationType::NoAnnotation)
        },
        ET::EntitiesLayer => layer(t, AT::Entity, &[K(ET::Entity)]),
        ET::ChunkingLayer => layer(t, AT::Chunking, &[K(ET::Chunk)]),
        ET::SyntaxLayer => layer(t, AT::Syntax, &[K(ET::SyntacticUnit)]),
        ET::DependenciesLayer => layer(t, AT::Dependency, &[K(ET::Dependency)]),
        ET::CoreferenceLayer => layer(t, AT::Coreference, &[K(ET::CoreferenceChain)]),
        ET::SemanticRolesLayer => {
            layer(t, AT::Semrole, &[K(ET::SemanticRole), K(ET::Predicate)])
        }
        ET::SentimentLayer => layer(t, AT::Sentiment, &[K(ET::Sentiment)]),
        ET::StatementLayer => layer(t, AT::Statement, &[K(ET::Statement)]),
        ET::ObservationLayer => layer(t, AT::Observation, &[K(ET::Observation)]),
        ET::ModalitiesLayer => layer(t, AT::Modality, &[K(ET::Modality)]),
        ET::TimingLayer => layer(t, AT::Timesegment, &[K(ET::TimeSegment)]),
        ET::SpanRelationLayer => layer(t, AT::Spanrelation, &[K(ET::SpanRelation)]),
        ET::MorphologyLayer => layer(t, AT::Morphological, &[K(ET::Morpheme)]),
        ET::PhonologyLayer => layer(t, AT::Phonological, &[K(ET::Phoneme)]),
        ET::Feature => Properties {
            required: Attrib::CLASS | Attrib::SUBSET,
            subset: None,
            ..feature(t, "")
        },
        ET::SynsetFeature => feature(t, "synset"),
        ET::ActorFeature => feature(t, "actor"),
        ET::HeadFeature => feature(t, "head"),
        ET::ValueFeature => feature(t, "value"),
        ET::TimeFeature => feature(t, "time"),
        ET::LevelFeature => feature(t, "level"),
        ET::FunctionFeature => feature(t, "function"),
        ET::BegindatetimeFeature => feature(t, "begindatetime"),
        ET::EnddatetimeFeature => feature(t, "enddatetime"),
        ET::StyleFeature => feature(t, "style"),
        ET::FontFeature => feature(t, "font"),
        ET::SizeFeature => feature(t, "size"),
        ET::Correction => Properties {
            accepted: vec![
                K(ET::New),
                K(ET::Original),
                K(ET::Current),
                K(ET::Suggestion),
                K(ET::ErrorDetection),
                K(ET::Comment),
                K(ET::Description),
                K(ET::Metric),
                K(ET::ForeignData),
                K(ET::Feature),
            ],
            optional: ANNOTATION_ATTRIBS | Attrib::CLASS,
            printable: true,
            speakable: true,
            ..base(t, EF::HigherOrder, AT::Correction)
        },
        ET::Alternative => Properties {
            optional: ANNOTATION_ATTRIBS,
            ..higherorder(
                t,
                AT::Alternative,
                &[
                    F(EF::InlineAnnotation),
                    K(ET::TextContent),
                    K(ET::PhonContent),
                    K(ET::Comment),
                    K(ET::Description),
                ],
            )
        },
        ET::AlternativeLayers => Properties {
            optional: ANNOTATION_ATTRIBS,
            ..higherorder(
                t,
                AT::Alternative,
                &[F(EF::AnnotationLayer), K(ET::Comment), K(ET::Description)],
            )
        },
        ET::Comment => Properties {
            optional: Attrib::ID
                | Attrib::ANNOTATOR
                | Attrib::DATETIME
                | Attrib::N
                | Attrib::PROCESSOR
                | Attrib::METADATA,
            ..higherorder(t, AT::Comment, &[K(ET::XmlText)])
        },
        ET::Description => Properties {
            optional: Attrib::ID
                | Attrib::ANNOTATOR
                | Attrib::DATETIME
                | Attrib::N
                | Attrib::PROCESSOR,
            occurrences: Some(1),
            ..higherorder(t, AT::Description, &[K(ET::XmlText)])
        },
        ET::Metric => Properties {
            required: Attrib::CLASS,
            optional: ANNOTATION_ATTRIBS,
            ..higherorder(
                t,
                AT::Metric,
                &[
                    K(ET::ValueFeature),
                    K(ET::Feature),
                    K(ET::Comment),
                    K(ET::Description),
                    K(ET::ForeignData),
                ],
            )
        },
        ET::String => Properties {
            optional: ANNOTATION_ATTRIBS | Attrib::CLASS,
            printable: true,
            speakable: true,
            ..higherorder(
                t,
                AT::String,
                &[
                    F(EF::InlineAnnotation),
                    K(ET::TextContent),
                    K(ET::PhonContent),
                    K(ET::Correction),
                    K(ET::Relation),
                    K(ET::Metric),
                    K(ET::Comment),
                    K(ET::Description),
                    K(ET::Feature),
                ],
            )
        },
        ET::Relation => Properties {
            optional: ANNOTATION_ATTRIBS | Attrib::CLASS,
            extra_attributes: &["format"],
            ..higherorder(
                t,
                AT::Relation,
                &[
                    K(ET::LinkReference),
                    K(ET::Comment),
                    K(ET::Description),
                    K(ET::Metric),
                    K(ET::Feature),
                    K(ET::ForeignData),
                    K(ET::Word),
                    K(ET::Morpheme),
                    K(ET::Phoneme),
                ],
            )
        },
        ET::ForeignData => higherorder(t, AT::NoAnnotation, &[]),
        ET::External => Properties {
            optional: Attrib::SRC,
            extra_attributes: &["include"],
            ..higherorder(t, AT::NoAnnotation, &[])
        },
        ET::New | ET::Original | ET::Current => correctionchild(t),
        ET::Suggestion => Properties {
            occurrences: None,
            printable: false,
            speakable: false,
            extra_attributes: &["split", "merge"],
            ..correctionchild(t)
        },
        ET::XmlText => Properties {
            printable: true,
            speakable: true,
            ..base(t, EF::Raw, AT::NoAnnotation)
        },
        ET::XmlComment => base(t, EF::Raw, AT::NoAnnotation),
    }
}
