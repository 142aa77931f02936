//! Vocabulary IRIs used by the annotation and LDP layers
//!
//! These must match the published namespaces exactly; they are compared as
//! plain strings against parsed graphs.

/// RDF syntax namespace
pub mod rdf {
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

/// XML Schema datatypes
pub mod xsd {
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
}

/// Open Annotation
pub mod oa {
    pub const NS: &str = "http://www.w3.org/ns/oa#";
    pub const ANNOTATION: &str = "http://www.w3.org/ns/oa#Annotation";
    pub const HAS_BODY: &str = "http://www.w3.org/ns/oa#hasBody";
    pub const HAS_TARGET: &str = "http://www.w3.org/ns/oa#hasTarget";
    pub const MOTIVATED_BY: &str = "http://www.w3.org/ns/oa#motivatedBy";
    pub const COMMENTING: &str = "http://www.w3.org/ns/oa#commenting";
    pub const BOOKMARKING: &str = "http://www.w3.org/ns/oa#bookmarking";
    pub const SPECIFIC_RESOURCE: &str = "http://www.w3.org/ns/oa#SpecificResource";
    pub const HAS_SOURCE: &str = "http://www.w3.org/ns/oa#hasSource";
    pub const HAS_SELECTOR: &str = "http://www.w3.org/ns/oa#hasSelector";
}

/// Linked Data Platform
pub mod ldp {
    pub const NS: &str = "http://www.w3.org/ns/ldp#";
    pub const CONTAINER: &str = "http://www.w3.org/ns/ldp#Container";
    pub const BASIC_CONTAINER: &str = "http://www.w3.org/ns/ldp#BasicContainer";
    pub const DIRECT_CONTAINER: &str = "http://www.w3.org/ns/ldp#DirectContainer";
    pub const RDF_SOURCE: &str = "http://www.w3.org/ns/ldp#RDFSource";
    pub const HAS_MEMBER_RELATION: &str = "http://www.w3.org/ns/ldp#hasMemberRelation";
    pub const MEMBERSHIP_RESOURCE: &str = "http://www.w3.org/ns/ldp#membershipResource";
    pub const CONTAINS: &str = "http://www.w3.org/ns/ldp#contains";
}

/// Representing Content in RDF
pub mod cnt {
    pub const NS: &str = "http://www.w3.org/2011/content#";
    pub const CONTENT_AS_TEXT: &str = "http://www.w3.org/2011/content#ContentAsText";
    pub const CHARS: &str = "http://www.w3.org/2011/content#chars";
}

/// Dublin Core elements
pub mod dc {
    pub const NS: &str = "http://purl.org/dc/elements/1.1/";
    pub const FORMAT: &str = "http://purl.org/dc/elements/1.1/format";
}

/// DCMI type vocabulary
pub mod dctypes {
    pub const NS: &str = "http://purl.org/dc/dcmitype/";
    pub const TEXT: &str = "http://purl.org/dc/dcmitype/Text";
}

/// Namespaces of statements an LDP repository manages on its own
pub mod repository {
    pub const FEDORA_NS: &str = "http://fedora.info/definitions/v4/repository#";
    pub const FEDORA_CONFIG_NS: &str = "http://fedora.info/definitions/v4/config#";
    pub const JCR_NS: &str = "http://www.jcp.org/jcr/1.0";
    pub const JCR_NT_NS: &str = "http://www.jcp.org/jcr/nt/1.0";
    pub const JCR_MIX_NS: &str = "http://www.jcp.org/jcr/mix/1.0";

    /// Every server-managed namespace, LDP included
    pub const NAMESPACES: &[&str] = &[
        super::ldp::NS,
        FEDORA_NS,
        FEDORA_CONFIG_NS,
        JCR_NS,
        JCR_NT_NS,
        JCR_MIX_NS,
    ];
}

/// Deployment-specific terms. The predicate linking an LDP target resource
/// to the annotated IRI is configurable; this is the default used by
/// existing stores.
pub mod deployment {
    pub const EXTERNAL_REFERENCE: &str = "http://triannon.stanford.edu/ns/externalReference";
}
