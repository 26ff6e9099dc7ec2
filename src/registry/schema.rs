//! Declared field mapping for registry payloads.
//!
//! Registry field names are an external, versioned contract. Everything that reads or
//! writes a registry field name goes through a [`RegistrySchema`], so supporting a new
//! registry version means adding a schema, not editing parsing code.

use std::collections::BTreeSet;

use serde_json::Value;

/// Field names and filter conventions for one registry API version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySchema {
    /// Human-readable version label, logged with every search.
    pub version: &'static str,
    /// Top-level array holding search hits.
    pub results_field: &'static str,
    /// Application number (candidate id).
    pub id_field: &'static str,
    /// Dotted path to the verbal element (mark name).
    pub name_path: &'static str,
    /// Nice classes array.
    pub nice_classes_field: &'static str,
    /// Word/figurative classification.
    pub mark_feature_field: &'static str,
    /// Value of `mark_feature_field` for word-only marks.
    pub word_feature_value: &'static str,
    /// Basis field and the value that makes image data more likely, if any.
    pub figurative_basis: Option<(&'static str, &'static str)>,
    /// Sub-field selection requesting image payloads on the detail endpoint.
    pub detail_image_fields: &'static str,
    /// Nodes that directly hold an image object.
    pub image_nodes: &'static [&'static str],
    /// Nodes that hold a list of image-bearing objects.
    pub image_list_nodes: &'static [&'static str],
    /// Keys that may carry base64 image content.
    pub inline_keys: &'static [&'static str],
    /// Keys that may carry an image URL.
    pub url_keys: &'static [&'static str],
    /// Keys that may carry the payload's MIME type.
    pub content_type_keys: &'static [&'static str],
    /// Key of the nested image object inside an image node.
    pub nested_image_key: &'static str,
    /// Path suffix of the thumbnail endpoint, relative to the detail URL.
    pub thumbnail_suffix: &'static str,
    /// Path suffix of the full-size image endpoint, relative to the detail URL.
    pub full_image_suffix: &'static str,
}

impl RegistrySchema {
    /// EUIPO trademark-search API, v1.
    pub const EUIPO_V1: RegistrySchema = RegistrySchema {
        version: "euipo-trademark-search/v1",
        results_field: "trademarks",
        id_field: "applicationNumber",
        name_path: "wordMarkSpecification.verbalElement",
        nice_classes_field: "niceClasses",
        mark_feature_field: "markFeature",
        word_feature_value: "WORD",
        figurative_basis: Some(("markBasis", "EU_TRADEMARK")),
        detail_image_fields: concat!(
            "applicationNumber,markFeature,markBasis,",
            "markImage(content,contentType,imageUrl,imageId,binaryObjectId,viennaClasses,imageFormat),",
            "representation(image(content,contentType,imageUrl,imageId,binaryObjectId)),",
            "representations(image(content,contentType,imageUrl,imageId,binaryObjectId)),",
            "reproductions(image(content,contentType,imageUrl,imageId,binaryObjectId)),",
            "figurativeReproductions(image(content,contentType,imageUrl,imageId,binaryObjectId)),",
            "graphicalRepresentations(image(content,contentType,imageUrl,imageId,binaryObjectId))"
        ),
        image_nodes: &[
            "markImage",
            "representation",
            "figurativeMark",
            "figurativeRepresentation",
            "graphicalRepresentation",
        ],
        image_list_nodes: &[
            "markImageList",
            "images",
            "imageList",
            "representations",
            "reproductions",
            "figurativeReproductions",
            "graphicalRepresentations",
        ],
        inline_keys: &[
            "content",
            "base64",
            "imageBase64",
            "imageContent",
            "data",
            "binary",
            "payload",
        ],
        url_keys: &["url", "uri", "href", "imageUrl", "imageUri", "markImageUri"],
        content_type_keys: &["contentType", "mimeType"],
        nested_image_key: "image",
        thumbnail_suffix: "image/thumbnail",
        full_image_suffix: "image",
    };

    /// Reads the candidate id. Numeric ids are rendered without decoration.
    pub fn id_of(&self, record: &Value) -> Option<String> {
        match record.get(self.id_field)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Reads the verbal element at [`Self::name_path`].
    pub fn name_of(&self, record: &Value) -> Option<String> {
        let mut node = record;
        for segment in self.name_path.split('.') {
            node = node.get(segment)?;
        }
        node.as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Reads Nice classes, accepting numbers or strings.
    pub fn nice_classes_of(&self, record: &Value) -> BTreeSet<String> {
        record
            .get(self.nice_classes_field)
            .and_then(Value::as_array)
            .map(|classes| {
                classes
                    .iter()
                    .filter_map(|c| match c {
                        Value::Number(n) => Some(n.to_string()),
                        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reads the mark feature, upper-cased.
    pub fn mark_feature_of(&self, record: &Value) -> Option<String> {
        record
            .get(self.mark_feature_field)
            .and_then(Value::as_str)
            .map(str::to_uppercase)
    }
}

impl Default for RegistrySchema {
    fn default() -> Self {
        Self::EUIPO_V1
    }
}
