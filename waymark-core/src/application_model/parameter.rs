use super::properties::PropertyBag;
use super::{ActionId, ControllerId};
use crate::discovery::TypeRef;
use crate::metadata::{Metadata, MetadataList};
use serde::Serialize;

/// Where a bound value is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingSource {
    Path,
    Query,
    Body,
    Header,
    Form,
    FormFile,
    Services,
    Custom,
    Special,
    ModelBinding,
}

impl BindingSource {
    /// Greedy sources read the whole value themselves and never combine
    /// with a model-name prefix.
    pub fn is_greedy(self) -> bool {
        matches!(
            self,
            BindingSource::Body
                | BindingSource::FormFile
                | BindingSource::Services
                | BindingSource::Custom
                | BindingSource::Special
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BindingSource::Path => "Path",
            BindingSource::Query => "Query",
            BindingSource::Body => "Body",
            BindingSource::Header => "Header",
            BindingSource::Form => "Form",
            BindingSource::FormFile => "FormFile",
            BindingSource::Services => "Services",
            BindingSource::Custom => "Custom",
            BindingSource::Special => "Special",
            BindingSource::ModelBinding => "ModelBinding",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BindingInfo {
    pub binding_source: Option<BindingSource>,
    pub binder_model_name: Option<String>,
}

impl BindingInfo {
    /// Binding info declared through metadata, if any.
    pub fn from_metadata(metadata: &MetadataList) -> Option<Self> {
        let mut info = BindingInfo::default();
        let mut found = false;
        for item in metadata {
            if let Metadata::BindingSource { source, name } = item {
                found = true;
                if info.binding_source.is_none() {
                    info.binding_source = Some(*source);
                }
                if info.binder_model_name.is_none() {
                    info.binder_model_name = name.clone();
                }
            }
        }
        found.then_some(info)
    }
}

#[derive(Clone, Debug)]
pub struct ParameterModel {
    pub action: ActionId,
    pub parameter_name: String,
    pub ty: TypeRef,
    pub metadata: MetadataList,
    pub binding_info: Option<BindingInfo>,
    pub is_params: bool,
    pub properties: PropertyBag,
}

impl ParameterModel {
    pub fn binding_source(&self) -> Option<BindingSource> {
        self.binding_info.as_ref().and_then(|b| b.binding_source)
    }
}

/// A controller property participating in model binding.
#[derive(Clone, Debug)]
pub struct PropertyModel {
    pub controller: ControllerId,
    pub property_name: String,
    pub ty: TypeRef,
    pub metadata: MetadataList,
    pub binding_info: Option<BindingInfo>,
    pub properties: PropertyBag,
}

impl PropertyModel {
    pub fn binding_source(&self) -> Option<BindingSource> {
        self.binding_info.as_ref().and_then(|b| b.binding_source)
    }
}
