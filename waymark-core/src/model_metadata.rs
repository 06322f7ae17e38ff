//! Binding-relevant facts about types.

use crate::application_model::BindingSource;
use crate::discovery::{TypeKind, TypeRef};

/// Answers the questions binding-source inference asks about a type.
pub trait ModelMetadataProvider: Send + Sync {
    /// Bound property by property rather than converted from a string.
    fn is_complex_type(&self, ty: &TypeRef) -> bool;

    fn is_collection_type(&self, ty: &TypeRef) -> bool;

    fn element_type<'a>(&self, ty: &'a TypeRef) -> Option<&'a TypeRef>;

    /// Source implied by the type alone, e.g. uploads bind from form files.
    fn binding_source(&self, ty: &TypeRef) -> Option<BindingSource>;
}

/// Reads everything from [`TypeKind`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultModelMetadataProvider;

impl ModelMetadataProvider for DefaultModelMetadataProvider {
    fn is_complex_type(&self, ty: &TypeRef) -> bool {
        !matches!(ty.kind, TypeKind::Simple)
    }

    fn is_collection_type(&self, ty: &TypeRef) -> bool {
        matches!(
            ty.kind,
            TypeKind::Collection(_) | TypeKind::FormFileCollection
        )
    }

    fn element_type<'a>(&self, ty: &'a TypeRef) -> Option<&'a TypeRef> {
        match &ty.kind {
            TypeKind::Collection(element) => Some(element),
            _ => None,
        }
    }

    fn binding_source(&self, ty: &TypeRef) -> Option<BindingSource> {
        match &ty.kind {
            TypeKind::FormFile | TypeKind::FormFileCollection => Some(BindingSource::FormFile),
            TypeKind::Collection(element)
                if matches!(element.kind, TypeKind::FormFile) =>
            {
                Some(BindingSource::FormFile)
            }
            _ => None,
        }
    }
}
