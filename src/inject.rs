//! Legacy field injection
//!
//! A thin wrapper over [`Container::resolve`]: for an already-built object
//! whose descriptor declares injectable fields, resolve each field's
//! (type, qualifier) pair and assign the result. Provided for code migrating
//! from field-injected designs; constructor injection is the primary path.

use crate::metadata::TypeToken;
use crate::{Container, DiError, Result};
use std::any::Any;

#[cfg(feature = "logging")]
use tracing::trace;

impl Container {
    /// Inject every declared field of `target`.
    ///
    /// Fields are declared on the type's descriptor via
    /// [`field`](crate::DescriptorBuilder::field) /
    /// [`named_field`](crate::DescriptorBuilder::named_field). A type with
    /// no descriptor or no declared fields is left untouched. Any
    /// resolution failure is wrapped to name the enclosing type and no
    /// further fields are assigned.
    pub fn inject_fields<T: Send + Sync + 'static>(&self, target: &mut T) -> Result<&Self> {
        let token = TypeToken::of::<T>();
        let Some(descriptor) = self.metadata().descriptor(token) else {
            return Ok(self);
        };

        for field in descriptor.fields() {
            #[cfg(feature = "logging")]
            trace!(
                target: "wirebox",
                enclosing = token.name(),
                field = field.name,
                field_type = field.token.name(),
                "Injecting field"
            );

            let value = self
                .resolve_erased(field.token, field.qualifier.as_deref())
                .map_err(|inner| DiError::unmet_dependency(token, inner))?;
            (field.assign)(target as &mut dyn Any, value)?;
        }

        Ok(self)
    }
}
