//! Field accessor resolution
//!
//! Decides, once per field and direction, the cheapest working access path:
//!
//! 1. Probe the owner for a field with the declared name (non-failing).
//! 2. On a hit, try the fast lookup by name and type. Any failure there is
//!    swallowed and only triggers the fallback.
//! 3. Fallback: unreflect the field found by name or, when the name is not
//!    known to this runtime, the field matched by type and static-ness.
//!
//! Type-based matching picks the first declared candidate when several fields
//! share the declared type and static-ness. This is a heuristic: two fields of
//! the same type cannot be told apart once their names are gone.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::descriptor::FieldDescriptor;
use crate::error::{AccessError, AccessResult, LookupError};
use crate::handle::{AccessDirection, HandleKind, RawHandle, ResolutionPath, ResolvedHandle};
use crate::lookup::{FieldRef, Lookup, RuntimeClass, TypeResolver};

/// Resolver tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Attempt the fast lookup before falling back (default: true)
    pub fast_path: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self { fast_path: true }
    }
}

/// Builds [`ResolvedHandle`]s from the runtime's capabilities
pub struct FieldAccessResolver {
    types: Arc<dyn TypeResolver>,
    lookup: Arc<dyn Lookup>,
    options: ResolverOptions,
}

impl FieldAccessResolver {
    /// Create a resolver with default options
    pub fn new(types: Arc<dyn TypeResolver>, lookup: Arc<dyn Lookup>) -> Self {
        Self::with_options(types, lookup, ResolverOptions::default())
    }

    /// Create a resolver with explicit options
    pub fn with_options(
        types: Arc<dyn TypeResolver>,
        lookup: Arc<dyn Lookup>,
        options: ResolverOptions,
    ) -> Self {
        Self {
            types,
            lookup,
            options,
        }
    }

    /// Resolver options
    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve a handle for one field and direction
    pub fn resolve(
        &self,
        field: &FieldDescriptor,
        direction: AccessDirection,
    ) -> AccessResult<ResolvedHandle> {
        let class = self
            .types
            .resolve_class(field.owner())
            .ok_or_else(|| AccessError::OwnerNotFound {
                owner: field.owner().to_string(),
            })?;

        let probed = class.find_field(field.name());
        trace!(
            owner = field.owner(),
            field = field.name(),
            found = probed.is_some(),
            "field probe"
        );

        let (raw, path) = match probed {
            Some(by_name) if self.options.fast_path => match self.fast_path(&class, field, direction) {
                Ok(raw) => (raw, ResolutionPath::Direct),
                Err(err) => {
                    debug!(
                        owner = field.owner(),
                        field = field.name(),
                        %direction,
                        error = %err,
                        "fast lookup failed, falling back to reflection"
                    );
                    self.fallback(&class, field, Some(by_name), direction)?
                }
            },
            probed => self.fallback(&class, field, probed, direction)?,
        };

        debug!(
            owner = field.owner(),
            field = field.name(),
            %direction,
            ?path,
            "resolved field handle"
        );
        Ok(ResolvedHandle::generic(direction, raw, path))
    }

    fn fast_path(
        &self,
        class: &Arc<dyn RuntimeClass>,
        field: &FieldDescriptor,
        direction: AccessDirection,
    ) -> Result<RawHandle, LookupError> {
        let kind = HandleKind::of(direction, field.is_static());
        self.lookup
            .find_handle(class, field.name(), field.declared_type(), kind)
    }

    fn fallback(
        &self,
        class: &Arc<dyn RuntimeClass>,
        field: &FieldDescriptor,
        by_name: Option<FieldRef>,
        direction: AccessDirection,
    ) -> AccessResult<(RawHandle, ResolutionPath)> {
        let (target, path) = match by_name {
            Some(found) => (found, ResolutionPath::Reflective),
            None => (disambiguate(class.as_ref(), field)?, ResolutionPath::ByType),
        };

        class.force_accessible(&target).map_err(AccessError::failed)?;
        let raw = self
            .lookup
            .unreflect(class, &target, direction)
            .map_err(AccessError::failed)?;
        Ok((raw, path))
    }
}

impl std::fmt::Debug for FieldAccessResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldAccessResolver")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Pick the field whose type and static-ness match the descriptor.
///
/// Several matches resolve to the first in declaration order.
fn disambiguate(class: &dyn RuntimeClass, field: &FieldDescriptor) -> AccessResult<FieldRef> {
    let mut candidates = class
        .declared_fields()
        .into_iter()
        .filter(|c| &c.ty == field.declared_type() && c.is_static == field.is_static());

    let chosen = candidates.next().ok_or_else(|| AccessError::FieldNotFound {
        owner: class.name().to_string(),
        ty: field.declared_type().clone(),
        is_static: field.is_static(),
    })?;

    let others = candidates.count();
    if others > 0 {
        warn!(
            owner = class.name(),
            field = field.name(),
            ty = %field.declared_type(),
            candidates = others + 1,
            chosen = %chosen.name,
            "ambiguous type-based field match, using first declared"
        );
    }
    Ok(chosen)
}
