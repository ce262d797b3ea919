//! Bidirectional type name <-> numeric id mapping.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{tag, TypeDescriptor};

/// Registered struct types.
///
/// Ids are handed out sequentially from [`tag::FIRST_USER_TYPE_ID`] in
/// registration order, so two registries fed the same registrations agree on
/// every id. Once an encode or decode has touched the registry it is frozen.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    by_id: Vec<Arc<TypeDescriptor>>,
    by_name: HashMap<String, u32>,
    used: AtomicBool,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `descriptor` and returns its id.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<u32> {
        if self.is_used() {
            return Err(Error::RegistrationAfterUse(descriptor.name));
        }
        if self.by_name.contains_key(&descriptor.name) {
            return Err(Error::DuplicateRegistration(descriptor.name));
        }
        descriptor.validate()?;

        let id = tag::FIRST_USER_TYPE_ID + self.by_id.len() as u32;
        debug!(
            type_name = %descriptor.name,
            type_id = id,
            fields = descriptor.fields.len(),
            "registered type"
        );
        self.by_name.insert(descriptor.name.clone(), id);
        self.by_id.push(Arc::new(descriptor));
        Ok(id)
    }

    pub fn resolve_by_id(&self, id: u32) -> Result<&Arc<TypeDescriptor>> {
        id.checked_sub(tag::FIRST_USER_TYPE_ID)
            .and_then(|index| self.by_id.get(index as usize))
            .ok_or(Error::UnknownTypeId(id))
    }

    pub fn resolve_by_name(&self, name: &str) -> Result<(u32, &Arc<TypeDescriptor>)> {
        let id = *self
            .by_name
            .get(name)
            .ok_or_else(|| Error::UnregisteredType(name.to_owned()))?;
        Ok((id, self.resolve_by_id(id)?))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Freezes the registry. Called on entry to every encode/decode.
    pub fn mark_used(&self) {
        self.used.store(true, Ordering::Release);
    }

    pub fn is_used(&self) -> bool {
        self.used.load(Ordering::Acquire)
    }
}
