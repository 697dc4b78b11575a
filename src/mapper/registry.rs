use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::{Result, RowkitError};
use super::{DataClassMapper, FromRow, RowMapper};

struct Entry {
    mapper: Arc<dyn Any + Send + Sync>,
    /// Concrete mapper type, used to decide whether a repeated
    /// `register_if_absent` is the same registration.
    concrete: TypeId,
}

/// Registry of row mappers, keyed by target type.
///
/// Custom mappers can replace the automatic mapping for specific types.
/// The registry is an explicitly constructed object handed to the execution
/// facade, internally synchronized for concurrent registration.
#[derive(Default)]
pub struct MapperRegistry {
    entries: RwLock<HashMap<TypeId, Entry>>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mapper for `T`.
    ///
    /// Fails if a mapper for `T` is already registered.
    pub fn register<T, M>(&self, mapper: M) -> Result<()>
    where
        T: 'static,
        M: RowMapper<T> + 'static,
    {
        let mut entries = self.entries.write();
        if entries.contains_key(&TypeId::of::<T>()) {
            return Err(RowkitError::Mapping(format!(
                "a mapper for {} is already registered",
                std::any::type_name::<T>()
            )));
        }
        entries.insert(TypeId::of::<T>(), Self::entry::<T, M>(mapper));
        debug!(target_type = std::any::type_name::<T>(), "mapper registered");
        Ok(())
    }

    /// Register a mapper for `T` unless one is already present.
    ///
    /// Idempotent for a repeated registration of the same mapper type; fails
    /// only if the existing registration is a different mapper type.
    pub fn register_if_absent<T, M>(&self, mapper: M) -> Result<()>
    where
        T: 'static,
        M: RowMapper<T> + 'static,
    {
        let mut entries = self.entries.write();
        match entries.get(&TypeId::of::<T>()) {
            Some(existing) if existing.concrete != TypeId::of::<M>() => {
                Err(RowkitError::Mapping(format!(
                    "a mapper for {} is already registered with a different mapper type",
                    std::any::type_name::<T>()
                )))
            }
            Some(_) => Ok(()),
            None => {
                entries.insert(TypeId::of::<T>(), Self::entry::<T, M>(mapper));
                Ok(())
            }
        }
    }

    /// The mapper for `T`: a custom registration when present, otherwise the
    /// automatic [`DataClassMapper`], created once and reused.
    pub fn get<T>(&self) -> Arc<dyn RowMapper<T>>
    where
        T: FromRow + 'static,
    {
        if let Some(mapper) = self.lookup::<T>() {
            return mapper;
        }
        let mut entries = self.entries.write();
        // Another thread may have won the race between the read and this
        // write lock.
        if let Some(mapper) = entries
            .get(&TypeId::of::<T>())
            .and_then(Self::downcast::<T>)
        {
            return mapper;
        }
        let mapper: Arc<dyn RowMapper<T>> = Arc::new(DataClassMapper::<T>::new());
        entries.insert(
            TypeId::of::<T>(),
            Entry {
                mapper: Arc::new(mapper.clone()),
                concrete: TypeId::of::<DataClassMapper<T>>(),
            },
        );
        mapper
    }

    /// The registered mapper for `T`, if any.
    pub fn lookup<T: 'static>(&self) -> Option<Arc<dyn RowMapper<T>>> {
        self.entries
            .read()
            .get(&TypeId::of::<T>())
            .and_then(Self::downcast::<T>)
    }

    fn entry<T, M>(mapper: M) -> Entry
    where
        T: 'static,
        M: RowMapper<T> + 'static,
    {
        let shared: Arc<dyn RowMapper<T>> = Arc::new(mapper);
        Entry {
            mapper: Arc::new(shared),
            concrete: TypeId::of::<M>(),
        }
    }

    fn downcast<T: 'static>(entry: &Entry) -> Option<Arc<dyn RowMapper<T>>> {
        entry
            .mapper
            .downcast_ref::<Arc<dyn RowMapper<T>>>()
            .cloned()
    }
}
