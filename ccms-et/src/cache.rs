//! Client consistency cache
//!
//! Per-parent-id cache of children collections with in-flight request
//! deduplication. After a local mutation the cache applies an optimistic
//! update, then issues an authoritative re-fetch of the parent's children;
//! the optimistic value is provisional and the engine's answer always wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ccms_common::api::types::{
    ActivityResponse, CreateActivityRequest, CreateLessonRequest, CreateMaterialRequest,
    LessonResponse, MaterialResponse, SetLessonVideoRequest, UpdateActivityRequest,
    UpdateMaterialRequest,
};
use tracing::warn;
use uuid::Uuid;

use crate::client::ContentClient;
use crate::error::ClientError;

struct CacheEntry<T> {
    /// Serializes fetches for one parent; a caller that finds the lock held
    /// awaits the in-flight fetch instead of issuing its own
    fetch_lock: Arc<tokio::sync::Mutex<()>>,
    value: Option<Arc<Vec<T>>>,
}

impl<T> Default for CacheEntry<T> {
    fn default() -> Self {
        Self {
            fetch_lock: Arc::new(tokio::sync::Mutex::new(())),
            value: None,
        }
    }
}

/// Per-parent-id children collection cache
pub struct ChildrenCache<T> {
    entries: Mutex<HashMap<Uuid, CacheEntry<T>>>,
}

impl<T: Clone> ChildrenCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Last-known collection for a parent, without fetching
    pub fn peek(&self, parent_id: Uuid) -> Option<Arc<Vec<T>>> {
        let entries = self.entries.lock().expect("cache poisoned");
        entries.get(&parent_id).and_then(|entry| entry.value.clone())
    }

    fn fetch_lock(&self, parent_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut entries = self.entries.lock().expect("cache poisoned");
        entries.entry(parent_id).or_default().fetch_lock.clone()
    }

    fn store(&self, parent_id: Uuid, value: Arc<Vec<T>>) {
        let mut entries = self.entries.lock().expect("cache poisoned");
        entries.entry(parent_id).or_default().value = Some(value);
    }

    /// Drop the cached collection; the next read fetches fresh
    pub fn invalidate(&self, parent_id: Uuid) {
        let mut entries = self.entries.lock().expect("cache poisoned");
        if let Some(entry) = entries.get_mut(&parent_id) {
            entry.value = None;
        }
    }

    /// Read a parent's children, deduplicating concurrent fetches.
    ///
    /// A second caller arriving while a fetch for the same parent is in
    /// flight awaits that fetch and shares its stored result.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        parent_id: Uuid,
        fetch: F,
    ) -> Result<Arc<Vec<T>>, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<T>, ClientError>>,
    {
        if let Some(value) = self.peek(parent_id) {
            return Ok(value);
        }

        let lock = self.fetch_lock(parent_id);
        let _fetching = lock.lock().await;

        // The fetch we waited behind may have filled the entry
        if let Some(value) = self.peek(parent_id) {
            return Ok(value);
        }

        let value = Arc::new(fetch().await?);
        self.store(parent_id, value.clone());
        Ok(value)
    }

    /// Apply a provisional local edit to the cached collection, if present
    pub fn apply_optimistic(&self, parent_id: Uuid, mutate: impl FnOnce(&mut Vec<T>)) {
        let mut entries = self.entries.lock().expect("cache poisoned");
        if let Some(entry) = entries.get_mut(&parent_id) {
            if let Some(value) = &entry.value {
                let mut updated = value.as_ref().clone();
                mutate(&mut updated);
                entry.value = Some(Arc::new(updated));
            }
        }
    }

    /// Authoritative re-fetch: always hits the server and overwrites the
    /// cached collection
    pub async fn refresh<F, Fut>(
        &self,
        parent_id: Uuid,
        fetch: F,
    ) -> Result<Arc<Vec<T>>, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Vec<T>, ClientError>>,
    {
        let lock = self.fetch_lock(parent_id);
        let _fetching = lock.lock().await;

        let value = Arc::new(fetch().await?);
        self.store(parent_id, value.clone());
        Ok(value)
    }
}

impl<T: Clone> Default for ChildrenCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Editing-surface facade: the content client plus one cache per children
/// collection kind.
///
/// Mutations follow optimistic-update-then-refetch: the mutation response is
/// pushed into the cache immediately, then the parent's children are
/// re-fetched from the engine. A failed re-fetch invalidates the entry (the
/// mutation itself already succeeded) so the next read reconciles.
pub struct EditorCache {
    client: ContentClient,
    lessons: ChildrenCache<LessonResponse>,
    materials: ChildrenCache<MaterialResponse>,
    activities: ChildrenCache<ActivityResponse>,
}

impl EditorCache {
    pub fn new(client: ContentClient) -> Self {
        Self {
            client,
            lessons: ChildrenCache::new(),
            materials: ChildrenCache::new(),
            activities: ChildrenCache::new(),
        }
    }

    pub fn client(&self) -> &ContentClient {
        &self.client
    }

    // ========================================
    // Cached Reads
    // ========================================

    pub async fn lessons_of(&self, module_id: Uuid) -> Result<Arc<Vec<LessonResponse>>, ClientError> {
        self.lessons
            .get_or_fetch(module_id, move || async move { self.client.list_lessons(module_id).await })
            .await
    }

    pub async fn materials_of(
        &self,
        lesson_id: Uuid,
    ) -> Result<Arc<Vec<MaterialResponse>>, ClientError> {
        self.materials
            .get_or_fetch(lesson_id, move || async move { self.client.list_materials(lesson_id).await })
            .await
    }

    pub async fn activities_of(
        &self,
        lesson_id: Uuid,
    ) -> Result<Arc<Vec<ActivityResponse>>, ClientError> {
        self.activities
            .get_or_fetch(lesson_id, move || async move { self.client.list_activities(lesson_id).await })
            .await
    }

    async fn reconcile_materials(&self, lesson_id: Uuid) {
        let result = self
            .materials
            .refresh(lesson_id, move || async move { self.client.list_materials(lesson_id).await })
            .await;
        if let Err(err) = result {
            warn!(lesson = %lesson_id, error = %err, "material re-fetch failed, cache invalidated");
            self.materials.invalidate(lesson_id);
        }
    }

    async fn reconcile_activities(&self, lesson_id: Uuid) {
        let result = self
            .activities
            .refresh(lesson_id, move || async move { self.client.list_activities(lesson_id).await })
            .await;
        if let Err(err) = result {
            warn!(lesson = %lesson_id, error = %err, "activity re-fetch failed, cache invalidated");
            self.activities.invalidate(lesson_id);
        }
    }

    async fn reconcile_lessons(&self, module_id: Uuid) {
        let result = self
            .lessons
            .refresh(module_id, move || async move { self.client.list_lessons(module_id).await })
            .await;
        if let Err(err) = result {
            warn!(module = %module_id, error = %err, "lesson re-fetch failed, cache invalidated");
            self.lessons.invalidate(module_id);
        }
    }

    // ========================================
    // Mutations (optimistic update + authoritative re-fetch)
    // ========================================

    pub async fn create_lesson(
        &self,
        module_id: Uuid,
        request: &CreateLessonRequest,
    ) -> Result<LessonResponse, ClientError> {
        let created = self.client.create_lesson(module_id, request).await?;

        let optimistic = created.clone();
        self.lessons.apply_optimistic(module_id, |list| list.push(optimistic));
        self.reconcile_lessons(module_id).await;
        Ok(created)
    }

    pub async fn set_lesson_video(
        &self,
        module_id: Uuid,
        lesson_id: Uuid,
        request: &SetLessonVideoRequest,
    ) -> Result<LessonResponse, ClientError> {
        let updated = self.client.set_lesson_video(lesson_id, request).await?;

        let optimistic = updated.clone();
        self.lessons.apply_optimistic(module_id, |list| {
            if let Some(slot) = list.iter_mut().find(|l| l.lesson_id == lesson_id) {
                *slot = optimistic;
            }
        });
        self.reconcile_lessons(module_id).await;
        Ok(updated)
    }

    pub async fn create_material(
        &self,
        lesson_id: Uuid,
        request: &CreateMaterialRequest,
    ) -> Result<MaterialResponse, ClientError> {
        let created = self.client.create_material(lesson_id, request).await?;

        let optimistic = created.clone();
        self.materials.apply_optimistic(lesson_id, |list| list.push(optimistic));
        self.reconcile_materials(lesson_id).await;
        Ok(created)
    }

    pub async fn update_material(
        &self,
        lesson_id: Uuid,
        material_id: Uuid,
        request: &UpdateMaterialRequest,
    ) -> Result<MaterialResponse, ClientError> {
        let updated = self.client.update_material(material_id, request).await?;

        let optimistic = updated.clone();
        self.materials.apply_optimistic(lesson_id, |list| {
            if let Some(slot) = list.iter_mut().find(|m| m.material_id == material_id) {
                *slot = optimistic;
            }
        });
        self.reconcile_materials(lesson_id).await;
        Ok(updated)
    }

    pub async fn delete_material(
        &self,
        lesson_id: Uuid,
        material_id: Uuid,
    ) -> Result<(), ClientError> {
        self.client.delete_material(material_id).await?;

        self.materials.apply_optimistic(lesson_id, |list| {
            list.retain(|m| m.material_id != material_id);
        });
        self.reconcile_materials(lesson_id).await;
        Ok(())
    }

    pub async fn create_activity(
        &self,
        lesson_id: Uuid,
        request: &CreateActivityRequest,
    ) -> Result<ActivityResponse, ClientError> {
        let created = self.client.create_activity(lesson_id, request).await?;

        let optimistic = created.clone();
        self.activities.apply_optimistic(lesson_id, |list| list.push(optimistic));
        self.reconcile_activities(lesson_id).await;
        Ok(created)
    }

    pub async fn update_activity(
        &self,
        lesson_id: Uuid,
        activity_id: Uuid,
        request: &UpdateActivityRequest,
    ) -> Result<ActivityResponse, ClientError> {
        let updated = self.client.update_activity(activity_id, request).await?;

        let optimistic = updated.clone();
        self.activities.apply_optimistic(lesson_id, |list| {
            if let Some(slot) = list.iter_mut().find(|a| a.activity_id == activity_id) {
                *slot = optimistic;
            }
        });
        self.reconcile_activities(lesson_id).await;
        Ok(updated)
    }

    pub async fn delete_activity(
        &self,
        lesson_id: Uuid,
        activity_id: Uuid,
    ) -> Result<(), ClientError> {
        self.client.delete_activity(activity_id).await?;

        self.activities.apply_optimistic(lesson_id, |list| {
            list.retain(|a| a.activity_id != activity_id);
        });
        self.reconcile_activities(lesson_id).await;
        Ok(())
    }
}
