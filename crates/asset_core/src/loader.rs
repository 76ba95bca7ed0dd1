//! Streaming model/terrain loader.
//!
//! Contract: a load request eventually leaves the target entity's model state
//! either `loaded=true` with live renderer/physics handles, or `loaded=false`
//! with the previous asset hash restored. Dependent systems never observe a
//! half-loaded state.
//!
//! Per-tick pump ordering (hard invariants):
//! 1. ingest discovery completions; gate everything until the scan is done
//! 2. apply unload requests
//! 3. drain a bounded request batch, resolve against the registry
//! 4. fork-join decode across the worker pool, serialized per asset hash
//! 5. apply results on the simulation thread (instance creation, rollback)

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::{Arc, Mutex, PoisonError};

use glam::{Quat, Vec3};

use data_runtime::configs::streaming::StreamingBudget;
use data_runtime::display::DisplayTable;
use ecs_core::components::{
    BodyId, Components, DisplayInfo, InstanceId, ModelId, Transform,
};
use ecs_core::{Entity, World};

use crate::discovery::{DiscoveredAsset, DiscoveryScanner};
use crate::format::{self, AssetKind, ParsedAsset};
use crate::hash::hash_path;
use crate::io::AsyncFileLoader;
use crate::jobs::JobPool;

/// Renderer-side surface the loader drives. Injected so the pipeline runs
/// (and tests) without a live GPU.
pub trait RendererUpload: Send + Sync {
    fn load_model(&self, name: &str, asset: &ParsedAsset) -> ModelId;
    fn add_placement_instance(
        &self,
        entity: Entity,
        model: ModelId,
        hash: u32,
        transform: &Transform,
        doodad_set: u16,
    ) -> InstanceId;
    fn add_instance(&self, entity: Entity, model: ModelId, hash: u32, transform: &Transform)
        -> InstanceId;
    fn modify_instance(&self, instance: InstanceId, model: ModelId);
    fn remove_instance(&self, instance: InstanceId);
}

/// Physics-side surface. Static bodies for placements/terrain, kinematic
/// bodies (hit-testing only) for dynamic units.
pub trait PhysicsWorld: Send + Sync {
    fn create_static_body(&self, shape: &[u8], transform: &Transform) -> Option<BodyId>;
    fn create_kinematic_body(&self, shape: &[u8], transform: &Transform) -> Option<BodyId>;
    fn remove_body(&self, body: BodyId);
}

/// Per-hash load progress. Transitions only `NotLoaded → Loaded` or
/// `NotLoaded → Failed`; a `Failed` asset is never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loaded,
    Failed,
}

/// Why a load is happening; decides the instance-creation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Static world decoration with a persistent unique world id.
    Placement { unique_id: u32, doodad_set: u16 },
    /// Child decoration of a placement.
    Decoration { parent_unique: u32 },
    /// Runtime-swappable model on an existing entity (model or display-id).
    Dynamic,
    /// Terrain chunk counted against the map-load gate.
    TerrainChunk,
}

#[derive(Debug, Clone, Copy)]
pub struct LoadRequest {
    pub entity: Option<Entity>,
    pub hash: u32,
    /// Previous model hash, restored if this load fails.
    pub rollback_hash: u32,
    pub pos: Vec3,
    pub rot: Quat,
    pub scale: f32,
    pub kind: RequestKind,
}

/// Lifecycle event applied back onto entity model state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadEvent {
    pub entity: Entity,
    pub hash: u32,
    pub loaded: bool,
    /// True when a failure restored the previous hash; dependents (equipment
    /// visualization) must not treat the event as a fresh load.
    pub rolled_back: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreamEvent {
    Model(LoadEvent),
    MapLoaded { map_id: u32, spawn: Vec3 },
}

/// State shared with decode workers. Holds the only two locks in the loader:
/// the per-hash state cells and the physics-shape cache. No global lock
/// spans unrelated asset hashes.
struct Shared {
    states: Mutex<HashMap<u32, Arc<Mutex<LoadState>>>>,
    shapes: Mutex<HashMap<u32, Arc<Vec<u8>>>>,
    decodes: AtomicUsize,
}

impl Shared {
    fn state_cell(&self, hash: u32) -> Arc<Mutex<LoadState>> {
        let mut map = self
            .states
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        map.entry(hash)
            .or_insert_with(|| Arc::new(Mutex::new(LoadState::NotLoaded)))
            .clone()
    }

    fn set_failed(&self, hash: u32) {
        let cell = self.state_cell(hash);
        let mut st = cell.lock().unwrap_or_else(PoisonError::into_inner);
        if *st == LoadState::NotLoaded {
            *st = LoadState::Failed;
        }
    }

    fn peek(&self, hash: u32) -> LoadState {
        *self
            .state_cell(hash)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn shape(&self, hash: u32) -> Option<Arc<Vec<u8>>> {
        self.shapes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&hash)
            .cloned()
    }
}

struct WorkItem {
    req: LoadRequest,
    asset: Option<Arc<DiscoveredAsset>>,
    outcome: LoadState,
}

struct TerrainGate {
    map_id: u32,
    spawn: Vec3,
    expected: usize,
    applied: usize,
}

pub struct StreamingLoader {
    renderer: Arc<dyn RendererUpload>,
    physics: Arc<dyn PhysicsWorld>,
    budget: StreamingBudget,
    pool: JobPool,
    io: AsyncFileLoader,
    scan: DiscoveryScanner,
    registry: HashMap<u32, Arc<DiscoveredAsset>>,
    shared: Arc<Shared>,
    /// Renderer model slot per hash; simulation thread only.
    model_ids: HashMap<u32, ModelId>,
    // Instance bookkeeping. All entries for one instance are invalidated
    // together on unload; leaking one map without the others leaves dangling
    // lookups.
    inst_model: HashMap<InstanceId, ModelId>,
    inst_entity: HashMap<InstanceId, Entity>,
    inst_body: HashMap<InstanceId, BodyId>,
    unique_inst: HashMap<u32, InstanceId>,
    inst_unique: HashMap<InstanceId, u32>,
    entity_inst: HashMap<Entity, InstanceId>,
    req_tx: SyncSender<LoadRequest>,
    req_rx: Receiver<LoadRequest>,
    unloads: Vec<Entity>,
    events: Vec<StreamEvent>,
    terrain_gate: Option<TerrainGate>,
}

impl StreamingLoader {
    #[must_use]
    pub fn new(
        renderer: Arc<dyn RendererUpload>,
        physics: Arc<dyn PhysicsWorld>,
        budget: StreamingBudget,
    ) -> Self {
        let (req_tx, req_rx) = sync_channel(budget.request_queue_cap);
        Self {
            renderer,
            physics,
            pool: JobPool::new(budget.workers),
            budget,
            io: AsyncFileLoader::spawn(),
            scan: DiscoveryScanner::new(),
            registry: HashMap::new(),
            shared: Arc::new(Shared {
                states: Mutex::new(HashMap::new()),
                shapes: Mutex::new(HashMap::new()),
                decodes: AtomicUsize::new(0),
            }),
            model_ids: HashMap::new(),
            inst_model: HashMap::new(),
            inst_entity: HashMap::new(),
            inst_body: HashMap::new(),
            unique_inst: HashMap::new(),
            inst_unique: HashMap::new(),
            entity_inst: HashMap::new(),
            req_tx,
            req_rx,
            unloads: Vec::new(),
            events: Vec::new(),
            terrain_gate: None,
        }
    }

    // ---- discovery -------------------------------------------------------

    /// Kick the one-time asset scan. Loading stays gated until it completes.
    pub fn begin_discovery(&mut self, root: &Path) -> anyhow::Result<usize> {
        self.scan.begin_scan(&self.io, root, &["cmdl", "cter"])
    }

    #[must_use]
    pub fn discovery_complete(&self) -> bool {
        self.scan.complete()
    }

    /// Register a pre-parsed asset directly. Test seam and editor-import
    /// path; follows the same duplicate-hash rule as the scan.
    pub fn register_asset(&mut self, logical_path: &str, parsed: ParsedAsset) -> u32 {
        let hash = hash_path(logical_path);
        self.insert_discovered(DiscoveredAsset {
            hash,
            logical_path: crate::hash::normalize_path(logical_path),
            parsed,
        });
        hash
    }

    /// Mark discovery complete without a scan (all assets registered
    /// in-process).
    pub fn finish_discovery(&mut self) {
        self.scan.mark_complete();
    }

    fn insert_discovered(&mut self, asset: DiscoveredAsset) {
        match self.registry.get(&asset.hash) {
            Some(first) => {
                // First registration wins; a duplicate is content noise, not
                // a failure.
                log::warn!(
                    "discovery: duplicate asset hash {:#010x} ({} vs {})",
                    asset.hash,
                    first.logical_path,
                    asset.logical_path
                );
            }
            None => {
                self.registry.insert(asset.hash, Arc::new(asset));
            }
        }
    }

    fn ingest_discovery(&mut self) {
        for c in self.io.drain_completions() {
            self.scan.note_completion();
            let logical = crate::hash::normalize_path(&c.path.to_string_lossy());
            match c.result.as_deref().map(format::parse) {
                Ok(Ok(parsed)) => {
                    self.insert_discovered(DiscoveredAsset {
                        hash: c.hash,
                        logical_path: logical,
                        parsed,
                    });
                }
                Ok(Err(e)) => {
                    log::error!("discovery: corrupt asset {logical}: {e:#}");
                    self.shared.set_failed(c.hash);
                }
                Err(e) => {
                    log::error!("discovery: read failed for {logical}: {e:#}");
                    self.shared.set_failed(c.hash);
                }
            }
        }
    }

    // ---- request intake --------------------------------------------------

    /// Static world decoration. Duplicate unique world ids are suppressed at
    /// intake so a re-sent placement never spawns twice.
    pub fn load_placement(
        &mut self,
        unique_id: u32,
        hash: u32,
        pos: Vec3,
        yaw: f32,
        scale: f32,
        doodad_set: u16,
    ) {
        if self.unique_inst.contains_key(&unique_id) {
            log::debug!("placement {unique_id} already spawned, skipping");
            return;
        }
        self.enqueue(
            None,
            LoadRequest {
                entity: None,
                hash,
                rollback_hash: 0,
                pos,
                rot: Quat::from_rotation_y(yaw),
                scale,
                kind: RequestKind::Placement {
                    unique_id,
                    doodad_set,
                },
            },
        );
    }

    pub fn load_decoration(
        &mut self,
        parent_unique: u32,
        hash: u32,
        pos: Vec3,
        rot: Quat,
        scale: f32,
    ) {
        self.enqueue(
            None,
            LoadRequest {
                entity: None,
                hash,
                rollback_hash: 0,
                pos,
                rot,
                scale,
                kind: RequestKind::Decoration { parent_unique },
            },
        );
    }

    /// Explicit model swap on an existing entity. The component is stamped
    /// synchronously (`loaded=false`, new hash) so concurrent calls stay
    /// idempotent: last writer wins on intent, at most one load executes.
    pub fn load_model_for_entity(&mut self, world: &mut World, entity: Entity, hash: u32) {
        let Some(c) = world.get_mut(entity) else {
            log::warn!("load_model_for_entity: stale entity {entity:?}");
            return;
        };
        let rollback = c.model.hash;
        c.model.loaded = false;
        c.model.hash = hash;
        let req = LoadRequest {
            entity: Some(entity),
            hash,
            rollback_hash: rollback,
            pos: c.tr.translation,
            rot: c.tr.rotation,
            scale: c.tr.scale.x,
            kind: RequestKind::Dynamic,
        };
        self.enqueue(Some(world), req);
    }

    /// Resolve a display id through the database table and load the result.
    pub fn load_display_for_entity(
        &mut self,
        world: &mut World,
        entity: Entity,
        table: &DisplayTable,
        info: DisplayInfo,
    ) {
        let Some(c) = world.get_mut(entity) else {
            log::warn!("load_display_for_entity: stale entity {entity:?}");
            return;
        };
        c.display = info;
        let Some(path) = table.resolve(info.display_id, info.race, info.gender, info.variant)
        else {
            // Content-absent: the display id has no row. Expected case.
            log::debug!("display id {} unresolved", info.display_id);
            return;
        };
        let hash = hash_path(path);
        self.load_model_for_entity(world, entity, hash);
    }

    /// Arm the map gate: `MapLoaded` fires once `expected` terrain-chunk
    /// results have been applied. `spawn` is the map entry point carried on
    /// the event so the host can re-seat the local mover there.
    pub fn begin_map_load(&mut self, map_id: u32, expected: usize, spawn: Vec3) {
        self.terrain_gate = Some(TerrainGate {
            map_id,
            spawn,
            expected,
            applied: 0,
        });
    }

    pub fn load_terrain_chunk(&mut self, hash: u32, pos: Vec3) {
        self.enqueue(
            None,
            LoadRequest {
                entity: None,
                hash,
                rollback_hash: 0,
                pos,
                rot: Quat::IDENTITY,
                scale: 1.0,
                kind: RequestKind::TerrainChunk,
            },
        );
    }

    fn enqueue(&mut self, world: Option<&mut World>, req: LoadRequest) {
        if let Err(e) = self.req_tx.try_send(req) {
            let req = match e {
                std::sync::mpsc::TrySendError::Full(r)
                | std::sync::mpsc::TrySendError::Disconnected(r) => r,
            };
            log::error!(
                "load queue saturated, failing request for {:#010x}",
                req.hash
            );
            if let (Some(world), Some(entity)) = (world, req.entity) {
                self.fail_entity_request(world, entity, &req);
            }
            if matches!(req.kind, RequestKind::TerrainChunk) {
                self.count_terrain_applied();
            }
        }
    }

    /// Queue an unload; applied at the top of the next pump, strictly before
    /// any load result.
    pub fn request_unload(&mut self, entity: Entity) {
        self.unloads.push(entity);
    }

    // ---- per-tick pump ---------------------------------------------------

    pub fn pump(&mut self, world: &mut World) {
        self.ingest_discovery();
        // Chunks counted at enqueue time (queue saturation) or a gate armed
        // with zero expected chunks must still release, even on an idle pump.
        self.release_map_gate();
        if !self.scan.complete() {
            return;
        }
        self.apply_unloads();

        let mut items = Vec::new();
        while items.len() < self.budget.batch_size {
            let Ok(req) = self.req_rx.try_recv() else {
                break;
            };
            let asset = self.registry.get(&req.hash).cloned();
            // Pre-resolve outcome for known-terminal hashes so the decode
            // phase only sees real work.
            let outcome = if asset.is_none() {
                // Content-absent: the common case for assets that simply do
                // not exist. Silent by design.
                self.shared.set_failed(req.hash);
                LoadState::Failed
            } else {
                LoadState::NotLoaded
            };
            items.push(WorkItem {
                req,
                asset,
                outcome,
            });
        }
        if items.is_empty() {
            return;
        }

        let shared = Arc::clone(&self.shared);
        self.pool.run_partitioned(&mut items, |item| {
            decode_item(&shared, item);
        });

        for item in items {
            self.apply_result(world, &item);
        }
        self.release_map_gate();
    }

    fn release_map_gate(&mut self) {
        if let Some(gate) = &self.terrain_gate {
            if gate.applied >= gate.expected {
                let (map_id, spawn) = (gate.map_id, gate.spawn);
                self.events.push(StreamEvent::MapLoaded { map_id, spawn });
                self.terrain_gate = None;
            }
        }
    }

    /// Lifecycle events produced since the last drain.
    #[must_use]
    pub fn drain_events(&mut self) -> Vec<StreamEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- result application (simulation thread) --------------------------

    fn apply_result(&mut self, world: &mut World, item: &WorkItem) {
        match item.outcome {
            LoadState::Loaded => self.apply_loaded(world, item),
            LoadState::Failed | LoadState::NotLoaded => self.apply_failed(world, item),
        }
    }

    fn apply_loaded(&mut self, world: &mut World, item: &WorkItem) {
        let req = &item.req;
        let Some(asset) = &item.asset else {
            return;
        };
        let model = match self.model_ids.get(&req.hash) {
            Some(m) => *m,
            None => {
                let m = self
                    .renderer
                    .load_model(&asset.logical_path, &asset.parsed);
                self.model_ids.insert(req.hash, m);
                m
            }
        };
        let tr = Transform {
            translation: req.pos,
            rotation: req.rot,
            scale: Vec3::splat(req.scale),
        };
        match req.kind {
            RequestKind::Placement {
                unique_id,
                doodad_set,
            } => {
                if self.unique_inst.contains_key(&unique_id) {
                    log::debug!("placement {unique_id} spawned while queued, skipping");
                    return;
                }
                let entity = self.spawn_static(world, tr, req.hash);
                let inst =
                    self.renderer
                        .add_placement_instance(entity, model, req.hash, &tr, doodad_set);
                self.record_instance(entity, inst, model, self.static_body(req.hash, &tr));
                self.unique_inst.insert(unique_id, inst);
                self.inst_unique.insert(inst, unique_id);
                self.finish_entity(world, entity, inst, req.hash);
            }
            RequestKind::Decoration { .. } => {
                let entity = self.spawn_static(world, tr, req.hash);
                let inst = self
                    .renderer
                    .add_placement_instance(entity, model, req.hash, &tr, 0);
                self.record_instance(entity, inst, model, self.static_body(req.hash, &tr));
                self.finish_entity(world, entity, inst, req.hash);
            }
            RequestKind::TerrainChunk => {
                let entity = self.spawn_static(world, tr, req.hash);
                let inst = self
                    .renderer
                    .add_placement_instance(entity, model, req.hash, &tr, 0);
                self.record_instance(entity, inst, model, self.static_body(req.hash, &tr));
                self.finish_entity(world, entity, inst, req.hash);
                self.count_terrain_applied();
            }
            RequestKind::Dynamic => {
                let Some(entity) = req.entity else {
                    return;
                };
                let Some(c) = world.get_mut(entity) else {
                    log::debug!("load result for despawned entity {entity:?}, dropping");
                    return;
                };
                if c.model.hash != req.hash {
                    // A newer intent superseded this request.
                    log::debug!("stale load result for {entity:?} ({:#010x})", req.hash);
                    return;
                }
                let shape = self.shared.shape(req.hash);
                let inst = if let Some(&existing) = self.entity_inst.get(&entity) {
                    self.renderer.modify_instance(existing, model);
                    self.inst_model.insert(existing, model);
                    if let Some(body) = self.inst_body.remove(&existing) {
                        self.physics.remove_body(body);
                    }
                    existing
                } else {
                    let inst = self.renderer.add_instance(entity, model, req.hash, &tr);
                    self.record_instance(entity, inst, model, None);
                    inst
                };
                if let Some(shape) = shape {
                    if let Some(body) = self.physics.create_kinematic_body(&shape, &tr) {
                        self.inst_body.insert(inst, body);
                    }
                }
                if let Some(c) = world.get_mut(entity) {
                    c.model.loaded = true;
                    c.model.instance = Some(inst);
                }
                self.events.push(StreamEvent::Model(LoadEvent {
                    entity,
                    hash: req.hash,
                    loaded: true,
                    rolled_back: false,
                }));
            }
        }
    }

    fn apply_failed(&mut self, world: &mut World, item: &WorkItem) {
        let req = &item.req;
        if matches!(req.kind, RequestKind::TerrainChunk) {
            log::error!("terrain chunk {:#010x} failed to load", req.hash);
            self.count_terrain_applied();
            return;
        }
        if let Some(entity) = req.entity {
            self.fail_entity_request(world, entity, req);
        } else {
            log::debug!("static load {:#010x} failed", req.hash);
        }
    }

    /// Rollback path: restore the previous hash, keep `loaded=false`, and
    /// flag the event so dependents don't treat it as a fresh load.
    fn fail_entity_request(&mut self, world: &mut World, entity: Entity, req: &LoadRequest) {
        let Some(c) = world.get_mut(entity) else {
            return;
        };
        if c.model.hash == req.hash {
            c.model.hash = req.rollback_hash;
            c.model.loaded = false;
        }
        self.events.push(StreamEvent::Model(LoadEvent {
            entity,
            hash: req.rollback_hash,
            loaded: false,
            rolled_back: true,
        }));
    }

    fn spawn_static(&mut self, world: &mut World, tr: Transform, hash: u32) -> Entity {
        let mut c = Components::default();
        c.tr = tr;
        c.model.hash = hash;
        world.spawn(c)
    }

    fn finish_entity(&mut self, world: &mut World, entity: Entity, inst: InstanceId, hash: u32) {
        if let Some(c) = world.get_mut(entity) {
            c.model.loaded = true;
            c.model.hash = hash;
            c.model.instance = Some(inst);
        }
        self.events.push(StreamEvent::Model(LoadEvent {
            entity,
            hash,
            loaded: true,
            rolled_back: false,
        }));
    }

    fn static_body(&self, hash: u32, tr: &Transform) -> Option<BodyId> {
        let shape = self.shared.shape(hash)?;
        self.physics.create_static_body(&shape, tr)
    }

    fn record_instance(
        &mut self,
        entity: Entity,
        inst: InstanceId,
        model: ModelId,
        body: Option<BodyId>,
    ) {
        self.inst_model.insert(inst, model);
        self.inst_entity.insert(inst, entity);
        self.entity_inst.insert(entity, inst);
        if let Some(body) = body {
            self.inst_body.insert(inst, body);
        }
    }

    fn count_terrain_applied(&mut self) {
        if let Some(gate) = &mut self.terrain_gate {
            gate.applied += 1;
        }
    }

    // ---- unload ----------------------------------------------------------

    fn apply_unloads(&mut self) {
        let pending = std::mem::take(&mut self.unloads);
        for entity in pending {
            self.release_entity(entity);
        }
    }

    fn release_entity(&mut self, entity: Entity) {
        let Some(inst) = self.entity_inst.remove(&entity) else {
            return;
        };
        // All instance maps drop together; leaking one leaves dangling
        // lookups in the others.
        self.inst_model.remove(&inst);
        self.inst_entity.remove(&inst);
        if let Some(body) = self.inst_body.remove(&inst) {
            self.physics.remove_body(body);
        }
        if let Some(unique) = self.inst_unique.remove(&inst) {
            self.unique_inst.remove(&unique);
        }
        self.renderer.remove_instance(inst);
    }

    /// Bulk teardown (map unload / client shutdown): release every live
    /// instance and drop all registries. A new discovery scan must run
    /// before anything loads again.
    pub fn reset(&mut self) {
        let entities: Vec<Entity> = self.entity_inst.keys().copied().collect();
        for e in entities {
            self.release_entity(e);
        }
        self.registry.clear();
        self.model_ids.clear();
        self.terrain_gate = None;
        self.unloads.clear();
        self.events.clear();
        self.scan.reset();
        self.shared
            .states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.shared
            .shapes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    // ---- introspection ---------------------------------------------------

    #[must_use]
    pub fn load_state(&self, hash: u32) -> LoadState {
        self.shared.peek(hash)
    }

    /// Number of expensive one-time decodes performed (per-hash, not
    /// per-request).
    #[must_use]
    pub fn decodes_performed(&self) -> usize {
        self.shared.decodes.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn instance_for_entity(&self, entity: Entity) -> Option<InstanceId> {
        self.entity_inst.get(&entity).copied()
    }

    #[must_use]
    pub fn body_for_instance(&self, inst: InstanceId) -> Option<BodyId> {
        self.inst_body.get(&inst).copied()
    }

    #[must_use]
    pub fn entity_for_instance(&self, inst: InstanceId) -> Option<Entity> {
        self.inst_entity.get(&inst).copied()
    }

    #[must_use]
    pub fn instance_for_unique(&self, unique_id: u32) -> Option<InstanceId> {
        self.unique_inst.get(&unique_id).copied()
    }

    #[must_use]
    pub fn live_instances(&self) -> usize {
        self.inst_entity.len()
    }
}

/// Worker-side decode. The per-hash mutex is the sole guarantee that the
/// expensive phase runs at most once no matter how many requesters race.
fn decode_item(shared: &Shared, item: &mut WorkItem) {
    let Some(asset) = &item.asset else {
        item.outcome = LoadState::Failed;
        return;
    };
    if item.outcome == LoadState::Failed {
        return;
    }
    let cell = shared.state_cell(item.req.hash);
    let mut st = cell.lock().unwrap_or_else(PoisonError::into_inner);
    if *st == LoadState::NotLoaded {
        shared.decodes.fetch_add(1, Ordering::Relaxed);
        if let Some(blob) = &asset.parsed.physics_blob {
            // Physics-shape deserialization happens once per hash; the engine
            // consumes the cached stream for every body afterwards.
            shared
                .shapes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(item.req.hash, Arc::new(blob.clone()));
        }
        *st = if asset.parsed.kind == AssetKind::Model && asset.parsed.vertex_count == 0 {
            LoadState::Failed
        } else {
            LoadState::Loaded
        };
    }
    item.outcome = *st;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_cell_transitions_are_terminal() {
        let shared = Shared {
            states: Mutex::new(HashMap::new()),
            shapes: Mutex::new(HashMap::new()),
            decodes: AtomicUsize::new(0),
        };
        shared.set_failed(7);
        assert_eq!(shared.peek(7), LoadState::Failed);
        // set_failed never overwrites a decided state.
        {
            let cell = shared.state_cell(8);
            *cell.lock().unwrap() = LoadState::Loaded;
        }
        shared.set_failed(8);
        assert_eq!(shared.peek(8), LoadState::Loaded);
    }
}
