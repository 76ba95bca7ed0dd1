//! Recording renderer/physics fakes shared by the loader integration tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use asset_core::format::ParsedAsset;
use asset_core::loader::{PhysicsWorld, RendererUpload, StreamingLoader};
use data_runtime::configs::streaming::StreamingBudget;
use ecs_core::components::{BodyId, InstanceId, ModelId, Transform};
use ecs_core::Entity;

#[derive(Default)]
pub struct RecordingRenderer {
    next_model: AtomicU32,
    next_instance: AtomicU32,
    pub model_loads: Mutex<Vec<String>>,
    /// Ordered call log: "add", "modify", "remove" entries with slot ids.
    pub log: Mutex<Vec<String>>,
}

impl RendererUpload for RecordingRenderer {
    fn load_model(&self, name: &str, _asset: &ParsedAsset) -> ModelId {
        self.model_loads.lock().unwrap().push(name.to_string());
        ModelId(self.next_model.fetch_add(1, Ordering::Relaxed))
    }

    fn add_placement_instance(
        &self,
        _entity: Entity,
        model: ModelId,
        _hash: u32,
        _transform: &Transform,
        _doodad_set: u16,
    ) -> InstanceId {
        let id = InstanceId(self.next_instance.fetch_add(1, Ordering::Relaxed));
        self.log
            .lock()
            .unwrap()
            .push(format!("add {} model {}", id.0, model.0));
        id
    }

    fn add_instance(
        &self,
        _entity: Entity,
        model: ModelId,
        _hash: u32,
        _transform: &Transform,
    ) -> InstanceId {
        let id = InstanceId(self.next_instance.fetch_add(1, Ordering::Relaxed));
        self.log
            .lock()
            .unwrap()
            .push(format!("add {} model {}", id.0, model.0));
        id
    }

    fn modify_instance(&self, instance: InstanceId, model: ModelId) {
        self.log
            .lock()
            .unwrap()
            .push(format!("modify {} model {}", instance.0, model.0));
    }

    fn remove_instance(&self, instance: InstanceId) {
        self.log.lock().unwrap().push(format!("remove {}", instance.0));
    }
}

#[derive(Default)]
pub struct RecordingPhysics {
    next_body: AtomicU32,
    pub static_bodies: Mutex<Vec<BodyId>>,
    pub kinematic_bodies: Mutex<Vec<BodyId>>,
    pub removed: Mutex<Vec<BodyId>>,
}

impl PhysicsWorld for RecordingPhysics {
    fn create_static_body(&self, _shape: &[u8], _transform: &Transform) -> Option<BodyId> {
        let id = BodyId(self.next_body.fetch_add(1, Ordering::Relaxed));
        self.static_bodies.lock().unwrap().push(id);
        Some(id)
    }

    fn create_kinematic_body(&self, _shape: &[u8], _transform: &Transform) -> Option<BodyId> {
        let id = BodyId(self.next_body.fetch_add(1, Ordering::Relaxed));
        self.kinematic_bodies.lock().unwrap().push(id);
        Some(id)
    }

    fn remove_body(&self, body: BodyId) {
        self.removed.lock().unwrap().push(body);
    }
}

pub struct Rig {
    pub renderer: Arc<RecordingRenderer>,
    pub physics: Arc<RecordingPhysics>,
    pub loader: StreamingLoader,
}

#[must_use]
pub fn rig() -> Rig {
    rig_with(StreamingBudget::default())
}

#[must_use]
pub fn rig_with(budget: StreamingBudget) -> Rig {
    let renderer = Arc::new(RecordingRenderer::default());
    let physics = Arc::new(RecordingPhysics::default());
    let loader = StreamingLoader::new(renderer.clone(), physics.clone(), budget);
    Rig {
        renderer,
        physics,
        loader,
    }
}
