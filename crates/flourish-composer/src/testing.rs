//! Scripted page double for tests.
//!
//! `FakePage` implements [`ComposerPage`] over in-memory state and records
//! every edit operation, so strategy chains and orchestration flows can be
//! asserted step by step. Mutation ticks and draft signals are emitted with
//! explicit test triggers.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use flourish_protocols::error::PageError;

use crate::dom::{BoundingBox, EditableRegion, PageSnapshot, RegionId, Viewport};
use crate::page::{ComposerPage, DraftSignal, SignalKind};

/// Convenience region constructor for tests.
pub fn region(id: u64, x: f64, y: f64, width: f64, height: f64) -> EditableRegion {
    EditableRegion::new(RegionId(id), BoundingBox::new(x, y, width, height))
}

struct FakeState {
    regions: Vec<EditableRegion>,
    viewport: Viewport,
    texts: HashMap<RegionId, String>,
    selected_all: HashSet<RegionId>,
    /// Regions whose host framework swallows synthetic paste events.
    paste_blocked: HashSet<RegionId>,
    /// Regions whose editing commands fail outright.
    commands_broken: HashSet<RegionId>,
    ops: Vec<String>,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            regions: Vec::new(),
            viewport: Viewport { width: 1280.0, height: 800.0 },
            texts: HashMap::new(),
            selected_all: HashSet::new(),
            paste_blocked: HashSet::new(),
            commands_broken: HashSet::new(),
            ops: Vec::new(),
        }
    }
}

/// In-memory [`ComposerPage`] with scripted behavior.
pub struct FakePage {
    state: Mutex<FakeState>,
    mutations_tx: broadcast::Sender<()>,
    signals_tx: broadcast::Sender<DraftSignal>,
}

impl Default for FakePage {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePage {
    pub fn new() -> Self {
        let (mutations_tx, _) = broadcast::channel(64);
        let (signals_tx, _) = broadcast::channel(64);
        Self {
            state: Mutex::new(FakeState::default()),
            mutations_tx,
            signals_tx,
        }
    }

    pub fn set_viewport(&self, width: f64, height: f64) {
        self.state.lock().viewport = Viewport { width, height };
    }

    pub fn add_region(&self, region: EditableRegion, text: &str) {
        let mut state = self.state.lock();
        state.texts.insert(region.id, text.to_string());
        state.regions.push(region);
    }

    pub fn remove_region(&self, id: RegionId) {
        let mut state = self.state.lock();
        state.regions.retain(|r| r.id != id);
        state.texts.remove(&id);
    }

    /// Overwrite a region's text as if the user had edited it.
    pub fn set_text(&self, id: RegionId, text: &str) {
        self.state.lock().texts.insert(id, text.to_string());
    }

    pub fn text(&self, id: RegionId) -> String {
        self.state.lock().texts.get(&id).cloned().unwrap_or_default()
    }

    /// Make synthetic pastes into `id` be silently dropped by the "host".
    pub fn block_paste(&self, id: RegionId) {
        self.state.lock().paste_blocked.insert(id);
    }

    /// Make all editing commands against `id` fail.
    pub fn break_commands(&self, id: RegionId) {
        self.state.lock().commands_broken.insert(id);
    }

    /// Ordered log of the edit operations observed so far.
    pub fn ops(&self) -> Vec<String> {
        self.state.lock().ops.clone()
    }

    /// Fire one structural-mutation tick.
    pub fn trigger_mutation(&self) {
        let _ = self.mutations_tx.send(());
    }

    /// Fire one draft-edit signal.
    pub fn emit_signal(&self, region: RegionId, kind: SignalKind) {
        let _ = self.signals_tx.send(DraftSignal { region, kind });
    }

    fn check_region(state: &FakeState, id: RegionId) -> Result<(), PageError> {
        if !state.texts.contains_key(&id) {
            return Err(PageError::RegionGone(id.0));
        }
        if state.commands_broken.contains(&id) {
            return Err(PageError::Script("editing command rejected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ComposerPage for FakePage {
    async fn snapshot(&self) -> Result<PageSnapshot, PageError> {
        let state = self.state.lock();
        Ok(PageSnapshot {
            viewport: state.viewport,
            regions: state.regions.clone(),
        })
    }

    async fn read_text(&self, region: RegionId) -> Result<String, PageError> {
        let state = self.state.lock();
        state
            .texts
            .get(&region)
            .cloned()
            .ok_or(PageError::RegionGone(region.0))
    }

    async fn focus(&self, region: RegionId) -> Result<(), PageError> {
        let mut state = self.state.lock();
        Self::check_region(&state, region)?;
        state.ops.push(format!("focus {region}"));
        Ok(())
    }

    async fn exec_select_all(&self, region: RegionId) -> Result<(), PageError> {
        let mut state = self.state.lock();
        Self::check_region(&state, region)?;
        state.selected_all.insert(region);
        state.ops.push(format!("select_all {region}"));
        Ok(())
    }

    async fn exec_delete(&self, region: RegionId) -> Result<(), PageError> {
        let mut state = self.state.lock();
        Self::check_region(&state, region)?;
        if state.selected_all.remove(&region) {
            state.texts.insert(region, String::new());
        }
        state.ops.push(format!("delete {region}"));
        Ok(())
    }

    async fn exec_insert_text(&self, region: RegionId, text: &str) -> Result<(), PageError> {
        let mut state = self.state.lock();
        Self::check_region(&state, region)?;
        if let Some(current) = state.texts.get_mut(&region) {
            current.push_str(text);
        }
        state.ops.push(format!("insert_text {region}"));
        Ok(())
    }

    async fn dispatch_paste(&self, region: RegionId, text: &str) -> Result<(), PageError> {
        let mut state = self.state.lock();
        Self::check_region(&state, region)?;
        if !state.paste_blocked.contains(&region) {
            if let Some(current) = state.texts.get_mut(&region) {
                current.push_str(text);
            }
        }
        state.ops.push(format!("paste {region}"));
        Ok(())
    }

    async fn dispatch_input(&self, region: RegionId) -> Result<(), PageError> {
        let mut state = self.state.lock();
        Self::check_region(&state, region)?;
        state.ops.push(format!("input {region}"));
        Ok(())
    }

    async fn set_text_direct(&self, region: RegionId, text: &str) -> Result<(), PageError> {
        let mut state = self.state.lock();
        if !state.texts.contains_key(&region) {
            return Err(PageError::RegionGone(region.0));
        }
        state.texts.insert(region, text.to_string());
        state.ops.push(format!("set_direct {region}"));
        Ok(())
    }

    async fn collapse_selection_to_end(&self, region: RegionId) -> Result<(), PageError> {
        let mut state = self.state.lock();
        Self::check_region(&state, region)?;
        state.ops.push(format!("collapse_end {region}"));
        Ok(())
    }

    async fn anchor_rect(&self, region: RegionId) -> Result<Option<BoundingBox>, PageError> {
        let state = self.state.lock();
        let rect = state
            .regions
            .iter()
            .find(|r| r.id == region)
            .map(|r| r.bounds)
            .filter(|b| !b.is_degenerate());
        Ok(rect)
    }

    fn structural_mutations(&self) -> broadcast::Receiver<()> {
        self.mutations_tx.subscribe()
    }

    fn draft_signals(&self) -> broadcast::Receiver<DraftSignal> {
        self.signals_tx.subscribe()
    }
}
